//! Inspector session
//!
//! The session owns the opened package and its byte buffer, the node tree,
//! the selection, the selected language backend and the two rendered text
//! views. Opening runs `Empty -> Loading -> Open`; any failure falls back
//! to `Empty` with no tree and no held package.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use docxsrc_opc::{OpenXmlPackage, PackageKind, RawPackage};

use crate::backend::{BackendRegistry, LanguageBackend};
use crate::config::Settings;
use crate::error::{Result, SessionError};
use crate::highlight::{HighlightDefinition, HighlightRegistry};
use crate::node::NodeId;
use crate::render::{render_code, render_markup};
use crate::tree::Tree;

/// Package lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No package held
    Empty,
    /// A file is being read
    Loading,
    /// A package is open and its tree built
    Open,
}

/// Picks a file to open
pub trait FileDialog {
    /// Ask for a path; `None` means the user cancelled
    fn pick_file(&self, initial_dir: Option<&Path>) -> Option<PathBuf>;
}

/// Rendered text with a synthetic file name
#[derive(Clone, Default)]
pub struct TextView {
    text: String,
    file_name: String,
    syntax: Option<&'static HighlightDefinition>,
}

impl fmt::Debug for TextView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextView")
            .field("file_name", &self.file_name)
            .field("bytes", &self.text.len())
            .field("syntax", &self.syntax.map(|s| s.name()))
            .finish()
    }
}

impl TextView {
    /// Displayed text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// File name, `<uuid>.<extension>`; empty when nothing is rendered
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Attached highlighting definition
    pub fn syntax(&self) -> Option<&'static HighlightDefinition> {
        self.syntax
    }

    fn clear(&mut self) {
        *self = TextView::default();
    }
}

/// An inspector session
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    tree: Tree,
    backends: BackendRegistry,
    backend: usize,
    selected: Option<NodeId>,
    auto_render: bool,
    highlight: bool,
    package: Option<Arc<OpenXmlPackage>>,
    raw: Option<RawPackage>,
    stream: Option<Vec<u8>>,
    file_name: Option<String>,
    last_dir: Option<PathBuf>,
    code_view: TextView,
    markup_view: TextView,
    is_element: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release();
    }
}

impl Session {
    /// Empty session with the built-in backends, C# selected, auto-render
    /// and highlighting on
    pub fn new() -> Self {
        Self::with_backends(BackendRegistry::with_defaults())
    }

    /// Empty session over a custom backend registry; the first backend is
    /// selected
    pub fn with_backends(backends: BackendRegistry) -> Self {
        Self {
            state: SessionState::Empty,
            tree: Tree::new(),
            backends,
            backend: 0,
            selected: None,
            auto_render: true,
            highlight: true,
            package: None,
            raw: None,
            stream: None,
            file_name: None,
            last_dir: None,
            code_view: TextView::default(),
            markup_view: TextView::default(),
            is_element: false,
        }
    }

    /// Empty session configured from settings
    pub fn with_settings(settings: &Settings) -> Result<Self> {
        let mut backends = BackendRegistry::with_defaults();
        backends.set_options(settings.alias_options());
        let backend = backends.position(&settings.view.language)?;

        let mut session = Self::with_backends(backends);
        session.backend = backend;
        session.auto_render = settings.view.auto_render;
        session.highlight = settings.view.highlight;
        Ok(session)
    }

    /// Lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The node tree
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The opened package, if any
    pub fn package(&self) -> Option<&Arc<OpenXmlPackage>> {
        self.package.as_ref()
    }

    /// Check whether a package, its raw view or its buffer is held
    pub fn holds_resources(&self) -> bool {
        self.package.is_some() || self.raw.is_some() || self.stream.is_some()
    }

    /// Display name of the opened file
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Directory of the last file opened from disk
    pub fn last_directory(&self) -> Option<&Path> {
        self.last_dir.as_deref()
    }

    /// Backend registry
    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    /// Backend registry, for registering more backends
    pub fn backends_mut(&mut self) -> &mut BackendRegistry {
        &mut self.backends
    }

    /// The selected backend
    pub fn backend(&self) -> Result<&LanguageBackend> {
        self.backends
            .at(self.backend)
            .ok_or_else(|| SessionError::precondition("no language backend registered"))
    }

    /// The selected node
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Auto-render flag
    pub fn auto_render(&self) -> bool {
        self.auto_render
    }

    /// Highlighting flag
    pub fn highlight(&self) -> bool {
        self.highlight
    }

    /// Generated code view
    pub fn code_view(&self) -> &TextView {
        &self.code_view
    }

    /// Canonical markup view
    pub fn markup_view(&self) -> &TextView {
        &self.markup_view
    }

    /// True when the markup view holds non-blank text
    pub fn is_element(&self) -> bool {
        self.is_element
    }

    /// Open a file from disk, replacing whatever was open
    ///
    /// Returns the id of the new package node.
    pub async fn open(&mut self, path: impl AsRef<Path>) -> Result<NodeId> {
        let path = path.as_ref();
        self.begin_open();

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read package");
                self.reset();
                return Err(e.into());
            }
        };

        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let id = self.load(&label, bytes)?;
        self.last_dir = path.parent().map(Path::to_path_buf);
        Ok(id)
    }

    /// Ask `dialog` for a file and open it
    ///
    /// The dialog starts in the directory of the last opened file, or in
    /// the user's documents directory. Cancelling leaves the session as it
    /// was and returns `Ok(None)`.
    pub async fn open_with_dialog(&mut self, dialog: &impl FileDialog) -> Result<Option<NodeId>> {
        let hint = self.last_dir.clone().or_else(dirs::document_dir);
        match dialog.pick_file(hint.as_deref()) {
            Some(path) => self.open(path).await.map(Some),
            None => {
                debug!("open dialog cancelled");
                Ok(None)
            }
        }
    }

    /// Open an in-memory package under a display label
    pub fn open_bytes(&mut self, label: &str, bytes: Vec<u8>) -> Result<NodeId> {
        self.begin_open();
        self.load(label, bytes)
    }

    /// Release the package, close the tree and clear both views
    pub fn close(&mut self) {
        self.reset();
        info!("session closed");
    }

    /// Drop the typed package, the raw view and the buffer, in that order
    ///
    /// Calling it again is a no-op. The tree and selection are untouched.
    pub fn release(&mut self) {
        let package = self.package.take();
        let raw = self.raw.take();
        let stream = self.stream.take();
        if package.is_none() && raw.is_none() && stream.is_none() {
            return;
        }
        drop(package);
        drop(raw);
        drop(stream);
        debug!("released package resources");
    }

    /// Change the selection; re-renders when auto-render is on
    ///
    /// A failed render keeps the previous selection and views.
    pub fn select(&mut self, id: Option<NodeId>) -> Result<()> {
        if let Some(id) = id {
            if self.tree.node(id)?.is_root() {
                return Err(SessionError::precondition(
                    "the root node cannot be selected",
                ));
            }
        }
        let previous = std::mem::replace(&mut self.selected, id);
        if self.auto_render {
            if let Err(e) = self.render() {
                self.selected = previous;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Select a backend by display name; re-renders when auto-render is on
    pub fn select_backend(&mut self, name: &str) -> Result<()> {
        self.backend = self.backends.position(name)?;
        debug!(language = name, "selected language backend");
        if self.auto_render {
            self.render()?;
        }
        Ok(())
    }

    /// Toggle auto-render
    ///
    /// Turning it on renders the current selection; turning it off clears
    /// both views.
    pub fn set_auto_render(&mut self, enabled: bool) -> Result<()> {
        self.auto_render = enabled;
        if enabled {
            self.render()
        } else {
            self.clear_views();
            self.attach_highlighting();
            Ok(())
        }
    }

    /// Toggle highlighting; text is never recomputed
    pub fn set_highlight(&mut self, enabled: bool) {
        self.highlight = enabled;
        self.attach_highlighting();
    }

    /// Render the current selection regardless of auto-render
    pub fn refresh(&mut self) -> Result<()> {
        self.render()
    }

    fn begin_open(&mut self) {
        self.reset();
        self.state = SessionState::Loading;
    }

    fn load(&mut self, label: &str, bytes: Vec<u8>) -> Result<NodeId> {
        match Self::open_package(&bytes) {
            Ok((raw, package)) => {
                let package = Arc::new(package);
                self.stream = Some(bytes);
                self.raw = Some(raw);
                self.package = Some(Arc::clone(&package));

                let id = self.tree.set_package(label, package);
                self.file_name = Some(label.to_string());
                self.state = SessionState::Open;
                info!(file = label, nodes = self.tree.len(), "opened package");
                Ok(id)
            }
            Err(e) => {
                warn!(file = label, error = %e, "failed to open package");
                self.reset();
                Err(e)
            }
        }
    }

    fn open_package(bytes: &[u8]) -> Result<(RawPackage, OpenXmlPackage)> {
        let raw = RawPackage::from_bytes(bytes)?;
        let kind = PackageKind::detect(&raw).ok_or(SessionError::UnsupportedDocument)?;
        debug!(kind = kind.type_name(), "detected package kind");
        let package = OpenXmlPackage::open(&raw, kind)?;
        Ok((raw, package))
    }

    fn reset(&mut self) {
        self.release();
        self.tree.clear();
        self.selected = None;
        self.file_name = None;
        self.clear_views();
        self.state = SessionState::Empty;
    }

    fn clear_views(&mut self) {
        self.code_view.clear();
        self.markup_view.clear();
        self.is_element = false;
    }

    fn render(&mut self) -> Result<()> {
        let Some(id) = self.selected else {
            self.clear_views();
            return Ok(());
        };

        let backend = self.backend()?;
        let code = render_code(&self.tree, id, backend)?;
        let markup = render_markup(&self.tree, id)?;

        let stem = Uuid::new_v4();
        let code_name = format!("{}.{}", stem, backend.extension());
        self.is_element = !markup.trim().is_empty();
        self.code_view = TextView {
            text: code,
            file_name: code_name,
            syntax: None,
        };
        self.markup_view = TextView {
            text: markup,
            file_name: format!("{}.xml", stem),
            syntax: None,
        };
        self.attach_highlighting();
        Ok(())
    }

    fn attach_highlighting(&mut self) {
        let attach = self.highlight && self.auto_render && self.selected.is_some();
        if attach {
            self.code_view.syntax = self.backends.at(self.backend).and_then(|b| b.highlighting());
            self.markup_view.syntax = HighlightRegistry::global().by_extension(".xml");
        } else {
            self.code_view.syntax = None;
            self.markup_view.syntax = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docxsrc_opc::test_utils::PackageBuilder;

    fn word_session() -> Session {
        let mut session = Session::new();
        let bytes = PackageBuilder::word().build().unwrap();
        session.open_bytes("report.docx", bytes).unwrap();
        session
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.tree().is_empty());
        assert!(session.auto_render());
        assert!(session.highlight());
        assert_eq!(session.backend().unwrap().name(), "C#");
        assert!(!session.holds_resources());
    }

    #[test]
    fn test_open_bytes_builds_single_package_node() {
        let session = word_session();
        assert_eq!(session.state(), SessionState::Open);
        assert!(session.holds_resources());
        assert_eq!(session.tree().root().children().len(), 1);
        let package = session.tree().resolve_path("0").unwrap();
        assert_eq!(session.tree().node(package).unwrap().header(), "report.docx");
        assert_eq!(session.file_name(), Some("report.docx"));
    }

    #[test]
    fn test_reopen_replaces_tree() {
        let mut session = word_session();
        let bytes = PackageBuilder::spreadsheet().build().unwrap();
        session.open_bytes("book.xlsx", bytes).unwrap();

        assert_eq!(session.tree().root().children().len(), 1);
        let package = session.tree().resolve_path("0").unwrap();
        assert_eq!(session.tree().node(package).unwrap().header(), "book.xlsx");
    }

    #[test]
    fn test_unsupported_document_leaves_session_empty() {
        let mut session = word_session();
        let bytes = PackageBuilder::empty()
            .part("/other/thing.xml", "application/xml", "<thing/>")
            .build()
            .unwrap();

        let result = session.open_bytes("thing.zip", bytes);
        assert!(matches!(result, Err(SessionError::UnsupportedDocument)));
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.tree().is_empty());
        assert!(!session.holds_resources());
        assert_eq!(session.file_name(), None);
    }

    #[test]
    fn test_malformed_bytes_leave_session_empty() {
        let mut session = word_session();
        let result = session.open_bytes("junk.docx", b"not a zip".to_vec());
        assert!(matches!(result, Err(SessionError::Package(_))));
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.tree().is_empty());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut session = word_session();
        session.release();
        assert!(!session.holds_resources());
        let nodes = session.tree().len();

        session.release();
        assert!(!session.holds_resources());
        assert_eq!(session.tree().len(), nodes);
        assert_eq!(session.state(), SessionState::Open);
    }

    #[test]
    fn test_close_clears_everything() {
        let mut session = word_session();
        let body = session.tree().resolve_path("0/0/1").unwrap();
        session.select(Some(body)).unwrap();
        assert!(!session.code_view().text().is_empty());

        session.close();
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.tree().is_empty());
        assert_eq!(session.selected(), None);
        assert_eq!(session.code_view().text(), "");
        assert_eq!(session.markup_view().text(), "");
        assert!(!session.is_element());

        session.close();
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_select_renders_both_views() {
        let mut session = word_session();
        let body = session.tree().resolve_path("0/0/1").unwrap();
        session.select(Some(body)).unwrap();

        assert!(session.code_view().text().contains("public Body GenerateBody()"));
        assert!(session.markup_view().text().starts_with("<w:body xmlns:w="));
        assert!(session.is_element());

        let code_name = session.code_view().file_name();
        let markup_name = session.markup_view().file_name();
        assert!(code_name.ends_with(".cs"));
        assert!(markup_name.ends_with(".xml"));
        assert_eq!(
            code_name.trim_end_matches(".cs"),
            markup_name.trim_end_matches(".xml")
        );
    }

    #[test]
    fn test_part_selection_has_no_markup() {
        let mut session = word_session();
        let part = session.tree().resolve_path("0/0").unwrap();
        session.select(Some(part)).unwrap();

        assert!(session.code_view().text().contains("CreateParts"));
        assert_eq!(session.markup_view().text(), "");
        assert!(!session.is_element());
    }

    #[test]
    fn test_root_cannot_be_selected() {
        let mut session = word_session();
        assert!(matches!(
            session.select(Some(NodeId::ROOT)),
            Err(SessionError::Precondition(_))
        ));
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_fresh_file_names_per_render() {
        let mut session = word_session();
        let body = session.tree().resolve_path("0/0/1").unwrap();
        session.select(Some(body)).unwrap();
        let first = session.code_view().file_name().to_string();
        session.refresh().unwrap();
        assert_ne!(session.code_view().file_name(), first);
    }

    #[test]
    fn test_select_none_clears_views() {
        let mut session = word_session();
        let body = session.tree().resolve_path("0/0/1").unwrap();
        session.select(Some(body)).unwrap();
        session.select(None).unwrap();

        assert_eq!(session.code_view().text(), "");
        assert_eq!(session.code_view().file_name(), "");
        assert!(session.code_view().syntax().is_none());
    }

    #[test]
    fn test_auto_render_off_clears_views() {
        let mut session = word_session();
        let body = session.tree().resolve_path("0/0/1").unwrap();
        let styles = session.tree().resolve_path("0/0/0").unwrap();
        session.select(Some(body)).unwrap();
        assert!(session.is_element());

        session.set_auto_render(false).unwrap();
        assert_eq!(session.code_view().text(), "");
        assert_eq!(session.code_view().file_name(), "");
        assert_eq!(session.markup_view().text(), "");
        assert_eq!(session.markup_view().file_name(), "");
        assert!(session.code_view().syntax().is_none());
        assert!(!session.is_element());
        assert_eq!(session.selected(), Some(body));

        session.select(Some(styles)).unwrap();
        session.select_backend("Visual Basic.Net").unwrap();
        assert_eq!(session.code_view().text(), "");
        assert_eq!(session.markup_view().text(), "");

        session.set_auto_render(true).unwrap();
        assert!(session.code_view().text().contains("Public Sub CreateParts"));
        assert!(session.code_view().file_name().ends_with(".vb"));
    }

    #[test]
    fn test_refresh_renders_with_auto_render_off() {
        let mut session = word_session();
        session.set_auto_render(false).unwrap();
        let body = session.tree().resolve_path("0/0/1").unwrap();
        session.select(Some(body)).unwrap();
        assert_eq!(session.code_view().text(), "");

        session.refresh().unwrap();
        assert!(session.code_view().text().contains("GenerateBody"));
        assert!(session.code_view().syntax().is_none());
    }

    #[test]
    fn test_highlight_toggle_never_rerenders() {
        let mut session = word_session();
        let body = session.tree().resolve_path("0/0/1").unwrap();
        session.select(Some(body)).unwrap();
        assert_eq!(session.code_view().syntax().unwrap().name(), "C#");
        assert_eq!(session.markup_view().syntax().unwrap().name(), "XML");
        let name = session.code_view().file_name().to_string();

        session.set_highlight(false);
        assert!(session.code_view().syntax().is_none());
        assert!(session.markup_view().syntax().is_none());
        assert_eq!(session.code_view().file_name(), name);

        session.set_highlight(true);
        assert_eq!(session.code_view().syntax().unwrap().name(), "C#");
        assert_eq!(session.code_view().file_name(), name);
    }

    #[test]
    fn test_highlight_needs_selection() {
        let mut session = word_session();
        session.set_highlight(false);
        session.set_highlight(true);
        assert!(session.code_view().syntax().is_none());
    }

    #[test]
    fn test_unknown_backend() {
        let mut session = word_session();
        assert!(matches!(
            session.select_backend("Cobol"),
            Err(SessionError::Precondition(_))
        ));
        assert_eq!(session.backend().unwrap().name(), "C#");
    }

    #[test]
    fn test_with_settings() {
        let settings = Settings::from_toml_str(
            "[view]\nauto_render = false\nlanguage = \"Visual Basic.Net\"\n",
        )
        .unwrap();
        let session = Session::with_settings(&settings).unwrap();
        assert!(!session.auto_render());
        assert_eq!(session.backend().unwrap().extension(), "vb");

        let settings = Settings::from_toml_str("[view]\nlanguage = \"Perl\"\n").unwrap();
        assert!(Session::with_settings(&settings).is_err());
    }

    #[test]
    fn test_failed_render_keeps_previous_selection() {
        let mut session = Session::with_backends(BackendRegistry::empty());
        let bytes = PackageBuilder::word().build().unwrap();
        session.open_bytes("report.docx", bytes).unwrap();
        let body = session.tree().resolve_path("0/0/1").unwrap();

        assert!(matches!(
            session.select(Some(body)),
            Err(SessionError::Precondition(_))
        ));
        assert_eq!(session.selected(), None);
        assert_eq!(session.code_view().text(), "");
    }

    #[test]
    fn test_stale_ids_rejected_after_close() {
        let mut session = word_session();
        let body = session.tree().resolve_path("0/0/1").unwrap();
        session.close();
        assert!(matches!(
            session.select(Some(body)),
            Err(SessionError::Precondition(_))
        ));
    }
}
