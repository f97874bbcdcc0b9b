//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use docxsrc_core::{
    HighlightDefinition, HighlightRegistry, NodeId, Session, Settings, TokenKind, Tree,
};

use crate::shell::shell_command;

#[derive(Parser)]
#[command(name = "docxsrc")]
#[command(author, version, about = "Inspect Open XML packages as code and markup", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./docxsrc.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node tree of a package
    Tree {
        /// Input DOCX/XLSX/PPTX file
        input: PathBuf,

        /// Prefix every node with its path
        #[arg(short, long)]
        paths: bool,
    },

    /// Render one node as generated code or canonical markup
    Render {
        /// Input DOCX/XLSX/PPTX file
        input: PathBuf,

        /// Node path, e.g. `0/0/1` (the package node is `0`)
        #[arg(short, long)]
        node: String,

        /// Language backend display name (defaults to the configured one)
        #[arg(short, long)]
        language: Option<String>,

        /// Print canonical markup instead of code
        #[arg(short, long)]
        markup: bool,

        /// Colorize output with ANSI escapes
        #[arg(long)]
        color: bool,
    },

    /// Read session commands from stdin
    Shell {
        /// File to open on start
        input: Option<PathBuf>,

        /// Colorize `show` output with ANSI escapes
        #[arg(long)]
        color: bool,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = load_settings(cli.config.as_deref())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Tree { input, paths } => {
            tree_command(&input, paths, &settings, &mut out).await?;
        }
        Commands::Render {
            input,
            node,
            language,
            markup,
            color,
        } => {
            render_command(
                &input,
                &node,
                language.as_deref(),
                markup,
                color,
                &settings,
                &mut out,
            )
            .await?;
        }
        Commands::Shell { input, color } => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            shell_command(input.as_deref(), color, &settings, stdin, &mut out).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when running in-process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load settings from `path`, else `./docxsrc.toml` if present, else defaults
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let local = PathBuf::from(Settings::FILE_NAME);
            if !local.exists() {
                return Ok(Settings::default());
            }
            local
        }
    };
    debug!(path = %path.display(), "loading settings");
    Settings::load(&path)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}

/// Execute the tree command
pub async fn tree_command(
    input: &Path,
    paths: bool,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<()> {
    let session = open_session(input, settings).await?;
    write!(out, "{}", format_tree(session.tree(), paths))?;
    Ok(())
}

/// Execute the render command
pub async fn render_command(
    input: &Path,
    node: &str,
    language: Option<&str>,
    markup: bool,
    color: bool,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<()> {
    let mut session = open_session(input, settings).await?;
    let id = session
        .tree()
        .resolve_path(node)
        .with_context(|| format!("Invalid node path: {}", node))?;

    if let Some(language) = language {
        session.select_backend(language)?;
    }
    session.select(Some(id))?;
    if !session.auto_render() {
        session.refresh()?;
    }

    let (text, syntax) = if markup {
        (
            session.markup_view().text(),
            HighlightRegistry::global().by_extension(".xml"),
        )
    } else {
        (session.code_view().text(), session.backend()?.highlighting())
    };

    let text = if color {
        colorize(text, syntax)
    } else {
        text.to_string()
    };
    write!(out, "{}", text)?;
    if !text.is_empty() && !text.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

async fn open_session(input: &Path, settings: &Settings) -> Result<Session> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let mut session = Session::with_settings(settings)?;
    session
        .open(input)
        .await
        .with_context(|| format!("Failed to open package: {}", input.display()))?;
    Ok(session)
}

/// Indented tree listing, two spaces per level
pub(crate) fn format_tree(tree: &Tree, paths: bool) -> String {
    let mut output = String::new();
    for (id, depth) in tree.descendants(NodeId::ROOT) {
        let Some(node) = tree.get(id) else { continue };
        output.push_str(&"  ".repeat(depth));
        if paths {
            if let Some(path) = tree.path_of(id) {
                output.push_str(&path);
                output.push_str("  ");
            }
        }
        output.push_str(node.header());
        output.push('\n');
    }
    output
}

fn ansi_code(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Keyword => "\x1b[34m",
        TokenKind::String => "\x1b[32m",
        TokenKind::Comment => "\x1b[90m",
        TokenKind::Number => "\x1b[35m",
        TokenKind::Tag => "\x1b[36m",
        TokenKind::AttributeName => "\x1b[33m",
        TokenKind::Entity => "\x1b[31m",
    }
}

/// Wrap highlighted tokens in ANSI color escapes
pub fn colorize(text: &str, definition: Option<&HighlightDefinition>) -> String {
    let Some(definition) = definition else {
        return text.to_string();
    };

    let mut output = String::with_capacity(text.len() * 2);
    let mut last = 0;
    for token in definition.highlight(text) {
        output.push_str(&text[last..token.start]);
        output.push_str(ansi_code(token.kind));
        output.push_str(&text[token.start..token.end]);
        output.push_str("\x1b[0m");
        last = token.end;
    }
    output.push_str(&text[last..]);
    output
}
