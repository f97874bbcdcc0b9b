//! Line-oriented session shell
//!
//! Each input line is one command:
//!
//! | command | effect |
//! |---|---|
//! | `open <file>` | open a package, replacing the current one |
//! | `close` | release the package and clear the tree |
//! | `ls [path]` | list the children of a node (default: the root) |
//! | `select <path>` / `select none` | change the selection |
//! | `lang [name]` | list backends, or select one |
//! | `auto on\|off` | toggle auto-render |
//! | `highlight on\|off` | toggle highlighting |
//! | `refresh` | render the selection now |
//! | `show [code\|markup]` | print a view |
//! | `tree` | print the whole tree with paths |
//! | `quit` | leave the shell |
//!
//! A failing command prints `error: ...` and the shell keeps going.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use docxsrc_core::{NodeId, Session, Settings};

use crate::app::{colorize, format_tree};

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Execute the shell command
///
/// Runs until `quit` or the end of `input`.
pub async fn shell_command<R: AsyncBufRead + Unpin>(
    file: Option<&Path>,
    color: bool,
    settings: &Settings,
    input: R,
    out: &mut impl Write,
) -> Result<()> {
    let mut session = Session::with_settings(settings)?;
    if let Some(file) = file {
        session
            .open(file)
            .await
            .with_context(|| format!("Failed to open package: {}", file.display()))?;
        writeln!(out, "opened {} ({} nodes)", file.display(), session.tree().len())?;
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        debug!(command = line.trim(), "shell command");
        match execute(&mut session, &line, color, out).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => writeln!(out, "error: {:#}", e)?,
        }
    }
    session.close();
    Ok(())
}

async fn execute(
    session: &mut Session,
    line: &str,
    color: bool,
    out: &mut impl Write,
) -> Result<Flow> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "open" => {
            if rest.is_empty() {
                bail!("usage: open <file>");
            }
            session.open(rest).await?;
            writeln!(out, "opened {} ({} nodes)", rest, session.tree().len())?;
        }
        "close" => {
            session.close();
            writeln!(out, "closed")?;
        }
        "ls" => {
            let tree = session.tree();
            let id = tree.resolve_path(rest)?;
            for child in tree.node(id)?.children() {
                let path = tree.path_of(*child).unwrap_or_default();
                writeln!(out, "{}  {}", path, tree.node(*child)?.header())?;
            }
        }
        "tree" => {
            write!(out, "{}", format_tree(session.tree(), true))?;
        }
        "select" => {
            if rest.is_empty() || rest == "none" {
                session.select(None)?;
                writeln!(out, "selection cleared")?;
            } else {
                let id = session.tree().resolve_path(rest)?;
                session.select(Some(id))?;
                writeln!(out, "selected {}", header(session, id)?)?;
            }
        }
        "lang" => {
            if rest.is_empty() {
                let current = session.backend()?.name().to_string();
                for name in session.backends().names() {
                    let marker = if name == current { "*" } else { " " };
                    writeln!(out, "{} {}", marker, name)?;
                }
            } else {
                session.select_backend(rest)?;
                writeln!(out, "language {}", rest)?;
            }
        }
        "auto" => {
            session.set_auto_render(switch(rest)?)?;
            writeln!(out, "auto-render {}", on_off(session.auto_render()))?;
        }
        "highlight" => {
            session.set_highlight(switch(rest)?);
            writeln!(out, "highlight {}", on_off(session.highlight()))?;
        }
        "refresh" => {
            session.refresh()?;
        }
        "show" => {
            let view = match rest {
                "" | "code" => session.code_view(),
                "markup" => session.markup_view(),
                other => bail!("unknown view '{}'", other),
            };
            writeln!(out, "--- {}", view.file_name())?;
            let text = if color {
                colorize(view.text(), view.syntax())
            } else {
                view.text().to_string()
            };
            write!(out, "{}", text)?;
            if !text.is_empty() && !text.ends_with('\n') {
                writeln!(out)?;
            }
        }
        "help" => {
            writeln!(
                out,
                "commands: open close ls tree select lang auto highlight refresh show quit"
            )?;
        }
        "quit" | "exit" => return Ok(Flow::Quit),
        other => bail!("unknown command '{}'", other),
    }

    Ok(Flow::Continue)
}

fn header(session: &Session, id: NodeId) -> Result<String> {
    Ok(session.tree().node(id)?.header().to_string())
}

fn switch(value: &str) -> Result<bool> {
    match value {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => bail!("expected on or off, got '{}'", other),
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
