//! docxsrc CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docxsrc:
//! - Tree: print the node tree of a package
//! - Render: print generated code or canonical markup for one node
//! - Shell: drive an inspector session from stdin
//!
//! # Library Usage
//!
//! ```ignore
//! use docxsrc_cli::{tree_command, Settings};
//!
//! let mut out = std::io::stdout();
//! tree_command(Path::new("report.docx"), true, &Settings::default(), &mut out).await?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Print the tree with node paths
//! docxsrc tree report.docx --paths
//!
//! # Generate Visual Basic for the document body
//! docxsrc render report.docx --node 0/0/1 --language "Visual Basic.Net"
//!
//! # Canonical markup of the same node
//! docxsrc render report.docx --node 0/0/1 --markup
//!
//! # Interactive session
//! docxsrc shell report.docx
//! ```

pub mod app;
pub mod shell;

// Re-export main entry point and commands
pub use app::{colorize, load_settings, render_command, run_cli, tree_command};
pub use docxsrc_core::Settings;
pub use shell::shell_command;
