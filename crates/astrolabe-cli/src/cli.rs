//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "astrolabe",
    version,
    about = "Manage visualization snippets from the terminal",
    long_about = "Manage visualization snippets from the terminal.\n\n\
                  Reads and writes the same snippet store as the desktop workbench.\n\
                  Configuration comes from ASTROLABE_DATA_DIR, ASTROLABE_DEBOUNCE_MS\n\
                  and ASTROLABE_LOG_DIR; flags override them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the snippet store (default: ~/.config/astrolabe).
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory for the activity log.
    #[arg(long = "log-dir", value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List snippets, newest first.
    List {
        /// Regular expression (or plain text) matched against each snippet.
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Print a snippet's specification (the draft, if there is one).
    Show {
        id: String,
        /// Show the saved version even when a draft exists.
        #[arg(long)]
        saved: bool,
    },

    /// Create a snippet with default content.
    New,

    Rename {
        id: String,
        name: String,
    },

    Delete {
        id: String,
    },

    /// Copy a snippet's content and comment under a new id.
    Duplicate {
        id: String,
    },

    /// Set a snippet's comment; an empty comment removes it.
    Comment {
        id: String,
        #[arg(default_value = "")]
        text: String,
    },

    /// Store a file's contents as the snippet's draft.
    Draft {
        id: String,
        file: PathBuf,
    },

    /// Save a file's contents as the snippet's content, dropping any draft.
    Save {
        id: String,
        file: PathBuf,
    },

    /// Print the other version of a snippet (saved or draft).
    Switch {
        id: String,
    },

    /// Render a snippet and print the preview.
    Preview {
        id: String,
    },

    /// Write all snippets to a JSON file.
    Export {
        #[arg(default_value = astrolabe_core::persistence::EXPORT_FILE_NAME)]
        file: PathBuf,
    },

    /// Replace all snippets with the contents of a JSON file.
    Import {
        file: PathBuf,
    },

    /// Show or change the pane layout.
    Layout {
        /// Boundary to move: 0 (list/editor) or 1 (editor/preview).
        #[arg(long, requires = "dx")]
        handle: Option<usize>,
        /// Distance as a fraction of the window width (may be negative).
        #[arg(long, requires = "handle", allow_negative_numbers = true)]
        dx: Option<f64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["astrolabe", "list", "-q", "bar", "--data-dir", "/tmp/a", "-vv"])
            .unwrap();

        assert_eq!(
            cli.command,
            Command::List {
                query: Some("bar".to_string())
            }
        );
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/a")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn comment_text_defaults_to_empty() {
        let cli = Cli::try_parse_from(["astrolabe", "comment", "simple-bar"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Comment {
                id: "simple-bar".to_string(),
                text: String::new()
            }
        );
    }

    #[test]
    fn layout_handle_requires_dx() {
        assert!(Cli::try_parse_from(["astrolabe", "layout", "--handle", "0"]).is_err());

        let cli =
            Cli::try_parse_from(["astrolabe", "layout", "--handle", "1", "--dx", "-0.1"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Layout {
                handle: Some(1),
                dx: Some(-0.1)
            }
        );
    }

    #[test]
    fn export_has_default_file_name() {
        let cli = Cli::try_parse_from(["astrolabe", "export"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Export {
                file: PathBuf::from("astrolabe-snippets.json")
            }
        );
    }
}
