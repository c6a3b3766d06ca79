//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Overrides;

/// ragchat - Chat with a retrieval-augmented QA backend from the terminal
#[derive(Parser, Debug)]
#[command(name = "ragchat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL (default: http://localhost:5000)
    #[arg(short, long, global = true)]
    pub backend: Option<String>,

    /// Config file to read instead of ~/.ragchat/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seconds to wait for a chat reply
    #[arg(long, global = true)]
    pub chat_timeout: Option<u64>,

    /// Seconds to wait for an upload to be processed
    #[arg(long, global = true)]
    pub upload_timeout: Option<u64>,

    /// Keep the selected file after a failed upload so it can be retried
    #[arg(long, global = true)]
    pub retain_attachment: bool,

    /// Log request details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (defaults to an interactive chat)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// Question to send
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },

    /// Upload a document (pdf, doc, docx, txt, md) for the backend to index
    Upload {
        /// Path of the document
        file: PathBuf,
    },
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Self {
            backend: cli.backend.clone(),
            chat_timeout: cli.chat_timeout,
            upload_timeout: cli.upload_timeout,
            retain_attachment: cli.retain_attachment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["ragchat"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_ask_collects_trailing_words() {
        let cli = Cli::try_parse_from(["ragchat", "ask", "what", "is", "RAG?"]).unwrap();
        match cli.command {
            Some(Commands::Ask { message }) => assert_eq!(message.join(" "), "what is RAG?"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_ask_requires_a_message() {
        assert!(Cli::try_parse_from(["ragchat", "ask"]).is_err());
    }

    #[test]
    fn test_global_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "ragchat",
            "upload",
            "notes.md",
            "--backend",
            "http://rag:5000",
            "--upload-timeout",
            "90",
            "--retain-attachment",
        ])
        .unwrap();

        let overrides = Overrides::from(&cli);
        assert_eq!(overrides.backend.as_deref(), Some("http://rag:5000"));
        assert_eq!(overrides.upload_timeout, Some(90));
        assert_eq!(overrides.chat_timeout, None);
        assert!(overrides.retain_attachment);
        match cli.command {
            Some(Commands::Upload { file }) => assert_eq!(file, PathBuf::from("notes.md")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
