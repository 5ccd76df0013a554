//! Command-line interface definitions and parsing

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Local endpoint to bind (host:port)
    #[arg(short, long)]
    pub local: Option<String>,

    /// Endpoint every message is sent to (host:port)
    #[arg(short, long)]
    pub dest: Option<String>,

    /// Your display name; prompted for when omitted
    #[arg(short, long)]
    pub name: Option<String>,

    /// Number of messages kept in the chat history
    #[arg(long)]
    pub history_size: Option<usize>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["bpchat"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        assert!(cli.local.is_none());
        assert!(cli.name.is_none());
        assert!(!cli.print_config);
    }

    #[test]
    fn test_all_arguments() {
        let cli = Cli::try_parse_from([
            "bpchat",
            "-v",
            "-c",
            "chat.toml",
            "-l",
            "127.0.0.1:5000",
            "-d",
            "127.0.0.1:5001",
            "-n",
            "alice",
            "--history-size",
            "5",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("chat.toml")));
        assert_eq!(cli.local.as_deref(), Some("127.0.0.1:5000"));
        assert_eq!(cli.dest.as_deref(), Some("127.0.0.1:5001"));
        assert_eq!(cli.name.as_deref(), Some("alice"));
        assert_eq!(cli.history_size, Some(5));
    }

    #[test]
    fn test_rejects_bad_history_size() {
        assert!(Cli::try_parse_from(["bpchat", "--history-size", "many"]).is_err());
    }
}
