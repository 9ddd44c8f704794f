use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "chainscript",
    about = "ChainScript: a collaborative story, one verified passage at a time",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Check the integrity of a saved story
    Audit(LedgerFileArgs),
    /// Print the committed text of a saved story
    Story(LedgerFileArgs),
    /// Check a passage against the content rules
    Check(CheckArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Address to listen on (overrides the config file)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Directory for story documents (overrides the config file)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct LedgerFileArgs {
    /// A story document written by the server
    pub path: PathBuf,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Text file holding the passage
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["chainscript", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.config.is_none());
            assert!(args.bind.is_none());
            assert!(args.data_dir.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "chainscript",
            "serve",
            "--config",
            "server.toml",
            "--bind",
            "0.0.0.0:8080",
            "--data-dir",
            "/srv/stories",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("server.toml")));
            assert_eq!(args.bind, Some("0.0.0.0:8080".parse().unwrap()));
            assert_eq!(args.data_dir, Some(PathBuf::from("/srv/stories")));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_bad_bind_fails() {
        assert!(Cli::try_parse_from(["chainscript", "serve", "--bind", "nowhere"]).is_err());
    }

    #[test]
    fn parse_audit_verbose() {
        let cli = Cli::try_parse_from(["chainscript", "audit", "tale.json", "-v"]).unwrap();
        assert!(cli.verbose);
        if let Command::Audit(args) = cli.command {
            assert_eq!(args.path, PathBuf::from("tale.json"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_story_and_check() {
        let cli = Cli::try_parse_from(["chainscript", "story", "tale.json"]).unwrap();
        assert!(matches!(cli.command, Command::Story(_)));
        let cli = Cli::try_parse_from(["chainscript", "check", "draft.txt"]).unwrap();
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn file_argument_is_required() {
        assert!(Cli::try_parse_from(["chainscript", "audit"]).is_err());
    }
}
