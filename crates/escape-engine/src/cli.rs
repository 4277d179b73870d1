//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Escape EM - progress codes for the escape room
#[derive(Parser)]
#[command(
    name = "escape-em",
    about = "Export, import and inspect Escape EM progress",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the progress record (overrides the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Print a progress code for the saved game
    Export,

    /// Restore progress from a code
    Import {
        /// Code as shown by `export`, or the teacher phrase
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Show a summary of the saved game
    Status,

    /// Delete the saved game
    Reset,

    /// Write the effective configuration to the config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import_with_globals() {
        let cli = Cli::try_parse_from([
            "escape-em",
            "import",
            "GEN3.IZA.abc123",
            "--save-dir",
            "/tmp/escape",
        ])
        .expect("parse");
        assert_eq!(cli.save_dir, Some(PathBuf::from("/tmp/escape")));
        assert!(matches!(cli.command, Command::Import { code } if code == "GEN3.IZA.abc123"));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["escape-em"]).is_err());
    }

    #[test]
    fn test_parse_init_config() {
        let cli = Cli::try_parse_from(["escape-em", "init-config", "--force"]).expect("parse");
        assert!(matches!(cli.command, Command::InitConfig { force: true }));
    }

    #[test]
    fn test_parse_config_flag() {
        let cli = Cli::try_parse_from(["escape-em", "-c", "escape.toml", "status"]).expect("parse");
        assert_eq!(cli.config, Some(PathBuf::from("escape.toml")));
        assert!(matches!(cli.command, Command::Status));
    }
}
