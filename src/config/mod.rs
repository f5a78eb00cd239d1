pub mod env;
mod lenient;
pub mod models;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "flowcore-connector")]
#[command(about = "InOrbit FLOWCore Connector", version)]
pub struct CliArgs {
    /// Path to YAML configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Validate the configuration and print a summary without connecting
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_config_flag_is_required() {
        assert!(CliArgs::try_parse_from(["flowcore-connector"]).is_err());
    }

    #[test]
    fn test_parse_short_flags() {
        let args =
            CliArgs::try_parse_from(["flowcore-connector", "-c", "config/fleet.yaml", "-v"]).unwrap();
        assert_eq!(args.config, PathBuf::from("config/fleet.yaml"));
        assert!(args.verbose);
        assert!(!args.dry_run);
    }
}
