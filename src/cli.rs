// Command-line arguments for the interactive session.
use clap::Parser;
use std::path::PathBuf;

/// Profitability and delivery-risk analytics for a consultancy timesheet
#[derive(Parser, Debug, Default, Clone, PartialEq)]
#[command(name = "bizpulse")]
#[command(about = "Interactive profitability and delivery-risk dashboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Timesheet CSV to load
    #[arg(long)]
    pub data: Option<String>,

    /// Seed for synthetic data
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory that receives exported reports
    #[arg(long)]
    pub export_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_flag() {
        let cli = Cli::try_parse_from([
            "bizpulse",
            "--config",
            "cfg.json",
            "--data",
            "x.csv",
            "--seed",
            "9",
            "--export-dir",
            "out",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        assert_eq!(cli.data.as_deref(), Some("x.csv"));
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.export_dir.as_deref(), Some("out"));
    }

    #[test]
    fn flag_without_value_is_rejected() {
        assert!(Cli::try_parse_from(["bizpulse", "--data", "x.csv", "--seed"]).is_err());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["bizpulse", "--sede", "9"]).is_err());
    }

    #[test]
    fn non_numeric_seed_is_rejected() {
        assert!(Cli::try_parse_from(["bizpulse", "--seed", "abc"]).is_err());
    }
}
