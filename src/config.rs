//! Command-line surface and the file layout it resolves to.

use crate::rank::DEFAULT_TOP_N;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub const DAY_AVERAGES_FILE: &str = "day_averages.csv";
pub const PEAK_VALUES_FILE: &str = "crop_average_peak_values.csv";
pub const TOP_DEMAND_FILE: &str = "top10_by_demand.csv";
pub const SUMMARY_FILE: &str = "demand_summary.json";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "crop-demand",
    about = "Rank crops whose recent demand meets their historical peak"
)]
pub struct Args {
    /// Data root: one subdirectory per crop, outputs written alongside.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// How many crops to report.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// Only log warnings and errors.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Average each crop's Day.csv into day_averages.csv.
    DayAverages,
    /// Average each crop's Year.csv into crop_average_peak_values.csv.
    PeakValues,
    /// Rank crops from the two CSV tables into top10_by_demand.csv.
    TopDemand,
    /// Run all three steps in order.
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub command: Command,
    pub root: PathBuf,
    pub top_n: usize,
    pub day_averages_path: PathBuf,
    pub peak_values_path: PathBuf,
    pub top_demand_path: PathBuf,
    pub summary_path: PathBuf,
}

impl RunConfig {
    pub fn new(root: &Path, command: Command, top_n: usize) -> Self {
        Self {
            command,
            root: root.to_path_buf(),
            top_n,
            day_averages_path: root.join(DAY_AVERAGES_FILE),
            peak_values_path: root.join(PEAK_VALUES_FILE),
            top_demand_path: root.join(TOP_DEMAND_FILE),
            summary_path: root.join(SUMMARY_FILE),
        }
    }
}

impl From<&Args> for RunConfig {
    fn from(args: &Args) -> Self {
        RunConfig::new(&args.root, args.command.unwrap_or(Command::All), args.top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_everything_in_cwd() {
        let args = Args::try_parse_from(["crop-demand"]).unwrap();
        let cfg = RunConfig::from(&args);
        assert_eq!(cfg.command, Command::All);
        assert_eq!(cfg.top_n, 10);
        assert_eq!(cfg.top_demand_path, Path::new(".").join("top10_by_demand.csv"));
    }

    #[test]
    fn subcommand_and_overrides() {
        let args =
            Args::try_parse_from(["crop-demand", "--root", "data", "--top", "3", "top-demand"])
                .unwrap();
        let cfg = RunConfig::from(&args);
        assert_eq!(cfg.command, Command::TopDemand);
        assert_eq!(cfg.top_n, 3);
        assert_eq!(cfg.day_averages_path, Path::new("data").join("day_averages.csv"));
        assert_eq!(
            cfg.peak_values_path,
            Path::new("data").join("crop_average_peak_values.csv")
        );
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Args::try_parse_from(["crop-demand", "plot"]).is_err());
    }
}
