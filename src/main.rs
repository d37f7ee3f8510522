// Entry point and high-level CLI flow.
//
// - `day-averages` turns each crop's Day.csv into day_averages.csv.
// - `peak-values` turns each crop's Year.csv into crop_average_peak_values.csv.
// - `top-demand` reads both tables and writes the ranked crops plus a JSON
//   summary.
// - `all` (the default) runs the three in order.
use clap::Parser;
use crop_demand::config::{Args, Command, RunConfig};
use crop_demand::types::PeakValueRow;
use crop_demand::{collect, loader, logging, output, reports, util, Result};
use std::process::ExitCode;
use tracing::error;

fn handle_day_averages(cfg: &RunConfig) -> Result<()> {
    let averages = collect::collect_day_averages(&cfg.root)?;
    let rows = reports::day_average_rows(&averages);
    output::write_csv(&cfg.day_averages_path, &["crop", "average", "count"], &rows)?;
    println!(
        "Wrote {} with {} rows\n",
        cfg.day_averages_path.display(),
        util::format_int(rows.len())
    );
    Ok(())
}

fn handle_peak_values(cfg: &RunConfig) -> Result<()> {
    let collected = collect::collect_peak_values(&cfg.root)?;
    output::write_csv(
        &cfg.peak_values_path,
        &["Crop", "Average_Peak_Value"],
        &collected.rows,
    )?;
    for s in &collected.skipped {
        println!("✗ {:20} - {}", s.crop, s.reason);
    }
    println!(
        "\nTotal crops analyzed: {}",
        util::format_int(collected.rows.len())
    );
    println!("Results saved to: {}\n", cfg.peak_values_path.display());
    println!("Top 10 Crops by Average Peak Value:");
    output::preview_table_rows::<PeakValueRow>(&collected.rows, 10);
    Ok(())
}

fn handle_top_demand(cfg: &RunConfig) -> Result<()> {
    let (observations, obs_report) = loader::load_observations(&cfg.day_averages_path)?;
    let (thresholds, thr_report) = loader::load_thresholds(&cfg.peak_values_path)?;
    if obs_report.parse_errors + thr_report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse errors.",
            util::format_int(obs_report.parse_errors + thr_report.parse_errors)
        );
    }

    let report = reports::generate_top_demand(&observations, &thresholds, cfg.top_n);
    output::write_csv(
        &cfg.top_demand_path,
        &["crop", "daily_average", "peak_threshold"],
        &report.rows,
    )?;
    output::write_json(&cfg.summary_path, &report.summary)?;

    println!(
        "Wrote {}; top {} crops:",
        cfg.top_demand_path.display(),
        report.ranked.len()
    );
    for (i, r) in report.ranked.iter().enumerate() {
        println!(
            "{}. {} - daily avg: {}, threshold: {}",
            i + 1,
            r.display_name,
            util::format_number(r.observed_value, 3),
            util::format_number(r.threshold_value, 3)
        );
    }
    println!();
    output::preview_table_rows(&report.rows, cfg.top_n);
    Ok(())
}

fn run(cfg: &RunConfig) -> Result<()> {
    match cfg.command {
        Command::DayAverages => handle_day_averages(cfg),
        Command::PeakValues => handle_peak_values(cfg),
        Command::TopDemand => handle_top_demand(cfg),
        Command::All => {
            handle_day_averages(cfg)?;
            handle_peak_values(cfg)?;
            handle_top_demand(cfg)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_tracing(args.quiet);
    let cfg = RunConfig::from(&args);
    match run(&cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
