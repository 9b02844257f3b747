//! Default command: sweep, persist, plot.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use qecost_engine::{
    ExportConfig, PLOT_RENDER_NOTE, Sweep, SweepResults, load_results, save_results, write_plots,
};

use super::common::load_config;

/// Execute the sweep-and-plot command.
pub fn execute(config: Option<&Path>, results_path: &Path, output_dir: &Path, force: bool) -> Result<()> {
    let results = if results_path.exists() && !force {
        println!(
            "{} Loading existing results from {}",
            style("→").cyan().bold(),
            style(results_path.display()).green()
        );
        load_results(results_path)
            .with_context(|| format!("Failed to load results: {}", results_path.display()))?
    } else {
        let results = run_sweep(config)?;
        save_results(&results, results_path, &ExportConfig::default())?;
        println!(
            "{} Results saved to {}",
            style("✓").green().bold(),
            style(results_path.display()).green()
        );
        results
    };

    print_summary(&results);

    let written = write_plots(&results, output_dir)
        .with_context(|| format!("Failed to write plots to {}", output_dir.display()))?;
    for path in written {
        println!("  Plot: {}", style(path.display()).green());
    }
    println!("{} {}", style("i").blue().bold(), PLOT_RENDER_NOTE);
    Ok(())
}

/// Run the configured sweep with a progress bar.
pub fn run_sweep(config: Option<&Path>) -> Result<SweepResults> {
    let config = load_config(config)?;
    println!(
        "{} Sweeping distances {:?} over {} error rates ({} shots each)",
        style("→").cyan().bold(),
        config.distances,
        config.physical_error_rates.len(),
        config.shots
    );

    let sweep = Sweep::new(config)?;
    let bar = ProgressBar::new(sweep.config().num_points() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} points ({elapsed})")?
            .progress_chars("=> "),
    );
    let outcome = sweep.run_with_progress(|done, _| bar.set_position(done as u64));
    bar.finish_and_clear();

    if !outcome.failures.is_empty() {
        for failure in &outcome.failures {
            warn!(
                distance = failure.distance,
                p = failure.physical_error_rate,
                "{}",
                failure.message
            );
        }
        println!(
            "{} {} of {} points failed",
            style("!").yellow().bold(),
            outcome.failures.len(),
            outcome.failures.len() + outcome.points.len()
        );
    }
    if outcome.all_failed() {
        anyhow::bail!("Every sweep configuration failed");
    }

    Ok(outcome.to_results()?)
}

fn print_summary(results: &SweepResults) {
    println!();
    println!(
        "  {:>4}  {:>12}  {:>14}  {:>14}",
        style("d").bold(),
        style("p").bold(),
        style("logical rate").bold(),
        style("energy/shot").bold()
    );
    for (distance, series) in results {
        for i in 0..series.len() {
            println!(
                "  {:>4}  {:>12.3e}  {:>14.3e}  {:>14.1}",
                distance, series.p[i], series.logical_error_rate[i], series.energy[i]
            );
        }
    }
    println!();
}
