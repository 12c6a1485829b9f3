//! Update command - merge newly exported photos into the map.

use std::path::PathBuf;

use console::style;
use photomap::geocode::CountryResolver;
use photomap::run::{update, RunOutcome, RunStats};
use photomap::source::JsonExportSource;
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the update command.
pub struct UpdateArgs {
    pub photos: PathBuf,
    pub total: Option<u64>,
    pub data_dir: Option<PathBuf>,
    pub no_grid_learning: bool,
}

/// Run the update command.
pub fn run(runner: &CliRunner, args: UpdateArgs) -> Result<(), CliError> {
    runner.log_startup("update");
    let config = runner.config();

    let data_dir = runner.data_dir(args.data_dir);
    let resolution = runner.grid_resolution()?;

    let mut resolver_config = config.geocode.resolver_config();
    if args.no_grid_learning {
        resolver_config = resolver_config.with_trust_grid_learning(false);
    }
    let mut resolver = CountryResolver::new(runner.create_authority()?, resolver_config);

    let source = JsonExportSource::new(&args.photos).with_total(args.total);
    let options = config.source.run_options();

    info!(
        photos = %args.photos.display(),
        data_dir = %data_dir.root().display(),
        "Starting update"
    );

    let result = update(
        &data_dir,
        resolution,
        &source,
        &mut resolver,
        &options,
        &mut rand::rng(),
    )?;

    print_report(&result.stats);
    Ok(())
}

fn print_report(stats: &RunStats) {
    match stats.outcome() {
        RunOutcome::NoOp => {
            println!(
                "{} Photo total unchanged ({}), nothing to do",
                style("✓").green(),
                stats.plan.current_total
            );
            return;
        }
        RunOutcome::FullReset => {
            println!(
                "{}",
                style(format!(
                    "Photo total dropped from {} to {}, map rebuilt",
                    stats.plan.previous_total, stats.plan.current_total
                ))
                .yellow()
            );
        }
        RunOutcome::Incremental => {}
    }

    println!("{}", style("Update").bold().underlined());
    println!("  Fetched:        {}", stats.fetched);
    let skipped = stats.filter.skipped();
    if skipped > 0 {
        println!(
            "  Skipped:        {} ({} not geotagged, {} privacy, {} tagged, {} invalid)",
            skipped,
            stats.filter.not_geotagged,
            stats.filter.privacy_mismatch,
            stats.filter.excluded_by_tag,
            stats.filter.invalid_coordinate
        );
    }
    println!(
        "  New markers:    {} ({} photos)",
        stats.new_markers, stats.new_photos
    );
    println!("  Added photos:   {}", stats.appended_photos);
    if stats.unresolved_markers > 0 {
        println!(
            "  Unresolved:     {}",
            style(stats.unresolved_markers).yellow()
        );
    }
    println!(
        "  Geocoding:      {} cached, {} grid, {} looked up, {} failed",
        stats.resolver.coordinate_hits,
        stats.resolver.grid_hits,
        stats.resolver.authority_lookups,
        stats.resolver.authority_failures
    );

    println!();
    println!(
        "{} {} markers, {} photos in {} countries",
        style("✓").green(),
        stats.total_markers,
        stats.total_photos,
        stats.total_countries
    );
}
