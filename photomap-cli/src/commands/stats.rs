//! Stats command - per-country table and map totals.

use std::path::PathBuf;

use console::style;
use photomap::store::CountryRecord;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the stats command.
pub fn run(runner: &CliRunner, data_dir: Option<PathBuf>) -> Result<(), CliError> {
    let data_dir = runner.data_dir(data_dir);
    let store = data_dir.load_store()?;
    let countries = data_dir.load_countries()?;

    println!("{}", style("Countries").bold().underlined());
    let mut records: Vec<&CountryRecord> = countries.iter().filter(|r| r.markers > 0).collect();
    records.sort_by(|a, b| b.photos.cmp(&a.photos).then_with(|| a.code.cmp(&b.code)));

    if records.is_empty() {
        println!("  (none)");
    }
    for record in records {
        println!(
            "  {:<4} {:<32} {:>7} markers {:>8} photos",
            record.code.as_str(),
            record.name,
            record.markers,
            record.photos
        );
    }

    println!();
    println!("{}", style("Totals").bold().underlined());
    println!("  Countries:  {}", store.country_count());
    println!("  Markers:    {}", store.marker_count());
    println!("  Photos:     {}", store.photo_count());
    let unresolved = store.unresolved_marker_count();
    if unresolved > 0 {
        println!(
            "  Unresolved: {}",
            style(format!("{} markers without a country", unresolved)).yellow()
        );
    }

    match data_dir.load_summary() {
        Some(summary) => println!(
            "  Updated:    {} (source total {})",
            summary.updated_at, summary.source_total
        ),
        None => println!("  Updated:    never"),
    }
    Ok(())
}
