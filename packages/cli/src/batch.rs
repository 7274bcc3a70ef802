//! `batch <csv-path>`: resolve every address in a CSV file.
//!
//! The input CSV needs only an `address` column; any other columns are
//! ignored. Results are written as a JSON array to `--output`, or
//! summarized to stdout (resolved/unresolved counts per utility type)
//! when no output path is given.

use std::path::Path;

use serde::Deserialize;
use utility_lookup_cli_utils::{IndicatifProgress, MultiProgress, ProgressCallback};
use utility_lookup_models::LookupResult;

use crate::CliError;

#[derive(Debug, Deserialize)]
struct AddressRow {
    address: String,
}

fn read_addresses(csv_path: &Path) -> Result<Vec<String>, CliError> {
    let mut reader = csv::Reader::from_path(csv_path).map_err(|e| CliError::UserError(format!("failed to open {}: {e}", csv_path.display())))?;

    let mut addresses = Vec::new();
    for record in reader.deserialize::<AddressRow>() {
        let row = record.map_err(|e| CliError::UserError(format!("malformed row in {}: {e}", csv_path.display())))?;
        addresses.push(row.address);
    }
    Ok(addresses)
}

pub async fn run(csv_path: &Path, output: Option<&Path>, multi: &MultiProgress) -> Result<(), CliError> {
    let addresses = read_addresses(csv_path)?;
    if addresses.is_empty() {
        return Err(CliError::UserError(format!("{} has no address rows", csv_path.display())));
    }

    let engine = tokio::task::spawn_blocking(utility_lookup_server::engine::Engine::load)
        .await
        .map_err(|e| CliError::Internal(format!("engine loader task panicked: {e}")))??;

    let bar = IndicatifProgress::steps_bar(multi, "Resolving addresses", addresses.len() as u64);

    let mut results = Vec::with_capacity(addresses.len());
    for address in &addresses {
        results.push(engine.lookup(address, false).await);
        bar.inc(1);
    }
    bar.finish(format!("Resolved {} address(es)", results.len()));

    if let Some(output) = output {
        let json = serde_json::to_string_pretty(&results).map_err(|e| CliError::Internal(format!("failed to serialize results: {e}")))?;
        std::fs::write(output, json).map_err(|e| CliError::UserError(format!("failed to write {}: {e}", output.display())))?;
        println!("Wrote {} result(s) to {}", results.len(), output.display());
    } else {
        print_summary(&results);
    }

    Ok(())
}

fn print_summary(results: &[LookupResult]) {
    let resolved = |pick: fn(&LookupResult) -> bool| results.iter().filter(|r| pick(r)).count();

    println!("{} address(es) processed", results.len());
    println!("  electric resolved: {}", resolved(|r| r.electric.is_some()));
    println!("  gas resolved:      {}", resolved(|r| r.gas.is_some()));
    println!("  water resolved:    {}", resolved(|r| r.water.is_some()));
    println!("  sewer resolved:    {}", resolved(|r| r.sewer.is_some()));
}
