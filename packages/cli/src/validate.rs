//! `validate <tenant-csv>`: resolve every tenant address and classify how
//! well the engine's answer agrees with the tenant-reported ground truth.
//!
//! Expected columns: `address, state, electric, gas, water, sewer`. Missing
//! utility columns are treated as blank (compared as [`Category::BothEmpty`]
//! or [`Category::EngineOnly`]).

use std::path::Path;

use serde::Deserialize;
use utility_lookup_cli_utils::{IndicatifProgress, MultiProgress, ProgressCallback};
use utility_lookup_normalizer::{CanonicalIndex, embedded_rep_ids};
use utility_lookup_validator::Category;
use utility_lookup_validator::batch::{TenantRecord, tally, validate_row};

use crate::CliError;

#[derive(Debug, Deserialize)]
struct TenantRow {
    address: String,
    state: String,
    #[serde(default)]
    electric: String,
    #[serde(default)]
    gas: String,
    #[serde(default)]
    water: String,
    #[serde(default)]
    sewer: String,
}

impl From<TenantRow> for TenantRecord {
    fn from(row: TenantRow) -> Self {
        Self {
            address: row.address,
            state: row.state,
            electric: row.electric,
            gas: row.gas,
            water: row.water,
            sewer: row.sewer,
        }
    }
}

fn read_tenant_records(csv_path: &Path) -> Result<Vec<TenantRecord>, CliError> {
    let mut reader = csv::Reader::from_path(csv_path).map_err(|e| CliError::UserError(format!("failed to open {}: {e}", csv_path.display())))?;

    let mut records = Vec::new();
    for row in reader.deserialize::<TenantRow>() {
        let row = row.map_err(|e| CliError::UserError(format!("malformed row in {}: {e}", csv_path.display())))?;
        records.push(row.into());
    }
    Ok(records)
}

pub async fn run(csv_path: &Path, multi: &MultiProgress) -> Result<(), CliError> {
    let tenants = read_tenant_records(csv_path)?;
    if tenants.is_empty() {
        return Err(CliError::UserError(format!("{} has no tenant rows", csv_path.display())));
    }

    let engine = tokio::task::spawn_blocking(utility_lookup_server::engine::Engine::load)
        .await
        .map_err(|e| CliError::Internal(format!("engine loader task panicked: {e}")))??;

    let index = CanonicalIndex::embedded().map_err(|e| CliError::Internal(format!("failed to load canonical provider table: {e}")))?;
    let rep_ids = embedded_rep_ids().map_err(|e| CliError::Internal(format!("failed to load retail provider ids: {e}")))?;

    let bar = IndicatifProgress::steps_bar(multi, "Validating tenant addresses", tenants.len() as u64);

    let mut rows = Vec::with_capacity(tenants.len());
    for tenant in &tenants {
        let engine_result = engine.lookup(&tenant.address, false).await;
        rows.push(validate_row(&index, &rep_ids, &engine_result, tenant));
        bar.inc(1);
    }
    bar.finish(format!("Validated {} address(es)", rows.len()));

    let counts = tally(&rows);
    println!();
    println!("{:<14} {:>6}", "category", "count");
    for category in [
        Category::Match,
        Category::MatchTdu,
        Category::MatchParent,
        Category::MatchAlt,
        Category::Mismatch,
        Category::EngineOnly,
        Category::TenantOnly,
        Category::BothEmpty,
        Category::TenantNull,
        Category::TenantPropane,
    ] {
        println!("{category:<14} {:>6}", counts.get(&category).copied().unwrap_or(0));
    }

    Ok(())
}
