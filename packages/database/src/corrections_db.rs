//! Operator-entered corrections storage in `DuckDB`.
//!
//! Two independent tables: `corrections` (address/ZIP -> provider,
//! authoritative over every other source per C4's `CorrectionsAdapter`)
//! and `id_mapping_corrections` (engine display name -> catalog ID,
//! consulted by C6's override step).

use std::path::Path;

use chrono::{DateTime, Utc};
use duckdb::Connection;
use utility_lookup_models::{Correction, IdMappingCorrection, UtilityType};

use crate::DbError;

/// Opens (or creates) the corrections `DuckDB`.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    if let Some(parent) = path.parent() {
        crate::paths::ensure_dir(parent)?;
    }
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Opens the corrections DB at the default path.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open_default() -> Result<Connection, DbError> {
    open(&crate::paths::corrections_db_path())
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE SEQUENCE IF NOT EXISTS corrections_id_seq START 1;
         CREATE TABLE IF NOT EXISTS corrections (
            id BIGINT PRIMARY KEY DEFAULT nextval('corrections_id_seq'),
            address TEXT,
            lat DOUBLE,
            lon DOUBLE,
            zip TEXT,
            state TEXT NOT NULL,
            utility_type TEXT NOT NULL,
            corrected_provider TEXT NOT NULL,
            corrected_catalog_id INTEGER,
            original_provider TEXT,
            corrected_by TEXT NOT NULL,
            corrected_at TIMESTAMPTZ NOT NULL,
            notes TEXT
         );

         CREATE TABLE IF NOT EXISTS id_mapping_corrections (
            engine_provider_name TEXT NOT NULL,
            utility_type TEXT NOT NULL,
            correct_catalog_id INTEGER NOT NULL,
            PRIMARY KEY (engine_provider_name, utility_type)
         );",
    )?;
    Ok(())
}

/// Inserts a new correction, appended (never replacing an existing row)
/// so the most-recently-entered correction can win ties by recency, as
/// `CorrectionsAdapter` expects.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub fn insert_correction(conn: &Connection, correction: &Correction) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO corrections
            (address, lat, lon, zip, state, utility_type, corrected_provider,
             corrected_catalog_id, original_provider, corrected_by, corrected_at, notes)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        duckdb::params![
            correction.address,
            correction.lat,
            correction.lon,
            correction.zip,
            correction.state,
            correction.utility_type.to_string(),
            correction.corrected_provider,
            correction.corrected_catalog_id,
            correction.original_provider,
            correction.corrected_by,
            correction.corrected_at,
            correction.notes,
        ],
    )?;
    Ok(())
}

/// Loads every correction, in insertion order, for [`AdapterSet`]'s
/// startup wiring (`utility_lookup_adapters::CorrectionsAdapter::new`
/// relies on this order to let later entries win).
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row's `utility_type` is
/// unrecognized.
pub fn load_corrections(conn: &Connection) -> Result<Vec<Correction>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT address, lat, lon, zip, state, utility_type, corrected_provider,
                corrected_catalog_id, original_provider, corrected_by, corrected_at, notes
         FROM corrections ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        let utility_type_str: String = row.get(5)?;
        let corrected_at: DateTime<Utc> = row.get(10)?;
        Ok(Correction {
            address: row.get(0)?,
            lat: row.get(1)?,
            lon: row.get(2)?,
            zip: row.get(3)?,
            state: row.get(4)?,
            utility_type: parse_utility_type(&utility_type_str),
            corrected_provider: row.get(6)?,
            corrected_catalog_id: row.get(7)?,
            original_provider: row.get(8)?,
            corrected_by: row.get(9)?,
            corrected_at,
            notes: row.get(11)?,
        })
    })?;

    let mut corrections = Vec::new();
    for row in rows {
        corrections.push(row?);
    }
    Ok(corrections)
}

/// Upserts a catalog ID mapping override, replacing any existing override
/// for the same `(engine_provider_name, utility_type)` pair.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub fn upsert_id_mapping(
    conn: &Connection,
    mapping: &IdMappingCorrection,
) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO id_mapping_corrections (engine_provider_name, utility_type, correct_catalog_id)
         VALUES (?, ?, ?)
         ON CONFLICT (engine_provider_name, utility_type)
         DO UPDATE SET correct_catalog_id = excluded.correct_catalog_id",
        duckdb::params![
            mapping.engine_provider_name,
            mapping.utility_type.to_string(),
            mapping.correct_catalog_id,
        ],
    )?;
    Ok(())
}

/// Loads every catalog ID mapping override for [`ProviderIdMatcher`]'s
/// startup wiring.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row's `utility_type` is
/// unrecognized.
pub fn load_id_mappings(conn: &Connection) -> Result<Vec<IdMappingCorrection>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT engine_provider_name, utility_type, correct_catalog_id FROM id_mapping_corrections",
    )?;

    let rows = stmt.query_map([], |row| {
        let utility_type_str: String = row.get(1)?;
        Ok(IdMappingCorrection {
            engine_provider_name: row.get(0)?,
            utility_type: parse_utility_type(&utility_type_str),
            correct_catalog_id: row.get(2)?,
        })
    })?;

    let mut mappings = Vec::new();
    for row in rows {
        mappings.push(row?);
    }
    Ok(mappings)
}

/// Falls back to `Electric` for a value that somehow isn't one of the six
/// stored type strings; schema and the `UtilityType` enum are kept in
/// lockstep, so this only guards against manual table edits.
fn parse_utility_type(raw: &str) -> UtilityType {
    raw.parse().unwrap_or(UtilityType::Electric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_correction() -> Correction {
        Correction {
            address: Some("123 Main St".to_string()),
            lat: None,
            lon: None,
            zip: None,
            state: "TX".to_string(),
            utility_type: UtilityType::Electric,
            corrected_provider: "Oncor".to_string(),
            corrected_catalog_id: Some(3),
            original_provider: Some("CenterPoint".to_string()),
            corrected_by: "ops@example.com".to_string(),
            corrected_at: Utc::now(),
            notes: None,
        }
    }

    #[test]
    fn insert_then_load_round_trips_in_insertion_order() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();

        insert_correction(&conn, &sample_correction()).unwrap();
        let loaded = load_corrections(&conn).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].corrected_provider, "Oncor");
        assert_eq!(loaded[0].utility_type, UtilityType::Electric);
    }

    #[test]
    fn id_mapping_upsert_replaces_existing_override() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();

        let mapping = IdMappingCorrection {
            engine_provider_name: "Weird OCR Name".to_string(),
            utility_type: UtilityType::Gas,
            correct_catalog_id: 10,
        };
        upsert_id_mapping(&conn, &mapping).unwrap();
        upsert_id_mapping(
            &conn,
            &IdMappingCorrection {
                correct_catalog_id: 20,
                ..mapping
            },
        )
        .unwrap();

        let loaded = load_id_mappings(&conn).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].correct_catalog_id, 20);
    }
}
