//! Utility territory polygon storage in `DuckDB`.
//!
//! One table per utility type that has its own territory geometry
//! (electric, gas, water); sewer, trash, and internet have no polygons of
//! their own (see C2/C7). [`utility_lookup_spatial::SpatialIndex::load`]
//! reads these tables directly.

use std::path::Path;

use duckdb::Connection;

use crate::DbError;

/// Opens (or creates) the territories `DuckDB` and ensures schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    if let Some(parent) = path.parent() {
        crate::paths::ensure_dir(parent)?;
    }

    let conn = Connection::open(path)?;
    conn.execute_batch("SET threads = 4; SET memory_limit = '1GB';")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Opens the territories DB at the default path.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open_default() -> Result<Connection, DbError> {
    open(&crate::paths::territories_db_path())
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    for table in ["electric_territories", "gas_territories", "water_territories"] {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                name TEXT NOT NULL,
                state TEXT NOT NULL,
                shape_type TEXT NOT NULL,
                area_km2 DOUBLE,
                customers BIGINT,
                eia_id BIGINT,
                control_area TEXT,
                pwsid TEXT,
                holding_company TEXT,
                source TEXT NOT NULL,
                geojson TEXT
            );"
        ))?;
    }
    Ok(())
}

/// One territory polygon row, as written by the boundary ingestion job.
pub struct TerritoryRow {
    pub name: String,
    pub state: String,
    pub shape_type: String,
    pub area_km2: Option<f64>,
    pub customers: Option<i64>,
    pub eia_id: Option<i64>,
    pub control_area: Option<String>,
    pub pwsid: Option<String>,
    pub holding_company: Option<String>,
    pub source: String,
    pub geojson: String,
}

/// Replaces every row of `table` (one of `electric_territories`,
/// `gas_territories`, `water_territories`) with `rows`. Ingestion runs are
/// idempotent full refreshes, not incremental upserts: HIFLD publishes a
/// complete snapshot each cycle, so a partial merge would leave stale
/// polygons behind.
///
/// # Errors
///
/// Returns [`DbError`] if the table name is unrecognized or any statement
/// fails.
pub fn replace_all(conn: &Connection, table: &str, rows: &[TerritoryRow]) -> Result<(), DbError> {
    if !matches!(
        table,
        "electric_territories" | "gas_territories" | "water_territories"
    ) {
        return Err(DbError::InvalidTable(table.to_string()));
    }

    conn.execute_batch(&format!("DELETE FROM {table};"))?;

    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {table} (name, state, shape_type, area_km2, customers, eia_id, \
         control_area, pwsid, holding_company, source, geojson) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))?;

    for row in rows {
        stmt.execute(duckdb::params![
            row.name,
            row.state,
            row.shape_type,
            row.area_km2,
            row.customers,
            row.eia_id,
            row.control_area,
            row.pwsid,
            row.holding_company,
            row.source,
            row.geojson,
        ])?;
    }

    Ok(())
}

/// Counts the rows currently stored for `table`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn count(conn: &Connection, table: &str) -> Result<u64, DbError> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_all_rejects_unknown_table() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        let err = replace_all(&conn, "not_a_real_table", &[]).unwrap_err();
        assert!(matches!(err, DbError::InvalidTable(_)));
    }

    #[test]
    fn replace_all_then_count_round_trips() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();

        let rows = vec![TerritoryRow {
            name: "ComEd".to_string(),
            state: "IL".to_string(),
            shape_type: "INVESTOR OWNED".to_string(),
            area_km2: Some(100.0),
            customers: Some(4_000_000),
            eia_id: Some(1004),
            control_area: Some("PJM".to_string()),
            pwsid: None,
            holding_company: Some("Exelon".to_string()),
            source: "hifld".to_string(),
            geojson: r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}"#
                .to_string(),
        }];

        replace_all(&conn, "electric_territories", &rows).unwrap();
        assert_eq!(count(&conn, "electric_territories").unwrap(), 1);
    }
}
