#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index for utility territory attribution.
//!
//! Loads electric, gas, and water territory polygons from `DuckDB` at
//! startup, builds one R-tree per utility type, and answers
//! point-in-polygon queries sorted by non-decreasing polygon area so
//! callers can prefer the most specific (smallest) overlapping territory
//! first.

use geo::{Contains, MultiPolygon};
use geojson::GeoJson;
use rstar::{AABB, RTree, RTreeObject};
use utility_lookup_models::{TerritoryPolygon, UtilityType};

/// A territory polygon stored in the R-tree with its metadata.
struct BoundaryEntry {
    meta: TerritoryPolygon,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for BoundaryEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// A territory that contains the queried point, returned with its
/// containing polygon's area so callers can break overlap ties.
#[derive(Debug, Clone)]
pub struct TerritoryHit {
    pub meta: TerritoryPolygon,
}

/// Pre-built per-utility-type spatial indexes.
///
/// Constructed once at startup and shared across all lookups via `Arc`.
pub struct SpatialIndex {
    electric: RTree<BoundaryEntry>,
    gas: RTree<BoundaryEntry>,
    water: RTree<BoundaryEntry>,
}

impl SpatialIndex {
    /// Loads polygons from the boundaries `DuckDB` and builds the three
    /// R-tree indexes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database queries or `GeoJSON` parsing fail.
    pub fn load(conn: &duckdb::Connection) -> Result<Self, Box<dyn std::error::Error>> {
        let electric = Self::load_utility_type(conn, "electric_territories")?;
        log::info!(
            "Loaded {} electric territories into spatial index",
            electric.size()
        );

        let gas = Self::load_utility_type(conn, "gas_territories")?;
        log::info!("Loaded {} gas territories into spatial index", gas.size());

        let water = Self::load_utility_type(conn, "water_territories")?;
        log::info!(
            "Loaded {} water territories into spatial index",
            water.size()
        );

        Ok(Self {
            electric,
            gas,
            water,
        })
    }

    fn load_utility_type(
        conn: &duckdb::Connection,
        table: &str,
    ) -> Result<RTree<BoundaryEntry>, Box<dyn std::error::Error>> {
        let query = format!(
            "SELECT name, state, shape_type, area_km2, customers, eia_id, \
             control_area, pwsid, holding_company, source, geojson \
             FROM {table} WHERE geojson IS NOT NULL"
        );
        let mut stmt = conn.prepare(&query)?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let state: String = row.get(1)?;
            let shape_type: String = row.get(2)?;
            let area_km2: f64 = row.get::<_, Option<f64>>(3)?.unwrap_or(f64::MAX);
            let customers: Option<i64> = row.get(4)?;
            let eia_id: Option<i64> = row.get(5)?;
            let control_area: Option<String> = row.get(6)?;
            let pwsid: Option<String> = row.get(7)?;
            let holding_company: Option<String> = row.get(8)?;
            let source: String = row.get(9)?;
            let geojson_str: String = row.get(10)?;

            if name.is_empty() || geojson_str.is_empty() {
                continue;
            }

            let Some(multi_polygon) = parse_geojson_to_multipolygon(&geojson_str) else {
                log::warn!("Failed to parse GeoJSON for territory {name} ({state})");
                continue;
            };

            let envelope = compute_envelope(&multi_polygon);

            entries.push(BoundaryEntry {
                meta: TerritoryPolygon {
                    name,
                    state,
                    shape_type,
                    area_km2,
                    customers: customers.and_then(|c| u64::try_from(c).ok()),
                    eia_id: eia_id.and_then(|e| u32::try_from(e).ok()),
                    control_area,
                    pwsid,
                    holding_company,
                    source,
                },
                envelope,
                polygon: multi_polygon,
            });
        }

        Ok(RTree::bulk_load(entries))
    }

    fn tree_for(&self, utility_type: UtilityType) -> Option<&RTree<BoundaryEntry>> {
        match utility_type {
            UtilityType::Electric => Some(&self.electric),
            UtilityType::Gas => Some(&self.gas),
            UtilityType::Water => Some(&self.water),
            // Sewer, trash, and internet have no territory polygons of
            // their own; sewer is inherited from water (see C7), the
            // others have no spatial source.
            UtilityType::Sewer | UtilityType::Trash | UtilityType::Internet => None,
        }
    }

    /// Returns every territory polygon containing `(lon, lat)` for
    /// `utility_type`, sorted by non-decreasing area so the most specific
    /// (smallest) candidate comes first.
    #[must_use]
    pub fn query(&self, utility_type: UtilityType, lon: f64, lat: f64) -> Vec<TerritoryHit> {
        let Some(tree) = self.tree_for(utility_type) else {
            return Vec::new();
        };

        let point = geo::Point::new(lon, lat);
        let query_env = AABB::from_point([lon, lat]);

        let mut hits: Vec<TerritoryHit> = tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.contains(&point))
            .map(|entry| TerritoryHit {
                meta: entry.meta.clone(),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.meta
                .area_km2
                .partial_cmp(&b.meta.area_km2)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        hits
    }
}

/// Parse a `GeoJSON` string into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn parse_geojson_to_multipolygon(geojson_str: &str) -> Option<MultiPolygon<f64>> {
    let geojson: GeoJson = geojson_str.parse().ok()?;
    if let GeoJson::Geometry(geom) = geojson {
        let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
        match geo_geom {
            geo::Geometry::MultiPolygon(mp) => Some(mp),
            geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
            _ => None,
        }
    } else {
        None
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    use geo::BoundingRect;

    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_geojson(min: f64, max: f64) -> String {
        format!(
            r#"{{"type":"Polygon","coordinates":[[[{min},{min}],[{max},{min}],[{max},{max}],[{min},{max}],[{min},{min}]]]}}"#
        )
    }

    #[test]
    fn parses_polygon_and_multipolygon_geojson() {
        let poly = parse_geojson_to_multipolygon(&square_geojson(0.0, 1.0));
        assert!(poly.is_some());

        let multi = parse_geojson_to_multipolygon(
            r#"{"type":"MultiPolygon","coordinates":[[[[0,0],[1,0],[1,1],[0,1],[0,0]]]]}"#,
        );
        assert!(multi.is_some());
    }

    #[test]
    fn rejects_non_polygon_geojson() {
        assert!(parse_geojson_to_multipolygon(r#"{"type":"Point","coordinates":[0,0]}"#).is_none());
    }
}
