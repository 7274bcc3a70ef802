use std::collections::BTreeMap;

use crate::error::ScorerError;

/// Names curated as ERCOT transmission/distribution utilities (TDUs) — the
/// wires-only companies a deregulated Texas electric lookup must resolve
/// to, in priority order when more than one territory polygon overlaps a
/// point.
pub struct TduPriority {
    priority: BTreeMap<String, u32>,
}

impl TduPriority {
    /// # Errors
    ///
    /// Returns [`ScorerError::Json`] if `raw` is malformed.
    pub fn from_json(raw: &str) -> Result<Self, ScorerError> {
        Ok(Self {
            priority: serde_json::from_str(raw)?,
        })
    }

    /// # Panics
    ///
    /// Panics if the embedded table is malformed (validated at build time).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json(include_str!("../data/tdu_priority.json"))
            .expect("embedded TDU priority table must be valid JSON")
    }

    #[must_use]
    pub fn is_tdu(&self, name: &str) -> bool {
        self.priority.contains_key(name)
    }

    /// Lower is higher priority; `None` for names outside the curated list.
    #[must_use]
    pub fn rank(&self, name: &str) -> Option<u32> {
        self.priority.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centerpoint_outranks_oncor() {
        let table = TduPriority::embedded();
        assert!(table.rank("CenterPoint Energy") < table.rank("Oncor Electric Delivery Company LLC"));
    }

    #[test]
    fn lubbock_is_a_recognized_tdu() {
        let table = TduPriority::embedded();
        assert!(table.is_tdu("City of Lubbock - (TX)"));
    }

    #[test]
    fn unknown_name_has_no_rank() {
        let table = TduPriority::embedded();
        assert!(table.rank("Some Random Co-op").is_none());
    }
}
