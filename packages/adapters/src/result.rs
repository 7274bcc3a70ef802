use serde::{Deserialize, Serialize};

/// The uniform result shape every tabular adapter returns, so the
/// pipeline can fold them into one candidate pool without per-adapter
/// special-casing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterResult {
    pub name: String,
    pub source: String,
    pub confidence: f64,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl AdapterResult {
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            confidence,
            state: None,
            phone: None,
            website: None,
        }
    }

    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}
