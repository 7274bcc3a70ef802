//! Geocoded address context a single resolution call operates over.

/// Everything the candidate-collection chain needs about the address
/// being resolved, already geocoded.
#[derive(Debug, Clone)]
pub struct ResolveContext<'a> {
    pub raw_address: &'a str,
    pub lat: f64,
    pub lon: f64,
    pub state: &'a str,
    pub zip: &'a str,
    pub city: &'a str,
    pub county: &'a str,
}
