#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tabular utility provider lookup adapters.
//!
//! Each adapter is a narrow, pure lookup over a table loaded once at
//! startup. They share [`result::AdapterResult`] so the resolution
//! pipeline (C7) can fold every adapter's output into one candidate pool
//! without per-adapter special-casing.

pub mod corrections;
pub mod county_gas;
pub mod eia_zip;
pub mod findenergy_city;
pub mod gas_zip;
pub mod georgia_emc;
pub mod remaining_states_zip;
pub mod result;
pub mod special_districts;
pub mod state_gas_default;

pub use corrections::CorrectionsAdapter;
pub use county_gas::CountyGasAdapter;
pub use eia_zip::EiaZipAdapter;
pub use findenergy_city::FindEnergyCityAdapter;
pub use gas_zip::GasZipAdapter;
pub use georgia_emc::GeorgiaEmcAdapter;
pub use remaining_states_zip::RemainingStatesZipAdapter;
pub use result::AdapterResult;
pub use special_districts::SpecialDistrictsAdapter;
pub use state_gas_default::StateGasDefaultAdapter;

/// Every adapter bundled together with its embedded table, for
/// convenient construction by the pipeline and the CLI/server startup
/// code.
pub struct AdapterSet {
    pub corrections: CorrectionsAdapter,
    pub gas_zip: GasZipAdapter,
    pub georgia_emc: GeorgiaEmcAdapter,
    pub county_gas: CountyGasAdapter,
    pub remaining_states_zip: RemainingStatesZipAdapter,
    pub special_districts: SpecialDistrictsAdapter,
    pub eia_zip: EiaZipAdapter,
    pub findenergy_city: FindEnergyCityAdapter,
    pub state_gas_default: StateGasDefaultAdapter,
}

impl AdapterSet {
    #[must_use]
    pub fn embedded(corrections: Vec<utility_lookup_models::Correction>) -> Self {
        Self {
            corrections: CorrectionsAdapter::new(corrections),
            gas_zip: GasZipAdapter::embedded(),
            georgia_emc: GeorgiaEmcAdapter::embedded(),
            county_gas: CountyGasAdapter::embedded(),
            remaining_states_zip: RemainingStatesZipAdapter::embedded(),
            special_districts: SpecialDistrictsAdapter::embedded(),
            eia_zip: EiaZipAdapter::embedded(),
            findenergy_city: FindEnergyCityAdapter::embedded(),
            state_gas_default: StateGasDefaultAdapter::embedded(),
        }
    }
}
