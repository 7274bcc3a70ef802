#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-state `ArcGIS` REST query layer.
//!
//! Each state publishes its own authoritative GIS layers for utility
//! territories (or, for a handful of states, no usable layer exists at
//! all, in which case a fixed name or coordinate-range lookup stands in).
//! [`client::StateGisClient`] dispatches to the right shape per
//! `(state, utility_type)`, backed by a circuit breaker so a flaky
//! endpoint degrades gracefully instead of stalling every lookup that
//! touches it.

pub mod circuit_breaker;
pub mod client;
pub mod config;
pub mod error;

pub use circuit_breaker::CircuitBreaker;
pub use client::{QueryResult, StateGisClient};
pub use config::{CoordinateRegion, EndpointConfig, EndpointRegistry, StateEndpoint};
pub use error::StateGisError;
