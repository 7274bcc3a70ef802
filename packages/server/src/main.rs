#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone binary entry point for the utility lookup HTTP API.
//! `utility_lookup_cli serve` delegates to [`utility_lookup_server::run_server`]
//! directly rather than duplicating this wiring.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    utility_lookup_server::run_server().await
}
