//! `lookup <address>`: resolve a single address and print the result as JSON.

use crate::CliError;

pub async fn run(address: &str, no_cache: bool) -> Result<(), CliError> {
    let engine = tokio::task::spawn_blocking(utility_lookup_server::engine::Engine::load)
        .await
        .map_err(|e| CliError::Internal(format!("engine loader task panicked: {e}")))??;

    let result = engine.lookup(address, no_cache).await;

    let json = serde_json::to_string_pretty(&result).map_err(|e| CliError::Internal(format!("failed to serialize result: {e}")))?;
    println!("{json}");

    Ok(())
}
