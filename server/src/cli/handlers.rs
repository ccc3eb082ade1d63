// server/src/cli/handlers.rs

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use lib::{AllocationEngine, AppConfig, DataInitializer};

pub async fn handle_serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    seed: bool,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let engine = Arc::new(AllocationEngine::from_config(&config)?);
    if seed || config.seed.enabled {
        DataInitializer::new(&engine).run().await?;
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("[Server] failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
        info!("[Server] shutdown signal received");
    };
    rest_api::serve(&config.server, engine, shutdown).await
}

pub async fn handle_seed(config: AppConfig) -> Result<()> {
    let engine = AllocationEngine::from_config(&config)?;
    let report = DataInitializer::new(&engine).run().await?;
    println!(
        "Seeded {} specialty groups, {} specialties, {} hospitals, {} beds ({} storage)",
        report.groups_created,
        report.specialties_created,
        report.hospitals_created,
        report.beds_created,
        config.storage.engine
    );
    Ok(())
}

/// One-shot commands seed first when configured to, so an in-memory store is usable.
async fn one_shot_engine(config: &AppConfig) -> Result<AllocationEngine> {
    let engine = AllocationEngine::from_config(config)?;
    if config.seed.enabled {
        DataInitializer::new(&engine).run().await?;
    } else if engine.is_empty().await? {
        warn!("[Server] store is empty; run `seed` or enable seed.enabled");
    }
    Ok(engine)
}

pub async fn handle_allocate(config: AppConfig, lat: f64, lon: f64, specialty: &str) -> Result<()> {
    let engine = one_shot_engine(&config).await?;
    let allocation = engine
        .allocate_for_emergency(lat, lon, specialty)
        .await
        .with_context(|| format!("allocation for {} at [{}, {}] failed", specialty, lat, lon))?;
    println!("{}", serde_json::to_string_pretty(&allocation)?);
    Ok(())
}

pub async fn handle_search(
    config: AppConfig,
    lat: f64,
    lon: f64,
    specialty: &str,
    limit: Option<usize>,
    radius_km: Option<f64>,
) -> Result<()> {
    let engine = one_shot_engine(&config).await?;
    let found = match radius_km {
        Some(max_km) => engine.search_within_radius(lat, lon, specialty, max_km, limit).await?,
        None => engine.search_nearest_with_availability(lat, lon, specialty, limit).await?,
    };
    if found.is_empty() {
        println!("No hospital with an available {} bed", specialty);
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib::StorageConfig;

    #[tokio::test]
    async fn seed_then_allocate_on_sled() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            storage: StorageConfig::sled(dir.path()),
            ..AppConfig::default()
        };
        handle_seed(config.clone()).await.unwrap();
        handle_allocate(config.clone(), 53.48, -2.24, "EMER").await.unwrap();
        handle_search(config, 53.48, -2.24, "GENM", Some(2), None).await.unwrap();
    }

    #[tokio::test]
    async fn allocate_on_an_empty_store_fails() {
        let err = handle_allocate(AppConfig::default(), 51.5, -0.12, "CARD").await.unwrap_err();
        assert!(err.to_string().contains("CARD"));
    }
}
