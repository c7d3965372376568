//! vendor-locator - Vendor discovery service with Hexagonal Architecture
//!
//! This is the composition root that wires together all the components.

use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use vendor_locator::adapters::inbound::{ApiServer, ApiState};
use vendor_locator::adapters::outbound::{
    DashMapGeocodeCache, NominatimConfig, NominatimGeocoder, SqliteGeocodeCache,
    SqliteVendorRepository,
};
use vendor_locator::infrastructure::{shutdown_signal, CancelHandle, Throttle};
use vendor_locator::{load_config, GeocodeCache, LocationResolver, VendorSearchService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting vendor-locator listen={} geocoder={} tiers={:?}",
        cfg.listen_addr,
        cfg.geocoder_url,
        cfg.radius_tiers.as_slice()
    );

    // ===== COMPOSITION ROOT =====
    // Wire up all adapters and services

    // 1. Create outbound adapters

    // Geocoder (Nominatim), paced to the service's usage policy
    let throttle = Arc::new(Throttle::new(cfg.geocode_min_interval()));
    let geocoder = NominatimGeocoder::new(NominatimConfig {
        base_url: cfg.geocoder_url.clone(),
        user_agent: cfg.user_agent.clone(),
        timeout: cfg.geocode_http_timeout(),
    })?
    .with_throttle(throttle);

    // Geocode cache (SQLite-backed when a path is configured)
    let persistent_cache = cfg.cache_path.as_ref().and_then(|path| {
        match SqliteGeocodeCache::open(path) {
            Ok(c) => {
                tracing::info!("geocode cache loaded from {} ({} entries)", path, c.len());
                Some(Arc::new(c))
            }
            Err(e) => {
                tracing::error!("failed to open geocode cache {}: {:?}", path, e);
                None
            }
        }
    });
    let cache: Arc<dyn GeocodeCache> = match &persistent_cache {
        Some(c) => c.clone() as Arc<dyn GeocodeCache>,
        None => Arc::new(DashMapGeocodeCache::new()),
    };

    // Vendor repository (SQLite)
    let vendor_repo = Arc::new(SqliteVendorRepository::new());
    vendor_repo.start_sync(cfg.vendors_db_path.clone(), cfg.vendors_reload_secs);

    // 2. Create application services
    let resolver = Arc::new(
        LocationResolver::new(Arc::new(geocoder), cache)
            .with_normalization(cfg.cache_key_mode)
            .with_deadline(cfg.geocode_timeout()),
    );
    let search = Arc::new(VendorSearchService::new(
        resolver,
        vendor_repo,
        cfg.radius_tiers.clone(),
    ));

    // 3. Shutdown wiring
    let shutdown = CancelHandle::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    // 4. Create inbound adapter and run
    let server = ApiServer::new(cfg.listen_addr.clone(), ApiState::new(search, shutdown));

    let result = server.run().await;

    // Let queued cache writes reach the file before exiting
    if let Some(cache) = persistent_cache {
        cache.flush().await;
    }

    result
}
