use crate::adapters::outbound::DEFAULT_NOMINATIM_URL;
use crate::domain::value_objects::{KeyNormalization, RadiusTiers};
use std::time::Duration;

/// Extra time the geocoding HTTP client gets beyond the resolver deadline.
const HTTP_TIMEOUT_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Config {
    // HTTP API
    pub listen_addr: String,
    pub debug: bool,

    // Geocoding
    pub geocoder_url: String,
    pub user_agent: String,
    pub geocode_timeout_secs: u64,
    pub geocode_min_interval_ms: u64,
    pub cache_path: Option<String>,
    pub cache_key_mode: KeyNormalization,

    // Vendor directory
    pub vendors_db_path: String,
    pub vendors_reload_secs: u64,
    pub radius_tiers: RadiusTiers,
}

impl Config {
    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_secs(self.geocode_timeout_secs)
    }

    /// Timeout for the geocoding HTTP client.
    ///
    /// Longer than the resolver deadline, so a slow upstream always ends as
    /// a resolver timeout rather than a transport error.
    pub fn geocode_http_timeout(&self) -> Duration {
        self.geocode_timeout() + HTTP_TIMEOUT_GRACE
    }

    pub fn geocode_min_interval(&self) -> Duration {
        Duration::from_millis(self.geocode_min_interval_ms)
    }
}

fn default_user_agent() -> String {
    concat!("vendor-locator/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            debug: false,
            geocoder_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: default_user_agent(),
            geocode_timeout_secs: 10,
            geocode_min_interval_ms: 1000,
            cache_path: None,
            cache_key_mode: KeyNormalization::Verbatim,
            vendors_db_path: "vendors.db".to_string(),
            vendors_reload_secs: 30,
            radius_tiers: RadiusTiers::directory(),
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let listen_addr = std::env::var("VENDORLOC_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let debug = std::env::var("DEBUG").is_ok();

    // Geocoding settings
    let geocoder_url = std::env::var("VENDORLOC_GEOCODER_URL")
        .unwrap_or_else(|_| DEFAULT_NOMINATIM_URL.to_string());

    let user_agent = std::env::var("VENDORLOC_USER_AGENT")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(default_user_agent);

    let geocode_timeout_secs = std::env::var("VENDORLOC_GEOCODE_TIMEOUT_SECS")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .unwrap_or(10);

    let geocode_min_interval_ms = std::env::var("VENDORLOC_GEOCODE_MIN_INTERVAL_MS")
        .unwrap_or_else(|_| "1000".to_string())
        .parse()
        .unwrap_or(1000);

    let cache_path = std::env::var("VENDORLOC_CACHE_PATH").ok();

    let cache_key_mode = std::env::var("VENDORLOC_CACHE_KEY_MODE")
        .map(|v| KeyNormalization::from_str(&v))
        .unwrap_or_default();

    // Vendor directory settings
    let vendors_db_path = std::env::var("VENDORLOC_VENDORS_DB_PATH")
        .unwrap_or_else(|_| "vendors.db".to_string());

    let vendors_reload_secs = std::env::var("VENDORLOC_VENDORS_RELOAD_SECS")
        .unwrap_or_else(|_| "30".to_string())
        .parse()
        .unwrap_or(30);

    let radius_tiers = match std::env::var("VENDORLOC_RADIUS_TIERS") {
        Ok(v) => v.parse().unwrap_or_else(|e| {
            tracing::warn!("ignoring VENDORLOC_RADIUS_TIERS={:?}: {}", v, e);
            RadiusTiers::directory()
        }),
        Err(_) => RadiusTiers::directory(),
    };

    Ok(Config {
        listen_addr,
        debug,
        geocoder_url,
        user_agent,
        geocode_timeout_secs,
        geocode_min_interval_ms,
        cache_path,
        cache_key_mode,
        vendors_db_path,
        vendors_reload_secs,
        radius_tiers,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-wide; serialize tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.geocoder_url, "https://nominatim.openstreetmap.org");
        assert!(cfg.user_agent.starts_with("vendor-locator/"));
        assert!(cfg.cache_path.is_none());
        assert_eq!(cfg.cache_key_mode, KeyNormalization::Verbatim);
        assert_eq!(cfg.radius_tiers, RadiusTiers::directory());
        assert_eq!(cfg.geocode_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.geocode_min_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_http_timeout_outlasts_resolver_deadline() {
        let cfg = Config {
            geocode_timeout_secs: 3,
            ..Config::default()
        };
        assert_eq!(cfg.geocode_timeout(), Duration::from_secs(3));
        assert!(cfg.geocode_http_timeout() > cfg.geocode_timeout());
        assert_eq!(cfg.geocode_http_timeout(), Duration::from_secs(4));
    }

    #[test]
    fn test_load_config_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("VENDORLOC_LISTEN_ADDR");
        std::env::remove_var("VENDORLOC_RADIUS_TIERS");
        std::env::remove_var("VENDORLOC_CACHE_KEY_MODE");

        let cfg = load_config().unwrap();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.radius_tiers.as_slice(), &[10, 25, 50, 100]);
        assert_eq!(cfg.cache_key_mode, KeyNormalization::Verbatim);
    }

    #[test]
    fn test_load_config_with_custom_listen_addr() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("VENDORLOC_LISTEN_ADDR", "127.0.0.1:9000");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
        std::env::remove_var("VENDORLOC_LISTEN_ADDR");
    }

    #[test]
    fn test_load_config_with_geocoder_settings() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("VENDORLOC_GEOCODER_URL", "http://localhost:7070");
        std::env::set_var("VENDORLOC_USER_AGENT", "funeral-planner/2.0 (ops@example.org)");
        std::env::set_var("VENDORLOC_GEOCODE_TIMEOUT_SECS", "3");
        std::env::set_var("VENDORLOC_GEOCODE_MIN_INTERVAL_MS", "0");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.geocoder_url, "http://localhost:7070");
        assert_eq!(cfg.user_agent, "funeral-planner/2.0 (ops@example.org)");
        assert_eq!(cfg.geocode_timeout_secs, 3);
        assert_eq!(cfg.geocode_min_interval_ms, 0);
        std::env::remove_var("VENDORLOC_GEOCODER_URL");
        std::env::remove_var("VENDORLOC_USER_AGENT");
        std::env::remove_var("VENDORLOC_GEOCODE_TIMEOUT_SECS");
        std::env::remove_var("VENDORLOC_GEOCODE_MIN_INTERVAL_MS");
    }

    #[test]
    fn test_load_config_blank_user_agent_uses_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("VENDORLOC_USER_AGENT", "  ");
        let cfg = load_config().unwrap();
        assert!(cfg.user_agent.starts_with("vendor-locator/"));
        std::env::remove_var("VENDORLOC_USER_AGENT");
    }

    #[test]
    fn test_load_config_with_cache_settings() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("VENDORLOC_CACHE_PATH", "/tmp/geocode.db");
        std::env::set_var("VENDORLOC_CACHE_KEY_MODE", "trim_lowercase");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.cache_path, Some("/tmp/geocode.db".to_string()));
        assert_eq!(cfg.cache_key_mode, KeyNormalization::TrimLowercase);
        std::env::remove_var("VENDORLOC_CACHE_PATH");
        std::env::remove_var("VENDORLOC_CACHE_KEY_MODE");
    }

    #[test]
    fn test_load_config_with_vendor_settings() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("VENDORLOC_VENDORS_DB_PATH", "/data/vendors.db");
        std::env::set_var("VENDORLOC_VENDORS_RELOAD_SECS", "120");
        std::env::set_var("VENDORLOC_RADIUS_TIERS", "75,150");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.vendors_db_path, "/data/vendors.db");
        assert_eq!(cfg.vendors_reload_secs, 120);
        assert_eq!(cfg.radius_tiers, RadiusTiers::fallback());
        std::env::remove_var("VENDORLOC_VENDORS_DB_PATH");
        std::env::remove_var("VENDORLOC_VENDORS_RELOAD_SECS");
        std::env::remove_var("VENDORLOC_RADIUS_TIERS");
    }

    #[test]
    fn test_load_config_invalid_tiers_uses_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("VENDORLOC_RADIUS_TIERS", "150,75");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.radius_tiers, RadiusTiers::directory());
        std::env::remove_var("VENDORLOC_RADIUS_TIERS");
    }

    #[test]
    fn test_load_config_parse_error_uses_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("VENDORLOC_VENDORS_RELOAD_SECS", "not_a_number");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.vendors_reload_secs, 30); // default
        std::env::remove_var("VENDORLOC_VENDORS_RELOAD_SECS");
    }

    #[test]
    fn test_load_config_with_debug() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("DEBUG", "1");
        let cfg = load_config().unwrap();
        assert!(cfg.debug);
        std::env::remove_var("DEBUG");
    }

    #[test]
    fn test_config_debug() {
        let cfg = Config::default();
        let debug_str = format!("{:?}", cfg);
        assert!(debug_str.contains("listen_addr"));
        assert!(debug_str.contains("0.0.0.0:8080"));
    }
}
