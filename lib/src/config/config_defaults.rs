// lib/src/config/config_defaults.rs

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SEARCH_LIMIT: usize = crate::search::DEFAULT_SEARCH_LIMIT;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const ENV_PREFIX: &str = "BEDALLOC";
pub const ENV_SEPARATOR: &str = "__";

pub fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

pub fn default_port() -> u16 {
    DEFAULT_PORT
}

pub fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

pub fn default_average_speed_kmh() -> f64 {
    crate::geo::DEFAULT_AVERAGE_SPEED_KMH
}

pub fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
