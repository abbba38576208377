use std::time::Duration;

pub const DEFAULT_AREAS_URL: &str = "https://kyupid-api.vercel.app/api/areas";
pub const DEFAULT_USERS_URL: &str = "https://kyupid-api.vercel.app/api/users";

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_BROADCAST_BUFFER: usize = 256;
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const SSE_KEEPALIVE_SECS: u64 = 15;

// Initial map view handed to the front end (Bengaluru).
pub const MAP_CENTER_LNG: f64 = 77.5946;
pub const MAP_CENTER_LAT: f64 = 12.9716;
pub const MAP_ZOOM: f64 = 9.0;
pub const MAP_STYLE: &str = "mapbox://styles/mapbox/streets-v11";

pub fn areas_url() -> String {
    non_empty_env("AREAS_URL").unwrap_or_else(|| DEFAULT_AREAS_URL.to_string())
}

pub fn users_url() -> String {
    non_empty_env("USERS_URL").unwrap_or_else(|| DEFAULT_USERS_URL.to_string())
}

pub fn map_access_token() -> Option<String> {
    non_empty_env("MAP_ACCESS_TOKEN")
}

pub fn static_dir() -> String {
    non_empty_env("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
}

pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// `None` means load once at startup and only again on `POST /api/reload`.
pub fn reload_interval() -> Option<Duration> {
    std::env::var("RELOAD_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
}

pub fn sse_broadcast_buffer() -> usize {
    std::env::var("SSE_BROADCAST_BUFFER")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_BROADCAST_BUFFER)
}

pub fn upstream_http_timeout() -> Duration {
    std::env::var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS))
}

pub fn upstream_connect_timeout() -> Duration {
    std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
