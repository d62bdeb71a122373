use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("ARENA_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

pub fn auth_service_url() -> String {
    env::var("AUTH_SERVICE_URL").unwrap_or_else(|_| "http://127.0.0.1:3002".to_string())
}

pub fn auth_verify_timeout() -> Duration {
    let millis = env::var("AUTH_VERIFY_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1500);
    Duration::from_millis(millis)
}

// Result reporting is optional; leave the variable unset to disable it.
pub fn results_service_url() -> Option<String> {
    env::var("RESULTS_SERVICE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
}

pub fn results_report_timeout() -> Duration {
    let millis = env::var("RESULTS_REPORT_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(2500);
    Duration::from_millis(millis)
}

pub const COMMAND_CHANNEL_CAPACITY: usize = 1024;
pub const BROADCAST_CAPACITY: usize = 128;

// Fixed simulation step; gameplay rules assume 50ms.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);
