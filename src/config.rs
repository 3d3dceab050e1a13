use std::path::PathBuf;

use chrono::NaiveTime;

/// Application-level constants
pub const APP_NAME: &str = "Mindline";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Length of a bookable slot, in minutes.
pub const SLOT_MINUTES: i64 = 60;

/// How far into the future a date may be booked, in days (inclusive).
pub const BOOKING_HORIZON_DAYS: i64 = 30;

/// Bounds for an explicitly-sized booking, in minutes.
pub const MIN_DURATION_MINUTES: i64 = 60;
pub const MAX_DURATION_MINUTES: i64 = 180;

/// Per-slot capacity used when a counselor has no weekly template for a day.
pub const DEFAULT_SLOT_CAPACITY: u32 = 1;

/// Start of the fallback availability window (no template for the weekday).
pub fn default_day_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap()
}

/// End of the fallback availability window.
pub fn default_day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(22, 0, 0).unwrap()
}

/// Get the application data directory (`~/Mindline/`).
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Mindline")
}

/// Default on-disk database location.
pub fn database_path() -> PathBuf {
    app_data_dir().join("mindline.db")
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "info,mindline=debug".to_string()
}
