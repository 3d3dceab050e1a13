//! Mindline — scheduling and appointment lifecycle engine for a counseling
//! platform.
//!
//! The crate owns the booking-critical core: turning a counselor's weekly
//! template plus blackout periods plus existing bookings into bookable slots,
//! validating new bookings against every conflict rule, driving appointments
//! through a dual-confirmation state machine, and performing the completion
//! side effects (consultation record, rating aggregate) exactly once.
//!
//! Identity, notifications, and presentation are external collaborators; the
//! caller supplies an authenticated [`models::Actor`] and a
//! [`rusqlite::Connection`].

pub mod availability;
pub mod booking;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod permissions;
pub mod records;
pub mod schedules;

pub use error::SchedulingError;

use tracing_subscriber::EnvFilter;

/// Initialize tracing from `RUST_LOG`, falling back to the crate default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
