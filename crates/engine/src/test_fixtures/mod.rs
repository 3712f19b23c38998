//! Common test helpers for building an in-memory world.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{test_app, world_seeder::WorldSeeder};
//!
//! #[tokio::test]
//! async fn test_with_town() {
//!     let app = test_app();
//!     let world = WorldSeeder::new(&app).location("Town Square").await.finish();
//!     // ... test logic
//! }
//! ```

pub mod world_seeder;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::app::App;
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::emitter::RetryConfig;
use crate::infrastructure::settings::WorldSettings;

/// Instant every fixture clock reports.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Retry settings that keep failing emissions fast.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        base_delay_ms: 1,
        max_delay_ms: 4,
        jitter_factor: 0.0,
    }
}

pub fn test_settings() -> WorldSettings {
    WorldSettings {
        retry: fast_retry(),
        ..WorldSettings::default()
    }
}

/// In-memory app on a fixed clock.
pub fn test_app() -> App {
    App::with_clock(test_settings(), Arc::new(FixedClock(fixed_now())))
}
