//! Physical time effect interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Wall-clock time for last-access timestamps
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current wall-clock time
    async fn now(&self) -> DateTime<Utc>;
}
