//! Time Effect Handlers - Production Only

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rosterlink_core::effects::PhysicalTimeEffects;

/// Real time handler for production use
///
/// Stateless; delegates to the operating system clock.
#[derive(Debug, Clone, Default)]
pub struct RealTimeHandler;

impl RealTimeHandler {
    /// Create a new real time handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhysicalTimeEffects for RealTimeHandler {
    async fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
