use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::auth::domain::events::AuthEvent;
use crate::auth::domain::repositories::AuthEventSink;

/// Event sink that writes each event as a JSON payload to the tracing
/// target `tollgate::audit`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuthEventSink for TracingEventSink {
    async fn record(&self, events: Vec<AuthEvent>) -> Result<()> {
        for event in events {
            let payload = serde_json::to_string(&event)
                .with_context(|| format!("failed to encode {} event", event.event_type()))?;
            info!(
                target: "tollgate::audit",
                event = event.event_type(),
                user_id = %event.user_id(),
                payload = %payload,
                "auth event"
            );
        }
        Ok(())
    }
}
