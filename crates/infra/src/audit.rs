//! Fire-and-forget audit side-channel.
//!
//! Recording must never fail or block the operation being audited; a sink
//! that cannot deliver drops the event. No retries.

use chrono::{DateTime, Utc};

use sentra_core::UserId;

/// One auditable auth event.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub user_id: Option<UserId>,
    pub action: &'static str,
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(user_id: Option<UserId>, action: &'static str) -> Self {
        Self {
            user_id,
            action,
            detail: None,
            at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Where audit events go. Implementations must be non-blocking and
/// infallible from the caller's perspective.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Default sink: structured log lines under the `audit` target.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        match (&event.user_id, &event.detail) {
            (Some(user), Some(detail)) => tracing::info!(
                target: "audit",
                user = %user,
                action = event.action,
                detail = %detail,
                at = %event.at,
            ),
            (Some(user), None) => tracing::info!(
                target: "audit",
                user = %user,
                action = event.action,
                at = %event.at,
            ),
            (None, Some(detail)) => tracing::info!(
                target: "audit",
                action = event.action,
                detail = %detail,
                at = %event.at,
            ),
            (None, None) => tracing::info!(
                target: "audit",
                action = event.action,
                at = %event.at,
            ),
        }
    }
}
