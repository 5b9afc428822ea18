//! Contact notification capability.
//!
//! Any concrete transport (telephony, SMS gateway, push) can satisfy this
//! contract on the shell side. Ordinary delivery failures — busy line,
//! unreachable number — come back as a report with `delivered: false`;
//! only environment faults (capability missing, permission revoked, hung
//! dispatch past the deadline) surface as `DispatchError`, and the core
//! records those as failed attempts rather than aborting the sequence.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::ContactId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DispatchOperation {
    Notify {
        contact_id: ContactId,
        address: String,
        /// A hung dispatch must not stall escalation past this ceiling.
        timeout_ms: u64,
    },
}

impl Operation for DispatchOperation {
    type Output = DispatchResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DispatchError {
    #[error("notification capability unavailable on this platform")]
    Unavailable,

    #[error("telephony permission denied")]
    PermissionDenied,

    #[error("timeout")]
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: bool,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

impl DeliveryReport {
    #[must_use]
    pub fn delivered() -> Self {
        Self {
            delivered: true,
            failure_reason: None,
        }
    }

    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            delivered: false,
            failure_reason: Some(reason.into()),
        }
    }
}

pub type DispatchResult = Result<DeliveryReport, DispatchError>;

#[derive(Clone)]
pub struct Dispatch<Ev> {
    context: CapabilityContext<DispatchOperation, Ev>,
}

impl<Ev> Capability<Ev> for Dispatch<Ev> {
    type Operation = DispatchOperation;
    type MappedSelf<MappedEv> = Dispatch<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Dispatch::new(self.context.map_event(f))
    }
}

impl<Ev> Dispatch<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<DispatchOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn notify<F>(&self, contact_id: ContactId, address: String, timeout_ms: u64, make_event: F)
    where
        F: FnOnce(DispatchResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(DispatchOperation::Notify {
                    contact_id,
                    address,
                    timeout_ms,
                })
                .await;
            context.update_app(make_event(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_constructors() {
        assert!(DeliveryReport::delivered().delivered);
        let failed = DeliveryReport::failed("busy");
        assert!(!failed.delivered);
        assert_eq!(failed.failure_reason.as_deref(), Some("busy"));
    }

    #[test]
    fn operation_round_trips_through_json() {
        let op = DispatchOperation::Notify {
            contact_id: ContactId::new("sos-1"),
            address: "911".into(),
            timeout_ms: 15_000,
        };
        let json = serde_json::to_string(&op).unwrap();
        let back: DispatchOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn error_round_trips_through_json() {
        let err: DispatchResult = Err(DispatchError::Timeout);
        let json = serde_json::to_string(&err).unwrap();
        let back: DispatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }

    #[test]
    fn missing_failure_reason_deserializes() {
        let json = r#"{"delivered":true}"#;
        let report: DeliveryReport = serde_json::from_str(json).unwrap();
        assert!(report.delivered);
        assert_eq!(report.failure_reason, None);
    }
}
