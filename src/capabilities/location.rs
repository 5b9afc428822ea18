//! Location snapshot capability.
//!
//! The shell owns the geolocation hardware; the core asks for a single
//! best-effort position fix with a bounded wait. Absence is an ordinary
//! outcome, never a fault that blocks the incident.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::Position;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationOperation {
    /// One point-in-time fix; the shell must answer within `timeout_ms`.
    Snapshot { timeout_ms: u64 },
}

impl Operation for LocationOperation {
    type Output = LocationResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("location services unavailable")]
    Unavailable,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("no fix within the allowed time")]
    Timeout,
}

pub type LocationResult = Result<Position, LocationError>;

#[derive(Clone)]
pub struct Location<Ev> {
    context: CapabilityContext<LocationOperation, Ev>,
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<Ev> Location<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn snapshot<F>(&self, timeout_ms: u64, make_event: F)
    where
        F: FnOnce(LocationResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(LocationOperation::Snapshot { timeout_ms })
                .await;
            context.update_app(make_event(result));
        });
    }
}
