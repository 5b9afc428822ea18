//! Read-only view of the emergency workflow.
//!
//! The shell renders exactly what it is given here and forwards taps back
//! as events; it never derives state of its own. A fresh `ViewModel` is
//! produced after every `update`, announced through the render effect.

use serde::{Deserialize, Serialize};

use crate::contact::Contact;
use crate::error::AppError;
use crate::event::Position;
use crate::incident::{AttemptKind, EscalationAttempt, IncidentTrigger, Resolution};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContactView {
    pub id: String,
    pub display_name: String,
    pub address: String,
    pub priority: u32,
}

impl From<&Contact> for ContactView {
    fn from(c: &Contact) -> Self {
        Self {
            id: c.id.0.clone(),
            display_name: c.display_name.clone(),
            address: c.address.clone(),
            priority: c.priority,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LocationView {
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
}

impl From<&Position> for LocationView {
    fn from(p: &Position) -> Self {
        Self {
            lat: p.lat(),
            lng: p.lng(),
            address: p.address.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AttemptView {
    pub contact_id: String,
    pub attempted_at_ms: u64,
    pub delivered: bool,
    pub failure_reason: Option<String>,
    pub manual: bool,
}

impl From<&EscalationAttempt> for AttemptView {
    fn from(a: &EscalationAttempt) -> Self {
        let (delivered, failure_reason) = match &a.outcome {
            crate::incident::AttemptOutcome::Delivered => (true, None),
            crate::incident::AttemptOutcome::Failed { reason } => (false, Some(reason.clone())),
        };
        Self {
            contact_id: a.contact_id.0.clone(),
            attempted_at_ms: a.attempted_at.0,
            delivered,
            failure_reason,
            manual: a.kind == AttemptKind::Manual,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewState {
    /// No live incident; the overlay is hidden.
    Idle,
    CountingDown {
        remaining_seconds: u32,
        trigger: IncidentTrigger,
        location: Option<LocationView>,
        contacts: Vec<ContactView>,
        attempts: Vec<AttemptView>,
    },
    Escalating {
        trigger: IncidentTrigger,
        location: Option<LocationView>,
        contacts: Vec<ContactView>,
        attempts: Vec<AttemptView>,
    },
    Resolved {
        resolution: Resolution,
        location: Option<LocationView>,
        attempts: Vec<AttemptView>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserFacingError {
    pub error_code: String,
    pub message: String,
    pub is_recoverable: bool,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            error_code: e.code().to_string(),
            message: e.message.clone(),
            is_recoverable: e.kind.is_recoverable(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub state: ViewState,
    pub error: Option<UserFacingError>,
}
