use serde::{Deserialize, Serialize};

use crate::capabilities::DirectoryError;
use crate::contact::Contact;
use crate::error::AppError;
use crate::event::{ContactId, UnixTimeMs};
use crate::incident::{AttemptKind, Incident, DEFAULT_COUNTDOWN_SECONDS};

/// Contact directory as the core last heard it from the shell.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DirectoryState {
    #[default]
    NotLoaded,
    Loading,
    /// Already in escalation order (sorted at load time).
    Loaded(Vec<Contact>),
    Failed(DirectoryError),
}

impl DirectoryState {
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        match self {
            Self::Loaded(contacts) => contacts,
            _ => &[],
        }
    }
}

/// A dispatch handed to the shell whose outcome has not come back yet.
///
/// Tracked so a completion can be matched up and appended even when the
/// rider cancelled while it was in flight — audit completeness over
/// immediate halt.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InFlightAttempt {
    pub contact_id: ContactId,
    pub kind: AttemptKind,
    pub attempted_at: UnixTimeMs,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Model {
    // Raw settings from the shell; validated when an incident is created.
    pub countdown_seconds: i64,
    pub stop_on_first_success: bool,

    pub incident: Option<Incident>,
    pub directory: DirectoryState,
    pub in_flight: Vec<InFlightAttempt>,

    /// Latest wall-clock time observed from any time-carrying event. Used
    /// to stamp attempts and to render the remaining window.
    pub clock: UnixTimeMs,

    pub active_error: Option<AppError>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self {
            countdown_seconds: i64::from(DEFAULT_COUNTDOWN_SECONDS),
            stop_on_first_success: false,
            incident: None,
            directory: DirectoryState::NotLoaded,
            in_flight: Vec::new(),
            clock: UnixTimeMs::default(),
            active_error: None,
        }
    }

    /// Clocks only move forward; a stale timestamp is ignored.
    pub fn observe_time(&mut self, now: UnixTimeMs) {
        if now > self.clock {
            self.clock = now;
        }
    }

    pub fn track_in_flight(&mut self, attempt: InFlightAttempt) {
        self.in_flight.push(attempt);
    }

    /// Match a completed dispatch back to its in-flight record.
    pub fn take_in_flight(
        &mut self,
        contact_id: &ContactId,
        kind: AttemptKind,
    ) -> Option<InFlightAttempt> {
        let index = self
            .in_flight
            .iter()
            .position(|a| a.kind == kind && &a.contact_id == contact_id)?;
        Some(self.in_flight.remove(index))
    }

    #[must_use]
    pub fn has_in_flight_escalation(&self) -> bool {
        self.in_flight
            .iter()
            .any(|a| a.kind == AttemptKind::Escalation)
    }

    pub fn find_contact(&self, contact_id: &ContactId) -> Option<&Contact> {
        self.directory
            .contacts()
            .iter()
            .find(|c| &c.id == contact_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_never_goes_backwards() {
        let mut model = Model::new();
        model.observe_time(UnixTimeMs(5_000));
        model.observe_time(UnixTimeMs(3_000));
        assert_eq!(model.clock, UnixTimeMs(5_000));
    }

    #[test]
    fn in_flight_matching_is_by_contact_and_kind() {
        let mut model = Model::new();
        model.track_in_flight(InFlightAttempt {
            contact_id: ContactId::new("a"),
            kind: AttemptKind::Escalation,
            attempted_at: UnixTimeMs(1),
        });
        model.track_in_flight(InFlightAttempt {
            contact_id: ContactId::new("a"),
            kind: AttemptKind::Manual,
            attempted_at: UnixTimeMs(2),
        });

        let manual = model
            .take_in_flight(&ContactId::new("a"), AttemptKind::Manual)
            .expect("manual attempt tracked");
        assert_eq!(manual.attempted_at, UnixTimeMs(2));
        assert!(model.has_in_flight_escalation());
        assert!(model
            .take_in_flight(&ContactId::new("a"), AttemptKind::Manual)
            .is_none());
    }

    #[test]
    fn default_matches_the_original_ten_second_window() {
        let model = Model::new();
        assert_eq!(model.countdown_seconds, 10);
        assert!(!model.stop_on_first_success);
    }
}
