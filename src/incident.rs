//! Incident lifecycle: detection → countdown → escalation → resolution.
//!
//! One `Incident` per detection signal. All mutation goes through the app's
//! `update` loop, so the transitions here never race. Remaining time is
//! always recomputed from wall clock (`detected_at + duration - now`) rather
//! than decremented per tick, which keeps late or duplicated ticks harmless.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::event::{ContactId, Position, UnixTimeMs};

pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 10;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigError {
    #[error("countdown duration must not be negative, got {0}")]
    NegativeDuration(i64),
}

/// Countdown window before automatic escalation begins.
///
/// Zero is valid and means "escalate immediately"; a negative duration is
/// rejected rather than silently defaulted.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountdownConfig {
    duration_seconds: u32,
    pub stop_on_first_success: bool,
}

impl CountdownConfig {
    pub fn new(duration_seconds: i64, stop_on_first_success: bool) -> Result<Self, ConfigError> {
        let duration_seconds = u32::try_from(duration_seconds)
            .map_err(|_| ConfigError::NegativeDuration(duration_seconds))?;
        Ok(Self {
            duration_seconds,
            stop_on_first_success,
        })
    }

    #[must_use]
    pub const fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            duration_seconds: DEFAULT_COUNTDOWN_SECONDS,
            stop_on_first_success: false,
        }
    }
}

/// What raised the incident: the crash detector or the rider's SOS button.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum IncidentTrigger {
    Detected,
    ManualSos,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Resolution {
    /// Rider confirmed they are okay.
    Cancelled,
    /// All contacts attempted, at least one reached.
    Escalated,
    /// All contacts attempted, none reached.
    Timeout,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum IncidentStatus {
    Pending,
    CountingDown,
    Escalating,
    Resolved(Resolution),
}

impl IncidentStatus {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Marker distinguishing automatic escalation from rider-initiated calls.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttemptKind {
    Escalation,
    Manual,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttemptOutcome {
    Delivered,
    Failed { reason: String },
}

impl AttemptOutcome {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EscalationAttempt {
    pub contact_id: ContactId,
    pub attempted_at: UnixTimeMs,
    pub outcome: AttemptOutcome,
    pub kind: AttemptKind,
}

/// Result of advancing the countdown to a given wall-clock time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Not counting down (never started, already escalating, or resolved).
    Ignored,
    Counting { remaining_seconds: u32 },
    /// The window just expired; caller must start escalation.
    Expired,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Incident {
    id: Uuid,
    detected_at: UnixTimeMs,
    trigger: IncidentTrigger,
    status: IncidentStatus,
    config: CountdownConfig,
    location_snapshot: Option<Position>,
    escalation_log: Vec<EscalationAttempt>,
}

impl Incident {
    #[must_use]
    pub fn create(detected_at: UnixTimeMs, trigger: IncidentTrigger, config: CountdownConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            detected_at,
            trigger,
            status: IncidentStatus::Pending,
            config,
            location_snapshot: None,
            escalation_log: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn detected_at(&self) -> UnixTimeMs {
        self.detected_at
    }
    pub fn trigger(&self) -> IncidentTrigger {
        self.trigger
    }
    pub fn status(&self) -> IncidentStatus {
        self.status
    }
    pub fn config(&self) -> &CountdownConfig {
        &self.config
    }
    pub fn location_snapshot(&self) -> Option<&Position> {
        self.location_snapshot.as_ref()
    }
    pub fn escalation_log(&self) -> &[EscalationAttempt] {
        &self.escalation_log
    }

    #[must_use]
    pub fn deadline(&self) -> UnixTimeMs {
        self.detected_at
            .saturating_add_secs(self.config.duration_seconds)
    }

    /// Whole seconds left in the window, rounded up for display.
    #[must_use]
    pub fn remaining_seconds(&self, now: UnixTimeMs) -> u32 {
        let ms = now.saturating_ms_until(self.deadline());
        u32::try_from(ms.div_ceil(1000)).unwrap_or(u32::MAX)
    }

    pub fn begin_countdown(&mut self) {
        if self.status == IncidentStatus::Pending {
            self.status = IncidentStatus::CountingDown;
        }
    }

    /// Advance the countdown to `now`.
    ///
    /// Idempotent for repeated or out-of-order `now` values: the transition
    /// to `Escalating` fires exactly once, and a terminal incident ignores
    /// ticks entirely (tolerates late timers).
    pub fn tick(&mut self, now: UnixTimeMs) -> Tick {
        if self.status != IncidentStatus::CountingDown {
            return Tick::Ignored;
        }
        if now >= self.deadline() {
            self.status = IncidentStatus::Escalating;
            return Tick::Expired;
        }
        Tick::Counting {
            remaining_seconds: self.remaining_seconds(now),
        }
    }

    /// Rider cancellation. Returns whether anything changed, so a duplicate
    /// tap is a no-op rather than an error.
    pub fn mark_safe(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = IncidentStatus::Resolved(Resolution::Cancelled);
        true
    }

    /// Best-effort location binding: captured at most once, kept as the
    /// "last known good" record even if the location service later fails.
    pub fn capture_snapshot(&mut self, position: Position) {
        if self.location_snapshot.is_none() && !self.status.is_terminal() {
            self.location_snapshot = Some(position);
        }
    }

    /// Append an attempt outcome.
    ///
    /// The log is append-only and normally only grows while the incident is
    /// live; the one sanctioned late append is an attempt that was already
    /// in flight when the rider cancelled — the caller tracks in-flight
    /// dispatches and is responsible for that gate.
    pub fn record_attempt(&mut self, attempt: EscalationAttempt) {
        self.escalation_log.push(attempt);
    }

    /// Contacts already attempted by the automatic sequence. Manual calls
    /// bypass ordering and do not count here.
    pub fn attempted_escalations(&self) -> impl Iterator<Item = &ContactId> {
        self.escalation_log
            .iter()
            .filter(|a| a.kind == AttemptKind::Escalation)
            .map(|a| &a.contact_id)
    }

    #[must_use]
    pub fn any_escalation_delivered(&self) -> bool {
        self.escalation_log
            .iter()
            .any(|a| a.kind == AttemptKind::Escalation && a.outcome.is_delivered())
    }

    /// Close out escalation once the contact list is exhausted (or cut short
    /// by `stop_on_first_success`).
    pub fn finish_escalation(&mut self) {
        if self.status != IncidentStatus::Escalating {
            return;
        }
        self.status = if self.any_escalation_delivered() {
            IncidentStatus::Resolved(Resolution::Escalated)
        } else {
            IncidentStatus::Resolved(Resolution::Timeout)
        };
    }
}
