use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::capabilities::{DirectoryResult, DispatchResult, LocationResult};
use crate::incident::{AttemptKind, IncidentTrigger};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(ContactId);

// --- Explicit timestamp unit ---

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct UnixTimeMs(pub u64);

impl UnixTimeMs {
    #[must_use]
    pub const fn saturating_add_secs(self, secs: u32) -> Self {
        Self(self.0.saturating_add(secs as u64 * 1000))
    }

    /// Milliseconds from `self` until `later`, zero if `later` is not after.
    #[must_use]
    pub const fn saturating_ms_until(self, later: Self) -> u64 {
        later.0.saturating_sub(self.0)
    }
}

// --- Rider position: validated, NaN-safe ---

#[derive(Debug, thiserror::Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("invalid coordinate: lat={0}, lng={1}")]
    InvalidCoordinate(f64, f64),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Position {
    lat: f64,
    lng: f64,
    /// Reverse-geocoded address line, when the shell has one.
    pub address: Option<String>,
}

impl Position {
    pub fn new(lat: f64, lng: f64, address: Option<String>) -> Result<Self, ValidationError> {
        if lat.is_nan()
            || lng.is_nan()
            || lat.is_infinite()
            || lng.is_infinite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lng)
        {
            return Err(ValidationError::InvalidCoordinate(lat, lng));
        }
        Ok(Self { lat, lng, address })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits()
            && self.lng.to_bits() == other.lng.to_bits()
            && self.address == other.address
    }
}

impl Eq for Position {}

// --- Event enum: capability results boxed to keep the enum small ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Configuration from the shell's settings screen
    SettingsChanged {
        countdown_seconds: i64,
        stop_on_first_success: bool,
    },

    // Incoming signals
    IncidentDetected {
        at: UnixTimeMs,
        trigger: IncidentTrigger,
    },
    CountdownTick {
        now: UnixTimeMs,
    },

    // Rider intents
    MarkSafeRequested,
    ManualCallRequested {
        contact_id: ContactId,
    },

    // Capability responses; snapshots are stamped with the incident that
    // asked, so a fix that outlives its incident cannot bind to the next one
    SnapshotResolved {
        incident_id: Uuid,
        result: Box<LocationResult>,
    },
    DirectoryResolved(Box<DirectoryResult>),
    AttemptResolved {
        contact_id: ContactId,
        kind: AttemptKind,
        result: Box<DispatchResult>,
    },
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SettingsChanged { .. } => "settings_changed",
            Self::IncidentDetected { .. } => "incident_detected",
            Self::CountdownTick { .. } => "countdown_tick",
            Self::MarkSafeRequested => "mark_safe_requested",
            Self::ManualCallRequested { .. } => "manual_call_requested",
            Self::SnapshotResolved { .. } => "snapshot_resolved",
            Self::DirectoryResolved(_) => "directory_resolved",
            Self::AttemptResolved { .. } => "attempt_resolved",
        }
    }

    /// Rider-initiated events, as opposed to timer/capability traffic.
    #[must_use]
    pub fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::MarkSafeRequested | Self::ManualCallRequested { .. }
        )
    }
}
