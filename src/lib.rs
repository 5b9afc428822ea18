#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod capabilities;
pub mod contact;
pub mod error;
pub mod event;
pub mod incident;
pub mod model;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::Model;
pub use view::ViewModel;

/// Bound on waiting for a location fix at incident creation; past this the
/// incident simply has no snapshot.
pub const SNAPSHOT_TIMEOUT_MS: u64 = 5_000;

/// Ceiling on a single notification attempt; a hung dispatch is reported as
/// a timeout failure and the sequence moves on.
pub const DISPATCH_TIMEOUT_MS: u64 = 15_000;
