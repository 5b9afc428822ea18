//! Emergency contact directory types.
//!
//! The directory itself lives behind the [`Directory`](crate::capabilities)
//! capability; this module owns the ordering rule the escalation sequence
//! depends on.

use serde::{Deserialize, Serialize};

use crate::event::ContactId;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub display_name: String,
    /// Phone number or other contact channel, dialed by the shell.
    pub address: String,
    /// Lower is contacted first.
    pub priority: u32,
}

/// Escalation order: ascending priority, ties broken by insertion order.
///
/// The result is a deterministic permutation of the input regardless of how
/// the shell happened to enumerate the directory.
#[must_use]
pub fn escalation_order(mut contacts: Vec<Contact>) -> Vec<Contact> {
    contacts.sort_by_key(|c| c.priority);
    contacts
}
