//! Emergency contact directory capability.
//!
//! The shell owns contact storage (address book, app settings); the core
//! asks for the full set once per incident and sorts it itself, so the
//! escalation order never depends on the shell's enumeration order.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contact::Contact;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DirectoryOperation {
    Load,
}

impl Operation for DirectoryOperation {
    type Output = DirectoryResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("contact store unavailable")]
    Unavailable,

    #[error("contacts permission denied")]
    PermissionDenied,
}

pub type DirectoryResult = Result<Vec<Contact>, DirectoryError>;

#[derive(Clone)]
pub struct Directory<Ev> {
    context: CapabilityContext<DirectoryOperation, Ev>,
}

impl<Ev> Capability<Ev> for Directory<Ev> {
    type Operation = DirectoryOperation;
    type MappedSelf<MappedEv> = Directory<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Directory::new(self.context.map_event(f))
    }
}

impl<Ev> Directory<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<DirectoryOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn load<F>(&self, make_event: F)
    where
        F: FnOnce(DirectoryResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(DirectoryOperation::Load).await;
            context.update_app(make_event(result));
        });
    }
}
