mod directory;
mod dispatch;
mod location;

pub use self::directory::{Directory, DirectoryError, DirectoryOperation, DirectoryResult};
pub use self::dispatch::{
    DeliveryReport, Dispatch, DispatchError, DispatchOperation, DispatchResult,
};
pub use self::location::{Location, LocationError, LocationOperation, LocationResult};

// We use Crux's built-in Render capability directly because it provides
// all necessary functionality for triggering view updates.
pub use crux_core::render::Render;

// The Effect derive needs App in scope and the explicit event generic on
// each field.
use crate::app::App;
use crate::event::Event;

pub type AppRender = Render<Event>;
pub type AppLocation = Location<Event>;
pub type AppDirectory = Directory<Event>;
pub type AppDispatch = Dispatch<Event>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub location: Location<Event>,
    pub directory: Directory<Event>,
    pub dispatch: Dispatch<Event>,
}
