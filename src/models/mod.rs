pub mod event;
pub mod reading;
pub mod state;

pub use event::{ActuationEvent, StateSnapshot};
pub use reading::SensorReading;
pub use state::{ControllerState, SwitchState};
