pub mod bridge;
pub mod controller;
pub mod telemetry;

pub use bridge::BridgeError;
pub use controller::ControllerError;
pub use telemetry::TelemetryError;
