mod actuator_service;
mod command_service;
mod controller_service;
mod sensor_service;
mod telemetry_service;

pub use actuator_service::*;
pub use command_service::*;
pub use controller_service::*;
pub use sensor_service::*;
pub use telemetry_service::*;
