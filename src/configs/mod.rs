mod settings;

pub use settings::{Bridge, Gateway, Logger, Settings, Telemetry};
