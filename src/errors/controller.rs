use super::bridge::BridgeError;

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The sensor poll failed. Aborts the current cycle only; the loop
    /// retries on the next period.
    #[error("sensor read failed: {0}")]
    SensorRead(#[source] BridgeError),

    /// An actuator command failed. The actuator position is now unknown,
    /// so the process must stop issuing commands and go to the safe-state
    /// shutdown path.
    #[error("actuator command failed: {0}")]
    Actuator(#[source] BridgeError),
}
