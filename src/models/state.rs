use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical position of a binary actuator, independent of the physical
/// active-high/active-low wiring on the bridge board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwitchState {
    On,
    Off,
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchState::On => write!(f, "ON"),
            SwitchState::Off => write!(f, "OFF"),
        }
    }
}

/// The one mutable record of the controller. Lives behind a single
/// `tokio::sync::Mutex`; both the polling cycle and the command delivery
/// path go through that lock for every read-modify-write.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ControllerState {
    /// Last commanded relay position.
    pub relay: SwitchState,
    /// `On` while a servo sequence has positioned the servo; cleared only
    /// by a later green-dominant cycle.
    pub servo: SwitchState,
    /// Most recent accepted command value, `0.0` until the first one.
    pub last_command_value: f64,
    /// While `false`, command deliveries are dropped so they cannot flip
    /// the relay in the middle of a multi-step sequence.
    pub gate_open: bool,
}

impl ControllerState {
    pub fn new() -> Self {
        Self {
            relay: SwitchState::Off,
            servo: SwitchState::Off,
            last_command_value: 0.0,
            gate_open: true,
        }
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}
