use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serialport::SerialPort;
use tokio::sync::Mutex;

use crate::configs::Bridge;
use crate::errors::BridgeError;
use crate::models::SwitchState;

/// The one serial link to the sensor/actuator board, shared by the
/// actuator and sensor services.
pub type SharedPort = Arc<Mutex<Box<dyn SerialPort>>>;

pub fn open_port(bridge: &Bridge) -> Result<SharedPort, BridgeError> {
    tracing::debug!("connect to port: {}", bridge.port_path);

    let port = serialport::new(&bridge.port_path, bridge.baud_rate)
        .timeout(Duration::from_millis(500))
        .open()?;

    Ok(Arc::new(Mutex::new(port)))
}

/// Drives the relay and the servo. The implementation maps logical
/// ON/OFF to whatever polarity the board wires up.
#[async_trait]
pub trait Actuator: Send + Sync {
    async fn set_relay(&self, state: SwitchState) -> Result<(), BridgeError>;

    async fn set_servo_duty(&self, percent: f32) -> Result<(), BridgeError>;
}

pub struct SerialActuator {
    port: SharedPort,
}

impl SerialActuator {
    pub fn new(port: SharedPort) -> Self {
        Self { port }
    }

    async fn send(&self, command: &str) -> Result<(), BridgeError> {
        let bytes_written = self.port.lock().await.write(command.as_bytes())?;

        if bytes_written != command.len() {
            Err(BridgeError::IncompleteWrite)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Actuator for SerialActuator {
    async fn set_relay(&self, state: SwitchState) -> Result<(), BridgeError> {
        let level = match state {
            SwitchState::On => 1,
            SwitchState::Off => 0,
        };

        self.send(&format!("RLY {level}\n")).await
    }

    async fn set_servo_duty(&self, percent: f32) -> Result<(), BridgeError> {
        self.send(&format!("SRV {percent:.1}\n")).await
    }
}
