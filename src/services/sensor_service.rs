use std::io::{Read, Write};

use async_trait::async_trait;

use crate::errors::BridgeError;
use crate::models::SensorReading;

use super::actuator_service::SharedPort;

/// Produces one color + temperature reading per poll.
#[async_trait]
pub trait SensorSource: Send + Sync {
    async fn read(&self) -> Result<SensorReading, BridgeError>;
}

/// Queries the bridge board: sends `READ`, expects one line of
/// `<red> <green> <blue> <object_temp> <ambient_temp>`.
pub struct SerialSensor {
    port: SharedPort,
}

impl SerialSensor {
    pub fn new(port: SharedPort) -> Self {
        Self { port }
    }

    fn parse_line(line: &str) -> Result<SensorReading, BridgeError> {
        let mut fields = line.split_whitespace();

        let reading = (|| {
            let red = fields.next()?.parse().ok()?;
            let green = fields.next()?.parse().ok()?;
            let blue = fields.next()?.parse().ok()?;
            let object_temp = fields.next()?.parse().ok()?;
            let ambient_temp = fields.next()?.parse().ok()?;

            Some(SensorReading::new(red, green, blue, object_temp, ambient_temp))
        })();

        reading.ok_or_else(|| BridgeError::BadResponse(line.to_string()))
    }
}

#[async_trait]
impl SensorSource for SerialSensor {
    async fn read(&self) -> Result<SensorReading, BridgeError> {
        let mut port = self.port.lock().await;

        port.write_all(b"READ\n")?;

        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            port.read_exact(&mut byte)?;
            if byte[0] == b'\n' {
                break;
            }
            line.push(byte[0]);
        }

        let line = String::from_utf8_lossy(&line);

        Self::parse_line(line.trim())
    }
}
