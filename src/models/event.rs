use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::reading::SensorReading;
use super::state::{ControllerState, SwitchState};

/// Full controller picture attached to the per-cycle "sensor values
/// updated" event; message-only events carry `None`.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct StateSnapshot {
    #[serde(flatten)]
    pub reading: SensorReading,
    pub relay_state: SwitchState,
    pub servo_state: SwitchState,
    #[serde(rename = "mqtt_value")]
    pub command_value: f64,
}

impl StateSnapshot {
    pub fn new(reading: SensorReading, state: &ControllerState) -> Self {
        Self {
            reading,
            relay_state: state.relay,
            servo_state: state.servo,
            command_value: state.last_command_value,
        }
    }
}

/// Write-once telemetry record. Ordering is emission order; nothing ever
/// mutates an event after it is built.
#[derive(Clone, Debug, Serialize)]
pub struct ActuationEvent {
    #[serde(rename = "timestamp", with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub message: String,
    #[serde(flatten)]
    pub snapshot: Option<StateSnapshot>,
}

impl ActuationEvent {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            time: OffsetDateTime::now_utc(),
            message: message.into(),
            snapshot: None,
        }
    }

    pub fn with_snapshot(message: impl Into<String>, snapshot: StateSnapshot) -> Self {
        Self {
            time: OffsetDateTime::now_utc(),
            message: message.into(),
            snapshot: Some(snapshot),
        }
    }

    /// Row for the local durable record. The column set is a fixed external
    /// schema, `mqtt_value` included, so downstream consumers keep parsing.
    pub fn csv_record(&self) -> Option<CsvRecord> {
        let snapshot = self.snapshot.as_ref()?;

        Some(CsvRecord {
            timestamp: self.time.format(&Rfc3339).unwrap_or_default(),
            red: snapshot.reading.red,
            green: snapshot.reading.green,
            blue: snapshot.reading.blue,
            object_temperature: snapshot.reading.object_temp,
            ambient_temperature: snapshot.reading.ambient_temp,
            relay_state: snapshot.relay_state.to_string(),
            servo_state: snapshot.servo_state.to_string(),
            mqtt_value: snapshot.command_value,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CsvRecord {
    pub timestamp: String,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub object_temperature: f32,
    pub ambient_temperature: f32,
    pub relay_state: String,
    pub servo_state: String,
    pub mqtt_value: f64,
}
