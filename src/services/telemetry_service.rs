use std::fs::OpenOptions;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::configs::Telemetry;
use crate::errors::TelemetryError;
use crate::models::ActuationEvent;

/// Receives every ActuationEvent. Delivery failures are the caller's to
/// swallow; the sink never retries.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn record(&self, event: &ActuationEvent) -> Result<(), TelemetryError>;
}

/// Pushes events to the remote HTTP endpoint and appends snapshot events
/// to the local CSV record.
pub struct TelemetryService {
    client: reqwest::Client,
    endpoint: String,
    record: Mutex<csv::Writer<std::fs::File>>,
}

const RECORD_HEADER: [&str; 9] = [
    "timestamp",
    "red",
    "green",
    "blue",
    "object_temperature",
    "ambient_temperature",
    "relay_state",
    "servo_state",
    "mqtt_value",
];

impl TelemetryService {
    pub fn new(telemetry: &Telemetry) -> Result<Self, TelemetryError> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&telemetry.record_path)?;
        let fresh = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if fresh {
            writer.write_record(RECORD_HEADER)?;
            writer.flush()?;
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        Ok(Self {
            client,
            endpoint: telemetry.endpoint.clone(),
            record: Mutex::new(writer),
        })
    }
}

#[async_trait]
impl TelemetrySink for TelemetryService {
    async fn record(&self, event: &ActuationEvent) -> Result<(), TelemetryError> {
        // The two legs are independent: a failing CSV append must not
        // silence the HTTP push, and vice versa.
        let record_result: Result<(), TelemetryError> = match event.csv_record() {
            Some(row) => {
                let mut writer = self.record.lock().await;
                writer
                    .serialize(row)
                    .map_err(TelemetryError::from)
                    .and_then(|()| writer.flush().map_err(TelemetryError::from))
            }
            None => Ok(()),
        };

        let push_result = self
            .client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .map(drop)
            .map_err(TelemetryError::from);

        record_result.and(push_result)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::models::{ActuationEvent, ControllerState, SensorReading, StateSnapshot};

    use super::*;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("terrasync-{}-{}.csv", name, std::process::id()))
    }

    #[tokio::test]
    async fn failing_push_leg_still_appends_to_record() {
        let path = scratch_path("record");
        let _ = fs::remove_file(&path);

        let service = TelemetryService::new(&Telemetry {
            // nothing listens here, so the push leg fails
            endpoint: "http://127.0.0.1:9/data".into(),
            record_path: path.to_string_lossy().into_owned(),
        })
        .unwrap();

        let state = ControllerState::new();
        let reading = SensorReading::new(50, 65, 40, 20.0, 21.0);
        let event = ActuationEvent::with_snapshot(
            "sensor values updated",
            StateSnapshot::new(reading, &state),
        );

        let result = service.record(&event).await;
        assert!(matches!(result, Err(TelemetryError::Http(_))));

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("timestamp,red,green,blue"));
        assert!(lines.next().unwrap().contains(",50,65,40,"));

        let _ = fs::remove_file(&path);
    }
}
