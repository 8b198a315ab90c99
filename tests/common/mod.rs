use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use terrasync::errors::{BridgeError, TelemetryError};
use terrasync::models::{ActuationEvent, SensorReading, SwitchState};
use terrasync::services::{Actuator, SensorSource, TelemetrySink};

#[derive(Clone, Debug, PartialEq)]
pub enum ActuatorCall {
    Relay(SwitchState),
    ServoDuty(f32),
}

/// Records every actuator command; optionally starts failing after a
/// fixed number of successful calls.
#[derive(Clone, Default)]
pub struct MockActuator {
    calls: Arc<Mutex<Vec<ActuatorCall>>>,
    fail_after: Option<usize>,
}

impl MockActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(successful_calls: usize) -> Self {
        Self {
            calls: Arc::default(),
            fail_after: Some(successful_calls),
        }
    }

    pub async fn calls(&self) -> Vec<ActuatorCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: ActuatorCall) -> Result<(), BridgeError> {
        let mut calls = self.calls.lock().await;

        if let Some(limit) = self.fail_after {
            if calls.len() >= limit {
                return Err(BridgeError::IncompleteWrite);
            }
        }

        calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl Actuator for MockActuator {
    async fn set_relay(&self, state: SwitchState) -> Result<(), BridgeError> {
        self.record(ActuatorCall::Relay(state)).await
    }

    async fn set_servo_duty(&self, percent: f32) -> Result<(), BridgeError> {
        self.record(ActuatorCall::ServoDuty(percent)).await
    }
}

/// Replays scripted readings; `None` entries turn into read failures.
#[derive(Clone, Default)]
pub struct MockSensor {
    readings: Arc<Mutex<VecDeque<Option<SensorReading>>>>,
}

impl MockSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, reading: SensorReading) {
        self.readings.lock().await.push_back(Some(reading));
    }

    pub async fn push_failure(&self) {
        self.readings.lock().await.push_back(None);
    }
}

#[async_trait]
impl SensorSource for MockSensor {
    async fn read(&self) -> Result<SensorReading, BridgeError> {
        match self.readings.lock().await.pop_front() {
            Some(Some(reading)) => Ok(reading),
            Some(None) => Err(BridgeError::BadResponse("scripted failure".into())),
            None => Err(BridgeError::BadResponse("no scripted reading left".into())),
        }
    }
}

/// Collects every emitted event in order.
#[derive(Clone, Default)]
pub struct MockTelemetry {
    events: Arc<Mutex<Vec<ActuationEvent>>>,
}

impl MockTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .await
            .iter()
            .map(|event| event.message.clone())
            .collect()
    }
}

#[async_trait]
impl TelemetrySink for MockTelemetry {
    async fn record(&self, event: &ActuationEvent) -> Result<(), TelemetryError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

pub fn reading(red: u8, green: u8, blue: u8, object_temp: f32) -> SensorReading {
    SensorReading::new(red, green, blue, object_temp, 21.0)
}
