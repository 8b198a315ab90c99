use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::errors::ControllerError;
use crate::models::{ActuationEvent, ControllerState, SensorReading, StateSnapshot, SwitchState};

use super::actuator_service::Actuator;
use super::sensor_service::SensorSource;
use super::telemetry_service::TelemetrySink;

/// Command values below this turn the relay on.
pub const RELAY_ON_THRESHOLD: f64 = 87.0;

/// Inter-cycle sleep of the polling loop.
pub const CYCLE_PERIOD: Duration = Duration::from_secs(5);

/// How much greener than red and blue a reading must be before the site
/// counts as healthy and the servo stays idle.
const GREEN_DOMINANCE_MARGIN: u16 = 10;

/// Object temperature above which the terrain gets watered.
const OBJECT_TEMP_LIMIT: f32 = 28.0;

const SERVO_ACTIVE_DUTY: f32 = 5.0;
const SERVO_DWELL: Duration = Duration::from_secs(5);
const RELAY_PULSE: Duration = Duration::from_millis(1500);
const WATERING_HOLD: Duration = Duration::from_secs(5);

/// Pure relay threshold rule for inbound command values.
pub fn decide_relay(value: f64) -> SwitchState {
    if value < RELAY_ON_THRESHOLD {
        SwitchState::On
    } else {
        SwitchState::Off
    }
}

/// Pure color rule: green must beat both red and blue by the margin.
pub fn green_dominant(reading: &SensorReading) -> bool {
    let red = u16::from(reading.red);
    let green = u16::from(reading.green);
    let blue = u16::from(reading.blue);

    green > red + GREEN_DOMINANCE_MARGIN && green > blue + GREEN_DOMINANCE_MARGIN
}

/// Owns the controller state and the actuation state machine.
///
/// Two execution contexts reach in here: the polling cycle (`run`) and the
/// MQTT delivery path (`try_handle_command`). Every read-modify-write of
/// `ControllerState` happens under the one mutex, and the `gate_open` flag
/// inside it keeps a delivery from flipping the relay while a multi-second
/// sequence is in flight.
pub struct ControllerService<S, A, T> {
    sensor: S,
    actuator: A,
    telemetry: T,
    state: Mutex<ControllerState>,
}

impl<S, A, T> ControllerService<S, A, T>
where
    S: SensorSource,
    A: Actuator,
    T: TelemetrySink,
{
    pub fn new(sensor: S, actuator: A, telemetry: T) -> Self {
        Self {
            sensor,
            actuator,
            telemetry,
            state: Mutex::new(ControllerState::new()),
        }
    }

    pub async fn snapshot(&self) -> ControllerState {
        self.state.lock().await.clone()
    }

    /// Drives both actuators to the known safe default. Fatal on failure:
    /// there is no point entering the loop without a trusted baseline.
    pub async fn initialize(&self) -> Result<(), ControllerError> {
        self.set_relay(SwitchState::Off).await?;
        self.actuator
            .set_servo_duty(0.0)
            .await
            .map_err(ControllerError::Actuator)?;

        Ok(())
    }

    /// Command delivery entry point.
    ///
    /// Holds the state lock for the whole evaluation so a cycle cannot
    /// close the gate between the check and the relay command. Deliveries
    /// seen gate-closed are dropped outright, never queued.
    pub async fn try_handle_command(&self, payload: &str) -> Result<(), ControllerError> {
        let mut state = self.state.lock().await;

        if !state.gate_open {
            tracing::info!(payload, "sequence in flight, command ignored");
            return Ok(());
        }

        let Ok(value) = payload.trim().parse::<f64>() else {
            drop(state);
            tracing::warn!(payload, "received non-numeric command value");
            self.emit(ActuationEvent::message("received non-numeric command value"))
                .await;
            return Ok(());
        };

        let target = decide_relay(value);
        if let Err(e) = self.actuator.set_relay(target).await {
            drop(state);
            let error = ControllerError::Actuator(e);
            self.emit(ActuationEvent::message(error.to_string())).await;
            return Err(error);
        }
        state.last_command_value = value;
        state.relay = target;
        drop(state);

        let message = match target {
            SwitchState::On => "relay turned ON",
            SwitchState::Off => "relay turned OFF",
        };
        self.emit(ActuationEvent::message(message)).await;

        Ok(())
    }

    /// The polling loop. Sensor failures skip the cycle; actuator failures
    /// leave the hardware in an unknown position and end the loop so the
    /// caller can run the safe-state path.
    pub async fn run(&self) -> Result<(), ControllerError> {
        loop {
            match self.run_cycle().await {
                Ok(()) => {}
                Err(ControllerError::SensorRead(e)) => {
                    tracing::warn!("sensor read failed, skipping cycle: {e}");
                }
                Err(e) => return Err(e),
            }

            sleep(CYCLE_PERIOD).await;
        }
    }

    /// One cycle: poll, report, color rule, temperature rule. Any failure
    /// is also surfaced as a best-effort telemetry event before it
    /// propagates, so nothing fails silently.
    pub async fn run_cycle(&self) -> Result<(), ControllerError> {
        let result = self.cycle().await;

        if let Err(e) = &result {
            self.emit(ActuationEvent::message(e.to_string())).await;
        }

        result
    }

    async fn cycle(&self) -> Result<(), ControllerError> {
        let reading = self
            .sensor
            .read()
            .await
            .map_err(ControllerError::SensorRead)?;

        tracing::info!(
            red = reading.red,
            green = reading.green,
            blue = reading.blue,
            object_temp = f64::from(reading.object_temp),
            ambient_temp = f64::from(reading.ambient_temp),
            "sensor values updated"
        );

        let snapshot = {
            let state = self.state.lock().await;
            StateSnapshot::new(reading, &state)
        };
        self.emit(ActuationEvent::with_snapshot("sensor values updated", snapshot))
            .await;

        if green_dominant(&reading) {
            self.set_servo(SwitchState::Off, 0.0).await?;
            self.emit(ActuationEvent::message("green dominant, servo idle"))
                .await;
        } else {
            self.run_servo_sequence().await?;
        }

        if reading.object_temp > OBJECT_TEMP_LIMIT {
            self.run_watering_sequence().await?;
        } else {
            self.set_relay(SwitchState::Off).await?;
        }

        Ok(())
    }

    /// Best-effort return to the safe default on shutdown. State is forced
    /// to match even if a command fails, since nothing runs afterwards.
    pub async fn safe_state(&self) {
        if let Err(e) = self.actuator.set_relay(SwitchState::Off).await {
            tracing::error!("failed to reset relay: {e}");
        }
        if let Err(e) = self.actuator.set_servo_duty(0.0).await {
            tracing::error!("failed to reset servo: {e}");
        }

        let mut state = self.state.lock().await;
        state.relay = SwitchState::Off;
        state.servo = SwitchState::Off;
        state.gate_open = true;
    }

    async fn run_servo_sequence(&self) -> Result<(), ControllerError> {
        self.set_gate(false).await;
        let result = self.servo_sequence().await;
        self.set_gate(true).await;

        result
    }

    async fn servo_sequence(&self) -> Result<(), ControllerError> {
        self.emit(ActuationEvent::message("green not dominant, running servo"))
            .await;

        self.set_servo(SwitchState::On, SERVO_ACTIVE_DUTY).await?;
        sleep(SERVO_DWELL).await;

        // Duty returns to idle, but the servo stays logically On: the
        // sequence has positioned it, and only a later green-dominant
        // cycle marks it Off again.
        self.actuator
            .set_servo_duty(0.0)
            .await
            .map_err(ControllerError::Actuator)?;

        self.emit(ActuationEvent::message("pulsing relay")).await;
        self.set_relay(SwitchState::On).await?;
        sleep(RELAY_PULSE).await;
        self.set_relay(SwitchState::Off).await?;

        Ok(())
    }

    async fn run_watering_sequence(&self) -> Result<(), ControllerError> {
        self.emit(ActuationEvent::message(
            "object temperature too high, watering the terrain",
        ))
        .await;

        self.set_gate(false).await;
        let result = self.watering_sequence().await;
        self.set_gate(true).await;

        result
    }

    async fn watering_sequence(&self) -> Result<(), ControllerError> {
        self.set_relay(SwitchState::On).await?;
        sleep(WATERING_HOLD).await;

        // The relay is left On here; the next cool cycle turns it off
        // through the temperature else-branch.
        Ok(())
    }

    async fn set_gate(&self, open: bool) {
        self.state.lock().await.gate_open = open;
    }

    async fn set_relay(&self, target: SwitchState) -> Result<(), ControllerError> {
        self.actuator
            .set_relay(target)
            .await
            .map_err(ControllerError::Actuator)?;
        self.state.lock().await.relay = target;

        Ok(())
    }

    async fn set_servo(&self, target: SwitchState, duty: f32) -> Result<(), ControllerError> {
        self.actuator
            .set_servo_duty(duty)
            .await
            .map_err(ControllerError::Actuator)?;
        self.state.lock().await.servo = target;

        Ok(())
    }

    async fn emit(&self, event: ActuationEvent) {
        if let Err(e) = self.telemetry.record(&event).await {
            tracing::warn!("telemetry delivery failed: {e}");
        }
    }
}
