use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use crate::configs::Settings;
use crate::services::{
    CommandService, ControllerService, SerialActuator, SerialSensor, TelemetryService, open_port,
};

/// Wires the hardware bridge, telemetry and command channel around the
/// controller, then drives the polling loop until interrupt or a fatal
/// actuator error. The safe-state path runs on every way out.
pub async fn run(settings: &Arc<Settings>) -> anyhow::Result<()> {
    let port = open_port(&settings.bridge).context("failed to open bridge port")?;
    let sensor = SerialSensor::new(port.clone());
    let actuator = SerialActuator::new(port);
    let telemetry =
        TelemetryService::new(&settings.telemetry).context("failed to set up telemetry")?;

    let controller = Arc::new(ControllerService::new(sensor, actuator, telemetry));
    controller
        .initialize()
        .await
        .context("failed to drive actuators to safe defaults")?;

    let (fatal_sender, mut fatal_receiver) = mpsc::channel(1);
    CommandService::start(settings.gateway.clone(), controller.clone(), fatal_sender)
        .await
        .context("failed to subscribe to command topic")?;

    let result = tokio::select! {
        res = controller.run() => res.map_err(anyhow::Error::from),
        Some(e) = fatal_receiver.recv() => Err(anyhow::Error::from(e)),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, shutting down");
            Ok(())
        }
    };

    controller.safe_state().await;
    tracing::info!("actuators returned to safe state");

    result
}
