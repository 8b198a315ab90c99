use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, ClientError, Event, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;

use crate::configs::Gateway;
use crate::errors::ControllerError;

use super::actuator_service::Actuator;
use super::controller_service::ControllerService;
use super::sensor_service::SensorSource;
use super::telemetry_service::TelemetrySink;

/// Subscribes to the command topic and feeds every publish into the
/// controller's gate. Runs on its own task for the process lifetime.
pub struct CommandService;

impl CommandService {
    pub async fn start<S, A, T>(
        gateway: Gateway,
        controller: Arc<ControllerService<S, A, T>>,
        fatal: mpsc::Sender<ControllerError>,
    ) -> Result<(), ClientError>
    where
        S: SensorSource + 'static,
        A: Actuator + 'static,
        T: TelemetrySink + 'static,
    {
        let mut options = MqttOptions::new(&gateway.client_id, &gateway.host, gateway.port);
        options.set_keep_alive(Duration::from_secs(5));

        let (client, mut event_loop) = AsyncClient::new(options, 10);
        client.subscribe(gateway.topic.as_str(), QoS::AtMostOnce).await?;

        tracing::debug!(topic = %gateway.topic, "subscribed to command topic");

        tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let payload = String::from_utf8_lossy(&publish.payload).to_string();

                        tracing::debug!(
                            topic = %publish.topic,
                            payload = %payload,
                            "command message received"
                        );

                        if let Err(e) = controller.try_handle_command(&payload).await {
                            tracing::error!("command handling failed: {e}");
                            let _ = fatal.send(e).await;
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        // rumqttc reconnects on the next poll; back off a little
                        tracing::error!("MQTT error: {e}");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Ok(())
    }
}
