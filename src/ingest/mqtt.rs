// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/guardiao-rs

//! MQTT transport feeding the ingestion worker

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::MqttConfig;

/// Inbound MQTT subscription.
///
/// The connection is verified before `connect` returns: a pipeline that
/// starts without a working subscription would sit idle forever, so a dead
/// broker at startup is fatal. After that, a pump task keeps the session
/// alive on its own, retrying broker errors with a fixed backoff and
/// re-subscribing on every reconnect.
pub struct MqttIngest {
    client: AsyncClient,
    payloads: mpsc::Receiver<Vec<u8>>,
}

impl MqttIngest {
    /// Connect to the broker, subscribe, and spawn the event-loop pump.
    pub async fn connect(config: &MqttConfig) -> Result<Self> {
        let mut options = MqttOptions::new(&config.client_id, &config.broker, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username, password);
        }

        let (client, mut eventloop) = AsyncClient::new(options, 100);

        wait_for_connack(&mut eventloop).await.with_context(|| {
            format!(
                "could not connect to MQTT broker {}:{}",
                config.broker, config.port
            )
        })?;
        info!("Connected to MQTT broker {}:{}", config.broker, config.port);

        client
            .subscribe(&config.topic, QoS::AtLeastOnce)
            .await
            .map_err(|e| anyhow!("MQTT subscribe failed: {}", e))?;
        info!("Subscribed to MQTT topic: {}", config.topic);

        // Bounded handoff to the worker; the pump must keep polling so the
        // broker keepalive never starves behind a slow analysis.
        let (tx, rx) = mpsc::channel(100);
        let topic = config.topic.clone();
        let pump_client = client.clone();
        tokio::spawn(async move {
            pump(eventloop, pump_client, topic, tx).await;
        });

        Ok(Self {
            client,
            payloads: rx,
        })
    }

    /// Next inbound payload, or `None` once the pump has stopped.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.payloads.recv().await
    }

    /// Publishing handle, used by the demo publisher.
    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.client
            .disconnect()
            .await
            .map_err(|e| anyhow!("MQTT disconnect failed: {}", e))
    }
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<()> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => return Ok(()),
            Ok(_) => continue,
            Err(e) => return Err(anyhow!("broker handshake failed: {}", e)),
        }
    }
}

async fn pump(
    mut eventloop: EventLoop,
    client: AsyncClient,
    topic: String,
    tx: mpsc::Sender<Vec<u8>>,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                // The broker forgets our subscription across reconnects.
                info!("MQTT session re-established, re-subscribing to {}", topic);
                if let Err(e) = client.subscribe(&topic, QoS::AtLeastOnce).await {
                    warn!("MQTT re-subscribe failed: {:?}", e);
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                debug!(
                    "MQTT message on {} ({} bytes)",
                    publish.topic,
                    publish.payload.len()
                );
                if tx.send(publish.payload.to_vec()).await.is_err() {
                    // Worker gone, nothing left to feed.
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("MQTT error: {:?}", e);
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}
