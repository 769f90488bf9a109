// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/guardiao-rs

//! Synthetic sensor publisher for demo mode

use std::time::Duration;

use rand::Rng;
use rumqttc::{AsyncClient, QoS};
use serde_json::json;
use tokio::time;
use tracing::{info, warn};

/// Publish simulated readings to `topic` at a fixed interval, forever.
///
/// Mimics the field hardware closely enough to exercise the whole pipeline:
/// most transmissions carry the full metric set, but about one in five
/// arrives with a metric missing, which extraction downstream must tolerate.
pub async fn run_publisher(client: AsyncClient, topic: String, interval: Duration) {
    info!("Demo publisher active on '{}' every {:?}", topic, interval);
    let mut ticker = time::interval(interval);
    loop {
        ticker.tick().await;
        let payload = synth_reading();
        if let Err(e) = client.publish(&topic, QoS::AtLeastOnce, false, payload).await {
            warn!("Demo publish failed: {:?}", e);
        }
    }
}

const METRICS: [&str; 5] = [
    "water_level",
    "rainfall_intensity",
    "temperature",
    "humidity",
    "smoke_concentration",
];

fn synth_reading() -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut reading = json!({
        "water_level": round1(rng.gen_range(10.0..95.0)),
        "rainfall_intensity": round1(rng.gen_range(0.0..100.0)),
        "temperature": round1(rng.gen_range(15.0..45.0)),
        "humidity": round1(rng.gen_range(20.0..95.0)),
        "smoke_concentration": round1(rng.gen_range(0.0..60.0)),
    });

    if rng.gen_bool(0.2) {
        let dropped = METRICS[rng.gen_range(0..METRICS.len())];
        if let Some(obj) = reading.as_object_mut() {
            obj.remove(dropped);
        }
    }

    serde_json::to_vec(&reading).unwrap_or_default()
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
