use std::{sync::Arc, time::Duration};

use color_eyre::Result;
use log::{error, warn};
use rumqttc::{EventLoop, QoS, SubscribeFilter};

use super::{
    device_control::MqttDeviceControl,
    payload::{decode, LightCommand},
};
use crate::{
    group::{
        state::{GroupState, MemberState},
        LightGroup,
    },
    protocols::mqtt::{topic_for, topic_id, MqttClient},
    settings::Settings,
};

pub type Groups = Arc<Vec<Arc<LightGroup<MqttDeviceControl>>>>;

pub async fn handle_incoming_mqtt_event(
    event: rumqttc::Event,
    mqtt_client: &MqttClient,
    settings: &Settings,
    groups: &Groups,
) -> Result<()> {
    match event {
        rumqttc::Event::Incoming(rumqttc::Packet::ConnAck(_)) => {
            // Member states, and commands addressed to our groups
            let filters: Vec<SubscribeFilter> =
                std::iter::once(topic_for(&settings.mqtt.light_topic, "+"))
                    .chain(
                        groups
                            .iter()
                            .map(|group| topic_for(&settings.mqtt.light_topic_set, group.id())),
                    )
                    .map(|topic| SubscribeFilter::new(topic, QoS::AtMostOnce))
                    .collect();

            // The request queue may still be full of publishes from before
            // the reconnect, and only this loop drains it.
            let client = mqtt_client.client.clone();
            tokio::spawn(async move {
                if let Err(e) = client.subscribe_many(filters).await {
                    error!("Error while subscribing to light topics: {}", e);
                }
            });
        }
        rumqttc::Event::Incoming(rumqttc::Packet::Publish(msg)) => {
            if let Some(id) = topic_id(&settings.mqtt.light_topic_set, &msg.topic) {
                let Some(group) = groups.iter().find(|group| group.id() == id) else {
                    return Ok(());
                };

                let command: LightCommand = decode(&msg.payload)?;
                let group = group.clone();

                // Commands wait for every member to answer, which needs the
                // event loop to keep running.
                tokio::spawn(async move {
                    let result = if command.is_turn_off() {
                        group.turn_off(command.attrs.transition_ms).await
                    } else {
                        group.turn_on(&command.attrs).await
                    };

                    if let Err(e) = result {
                        error!(
                            "Error while handling command for light group {}: {}",
                            group.id(),
                            e
                        );
                    }
                });
            } else if let Some(id) = topic_id(&settings.mqtt.light_topic, &msg.topic) {
                let state: MemberState = decode(&msg.payload)?;

                {
                    let mut member_states = mqtt_client.member_states.write().await;
                    member_states.insert(id.to_string(), state);
                }

                for group in groups.iter() {
                    group.on_member_state_changed(id).await;
                }
            }
        }
        _ => {}
    }

    Ok(())
}

pub fn start_mqtt_events_loop(
    mut eventloop: EventLoop,
    mqtt_client: &MqttClient,
    settings: &Settings,
    groups: &Groups,
) {
    let mqtt_client = mqtt_client.clone();
    let settings = settings.clone();
    let groups = groups.clone();

    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(event) => {
                    let result =
                        handle_incoming_mqtt_event(event, &mqtt_client, &settings, &groups).await;

                    if let Err(e) = result {
                        warn!("Error while processing MQTT message: {:?}", e);
                    }
                }
                Err(e) => {
                    error!("MQTT connection error: {}. Reconnecting in 5 seconds...", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    });
}

pub async fn publish_group_state(
    mqtt_client: &MqttClient,
    topic: &str,
    state: &GroupState,
) -> Result<()> {
    let json = serde_json::to_string(&MemberState::from(state))?;

    mqtt_client
        .client
        .publish(topic, QoS::AtLeastOnce, true, json)
        .await?;

    Ok(())
}

/// Publishes every new state of `group` to its state topic, retained.
pub fn start_group_state_publisher(
    group: &Arc<LightGroup<MqttDeviceControl>>,
    mqtt_client: &MqttClient,
    settings: &Settings,
) {
    let mut rx = group.subscribe();
    let topic = topic_for(&settings.mqtt.light_topic, group.id());
    let mqtt_client = mqtt_client.clone();

    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            let result = publish_group_state(&mqtt_client, &topic, &state).await;

            if let Err(e) = result {
                error!("Error while publishing light group state to {}: {:?}", topic, e);
            }
        }
    });
}
