use color_eyre::Result;
use futures::future::try_join_all;
use rumqttc::QoS;

use super::payload::LightCommand;
use crate::{
    group::{
        dispatch::DeviceControl,
        state::{DeviceAttrs, MemberState},
    },
    protocols::mqtt::{topic_for, MqttClient},
    settings::Settings,
};

/// Drives member lights by publishing commands to their set topics. Member
/// state comes from the cache the MQTT event loop keeps up to date.
#[derive(Clone)]
pub struct MqttDeviceControl {
    mqtt_client: MqttClient,
    light_topic_set: String,
}

impl MqttDeviceControl {
    pub fn new(mqtt_client: &MqttClient, settings: &Settings) -> Self {
        MqttDeviceControl {
            mqtt_client: mqtt_client.clone(),
            light_topic_set: settings.mqtt.light_topic_set.clone(),
        }
    }

    async fn publish(&self, member_ids: &[String], command: &LightCommand) -> Result<()> {
        let json = serde_json::to_string(command)?;

        try_join_all(member_ids.iter().map(|id| {
            self.mqtt_client.client.publish(
                topic_for(&self.light_topic_set, id),
                QoS::AtLeastOnce,
                false,
                json.clone(),
            )
        }))
        .await?;

        Ok(())
    }
}

impl DeviceControl for MqttDeviceControl {
    async fn set_state(&self, member_ids: &[String], attrs: &DeviceAttrs) -> Result<()> {
        self.publish(member_ids, &LightCommand::turn_on(attrs)).await
    }

    async fn turn_off(&self, member_ids: &[String], transition_ms: Option<u32>) -> Result<()> {
        self.publish(member_ids, &LightCommand::turn_off(transition_ms))
            .await
    }

    async fn get_state(&self, member_id: &str) -> Option<MemberState> {
        self.mqtt_client
            .member_states
            .read()
            .await
            .get(member_id)
            .cloned()
    }
}
