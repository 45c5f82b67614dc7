use rumqttc::{AsyncClient, EventLoop, MqttOptions};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;

use crate::{group::state::MemberState, settings::Settings};

/// Last state published by each member light, keyed by member id.
pub type MemberStates = Arc<RwLock<HashMap<String, MemberState>>>;

#[derive(Clone)]
pub struct MqttClient {
    pub client: AsyncClient,
    pub member_states: MemberStates,
}

/// Creates the client. The returned event loop must be driven, see
/// [`crate::mqtt::events::start_mqtt_events_loop`].
pub fn mk_mqtt_client(settings: &Settings) -> (MqttClient, EventLoop) {
    let mut options = MqttOptions::new(
        settings.mqtt.id.clone(),
        settings.mqtt.host.clone(),
        settings.mqtt.port,
    );
    options.set_keep_alive(Duration::from_secs(5));
    let (client, eventloop) = AsyncClient::new(options, 10);

    let mqtt_client = MqttClient {
        client,
        member_states: Default::default(),
    };

    (mqtt_client, eventloop)
}

/// Fills in the `{id}` placeholder of a topic template.
pub fn topic_for(template: &str, id: &str) -> String {
    template.replace("{id}", id)
}

/// Extracts the `{id}` part of a topic published under `template`.
pub fn topic_id<'a>(template: &str, topic: &'a str) -> Option<&'a str> {
    let (prefix, suffix) = template.split_once("{id}")?;
    let id = topic.strip_prefix(prefix)?.strip_suffix(suffix)?;

    // `+` subscriptions only match a single topic level
    if id.is_empty() || id.contains('/') {
        None
    } else {
        Some(id)
    }
}
