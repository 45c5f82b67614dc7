use std::sync::Arc;

use color_eyre::Result;
use log::info;
use smart_light_group::{
    group::LightGroup,
    mqtt::{
        device_control::MqttDeviceControl,
        events::{start_group_state_publisher, start_mqtt_events_loop},
    },
    protocols::mqtt::mk_mqtt_client,
    settings::read_settings,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();

    let settings = read_settings()?;
    let (mqtt_client, eventloop) = mk_mqtt_client(&settings);
    let device_control = MqttDeviceControl::new(&mqtt_client, &settings);

    let groups = settings
        .groups
        .iter()
        .map(|group| LightGroup::from_settings(group, device_control.clone()).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;
    let groups = Arc::new(groups);

    for group in groups.iter() {
        start_group_state_publisher(group, &mqtt_client, &settings);
    }
    start_mqtt_events_loop(eventloop, &mqtt_client, &settings, &groups);

    info!(
        "Serving {} light group(s) via {}:{}",
        groups.len(),
        settings.mqtt.host,
        settings.mqtt.port
    );

    tokio::signal::ctrl_c().await?;

    Ok(())
}
