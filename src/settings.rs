use serde::Deserialize;

use crate::group::config::ReconciliationConfig;

#[derive(Clone, Deserialize, Debug)]
pub struct MqttSettings {
    pub id: String,
    pub host: String,
    pub port: u16,

    /// Member lights publish their state here, groups publish theirs.
    pub light_topic: String,

    /// Commands for member lights and groups.
    pub light_topic_set: String,
}

fn default_group_name() -> String {
    "Smart Light Group".to_string()
}

#[derive(Clone, Deserialize, Debug)]
pub struct GroupSettings {
    pub id: String,

    #[serde(default = "default_group_name")]
    pub name: String,

    pub members: Vec<String>,

    #[serde(flatten)]
    pub reconciliation: ReconciliationConfig,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Settings {
    pub mqtt: MqttSettings,
    pub groups: Vec<GroupSettings>,
}

pub fn read_settings() -> Result<Settings, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name("Settings"))
        .build()?
        .try_deserialize::<Settings>()
}
