use color_eyre::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::group::state::DeviceAttrs;

/// Light command as sent to members and received for groups.
///
/// A command without `power` turns the light on.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct LightCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,

    #[serde(flatten)]
    pub attrs: DeviceAttrs,
}

impl LightCommand {
    pub fn turn_on(attrs: &DeviceAttrs) -> Self {
        LightCommand {
            power: Some(true),
            attrs: attrs.clone(),
        }
    }

    pub fn turn_off(transition_ms: Option<u32>) -> Self {
        LightCommand {
            power: Some(false),
            attrs: DeviceAttrs {
                transition_ms,
                ..Default::default()
            },
        }
    }

    pub fn is_turn_off(&self) -> bool {
        self.power == Some(false)
    }
}

/// Decodes a JSON payload, reporting the path of the offending field.
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_slice(payload);
    let value: T = serde_path_to_error::deserialize(de)?;

    Ok(value)
}
