use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::color::{DEFAULT_MAX_MIREDS, DEFAULT_MIN_MIREDS};

/// Hue (0 - 360) and saturation (0 - 100), independent of brightness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Chromaticity {
    pub hue: f32,
    pub saturation: f32,
}

impl Chromaticity {
    pub fn new(hue: f32, saturation: f32) -> Self {
        Chromaticity { hue, saturation }
    }
}

/// Partial set of light attributes. Every `None` field means "not supplied".
#[derive(Builder, Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[builder(setter(into, strip_option), default)]
pub struct DeviceAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,

    /// Color temperature in mireds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_temp: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_color: Option<Chromaticity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_value: Option<u8>,

    /// Transition time measured in ms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_ms: Option<u32>,
}

impl DeviceAttrs {
    /// True when none of the four light attributes were supplied. A bare
    /// transition does not count as an attribute.
    pub fn is_empty(&self) -> bool {
        self.brightness.is_none()
            && self.color_temp.is_none()
            && self.hs_color.is_none()
            && self.white_value.is_none()
    }
}

/// Last reported state of a single member light.
#[derive(Builder, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct MemberState {
    pub power: bool,
    pub available: bool,
    pub brightness: Option<u8>,
    pub hs_color: Option<Chromaticity>,
    pub color_temp: Option<u16>,
    pub min_mireds: Option<u16>,
    pub max_mireds: Option<u16>,
    pub white_value: Option<u8>,
    pub effect: Option<String>,
    pub effect_list: Option<Vec<String>>,

    /// Feature bitmask, see [`super::capability`]
    pub supported_features: u32,
}

impl Default for MemberState {
    fn default() -> Self {
        MemberState {
            power: false,
            available: true,
            brightness: None,
            hs_color: None,
            color_temp: None,
            min_mireds: None,
            max_mireds: None,
            white_value: None,
            effect: None,
            effect_list: None,
            supported_features: 0,
        }
    }
}

impl MemberState {
    pub fn is_on(&self) -> bool {
        self.available && self.power
    }
}

/// The group's own canonical state, as derived from its members by the
/// aggregator.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupState {
    pub is_on: bool,
    pub available: bool,
    pub brightness: Option<u8>,
    pub hs_color: Option<Chromaticity>,
    pub color_temp: Option<u16>,
    pub min_mireds: u16,
    pub max_mireds: u16,
    pub white_value: Option<u8>,
    pub effect_list: Option<Vec<String>>,
    pub effect: Option<String>,
    pub supported_features: u32,
}

impl Default for GroupState {
    fn default() -> Self {
        GroupState {
            is_on: false,
            available: false,
            brightness: None,
            hs_color: None,
            color_temp: None,
            min_mireds: DEFAULT_MIN_MIREDS,
            max_mireds: DEFAULT_MAX_MIREDS,
            white_value: None,
            effect_list: None,
            effect: None,
            supported_features: 0,
        }
    }
}

impl From<&GroupState> for MemberState {
    /// Lets a group publish itself in the same shape as its members, so
    /// groups can be nested.
    fn from(state: &GroupState) -> Self {
        MemberState {
            power: state.is_on,
            available: state.available,
            brightness: state.brightness,
            hs_color: state.hs_color,
            color_temp: state.color_temp,
            min_mireds: Some(state.min_mireds),
            max_mireds: Some(state.max_mireds),
            white_value: state.white_value,
            effect: state.effect.clone(),
            effect_list: state.effect_list.clone(),
            supported_features: state.supported_features,
        }
    }
}
