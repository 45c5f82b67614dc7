use serde::{Deserialize, Serialize};

use super::{error::ConfigError, state::Chromaticity};

/// Per-group reconciliation options. Every option has a default, so a group
/// only needs to list what it changes.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    pub default_brightness: u8,
    /// Mireds
    pub default_color_temperature: u16,
    pub default_hue: f32,
    pub default_saturation: f32,
    pub default_white_value: u8,

    /// Color temperature range (mireds) that plain white lights can render.
    pub lower_color_temp_threshold_white: u16,
    pub upper_color_temp_threshold_white: u16,

    /// Colors at or above this saturation (0 - 100) can't be rendered by
    /// white lights.
    pub saturation_threshold_white: f32,

    /// Non-dimmable lights turn on only above this brightness.
    pub non_dimmable_brightness_threshold: u8,

    pub auto_convert_temperature_to_chromaticity: bool,
    pub auto_derive_white_value: bool,
    pub empty_command_resets_to_defaults: bool,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        ReconciliationConfig {
            default_brightness: 255,
            default_color_temperature: 320,
            default_hue: 50.0,
            default_saturation: 40.0,
            default_white_value: 255,
            lower_color_temp_threshold_white: 175,
            upper_color_temp_threshold_white: 450,
            saturation_threshold_white: 55.0,
            non_dimmable_brightness_threshold: 205,
            auto_convert_temperature_to_chromaticity: true,
            auto_derive_white_value: true,
            empty_command_resets_to_defaults: true,
        }
    }
}

impl ReconciliationConfig {
    pub fn default_hs_color(&self) -> Chromaticity {
        Chromaticity::new(self.default_hue, self.default_saturation)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("saturation_threshold_white", self.saturation_threshold_white, 0.0, 100.0)?;
        check_range("default_saturation", self.default_saturation, 0.0, 100.0)?;
        check_range("default_hue", self.default_hue, 0.0, 360.0)?;

        if self.lower_color_temp_threshold_white > self.upper_color_temp_threshold_white {
            return Err(ConfigError::InvertedTemperatureThresholds {
                lower: self.lower_color_temp_threshold_white,
                upper: self.upper_color_temp_threshold_white,
            });
        }

        if self.default_color_temperature == 0 {
            return Err(ConfigError::ZeroColorTemperature);
        }

        Ok(())
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    // NaN fails the range check as well
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}
