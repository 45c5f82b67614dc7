//! Merges a partial turn-on command with the group's previous state and the
//! configured defaults into one canonical target state.

use super::{
    color::{derive_white_value, temperature_to_chromaticity},
    config::ReconciliationConfig,
    state::{Chromaticity, DeviceAttrs, GroupState},
};

/// Where a resolved value came from. Ordered from oldest to newest
/// information.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Provenance {
    Defaulted,
    CarriedOver,
    Supplied,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub provenance: Provenance,

    /// Computed from another attribute rather than taken from the request.
    /// Derived values are tagged `Supplied`.
    pub derived: bool,
}

impl<T: Copy> Resolved<T> {
    fn pick(requested: Option<T>, previous: Option<T>, default: T, reset_to_default: bool) -> Self {
        let (value, provenance) = match (requested, previous) {
            (Some(value), _) => (value, Provenance::Supplied),
            (None, Some(value)) if !reset_to_default => (value, Provenance::CarriedOver),
            _ => (default, Provenance::Defaulted),
        };

        Resolved {
            value,
            provenance,
            derived: false,
        }
    }

    fn derive(value: T) -> Self {
        Resolved {
            value,
            provenance: Provenance::Supplied,
            derived: true,
        }
    }

    /// Whether this value carries newer information than `other`.
    pub fn is_newer_than<U>(&self, other: &Resolved<U>) -> bool {
        self.provenance > other.provenance
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetState {
    pub brightness: Resolved<u8>,
    pub color_temp: Resolved<u16>,
    pub hs_color: Resolved<Chromaticity>,
    pub white_value: Resolved<u8>,
}

/// Which attributes need an explicit "apply" in outbound commands.
///
/// Every bucket command carries its resolved values unconditionally, so
/// projection doesn't read these. They are logged with the resolution and
/// kept for device protocols that only send changed attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyFlags {
    pub brightness: bool,
    pub color_temp: bool,
    pub hs_color: bool,
    pub white_value: bool,
}

/// The signal that decides on/off and brightness for members that can't
/// render the full target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionBasis {
    Saturation,
    ColorTemperature,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub target: TargetState,
    pub apply: ApplyFlags,
    pub basis: ProjectionBasis,
    pub empty_command: bool,
    pub reset_to_default: bool,
}

pub fn resolve(
    requested: &DeviceAttrs,
    previous: &GroupState,
    was_off: bool,
    config: &ReconciliationConfig,
) -> Resolution {
    let empty_command = requested.is_empty();
    let reset_to_default = was_off || (config.empty_command_resets_to_defaults && empty_command);

    let brightness = Resolved::pick(
        requested.brightness,
        previous.brightness,
        config.default_brightness,
        reset_to_default,
    );
    let color_temp = Resolved::pick(
        requested.color_temp,
        previous.color_temp,
        config.default_color_temperature,
        reset_to_default,
    );
    let mut hs_color = Resolved::pick(
        requested.hs_color,
        previous.hs_color,
        config.default_hs_color(),
        reset_to_default,
    );
    let mut white_value = Resolved::pick(
        requested.white_value,
        previous.white_value,
        config.default_white_value,
        reset_to_default,
    );

    if config.auto_convert_temperature_to_chromaticity
        && !reset_to_default
        && hs_color.provenance != Provenance::Supplied
        && color_temp.is_newer_than(&hs_color)
    {
        hs_color = Resolved::derive(temperature_to_chromaticity(
            color_temp.value,
            previous.min_mireds,
            previous.max_mireds,
        ));
    }

    if config.auto_derive_white_value
        && !reset_to_default
        && white_value.provenance != Provenance::Supplied
        && (brightness.is_newer_than(&white_value)
            || color_temp.is_newer_than(&white_value)
            || hs_color.is_newer_than(&white_value))
    {
        white_value = Resolved::derive(derive_white_value(
            hs_color.value,
            brightness.value,
            config.saturation_threshold_white,
        ));
    }

    let apply = ApplyFlags {
        brightness: needs_apply(&brightness, previous.brightness, was_off, reset_to_default),
        color_temp: needs_apply(&color_temp, previous.color_temp, was_off, reset_to_default),
        hs_color: needs_apply(&hs_color, previous.hs_color, was_off, reset_to_default),
        white_value: needs_apply(&white_value, previous.white_value, was_off, reset_to_default),
    };

    let target = TargetState {
        brightness,
        color_temp,
        hs_color,
        white_value,
    };

    Resolution {
        basis: projection_basis(&target),
        target,
        apply,
        empty_command,
        reset_to_default,
    }
}

fn needs_apply<T: Copy + PartialEq>(
    resolved: &Resolved<T>,
    previous: Option<T>,
    was_off: bool,
    reset_to_default: bool,
) -> bool {
    resolved.provenance == Provenance::Supplied
        || (reset_to_default && (was_off || previous != Some(resolved.value)))
}

/// Chromaticity drives the projection when it is the newer signal; equal
/// provenance goes to chromaticity unless nothing about color was stated at
/// all. A chromaticity derived from the color temperature never outranks it.
fn projection_basis(target: &TargetState) -> ProjectionBasis {
    let hs_color = &target.hs_color;
    let color_temp = &target.color_temp;

    let saturation_wins = if hs_color.derived {
        false
    } else if hs_color.provenance == color_temp.provenance {
        hs_color.provenance != Provenance::Defaulted
    } else {
        hs_color.is_newer_than(color_temp)
    };

    if saturation_wins {
        ProjectionBasis::Saturation
    } else {
        ProjectionBasis::ColorTemperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::state::DeviceAttrsBuilder;

    fn on_state() -> GroupState {
        GroupState {
            is_on: true,
            available: true,
            brightness: Some(100),
            hs_color: Some(Chromaticity::new(10.0, 70.0)),
            color_temp: Some(250),
            white_value: Some(30),
            ..Default::default()
        }
    }

    fn config_without_derivation() -> ReconciliationConfig {
        ReconciliationConfig {
            auto_convert_temperature_to_chromaticity: false,
            auto_derive_white_value: false,
            ..Default::default()
        }
    }

    #[test]
    fn reset_without_attributes_yields_defaults() {
        let config = ReconciliationConfig::default();
        let resolution = resolve(&DeviceAttrs::default(), &on_state(), true, &config);
        let target = resolution.target;

        assert!(resolution.empty_command);
        assert!(resolution.reset_to_default);
        assert_eq!(target.brightness.value, 255);
        assert_eq!(target.color_temp.value, 320);
        assert_eq!(target.hs_color.value, Chromaticity::new(50.0, 40.0));
        assert_eq!(target.white_value.value, 255);

        for provenance in [
            target.brightness.provenance,
            target.color_temp.provenance,
            target.hs_color.provenance,
            target.white_value.provenance,
        ] {
            assert_eq!(provenance, Provenance::Defaulted);
        }
    }

    #[test]
    fn empty_command_while_on_resets_when_configured() {
        let config = ReconciliationConfig::default();
        let resolution = resolve(&DeviceAttrs::default(), &on_state(), false, &config);

        assert!(resolution.reset_to_default);
        assert_eq!(resolution.target.brightness.value, 255);
        assert_eq!(resolution.target.brightness.provenance, Provenance::Defaulted);
    }

    #[test]
    fn empty_command_while_on_carries_over_otherwise() {
        let config = ReconciliationConfig {
            empty_command_resets_to_defaults: false,
            ..Default::default()
        };
        let previous = on_state();
        let resolution = resolve(&DeviceAttrs::default(), &previous, false, &config);
        let target = resolution.target;

        assert!(!resolution.reset_to_default);
        assert_eq!(target.brightness.value, 100);
        assert_eq!(target.color_temp.value, 250);
        assert_eq!(target.hs_color.value, Chromaticity::new(10.0, 70.0));
        assert_eq!(target.white_value.value, 30);

        for provenance in [
            target.brightness.provenance,
            target.color_temp.provenance,
            target.hs_color.provenance,
            target.white_value.provenance,
        ] {
            assert_eq!(provenance, Provenance::CarriedOver);
        }

        assert_eq!(resolution.apply, ApplyFlags::default());
        // both colors carried over: saturation decides
        assert_eq!(resolution.basis, ProjectionBasis::Saturation);
    }

    #[test]
    fn missing_previous_value_falls_back_to_default() {
        let previous = GroupState {
            brightness: None,
            ..on_state()
        };
        let attrs = DeviceAttrsBuilder::default()
            .white_value(12u8)
            .build()
            .unwrap();
        let resolution = resolve(&attrs, &previous, false, &config_without_derivation());

        assert_eq!(resolution.target.brightness.value, 255);
        assert_eq!(resolution.target.brightness.provenance, Provenance::Defaulted);
        assert!(!resolution.apply.brightness);
        assert_eq!(resolution.target.white_value.provenance, Provenance::Supplied);
        assert!(resolution.apply.white_value);
    }

    #[test]
    fn apply_flags_on_reset_follow_changes() {
        let previous = GroupState {
            brightness: Some(255),
            color_temp: Some(200),
            ..on_state()
        };
        let config = config_without_derivation();
        let resolution = resolve(&DeviceAttrs::default(), &previous, false, &config);

        // brightness already at its default, color temperature is not
        assert!(!resolution.apply.brightness);
        assert!(resolution.apply.color_temp);

        let resolution = resolve(&DeviceAttrs::default(), &previous, true, &config);
        assert!(resolution.apply.brightness);
        assert!(resolution.apply.color_temp);
        assert!(resolution.apply.hs_color);
        assert!(resolution.apply.white_value);
    }

    #[test]
    fn supplied_temperature_drives_chromaticity_and_white() {
        let config = ReconciliationConfig::default();
        let attrs = DeviceAttrsBuilder::default()
            .color_temp(300u16)
            .build()
            .unwrap();
        let resolution = resolve(&attrs, &on_state(), false, &config);
        let target = resolution.target;

        let expected_hs = temperature_to_chromaticity(300, 154, 500);
        assert_eq!(target.hs_color.value, expected_hs);
        assert_eq!(target.hs_color.provenance, Provenance::Supplied);
        assert!(target.hs_color.derived);
        assert!(resolution.apply.hs_color);

        assert_eq!(target.brightness.value, 100);
        assert_eq!(target.brightness.provenance, Provenance::CarriedOver);
        assert_eq!(
            target.white_value.value,
            derive_white_value(expected_hs, 100, config.saturation_threshold_white)
        );
        assert!(target.white_value.derived);

        assert_eq!(resolution.basis, ProjectionBasis::ColorTemperature);
    }

    #[test]
    fn temperature_conversion_uses_group_range() {
        let previous = GroupState {
            min_mireds: 200,
            max_mireds: 370,
            ..on_state()
        };
        let attrs = DeviceAttrsBuilder::default()
            .color_temp(450u16)
            .build()
            .unwrap();
        let resolution = resolve(&attrs, &previous, false, &ReconciliationConfig::default());

        assert_eq!(resolution.target.color_temp.value, 450);
        assert_eq!(
            resolution.target.hs_color.value,
            temperature_to_chromaticity(370, 154, 500)
        );
    }

    #[test]
    fn carried_over_temperature_fills_missing_chromaticity() {
        let previous = GroupState {
            hs_color: None,
            ..on_state()
        };
        let attrs = DeviceAttrsBuilder::default()
            .brightness(40u8)
            .build()
            .unwrap();
        let resolution = resolve(&attrs, &previous, false, &ReconciliationConfig::default());

        assert_eq!(resolution.target.color_temp.provenance, Provenance::CarriedOver);
        assert!(resolution.target.hs_color.derived);
        assert_eq!(
            resolution.target.hs_color.value,
            temperature_to_chromaticity(250, 154, 500)
        );
        assert_eq!(resolution.basis, ProjectionBasis::ColorTemperature);
    }

    #[test]
    fn no_cross_derivation_on_reset() {
        let attrs = DeviceAttrsBuilder::default()
            .color_temp(300u16)
            .build()
            .unwrap();
        let resolution = resolve(&attrs, &on_state(), true, &ReconciliationConfig::default());

        assert_eq!(resolution.target.hs_color.value, Chromaticity::new(50.0, 40.0));
        assert_eq!(resolution.target.hs_color.provenance, Provenance::Defaulted);
        assert!(!resolution.target.white_value.derived);
        assert_eq!(resolution.target.white_value.value, 255);
    }

    #[test]
    fn toggles_disable_cross_derivation() {
        let attrs = DeviceAttrsBuilder::default()
            .color_temp(300u16)
            .build()
            .unwrap();
        let resolution = resolve(&attrs, &on_state(), false, &config_without_derivation());

        assert_eq!(resolution.target.hs_color.value, Chromaticity::new(10.0, 70.0));
        assert_eq!(resolution.target.hs_color.provenance, Provenance::CarriedOver);
        assert_eq!(resolution.target.white_value.value, 30);
        assert_eq!(resolution.basis, ProjectionBasis::ColorTemperature);
    }

    #[test]
    fn supplied_white_value_is_kept() {
        let attrs = DeviceAttrsBuilder::default()
            .brightness(200u8)
            .white_value(7u8)
            .build()
            .unwrap();
        let resolution = resolve(&attrs, &on_state(), false, &ReconciliationConfig::default());

        assert_eq!(resolution.target.white_value.value, 7);
        assert!(!resolution.target.white_value.derived);
    }

    #[test]
    fn brightness_change_recomputes_white() {
        let previous = GroupState {
            hs_color: Some(Chromaticity::new(30.0, 20.0)),
            ..on_state()
        };
        let attrs = DeviceAttrsBuilder::default()
            .brightness(180u8)
            .build()
            .unwrap();
        let config = ReconciliationConfig::default();
        let resolution = resolve(&attrs, &previous, false, &config);

        assert!(!resolution.target.hs_color.derived);
        assert_eq!(
            resolution.target.white_value.value,
            derive_white_value(Chromaticity::new(30.0, 20.0), 180, 55.0)
        );
    }

    #[test]
    fn chromaticity_wins_when_both_colors_supplied() {
        let attrs = DeviceAttrsBuilder::default()
            .color_temp(300u16)
            .hs_color(Chromaticity::new(240.0, 90.0))
            .build()
            .unwrap();
        let resolution = resolve(&attrs, &on_state(), false, &ReconciliationConfig::default());

        assert_eq!(resolution.target.color_temp.value, 300);
        assert_eq!(resolution.target.hs_color.value, Chromaticity::new(240.0, 90.0));
        assert!(!resolution.target.hs_color.derived);
        assert_eq!(resolution.basis, ProjectionBasis::Saturation);
    }

    #[test]
    fn supplied_chromaticity_is_the_basis() {
        let attrs = DeviceAttrsBuilder::default()
            .hs_color(Chromaticity::new(120.0, 80.0))
            .build()
            .unwrap();
        let resolution = resolve(&attrs, &on_state(), false, &ReconciliationConfig::default());
        assert_eq!(resolution.basis, ProjectionBasis::Saturation);
        assert_eq!(resolution.target.white_value.value, 0);
    }

    #[test]
    fn turning_on_from_off_uses_temperature_basis() {
        let resolution = resolve(
            &DeviceAttrs::default(),
            &GroupState::default(),
            true,
            &ReconciliationConfig::default(),
        );
        assert_eq!(resolution.basis, ProjectionBasis::ColorTemperature);
    }

    #[test]
    fn repeated_command_does_not_drift() {
        let config = ReconciliationConfig::default();
        let attrs = DeviceAttrsBuilder::default()
            .brightness(120u8)
            .color_temp(280u16)
            .hs_color(Chromaticity::new(30.0, 25.0))
            .white_value(90u8)
            .build()
            .unwrap();
        let previous = GroupState {
            brightness: Some(120),
            color_temp: Some(280),
            hs_color: Some(Chromaticity::new(30.0, 25.0)),
            white_value: Some(90),
            ..on_state()
        };

        let first = resolve(&attrs, &previous, false, &config);
        let second = resolve(&attrs, &previous, false, &config);
        assert_eq!(first, second);
        assert_eq!(first.target.brightness.value, 120);
        assert_eq!(first.target.white_value.value, 90);
    }
}
