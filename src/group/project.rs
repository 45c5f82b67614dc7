//! Projects a resolved target state onto each capability bucket.

use super::{
    capability::{Buckets, CapabilityBucket},
    config::ReconciliationConfig,
    resolve::{ProjectionBasis, Resolution},
    state::DeviceAttrs,
};

#[derive(Clone, Debug, PartialEq)]
pub enum MemberCommand {
    TurnOn(DeviceAttrs),
    TurnOff { transition_ms: Option<u32> },
}

/// One command addressed to every member of a bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketCommand {
    pub bucket: CapabilityBucket,
    pub member_ids: Vec<String>,
    pub command: MemberCommand,
}

/// Whether the target can be rendered by a light without a color channel,
/// judged on the resolution's projection basis.
fn renders_as_white(resolution: &Resolution, config: &ReconciliationConfig) -> bool {
    let target = &resolution.target;

    match resolution.basis {
        ProjectionBasis::Saturation => {
            target.hs_color.value.saturation < config.saturation_threshold_white
        }
        ProjectionBasis::ColorTemperature => (config.lower_color_temp_threshold_white
            ..=config.upper_color_temp_threshold_white)
            .contains(&target.color_temp.value),
    }
}

pub fn project(
    resolution: &Resolution,
    buckets: &Buckets,
    config: &ReconciliationConfig,
    transition_ms: Option<u32>,
) -> Vec<BucketCommand> {
    let target = &resolution.target;
    let brightness = target.brightness.value;
    let white = renders_as_white(resolution, config);

    let turn_on = |attrs: DeviceAttrs| {
        MemberCommand::TurnOn(DeviceAttrs {
            transition_ms,
            ..attrs
        })
    };

    buckets
        .iter()
        .map(|(bucket, member_ids)| {
            let command = match bucket {
                CapabilityBucket::OnOffOnly => {
                    if white && brightness > config.non_dimmable_brightness_threshold {
                        turn_on(DeviceAttrs::default())
                    } else {
                        MemberCommand::TurnOff { transition_ms }
                    }
                }
                CapabilityBucket::DimmableOnly => turn_on(DeviceAttrs {
                    brightness: Some(if white { brightness } else { 0 }),
                    ..Default::default()
                }),
                CapabilityBucket::TemperatureOnly => {
                    let dimmed = resolution.basis == ProjectionBasis::Saturation && !white;

                    turn_on(DeviceAttrs {
                        brightness: Some(if dimmed { 0 } else { brightness }),
                        color_temp: Some(target.color_temp.value),
                        ..Default::default()
                    })
                }
                CapabilityBucket::ColorOnly => turn_on(DeviceAttrs {
                    brightness: Some(brightness),
                    hs_color: Some(target.hs_color.value),
                    ..Default::default()
                }),
                CapabilityBucket::ColorAndWhite => turn_on(DeviceAttrs {
                    brightness: Some(brightness),
                    hs_color: Some(target.hs_color.value),
                    white_value: Some(target.white_value.value),
                    ..Default::default()
                }),
                // Color temperature and chromaticity are exclusive modes on
                // these lights, only one of them is sent.
                CapabilityBucket::FullColor => match resolution.basis {
                    ProjectionBasis::ColorTemperature => turn_on(DeviceAttrs {
                        brightness: Some(brightness),
                        color_temp: Some(target.color_temp.value),
                        ..Default::default()
                    }),
                    ProjectionBasis::Saturation => turn_on(DeviceAttrs {
                        brightness: Some(brightness),
                        hs_color: Some(target.hs_color.value),
                        ..Default::default()
                    }),
                },
            };

            BucketCommand {
                bucket,
                member_ids: member_ids.to_vec(),
                command,
            }
        })
        .collect()
}
