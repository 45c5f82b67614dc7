use std::fmt;

use thiserror::Error;

use super::capability::CapabilityBucket;

/// Invalid group configuration. Fatal: the group is not created.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("light group {0:?} has no members")]
    NoMembers(String),

    #[error("light group {0:?} lists itself as a member")]
    SelfMember(String),

    #[error("{name} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("lower color temperature threshold ({lower}) is above the upper threshold ({upper})")]
    InvertedTemperatureThresholds { lower: u16, upper: u16 },

    #[error("default color temperature must be greater than zero")]
    ZeroColorTemperature,
}

/// One bucket command that the device-control interface rejected.
#[derive(Debug)]
pub struct BucketFailure {
    pub bucket: CapabilityBucket,
    pub member_ids: Vec<String>,
    pub error: eyre::Report,
}

impl fmt::Display for BucketFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} bucket {:?}: {}",
            self.bucket, self.member_ids, self.error
        )
    }
}

/// Some bucket commands of a turn-on failed.
///
/// Bucket commands are not atomic as a whole: commands for the buckets that
/// are not listed here have already been applied and are not rolled back.
#[derive(Debug, Error)]
#[error("{} of {attempted} bucket commands failed: {}", .failures.len(), join(.failures))]
pub struct DispatchError {
    pub attempted: usize,
    pub failures: Vec<BucketFailure>,
}

fn join(failures: &[BucketFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum GroupError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("failed to turn off light group members: {0}")]
    TurnOff(eyre::Report),
}
