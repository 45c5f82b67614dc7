use std::future::Future;

use color_eyre::Result;
use futures::future::join_all;
use log::{debug, warn};

use super::{
    error::{BucketFailure, DispatchError},
    project::{BucketCommand, MemberCommand},
    state::{DeviceAttrs, MemberState},
};

/// Device-control interface the group drives its members through.
///
/// The group never talks to hardware itself. Implementations own timeouts
/// and retries; every call is treated as either applied or failed.
pub trait DeviceControl: Send + Sync {
    fn set_state(
        &self,
        member_ids: &[String],
        attrs: &DeviceAttrs,
    ) -> impl Future<Output = Result<()>> + Send;

    fn turn_off(
        &self,
        member_ids: &[String],
        transition_ms: Option<u32>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Last known state of a member, `None` if the member never reported.
    fn get_state(&self, member_id: &str) -> impl Future<Output = Option<MemberState>> + Send;
}

async fn send<D: DeviceControl>(control: &D, command: &BucketCommand) -> Result<()> {
    match &command.command {
        MemberCommand::TurnOn(attrs) => control.set_state(&command.member_ids, attrs).await,
        MemberCommand::TurnOff { transition_ms } => {
            control.turn_off(&command.member_ids, *transition_ms).await
        }
    }
}

/// Sends all bucket commands concurrently and waits for every one of them to
/// finish. A failing bucket doesn't stop or undo the others.
pub async fn dispatch<D: DeviceControl>(
    control: &D,
    commands: Vec<BucketCommand>,
) -> Result<(), DispatchError> {
    let attempted = commands.len();
    let results = join_all(commands.iter().map(|command| send(control, command))).await;

    let failures: Vec<BucketFailure> = commands
        .into_iter()
        .zip(results)
        .filter_map(|(command, result)| match result {
            Ok(()) => {
                debug!("{:?} bucket {:?} applied", command.bucket, command.member_ids);
                None
            }
            Err(error) => Some(BucketFailure {
                bucket: command.bucket,
                member_ids: command.member_ids,
                error,
            }),
        })
        .collect();

    if failures.is_empty() {
        return Ok(());
    }

    let error = DispatchError {
        attempted,
        failures,
    };
    warn!("Light group partially applied: {error}");

    Err(error)
}
