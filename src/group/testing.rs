//! In-memory device control for tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use color_eyre::Result;
use eyre::eyre;

use super::{
    dispatch::DeviceControl,
    state::{DeviceAttrs, MemberState},
};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    SetState(Vec<String>, DeviceAttrs),
    TurnOff(Vec<String>, Option<u32>),
}

/// Serves member states and records every command it receives. Commands
/// touching a member marked as failing are recorded and rejected.
#[derive(Default)]
pub struct FakeDevices {
    states: Mutex<HashMap<String, MemberState>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeDevices {
    pub fn with_member(self, id: &str, state: MemberState) -> Self {
        self.set_member(id, state);
        self
    }

    /// Replaces the state a member reports from now on.
    pub fn set_member(&self, id: &str, state: MemberState) {
        self.states.lock().unwrap().insert(id.to_string(), state);
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, member_ids: &[String], call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);

        match member_ids.iter().find(|id| self.failing.contains(*id)) {
            Some(id) => Err(eyre!("member {id} did not respond")),
            None => Ok(()),
        }
    }
}

impl DeviceControl for FakeDevices {
    async fn set_state(&self, member_ids: &[String], attrs: &DeviceAttrs) -> Result<()> {
        self.record(member_ids, Call::SetState(member_ids.to_vec(), attrs.clone()))
    }

    async fn turn_off(&self, member_ids: &[String], transition_ms: Option<u32>) -> Result<()> {
        self.record(member_ids, Call::TurnOff(member_ids.to_vec(), transition_ms))
    }

    async fn get_state(&self, member_id: &str) -> Option<MemberState> {
        self.states.lock().unwrap().get(member_id).cloned()
    }
}
