//! A virtual light made of heterogeneous member lights.
//!
//! Writes resolve a partial command against the group's last known state,
//! project it onto each capability bucket and fan the bucket commands out to
//! the members. Reads aggregate member states into the group's own state,
//! which the next write treats as its previous state.

use log::{debug, info};
use tokio::sync::{watch, RwLock};

use crate::settings::GroupSettings;

use self::{
    aggregate::aggregate,
    capability::{Buckets, MemberDevice},
    config::ReconciliationConfig,
    dispatch::{dispatch, DeviceControl},
    error::{ConfigError, GroupError},
    project::project,
    resolve::resolve,
    state::{DeviceAttrs, GroupState, MemberState},
};

pub mod aggregate;
pub mod capability;
pub mod color;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod project;
pub mod resolve;
pub mod state;

#[cfg(test)]
pub mod testing;

pub struct LightGroup<D> {
    id: String,
    name: String,
    members: Vec<String>,
    config: ReconciliationConfig,
    control: D,

    // Written only by `update`. Writes read it as their previous state.
    state: RwLock<GroupState>,
    state_tx: watch::Sender<GroupState>,
}

impl<D: DeviceControl> LightGroup<D> {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        members: Vec<String>,
        config: ReconciliationConfig,
        control: D,
    ) -> Result<Self, ConfigError> {
        let id = id.into();

        if members.is_empty() {
            return Err(ConfigError::NoMembers(id));
        }
        // Its own state and commands would feed back into it over MQTT
        if members.contains(&id) {
            return Err(ConfigError::SelfMember(id));
        }
        config.validate()?;

        let (state_tx, _) = watch::channel(GroupState::default());

        Ok(LightGroup {
            id,
            name: name.into(),
            members,
            config,
            control,
            state: RwLock::new(GroupState::default()),
            state_tx,
        })
    }

    pub fn from_settings(settings: &GroupSettings, control: D) -> Result<Self, ConfigError> {
        let group = LightGroup::new(
            settings.id.clone(),
            settings.name.clone(),
            settings.members.clone(),
            settings.reconciliation.clone(),
            control,
        )?;

        info!(
            "Created light group {} ({}) with members {:?}",
            group.name, group.id, group.members
        );

        Ok(group)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, member_id: &str) -> bool {
        self.members.iter().any(|id| id == member_id)
    }

    pub async fn state(&self) -> GroupState {
        self.state.read().await.clone()
    }

    /// Receives every state produced by [`LightGroup::update`].
    pub fn subscribe(&self) -> watch::Receiver<GroupState> {
        self.state_tx.subscribe()
    }

    async fn member_states(&self) -> Vec<(&str, Option<MemberState>)> {
        let mut states = Vec::with_capacity(self.members.len());

        for id in &self.members {
            states.push((id.as_str(), self.control.get_state(id).await));
        }

        states
    }

    /// Classifies the members as they are right now. Capabilities can change
    /// between calls, so this is never cached.
    pub async fn classify(&self) -> Buckets {
        let members: Vec<MemberDevice> = self
            .member_states()
            .await
            .into_iter()
            .filter_map(|(id, state)| MemberDevice::from_state(id, state.as_ref()))
            .collect();

        Buckets::classify(&members)
    }

    pub async fn turn_on(&self, attrs: &DeviceAttrs) -> Result<(), GroupError> {
        let previous = self.state().await;
        let was_off = !previous.is_on;

        let buckets = self.classify().await;
        debug!("{}: members by capability {:?}", self.id, buckets);
        debug!("{}: previous state {:?}", self.id, previous);

        let resolution = resolve(attrs, &previous, was_off, &self.config);
        debug!("{}: resolved {:?}", self.id, resolution);

        let commands = project(&resolution, &buckets, &self.config, attrs.transition_ms);
        debug!("{}: sending {:?}", self.id, commands);

        dispatch(&self.control, commands).await?;

        Ok(())
    }

    /// Turns off every configured member, reachable or not, with a single
    /// command.
    pub async fn turn_off(&self, transition_ms: Option<u32>) -> Result<(), GroupError> {
        self.control
            .turn_off(&self.members, transition_ms)
            .await
            .map_err(GroupError::TurnOff)
    }

    /// Polls every member and republishes the aggregated group state.
    pub async fn update(&self) -> GroupState {
        let states: Vec<MemberState> = self
            .member_states()
            .await
            .into_iter()
            .filter_map(|(_, state)| state)
            .collect();

        let state = aggregate(&states);

        *self.state.write().await = state.clone();
        self.state_tx.send_replace(state.clone());

        state
    }

    /// Lifecycle hook for member state changes. Returns the new group state
    /// if the member belongs to this group.
    pub async fn on_member_state_changed(&self, member_id: &str) -> Option<GroupState> {
        if !self.contains(member_id) {
            return None;
        }

        Some(self.update().await)
    }
}
