use crate::{
    compute_draw, DrawConfig, DrawError, DrawOutcome, ExclusionSet, GroupId, MemberId,
    Participant, RngState,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

mod store;

pub use store::*;

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("group {0} not found")]
    NotFound(GroupId),
    #[error("{0} is not a member of this group")]
    NotMember(MemberId),
    #[error("{0} is not allowed to start the draw")]
    NotAdmin(MemberId),
    #[error("group {0} has already drawn")]
    AlreadyDrawn(GroupId),
    #[error("not everyone has answered the questions: {}", join_ids(.0))]
    PendingAnswers(Vec<MemberId>),
    #[error("group {0} has not drawn yet")]
    NotDrawn(GroupId),
    #[error("no draw recorded for {0}")]
    MissingPair(MemberId),
    #[error("{0}")]
    Conflict(String),
    #[error("draw failed: {0}")]
    Draw(#[from] DrawError),
    #[error("{0}")]
    Store(String),
}

impl From<StoreError> for GroupError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::AlreadyDrawn(id) => Self::AlreadyDrawn(id),
            conflict @ StoreError::Conflict { .. } => Self::Conflict(conflict.to_string()),
            StoreError::Backend(message) => Self::Store(message),
        }
    }
}

fn join_ids(ids: &[MemberId]) -> String {
    ids.iter()
        .map(MemberId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Everything the draw reads about a group, taken once at draw time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub id: GroupId,
    #[serde(default)]
    pub name: String,
    pub members: Vec<Participant>,
    #[serde(default)]
    pub exclusions: ExclusionSet,
    #[serde(default)]
    pub has_drawn: bool,
}

impl GroupSnapshot {
    pub fn new(id: impl Into<GroupId>, members: Vec<Participant>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            members,
            exclusions: ExclusionSet::new(),
            has_drawn: false,
        }
    }

    pub fn member(&self, id: &MemberId) -> Option<&Participant> {
        self.members.iter().find(|member| &member.id == id)
    }

    pub fn member_ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|member| member.id.clone()).collect()
    }

    pub fn pending_answers(&self) -> Vec<MemberId> {
        self.members
            .iter()
            .filter(|member| !member.has_answered)
            .map(|member| member.id.clone())
            .collect()
    }
}

/// Run the draw for `group` on behalf of `requester` and commit it.
///
/// Preconditions are checked against a fresh snapshot; the commit itself
/// re-checks the drawn flag, so of two racing calls only one succeeds.
pub fn start_draw<S: GroupStore + ?Sized>(
    store: &S,
    group: &GroupId,
    requester: &MemberId,
    config: &DrawConfig,
    rng: &mut RngState,
) -> Result<DrawOutcome, GroupError> {
    let snapshot = store.snapshot(group)?;
    let member = snapshot
        .member(requester)
        .ok_or_else(|| GroupError::NotMember(requester.clone()))?;
    if !member.is_admin {
        return Err(GroupError::NotAdmin(requester.clone()));
    }
    if snapshot.has_drawn {
        return Err(GroupError::AlreadyDrawn(group.clone()));
    }
    let pending = snapshot.pending_answers();
    if !pending.is_empty() {
        return Err(GroupError::PendingAnswers(pending));
    }

    let outcome = compute_draw(&snapshot.member_ids(), &snapshot.exclusions, config, rng)?;
    store.commit_draw(group, &outcome.assignment)?;
    info!(
        group = %group,
        members = snapshot.members.len(),
        attempts = outcome.attempts,
        strategy = ?outcome.strategy,
        seed = rng.seed(),
        "draw committed"
    );
    Ok(outcome)
}

/// The member `requester` drew.
pub fn drawn_member<S: GroupStore + ?Sized>(
    store: &S,
    group: &GroupId,
    requester: &MemberId,
) -> Result<MemberId, GroupError> {
    let snapshot = store.snapshot(group)?;
    if snapshot.member(requester).is_none() {
        return Err(GroupError::NotMember(requester.clone()));
    }
    let assignment = store
        .assignment(group)?
        .ok_or_else(|| GroupError::NotDrawn(group.clone()))?;
    assignment
        .drawn_by(requester)
        .cloned()
        .ok_or_else(|| GroupError::MissingPair(requester.clone()))
}
