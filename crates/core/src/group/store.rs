use crate::{Assignment, GroupId, GroupSnapshot};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("group {0} not found")]
    NotFound(GroupId),
    #[error("group {0} has already drawn")]
    AlreadyDrawn(GroupId),
    #[error("draw for group {group} no longer matches its roster: {reason}")]
    Conflict { group: GroupId, reason: String },
    #[error("storage error: {0}")]
    Backend(String),
}

/// Persistence boundary for draws.
pub trait GroupStore {
    fn snapshot(&self, group: &GroupId) -> Result<GroupSnapshot, StoreError>;

    /// Store the pairs and flip the drawn flag as one unit.
    ///
    /// Must re-check the flag under the store's own guard and fail with
    /// `AlreadyDrawn` if another commit got there first, and must verify the
    /// pairs against the current roster and exclusions, failing with
    /// `Conflict` if they changed since the draw was computed. Nothing is
    /// written in either case.
    fn commit_draw(&self, group: &GroupId, assignment: &Assignment) -> Result<(), StoreError>;

    fn assignment(&self, group: &GroupId) -> Result<Option<Assignment>, StoreError>;
}

/// Reject pairs computed from a snapshot that no longer matches `current`.
pub fn check_against_roster(
    current: &GroupSnapshot,
    assignment: &Assignment,
) -> Result<(), StoreError> {
    assignment
        .verify(&current.member_ids(), &current.exclusions)
        .map_err(|err| StoreError::Conflict {
            group: current.id.clone(),
            reason: err.to_string(),
        })
}

#[derive(Debug, Clone)]
struct StoredGroup {
    snapshot: GroupSnapshot,
    assignment: Option<Assignment>,
}

#[derive(Debug, Default)]
pub struct InMemoryGroupStore {
    groups: Mutex<BTreeMap<GroupId, StoredGroup>>,
}

impl InMemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group, or replace one that has not drawn yet.
    pub fn insert(&self, snapshot: GroupSnapshot) -> Result<(), StoreError> {
        let id = snapshot.id.clone();
        if snapshot.has_drawn {
            return Err(StoreError::Conflict {
                group: id,
                reason: "a drawn group cannot be inserted without its pairs".to_string(),
            });
        }
        let mut groups = self.groups.lock();
        if groups.get(&id).is_some_and(|stored| stored.snapshot.has_drawn) {
            return Err(StoreError::AlreadyDrawn(id));
        }
        groups.insert(
            id,
            StoredGroup {
                snapshot,
                assignment: None,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.groups.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.lock().is_empty()
    }
}

impl GroupStore for InMemoryGroupStore {
    fn snapshot(&self, group: &GroupId) -> Result<GroupSnapshot, StoreError> {
        self.groups
            .lock()
            .get(group)
            .map(|stored| stored.snapshot.clone())
            .ok_or_else(|| StoreError::NotFound(group.clone()))
    }

    fn commit_draw(&self, group: &GroupId, assignment: &Assignment) -> Result<(), StoreError> {
        let mut groups = self.groups.lock();
        let stored = groups
            .get_mut(group)
            .ok_or_else(|| StoreError::NotFound(group.clone()))?;
        if stored.snapshot.has_drawn {
            return Err(StoreError::AlreadyDrawn(group.clone()));
        }
        check_against_roster(&stored.snapshot, assignment)?;
        stored.snapshot.has_drawn = true;
        stored.assignment = Some(assignment.clone());
        Ok(())
    }

    fn assignment(&self, group: &GroupId) -> Result<Option<Assignment>, StoreError> {
        self.groups
            .lock()
            .get(group)
            .map(|stored| stored.assignment.clone())
            .ok_or_else(|| StoreError::NotFound(group.clone()))
    }
}
