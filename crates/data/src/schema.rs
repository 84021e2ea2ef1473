use serde::{Deserialize, Serialize};

pub use giftdraw_core::{
    Assignment, ExclusionSet, GroupId, GroupSnapshot, MemberId, Pair, Participant,
};

pub const GROUP_SCHEMA_VERSION: u32 = 1;

/// On-disk form of one group: the snapshot the draw reads plus the stored
/// pairs once the draw has happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDocument {
    pub version: u32,
    #[serde(flatten)]
    pub group: GroupSnapshot,
    #[serde(default)]
    pub draws: Option<Assignment>,
}

impl GroupDocument {
    pub fn new(group: GroupSnapshot) -> Self {
        Self {
            version: GROUP_SCHEMA_VERSION,
            group,
            draws: None,
        }
    }
}
