use crate::{ExclusionSet, MemberId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub drawer: MemberId,
    pub drawn: MemberId,
}

impl Pair {
    pub fn new(drawer: impl Into<MemberId>, drawn: impl Into<MemberId>) -> Self {
        Self {
            drawer: drawer.into(),
            drawn: drawn.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("{0} is not a group member")]
    UnknownMember(MemberId),
    #[error("{0} draws more than once")]
    DuplicateDrawer(MemberId),
    #[error("{0} is drawn more than once")]
    DuplicateDrawn(MemberId),
    #[error("{0} draws themselves")]
    SelfDraw(MemberId),
    #[error("{drawer} may not draw {drawn}")]
    Excluded { drawer: MemberId, drawn: MemberId },
    #[error("{0} does not draw anyone")]
    MissingDrawer(MemberId),
}

/// Result of a draw: ordered `(drawer, drawn)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    pairs: Vec<Pair>,
}

impl Assignment {
    pub fn from_pairs(pairs: Vec<Pair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<Pair> {
        self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn drawn_by(&self, drawer: &MemberId) -> Option<&MemberId> {
        self.pairs
            .iter()
            .find(|pair| &pair.drawer == drawer)
            .map(|pair| &pair.drawn)
    }

    pub fn drawer_of(&self, drawn: &MemberId) -> Option<&MemberId> {
        self.pairs
            .iter()
            .find(|pair| &pair.drawn == drawn)
            .map(|pair| &pair.drawer)
    }

    /// Pairs sorted by drawer, for order-insensitive comparison.
    pub fn sorted(&self) -> Vec<Pair> {
        let mut pairs = self.pairs.clone();
        pairs.sort_by(|a, b| a.drawer.cmp(&b.drawer));
        pairs
    }

    /// Check the assignment is a valid draw over `members`.
    pub fn verify(
        &self,
        members: &[MemberId],
        exclusions: &ExclusionSet,
    ) -> Result<(), AssignmentError> {
        let roster: BTreeSet<&MemberId> = members.iter().collect();
        let mut drawers = BTreeSet::new();
        let mut drawn = BTreeSet::new();
        for pair in &self.pairs {
            for id in [&pair.drawer, &pair.drawn] {
                if !roster.contains(id) {
                    return Err(AssignmentError::UnknownMember(id.clone()));
                }
            }
            if pair.drawer == pair.drawn {
                return Err(AssignmentError::SelfDraw(pair.drawer.clone()));
            }
            if exclusions.excludes(&pair.drawer, &pair.drawn) {
                return Err(AssignmentError::Excluded {
                    drawer: pair.drawer.clone(),
                    drawn: pair.drawn.clone(),
                });
            }
            if !drawers.insert(&pair.drawer) {
                return Err(AssignmentError::DuplicateDrawer(pair.drawer.clone()));
            }
            if !drawn.insert(&pair.drawn) {
                return Err(AssignmentError::DuplicateDrawn(pair.drawn.clone()));
            }
        }
        // Same size and no duplicates on either side, so a complete drawer
        // set also means everyone is drawn exactly once.
        match members.iter().find(|id| !drawers.contains(id)) {
            Some(missing) => Err(AssignmentError::MissingDrawer(missing.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(ids: &[&str]) -> Vec<MemberId> {
        ids.iter().copied().map(MemberId::from).collect()
    }

    fn assignment(pairs: &[(&str, &str)]) -> Assignment {
        Assignment::from_pairs(pairs.iter().map(|(a, b)| Pair::new(*a, *b)).collect())
    }

    #[test]
    fn verify_accepts_cycle() {
        let members = roster(&["a", "b", "c"]);
        let draw = assignment(&[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_eq!(draw.verify(&members, &ExclusionSet::new()), Ok(()));
        assert_eq!(draw.drawn_by(&"b".into()), Some(&MemberId::from("c")));
        assert_eq!(draw.drawer_of(&"b".into()), Some(&MemberId::from("a")));
    }

    #[test]
    fn verify_rejects_self_draw() {
        let members = roster(&["a", "b"]);
        let draw = assignment(&[("a", "a"), ("b", "b")]);
        assert_eq!(
            draw.verify(&members, &ExclusionSet::new()),
            Err(AssignmentError::SelfDraw("a".into()))
        );
    }

    #[test]
    fn verify_rejects_excluded_pair_in_either_direction() {
        let members = roster(&["a", "b", "c", "d"]);
        let exclusions = ExclusionSet::from_pairs([("a", "b")]);
        let draw = assignment(&[("b", "a"), ("a", "c"), ("c", "d"), ("d", "b")]);
        assert_eq!(
            draw.verify(&members, &exclusions),
            Err(AssignmentError::Excluded {
                drawer: "b".into(),
                drawn: "a".into(),
            })
        );
    }

    #[test]
    fn verify_rejects_double_drawn() {
        let members = roster(&["a", "b", "c"]);
        let draw = assignment(&[("a", "b"), ("c", "b"), ("b", "a")]);
        assert_eq!(
            draw.verify(&members, &ExclusionSet::new()),
            Err(AssignmentError::DuplicateDrawn("b".into()))
        );
    }

    #[test]
    fn verify_rejects_missing_and_unknown() {
        let members = roster(&["a", "b", "c"]);
        let partial = assignment(&[("a", "b"), ("b", "a")]);
        assert_eq!(
            partial.verify(&members, &ExclusionSet::new()),
            Err(AssignmentError::MissingDrawer("c".into()))
        );
        let stranger = assignment(&[("a", "x")]);
        assert_eq!(
            stranger.verify(&members, &ExclusionSet::new()),
            Err(AssignmentError::UnknownMember("x".into()))
        );
    }
}
