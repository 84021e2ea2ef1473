use crate::MemberId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Symmetric "must not draw each other" relation.
///
/// Pairs are stored with the smaller id first, so an inserted `(a, b)`
/// excludes both `a -> b` and `b -> a` no matter how the caller spelled it.
/// Self pairs are dropped: self-draws are forbidden anyway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(MemberId, MemberId)>", into = "Vec<(MemberId, MemberId)>")]
pub struct ExclusionSet {
    pairs: BTreeSet<(MemberId, MemberId)>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<MemberId>,
        B: Into<MemberId>,
    {
        let mut set = Self::new();
        for (a, b) in pairs {
            set.insert(a.into(), b.into());
        }
        set
    }

    /// Returns false when the pair was a self pair or already present.
    pub fn insert(&mut self, a: MemberId, b: MemberId) -> bool {
        if a == b {
            return false;
        }
        self.pairs.insert(normalize(a, b))
    }

    pub fn remove(&mut self, a: &MemberId, b: &MemberId) -> bool {
        self.pairs.remove(&normalize(a.clone(), b.clone()))
    }

    pub fn excludes(&self, a: &MemberId, b: &MemberId) -> bool {
        if a == b {
            return false;
        }
        self.pairs.contains(&normalize(a.clone(), b.clone()))
    }

    /// Whether `drawer` may draw `drawn`.
    pub fn allows(&self, drawer: &MemberId, drawn: &MemberId) -> bool {
        drawer != drawn && !self.excludes(drawer, drawn)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, &MemberId)> + '_ {
        self.pairs.iter().map(|(a, b)| (a, b))
    }
}

fn normalize(a: MemberId, b: MemberId) -> (MemberId, MemberId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl From<Vec<(MemberId, MemberId)>> for ExclusionSet {
    fn from(value: Vec<(MemberId, MemberId)>) -> Self {
        Self::from_pairs(value)
    }
}

impl From<ExclusionSet> for Vec<(MemberId, MemberId)> {
    fn from(value: ExclusionSet) -> Self {
        value.pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> MemberId {
        MemberId::from(value)
    }

    #[test]
    fn exclusion_is_symmetric() {
        let set = ExclusionSet::from_pairs([("bob", "alice")]);
        assert!(set.excludes(&id("alice"), &id("bob")));
        assert!(set.excludes(&id("bob"), &id("alice")));
        assert!(!set.allows(&id("alice"), &id("bob")));
        assert!(!set.allows(&id("bob"), &id("alice")));
        assert!(set.allows(&id("alice"), &id("carol")));
    }

    #[test]
    fn both_spellings_collapse_to_one_pair() {
        let set = ExclusionSet::from_pairs([("a", "b"), ("b", "a")]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn self_pairs_are_dropped() {
        let mut set = ExclusionSet::new();
        assert!(!set.insert(id("a"), id("a")));
        assert!(set.is_empty());
        assert!(!set.allows(&id("a"), &id("a")));
    }

    #[test]
    fn remove_clears_both_directions() {
        let mut set = ExclusionSet::from_pairs([("a", "b")]);
        assert!(set.remove(&id("b"), &id("a")));
        assert!(set.allows(&id("a"), &id("b")));
    }

    #[test]
    fn serializes_as_pair_list() {
        let set = ExclusionSet::from_pairs([("zed", "amy")]);
        let body = serde_json::to_string(&set).expect("serialize");
        assert_eq!(body, r#"[["amy","zed"]]"#);
        let parsed: ExclusionSet = serde_json::from_str(r#"[["b","a"],["c","c"]]"#).expect("parse");
        assert_eq!(parsed, ExclusionSet::from_pairs([("a", "b")]));
    }
}
