use crate::{ExclusionSet, MemberId, RngState};
use std::collections::BTreeMap;

/// Index arena over a roster: for every drawer slot, the slots it may draw.
///
/// Built once per draw and shared read-only by every attempt.
#[derive(Debug, Clone)]
pub struct CandidateTable {
    candidates: Vec<Vec<usize>>,
    constrained: bool,
    ignored_pairs: usize,
}

impl CandidateTable {
    pub fn build(members: &[MemberId], exclusions: &ExclusionSet) -> Self {
        let index: BTreeMap<&MemberId, usize> = members
            .iter()
            .enumerate()
            .map(|(slot, id)| (id, slot))
            .collect();
        let mut constrained = false;
        let mut ignored_pairs = 0;
        for (a, b) in exclusions.iter() {
            if index.contains_key(a) && index.contains_key(b) {
                constrained = true;
            } else {
                ignored_pairs += 1;
            }
        }
        let candidates: Vec<Vec<usize>> = members
            .iter()
            .enumerate()
            .map(|(drawer, drawer_id)| {
                members
                    .iter()
                    .enumerate()
                    .filter(|(drawn, drawn_id)| {
                        *drawn != drawer && exclusions.allows(drawer_id, drawn_id)
                    })
                    .map(|(drawn, _)| drawn)
                    .collect()
            })
            .collect();
        Self {
            candidates,
            constrained,
            ignored_pairs,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self, drawer: usize) -> &[usize] {
        &self.candidates[drawer]
    }

    /// True when at least one exclusion pair names two roster members.
    pub fn is_constrained(&self) -> bool {
        self.constrained
    }

    /// Exclusion pairs naming someone outside the roster.
    pub fn ignored_pairs(&self) -> usize {
        self.ignored_pairs
    }

    /// First drawer left with nobody to draw, if any.
    pub fn dead_drawer(&self) -> Option<usize> {
        self.candidates.iter().position(|list| list.is_empty())
    }

    /// Whether any valid assignment exists at all.
    pub fn is_feasible(&self) -> bool {
        if self.is_empty() || self.dead_drawer().is_some() {
            return false;
        }
        let order: Vec<usize> = (0..self.len()).collect();
        self.perfect_matching(&order, &self.candidates).is_some()
    }

    /// Valid assignment built from augmenting paths over shuffled drawer
    /// order and shuffled candidate lists. Succeeds whenever one exists.
    pub fn random_matching(&self, rng: &mut RngState) -> Option<Vec<usize>> {
        let order: Vec<usize> = (0..self.len()).collect();
        let order = rng.shuffled(&order);
        let lists: Vec<Vec<usize>> = self
            .candidates
            .iter()
            .map(|list| rng.shuffled(list))
            .collect();
        self.perfect_matching(&order, &lists)
    }

    /// Kuhn's augmenting-path matching. Returns `drawn[drawer]`.
    fn perfect_matching(&self, order: &[usize], lists: &[Vec<usize>]) -> Option<Vec<usize>> {
        let slots = self.len();
        let mut drawer_of: Vec<Option<usize>> = vec![None; slots];
        let mut visited = vec![false; slots];
        for &drawer in order {
            visited.iter_mut().for_each(|seen| *seen = false);
            if !augment(drawer, lists, &mut drawer_of, &mut visited) {
                return None;
            }
        }
        let mut drawn = vec![0; slots];
        for (target, owner) in drawer_of.iter().enumerate() {
            drawn[(*owner)?] = target;
        }
        Some(drawn)
    }
}

fn augment(
    drawer: usize,
    lists: &[Vec<usize>],
    drawer_of: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &target in &lists[drawer] {
        if visited[target] {
            continue;
        }
        visited[target] = true;
        let free = match drawer_of[target] {
            None => true,
            Some(current) => augment(current, lists, drawer_of, visited),
        };
        if free {
            drawer_of[target] = Some(drawer);
            return true;
        }
    }
    false
}
