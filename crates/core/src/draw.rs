use crate::{
    Assignment, CandidateTable, DrawConfig, ExclusionSet, MemberId, Pair, RngState, SelectError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("empty candidate pool: {0}")]
    EmptyInput(#[from] SelectError),
    #[error("a draw needs at least 2 members, got {count}")]
    InsufficientMembers { count: usize },
    #[error("member {0} is listed more than once")]
    DuplicateMember(MemberId),
    #[error("no valid draw exists for this group (gave up after {attempts} attempts)")]
    Infeasible { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawStrategy {
    /// Randomized greedy pass succeeded.
    Greedy,
    /// Random single cycle over the whole roster.
    Cycle,
    /// Randomized augmenting-path matching.
    Matching,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOutcome {
    pub assignment: Assignment,
    /// Greedy attempts spent, including the successful one.
    pub attempts: u32,
    pub strategy: DrawStrategy,
}

/// Compute a random derangement of `members` that respects `exclusions`.
///
/// Runs up to `config.max_attempts` greedy passes, each with a fresh pool,
/// then falls back to an exact construction when `config.fallback` is set.
/// Infeasible inputs are rejected before any attempt is made.
pub fn compute_draw(
    members: &[MemberId],
    exclusions: &ExclusionSet,
    config: &DrawConfig,
    rng: &mut RngState,
) -> Result<DrawOutcome, DrawError> {
    validate_roster(members)?;
    let table = CandidateTable::build(members, exclusions);
    if table.ignored_pairs() > 0 {
        warn!(
            ignored = table.ignored_pairs(),
            "exclusion pairs name people outside the roster"
        );
    }
    if !table.is_feasible() {
        return Err(DrawError::Infeasible { attempts: 0 });
    }

    let budget = config.attempt_budget();
    for attempt in 1..=budget {
        match greedy_attempt(&table, rng)? {
            Some(slots) => {
                debug!(attempt, "greedy draw succeeded");
                return Ok(DrawOutcome {
                    assignment: to_assignment(members, &slots),
                    attempts: attempt,
                    strategy: DrawStrategy::Greedy,
                });
            }
            None => debug!(attempt, "greedy draw hit a dead end"),
        }
    }
    if !config.fallback {
        return Err(DrawError::Infeasible { attempts: budget });
    }

    let (slots, strategy) = if table.is_constrained() {
        let drawn = table
            .random_matching(rng)
            .ok_or(DrawError::Infeasible { attempts: budget })?;
        let slots: Vec<(usize, usize)> = drawn.into_iter().enumerate().collect();
        (slots, DrawStrategy::Matching)
    } else {
        (single_cycle(members.len(), rng), DrawStrategy::Cycle)
    };
    info!(attempts = budget, ?strategy, "greedy budget spent, used fallback");
    Ok(DrawOutcome {
        assignment: to_assignment(members, &slots),
        attempts: budget,
        strategy,
    })
}

fn validate_roster(members: &[MemberId]) -> Result<(), DrawError> {
    if members.len() < 2 {
        return Err(DrawError::InsufficientMembers {
            count: members.len(),
        });
    }
    let mut seen = BTreeSet::new();
    for id in members {
        if !seen.insert(id) {
            return Err(DrawError::DuplicateMember(id.clone()));
        }
    }
    Ok(())
}

/// One greedy pass. `None` means some drawer was left without a candidate.
fn greedy_attempt(
    table: &CandidateTable,
    rng: &mut RngState,
) -> Result<Option<Vec<(usize, usize)>>, SelectError> {
    let slots: Vec<usize> = (0..table.len()).collect();
    let order = rng.shuffled(&slots);
    let mut available = vec![true; table.len()];
    let mut eligible = Vec::with_capacity(table.len());
    let mut pairs = Vec::with_capacity(table.len());
    for drawer in order {
        eligible.clear();
        eligible.extend(
            table
                .candidates(drawer)
                .iter()
                .copied()
                .filter(|slot| available[*slot]),
        );
        if eligible.is_empty() {
            return Ok(None);
        }
        let target = *rng.pick(&eligible)?;
        available[target] = false;
        pairs.push((drawer, target));
    }
    Ok(Some(pairs))
}

/// Each member draws the next one around a shuffled ring.
fn single_cycle(len: usize, rng: &mut RngState) -> Vec<(usize, usize)> {
    let slots: Vec<usize> = (0..len).collect();
    let ring = rng.shuffled(&slots);
    (0..len)
        .map(|pos| (ring[pos], ring[(pos + 1) % len]))
        .collect()
}

fn to_assignment(members: &[MemberId], slots: &[(usize, usize)]) -> Assignment {
    Assignment::from_pairs(
        slots
            .iter()
            .map(|&(drawer, drawn)| Pair {
                drawer: members[drawer].clone(),
                drawn: members[drawn].clone(),
            })
            .collect(),
    )
}
