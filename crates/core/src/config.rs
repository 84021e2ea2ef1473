use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawConfig {
    /// Greedy attempts before giving up or falling back. Zero counts as one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Use an exact construction once the greedy budget is spent.
    #[serde(default = "default_fallback")]
    pub fallback: bool,
}

impl DrawConfig {
    pub fn greedy_only(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            fallback: false,
        }
    }

    pub fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            fallback: true,
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_fallback() -> bool {
    true
}
