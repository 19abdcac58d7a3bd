use serde::{Deserialize, Serialize};

/// Tunable game parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub base_score: u32,
    pub click_penalty: u32,
    pub wrong_guess_penalty: u32,
    /// Lockout length after a wrong guess when no audio cue is played.
    pub lockout_fallback_ms: u32,
    /// How long to wait for the day's image before giving up. `None` waits
    /// forever.
    pub image_timeout_ms: Option<u32>,
}

impl GameRules {
    /// `max(0, base - clicks * click_penalty - wrong_guesses * wrong_guess_penalty)`
    pub const fn score(&self, clicks: u32, wrong_guesses: u32) -> u32 {
        self.base_score
            .saturating_sub(clicks.saturating_mul(self.click_penalty))
            .saturating_sub(wrong_guesses.saturating_mul(self.wrong_guess_penalty))
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            base_score: 250,
            click_penalty: 1,
            wrong_guess_penalty: 25,
            lockout_fallback_ms: 2000,
            image_timeout_ms: None,
        }
    }
}
