//! Conversation state owned by the caller and threaded through every turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard lower bound for mood.
pub const MOOD_MIN: i32 = -100;
/// Hard upper bound for mood.
pub const MOOD_MAX: i32 = 100;
/// Natural equilibrium mood drifts toward.
pub const MOOD_TARGET: i32 = 20;

/// Coarse mood bucket used to pick decorative trait lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodZone {
    Angry,
    Lazy,
    Neutral,
    Playful,
}

impl MoodZone {
    pub const ALL: [MoodZone; 4] = [
        MoodZone::Angry,
        MoodZone::Lazy,
        MoodZone::Neutral,
        MoodZone::Playful,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodZone::Angry => "angry",
            MoodZone::Lazy => "lazy",
            MoodZone::Neutral => "neutral",
            MoodZone::Playful => "playful",
        }
    }
}

impl fmt::Display for MoodZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn counter and timing for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClock {
    /// Processed turns. Starts at 0, +1 per turn that reaches the core.
    pub turn: u64,
    /// When the previous turn was processed (or the session started).
    pub last_input_at: DateTime<Utc>,
    /// Seconds between the two most recent turns. Tracked, not yet used by any rule.
    pub last_idle_secs: i64,
}

impl SessionClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            turn: 0,
            last_input_at: now,
            last_idle_secs: 0,
        }
    }

    /// Record a new turn at `now` and return the idle time before it.
    /// A clock that went backwards counts as zero idle time.
    pub fn tick(&mut self, now: DateTime<Utc>) -> i64 {
        let idle = (now - self.last_input_at).num_seconds().max(0);
        self.last_input_at = now;
        self.last_idle_secs = idle;
        self.turn += 1;
        idle
    }
}

/// Per-session mutable state.
///
/// Construct once at session start; every field has its defined default, so
/// the core never re-checks for missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Always within `MOOD_MIN..=MOOD_MAX` (and the configured bounds).
    pub mood: i32,
    /// Template most recently selected and rendered.
    pub last_template_id: Option<String>,
    /// Consecutive turns containing the name trigger word.
    pub repeat_name_count: u32,
    pub session: SessionClock,
}

impl ConversationState {
    pub fn new(initial_mood: i32) -> Self {
        Self::starting_at(initial_mood, Utc::now())
    }

    pub fn starting_at(initial_mood: i32, now: DateTime<Utc>) -> Self {
        Self {
            mood: initial_mood.clamp(MOOD_MIN, MOOD_MAX),
            last_template_id: None,
            repeat_name_count: 0,
            session: SessionClock::starting_at(now),
        }
    }

    pub fn turn(&self) -> u64 {
        self.session.turn
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(MOOD_TARGET)
    }
}
