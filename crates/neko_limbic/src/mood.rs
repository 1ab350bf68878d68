//! Mood dynamics: a bounded integer pulled toward equilibrium every turn and
//! pushed around by what happens in the conversation.

use neko_core::{ConversationState, MoodConfig, MoodZone};

/// At or below this mood the responder is angry.
pub const ANGRY_CEILING: i32 = -50;
/// At or below this mood (and above `ANGRY_CEILING`) the responder is lazy.
pub const LAZY_CEILING: i32 = -10;
/// At or above this mood the responder is playful.
pub const PLAYFUL_FLOOR: i32 = 50;

/// Bucket a mood value. Boundaries belong to the more extreme zone:
/// -50 is angry, -10 is lazy, 50 is playful.
pub fn mood_zone(mood: i32) -> MoodZone {
    if mood <= ANGRY_CEILING {
        MoodZone::Angry
    } else if mood <= LAZY_CEILING {
        MoodZone::Lazy
    } else if mood >= PLAYFUL_FLOOR {
        MoodZone::Playful
    } else {
        MoodZone::Neutral
    }
}

/// One homeostasis step for a raw mood value. The pull is asymmetric:
/// recovery from below is faster than cooling from above.
pub fn homeostasis_step(mood: i32, config: &MoodConfig) -> i32 {
    let pulled = if mood < config.target {
        mood.saturating_add(config.rise_step)
    } else if mood > config.target {
        mood.saturating_sub(config.fall_step)
    } else {
        mood
    };
    pulled.clamp(config.min, config.max)
}

/// Something that moves mood outside of homeostasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodEvent {
    /// A template was selected; carries its raw delta.
    TemplateSelected { delta: i32 },
    /// No intent was recognized.
    UnknownIntent,
    /// The name-call streak reached the threshold.
    NameSpam,
}

/// Applies mood changes to a conversation state, keeping mood inside the
/// configured bounds after every mutation.
#[derive(Debug, Clone, Default)]
pub struct MoodModel {
    config: MoodConfig,
}

impl MoodModel {
    pub fn new(config: MoodConfig) -> Self {
        Self { config }
    }

    pub fn clamp(&self, mood: i32) -> i32 {
        mood.clamp(self.config.min, self.config.max)
    }

    /// Cap a template delta to `[-delta_cap, delta_cap]`.
    pub fn cap_delta(&self, delta: i32) -> i32 {
        delta.clamp(-self.config.delta_cap, self.config.delta_cap)
    }

    pub fn zone(&self, mood: i32) -> MoodZone {
        mood_zone(mood)
    }

    /// Mood a fresh session starts with.
    pub fn starting_mood(&self) -> i32 {
        self.config.starting_mood()
    }

    /// Apply one event and return the signed change actually made.
    pub fn apply(&self, state: &mut ConversationState, event: MoodEvent) -> i32 {
        let change = match event {
            MoodEvent::TemplateSelected { delta } => self.cap_delta(delta),
            MoodEvent::UnknownIntent => -self.config.unknown_penalty,
            MoodEvent::NameSpam => -self.config.name_spam_penalty,
        };
        let before = state.mood;
        state.mood = self.clamp(before.saturating_add(change));
        tracing::trace!("MoodModel: {:?} {} -> {}", event, before, state.mood);
        state.mood - before
    }

    /// Track the name-call streak for this turn. Increments the streak when
    /// the name was used, resets it otherwise, and applies the spam penalty
    /// on every turn the streak is at or past the threshold.
    /// Returns whether the penalty fired.
    pub fn observe_name(&self, state: &mut ConversationState, mentioned: bool) -> bool {
        if !mentioned {
            state.repeat_name_count = 0;
            return false;
        }
        state.repeat_name_count = state.repeat_name_count.saturating_add(1);
        if state.repeat_name_count >= self.config.name_spam_threshold {
            self.apply(state, MoodEvent::NameSpam);
            true
        } else {
            false
        }
    }

    /// Pull mood one step toward the target.
    pub fn apply_homeostasis(&self, state: &mut ConversationState) {
        state.mood = homeostasis_step(state.mood, &self.config);
    }
}
