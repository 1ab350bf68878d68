//! # neko limbic
//!
//! Mood regulation for the responder. Mood is a bounded integer that drifts
//! toward an equilibrium once per turn (homeostasis) and is perturbed by the
//! selected template, by unrecognized input and by name-call spam.

mod mood;

pub use mood::{
    homeostasis_step, mood_zone, MoodEvent, MoodModel, ANGRY_CEILING, LAZY_CEILING, PLAYFUL_FLOOR,
};
