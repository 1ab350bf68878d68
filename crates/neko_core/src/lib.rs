//! # neko core
//!
//! Types shared by every layer of the responder: the static Content Store,
//! the caller-owned Conversation State, text normalization, intent
//! classification and configuration.

pub mod config;
pub mod content;
pub mod intent;
pub mod state;
pub mod text;

pub use config::{ConfigError, ExpressionConfig, MoodConfig, NekoConfig, PersonaConfig};
pub use content::{
    Conditions, ContentError, ContentSources, ContentStore, Fallbacks, FlavourPool, Flavours,
    IntentMatch, Template, TemplateIntent, TraitTable,
};
pub use intent::{Intent, IntentRule, IntentTable};
pub use state::{ConversationState, MoodZone, SessionClock, MOOD_MAX, MOOD_MIN, MOOD_TARGET};
