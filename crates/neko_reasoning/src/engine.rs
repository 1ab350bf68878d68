// ============================================================================
// Turn orchestration
// ============================================================================
//
// One call per user line. The sequence is fixed:
//   clock -> tokenize -> classify -> name streak -> unknown penalty ->
//   select -> (delta) -> homeostasis -> record -> compose

use chrono::{DateTime, Utc};
use neko_core::text::tokenize;
use neko_core::{ConfigError, ContentStore, ConversationState, Intent, NekoConfig};
use neko_expression::Composer;
use neko_limbic::{MoodEvent, MoodModel};
use rand::Rng;
use std::sync::Arc;

use crate::selector::{choose_best, get_candidates};

/// Everything a front end may want to know about one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Rendered reply.
    pub text: String,
    /// The selected template asked to end the session.
    pub exit: bool,
    pub intent: Intent,
    /// `None` when no template survived filtering.
    pub template_id: Option<String>,
}

impl TurnOutcome {
    /// The `(text, exit)` pair a plain I/O loop needs.
    pub fn into_parts(self) -> (String, bool) {
        (self.text, self.exit)
    }
}

/// The decision engine. Holds only immutable data; all per-session state
/// lives in the caller's `ConversationState`.
pub struct Responder {
    content: Arc<ContentStore>,
    mood: MoodModel,
    composer: Composer,
    name_trigger: String,
}

impl Responder {
    /// Build a responder after validating `config`. Chances outside [0, 1]
    /// or inverted mood bounds are rejected here rather than at draw time.
    pub fn new(content: Arc<ContentStore>, config: &NekoConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(content, config))
    }

    /// Built-in defaults for everything except the content.
    pub fn with_defaults(content: Arc<ContentStore>) -> Self {
        Self::from_valid(content, &NekoConfig::default())
    }

    fn from_valid(content: Arc<ContentStore>, config: &NekoConfig) -> Self {
        let composer = Composer::new(content.clone(), config.expression.clone());
        Self {
            content,
            mood: MoodModel::new(config.mood.clone()),
            composer,
            name_trigger: config.persona.name_trigger.to_lowercase(),
        }
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn mood_model(&self) -> &MoodModel {
        &self.mood
    }

    /// A fresh state at the configured starting mood.
    pub fn new_state(&self) -> ConversationState {
        ConversationState::new(self.mood.starting_mood())
    }

    /// Run one turn against the wall clock.
    pub fn respond<R: Rng + ?Sized>(
        &self,
        input: &str,
        state: &mut ConversationState,
        rng: &mut R,
    ) -> TurnOutcome {
        self.respond_at(input, state, rng, Utc::now())
    }

    /// Run one turn as if the input arrived at `now`.
    pub fn respond_at<R: Rng + ?Sized>(
        &self,
        input: &str,
        state: &mut ConversationState,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> TurnOutcome {
        let idle = state.session.tick(now);
        let mood_before = state.mood;

        let tokens = tokenize(input);
        let intent = self.content.intents().classify(&tokens);

        let mentioned = tokens.iter().any(|t| *t == self.name_trigger);
        if self.mood.observe_name(state, mentioned) {
            tracing::debug!("Responder: name streak at {}", state.repeat_name_count);
        }

        if intent.is_unknown() {
            self.mood.apply(state, MoodEvent::UnknownIntent);
        }

        let candidates = get_candidates(&self.content, &intent);
        let Some(template) = choose_best(&candidates, &intent, state, rng) else {
            self.mood.apply_homeostasis(state);
            tracing::debug!(
                "Responder: turn {} idle={}s tokens={:?} intent={} no candidate, mood {} -> {}",
                state.turn(),
                idle,
                tokens,
                intent,
                mood_before,
                state.mood
            );
            return TurnOutcome {
                text: self.composer.confused(rng),
                exit: false,
                intent,
                template_id: None,
            };
        };

        self.mood.apply(
            state,
            MoodEvent::TemplateSelected {
                delta: template.mood_delta,
            },
        );
        self.mood.apply_homeostasis(state);
        state.last_template_id = Some(template.id.clone());

        tracing::debug!(
            "Responder: turn {} idle={}s tokens={:?} intent={} template={} mood {} -> {}",
            state.turn(),
            idle,
            tokens,
            intent,
            template.id,
            mood_before,
            state.mood
        );

        TurnOutcome {
            text: self.composer.compose(template, state, rng),
            exit: template.exit,
            intent,
            template_id: Some(template.id.clone()),
        }
    }
}
