//! Output composition.
//!
//! A rendered turn is the template's own lines followed by optional
//! decoration: a trait line keyed by mood zone, then comment and action
//! flavour lines. Every draw comes from the caller's RNG.

use neko_core::{ContentStore, ConversationState, ExpressionConfig, MoodZone, Template};
use neko_limbic::mood_zone;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

pub struct Composer {
    content: Arc<ContentStore>,
    config: ExpressionConfig,
}

impl Composer {
    pub fn new(content: Arc<ContentStore>, config: ExpressionConfig) -> Self {
        Self { content, config }
    }

    /// Render `template` for the current state.
    ///
    /// Falls back to a generic line when neither the template nor any
    /// decoration produced text.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        template: &Template,
        state: &ConversationState,
        rng: &mut R,
    ) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(5);

        if let Some(line) = template.response.choose(rng) {
            parts.push(line);
        }
        if let Some(line) = template.question.choose(rng) {
            parts.push(line);
        }
        if let Some(line) = self.pick_trait(mood_zone(state.mood), rng) {
            parts.push(line);
        }
        parts.extend(self.pick_flavour(rng));

        if parts.is_empty() {
            tracing::debug!("Composer: template '{}' rendered empty, using generic line", template.id);
            return self.generic(rng);
        }
        parts.join(" ")
    }

    /// With the configured trait chance, one line from the zone's pool.
    pub fn pick_trait<R: Rng + ?Sized>(&self, zone: MoodZone, rng: &mut R) -> Option<&str> {
        if !rng.gen_bool(self.config.trait_chance) {
            return None;
        }
        self.content
            .traits()
            .pool(zone)
            .choose(rng)
            .map(String::as_str)
    }

    /// Independent comment and action draws, in that order.
    pub fn pick_flavour<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<&str> {
        let flavours = self.content.flavours();
        let mut lines = Vec::new();
        for pool in [&flavours.comments, &flavours.actions] {
            if rng.gen_bool(pool.chance) {
                if let Some(line) = pool.lines.choose(rng) {
                    lines.push(line.as_str());
                }
            }
        }
        lines
    }

    /// A line for when no template could be selected.
    pub fn confused<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        pick_line(&self.content.fallbacks().confused, rng)
    }

    /// A line for when a selected template rendered nothing.
    pub fn generic<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        pick_line(&self.content.fallbacks().generic, rng)
    }
}

fn pick_line<R: Rng + ?Sized>(pool: &[String], rng: &mut R) -> String {
    pool.choose(rng).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use neko_core::{Fallbacks, FlavourPool, Flavours, IntentTable, TraitTable};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn store(comment_chance: f64, action_chance: f64) -> Arc<ContentStore> {
        let mut traits = BTreeMap::new();
        traits.insert(MoodZone::Neutral, vec!["[neutral]".to_string()]);
        traits.insert(MoodZone::Playful, vec!["[playful]".to_string()]);
        Arc::new(
            ContentStore::from_parts(
                IntentTable::builtin(),
                vec![],
                TraitTable::new(traits),
                Flavours {
                    comments: FlavourPool::new(comment_chance, &["[comment]"]),
                    actions: FlavourPool::new(action_chance, &["[action]"]),
                },
                Fallbacks {
                    confused: vec!["[confused]".to_string()],
                    generic: vec!["[generic]".to_string()],
                },
            )
            .unwrap(),
        )
    }

    fn composer(trait_chance: f64, comment: f64, action: f64) -> Composer {
        Composer::new(store(comment, action), ExpressionConfig { trait_chance })
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_response_then_question() {
        let c = composer(0.0, 0.0, 0.0);
        let t = Template::new("t", "greeting")
            .with_response(&["Hello."])
            .with_question(&["How are you?"]);
        let out = c.compose(&t, &ConversationState::new(20), &mut rng());
        assert_eq!(out, "Hello. How are you?");
    }

    #[test]
    fn test_variant_is_one_of_the_listed() {
        let c = composer(0.0, 0.0, 0.0);
        let t = Template::new("t", "greeting").with_response(&["a", "b", "c"]);
        let mut r = rng();
        for _ in 0..20 {
            let out = c.compose(&t, &ConversationState::new(20), &mut r);
            assert!(["a", "b", "c"].contains(&out.as_str()), "got {out}");
        }
    }

    #[test]
    fn test_empty_template_without_decoration_uses_generic() {
        let c = composer(0.0, 0.0, 0.0);
        let t = Template::new("silent", "any");
        assert_eq!(c.compose(&t, &ConversationState::new(20), &mut rng()), "[generic]");
    }

    #[test]
    fn test_decoration_order() {
        let c = composer(1.0, 1.0, 1.0);
        let t = Template::new("t", "any").with_response(&["Hi."]).with_question(&["Yes?"]);
        let out = c.compose(&t, &ConversationState::new(20), &mut rng());
        assert_eq!(out, "Hi. Yes? [neutral] [comment] [action]");
    }

    #[test]
    fn test_decoration_alone_suppresses_generic() {
        let c = composer(0.0, 0.0, 1.0);
        let t = Template::new("silent", "any");
        assert_eq!(c.compose(&t, &ConversationState::new(20), &mut rng()), "[action]");
    }

    #[test]
    fn test_trait_uses_zone_pool_or_neutral() {
        let c = composer(1.0, 0.0, 0.0);
        let t = Template::new("silent", "any");
        assert_eq!(c.compose(&t, &ConversationState::new(80), &mut rng()), "[playful]");
        // no angry pool: neutral stands in
        assert_eq!(c.compose(&t, &ConversationState::new(-80), &mut rng()), "[neutral]");
    }

    #[test]
    fn test_fallback_lines() {
        let c = composer(0.0, 0.0, 0.0);
        assert_eq!(c.confused(&mut rng()), "[confused]");
        assert_eq!(c.generic(&mut rng()), "[generic]");
    }

    #[test]
    fn test_trait_chance_is_roughly_honored() {
        let c = composer(0.35, 0.0, 0.0);
        let mut r = rng();
        let hits = (0..2000)
            .filter(|_| c.pick_trait(MoodZone::Neutral, &mut r).is_some())
            .count();
        assert!((550..850).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn test_same_seed_same_output() {
        let c = composer(0.5, 0.5, 0.5);
        let t = Template::new("t", "any").with_response(&["a", "b", "c", "d"]);
        let state = ConversationState::new(20);
        let first = c.compose(&t, &state, &mut StdRng::seed_from_u64(99));
        let second = c.compose(&t, &state, &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
    }
}
