//! Content Store: the static tables the responder speaks from.
//!
//! Four JSON resources (templates, traits, flavours, fallbacks) plus an
//! optional intent table. Loaded once, validated, then shared read-only.

use crate::intent::{Intent, IntentRule, IntentTable, UNKNOWN_INTENT, WILDCARD_INTENT};
use crate::state::MoodZone;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

pub const TEMPLATES_FILE: &str = "qa_templates.json";
pub const TRAITS_FILE: &str = "traits.json";
pub const FLAVOURS_FILE: &str = "flavours.json";
pub const FALLBACKS_FILE: &str = "fallbacks.json";
pub const INTENTS_FILE: &str = "intents.json";

/// Action lines fire with this probability when the resource does not say.
pub const DEFAULT_ACTION_CHANCE: f64 = 0.2;

const BUILTIN_TEMPLATES: &str = include_str!("../data/qa_templates.json");
const BUILTIN_TRAITS: &str = include_str!("../data/traits.json");
const BUILTIN_FLAVOURS: &str = include_str!("../data/flavours.json");
const BUILTIN_FALLBACKS: &str = include_str!("../data/fallbacks.json");

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {resource}: {source}")]
    Parse {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("template with an empty id")]
    EmptyTemplateId,

    #[error("duplicate template id '{0}'")]
    DuplicateTemplate(String),

    #[error("template '{id}' uses undeclared intent '{intent}'")]
    UndeclaredIntent { id: String, intent: String },

    #[error("template '{id}' has mood_min {min} above mood_max {max}")]
    InvertedConditions { id: String, min: i32, max: i32 },

    #[error("intent label '{0}' is reserved")]
    ReservedIntent(String),

    #[error("intent '{0}' is declared twice")]
    DuplicateIntent(String),

    #[error("fallback pool '{0}' is empty")]
    EmptyFallback(&'static str),

    #[error("trait table has no lines for 'neutral'")]
    MissingNeutralTraits,

    #[error("{pool} chance {chance} is outside [0, 1]")]
    InvalidChance { pool: &'static str, chance: f64 },
}

// ============================================================================
// Templates
// ============================================================================

/// How a template's intent relates to the detected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentMatch {
    Exact,
    Wildcard,
}

/// Intent a template applies to: a declared intent, or every intent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TemplateIntent {
    Any,
    Named(Intent),
}

impl TemplateIntent {
    pub fn matches(&self, intent: &Intent) -> Option<IntentMatch> {
        match self {
            TemplateIntent::Named(named) if named == intent => Some(IntentMatch::Exact),
            TemplateIntent::Named(_) => None,
            TemplateIntent::Any => Some(IntentMatch::Wildcard),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TemplateIntent::Any => WILDCARD_INTENT,
            TemplateIntent::Named(intent) => intent.as_str(),
        }
    }
}

impl From<String> for TemplateIntent {
    fn from(label: String) -> Self {
        if label == WILDCARD_INTENT {
            TemplateIntent::Any
        } else {
            TemplateIntent::Named(Intent::new(label))
        }
    }
}

impl From<TemplateIntent> for String {
    fn from(intent: TemplateIntent) -> Self {
        intent.as_str().to_string()
    }
}

impl fmt::Display for TemplateIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive mood bounds gating a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_max: Option<i32>,
}

impl Conditions {
    pub fn allows(&self, mood: i32) -> bool {
        self.mood_min.map_or(true, |min| mood >= min) && self.mood_max.map_or(true, |max| mood <= max)
    }
}

/// A scripted exchange unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub intent: TemplateIntent,
    /// Response variants; one is drawn when non-empty.
    #[serde(default)]
    pub response: Vec<String>,
    /// Question variants; drawn independently of `response`.
    #[serde(default)]
    pub question: Vec<String>,
    /// Raw delta; the mood model caps it when applied.
    #[serde(default)]
    pub mood_delta: i32,
    #[serde(default)]
    pub conditions: Conditions,
    /// Selecting this template ends the session.
    #[serde(default)]
    pub exit: bool,
}

impl Template {
    pub fn new(id: &str, intent: &str) -> Self {
        Self {
            id: id.to_string(),
            intent: TemplateIntent::from(intent.to_string()),
            response: Vec::new(),
            question: Vec::new(),
            mood_delta: 0,
            conditions: Conditions::default(),
            exit: false,
        }
    }

    pub fn with_response(mut self, lines: &[&str]) -> Self {
        self.response = lines.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_question(mut self, lines: &[&str]) -> Self {
        self.question = lines.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_mood_delta(mut self, delta: i32) -> Self {
        self.mood_delta = delta;
        self
    }

    pub fn with_conditions(mut self, mood_min: Option<i32>, mood_max: Option<i32>) -> Self {
        self.conditions = Conditions { mood_min, mood_max };
        self
    }

    pub fn with_exit(mut self) -> Self {
        self.exit = true;
        self
    }
}

// ============================================================================
// Trait / flavour / fallback tables
// ============================================================================

/// Mood-zone keyed pools of short decorative lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitTable(BTreeMap<MoodZone, Vec<String>>);

impl TraitTable {
    pub fn new(pools: BTreeMap<MoodZone, Vec<String>>) -> Self {
        Self(pools)
    }

    /// Lines for `zone`, or the neutral pool when the zone has none.
    pub fn pool(&self, zone: MoodZone) -> &[String] {
        match self.0.get(&zone) {
            Some(lines) if !lines.is_empty() => lines,
            _ => self
                .0
                .get(&MoodZone::Neutral)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }
}

/// A pool of flavour lines and the probability of drawing from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavourPool {
    pub chance: f64,
    #[serde(default)]
    pub lines: Vec<String>,
}

impl FlavourPool {
    pub fn new(chance: f64, lines: &[&str]) -> Self {
        Self {
            chance,
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flavours {
    pub comments: FlavourPool,
    #[serde(deserialize_with = "deserialize_actions")]
    pub actions: FlavourPool,
}

/// Actions may be written as a bare list (default chance) or a full pool.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawActions {
    Lines(Vec<String>),
    Pool {
        #[serde(default = "default_action_chance")]
        chance: f64,
        #[serde(default)]
        lines: Vec<String>,
    },
}

fn default_action_chance() -> f64 {
    DEFAULT_ACTION_CHANCE
}

fn deserialize_actions<'de, D>(deserializer: D) -> Result<FlavourPool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawActions::deserialize(deserializer)? {
        RawActions::Lines(lines) => FlavourPool {
            chance: DEFAULT_ACTION_CHANCE,
            lines,
        },
        RawActions::Pool { chance, lines } => FlavourPool { chance, lines },
    })
}

/// Generic lines for when normal selection or composition yields nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fallbacks {
    /// Used when no template survives selection.
    pub confused: Vec<String>,
    /// Used when a selected template renders to nothing.
    pub generic: Vec<String>,
}

// ============================================================================
// Store
// ============================================================================

/// Raw JSON documents, before parsing.
#[derive(Debug, Clone, Copy)]
pub struct ContentSources<'a> {
    /// `None` keeps the built-in intent table.
    pub intents: Option<&'a str>,
    pub templates: &'a str,
    pub traits: &'a str,
    pub flavours: &'a str,
    pub fallbacks: &'a str,
}

/// All static content, validated. Immutable after construction; share it
/// across sessions behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentStore {
    intents: IntentTable,
    templates: Vec<Template>,
    traits: TraitTable,
    flavours: Flavours,
    fallbacks: Fallbacks,
}

impl ContentStore {
    /// Validate and assemble a store from already-built tables.
    pub fn from_parts(
        intents: IntentTable,
        templates: Vec<Template>,
        traits: TraitTable,
        flavours: Flavours,
        fallbacks: Fallbacks,
    ) -> Result<Self, ContentError> {
        let store = Self {
            intents,
            templates,
            traits,
            flavours,
            fallbacks,
        };
        store.validate()?;
        Ok(store)
    }

    pub fn from_sources(sources: ContentSources<'_>) -> Result<Self, ContentError> {
        let intents = match sources.intents {
            Some(json) => IntentTable::new(parse::<Vec<IntentRule>>(INTENTS_FILE, json)?),
            None => IntentTable::builtin(),
        };
        Self::from_parts(
            intents,
            parse(TEMPLATES_FILE, sources.templates)?,
            parse(TRAITS_FILE, sources.traits)?,
            parse(FLAVOURS_FILE, sources.flavours)?,
            parse(FALLBACKS_FILE, sources.fallbacks)?,
        )
    }

    /// The content compiled into the binary.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_sources(ContentSources {
            intents: None,
            templates: BUILTIN_TEMPLATES,
            traits: BUILTIN_TRAITS,
            flavours: BUILTIN_FLAVOURS,
            fallbacks: BUILTIN_FALLBACKS,
        })
    }

    /// Load the resources from a directory. `intents.json` is optional.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ContentError> {
        let dir = dir.as_ref();
        let intents_path = dir.join(INTENTS_FILE);
        let intents = if intents_path.exists() {
            Some(read(&intents_path)?)
        } else {
            None
        };
        let templates = read(&dir.join(TEMPLATES_FILE))?;
        let traits = read(&dir.join(TRAITS_FILE))?;
        let flavours = read(&dir.join(FLAVOURS_FILE))?;
        let fallbacks = read(&dir.join(FALLBACKS_FILE))?;

        let store = Self::from_sources(ContentSources {
            intents: intents.as_deref(),
            templates: &templates,
            traits: &traits,
            flavours: &flavours,
            fallbacks: &fallbacks,
        })?;
        tracing::info!(
            "ContentStore: loaded {} templates, {} intents from {}",
            store.templates.len(),
            store.intents.rules().len(),
            dir.display()
        );
        Ok(store)
    }

    fn validate(&self) -> Result<(), ContentError> {
        let mut declared = HashSet::new();
        for rule in self.intents.rules() {
            let label = rule.intent.as_str();
            if label == UNKNOWN_INTENT || label == WILDCARD_INTENT {
                return Err(ContentError::ReservedIntent(label.to_string()));
            }
            if !declared.insert(label) {
                return Err(ContentError::DuplicateIntent(label.to_string()));
            }
        }

        let mut ids = HashSet::new();
        for template in &self.templates {
            if template.id.is_empty() {
                return Err(ContentError::EmptyTemplateId);
            }
            if !ids.insert(template.id.as_str()) {
                return Err(ContentError::DuplicateTemplate(template.id.clone()));
            }
            if let TemplateIntent::Named(intent) = &template.intent {
                if !declared.contains(intent.as_str()) {
                    return Err(ContentError::UndeclaredIntent {
                        id: template.id.clone(),
                        intent: intent.to_string(),
                    });
                }
            }
            if let Conditions {
                mood_min: Some(min),
                mood_max: Some(max),
            } = template.conditions
            {
                if min > max {
                    return Err(ContentError::InvertedConditions {
                        id: template.id.clone(),
                        min,
                        max,
                    });
                }
            }
        }

        if self.traits.pool(MoodZone::Neutral).is_empty() {
            return Err(ContentError::MissingNeutralTraits);
        }

        for (pool, chance) in [
            ("comments", self.flavours.comments.chance),
            ("actions", self.flavours.actions.chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ContentError::InvalidChance { pool, chance });
            }
        }

        if self.fallbacks.confused.is_empty() {
            return Err(ContentError::EmptyFallback("confused"));
        }
        if self.fallbacks.generic.is_empty() {
            return Err(ContentError::EmptyFallback("generic"));
        }

        Ok(())
    }

    pub fn intents(&self) -> &IntentTable {
        &self.intents
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn traits(&self) -> &TraitTable {
        &self.traits
    }

    pub fn flavours(&self) -> &Flavours {
        &self.flavours
    }

    pub fn fallbacks(&self) -> &Fallbacks {
        &self.fallbacks
    }
}

fn read(path: &Path) -> Result<String, ContentError> {
    std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: serde::de::DeserializeOwned>(
    resource: &'static str,
    json: &str,
) -> Result<T, ContentError> {
    serde_json::from_str(json).map_err(|source| ContentError::Parse { resource, source })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sources<'a>(templates: &'a str) -> ContentSources<'a> {
        ContentSources {
            intents: None,
            templates,
            traits: BUILTIN_TRAITS,
            flavours: BUILTIN_FLAVOURS,
            fallbacks: BUILTIN_FALLBACKS,
        }
    }

    #[test]
    fn test_builtin_content_loads() {
        let store = ContentStore::builtin().unwrap();
        assert!(!store.templates().is_empty());
        assert!(store.template("greet_soft").is_some());
        assert!(store.intents().contains("name_call"));
        assert!(!store.fallbacks().confused.is_empty());
    }

    #[test]
    fn test_builtin_loading_is_idempotent() {
        assert_eq!(ContentStore::builtin().unwrap(), ContentStore::builtin().unwrap());
    }

    #[test]
    fn test_template_defaults() {
        let json = r#"[{"id": "bare", "intent": "any"}]"#;
        let store = ContentStore::from_sources(sources(json)).unwrap();
        let t = store.template("bare").unwrap();
        assert_eq!(t.intent, TemplateIntent::Any);
        assert!(t.response.is_empty());
        assert!(t.question.is_empty());
        assert_eq!(t.mood_delta, 0);
        assert_eq!(t.conditions, Conditions::default());
        assert!(!t.exit);
    }

    #[test]
    fn test_template_intent_serde() {
        let any: TemplateIntent = serde_json::from_str("\"any\"").unwrap();
        assert_eq!(any, TemplateIntent::Any);
        let named: TemplateIntent = serde_json::from_str("\"greeting\"").unwrap();
        assert_eq!(named, TemplateIntent::Named(Intent::new("greeting")));
        assert_eq!(serde_json::to_string(&any).unwrap(), "\"any\"");
    }

    #[test]
    fn test_template_intent_matching() {
        let greeting = Intent::new("greeting");
        assert_eq!(TemplateIntent::Any.matches(&greeting), Some(IntentMatch::Wildcard));
        assert_eq!(
            TemplateIntent::Named(greeting.clone()).matches(&greeting),
            Some(IntentMatch::Exact)
        );
        assert_eq!(
            TemplateIntent::Named(Intent::new("sleep")).matches(&greeting),
            None
        );
    }

    #[test]
    fn test_conditions_are_inclusive() {
        let c = Conditions {
            mood_min: Some(-10),
            mood_max: Some(10),
        };
        assert!(c.allows(-10));
        assert!(c.allows(10));
        assert!(!c.allows(-11));
        assert!(!c.allows(11));
        assert!(Conditions::default().allows(-100));
    }

    #[test]
    fn test_rejects_undeclared_intent() {
        let json = r#"[{"id": "x", "intent": "dancing"}]"#;
        let err = ContentStore::from_sources(sources(json)).unwrap_err();
        assert!(matches!(err, ContentError::UndeclaredIntent { .. }));
    }

    #[test]
    fn test_rejects_unknown_as_template_intent() {
        let json = r#"[{"id": "x", "intent": "unknown"}]"#;
        let err = ContentStore::from_sources(sources(json)).unwrap_err();
        assert!(matches!(err, ContentError::UndeclaredIntent { .. }));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"[{"id": "x", "intent": "any"}, {"id": "x", "intent": "greeting"}]"#;
        let err = ContentStore::from_sources(sources(json)).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateTemplate(id) if id == "x"));
    }

    #[test]
    fn test_rejects_inverted_conditions() {
        let json = r#"[{"id": "x", "intent": "any", "conditions": {"mood_min": 5, "mood_max": -5}}]"#;
        let err = ContentStore::from_sources(sources(json)).unwrap_err();
        assert!(matches!(err, ContentError::InvertedConditions { min: 5, max: -5, .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = ContentStore::from_sources(sources("[{")).unwrap_err();
        assert!(matches!(err, ContentError::Parse { resource: TEMPLATES_FILE, .. }));
    }

    #[test]
    fn test_rejects_empty_fallback_pool() {
        let err = ContentStore::from_sources(ContentSources {
            fallbacks: r#"{"confused": ["?"], "generic": []}"#,
            ..sources("[]")
        })
        .unwrap_err();
        assert!(matches!(err, ContentError::EmptyFallback("generic")));
    }

    #[test]
    fn test_rejects_missing_neutral_traits() {
        let err = ContentStore::from_sources(ContentSources {
            traits: r#"{"angry": ["grr"]}"#,
            ..sources("[]")
        })
        .unwrap_err();
        assert!(matches!(err, ContentError::MissingNeutralTraits));
    }

    #[test]
    fn test_rejects_bad_chance() {
        let err = ContentStore::from_sources(ContentSources {
            flavours: r#"{"comments": {"chance": 1.5, "lines": []}, "actions": []}"#,
            ..sources("[]")
        })
        .unwrap_err();
        assert!(matches!(err, ContentError::InvalidChance { pool: "comments", .. }));
    }

    #[test]
    fn test_rejects_reserved_intent_labels() {
        let err = ContentStore::from_sources(ContentSources {
            intents: Some(r#"[{"intent": "any", "keywords": ["x"]}]"#),
            ..sources("[]")
        })
        .unwrap_err();
        assert!(matches!(err, ContentError::ReservedIntent(label) if label == "any"));
    }

    #[test]
    fn test_custom_intents_replace_builtin() {
        let store = ContentStore::from_sources(ContentSources {
            intents: Some(r#"[{"intent": "weather", "keywords": ["rain"]}]"#),
            ..sources(r#"[{"id": "w", "intent": "weather"}]"#)
        })
        .unwrap();
        assert!(store.intents().contains("weather"));
        assert!(!store.intents().contains("greeting"));
    }

    #[test]
    fn test_actions_accept_list_or_pool() {
        let listed: Flavours =
            serde_json::from_str(r#"{"comments": {"chance": 0.1, "lines": []}, "actions": ["*yawn*"]}"#)
                .unwrap();
        assert_eq!(listed.actions.chance, DEFAULT_ACTION_CHANCE);
        assert_eq!(listed.actions.lines, vec!["*yawn*"]);

        let pooled: Flavours = serde_json::from_str(
            r#"{"comments": {"chance": 0.1, "lines": []}, "actions": {"chance": 0.5, "lines": ["*yawn*"]}}"#,
        )
        .unwrap();
        assert_eq!(pooled.actions.chance, 0.5);
    }

    #[test]
    fn test_trait_pool_falls_back_to_neutral() {
        let mut pools = BTreeMap::new();
        pools.insert(MoodZone::Neutral, vec!["calm".to_string()]);
        pools.insert(MoodZone::Angry, Vec::new());
        let traits = TraitTable::new(pools);
        assert_eq!(traits.pool(MoodZone::Playful), ["calm".to_string()]);
        assert_eq!(traits.pool(MoodZone::Angry), ["calm".to_string()]);
        assert_eq!(traits.pool(MoodZone::Neutral), ["calm".to_string()]);
    }
}
