//! # neko reasoning
//!
//! Picks a template for each turn and sequences the whole decision:
//! classification, mood bookkeeping, selection and rendering.
//!
//! ```no_run
//! use std::sync::Arc;
//! use neko_core::ContentStore;
//! use neko_reasoning::Responder;
//!
//! let content = Arc::new(ContentStore::builtin().unwrap());
//! let responder = Responder::with_defaults(content);
//! let mut state = responder.new_state();
//! let (text, exit) = responder
//!     .respond("hello", &mut state, &mut rand::thread_rng())
//!     .into_parts();
//! # let _ = (text, exit);
//! ```

mod engine;
pub mod selector;

pub use engine::{Responder, TurnOutcome};
pub use selector::{choose_best, compute_utility, get_candidates, ScoredCandidate};
