//! # neko expression
//!
//! Turns a selected template into the text the user sees.

mod composer;

pub use composer::Composer;
