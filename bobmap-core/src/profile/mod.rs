//! Taste questionnaire scoring.
//!
//! [`schema`] holds the static questionnaire; [`calculator`] turns a set of
//! answers into archetype scores, a primary profile type, and a taste vector.

pub mod calculator;
pub mod schema;

pub use calculator::{evaluate, Answer, ProfileScore};
