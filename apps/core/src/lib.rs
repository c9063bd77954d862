//! QueryLens core: word frequencies, intent categories, sentiment buckets and
//! question-word counts over user questions.
//!
//! The analyzers live in [`brain`]; [`actors`] runs them off the async
//! runtime; [`source`] reads question records and [`config`] reads the
//! process settings.

pub mod actors;
pub mod brain;
pub mod config;
pub mod error;
pub mod models;
pub mod source;

pub use error::AppError;

#[cfg(test)]
mod tests;
