//! Crate-level error type.
//!
//! Each subsystem defines its own miette diagnostic enum next to the code that
//! raises it. [`CcgError`] wraps them all so callers that touch several
//! subsystems can use a single result type without losing error codes, help
//! text or labelled source spans.

use miette::Diagnostic;
use thiserror::Error;

use crate::chart::ChartError;
use crate::config::ConfigError;
use crate::lexicon::LexiconError;
use crate::notation::NotationError;

/// Top-level error type for the parser.
#[derive(Debug, Error, Diagnostic)]
pub enum CcgError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Notation(#[from] NotationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lexicon(#[from] LexiconError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Chart(#[from] ChartError),
}

/// Convenience alias for functions returning crate results.
pub type CcgResult<T> = std::result::Result<T, CcgError>;
