// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ccg-chart
//!
//! Combinatory Categorial Grammar parsing over a CKY chart.
//!
//! ## Architecture
//!
//! - **Categories** (`category`): atoms, the raising variable and directional
//!   functors carrying a combinator feature
//! - **Rules** (`rules`): application, harmonic and crossing composition,
//!   type-raising; every rule returns `None` when it does not apply
//! - **Derivations** (`derivation`): binary trees whose categories are
//!   recomputed from their children
//! - **Chart** (`chart`): exhaustive, deterministic and scored CKY parsing,
//!   optionally span-parallel with rayon
//! - **Agenda** (`agenda`): min-heap of scored derivations used for best-first
//!   selection and beam pruning
//! - **Notation / lexicon / config**: text and TOML front ends
//!
//! ## Library usage
//!
//! ```
//! use ccg_chart::chart::parse;
//! use ccg_chart::lexicon::Lexicon;
//!
//! let lexicon = Lexicon::from_toml(
//!     r#"
//! [words]
//! I = ["NP"]
//! proved = ["(S\\NP)/NP"]
//! Marcel = ["NP"]
//! "#,
//! )
//! .unwrap();
//! let trees = parse(&["I", "proved", "Marcel"], &lexicon);
//! assert!(trees.iter().any(|t| t.category() == Some("S".parse().unwrap())));
//! ```

pub mod agenda;
pub mod category;
pub mod chart;
pub mod config;
pub mod derivation;
pub mod error;
pub mod lexicon;
pub mod notation;
pub mod rules;

pub use category::{Category, CombinatorFeature, Direction, Primitive, SentenceFeature};
pub use chart::{Chart, ChartParser, parse};
pub use derivation::DerivationTree;
pub use error::{CcgError, CcgResult};
pub use lexicon::{LexicalLookup, Lexicon};
pub use rules::Rule;
