//! Word-to-category lexicons.
//!
//! The chart only needs read access through [`LexicalLookup`]. [`Lexicon`] is
//! the owned implementation, loadable from TOML:
//!
//! ```toml
//! [lexicon]
//! name = "toy"
//!
//! [words]
//! I = ["NP"]
//! proved = ["(S\\NP)/NP"]
//! Marcel = ["NP"]
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::category::Category;
use crate::notation::{self, NotationError};

/// Errors produced while building a lexicon from external input.
#[derive(Debug, Error, Diagnostic)]
pub enum LexiconError {
    #[error("failed to read lexicon file: {path}")]
    #[diagnostic(
        code(ccg::lexicon::io),
        help("Ensure the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lexicon TOML: {message}")]
    #[diagnostic(
        code(ccg::lexicon::toml),
        help(
            "A lexicon is a TOML table `[words]` mapping each word to a list of \
             category strings, e.g. `proved = [\"(S\\\\NP)/NP\"]`."
        )
    )]
    Toml { message: String },

    #[error("invalid category for word \"{word}\"")]
    #[diagnostic(
        code(ccg::lexicon::category),
        help("Fix the category notation for this entry.")
    )]
    Category {
        word: String,
        #[source]
        #[diagnostic_source]
        source: NotationError,
    },
}

/// Result type for lexicon operations.
pub type LexiconResult<T> = std::result::Result<T, LexiconError>;

/// Read-only lookup from a word to its candidate categories.
pub trait LexicalLookup: Sync {
    /// Categories for `word`; empty when the word is unknown.
    fn categories(&self, word: &str) -> &[Category];
}

impl LexicalLookup for HashMap<String, Vec<Category>> {
    fn categories(&self, word: &str) -> &[Category] {
        self.get(word).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// An owned lexicon. Entries keep insertion order per word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    name: Option<String>,
    entries: HashMap<String, Vec<Category>>,
}

#[derive(Debug, Deserialize)]
struct LexiconToml {
    #[serde(default)]
    lexicon: Option<LexiconMeta>,
    #[serde(default)]
    words: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct LexiconMeta {
    #[serde(default)]
    name: Option<String>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Optional name from the TOML `[lexicon]` table.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Add `category` to `word`'s entries unless it is already there.
    ///
    /// Returns whether the entry was new.
    pub fn add_entry(&mut self, word: impl Into<String>, category: Category) -> bool {
        let entries = self.entries.entry(word.into()).or_default();
        if entries.contains(&category) {
            return false;
        }
        entries.push(category);
        true
    }

    /// Builder form of [`add_entry`](Self::add_entry).
    pub fn with_entry(mut self, word: impl Into<String>, category: Category) -> Self {
        self.add_entry(word, category);
        self
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.entries.get(word).is_some_and(|c| !c.is_empty())
    }

    /// Known words, sorted.
    pub fn words(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        words.sort_unstable();
        words
    }

    /// Number of words with at least one entry.
    pub fn len(&self) -> usize {
        self.entries.values().filter(|c| !c.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of (word, category) entries.
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Parse a lexicon from its TOML form.
    pub fn from_toml(toml_str: &str) -> LexiconResult<Self> {
        let parsed: LexiconToml = toml::from_str(toml_str).map_err(|e| LexiconError::Toml {
            message: e.to_string(),
        })?;
        let mut lexicon = Lexicon {
            name: parsed.lexicon.and_then(|meta| meta.name),
            entries: HashMap::new(),
        };
        for (word, categories) in parsed.words {
            for expr in categories {
                let category =
                    notation::parse_category(&expr).map_err(|source| LexiconError::Category {
                        word: word.clone(),
                        source,
                    })?;
                lexicon.add_entry(word.clone(), category);
            }
        }
        Ok(lexicon)
    }

    /// Load a lexicon from a TOML file.
    pub fn load(path: &Path) -> LexiconResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let lexicon = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            words = lexicon.len(),
            entries = lexicon.entry_count(),
            "lexicon loaded"
        );
        Ok(lexicon)
    }
}

impl LexicalLookup for Lexicon {
    fn categories(&self, word: &str) -> &[Category] {
        self.entries.categories(word)
    }
}

impl<W: Into<String>> FromIterator<(W, Category)> for Lexicon {
    fn from_iter<I: IntoIterator<Item = (W, Category)>>(iter: I) -> Self {
        let mut lexicon = Lexicon::new();
        for (word, category) in iter {
            lexicon.add_entry(word, category);
        }
        lexicon
    }
}
