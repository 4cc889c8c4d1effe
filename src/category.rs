//! Grammar categories: the recursive type every combinatory rule works on.
//!
//! A [`Category`] is either an atomic grammatical class ([`Primitive`]), the
//! open meta-variable used by generic type-raising, or a directional functor
//! `result / argument` (forward) or `result \ argument` (backward). Functors
//! carry a [`CombinatorFeature`] that decides which rules they may take part in.
//!
//! Categories are immutable values. Every operation here returns a new value
//! and equality is structural all the way down.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sentence features
// ---------------------------------------------------------------------------

/// Feature tag on a sentence category, e.g. the `dcl` in `S[dcl]`.
///
/// Clausal tags describe the clause type; lexical tags describe the verb
/// form heading a verb-phrase-like sentence category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentenceFeature {
    // ── Clausal ─────────────────────────────────────────────────────────
    DeclarativeSentence,
    WhQuestion,
    YesNoQuestion,
    EmbeddedQuestion,
    EmbeddedSentence,
    SubjunctiveEmbeddedSentence,
    SubjunctiveSentence,
    Fragment,
    /// Small clauses headed by "for": `for X to do Y`.
    ForClause,
    Interjection,
    /// `(as) [does the committee]`.
    EllipticalInversion,

    // ── Lexical ─────────────────────────────────────────────────────────
    /// Attributive adjectives, `S[adj]\NP`.
    Adjective,
    BareInfinitive,
    ToInfinitive,
    PassivePastParticiple,
    ActivePastParticiple,
    PresentParticiple,
}

impl SentenceFeature {
    /// Every feature, clausal tags first.
    pub const ALL: [SentenceFeature; 17] = [
        SentenceFeature::DeclarativeSentence,
        SentenceFeature::WhQuestion,
        SentenceFeature::YesNoQuestion,
        SentenceFeature::EmbeddedQuestion,
        SentenceFeature::EmbeddedSentence,
        SentenceFeature::SubjunctiveEmbeddedSentence,
        SentenceFeature::SubjunctiveSentence,
        SentenceFeature::Fragment,
        SentenceFeature::ForClause,
        SentenceFeature::Interjection,
        SentenceFeature::EllipticalInversion,
        SentenceFeature::Adjective,
        SentenceFeature::BareInfinitive,
        SentenceFeature::ToInfinitive,
        SentenceFeature::PassivePastParticiple,
        SentenceFeature::ActivePastParticiple,
        SentenceFeature::PresentParticiple,
    ];

    /// The tag as written between brackets in category notation.
    pub fn tag(self) -> &'static str {
        match self {
            Self::DeclarativeSentence => "dcl",
            Self::WhQuestion => "wq",
            Self::YesNoQuestion => "q",
            Self::EmbeddedQuestion => "qem",
            Self::EmbeddedSentence => "em",
            Self::SubjunctiveEmbeddedSentence => "bem",
            Self::SubjunctiveSentence => "sbj",
            Self::Fragment => "frg",
            Self::ForClause => "for",
            Self::Interjection => "intj",
            Self::EllipticalInversion => "inv",
            Self::Adjective => "adj",
            Self::BareInfinitive => "b",
            Self::ToInfinitive => "to",
            Self::PassivePastParticiple => "pss",
            Self::ActivePastParticiple => "pt",
            Self::PresentParticiple => "ng",
        }
    }

    /// Look a feature up by its notation tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    /// Whether this tag describes a clause type rather than a verb form.
    pub fn is_clausal(self) -> bool {
        !matches!(
            self,
            Self::Adjective
                | Self::BareInfinitive
                | Self::ToInfinitive
                | Self::PassivePastParticiple
                | Self::ActivePastParticiple
                | Self::PresentParticiple
        )
    }
}

impl std::fmt::Display for SentenceFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Primitive
// ---------------------------------------------------------------------------

/// An atomic grammatical class.
///
/// Only sentences carry a feature. `Sentence(None)` is its own tag and is
/// never equal to a sentence with any explicit feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Sentence(Option<SentenceFeature>),
    Noun,
    Preposition,
    Verb,
    NounPhrase,
    PrepositionalPhrase,
    VerbPhrase,
}

impl Primitive {
    /// The bare sentence primitive `S`.
    pub const SENTENCE: Primitive = Primitive::Sentence(None);
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Primitive::Sentence(Some(feature)) => write!(f, "S[{feature}]"),
            Primitive::Sentence(None) => write!(f, "S"),
            Primitive::Noun => write!(f, "N"),
            Primitive::Preposition => write!(f, "P"),
            Primitive::Verb => write!(f, "V"),
            Primitive::NounPhrase => write!(f, "NP"),
            Primitive::PrepositionalPhrase => write!(f, "PP"),
            Primitive::VerbPhrase => write!(f, "VP"),
        }
    }
}

// ---------------------------------------------------------------------------
// Direction & combinator features
// ---------------------------------------------------------------------------

/// Which side a functor looks for its argument on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// `/`: argument to the right.
    Forward,
    /// `\`: argument to the left.
    Backward,
}

impl Direction {
    pub fn inverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "/"),
            Direction::Backward => write!(f, "\\"),
        }
    }
}

/// Slash modality governing which combinators a functor may take part in.
///
/// Every feature permits application. Composition is gated:
/// - harmonic (same-direction) composition needs both sides harmonic,
/// - crossing composition needs both sides `PermutationLimiting`,
/// - `ApplicationOnly` never composes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombinatorFeature {
    /// `★`
    ApplicationOnly,
    /// `◇`
    OrderPreserving,
    /// `×`
    PermutationLimiting,
    /// `·`, printed as a bare slash.
    Permissive,
    /// `𝑖`: unresolved, produced by generic type-raising.
    Variable,
}

impl CombinatorFeature {
    /// Harmonic features permit same-direction composition.
    pub fn is_harmonic(self) -> bool {
        matches!(
            self,
            CombinatorFeature::Permissive | CombinatorFeature::OrderPreserving
        )
    }

    /// Whether two functors may compose harmonically (`/` with `/`, `\` with `\`).
    pub fn compatible_harmonic(self, other: Self) -> bool {
        self.is_harmonic() && other.is_harmonic()
    }

    /// Whether two functors may compose across directions.
    pub fn compatible_crossing(self, other: Self) -> bool {
        self == CombinatorFeature::PermutationLimiting
            && other == CombinatorFeature::PermutationLimiting
    }

    /// The glyph printed right after the slash.
    pub fn glyph(self) -> &'static str {
        match self {
            CombinatorFeature::ApplicationOnly => "★",
            CombinatorFeature::OrderPreserving => "◇",
            CombinatorFeature::PermutationLimiting => "×",
            CombinatorFeature::Permissive => "",
            CombinatorFeature::Variable => "𝑖",
        }
    }
}

impl std::fmt::Display for CombinatorFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.glyph())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A CCG category.
///
/// Categories are finite trees owned through boxes; equality is structural
/// and exact, including sentence features and combinator features.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// An atomic category.
    Atom(Primitive),
    /// Placeholder left open by generic type-raising.
    Variable,
    /// `result / argument` or `result \ argument`.
    Functor {
        result: Box<Category>,
        direction: Direction,
        feature: CombinatorFeature,
        argument: Box<Category>,
    },
}

impl Category {
    pub fn atom(primitive: Primitive) -> Self {
        Category::Atom(primitive)
    }

    pub fn functor(
        result: Category,
        direction: Direction,
        feature: CombinatorFeature,
        argument: Category,
    ) -> Self {
        Category::Functor {
            result: Box::new(result),
            direction,
            feature,
            argument: Box::new(argument),
        }
    }

    /// Permissive `result / argument`.
    pub fn forward(result: Category, argument: Category) -> Self {
        Self::functor(result, Direction::Forward, CombinatorFeature::Permissive, argument)
    }

    /// Permissive `result \ argument`.
    pub fn backward(result: Category, argument: Category) -> Self {
        Self::functor(result, Direction::Backward, CombinatorFeature::Permissive, argument)
    }

    /// `S` without a feature.
    pub fn sentence() -> Self {
        Category::Atom(Primitive::SENTENCE)
    }

    /// `S[feature]`.
    pub fn sentence_with(feature: SentenceFeature) -> Self {
        Category::Atom(Primitive::Sentence(Some(feature)))
    }

    pub fn noun() -> Self {
        Category::Atom(Primitive::Noun)
    }

    pub fn noun_phrase() -> Self {
        Category::Atom(Primitive::NounPhrase)
    }

    pub fn prepositional_phrase() -> Self {
        Category::Atom(Primitive::PrepositionalPhrase)
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Category::Atom(_))
    }

    pub fn is_functor(&self) -> bool {
        matches!(self, Category::Functor { .. })
    }

    pub fn result(&self) -> Option<&Category> {
        match self {
            Category::Functor { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn argument(&self) -> Option<&Category> {
        match self {
            Category::Functor { argument, .. } => Some(argument),
            _ => None,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Category::Functor { direction, .. } => Some(*direction),
            _ => None,
        }
    }

    pub fn feature(&self) -> Option<CombinatorFeature> {
        match self {
            Category::Functor { feature, .. } => Some(*feature),
            _ => None,
        }
    }

    /// Whether any node reachable from here is [`Category::Variable`].
    pub fn contains_variable(&self) -> bool {
        match self {
            Category::Atom(_) => false,
            Category::Variable => true,
            Category::Functor {
                result, argument, ..
            } => result.contains_variable() || argument.contains_variable(),
        }
    }

    /// A closed category contains no variable.
    pub fn is_closed(&self) -> bool {
        !self.contains_variable()
    }

    /// Replace every variable leaf with `target`.
    ///
    /// Atoms come back unchanged and functors keep their direction and
    /// feature. The functor's own `Variable` feature is left alone; only
    /// category positions are substituted.
    pub fn replacing_variables(&self, target: &Category) -> Category {
        match self {
            Category::Atom(_) => self.clone(),
            Category::Variable => target.clone(),
            Category::Functor {
                result,
                direction,
                feature,
                argument,
            } => Category::functor(
                result.replacing_variables(target),
                *direction,
                *feature,
                argument.replacing_variables(target),
            ),
        }
    }

    /// Number of nodes in the category tree.
    pub fn size(&self) -> usize {
        match self {
            Category::Atom(_) | Category::Variable => 1,
            Category::Functor {
                result, argument, ..
            } => 1 + result.size() + argument.size(),
        }
    }
}

impl From<Primitive> for Category {
    fn from(primitive: Primitive) -> Self {
        Category::Atom(primitive)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Atom(p) => write!(f, "{p}"),
            Category::Variable => write!(f, "X"),
            Category::Functor {
                result,
                direction,
                feature,
                argument,
            } => write!(f, "({result}{direction}{feature}{argument})"),
        }
    }
}
