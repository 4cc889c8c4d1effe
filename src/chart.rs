//! CKY chart parsing.
//!
//! Cell `(i, j)` holds every derivation of `words[i..j]`. Cells are filled in
//! increasing span length, so both halves of every split are complete before
//! the cell that joins them is computed. Unknown words and unparsable
//! sentences are not errors: they simply leave cells empty.

use miette::Diagnostic;
use rayon::prelude::*;
use thiserror::Error;

use crate::agenda::{Agenda, ScoredDerivation, Scorer};
use crate::config::ParserConfig;
use crate::derivation::{self, DerivationTree};
use crate::lexicon::LexicalLookup;

/// Errors raised by the checked parse entry points.
#[derive(Debug, Error, Diagnostic)]
pub enum ChartError {
    #[error("sentence has {len} words, the configured limit is {max}")]
    #[diagnostic(
        code(ccg::chart::too_long),
        help("Split the input or raise `max_words` in the parser config.")
    )]
    SentenceTooLong { len: usize, max: usize },
}

pub type ChartResult<T> = std::result::Result<T, ChartError>;

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

/// The filled CKY table for one sentence.
#[derive(Debug, Clone, Default)]
pub struct Chart {
    words: usize,
    cells: Vec<Vec<DerivationTree>>,
}

impl Chart {
    fn new(words: usize) -> Self {
        Self {
            words,
            cells: vec![Vec::new(); words * (words + 1)],
        }
    }

    fn index(&self, i: usize, j: usize) -> Option<usize> {
        (i < j && j <= self.words).then(|| i * (self.words + 1) + j)
    }

    fn set(&mut self, i: usize, j: usize, trees: Vec<DerivationTree>) {
        if let Some(idx) = self.index(i, j) {
            self.cells[idx] = trees;
        }
    }

    /// Number of words the chart spans.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Derivations of `words[i..j]`; empty for invalid spans.
    pub fn cell(&self, i: usize, j: usize) -> &[DerivationTree] {
        self.index(i, j)
            .map(|idx| self.cells[idx].as_slice())
            .unwrap_or(&[])
    }

    /// Derivations of the whole sentence.
    pub fn root(&self) -> &[DerivationTree] {
        self.cell(0, self.words)
    }

    /// Trees stored across all cells.
    pub fn total_trees(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// How a cell combines the trees of its sub-spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Every licensed parent of every pair.
    Exhaustive,
    /// The single parent [`derivation::construct_parent`] picks for each pair.
    Deterministic,
}

/// A CKY parser over a read-only lexicon.
///
/// The parser holds no per-sentence state, so one instance can parse many
/// sentences, including from several threads at once.
#[derive(Debug, Clone)]
pub struct ChartParser<'a, L: LexicalLookup> {
    lexicon: &'a L,
    config: ParserConfig,
}

impl<'a, L: LexicalLookup> ChartParser<'a, L> {
    pub fn new(lexicon: &'a L) -> Self {
        Self::with_config(lexicon, ParserConfig::default())
    }

    pub fn with_config(lexicon: &'a L, config: ParserConfig) -> Self {
        Self { lexicon, config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Build the full chart, without beam pruning.
    pub fn chart(&self, words: &[&str]) -> Chart {
        self.fill(words, None, Strategy::Exhaustive)
    }

    /// Every derivation of the whole sentence.
    pub fn parse(&self, words: &[&str]) -> Vec<DerivationTree> {
        self.chart(words).root().to_vec()
    }

    /// Like [`parse`](Self::parse), but enforces `max_words`.
    pub fn try_parse(&self, words: &[&str]) -> ChartResult<Vec<DerivationTree>> {
        self.check_length(words)?;
        Ok(self.parse(words))
    }

    /// A single derivation.
    ///
    /// Every lexical entry is seeded and every split and pair of sub-trees is
    /// tried, but each pair contributes only the one parent
    /// [`derivation::construct_parent`] picks. The first tree of the root
    /// cell (lowest split point first) is returned.
    pub fn parse_deterministic(&self, words: &[&str]) -> Option<DerivationTree> {
        self.fill(words, None, Strategy::Deterministic)
            .root()
            .first()
            .cloned()
    }

    /// Like [`parse_deterministic`](Self::parse_deterministic), but enforces
    /// `max_words`.
    pub fn try_parse_deterministic(&self, words: &[&str]) -> ChartResult<Option<DerivationTree>> {
        self.check_length(words)?;
        Ok(self.parse_deterministic(words))
    }

    /// The best derivation of the whole sentence under `scorer`.
    ///
    /// When `beam_width` is set, every cell is pruned to its best trees as
    /// the chart is filled.
    pub fn parse_best(&self, words: &[&str], scorer: &dyn Scorer) -> Option<ScoredDerivation> {
        let chart = self.fill(words, Some(scorer), Strategy::Exhaustive);
        let n = chart.len();
        let mut agenda: Agenda<ScoredDerivation> = chart
            .root()
            .iter()
            .map(|tree| {
                let score = scorer.score(words, (0, n), tree);
                ScoredDerivation::new(words, 0, tree.clone(), score)
            })
            .collect();
        agenda.remove_min()
    }

    /// Like [`parse_best`](Self::parse_best), but enforces `max_words`.
    pub fn try_parse_best(
        &self,
        words: &[&str],
        scorer: &dyn Scorer,
    ) -> ChartResult<Option<ScoredDerivation>> {
        self.check_length(words)?;
        Ok(self.parse_best(words, scorer))
    }

    fn check_length(&self, words: &[&str]) -> ChartResult<()> {
        match self.config.max_words {
            Some(max) if words.len() > max => Err(ChartError::SentenceTooLong {
                len: words.len(),
                max,
            }),
            _ => Ok(()),
        }
    }

    fn fill(&self, words: &[&str], scorer: Option<&dyn Scorer>, strategy: Strategy) -> Chart {
        let n = words.len();
        let mut chart = Chart::new(n);

        for (k, word) in words.iter().enumerate() {
            let mut leaves: Vec<DerivationTree> = Vec::new();
            for category in self.lexicon.categories(word) {
                let leaf = DerivationTree::leaf(category.clone());
                if !leaves.contains(&leaf) {
                    leaves.push(leaf);
                }
            }
            tracing::debug!(start = k, end = k + 1, word = *word, trees = leaves.len(), "seeded cell");
            chart.set(k, k + 1, leaves);
        }

        for span in 2..=n {
            let starts = 0..=n - span;
            let filled: Vec<(usize, Vec<DerivationTree>)> = if self.config.parallel {
                starts
                    .into_par_iter()
                    .map(|i| (i, self.fill_cell(&chart, words, (i, i + span), scorer, strategy)))
                    .collect()
            } else {
                starts
                    .map(|i| (i, self.fill_cell(&chart, words, (i, i + span), scorer, strategy)))
                    .collect()
            };
            for (i, trees) in filled {
                chart.set(i, i + span, trees);
            }
        }
        chart
    }

    fn fill_cell(
        &self,
        chart: &Chart,
        words: &[&str],
        (i, j): (usize, usize),
        scorer: Option<&dyn Scorer>,
        strategy: Strategy,
    ) -> Vec<DerivationTree> {
        let combine: fn(&[DerivationTree], &[DerivationTree], bool) -> Vec<DerivationTree> =
            match strategy {
                Strategy::Exhaustive => derivation::combine,
                Strategy::Deterministic => derivation::combine_first,
            };
        let mut trees = Vec::new();
        for k in i + 1..j {
            trees.extend(combine(chart.cell(i, k), chart.cell(k, j), self.config.crossing));
        }
        let trees = match (self.config.beam_width, scorer) {
            (Some(width), Some(scorer)) if trees.len() > width => {
                prune(words, (i, j), trees, width, scorer)
            }
            _ => trees,
        };
        tracing::debug!(start = i, end = j, trees = trees.len(), "filled cell");
        trees
    }
}

/// Keep the `width` best trees of a cell.
fn prune(
    words: &[&str],
    span: (usize, usize),
    trees: Vec<DerivationTree>,
    width: usize,
    scorer: &dyn Scorer,
) -> Vec<DerivationTree> {
    let before = trees.len();
    let scored: Vec<ScoredDerivation> = trees
        .into_iter()
        .map(|tree| {
            let score = scorer.score(words, span, &tree);
            ScoredDerivation::new(words, span.0, tree, score)
        })
        .collect();
    let kept: Vec<DerivationTree> = Agenda::from(scored)
        .drain_min(width)
        .into_iter()
        .map(|scored| scored.tree)
        .collect();
    tracing::trace!(
        start = span.0,
        end = span.1,
        before,
        after = kept.len(),
        "beam pruned cell"
    );
    kept
}

/// Parse `words` with the default configuration.
pub fn parse<L: LexicalLookup>(words: &[&str], lexicon: &L) -> Vec<DerivationTree> {
    ChartParser::new(lexicon).parse(words)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::agenda::ApplicationPreference;
    use crate::category::{Category, CombinatorFeature, Direction};
    use crate::lexicon::Lexicon;
    use crate::rules::Rule;

    fn np() -> Category {
        Category::noun_phrase()
    }

    fn toy() -> Lexicon {
        let tv = Category::forward(Category::backward(Category::sentence(), np()), np());
        Lexicon::new()
            .with_entry("I", np())
            .with_entry("proved", tv)
            .with_entry("Marcel", np())
    }

    fn sorted(trees: &[DerivationTree]) -> Vec<String> {
        let mut out: Vec<String> = trees.iter().map(ToString::to_string).collect();
        out.sort();
        out
    }

    #[test]
    fn parses_transitive_sentence() {
        let lex = toy();
        let trees = parse(&["I", "proved", "Marcel"], &lex);
        assert_eq!(trees.len(), 2);
        assert!(trees.iter().all(|t| t.category() == Some(Category::sentence())));
        assert!(trees.iter().any(|t| t.rule() == Some(Rule::BackwardApply)));
        assert!(trees.iter().any(|t| t.rules().contains(&Rule::ForwardTypeRaise)));
    }

    #[test]
    fn chart_cells_and_counts() {
        let lex = toy();
        let chart = ChartParser::new(&lex).chart(&["I", "proved", "Marcel"]);
        assert_eq!(chart.len(), 3);
        assert_eq!(chart.cell(0, 1).len(), 1);
        assert_eq!(chart.cell(0, 2).len(), 1);
        assert_eq!(
            chart.cell(1, 3)[0].category(),
            Some(Category::backward(Category::sentence(), np()))
        );
        assert!(chart.cell(2, 1).is_empty());
        assert!(chart.cell(0, 9).is_empty());
        assert_eq!(chart.total_trees(), 7);
    }

    #[test]
    fn unknown_word_yields_nothing() {
        let lex = toy();
        assert!(parse(&["I", "vanished"], &lex).is_empty());
        let chart = ChartParser::new(&lex).chart(&["I", "vanished"]);
        assert!(chart.cell(1, 2).is_empty());
    }

    #[test]
    fn empty_input_yields_nothing() {
        let lex = toy();
        let parser = ChartParser::new(&lex);
        assert!(parser.parse(&[]).is_empty());
        assert!(parser.chart(&[]).is_empty());
        assert!(parser.parse_deterministic(&[]).is_none());
        assert!(parser.parse_best(&[], &ApplicationPreference).is_none());
    }

    #[test]
    fn single_word_is_its_own_derivation() {
        let lex = toy();
        assert_eq!(parse(&["Marcel"], &lex), vec![DerivationTree::leaf(np())]);
    }

    #[test]
    fn deterministic_parse_takes_first_split() {
        let lex = toy();
        let tree = ChartParser::new(&lex)
            .parse_deterministic(&["I", "proved", "Marcel"])
            .unwrap();
        assert_eq!(tree.rule(), Some(Rule::BackwardApply));
        assert_eq!(tree.category(), Some(Category::sentence()));
        assert!(
            ChartParser::new(&lex)
                .parse_deterministic(&["Marcel", "I"])
                .is_none()
        );
    }

    #[test]
    fn deterministic_parse_keeps_lexical_ambiguity() {
        // The noun entry comes first and leads nowhere.
        let tv = Category::forward(Category::backward(Category::sentence(), np()), np());
        let lex = Lexicon::new()
            .with_entry("I", Category::noun())
            .with_entry("I", np())
            .with_entry("proved", tv)
            .with_entry("Marcel", np());
        let parser = ChartParser::new(&lex);
        let words = ["I", "proved", "Marcel"];
        assert_eq!(parser.parse(&words).len(), 2);
        let tree = parser.parse_deterministic(&words).unwrap();
        assert_eq!(tree.category(), Some(Category::sentence()));
        assert_eq!(tree.rule(), Some(Rule::BackwardApply));
    }

    #[test]
    fn deterministic_parse_tries_every_split() {
        // "I I proved Marcel": the first split of the root has no parent, a
        // later one does.
        let lex = toy().with_entry("I", Category::forward(np(), np()));
        let words = ["I", "I", "proved", "Marcel"];
        let parser = ChartParser::new(&lex);
        assert!(!parser.parse(&words).is_empty());
        let tree = parser.parse_deterministic(&words).unwrap();
        assert_eq!(tree.category(), Some(Category::sentence()));
        assert_eq!(tree.leaf_count(), 4);
    }

    #[test]
    fn parallel_fill_matches_serial() {
        let lex = toy().with_entry("I", Category::forward(np(), np()));
        let words = ["I", "I", "proved", "Marcel"];
        let serial = ChartParser::new(&lex).parse(&words);
        let config = ParserConfig {
            parallel: true,
            ..ParserConfig::default()
        };
        let parallel = ChartParser::with_config(&lex, config).parse(&words);
        assert!(!serial.is_empty());
        assert_eq!(sorted(&serial), sorted(&parallel));
    }

    #[test]
    fn best_parse_prefers_application() {
        let lex = toy();
        let best = ChartParser::new(&lex)
            .parse_best(&["I", "proved", "Marcel"], &ApplicationPreference)
            .unwrap();
        assert_eq!(best.score, 0.0);
        assert_eq!(best.tree.rule(), Some(Rule::BackwardApply));
        assert_eq!(best.head_index, 1);
        assert_eq!(best.head_word, "proved");
    }

    #[test]
    fn beam_keeps_best_trees_per_cell() {
        let lex = toy();
        let config = ParserConfig {
            beam_width: Some(1),
            ..ParserConfig::default()
        };
        let parser = ChartParser::with_config(&lex, config);
        let words = ["I", "proved", "Marcel"];
        let best = parser.parse_best(&words, &ApplicationPreference).unwrap();
        assert_eq!(best.tree.rule(), Some(Rule::BackwardApply));
        // Without a scorer the beam is not applied.
        assert_eq!(parser.parse(&words).len(), 2);
    }

    #[test]
    fn crossing_can_be_disabled() {
        let pl = |r, d, a| Category::functor(r, d, CombinatorFeature::PermutationLimiting, a);
        let lex = Lexicon::new()
            .with_entry("x", pl(Category::sentence(), Direction::Forward, np()))
            .with_entry("y", pl(np(), Direction::Backward, np()));
        let with = ChartParser::new(&lex).parse(&["x", "y"]);
        assert_eq!(with.len(), 1);
        assert_eq!(with[0].rule(), Some(Rule::ForwardCrossCompose));
        let config = ParserConfig {
            crossing: false,
            ..ParserConfig::default()
        };
        assert!(ChartParser::with_config(&lex, config).parse(&["x", "y"]).is_empty());
    }

    #[test]
    fn try_parse_enforces_length_limit() {
        let lex = toy();
        let config = ParserConfig {
            max_words: Some(2),
            ..ParserConfig::default()
        };
        let parser = ChartParser::with_config(&lex, config);
        let words = ["I", "proved", "Marcel"];
        let err = parser.try_parse(&words).unwrap_err();
        assert!(matches!(err, ChartError::SentenceTooLong { len: 3, max: 2 }));
        let err = parser.try_parse_deterministic(&words).unwrap_err();
        assert!(matches!(err, ChartError::SentenceTooLong { len: 3, max: 2 }));
        let err = parser
            .try_parse_best(&words, &ApplicationPreference)
            .unwrap_err();
        assert!(matches!(err, ChartError::SentenceTooLong { len: 3, max: 2 }));

        assert!(parser.try_parse(&["I", "vanished"]).unwrap().is_empty());
        assert!(parser.try_parse_deterministic(&["I", "I"]).unwrap().is_none());
        assert!(
            parser
                .try_parse_best(&["Marcel"], &ApplicationPreference)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn ambiguous_words_never_duplicate_trees() {
        let lex = toy().with_entry("Marcel", Category::forward(np(), np()));
        let chart = ChartParser::new(&lex).chart(&["I", "proved", "Marcel", "Marcel"]);
        for i in 0..chart.len() {
            for j in i + 1..=chart.len() {
                let cell = chart.cell(i, j);
                let unique: HashSet<&DerivationTree> = cell.iter().collect();
                assert_eq!(unique.len(), cell.len(), "duplicate tree in cell ({i}, {j})");
            }
        }
    }
}
