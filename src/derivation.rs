//! Derivation trees: the binary parse trees the chart builds.
//!
//! A node does not store its category. [`DerivationTree::category`] recomputes
//! it from the children through the node's [`Rule`], so a tree whose rule does
//! not license its children simply denotes nothing.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::rules::{self, Rule};

/// A CCG derivation over a contiguous run of words.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivationTree {
    /// A word's lexical category.
    Leaf(Category),
    /// A constituent raised so it can compose with `neighbor`.
    ///
    /// `category` is the raised constituent's own category; the raised
    /// category is derived lazily via [`rules::raised_against`].
    RaisedLeaf {
        category: Category,
        neighbor: Category,
        source: Box<DerivationTree>,
    },
    /// Two adjacent constituents combined by `rule`.
    Node {
        left: Box<DerivationTree>,
        right: Box<DerivationTree>,
        rule: Rule,
    },
}

impl DerivationTree {
    pub fn leaf(category: Category) -> Self {
        DerivationTree::Leaf(category)
    }

    /// Wrap `source` for raising against `neighbor`.
    ///
    /// Returns `None` when `source` itself denotes nothing.
    pub fn raised_leaf(source: DerivationTree, neighbor: Category) -> Option<Self> {
        let category = source.category()?;
        Some(DerivationTree::RaisedLeaf {
            category,
            neighbor,
            source: Box::new(source),
        })
    }

    pub fn node(left: DerivationTree, right: DerivationTree, rule: Rule) -> Self {
        DerivationTree::Node {
            left: Box::new(left),
            right: Box::new(right),
            rule,
        }
    }

    /// The category this tree denotes, or `None` if some rule along the way
    /// does not license its children.
    pub fn category(&self) -> Option<Category> {
        match self {
            DerivationTree::Leaf(category) => Some(category.clone()),
            DerivationTree::RaisedLeaf {
                category, neighbor, ..
            } => rules::raised_against(category, neighbor),
            DerivationTree::Node { left, right, rule } => {
                let left = left.category()?;
                let right = right.category()?;
                rule.apply(&left, &right)
            }
        }
    }

    /// The child that heads this construction.
    ///
    /// Forward application and composition are headed on the left, backward
    /// ones on the right. Leaves, raised leaves and type-raise nodes head
    /// themselves.
    pub fn head(&self) -> &DerivationTree {
        match self {
            DerivationTree::Node { rule, .. } if rule.is_type_raise() => self,
            DerivationTree::Node { left, rule, .. } if rule.is_forward() => left.as_ref(),
            DerivationTree::Node { right, .. } => right.as_ref(),
            _ => self,
        }
    }

    pub fn rule(&self) -> Option<Rule> {
        match self {
            DerivationTree::Node { rule, .. } => Some(*rule),
            _ => None,
        }
    }

    /// Number of words this tree spans.
    pub fn leaf_count(&self) -> usize {
        match self {
            DerivationTree::Leaf(_) => 1,
            DerivationTree::RaisedLeaf { source, .. } => source.leaf_count(),
            DerivationTree::Node { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Position of the lexical head among this tree's words, found by
    /// following [`head`](Self::head) down to a word.
    pub fn lexical_head_offset(&self) -> usize {
        match self {
            DerivationTree::Leaf(_) => 0,
            DerivationTree::RaisedLeaf { source, .. } => source.lexical_head_offset(),
            DerivationTree::Node { left, right, rule } => {
                if rule.is_type_raise() {
                    0
                } else if rule.is_forward() {
                    left.lexical_head_offset()
                } else {
                    left.leaf_count() + right.lexical_head_offset()
                }
            }
        }
    }

    /// Every rule used in the derivation, pre-order. A raised leaf counts as
    /// one [`Rule::ForwardTypeRaise`].
    pub fn rules(&self) -> Vec<Rule> {
        let mut out = Vec::new();
        self.collect_rules(&mut out);
        out
    }

    /// How often each rule occurs in the derivation.
    pub fn rule_counts(&self) -> HashMap<Rule, usize> {
        let mut counts = HashMap::new();
        for rule in self.rules() {
            *counts.entry(rule).or_insert(0) += 1;
        }
        counts
    }

    fn collect_rules(&self, out: &mut Vec<Rule>) {
        match self {
            DerivationTree::Leaf(_) => {}
            DerivationTree::RaisedLeaf { source, .. } => {
                out.push(Rule::ForwardTypeRaise);
                source.collect_rules(out);
            }
            DerivationTree::Node { left, right, rule } => {
                out.push(*rule);
                left.collect_rules(out);
                right.collect_rules(out);
            }
        }
    }

    /// Depth of the tree; a single word has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            DerivationTree::Leaf(_) => 1,
            DerivationTree::RaisedLeaf { source, .. } => 1 + source.depth(),
            DerivationTree::Node { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Render the derivation one constituent per line, words at the leaves.
    ///
    /// `words` must be the words this tree spans, in order. Missing words are
    /// shown as `?`.
    pub fn render<S: AsRef<str>>(&self, words: &[S]) -> String {
        let mut out = String::new();
        let mut cursor = 0;
        self.render_into(words, 0, &mut cursor, &mut out);
        out
    }

    fn render_into<S: AsRef<str>>(
        &self,
        words: &[S],
        indent: usize,
        cursor: &mut usize,
        out: &mut String,
    ) {
        let pad = "  ".repeat(indent);
        let category = self
            .category()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string());
        match self {
            DerivationTree::Leaf(_) => {
                let word = words.get(*cursor).map(|w| w.as_ref()).unwrap_or("?");
                *cursor += 1;
                let _ = writeln!(out, "{pad}{category}  \"{word}\"");
            }
            DerivationTree::RaisedLeaf { source, .. } => {
                let _ = writeln!(out, "{pad}{}  {category}", Rule::ForwardTypeRaise);
                source.render_into(words, indent + 1, cursor, out);
            }
            DerivationTree::Node { left, right, rule } => {
                let _ = writeln!(out, "{pad}{rule}  {category}");
                left.render_into(words, indent + 1, cursor, out);
                right.render_into(words, indent + 1, cursor, out);
            }
        }
    }
}

impl std::fmt::Display for DerivationTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DerivationTree::Leaf(category) => write!(f, "{category}"),
            DerivationTree::RaisedLeaf {
                category, neighbor, ..
            } => match rules::raised_against(category, neighbor) {
                Some(raised) => write!(f, "{category}{}{raised}", Rule::ForwardTypeRaise),
                None => write!(f, "{category}{}?", Rule::ForwardTypeRaise),
            },
            DerivationTree::Node { left, right, rule } => match self.category() {
                Some(category) => write!(f, "({left} ; {right} --{rule} {category})"),
                None => write!(f, "({left} ; {right} --{rule} ?)"),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate construction
// ---------------------------------------------------------------------------

fn rules_to_try(crossing: bool) -> impl Iterator<Item = Rule> {
    let crossing_rules: &'static [Rule] = if crossing { &Rule::CROSSING } else { &[] };
    Rule::BINARY.into_iter().chain(crossing_rules.iter().copied())
}

/// The raise-then-compose candidate for `left` against `right`, if the left
/// category raises against the right one and the raised form composes.
fn raised_candidate(
    left: &DerivationTree,
    left_category: &Category,
    right: &DerivationTree,
    right_category: &Category,
) -> Option<DerivationTree> {
    let raised = rules::raised_against(left_category, right_category)?;
    rules::forward_compose(&raised, right_category)?;
    Some(DerivationTree::node(
        DerivationTree::RaisedLeaf {
            category: left_category.clone(),
            neighbor: right_category.clone(),
            source: Box::new(left.clone()),
        },
        right.clone(),
        Rule::ForwardCompose,
    ))
}

/// Every licensed parent of two adjacent constituents: one node per basic
/// rule (and crossing rule, when enabled) that licenses the pair, plus the
/// raise-then-compose node if available.
pub fn construct_parents(
    left: &DerivationTree,
    right: &DerivationTree,
    crossing: bool,
) -> Vec<DerivationTree> {
    let (Some(lc), Some(rc)) = (left.category(), right.category()) else {
        return Vec::new();
    };
    let mut parents: Vec<DerivationTree> = rules_to_try(crossing)
        .filter(|rule| rule.apply(&lc, &rc).is_some())
        .map(|rule| DerivationTree::node(left.clone(), right.clone(), rule))
        .collect();
    parents.extend(raised_candidate(left, &lc, right, &rc));
    parents
}

/// A single parent of two adjacent constituents.
///
/// The first basic rule in [`Rule::BINARY`] order (then crossing rules, when
/// enabled) that licenses the pair wins. Raise-then-compose is only tried
/// when no other rule applies.
pub fn construct_parent(
    left: &DerivationTree,
    right: &DerivationTree,
    crossing: bool,
) -> Option<DerivationTree> {
    let lc = left.category()?;
    let rc = right.category()?;
    rules_to_try(crossing)
        .find(|rule| rule.apply(&lc, &rc).is_some())
        .map(|rule| DerivationTree::node(left.clone(), right.clone(), rule))
        .or_else(|| raised_candidate(left, &lc, right, &rc))
}

/// One parent per pair drawn from two adjacent chart cells, chosen by
/// [`construct_parent`]. Pairs with no licensed parent contribute nothing.
pub fn combine_first(
    left: &[DerivationTree],
    right: &[DerivationTree],
    crossing: bool,
) -> Vec<DerivationTree> {
    let mut out = Vec::new();
    for l in left {
        for r in right {
            out.extend(construct_parent(l, r, crossing));
        }
    }
    out
}

/// All parents over every pair drawn from two adjacent chart cells.
pub fn combine(
    left: &[DerivationTree],
    right: &[DerivationTree],
    crossing: bool,
) -> Vec<DerivationTree> {
    let mut out = Vec::new();
    for l in left {
        for r in right {
            out.extend(construct_parents(l, r, crossing));
        }
    }
    out
}
