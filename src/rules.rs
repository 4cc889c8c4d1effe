//! The combinatory rule engine.
//!
//! Pure functions over [`Category`] values implementing application,
//! harmonic and crossing composition, and type-raising. A rule that does not
//! license a pair returns `None`; callers read that as "this combination is
//! not available here", never as an error.

use serde::{Deserialize, Serialize};

use crate::category::{Category, CombinatorFeature, Direction};

// ---------------------------------------------------------------------------
// Rule tags
// ---------------------------------------------------------------------------

/// The combinator that built a derivation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// `>`: `X/Y  Y => X`
    ForwardApply,
    /// `<`: `Y  X\Y => X`
    BackwardApply,
    /// `>B`: `X/Y  Y/Z => X/Z`
    ForwardCompose,
    /// `<B`: `Y\Z  X\Y => X\Z`
    BackwardCompose,
    /// `>Bx`: `X/Y  Y\Z => X\Z`
    ForwardCrossCompose,
    /// `<Bx`: `Y/Z  X\Y => X/Z`
    BackwardCrossCompose,
    /// `>T`
    ForwardTypeRaise,
    /// `<T`
    BackwardTypeRaise,
}

impl Rule {
    /// The basic binary rules, in the order the chart tries them.
    pub const BINARY: [Rule; 4] = [
        Rule::ForwardApply,
        Rule::BackwardApply,
        Rule::ForwardCompose,
        Rule::BackwardCompose,
    ];

    /// Crossing composition, tried after [`Rule::BINARY`] when enabled.
    pub const CROSSING: [Rule; 2] = [Rule::ForwardCrossCompose, Rule::BackwardCrossCompose];

    /// Combine the categories of a left and right constituent.
    ///
    /// Type-raising is unary, so the two raise tags never license a binary
    /// combination and always yield `None` here.
    pub fn apply(self, left: &Category, right: &Category) -> Option<Category> {
        match self {
            Rule::ForwardApply => forward_apply(left, right),
            Rule::BackwardApply => backward_apply(left, right),
            Rule::ForwardCompose => forward_compose(left, right),
            Rule::BackwardCompose => backward_compose(left, right),
            Rule::ForwardCrossCompose => forward_cross_compose(left, right),
            Rule::BackwardCrossCompose => backward_cross_compose(left, right),
            Rule::ForwardTypeRaise | Rule::BackwardTypeRaise => None,
        }
    }

    /// Forward rules are headed by their left constituent.
    pub fn is_forward(self) -> bool {
        matches!(
            self,
            Rule::ForwardApply
                | Rule::ForwardCompose
                | Rule::ForwardCrossCompose
                | Rule::ForwardTypeRaise
        )
    }

    pub fn is_application(self) -> bool {
        matches!(self, Rule::ForwardApply | Rule::BackwardApply)
    }

    pub fn is_type_raise(self) -> bool {
        matches!(self, Rule::ForwardTypeRaise | Rule::BackwardTypeRaise)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Rule::ForwardApply => ">",
            Rule::BackwardApply => "<",
            Rule::ForwardCompose => ">B",
            Rule::BackwardCompose => "<B",
            Rule::ForwardCrossCompose => ">Bx",
            Rule::BackwardCrossCompose => "<Bx",
            Rule::ForwardTypeRaise => ">T",
            Rule::BackwardTypeRaise => "<T",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// `((X\X)/X)` with arbitrary features: the skeleton left behind when the
/// raised form is fully generic.
fn is_raised_skeleton(result: &Category, argument: &Category, inner: Direction) -> bool {
    matches!(argument, Category::Variable)
        && matches!(
            result,
            Category::Functor { result: r, direction, argument: a, .. }
                if *direction == inner
                    && matches!(**r, Category::Variable)
                    && matches!(**a, Category::Variable)
        )
}

/// Forward application `X/Y  Y => X`.
///
/// The argument must be closed and structurally equal to `Y`. The generic
/// skeleton `((X\X)/X)` resolves against any closed argument `A` to
/// `A\★A`.
pub fn forward_apply(functor: &Category, argument: &Category) -> Option<Category> {
    if argument.contains_variable() {
        return None;
    }
    match functor {
        Category::Functor {
            result,
            direction: Direction::Forward,
            argument: expected,
            ..
        } => {
            if **expected == *argument {
                Some((**result).clone())
            } else if is_raised_skeleton(result, expected, Direction::Backward) {
                Some(Category::functor(
                    argument.clone(),
                    Direction::Backward,
                    CombinatorFeature::ApplicationOnly,
                    argument.clone(),
                ))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Backward application `Y  X\Y => X`: the left operand is the argument,
/// the right operand is the functor.
pub fn backward_apply(argument: &Category, functor: &Category) -> Option<Category> {
    if argument.contains_variable() {
        return None;
    }
    match functor {
        Category::Functor {
            result,
            direction: Direction::Backward,
            argument: expected,
            ..
        } => {
            if **expected == *argument {
                Some((**result).clone())
            } else if is_raised_skeleton(result, expected, Direction::Forward) {
                Some(Category::functor(
                    argument.clone(),
                    Direction::Forward,
                    CombinatorFeature::ApplicationOnly,
                    argument.clone(),
                ))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Apply `functor` to `argument`, looking for the argument on the side the
/// functor's slash points to.
pub fn apply(functor: &Category, argument: &Category) -> Option<Category> {
    match functor.direction()? {
        Direction::Forward => forward_apply(functor, argument),
        Direction::Backward => backward_apply(argument, functor),
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Forward harmonic composition `X/Y  Y/Z => X/Z`, feature from the right.
pub fn forward_compose(left: &Category, right: &Category) -> Option<Category> {
    match (left, right) {
        (
            Category::Functor {
                result: x,
                direction: Direction::Forward,
                feature: f1,
                argument: y,
            },
            Category::Functor {
                result: yy,
                direction: Direction::Forward,
                feature: f2,
                argument: z,
            },
        ) if y == yy && f1.compatible_harmonic(*f2) => Some(Category::functor(
            (**x).clone(),
            Direction::Forward,
            *f2,
            (**z).clone(),
        )),
        _ => None,
    }
}

/// Backward harmonic composition `Y\Z  X\Y => X\Z`, feature from the left.
pub fn backward_compose(left: &Category, right: &Category) -> Option<Category> {
    match (left, right) {
        (
            Category::Functor {
                result: yy,
                direction: Direction::Backward,
                feature: f1,
                argument: z,
            },
            Category::Functor {
                result: x,
                direction: Direction::Backward,
                feature: f2,
                argument: y,
            },
        ) if y == yy && f1.compatible_harmonic(*f2) => Some(Category::functor(
            (**x).clone(),
            Direction::Backward,
            *f1,
            (**z).clone(),
        )),
        _ => None,
    }
}

/// Forward crossing composition `X/Y  Y\Z => X\Z`, feature from the right.
pub fn forward_cross_compose(left: &Category, right: &Category) -> Option<Category> {
    match (left, right) {
        (
            Category::Functor {
                result: x,
                direction: Direction::Forward,
                feature: f1,
                argument: y,
            },
            Category::Functor {
                result: yy,
                direction: Direction::Backward,
                feature: f2,
                argument: z,
            },
        ) if y == yy && f1.compatible_crossing(*f2) => Some(Category::functor(
            (**x).clone(),
            Direction::Backward,
            *f2,
            (**z).clone(),
        )),
        _ => None,
    }
}

/// Backward crossing composition `Y/Z  X\Y => X/Z`, feature from the left.
pub fn backward_cross_compose(left: &Category, right: &Category) -> Option<Category> {
    match (left, right) {
        (
            Category::Functor {
                result: yy,
                direction: Direction::Forward,
                feature: f1,
                argument: z,
            },
            Category::Functor {
                result: x,
                direction: Direction::Backward,
                feature: f2,
                argument: y,
            },
        ) if y == yy && f1.compatible_crossing(*f2) => Some(Category::functor(
            (**x).clone(),
            Direction::Forward,
            *f1,
            (**z).clone(),
        )),
        _ => None,
    }
}

/// Compose two adjacent functors with whichever composition rule licenses
/// them, trying forward, backward, forward crossing, backward crossing.
pub fn compose(left: &Category, right: &Category) -> Option<Category> {
    forward_compose(left, right)
        .or_else(|| backward_compose(left, right))
        .or_else(|| forward_cross_compose(left, right))
        .or_else(|| backward_cross_compose(left, right))
}

// ---------------------------------------------------------------------------
// Type-raising
// ---------------------------------------------------------------------------

/// Generic type-raising: `C => X/(X\C)` forward, `C => X\(X/C)` backward.
///
/// The result is open; it only denotes a grammatical class once its
/// variables are resolved against a neighbor.
pub fn raised(category: &Category, direction: Direction) -> Category {
    Category::functor(
        Category::Variable,
        direction,
        CombinatorFeature::Variable,
        Category::functor(
            Category::Variable,
            direction.inverse(),
            CombinatorFeature::Variable,
            category.clone(),
        ),
    )
}

/// Raise an atom so it can compose with the functor to its right.
///
/// Defined only when `category` is an atom `Y` and `neighbor` has the shape
/// `(X|Y)|W`; the result is `X/(X|Y)`, carrying the inner functor's slash
/// and feature.
pub fn raised_against(category: &Category, neighbor: &Category) -> Option<Category> {
    if !category.is_atom() {
        return None;
    }
    let inner = neighbor.result()?;
    match inner {
        Category::Functor {
            result: x,
            direction,
            feature,
            argument: y,
        } if **y == *category => Some(Category::functor(
            (**x).clone(),
            Direction::Forward,
            *feature,
            Category::functor((**x).clone(), *direction, *feature, (**y).clone()),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Primitive;

    use crate::category::CombinatorFeature::*;

    fn np() -> Category {
        Category::noun_phrase()
    }

    fn s() -> Category {
        Category::sentence()
    }

    fn pp() -> Category {
        Category::prepositional_phrase()
    }

    fn fwd(x: Category, feature: CombinatorFeature, y: Category) -> Category {
        Category::functor(x, Direction::Forward, feature, y)
    }

    fn bwd(x: Category, feature: CombinatorFeature, y: Category) -> Category {
        Category::functor(x, Direction::Backward, feature, y)
    }

    #[test]
    fn forward_application_yields_result() {
        for feature in [ApplicationOnly, OrderPreserving, PermutationLimiting, Permissive] {
            let vp = bwd(s(), Permissive, np());
            let tv = fwd(vp.clone(), feature, np());
            assert_eq!(forward_apply(&tv, &np()), Some(vp));
        }
    }

    #[test]
    fn forward_application_needs_exact_argument() {
        let tv = Category::forward(Category::backward(s(), np()), np());
        assert_eq!(forward_apply(&tv, &pp()), None);
        assert_eq!(forward_apply(&tv, &Category::noun()), None);
        // Wrong slash.
        let bv = Category::backward(s(), np());
        assert_eq!(forward_apply(&bv, &np()), None);
        // Atoms never apply.
        assert_eq!(forward_apply(&np(), &np()), None);
    }

    #[test]
    fn backward_application_takes_argument_on_left() {
        let iv = Category::backward(s(), np());
        assert_eq!(backward_apply(&np(), &iv), Some(s()));
        assert_eq!(backward_apply(&iv, &np()), None);
    }

    #[test]
    fn nested_functor_arguments_match_structurally() {
        let adverb = Category::backward(
            Category::backward(s(), np()),
            Category::backward(s(), np()),
        );
        assert_eq!(
            backward_apply(&Category::backward(s(), np()), &adverb),
            Some(Category::backward(s(), np()))
        );
        let wrong_feature = bwd(s(), ApplicationOnly, np());
        assert_eq!(backward_apply(&wrong_feature, &adverb), None);
    }

    #[test]
    fn application_rejects_open_argument() {
        let f = Category::forward(s(), Category::Variable);
        assert_eq!(forward_apply(&f, &Category::Variable), None);
    }

    #[test]
    fn raised_skeleton_resolves_against_closed_argument() {
        let skeleton = fwd(bwd(Category::Variable, Variable, Category::Variable), Variable, Category::Variable);
        assert_eq!(
            forward_apply(&skeleton, &np()),
            Some(bwd(np(), ApplicationOnly, np()))
        );
        let open_arg = Category::backward(Category::Variable, np());
        assert_eq!(forward_apply(&skeleton, &open_arg), None);
    }

    #[test]
    fn apply_follows_functor_direction() {
        let iv = Category::backward(s(), np());
        assert_eq!(apply(&iv, &np()), Some(s()));
        let tv = Category::forward(iv.clone(), np());
        assert_eq!(apply(&tv, &np()), Some(iv));
        assert_eq!(apply(&np(), &np()), None);
    }

    #[test]
    fn forward_harmonic_composition_inherits_right_feature() {
        let x = s();
        let y = np();
        let z = pp();
        let left = fwd(x.clone(), Permissive, y.clone());
        let right = fwd(y, OrderPreserving, z.clone());
        assert_eq!(
            forward_compose(&left, &right),
            Some(fwd(x, OrderPreserving, z))
        );
    }

    #[test]
    fn backward_harmonic_composition_inherits_left_feature() {
        // Y\Z  X\Y => X\Z
        let left = bwd(np(), OrderPreserving, pp());
        let right = bwd(s(), Permissive, np());
        assert_eq!(
            backward_compose(&left, &right),
            Some(bwd(s(), OrderPreserving, pp()))
        );
    }

    #[test]
    fn application_only_blocks_composition() {
        let left = fwd(s(), ApplicationOnly, np());
        let right = fwd(np(), Permissive, pp());
        assert_eq!(forward_compose(&left, &right), None);
        assert_eq!(compose(&left, &right), None);
        let left = fwd(s(), Permissive, np());
        let right = fwd(np(), ApplicationOnly, pp());
        assert_eq!(compose(&left, &right), None);
    }

    #[test]
    fn composition_needs_matching_middle_category() {
        let left = Category::forward(s(), np());
        let right = Category::forward(pp(), np());
        assert_eq!(compose(&left, &right), None);
    }

    #[test]
    fn crossing_composition_needs_permutation_limiting_on_both_sides() {
        let left = fwd(s(), PermutationLimiting, np());
        let right = bwd(np(), PermutationLimiting, pp());
        assert_eq!(
            forward_cross_compose(&left, &right),
            Some(bwd(s(), PermutationLimiting, pp()))
        );
        assert_eq!(compose(&left, &right), Some(bwd(s(), PermutationLimiting, pp())));

        let permissive_left = fwd(s(), Permissive, np());
        assert_eq!(compose(&permissive_left, &right), None);
        // Harmonic rules don't fire for permutation-limiting slashes.
        let right_fwd = fwd(np(), PermutationLimiting, pp());
        assert_eq!(forward_compose(&left, &right_fwd), None);
    }

    #[test]
    fn backward_crossing_flips_to_forward() {
        // Y/Z  X\Y => X/Z
        let left = fwd(np(), PermutationLimiting, pp());
        let right = bwd(s(), PermutationLimiting, np());
        assert_eq!(
            backward_cross_compose(&left, &right),
            Some(fwd(s(), PermutationLimiting, pp()))
        );
    }

    #[test]
    fn generic_raising_is_open() {
        let r = raised(&np(), Direction::Forward);
        assert!(r.contains_variable());
        assert_eq!(r.to_string(), "(X/𝑖(X\\𝑖NP))");
        let b = raised(&np(), Direction::Backward);
        assert_eq!(b.direction(), Some(Direction::Backward));
        assert_eq!(b.argument().and_then(|a| a.direction()), Some(Direction::Forward));
    }

    #[test]
    fn raising_against_neighbor_round_trips() {
        for feat in [Permissive, OrderPreserving, ApplicationOnly] {
            for dir in [Direction::Forward, Direction::Backward] {
                let inner = Category::functor(s(), dir, feat, np());
                let neighbor = Category::forward(inner.clone(), pp());
                assert_eq!(
                    raised_against(&np(), &neighbor),
                    Some(Category::functor(s(), Direction::Forward, feat, inner))
                );
            }
        }
    }

    #[test]
    fn raising_against_requires_atom_and_matching_slot() {
        let neighbor = Category::forward(Category::backward(s(), np()), np());
        assert_eq!(raised_against(&pp(), &neighbor), None);
        assert_eq!(raised_against(&Category::backward(s(), np()), &neighbor), None);
        assert_eq!(raised_against(&np(), &Category::backward(s(), np())), None);
        assert_eq!(raised_against(&np(), &np()), None);
    }

    #[test]
    fn raised_subject_composes_with_transitive_verb() {
        let tv = Category::forward(Category::backward(s(), np()), np());
        let raised = raised_against(&np(), &tv).expect("raisable");
        assert_eq!(
            forward_compose(&raised, &tv),
            Some(Category::forward(s(), np()))
        );
    }

    #[test]
    fn rule_dispatch_and_symbols() {
        let iv = Category::backward(s(), np());
        assert_eq!(Rule::BackwardApply.apply(&np(), &iv), Some(s()));
        assert_eq!(Rule::ForwardApply.apply(&np(), &iv), None);
        assert_eq!(Rule::ForwardTypeRaise.apply(&np(), &iv), None);
        let symbols: Vec<String> = Rule::BINARY.iter().map(|r| r.to_string()).collect();
        assert_eq!(symbols, [">", "<", ">B", "<B"]);
        assert!(Rule::ForwardCrossCompose.is_forward());
        assert!(!Rule::BackwardCompose.is_forward());
        assert!(Rule::BackwardApply.is_application());
    }

    #[test]
    fn sentence_feature_blocks_application() {
        let dcl = Category::Atom(Primitive::Sentence(Some(
            crate::category::SentenceFeature::DeclarativeSentence,
        )));
        let wants_bare = Category::backward(s(), s());
        assert_eq!(backward_apply(&dcl, &wants_bare), None);
        assert_eq!(backward_apply(&s(), &wants_bare), Some(s()));
    }
}
