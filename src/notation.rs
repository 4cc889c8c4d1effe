//! Textual category notation: `(S\NP)/NP`, `S[dcl]`, `NP/★N`.
//!
//! ```text
//! expr    := term (slash term)*          left-associative
//! term    := atom | '(' expr ')'
//! slash   := ('/' | '\') feature?
//! feature := '★' | '*' | '◇' | '<>' | '×' | '+' | '·' | '.' | '𝑖'
//! atom    := NP | VP | PP | N | V | P | X | S ('[' tag ']')?
//! ```
//!
//! A slash without a feature mark is permissive. Whitespace is ignored.
//! The parser is hand-rolled so every failure can point at the exact span
//! of the input that caused it.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::category::{Category, CombinatorFeature, Direction, Primitive, SentenceFeature};

/// Errors produced while reading category notation.
#[derive(Debug, Error, Diagnostic)]
pub enum NotationError {
    #[error("empty category expression")]
    #[diagnostic(
        code(ccg::notation::empty),
        help("Write a category such as `NP`, `S[dcl]` or `(S\\NP)/NP`.")
    )]
    Empty,

    #[error("unexpected character '{found}'")]
    #[diagnostic(
        code(ccg::notation::unexpected_char),
        help(
            "Atoms are N, V, P, NP, PP, VP, S, S[feature] and X. \
             Functors are written Result/Argument or Result\\Argument, \
             with parentheses for grouping."
        )
    )]
    UnexpectedChar {
        found: char,
        #[source_code]
        input: String,
        #[label("not valid here")]
        span: SourceSpan,
    },

    #[error("unknown sentence feature \"{tag}\"")]
    #[diagnostic(
        code(ccg::notation::unknown_feature),
        help(
            "Known features: dcl, wq, q, qem, em, bem, sbj, frg, for, intj, inv, \
             adj, b, to, pss, pt, ng."
        )
    )]
    UnknownFeature {
        tag: String,
        #[source_code]
        input: String,
        #[label("unknown feature")]
        span: SourceSpan,
    },

    #[error("unclosed '{open}'")]
    #[diagnostic(
        code(ccg::notation::unclosed),
        help("Add the matching closing bracket.")
    )]
    Unclosed {
        open: char,
        #[source_code]
        input: String,
        #[label("opened here")]
        span: SourceSpan,
    },

    #[error("unexpected end of input, expected {expected}")]
    #[diagnostic(
        code(ccg::notation::unexpected_end),
        help("The expression stops in the middle; complete the functor.")
    )]
    UnexpectedEnd {
        expected: String,
        #[source_code]
        input: String,
        #[label("input ends here")]
        span: SourceSpan,
    },

    #[error("unexpected trailing input")]
    #[diagnostic(
        code(ccg::notation::trailing),
        help("Check for an unbalanced ')' or a missing slash between two categories.")
    )]
    TrailingInput {
        #[source_code]
        input: String,
        #[label("nothing should follow the category")]
        span: SourceSpan,
    },
}

/// Result type for notation parsing.
pub type NotationResult<T> = std::result::Result<T, NotationError>;

/// Parse a category written in standard notation.
pub fn parse_category(input: &str) -> NotationResult<Category> {
    if input.trim().is_empty() {
        return Err(NotationError::Empty);
    }
    let mut parser = Parser { input, pos: 0 };
    let category = parser.expr()?;
    parser.skip_ws();
    if parser.pos < input.len() {
        return Err(NotationError::TrailingInput {
            input: input.to_string(),
            span: (parser.pos, input.len() - parser.pos).into(),
        });
    }
    Ok(category)
}

impl std::str::FromStr for Category {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_category(s)
    }
}

const ATOMS: [(&str, Option<Primitive>); 8] = [
    ("NP", Some(Primitive::NounPhrase)),
    ("VP", Some(Primitive::VerbPhrase)),
    ("PP", Some(Primitive::PrepositionalPhrase)),
    ("N", Some(Primitive::Noun)),
    ("V", Some(Primitive::Verb)),
    ("P", Some(Primitive::Preposition)),
    ("S", Some(Primitive::SENTENCE)),
    ("X", None),
];

const FEATURE_MARKS: [(&str, CombinatorFeature); 9] = [
    ("★", CombinatorFeature::ApplicationOnly),
    ("*", CombinatorFeature::ApplicationOnly),
    ("◇", CombinatorFeature::OrderPreserving),
    ("<>", CombinatorFeature::OrderPreserving),
    ("×", CombinatorFeature::PermutationLimiting),
    ("+", CombinatorFeature::PermutationLimiting),
    ("·", CombinatorFeature::Permissive),
    (".", CombinatorFeature::Permissive),
    ("𝑖", CombinatorFeature::Variable),
];

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn end_error(&self, expected: &str) -> NotationError {
        NotationError::UnexpectedEnd {
            expected: expected.to_string(),
            input: self.input.to_string(),
            span: (self.input.len(), 0).into(),
        }
    }

    fn char_error(&self, found: char) -> NotationError {
        NotationError::UnexpectedChar {
            found,
            input: self.input.to_string(),
            span: (self.pos, found.len_utf8()).into(),
        }
    }

    fn expr(&mut self) -> NotationResult<Category> {
        let mut category = self.term()?;
        loop {
            self.skip_ws();
            let direction = match self.peek() {
                Some('/') => Direction::Forward,
                Some('\\') => Direction::Backward,
                _ => break,
            };
            self.pos += 1;
            let feature = self.feature();
            let argument = self.term()?;
            category = Category::functor(category, direction, feature, argument);
        }
        Ok(category)
    }

    fn feature(&mut self) -> CombinatorFeature {
        for (mark, feature) in FEATURE_MARKS {
            if self.eat(mark) {
                return feature;
            }
        }
        CombinatorFeature::Permissive
    }

    fn term(&mut self) -> NotationResult<Category> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.end_error("a category")),
            Some('(') => {
                let open = self.pos;
                self.pos += 1;
                let inner = self.expr()?;
                self.skip_ws();
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    None => Err(NotationError::Unclosed {
                        open: '(',
                        input: self.input.to_string(),
                        span: (open, 1).into(),
                    }),
                    Some(c) => Err(self.char_error(c)),
                }
            }
            Some(c) => self.atom().ok_or_else(|| self.char_error(c))?,
        }
    }

    /// `None` when no atom starts here; otherwise the parsed atom or the
    /// error found inside its feature brackets.
    fn atom(&mut self) -> Option<NotationResult<Category>> {
        let (_, primitive) = ATOMS.into_iter().find(|(name, _)| self.eat(name))?;
        let Some(primitive) = primitive else {
            return Some(Ok(Category::Variable));
        };
        if primitive == Primitive::SENTENCE {
            let after_atom = self.pos;
            self.skip_ws();
            if self.peek() == Some('[') {
                return Some(self.sentence_feature().map(Category::sentence_with));
            }
            self.pos = after_atom;
        }
        Some(Ok(Category::Atom(primitive)))
    }

    fn sentence_feature(&mut self) -> NotationResult<SentenceFeature> {
        let open = self.pos;
        self.pos += 1;
        let Some(len) = self.rest().find(']') else {
            return Err(NotationError::Unclosed {
                open: '[',
                input: self.input.to_string(),
                span: (open, 1).into(),
            });
        };
        let tag = self.rest()[..len].trim().to_string();
        let tag_start = self.pos;
        self.pos += len + 1;
        SentenceFeature::from_tag(&tag).ok_or_else(|| NotationError::UnknownFeature {
            tag,
            input: self.input.to_string(),
            span: (tag_start, len).into(),
        })
    }
}
