//! Bracket templates.
//!
//! `"a (red|grey) fox"` resolves to `"a red fox"` or `"a grey fox"`. Each
//! alternative may carry a weight prefix (`"(5:red|grey)"`, see
//! [`crate::weighted`]) and may nest groups of any configured bracket kind
//! (`"(red|[dark|light] grey)"`). Only the `|` at a group's own level splits
//! it.
//!
//! Templates are parsed into a small tree first and resolved afterwards.
//! Brackets that never close, and closing brackets without an opener, are
//! kept as plain text.

use crate::weighted::parse_weight;
use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};
use std::fmt;

const SEPARATOR: char = '|';

/// An opening and closing character delimiting a group of alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BracketPair {
    pub open: char,
    pub close: char,
}

pub const DEFAULT_BRACKETS: [BracketPair; 3] = [
    BracketPair::new('(', ')'),
    BracketPair::new('[', ']'),
    BracketPair::new('{', '}'),
];

impl BracketPair {
    pub const fn new(open: char, close: char) -> Self {
        Self { open, close }
    }

    /// Parse a pair written as a two character string, e.g. `"()"`.
    ///
    /// The separator cannot be used as a bracket.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(open), Some(close), None) if open != SEPARATOR && close != SEPARATOR => {
                Some(Self::new(open, close))
            }
            _ => None,
        }
    }
}

impl fmt::Display for BracketPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.open, self.close)
    }
}

/// Parsed form of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Literal(String),
    /// One entry per alternative, in source order.
    Group(Vec<Vec<Node>>),
}

struct Parser<'a> {
    chars: Vec<char>,
    pairs: &'a [BracketPair],
    /// Openers already known not to close, so they are not rescanned.
    unclosed: Vec<bool>,
}

impl<'a> Parser<'a> {
    fn new(text: &str, pairs: &'a [BracketPair]) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let unclosed = vec![false; chars.len()];
        Self {
            chars,
            pairs,
            unclosed,
        }
    }

    fn closer(&self, c: char) -> Option<char> {
        self.pairs.iter().find(|p| p.open == c).map(|p| p.close)
    }

    fn sequence(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut literal = String::new();
        let mut pos = 0;
        while let Some(&c) = self.chars.get(pos) {
            if let Some((group, next)) = self.group_at(pos) {
                flush(&mut literal, &mut nodes);
                nodes.push(group);
                pos = next;
            } else {
                literal.push(c);
                pos += 1;
            }
        }
        flush(&mut literal, &mut nodes);
        nodes
    }

    /// Parse the group opened at `pos`, returning it and the position after
    /// its closing bracket.
    fn group_at(&mut self, pos: usize) -> Option<(Node, usize)> {
        let close = self.closer(self.chars[pos])?;
        if self.unclosed[pos] {
            return None;
        }
        let mut alternatives = Vec::new();
        let mut current = Vec::new();
        let mut literal = String::new();
        let mut cursor = pos + 1;
        while let Some(&c) = self.chars.get(cursor) {
            if c == close {
                flush(&mut literal, &mut current);
                alternatives.push(current);
                return Some((Node::Group(alternatives), cursor + 1));
            } else if c == SEPARATOR {
                flush(&mut literal, &mut current);
                alternatives.push(std::mem::take(&mut current));
                cursor += 1;
            } else if let Some((group, next)) = self.group_at(cursor) {
                flush(&mut literal, &mut current);
                current.push(group);
                cursor = next;
            } else {
                literal.push(c);
                cursor += 1;
            }
        }
        self.unclosed[pos] = true;
        None
    }
}

fn flush(literal: &mut String, nodes: &mut Vec<Node>) {
    if !literal.is_empty() {
        nodes.push(Node::Literal(std::mem::take(literal)));
    }
}

/// Parse `text` into literals and groups for the given bracket kinds.
pub fn parse(text: &str, pairs: &[BracketPair]) -> Vec<Node> {
    Parser::new(text, pairs).sequence()
}

/// Resolve every group in `nodes` to one of its alternatives.
pub fn resolve<R: Rng + ?Sized>(nodes: &[Node], rng: &mut R) -> String {
    let mut out = String::new();
    resolve_into(nodes, rng, &mut out);
    out
}

fn resolve_into<R: Rng + ?Sized>(nodes: &[Node], rng: &mut R, out: &mut String) {
    for node in nodes {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Group(alternatives) => resolve_group(alternatives, rng, out),
        }
    }
}

fn resolve_group<R: Rng + ?Sized>(alternatives: &[Vec<Node>], rng: &mut R, out: &mut String) {
    let weights = alternatives.iter().map(|alternative| match alternative.first() {
        Some(Node::Literal(text)) => u64::from(parse_weight(text).0),
        _ => 1,
    });
    // All weights zero (or no alternatives) leaves nothing behind.
    let Ok(index) = WeightedIndex::new(weights) else {
        return;
    };
    let chosen = &alternatives[index.sample(rng)];
    match chosen.split_first() {
        Some((Node::Literal(text), rest)) => {
            out.push_str(parse_weight(text).1);
            resolve_into(rest, rng, out);
        }
        _ => resolve_into(chosen, rng, out),
    }
}

/// Resolve all bracket groups of `text` with the given generator.
pub fn expand_with<R: Rng + ?Sized>(text: &str, pairs: &[BracketPair], rng: &mut R) -> String {
    if !text.chars().any(|c| pairs.iter().any(|p| p.open == c)) {
        return text.to_owned();
    }
    let nodes = parse(text, pairs);
    log::trace!("parsed {:?} into {:?}", text, nodes);
    resolve(&nodes, rng)
}

/// Resolve all bracket groups of `text`.
pub fn expand(text: &str, pairs: &[BracketPair]) -> String {
    expand_with(text, pairs, &mut rand::thread_rng())
}

/// Resolve `text` using bracket kinds written as two character strings.
///
/// Entries that are not exactly two characters are ignored.
pub fn parse_multiple_brackets<S: AsRef<str>>(text: &str, brackets: &[S]) -> String {
    let pairs: Vec<BracketPair> = brackets
        .iter()
        .filter_map(|b| BracketPair::parse(b.as_ref()))
        .collect();
    expand(text, &pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const PAREN: [BracketPair; 1] = [BracketPair::new('(', ')')];

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn single_group() {
        let mut rng = rng();
        for _ in 0..50 {
            let result = expand_with("part1 (option1|option2) part3", &PAREN, &mut rng);
            assert!(
                result == "part1 option1 part3" || result == "part1 option2 part3",
                "unexpected {result}"
            );
        }
    }

    #[test]
    fn nested_weighted_groups_resolve_deterministically() {
        let text = "Test(5:pass|0:fail|[pass|{pass|20:pass|0:fail}|0:fail])(1:pass|0:fail)";
        for _ in 0..50 {
            assert_eq!(
                parse_multiple_brackets(text, &["()", "[]", "{}"]),
                "Testpasspass"
            );
        }
    }

    #[test]
    fn bracket_order_does_not_matter_for_well_formed_text() {
        let text = "Test(5:pass|0:fail|[pass|{pass|20:pass|0:fail}|0:fail])(1:pass|0:fail)";
        assert_eq!(parse_multiple_brackets(text, &["{}", "()", "[]"]), "Testpasspass");
    }

    #[test]
    fn text_without_brackets_is_unchanged() {
        let mut rng = rng();
        for text in ["", "plain text", "a|b", "colon: 5:x", "ünïcödé ✓"] {
            assert_eq!(expand_with(text, &DEFAULT_BRACKETS, &mut rng), text);
        }
    }

    #[test]
    fn unconfigured_brackets_are_text() {
        let mut rng = rng();
        assert_eq!(expand_with("keep [a|b]", &PAREN, &mut rng), "keep [a|b]");
    }

    #[test]
    fn unbalanced_brackets_are_text() {
        let mut rng = rng();
        assert_eq!(expand_with("open (a|b", &PAREN, &mut rng), "open (a|b");
        assert_eq!(expand_with("close a|b)", &PAREN, &mut rng), "close a|b)");
        assert_eq!(expand_with("((((", &PAREN, &mut rng), "((((");
        assert_eq!(expand_with("x (y) (z", &PAREN, &mut rng), "x y (z");
    }

    #[test]
    fn foreign_closer_inside_group_is_text() {
        let mut rng = rng();
        assert_eq!(
            expand_with("(a[b)", &DEFAULT_BRACKETS, &mut rng),
            "a[b"
        );
    }

    #[test]
    fn all_zero_alternatives_resolve_to_nothing() {
        let mut rng = rng();
        assert_eq!(expand_with("a(0:x|0:y)b", &PAREN, &mut rng), "ab");
        assert_eq!(expand_with("a()b", &PAREN, &mut rng), "ab");
    }

    #[test]
    fn weight_prefix_before_nested_group() {
        let mut rng = rng();
        for _ in 0..20 {
            assert_eq!(
                expand_with("(3:[x|x]|0:y)", &DEFAULT_BRACKETS, &mut rng),
                "x"
            );
        }
    }

    #[test]
    fn same_kind_nesting() {
        let mut rng = rng();
        for _ in 0..20 {
            assert_eq!(expand_with("((a|a)|0:b)", &PAREN, &mut rng), "a");
        }
    }

    #[test]
    fn oversized_weights_do_not_overflow() {
        let mut rng = rng();
        for _ in 0..50 {
            let result = expand_with("(18446744073709551615:a|1:b)", &PAREN, &mut rng);
            assert!(
                result == "18446744073709551615:a" || result == "b",
                "unexpected {result}"
            );
            let result = expand_with("(4294967295:a|4294967295:b|1:c)", &PAREN, &mut rng);
            assert!(["a", "b", "c"].contains(&result.as_str()), "unexpected {result}");
        }
    }

    #[test]
    fn weights_skew_choice() {
        let mut rng = rng();
        let heavy = (0..1000)
            .filter(|_| expand_with("(99:a|b)", &PAREN, &mut rng) == "a")
            .count();
        assert!(heavy > 900, "only {heavy} of 1000");
    }

    #[test]
    fn parse_tree() {
        assert_eq!(
            parse("a(b|[c])", &DEFAULT_BRACKETS),
            vec![
                Node::Literal("a".into()),
                Node::Group(vec![
                    vec![Node::Literal("b".into())],
                    vec![Node::Group(vec![vec![Node::Literal("c".into())]])],
                ]),
            ]
        );
    }

    #[test]
    fn bracket_pair_parse() {
        assert_eq!(BracketPair::parse("<>"), Some(BracketPair::new('<', '>')));
        assert_eq!(BracketPair::parse("("), None);
        assert_eq!(BracketPair::parse("(])"), None);
        assert_eq!(BracketPair::parse("|)"), None);
        assert_eq!(BracketPair::new('{', '}').to_string(), "{}");
    }
}
