//! Weighted line lists.
//!
//! A line of the form `"<n>:<text>"` stands for `n` copies of `text`; any
//! other line stands for itself once. `"0:<text>"` drops the line.
//!
//! Weights go up to [`MAX_WEIGHT`]; a larger prefix is not a weight and stays
//! part of the text.

use crate::{Error, Result};
use rand::{distributions::WeightedIndex, prelude::Distribution, seq::SliceRandom, Rng};
use std::iter;

pub const MAX_WEIGHT: u32 = u32::MAX;

/// Split the weight prefix off a line.
///
/// The prefix only counts when everything before the first `:` is an ASCII
/// integer, so `"10:30 pm"` weighs 10 while `"note: x"` weighs 1 and keeps
/// its colon.
pub fn parse_weight(line: &str) -> (u32, &str) {
    match line.split_once(':') {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) => {
            match prefix.parse() {
                Ok(weight) => (weight, rest),
                Err(_) => (1, line),
            }
        }
        _ => (1, line),
    }
}

/// Expand weighted lines into a flat candidate list.
///
/// Every copy is allocated; [`random_line`] picks without expanding.
pub fn expand<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .flat_map(|line| {
            let (weight, text) = parse_weight(line.as_ref());
            iter::repeat(text.to_owned()).take(weight as usize)
        })
        .collect()
}

/// Pick one of the already expanded candidates.
pub fn pick_random<R: Rng + ?Sized>(expanded: &[String], rng: &mut R) -> Result<String> {
    expanded.choose(rng).cloned().ok_or(Error::EmptyInput)
}

pub fn first(expanded: &[String]) -> Result<String> {
    expanded.first().cloned().ok_or(Error::EmptyInput)
}

/// Pick one of `lines` with probability proportional to its weight.
pub fn random_line<S: AsRef<str>, R: Rng + ?Sized>(lines: &[S], rng: &mut R) -> Result<String> {
    let parsed: Vec<_> = lines.iter().map(|line| parse_weight(line.as_ref())).collect();
    // Sums of u32 weights cannot overflow u64 for any list that fits in memory.
    let index = WeightedIndex::new(parsed.iter().map(|(weight, _)| u64::from(*weight)))
        .map_err(|_| Error::EmptyInput)?;
    Ok(parsed[index.sample(rng)].1.to_owned())
}
