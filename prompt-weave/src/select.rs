//! Weighted provider selection.

use crate::{Error, Result};
use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};
use std::fmt::Debug;

/// Pick an id with probability proportional to its weight.
///
/// Zero-weighted ids are never picked; if nothing has a weight the result is
/// [`Error::NoProviderAvailable`].
pub fn choose<T: Clone, R: Rng + ?Sized>(weights: &[(T, u32)], rng: &mut R) -> Result<T> {
    let index = WeightedIndex::new(weights.iter().map(|(_, weight)| u64::from(*weight)))
        .map_err(|_| Error::NoProviderAvailable)?;
    Ok(weights[index.sample(rng)].0.clone())
}

/// Pick an id whose resource is available.
///
/// The first pick is a plain [`choose`]. When `is_available` rejects it and
/// `fallback` is set, the rejected id is dropped and the pick repeats over
/// what remains. Zero-weighted ids are never tried. Every round removes one
/// candidate, so this ends with [`Error::AllProvidersExhausted`] at the latest
/// when no weighted id is left.
pub fn choose_with_fallback<T, R, F>(
    weights: &[(T, u32)],
    fallback: bool,
    rng: &mut R,
    mut is_available: F,
) -> Result<T>
where
    T: Clone + PartialEq + Debug,
    R: Rng + ?Sized,
    F: FnMut(&T) -> bool,
{
    let mut candidate = choose(weights, rng)?;
    let mut remaining = weights.to_vec();
    loop {
        if is_available(&candidate) {
            log::debug!("selected {:?}", candidate);
            return Ok(candidate);
        }
        log::warn!("{:?} is not available", candidate);
        if !fallback {
            return Err(Error::AllProvidersExhausted);
        }
        remaining.retain(|(id, _)| *id != candidate);
        candidate = choose(&remaining, rng).map_err(|_| Error::AllProvidersExhausted)?;
        log::info!("falling back to {:?}", candidate);
    }
}
