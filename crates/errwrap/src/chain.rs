//! Walking an error's `source()` chain.

use std::error::Error as StdError;
use std::iter;

use crate::EnrichedError;

/// Iterate over `err` followed by every error in its `source()` chain.
pub fn chain<'a>(err: &'a (dyn StdError + 'static)) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    iter::successors(Some(err), |e: &&'a (dyn StdError + 'static)| (*e).source())
}

/// Find the first error of type `E` in the chain starting at `err`.
pub fn find<'a, E>(err: &'a (dyn StdError + 'static)) -> Option<&'a E>
where
    E: StdError + 'static,
{
    chain(err).find_map(|e| e.downcast_ref::<E>())
}

/// Find the first [`EnrichedError`] in the chain starting at `err`.
pub fn find_enriched<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a EnrichedError> {
    find::<EnrichedError>(err)
}
