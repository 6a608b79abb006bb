//! Extension methods for `Result`.

use std::panic::Location;

use crate::chain::find_enriched;
use crate::{BoxError, EnrichedError, ErrorConfig, Frame, wrap_at};

/// Enrich the error side of a `Result` at the call site.
pub trait ResultExt<T> {
    /// Pass the error through [`wrap`](crate::wrap), recording the caller of
    /// `enrich`.
    fn enrich(self) -> Result<T, BoxError>;

    /// Wrap the error with `config`, or prepend the caller's frame if the
    /// error is already enriched.
    fn enrich_with(self, config: ErrorConfig) -> Result<T, BoxError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    #[track_caller]
    fn enrich(self) -> Result<T, BoxError> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(wrap_at(err, Frame::caller())),
        }
    }

    #[track_caller]
    fn enrich_with(self, config: ErrorConfig) -> Result<T, BoxError> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => {
                let location = Location::caller();
                let err = err.into();
                if let Some(enriched) = find_enriched(&*err) {
                    enriched.push_frame(Frame::from_location(location));
                    return Err(err);
                }
                Err(Box::new(EnrichedError::new_at_location(err, config, location)))
            }
        }
    }
}
