//! Batch earliest-arrival queries over many sources in parallel.

use rayon::prelude::*;

use super::raptor::{Raptor, RaptorError};
use crate::model::types::{StopId, Time};
use crate::model::Timetable;

/// Best overall arrival time for every (source, target) pair.
///
/// Engines serve one query at a time, so each parallel task builds its own
/// engine against the shared read-only timetable and reuses it across that
/// source's targets. Entries are `Time::MAX` when the target is unreachable.
pub fn arrival_matrix(
    timetable: &Timetable,
    sources: &[StopId],
    targets: &[StopId],
    departure: Time,
    use_hubs: bool,
) -> Result<Vec<Vec<Time>>, RaptorError> {
    sources
        .par_iter()
        .map(|&source| {
            let mut engine = Raptor::new(timetable, use_hubs, false);
            targets
                .iter()
                .map(|&target| {
                    let labels = engine.query(source, target, departure)?;
                    // The last label is the best arrival over all rounds.
                    Ok(labels.last().copied().unwrap_or(Time::MAX))
                })
                .collect()
        })
        .collect()
}
