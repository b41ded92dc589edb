use fixedbitset::FixedBitSet;
use thiserror::Error;

use crate::model::types::{RouteId, Time};
use crate::model::Timetable;

/// Query preconditions the engine refuses to run with.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RaptorError {
    #[error("invalid stop id")]
    InvalidStop,
    #[error("invalid route id")]
    InvalidRoute,
    #[error("invalid trip index")]
    InvalidTrip,
}

/// Engine-owned scratch arrays, sized once and reset in place between
/// queries.
///
/// `round_start_arrival` is the snapshot taken in stage 1; boarding decisions
/// in stage 2 read it instead of `earliest_arrival` so that improvements made
/// during the current round do not feed back into the same round's trip
/// search.
#[derive(Debug)]
pub(crate) struct QueryState {
    pub(crate) earliest_arrival: Vec<Time>,
    pub(crate) round_start_arrival: Vec<Time>,
    /// Stops improved in the previous round.
    pub(crate) marked: FixedBitSet,
    /// Best arrival pushed to each hub this round (hub mode only).
    pub(crate) hub_labels: Vec<Time>,
    /// Deferred marking set of stage 3; also reused for improved hubs.
    pub(crate) improved: FixedBitSet,
    /// Whether stage 2 improved any stop this round.
    pub(crate) stops_improved: bool,
}

impl QueryState {
    pub(crate) fn new(num_stops: usize, num_nodes: usize, use_hubs: bool) -> Self {
        let improved_capacity = if use_hubs { num_nodes } else { num_stops };
        QueryState {
            earliest_arrival: vec![Time::MAX; num_stops],
            round_start_arrival: vec![Time::MAX; num_stops],
            marked: FixedBitSet::with_capacity(num_stops),
            hub_labels: if use_hubs {
                vec![Time::MAX; num_nodes]
            } else {
                Vec::new()
            },
            improved: FixedBitSet::with_capacity(improved_capacity),
            stops_improved: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.earliest_arrival.fill(Time::MAX);
        self.round_start_arrival.fill(Time::MAX);
        self.marked.clear();
        self.hub_labels.fill(Time::MAX);
        self.improved.clear();
        self.stops_improved = false;
    }
}

/// Earliest trip of `route_id` departing from pattern position `stop_idx` at
/// or after `earliest_board`.
///
/// Binary search over the trip-major stop-time table; the departure column at
/// a fixed stop index is sorted because trips do not overtake.
pub(crate) fn find_earliest_trip(
    data: &Timetable,
    route_id: RouteId,
    stop_idx: usize,
    earliest_board: Time,
) -> Option<usize> {
    let route = &data.routes[route_id];
    let trips_offset = route.trips_start;
    let num_stops = route.num_stops;
    let mut low = 0;
    let mut high = route.num_trips;
    let mut result = None;
    while low < high {
        let mid = (low + high) / 2;
        let departure = data.stop_times[trips_offset + mid * num_stops + stop_idx].departure;
        if departure >= earliest_board {
            result = Some(mid);
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    result
}
