use thiserror::Error;

use crate::model::types::{RouteId, StopId};

/// Errors detected while assembling a [`crate::Timetable`].
///
/// The builder rejects input that would break the invariants the router
/// relies on, most importantly the FIFO ordering of trips within a route.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("unknown stop id {0}")]
    UnknownStop(StopId),
    #[error("route {0} has an empty stop pattern")]
    EmptyRoute(RouteId),
    #[error("route {route} visits stop {stop} more than once")]
    RepeatedStop { route: RouteId, stop: StopId },
    #[error("route {route}: trip {trip} has {got} stop times for {expected} stops")]
    MalformedTrip {
        route: RouteId,
        trip: usize,
        got: usize,
        expected: usize,
    },
    #[error("route {route}: arrival after departure in trip {trip} at stop index {stop_idx}")]
    ArrivalAfterDeparture {
        route: RouteId,
        trip: usize,
        stop_idx: usize,
    },
    #[error("route {route}: trips overtake each other at stop index {stop_idx}")]
    TripOvertaking { route: RouteId, stop_idx: usize },
}
