//! Identifier aliases and the records of the flat timetable arena.

/// Seconds since midnight, or any other monotone scalar.
///
/// `Time::MAX` is the "unreached" sentinel; all arithmetic on times goes
/// through `saturating_add` so that the sentinel absorbs additions.
pub type Time = u32;

/// Dense stop identifier.
pub type StopId = usize;

/// Dense node identifier spanning stops and, in hub mode, hubs.
///
/// Stops occupy the low end of the id space; hubs may reuse stop ids (a stop
/// can serve as a hub) or extend past them.
pub type NodeId = usize;

/// Dense route identifier.
pub type RouteId = usize;

/// Arrival and departure of one trip at one stop of its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTime {
    pub arrival: Time,
    pub departure: Time,
}

impl StopTime {
    #[must_use]
    pub fn new(arrival: Time, departure: Time) -> Self {
        StopTime { arrival, departure }
    }
}

/// Walking edge between two stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transfer {
    pub(crate) target_stop: StopId,
    pub(crate) duration: Time,
}

/// Walking link between a stop and a hub, in either direction.
///
/// In the forward tables `node` is the hub; in the inverse in-hub table it is
/// the stop reached from the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HubLink {
    pub(crate) duration: Time,
    pub(crate) node: NodeId,
}

/// One stop pattern served by a set of non-overtaking trips.
///
/// `trips_start` indexes the trip-major stop-time table: the row of trip `t`
/// begins at `trips_start + t * num_stops`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Route {
    pub(crate) stops_start: usize,
    pub(crate) num_stops: usize,
    pub(crate) trips_start: usize,
    pub(crate) num_trips: usize,
}

/// Per-stop adjacency ranges into the flat arena vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Stop {
    pub(crate) routes_start: usize,
    pub(crate) routes_len: usize,
    pub(crate) transfers_start: usize,
    pub(crate) transfers_len: usize,
    pub(crate) out_hubs_start: usize,
    pub(crate) out_hubs_len: usize,
    pub(crate) in_hubs_start: usize,
    pub(crate) in_hubs_len: usize,
}
