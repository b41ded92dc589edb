//! Immutable transit network in the flat layout scanned by the router.

use hashbrown::HashMap;

use super::types::{HubLink, NodeId, Route, RouteId, Stop, StopId, StopTime, Time, Transfer};
use crate::routing::raptor::RaptorError;

/// Read-only timetable shared by any number of engines.
///
/// All adjacency is stored in flat vectors indexed through per-stop and
/// per-route `(start, len)` ranges, so a query touches contiguous memory.
/// Construction goes through [`crate::TimetableBuilder`], which validates the
/// ordering invariants (FIFO trips, adjacency sorted by walking time) the
/// accessors below rely on.
#[derive(Debug, Clone, PartialEq)]
pub struct Timetable {
    pub(crate) routes: Vec<Route>,
    /// Stop patterns of all routes, concatenated.
    pub(crate) route_stops: Vec<StopId>,
    /// Trip-major stop times: the row of trip `t` on route `r` starts at
    /// `r.trips_start + t * r.num_stops`.
    pub(crate) stop_times: Vec<StopTime>,
    pub(crate) stops: Vec<Stop>,
    /// Routes through each stop, concatenated.
    pub(crate) stop_routes: Vec<RouteId>,
    /// Per-stop walking transfers, sorted ascending by duration.
    pub(crate) transfers: Vec<Transfer>,
    /// Per-stop forward hub links, sorted ascending by duration.
    pub(crate) out_hubs: Vec<HubLink>,
    /// Per-stop backward hub links, sorted ascending by duration.
    pub(crate) in_hubs: Vec<HubLink>,
    /// For each hub, the stops listing it as in-hub, sorted ascending by
    /// duration.
    pub(crate) inverse_in_hubs: Vec<HubLink>,
    pub(crate) inverse_in_hub_ranges: Vec<(usize, usize)>,
    /// `max_node_id + 1`; sizes the per-hub scratch of hub-mode engines.
    pub(crate) num_nodes: usize,
}

impl Timetable {
    #[must_use]
    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    /// Number of node ids, counting stops and hubs.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub(crate) fn validate_stop(&self, stop: StopId) -> Result<(), RaptorError> {
        if stop >= self.stops.len() {
            Err(RaptorError::InvalidStop)
        } else {
            Ok(())
        }
    }

    /// Stop pattern of a route.
    pub(crate) fn get_route_stops(&self, route_id: RouteId) -> Result<&[StopId], RaptorError> {
        self.routes
            .get(route_id)
            .ok_or(RaptorError::InvalidRoute)
            .and_then(|route| {
                let end = route.stops_start + route.num_stops;
                if end > self.route_stops.len() {
                    Err(RaptorError::InvalidRoute)
                } else {
                    Ok(&self.route_stops[route.stops_start..end])
                }
            })
    }

    /// [`StopTime`] row of one trip of a route.
    pub(crate) fn get_trip(
        &self,
        route_id: RouteId,
        trip_idx: usize,
    ) -> Result<&[StopTime], RaptorError> {
        let route = self.routes.get(route_id).ok_or(RaptorError::InvalidRoute)?;

        if trip_idx >= route.num_trips {
            return Err(RaptorError::InvalidTrip);
        }

        let start = route.trips_start + trip_idx * route.num_stops;
        let end = start + route.num_stops;

        if end > self.stop_times.len() {
            Err(RaptorError::InvalidRoute)
        } else {
            Ok(&self.stop_times[start..end])
        }
    }

    /// Position of `stop` within the pattern of `route_id`, if it is served.
    pub(crate) fn stop_position(&self, route_id: RouteId, stop: StopId) -> Option<usize> {
        self.get_route_stops(route_id)
            .ok()?
            .iter()
            .position(|&s| s == stop)
    }

    /// Walking transfers leaving a stop, ascending by duration.
    pub(crate) fn get_stop_transfers(&self, stop_id: StopId) -> &[Transfer] {
        let stop = &self.stops[stop_id];
        &self.transfers[stop.transfers_start..stop.transfers_start + stop.transfers_len]
    }

    /// Routes through a stop.
    pub(crate) fn routes_for_stop(&self, stop_id: StopId) -> &[RouteId] {
        let stop = &self.stops[stop_id];
        &self.stop_routes[stop.routes_start..stop.routes_start + stop.routes_len]
    }

    /// Forward hub links of a stop, ascending by duration.
    pub(crate) fn out_hubs(&self, stop_id: StopId) -> &[HubLink] {
        let stop = &self.stops[stop_id];
        &self.out_hubs[stop.out_hubs_start..stop.out_hubs_start + stop.out_hubs_len]
    }

    /// Backward hub links of a stop, ascending by duration.
    pub(crate) fn in_hubs(&self, stop_id: StopId) -> &[HubLink] {
        let stop = &self.stops[stop_id];
        &self.in_hubs[stop.in_hubs_start..stop.in_hubs_start + stop.in_hubs_len]
    }

    /// Stops reachable on foot from a hub, ascending by duration.
    pub(crate) fn hub_arrivals(&self, hub: NodeId) -> &[HubLink] {
        let (start, len) = self.inverse_in_hub_ranges[hub];
        &self.inverse_in_hubs[start..start + len]
    }

    /// Hub-labelled walking time between two stops.
    ///
    /// Minimum over the hubs shared by `from`'s out-hub and `to`'s in-hub
    /// lists of the two-leg walk; `Time::MAX` when the hub sets are disjoint.
    #[must_use]
    pub fn walking_time(&self, from: StopId, to: StopId) -> Time {
        if from == to {
            return 0;
        }

        let out = self.out_hubs(from);
        let mut to_hub: HashMap<NodeId, Time> = HashMap::with_capacity(out.len());
        for link in out {
            // Sorted ascending, so the first occurrence of a hub is the
            // cheapest leg to it.
            to_hub.entry(link.node).or_insert(link.duration);
        }

        let mut best = Time::MAX;
        for link in self.in_hubs(to) {
            if link.duration >= best {
                // The inbound leg alone already matches the best total.
                break;
            }
            if let Some(&outbound) = to_hub.get(&link.node) {
                best = best.min(outbound.saturating_add(link.duration));
            }
        }
        best
    }
}
