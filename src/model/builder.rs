//! Programmatic timetable assembly with invariant validation.

use hashbrown::HashSet;
use log::{info, warn};

use super::timetable::Timetable;
use super::types::{HubLink, NodeId, Route, RouteId, Stop, StopId, StopTime, Time, Transfer};
use crate::error::Error;

/// Incremental builder for a [`Timetable`].
///
/// Feed ingestion (GTFS or otherwise) lives outside this crate; whatever the
/// provider, it ends up here. `build` validates everything the router assumes
/// and refuses networks that violate the FIFO trip ordering instead of
/// producing wrong journeys.
#[derive(Debug, Default)]
pub struct TimetableBuilder {
    num_stops: usize,
    routes: Vec<RawRoute>,
    transfers: Vec<(StopId, StopId, Time)>,
    out_hubs: Vec<(StopId, NodeId, Time)>,
    in_hubs: Vec<(StopId, NodeId, Time)>,
}

#[derive(Debug)]
struct RawRoute {
    stops: Vec<StopId>,
    trips: Vec<Vec<StopTime>>,
}

impl TimetableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next dense stop id.
    pub fn add_stop(&mut self) -> StopId {
        let id = self.num_stops;
        self.num_stops += 1;
        id
    }

    /// Add a stop pattern together with its timetabled trips.
    ///
    /// Each trip is one [`StopTime`] row per pattern stop. Trips are sorted by
    /// their departure at the first stop during `build`.
    pub fn add_route(&mut self, stops: Vec<StopId>, trips: Vec<Vec<StopTime>>) -> RouteId {
        let id = self.routes.len();
        self.routes.push(RawRoute { stops, trips });
        id
    }

    /// Walking edge from `from` to `to`.
    pub fn add_transfer(&mut self, from: StopId, to: StopId, duration: Time) {
        self.transfers.push((from, to, duration));
    }

    /// Forward hub link: `stop` reaches `hub` on foot in `duration`.
    pub fn add_out_hub(&mut self, stop: StopId, hub: NodeId, duration: Time) {
        self.out_hubs.push((stop, hub, duration));
    }

    /// Backward hub link: `hub` reaches `stop` on foot in `duration`.
    pub fn add_in_hub(&mut self, stop: StopId, hub: NodeId, duration: Time) {
        self.in_hubs.push((stop, hub, duration));
    }

    /// Validate and assemble the flat timetable arena.
    pub fn build(mut self) -> Result<Timetable, Error> {
        self.validate_routes()?;
        self.validate_stop_references()?;

        for raw in &mut self.routes {
            raw.trips.sort_by_key(|trip| trip[0].departure);
        }
        self.check_fifo()?;

        let num_stops = self.num_stops;
        let mut num_nodes = num_stops;
        for &(_, hub, _) in self.out_hubs.iter().chain(&self.in_hubs) {
            num_nodes = num_nodes.max(hub + 1);
        }

        // Route arena.
        let mut routes = Vec::with_capacity(self.routes.len());
        let mut route_stops = Vec::new();
        let mut stop_times = Vec::new();
        let mut stop_route_lists: Vec<Vec<RouteId>> = vec![Vec::new(); num_stops];
        for (route_id, raw) in self.routes.iter().enumerate() {
            if raw.trips.is_empty() {
                warn!("route {route_id} has no trips");
            }
            routes.push(Route {
                stops_start: route_stops.len(),
                num_stops: raw.stops.len(),
                trips_start: stop_times.len(),
                num_trips: raw.trips.len(),
            });
            for &stop in &raw.stops {
                stop_route_lists[stop].push(route_id);
            }
            route_stops.extend_from_slice(&raw.stops);
            for trip in &raw.trips {
                stop_times.extend_from_slice(trip);
            }
        }

        // Per-stop adjacency, each list ascending by walking time.
        let mut transfer_lists: Vec<Vec<Transfer>> = vec![Vec::new(); num_stops];
        for &(from, to, duration) in &self.transfers {
            transfer_lists[from].push(Transfer {
                target_stop: to,
                duration,
            });
        }
        for list in &mut transfer_lists {
            list.sort_by_key(|t| (t.duration, t.target_stop));
        }

        let mut out_hub_lists: Vec<Vec<HubLink>> = vec![Vec::new(); num_stops];
        let mut in_hub_lists: Vec<Vec<HubLink>> = vec![Vec::new(); num_stops];
        let mut inverse_lists: Vec<Vec<HubLink>> = vec![Vec::new(); num_nodes];
        for &(stop, hub, duration) in &self.out_hubs {
            out_hub_lists[stop].push(HubLink {
                duration,
                node: hub,
            });
        }
        for &(stop, hub, duration) in &self.in_hubs {
            in_hub_lists[stop].push(HubLink {
                duration,
                node: hub,
            });
            inverse_lists[hub].push(HubLink {
                duration,
                node: stop,
            });
        }
        for list in out_hub_lists
            .iter_mut()
            .chain(&mut in_hub_lists)
            .chain(&mut inverse_lists)
        {
            list.sort_by_key(|link| (link.duration, link.node));
        }

        // Flatten into the arena.
        let mut stops = Vec::with_capacity(num_stops);
        let mut transfers = Vec::with_capacity(self.transfers.len());
        let mut out_hubs = Vec::with_capacity(self.out_hubs.len());
        let mut in_hubs = Vec::with_capacity(self.in_hubs.len());
        for stop_id in 0..num_stops {
            let stop = Stop {
                routes_start: 0, // patched below once stop_routes is final
                routes_len: stop_route_lists[stop_id].len(),
                transfers_start: transfers.len(),
                transfers_len: transfer_lists[stop_id].len(),
                out_hubs_start: out_hubs.len(),
                out_hubs_len: out_hub_lists[stop_id].len(),
                in_hubs_start: in_hubs.len(),
                in_hubs_len: in_hub_lists[stop_id].len(),
            };
            stops.push(stop);
            transfers.append(&mut transfer_lists[stop_id]);
            out_hubs.append(&mut out_hub_lists[stop_id]);
            in_hubs.append(&mut in_hub_lists[stop_id]);
        }
        let mut stop_routes = Vec::new();
        for (stop_id, stop) in stops.iter_mut().enumerate() {
            stop.routes_start = stop_routes.len();
            stop_routes.append(&mut stop_route_lists[stop_id]);
        }

        let mut inverse_in_hubs = Vec::with_capacity(self.in_hubs.len());
        let mut inverse_in_hub_ranges = Vec::with_capacity(num_nodes);
        for list in &mut inverse_lists {
            inverse_in_hub_ranges.push((inverse_in_hubs.len(), list.len()));
            inverse_in_hubs.append(list);
        }

        let num_trips: usize = routes.iter().map(|r| r.num_trips).sum();
        info!(
            "built timetable: {num_stops} stops, {} routes, {num_trips} trips, {} transfers",
            routes.len(),
            transfers.len(),
        );

        Ok(Timetable {
            routes,
            route_stops,
            stop_times,
            stops,
            stop_routes,
            transfers,
            out_hubs,
            in_hubs,
            inverse_in_hubs,
            inverse_in_hub_ranges,
            num_nodes,
        })
    }

    fn validate_routes(&self) -> Result<(), Error> {
        for (route_id, raw) in self.routes.iter().enumerate() {
            if raw.stops.is_empty() {
                return Err(Error::EmptyRoute(route_id));
            }
            let mut seen = HashSet::with_capacity(raw.stops.len());
            for &stop in &raw.stops {
                if stop >= self.num_stops {
                    return Err(Error::UnknownStop(stop));
                }
                if !seen.insert(stop) {
                    return Err(Error::RepeatedStop {
                        route: route_id,
                        stop,
                    });
                }
            }
            for (trip_idx, trip) in raw.trips.iter().enumerate() {
                if trip.len() != raw.stops.len() {
                    return Err(Error::MalformedTrip {
                        route: route_id,
                        trip: trip_idx,
                        got: trip.len(),
                        expected: raw.stops.len(),
                    });
                }
                for (stop_idx, st) in trip.iter().enumerate() {
                    if st.arrival > st.departure {
                        return Err(Error::ArrivalAfterDeparture {
                            route: route_id,
                            trip: trip_idx,
                            stop_idx,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_stop_references(&self) -> Result<(), Error> {
        for &(from, to, _) in &self.transfers {
            for stop in [from, to] {
                if stop >= self.num_stops {
                    return Err(Error::UnknownStop(stop));
                }
            }
        }
        for &(stop, _, _) in self.out_hubs.iter().chain(&self.in_hubs) {
            if stop >= self.num_stops {
                return Err(Error::UnknownStop(stop));
            }
        }
        Ok(())
    }

    /// Trips within a route must not overtake each other: once sorted by
    /// departure at the first stop, both time columns must stay sorted at
    /// every stop of the pattern.
    fn check_fifo(&self) -> Result<(), Error> {
        for (route_id, raw) in self.routes.iter().enumerate() {
            for pair in raw.trips.windows(2) {
                for stop_idx in 0..raw.stops.len() {
                    let earlier = pair[0][stop_idx];
                    let later = pair[1][stop_idx];
                    if earlier.departure > later.departure || earlier.arrival > later.arrival {
                        return Err(Error::TripOvertaking {
                            route: route_id,
                            stop_idx,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(arrival: Time, departure: Time) -> StopTime {
        StopTime::new(arrival, departure)
    }

    fn two_stop_builder() -> (TimetableBuilder, StopId, StopId) {
        let mut builder = TimetableBuilder::new();
        let a = builder.add_stop();
        let b = builder.add_stop();
        (builder, a, b)
    }

    #[test]
    fn overtaking_trips_are_rejected() {
        let (mut builder, a, b) = two_stop_builder();
        // Departs earlier but arrives later than the second trip.
        builder.add_route(
            vec![a, b],
            vec![
                vec![st(100, 100), st(500, 500)],
                vec![st(200, 200), st(400, 400)],
            ],
        );
        assert_eq!(
            builder.build(),
            Err(Error::TripOvertaking {
                route: 0,
                stop_idx: 1
            })
        );
    }

    #[test]
    fn repeated_pattern_stop_is_rejected() {
        let (mut builder, a, b) = two_stop_builder();
        builder.add_route(vec![a, b, a], vec![]);
        assert_eq!(
            builder.build(),
            Err(Error::RepeatedStop { route: 0, stop: a })
        );
    }

    #[test]
    fn trip_row_length_must_match_pattern() {
        let (mut builder, a, b) = two_stop_builder();
        builder.add_route(vec![a, b], vec![vec![st(0, 0)]]);
        assert_eq!(
            builder.build(),
            Err(Error::MalformedTrip {
                route: 0,
                trip: 0,
                got: 1,
                expected: 2
            })
        );
    }

    #[test]
    fn unknown_transfer_stop_is_rejected() {
        let (mut builder, a, _) = two_stop_builder();
        builder.add_transfer(a, 7, 60);
        assert_eq!(builder.build(), Err(Error::UnknownStop(7)));
    }

    #[test]
    fn arrival_after_departure_is_rejected() {
        let (mut builder, a, b) = two_stop_builder();
        builder.add_route(vec![a, b], vec![vec![st(100, 50), st(200, 200)]]);
        assert_eq!(
            builder.build(),
            Err(Error::ArrivalAfterDeparture {
                route: 0,
                trip: 0,
                stop_idx: 0
            })
        );
    }

    #[test]
    fn trips_are_sorted_by_first_departure() {
        let (mut builder, a, b) = two_stop_builder();
        let route = builder.add_route(
            vec![a, b],
            vec![
                vec![st(300, 300), st(600, 600)],
                vec![st(100, 100), st(400, 400)],
            ],
        );
        let timetable = builder.build().unwrap();
        let first = timetable.get_trip(route, 0).unwrap();
        assert_eq!(first[0].departure, 100);
    }

    #[test]
    fn transfers_are_sorted_by_duration() {
        let mut builder = TimetableBuilder::new();
        let a = builder.add_stop();
        let b = builder.add_stop();
        let c = builder.add_stop();
        builder.add_transfer(a, b, 300);
        builder.add_transfer(a, c, 120);
        let timetable = builder.build().unwrap();
        let durations: Vec<Time> = timetable
            .get_stop_transfers(a)
            .iter()
            .map(|t| t.duration)
            .collect();
        assert_eq!(durations, vec![120, 300]);
    }

    #[test]
    fn walking_oracle_takes_cheapest_shared_hub() {
        let mut builder = TimetableBuilder::new();
        let a = builder.add_stop();
        let b = builder.add_stop();
        let hub_near = 10;
        let hub_far = 11;
        builder.add_out_hub(a, hub_near, 100);
        builder.add_out_hub(a, hub_far, 50);
        builder.add_in_hub(b, hub_near, 40);
        builder.add_in_hub(b, hub_far, 500);
        let timetable = builder.build().unwrap();
        // near: 100 + 40, far: 50 + 500
        assert_eq!(timetable.walking_time(a, b), 140);
        assert_eq!(timetable.walking_time(b, a), Time::MAX);
        assert_eq!(timetable.walking_time(a, a), 0);
    }
}
