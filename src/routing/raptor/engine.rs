use std::mem;

use hashbrown::HashMap;

use super::state::{find_earliest_trip, QueryState, RaptorError};
use crate::model::types::{RouteId, StopId, StopTime, Time};
use crate::model::Timetable;

/// Round-based earliest-arrival router borrowing an immutable [`Timetable`].
///
/// Each round corresponds to taking one more trip: stage 1 snapshots the
/// arrival times of stops improved last round, stage 2 scans every route
/// through such a stop, stage 3 relaxes walking transfers. The loop stops as
/// soon as a round's route scan improves nothing.
///
/// An engine owns its scratch arrays and serves one query at a time; run
/// concurrent queries on independent engines sharing the same timetable.
/// With `use_hubs` the walking relaxation goes through the precomputed hub
/// labelling instead of direct footpaths. With `profile` every reported
/// journey must contain at least one trip, so the trip-free walking shortcut
/// and the source's own footpaths are excluded.
#[derive(Debug)]
pub struct Raptor<'t> {
    timetable: &'t Timetable,
    use_hubs: bool,
    profile: bool,
    state: QueryState,
    /// Per-round working set: route -> earliest marked pattern position.
    queue: HashMap<RouteId, usize>,
}

impl<'t> Raptor<'t> {
    #[must_use]
    pub fn new(timetable: &'t Timetable, use_hubs: bool, profile: bool) -> Self {
        let state = QueryState::new(timetable.num_stops(), timetable.num_nodes(), use_hubs);
        Raptor {
            timetable,
            use_hubs,
            profile,
            state,
            queue: HashMap::new(),
        }
    }

    /// Reset all scratch state in place; the engine can then serve another
    /// query against the same timetable.
    pub fn clear(&mut self) {
        self.state.reset();
        self.queue.clear();
    }

    /// Earliest arrival at `target` per number of trips used.
    ///
    /// Element `k` of the returned vector is the best known arrival time at
    /// `target` using at most `k` trips; the vector is non-increasing and
    /// `Time::MAX` means unreached. Element 0 is the trip-free walking
    /// arrival when hub mode admits one, `Time::MAX` otherwise.
    pub fn query(
        &mut self,
        source: StopId,
        target: StopId,
        departure: Time,
    ) -> Result<Vec<Time>, RaptorError> {
        let data = self.timetable;
        data.validate_stop(source)?;
        data.validate_stop(target)?;

        self.clear();

        if self.profile && source == target {
            // A journey with at least one trip cannot beat staying put.
            return Ok(vec![departure]);
        }

        self.state.earliest_arrival[source] = departure;
        self.state.round_start_arrival[source] = departure;
        self.state.marked.set(source, true);

        // Unlimited walking admits a trip-free journey from source to target.
        if self.use_hubs && !self.profile {
            let walk = data.walking_time(source, target);
            let candidate = departure.saturating_add(walk);
            if candidate < self.state.earliest_arrival[target] {
                self.state.earliest_arrival[target] = candidate;
            }
        }

        let mut target_labels = vec![self.state.earliest_arrival[target]];

        let mut round = 0usize;
        loop {
            round += 1;

            // Stage 1: snapshot the arrival times of stops touched last round.
            for stop in self.state.marked.ones() {
                self.state.round_start_arrival[stop] = self.state.earliest_arrival[stop];
            }

            // Stage 2: scan every route through a stop touched last round.
            self.make_queue();
            self.state.stops_improved = false;
            self.scan_routes(target)?;

            target_labels.push(self.state.earliest_arrival[target]);
            if !self.state.stops_improved {
                break;
            }

            // Stage 3: walking relaxation. Transfers leaving the source are
            // only seen once it is put back into the marked set; afterwards
            // it is removed again, since its routes were already scanned with
            // the same departure time in this round.
            if round == 1 && !self.profile {
                self.state.marked.set(source, true);
            }
            if self.use_hubs {
                self.relax_hubs(target);
            } else {
                self.relax_transfers(target);
            }
            if round == 1 && !self.profile {
                self.state.marked.set(source, false);
            }

            // Stage 3 may have improved the target.
            if let Some(last) = target_labels.last_mut() {
                *last = self.state.earliest_arrival[target];
            }
        }

        Ok(target_labels)
    }

    /// Collect the routes serving marked stops, keyed to the earliest marked
    /// position on their pattern. Consumes all marks.
    fn make_queue(&mut self) {
        let data = self.timetable;
        self.queue.clear();
        for stop in self.state.marked.ones() {
            for &route_id in data.routes_for_stop(stop) {
                let Some(pos) = data.stop_position(route_id, stop) else {
                    continue;
                };
                self.queue
                    .entry(route_id)
                    .and_modify(|existing| {
                        if pos < *existing {
                            *existing = pos;
                        }
                    })
                    .or_insert(pos);
            }
        }
        self.state.marked.clear();
    }

    /// Forward scan of every queued route with a running current trip.
    fn scan_routes(&mut self, target: StopId) -> Result<(), RaptorError> {
        let data = self.timetable;
        let queue = mem::take(&mut self.queue);
        for (&route_id, &start_pos) in &queue {
            let stops = data.get_route_stops(route_id)?;
            // Trip currently ridden, with its stop-time row. None until a
            // trip has been boarded.
            let mut trip: Option<(usize, &[StopTime])> = None;

            for (idx, &stop) in stops.iter().enumerate().skip(start_pos) {
                let mut departure = None;
                if let Some((_, times)) = trip {
                    let st = times[idx];
                    departure = Some(st.departure);
                    // Local and target pruning: an arrival no better than the
                    // best known at this stop or at the target is dead.
                    let bound = self.state.earliest_arrival[stop]
                        .min(self.state.earliest_arrival[target]);
                    if st.arrival < bound {
                        self.state.earliest_arrival[stop] = st.arrival;
                        self.state.marked.set(stop, true);
                        self.state.stops_improved = true;
                    }
                }

                // Trip upgrade, after propagation: the stop may both receive
                // this trip's arrival and board an earlier trip caught via
                // last round's snapshot.
                let board = self.state.round_start_arrival[stop];
                if board == Time::MAX {
                    continue;
                }
                if departure.is_none_or(|dep| board <= dep) {
                    if let Some(new_idx) = find_earliest_trip(data, route_id, idx, board) {
                        if trip.is_none_or(|(current, _)| current != new_idx) {
                            trip = Some((new_idx, data.get_trip(route_id, new_idx)?));
                        }
                    }
                }
            }
        }
        self.queue = queue;
        Ok(())
    }

    /// Direct footpath relaxation from every marked stop.
    ///
    /// Marks are committed only after the full sweep so a stop improved here
    /// is not relaxed again within the same stage.
    fn relax_transfers(&mut self, target: StopId) {
        let data = self.timetable;
        for stop in self.state.marked.ones() {
            for transfer in data.get_stop_transfers(stop) {
                let candidate =
                    self.state.earliest_arrival[stop].saturating_add(transfer.duration);
                // Transfers are sorted by duration, so past the target bound
                // the rest of the list is dead too.
                if candidate > self.state.earliest_arrival[target] {
                    break;
                }
                if candidate < self.state.earliest_arrival[transfer.target_stop] {
                    self.state.earliest_arrival[transfer.target_stop] = candidate;
                    self.state.improved.set(transfer.target_stop, true);
                }
            }
        }
        self.state.marked.union_with(&self.state.improved);
        self.state.improved.clear();
    }

    /// Two-phase hub relaxation: marked stops push arrivals to their
    /// out-hubs, improved hubs then push through the inverse in-hub lists
    /// back to stops. Touched hub labels are reset afterwards.
    fn relax_hubs(&mut self, target: StopId) {
        let data = self.timetable;
        for stop in self.state.marked.ones() {
            for link in data.out_hubs(stop) {
                let candidate = self.state.earliest_arrival[stop].saturating_add(link.duration);
                if candidate > self.state.earliest_arrival[target] {
                    break;
                }
                if candidate < self.state.hub_labels[link.node] {
                    self.state.hub_labels[link.node] = candidate;
                    self.state.improved.set(link.node, true);
                }
            }
        }

        for hub in self.state.improved.ones() {
            for link in data.hub_arrivals(hub) {
                let candidate = self.state.hub_labels[hub].saturating_add(link.duration);
                if candidate > self.state.earliest_arrival[target] {
                    break;
                }
                if candidate < self.state.earliest_arrival[link.node] {
                    self.state.earliest_arrival[link.node] = candidate;
                    self.state.marked.set(link.node, true);
                }
            }
        }

        for hub in self.state.improved.ones() {
            self.state.hub_labels[hub] = Time::MAX;
        }
        self.state.improved.clear();
    }
}
