//! Round-based public transit routing (RAPTOR) over an immutable timetable.
//!
//! The crate separates the read-only [`Timetable`], built once and shared by
//! any number of engines, from the per-query scratch state owned by a
//! [`Raptor`] engine. A query returns the earliest arrival at the target for
//! every number of trips used, i.e. the Pareto front over
//! (arrival time, trips taken).
//!
//! Walking transfers are relaxed either from explicit per-stop footpath lists
//! or through a precomputed hub labelling, selected when the engine is built.

pub mod error;
pub mod model;
pub mod prelude;
pub mod routing;

pub use error::Error;
pub use model::types::{NodeId, RouteId, StopId, StopTime, Time};
pub use model::{Timetable, TimetableBuilder};
pub use routing::bag::{Bag, Label};
pub use routing::matrix::arrival_matrix;
pub use routing::raptor::{Raptor, RaptorError};
