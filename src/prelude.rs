//! Single-import surface of the crate.

pub use crate::error::Error;
pub use crate::model::{Timetable, TimetableBuilder};
pub use crate::routing::bag::{Bag, Label};
pub use crate::routing::matrix::arrival_matrix;
pub use crate::routing::raptor::{Raptor, RaptorError};

// Core identifier and time types.
pub use crate::model::types::{NodeId, RouteId, StopId, StopTime, Time};
