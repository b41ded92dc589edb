//! Data model of the transit network consumed by the router.

pub mod builder;
pub mod timetable;
pub mod types;

pub use builder::TimetableBuilder;
pub use timetable::Timetable;
pub use types::{NodeId, RouteId, StopId, StopTime, Time};
