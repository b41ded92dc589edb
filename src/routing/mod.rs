//! Query algorithms over a built [`crate::Timetable`].

pub mod bag;
pub mod matrix;
pub mod raptor;

pub use bag::{Bag, Label};
pub use matrix::arrival_matrix;
pub use raptor::{Raptor, RaptorError};
