mod engine;
mod state;

pub use engine::Raptor;
pub use state::RaptorError;
