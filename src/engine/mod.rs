// Inference engine boundary: configuration, the engine traits, and a replay
// engine that re-reads a recorded sampling state.

pub mod config;
pub mod replay;
pub mod traits;
