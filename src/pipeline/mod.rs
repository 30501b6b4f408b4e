//! Pipeline module - stages, orchestration and batch driving.

mod batch;
mod orchestrator;
mod stages;

pub use batch::*;
pub use orchestrator::*;
pub use stages::*;
