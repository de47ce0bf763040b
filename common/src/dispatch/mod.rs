// Reminder dispatch module: chunked batch delivery and the recurring scan engine

pub mod batch;
pub mod engine;

pub use batch::BatchDispatcher;
pub use engine::{DispatchEngine, EngineConfig, Scanner};
