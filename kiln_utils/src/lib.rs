mod engine_args;
mod logging;

pub use engine_args::EngineArgs;
pub use logging::init_logging;

pub use tracing;
