//! Batch import: the part loop and the bounded steps it runs.

mod orchestrator;
mod report;
mod step;


pub use orchestrator::{BatchOrchestrator, BatchRequest, RunState};
pub use report::{BatchReport, PartReport};
pub use step::{
    run_batch_step, InProcessStepExecutor, Registries, StepEnvironment, StepEnvironmentFactory,
    StepExecutor, StepRequest,
};
