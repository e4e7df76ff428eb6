pub mod assignment;
pub mod batch;
pub mod cancellation;
pub mod dispatch;
pub mod error;
pub mod health_gate;
pub mod hydrate;
pub mod scheduler;
pub mod user_directory;

pub use assignment::{Attempt, AssignmentOrchestrator, AssignmentPlan, BrowserAssignment};
pub use batch::{evaluate_pending, Batch, PipelineEvaluation};
pub use cancellation::handle_cancellation;
pub use dispatch::{dispatch_batch, DispatchJob};
pub use error::SchedulerError;
pub use health_gate::HealthGate;
pub use hydrate::{hydrate_batch, HydratedBatch, HydrationFailure};
pub use scheduler::Scheduler;
pub use user_directory::{InMemoryUserDirectory, PassthroughUserDirectory, UserDirectory};
