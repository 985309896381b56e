pub mod assigner;
pub mod intake;
pub mod job;
pub mod orchestrator;
pub mod policy;
pub mod queue;

pub use intake::{intake, IntakeHandle};
pub use job::{Job, JobId, JobSpec, JobStatus, ServerId};
pub use orchestrator::{Admission, Orchestrator};
pub use policy::Policy;
pub use queue::{Migration, SharedQueue, WorkQueue};
