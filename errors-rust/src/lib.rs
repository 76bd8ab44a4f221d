mod errors;
mod event_loop;
pub mod opentelemetry;
mod outcome;
mod policy;
mod report;

pub use errors::*;
pub use event_loop::{CaptureStateExt, EventLoopError, OriginalError, RequestState};
pub use outcome::RunOutcome;
pub use policy::{Decision, Disposition, PropagationPolicy, TerminalScope};
pub use report::FailureReport;
