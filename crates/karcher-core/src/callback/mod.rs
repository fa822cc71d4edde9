//! Observers and cancellation for the fixed-point iteration.

pub mod cancellation;
pub mod observer;

pub use cancellation::CancellationToken;
pub use observer::{
    FnObserver, IterationInfo, IterationObserver, NoOpObserver, PrintConvergenceObserver,
    RecordingObserver, SolveStartInfo, SolveSummary, TerminationReason,
};
