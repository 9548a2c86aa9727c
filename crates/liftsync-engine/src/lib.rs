pub mod convert;
pub mod error;
pub mod merge;
pub mod mutation;
pub mod reconcile;
pub mod records;
pub mod service;

pub use error::{WorkoutError, WorkoutResult};
pub use mutation::SetField;
pub use service::{Completion, SyncFailure, SyncOutcome, SyncReport, WorkoutService};
