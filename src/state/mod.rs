//! Run state tracking
//!
//! A crawl run moves `Idle → Running → (Completed | Aborted)`. Transitions
//! are validated so a finished run can never be restarted.

mod run_state;

pub use run_state::RunState;
