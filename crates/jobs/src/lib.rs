//! `cf-jobs` — asynchronous generation-job tracking.
//!
//! [`MediaJobPoller`] reconciles outstanding generation jobs against
//! the backing store on an interval and republishes a status snapshot;
//! [`BrowserTaskTracker`] wraps the browser-automation task rows.

pub mod browser;
pub mod poller;
pub mod status;

pub use browser::BrowserTaskTracker;
pub use poller::{JobSource, MediaJobPoller, PollOutcome};
pub use status::{JobKey, JobSnapshot, MediaJobStatus};
