//! Progress reporting
//!
//! An optional observer injected per run receives ordered (label, percent)
//! events. Absence of an observer does not change pipeline behavior.

mod observer;

pub use observer::{ProgressEvent, ProgressObserver, ProgressTracker};
