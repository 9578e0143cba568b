//! ProgressObserver trait definition

use tracing::{debug, info, warn};

use crate::pipeline::Stage;

/// One advisory progress report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Coordinator stage emitting the event
    pub stage: Stage,
    /// Human-readable step label
    pub label: String,
    /// Completion estimate, 0-100
    pub percent: u8,
}

/// Receives progress events during a run
///
/// Observers are advisory: they cannot influence control flow or outcome.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Forwards events to an optional observer, keeping percentages monotonic
/// and following the coordinator's stage transitions
pub struct ProgressTracker<'a> {
    observer: Option<&'a dyn ProgressObserver>,
    stage: Stage,
    last_percent: u8,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(observer: Option<&'a dyn ProgressObserver>) -> Self {
        debug!(has_observer = observer.is_some(), "ProgressTracker::new: called");
        Self {
            observer,
            stage: Stage::Init,
            last_percent: 0,
        }
    }

    /// Report a step; a percent lower than the last one is raised to it
    ///
    /// Several steps may report the same stage. Returns false when `stage`
    /// is not a successor of the current one; the event is still forwarded.
    pub fn emit(&mut self, stage: Stage, label: &str, percent: u8) -> bool {
        let legal = (stage == self.stage && !stage.is_terminal()) || self.stage.successors().contains(&stage);
        if !legal {
            warn!(from = ?self.stage, to = ?stage, "ProgressTracker::emit: unexpected stage transition");
        }
        self.stage = stage;

        let percent = percent.min(100).max(self.last_percent);
        self.last_percent = percent;
        info!(?stage, percent, "{}", label);

        if let Some(observer) = self.observer {
            observer.on_progress(&ProgressEvent {
                stage,
                label: label.to_string(),
                percent,
            });
        }
        legal
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn last_percent(&self) -> u8 {
        self.last_percent
    }
}
