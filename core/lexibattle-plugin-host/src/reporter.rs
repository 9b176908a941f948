//! Answer reporting from plugins back to the host.

use lexibattle_types::InstanceId;
use std::fmt;
use std::sync::Arc;

/// Receives answer reports for mounted instances.
pub trait AnswerListener: Send + Sync {
    fn on_correct(&self, instance: InstanceId, hits: u32, advance_next: bool);
    fn on_wrong(&self, instance: InstanceId);
}

/// Handle a plugin instance uses to report answers.
///
/// Each handle is bound to the instance it was attached to, so reports from
/// an instance that has since been torn down can be told apart.
#[derive(Clone)]
pub struct AnswerReporter {
    instance: InstanceId,
    listener: Arc<dyn AnswerListener>,
}

impl AnswerReporter {
    pub fn new(instance: InstanceId, listener: Arc<dyn AnswerListener>) -> Self {
        Self { instance, listener }
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Reports a correct answer worth `hits`.
    pub fn correct(&self, hits: u32, advance_next: bool) {
        self.listener.on_correct(self.instance, hits, advance_next);
    }

    /// Reports a wrong answer.
    pub fn wrong(&self) {
        self.listener.on_wrong(self.instance);
    }
}

impl fmt::Debug for AnswerReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerReporter")
            .field("instance", &self.instance)
            .finish()
    }
}
