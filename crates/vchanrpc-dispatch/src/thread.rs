use std::thread::{self, ThreadId};

/// Identity of the runtime thread all channel callbacks are expected to run on.
///
/// Bound when the channel becomes ready and cleared when it goes away. While unbound, any thread
/// is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceThread {
    id: Option<ThreadId>,
}

impl ServiceThread {
    pub fn bind(&mut self) {
        self.id = Some(thread::current().id());
    }

    pub fn reset(&mut self) {
        self.id = None;
    }

    pub fn bound(&self) -> Option<ThreadId> {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.id.is_none_or(|id| id == thread::current().id())
    }
}
