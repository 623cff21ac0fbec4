//! Frame subscriptions: push one `FrameOutput` per applied tick to the presentation layer.

use crate::ids::{IdAllocator, SubscriptionId};
use crate::outputs::FrameOutput;

/// Receives frames produced by ticks and seeks.
pub trait FrameListener {
    fn on_frame(&mut self, output: &FrameOutput);
}

impl<F> FrameListener for F
where
    F: FnMut(&FrameOutput),
{
    fn on_frame(&mut self, output: &FrameOutput) {
        self(output)
    }
}

/// Ordered listener registry. Listeners run in subscription order.
#[derive(Default)]
pub struct FrameDispatcher {
    listeners: Vec<(SubscriptionId, Box<dyn FrameListener>)>,
    ids: IdAllocator,
}

impl FrameDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn FrameListener>) -> SubscriptionId {
        let id = self.ids.alloc_subscription();
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn dispatch(&mut self, output: &FrameOutput) {
        for (_, listener) in &mut self.listeners {
            listener.on_frame(output);
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Get the number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for FrameDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
