//! Frame scheduling seam between the player and the host event loop.
//!
//! The player asks for one frame at a time. The host later calls
//! `Engine::tick(token, now_ms)` with the token it was given; a token that is
//! no longer pending is ignored, which is what makes pause and dispose final.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::ids::FrameToken;

/// Host-side frame callback primitive (`requestAnimationFrame`, a game loop, a timer).
pub trait FrameScheduler {
    /// Arrange for `Engine::tick(token, now)` to be called on the next frame.
    fn request_frame(&mut self, token: FrameToken);
    /// The callback for `token` must not be delivered.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Scheduler for hosts that poll `Engine::pending_frame()` every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolledFrames;

impl FrameScheduler for PolledFrames {
    fn request_frame(&mut self, _token: FrameToken) {}

    fn cancel_frame(&mut self, _token: FrameToken) {}
}

/// Queue-backed scheduler for fixed-tick loops and tests.
///
/// Clones share the queue: keep one clone in the host loop and hand the other
/// to the engine, then drain with [`ManualFrames::next`].
#[derive(Clone, Debug, Default)]
pub struct ManualFrames {
    queue: Rc<RefCell<VecDeque<FrameToken>>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest requested frame not yet delivered.
    pub fn next(&self) -> Option<FrameToken> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self, token: FrameToken) {
        self.queue.borrow_mut().push_back(token);
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.queue.borrow_mut().retain(|t| *t != token);
    }
}
