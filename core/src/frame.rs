use std::{cell::RefCell, fmt, marker::PhantomData};

use serde::Serialize;

thread_local! {
    static STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// A named routine on the logical call stack.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct Frame(&'static str);

impl Frame {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Pops its frame off the current thread's stack when dropped.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    depth: usize,
    // Guards pop from a thread-local stack and must stay on the thread that pushed them.
    _not_send: PhantomData<*const ()>,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        STACK.with(|stack| stack.borrow_mut().truncate(self.depth));
    }
}

/// Push `name` onto the logical call stack until the returned guard is dropped.
pub fn enter(name: &'static str) -> FrameGuard {
    STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let depth = stack.len();
        stack.push(Frame(name));
        FrameGuard {
            depth,
            _not_send: PhantomData,
        }
    })
}

/// The innermost frame currently entered on this thread, if any.
pub fn innermost() -> Option<Frame> {
    STACK.with(|stack| stack.borrow().last().copied())
}

/// Copy of the current thread's logical call stack.
pub fn snapshot() -> StackSnapshot {
    STACK.with(|stack| StackSnapshot {
        frames: stack.borrow().clone(),
    })
}

/// Frames captured at a single point in time, outermost first.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StackSnapshot {
    frames: Vec<Frame>,
}

impl StackSnapshot {
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames.iter().any(|frame| frame.name() == name)
    }

    pub fn innermost(&self) -> Option<Frame> {
        self.frames.last().copied()
    }

    pub fn innermost_first(&self) -> impl Iterator<Item = Frame> + '_ {
        self.frames.iter().rev().copied()
    }
}
