//! Accounting for live attribute payload objects. Every object that is
//! constructed bumps a thread local counter and every dropped object
//! decrements it, which lets tests assert that evaluating or discarding a
//! payload leaks nothing. Objects are reference counted through [`Rc`] and
//! never cross threads, so a thread local tally is exact.
//!
//! [`Rc`]: std::rc::Rc

use std::cell::Cell;

thread_local! {
    static LIVE_OBJECTS: Cell<usize> = Cell::new(0);
}

/// The number of payload objects that are currently alive on this thread.
pub fn live_objects() -> usize {
    LIVE_OBJECTS.with(|live| live.get())
}

pub(crate) fn note_alloc() {
    LIVE_OBJECTS.with(|live| live.set(live.get() + 1));
}

pub(crate) fn note_dealloc() {
    LIVE_OBJECTS.with(|live| live.set(live.get().saturating_sub(1)));
}
