//! Ctrl+C handling; a pending fetch stops before its next page.

use std::sync::atomic::{AtomicBool, Ordering};

static CANCELLED: AtomicBool = AtomicBool::new(false);

pub fn is_cancelled() -> bool {
    CANCELLED.load(Ordering::SeqCst)
}

pub fn cancel() {
    CANCELLED.store(true, Ordering::SeqCst);
}

pub fn reset() {
    CANCELLED.store(false, Ordering::SeqCst);
}

/// Register the Ctrl+C handler. A second registration is ignored.
pub fn register_handler() {
    let _ = ctrlc::set_handler(cancel);
}
