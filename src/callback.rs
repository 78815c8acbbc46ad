//! User callbacks for upload completion
//!
//! Uploads run on background threads, so the only way a caller learns how an
//! upload ended is the [`StatusCallback`] it handed over at submission time.
//! Callbacks are invoked from the upload thread, never from the caller's.

use crate::status::HubStatusCode;
use std::any::Any;
use std::sync::Arc;

/// Opaque value handed back to the callback unchanged
pub type UserContext = Arc<dyn Any + Send + Sync>;

/// Receives the terminal status of an upload
pub trait StatusCallback: Send + Sync {
    /// Called once the upload reached a terminal state
    fn execute(&self, status: HubStatusCode, context: Option<&UserContext>);
}

impl<F> StatusCallback for F
where
    F: Fn(HubStatusCode, Option<&UserContext>) + Send + Sync,
{
    fn execute(&self, status: HubStatusCode, context: Option<&UserContext>) {
        self(status, context)
    }
}

/// Build a [`UserContext`] from any shareable value
pub fn user_context<T: Any + Send + Sync>(value: T) -> UserContext {
    Arc::new(value)
}
