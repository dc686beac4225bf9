//! Lifecycle hooks around a send.
//!
//! `pre_action` runs before anything else and may stop the send.
//! `post_action` sees every completed result, success or error, and returns
//! the result that is handed back to the caller.

use async_trait::async_trait;

use crate::request::EmailSendParams;
use crate::result::SendResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDecision {
    Continue,
    Abort,
}

#[async_trait]
pub trait LifecycleHooks: Send + Sync {
    async fn pre_action(&self, _params: &EmailSendParams) -> HookDecision {
        HookDecision::Continue
    }

    async fn post_action(&self, result: SendResult) -> SendResult {
        result
    }
}

/// Hooks that never interfere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl LifecycleHooks for NoopHooks {}
