//! Typed call sites for the blog REST API.
//!
//! Each operation maps to exactly one `ApiClient::request` with a fixed path
//! and unwraps the envelope: the payload on success, a sentinel (`None`,
//! `false` or an empty `Vec`) otherwise. Failures are logged, never returned.
//! The backend is the authority on validation; the only client-side check is
//! that an id is present before it is spliced into a path.

mod category;
mod post;
mod tag;
mod user;

pub use category::CATEGORY_PREFIX;
pub use post::POST_PREFIX;
pub use tag::TAG_PREFIX;
pub use user::LOGIN_PATH;

use crate::envelope::ApiResponse;

/// Payload of a successful envelope, logging the failure otherwise.
fn unwrap_data<T>(operation: &str, envelope: ApiResponse<T>) -> Option<T> {
    if !envelope.success {
        tracing::warn!(
            operation,
            code = ?envelope.code,
            message = envelope.message_or_default(),
            "api call failed"
        );
        return None;
    }
    let data = envelope.data;
    if data.is_none() {
        tracing::warn!(operation, "api call succeeded without a payload");
    }
    data
}

/// `true` when `id` is usable; logs the rejection otherwise.
fn require_id(operation: &str, id: &str) -> bool {
    if id.is_empty() {
        tracing::error!(operation, "id is required");
        return false;
    }
    true
}
