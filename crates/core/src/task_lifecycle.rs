//! Task completion timestamp rules.
//!
//! `completed_at` is set exactly while a task is COMPLETED. No other
//! ordering is imposed on status changes.

use crate::status::TaskStatus;
use crate::types::Timestamp;

/// Resolve `completed_at` after a status change.
///
/// - entering COMPLETED stamps `now`
/// - staying COMPLETED keeps the original stamp (or `now` if it was lost)
/// - any other status clears it
pub fn completed_at_for_transition(
    previous: Option<TaskStatus>,
    next: TaskStatus,
    previous_completed_at: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    if !next.is_completed() {
        return None;
    }
    match previous {
        Some(TaskStatus::Completed) => previous_completed_at.or(Some(now)),
        _ => Some(now),
    }
}
