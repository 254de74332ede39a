//! Per-user counters that must never go negative.

/// Decrement `current`, stopping at zero.
///
/// Returns the new value. An attempted underflow is logged at error level;
/// it means a response was consumed twice.
pub fn decrement_response_count(user_id: i32, current: i32) -> i32 {
    if current <= 0 {
        tracing::error!(
            user_id,
            current,
            "response count decrement would go below zero"
        );
        return 0;
    }
    current - 1
}
