use std::time::Instant;

use crate::types::duration_to_us;

/// Microseconds elapsed since `started_at`, clamped to `u64::MAX`.
#[inline]
pub fn elapsed_us(started_at: Instant) -> u64 {
    duration_to_us(started_at.elapsed())
}

/// Emits a structured profiling event on the subsystem's tracing target.
#[cfg(feature = "profiling")]
#[inline]
pub fn event(
    target: &'static str,
    tag_stack: &[&str],
    op: &'static str,
    result: &'static str,
    elapsed_us: u64,
    message: &'static str,
) {
    use crate::telemetry::tags;

    // `tracing` needs the target as a literal, so dispatch per subsystem.
    match target {
        tags::PROFILE_MMAP => {
            tracing::debug!(target: tags::PROFILE_MMAP, op, result, elapsed_us, tags = ?tag_stack, "{message}");
        }
        tags::PROFILE_SINK => {
            tracing::debug!(target: tags::PROFILE_SINK, op, result, elapsed_us, tags = ?tag_stack, "{message}");
        }
        tags::PROFILE_WORKER => {
            tracing::debug!(target: tags::PROFILE_WORKER, op, result, elapsed_us, tags = ?tag_stack, "{message}");
        }
        tags::PROFILE_PIPELINE => {
            tracing::debug!(target: tags::PROFILE_PIPELINE, op, result, elapsed_us, tags = ?tag_stack, "{message}");
        }
        _ => {
            tracing::debug!(target: "pzip.profile", op, result, elapsed_us, requested_target = target, tags = ?tag_stack, "{message}");
        }
    }
}

#[cfg(not(feature = "profiling"))]
#[inline]
pub fn event(
    _target: &'static str,
    _tag_stack: &[&str],
    _op: &'static str,
    _result: &'static str,
    _elapsed_us: u64,
    _message: &'static str,
) {
}
