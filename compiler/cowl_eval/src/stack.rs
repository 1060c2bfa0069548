//! Stack growth for deeply nested evaluation.
//!
//! The evaluator is a recursive tree walk; `stacker` grows the native stack
//! on demand so that deep nesting hits the configured call-depth limit
//! instead of overflowing. On wasm the closure runs directly.

/// Run `f` with at least the red zone of stack available.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum free stack before growing (128KB).
    const RED_ZONE: usize = 128 * 1024;

    /// Size of each new stack segment (1MB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
