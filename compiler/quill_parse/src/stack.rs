//! Stack growth for deeply nested blocks.
//!
//! Block parsing recurses once per nesting level. On native targets the
//! stack is grown on demand with `stacker`; the explicit nesting limit in
//! [`ParseConfig`](crate::ParseConfig) still bounds the depth.

/// Grow the stack if less than this remains.
const RED_ZONE: usize = 100 * 1024;

/// Stack space allocated per growth.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if the remaining space is low.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
