//! Stack growth for the recursive stepper.
//!
//! Every nested `fact` call adds several native frames, so a deep trace can
//! outrun a 2 MB thread stack long before the gas meter stops it. On native
//! targets the stack is grown on demand with `stacker`; WASM manages its own.

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if it is close to running out.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
