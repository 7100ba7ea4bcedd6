//! Stack growth for recursive tree walks.
//!
//! Concrete syntax trees mirror every grammar production, so a modest
//! expression nests a dozen nodes deep and a deeply parenthesised one can
//! reach the automaton's stack cap. Walks that recurse over a tree wrap
//! each level in [`with_stack_headroom`] so they cannot overflow the
//! thread's stack.
//!
//! On `wasm32` the wrapper calls the closure directly.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 64 * 1024;

/// Size of each freshly allocated stack segment.
const SEGMENT: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn with_stack_headroom<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

/// Run `f` directly; the wasm runtime owns its stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn with_stack_headroom<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(n: u32) -> u32 {
        with_stack_headroom(|| if n == 0 { 0 } else { 1 + depth(n - 1) })
    }

    #[test]
    fn returns_closure_value() {
        assert_eq!(with_stack_headroom(|| 7), 7);
    }

    #[test]
    fn deep_recursion_completes() {
        assert_eq!(depth(200_000), 200_000);
    }
}
