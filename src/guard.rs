use std::cell::Cell;

use crate::error::NonReactiveAccess;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum GuardState {
    Ready,
    Computing,
}

thread_local! {
    static STATE: Cell<GuardState> = const { Cell::new(GuardState::Ready) };
    static ENFORCED: Cell<bool> = const { Cell::new(true) };
}

/// Marker held for the duration of one user derivation body. The prior
/// state is restored on drop, which covers every exit path: a normal
/// return, an error surfacing to the caller, and a panic unwinding out of
/// the body.
pub(crate) struct ComputeScope {
    prior: GuardState,
}

pub(crate) fn enter_compute() -> ComputeScope {
    let prior = STATE.with(|state| state.replace(GuardState::Computing));
    ComputeScope { prior }
}

impl Drop for ComputeScope {
    fn drop(&mut self) {
        STATE.with(|state| state.set(self.prior));
    }
}

/// Fails while a derivation body is on the stack. Does not change the
/// state: every access inside the same body keeps failing, and the
/// enclosing `ComputeScope` restores the guard when the body exits.
pub(crate) fn check_access() -> Result<(), NonReactiveAccess> {
    let computing = STATE.with(|state| state.get()) == GuardState::Computing;
    if computing && ENFORCED.with(|enforced| enforced.get()) {
        return Err(NonReactiveAccess);
    }
    Ok(())
}

/// Disable or re-enable reentrancy enforcement on the current thread.
///
/// With enforcement off, `get`/`set` calls made inside a derivation body
/// succeed but are invisible to dependency tracking. Intended for
/// diagnostics only.
pub fn set_guard_enabled(enabled: bool) {
    ENFORCED.with(|enforced| enforced.set(enabled));
}
