use crate::input::Input;
use crate::signal::Signal;

/// What a derivation body may produce: a plain value, or a signal whose
/// value stands in for it.
///
/// When a body returns a signal, the engine reads through to the inner
/// value and merges the inner signal's input leaves into its own, so the
/// cached result is always a plain value. Only one level of flattening can
/// arise: the cache never holds a signal.
pub enum MaybeSignal<T> {
    Value(T),
    Signal(Signal<T>),
}

/// Conversion into [`MaybeSignal`], implemented for plain values, signals,
/// and inputs. Derivation bodies return any of the three.
pub trait IntoMaybeSignal<T> {
    fn into_maybe_signal(self) -> MaybeSignal<T>;
}

impl<T> IntoMaybeSignal<T> for T {
    fn into_maybe_signal(self) -> MaybeSignal<T> {
        MaybeSignal::Value(self)
    }
}

// Identity, so a body can mix value branches with signal branches.
impl<T> IntoMaybeSignal<T> for MaybeSignal<T> {
    fn into_maybe_signal(self) -> MaybeSignal<T> {
        self
    }
}

impl<T> IntoMaybeSignal<T> for Signal<T> {
    fn into_maybe_signal(self) -> MaybeSignal<T> {
        MaybeSignal::Signal(self)
    }
}

impl<T: Clone + 'static> IntoMaybeSignal<T> for Input<T> {
    fn into_maybe_signal(self) -> MaybeSignal<T> {
        MaybeSignal::Signal(self.signal())
    }
}
