use crate::input::Input;
use crate::input_set::InputSet;
use crate::signal::Signal;

/// Anything usable as a source position of a derivation: a [`Signal`] or an
/// [`Input`].
pub trait AsSignal {
    type Value;

    fn as_signal(&self) -> Signal<Self::Value>;
}

impl<T: Clone + 'static> AsSignal for Signal<T> {
    type Value = T;

    fn as_signal(&self) -> Signal<T> {
        self.clone()
    }
}

impl<T: Clone + 'static> AsSignal for Input<T> {
    type Value = T;

    fn as_signal(&self) -> Signal<T> {
        self.signal()
    }
}

#[doc(hidden)]
pub struct PulledSources<V> {
    pub(crate) values: V,
    pub(crate) clocks: Vec<u64>,
    pub(crate) leaves: InputSet,
}

/// A tuple of sources feeding one derivation, arity 1 through 8.
///
/// Pulling the list brings every member up to date in positional order and
/// yields the values, the per-source change clocks, and the union of the
/// members' input leaves. The constructor in this crate is the only
/// implementer; the pull result type cannot be built outside it.
pub trait SourceList: Clone + 'static {
    /// The positional values handed to the derivation body, as a tuple.
    type Values;

    #[doc(hidden)]
    fn pull_sources(&self) -> PulledSources<Self::Values>;
}

macro_rules! impl_source_list {
    ($($source:ident),+) => {
        impl<$($source),+> SourceList for ($($source,)+)
        where
            $($source: AsSignal + Clone + 'static,)+
            $(<$source as AsSignal>::Value: Clone + 'static,)+
        {
            type Values = ($(<$source as AsSignal>::Value,)+);

            #[allow(non_snake_case)]
            fn pull_sources(&self) -> PulledSources<Self::Values> {
                let ($($source,)+) = self;
                $(let $source = $source.as_signal().pull();)+
                let mut clocks = Vec::new();
                $(clocks.push($source.clock);)+
                let mut leaves = InputSet::new();
                $(leaves = leaves.union($source.leaves);)+
                PulledSources {
                    values: ($($source.value,)+),
                    clocks,
                    leaves,
                }
            }
        }
    };
}

impl_source_list!(S1);
impl_source_list!(S1, S2);
impl_source_list!(S1, S2, S3);
impl_source_list!(S1, S2, S3, S4);
impl_source_list!(S1, S2, S3, S4, S5);
impl_source_list!(S1, S2, S3, S4, S5, S6);
impl_source_list!(S1, S2, S3, S4, S5, S6, S7);
impl_source_list!(S1, S2, S3, S4, S5, S6, S7, S8);
