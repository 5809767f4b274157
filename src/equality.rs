use std::rc::Rc;

/// Comparator deciding whether two values of a node are the same.
///
/// Equality drives two decisions: whether a write to an input is a no-op,
/// and whether a recomputed derivation value counts as a change for its
/// readers. Constructors default to `PartialEq`; the `with_equality`
/// variants accept any comparator, which also admits value types that do
/// not implement `PartialEq` at all.
pub type EqualityFn<T> = Rc<dyn Fn(&T, &T) -> bool>;

pub(crate) fn partial_eq<T: PartialEq>() -> EqualityFn<T> {
    Rc::new(|a, b| a == b)
}

/// An equality that never holds: every write and every recomputed value is
/// treated as a change. Useful for value types without meaningful equality.
pub fn never_equal<T>() -> EqualityFn<T> {
    Rc::new(|_, _| false)
}

/// Pointer identity over `Rc`-shared values: two handles are equal only
/// when they point at the same allocation, regardless of contents.
pub fn reference_equal<T>() -> EqualityFn<Rc<T>> {
    Rc::new(|a, b| Rc::ptr_eq(a, b))
}
