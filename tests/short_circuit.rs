use std::cell::Cell;
use std::rc::Rc;

use pull_signals::{input, never_equal, reference_equal, Input};

#[test]
fn unchanged_parity_skips_the_label() {
    let runs = Rc::new(Cell::new(0));

    let x = input(0);
    let parity = x.read(|n| n % 2 == 0);
    let counter = runs.clone();
    let label = parity.read(move |p| {
        counter.set(counter.get() + 1);
        if p {
            "even"
        } else {
            "odd"
        }
    });

    assert_eq!(label.get(), "even");
    assert_eq!(runs.get(), 1);

    // 0 -> 2 changes the input but not the parity; the label body must not
    // run again.
    x.set(2);
    assert_eq!(label.get(), "even");
    assert_eq!(runs.get(), 1);

    x.set(1);
    assert_eq!(label.get(), "odd");
    assert_eq!(runs.get(), 2);
}

// A three-deep chain where the first derivation ignores its input value:
// a write re-runs only the first stage, and the equal result backdates the
// rest of the chain.
#[test]
fn cascade_stops_at_the_first_unchanged_stage() {
    let runs = Rc::new(Cell::new(0));

    let base = input(5u32);
    let five_counter = runs.clone();
    let five = base.read(move |_| {
        five_counter.set(five_counter.get() + 1);
        5u32
    });
    let six_counter = runs.clone();
    let six = five.read(move |v| {
        six_counter.set(six_counter.get() + 1);
        v + 1
    });
    let seven_counter = runs.clone();
    let seven = six.read(move |v| {
        seven_counter.set(seven_counter.get() + 1);
        v + 1
    });

    assert_eq!(seven.get(), 7);
    assert_eq!(runs.get(), 3);

    // Re-read without writes: no body runs.
    assert_eq!(seven.get(), 7);
    assert_eq!(runs.get(), 3);

    // The write re-runs only the first stage; its value is unchanged, so
    // the rest of the chain is verified without running.
    base.set(15);
    assert_eq!(seven.get(), 7);
    assert_eq!(runs.get(), 4);
}

#[test]
fn custom_equality_decides_write_no_ops() {
    let runs = Rc::new(Cell::new(0));

    // Values are compared by their last digit.
    let a = Input::with_equality(3i64, Rc::new(|a: &i64, b: &i64| a % 10 == b % 10));
    let counter = runs.clone();
    let d = a.read(move |v| {
        counter.set(counter.get() + 1);
        v
    });

    assert_eq!(d.get(), 3);
    assert_eq!(runs.get(), 1);

    // 13 is "equal" to 3 under this comparator; the write is dropped.
    a.set(13);
    assert_eq!(d.get(), 3);
    assert_eq!(runs.get(), 1);

    a.set(24);
    assert_eq!(d.get(), 24);
    assert_eq!(runs.get(), 2);
}

#[test]
fn never_equal_always_propagates() {
    let runs = Rc::new(Cell::new(0));

    let a = Input::with_equality(1, never_equal());
    let counter = runs.clone();
    let d = a.read(move |v| {
        counter.set(counter.get() + 1);
        v
    });

    assert_eq!(d.get(), 1);
    assert_eq!(runs.get(), 1);

    // Writing the same value still counts as a change.
    a.set(1);
    assert_eq!(d.get(), 1);
    assert_eq!(runs.get(), 2);
}

#[test]
fn reference_equality_compares_allocations_not_contents() {
    let runs = Rc::new(Cell::new(0));

    let first = Rc::new(String::from("value"));
    let a = Input::with_equality(first.clone(), reference_equal());
    let counter = runs.clone();
    let d = a.read_with(
        move |v| {
            counter.set(counter.get() + 1);
            v
        },
        reference_equal(),
    );

    assert!(Rc::ptr_eq(&d.get(), &first));
    assert_eq!(runs.get(), 1);

    // Writing the same allocation back is a no-op.
    a.set(first.clone());
    assert_eq!(runs.get(), 1);
    assert!(Rc::ptr_eq(&d.get(), &first));
    assert_eq!(runs.get(), 1);

    // An equal string in a fresh allocation counts as a change.
    let second = Rc::new(String::from("value"));
    a.set(second.clone());
    assert!(Rc::ptr_eq(&d.get(), &second));
    assert_eq!(runs.get(), 2);
}

#[test]
fn custom_equality_on_a_derivation_backdates_readers() {
    let runs = Rc::new(Cell::new(0));

    let a = input(1i32);
    // Buckets of ten: 1 and 9 are the same, 9 and 10 are not.
    let bucket = a.read_with(|v| v, Rc::new(|a: &i32, b: &i32| a / 10 == b / 10));
    let counter = runs.clone();
    let watcher = bucket.read(move |v| {
        counter.set(counter.get() + 1);
        v
    });

    assert_eq!(watcher.get(), 1);
    assert_eq!(runs.get(), 1);

    a.set(9);
    assert_eq!(watcher.get(), 1);
    assert_eq!(runs.get(), 1);

    a.set(10);
    assert_eq!(watcher.get(), 10);
    assert_eq!(runs.get(), 2);
}
