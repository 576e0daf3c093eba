//! Basic usage example for `PlacementVec`.
//!
//! This example shows how the capacity grows as elements are appended, how positional editing
//! works through the returned cursors and how to walk the sequence in both directions.

use placement_vec::PlacementVec;

fn main() {
    let mut items = PlacementVec::new();

    println!("Created PlacementVec with capacity: {}", items.capacity());

    // Capacity grows geometrically: 2, 2, 5, 5, 5, 9, ...
    for value in 1..=6 {
        items.push(value * 10);
        println!(
            "Pushed {}, len = {}, capacity = {}",
            value * 10,
            items.len(),
            items.capacity()
        );
    }

    // Insertion returns a cursor at the new element.
    let inserted = items.insert(2, 25);
    println!(
        "Inserted {} at index {}, followed by {}",
        *inserted,
        inserted.index(),
        inserted[1]
    );

    // Erasure returns a cursor at the element that followed the removed one.
    let next = items.erase(0);
    println!("Erased the front, the new front is {}", *next);

    println!("Forward: {items:?}");

    let mut reversed = Vec::with_capacity(items.len());
    let mut cursor = items.rbegin();
    while cursor != items.rend() {
        reversed.push(*cursor);
        cursor += 1;
    }
    println!("Reverse: {reversed:?}");

    match items.at(100) {
        Ok(value) => println!("Unexpectedly found {value}"),
        Err(error) => println!("Bounds-checked access failed as expected: {error}"),
    }

    items.resize_value(10, &0);
    println!("Resized to 10: {items:?}");

    items.truncate(3);
    items.shrink_to_fit();
    println!(
        "Truncated and shrunk: {items:?}, capacity = {}",
        items.capacity()
    );
}
