//! Assertion helpers built on top of `ensure_as`.

use stack_errors::{ErrorVariant, Result, ensure_as, namespace_error};
use std::fmt::Debug;

namespace_error! {
    pub struct CheckError("CHK");
}

/// Fail with `V` unless `actual == expected`.
fn ensure_equal<V, T>(actual: &T, expected: &T, code: u32) -> std::result::Result<(), V>
where
    V: ErrorVariant,
    T: PartialEq + Debug,
{
    stack_errors::ensure_as::<V>(
        actual == expected,
        code,
        format!("Expected {:?} to equal {:?}", actual, expected),
    )
}

/// Fail with `V` when `actual == unexpected`.
fn ensure_not_equal<V, T>(actual: &T, unexpected: &T, code: u32) -> std::result::Result<(), V>
where
    V: ErrorVariant,
    T: PartialEq + Debug,
{
    stack_errors::ensure_as::<V>(
        actual != unexpected,
        code,
        format!("Expected {:?} to differ from {:?}", actual, unexpected),
    )
}

fn check_order(order_id: u64, quantity: u32) -> Result<()> {
    ensure_not_equal::<CheckError, _>(&order_id, &0, 1)?;
    ensure_equal::<CheckError, _>(&(quantity % 2), &0, 2)?;
    ensure_as!(quantity <= 100, CheckError, 3, "Quantity above limit");
    Ok(())
}

fn main() {
    println!("--- Custom Assertions Example ---\n");

    for (order_id, quantity) in [(7, 10), (0, 10), (7, 3), (7, 200)] {
        match check_order(order_id, quantity) {
            Ok(()) => println!("order {} x{}: accepted", order_id, quantity),
            Err(err) => {
                let kind = if CheckError::matches(&err) { "check" } else { "other" };
                println!("order {} x{}: rejected ({}) {}", order_id, quantity, kind, err);
            }
        }
    }
}
