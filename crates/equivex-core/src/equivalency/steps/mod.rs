//! Built-in equivalency steps
//!
//! Tried in this order, more specific before more general:
//!
//! 1. [`ReferenceEqualityStep`] - same handle, or both null
//! 2. [`EqualityComparerStep`] - a configured comparer for the type
//! 3. [`EnumEqualityStep`]
//! 4. [`GenericDictionaryEquivalencyStep`]
//! 5. [`GenericEnumerableEquivalencyStep`]
//! 6. [`SimpleEqualityStep`] - scalars, value-semantic records, non-recursive nodes
//! 7. [`StructuralEqualityStep`] - member by member

mod comparer;
mod dictionary;
mod enumerable;
mod enums;
mod reference;
mod simple;
mod structural;

pub use comparer::EqualityComparerStep;
pub use dictionary::{GenericDictionaryEquivalencyStep, KeyDifference};
pub use enumerable::GenericEnumerableEquivalencyStep;
pub use enums::EnumEqualityStep;
pub use reference::ReferenceEqualityStep;
pub use simple::SimpleEqualityStep;
pub use structural::StructuralEqualityStep;

use super::step::EquivalencyStep;

pub(crate) fn default_plan() -> Vec<Box<dyn EquivalencyStep>> {
    vec![
        Box::new(ReferenceEqualityStep),
        Box::new(EqualityComparerStep),
        Box::new(EnumEqualityStep),
        Box::new(GenericDictionaryEquivalencyStep),
        Box::new(GenericEnumerableEquivalencyStep),
        Box::new(SimpleEqualityStep),
        Box::new(StructuralEqualityStep),
    ]
}
