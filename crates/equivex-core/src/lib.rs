//! Equivex Core - structural equivalency of object graphs
//!
//! This crate compares two object graphs and reports every place where they
//! differ, including:
//! - A dynamic value model for records, sequences, dictionaries, enums and
//!   shared (possibly cyclic) references, with a serde bridge
//! - A step pipeline with enum, dictionary, collection and member steps
//! - Strict and order-insensitive collection comparison with closest-match
//!   diagnostics
//! - `satisfy` backed by a maximum bipartite matching
//! - An assertion scope that collects failures instead of stopping at the
//!   first one

pub mod assertions;
pub mod collections;
pub mod equivalency;
pub mod errors;
pub mod format;
pub mod logging_facility;
pub mod scope;
pub mod value;

// Used by the logging macros
pub use equivex_core_types;

// Re-export commonly used types
pub use collections::{equal_items, satisfy, satisfy_respectively, Inspector, Predicate};
pub use equivalency::{
    assert_equivalency, assert_equivalent, assert_equivalent_with, check_equivalent,
    check_serialized_equivalent, Comparands, EquivalencyOptions,
};
pub use errors::{EquivexError, ExError, ExErrorKind, Result};
pub use scope::{AssertionFailure, AssertionScope};
pub use value::{
    to_value, Dictionary, EnumValue, Key, ObjectRef, Record, Sequence, SequenceKind, Value,
    ValueType,
};
