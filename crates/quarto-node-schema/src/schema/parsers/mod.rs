//! Schema parser modules
//!
//! One parser per node type family, each paired with the list of
//! type-specific option keys it accepts:
//! - primitive: string, integer, number, boolean, symbol, object
//! - objects: hash
//! - arrays: array
//! - combinators: all_of, any_of, one_of, is_not
//! - ref: reference

pub(super) mod arrays;
pub(super) mod combinators;
pub(super) mod objects;
pub(super) mod primitive;
pub(super) mod r#ref;

pub(super) use arrays::{ARRAY_OPTIONS, parse_array};
pub(super) use combinators::{
    COMBINATION_OPTIONS, parse_all_of, parse_any_of, parse_not, parse_one_of,
};
pub(super) use objects::{HASH_OPTIONS, parse_hash};
pub(super) use primitive::{
    BOOLEAN_OPTIONS, NUMERIC_OPTIONS, OBJECT_OPTIONS, STRING_OPTIONS, parse_boolean,
    parse_integer, parse_number, parse_object, parse_string, parse_symbol,
};
pub(super) use r#ref::{REFERENCE_OPTIONS, parse_reference};
