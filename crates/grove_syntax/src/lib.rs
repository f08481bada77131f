//! Query document syntax for Grove GraphQL.
//!
//! This crate defines what a query parser produces and the execution runtime
//! consumes:
//! - `ast`: documents, operations, selections and fragments
//! - `value`: parsed values, with and without variables

pub mod ast;
pub mod value;

pub use ast::{
    Definition, Document, FieldSelection, FragmentDefinition, FragmentSpread, InlineFragment,
    OperationDefinition, OperationType, Selection,
};
pub use value::{ConstValue, Value};
