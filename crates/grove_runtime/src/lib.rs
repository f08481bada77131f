//! Execution runtime for Grove GraphQL.
//!
//! This crate turns a parsed query document into a JSON response:
//! - `schema`: output type algebra and schema construction
//! - `arg`: argument types and the coercion engine
//! - `resolver`: resolved values and resolver plumbing
//! - `executor`: fragment collection, field resolution, the response envelope
//! - `error`: the execution error taxonomy
//!
//! The query parser, the transport and the async runtime are the host's:
//! the executor only ever suspends inside resolvers, so it runs on whatever
//! driver the host picks.

pub mod arg;
pub mod error;
pub mod executor;
mod introspection;
pub mod resolver;
pub mod schema;

pub use arg::{
    coerce_arguments, coerce_input, substitute_variables, Arguments, InputType, InputValue,
    Variables,
};
pub use error::Error;
pub use executor::{execute, RequestError, Response};
pub use resolver::{Resolved, Resolver, ResolverFuture, ResolverResult};
pub use schema::{
    boolean, enum_type, field, float, id, int, io_field, list, non_null, object, scalar, schema,
    string, EnumType, EnumValue, Field, ObjectType, ScalarType, Schema, Type,
};
