//! Execution errors for Grove GraphQL.

use thiserror::Error;

/// An error produced while executing a query.
///
/// Everything is a human-readable message at this layer; the response
/// envelope serializes the message string and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A query referenced a variable the request did not supply.
    #[error("Missing variable `{0}`")]
    MissingVariable(String),

    /// A non-nullable argument was absent or null.
    #[error("Missing required argument")]
    MissingRequiredArgument,

    /// A scalar argument did not match its declared type.
    #[error("Invalid {0}")]
    InvalidScalar(&'static str),

    /// An enum argument was not written as an enum or string literal.
    #[error("Expected enum")]
    ExpectedEnum,

    /// An enum argument named a value the enum does not declare.
    #[error("Invalid enum value")]
    InvalidEnumValue,

    /// An input-object argument was not written as an object literal.
    #[error("Expected object")]
    ExpectedObject,

    /// The document contains no operation.
    #[error("No operation found")]
    NoOperationFound,

    #[error("Mutation is not implemented")]
    MutationNotImplemented,

    #[error("Subscription is not implemented")]
    SubscriptionNotImplemented,

    /// An error raised by a resolver or a custom scalar, surfaced verbatim.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Wraps an arbitrary message as an execution error.
    pub fn new(message: impl Into<String>) -> Self {
        Error::Custom(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::MissingVariable("m".to_string()).to_string(),
            "Missing variable `m`"
        );
        assert_eq!(Error::InvalidScalar("int").to_string(), "Invalid int");
        assert_eq!(
            Error::MutationNotImplemented.to_string(),
            "Mutation is not implemented"
        );
        assert_eq!(Error::new("boom").to_string(), "boom");
    }
}
