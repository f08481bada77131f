//! Field resolvers and resolved values for Grove GraphQL.
//!
//! Resolvers produce [`Resolved`] values; the executor then presents a
//! resolved value through the field's declared output type to obtain JSON.

use crate::arg::Arguments;
use crate::error::Error;
use grove_syntax::value::ConstValue;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

/// A value produced by a field resolver.
///
/// Scalar and enum fields consume the `Value` arm; object fields accept any
/// arm as the parent source for their child resolvers, with `Object` carrying
/// an opaque host value that children downcast.
#[derive(Clone)]
pub enum Resolved {
    /// Absent value; nullable positions present it as JSON `null`.
    Null,
    /// A plain value.
    Value(ConstValue),
    /// A list of resolved values, one per element of a list field.
    List(Vec<Resolved>),
    /// An opaque host object.
    Object(Arc<dyn Any + Send + Sync>),
}

impl Resolved {
    /// Wraps a host value as an opaque object source.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Resolved::Object(Arc::new(value))
    }

    /// Builds a list from anything convertible to resolved values.
    pub fn list(items: impl IntoIterator<Item = Resolved>) -> Self {
        Resolved::List(items.into_iter().collect())
    }

    /// Returns true for `Resolved::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Resolved::Null)
    }

    /// Returns the plain value, if this is the `Value` arm.
    pub fn value(&self) -> Option<&ConstValue> {
        match self {
            Resolved::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Downcasts an opaque object source to a concrete host type.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        match self {
            Resolved::Object(any) => any.downcast_ref(),
            _ => None,
        }
    }

    /// Looks up a property on a plain object value.
    pub fn get(&self, name: &str) -> Option<&ConstValue> {
        match self {
            Resolved::Value(ConstValue::Object(fields)) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Null => f.write_str("Null"),
            Resolved::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Resolved::List(items) => f.debug_tuple("List").field(items).finish(),
            Resolved::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl From<ConstValue> for Resolved {
    fn from(value: ConstValue) -> Self {
        Resolved::Value(value)
    }
}

impl From<i64> for Resolved {
    fn from(value: i64) -> Self {
        Resolved::Value(ConstValue::Int(value))
    }
}

impl From<f64> for Resolved {
    fn from(value: f64) -> Self {
        Resolved::Value(ConstValue::Float(value))
    }
}

impl From<bool> for Resolved {
    fn from(value: bool) -> Self {
        Resolved::Value(ConstValue::Boolean(value))
    }
}

impl From<&str> for Resolved {
    fn from(value: &str) -> Self {
        Resolved::Value(ConstValue::String(value.to_string()))
    }
}

impl From<String> for Resolved {
    fn from(value: String) -> Self {
        Resolved::Value(ConstValue::String(value))
    }
}

impl<T: Into<Resolved>> From<Option<T>> for Resolved {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Resolved::Null)
    }
}

impl<T: Into<Resolved>> From<Vec<T>> for Resolved {
    fn from(items: Vec<T>) -> Self {
        Resolved::List(items.into_iter().map(Into::into).collect())
    }
}

/// Result type for resolvers.
pub type ResolverResult = Result<Resolved, Error>;

/// Future type for resolvers.
pub type ResolverFuture<'a> = Pin<Box<dyn Future<Output = ResolverResult> + Send + 'a>>;

/// Trait for field resolvers.
///
/// `ctx` is the per-request host context, `parent` the resolved value of the
/// enclosing object, and `args` the coerced arguments of this field.
pub trait Resolver<Ctx>: Send + Sync {
    /// Resolves a field value.
    fn resolve<'a>(&'a self, ctx: &'a Ctx, parent: &'a Resolved, args: Arguments)
        -> ResolverFuture<'a>;
}

/// A wrapper for synchronous resolver functions.
pub(crate) struct FnResolver<F>(pub(crate) F);

impl<Ctx, F> Resolver<Ctx> for FnResolver<F>
where
    F: Fn(&Ctx, &Resolved, Arguments) -> ResolverResult + Send + Sync,
{
    fn resolve<'a>(
        &'a self,
        ctx: &'a Ctx,
        parent: &'a Resolved,
        args: Arguments,
    ) -> ResolverFuture<'a> {
        let result = (self.0)(ctx, parent, args);
        Box::pin(std::future::ready(result))
    }
}

/// A wrapper for resolver functions returning a future.
///
/// The function is called with the borrows and builds its future
/// synchronously; state the future needs past that point must be cloned in.
pub(crate) struct IoResolver<F, Fut> {
    func: F,
    _marker: PhantomData<fn() -> Fut>,
}

impl<F, Fut> IoResolver<F, Fut> {
    pub(crate) fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<Ctx, F, Fut> Resolver<Ctx> for IoResolver<F, Fut>
where
    F: Fn(&Ctx, &Resolved, Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = ResolverResult> + Send + 'static,
{
    fn resolve<'a>(
        &'a self,
        ctx: &'a Ctx,
        parent: &'a Resolved,
        args: Arguments,
    ) -> ResolverFuture<'a> {
        Box::pin((self.func)(ctx, parent, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(Resolved::from(7).value(), Some(&ConstValue::Int(7)));
        assert_eq!(
            Resolved::from("hi").value(),
            Some(&ConstValue::String("hi".to_string()))
        );
        assert!(Resolved::from(None::<ConstValue>).is_null());
        assert!(matches!(
            Resolved::from(vec![1i64, 2, 3]),
            Resolved::List(ref items) if items.len() == 3
        ));
    }

    #[test]
    fn test_downcast() {
        struct Session {
            user_id: u64,
        }

        let resolved = Resolved::object(Session { user_id: 42 });
        assert_eq!(resolved.downcast_ref::<Session>().unwrap().user_id, 42);
        assert!(resolved.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_get_on_plain_object() {
        let resolved = Resolved::Value(ConstValue::Object(vec![
            ("id".to_string(), ConstValue::from("7")),
            ("name".to_string(), ConstValue::from("A")),
        ]));

        assert_eq!(resolved.get("name"), Some(&ConstValue::from("A")));
        assert_eq!(resolved.get("missing"), None);
    }

    #[tokio::test]
    async fn test_fn_resolver() {
        let resolver = FnResolver(|_ctx: &(), _parent: &Resolved, args: Arguments| {
            let id: i64 = args.require("id")?;
            Ok(Resolved::from(id * 2))
        });

        let mut args = Arguments::default();
        args.insert("id", ConstValue::Int(21));
        let result = resolver.resolve(&(), &Resolved::Null, args).await.unwrap();
        assert_eq!(result.value(), Some(&ConstValue::Int(42)));
    }

    #[tokio::test]
    async fn test_io_resolver() {
        let resolver = IoResolver::new(|_ctx: &(), _parent: &Resolved, args: Arguments| {
            let name: Option<String> = args.get_as("name");
            async move { Ok(Resolved::from(name)) }
        });

        let mut args = Arguments::default();
        args.insert("name", ConstValue::from("grove"));
        let result = resolver.resolve(&(), &Resolved::Null, args).await.unwrap();
        assert_eq!(result.value(), Some(&ConstValue::from("grove")));
    }
}
