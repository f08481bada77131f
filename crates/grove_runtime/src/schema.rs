//! Schema definition for Grove GraphQL.
//!
//! A schema is a tree of output types over a host context `Ctx`. Object
//! fields are built lazily so a type can reference itself; the field list is
//! forced at most once and the schema is immutable afterwards.

use crate::arg::{Arguments, InputValue};
use crate::error::Error;
use crate::resolver::{FnResolver, IoResolver, Resolved, Resolver, ResolverFuture, ResolverResult};
use grove_syntax::value::ConstValue;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock};

/// An output type.
pub enum Type<Ctx> {
    Scalar(ScalarType),
    Enum(EnumType),
    Object(ObjectType<Ctx>),
    /// A list of the inner type.
    List(Box<Type<Ctx>>),
    /// Removes the implicit nullability of the inner type.
    NonNull(Box<Type<Ctx>>),
}

impl<Ctx> Type<Ctx> {
    /// Returns the type name; `None` for list and non-null wrappers.
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Scalar(scalar) => Some(scalar.name()),
            Type::Enum(en) => Some(en.name()),
            Type::Object(object) => Some(object.name()),
            Type::List(_) | Type::NonNull(_) => None,
        }
    }
}

impl<Ctx> Clone for Type<Ctx> {
    fn clone(&self) -> Self {
        match self {
            Type::Scalar(scalar) => Type::Scalar(scalar.clone()),
            Type::Enum(en) => Type::Enum(en.clone()),
            Type::Object(object) => Type::Object(object.clone()),
            Type::List(item) => Type::List(item.clone()),
            Type::NonNull(inner) => Type::NonNull(inner.clone()),
        }
    }
}

impl<Ctx> fmt::Debug for Type<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(scalar) => write!(f, "Scalar({})", scalar.name()),
            Type::Enum(en) => write!(f, "Enum({})", en.name()),
            Type::Object(object) => write!(f, "Object({})", object.name()),
            Type::List(item) => write!(f, "List({:?})", item),
            Type::NonNull(inner) => write!(f, "NonNull({:?})", inner),
        }
    }
}

/// A scalar output type: a name and a coercion from resolved values to JSON.
#[derive(Clone)]
pub struct ScalarType {
    name: String,
    coerce: Arc<dyn Fn(&ConstValue) -> Result<serde_json::Value, Error> + Send + Sync>,
}

impl ScalarType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn coerce(&self, value: &ConstValue) -> Result<serde_json::Value, Error> {
        (self.coerce)(value)
    }
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType").field("name", &self.name).finish()
    }
}

/// An enum output type: resolver-side values paired with response labels.
///
/// Value equality is structural, so a resolver selects a label by returning
/// a value equal to the one declared in the pair.
#[derive(Debug, Clone)]
pub struct EnumType {
    name: String,
    values: Vec<EnumValue>,
}

/// One declared enum value.
#[derive(Debug, Clone)]
pub struct EnumValue {
    value: ConstValue,
    name: String,
}

impl EnumValue {
    /// Returns the response label.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl EnumType {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared values in order.
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    pub(crate) fn label_of(&self, value: &ConstValue) -> Option<&str> {
        self.values
            .iter()
            .find(|candidate| candidate.value == *value)
            .map(|candidate| candidate.name.as_str())
    }
}

type FieldsBuilder<Ctx> = Box<dyn FnOnce(&Type<Ctx>) -> Vec<Field<Ctx>> + Send>;

struct ObjectInner<Ctx> {
    name: String,
    fields: OnceLock<Vec<Field<Ctx>>>,
    builder: Mutex<Option<FieldsBuilder<Ctx>>>,
}

/// An object output type with a lazily-built field list.
pub struct ObjectType<Ctx> {
    inner: Arc<ObjectInner<Ctx>>,
}

impl<Ctx> Clone for ObjectType<Ctx> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Ctx> fmt::Debug for ObjectType<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType").field("name", &self.inner.name).finish()
    }
}

impl<Ctx> ObjectType<Ctx> {
    /// Creates an object type. The builder receives the type under
    /// construction so fields can reference it; it runs on first use and
    /// must not force the field list of the type it is building.
    pub fn new<F>(name: impl Into<String>, fields: F) -> Self
    where
        F: FnOnce(&Type<Ctx>) -> Vec<Field<Ctx>> + Send + 'static,
    {
        Self {
            inner: Arc::new(ObjectInner {
                name: name.into(),
                fields: OnceLock::new(),
                builder: Mutex::new(Some(Box::new(fields))),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the field list, building it on first access.
    pub fn fields(&self) -> &[Field<Ctx>] {
        self.inner.fields.get_or_init(|| {
            let builder = self.inner.builder.lock().ok().and_then(|mut slot| slot.take());
            match builder {
                Some(build) => build(&Type::Object(self.clone())),
                None => Vec::new(),
            }
        })
    }

    /// Looks up a field by name; the first declaration wins.
    pub fn field(&self, name: &str) -> Option<&Field<Ctx>> {
        self.fields().iter().find(|field| field.name() == name)
    }
}

/// A field of an object type.
pub struct Field<Ctx> {
    name: String,
    description: Option<String>,
    ty: Type<Ctx>,
    arguments: Vec<InputValue>,
    resolver: Arc<dyn Resolver<Ctx>>,
}

impl<Ctx> Clone for Field<Ctx> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            ty: self.ty.clone(),
            arguments: self.arguments.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<Ctx> fmt::Debug for Field<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish()
    }
}

impl<Ctx> Field<Ctx> {
    /// Creates a field from a resolver implementation.
    pub fn new(
        name: impl Into<String>,
        ty: Type<Ctx>,
        resolver: impl Resolver<Ctx> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            arguments: Vec::new(),
            resolver: Arc::new(resolver),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares an argument.
    pub fn with_argument(mut self, argument: InputValue) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Declares several arguments at once.
    pub fn with_arguments(mut self, arguments: Vec<InputValue>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn ty(&self) -> &Type<Ctx> {
        &self.ty
    }

    pub fn arguments(&self) -> &[InputValue] {
        &self.arguments
    }

    pub(crate) fn resolve<'a>(
        &'a self,
        ctx: &'a Ctx,
        parent: &'a Resolved,
        args: Arguments,
    ) -> ResolverFuture<'a> {
        self.resolver.resolve(ctx, parent, args)
    }
}

/// Creates a field whose resolver returns immediately.
pub fn field<Ctx, F>(name: impl Into<String>, ty: Type<Ctx>, resolver: F) -> Field<Ctx>
where
    F: Fn(&Ctx, &Resolved, Arguments) -> ResolverResult + Send + Sync + 'static,
{
    Field::new(name, ty, FnResolver(resolver))
}

/// Creates a field whose resolver performs asynchronous work.
///
/// The resolver is called with borrowed context and parent and must build its
/// future synchronously, cloning whatever state the future needs.
pub fn io_field<Ctx, F, Fut>(name: impl Into<String>, ty: Type<Ctx>, resolver: F) -> Field<Ctx>
where
    F: Fn(&Ctx, &Resolved, Arguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResolverResult> + Send + 'static,
{
    Field::new(name, ty, IoResolver::new(resolver))
}

/// Creates an object type. The builder receives the type under construction
/// so fields can reference it.
pub fn object<Ctx, F>(name: impl Into<String>, fields: F) -> Type<Ctx>
where
    F: FnOnce(&Type<Ctx>) -> Vec<Field<Ctx>> + Send + 'static,
{
    Type::Object(ObjectType::new(name, fields))
}

/// Creates a scalar output type with a custom coercion.
pub fn scalar<Ctx>(
    name: impl Into<String>,
    coerce: impl Fn(&ConstValue) -> Result<serde_json::Value, Error> + Send + Sync + 'static,
) -> Type<Ctx> {
    Type::Scalar(ScalarType {
        name: name.into(),
        coerce: Arc::new(coerce),
    })
}

/// Creates an enum output type from `(value, label)` pairs.
pub fn enum_type<Ctx, S: Into<String>>(
    name: impl Into<String>,
    values: impl IntoIterator<Item = (ConstValue, S)>,
) -> Type<Ctx> {
    Type::Enum(EnumType {
        name: name.into(),
        values: values
            .into_iter()
            .map(|(value, name)| EnumValue {
                value,
                name: name.into(),
            })
            .collect(),
    })
}

/// Wraps an output type as a list.
pub fn list<Ctx>(item: Type<Ctx>) -> Type<Ctx> {
    Type::List(Box::new(item))
}

/// Marks an output type as non-nullable.
pub fn non_null<Ctx>(inner: Type<Ctx>) -> Type<Ctx> {
    Type::NonNull(Box::new(inner))
}

/// The built-in `String` output type.
pub fn string<Ctx>() -> Type<Ctx> {
    scalar("String", |value| match value {
        ConstValue::String(s) => Ok(serde_json::Value::String(s.clone())),
        _ => Err(Error::InvalidScalar("string")),
    })
}

/// The built-in `Int` output type.
pub fn int<Ctx>() -> Type<Ctx> {
    scalar("Int", |value| match value {
        ConstValue::Int(n) => Ok(serde_json::Value::from(*n)),
        _ => Err(Error::InvalidScalar("int")),
    })
}

/// The built-in `Float` output type. Resolver-side integers widen to floats.
pub fn float<Ctx>() -> Type<Ctx> {
    scalar("Float", |value| match value {
        ConstValue::Float(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .ok_or(Error::InvalidScalar("float")),
        ConstValue::Int(n) => Ok(serde_json::Value::from(*n as f64)),
        _ => Err(Error::InvalidScalar("float")),
    })
}

/// The built-in `Boolean` output type.
pub fn boolean<Ctx>() -> Type<Ctx> {
    scalar("Boolean", |value| match value {
        ConstValue::Boolean(b) => Ok(serde_json::Value::Bool(*b)),
        _ => Err(Error::InvalidScalar("boolean")),
    })
}

/// The built-in `ID` output type. Resolver-side integers read as string ids.
pub fn id<Ctx>() -> Type<Ctx> {
    scalar("ID", |value| match value {
        ConstValue::String(s) => Ok(serde_json::Value::String(s.clone())),
        ConstValue::Int(n) => Ok(serde_json::Value::String(n.to_string())),
        _ => Err(Error::InvalidScalar("ID")),
    })
}

/// A schema: the immutable description of what a server accepts.
pub struct Schema<Ctx> {
    query: ObjectType<Ctx>,
}

impl<Ctx> Clone for Schema<Ctx> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
        }
    }
}

impl<Ctx> fmt::Debug for Schema<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("query", &self.query).finish()
    }
}

impl<Ctx> Schema<Ctx> {
    /// Returns the query root object.
    pub fn query(&self) -> &ObjectType<Ctx> {
        &self.query
    }
}

/// Creates a schema whose query root is named `root` with the given fields.
pub fn schema<Ctx: 'static>(fields: Vec<Field<Ctx>>) -> Schema<Ctx> {
    Schema {
        query: ObjectType::new("root", move |_| fields),
    }
}
