//! Argument types and coercion for Grove GraphQL.
//!
//! This module describes the shapes a field accepts (`InputType`,
//! `InputValue`) and converts a parsed query's arguments plus the request
//! variables into the coerced [`Arguments`] a resolver receives.

use crate::error::Error;
use grove_syntax::value::{ConstValue, Value};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// An argument type.
#[derive(Debug, Clone)]
pub enum InputType {
    Scalar(InputScalar),
    Enum(InputEnum),
    Object(InputObject),
    /// A list of the inner type. A single non-list value coerces to a
    /// one-element list.
    List(Box<InputType>),
    /// Removes the implicit nullability of the inner type.
    NonNull(Box<InputType>),
}

impl InputType {
    /// Returns the type name; `None` for list and non-null wrappers.
    pub fn name(&self) -> Option<&str> {
        match self {
            InputType::Scalar(scalar) => Some(&scalar.name),
            InputType::Enum(en) => Some(&en.name),
            InputType::Object(object) => Some(&object.name),
            InputType::List(_) | InputType::NonNull(_) => None,
        }
    }
}

/// A scalar argument type.
#[derive(Clone)]
pub struct InputScalar {
    name: String,
    coerce: Arc<dyn Fn(&ConstValue) -> Result<ConstValue, Error> + Send + Sync>,
}

impl InputScalar {
    pub(crate) fn coerce(&self, value: &ConstValue) -> Result<ConstValue, Error> {
        (self.coerce)(value)
    }
}

impl fmt::Debug for InputScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputScalar").field("name", &self.name).finish()
    }
}

/// An enum argument type: labels paired with the values handed to resolvers.
#[derive(Debug, Clone)]
pub struct InputEnum {
    name: String,
    values: Vec<(String, ConstValue)>,
}

impl InputEnum {
    /// Returns the declared labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(label, _)| label.as_str())
    }

    fn value_of(&self, label: &str) -> Option<&ConstValue> {
        self.values
            .iter()
            .find(|(candidate, _)| candidate == label)
            .map(|(_, value)| value)
    }
}

/// An input-object argument type.
#[derive(Debug, Clone)]
pub struct InputObject {
    name: String,
    fields: Vec<InputValue>,
}

impl InputObject {
    /// Returns the declared fields in order.
    pub fn fields(&self) -> &[InputValue] {
        &self.fields
    }
}

/// A named argument: its type, an optional default and a description.
#[derive(Debug, Clone)]
pub struct InputValue {
    name: String,
    ty: InputType,
    default: Option<ConstValue>,
    description: Option<String>,
}

impl InputValue {
    /// Creates an argument with no default.
    pub fn new(name: impl Into<String>, ty: InputType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            description: None,
        }
    }

    /// Sets the default, applied when coercion yields no value.
    pub fn with_default(mut self, default: impl Into<ConstValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &InputType {
        &self.ty
    }

    pub fn default(&self) -> Option<&ConstValue> {
        self.default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Coerces a supplied value against this argument's type, falling back to
    /// the default when coercion yields nothing.
    pub(crate) fn coerce(&self, value: Option<ConstValue>) -> Result<Option<ConstValue>, Error> {
        let coerced = coerce_input(&self.ty, value)?;
        Ok(coerced.or_else(|| self.default.clone()))
    }
}

/// Creates a scalar argument type with a custom coercion.
pub fn scalar(
    name: impl Into<String>,
    coerce: impl Fn(&ConstValue) -> Result<ConstValue, Error> + Send + Sync + 'static,
) -> InputType {
    InputType::Scalar(InputScalar {
        name: name.into(),
        coerce: Arc::new(coerce),
    })
}

/// Creates an enum argument type from `(label, value)` pairs.
pub fn enum_type<S: Into<String>>(
    name: impl Into<String>,
    values: impl IntoIterator<Item = (S, ConstValue)>,
) -> InputType {
    InputType::Enum(InputEnum {
        name: name.into(),
        values: values
            .into_iter()
            .map(|(label, value)| (label.into(), value))
            .collect(),
    })
}

/// Creates an input-object argument type.
pub fn object(name: impl Into<String>, fields: Vec<InputValue>) -> InputType {
    InputType::Object(InputObject {
        name: name.into(),
        fields,
    })
}

/// Wraps an argument type as a list.
pub fn list(item: InputType) -> InputType {
    InputType::List(Box::new(item))
}

/// Marks an argument type as non-nullable.
pub fn non_null(inner: InputType) -> InputType {
    InputType::NonNull(Box::new(inner))
}

/// The built-in `Int` argument type.
pub fn int() -> InputType {
    scalar("Int", |value| match value {
        ConstValue::Int(n) => Ok(ConstValue::Int(*n)),
        _ => Err(Error::InvalidScalar("int")),
    })
}

/// The built-in `String` argument type.
pub fn string() -> InputType {
    scalar("String", |value| match value {
        ConstValue::String(s) => Ok(ConstValue::String(s.clone())),
        _ => Err(Error::InvalidScalar("string")),
    })
}

/// The built-in `Float` argument type. Integer literals widen to floats.
pub fn float() -> InputType {
    scalar("Float", |value| match value {
        ConstValue::Float(n) => Ok(ConstValue::Float(*n)),
        ConstValue::Int(n) => Ok(ConstValue::Float(*n as f64)),
        _ => Err(Error::InvalidScalar("float")),
    })
}

/// The built-in `Boolean` argument type.
pub fn boolean() -> InputType {
    scalar("Boolean", |value| match value {
        ConstValue::Boolean(b) => Ok(ConstValue::Boolean(*b)),
        _ => Err(Error::InvalidScalar("boolean")),
    })
}

/// The built-in `ID` argument type. Integer literals read as string ids.
pub fn id() -> InputType {
    scalar("ID", |value| match value {
        ConstValue::String(s) => Ok(ConstValue::String(s.clone())),
        ConstValue::Int(n) => Ok(ConstValue::String(n.to_string())),
        _ => Err(Error::InvalidScalar("ID")),
    })
}

/// The variables supplied alongside a query document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables(IndexMap<String, ConstValue>);

impl Variables {
    /// Creates an empty variable map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds variables from a JSON object. Anything but an object yields an
    /// empty map.
    pub fn from_json(value: serde_json::Value) -> Self {
        match ConstValue::from_json(value) {
            ConstValue::Object(fields) => fields.into_iter().collect(),
            _ => Self::default(),
        }
    }

    /// Sets a variable.
    pub fn insert(&mut self, name: impl Into<String>, value: ConstValue) {
        self.0.insert(name.into(), value);
    }

    /// Gets a variable by name.
    pub fn get(&self, name: &str) -> Option<&ConstValue> {
        self.0.get(name)
    }
}

impl FromIterator<(String, ConstValue)> for Variables {
    fn from_iter<I: IntoIterator<Item = (String, ConstValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The coerced arguments handed to a resolver, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Arguments(IndexMap<String, ConstValue>);

impl Arguments {
    /// Gets an argument by name.
    pub fn get(&self, name: &str) -> Option<&ConstValue> {
        self.0.get(name)
    }

    /// Gets an argument deserialized into a concrete type.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.get(name)
            .and_then(|value| serde_json::from_value(value.clone().into()).ok())
    }

    /// Gets a required argument, failing when absent or of the wrong shape.
    pub fn require<T: DeserializeOwned>(&self, name: &str) -> Result<T, Error> {
        let value = self.get(name).ok_or(Error::MissingRequiredArgument)?;
        serde_json::from_value(value.clone().into())
            .map_err(|_| Error::new(format!("Invalid argument `{}`", name)))
    }

    /// Sets an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: ConstValue) {
        self.0.insert(name.into(), value);
    }

    /// Returns true when no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConstValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Substitutes variables in a parsed value, yielding a const value.
pub fn substitute_variables(variables: &Variables, value: &Value) -> Result<ConstValue, Error> {
    match value {
        Value::Variable(name) => variables
            .get(name)
            .cloned()
            .ok_or_else(|| Error::MissingVariable(name.clone())),
        Value::Null => Ok(ConstValue::Null),
        Value::Int(n) => Ok(ConstValue::Int(*n)),
        Value::Float(n) => Ok(ConstValue::Float(*n)),
        Value::String(s) => Ok(ConstValue::String(s.clone())),
        Value::Boolean(b) => Ok(ConstValue::Boolean(*b)),
        Value::Enum(name) => Ok(ConstValue::Enum(name.clone())),
        Value::List(items) => items
            .iter()
            .map(|item| substitute_variables(variables, item))
            .collect::<Result<Vec<_>, _>>()
            .map(ConstValue::List),
        Value::Object(fields) => fields
            .iter()
            .map(|(name, value)| {
                Ok((name.clone(), substitute_variables(variables, value)?))
            })
            .collect::<Result<Vec<_>, Error>>()
            .map(ConstValue::Object),
    }
}

/// Coerces a query's arguments against a field's declared argument list.
///
/// Walks the declarations in order: looks the argument up among the supplied
/// key/value pairs, substitutes variables, coerces against the declared type
/// and applies the default. Arguments that end up absent are omitted from the
/// result.
pub fn coerce_arguments(
    variables: &Variables,
    declared: &[InputValue],
    supplied: &[(String, Value)],
) -> Result<Arguments, Error> {
    let mut args = Arguments::default();
    for declaration in declared {
        let value = supplied
            .iter()
            .find(|(name, _)| name == declaration.name())
            .map(|(_, value)| substitute_variables(variables, value))
            .transpose()?;
        if let Some(coerced) = declaration.coerce(value)? {
            args.insert(declaration.name(), coerced);
        }
    }
    Ok(args)
}

/// Coerces one value against an argument type.
///
/// `Ok(None)` means the argument is legitimately absent; defaults are the
/// caller's concern.
pub fn coerce_input(ty: &InputType, value: Option<ConstValue>) -> Result<Option<ConstValue>, Error> {
    match ty {
        InputType::NonNull(inner) => match value {
            None | Some(ConstValue::Null) => Err(Error::MissingRequiredArgument),
            some => match coerce_input(inner, some)? {
                Some(coerced) => Ok(Some(coerced)),
                None => Err(Error::MissingRequiredArgument),
            },
        },
        _ => match value {
            None | Some(ConstValue::Null) => Ok(None),
            Some(value) => coerce_present(ty, value).map(Some),
        },
    }
}

fn coerce_present(ty: &InputType, value: ConstValue) -> Result<ConstValue, Error> {
    match ty {
        InputType::Scalar(scalar) => scalar.coerce(&value),
        InputType::Enum(en) => match value {
            ConstValue::Enum(label) | ConstValue::String(label) => en
                .value_of(&label)
                .cloned()
                .ok_or(Error::InvalidEnumValue),
            _ => Err(Error::ExpectedEnum),
        },
        InputType::Object(object) => match value {
            ConstValue::Object(props) => {
                coerce_object_fields(object.fields(), &props).map(ConstValue::Object)
            }
            _ => Err(Error::ExpectedObject),
        },
        InputType::List(item) => match value {
            ConstValue::List(values) => {
                let mut coerced = Vec::with_capacity(values.len());
                for value in values {
                    coerced.push(coerce_input(item, Some(value))?.unwrap_or(ConstValue::Null));
                }
                Ok(ConstValue::List(coerced))
            }
            // A single value where a list is expected coerces to a singleton.
            single => Ok(ConstValue::List(vec![
                coerce_input(item, Some(single))?.unwrap_or(ConstValue::Null),
            ])),
        },
        // The value is known present and non-null on this path.
        InputType::NonNull(inner) => coerce_present(inner, value),
    }
}

fn coerce_object_fields(
    declared: &[InputValue],
    props: &[(String, ConstValue)],
) -> Result<Vec<(String, ConstValue)>, Error> {
    let mut fields = Vec::with_capacity(declared.len());
    for declaration in declared {
        let value = props
            .iter()
            .find(|(name, _)| name == declaration.name())
            .map(|(_, value)| value.clone());
        if let Some(coerced) = declaration.coerce(value)? {
            fields.push((declaration.name().to_string(), coerced));
        }
    }
    Ok(fields)
}
