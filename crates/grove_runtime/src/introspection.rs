//! Introspection meta-schema for Grove GraphQL.
//!
//! The meta-schema (`__Schema`, `__Type`, `__Field`, ...) is expressed with
//! the same constructors user schemas use, resolved over erased wrappers so
//! output and argument types project through one `__Type` shape. The
//! executor injects a synthetic `__schema` field into a copy of the query
//! root before every execution.

use crate::arg::{self, InputType, InputValue};
use crate::error::Error;
use crate::resolver::Resolved;
use crate::schema::{
    boolean, enum_type, field, list, non_null, object, string, ObjectType, Schema, Type,
};
use grove_syntax::value::ConstValue;
use rustc_hash::FxHashSet;
use std::any::Any;
use std::sync::Arc;

/// An output or argument type, projected as one `__Type`.
enum AnyType<Ctx> {
    Output(Type<Ctx>),
    Input(InputType),
}

impl<Ctx> AnyType<Ctx> {
    fn name(&self) -> Option<&str> {
        match self {
            AnyType::Output(ty) => ty.name(),
            AnyType::Input(ty) => ty.name(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AnyType::Output(Type::Scalar(_)) => "SCALAR",
            AnyType::Output(Type::Enum(_)) => "ENUM",
            AnyType::Output(Type::Object(_)) => "OBJECT",
            AnyType::Output(Type::List(_)) => "LIST",
            AnyType::Output(Type::NonNull(_)) => "NON_NULL",
            AnyType::Input(InputType::Scalar(_)) => "SCALAR",
            AnyType::Input(InputType::Enum(_)) => "ENUM",
            AnyType::Input(InputType::Object(_)) => "INPUT_OBJECT",
            AnyType::Input(InputType::List(_)) => "LIST",
            AnyType::Input(InputType::NonNull(_)) => "NON_NULL",
        }
    }
}

/// An output field or an input field, projected as one `__Field`.
enum AnyField<Ctx> {
    Output(crate::schema::Field<Ctx>),
    Input(InputValue),
}

impl<Ctx> AnyField<Ctx> {
    fn name(&self) -> &str {
        match self {
            AnyField::Output(field) => field.name(),
            AnyField::Input(value) => value.name(),
        }
    }

    fn description(&self) -> Option<&str> {
        match self {
            AnyField::Output(field) => field.description(),
            AnyField::Input(value) => value.description(),
        }
    }
}

/// What `__schema` resolves to: the user's query root plus the meta-schema
/// type it is presented through.
struct SchemaSnapshot<Ctx> {
    query: Type<Ctx>,
    meta: Type<Ctx>,
}

fn downcast<'a, T: Any + Send + Sync>(src: &'a Resolved) -> Result<&'a T, Error> {
    src.downcast_ref()
        .ok_or_else(|| Error::new("Invalid introspection source"))
}

/// Copies the schema's query root and appends the synthetic
/// `__schema: __Schema!` field.
pub(crate) fn augment_query_root<Ctx>(schema: &Schema<Ctx>) -> ObjectType<Ctx>
where
    Ctx: Send + Sync + 'static,
{
    let base = schema.query().clone();
    let name = base.name().to_string();
    ObjectType::new(name, move |_| {
        let meta = schema_type::<Ctx>();
        let snapshot = Arc::new(SchemaSnapshot {
            query: Type::Object(base.clone()),
            meta: meta.clone(),
        });
        let mut fields = base.fields().to_vec();
        fields.push(field("__schema", non_null(meta), move |_ctx, _src, _args| {
            Ok(Resolved::Object(snapshot.clone()))
        }));
        fields
    })
}

/// The `__Schema` type.
fn schema_type<Ctx>() -> Type<Ctx>
where
    Ctx: Send + Sync + 'static,
{
    object("__Schema", |_| {
        let ty = type_type::<Ctx>();
        vec![
            field(
                "types",
                non_null(list(non_null(ty.clone()))),
                |_ctx, src, _args| {
                    let snapshot = downcast::<SchemaSnapshot<Ctx>>(src)?;
                    let mut types = Vec::new();
                    let mut seen = FxHashSet::default();
                    collect_types(&snapshot.query, &mut types, &mut seen);
                    collect_types(&snapshot.meta, &mut types, &mut seen);
                    Ok(Resolved::List(types))
                },
            ),
            field("queryType", non_null(ty.clone()), |_ctx, src, _args| {
                let snapshot = downcast::<SchemaSnapshot<Ctx>>(src)?;
                Ok(Resolved::object(AnyType::Output(snapshot.query.clone())))
            }),
            field("mutationType", ty.clone(), |_ctx, _src, _args| {
                Ok(Resolved::Null)
            }),
            field("subscriptionType", ty.clone(), |_ctx, _src, _args| {
                Ok(Resolved::Null)
            }),
            // Custom directives are unsupported; the list is always empty.
            field(
                "directives",
                non_null(list(non_null(directive_type(ty)))),
                |_ctx, _src, _args| Ok(Resolved::List(Vec::new())),
            ),
        ]
    })
}

/// The `__Type` type, self-referential through the lazy field builder.
fn type_type<Ctx>() -> Type<Ctx>
where
    Ctx: Send + Sync + 'static,
{
    object("__Type", |ty| {
        let field_ty = field_type(ty.clone());
        let input_value_ty = input_value_type(ty.clone());
        let enum_value_ty = enum_value_type();
        vec![
            field("kind", non_null(type_kind_type()), |_ctx, src, _args| {
                Ok(Resolved::from(downcast::<AnyType<Ctx>>(src)?.kind()))
            }),
            field("name", string(), |_ctx, src, _args| {
                Ok(downcast::<AnyType<Ctx>>(src)?
                    .name()
                    .map(str::to_string)
                    .into())
            }),
            field("description", string(), |_ctx, _src, _args| {
                Ok(Resolved::Null)
            }),
            field(
                "fields",
                list(non_null(field_ty)),
                |_ctx, src, _args| match downcast::<AnyType<Ctx>>(src)? {
                    AnyType::Output(Type::Object(object)) => Ok(Resolved::List(
                        object
                            .fields()
                            .iter()
                            .map(|f| Resolved::object(AnyField::Output(f.clone())))
                            .collect(),
                    )),
                    AnyType::Input(InputType::Object(input)) => Ok(Resolved::List(
                        input
                            .fields()
                            .iter()
                            .map(|f| Resolved::object(AnyField::<Ctx>::Input(f.clone())))
                            .collect(),
                    )),
                    _ => Ok(Resolved::Null),
                },
            )
            .with_argument(
                InputValue::new("includeDeprecated", arg::boolean()).with_default(false),
            ),
            field(
                "interfaces",
                list(non_null(ty.clone())),
                |_ctx, src, _args| match downcast::<AnyType<Ctx>>(src)? {
                    AnyType::Output(Type::Object(_)) => Ok(Resolved::List(Vec::new())),
                    _ => Ok(Resolved::Null),
                },
            ),
            field("possibleTypes", list(non_null(ty.clone())), |_ctx, _src, _args| {
                Ok(Resolved::Null)
            }),
            field(
                "enumValues",
                list(non_null(enum_value_ty)),
                |_ctx, src, _args| match downcast::<AnyType<Ctx>>(src)? {
                    AnyType::Output(Type::Enum(en)) => Ok(Resolved::List(
                        en.values()
                            .iter()
                            .map(|value| Resolved::from(value.name().to_string()))
                            .collect(),
                    )),
                    AnyType::Input(InputType::Enum(en)) => Ok(Resolved::List(
                        en.labels()
                            .map(|label| Resolved::from(label.to_string()))
                            .collect(),
                    )),
                    _ => Ok(Resolved::Null),
                },
            )
            .with_argument(
                InputValue::new("includeDeprecated", arg::boolean()).with_default(false),
            ),
            field(
                "inputFields",
                list(non_null(input_value_ty)),
                |_ctx, src, _args| match downcast::<AnyType<Ctx>>(src)? {
                    AnyType::Input(InputType::Object(input)) => Ok(Resolved::List(
                        input
                            .fields()
                            .iter()
                            .map(|f| Resolved::object(f.clone()))
                            .collect(),
                    )),
                    _ => Ok(Resolved::Null),
                },
            ),
            field(
                "ofType",
                ty.clone(),
                |_ctx, src, _args| match downcast::<AnyType<Ctx>>(src)? {
                    AnyType::Output(Type::List(item)) => {
                        Ok(Resolved::object(AnyType::Output((**item).clone())))
                    }
                    AnyType::Output(Type::NonNull(inner)) => {
                        Ok(Resolved::object(AnyType::Output((**inner).clone())))
                    }
                    AnyType::Input(InputType::List(item)) => {
                        Ok(Resolved::object(AnyType::<Ctx>::Input((**item).clone())))
                    }
                    AnyType::Input(InputType::NonNull(inner)) => {
                        Ok(Resolved::object(AnyType::<Ctx>::Input((**inner).clone())))
                    }
                    _ => Ok(Resolved::Null),
                },
            ),
        ]
    })
}

/// The `__Field` type.
fn field_type<Ctx>(ty: Type<Ctx>) -> Type<Ctx>
where
    Ctx: Send + Sync + 'static,
{
    object("__Field", move |_| {
        let input_value_ty = input_value_type(ty.clone());
        vec![
            field("name", non_null(string()), |_ctx, src, _args| {
                Ok(Resolved::from(downcast::<AnyField<Ctx>>(src)?.name().to_string()))
            }),
            field("description", string(), |_ctx, src, _args| {
                Ok(downcast::<AnyField<Ctx>>(src)?
                    .description()
                    .map(str::to_string)
                    .into())
            }),
            field(
                "args",
                non_null(list(non_null(input_value_ty))),
                |_ctx, src, _args| match downcast::<AnyField<Ctx>>(src)? {
                    AnyField::Output(f) => Ok(Resolved::List(
                        f.arguments()
                            .iter()
                            .map(|argument| Resolved::object(argument.clone()))
                            .collect(),
                    )),
                    AnyField::Input(_) => Ok(Resolved::List(Vec::new())),
                },
            ),
            field(
                "type",
                non_null(ty.clone()),
                |_ctx, src, _args| match downcast::<AnyField<Ctx>>(src)? {
                    AnyField::Output(f) => Ok(Resolved::object(AnyType::Output(f.ty().clone()))),
                    AnyField::Input(value) => {
                        Ok(Resolved::object(AnyType::<Ctx>::Input(value.ty().clone())))
                    }
                },
            ),
            field("isDeprecated", non_null(boolean()), |_ctx, _src, _args| {
                Ok(Resolved::from(false))
            }),
            field("deprecationReason", string(), |_ctx, _src, _args| {
                Ok(Resolved::Null)
            }),
        ]
    })
}

/// The `__InputValue` type, resolved over input argument declarations.
fn input_value_type<Ctx>(ty: Type<Ctx>) -> Type<Ctx>
where
    Ctx: Send + Sync + 'static,
{
    object("__InputValue", move |_| {
        vec![
            field("name", non_null(string()), |_ctx, src, _args| {
                Ok(Resolved::from(downcast::<InputValue>(src)?.name().to_string()))
            }),
            field("description", string(), |_ctx, src, _args| {
                Ok(downcast::<InputValue>(src)?
                    .description()
                    .map(str::to_string)
                    .into())
            }),
            field("type", non_null(ty.clone()), |_ctx, src, _args| {
                Ok(Resolved::object(AnyType::<Ctx>::Input(
                    downcast::<InputValue>(src)?.ty().clone(),
                )))
            }),
            field("defaultValue", string(), |_ctx, src, _args| {
                Ok(downcast::<InputValue>(src)?
                    .default()
                    .map(|value| value.to_string())
                    .into())
            }),
        ]
    })
}

/// The `__EnumValue` type, resolved over bare labels.
fn enum_value_type<Ctx>() -> Type<Ctx>
where
    Ctx: Send + Sync + 'static,
{
    object("__EnumValue", |_| {
        vec![
            field("name", non_null(string()), |_ctx, src, _args| {
                Ok(src.value().cloned().into())
            }),
            field("description", string(), |_ctx, _src, _args| Ok(Resolved::Null)),
            field("isDeprecated", non_null(boolean()), |_ctx, _src, _args| {
                Ok(Resolved::from(false))
            }),
            field("deprecationReason", string(), |_ctx, _src, _args| {
                Ok(Resolved::Null)
            }),
        ]
    })
}

/// The `__Directive` type. Declared for the type graph; with no custom
/// directives its resolvers only ever serve an empty list.
fn directive_type<Ctx>(ty: Type<Ctx>) -> Type<Ctx>
where
    Ctx: Send + Sync + 'static,
{
    object("__Directive", move |_| {
        let input_value_ty = input_value_type(ty.clone());
        vec![
            field("name", non_null(string()), |_ctx, src, _args| {
                Ok(src.value().cloned().into())
            }),
            field("description", string(), |_ctx, _src, _args| Ok(Resolved::Null)),
            field(
                "locations",
                non_null(list(non_null(directive_location_type()))),
                |_ctx, _src, _args| Ok(Resolved::List(Vec::new())),
            ),
            field(
                "args",
                non_null(list(non_null(input_value_ty))),
                |_ctx, _src, _args| Ok(Resolved::List(Vec::new())),
            ),
        ]
    })
}

/// The `__TypeKind` enum.
fn type_kind_type<Ctx>() -> Type<Ctx> {
    let kinds = [
        "SCALAR",
        "OBJECT",
        "INTERFACE",
        "UNION",
        "ENUM",
        "INPUT_OBJECT",
        "LIST",
        "NON_NULL",
    ];
    enum_type(
        "__TypeKind",
        kinds.into_iter().map(|kind| (ConstValue::from(kind), kind)),
    )
}

/// The `__DirectiveLocation` enum.
fn directive_location_type<Ctx>() -> Type<Ctx> {
    let locations = [
        "QUERY",
        "MUTATION",
        "SUBSCRIPTION",
        "FIELD",
        "FRAGMENT_DEFINITION",
        "FRAGMENT_SPREAD",
        "INLINE_FRAGMENT",
    ];
    enum_type(
        "__DirectiveLocation",
        locations
            .into_iter()
            .map(|location| (ConstValue::from(location), location)),
    )
}

/// Walks the type graph depth-first, wrapping each named type once.
fn collect_types<Ctx>(ty: &Type<Ctx>, types: &mut Vec<Resolved>, seen: &mut FxHashSet<String>)
where
    Ctx: Send + Sync + 'static,
{
    match ty {
        Type::List(item) => collect_types(item, types, seen),
        Type::NonNull(inner) => collect_types(inner, types, seen),
        named => {
            let Some(name) = named.name() else { return };
            if !seen.insert(name.to_string()) {
                return;
            }
            types.push(Resolved::object(AnyType::Output(named.clone())));
            if let Type::Object(object) = named {
                for field in object.fields() {
                    collect_types(field.ty(), types, seen);
                    for argument in field.arguments() {
                        collect_input_types::<Ctx>(argument.ty(), types, seen);
                    }
                }
            }
        }
    }
}

fn collect_input_types<Ctx>(ty: &InputType, types: &mut Vec<Resolved>, seen: &mut FxHashSet<String>)
where
    Ctx: Send + Sync + 'static,
{
    match ty {
        InputType::List(item) => collect_input_types::<Ctx>(item, types, seen),
        InputType::NonNull(inner) => collect_input_types::<Ctx>(inner, types, seen),
        named => {
            let Some(name) = named.name() else { return };
            if !seen.insert(name.to_string()) {
                return;
            }
            types.push(Resolved::object(AnyType::<Ctx>::Input(named.clone())));
            if let InputType::Object(object) = named {
                for field in object.fields() {
                    collect_input_types::<Ctx>(field.ty(), types, seen);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{field, id, int, schema, Field};

    fn sample_schema() -> Schema<()> {
        let user = object("User", |user| {
            vec![
                field("id", non_null(id()), |_, _, _| Ok(Resolved::Null)),
                field("friends", list(user.clone()), |_, _, _| Ok(Resolved::Null)),
            ]
        });
        schema(vec![
            field("me", user, |_, _, _| Ok(Resolved::Null)),
            field("count", int(), |_, _, _| Ok(Resolved::Null)).with_argument(
                InputValue::new(
                    "filter",
                    arg::object("Filter", vec![InputValue::new("q", arg::string())]),
                ),
            ),
        ])
    }

    fn collected_names(ty: &Type<()>) -> Vec<String> {
        let mut types = Vec::new();
        let mut seen = FxHashSet::default();
        collect_types(ty, &mut types, &mut seen);
        types
            .iter()
            .map(|resolved| {
                downcast::<AnyType<()>>(resolved)
                    .unwrap()
                    .name()
                    .unwrap()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_traversal_visits_each_named_type_once() {
        let schema = sample_schema();
        let names = collected_names(&Type::Object(schema.query().clone()));

        assert_eq!(names, ["root", "User", "ID", "Int", "Filter", "String"]);
    }

    #[test]
    fn test_traversal_covers_meta_schema() {
        let names = collected_names(&schema_type::<()>());

        for expected in [
            "__Schema",
            "__Type",
            "__TypeKind",
            "__Field",
            "__InputValue",
            "__EnumValue",
            "__Directive",
            "__DirectiveLocation",
        ] {
            assert!(names.iter().any(|name| name == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_kind_branch() {
        assert_eq!(AnyType::<()>::Output(int()).kind(), "SCALAR");
        assert_eq!(AnyType::<()>::Output(non_null(int())).kind(), "NON_NULL");
        assert_eq!(
            AnyType::<()>::Input(arg::object("Filter", Vec::new())).kind(),
            "INPUT_OBJECT"
        );
        assert_eq!(AnyType::<()>::Input(arg::list(arg::int())).kind(), "LIST");
    }

    #[test]
    fn test_augmented_root_keeps_base_fields() {
        let root = augment_query_root(&sample_schema());

        assert_eq!(root.name(), "root");
        let names: Vec<&str> = root.fields().iter().map(Field::name).collect();
        assert_eq!(names, ["me", "count", "__schema"]);
    }
}
