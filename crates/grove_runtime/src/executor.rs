//! Query execution for Grove GraphQL.
//!
//! The executor flattens fragments against the current object type, drives
//! resolvers concurrently, and folds the resolved values into a JSON
//! response envelope. Siblings and list elements resolve in parallel;
//! response keys keep selection order.

use crate::arg::{coerce_arguments, Variables};
use crate::error::Error;
use crate::introspection;
use crate::resolver::Resolved;
use crate::schema::{ObjectType, Schema, Type};
use futures::future::{join_all, BoxFuture};
use grove_syntax::ast::{
    Definition, Document, FieldSelection, FragmentDefinition, OperationDefinition, OperationType,
    Selection,
};
use grove_syntax::value::ConstValue;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// A query response.
///
/// Serializes as `{"data": ...}` on success and
/// `{"errors": [{"message": ...}]}` on failure, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The resolved data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// The errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<RequestError>>,
}

/// A single error in the response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestError {
    /// The error message.
    pub message: String,
}

impl Response {
    /// Creates a success response.
    pub fn data(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    /// Creates a failure response carrying a single error.
    pub fn error(error: Error) -> Self {
        Self {
            data: None,
            errors: Some(vec![RequestError {
                message: error.to_string(),
            }]),
        }
    }

    /// Returns true when the response carries data.
    pub fn is_ok(&self) -> bool {
        self.errors.is_none()
    }
}

/// Per-request execution state: the fragment index, the request variables
/// and the host context. Never shared across requests.
pub(crate) struct ExecutionContext<'a, Ctx> {
    fragments: FxHashMap<&'a str, &'a FragmentDefinition>,
    variables: &'a Variables,
    ctx: &'a Ctx,
}

impl<'a, Ctx> ExecutionContext<'a, Ctx>
where
    Ctx: Send + Sync + 'static,
{
    /// Flattens a selection set against an object type into a field list in
    /// source order. Fragments apply only when their type condition matches
    /// the object's name; duplicate selections are preserved.
    fn collect_fields<'e>(
        &'e self,
        object: &ObjectType<Ctx>,
        selections: &'e [Selection],
    ) -> Vec<&'e FieldSelection> {
        let mut fields = Vec::new();
        self.collect_into(object, selections, &mut fields);
        fields
    }

    fn collect_into<'e>(
        &'e self,
        object: &ObjectType<Ctx>,
        selections: &'e [Selection],
        out: &mut Vec<&'e FieldSelection>,
    ) {
        for selection in selections {
            match selection {
                Selection::Field(field) => out.push(field),
                Selection::FragmentSpread(spread) => {
                    if let Some(fragment) = self.fragments.get(spread.name.as_str()) {
                        if fragment.type_condition == object.name() {
                            self.collect_into(object, &fragment.selection_set, out);
                        }
                    }
                }
                Selection::InlineFragment(inline) => {
                    let applies = inline
                        .type_condition
                        .as_deref()
                        .map_or(true, |condition| condition == object.name());
                    if applies {
                        self.collect_into(object, &inline.selection_set, out);
                    }
                }
            }
        }
    }

    /// Resolves one field: coerces its arguments, runs the resolver and
    /// presents the result through the field's output type. Unknown fields
    /// resolve to `null` under their response key.
    fn resolve_field<'e>(
        &'e self,
        object: &'e ObjectType<Ctx>,
        selection: &'e FieldSelection,
        parent: &'e Resolved,
    ) -> BoxFuture<'e, Result<(String, serde_json::Value), Error>> {
        Box::pin(async move {
            let key = selection.response_key().to_string();
            trace!(field = %selection.name, "resolving field");

            if selection.name == "__typename" {
                return Ok((key, serde_json::Value::String(object.name().to_string())));
            }

            let Some(field) = object.field(&selection.name) else {
                return Ok((key, serde_json::Value::Null));
            };

            let args = coerce_arguments(self.variables, field.arguments(), &selection.arguments)?;
            let resolved = field.resolve(self.ctx, parent, args).await?;
            let value = self.present(resolved, field.ty(), selection).await?;
            Ok((key, value))
        })
    }

    /// Resolves a flattened field list into a JSON object. Siblings run
    /// concurrently; keys keep selection order; the first error aborts.
    fn resolve_fields<'e>(
        &'e self,
        object: &'e ObjectType<Ctx>,
        fields: Vec<&'e FieldSelection>,
        parent: &'e Resolved,
    ) -> BoxFuture<'e, Result<serde_json::Value, Error>> {
        Box::pin(async move {
            let futures: Vec<_> = fields
                .into_iter()
                .map(|selection| self.resolve_field(object, selection, parent))
                .collect();

            let mut map = serde_json::Map::new();
            for result in join_all(futures).await {
                let (key, value) = result?;
                map.insert(key, value);
            }
            Ok(serde_json::Value::Object(map))
        })
    }

    /// Presents a resolved value through an output type.
    fn present<'e>(
        &'e self,
        value: Resolved,
        ty: &'e Type<Ctx>,
        selection: &'e FieldSelection,
    ) -> BoxFuture<'e, Result<serde_json::Value, Error>> {
        Box::pin(async move {
            match ty {
                Type::Scalar(scalar) => match value {
                    Resolved::Value(value) => scalar.coerce(&value),
                    _ => Ok(serde_json::Value::Null),
                },
                Type::Enum(en) => match value {
                    // A resolved value absent from the declared pairs
                    // presents as null.
                    Resolved::Value(value) => Ok(en
                        .label_of(&value)
                        .map(|label| serde_json::Value::String(label.to_string()))
                        .unwrap_or(serde_json::Value::Null)),
                    _ => Ok(serde_json::Value::Null),
                },
                Type::List(item) => match value {
                    Resolved::List(values) => self.present_list(values, item, selection).await,
                    Resolved::Value(ConstValue::List(values)) => {
                        let values = values.into_iter().map(Resolved::Value).collect();
                        self.present_list(values, item, selection).await
                    }
                    _ => Ok(serde_json::Value::Null),
                },
                // Re-enter with the same source; the inner type handles it.
                Type::NonNull(inner) => self.present(value, inner, selection).await,
                Type::Object(object) => match value {
                    Resolved::Null => Ok(serde_json::Value::Null),
                    parent => {
                        let fields = self.collect_fields(object, &selection.selection_set);
                        self.resolve_fields(object, fields, &parent).await
                    }
                },
            }
        })
    }

    /// Presents list elements concurrently, preserving element order.
    async fn present_list<'e>(
        &'e self,
        values: Vec<Resolved>,
        item: &'e Type<Ctx>,
        selection: &'e FieldSelection,
    ) -> Result<serde_json::Value, Error> {
        let futures: Vec<_> = values
            .into_iter()
            .map(|value| self.present(value, item, selection))
            .collect();

        let mut items = Vec::with_capacity(futures.len());
        for result in join_all(futures).await {
            items.push(result?);
        }
        Ok(serde_json::Value::Array(items))
    }
}

/// Executes the first operation of a document against a schema.
///
/// The query root is augmented with the introspection `__schema` field
/// before execution. Mutation and subscription operations are refused.
pub async fn execute<Ctx>(
    schema: &Schema<Ctx>,
    ctx: &Ctx,
    variables: Variables,
    document: &Document,
) -> Response
where
    Ctx: Send + Sync + 'static,
{
    match execute_operation(schema, ctx, &variables, document).await {
        Ok(data) => Response::data(data),
        Err(error) => Response::error(error),
    }
}

async fn execute_operation<Ctx>(
    schema: &Schema<Ctx>,
    ctx: &Ctx,
    variables: &Variables,
    document: &Document,
) -> Result<serde_json::Value, Error>
where
    Ctx: Send + Sync + 'static,
{
    let mut fragments = FxHashMap::default();
    let mut operation: Option<&OperationDefinition> = None;
    for definition in &document.definitions {
        match definition {
            Definition::Operation(op) => {
                if operation.is_none() {
                    operation = Some(op);
                }
            }
            Definition::Fragment(fragment) => {
                fragments.insert(fragment.name.as_str(), fragment);
            }
        }
    }

    let operation = operation.ok_or(Error::NoOperationFound)?;
    match operation.operation {
        OperationType::Query => {}
        OperationType::Mutation => return Err(Error::MutationNotImplemented),
        OperationType::Subscription => return Err(Error::SubscriptionNotImplemented),
    }
    debug!(fragments = fragments.len(), "executing query operation");

    let root = introspection::augment_query_root(schema);
    let ectx = ExecutionContext {
        fragments,
        variables,
        ctx,
    };
    let fields = ectx.collect_fields(&root, &operation.selection_set);
    ectx.resolve_fields(&root, fields, &Resolved::Null).await
}
