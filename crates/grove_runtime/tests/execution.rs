//! End-to-end execution tests: schema construction through response envelope.

use grove_runtime::arg;
use grove_runtime::{
    enum_type, execute, field, int, io_field, list, non_null, object, schema, string, Error,
    InputValue, Resolved, Schema, Variables,
};
use grove_syntax::ast::{
    Definition, Document, FieldSelection, FragmentDefinition, FragmentSpread, InlineFragment,
    OperationDefinition, OperationType, Selection,
};
use grove_syntax::value::{ConstValue, Value};
use serde_json::json;

struct AppContext {
    greeting: String,
}

fn app_schema() -> Schema<AppContext> {
    let user = object("User", |user| {
        vec![
            field("id", non_null(grove_runtime::id()), |_, src, _| {
                Ok(src.get("id").cloned().into())
            }),
            field("name", non_null(string()), |_, src, _| {
                Ok(src.get("name").cloned().into())
            }),
            field("friends", list(non_null(user.clone())), |_, src, _| {
                Ok(src.get("friends").cloned().into())
            }),
        ]
    });

    let status = enum_type(
        "Status",
        vec![
            (ConstValue::from("active"), "ACTIVE"),
            (ConstValue::from("done"), "DONE"),
        ],
    );
    let status_out = status.clone();
    let status_bad = status.clone();

    schema(vec![
        field("hello", string(), |ctx: &AppContext, _, _| {
            Ok(Resolved::from(ctx.greeting.clone()))
        }),
        field("echo", non_null(string()), |_, _, args| {
            let msg: String = args.require("msg")?;
            Ok(Resolved::from(msg))
        })
        .with_argument(InputValue::new("msg", arg::non_null(arg::string()))),
        field("me", non_null(user), |_, _, _| {
            Ok(Resolved::Value(ConstValue::Object(vec![
                ("id".to_string(), ConstValue::from("7")),
                ("name".to_string(), ConstValue::from("A")),
                (
                    "friends".to_string(),
                    ConstValue::List(vec![ConstValue::Object(vec![
                        ("id".to_string(), ConstValue::from("8")),
                        ("name".to_string(), ConstValue::from("B")),
                    ])]),
                ),
            ])))
        }),
        field("xs", non_null(list(non_null(int()))), |_, _, _| {
            Ok(Resolved::from(vec![
                ConstValue::Int(1),
                ConstValue::Int(2),
                ConstValue::Int(3),
            ]))
        }),
        field("status", status_out, |_, _, _| {
            Ok(Resolved::from(ConstValue::from("active")))
        }),
        field("badStatus", status_bad, |_, _, _| {
            Ok(Resolved::from(ConstValue::from("unknown")))
        }),
        field("nothing", string(), |_, _, _| Ok(Resolved::Null)),
        field("sum", non_null(int()), |_, _, args| {
            let values: Vec<i64> = args.require("values")?;
            Ok(Resolved::from(values.iter().sum::<i64>()))
        })
        .with_argument(InputValue::new(
            "values",
            arg::non_null(arg::list(arg::non_null(arg::int()))),
        )),
        field("search", non_null(string()), |_, _, args| {
            let filter: serde_json::Value = args.require("filter")?;
            Ok(Resolved::from(format!(
                "{}:{}",
                filter["q"].as_str().unwrap_or(""),
                filter["limit"]
            )))
        })
        .with_argument(InputValue::new(
            "filter",
            arg::non_null(arg::object(
                "Filter",
                vec![
                    InputValue::new("q", arg::non_null(arg::string())),
                    InputValue::new("limit", arg::int()).with_default(ConstValue::Int(10)),
                ],
            )),
        )),
        field("toggle", non_null(string()), |_, _, args| {
            let to: String = args.require("to")?;
            Ok(Resolved::from(to))
        })
        .with_argument(InputValue::new(
            "to",
            arg::non_null(arg::enum_type(
                "Switch",
                vec![
                    ("ON", ConstValue::from("on")),
                    ("OFF", ConstValue::from("off")),
                ],
            )),
        )),
        io_field("delayed", non_null(string()), |_ctx: &AppContext, _src, _args| async move {
            Ok(Resolved::from("later"))
        }),
        field("fail", string(), |_, _, _| Err(Error::new("boom"))),
    ])
}

fn query(selections: Vec<Selection>) -> Document {
    Document::new(vec![Definition::Operation(OperationDefinition::new(
        OperationType::Query,
        selections,
    ))])
}

async fn run(variables: Variables, document: Document) -> serde_json::Value {
    let schema = app_schema();
    let ctx = AppContext {
        greeting: "world".to_string(),
    };
    let response = execute(&schema, &ctx, variables, &document).await;
    serde_json::to_value(&response).unwrap()
}

#[tokio::test]
async fn trivial_field() {
    let document = query(vec![FieldSelection::new("hello").into()]);
    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"hello": "world"}})
    );
}

#[tokio::test]
async fn argument_from_variable() {
    let document = query(vec![FieldSelection::new("echo")
        .with_argument("msg", Value::Variable("m".to_string()))
        .into()]);
    let mut variables = Variables::new();
    variables.insert("m", ConstValue::from("hi"));

    assert_eq!(
        run(variables, document).await,
        json!({"data": {"echo": "hi"}})
    );
}

#[tokio::test]
async fn missing_variable() {
    let document = query(vec![FieldSelection::new("echo")
        .with_argument("msg", Value::Variable("m".to_string()))
        .into()]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"errors": [{"message": "Missing variable `m`"}]})
    );
}

#[tokio::test]
async fn variable_and_literal_agree() {
    let by_literal = query(vec![FieldSelection::new("echo")
        .with_argument("msg", Value::String("hi".to_string()))
        .into()]);
    let by_variable = query(vec![FieldSelection::new("echo")
        .with_argument("msg", Value::Variable("m".to_string()))
        .into()]);
    let mut variables = Variables::new();
    variables.insert("m", ConstValue::from("hi"));

    assert_eq!(
        run(Variables::new(), by_literal).await,
        run(variables, by_variable).await
    );
}

#[tokio::test]
async fn missing_required_argument() {
    let document = query(vec![FieldSelection::new("echo").into()]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"errors": [{"message": "Missing required argument"}]})
    );
}

#[tokio::test]
async fn nested_object_with_aliases() {
    let document = query(vec![FieldSelection::new("me")
        .with_alias("x")
        .with_selection_set(vec![
            FieldSelection::new("id").with_alias("i").into(),
            FieldSelection::new("name").with_alias("n").into(),
        ])
        .into()]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"x": {"i": "7", "n": "A"}}})
    );
}

#[tokio::test]
async fn nested_list_of_objects() {
    let document = query(vec![FieldSelection::new("me")
        .with_selection_set(vec![FieldSelection::new("friends")
            .with_selection_set(vec![FieldSelection::new("name").into()])
            .into()])
        .into()]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"me": {"friends": [{"name": "B"}]}}})
    );
}

#[tokio::test]
async fn list_presentation() {
    let document = query(vec![FieldSelection::new("xs").into()]);
    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"xs": [1, 2, 3]}})
    );
}

#[tokio::test]
async fn enum_presentation() {
    let document = query(vec![FieldSelection::new("status").into()]);
    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"status": "ACTIVE"}})
    );
}

#[tokio::test]
async fn unknown_enum_source_presents_null() {
    let document = query(vec![FieldSelection::new("badStatus").into()]);
    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"badStatus": null}})
    );
}

#[tokio::test]
async fn null_for_nullable_scalar() {
    let document = query(vec![FieldSelection::new("nothing").into()]);
    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"nothing": null}})
    );
}

#[tokio::test]
async fn unknown_field_presents_null() {
    let document = query(vec![FieldSelection::new("doesNotExist").into()]);
    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"doesNotExist": null}})
    );
}

#[tokio::test]
async fn list_argument() {
    let document = query(vec![FieldSelection::new("sum")
        .with_argument(
            "values",
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        )
        .into()]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"sum": 6}})
    );
}

#[tokio::test]
async fn list_argument_singleton_promotion() {
    let document = query(vec![FieldSelection::new("sum")
        .with_argument("values", Value::Int(5))
        .into()]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"sum": 5}})
    );
}

#[tokio::test]
async fn input_object_argument_with_default() {
    let document = query(vec![FieldSelection::new("search")
        .with_argument(
            "filter",
            Value::Object(vec![("q".to_string(), Value::String("grove".to_string()))]),
        )
        .into()]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"search": "grove:10"}})
    );
}

#[tokio::test]
async fn enum_argument() {
    let document = query(vec![FieldSelection::new("toggle")
        .with_argument("to", Value::Enum("ON".to_string()))
        .into()]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"toggle": "on"}})
    );
}

#[tokio::test]
async fn invalid_enum_argument() {
    let document = query(vec![FieldSelection::new("toggle")
        .with_argument("to", Value::Enum("HALFWAY".to_string()))
        .into()]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"errors": [{"message": "Invalid enum value"}]})
    );
}

#[tokio::test]
async fn async_resolver() {
    let document = query(vec![FieldSelection::new("delayed").into()]);
    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"delayed": "later"}})
    );
}

#[tokio::test]
async fn resolver_error_surfaces_verbatim() {
    let document = query(vec![
        FieldSelection::new("hello").into(),
        FieldSelection::new("fail").into(),
    ]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"errors": [{"message": "boom"}]})
    );
}

#[tokio::test]
async fn fragment_spread_equals_inline_selection() {
    let inline = query(vec![FieldSelection::new("me")
        .with_selection_set(vec![
            FieldSelection::new("id").into(),
            FieldSelection::new("name").into(),
        ])
        .into()]);

    let spread = Document::new(vec![
        Definition::Operation(OperationDefinition::new(
            OperationType::Query,
            vec![FieldSelection::new("me")
                .with_selection_set(vec![FragmentSpread::new("userFields").into()])
                .into()],
        )),
        Definition::Fragment(FragmentDefinition::new(
            "userFields",
            "User",
            vec![
                FieldSelection::new("id").into(),
                FieldSelection::new("name").into(),
            ],
        )),
    ]);

    assert_eq!(
        run(Variables::new(), inline).await,
        run(Variables::new(), spread).await
    );
}

#[tokio::test]
async fn mismatched_fragment_emits_nothing() {
    let document = Document::new(vec![
        Definition::Operation(OperationDefinition::new(
            OperationType::Query,
            vec![FieldSelection::new("me")
                .with_selection_set(vec![FragmentSpread::new("postFields").into()])
                .into()],
        )),
        Definition::Fragment(FragmentDefinition::new(
            "postFields",
            "Post",
            vec![FieldSelection::new("id").into()],
        )),
    ]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"me": {}}})
    );
}

#[tokio::test]
async fn inline_fragment_with_matching_condition() {
    let document = query(vec![FieldSelection::new("me")
        .with_selection_set(vec![InlineFragment::new(vec![
            FieldSelection::new("name").into()
        ])
        .with_type_condition("User")
        .into()])
        .into()]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"me": {"name": "A"}}})
    );
}

#[tokio::test]
async fn mutation_is_refused() {
    let document = Document::new(vec![Definition::Operation(OperationDefinition::new(
        OperationType::Mutation,
        vec![FieldSelection::new("foo").into()],
    ))]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"errors": [{"message": "Mutation is not implemented"}]})
    );
}

#[tokio::test]
async fn subscription_is_refused() {
    let document = Document::new(vec![Definition::Operation(OperationDefinition::new(
        OperationType::Subscription,
        vec![FieldSelection::new("foo").into()],
    ))]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"errors": [{"message": "Subscription is not implemented"}]})
    );
}

#[tokio::test]
async fn only_first_operation_executes() {
    let document = Document::new(vec![
        Definition::Operation(
            OperationDefinition::new(OperationType::Query, vec![FieldSelection::new("hello").into()])
                .with_name("First"),
        ),
        Definition::Operation(
            OperationDefinition::new(OperationType::Query, vec![FieldSelection::new("xs").into()])
                .with_name("Second"),
        ),
    ]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"hello": "world"}})
    );
}

#[tokio::test]
async fn introspection_self_description() {
    let document = query(vec![FieldSelection::new("__schema")
        .with_selection_set(vec![FieldSelection::new("queryType")
            .with_selection_set(vec![FieldSelection::new("name").into()])
            .into()])
        .into()]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"data": {"__schema": {"queryType": {"name": "root"}}}})
    );
}

#[tokio::test]
async fn introspection_type_listing() {
    let document = query(vec![FieldSelection::new("__schema")
        .with_selection_set(vec![FieldSelection::new("types")
            .with_selection_set(vec![
                FieldSelection::new("name").into(),
                FieldSelection::new("kind").into(),
            ])
            .into()])
        .into()]);

    let result = run(Variables::new(), document).await;
    let types = result["data"]["__schema"]["types"].as_array().unwrap();
    let entry = |name: &str| {
        types
            .iter()
            .find(|ty| ty["name"] == name)
            .unwrap_or_else(|| panic!("type {name} not listed"))
    };

    assert_eq!(entry("root")["kind"], "OBJECT");
    assert_eq!(entry("User")["kind"], "OBJECT");
    assert_eq!(entry("Status")["kind"], "ENUM");
    assert_eq!(entry("Filter")["kind"], "INPUT_OBJECT");
    assert_eq!(entry("__Schema")["kind"], "OBJECT");
    assert_eq!(entry("__TypeKind")["kind"], "ENUM");
}

#[tokio::test]
async fn introspection_fields_and_defaults() {
    let document = query(vec![FieldSelection::new("__schema")
        .with_selection_set(vec![FieldSelection::new("types")
            .with_selection_set(vec![
                FieldSelection::new("name").into(),
                FieldSelection::new("fields")
                    .with_selection_set(vec![
                        FieldSelection::new("name").into(),
                        FieldSelection::new("type")
                            .with_selection_set(vec![
                                FieldSelection::new("kind").into(),
                                FieldSelection::new("name").into(),
                            ])
                            .into(),
                    ])
                    .into(),
                FieldSelection::new("inputFields")
                    .with_selection_set(vec![
                        FieldSelection::new("name").into(),
                        FieldSelection::new("defaultValue").into(),
                    ])
                    .into(),
            ])
            .into()])
        .into()]);

    let result = run(Variables::new(), document).await;
    let types = result["data"]["__schema"]["types"].as_array().unwrap();

    let user = types.iter().find(|ty| ty["name"] == "User").unwrap();
    let user_fields = user["fields"].as_array().unwrap();
    let id_field = user_fields.iter().find(|f| f["name"] == "id").unwrap();
    assert_eq!(id_field["type"]["kind"], "NON_NULL");

    let filter = types.iter().find(|ty| ty["name"] == "Filter").unwrap();
    let input_fields = filter["inputFields"].as_array().unwrap();
    let limit = input_fields.iter().find(|f| f["name"] == "limit").unwrap();
    assert_eq!(limit["defaultValue"], "10");

    // Scalars carry neither fields nor input fields.
    let string_ty = types.iter().find(|ty| ty["name"] == "String").unwrap();
    assert_eq!(string_ty["fields"], serde_json::Value::Null);
}

#[tokio::test]
async fn empty_document_has_no_operation() {
    let document = Document::new(vec![Definition::Fragment(FragmentDefinition::new(
        "orphan",
        "User",
        vec![FieldSelection::new("id").into()],
    ))]);

    assert_eq!(
        run(Variables::new(), document).await,
        json!({"errors": [{"message": "No operation found"}]})
    );
}
