//! Abstract Syntax Tree types for Grove GraphQL.
//!
//! The tree a query parser hands to the execution runtime. Hosts without a
//! parser (and the test suites) construct documents through the builder
//! methods on each node.

use crate::value::Value;

/// A complete query document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub definitions: Vec<Definition>,
}

impl Document {
    /// Creates a document from its definitions.
    pub fn new(definitions: Vec<Definition>) -> Self {
        Self { definitions }
    }
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Operation(OperationDefinition),
    Fragment(FragmentDefinition),
}

/// Type of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

/// Operation definition.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDefinition {
    pub operation: OperationType,
    /// Operation name, when the document carries one. Execution always picks
    /// the first operation in the document regardless of name.
    pub name: Option<String>,
    pub selection_set: Vec<Selection>,
}

impl OperationDefinition {
    /// Creates an operation definition.
    pub fn new(operation: OperationType, selection_set: Vec<Selection>) -> Self {
        Self {
            operation,
            name: None,
            selection_set,
        }
    }

    /// Sets the operation name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Fragment definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,
    pub selection_set: Vec<Selection>,
}

impl FragmentDefinition {
    /// Creates a fragment definition.
    pub fn new(
        name: impl Into<String>,
        type_condition: impl Into<String>,
        selection_set: Vec<Selection>,
    ) -> Self {
        Self {
            name: name.into(),
            type_condition: type_condition.into(),
            selection_set,
        }
    }
}

/// Selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(FieldSelection),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

impl From<FieldSelection> for Selection {
    fn from(field: FieldSelection) -> Self {
        Selection::Field(field)
    }
}

impl From<FragmentSpread> for Selection {
    fn from(spread: FragmentSpread) -> Self {
        Selection::FragmentSpread(spread)
    }
}

impl From<InlineFragment> for Selection {
    fn from(inline: InlineFragment) -> Self {
        Selection::InlineFragment(inline)
    }
}

/// Field selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelection {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<(String, Value)>,
    pub selection_set: Vec<Selection>,
}

impl FieldSelection {
    /// Creates a field selection with no alias, arguments or sub-selections.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: Vec::new(),
            selection_set: Vec::new(),
        }
    }

    /// Sets the alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Adds an argument.
    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.push((name.into(), value));
        self
    }

    /// Sets the sub-selection set.
    pub fn with_selection_set(mut self, selection_set: Vec<Selection>) -> Self {
        self.selection_set = selection_set;
        self
    }

    /// Returns the response key (alias if present, else the field name).
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Fragment spread.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSpread {
    pub name: String,
}

impl FragmentSpread {
    /// Creates a fragment spread.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Inline fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    pub type_condition: Option<String>,
    pub selection_set: Vec<Selection>,
}

impl InlineFragment {
    /// Creates an inline fragment with no type condition.
    pub fn new(selection_set: Vec<Selection>) -> Self {
        Self {
            type_condition: None,
            selection_set,
        }
    }

    /// Sets the type condition.
    pub fn with_type_condition(mut self, type_condition: impl Into<String>) -> Self {
        self.type_condition = Some(type_condition.into());
        self
    }
}
