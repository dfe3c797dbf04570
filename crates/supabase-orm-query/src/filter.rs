use crate::value::FilterValue;

/// Map an operator alias to its PostgREST keyword.
///
/// `=`, `!=`/`<>`, `>`, `>=`, `<`, `<=` and the keywords themselves are
/// recognised; anything else is passed through unchanged.
pub fn operator_keyword(operator: &str) -> &str {
    match operator {
        "eq" | "=" => "eq",
        "neq" | "!=" | "<>" => "neq",
        "gt" | ">" => "gt",
        "gte" | ">=" => "gte",
        "lt" | "<" => "lt",
        "lte" | "<=" => "lte",
        "like" => "like",
        "ilike" => "ilike",
        "in" => "in",
        "is" => "is",
        other => other,
    }
}

/// Build a standalone filter fragment: `column=op.value`.
pub fn build_filter_condition(column: &str, operator: &str, value: impl Into<FilterValue>) -> String {
    Condition::new(column, operator, value).standalone()
}

/// One `column op value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    /// The PostgREST keyword, already resolved from any alias.
    pub operator: String,
    pub value: FilterValue,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: &str, value: impl Into<FilterValue>) -> Self {
        Self {
            column: column.into(),
            operator: operator_keyword(operator).to_string(),
            value: value.into(),
        }
    }

    /// `column=op.value`, the shape of a top-level query parameter.
    pub fn standalone(&self) -> String {
        format!("{}={}.{}", self.column, self.operator, self.value)
    }

    /// `column.op.value`, the shape used inside `and`/`or` groups.
    pub fn embedded(&self) -> String {
        format!("{}.{}.{}", self.column, self.operator, self.value)
    }
}

/// A filter accumulated by the query builder, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Filter {
    Standard {
        condition: Condition,
        disjunctive: bool,
    },
    /// A caller-supplied condition string, emitted verbatim.
    Complex(String),
    /// Conditions OR'ed together into one `or=(...)` parameter.
    Group(Vec<Condition>),
}

impl Filter {
    /// The `(key, value)` query parameter this filter compiles to.
    pub(crate) fn to_param(&self) -> (&'static str, String) {
        match self {
            Self::Standard {
                condition,
                disjunctive: false,
            } => ("and", condition.embedded()),
            Self::Standard {
                condition,
                disjunctive: true,
            } => ("and", format!("or({})", condition.embedded())),
            Self::Complex(raw) => ("and", raw.clone()),
            Self::Group(conditions) => {
                let items: Vec<String> = conditions.iter().map(Condition::embedded).collect();
                ("or", format!("({})", items.join(",")))
            }
        }
    }
}

/// Temporary collector used in the closure passed to `QueryBuilder::or_group`.
#[derive(Debug, Default)]
pub struct FilterGroup {
    conditions: Vec<Condition>,
}

impl FilterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one alternative to the group.
    pub fn where_(mut self, column: &str, operator: &str, value: impl Into<FilterValue>) -> Self {
        self.conditions.push(Condition::new(column, operator, value));
        self
    }

    pub fn eq(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.where_(column, "eq", value)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub(crate) fn into_conditions(self) -> Vec<Condition> {
        self.conditions
    }
}
