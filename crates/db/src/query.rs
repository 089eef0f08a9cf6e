//! PostgREST-style query strings.
//!
//! A [`QuerySpec`] is turned into `<prefix>/<table>?select=..&col=op.value&order=..&limit=..`.
//! Parameters are form-urlencoded, and nothing is added that the caller
//! did not ask for.

use std::fmt;

use url::form_urlencoded;

/// Comparison operators understood by the table API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `=`
    Eq,
    /// `<>`
    Neq,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
    /// `ILIKE`
    Ilike,
    /// `IN (..)`
    In,
    /// `IS`
    Is,
}

impl FilterOp {
    /// All operators.
    pub const ALL: [Self; 10] = [
        Self::Eq,
        Self::Neq,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Like,
        Self::Ilike,
        Self::In,
        Self::Is,
    ];

    /// Operator token as it appears in the query string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::In => "in",
            Self::Is => "is",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Plain value, compared for equality.
    Literal(String),
    /// Explicit operator.
    Compare {
        /// Operator.
        op: FilterOp,
        /// Operand, passed through verbatim.
        value: String,
    },
}

impl FilterValue {
    /// `<op>.<value>` as sent to the provider.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Literal(value) => format!("eq.{value}"),
            Self::Compare { op, value } => format!("{op}.{value}"),
        }
    }
}

/// Column filters, ANDed by the provider, kept in insertion order.
///
/// An empty set never implies "every row" for update or delete; use
/// [`Filters::match_all`] to ask for that explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    entries: Vec<(String, FilterValue)>,
    match_all: bool,
}

impl Filters {
    /// No filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// No filters, explicitly allowed to touch every row.
    #[must_use]
    pub fn match_all() -> Self {
        Self {
            entries: Vec::new(),
            match_all: true,
        }
    }

    /// `column = value`.
    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl ToString) -> Self {
        self.with(column, FilterValue::Literal(value.to_string()))
    }

    /// `column <op> value`.
    #[must_use]
    pub fn op(self, column: impl Into<String>, op: FilterOp, value: impl ToString) -> Self {
        self.with(
            column,
            FilterValue::Compare {
                op,
                value: value.to_string(),
            },
        )
    }

    /// Appends a filter. Duplicate columns are kept.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: FilterValue) -> Self {
        self.entries.push((column.into(), value));
        self
    }

    /// True when there are no column filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when created with [`Filters::match_all`] and nothing was added.
    #[must_use]
    pub fn allows_unbounded(&self) -> bool {
        self.match_all && self.entries.is_empty()
    }

    /// Filters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Read parameters for `select`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    /// Column list, e.g. `*` or `id,username`.
    pub select: Option<String>,
    /// Row filters.
    pub filters: Filters,
    /// Ordering, e.g. `created_at.desc`.
    pub order: Option<String>,
    /// Row limit.
    pub limit: Option<u32>,
}

impl QuerySpec {
    /// Empty spec: every column, every row, provider order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the column list.
    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    /// Adds `column = value`.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters = self.filters.eq(column, value);
        self
    }

    /// Adds `column <op> value`.
    #[must_use]
    pub fn filter(mut self, column: impl Into<String>, op: FilterOp, value: impl ToString) -> Self {
        self.filters = self.filters.op(column, op, value);
        self
    }

    /// Sets ordering.
    #[must_use]
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Output of [`QueryBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    /// `<prefix>/<table>`.
    pub path: String,
    /// Encoded parameters, without a leading `?`.
    pub params: String,
}

impl BuiltQuery {
    /// Path plus `?params` when there are any.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        if self.params.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.params)
        }
    }
}

/// Builds table paths and query strings for one provider.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    prefix: String,
}

impl QueryBuilder {
    /// `prefix` may be empty; leading and trailing slashes are normalized.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim_matches('/');
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        Self { prefix }
    }

    /// Path of `table`.
    #[must_use]
    pub fn table_path(&self, table: &str) -> String {
        format!("{}/{table}", self.prefix)
    }

    /// Path and parameters for reading `table`.
    #[must_use]
    pub fn build(&self, table: &str, spec: &QuerySpec) -> BuiltQuery {
        let mut params = form_urlencoded::Serializer::new(String::new());
        if let Some(select) = &spec.select {
            params.append_pair("select", select);
        }
        for (column, value) in spec.filters.iter() {
            params.append_pair(column, &value.encode());
        }
        if let Some(order) = &spec.order {
            params.append_pair("order", order);
        }
        if let Some(limit) = spec.limit {
            params.append_pair("limit", &limit.to_string());
        }
        BuiltQuery {
            path: self.table_path(table),
            params: params.finish(),
        }
    }

    /// Path and parameters for a filtered write.
    #[must_use]
    pub fn build_filtered(&self, table: &str, filters: &Filters) -> BuiltQuery {
        let mut params = form_urlencoded::Serializer::new(String::new());
        for (column, value) in filters.iter() {
            params.append_pair(column, &value.encode());
        }
        BuiltQuery {
            path: self.table_path(table),
            params: params.finish(),
        }
    }
}

#[cfg(test)]
#[path = "query_props.rs"]
mod props;
