//! Row operations against named backend tables

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Select,
    Insert(Value),
    /// Insert, or update the row whose `on_conflict` column matches.
    Upsert { row: Value, on_conflict: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// A single table operation. Filters are equality-only, which is all the
/// application needs.
///
/// ```rust
/// use remote_client::TableQuery;
///
/// let query = TableQuery::select("rehousing_notes")
///     .eq("user_id", "u-1")
///     .order_desc("created_at")
///     .limit(20);
/// assert_eq!(query.table, "rehousing_notes");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub table: String,
    pub operation: Operation,
    pub filters: Vec<(String, String)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    /// Expect exactly one row back as an object instead of an array.
    pub single: bool,
}

impl TableQuery {
    fn new(table: &str, operation: Operation) -> Self {
        Self {
            table: table.to_string(),
            operation,
            filters: Vec::new(),
            order: None,
            limit: None,
            single: false,
        }
    }

    pub fn select(table: &str) -> Self {
        Self::new(table, Operation::Select)
    }

    pub fn insert(table: &str, row: Value) -> Self {
        Self::new(table, Operation::Insert(row))
    }

    pub fn upsert(table: &str, row: Value, on_conflict: &str) -> Self {
        Self::new(
            table,
            Operation::Upsert {
                row,
                on_conflict: on_conflict.to_string(),
            },
        )
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            descending: true,
        });
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            descending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    pub fn is_write(&self) -> bool {
        !matches!(self.operation, Operation::Select)
    }

    /// Query-string pairs in PostgREST syntax.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if !self.is_write() {
            pairs.push(("select".to_string(), "*".to_string()));
        }

        for (column, value) in &self.filters {
            pairs.push((column.clone(), format!("eq.{value}")));
        }

        if let Some(order) = &self.order {
            let direction = if order.descending { "desc" } else { "asc" };
            pairs.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        if let Operation::Upsert { on_conflict, .. } = &self.operation {
            pairs.push(("on_conflict".to_string(), on_conflict.clone()));
        }

        pairs
    }
}
