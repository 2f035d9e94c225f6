//! Parameterized SELECT construction for the warehouse tables.
//!
//! Filter values are always bound through DuckDB `?` placeholders. Column
//! expressions and join clauses are SDK-supplied constants, never user input.
//!
//! # Example
//!
//! ```rust
//! use paydash_sdk::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("transaction_facts f")
//!     .join("JOIN core_time t ON f.time_id = t.time_id")
//!     .where_eq("f.status", "successful")
//!     .where_between("CAST(t.full_date AS DATE)", "CAST(? AS DATE)", "2024-01-01", "2024-01-31")
//!     .order_by(&["t.full_date ASC"])
//!     .limit(50)
//!     .build();
//! assert_eq!(params, vec!["successful", "2024-01-01", "2024-01-31"]);
//! ```

use crate::models::DateRange;

/// Builds a SELECT with bound parameters. Methods return `&mut Self`.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    joins: Vec<String>,
    where_clauses: Vec<String>,
    params: Vec<String>,
    group_by_cols: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
    offset_val: Option<usize>,
}

impl SqlBuilder {
    /// Start a query over a table, optionally aliased (`"transaction_facts f"`).
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            joins: Vec::new(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_cols: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
            offset_val: None,
        }
    }

    /// Replace the default `*` projection.
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Append a full JOIN clause, e.g. `"JOIN core_time t ON f.time_id = t.time_id"`.
    pub fn join(&mut self, clause: &str) -> &mut Self {
        self.joins.push(clause.to_string());
        self
    }

    /// Add a raw condition with one `?` per entry in `params`.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// `{column} = ?`
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// `{column} IN (?, ...)`; an empty list matches nothing.
    pub fn where_in(&mut self, column: &str, values: &[&str]) -> &mut Self {
        if values.is_empty() {
            self.where_clauses.push("FALSE".to_string());
            return self;
        }
        let placeholders: Vec<&str> = values.iter().map(|_| "?").collect();
        self.where_clauses
            .push(format!("{} IN ({})", column, placeholders.join(", ")));
        self.params.extend(values.iter().map(|v| v.to_string()));
        self
    }

    /// `{column} >= ?`
    pub fn where_gte(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} >= ?", column));
        self.params.push(value.to_string());
        self
    }

    /// `{column} <= ?`
    pub fn where_lte(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} <= ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Inclusive bounds with a custom placeholder expression:
    /// `{column} BETWEEN {placeholder} AND {placeholder}`.
    ///
    /// `placeholder` must contain exactly one `?`, e.g. `"CAST(? AS DATE)"`.
    pub fn where_between(
        &mut self,
        column: &str,
        placeholder: &str,
        low: &str,
        high: &str,
    ) -> &mut Self {
        self.where_clauses.push(format!(
            "{} BETWEEN {} AND {}",
            column, placeholder, placeholder
        ));
        self.params.push(low.to_string());
        self.params.push(high.to_string());
        self
    }

    /// Restrict a date or timestamp column to the days of `range`.
    pub fn where_date_range(&mut self, column: &str, range: &DateRange) -> &mut Self {
        let start = range.start.format("%Y-%m-%d").to_string();
        let end = range.end.format("%Y-%m-%d").to_string();
        self.where_between(
            &format!("CAST({} AS DATE)", column),
            "CAST(? AS DATE)",
            &start,
            &end,
        )
    }

    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by_cols
            .extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Append ORDER BY terms (`"t.full_date DESC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset_val = Some(n);
        self
    }

    /// Render the SQL and return it with the bound parameters in order.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        parts.extend(self.joins.iter().cloned());

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.group_by_cols.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_cols.join(", ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        if let Some(n) = self.offset_val {
            parts.push(format!("OFFSET {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}
