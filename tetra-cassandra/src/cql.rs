//! CQL statement builders.
//!
//! Every value is a `?` marker; the builders only emit statement text.
//! Identifiers that are not plain lowercase names are double-quoted, and a
//! `keyspace.table` name is quoted per part.

/// Renders an identifier, quoting it when CQL would otherwise fold its case.
#[must_use]
pub fn ident(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Renders a possibly keyspace-qualified table name.
#[must_use]
pub fn table(name: &str) -> String {
    match name.split_once('.') {
        Some((keyspace, table)) => format!("{}.{}", ident(keyspace), ident(table)),
        None => ident(name),
    }
}

fn predicate(filters: &[String]) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = filters.iter().map(|c| format!("{} = ?", ident(c))).collect();
    format!(" WHERE {}", parts.join(" AND "))
}

#[must_use]
pub fn select(table: &str) -> Select {
    Select {
        table: table.to_string(),
        columns: Vec::new(),
        filters: Vec::new(),
        limit: None,
        allow_filtering: false,
    }
}

#[must_use]
pub fn insert(table: &str) -> Insert {
    Insert {
        table: table.to_string(),
        columns: Vec::new(),
    }
}

#[must_use]
pub fn delete(table: &str) -> Delete {
    Delete {
        table: table.to_string(),
        filters: Vec::new(),
    }
}

#[derive(Debug, Clone)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    filters: Vec<String>,
    limit: Option<u32>,
    allow_filtering: bool,
}

impl Select {
    /// Selected columns; none selects `*`.
    #[must_use]
    pub fn columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.columns
            .extend(columns.iter().map(|c| c.as_ref().to_string()));
        self
    }

    #[must_use]
    pub fn where_eq(mut self, column: &str) -> Self {
        self.filters.push(column.to_string());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn allow_filtering(mut self) -> Self {
        self.allow_filtering = true;
        self
    }

    #[must_use]
    pub fn to_cql(&self) -> String {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| ident(c))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut cql = format!(
            "SELECT {columns} FROM {}{}",
            table(&self.table),
            predicate(&self.filters)
        );
        if let Some(limit) = self.limit {
            cql.push_str(&format!(" LIMIT {limit}"));
        }
        if self.allow_filtering {
            cql.push_str(" ALLOW FILTERING");
        }
        cql
    }
}

#[derive(Debug, Clone)]
pub struct Insert {
    table: String,
    columns: Vec<String>,
}

impl Insert {
    #[must_use]
    pub fn columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.columns
            .extend(columns.iter().map(|c| c.as_ref().to_string()));
        self
    }

    #[must_use]
    pub fn to_cql(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| ident(c)).collect();
        let markers = vec!["?"; columns.len()];
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table(&self.table),
            columns.join(", "),
            markers.join(", ")
        )
    }
}

#[derive(Debug, Clone)]
pub struct Delete {
    table: String,
    filters: Vec<String>,
}

impl Delete {
    #[must_use]
    pub fn where_eq(mut self, column: &str) -> Self {
        self.filters.push(column.to_string());
        self
    }

    #[must_use]
    pub fn to_cql(&self) -> String {
        format!(
            "DELETE FROM {}{}",
            table(&self.table),
            predicate(&self.filters)
        )
    }
}
