//! List queries rendered to PostgREST query parameters.
//!
//! A [`ListQuery`] is always sent as one request, so a filter set is applied
//! atomically or not at all.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    select: String,
    filters: Vec<(String, String)>,
    order: Option<(String, SortDirection)>,
    limit: Option<usize>,
}

impl ListQuery {
    /// `select` is a PostgREST select clause, e.g. `*` or
    /// `*,fuel_types(name,type)` for embedded joins.
    pub fn new(select: &str) -> Self {
        Self {
            select: select.to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Add an equality filter. A later filter on the same column replaces the
    /// earlier one.
    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.filters.iter_mut().find(|(c, _)| c == column) {
            Some(existing) => existing.1 = value,
            None => self.filters.push((column.to_string(), value)),
        }
        self
    }

    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    /// Most recently created rows first.
    pub fn newest_first(self) -> Self {
        self.order_by("created_at", SortDirection::Descending)
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn select(&self) -> &str {
        &self.select
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn order(&self) -> Option<(&str, SortDirection)> {
        self.order.as_ref().map(|(c, d)| (c.as_str(), *d))
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select.clone())];
        for (column, value) in &self.filters {
            params.push((column.clone(), format!("eq.{value}")));
        }
        if let Some((column, direction)) = &self.order {
            params.push(("order".to_string(), format!("{column}.{}", direction.as_str())));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Query parameters addressing exactly one row by key.
pub fn key_params(key_column: &str, key: &str, select: Option<&str>) -> Vec<(String, String)> {
    let mut params = vec![(key_column.to_string(), format!("eq.{key}"))];
    if let Some(select) = select {
        params.push(("select".to_string(), select.to_string()));
    }
    params
}
