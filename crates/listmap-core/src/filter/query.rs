use super::Filter;
use crate::FieldName;

/// Name of the built-in integer id field.
pub const ID_FIELD: &str = "ID";

/// A native query as executed by a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Restricts the returned items. `None` returns every item.
    pub filter: Option<Filter>,

    /// Fields to load for every returned item.
    pub view_fields: Vec<FieldName>,

    pub order_by: Vec<OrderBy>,

    /// Maximum number of items to return.
    pub row_limit: Option<usize>,

    /// Return only items whose built-in id is greater than this one. Paging
    /// uses it as the last-seen-id cursor.
    pub position: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: FieldName,
    pub ascending: bool,
}

impl Query {
    pub fn new() -> Self {
        Self {
            filter: None,
            view_fields: vec![],
            order_by: vec![OrderBy::asc(ID_FIELD)],
            row_limit: None,
            position: None,
        }
    }

    pub fn filter(mut self, filter: impl Into<Option<Filter>>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn view_fields(mut self, fields: impl IntoIterator<Item = impl Into<FieldName>>) -> Self {
        self.view_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn row_limit(mut self, limit: usize) -> Self {
        self.row_limit = Some(limit);
        self
    }

    pub fn position(mut self, after: Option<i32>) -> Self {
        self.position = after;
        self
    }

    pub fn order_by(mut self, order_by: Vec<OrderBy>) -> Self {
        self.order_by = order_by;
        self
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBy {
    pub fn asc(field: impl Into<FieldName>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn desc(field: impl Into<FieldName>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }
}
