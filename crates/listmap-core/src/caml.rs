//! Renders native queries in the record store's XML query dialect.

#[macro_use]
mod fmt;
use fmt::ToCaml;

mod escape;
use escape::Escape;

mod filter;
mod value;

use crate::{
    filter::{Comparison, FieldRef, TypedValue, ID_FIELD},
    Filter, Query, Result, ValueType,
};

/// Serializes queries and filters to the native XML dialect.
#[derive(Debug, Default)]
pub struct Serializer {
    /// Emit `<ViewFields>` for the query's projection.
    view_fields: bool,
}

struct Formatter<'a> {
    /// Where to write the serialized query
    dst: &'a mut String,

    /// First error hit while serializing. Fragments keep writing after an
    /// error; the output is discarded.
    error: Option<crate::Error>,
}

impl Serializer {
    pub fn new() -> Self {
        Self { view_fields: true }
    }

    /// Skips the `<ViewFields>` element, for stores that take the projection
    /// separately.
    pub fn without_view_fields(mut self) -> Self {
        self.view_fields = false;
        self
    }

    /// Serializes a full `<View>` element.
    ///
    /// `position` is folded into the `<Where>` clause as a comparison on the
    /// built-in id, so the result can be passed to stores without a separate
    /// paging cursor.
    pub fn serialize(&self, query: &Query) -> Result<String> {
        let mut ret = String::new();
        let mut f = Formatter {
            dst: &mut ret,
            error: None,
        };

        fmt!(&mut f, "<View>");

        if self.view_fields && !query.view_fields.is_empty() {
            fmt!(&mut f, "<ViewFields>");
            for name in &query.view_fields {
                fmt!(&mut f, "<FieldRef Name='" Escape(name) "' />");
            }
            fmt!(&mut f, "</ViewFields>");
        }

        fmt!(&mut f, "<Query>");

        if let Some(filter) = where_filter(query) {
            let filter = &filter;
            fmt!(&mut f, "<Where>" filter "</Where>");
        }

        if !query.order_by.is_empty() {
            fmt!(&mut f, "<OrderBy>");
            for order_by in &query.order_by {
                fmt!(&mut f, "<FieldRef Name='" Escape(&order_by.field) "'");
                if !order_by.ascending {
                    fmt!(&mut f, " Ascending='FALSE'");
                }
                fmt!(&mut f, " />");
            }
            fmt!(&mut f, "</OrderBy>");
        }

        fmt!(&mut f, "</Query>");

        if let Some(limit) = query.row_limit {
            fmt!(&mut f, "<RowLimit>" limit "</RowLimit>");
        }

        fmt!(&mut f, "</View>");

        match f.error {
            Some(err) => Err(err),
            None => Ok(ret),
        }
    }

    /// Serializes the body of a `<Where>` element.
    pub fn serialize_filter(&self, filter: &Filter) -> Result<String> {
        let mut ret = String::new();
        let mut f = Formatter {
            dst: &mut ret,
            error: None,
        };

        fmt!(&mut f, filter);

        match f.error {
            Some(err) => Err(err),
            None => Ok(ret),
        }
    }
}

fn where_filter(query: &Query) -> Option<Filter> {
    let position = query.position.map(|after| {
        Filter::from(Comparison::new(
            crate::filter::CompareOp::Gt,
            FieldRef::new(ID_FIELD),
            TypedValue::new(ValueType::Counter, after),
        ))
    });

    match (query.filter.clone(), position) {
        (Some(filter), Some(position)) => Some(Filter::and(filter, position)),
        (filter, position) => filter.or(position),
    }
}
