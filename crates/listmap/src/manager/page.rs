use super::{matches_local, materialize, view_fields, Manager};
use crate::{Entity, Error, Parameters, Predicate, Query, Result};

use std::ops::Deref;
use tracing::{debug, debug_span};

/// Requests `size` items following the item with id `after`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub size: usize,

    /// Built-in id of the last item of the previous page
    pub after: Option<i32>,
}

impl PageRequest {
    /// The first page.
    pub fn first(size: usize) -> Self {
        Self { size, after: None }
    }

    pub fn after(self, id: i32) -> Self {
        Self {
            after: Some(id),
            ..self
        }
    }
}

/// A page of results from a paged query.
#[derive(Debug)]
pub struct Page<T> {
    /// Items in this page
    pub items: Vec<T>,

    /// Request for the following page. `None` when the store has no more
    /// items. A full last page still yields a request, whose page may be
    /// empty.
    pub next: Option<PageRequest>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

impl<T> Deref for Page<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T: Entity> Manager<T> {
    /// Loads one page of the entities matching `predicate`, ordered by
    /// built-in id.
    ///
    /// When part of the predicate is evaluated in memory the store is read
    /// in chunks of the page size until the page is full or the store is
    /// exhausted.
    pub fn page(&self, predicate: Predicate<T>, request: PageRequest) -> Result<Page<T>> {
        self.page_with(predicate, request, Parameters::default())
    }

    pub fn page_with(
        &self,
        predicate: Predicate<T>,
        request: PageRequest,
        parameters: Parameters,
    ) -> Result<Page<T>> {
        if request.size == 0 {
            return Err(Error::invalid_operation("page size must be greater than zero"));
        }

        let plan = self.translate(&predicate)?;

        let span = debug_span!(
            "page",
            entity = T::NAME,
            collection = %self.collection,
            size = request.size,
            after = ?request.after
        );
        let _enter = span.enter();

        let mut cx = self.context(parameters);
        let fields = view_fields(&cx, &plan);
        let mut cursor = request.after;
        let mut items = vec![];

        loop {
            let query = Query::new()
                .filter(plan.native.clone())
                .view_fields(fields.iter().cloned())
                .row_limit(request.size)
                .position(cursor);
            self.log_query(&query);

            let chunk = self.fetch(&cx, &query)?;
            let fetched = chunk.len();
            let start = cursor;

            for item in chunk {
                cursor = item.id.or(cursor);
                if matches_local(&plan, &item)? {
                    items.push(materialize(&mut cx, item)?);
                    if items.len() == request.size {
                        break;
                    }
                }
            }

            if items.len() == request.size {
                debug!(next = ?cursor, "page full");
                let next = cursor.map(|id| PageRequest::first(request.size).after(id));
                return Ok(Page { items, next });
            }

            if fetched < request.size {
                debug!(count = items.len(), "store exhausted");
                return Ok(Page { items, next: None });
            }

            if cursor == start {
                return Err(Error::invalid_operation(
                    "the store returned items without ids; paging cannot advance",
                ));
            }
        }
    }
}
