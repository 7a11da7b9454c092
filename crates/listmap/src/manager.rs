mod batch;
pub use batch::BatchResult;

mod builder;
pub use builder::Builder;

mod page;
pub use page::{Page, PageRequest};

mod updatable;
pub use updatable::Updatable;

mod write;

use crate::{
    accessor::Scope,
    caml,
    filter::eval,
    map::IdentifierOptions,
    predicate::{BinaryOp, Constant},
    repository::UpdateMethod,
    translate, CollectionHandle, DataItem, Entity, EntityMap, Error, FieldName, Filter,
    OperationContext, Parameters, Predicate, PropertyAccessor, Query, QueryPlan, Registry,
    Repository, Result,
};

use std::{fmt, sync::Arc};
use tracing::{debug, debug_span};

/// A caller-supplied step run before an item is persisted or deleted.
///
/// Hooks see the entity and data item of the current item through the
/// context and may cancel the item or the whole operation.
pub type Hook<T> = Box<dyn Fn(&mut OperationContext<T>) -> Result<()> + Send + Sync>;

pub(crate) struct Hooks<T> {
    pub(crate) before_create: Vec<Hook<T>>,
    pub(crate) before_update: Vec<Hook<T>>,
    pub(crate) before_delete: Vec<Hook<T>>,
}

/// What happened to one item of a write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Persisted,
    Skipped,
    Canceled,
}

impl Outcome {
    fn persisted(self) -> bool {
        self == Self::Persisted
    }
}

/// Reads and writes entities of type `T` in one collection.
///
/// A manager is cheap to share: it holds the repository, the registry the
/// entity map was resolved from, and the hooks run by write operations.
/// Every call gets its own [`OperationContext`].
pub struct Manager<T: Entity> {
    repository: Arc<dyn Repository>,
    registry: Registry,
    map: Arc<EntityMap<T>>,
    collection: CollectionHandle,
    update_method: UpdateMethod,
    hooks: Hooks<T>,
}

impl<T: Entity> Manager<T> {
    pub fn builder(repository: Arc<dyn Repository>) -> Builder<T> {
        Builder::new(repository)
    }

    pub fn map(&self) -> &EntityMap<T> {
        &self.map
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn repository(&self) -> &dyn Repository {
        &*self.repository
    }

    pub fn collection(&self) -> &CollectionHandle {
        &self.collection
    }

    /// Loads the entity with built-in id `id`.
    pub fn get(&self, id: i32) -> Result<T> {
        self.get_with(id, Parameters::default())
    }

    pub fn get_with(&self, id: i32, parameters: Parameters) -> Result<T> {
        self.try_get_with(id, parameters)?
            .ok_or_else(|| self.not_found(format_args!("id={id}")))
    }

    /// Loads the entity with built-in id `id`, or `None` if it does not exist.
    pub fn try_get(&self, id: i32) -> Result<Option<T>> {
        self.try_get_with(id, Parameters::default())
    }

    pub fn try_get_with(&self, id: i32, parameters: Parameters) -> Result<Option<T>> {
        Ok(self
            .try_get_updatable_with(id, parameters)?
            .map(Updatable::into_inner))
    }

    /// Loads an entity together with the state needed to update it.
    pub fn get_updatable(&self, id: i32) -> Result<Updatable<T>> {
        self.try_get_updatable_with(id, Parameters::default())?
            .ok_or_else(|| self.not_found(format_args!("id={id}")))
    }

    pub fn try_get_updatable(&self, id: i32) -> Result<Option<Updatable<T>>> {
        self.try_get_updatable_with(id, Parameters::default())
    }

    pub fn try_get_updatable_with(
        &self,
        id: i32,
        parameters: Parameters,
    ) -> Result<Option<Updatable<T>>> {
        let span = debug_span!("get", entity = T::NAME, collection = %self.collection, id);
        let _enter = span.enter();

        let mut cx = self.context(parameters);
        let item = self.repository.get_data_item(
            &self.collection,
            id,
            cx.required_fields_for_read(),
            cx.file_options(),
        )?;

        let Some(item) = item else {
            debug!("item not found");
            return Ok(None);
        };

        let entity = materialize(&mut cx, item)?;
        let item = cx.take_data_item().unwrap_or_default();
        Ok(Some(Updatable::new(entity, item, self.collection.clone())))
    }

    /// Loads the entity whose custom identifier equals `value`.
    ///
    /// `value` must have the identifier property's type.
    pub fn get_by_custom_id<P>(&self, value: P) -> Result<T>
    where
        P: fmt::Debug + Send + Sync + 'static,
    {
        let constant = Constant::new(value);
        self.find_by_custom_id(&constant)?.ok_or_else(|| {
            self.not_found(format_args!("custom id {}", constant.debug_str()))
        })
    }

    /// Loads the entity whose custom identifier equals `value`, or `None`
    /// when no item matches. More than one match is an error.
    pub fn try_get_by_custom_id<P>(&self, value: P) -> Result<Option<T>>
    where
        P: fmt::Debug + Send + Sync + 'static,
    {
        self.find_by_custom_id(&Constant::new(value))
    }

    fn find_by_custom_id(&self, constant: &Constant) -> Result<Option<T>> {
        let span = debug_span!("get_by_custom_id", entity = T::NAME, value = constant.debug_str());
        let _enter = span.enter();

        let (accessor, options) = self.custom_identifier()?;
        self.check_indexed(accessor, options)?;

        let mut cx = self.context(Parameters::default());
        let filter = accessor.compare(self.scope(&cx), BinaryOp::Eq, constant)?;
        if filter.has_local() {
            return Err(Error::unsupported_predicate(format!(
                "custom identifier `{}` cannot be looked up by the store",
                accessor.field()
            )));
        }

        let query = Query::new()
            .filter(filter)
            .view_fields(cx.required_fields_for_read().iter().cloned())
            .row_limit(2);
        self.log_query(&query);

        let mut items = self.fetch(&cx, &query)?;
        match items.len() {
            0 => Ok(None),
            1 => {
                let item = items.remove(0);
                materialize(&mut cx, item).map(Some)
            }
            n => Err(Error::too_many_records(format!(
                "custom identifier `{}` = {} matched {n} rows in {}",
                accessor.field(),
                constant.debug_str(),
                self.collection
            ))),
        }
    }

    /// Loads every entity of the collection.
    pub fn get_all(&self) -> Result<Vec<T>> {
        self.get_all_with(Parameters::default())
    }

    pub fn get_all_with(&self, parameters: Parameters) -> Result<Vec<T>> {
        let span = debug_span!("get_all", entity = T::NAME, collection = %self.collection);
        let _enter = span.enter();

        let mut cx = self.context(parameters);
        let items = self.repository.get_data_items(
            &self.collection,
            cx.required_fields_for_read(),
            cx.file_options(),
        )?;

        let mut entities = vec![];
        for item in items {
            entities.push(materialize(&mut cx, item?)?);
        }
        Ok(entities)
    }

    /// Loads the entities matching a native filter. `None` matches every
    /// item. `Local` subtrees of the filter are evaluated in memory.
    pub fn find(&self, filter: Option<Filter>) -> Result<Vec<T>> {
        self.find_with(filter, Parameters::default())
    }

    pub fn find_with(&self, filter: Option<Filter>, parameters: Parameters) -> Result<Vec<T>> {
        let plan = filter.map(QueryPlan::from_filter).unwrap_or_default();
        self.run(&plan, parameters)
    }

    /// Loads the entities matching `predicate`.
    ///
    /// The predicate is translated before any item is read; a predicate
    /// the store cannot evaluate fails here without touching the store.
    pub fn query(&self, predicate: Predicate<T>) -> Result<Vec<T>> {
        self.query_with(predicate, Parameters::default())
    }

    /// Like [`query`](Self::query). When `parameters` carry a page request
    /// only that page is returned.
    pub fn query_with(&self, predicate: Predicate<T>, mut parameters: Parameters) -> Result<Vec<T>> {
        if let Some(request) = parameters.page.take() {
            return Ok(self.page_with(predicate, request, parameters)?.items);
        }

        let plan = self.translate(&predicate)?;
        self.run(&plan, parameters)
    }

    /// Translates `predicate` against this manager's entity map.
    pub fn translate(&self, predicate: &Predicate<T>) -> Result<QueryPlan> {
        translate(&self.map, predicate)
    }

    fn run(&self, plan: &QueryPlan, parameters: Parameters) -> Result<Vec<T>> {
        let span = debug_span!("query", entity = T::NAME, collection = %self.collection);
        let _enter = span.enter();

        let mut cx = self.context(parameters);
        let query = Query::new()
            .filter(plan.native.clone())
            .view_fields(view_fields(&cx, plan));
        self.log_query(&query);

        let items = self
            .repository
            .find_data_items(&self.collection, &query, cx.file_options())?;

        let mut entities = vec![];
        for item in items {
            let item = item?;
            if matches_local(plan, &item)? {
                entities.push(materialize(&mut cx, item)?);
            }
        }
        debug!(count = entities.len(), "query finished");
        Ok(entities)
    }

    pub(crate) fn context(&self, parameters: Parameters) -> OperationContext<T> {
        OperationContext::new(self.map.clone(), self.collection.clone(), parameters)
    }

    pub(crate) fn scope<'a>(&self, cx: &'a OperationContext<T>) -> Scope<'a> {
        Scope {
            parameters: cx.parameters(),
            collection: Some(cx.collection()),
        }
    }

    pub(crate) fn update_method(&self, parameters: &Parameters) -> UpdateMethod {
        parameters.update_method.unwrap_or(self.update_method)
    }

    fn fetch(&self, cx: &OperationContext<T>, query: &Query) -> Result<Vec<DataItem>> {
        self.repository
            .find_data_items(cx.collection(), query, cx.file_options())?
            .collect()
    }

    fn custom_identifier(&self) -> Result<(&PropertyAccessor<T>, IdentifierOptions)> {
        match self.map.identifier() {
            Some(accessor) if !self.map.identifier_is_builtin() => Ok((
                accessor,
                self.map.identifier_options().unwrap_or_default(),
            )),
            _ => Err(Error::invalid_operation(format!(
                "`{}` has no custom identifier",
                T::NAME
            ))),
        }
    }

    fn check_indexed(&self, accessor: &PropertyAccessor<T>, options: IdentifierOptions) -> Result<()> {
        if options.skip_index_check || self.repository.is_indexed(&self.collection, accessor.field())? {
            return Ok(());
        }
        Err(Error::invalid_operation(format!(
            "custom identifier field `{}` is not indexed in {}",
            accessor.field(),
            self.collection
        )))
    }

    fn log_query(&self, query: &Query) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        match caml::Serializer::new().serialize(query) {
            Ok(caml) => debug!(%caml, "native query"),
            Err(err) => debug!(error = %err, "native query cannot be rendered"),
        }
    }

    fn not_found(&self, what: fmt::Arguments<'_>) -> Error {
        Error::record_not_found(format!("{}: {} {what}", self.collection, T::NAME))
    }
}

impl<T: Entity> fmt::Debug for Manager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("entity", &T::NAME)
            .field("collection", &self.collection)
            .field("update_method", &self.update_method)
            .field("repository", &self.repository)
            .finish()
    }
}

/// Reads fields plus the fields the filters compare against.
fn view_fields<T: Entity>(cx: &OperationContext<T>, plan: &QueryPlan) -> Vec<FieldName> {
    let mut fields = cx.required_fields_for_read().to_vec();
    for field in &plan.fields {
        if !fields.contains(field) {
            fields.push(field.clone());
        }
    }
    fields
}

fn matches_local(plan: &QueryPlan, item: &DataItem) -> Result<bool> {
    match &plan.local {
        Some(local) => eval(local, item),
        None => Ok(true),
    }
}

/// Reads `item` into a new entity through the context.
fn materialize<T: Entity>(cx: &mut OperationContext<T>, item: DataItem) -> Result<T> {
    cx.next_item();
    cx.set_data_item(item);
    cx.populate_entity()?;
    cx.take_entity()
        .ok_or_else(|| Error::invalid_operation("entity not populated"))
}
