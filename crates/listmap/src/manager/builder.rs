use super::{Hook, Hooks, Manager};
use crate::{
    repository::UpdateMethod, CollectionHandle, Entity, OperationContext, Registry, Repository,
    Result,
};

use std::sync::Arc;
use tracing::debug;

/// Configures a [`Manager`].
///
/// The collection defaults to the list named after the entity and the
/// registry to [`Registry::global`].
pub struct Builder<T: Entity> {
    repository: Arc<dyn Repository>,
    registry: Option<Registry>,
    collection: Option<CollectionHandle>,
    update_method: UpdateMethod,
    hooks: Hooks<T>,
}

impl<T: Entity> Builder<T> {
    pub(super) fn new(repository: Arc<dyn Repository>) -> Self {
        Self {
            repository,
            registry: None,
            collection: None,
            update_method: UpdateMethod::default(),
            hooks: Hooks {
                before_create: vec![],
                before_update: vec![],
                before_delete: vec![],
            },
        }
    }

    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn collection(mut self, collection: CollectionHandle) -> Self {
        self.collection = Some(collection);
        self
    }

    /// How updates are recorded unless a call overrides it.
    pub fn update_method(mut self, method: UpdateMethod) -> Self {
        self.update_method = method;
        self
    }

    pub fn on_before_create(
        mut self,
        hook: impl Fn(&mut OperationContext<T>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.before_create.push(Box::new(hook) as Hook<T>);
        self
    }

    pub fn on_before_update(
        mut self,
        hook: impl Fn(&mut OperationContext<T>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.before_update.push(Box::new(hook) as Hook<T>);
        self
    }

    pub fn on_before_delete(
        mut self,
        hook: impl Fn(&mut OperationContext<T>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.before_delete.push(Box::new(hook) as Hook<T>);
        self
    }

    /// Resolves the entity map and creates the manager. Fails when the map
    /// of `T` cannot be built.
    pub fn build(self) -> Result<Manager<T>> {
        let registry = self.registry.unwrap_or_else(|| Registry::global().clone());
        let map = registry.entity_map::<T>()?;
        let collection = self
            .collection
            .unwrap_or_else(|| CollectionHandle::list(T::NAME));

        debug!(entity = T::NAME, %collection, "manager ready");

        Ok(Manager {
            repository: self.repository,
            registry,
            map,
            collection,
            update_method: self.update_method,
            hooks: self.hooks,
        })
    }
}
