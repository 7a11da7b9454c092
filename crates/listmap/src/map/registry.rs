use crate::{Entity, EntityMap, Error, Result};

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError},
    thread::{self, ThreadId},
};
use tracing::debug;

/// Holds the entity map of every entity type used through it.
///
/// A map is built the first time its type is requested and shared from
/// then on. Cloning a registry shares its maps.
///
/// Building follows three states per type. A request made while another
/// thread builds the map waits for it, unless that thread is itself
/// waiting, directly or through others, on a map the requesting thread
/// builds. Such a request, like one made by the building thread itself
/// (an entity mapping itself as a value object), fails with
/// [`Error::mapper_initializing`]. A failed build is remembered:
/// every later request returns the failure again, wrapped in
/// [`Error::mapper_initialization`].
#[derive(Clone, Default)]
pub struct Registry {
    slots: Arc<Mutex<HashMap<TypeId, Arc<Slot>>>>,

    /// Thread waiting for a map -> thread building that map
    waits: Arc<Mutex<HashMap<ThreadId, ThreadId>>>,
}

#[derive(Default)]
struct Slot {
    state: Mutex<State>,
    ready: Condvar,
}

#[derive(Default)]
enum State {
    #[default]
    NotInitialized,
    Initializing(ThreadId),
    Ready(Arc<dyn Any + Send + Sync>),
    Failed(Error),
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Returns the map of `T`, building it on first use.
    pub fn entity_map<T: Entity>(&self) -> Result<Arc<EntityMap<T>>> {
        let slot = self.slot::<T>();
        let current = thread::current().id();

        let mut state = lock(&slot.state);
        loop {
            match &*state {
                State::Ready(map) => return downcast::<T>(map.clone()),
                State::Failed(cause) => {
                    return Err(cause.clone().context(Error::mapper_initialization(T::NAME)))
                }
                State::Initializing(owner) if *owner == current => {
                    return Err(Error::mapper_initializing(T::NAME))
                }
                State::Initializing(owner) => {
                    if !self.start_waiting(current, *owner) {
                        debug!(entity = T::NAME, "entity maps need each other across threads");
                        return Err(Error::mapper_initializing(T::NAME));
                    }
                }
                State::NotInitialized => break,
            }
            state = slot.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
            lock(&self.waits).remove(&current);
        }
        *state = State::Initializing(current);
        drop(state);

        debug!(entity = T::NAME, "building entity map");

        let mut guard = InitGuard { slot: &slot, done: false };
        let result = EntityMap::<T>::build(self);
        guard.done = true;

        let mut state = lock(&slot.state);
        let result = match result {
            Ok(map) => {
                let map = Arc::new(map);
                debug!(
                    entity = T::NAME,
                    fields = map.required_fields_for_read().len(),
                    "entity map ready"
                );
                *state = State::Ready(map.clone());
                Ok(map)
            }
            Err(err) => {
                debug!(entity = T::NAME, error = %err, "entity map failed to build");
                *state = State::Failed(err.clone());
                Err(err.context(Error::mapper_initialization(T::NAME)))
            }
        };
        slot.ready.notify_all();
        result
    }

    /// Returns `true` when the map of `T` is built and usable.
    pub fn is_ready<T: Entity>(&self) -> bool {
        let slots = lock(&self.slots);
        slots
            .get(&TypeId::of::<T>())
            .is_some_and(|slot| matches!(*lock(&slot.state), State::Ready(_)))
    }

    /// Records that `current` waits for `owner`. Returns `false`, recording
    /// nothing, when `owner` already waits on `current`.
    fn start_waiting(&self, current: ThreadId, owner: ThreadId) -> bool {
        let mut waits = lock(&self.waits);
        let mut next = Some(owner);
        while let Some(thread) = next {
            if thread == current {
                return false;
            }
            next = waits.get(&thread).copied();
        }
        waits.insert(current, owner);
        true
    }

    fn slot<T: 'static>(&self) -> Arc<Slot> {
        lock(&self.slots)
            .entry(TypeId::of::<T>())
            .or_default()
            .clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn downcast<T: Entity>(map: Arc<dyn Any + Send + Sync>) -> Result<Arc<EntityMap<T>>> {
    map.downcast::<EntityMap<T>>()
        .map_err(|_| Error::invalid_operation(format!("registry holds a foreign map for `{}`", T::NAME)))
}

/// Marks the slot failed when building panics, so waiting threads wake up.
struct InitGuard<'a> {
    slot: &'a Slot,
    done: bool,
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        *lock(&self.slot.state) = State::Failed(crate::err!("building the entity map panicked"));
        self.slot.ready.notify_all();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = lock(&self.slots);
        f.debug_struct("Registry").field("entities", &slots.len()).finish()
    }
}
