use super::{write::Target, Manager, Outcome};
use crate::{err, Entity, Parameters, Result, Updatable};

use tracing::{debug, debug_span};

/// Summary of a batch write.
///
/// Items are processed in order. A hook canceling the operation stops the
/// batch at that item; items before it stay persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// Number of items persisted
    pub processed: usize,

    /// Positions of the items a hook skipped
    pub skipped: Vec<usize>,

    /// Position of the item at which a hook canceled the operation
    pub canceled_at: Option<usize>,
}

impl BatchResult {
    pub fn is_canceled(&self) -> bool {
        self.canceled_at.is_some()
    }

    /// Records the outcome of item `index`. Returns `false` when the batch
    /// must stop.
    fn record(&mut self, index: usize, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Persisted => self.processed += 1,
            Outcome::Skipped => self.skipped.push(index),
            Outcome::Canceled => {
                debug!(index, processed = self.processed, "batch canceled");
                self.canceled_at = Some(index);
                return false;
            }
        }
        true
    }
}

impl<T: Entity> Manager<T> {
    /// Creates every entity of `entities` in order, reusing one operation
    /// context.
    pub fn batch_create(&self, entities: &mut [T]) -> Result<BatchResult> {
        self.batch_create_with(entities, Parameters::default())
    }

    pub fn batch_create_with(&self, entities: &mut [T], parameters: Parameters) -> Result<BatchResult> {
        let span = debug_span!("batch_create", entity = T::NAME, collection = %self.collection, len = entities.len());
        let _enter = span.enter();

        let mut cx = self.context(parameters);
        let mut result = BatchResult::default();

        for (index, entity) in entities.iter_mut().enumerate() {
            let outcome = self
                .create_item(&mut cx, entity, Target::Item)
                .map_err(|e| e.context(err!("batch item {index}")))?;
            if !result.record(index, outcome) {
                break;
            }
        }
        Ok(result)
    }

    /// Updates every entity of `entities` in order, reusing one operation
    /// context.
    pub fn batch_update(&self, entities: &mut [Updatable<T>]) -> Result<BatchResult> {
        self.batch_update_with(entities, Parameters::default())
    }

    pub fn batch_update_with(
        &self,
        entities: &mut [Updatable<T>],
        parameters: Parameters,
    ) -> Result<BatchResult> {
        let span = debug_span!("batch_update", entity = T::NAME, len = entities.len());
        let _enter = span.enter();

        let mut cx = self.context(parameters);
        let mut result = BatchResult::default();

        for (index, updatable) in entities.iter_mut().enumerate() {
            let outcome = self
                .update_item(&mut cx, updatable)
                .map_err(|e| e.context(err!("batch item {index}")))?;
            if !result.record(index, outcome) {
                break;
            }
        }
        Ok(result)
    }

    /// Deletes the items with the built-in ids `ids` in order.
    pub fn batch_delete(&self, ids: &[i32]) -> Result<BatchResult> {
        self.batch_delete_with(ids, Parameters::default())
    }

    pub fn batch_delete_with(&self, ids: &[i32], parameters: Parameters) -> Result<BatchResult> {
        let span = debug_span!("batch_delete", entity = T::NAME, collection = %self.collection, len = ids.len());
        let _enter = span.enter();

        let mut cx = self.context(parameters);
        let mut result = BatchResult::default();

        for (index, &id) in ids.iter().enumerate() {
            let outcome = self
                .delete_item(&mut cx, id)
                .map_err(|e| e.context(err!("batch item {index}")))?;
            if !result.record(index, outcome) {
                break;
            }
        }
        Ok(result)
    }
}
