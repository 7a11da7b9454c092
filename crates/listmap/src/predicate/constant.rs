use std::{any::Any, fmt, sync::Arc};

/// A typed constant captured by a predicate.
///
/// The value keeps the property's own type; the accessor bound to the
/// property downcasts it back when the predicate is translated.
#[derive(Clone)]
pub struct Constant {
    value: Arc<dyn Any + Send + Sync>,
    debug: String,
}

impl Constant {
    pub fn new<P>(value: P) -> Self
    where
        P: fmt::Debug + Send + Sync + 'static,
    {
        Self {
            debug: format!("{value:?}"),
            value: Arc::new(value),
        }
    }

    pub fn downcast_ref<P: 'static>(&self) -> Option<&P> {
        self.value.downcast_ref()
    }

    pub fn as_any(&self) -> &(dyn Any + Send + Sync) {
        &*self.value
    }

    /// The constant as it appeared in the predicate, for diagnostics.
    pub fn debug_str(&self) -> &str {
        &self.debug
    }
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug)
    }
}
