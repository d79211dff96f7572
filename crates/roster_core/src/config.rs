//! Collection configuration.

use crate::collection::{Batch, Input};
use crate::comparator::Comparator;
use crate::error::{CoreError, CoreResult, RESERVED_INDEX_NAMES};
use crate::model::{ModelFactory, DEFAULT_ID_ATTRIBUTE};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Transforms a whole batch of inputs before reconciliation.
pub type Parser = Arc<dyn Fn(Batch<Input>) -> Batch<Input> + Send + Sync>;

/// Configuration for creating a collection.
#[derive(Clone, Default)]
pub struct CollectionConfig {
    /// Index used for identity lookups and duplicate suppression.
    /// Defaults to the member type's identifying attribute, else `id`.
    pub main_index: Option<String>,

    /// Additional attributes to index.
    pub indexes: Vec<String>,

    /// Ordering kept after every mutating batch.
    pub comparator: Option<Comparator>,

    /// Member type used to build members from raw attributes.
    pub model: Option<Arc<dyn ModelFactory>>,

    /// Whole-batch input transform applied when a call sets `parse`.
    pub parser: Option<Parser>,

    /// Opaque handle to whatever owns the collection.
    pub parent: Option<Arc<dyn Any + Send + Sync>>,
}

impl CollectionConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the main index.
    #[must_use]
    pub fn main_index(mut self, name: impl Into<String>) -> Self {
        self.main_index = Some(name.into());
        self
    }

    /// Adds a secondary index.
    #[must_use]
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.indexes.push(name.into());
        self
    }

    /// Sets the comparator.
    #[must_use]
    pub fn comparator(mut self, comparator: impl Into<Comparator>) -> Self {
        self.comparator = Some(comparator.into());
        self
    }

    /// Sets the member type.
    #[must_use]
    pub fn model<F: ModelFactory + 'static>(mut self, factory: F) -> Self {
        self.model = Some(Arc::new(factory));
        self
    }

    /// Sets the batch parser.
    #[must_use]
    pub fn parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(Batch<Input>) -> Batch<Input> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Sets the parent handle.
    #[must_use]
    pub fn parent<P: Any + Send + Sync>(mut self, parent: Arc<P>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Name of the attribute that identifies raw inputs.
    pub fn id_attribute(&self) -> &str {
        self.model
            .as_deref()
            .map_or(DEFAULT_ID_ATTRIBUTE, |model| model.id_attribute())
    }

    /// Name of the main index.
    pub fn main_index_name(&self) -> &str {
        self.main_index
            .as_deref()
            .unwrap_or_else(|| self.id_attribute())
    }

    /// Every maintained index, main index first, without duplicates.
    pub fn index_names(&self) -> Vec<String> {
        let mut names = vec![self.main_index_name().to_string()];
        for name in &self.indexes {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Checks the configuration for programmer errors.
    ///
    /// # Errors
    ///
    /// Returns an error if an index name is empty or reserved.
    pub fn validate(&self) -> CoreResult<()> {
        for name in self.index_names() {
            if name.is_empty() {
                return Err(CoreError::EmptyIndexName);
            }
            if RESERVED_INDEX_NAMES.contains(&name.as_str()) {
                return Err(CoreError::reserved_index_name(name));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CollectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionConfig")
            .field("main_index", &self.main_index_name())
            .field("indexes", &self.indexes)
            .field("comparator", &self.comparator)
            .field("model", &self.model.is_some())
            .field("parser", &self.parser.is_some())
            .field("parent", &self.parent.is_some())
            .finish()
    }
}
