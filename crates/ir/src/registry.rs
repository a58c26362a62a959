//! Descriptor cache
//!
//! A `Registry` memoizes one `ModelDescriptor` per model type. Lookups take
//! a read lock; a miss takes the write lock for the whole construction,
//! including the construction of every type the new one refers to, so each
//! type is built exactly once per registry.
//!
//! ```rust,ignore
//! use ormeta_ir::Registry;
//!
//! let registry = Registry::builder()
//!     .singular_table(true)
//!     .table_name_hook(|name| format!("app_{}", name))
//!     .build();
//!
//! let user = registry.descriptor::<User>()?;
//! assert_eq!(user.table_name(), "app_user");
//! ```

use crate::config::RegistryConfig;
use crate::descriptor::ModelDescriptor;
use crate::extract;
use crate::naming::TableNameHook;
use crate::relationship;
use ormeta_core::{ConfigIssue, DatabaseType, EngineError, EngineResult, Model, ModelRef};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Cache = HashMap<TypeId, Arc<ModelDescriptor>>;

// ============================================================================
// Registry
// ============================================================================

/// Memoizing store of model descriptors
pub struct Registry {
    cache: RwLock<Cache>,
    config: RegistryConfig,
    hook: Option<TableNameHook>,
}

impl Registry {
    /// Create a registry with the default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with the given configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            config,
            hook: None,
        }
    }

    /// Start configuring a registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The process-wide registry, with the default configuration
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Target database of this registry's consumers
    pub fn database(&self) -> DatabaseType {
        self.config.database
    }

    /// Descriptor of `T`, building it on first use
    ///
    /// Fails with `EngineError::Configuration` when any relationship field
    /// of `T` is misconfigured; the partial descriptor stays cached and is
    /// available through [`Registry::cached`].
    pub fn descriptor<T: Model>(&self) -> EngineResult<Arc<ModelDescriptor>> {
        self.descriptor_of(ModelRef::of::<T>())
    }

    /// Descriptor of the model behind `model`, building it on first use
    pub fn descriptor_of(&self, model: ModelRef) -> EngineResult<Arc<ModelDescriptor>> {
        let cached = self.read()?.get(&model.type_id()).cloned();
        let descriptor = match cached {
            Some(descriptor) => descriptor,
            None => self.build(model)?,
        };

        if descriptor.issues().is_empty() {
            Ok(descriptor)
        } else {
            Err(EngineError::configuration(
                descriptor.type_name(),
                descriptor.issues().to_vec(),
            ))
        }
    }

    /// Cached descriptor of `T`, without building it
    ///
    /// Unlike [`Registry::descriptor`], this hands out descriptors that
    /// carry configuration issues.
    pub fn cached<T: Model>(&self) -> EngineResult<Option<Arc<ModelDescriptor>>> {
        Ok(self.read()?.get(&TypeId::of::<T>()).cloned())
    }

    /// Check if `T` has been built
    pub fn contains<T: Model>(&self) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }

    /// Number of cached descriptors
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if nothing has been built yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached descriptor
    ///
    /// Descriptors already handed out stay valid; later lookups rebuild.
    /// Also recovers a registry whose lock was poisoned by a panicking
    /// `schema()` or table-name hook.
    pub fn reset(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(count = cache.len(), "Resetting descriptor cache");
        cache.clear();
        drop(cache);
        self.cache.clear_poison();
    }

    fn build(&self, model: ModelRef) -> EngineResult<Arc<ModelDescriptor>> {
        let mut cache = self.write()?;
        let mut ctx = BuildContext {
            cache: &mut *cache,
            config: &self.config,
            hook: self.hook.as_ref(),
            in_progress: HashSet::new(),
            deferred: Vec::new(),
            unfinished: HashMap::new(),
        };

        // The write lock is held and the type is not in progress, so it
        // is either cached by a racing builder or built here.
        ctx.resolve(model).ok_or_else(|| {
            EngineError::internal(format!("failed to build descriptor of {}", model.rust_name()))
        })
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Cache>> {
        self.cache
            .read()
            .map_err(|_| EngineError::internal("descriptor cache lock poisoned"))
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Cache>> {
        self.cache
            .write()
            .map_err(|_| EngineError::internal("descriptor cache lock poisoned"))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("has_table_name_hook", &self.hook.is_some())
            .field("len", &self.len())
            .finish()
    }
}

// ============================================================================
// RegistryBuilder
// ============================================================================

/// Builder for a [`Registry`]
#[derive(Default)]
pub struct RegistryBuilder {
    config: RegistryConfig,
    hook: Option<TableNameHook>,
}

impl RegistryBuilder {
    /// Replace the whole configuration
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Use singular table names
    pub fn singular_table(mut self, singular: bool) -> Self {
        self.config.singular_table = singular;
        self
    }

    /// Set the target database
    pub fn database(mut self, database: DatabaseType) -> Self {
        self.config.database = database;
        self
    }

    /// Rewrite every derived table name
    pub fn table_name_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            cache: RwLock::new(HashMap::new()),
            config: self.config,
            hook: self.hook,
        }
    }
}

// ============================================================================
// BuildContext
// ============================================================================

/// State of one construction, running under the registry's write lock
pub(crate) struct BuildContext<'a> {
    cache: &'a mut Cache,
    config: &'a RegistryConfig,
    hook: Option<&'a TableNameHook>,
    /// Types in their first pass, not yet visible in the cache
    in_progress: HashSet<TypeId>,
    /// Candidates waiting for a type in `in_progress`
    deferred: Vec<Deferred>,
    /// Issues of owners that still have deferred candidates
    unfinished: HashMap<TypeId, Vec<ConfigIssue>>,
}

/// A relationship candidate whose target was in its first pass
struct Deferred {
    target: TypeId,
    owner: Arc<ModelDescriptor>,
    field: usize,
}

impl BuildContext<'_> {
    pub(crate) fn config(&self) -> &RegistryConfig {
        self.config
    }

    pub(crate) fn hook(&self) -> Option<&TableNameHook> {
        self.hook
    }

    /// Cached descriptor of `model`, building it if needed
    ///
    /// A descriptor returned while its own construction is under way is
    /// tentative: fields and primary keys are final, relationships are not.
    /// Returns `None` for a type still in its first pass: a model that
    /// embeds itself, or a relationship target reached from inside one of
    /// its own embedded models. The relationship pass defers the latter.
    pub(crate) fn resolve(&mut self, model: ModelRef) -> Option<Arc<ModelDescriptor>> {
        let type_id = model.type_id();
        if let Some(descriptor) = self.cache.get(&type_id) {
            return Some(Arc::clone(descriptor));
        }
        if !self.in_progress.insert(type_id) {
            return None;
        }

        tracing::debug!(model = model.rust_name(), "Building descriptor");

        let descriptor = Arc::new(extract::extract(self, model));
        self.in_progress.remove(&type_id);
        self.cache.insert(type_id, Arc::clone(&descriptor));
        self.resume(type_id, &descriptor);

        let issues = relationship::resolve_relationships(self, &descriptor);
        self.finish(&descriptor, issues);

        Some(descriptor)
    }

    /// Queue a candidate of `owner` until `target` is cached
    pub(crate) fn defer(&mut self, target: ModelRef, owner: Arc<ModelDescriptor>, field: usize) {
        self.deferred.push(Deferred {
            target: target.type_id(),
            owner,
            field,
        });
    }

    fn is_waiting(&self, owner: TypeId) -> bool {
        self.deferred
            .iter()
            .any(|entry| entry.owner.model().type_id() == owner)
    }

    /// Resolve the candidates that were waiting for `related`
    fn resume(&mut self, target: TypeId, related: &ModelDescriptor) {
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.deferred)
            .into_iter()
            .partition(|entry| entry.target == target);
        self.deferred = waiting;

        for entry in ready {
            let field = &entry.owner.fields()[entry.field];
            let issues = relationship::resolve_field(&entry.owner, field, related);
            self.finish(&entry.owner, issues.into_iter().collect());
        }
    }

    /// Finalize `descriptor` unless candidates of it are still deferred
    fn finish(&mut self, descriptor: &ModelDescriptor, issues: Vec<ConfigIssue>) {
        let type_id = descriptor.model().type_id();
        let mut collected = self.unfinished.remove(&type_id).unwrap_or_default();
        collected.extend(issues);

        if self.is_waiting(type_id) {
            self.unfinished.insert(type_id, collected);
            return;
        }

        descriptor.finalize(collected);
        tracing::debug!(
            model = descriptor.type_name(),
            table = descriptor.table_name(),
            fields = descriptor.fields().len(),
            relationships = descriptor.relationships().count(),
            "Descriptor finalized"
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
