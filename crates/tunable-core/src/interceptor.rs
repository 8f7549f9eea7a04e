//! Interceptor: registry of handlers and batch load/store
//!
//! ```text
//! register(target) → Schema → HandlerFactory → registry[target][key] = handler
//! load(source, targets)  : source[key] → handler.write → field
//! store(sink, targets)   : field → handler.read → sink.record … sink.commit
//! ```
//!
//! One mutex covers the registry, so register, load and store are
//! serialised. Lock order is registry first, then the target's own lock;
//! do not call into the interceptor while holding a target's write guard.

use crate::backend::{FieldRecord, TunableSink, TunableSource};
use crate::config::{InterceptorConfig, UnregisteredPolicy, UnsupportedPolicy};
use crate::declaration::{check_key_part, Schema, Tunable, TunableMeta};
use crate::error::{FieldError, InterceptError, InterceptResult};
use crate::factory::{HandlerFactory, StandardFactory};
use crate::form::FormControl;
use crate::handler::TunableHandler;
use crate::report::{BatchReport, FieldFailure};
use crate::target::{Shared, TargetId};
use crate::value::ValueKind;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};

/// Registry entry for one object
struct RegistryEntry {
    type_name: &'static str,
    handlers: IndexMap<String, Box<dyn TunableHandler>>,
    liveness: Weak<dyn Any + Send + Sync>,
}

impl RegistryEntry {
    fn is_live(&self) -> bool {
        self.liveness.strong_count() > 0
    }
}

/// Outcome of [`Interceptor::register`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Registered object
    pub target: TargetId,
    /// Keys bound by this scan, in declaration order
    pub keys: Vec<String>,
    /// Keys of sites the factory declined
    pub skipped: Vec<String>,
    /// Whether the object was already registered
    pub rescanned: bool,
}

/// Snapshot of one registered handler
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerDescriptor {
    /// Owning object
    pub target: TargetId,
    /// External key
    pub key: String,
    /// Declaration metadata
    pub meta: TunableMeta,
    /// Value kind
    pub kind: ValueKind,
    /// Candidates for choice fields
    pub possible_values: Option<Vec<String>>,
    /// Current value, `None` if it cannot be read
    pub current: Option<String>,
}

/// Binds registered objects' tunables to sources and sinks
pub struct Interceptor<F = StandardFactory> {
    config: InterceptorConfig,
    factory: F,
    registry: Mutex<IndexMap<TargetId, RegistryEntry>>,
}

impl Default for Interceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Interceptor {
    /// Create interceptor with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(InterceptorConfig::default())
    }

    /// Create interceptor with custom configuration
    #[inline]
    #[must_use]
    pub fn with_config(config: InterceptorConfig) -> Self {
        Self::with_factory(config, StandardFactory)
    }
}

impl<F> fmt::Debug for Interceptor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("Interceptor")
            .field("config", &self.config)
            .field("targets", &registry.len())
            .field(
                "handlers",
                &registry.values().map(|e| e.handlers.len()).sum::<usize>(),
            )
            .finish_non_exhaustive()
    }
}

impl<F: HandlerFactory> Interceptor<F> {
    /// Create interceptor with a custom handler factory
    #[must_use]
    pub fn with_factory(config: InterceptorConfig, factory: F) -> Self {
        Self {
            config,
            factory,
            registry: Mutex::new(IndexMap::new()),
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    /// Handler factory
    #[inline]
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Scan `target`'s declarations and bind its handlers
    ///
    /// Registering an object again re-scans it. Handlers are replaced by
    /// key, new sites are added and sites no longer declared are unbound, so
    /// no key is ever bound twice.
    ///
    /// # Errors
    /// - [`InterceptError::InvalidDeclaration`] for empty metadata or names
    ///   that cannot form an external key
    /// - [`InterceptError::DuplicateKey`] if two sites share a key
    /// - [`InterceptError::UnsupportedField`] if a site is declined under
    ///   [`UnsupportedPolicy::Reject`]
    ///
    /// On error the registry is left unchanged.
    pub fn register<T: Tunable>(&self, target: &Shared<T>) -> InterceptResult<Registration> {
        let mut registry = self.registry.lock();
        let id = TargetId::of(target);
        let type_name = std::any::type_name::<T>();

        let sites = Schema::of(&*target.read()).into_sites();

        let mut seen = HashSet::with_capacity(sites.len());
        for site in &sites {
            check_key_part("field name", site.name())
                .and_then(|()| site.meta().validate())
                .map_err(|reason| InterceptError::InvalidDeclaration {
                    field: site.name().to_string(),
                    reason,
                })?;
            let key = site.key();
            if !seen.insert(key.clone()) {
                return Err(InterceptError::DuplicateKey(key));
            }
        }

        let mut handlers = IndexMap::with_capacity(sites.len());
        let mut skipped = Vec::new();
        for site in &sites {
            match self.factory.create(target, site) {
                Some(handler) => {
                    handlers.insert(site.key(), handler);
                }
                None => match self.config.unsupported {
                    UnsupportedPolicy::Reject => {
                        return Err(InterceptError::UnsupportedField {
                            key: site.key(),
                            type_name: site.binding().type_label().to_string(),
                        });
                    }
                    UnsupportedPolicy::Skip => {
                        tracing::warn!(
                            key = %site.key(),
                            type_name = site.binding().type_label(),
                            "skipping unsupported tunable"
                        );
                        skipped.push(site.key());
                    }
                },
            }
        }

        let keys: Vec<String> = handlers.keys().cloned().collect();
        let rescanned = registry.get(&id).is_some_and(RegistryEntry::is_live);
        if rescanned {
            // Same object: the new scan wins, surviving keys keep their order.
            if let Some(entry) = registry.get_mut(&id) {
                entry.handlers.retain(|key, _| handlers.contains_key(key));
                entry.handlers.extend(handlers);
            }
        } else {
            // New object, or a dropped one whose address was reused.
            let erased: Arc<dyn Any + Send + Sync> = target.clone();
            registry.insert(
                id,
                RegistryEntry {
                    type_name,
                    handlers,
                    liveness: Arc::downgrade(&erased),
                },
            );
        }

        tracing::debug!(
            target_id = %id,
            type_name,
            bound = keys.len(),
            skipped = skipped.len(),
            rescanned,
            "registered tunables"
        );

        Ok(Registration {
            target: id,
            keys,
            skipped,
            rescanned,
        })
    }

    /// Remove a target from the registry
    pub fn unregister(&self, target: impl Into<TargetId>) -> bool {
        self.registry.lock().shift_remove(&target.into()).is_some()
    }

    /// Remove every target
    pub fn clear(&self) {
        self.registry.lock().clear();
    }

    /// Drop entries whose objects no longer exist, returning how many
    pub fn prune_dropped(&self) -> usize {
        let mut registry = self.registry.lock();
        let before = registry.len();
        registry.retain(|_, entry| entry.is_live());
        before - registry.len()
    }

    /// Check if a live target is registered
    #[must_use]
    pub fn is_registered(&self, target: impl Into<TargetId>) -> bool {
        self.registry
            .lock()
            .get(&target.into())
            .is_some_and(RegistryEntry::is_live)
    }

    /// Number of registry entries, including dropped objects not yet pruned
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.lock().is_empty()
    }

    /// Number of handlers bound for a target
    #[must_use]
    pub fn handler_count(&self, target: impl Into<TargetId>) -> Option<usize> {
        self.registry
            .lock()
            .get(&target.into())
            .map(|entry| entry.handlers.len())
    }

    /// Keys bound for a target, in registration order
    #[must_use]
    pub fn keys(&self, target: impl Into<TargetId>) -> Option<Vec<String>> {
        self.registry
            .lock()
            .get(&target.into())
            .map(|entry| entry.handlers.keys().cloned().collect())
    }

    /// Type name recorded for a target
    #[must_use]
    pub fn type_name(&self, target: impl Into<TargetId>) -> Option<&'static str> {
        self.registry.lock().get(&target.into()).map(|entry| entry.type_name)
    }

    /// Live targets in registration order
    #[must_use]
    pub fn targets(&self) -> Vec<TargetId> {
        self.registry
            .lock()
            .iter()
            .filter(|(_, entry)| entry.is_live())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Snapshot every handler of every live target
    #[must_use]
    pub fn descriptors(&self) -> Vec<HandlerDescriptor> {
        let registry = self.registry.lock();
        registry
            .iter()
            .filter(|(_, entry)| entry.is_live())
            .flat_map(|(id, entry)| entry.handlers.values().map(move |h| describe(*id, h.as_ref())))
            .collect()
    }

    /// Apply values from `source` to the given targets
    ///
    /// Keys absent from the source leave their fields untouched. A value
    /// that does not convert is reported and the rest of the batch
    /// continues.
    ///
    /// # Errors
    /// [`InterceptError::Unregistered`] under [`UnregisteredPolicy::Strict`]
    /// when any target is not registered; no target is modified then.
    pub fn load<S, I>(&self, source: &S, targets: I) -> InterceptResult<BatchReport>
    where
        S: TunableSource + ?Sized,
        I: IntoIterator,
        I::Item: Into<TargetId>,
    {
        let registry = self.registry.lock();
        let mut report = BatchReport::default();
        let live = self.resolve(&registry, targets, &mut report)?;
        for id in live {
            load_entry(id, &registry[&id], source, &mut report);
        }
        tracing::debug!(
            applied = report.applied.len(),
            failed = report.failures.len(),
            "loaded tunables"
        );
        Ok(report)
    }

    /// Apply values from `source` to every live registered target
    pub fn load_all<S: TunableSource + ?Sized>(&self, source: &S) -> BatchReport {
        let registry = self.registry.lock();
        let mut report = BatchReport::default();
        for (id, entry) in registry.iter().filter(|(_, e)| e.is_live()) {
            load_entry(*id, entry, source, &mut report);
        }
        report
    }

    /// Record the given targets' values into `sink`, then commit once
    ///
    /// A field that cannot be read, or that the sink refuses, is reported
    /// and the rest of the batch continues.
    ///
    /// # Errors
    /// - [`InterceptError::Unregistered`] under
    ///   [`UnregisteredPolicy::Strict`]; nothing is recorded then
    /// - [`InterceptError::Backend`] if the commit fails
    pub fn store<S, I>(&self, sink: &mut S, targets: I) -> InterceptResult<BatchReport>
    where
        S: TunableSink + ?Sized,
        I: IntoIterator,
        I::Item: Into<TargetId>,
    {
        let registry = self.registry.lock();
        let mut report = BatchReport::default();
        let live = self.resolve(&registry, targets, &mut report)?;
        for id in live {
            store_entry(id, &registry[&id], sink, &mut report);
        }
        sink.commit()?;
        tracing::debug!(
            stored = report.applied.len(),
            failed = report.failures.len(),
            "stored tunables"
        );
        Ok(report)
    }

    /// Record every live registered target into `sink`, then commit once
    ///
    /// # Errors
    /// [`InterceptError::Backend`] if the commit fails
    pub fn store_all<S: TunableSink + ?Sized>(&self, sink: &mut S) -> InterceptResult<BatchReport> {
        let registry = self.registry.lock();
        let mut report = BatchReport::default();
        for (id, entry) in registry.iter().filter(|(_, e)| e.is_live()) {
            store_entry(*id, entry, sink, &mut report);
        }
        sink.commit()?;
        Ok(report)
    }

    /// Form controls for a target's visible tunables
    ///
    /// # Errors
    /// [`InterceptError::Unregistered`] if the target is not registered
    pub fn form_controls(&self, target: impl Into<TargetId>) -> InterceptResult<Vec<FormControl>> {
        let id = target.into();
        let registry = self.registry.lock();
        let entry = live_entry(&registry, id)?;
        Ok(entry
            .handlers
            .values()
            .filter(|h| !h.meta().hidden)
            .map(|h| FormControl::from_descriptor(&describe(id, h.as_ref())))
            .collect())
    }

    /// Apply one edited value, as a form's change callback would
    ///
    /// # Errors
    /// - [`InterceptError::Unregistered`] if the target is not registered
    /// - [`InterceptError::UnknownKey`] if the target has no such key
    /// - [`InterceptError::Field`] if the value is rejected
    pub fn apply_form_change(
        &self,
        target: impl Into<TargetId>,
        key: &str,
        value: &str,
    ) -> InterceptResult<()> {
        let id = target.into();
        let registry = self.registry.lock();
        let entry = live_entry(&registry, id)?;
        let handler = entry.handlers.get(key).ok_or_else(|| InterceptError::UnknownKey {
            target: id,
            key: key.to_string(),
        })?;
        handler.write(value).map_err(|source| InterceptError::Field {
            key: key.to_string(),
            source,
        })
    }

    fn resolve<I>(
        &self,
        registry: &IndexMap<TargetId, RegistryEntry>,
        targets: I,
        report: &mut BatchReport,
    ) -> InterceptResult<Vec<TargetId>>
    where
        I: IntoIterator,
        I::Item: Into<TargetId>,
    {
        let mut live = Vec::new();
        for id in targets.into_iter().map(Into::into) {
            if registry.get(&id).is_some_and(RegistryEntry::is_live) {
                live.push(id);
                continue;
            }
            match self.config.unregistered {
                UnregisteredPolicy::Strict => return Err(InterceptError::Unregistered(id)),
                UnregisteredPolicy::Tolerant => {
                    tracing::warn!(target_id = %id, "skipping unregistered target");
                    report.skipped_targets.push(id);
                }
            }
        }
        Ok(live)
    }
}

fn live_entry(
    registry: &IndexMap<TargetId, RegistryEntry>,
    id: TargetId,
) -> InterceptResult<&RegistryEntry> {
    registry
        .get(&id)
        .filter(|entry| entry.is_live())
        .ok_or(InterceptError::Unregistered(id))
}

fn describe(target: TargetId, handler: &dyn TunableHandler) -> HandlerDescriptor {
    HandlerDescriptor {
        target,
        key: handler.key().to_string(),
        meta: handler.meta().clone(),
        kind: handler.kind(),
        possible_values: handler.possible_values(),
        current: handler.read().ok(),
    }
}

fn load_entry<S: TunableSource + ?Sized>(
    id: TargetId,
    entry: &RegistryEntry,
    source: &S,
    report: &mut BatchReport,
) {
    for (key, handler) in &entry.handlers {
        let Some(raw) = source.lookup(key) else {
            report.untouched.push(key.clone());
            continue;
        };
        match handler.write(&raw) {
            Ok(()) => report.applied.push(key.clone()),
            Err(error) => {
                tracing::warn!(key = %key, %error, "failed to load tunable");
                report.failures.push(FieldFailure {
                    target: id,
                    key: key.clone(),
                    error,
                });
            }
        }
    }
}

fn store_entry<S: TunableSink + ?Sized>(
    id: TargetId,
    entry: &RegistryEntry,
    sink: &mut S,
    report: &mut BatchReport,
) {
    for (key, handler) in &entry.handlers {
        let outcome = handler.read().and_then(|value| {
            sink.record(FieldRecord {
                key,
                value: &value,
                meta: handler.meta(),
            })
            .map_err(|e| FieldError::Rejected(e.to_string()))
        });
        match outcome {
            Ok(()) => report.applied.push(key.clone()),
            Err(error) => {
                tracing::warn!(key = %key, %error, "failed to store tunable");
                report.failures.push(FieldFailure {
                    target: id,
                    key: key.clone(),
                    error,
                });
            }
        }
    }
}
