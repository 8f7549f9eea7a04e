//! Handler factories
//!
//! A factory turns a declaration site into a handler, or declines with
//! `None`. Whether a declined site is fatal is the interceptor's policy,
//! not the factory's.

use crate::declaration::{Site, Tunable};
use crate::handler::{FieldHandler, TunableHandler};
use crate::target::Shared;
use crate::value::ValueKind;

/// Builds handlers for declaration sites
pub trait HandlerFactory: Send + Sync {
    /// Create a handler for `site` of `target`, or `None` if unsupported
    fn create<T: Tunable>(&self, target: &Shared<T>, site: &Site<T>) -> Option<Box<dyn TunableHandler>>;
}

/// Factory supporting every built-in [`ValueKind`]
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFactory;

impl HandlerFactory for StandardFactory {
    fn create<T: Tunable>(&self, target: &Shared<T>, site: &Site<T>) -> Option<Box<dyn TunableHandler>> {
        let handler = FieldHandler::new(target, site)?;
        Some(Box::new(handler))
    }
}

/// Factory that declines a fixed set of kinds and delegates the rest
#[derive(Debug, Clone)]
pub struct RestrictedFactory<F = StandardFactory> {
    inner: F,
    denied: Vec<ValueKind>,
}

impl RestrictedFactory {
    /// Restrict the standard factory
    #[must_use]
    pub fn new(denied: impl IntoIterator<Item = ValueKind>) -> Self {
        Self::wrap(StandardFactory, denied)
    }
}

impl<F: HandlerFactory> RestrictedFactory<F> {
    /// Restrict an arbitrary factory
    #[must_use]
    pub fn wrap(inner: F, denied: impl IntoIterator<Item = ValueKind>) -> Self {
        Self {
            inner,
            denied: denied.into_iter().collect(),
        }
    }

    /// Check whether a kind is declined
    #[inline]
    #[must_use]
    pub fn denies(&self, kind: ValueKind) -> bool {
        self.denied.contains(&kind)
    }
}

impl<F: HandlerFactory> HandlerFactory for RestrictedFactory<F> {
    fn create<T: Tunable>(&self, target: &Shared<T>, site: &Site<T>) -> Option<Box<dyn TunableHandler>> {
        match site.binding().kind() {
            Some(kind) if self.denies(kind) => None,
            _ => self.inner.create(target, site),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{Schema, TunableMeta};
    use crate::target::shared;

    struct Note {
        title: String,
        pages: i64,
    }

    impl Tunable for Note {
        fn declare(&self, schema: &mut Schema<Self>) {
            schema
                .text("title", TunableMeta::new("note", "Title"), |n| n.title.clone(), |n, v| n.title = v)
                .integer("pages", TunableMeta::new("note", "Pages"), |n| n.pages, |n, v| n.pages = v)
                .unsupported("cover", TunableMeta::new("note", "Cover image"), "Image");
        }
    }

    fn note() -> (Shared<Note>, Vec<Site<Note>>) {
        let target = shared(Note {
            title: "draft".to_string(),
            pages: 2,
        });
        let sites = Schema::of(&*target.read()).into_sites();
        (target, sites)
    }

    #[test]
    fn standard_factory_builds_supported_kinds() {
        let (target, sites) = note();
        let factory = StandardFactory;

        let title = factory.create(&target, &sites[0]).unwrap();
        assert_eq!(title.kind(), ValueKind::Text);
        let pages = factory.create(&target, &sites[1]).unwrap();
        assert_eq!(pages.kind(), ValueKind::Integer);
    }

    #[test]
    fn standard_factory_declines_unsupported() {
        let (target, sites) = note();
        assert!(StandardFactory.create(&target, &sites[2]).is_none());
    }

    #[test]
    fn restricted_factory_declines_denied_kinds() {
        let (target, sites) = note();
        let factory = RestrictedFactory::new([ValueKind::Text]);

        assert!(factory.denies(ValueKind::Text));
        assert!(factory.create(&target, &sites[0]).is_none());
        assert!(factory.create(&target, &sites[1]).is_some());
        assert!(factory.create(&target, &sites[2]).is_none());
    }
}
