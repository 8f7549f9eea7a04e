//! Shared target objects and their registry identity

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Object whose tunables are bound by an interceptor
///
/// Handlers keep only a weak reference; the host owns the object.
pub type Shared<T> = Arc<RwLock<T>>;

/// Wrap a value for registration
#[inline]
#[must_use]
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

/// Identity of a registered object
///
/// Derived from the allocation address, so it is only meaningful while the
/// object is alive. The registry pairs it with a weak liveness handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(usize);

impl TargetId {
    /// Identity of a shared object
    #[inline]
    #[must_use]
    pub fn of<T>(target: &Shared<T>) -> Self {
        Self(Arc::as_ptr(target).cast::<()>() as usize)
    }
}

impl<T> From<&Shared<T>> for TargetId {
    #[inline]
    fn from(target: &Shared<T>) -> Self {
        Self::of(target)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target@{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_follows_allocation() {
        let a = shared(1_i64);
        let b = shared(1_i64);
        let a2 = Arc::clone(&a);

        assert_eq!(TargetId::of(&a), TargetId::of(&a2));
        assert_ne!(TargetId::of(&a), TargetId::of(&b));
        assert_eq!(TargetId::from(&a), TargetId::of(&a));
    }

    #[test]
    fn display_is_hex() {
        let a = shared(());
        assert!(TargetId::of(&a).to_string().starts_with("target@0x"));
    }
}
