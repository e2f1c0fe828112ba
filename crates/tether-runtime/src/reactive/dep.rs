#![forbid(unsafe_code)]

//! Per-property subscriber registry.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;

/// Something a [`Dep`] can notify.
pub trait Subscriber {
    /// React to a change of the property this subscriber is registered with.
    fn update(&self) -> Result<()>;
}

/// Ordered, non-deduplicating list of subscribers for one property.
///
/// Cloning a `Dep` yields another handle to the **same** list.
#[derive(Clone, Default)]
pub struct Dep {
    subs: Rc<RefCell<Vec<Rc<dyn Subscriber>>>>,
}

impl Dep {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber. Registering the same subscriber twice makes it
    /// fire twice per notification.
    pub fn add_sub(&self, sub: Rc<dyn Subscriber>) {
        self.subs.borrow_mut().push(sub);
    }

    /// Update every subscriber in registration order.
    ///
    /// Runs over the list as it was when the pass started; subscribers added
    /// during the pass fire from the next pass on. The first failing
    /// subscriber aborts the pass and its error is returned.
    pub fn notify(&self) -> Result<()> {
        let subs: Vec<Rc<dyn Subscriber>> = self.subs.borrow().clone();
        tracing::trace!(message = "dep.notify", subscribers = subs.len());
        for sub in subs {
            sub.update()?;
        }
        Ok(())
    }

    /// Number of registrations, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.borrow().len()
    }

    /// Whether nothing has subscribed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subs.borrow().is_empty()
    }

    /// Whether both handles refer to the same registry.
    #[must_use]
    pub fn ptr_eq(&self, other: &Dep) -> bool {
        Rc::ptr_eq(&self.subs, &other.subs)
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("subscribers", &self.len())
            .finish()
    }
}
