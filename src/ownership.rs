//! A parent/child pair whose reference cycle is broken by construction.
//!
//! The parent owns its child through an [`Arc`] (the forward edge), the child
//! refers back to its parent through a [`Weak`] (the back edge), which allows
//! looking the parent up but never keeps it alive.

use std::sync::{Arc, Weak};

/// The owning side of the pair.
#[derive(Debug)]
pub struct Parent {
    name: String,
    child: Arc<Child>,
}

/// The owned side of the pair, which refers back to its parent without
/// owning it.
#[derive(Debug)]
pub struct Child {
    name: String,
    parent: Weak<Parent>,
}

impl Parent {
    /// Creates a new parent together with its child.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use sole::ownership::Parent;
    ///
    /// let parent = Parent::new("a", "b");
    /// let child = Arc::clone(parent.child());
    /// assert_eq!(child.parent().map(|parent| parent.name().to_owned()), Some("a".to_owned()));
    ///
    /// // the back edge does not keep the parent alive
    /// drop(parent);
    /// assert!(child.parent().is_none());
    /// ```
    pub fn new(name: impl Into<String>, child_name: impl Into<String>) -> Arc<Self> {
        let (name, child_name) = (name.into(), child_name.into());
        Arc::new_cyclic(|parent| Self {
            name,
            child: Arc::new(Child { name: child_name, parent: Weak::clone(parent) }),
        })
    }

    /// Returns the parent's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the owned child.
    #[inline]
    pub fn child(&self) -> &Arc<Child> {
        &self.child
    }
}

impl Drop for Parent {
    fn drop(&mut self) {
        log::trace!("parent {} dropped", self.name);
    }
}

impl Child {
    /// Returns the child's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent, if it is still alive.
    #[inline]
    pub fn parent(&self) -> Option<Arc<Parent>> {
        self.parent.upgrade()
    }
}

impl Drop for Child {
    fn drop(&mut self) {
        log::trace!("child {} dropped", self.name);
    }
}
