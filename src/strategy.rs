//! The interchangeable cast implementations.
//!
//! A [`Strategy`] answers one question for a fixed target class: is the object an instance
//! of the target or of one of its subclasses? On success it returns the embedded sub-object
//! of the target class.

use crate::catalog::{Catalog, CatalogError, ClassId};
use crate::class::{Class, Object};
use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// A monomorphized cast function.
pub type CastFn = for<'a> fn(&'a dyn Object) -> Option<&'a dyn Object>;

type BoxedCast = Box<dyn for<'a> Fn(&'a dyn Object) -> Option<&'a dyn Object>>;

/// The non-polymorphic baseline. Every object is treated as its root, so this never fails.
#[inline]
pub fn static_cast(obj: &dyn Object) -> Option<&dyn Object> {
    Some(obj)
}

/// The language-level cast: tests [`Any::is`] on every embedded parent, most derived first.
#[inline]
pub fn native_cast<T: Any>(obj: &dyn Object) -> Option<&dyn Object> {
    let mut current = obj;
    loop {
        if current.as_any().is::<T>() {
            return Some(current);
        }
        current = current.parent()?;
    }
}

/// Walks `hops` parents up from `obj`.
#[inline]
fn climb(obj: &dyn Object, hops: u32) -> Option<&dyn Object> {
    let mut current = obj;
    for _ in 0..hops {
        current = current.parent()?;
    }
    Some(current)
}

/// The ways a [`Strategy`] can identify classes.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum CastKind {
    /// See [`native_cast`].
    Native,
    /// Tests the class stamp of the object against the precomputed ancestry mask of its class.
    Ancestry,
    /// Looks the [`TypeId`](std::any::TypeId) of the object up in the catalog and follows
    /// the registered parent links.
    Registry,
}

impl CastKind {
    /// All kinds in report order.
    pub const ALL: [CastKind; 3] = [CastKind::Native, CastKind::Ancestry, CastKind::Registry];

    /// The name used in reports.
    pub fn name(self) -> &'static str {
        use CastKind::*;
        match self {
            Native => "native",
            Ancestry => "ancestry",
            Registry => "registry",
        }
    }

    /// Builds the strategy of this kind targeting `target`.
    pub fn strategy(self, catalog: &Rc<Catalog>, target: ClassId) -> Strategy {
        let label = catalog.node(target).label;
        match self {
            CastKind::Native => Strategy::new(label, catalog.native(target)),
            CastKind::Ancestry => ancestry(label, Rc::clone(catalog), target),
            CastKind::Registry => registry(label, Rc::clone(catalog), target),
        }
    }

    /// Builds the strategy of this kind targeting `T`.
    ///
    /// This fails if `T` is not registered in `catalog`.
    pub fn strategy_for<T: Class>(self, catalog: &Rc<Catalog>) -> Result<Strategy, CatalogError> {
        let target = catalog.resolve::<T>()?;
        Ok(self.strategy(catalog, target))
    }
}

impl Display for CastKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn ancestry(label: &'static str, catalog: Rc<Catalog>, target: ClassId) -> Strategy {
    let mask = target.bit();
    let depth = catalog.node(target).depth;
    Strategy::new(label, move |obj| {
        let node = catalog.node(obj.class_id());
        if node.ancestry & mask == 0 {
            return None;
        }
        climb(obj, node.depth - depth)
    })
}

fn registry(label: &'static str, catalog: Rc<Catalog>, target: ClassId) -> Strategy {
    Strategy::new(label, move |obj| {
        let mut class = catalog.lookup(Any::type_id(obj.as_any()))?;
        let mut hops = 0;
        while class != target {
            class = catalog.node(class).parent?;
            hops += 1;
        }
        climb(obj, hops)
    })
}

/// A labelled cast implementation with a fixed target class.
pub struct Strategy {
    label: &'static str,
    cast: BoxedCast,
}

impl Strategy {
    /// Creates a [`Strategy`] from any cast function.
    pub fn new<F>(label: &'static str, cast: F) -> Self
    where
        F: for<'a> Fn(&'a dyn Object) -> Option<&'a dyn Object> + 'static,
    {
        Strategy {
            label,
            cast: Box::new(cast),
        }
    }

    /// The baseline strategy, see [`static_cast`].
    pub fn baseline() -> Self {
        Strategy::new("-", static_cast)
    }

    /// The label of the target class.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Casts `obj` to the target class.
    #[inline]
    pub fn cast<'a>(&self, obj: &'a dyn Object) -> Option<&'a dyn Object> {
        (self.cast)(obj)
    }
}

impl Debug for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("label", &self.label).finish()
    }
}
