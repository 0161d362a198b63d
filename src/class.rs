//! The class model benchmarked by the harness.
//!
//! Rust has no class inheritance, so a derived class embeds its parent as a `base` field and
//! exposes it through [`Object::parent`]. Casting an object to one of its ancestors means
//! finding the embedded sub-object of that class.
//!
//! Classes are declared with the [`class!`](crate::class!) macro. The three hierarchies share
//! the single root [`Root`] (label `A`); [`Unrelated`] (label `Z`) is not part of any
//! hierarchy.

use crate::catalog::ClassId;
use downcast_rs::{impl_downcast, Downcast};
use std::any::TypeId;
use std::fmt::Debug;
use std::rc::Rc;

/// The base type every benchmarked object is reached through.
pub trait Object: Downcast + Debug {
    /// The root sub-object, which carries the payload and the class stamp.
    fn root(&self) -> &Root;

    /// The embedded sub-object of the direct parent class, or [`None`] for the root.
    fn parent(&self) -> Option<&dyn Object>;

    /// The payload shared by all classes.
    #[inline]
    fn value(&self) -> u64 {
        self.root().x
    }

    /// The [`ClassId`] stamped when the object was spawned.
    #[inline]
    fn class_id(&self) -> ClassId {
        self.root().class
    }
}
impl_downcast!(Object);

/// A shared handle to an object, as stored in a [`Dataset`](crate::Dataset).
pub type Handle = Rc<dyn Object>;

/// Static information the catalog needs to register a class.
pub trait Class: 'static {
    /// The short label used in reports.
    const LABEL: &'static str;

    /// The [`TypeId`] of the direct parent class, if there is one.
    fn parent_tid() -> Option<TypeId>;
}

/// Classes that the dataset generator can construct.
pub trait Spawn: Object + Class + Sized {
    /// Builds an instance stamped with `class`.
    fn spawn(class: ClassId) -> Self;
}

/// The shared root of all three hierarchies.
#[derive(Debug)]
pub struct Root {
    x: u64,
    class: ClassId,
}

impl Class for Root {
    const LABEL: &'static str = "A";

    fn parent_tid() -> Option<TypeId> {
        None
    }
}

impl Spawn for Root {
    fn spawn(class: ClassId) -> Self {
        Root { x: 1, class }
    }
}

impl Object for Root {
    #[inline]
    fn root(&self) -> &Root {
        self
    }

    #[inline]
    fn parent(&self) -> Option<&dyn Object> {
        None
    }
}

/// A class that is not related to [`Root`].
///
/// It is never instantiated and carries no data; casts targeting it must always fail.
#[derive(Debug)]
pub struct Unrelated;

impl Class for Unrelated {
    const LABEL: &'static str = "Z";

    fn parent_tid() -> Option<TypeId> {
        None
    }
}

/// Declares a class deriving from `$parent`.
///
/// The generated struct embeds the parent as `base` and implements [`Class`], [`Spawn`]
/// and [`Object`].
#[macro_export]
macro_rules! class {
    ($(#[$meta:meta])* $name:ident : $parent:ty, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            base: $parent,
        }

        impl $crate::class::Class for $name {
            const LABEL: &'static str = $label;

            fn parent_tid() -> ::std::option::Option<::std::any::TypeId> {
                ::std::option::Option::Some(::std::any::TypeId::of::<$parent>())
            }
        }

        impl $crate::class::Spawn for $name {
            fn spawn(class: $crate::ClassId) -> Self {
                $name {
                    base: <$parent as $crate::class::Spawn>::spawn(class),
                }
            }
        }

        impl $crate::class::Object for $name {
            #[inline]
            fn root(&self) -> &$crate::class::Root {
                $crate::class::Object::root(&self.base)
            }

            #[inline]
            fn parent(&self) -> ::std::option::Option<&dyn $crate::class::Object> {
                ::std::option::Option::Some(&self.base)
            }
        }
    };
}

/// A linear chain: every class extends the previous one.
pub mod deep {
    use super::Root;

    crate::class!(B: Root, "B");
    crate::class!(C: B, "C");
    crate::class!(D: C, "D");
    crate::class!(E: D, "E");
    crate::class!(F: E, "F");
    crate::class!(G: F, "G");
    crate::class!(H: G, "H");
}

/// A fan-out: every class extends the root directly.
pub mod shallow {
    use super::Root;

    crate::class!(B: Root, "B");
    crate::class!(C: Root, "C");
    crate::class!(D: Root, "D");
    crate::class!(E: Root, "E");
    crate::class!(F: Root, "F");
    crate::class!(G: Root, "G");
    crate::class!(H: Root, "H");
}

/// Two sub-trees under the root: `B` with two children, `E` with three.
pub mod balanced {
    use super::Root;

    crate::class!(B: Root, "B");
    crate::class!(C: B, "C");
    crate::class!(D: B, "D");
    crate::class!(E: Root, "E");
    crate::class!(F: E, "F");
    crate::class!(G: E, "G");
    crate::class!(H: E, "H");
}
