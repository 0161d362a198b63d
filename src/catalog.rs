//! The registry of benchmarked classes and their parent links.
//!
//! Every class has to be registered, parents before children, before any instance of it is
//! spawned or any cast targeting it is resolved. Registration mistakes are configuration
//! errors and are reported as a [`CatalogError`].

use crate::class::{balanced, deep, shallow, Class, Handle, Root, Spawn, Unrelated};
use crate::strategy::{native_cast, CastFn};
use hashbrown::HashMap;
use std::any::{type_name, TypeId};
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use thiserror::Error;

/// The number of classes in every hierarchy, the shared root included.
pub const SLOTS: usize = 8;

/// The number of classes an ancestry mask can hold.
const MAX_CLASSES: usize = u64::BITS as usize;

/// Constructs an instance of a registered class.
pub type SpawnFn = fn(ClassId) -> Handle;

/// The index of a class in a [`Catalog`].
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct ClassId(u16);

impl ClassId {
    /// Creates a [`ClassId`] from a raw index.
    pub const fn new(index: u16) -> Self {
        ClassId(index)
    }

    /// The position of the class in the catalog.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The bit of this class in an ancestry mask.
    #[inline]
    pub fn bit(self) -> u64 {
        1 << self.0
    }
}

impl Display for ClassId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The three benchmarked hierarchy shapes.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum Hierarchy {
    /// A linear chain of 8 classes.
    Deep,
    /// 7 classes extending the root directly.
    Shallow,
    /// Two sub-trees of depth 2 under the root.
    Balanced,
}

impl Hierarchy {
    /// All hierarchies in report order.
    pub const ALL: [Hierarchy; 3] = [Hierarchy::Deep, Hierarchy::Shallow, Hierarchy::Balanced];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// The lowercase name used in reports.
    pub fn name(self) -> &'static str {
        use Hierarchy::*;
        match self {
            Deep => "deep",
            Shallow => "shallow",
            Balanced => "balanced",
        }
    }
}

impl Display for Hierarchy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A registered class.
#[derive(Copy, Clone)]
pub struct TypeNode {
    /// The [`TypeId`] of the class.
    pub tid: TypeId,
    /// The full type name.
    pub name: &'static str,
    /// The short label used in reports.
    pub label: &'static str,
    /// The direct parent. [`None`] for roots.
    pub parent: Option<ClassId>,
    /// The hierarchy the class belongs to.
    ///
    /// [`None`] for the shared root and for the unrelated class.
    pub hierarchy: Option<Hierarchy>,
    /// The number of parent links between the class and its root.
    pub depth: u32,
    /// The bits of the class and all of its ancestors.
    pub ancestry: u64,
    spawn: Option<SpawnFn>,
    native: CastFn,
}

impl Debug for TypeNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeNode")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("parent", &self.parent)
            .field("hierarchy", &self.hierarchy)
            .field("depth", &self.depth)
            .field("ancestry", &format_args!("{:#b}", self.ancestry))
            .finish()
    }
}

/// A type for building a [`Catalog`].
///
/// Register the shared root first, then every hierarchy's classes parents first, then the
/// unrelated class.
#[derive(Clone, Default)]
pub struct CatalogBuilder {
    nodes: Vec<TypeNode>,
    /// The slot tables, indexed by [`Hierarchy`].
    slots: [Vec<ClassId>; 3],
    root: Option<ClassId>,
    unrelated: Option<ClassId>,
}

/// The table of registered classes.
///
/// Build it with a [`CatalogBuilder`], or use [`Catalog::standard()`] for the benchmarked
/// hierarchies.
#[derive(Clone, Debug)]
pub struct Catalog {
    nodes: Vec<TypeNode>,
    /// The mapping from TypeId to ClassId.
    tid_map: HashMap<TypeId, ClassId>,
    slots: [[ClassId; SLOTS]; 3],
    unrelated: ClassId,
}

impl CatalogBuilder {
    /// Creates a new [`CatalogBuilder`].
    pub fn new() -> Self {
        CatalogBuilder::default()
    }

    /// If type `T` has been registered or not.
    pub fn is_registered<T: Class>(&self) -> bool {
        self.tid_registered(TypeId::of::<T>())
    }

    /// If the type with [`TypeId`] `tid` has been registered or not.
    pub fn tid_registered(&self, tid: TypeId) -> bool {
        self.lookup(tid).is_some()
    }

    fn lookup(&self, tid: TypeId) -> Option<ClassId> {
        self.nodes
            .iter()
            .position(|node| node.tid == tid)
            .map(|idx| ClassId(idx as u16))
    }

    /// Registers the root shared by all hierarchies. It takes slot `0` of each of them.
    pub fn register_root<T: Spawn>(&mut self) -> Result<ClassId, CatalogError> {
        if T::parent_tid().is_some() {
            return Err(CatalogError::UnexpectedParent(type_name::<T>()));
        }
        if let Some(root) = self.root {
            return Err(CatalogError::RootAlreadyRegistered(self.nodes[root.index()].name));
        }

        let class = self.push::<T>(None, Some(spawn::<T>))?;
        for slots in self.slots.iter_mut() {
            slots.insert(0, class);
        }
        self.root = Some(class);
        Ok(class)
    }

    /// Registers a class of `hierarchy`. It takes the next free slot.
    ///
    /// The parent of `T` has to be registered already, and has to be either the shared root
    /// or a class of the same hierarchy.
    pub fn register<T: Spawn>(&mut self, hierarchy: Hierarchy) -> Result<ClassId, CatalogError> {
        if self.is_registered::<T>() {
            return Err(CatalogError::TypeAlreadyRegistered(type_name::<T>()));
        }
        let parent_tid = T::parent_tid().ok_or(CatalogError::MissingParent(type_name::<T>()))?;
        if let Some(parent) = self.lookup(parent_tid) {
            let parent = &self.nodes[parent.index()];
            if parent.hierarchy != Some(hierarchy) && Some(parent.tid) != self.root_tid() {
                return Err(CatalogError::ForeignParent {
                    class: type_name::<T>(),
                    parent: parent.name,
                });
            }
        }
        if self.slots[hierarchy.index()].len() >= SLOTS {
            return Err(CatalogError::HierarchyFull(hierarchy));
        }

        let class = self.push::<T>(Some(hierarchy), Some(spawn::<T>))?;
        self.slots[hierarchy.index()].push(class);
        Ok(class)
    }

    /// Registers the class casts are expected to always fail for.
    ///
    /// It is not part of any hierarchy and cannot be spawned.
    pub fn register_unrelated<T: Class>(&mut self) -> Result<ClassId, CatalogError> {
        if T::parent_tid().is_some() {
            return Err(CatalogError::UnexpectedParent(type_name::<T>()));
        }
        if let Some(unrelated) = self.unrelated {
            return Err(CatalogError::UnrelatedAlreadyRegistered(
                self.nodes[unrelated.index()].name,
            ));
        }

        let class = self.push::<T>(None, None)?;
        self.unrelated = Some(class);
        Ok(class)
    }

    fn root_tid(&self) -> Option<TypeId> {
        self.root.map(|root| self.nodes[root.index()].tid)
    }

    /// Checks the common registration rules and appends the node.
    fn push<T: Class>(
        &mut self,
        hierarchy: Option<Hierarchy>,
        spawn: Option<SpawnFn>,
    ) -> Result<ClassId, CatalogError> {
        let tid = TypeId::of::<T>();
        if self.tid_registered(tid) {
            return Err(CatalogError::TypeAlreadyRegistered(type_name::<T>()));
        }
        if self.nodes.len() >= MAX_CLASSES {
            return Err(CatalogError::TooManyClasses);
        }

        let parent = match T::parent_tid() {
            Some(parent_tid) => Some(self.lookup(parent_tid).ok_or(
                CatalogError::ParentNotRegistered {
                    class: type_name::<T>(),
                },
            )?),
            None => None,
        };

        let class = ClassId(self.nodes.len() as u16);
        let (depth, ancestry) = match parent {
            Some(parent) => {
                let parent = &self.nodes[parent.index()];
                (parent.depth + 1, parent.ancestry | class.bit())
            }
            None => (0, class.bit()),
        };

        self.nodes.push(TypeNode {
            tid,
            name: type_name::<T>(),
            label: T::LABEL,
            parent,
            hierarchy,
            depth,
            ancestry,
            spawn,
            native: native_cast::<T>,
        });
        Ok(class)
    }

    /// Builds the [`Catalog`].
    ///
    /// This fails if the root or the unrelated class is missing, or if a hierarchy does not
    /// hold exactly [`SLOTS`] classes.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        if self.root.is_none() {
            return Err(CatalogError::MissingRoot);
        }
        let unrelated = self.unrelated.ok_or(CatalogError::MissingUnrelated)?;

        let [deep_slots, shallow_slots, balanced_slots] = self.slots;
        let table = |hierarchy: Hierarchy, slots: Vec<ClassId>| {
            <[ClassId; SLOTS]>::try_from(slots).map_err(|slots| {
                CatalogError::IncompleteHierarchy {
                    hierarchy,
                    found: slots.len(),
                }
            })
        };
        let slots = [
            table(Hierarchy::Deep, deep_slots)?,
            table(Hierarchy::Shallow, shallow_slots)?,
            table(Hierarchy::Balanced, balanced_slots)?,
        ];

        let mut tid_map = HashMap::with_capacity(self.nodes.len());
        for (idx, node) in self.nodes.iter().enumerate() {
            tid_map.insert(node.tid, ClassId(idx as u16));
        }

        Ok(Catalog {
            nodes: self.nodes,
            tid_map,
            slots,
            unrelated,
        })
    }
}

/// Spawns a `T` behind a [`Handle`].
fn spawn<T: Spawn>(class: ClassId) -> Handle {
    Rc::new(T::spawn(class))
}

impl Catalog {
    /// Registers the deep, shallow and balanced hierarchies and the unrelated class.
    pub fn standard() -> Result<Catalog, CatalogError> {
        use Hierarchy::*;

        let mut builder = CatalogBuilder::new();
        builder.register_root::<Root>()?;

        builder.register::<deep::B>(Deep)?;
        builder.register::<deep::C>(Deep)?;
        builder.register::<deep::D>(Deep)?;
        builder.register::<deep::E>(Deep)?;
        builder.register::<deep::F>(Deep)?;
        builder.register::<deep::G>(Deep)?;
        builder.register::<deep::H>(Deep)?;

        builder.register::<shallow::B>(Shallow)?;
        builder.register::<shallow::C>(Shallow)?;
        builder.register::<shallow::D>(Shallow)?;
        builder.register::<shallow::E>(Shallow)?;
        builder.register::<shallow::F>(Shallow)?;
        builder.register::<shallow::G>(Shallow)?;
        builder.register::<shallow::H>(Shallow)?;

        builder.register::<balanced::B>(Balanced)?;
        builder.register::<balanced::C>(Balanced)?;
        builder.register::<balanced::D>(Balanced)?;
        builder.register::<balanced::E>(Balanced)?;
        builder.register::<balanced::F>(Balanced)?;
        builder.register::<balanced::G>(Balanced)?;
        builder.register::<balanced::H>(Balanced)?;

        builder.register_unrelated::<Unrelated>()?;
        builder.build()
    }

    /// Gets the number of registered classes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no class is registered. Never true for a built catalog.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Gets the node of `class`.
    ///
    /// Panics if `class` does not come from this catalog.
    #[inline]
    pub fn node(&self, class: ClassId) -> &TypeNode {
        &self.nodes[class.index()]
    }

    /// Iterates over all registered classes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = (ClassId, &TypeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (ClassId(idx as u16), node))
    }

    /// Gets the class registered for `tid`.
    #[inline]
    pub fn lookup(&self, tid: TypeId) -> Option<ClassId> {
        self.tid_map.get(&tid).copied()
    }

    /// Gets the class registered for `T`, or an error if `T` was never registered.
    pub fn resolve<T: Class>(&self) -> Result<ClassId, CatalogError> {
        self.lookup(TypeId::of::<T>())
            .ok_or(CatalogError::NotRegistered(type_name::<T>()))
    }

    /// The shared root class.
    #[inline]
    pub fn root(&self) -> ClassId {
        self.slots[0][0]
    }

    /// The class that no spawned object derives from.
    #[inline]
    pub fn unrelated(&self) -> ClassId {
        self.unrelated
    }

    /// The slot table of `hierarchy`. Slot `0` is the shared root.
    #[inline]
    pub fn slots(&self, hierarchy: Hierarchy) -> &[ClassId; SLOTS] {
        &self.slots[hierarchy.index()]
    }

    /// Gets the class at `slot` of `hierarchy`.
    pub fn slot(&self, hierarchy: Hierarchy, slot: usize) -> Option<ClassId> {
        self.slots(hierarchy).get(slot).copied()
    }

    /// Whether `class` is `ancestor` or derives from it.
    #[inline]
    pub fn is_ancestor(&self, ancestor: ClassId, class: ClassId) -> bool {
        self.node(class).ancestry & ancestor.bit() != 0
    }

    /// The constructor of `class`. [`None`] for the unrelated class.
    #[inline]
    pub fn spawner(&self, class: ClassId) -> Option<SpawnFn> {
        self.node(class).spawn
    }

    /// Spawns an instance of `class`.
    pub fn spawn(&self, class: ClassId) -> Option<Handle> {
        self.spawner(class).map(|spawn| spawn(class))
    }

    /// The language-level cast targeting `class`.
    #[inline]
    pub fn native(&self, class: ClassId) -> CastFn {
        self.node(class).native
    }
}

/// The possible errors when registering or resolving a class.
#[derive(Error, Eq, PartialEq, Clone, Debug)]
pub enum CatalogError {
    /// The class was already registered.
    #[error("Type ({0}) was already registered.")]
    TypeAlreadyRegistered(&'static str),
    /// The parent of the class is not registered yet.
    #[error("Type ({class}) extends a type that is not registered yet.")]
    ParentNotRegistered { class: &'static str },
    /// The parent of the class belongs to another hierarchy.
    #[error("Type ({class}) extends ({parent}), which belongs to another hierarchy.")]
    ForeignParent {
        class: &'static str,
        parent: &'static str,
    },
    /// A root or unrelated class declares a parent.
    #[error("Type ({0}) must not have a parent.")]
    UnexpectedParent(&'static str),
    /// A hierarchy class declares no parent.
    #[error("Type ({0}) must have a parent.")]
    MissingParent(&'static str),
    /// A second root was registered.
    #[error("A root type ({0}) was already registered.")]
    RootAlreadyRegistered(&'static str),
    /// A second unrelated class was registered.
    #[error("An unrelated type ({0}) was already registered.")]
    UnrelatedAlreadyRegistered(&'static str),
    /// The hierarchy has no free slot left.
    #[error("The {0} hierarchy already holds {} types.", SLOTS)]
    HierarchyFull(Hierarchy),
    /// The hierarchy does not hold exactly [`SLOTS`] classes.
    #[error("The {hierarchy} hierarchy holds {found} types, expected {}.", SLOTS)]
    IncompleteHierarchy { hierarchy: Hierarchy, found: usize },
    /// The ancestry masks are full.
    #[error("At most {} types can be registered.", MAX_CLASSES)]
    TooManyClasses,
    /// No root was registered.
    #[error("No root type was registered.")]
    MissingRoot,
    /// No unrelated class was registered.
    #[error("No unrelated type was registered.")]
    MissingUnrelated,
    /// A cast was requested for a class that is not registered.
    #[error("Type ({0}) is not registered.")]
    NotRegistered(&'static str),
}
