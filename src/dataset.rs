//! Generation of the object sequences the trials run over.

use crate::catalog::{Catalog, ClassId, Hierarchy, SLOTS};
use crate::class::{Handle, Object};
use hashbrown::HashMap;
use log::debug;
use rand::Rng;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use thiserror::Error;

/// The range of slots a dataset samples its classes from.
///
/// Classes are drawn uniformly from the `width + 1` slots starting at `from`.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct Skew {
    pub from: usize,
    pub width: usize,
}

impl Skew {
    /// Creates a new [`Skew`].
    pub const fn new(from: usize, width: usize) -> Self {
        Skew { from, width }
    }

    /// A skew containing the class at `slot` only.
    pub const fn single(slot: usize) -> Self {
        Skew::new(slot, 0)
    }

    /// The last slot included. Saturates at `usize::MAX`.
    pub fn last(&self) -> usize {
        self.from.saturating_add(self.width)
    }

    /// Checks that the skew stays inside the slot table.
    pub fn validate(&self) -> Result<(), DatasetError> {
        match self.from.checked_add(self.width) {
            Some(last) if last < SLOTS => Ok(()),
            _ => Err(DatasetError::SkewOutOfRange(*self)),
        }
    }
}

impl Display for Skew {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.from, self.last())
    }
}

/// The skews the benchmark runs with.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum Preset {
    /// Only the class at slot 6, so most casts in the deep hierarchy succeed.
    MostlySuccessful,
    /// Only the class at slot 1, so most casts fail.
    MostlyFailed,
    /// Slots 0 to 6.
    Mixed,
}

impl Preset {
    /// The skew of the preset.
    pub fn skew(self) -> Skew {
        use Preset::*;
        match self {
            MostlySuccessful => Skew::single(6),
            MostlyFailed => Skew::single(1),
            Mixed => Skew::new(0, 6),
        }
    }

    /// The section title used in reports.
    pub fn title(self, catalog: &Catalog, hierarchy: Hierarchy) -> String {
        let label = |slot| {
            catalog
                .slot(hierarchy, slot)
                .map(|class| catalog.node(class).label)
                .unwrap_or("?")
        };
        match self {
            Preset::MostlySuccessful => format!(
                "Mostly successful (cast from class {})",
                label(self.skew().from)
            ),
            Preset::MostlyFailed => {
                format!("Mostly failed (cast from class {})", label(self.skew().from))
            }
            Preset::Mixed => "Mixed (cast from random classes)".to_owned(),
        }
    }
}

/// The datasets of a full run, in report order.
pub const STANDARD_DATASETS: [(Hierarchy, Preset); 7] = [
    (Hierarchy::Deep, Preset::MostlySuccessful),
    (Hierarchy::Deep, Preset::MostlyFailed),
    (Hierarchy::Deep, Preset::Mixed),
    (Hierarchy::Shallow, Preset::MostlySuccessful),
    (Hierarchy::Shallow, Preset::MostlyFailed),
    (Hierarchy::Shallow, Preset::Mixed),
    (Hierarchy::Balanced, Preset::Mixed),
];

/// An ordered sequence of objects of one hierarchy.
///
/// The length is fixed once generated. Only the order may change, see
/// [`Shuffler`](crate::Shuffler).
#[derive(Debug)]
pub struct Dataset {
    hierarchy: Hierarchy,
    skew: Skew,
    pub(crate) items: Vec<Handle>,
}

impl Dataset {
    /// Generates `len` objects of `hierarchy` with classes drawn according to `skew`.
    ///
    /// The storage is reserved up front so that the objects are allocated in sequence
    /// without the vector moving in between.
    pub fn generate<R: Rng>(
        catalog: &Catalog,
        hierarchy: Hierarchy,
        skew: Skew,
        len: usize,
        rng: &mut R,
    ) -> Result<Self, DatasetError> {
        skew.validate()?;
        let slots = catalog.slots(hierarchy);
        let mut spawners = Vec::with_capacity(skew.width + 1);
        for &class in &slots[skew.from..=skew.last()] {
            let spawn = catalog
                .spawner(class)
                .ok_or(DatasetError::NotSpawnable(catalog.node(class).name))?;
            spawners.push((class, spawn));
        }

        debug!(
            "Generating {} objects of the {} hierarchy from slots {}",
            len, hierarchy, skew
        );
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            let (class, spawn) = spawners[rng.gen_range(0..=skew.width)];
            items.push(spawn(class));
        }

        Ok(Dataset {
            hierarchy,
            skew,
            items,
        })
    }

    /// The hierarchy the objects belong to.
    pub fn hierarchy(&self) -> Hierarchy {
        self.hierarchy
    }

    /// The skew the dataset was generated with.
    pub fn skew(&self) -> Skew {
        self.skew
    }

    /// Gets the number of objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the dataset holds no objects.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the objects in order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &dyn Object> + '_ {
        self.items.iter().map(|handle| &**handle)
    }

    /// The handles in order.
    pub fn handles(&self) -> &[Handle] {
        &self.items
    }

    /// Counts the objects of every class.
    pub fn class_counts(&self) -> HashMap<ClassId, usize> {
        let mut counts = HashMap::new();
        for obj in self.iter() {
            *counts.entry(obj.class_id()).or_insert(0) += 1;
        }
        counts
    }

    /// Whether both datasets hold the same objects, in any order.
    pub fn same_members(&self, other: &Dataset) -> bool {
        let addresses = |dataset: &Dataset| {
            let mut addresses: Vec<*const ()> = dataset
                .items
                .iter()
                .map(|handle| Rc::as_ptr(handle) as *const ())
                .collect();
            addresses.sort_unstable();
            addresses
        };
        addresses(self) == addresses(other)
    }
}

/// The possible errors when generating a dataset.
#[derive(Error, Eq, PartialEq, Clone, Debug)]
pub enum DatasetError {
    /// The skew reaches past the last slot.
    #[error("Skew ({0}) reaches past the last of {} slots.", SLOTS)]
    SkewOutOfRange(Skew),
    /// A class in the skew has no constructor.
    #[error("Type ({0}) cannot be spawned.")]
    NotSpawnable(&'static str),
}
