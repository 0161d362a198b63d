//! Tests for registering classes in a [`CatalogBuilder`].
use crate::helper::test_classes::{Extra, ExtraChild};
use castbench::class::{deep, shallow, Root, Unrelated};
use castbench::{CastKind, CatalogBuilder, CatalogError, Hierarchy};
use std::any::type_name;

mod helper;

/// Registers the root, the unrelated class and the deep chain.
fn deep_builder() -> CatalogBuilder {
    let mut builder = CatalogBuilder::new();
    builder.register_root::<Root>().unwrap();
    builder.register_unrelated::<Unrelated>().unwrap();
    builder.register::<deep::B>(Hierarchy::Deep).unwrap();
    builder.register::<deep::C>(Hierarchy::Deep).unwrap();
    builder.register::<deep::D>(Hierarchy::Deep).unwrap();
    builder.register::<deep::E>(Hierarchy::Deep).unwrap();
    builder.register::<deep::F>(Hierarchy::Deep).unwrap();
    builder.register::<deep::G>(Hierarchy::Deep).unwrap();
    builder.register::<deep::H>(Hierarchy::Deep).unwrap();
    builder
}

/// Tests the errors for registering the same or a second root or unrelated class.
#[test]
fn duplicates() {
    let mut builder = deep_builder();
    assert_eq!(
        builder.register_root::<Root>(),
        Err(CatalogError::RootAlreadyRegistered(type_name::<Root>()))
    );
    assert_eq!(
        builder.register_unrelated::<Unrelated>(),
        Err(CatalogError::UnrelatedAlreadyRegistered(type_name::<Unrelated>()))
    );
    assert_eq!(
        builder.register::<deep::C>(Hierarchy::Deep),
        Err(CatalogError::TypeAlreadyRegistered(type_name::<deep::C>()))
    );
    // Also when the other hierarchy has room left.
    assert_eq!(
        builder.register::<deep::H>(Hierarchy::Shallow),
        Err(CatalogError::TypeAlreadyRegistered(type_name::<deep::H>()))
    );
}

/// Tests the errors for classes that are declared with the wrong parent.
#[test]
fn parents() {
    let mut builder = CatalogBuilder::new();
    assert_eq!(
        builder.register_root::<deep::B>(),
        Err(CatalogError::UnexpectedParent(type_name::<deep::B>()))
    );
    assert_eq!(
        builder.register::<Root>(Hierarchy::Deep),
        Err(CatalogError::MissingParent(type_name::<Root>()))
    );

    builder.register_root::<Root>().unwrap();
    assert_eq!(
        builder.register::<deep::C>(Hierarchy::Deep),
        Err(CatalogError::ParentNotRegistered {
            class: type_name::<deep::C>()
        })
    );
    assert!(!builder.is_registered::<deep::C>());

    builder.register::<deep::B>(Hierarchy::Deep).unwrap();
    assert_eq!(
        builder.register::<deep::C>(Hierarchy::Shallow),
        Err(CatalogError::ForeignParent {
            class: type_name::<deep::C>(),
            parent: type_name::<deep::B>(),
        })
    );
    // The shared root can be extended from every hierarchy.
    builder.register::<shallow::B>(Hierarchy::Shallow).unwrap();
    assert!(builder.is_registered::<shallow::B>());
}

/// Tests that hierarchies hold exactly 8 classes.
#[test]
fn hierarchy_size() {
    let mut builder = deep_builder();
    assert_eq!(
        builder.register::<Extra>(Hierarchy::Deep),
        Err(CatalogError::HierarchyFull(Hierarchy::Deep))
    );

    builder.register::<Extra>(Hierarchy::Shallow).unwrap();
    builder.register::<ExtraChild>(Hierarchy::Shallow).unwrap();
    assert_eq!(
        builder.build().unwrap_err(),
        CatalogError::IncompleteHierarchy {
            hierarchy: Hierarchy::Shallow,
            found: 3,
        }
    );
}

/// Tests that the root and the unrelated class are required.
#[test]
fn missing_roots() {
    assert_eq!(
        CatalogBuilder::new().build().unwrap_err(),
        CatalogError::MissingRoot
    );

    let mut builder = CatalogBuilder::new();
    builder.register_root::<Root>().unwrap();
    assert_eq!(builder.build().unwrap_err(), CatalogError::MissingUnrelated);
}

/// Tests that the standard catalog resolves every class and rejects others.
#[test]
fn resolve() {
    let catalog = helper::catalog();
    assert_eq!(catalog.len(), 23);
    assert_eq!(catalog.resolve::<Root>(), Ok(catalog.root()));
    assert_eq!(catalog.resolve::<Unrelated>(), Ok(catalog.unrelated()));
    assert_eq!(
        catalog.resolve::<Extra>(),
        Err(CatalogError::NotRegistered(type_name::<Extra>()))
    );

    for kind in CastKind::ALL {
        assert!(kind.strategy_for::<ExtraChild>(&catalog).is_err());
        assert!(kind.strategy_for::<deep::H>(&catalog).is_ok());
    }
}
