//! Shared models
//!
//! Entity handles, modifier bits and type detail used by every feature slice.

pub mod entity;
pub mod modifiers;

pub use entity::{
    ConstructorEntity, Entity, EntityKind, Executable, FieldEntity, Kind, Member, MethodEntity,
    StringEntity, TypeDetail, TypeEntity,
};
pub use modifiers::{ModifierMask, Modifiers};
