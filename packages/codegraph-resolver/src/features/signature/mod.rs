//! Signature feature
//!
//! Textual member signatures → concrete entities. Used by the exact-lookup
//! criteria constructors and by the cache bootstrap, which persists members
//! as descriptor identifiers.

pub mod parser;
pub mod resolver;

pub use crate::shared::utils::descriptor::{
    from_descriptor, normalize_type_name, primitive_abbreviation, primitive_name,
    split_descriptors, to_descriptor,
};
pub use parser::{parse, MemberSignature, SignatureShape, CONSTRUCTOR_NAME};
pub use resolver::SignatureResolver;
