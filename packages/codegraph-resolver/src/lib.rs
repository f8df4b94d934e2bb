/*
 * Codegraph Resolver - Lazy Criteria Resolution over Program Metadata
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (entities, modifiers, type detail)
 * - features/    : Vertical slices (corpus → criteria → resolution → cache)
 * - config/      : Presets + YAML configuration
 *
 * Execution:
 * - Demand-driven: only consumed results are ever evaluated
 * - Rayon scan pool, one round per fixed-point step
 * - Separate delivery pool for user callbacks
 */

// Crate-level lint configuration
#![allow(clippy::type_complexity)] // Observer and callback boxes
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::len_without_is_empty)] // Registry sizes only
#![allow(clippy::unnecessary_map_or)] // map_or style for compatibility

//! # codegraph-resolver
//!
//! Resolve declarative criteria against a large corpus of program-metadata
//! entities (types, fields, methods, constructors, string literals).
//!
//! ```rust,ignore
//! use codegraph_resolver::prelude::*;
//!
//! let session = ResolutionSession::new(corpus, ResolverConfig::from_preset(Preset::Fast))?;
//! let activity = session.first_type(TypeCriteria::new().name(NamePattern::exact("app.Main")))?;
//! let on_create = session.first_method(
//!     MethodCriteria::new()
//!         .declared_by(&activity)
//!         .name(NamePattern::exact("onCreate"))
//!         .key("main.onCreate"),
//! )?;
//! on_create.on_match(|m| println!("found {}", m.name));
//!
//! let report = session.resolve_blocking()?;
//! ```

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (corpus, criteria, resolution, cache, signature)
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{Preset, ResolverConfig};
pub use errors::{Diagnostic, ErrorKind, ErrorSink, ResolverError, ResolverResult};
pub use features::cache::{CacheMetadata, CacheSnapshot, CacheStore};
pub use features::corpus::{DetailProvider, EntityCorpus, MemoryProvider, ShardedCorpus};
pub use features::criteria::{
    ConstructorCriteria, FieldCriteria, MethodCriteria, NamePattern, SetExpr, StringCriteria,
    TypeCriteria,
};
pub use features::resolution::{
    CellState, Completion, JoinBarrier, ResolutionReport, ResolutionSession, ResultCell, ResultSet,
};
pub use features::signature::SignatureResolver;
pub use shared::models::{
    ConstructorEntity, Entity, EntityKind, FieldEntity, Kind, MethodEntity, Modifiers,
    StringEntity, TypeDetail, TypeEntity,
};

/// Everything needed to build and resolve a criteria graph
pub mod prelude {
    pub use crate::config::{Preset, ResolverConfig};
    pub use crate::errors::{ResolverError, ResolverResult};
    pub use crate::features::corpus::{EntityCorpus, MemoryProvider, ShardedCorpus};
    pub use crate::features::criteria::{
        ConstructorCriteria, Exact, FieldCriteria, MethodCriteria, NamePattern, SetExpr,
        StringCriteria, TypeCriteria,
    };
    pub use crate::features::resolution::{
        CellState, JoinBarrier, ResolutionReport, ResolutionSession, ResultCell, ResultSet,
    };
    pub use crate::shared::models::{
        ConstructorEntity, Entity, FieldEntity, MethodEntity, Modifiers, StringEntity,
        TypeDetail, TypeEntity,
    };
}
