//! Error types for codegraph-resolver
//!
//! Provides the crate error taxonomy and the session error sink that routes
//! failures to the pluggable handler while keeping an aggregate diagnostic.
//!
//! A criteria that matches nothing is *not* an error: misses travel as cell
//! state and are consumed through fallback chains or miss callbacks.

use crate::config::ConfigError;
use crate::features::cache::CacheError;
use crate::shared::utils::panic::catch;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Main error type for resolution operations
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Referenced name absent from the corpus
    #[error("Entity not found: {name}")]
    EntityNotFound { name: String },

    /// Member query without a resolvable declaring-type constraint
    #[error("Unbounded query: {criteria} has no declaring-type constraint (enable exhaustive_member_scan to scan every type)")]
    UnboundedQuery { criteria: String },

    /// Snapshot failed to deserialize or is structurally inconsistent
    #[error("Cache corrupt: {0}")]
    CacheCorrupt(String),

    /// A user callback or predicate panicked
    #[error("User callback failed in {context}: {message}")]
    UserCallback { context: String, message: String },

    /// Prerequisite/fallback graph contains a cycle
    #[error("Cyclic criteria dependency through {node}")]
    CycleDetected { node: String },

    /// The same key was assigned to two results in one session
    #[error("Key '{key}' is already bound in this session")]
    KeyConflict { key: String },

    /// Signature text could not be parsed
    #[error("Invalid signature '{signature}': {reason}")]
    InvalidSignature { signature: String, reason: String },

    /// The error handler itself failed; resolution is aborted
    #[error("Error handler failed: {0}")]
    HandlerFailed(String),

    /// Corpus manifest could not be read
    #[error("Invalid corpus: {0}")]
    InvalidCorpus(String),

    /// Thread pool or driver thread could not be created
    #[error("Executor error: {0}")]
    Executor(String),

    /// Cache store error (IO, serialization)
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolverError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::EntityNotFound { name: name.into() }
    }

    pub fn unbounded(criteria: impl Into<String>) -> Self {
        Self::UnboundedQuery {
            criteria: criteria.into(),
        }
    }

    pub fn user_callback(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UserCallback {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn invalid_signature(signature: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSignature {
            signature: signature.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EntityNotFound { .. } => ErrorKind::EntityNotFound,
            Self::UnboundedQuery { .. } => ErrorKind::UnboundedQuery,
            Self::CacheCorrupt(_) | Self::Cache(_) => ErrorKind::CacheCorrupt,
            Self::UserCallback { .. } => ErrorKind::UserCallback,
            Self::CycleDetected { .. } => ErrorKind::CycleDetected,
            Self::KeyConflict { .. } => ErrorKind::KeyConflict,
            Self::InvalidSignature { .. } => ErrorKind::InvalidSignature,
            Self::HandlerFailed(_) => ErrorKind::HandlerFailed,
            Self::InvalidCorpus(_) | Self::Executor(_) | Self::Config(_) | Self::Io(_) => {
                ErrorKind::Environment
            }
        }
    }
}

/// Result type alias for resolution operations
pub type ResolverResult<T> = std::result::Result<T, ResolverError>;

/// Coarse classification used by [`Diagnostic`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EntityNotFound,
    UnboundedQuery,
    CacheCorrupt,
    UserCallback,
    CycleDetected,
    KeyConflict,
    InvalidSignature,
    HandlerFailed,
    Environment,
}

/// One failure observed during a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    /// `true` when a handler saw the failure and asked to stop
    pub escalated: bool,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

/// Pluggable failure handler: `true` = suppress and continue, `false` = escalate
pub type ErrorHandler = Arc<dyn Fn(&ResolverError) -> bool + Send + Sync>;

/// Session-scoped failure funnel
///
/// Every failure is recorded; the handler (if any) decides whether the
/// current scan continues. Without a handler failures are swallowed for
/// scan continuation and only surface in [`ErrorSink::diagnostics`].
#[derive(Default)]
pub struct ErrorSink {
    handler: RwLock<Option<ErrorHandler>>,
    diagnostics: Mutex<Vec<Diagnostic>>,
    handler_failure: Mutex<Option<String>>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_handler(&self, handler: ErrorHandler) {
        *self.handler.write() = Some(handler);
    }

    /// Record `error` and ask the handler whether to continue
    pub fn report(&self, error: ResolverError) -> bool {
        let handler = self.handler.read().clone();
        let proceed = match handler {
            None => true,
            Some(handler) => match catch(|| handler(&error)) {
                Ok(proceed) => proceed,
                Err(message) => {
                    tracing::warn!(%message, "error handler panicked; aborting resolution");
                    self.handler_failure.lock().get_or_insert(message);
                    false
                }
            },
        };

        if proceed {
            tracing::debug!(error = %error, "failure suppressed");
        } else {
            tracing::warn!(error = %error, "failure escalated");
        }

        self.diagnostics.lock().push(Diagnostic {
            kind: error.kind(),
            message: error.to_string(),
            escalated: !proceed,
        });
        proceed
    }

    /// Set once the handler itself has failed
    pub fn handler_failure(&self) -> Option<String> {
        self.handler_failure.lock().clone()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }
}

impl fmt::Debug for ErrorSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorSink")
            .field("has_handler", &self.handler.read().is_some())
            .field("diagnostics", &self.diagnostics.lock().len())
            .finish()
    }
}
