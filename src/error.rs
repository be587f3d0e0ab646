//! Error types for the onboarding orchestrator.

use std::fmt;

use crate::onboarding::state::{OnboardingEvent, OnboardingStatus};

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Why a submitted value was rejected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    /// Nothing was entered.
    Missing,
    /// The date lies after today's local date.
    InFuture,
    /// Not a `YYYY-MM-DD` calendar date.
    Malformed,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "is required"),
            Self::InFuture => write!(f, "cannot be later than today"),
            Self::Malformed => write!(f, "must be a calendar date in YYYY-MM-DD form"),
        }
    }
}

/// Local, pre-network rejection of user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: ValidationReason) -> Self {
        Self { field, reason }
    }
}

/// The remote call a [`PersistenceError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadOnboardingStatus,
    SaveOnboardingStatus,
    LoadProfile,
    SaveAccountingStartDate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LoadOnboardingStatus => "load onboarding status",
            Self::SaveOnboardingStatus => "update onboarding status",
            Self::LoadProfile => "load profile",
            Self::SaveAccountingStartDate => "save accounting start date",
        };
        write!(f, "{s}")
    }
}

/// A remote call failed, timed out, or returned a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to {operation}: {cause}")]
pub struct PersistenceError {
    pub operation: Operation,
    /// Human-readable message, usually taken from the server's error body.
    pub cause: String,
}

impl PersistenceError {
    pub fn new(operation: Operation, cause: impl Into<String>) -> Self {
        Self {
            operation,
            cause: cause.into(),
        }
    }
}

/// An onboarding event that has no edge from the current status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Cannot {event} onboarding while it is {}",
    .from.map_or_else(|| "not loaded".to_string(), |status| status.to_string())
)]
pub struct TransitionError {
    /// `None` when no status has been loaded yet.
    pub from: Option<OnboardingStatus>,
    pub event: OnboardingEvent,
}

/// Result type alias for the orchestrator.
pub type Result<T> = std::result::Result<T, Error>;
