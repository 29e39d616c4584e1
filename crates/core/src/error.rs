//! Error types for the catalog browser domain layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`GatewayError`] - Transport and payload-decoding errors
//! - [`ProcessingError`] - Page validation errors
//! - [`PaginationError`] - Errors published to list consumers
//! - [`DetailsError`] - Character details lookup errors
//!
//! Transport failures and malformed payloads are both normalized into the
//! same page-scoped [`PaginationError`] before reaching the consumer; the
//! published error type does not distinguish them.

use thiserror::Error;

// =============================================================================
// Gateway Errors
// =============================================================================

/// Errors raised by the remote catalog gateway adapter.
///
/// These cover the full round trip: building the request, the HTTP
/// exchange, and decoding the JSON envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The HTTP request could not be built or did not complete successfully.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The response body could not be decoded into the expected envelope.
    #[error("Decoding error: {0}")]
    Decoding(String),
}

// =============================================================================
// Processing Errors
// =============================================================================

/// Errors raised while validating a raw page envelope.
///
/// A page is only usable when it carries both the result entries and the
/// reported total count; anything else is treated as a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProcessingError {
    /// The envelope carried no result entries.
    #[error("Page envelope has no result entries")]
    MissingEntries,

    /// The envelope carried no total count.
    #[error("Page envelope has no total count")]
    MissingTotal,
}

// =============================================================================
// Pagination Errors
// =============================================================================

/// Errors published on a pagination session's update stream.
///
/// This is the single error type consumers observe. Recovery is always
/// consumer-initiated: the controller never retries on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// The catalog reported a total of zero or fewer items.
    ///
    /// Non-fatal: the (empty) display list that follows is valid.
    #[error("The catalog reported no results")]
    NoResults,

    /// The very first page failed and nothing is on display yet.
    ///
    /// Surfaced distinctly so the consumer can offer a full-screen retry
    /// rather than an inline one.
    #[error("Initial page fetch failed")]
    InitialFetchError,

    /// A non-initial page failed; previously cached pages are untouched.
    #[error("Fetch failed for page {page}")]
    FetchError {
        /// Zero-based index of the failing page, for targeted retry.
        page: u32,
    },

    /// The reported total count changed between fetches.
    ///
    /// Terminal for the session: no further page loads until `reset()`.
    #[error("The catalog total changed mid-session, a full refresh is required")]
    TotalChanged,
}

// =============================================================================
// Details Errors
// =============================================================================

/// Errors raised by the character details use case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetailsError {
    /// The underlying gateway call failed.
    #[error("Details fetch failed: {0}")]
    Fetch(#[from] GatewayError),

    /// The envelope contained no character for the requested id.
    #[error("No character returned for the requested id")]
    NoCharacterReturned,

    /// The envelope contained more than one character for a single id.
    #[error("Ambiguous response: more than one character returned")]
    AmbiguousCharacter,

    /// The character record is missing its name.
    #[error("Character record is missing required information")]
    MissingName,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type for page processing.
pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Result type for details operations.
pub type DetailsResult<T> = Result<T, DetailsError>;
