//! Core domain layer for the Longbox catalog browser.
//!
//! This crate contains the domain models, port traits (interfaces), and
//! business logic services for browsing a remote paginated comics-character
//! catalog. It follows hexagonal architecture principles - this is the
//! innermost layer with no dependencies on transport or terminal code.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     longbox (binary)                        │
//! │                  (terminal consumer)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   longbox-gateway                           │
//! │                 (HTTP catalog adapter)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   longbox-core  ← YOU ARE HERE              │
//! │               (models, ports, services)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (CharacterModel, DisplayList, etc.)
//! - [`ports`] - Interface traits for adapters to implement
//! - [`services`] - Core business logic (PaginationController, DetailsService)
//! - [`error`] - Domain error types
//! - [`format`] - Display formatting helpers
//! - [`metrics`] - Metric definitions
//!
//! # Key Concepts
//!
//! ## Ports
//!
//! Ports define interfaces that external adapters must implement:
//!
//! - [`ports::CatalogSource`] - Fetch raw pages from the remote catalog
//! - [`ports::PageProcessor`] - Validate a raw page and extract items + total
//! - [`ports::EntryMapper`] - Map a raw catalog entry to a display model
//!
//! ## Pagination Sessions
//!
//! The catalog is browsed through [`services::PaginationController`]
//! instances. Each instance owns one pagination session: a page cache, an
//! in-flight request table and the observed total count. Two instances run
//! per browsing session - one for the unfiltered catalog and one for the
//! active search - with identical behavior and no shared state.
//!
//! ## Session Lifecycle
//!
//! 1. The consumer requests a page with `load_if_needed`
//! 2. The controller deduplicates against cached and in-flight pages
//! 3. Completed pages are merged into an ascending-page display list
//! 4. A drifting total count freezes the session until `reset`

pub mod error;
pub mod format;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
