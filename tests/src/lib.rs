//! # Mirror Ledger Test Suite
//!
//! Cross-crate scenarios driving the engine through its public API over the
//! in-memory store.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs        # Ledger builder shared by the scenarios
//!     ├── reconstruction.rs  # End-to-end API flows
//!     └── properties.rs      # Property tests (pagination, linearity)
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mirror-tests
//! cargo test -p mirror-tests integration::properties::
//! ```

pub mod integration;
