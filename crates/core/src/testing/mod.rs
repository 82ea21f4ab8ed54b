//! Testing utilities and mock implementations for black-box tests.
//!
//! Mirrors the shape of the rest of the workspace's test doubles: a
//! builder-style mock per external trait, no real I/O.

mod mock_provider;
mod mock_refiner;

pub use mock_provider::MockProvider;
pub use mock_refiner::{MockOnlineDbRefiner, MockRefiner};
