//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `GaugeSink`: Labelled gauge collectors (set/remove by label tuple)
//! - `TagStore`: Read-only lookup of monitor tags

pub mod gauge_sink;
pub mod tag_store;

pub use gauge_sink::{GaugeError, GaugeSink};
pub use tag_store::TagStore;
