//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (Prometheus registry, JSONL files, HTTP).
//!
//! Adapter categories:
//! - `metrics`: Prometheus gauges and the HTTP server exposing them
//! - `persistence`: JSONL tag storage

pub mod metrics;
pub mod persistence;
