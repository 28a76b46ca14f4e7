//! DCA Lab Core — domain types, the DCA simulator, and the data layer.
//!
//! This crate contains the heart of the simulation engine:
//! - Domain types (price points, performance records, market annotations)
//! - The pure monthly dollar-cost-averaging fold
//! - Provider traits with FMP, CSV, and synthetic implementations
//! - File-backed TTL cache with capacity eviction
//! - Circuit breaker and cache warm-up orchestration
//!
//! Everything above the data layer is deterministic: the simulator is a pure
//! function of its inputs, so identical series and parameters always produce
//! bit-identical output.

pub mod data;
pub mod domain;
pub mod simulate;

pub use simulate::{simulate, SimulationConfig};
