//! # NutriSync – Queue Contract
//!
//! The boundary between the background queue runtime and the processors
//! that execute its work:
//!
//! - **Types** — [`WorkItem`] and [`ExecutionContext`] as handed over per invocation
//! - **Registry** — the [`Processor`] trait, the [`ProcessorRegistry`] contract
//!   and an in-memory [`QueueRegistry`] that dispatches items by operation type
//!
//! Persistence, dequeueing and re-enqueueing of failed items belong to the
//! runtime and are not modelled here.

pub mod types;
pub mod registry;

pub use registry::{Processor, ProcessorRegistry, QueueRegistry, RegistryError};
pub use types::{ExecutionContext, WorkItem};
