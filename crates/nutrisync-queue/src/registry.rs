//! Processor trait and the named-processor registry.

use crate::types::{ExecutionContext, WorkItem};
use async_trait::async_trait;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Processor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Executes one work item to completion.
///
/// Every failure is reported as `false`; implementations must not panic
/// or leak errors to the runtime. Retrying a failed item is the runtime's
/// job.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, item: &WorkItem, ctx: &ExecutionContext) -> bool;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Registry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A processor is already bound to this operation type.
    AlreadyRegistered(String),
    /// Operation type names must not be empty.
    EmptyOperationType,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRegistered(name) => {
                write!(f, "A processor is already registered for '{name}'")
            }
            Self::EmptyOperationType => write!(f, "Operation type must not be empty"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Anything processors can be registered against.
pub trait ProcessorRegistry: Send {
    fn register_processor(
        &mut self,
        operation_type: &str,
        processor: Arc<dyn Processor>,
    ) -> Result<(), RegistryError>;
}

/// In-memory registry holding at most one processor per operation type.
#[derive(Default)]
pub struct QueueRegistry {
    processors: HashMap<String, Arc<dyn Processor>>,
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, operation_type: &str) -> bool {
        self.processors.contains_key(operation_type)
    }

    /// Registered operation types, sorted.
    pub fn operation_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.processors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Route an item to its processor. Unknown operation types fail.
    pub async fn dispatch(&self, item: &WorkItem, ctx: &ExecutionContext) -> bool {
        let Some(processor) = self.processors.get(&item.operation_type) else {
            warn!(
                "No processor registered for '{}' (resource {})",
                item.operation_type, item.resource_key
            );
            return false;
        };
        debug!(
            "Dispatching '{}' for resource {}",
            item.operation_type, item.resource_key
        );
        processor.process(item, ctx).await
    }
}

impl ProcessorRegistry for QueueRegistry {
    fn register_processor(
        &mut self,
        operation_type: &str,
        processor: Arc<dyn Processor>,
    ) -> Result<(), RegistryError> {
        if operation_type.trim().is_empty() {
            return Err(RegistryError::EmptyOperationType);
        }
        if self.processors.contains_key(operation_type) {
            return Err(RegistryError::AlreadyRegistered(operation_type.to_string()));
        }
        self.processors
            .insert(operation_type.to_string(), processor);
        Ok(())
    }
}

impl fmt::Debug for QueueRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueRegistry")
            .field("operation_types", &self.operation_types())
            .finish()
    }
}
