// ============================================================================
// Order Domain - Order processing workflow
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (Money, Order)
// - Errors (OrderError, MoneyParseError)
// - Ports (OrderStore, Notifier and their error types)
// - Processor (OrderProcessor workflow)
//
// Adapters for the ports live outside the domain layer.
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod ports;
pub mod processor;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use ports::*;
pub use processor::*;
