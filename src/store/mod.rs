// ============================================================================
// Store Module
// ============================================================================
//
// Adapters implementing `domain::order::OrderStore`.
//
// ============================================================================

mod in_memory;

pub use in_memory::{InMemoryOrderStore, StoredOrder};
