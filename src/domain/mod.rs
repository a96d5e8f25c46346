// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Business rules and the collaborator traits they depend on. Nothing in here
// knows about concrete storage or delivery mechanisms.
//
// ============================================================================

pub mod order;
