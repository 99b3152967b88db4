//! One handler per [`crate::operation::OperationArgs`] variant.
//!
//! Handlers take the base snapshot by reference and return a new snapshot.
//! They raise the most specific [`crate::error::SimError`] they can; adding
//! operation context is left to the dispatcher.

pub mod public_reallocate;

pub use public_reallocate::handle_public_reallocate;
