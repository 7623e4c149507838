//! Domain model for the shop directory.
//!
//! # Responsibility
//! - Define the persisted `Shop` record and the caller-supplied `ShopDraft`.
//! - Own field validation rules as pure functions of input.
//!
//! # Invariants
//! - Model types carry no hidden lifecycle behavior; the store stamps ids
//!   and timestamps.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod shop;
