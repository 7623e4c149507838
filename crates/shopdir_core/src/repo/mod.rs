//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contract the directory service depends on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `ShopDraft::validate()` before persistence.
//! - Absence is a normal outcome (`Option`/`bool`), never an error.
//! - The store, not the model, stamps ids and timestamps.

pub mod shop_repo;
