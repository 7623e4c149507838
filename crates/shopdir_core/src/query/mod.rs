//! Query construction for shop lookups.
//!
//! # Responsibility
//! - Turn search parameters into explicit SQL predicates with bind values.
//! - Keep matching semantics testable without a database.
//!
//! # Invariants
//! - Search terms are bound as parameters, never spliced into SQL text.
//! - Terms are matched literally; `%`, `_` and regex metacharacters carry no
//!   special meaning.

pub mod substring;
