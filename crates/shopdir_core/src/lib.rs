//! Core domain logic for the shop directory.
//! This crate is the single source of truth for shop validation, storage and
//! directory use-cases.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::shop::{FieldViolation, Shop, ShopDraft, ShopField, ShopId, ShopValidationError};
pub use query::substring::{Predicate, SearchScope, SubstringQuery};
pub use repo::shop_repo::{RepoError, RepoResult, ShopRepository, SqliteShopRepository};
pub use service::shop_service::{ServiceError, ServiceResult, ShopDirectory};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
