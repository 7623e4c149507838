//! Shop directory use-case service.
//!
//! # Responsibility
//! - Expose the seven directory operations: list, get, create, update,
//!   delete, search and count.
//! - Validate candidates before they reach the store.
//! - Translate store results into typed outcomes for caller-facing layers.
//!
//! # Invariants
//! - Absence is reported as `None`/`false`, never as an error.
//! - Store failures propagate unchanged; nothing is retried or swallowed.
//! - The service holds no state between calls beyond its repository handle.

use crate::model::shop::{FieldViolation, Shop, ShopDraft, ShopField, ShopId, ShopValidationError};
use crate::query::substring::SubstringQuery;
use crate::repo::shop_repo::{RepoError, ShopRepository};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Typed failure returned by directory operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Candidate violates one or more field rules; nothing was persisted.
    Validation(ShopValidationError),
    /// Underlying persistence failure, passed through unchanged.
    Store(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ShopValidationError> for ServiceError {
    fn from(value: ShopValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

/// Directory service facade over a shop repository.
pub struct ShopDirectory<R: ShopRepository> {
    repo: R,
}

impl<R: ShopRepository> ShopDirectory<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns every shop in primary-key order.
    pub fn list_all(&self) -> ServiceResult<Vec<Shop>> {
        let started_at = Instant::now();
        debug!("event=shop_list module=service status=start");

        let shops = self
            .repo
            .find_all()
            .map_err(|err| failed("shop_list", started_at, err.into()))?;
        info!(
            "event=shop_list module=service status=ok count={} duration_ms={}",
            shops.len(),
            started_at.elapsed().as_millis()
        );
        Ok(shops)
    }

    /// Gets one shop by id; `None` means not found.
    pub fn get_by_id(&self, id: ShopId) -> ServiceResult<Option<Shop>> {
        let started_at = Instant::now();
        debug!("event=shop_get module=service status=start id={id}");

        let shop = self
            .repo
            .get_by_id(id)
            .map_err(|err| failed("shop_get", started_at, err.into()))?;
        info!(
            "event=shop_get module=service status=ok id={id} found={} duration_ms={}",
            shop.is_some(),
            started_at.elapsed().as_millis()
        );
        Ok(shop)
    }

    /// Validates and persists a new shop.
    ///
    /// # Contract
    /// - `draft.id` must be `None`; ids are store-assigned only.
    /// - Returns the stored record with `id`, `created_date` and
    ///   `updated_date` populated (`created_date == updated_date`).
    pub fn create(&self, draft: &ShopDraft) -> ServiceResult<Shop> {
        let started_at = Instant::now();
        debug!("event=shop_create module=service status=start");

        validate_new(draft).map_err(|err| failed("shop_create", started_at, err.into()))?;
        let shop = self
            .repo
            .insert(draft)
            .map_err(|err| failed("shop_create", started_at, err.into()))?;
        info!(
            "event=shop_create module=service status=ok id={} duration_ms={}",
            shop.id,
            started_at.elapsed().as_millis()
        );
        Ok(shop)
    }

    /// Replaces the mutable fields of an existing shop.
    ///
    /// # Contract
    /// - Returns `Ok(None)` when `id` does not exist; nothing is created.
    /// - `id` and `created_date` are preserved; `updated_date` advances.
    /// - `draft.id` is ignored; the path id is authoritative.
    pub fn update(&self, id: ShopId, draft: &ShopDraft) -> ServiceResult<Option<Shop>> {
        let started_at = Instant::now();
        debug!("event=shop_update module=service status=start id={id}");

        draft
            .validate()
            .map_err(|err| failed("shop_update", started_at, err.into()))?;
        let updated = self
            .repo
            .update(id, draft)
            .map_err(|err| failed("shop_update", started_at, err.into()))?;

        match &updated {
            Some(shop) => info!(
                "event=shop_update module=service status=ok id={id} updated_date={} duration_ms={}",
                shop.updated_date,
                started_at.elapsed().as_millis()
            ),
            None => warn!(
                "event=shop_update module=service status=not_found id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
        }
        Ok(updated)
    }

    /// Hard-deletes a shop. Returns `false` when it was already absent.
    pub fn delete(&self, id: ShopId) -> ServiceResult<bool> {
        let started_at = Instant::now();
        debug!("event=shop_delete module=service status=start id={id}");

        let deleted = self
            .repo
            .delete_by_id(id)
            .map_err(|err| failed("shop_delete", started_at, err.into()))?;
        if deleted {
            info!(
                "event=shop_delete module=service status=ok id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            );
        } else {
            warn!(
                "event=shop_delete module=service status=not_found id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            );
        }
        Ok(deleted)
    }

    /// Case-insensitive substring search over name or address.
    ///
    /// An empty term returns every shop.
    pub fn search(&self, term: &str) -> ServiceResult<Vec<Shop>> {
        let started_at = Instant::now();
        // Term text is user input; log only its length.
        debug!(
            "event=shop_search module=service status=start term_chars={}",
            term.chars().count()
        );

        let shops = self
            .repo
            .find_by_substring(&SubstringQuery::new(term))
            .map_err(|err| failed("shop_search", started_at, err.into()))?;
        info!(
            "event=shop_search module=service status=ok count={} duration_ms={}",
            shops.len(),
            started_at.elapsed().as_millis()
        );
        Ok(shops)
    }

    /// Total number of stored shops.
    pub fn count(&self) -> ServiceResult<u64> {
        let started_at = Instant::now();

        let count = self
            .repo
            .count()
            .map_err(|err| failed("shop_count", started_at, err.into()))?;
        info!(
            "event=shop_count module=service status=ok count={count} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(count)
    }
}

fn validate_new(draft: &ShopDraft) -> Result<(), ShopValidationError> {
    let id_violation = draft.id.map(|_| FieldViolation {
        field: ShopField::Id,
        message: "Shop id is assigned by the store and must not be set",
    });
    match (draft.validate(), id_violation) {
        (result, None) => result,
        (Ok(()), Some(violation)) => Err(ShopValidationError::new(vec![violation])),
        (Err(mut err), Some(violation)) => {
            err.push(violation);
            Err(err)
        }
    }
}

fn failed(event: &'static str, started_at: Instant, err: ServiceError) -> ServiceError {
    match &err {
        ServiceError::Validation(validation) => warn!(
            "event={event} module=service status=rejected duration_ms={} error_code=validation_failed fields={}",
            started_at.elapsed().as_millis(),
            validation
                .fields()
                .iter()
                .map(|field| field.as_str())
                .collect::<Vec<_>>()
                .join(",")
        ),
        ServiceError::Store(store) => error!(
            "event={event} module=service status=error duration_ms={} error_code=store_failed error={store}",
            started_at.elapsed().as_millis()
        ),
    }
    err
}

#[cfg(test)]
mod tests {
    use super::validate_new;
    use crate::model::shop::{ShopDraft, ShopField};

    #[test]
    fn validate_new_rejects_caller_supplied_id() {
        let mut draft = ShopDraft::new("Tech World", "123 Main St");
        draft.id = Some(7);

        let err = validate_new(&draft).unwrap_err();
        assert_eq!(err.fields(), vec![ShopField::Id]);
    }

    #[test]
    fn validate_new_reports_id_alongside_field_errors() {
        let mut draft = ShopDraft::new("", "123 Main St");
        draft.id = Some(7);

        let err = validate_new(&draft).unwrap_err();
        assert_eq!(err.fields(), vec![ShopField::Name, ShopField::Id]);
    }
}
