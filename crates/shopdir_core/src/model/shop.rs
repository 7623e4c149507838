//! Shop domain model.
//!
//! # Responsibility
//! - Define the persisted `Shop` record and the `ShopDraft` candidate shape.
//! - Validate the four mutable fields independently and report every
//!   violated field at once.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `created_date <= updated_date` for every persisted record.
//! - Only `name`, `address`, `phone` and `email` are caller-controlled.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned primary key.
pub type ShopId = i64;

pub const NAME_MAX_CHARS: usize = 100;
pub const ADDRESS_MAX_CHARS: usize = 255;
pub const PHONE_MAX_CHARS: usize = 20;
pub const EMAIL_MAX_CHARS: usize = 100;

// local-part "@" domain. The local part may use any non-ASCII character; the
// domain is ASCII with at least one dot-separated label.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~\x{80}-\x{10FFFF}-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~\x{80}-\x{10FFFF}-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$",
    )
    .expect("valid email regex")
});

/// Persisted shop record.
///
/// Timestamps are Unix epoch milliseconds stamped by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Set once at insert; never modified afterwards.
    pub created_date: i64,
    /// Set at insert and refreshed on every successful update.
    pub updated_date: i64,
}

impl Shop {
    /// Validates a record read back from storage.
    ///
    /// Applies the draft field rules plus the timestamp ordering invariant.
    pub fn validate(&self) -> Result<(), ShopValidationError> {
        let mut violations = field_violations(
            &self.name,
            &self.address,
            self.phone.as_deref(),
            self.email.as_deref(),
        );
        if self.updated_date < self.created_date {
            violations.push(FieldViolation {
                field: ShopField::UpdatedDate,
                message: "Updated date must not precede created date",
            });
        }
        ShopValidationError::check(violations)
    }
}

/// Caller-supplied candidate for create and update.
///
/// Missing `name`/`address` deserialize to empty strings so they surface as
/// validation errors instead of decode failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopDraft {
    /// Must stay `None` on create; ignored on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ShopId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ShopDraft {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            address: address.into(),
            phone: None,
            email: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Checks the mutable fields. Pure; `id` is not inspected here.
    ///
    /// # Errors
    /// - Returns every violated field with its first violation message.
    pub fn validate(&self) -> Result<(), ShopValidationError> {
        ShopValidationError::check(field_violations(
            &self.name,
            &self.address,
            self.phone.as_deref(),
            self.email.as_deref(),
        ))
    }
}

impl From<&Shop> for ShopDraft {
    fn from(shop: &Shop) -> Self {
        Self {
            id: None,
            name: shop.name.clone(),
            address: shop.address.clone(),
            phone: shop.phone.clone(),
            email: shop.email.clone(),
        }
    }
}

/// Field addressed by a validation violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShopField {
    Id,
    Name,
    Address,
    Phone,
    Email,
    UpdatedDate,
}

impl ShopField {
    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Address => "address",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::UpdatedDate => "updatedDate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: ShopField,
    pub message: &'static str,
}

/// One or more field rule violations on a shop candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopValidationError {
    violations: Vec<FieldViolation>,
}

impl ShopValidationError {
    /// Builds an error from a non-empty violation list.
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    fn check(violations: Vec<FieldViolation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self::new(violations))
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Returns the message reported for `field`, if it was violated.
    pub fn message_for(&self, field: ShopField) -> Option<&'static str> {
        self.violations
            .iter()
            .find(|violation| violation.field == field)
            .map(|violation| violation.message)
    }

    pub fn fields(&self) -> Vec<ShopField> {
        self.violations.iter().map(|violation| violation.field).collect()
    }

    pub(crate) fn push(&mut self, violation: FieldViolation) {
        self.violations.push(violation);
    }
}

impl Display for ShopValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages = self
            .violations
            .iter()
            .map(|violation| violation.message)
            .collect::<Vec<_>>();
        write!(f, "{}", messages.join("; "))
    }
}

impl Error for ShopValidationError {}

fn field_violations(
    name: &str,
    address: &str,
    phone: Option<&str>,
    email: Option<&str>,
) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    if let Some(message) = required_text_violation(
        name,
        NAME_MAX_CHARS,
        "Shop name is required",
        "Shop name must not exceed 100 characters",
    ) {
        violations.push(FieldViolation {
            field: ShopField::Name,
            message,
        });
    }

    if let Some(message) = required_text_violation(
        address,
        ADDRESS_MAX_CHARS,
        "Address is required",
        "Address must not exceed 255 characters",
    ) {
        violations.push(FieldViolation {
            field: ShopField::Address,
            message,
        });
    }

    if let Some(phone) = phone {
        if phone.chars().count() > PHONE_MAX_CHARS {
            violations.push(FieldViolation {
                field: ShopField::Phone,
                message: "Phone number must not exceed 20 characters",
            });
        }
    }

    if let Some(message) = email.and_then(email_violation) {
        violations.push(FieldViolation {
            field: ShopField::Email,
            message,
        });
    }

    violations
}

fn required_text_violation(
    value: &str,
    max_chars: usize,
    blank_message: &'static str,
    too_long_message: &'static str,
) -> Option<&'static str> {
    if value.trim().is_empty() {
        return Some(blank_message);
    }
    if value.chars().count() > max_chars {
        return Some(too_long_message);
    }
    None
}

fn email_violation(email: &str) -> Option<&'static str> {
    // An empty string is treated like an absent email.
    if email.is_empty() {
        return None;
    }
    if email.chars().count() > EMAIL_MAX_CHARS {
        return Some("Email must not exceed 100 characters");
    }
    if !is_valid_email(email) {
        return Some("Email should be valid");
    }
    None
}

/// Returns whether `value` matches the accepted email address grammar.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, ShopDraft, ShopField};

    #[test]
    fn email_grammar_requires_dotted_domain() {
        assert!(is_valid_email("info@techworld.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email(".user@example.com"));
        assert!(!is_valid_email("us..er@example.com"));
        assert!(!is_valid_email("user@example.com "));
    }

    #[test]
    fn email_local_part_accepts_non_ascii() {
        assert!(is_valid_email("josé@example.com"));
        assert!(is_valid_email("名前.店@example.jp"));
        assert!(!is_valid_email("josé@exämple.com"));
        assert!(!is_valid_email("jo sé@example.com"));
    }

    #[test]
    fn length_limits_count_chars_not_bytes() {
        let draft = ShopDraft::new("é".repeat(100), "Rue de la Paix");
        assert!(draft.validate().is_ok());

        let draft = ShopDraft::new("é".repeat(101), "Rue de la Paix");
        let err = draft.validate().unwrap_err();
        assert_eq!(err.fields(), vec![ShopField::Name]);
    }

    #[test]
    fn empty_optional_fields_are_accepted() {
        let draft = ShopDraft::new("Corner Shop", "1 High St")
            .with_phone("")
            .with_email("");
        assert!(draft.validate().is_ok());
    }
}
