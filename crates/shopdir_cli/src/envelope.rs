//! Uniform response envelope for directory operations.
//!
//! # Responsibility
//! - Map typed service outcomes to a status class and a JSON envelope
//!   (`success`, `message`, `data`, optional `count`/`searchTerm`/`errors`).
//!   Count envelopes carry no `data` key.
//!
//! # Invariants
//! - Not-found outcomes map to `Status::NotFound`, validation failures to
//!   `Status::BadRequest`, every store failure to `Status::ServerError`.

use log::error;
use serde::Serialize;
use serde_json::Value;
use shopdir_core::{ServiceError, ServiceResult, Shop, ShopId, ShopValidationError};
use std::fmt::Display;
use std::process::ExitCode;

/// Outcome class of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Created,
    NotFound,
    BadRequest,
    ServerError,
}

impl Status {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Ok | Self::Created => ExitCode::SUCCESS,
            Self::ServerError => ExitCode::from(1),
            Self::NotFound => ExitCode::from(2),
            Self::BadRequest => ExitCode::from(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    /// `None` omits the key (count envelopes); `Some(Value::Null)` emits
    /// `"data": null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl Envelope {
    fn success(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            count: None,
            search_term: None,
            errors: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::success(message, Value::Null)
        }
    }

    fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    fn without_data(mut self) -> Self {
        self.data = None;
        self
    }
}

/// Envelope plus its status class.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Status,
    pub envelope: Envelope,
}

impl Response {
    fn new(status: Status, envelope: Envelope) -> Self {
        Self { status, envelope }
    }
}

pub fn list_response(result: ServiceResult<Vec<Shop>>) -> Response {
    match result {
        Ok(shops) => encoded("retrieving shops", &shops, |data| {
            Response::new(
                Status::Ok,
                Envelope::success("Shops retrieved successfully", data)
                    .with_count(shops.len() as u64),
            )
        }),
        Err(err) => failure_response("retrieving shops", err),
    }
}

pub fn get_response(id: ShopId, result: ServiceResult<Option<Shop>>) -> Response {
    match result {
        Ok(Some(shop)) => encoded("retrieving shop", &shop, |data| {
            Response::new(
                Status::Ok,
                Envelope::success("Shop found successfully", data),
            )
        }),
        Ok(None) => not_found_response(id),
        Err(err) => failure_response("retrieving shop", err),
    }
}

pub fn create_response(result: ServiceResult<Shop>) -> Response {
    match result {
        Ok(shop) => encoded("creating shop", &shop, |data| {
            Response::new(
                Status::Created,
                Envelope::success("Shop created successfully", data),
            )
        }),
        Err(err) => failure_response("creating shop", err),
    }
}

pub fn update_response(id: ShopId, result: ServiceResult<Option<Shop>>) -> Response {
    match result {
        Ok(Some(shop)) => encoded("updating shop", &shop, |data| {
            Response::new(
                Status::Ok,
                Envelope::success("Shop updated successfully", data),
            )
        }),
        Ok(None) => not_found_response(id),
        Err(err) => failure_response("updating shop", err),
    }
}

pub fn delete_response(id: ShopId, result: ServiceResult<bool>) -> Response {
    match result {
        Ok(true) => Response::new(
            Status::Ok,
            Envelope::success("Shop deleted successfully", Value::Null),
        ),
        Ok(false) => not_found_response(id),
        Err(err) => failure_response("deleting shop", err),
    }
}

pub fn search_response(term: &str, result: ServiceResult<Vec<Shop>>) -> Response {
    match result {
        Ok(shops) => encoded("searching shops", &shops, |data| {
            let mut envelope = Envelope::success("Search completed successfully", data)
                .with_count(shops.len() as u64);
            envelope.search_term = Some(term.to_string());
            Response::new(Status::Ok, envelope)
        }),
        Err(err) => failure_response("searching shops", err),
    }
}

pub fn count_response(result: ServiceResult<u64>) -> Response {
    match result {
        Ok(count) => Response::new(
            Status::Ok,
            Envelope::success("Count retrieved successfully", Value::Null)
                .without_data()
                .with_count(count),
        ),
        Err(err) => {
            let mut response = failure_response("getting shops count", err);
            response.envelope = response.envelope.without_data().with_count(0);
            response
        }
    }
}

fn not_found_response(id: ShopId) -> Response {
    Response::new(
        Status::NotFound,
        Envelope::failure(format!("Shop not found with ID: {id}")),
    )
}

fn failure_response(action: &str, err: ServiceError) -> Response {
    match err {
        ServiceError::Validation(validation) => validation_response(&validation),
        ServiceError::Store(store) => server_error(action, &store),
    }
}

fn server_error(action: &str, err: &dyn Display) -> Response {
    Response::new(
        Status::ServerError,
        Envelope::failure(format!("Error {action}: {err}")),
    )
}

fn validation_response(err: &ShopValidationError) -> Response {
    let mut envelope = Envelope::failure(format!("Validation failed: {err}"));
    envelope.errors = Some(
        err.violations()
            .iter()
            .map(|violation| FieldError {
                field: violation.field.as_str(),
                message: violation.message,
            })
            .collect(),
    );
    Response::new(Status::BadRequest, envelope)
}

/// Encodes `value` as the envelope payload; an encoding failure becomes a
/// server error for `action`.
fn encoded<T: Serialize>(
    action: &str,
    value: &T,
    respond: impl FnOnce(Value) -> Response,
) -> Response {
    match serde_json::to_value(value) {
        Ok(data) => respond(data),
        Err(err) => {
            error!("event=envelope_encode module=cli status=error action={action:?} error={err}");
            server_error(action, &err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        count_response, create_response, delete_response, encoded, get_response, list_response,
        search_response, Status,
    };
    use serde::ser::Error as _;
    use serde::{Serialize, Serializer};
    use serde_json::Value;
    use shopdir_core::{RepoError, ServiceError, Shop, ShopDraft};

    fn sample_shop() -> Shop {
        Shop {
            id: 1,
            name: "Tech World".to_string(),
            address: "123 Main St".to_string(),
            phone: None,
            email: Some("info@techworld.com".to_string()),
            created_date: 1_700_000_000_000,
            updated_date: 1_700_000_000_000,
        }
    }

    fn store_error() -> ServiceError {
        ServiceError::Store(RepoError::InvalidData("disk full".to_string()))
    }

    #[test]
    fn list_envelope_carries_data_and_count() {
        let response = list_response(Ok(vec![sample_shop()]));
        assert_eq!(response.status, Status::Ok);

        let json = serde_json::to_value(&response.envelope).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Shops retrieved successfully");
        assert_eq!(json["count"], 1);
        assert_eq!(json["data"][0]["createdDate"], 1_700_000_000_000_i64);
        assert!(json.get("searchTerm").is_none());
    }

    #[test]
    fn missing_shop_maps_to_not_found() {
        let response = get_response(999, Ok(None));
        assert_eq!(response.status, Status::NotFound);
        assert!(!response.envelope.success);
        assert_eq!(response.envelope.message, "Shop not found with ID: 999");
        assert_eq!(response.envelope.data, Some(Value::Null));
        let json = serde_json::to_value(&response.envelope).unwrap();
        assert!(json["data"].is_null());
        assert!(json.as_object().unwrap().contains_key("data"));

        let deleted = delete_response(999, Ok(false));
        assert_eq!(deleted.status, Status::NotFound);
    }

    #[test]
    fn validation_failure_maps_to_bad_request_with_field_errors() {
        let err = ShopDraft::new("", "123 Main St")
            .with_email("nope")
            .validate()
            .unwrap_err();
        let response = create_response(Err(ServiceError::Validation(err)));

        assert_eq!(response.status, Status::BadRequest);
        assert_eq!(
            response.envelope.message,
            "Validation failed: Shop name is required; Email should be valid"
        );
        let json = serde_json::to_value(&response.envelope).unwrap();
        assert_eq!(json["errors"][0]["field"], "name");
        assert_eq!(json["errors"][1]["field"], "email");
    }

    #[test]
    fn store_failure_maps_to_server_error() {
        let response = search_response("tech", Err(store_error()));
        assert_eq!(response.status, Status::ServerError);
        assert_eq!(
            response.envelope.message,
            "Error searching shops: invalid persisted shop data: disk full"
        );
    }

    #[test]
    fn search_envelope_echoes_term() {
        let response = search_response("cafe", Ok(Vec::new()));
        let json = serde_json::to_value(&response.envelope).unwrap();
        assert_eq!(json["searchTerm"], "cafe");
        assert_eq!(json["count"], 0);
    }

    #[test]
    fn count_failure_reports_zero() {
        let response = count_response(Err(store_error()));
        assert_eq!(response.status, Status::ServerError);
        assert_eq!(response.envelope.count, Some(0));

        let ok = count_response(Ok(12));
        assert_eq!(ok.envelope.count, Some(12));
        assert_eq!(ok.envelope.message, "Count retrieved successfully");
    }

    #[test]
    fn count_envelopes_omit_data_key() {
        for response in [count_response(Ok(3)), count_response(Err(store_error()))] {
            let json = serde_json::to_value(&response.envelope).unwrap();
            let object = json.as_object().unwrap();
            assert!(!object.contains_key("data"), "unexpected data in {json}");
            assert!(object.contains_key("count"));
        }

        let deleted = serde_json::to_value(&delete_response(1, Ok(true)).envelope).unwrap();
        assert!(deleted.as_object().unwrap().contains_key("data"));
    }

    #[test]
    fn encoding_failure_becomes_server_error() {
        struct Unencodable;

        impl Serialize for Unencodable {
            fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                Err(S::Error::custom("value cannot be encoded"))
            }
        }

        let response = encoded("retrieving shops", &Unencodable, |_| {
            panic!("payload should not be produced")
        });
        assert_eq!(response.status, Status::ServerError);
        assert_eq!(
            response.envelope.message,
            "Error retrieving shops: value cannot be encoded"
        );
    }

    #[test]
    fn created_shop_maps_to_created_status() {
        let response = create_response(Ok(sample_shop()));
        assert_eq!(response.status, Status::Created);
        assert_eq!(response.envelope.message, "Shop created successfully");
    }
}
