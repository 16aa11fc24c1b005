//! Input validation shared by the presign, order and contact services.
//!
//! Every check is fail-fast: the first violation found is the one reported.

use crate::models::{order::OrderDetails, photo::is_allowed_image_type};
use serde_json::{Map, Value};
use thiserror::Error;

/// Largest accepted `POST /create-order` body.
pub const MAX_ORDER_BODY_BYTES: usize = 10 * 1024;
pub const MAX_FILE_NAME_LEN: usize = 255;
pub const MAX_OBJECT_KEY_LEN: usize = 1024;
pub const MIN_PHONE_DIGITS: usize = 10;
pub const MIN_MESSAGE_LEN: usize = 10;
pub const MAX_MESSAGE_LEN: usize = 1000;

/// A rejected request. The message is safe to show to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("Request body must be a JSON object")]
    MalformedBody,
    #[error("{0}")]
    Missing(String),
    #[error("Unknown field in orderDetails: {0}")]
    UnknownField(String),
    #[error("{field} must be a string")]
    NotAString { field: &'static str },
    #[error("{label} is required")]
    Required { label: &'static str },
    #[error("{label} must be at most {max} characters")]
    TooLong { label: &'static str, max: usize },
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Phone number must be at least {} digits", MIN_PHONE_DIGITS)]
    PhoneTooShort,
    #[error("Invalid fileName: {0}")]
    InvalidFileName(&'static str),
    #[error("Unsupported fileType `{0}`; allowed types are JPEG, PNG, HEIC and HEIF")]
    UnsupportedFileType(String),
    #[error("Invalid photoS3Key: {0}")]
    InvalidPhotoKey(&'static str),
    #[error("Invalid photoS3Url: {0}")]
    InvalidPhotoUrl(&'static str),
    #[error("Message must be at least {} characters long", MIN_MESSAGE_LEN)]
    MessageTooShort,
    #[error("Message cannot exceed {} characters", MAX_MESSAGE_LEN)]
    MessageTooLong,
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// One of the seven customer fields of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    FullName,
    Email,
    Phone,
    StreetAddress,
    City,
    State,
    ZipCode,
}

impl OrderField {
    /// Validation order; also the complete allow-list for `orderDetails`.
    pub const ALL: [OrderField; 7] = [
        OrderField::FullName,
        OrderField::Email,
        OrderField::Phone,
        OrderField::StreetAddress,
        OrderField::City,
        OrderField::State,
        OrderField::ZipCode,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            OrderField::FullName => "fullName",
            OrderField::Email => "email",
            OrderField::Phone => "phone",
            OrderField::StreetAddress => "streetAddress",
            OrderField::City => "city",
            OrderField::State => "state",
            OrderField::ZipCode => "zipCode",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderField::FullName => "Full Name",
            OrderField::Email => "Email Address",
            OrderField::Phone => "Phone Number",
            OrderField::StreetAddress => "Address",
            OrderField::City => "City",
            OrderField::State => "State",
            OrderField::ZipCode => "Pincode",
        }
    }

    pub fn max_len(&self) -> usize {
        match self {
            OrderField::FullName => 100,
            OrderField::Email => 254,
            OrderField::Phone => 20,
            OrderField::StreetAddress => 200,
            OrderField::City | OrderField::State => 50,
            OrderField::ZipCode => 10,
        }
    }

    fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.wire_name() == name)
    }
}

/// Validate one order field and return its trimmed value.
pub fn validate_order_field(field: OrderField, raw: &str) -> ValidationResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            label: field.label(),
        });
    }
    if value.chars().count() > field.max_len() {
        return Err(ValidationError::TooLong {
            label: field.label(),
            max: field.max_len(),
        });
    }
    match field {
        OrderField::Email if !is_valid_email(value) => Err(ValidationError::InvalidEmail),
        OrderField::Phone if count_digits(value) < MIN_PHONE_DIGITS => {
            Err(ValidationError::PhoneTooShort)
        }
        _ => Ok(value.to_string()),
    }
}

/// Validate the raw `orderDetails` object.
///
/// Names outside the known field set are rejected before any field is
/// inspected, so over-posted keys never reach the record.
pub fn validate_order_details(raw: &Map<String, Value>) -> ValidationResult<OrderDetails> {
    if let Some(unknown) = raw.keys().find(|k| OrderField::from_wire(k).is_none()) {
        return Err(ValidationError::UnknownField(unknown.clone()));
    }

    let mut values = OrderField::ALL.map(|_| String::new());
    for (slot, field) in values.iter_mut().zip(OrderField::ALL) {
        let raw_value = match raw.get(field.wire_name()) {
            None | Some(Value::Null) => "",
            Some(Value::String(s)) => s.as_str(),
            Some(_) => {
                return Err(ValidationError::NotAString {
                    field: field.wire_name(),
                });
            }
        };
        *slot = validate_order_field(field, raw_value)?;
    }

    let [full_name, email, phone, street_address, city, state, zip_code] = values;
    Ok(OrderDetails {
        full_name,
        email,
        phone,
        street_address,
        city,
        state,
        zip_code,
    })
}

/// Check a photo key against the configured folder prefix.
pub fn validate_photo_key(key: &str, folder_prefix: &str) -> ValidationResult<()> {
    if key.len() > MAX_OBJECT_KEY_LEN {
        return Err(ValidationError::InvalidPhotoKey("key is too long"));
    }
    if !key.starts_with(folder_prefix) || key.len() == folder_prefix.len() {
        return Err(ValidationError::InvalidPhotoKey(
            "key is outside the upload folder",
        ));
    }
    if key.contains("..") || key.contains("//") || key.contains('\\') {
        return Err(ValidationError::InvalidPhotoKey(
            "key contains a path traversal sequence",
        ));
    }
    if key.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidPhotoKey(
            "key contains control characters",
        ));
    }
    Ok(())
}

/// Regional virtual-hosted host serving objects from `bucket`.
pub fn bucket_host(bucket: &str, region: &str) -> String {
    format!("{}.s3.{}.amazonaws.com", bucket, region)
}

/// Check that a photo URL is HTTPS and served by the configured bucket.
///
/// Both the regional (`<bucket>.s3.<region>.amazonaws.com`) and the global
/// (`<bucket>.s3.amazonaws.com`) virtual-hosted forms are accepted.
pub fn validate_photo_url(url: &str, bucket: &str, region: &str) -> ValidationResult<()> {
    let Some(rest) = url.strip_prefix("https://") else {
        return Err(ValidationError::InvalidPhotoUrl("URL must use https"));
    };
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let regional = bucket_host(bucket, region);
    let global = format!("{}.s3.amazonaws.com", bucket);
    if !host.eq_ignore_ascii_case(&regional) && !host.eq_ignore_ascii_case(&global) {
        return Err(ValidationError::InvalidPhotoUrl(
            "URL does not point at the photo bucket",
        ));
    }
    if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::InvalidPhotoUrl(
            "URL contains whitespace or control characters",
        ));
    }
    Ok(())
}

/// Validate a client-supplied upload filename.
pub fn validate_file_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Missing(
            "Missing fileName or fileType".into(),
        ));
    }
    if name.chars().count() > MAX_FILE_NAME_LEN {
        return Err(ValidationError::InvalidFileName("name is too long"));
    }
    if name.contains("..") {
        return Err(ValidationError::InvalidFileName(
            "name must not contain `..`",
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(ValidationError::InvalidFileName(
            "name must not contain path separators",
        ));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidFileName(
            "name must not contain control characters",
        ));
    }
    Ok(())
}

pub fn validate_file_type(content_type: &str) -> ValidationResult<()> {
    if content_type.trim().is_empty() {
        return Err(ValidationError::Missing(
            "Missing fileName or fileType".into(),
        ));
    }
    if !is_allowed_image_type(content_type) {
        return Err(ValidationError::UnsupportedFileType(
            content_type.to_string(),
        ));
    }
    Ok(())
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Trimmed contact message body within the accepted length window.
pub fn validate_message_body(message: &str) -> ValidationResult<String> {
    let trimmed = message.trim();
    let len = trimmed.chars().count();
    if len < MIN_MESSAGE_LEN {
        return Err(ValidationError::MessageTooShort);
    }
    if len > MAX_MESSAGE_LEN {
        return Err(ValidationError::MessageTooLong);
    }
    Ok(trimmed.to_string())
}

/// Basic `local@domain.tld` shape: no whitespace, exactly one `@`, and a dot
/// inside the domain with text on both sides.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot + 1 < domain.len(),
        None => false,
    }
}

fn count_digits(value: &str) -> usize {
    value.chars().filter(|c| c.is_ascii_digit()).count()
}
