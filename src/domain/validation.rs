use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::domain::user::{CreateUser, NewUser, UpdateUser, UserPatch};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

/// One failed field check, serialized into the `errors` array of a 400
/// response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

fn field_error(field: &'static str, message: &str) -> FieldError {
    FieldError {
        field,
        message: message.to_string(),
    }
}

fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// A field counts as supplied only when it is present and non-empty; an empty
/// string behaves exactly like an absent field for the update rules.
fn supplied(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Checks for `POST /users/push`: `name` must be a string (the empty string
/// included), `email` must be email-shaped.
pub fn validate_create(req: &CreateUser) -> Result<NewUser, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = req.name.clone();
    if name.is_none() {
        errors.push(field_error("name", "name must be a string"));
    }

    let email = req.email.clone();
    if !email.as_deref().is_some_and(is_email) {
        errors.push(field_error("email", "email must be a valid email"));
    }

    match (name, email) {
        (Some(name), Some(email)) if errors.is_empty() => Ok(NewUser { name, email }),
        _ => Err(errors),
    }
}

/// Checks for `POST /users/update`: `id` is a required integer, `name` and
/// `email` are optional with `email` shape-checked whenever present, and at
/// least one of the two must be supplied.
pub fn validate_update(req: &UpdateUser) -> Result<(i64, UserPatch), Vec<FieldError>> {
    let mut errors = Vec::new();

    if req.id.is_none() {
        errors.push(field_error("id", "id must be an integer"));
    }
    if req.email.as_deref().is_some_and(|email| !is_email(email)) {
        errors.push(field_error("email", "email must be a valid email"));
    }
    if !supplied(req.name.as_deref()) && !supplied(req.email.as_deref()) {
        errors.push(field_error("body", "Either name or email must be provided."));
    }

    let patch = UserPatch {
        name: req.name.clone().filter(|name| !name.is_empty()),
        email: req.email.clone().filter(|email| !email.is_empty()),
    };

    match req.id {
        Some(id) if errors.is_empty() => Ok((id, patch)),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_req(name: Option<&str>, email: Option<&str>) -> CreateUser {
        CreateUser {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    fn update_req(id: Option<i64>, name: Option<&str>, email: Option<&str>) -> UpdateUser {
        UpdateUser {
            id,
            name: name.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn create_accepts_name_and_well_formed_email() {
        let new_user = validate_create(&create_req(Some("Ann"), Some("ann@x.com"))).unwrap();
        assert_eq!(new_user.name, "Ann");
        assert_eq!(new_user.email, "ann@x.com");
    }

    #[test]
    fn create_accepts_empty_name() {
        // The name rule is string-ness, and the empty string is a string.
        let new_user = validate_create(&create_req(Some(""), Some("ann@x.com"))).unwrap();
        assert_eq!(new_user.name, "");
    }

    #[test]
    fn create_rejects_missing_name() {
        let errors = validate_create(&create_req(None, Some("ann@x.com"))).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].message, "name must be a string");
    }

    #[test]
    fn create_rejects_missing_email() {
        let errors = validate_create(&create_req(Some("Ann"), None)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }

    #[test]
    fn create_rejects_malformed_email() {
        for bad in ["nope", "a@b", "a b@c.de", "@x.com", "a@", "a@b.", "a@ b.co"] {
            let errors = validate_create(&create_req(Some("Ann"), Some(bad))).unwrap_err();
            assert_eq!(errors[0].field, "email", "expected {bad:?} to be rejected");
        }
    }

    #[test]
    fn create_collects_every_failed_field() {
        let errors = validate_create(&create_req(None, None)).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email"]);
    }

    #[test]
    fn update_with_name_only_leaves_email_out_of_the_patch() {
        let (id, patch) = validate_update(&update_req(Some(7), Some("Bo"), None)).unwrap();
        assert_eq!(id, 7);
        assert_eq!(patch.name.as_deref(), Some("Bo"));
        assert!(patch.email.is_none());
    }

    #[test]
    fn update_with_email_only_leaves_name_out_of_the_patch() {
        let (_, patch) = validate_update(&update_req(Some(7), None, Some("bo@x.com"))).unwrap();
        assert!(patch.name.is_none());
        assert_eq!(patch.email.as_deref(), Some("bo@x.com"));
    }

    #[test]
    fn update_rejects_missing_id() {
        let errors = validate_update(&update_req(None, Some("Bo"), None)).unwrap_err();
        assert_eq!(errors[0].field, "id");
        assert_eq!(errors[0].message, "id must be an integer");
    }

    #[test]
    fn update_requires_at_least_one_field() {
        let errors = validate_update(&update_req(Some(7), None, None)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "body");
        assert_eq!(errors[0].message, "Either name or email must be provided.");
    }

    #[test]
    fn update_treats_empty_name_as_absent() {
        let errors = validate_update(&update_req(Some(7), Some(""), None)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "body");
    }

    #[test]
    fn update_empty_email_fails_both_shape_and_presence() {
        let errors = validate_update(&update_req(Some(7), None, Some(""))).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["email", "body"]);
    }

    #[test]
    fn update_rejects_malformed_email_even_with_name_present() {
        let errors = validate_update(&update_req(Some(7), Some("Bo"), Some("nope"))).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }

    #[test]
    fn update_empty_name_with_valid_email_patches_email_only() {
        let (_, patch) =
            validate_update(&update_req(Some(7), Some(""), Some("bo@x.com"))).unwrap();
        assert!(patch.name.is_none());
        assert_eq!(patch.email.as_deref(), Some("bo@x.com"));
    }
}
