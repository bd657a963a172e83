use std::collections::BTreeMap;

use regex::Regex;

use crate::data_formats::{LoginRequest, SignupRequest, UpdateDetailsRequest};
use crate::errors::RequestError;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[A-Za-z]{2,}$";
const EMPTY_FIELD: &str = "Field must not be empty";

fn is_empty(value: &str) -> bool {
    value.trim().is_empty()
}

fn is_email(value: &str) -> bool {
    Regex::new(EMAIL_PATTERN).unwrap().is_match(value)
}

/// Checked before any store access. All failing fields are reported at once.
pub fn validate_signup(request: &SignupRequest) -> Result<(), RequestError> {
    let mut errors = BTreeMap::new();

    if is_empty(&request.email) {
        errors.insert("email", EMPTY_FIELD.to_owned());
    } else if !is_email(&request.email) {
        errors.insert("email", "Field must be a valid email address".to_owned());
    }

    if is_empty(&request.password) {
        errors.insert("password", EMPTY_FIELD.to_owned());
    }
    if request.password != request.confirm_password {
        errors.insert("confirmPassword", "Both passwords must match".to_owned());
    }
    if is_empty(&request.handle) {
        errors.insert("handle", EMPTY_FIELD.to_owned());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RequestError::Validation(errors))
    }
}

pub fn validate_login(request: &LoginRequest) -> Result<(), RequestError> {
    let mut errors = BTreeMap::new();

    if is_empty(&request.email) {
        errors.insert("email", EMPTY_FIELD.to_owned());
    }
    if is_empty(&request.password) {
        errors.insert("password", EMPTY_FIELD.to_owned());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RequestError::Validation(errors))
    }
}

#[derive(Debug, Default)]
pub struct UserDetails {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
}

/// Trims the submitted profile fields and drops the empty ones so they do not
/// overwrite stored values. A website without a scheme gets `http://` in front
/// (http and not https, so sites without SSL still resolve).
pub fn reduce_user_details(request: UpdateDetailsRequest) -> UserDetails {
    let mut details = UserDetails::default();

    if let Some(bio) = request.bio.as_deref().filter(|b| !is_empty(b)) {
        details.bio = Some(bio.trim().to_owned());
    }
    if let Some(website) = request.website.as_deref().filter(|w| !is_empty(w)) {
        let website = website.trim();
        details.website = if website.starts_with("http") {
            Some(website.to_owned())
        } else {
            Some(format!("http://{website}"))
        };
    }
    if let Some(location) = request.location.as_deref().filter(|l| !is_empty(l)) {
        details.location = Some(location.trim().to_owned());
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(email: &str, password: &str, confirm: &str, handle: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm.to_owned(),
            handle: handle.to_owned(),
        }
    }

    #[test]
    fn signup_accepts_valid_data() {
        assert!(validate_signup(&signup("ape@jungle.com", "secret", "secret", "ape")).is_ok());
    }

    #[test]
    fn signup_rejects_malformed_email() {
        let err = validate_signup(&signup("not-an-email", "secret", "secret", "ape"));
        match err {
            Err(RequestError::Validation(errors)) => {
                assert_eq!(
                    errors.get("email").map(String::as_str),
                    Some("Field must be a valid email address")
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn signup_rejects_mismatched_passwords() {
        let err = validate_signup(&signup("ape@jungle.com", "secret", "other", "ape"));
        match err {
            Err(RequestError::Validation(errors)) => {
                assert!(errors.contains_key("confirmPassword"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn signup_reports_all_empty_fields() {
        let err = validate_signup(&signup("", "", "", " "));
        match err {
            Err(RequestError::Validation(errors)) => {
                assert!(errors.contains_key("email"));
                assert!(errors.contains_key("password"));
                assert!(errors.contains_key("handle"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn login_rejects_empty_fields() {
        let request = LoginRequest {
            email: String::new(),
            password: "secret".to_owned(),
        };
        assert!(validate_login(&request).is_err());
    }

    #[test]
    fn details_are_trimmed_and_empty_fields_dropped() {
        let details = reduce_user_details(UpdateDetailsRequest {
            bio: Some("  hello  ".to_owned()),
            website: Some("   ".to_owned()),
            location: None,
        });
        assert_eq!(details.bio.as_deref(), Some("hello"));
        assert!(details.website.is_none());
        assert!(details.location.is_none());
    }

    #[test]
    fn website_gets_http_prefix() {
        let details = reduce_user_details(UpdateDetailsRequest {
            bio: None,
            website: Some("jungle.com".to_owned()),
            location: None,
        });
        assert_eq!(details.website.as_deref(), Some("http://jungle.com"));

        let details = reduce_user_details(UpdateDetailsRequest {
            bio: None,
            website: Some("https://jungle.com".to_owned()),
            location: None,
        });
        assert_eq!(details.website.as_deref(), Some("https://jungle.com"));
    }
}
