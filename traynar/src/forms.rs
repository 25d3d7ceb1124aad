//! Login and signup form state, and the request bodies built from it.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct LoginForm {
    /// Email, phone number or username; the server decides which
    pub identifier: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(identifier: &str, password: &str) -> Self {
        LoginForm {
            identifier: identifier.to_string(),
            password: password.to_string(),
        }
    }

    pub fn to_request(&self) -> LoginRequest {
        LoginRequest {
            identifier: self.identifier.trim().to_string(),
            password: self.password.trim().to_string(),
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, Clone)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Fields of the signup form, in display order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum SignupField {
    Username,
    FirstName,
    LastName,
    Email,
    CountryCode,
    Phone,
    Location,
}

impl SignupField {
    pub fn label(&self) -> &'static str {
        match self {
            SignupField::Username => "Username",
            SignupField::FirstName => "First Name",
            SignupField::LastName => "Last Name",
            SignupField::Email => "Email Address",
            SignupField::CountryCode => "Country Code",
            SignupField::Phone => "Phone Number",
            SignupField::Location => "Location",
        }
    }
}

impl fmt::Display for SignupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-field validation messages; at most one per field, iterated in form order.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct FieldErrors(BTreeMap<SignupField, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: SignupField) -> Option<&str> {
        self.0.get(&field).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SignupField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(&mut self, field: SignupField, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, msg) in self.iter() {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{field}: {msg}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SignupForm {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country_code: String,
    pub phone: String,
    pub location: String,
}

impl SignupForm {
    /// Empty form with the country code pre-filled
    pub fn new(default_country_code: &str) -> Self {
        SignupForm {
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            country_code: default_country_code.to_string(),
            phone: String::new(),
            location: String::new(),
        }
    }

    /// Checks every field. Values are trimmed before checking, the same way they are trimmed
    /// before sending.
    pub fn validate(&self) -> FieldErrors {
        lazy_static! {
            static ref EMAIL_RE: Regex =
                Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$").unwrap();
        }
        lazy_static! {
            static ref PHONE_RE: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
        }
        let mut errors = FieldErrors::default();

        min_length(
            &mut errors,
            SignupField::Username,
            &self.username,
            3,
            "Username is required",
            "Username must be at least 3 characters",
        );
        min_length(
            &mut errors,
            SignupField::FirstName,
            &self.first_name,
            2,
            "First name is required",
            "First name must be at least 2 characters",
        );
        min_length(
            &mut errors,
            SignupField::LastName,
            &self.last_name,
            2,
            "Last name is required",
            "Last name must be at least 2 characters",
        );

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert(SignupField::Email, "Email is required");
        } else if !EMAIL_RE.is_match(email) {
            errors.insert(SignupField::Email, "Invalid email");
        }

        if self.country_code.trim().is_empty() {
            errors.insert(SignupField::CountryCode, "Country code required");
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            errors.insert(SignupField::Phone, "Phone number is required");
        } else if !PHONE_RE.is_match(phone) {
            errors.insert(SignupField::Phone, "Phone number must be 10 digits");
        }

        if self.location.trim().is_empty() {
            errors.insert(SignupField::Location, "Location is required");
        }
        errors
    }

    /// Builds the wire body, or returns the validation errors that block sending.
    pub fn to_request(&self) -> Result<SignupRequest, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(SignupRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            user_name: self.username.trim().to_string(),
            email_id: self.email.trim().to_string(),
            country_code: self.country_code.trim().to_string(),
            phone_number: self.phone.trim().to_string(),
            location: self.location.trim().to_string(),
        })
    }
}

fn min_length(
    errors: &mut FieldErrors,
    field: SignupField,
    value: &str,
    min: usize,
    required_msg: &str,
    short_msg: &str,
) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.insert(field, required_msg);
    } else if len < min {
        errors.insert(field, short_msg);
    }
}

/// Signup body as the server expects it. Field order is the wire order.
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, Clone)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email_id: String,
    pub country_code: String,
    pub phone_number: String,
    pub location: String,
}

#[cfg(test)]
fn valid_form() -> SignupForm {
    SignupForm {
        username: "drreed".to_string(),
        first_name: "Evelyn".to_string(),
        last_name: "Reed".to_string(),
        email: "evelyn@brightsmiles.example".to_string(),
        country_code: "+1".to_string(),
        phone: "5551234567".to_string(),
        location: "Portland".to_string(),
    }
}

#[test]
fn test_login_request_trims() {
    let req = LoginForm::new("  jane@example.com ", " hunter22\n").to_request();
    assert_eq!(req.identifier, "jane@example.com");
    assert_eq!(req.password, "hunter22");
    assert_eq!(
        serde_json::to_string(&req).unwrap(),
        r#"{"identifier":"jane@example.com","password":"hunter22"}"#
    );
}

#[test]
fn test_signup_validation() {
    assert!(valid_form().validate().is_empty());

    let mut form = valid_form();
    form.username = "ab".to_string();
    let errors = form.validate();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.get(SignupField::Username),
        Some("Username must be at least 3 characters")
    );

    let errors = SignupForm::new("+91").validate();
    assert_eq!(errors.get(SignupField::Username), Some("Username is required"));
    assert_eq!(errors.get(SignupField::FirstName), Some("First name is required"));
    assert_eq!(errors.get(SignupField::LastName), Some("Last name is required"));
    assert_eq!(errors.get(SignupField::Email), Some("Email is required"));
    assert_eq!(errors.get(SignupField::CountryCode), None);
    assert_eq!(errors.get(SignupField::Phone), Some("Phone number is required"));
    assert_eq!(errors.get(SignupField::Location), Some("Location is required"));
    let fields: Vec<SignupField> = errors.iter().map(|(f, _)| f).collect();
    assert_eq!(fields[0], SignupField::Username);
    assert_eq!(fields[fields.len() - 1], SignupField::Location);

    let mut form = valid_form();
    form.first_name = " J ".to_string();
    form.email = "not-an-email".to_string();
    form.phone = "555-123-4567".to_string();
    form.country_code = "".to_string();
    let errors = form.validate();
    assert_eq!(
        errors.get(SignupField::FirstName),
        Some("First name must be at least 2 characters")
    );
    assert_eq!(errors.get(SignupField::Email), Some("Invalid email"));
    assert_eq!(
        errors.get(SignupField::Phone),
        Some("Phone number must be 10 digits")
    );
    assert_eq!(
        errors.get(SignupField::CountryCode),
        Some("Country code required")
    );
    assert_eq!(form.to_request(), Err(errors));

    let mut form = valid_form();
    form.phone = "55512345678".to_string();
    assert!(form.validate().get(SignupField::Phone).is_some());
    form.phone = "５５５１２３４５６７".to_string();
    assert!(form.validate().get(SignupField::Phone).is_some());
}

#[test]
fn test_signup_request_wire_format() {
    let mut form = valid_form();
    form.first_name = "  Evelyn ".to_string();
    let req = form.to_request().unwrap();
    assert_eq!(
        serde_json::to_string(&req).unwrap(),
        r#"{"first_name":"Evelyn","last_name":"Reed","user_name":"drreed","email_id":"evelyn@brightsmiles.example","country_code":"+1","phone_number":"5551234567","location":"Portland"}"#
    );
}
