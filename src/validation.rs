//! Form validation
//!
//! Checks run before any request is sent. All failing fields are reported
//! together.

use std::fmt;

use thiserror::Error;

use crate::models::{LoginRequest, MeasurementMode, RegisterRequest};

pub const MIN_AMOUNT: f64 = 0.1;
pub const MAX_AMOUNT: f64 = 1000.0;
pub const MAX_SERVINGS: f64 = 50.0;
pub const MAX_DISH_NAME_LEN: usize = 100;
pub const MAX_NAME_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 6;

/// A single field failure
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", render(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn render(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl ValidationErrors {
    pub fn messages_for(&self, field: &str) -> Vec<&'static str> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message)
            .collect()
    }
}

#[derive(Default)]
struct Collector(Vec<FieldError>);

impl Collector {
    fn check(&mut self, ok: bool, field: &'static str, message: &'static str) {
        if !ok {
            self.0.push(FieldError { field, message });
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.0))
        }
    }
}

/// A validated calorie lookup request
#[derive(Debug, Clone, PartialEq)]
pub struct CalorieForm {
    pub dish_name: String,
    pub mode: MeasurementMode,
    pub amount: f64,
}

/// Validate the lookup form and return it with a trimmed dish name
pub fn validate_calorie_form(dish_name: &str, mode: &str, amount: f64) -> Result<CalorieForm, ValidationErrors> {
    let mut errors = Collector::default();
    let dish_name = dish_name.trim();
    let name_len = dish_name.chars().count();

    errors.check(name_len >= 1, "dish_name", "Dish name is required");
    errors.check(name_len <= MAX_DISH_NAME_LEN, "dish_name", "Dish name too long");

    let parsed_mode = MeasurementMode::from_str(mode);
    errors.check(parsed_mode.is_some(), "mode", "Invalid mode");

    if !amount.is_finite() {
        errors.check(false, "amount", "Amount must be a number");
    } else {
        errors.check(amount >= MIN_AMOUNT, "amount", "Amount must be at least 0.1");
        errors.check(amount <= MAX_AMOUNT, "amount", "Maximum 1000g or servings");
        if parsed_mode == Some(MeasurementMode::Servings) {
            errors.check(amount <= MAX_SERVINGS, "amount", "Maximum 50 servings");
        }
    }

    errors.finish()?;
    Ok(CalorieForm {
        dish_name: dish_name.to_string(),
        mode: parsed_mode.unwrap_or_default(),
        amount,
    })
}

pub fn validate_register(data: &RegisterRequest) -> Result<(), ValidationErrors> {
    let mut errors = Collector::default();
    let first = data.first_name.trim().chars().count();
    let last = data.last_name.trim().chars().count();

    errors.check(first >= 1, "first_name", "First name is required");
    errors.check(first <= MAX_NAME_LEN, "first_name", "First name too long");
    errors.check(last >= 1, "last_name", "Last name is required");
    errors.check(last <= MAX_NAME_LEN, "last_name", "Last name too long");
    errors.check(is_valid_email(&data.email), "email", "Invalid email address");
    errors.check(
        data.password.chars().count() >= MIN_PASSWORD_LEN,
        "password",
        "Password must be at least 6 characters",
    );
    errors.finish()
}

pub fn validate_login(data: &LoginRequest) -> Result<(), ValidationErrors> {
    let mut errors = Collector::default();
    errors.check(is_valid_email(&data.email), "email", "Invalid email address");
    errors.check(!data.password.is_empty(), "password", "Password is required");
    errors.finish()
}

/// Structural email check: one `@`, non-empty local part, dotted domain
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
