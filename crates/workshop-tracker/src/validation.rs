//! Input validation run before anything reaches the store

use chrono::NaiveDate;
use thiserror::Error;

use crate::catalog::ClassType;
use crate::constants;
use crate::expenses::{ExpenseInput, ExpenseRecord, YearMonth};
use crate::incomes::{IncomeInput, IncomeRecord};
use crate::profiles::Profile;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} cannot be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid month '{0}', expected YYYY-MM or a month name")]
    InvalidMonth(String),

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Email must use the @{expected} domain")]
    EmailDomainMismatch { expected: String },
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(value.to_string())
    }
}

fn non_negative(value: f64, field: &'static str) -> Result<f64, ValidationError> {
    if value < 0.0 {
        Err(ValidationError::Negative { field, value })
    } else {
        Ok(value)
    }
}

pub fn parse_date(text: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(text.to_string()))
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < constants::MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min: constants::MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Check the email belongs to `expected_domain` (case-insensitive)
pub fn validate_email_domain(email: &str, expected_domain: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    let expected = expected_domain.trim().trim_start_matches('@');
    let domain = email.trim().rsplit('@').next().unwrap_or_default();
    if domain.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(ValidationError::EmailDomainMismatch {
            expected: expected.to_string(),
        })
    }
}

/// Validate an expense and normalize its month to `YYYY-MM`
pub fn validate_expense(
    input: ExpenseInput,
    reference_year: i32,
) -> Result<ExpenseRecord, ValidationError> {
    let user_id = required(&input.user_id, "user_id")?;
    let name = required(&input.name, "name")?;
    let cost = non_negative(input.cost, "cost")?;
    let month = YearMonth::parse(&input.month, reference_year)
        .ok_or_else(|| ValidationError::InvalidMonth(input.month.clone()))?;

    Ok(ExpenseRecord {
        id: None,
        user_id,
        month: month.to_string(),
        name,
        cost,
        who_paid: input.who_paid.trim().to_string(),
        category: input.category.trim().to_string(),
        created_at: None,
    })
}

/// Validate an income and compute its derived costs
pub fn validate_income(
    input: IncomeInput,
    class_types: &[ClassType],
) -> Result<IncomeRecord, ValidationError> {
    required(&input.user_id, "user_id")?;
    let date = parse_date(&input.date)?;
    non_negative(input.payment, "payment")?;
    non_negative(input.shipping_cost, "shipping_cost")?;
    if let Some(rate) = input.cost_per_guest {
        non_negative(rate, "cost_per_guest")?;
    }
    Ok(input.into_record(date, class_types))
}

pub fn validate_class_type(class_type: &ClassType) -> Result<(), ValidationError> {
    required(&class_type.name, "name")?;
    non_negative(class_type.cost_per_person, "cost_per_person")?;
    Ok(())
}

/// Validate a profile; when `email_domain` is configured the email must match it
pub fn validate_profile(
    profile: &Profile,
    email_domain: Option<&str>,
) -> Result<(), ValidationError> {
    required(&profile.id, "id")?;
    required(&profile.username, "username")?;
    match email_domain {
        Some(domain) => validate_email_domain(&profile.email, domain),
        None => validate_email(&profile.email),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::Role;

    fn expense_input(month: &str, cost: f64) -> ExpenseInput {
        ExpenseInput {
            user_id: "u1".to_string(),
            month: month.to_string(),
            name: " Kiln repair ".to_string(),
            cost,
            who_paid: " Alice ".to_string(),
            category: "Equipment".to_string(),
        }
    }

    #[test]
    fn test_password_length() {
        assert_eq!(
            validate_password("short"),
            Err(ValidationError::PasswordTooShort { min: 8 })
        );
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@b.co").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert!(validate_email("a b@c.com").is_err());
    }

    #[test]
    fn test_email_domain_mismatch() {
        assert!(validate_email_domain("ada@Studio.com", "studio.com").is_ok());
        assert_eq!(
            validate_email_domain("ada@gmail.com", "@studio.com"),
            Err(ValidationError::EmailDomainMismatch {
                expected: "studio.com".to_string()
            })
        );
    }

    #[test]
    fn test_expense_normalizes_month() {
        let record = validate_expense(expense_input("March", 40.0), 2025).unwrap();
        assert_eq!(record.month, "2025-03");
        assert_eq!(record.name, "Kiln repair");
        assert_eq!(record.who_paid, "Alice");
    }

    #[test]
    fn test_expense_rejections() {
        assert_eq!(
            validate_expense(expense_input("2025-01", -1.0), 2025),
            Err(ValidationError::Negative {
                field: "cost",
                value: -1.0
            })
        );
        assert_eq!(
            validate_expense(expense_input("Brumaire", 1.0), 2025),
            Err(ValidationError::InvalidMonth("Brumaire".to_string()))
        );
        let mut input = expense_input("2025-01", 1.0);
        input.name = "  ".to_string();
        assert_eq!(validate_expense(input, 2025), Err(ValidationError::Missing("name")));
    }

    #[test]
    fn test_income_requires_date() {
        let input = IncomeInput {
            user_id: "u1".to_string(),
            date: "12/04/2025".to_string(),
            platform: String::new(),
            class_type: String::new(),
            guest_count: 1,
            payment: 10.0,
            shipping_cost: 0.0,
            cost_per_guest: None,
            name: String::new(),
        };
        assert_eq!(
            validate_income(input, &[]),
            Err(ValidationError::InvalidDate("12/04/2025".to_string()))
        );
    }

    #[test]
    fn test_profile_domain() {
        let profile = Profile {
            id: "p1".to_string(),
            full_name: String::new(),
            username: "ada".to_string(),
            role: Role::User,
            email: "ada@other.org".to_string(),
            phone_number: None,
            avatar_url: None,
        };
        assert!(validate_profile(&profile, None).is_ok());
        assert!(validate_profile(&profile, Some("studio.com")).is_err());
    }
}
