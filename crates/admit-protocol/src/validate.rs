//! Applicant validation
//!
//! Rules run in a fixed order and short-circuit on the first failure, each
//! with its own human-readable reason. The typed [`ApplicationRecord`] is
//! constructed only after every rule passes; nothing downstream touches the
//! raw JSON again.

use crate::error::{ProtocolError, Result};
use crate::types::ApplicationRecord;
use serde_json::Value;

/// Courses open for application, matched case-sensitively
pub const OFFERED_COURSES: [&str; 3] = [
    "MSc Cyber Security",
    "MSc Information Systems & computing",
    "MSc Data Analytics",
];

/// Maximum applicant name length in characters
pub const MAX_NAME_LEN: usize = 200;

/// Accepted intended start years
pub const START_YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2100;

const REQUIRED_FIELDS: [&str; 5] =
    ["name", "qualifications", "course", "start_year", "start_month"];

/// Validate a raw applicant object into an [`ApplicationRecord`].
///
/// Never panics on malformed input; every failure is a
/// [`ProtocolError::Validation`] with a reason naming the rule that failed.
pub fn validate_applicant(applicant: &Value) -> Result<ApplicationRecord> {
    let fields = applicant
        .as_object()
        .ok_or_else(|| ProtocolError::validation("Applicant must be a JSON object"))?;

    for key in REQUIRED_FIELDS {
        if is_blank(fields.get(key)) {
            return Err(ProtocolError::validation(format!(
                "Missing required field: {key}"
            )));
        }
    }

    let (Some(start_year), Some(start_month)) = (
        integer_field(&fields["start_year"]),
        integer_field(&fields["start_month"]),
    ) else {
        return Err(ProtocolError::validation(
            "start_year and start_month must be integers",
        ));
    };

    let year_ok = start_year >= i64::from(*START_YEAR_RANGE.start())
        && start_year <= i64::from(*START_YEAR_RANGE.end());
    if !year_ok || !(1..=12).contains(&start_month) {
        return Err(ProtocolError::validation("Invalid start year/month"));
    }

    let course = string_field(&fields["course"]);
    if !OFFERED_COURSES.contains(&course.as_str()) {
        return Err(ProtocolError::validation(format!(
            "Invalid course. Allowed: {}",
            OFFERED_COURSES.join(", ")
        )));
    }

    let name = string_field(&fields["name"]);
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ProtocolError::validation("Name too long"));
    }

    let address = match fields.get("address") {
        Some(v) if !is_blank(Some(v)) => Some(string_field(v)),
        _ => None,
    };

    Ok(ApplicationRecord {
        name,
        address,
        qualifications: string_field(&fields["qualifications"]),
        course,
        start_year: start_year as i32,
        start_month: start_month as u8,
    })
}

/// A field is blank when absent, null, or a string that trims to nothing.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Accept JSON integers and integer-valued strings; everything else
/// (floats, booleans, objects) is non-integer input.
fn integer_field(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
