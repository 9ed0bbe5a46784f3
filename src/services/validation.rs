//! Complaint form validation
//!
//! The same checks gate the client's submit and the server's create handler.
//! The Aadhaar check is a format check only.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::NewComplaint;

lazy_static! {
    /// Aadhaar number: exactly 12 ASCII digits
    static ref AADHAAR_PATTERN: Regex = Regex::new(r"^[0-9]{12}$").unwrap();

    /// Mobile number: exactly 10 ASCII digits
    static ref PHONE_PATTERN: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}

pub fn is_valid_aadhaar(value: &str) -> bool {
    AADHAAR_PATTERN.is_match(value.trim())
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_PATTERN.is_match(value.trim())
}

/// Check a submission, returning every problem found
pub fn validate_complaint(complaint: &NewComplaint) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    if !is_valid_aadhaar(&complaint.aadhar_number) {
        problems.push("aadharNumber must be a 12-digit number".to_string());
    }

    let phone = complaint.phone.trim();
    if !phone.is_empty() && !is_valid_phone(phone) {
        problems.push("phone must be a 10-digit number".to_string());
    }

    let required = [
        ("fullName", &complaint.full_name),
        ("complaintType", &complaint.complaint_type),
        ("location", &complaint.location),
        ("description", &complaint.description),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            problems.push(format!("{} is required", name));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> NewComplaint {
        NewComplaint {
            aadhar_number: "123456789012".into(),
            complaint_type: "Theft".into(),
            location: "X".into(),
            description: "wallet stolen".into(),
            full_name: "A".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_aadhaar_format() {
        assert!(!is_valid_aadhaar("12345"));
        assert!(is_valid_aadhaar("123456789012"));
        assert!(!is_valid_aadhaar("1234567890123"));
        assert!(!is_valid_aadhaar("12345678901a"));
        assert!(!is_valid_aadhaar(""));
    }

    #[test]
    fn test_phone_format() {
        assert!(is_valid_phone("9876543210"));
        assert!(!is_valid_phone("98765"));
        assert!(!is_valid_phone("+919876543210"));
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        assert!(!is_valid_aadhaar("१२३४५६७८९०१२"));
        assert!(!is_valid_phone("९८७६५४३२१०"));
        assert!(!is_valid_phone("９８７６５４３２１０"));

        let mut complaint = valid();
        complaint.aadhar_number = "१२३४५६७८९०१२".into();
        complaint.phone = "९८७६५४३२१०".into();
        assert_eq!(validate_complaint(&complaint).unwrap_err().len(), 2);
    }

    #[test]
    fn test_valid_submission_passes() {
        assert!(validate_complaint(&valid()).is_ok());
    }

    #[test]
    fn test_phone_is_optional() {
        let mut complaint = valid();
        complaint.phone = String::new();
        assert!(validate_complaint(&complaint).is_ok());

        complaint.phone = "12345".into();
        let problems = validate_complaint(&complaint).unwrap_err();
        assert_eq!(problems, vec!["phone must be a 10-digit number".to_string()]);
    }

    #[test]
    fn test_reports_every_missing_field() {
        let complaint = NewComplaint {
            aadhar_number: "12345".into(),
            description: "   ".into(),
            ..Default::default()
        };
        let problems = validate_complaint(&complaint).unwrap_err();
        assert_eq!(problems.len(), 5);
        assert!(problems[0].starts_with("aadharNumber"));
        assert!(problems.contains(&"description is required".to_string()));
    }
}
