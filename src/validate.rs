// Roster form validation. Everything here is pure; duplicate checks run
// against a roster snapshot the caller supplies, never against live state.

use std::collections::BTreeMap;

use crate::models::{Student, StudentForm};

pub type FieldErrors = BTreeMap<&'static str, String>;

pub fn validate_name(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return Some("Please enter a name.".into());
    }
    None
}

/// Accepts `local@domain.tld` where no part contains whitespace or a
/// second `@`, and the domain has a dot with characters on both sides.
pub fn validate_email(email: &str) -> Option<String> {
    if !is_email(email) {
        return Some("Please enter a valid email address.".into());
    }
    None
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if local.chars().any(|c| c.is_whitespace())
        || domain.chars().any(|c| c.is_whitespace() || c == '@')
    {
        return false;
    }
    let chars: Vec<char> = domain.chars().collect();
    chars.len() >= 3 && chars[1..chars.len() - 1].contains(&'.')
}

/// Strict `010-XXXX-XXXX`, exactly four digits in each group.
pub fn validate_phone(phone: &str) -> Option<String> {
    let b = phone.as_bytes();
    let ok = b.len() == 13
        && b.starts_with(b"010-")
        && b[4..8].iter().all(u8::is_ascii_digit)
        && b[8] == b'-'
        && b[9..13].iter().all(u8::is_ascii_digit);
    if !ok {
        return Some("Phone number must match 010-0000-0000.".into());
    }
    None
}

/// `exclude_id` skips the record being edited, so a student keeping their
/// own email is not flagged as a duplicate of themselves.
pub fn check_duplicate_email(
    roster: &[Student],
    email: &str,
    exclude_id: Option<i64>,
) -> Option<String> {
    let taken = roster
        .iter()
        .any(|s| Some(s.id) != exclude_id && s.email == email);
    if taken {
        return Some("This email is already registered.".into());
    }
    None
}

/// Field name -> first error message; an absent key means the field is
/// valid. The duplicate check only runs once the email format passes.
pub fn validate_student_form(
    form: &StudentForm,
    roster: &[Student],
    exclude_id: Option<i64>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(msg) = validate_name(&form.name) {
        errors.insert("name", msg);
    }
    if let Some(msg) = validate_email(&form.email) {
        errors.insert("email", msg);
    } else if let Some(msg) = check_duplicate_email(roster, &form.email, exclude_id) {
        errors.insert("email", msg);
    }
    if let Some(msg) = validate_phone(&form.phone) {
        errors.insert("phone", msg);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, email: &str) -> Student {
        Student {
            id,
            name: "Kim Jiwoo".into(),
            email: email.into(),
            phone: "010-1234-5678".into(),
        }
    }

    #[test]
    fn email_format() {
        assert!(validate_email("a@b.co").is_none());
        assert!(validate_email("user.name@mail.example.com").is_none());
        assert!(validate_email("not-an-email").is_some());
        assert!(validate_email("a@b").is_some());
        assert!(validate_email("a@.co").is_some());
        assert!(validate_email("a@b.").is_some());
        assert!(validate_email("a b@c.co").is_some());
        assert!(validate_email("a@b@c.co").is_some());
        assert!(validate_email("").is_some());
    }

    #[test]
    fn phone_format() {
        assert!(validate_phone("010-1234-5678").is_none());
        assert!(validate_phone("011-1234-5678").is_some());
        assert!(validate_phone("010-123-5678").is_some());
        assert!(validate_phone("010-1234-567").is_some());
        assert!(validate_phone("010-12a4-5678").is_some());
        assert!(validate_phone("01012345678").is_some());
    }

    #[test]
    fn name_must_not_be_blank() {
        assert!(validate_name("Kim Jiwoo").is_none());
        assert!(validate_name("   ").is_some());
        assert!(validate_name("").is_some());
    }

    #[test]
    fn duplicate_check_respects_exclude_id() {
        let roster = vec![student(1, "a@b.co"), student(2, "c@d.co")];
        assert!(check_duplicate_email(&roster, "a@b.co", None).is_some());
        assert!(check_duplicate_email(&roster, "a@b.co", Some(1)).is_none());
        assert!(check_duplicate_email(&roster, "a@b.co", Some(2)).is_some());
        assert!(check_duplicate_email(&roster, "new@b.co", None).is_none());
    }

    #[test]
    fn composite_form_reports_first_error_per_field() {
        let roster = vec![student(1, "a@b.co")];
        let form = StudentForm {
            name: "".into(),
            email: "a@b.co".into(),
            phone: "12345".into(),
        };
        let errors = validate_student_form(&form, &roster, None);
        assert_eq!(errors.len(), 3);
        assert!(errors.contains_key("name"));
        assert_eq!(errors["email"], "This email is already registered.");
        assert!(errors.contains_key("phone"));

        let ok = StudentForm {
            name: "Lee Mina".into(),
            email: "mina@example.com".into(),
            phone: "010-9876-5432".into(),
        };
        assert!(validate_student_form(&ok, &roster, None).is_empty());
    }
}
