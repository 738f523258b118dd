//! Field-level constraints shared by the store's create and update paths.
//! Each check collects every violation instead of stopping at the first so a
//! form can highlight all bad inputs at once.

use validator::ValidateEmail;

use crate::error::{FieldViolation, RegistryError, Result};
use crate::models::{NewCourse, NewStudent};

pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_TITLE_CHARS: usize = 100;
pub const MIN_CREDITS: i64 = 0;
pub const MAX_CREDITS: i64 = 10;
pub const MIN_GRADE: i64 = 0;
pub const MAX_GRADE: i64 = 100;

pub fn validate_student(student: &NewStudent) -> Result<()> {
    let mut violations = Vec::new();

    check_required_text(
        &mut violations,
        "first_name",
        &student.first_name,
        MAX_NAME_CHARS,
    );
    check_required_text(
        &mut violations,
        "last_name",
        &student.last_name,
        MAX_NAME_CHARS,
    );

    if let Some(email) = &student.email {
        if !email.validate_email() {
            violations.push(FieldViolation::new("email", "is not a valid email address"));
        }
    }

    finish(violations)
}

pub fn validate_course(course: &NewCourse) -> Result<()> {
    let mut violations = Vec::new();

    check_required_text(&mut violations, "title", &course.title, MAX_TITLE_CHARS);
    check_range(
        &mut violations,
        "credits",
        course.credits,
        MIN_CREDITS,
        MAX_CREDITS,
    );

    finish(violations)
}

/// An absent grade is always valid.
pub fn validate_grade(grade: Option<i64>) -> Result<()> {
    let mut violations = Vec::new();
    if let Some(grade) = grade {
        check_range(&mut violations, "grade", grade, MIN_GRADE, MAX_GRADE);
    }
    finish(violations)
}

fn check_required_text(
    violations: &mut Vec<FieldViolation>,
    field: &'static str,
    value: &str,
    max_chars: usize,
) {
    if value.trim().is_empty() {
        violations.push(FieldViolation::new(field, "is required"));
    } else if value.chars().count() > max_chars {
        violations.push(FieldViolation::new(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
}

fn check_range(
    violations: &mut Vec<FieldViolation>,
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) {
    if !(min..=max).contains(&value) {
        violations.push(FieldViolation::new(
            field,
            format!("must be between {min} and {max}"),
        ));
    }
}

fn finish(violations: Vec<FieldViolation>) -> Result<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(RegistryError::Validation(violations))
    }
}
