//! Error kinds reported by the store, the integrity layer, and the query
//! facade. Every mutating operation either commits fully or returns one of
//! these without touching the database.

use std::fmt;

use serde::Serialize;

use crate::models::{CourseId, StudentId};

/// Convenience alias used throughout the library.
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

/// One field that failed its declared constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Entity kind named in [`RegistryError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Student,
    Course,
    Enrollment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Student => "Student",
            Self::Course => "Course",
            Self::Enrollment => "Enrollment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Every violated field, never just the first one.
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    /// At least one of the two ids is set; both are set when both parents
    /// are missing.
    #[error("Enrollment references missing records: {}", describe_missing(.student_id, .course_id))]
    DanglingReference {
        student_id: Option<StudentId>,
        course_id: Option<CourseId>,
    },

    #[error("Student {student_id} is already enrolled in course {course_id}")]
    DuplicateEnrollment {
        student_id: StudentId,
        course_id: CourseId,
    },

    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    pub(crate) fn not_found(entity: EntityKind, id: impl Into<i64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_missing(student_id: &Option<StudentId>, course_id: &Option<CourseId>) -> String {
    let mut parts = Vec::new();
    if let Some(id) = student_id {
        parts.push(format!("student {id}"));
    }
    if let Some(id) = course_id {
        parts.push(format!("course {id}"));
    }
    parts.join(", ")
}
