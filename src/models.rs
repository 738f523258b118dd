//! Domain models that mirror the SQLite schema and get passed between the
//! store, the integrity layer, and whatever presentation layer sits on top.
//! The types stay light-weight data holders; relationships are plain id
//! fields that get resolved through the store on demand, so there is never an
//! ownership cycle between students, courses, and enrollments.

use std::fmt;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;

/// Credits assigned to a course when the caller does not pick a value.
pub const DEFAULT_CREDITS: i64 = 3;

/// Declare an opaque id newtype over the SQLite rowid. Each entity kind gets
/// its own type so a course id can never be handed to a student lookup.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                self.0.to_sql()
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

entity_id!(
    /// Identity of a [`Student`] row.
    StudentId
);
entity_id!(
    /// Identity of a [`Course`] row.
    CourseId
);
entity_id!(
    /// Identity of an [`Enrollment`] row.
    EnrollmentId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A person who can be enrolled in courses. Enrollments are not embedded
/// here; use the query facade to fetch a student together with them.
pub struct Student {
    /// Primary key assigned by the store on insert.
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    /// Optional contact address. When present it always passed email syntax
    /// validation on the way in.
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl Student {
    /// `First Last`, the form roster listings show.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// Field values for a student that does not have an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl NewStudent {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            date_of_birth: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = Some(date_of_birth);
        self
    }
}

/// Partial update for a student. `None` keeps the stored value; for the
/// optional columns `Some(None)` clears them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<Option<String>>,
    pub date_of_birth: Option<Option<NaiveDate>>,
}

impl StudentPatch {
    /// Merge the patch over `current`, yielding the record that would be
    /// stored. Validation runs on the merged result, not on the patch.
    pub fn apply(self, current: &Student) -> NewStudent {
        NewStudent {
            first_name: self
                .first_name
                .unwrap_or_else(|| current.first_name.clone()),
            last_name: self.last_name.unwrap_or_else(|| current.last_name.clone()),
            email: self.email.unwrap_or_else(|| current.email.clone()),
            date_of_birth: self.date_of_birth.unwrap_or(current.date_of_birth),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A course students can enroll in.
pub struct Course {
    pub id: CourseId,
    pub title: String,
    /// Credit value, always within `0..=10`.
    pub credits: i64,
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub title: String,
    pub credits: i64,
}

impl NewCourse {
    /// Start a course with [`DEFAULT_CREDITS`].
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            credits: DEFAULT_CREDITS,
        }
    }

    pub fn with_credits(mut self, credits: i64) -> Self {
        self.credits = credits;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub credits: Option<i64>,
}

impl CoursePatch {
    pub fn apply(self, current: &Course) -> NewCourse {
        NewCourse {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            credits: self.credits.unwrap_or(current.credits),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Link between one student and one course. The two references are fixed at
/// creation; only the grade changes afterwards.
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// Final grade in `0..=100`, absent until one is recorded.
    pub grade: Option<i64>,
}

/// A student together with every enrollment that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentWithEnrollments {
    pub student: Student,
    /// Ordered by enrollment id.
    pub enrollments: Vec<Enrollment>,
}

/// A course together with every enrollment that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseWithEnrollments {
    pub course: Course,
    pub enrollments: Vec<Enrollment>,
}

/// Denormalized roster row: the enrollment plus the names a listing shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentDetail {
    pub enrollment: Enrollment,
    pub student_name: String,
    pub course_title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> Student {
        Student {
            id: StudentId(1),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1815, 12, 10),
        }
    }

    #[test]
    fn student_patch_keeps_untouched_fields() {
        let patch = StudentPatch {
            last_name: Some("King".to_string()),
            ..StudentPatch::default()
        };
        let merged = patch.apply(&ada());
        assert_eq!(merged.first_name, "Ada");
        assert_eq!(merged.last_name, "King");
        assert_eq!(merged.email.as_deref(), Some("ada@example.com"));
        assert!(merged.date_of_birth.is_some());
    }

    #[test]
    fn student_patch_clears_optional_fields() {
        let patch = StudentPatch {
            email: Some(None),
            date_of_birth: Some(None),
            ..StudentPatch::default()
        };
        let merged = patch.apply(&ada());
        assert_eq!(merged.email, None);
        assert_eq!(merged.date_of_birth, None);
    }

    #[test]
    fn new_course_defaults_to_three_credits() {
        assert_eq!(NewCourse::new("Algebra").credits, 3);
        assert_eq!(NewCourse::new("Algebra").with_credits(5).credits, 5);
    }

    #[test]
    fn student_displays_full_name() {
        assert_eq!(ada().to_string(), "Ada Lovelace");
    }
}
