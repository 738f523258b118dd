//! Relational integrity layer for tracking students, courses, and the
//! enrollments that link them.
//!
//! Mutations go through [`Enforcer`], which checks cross-entity rules and
//! delegates storage to the SQLite-backed entity store in [`db`]. Reads go
//! through [`Queries`]. Both share one [`Database`] handle:
//!
//! ```no_run
//! use std::sync::Arc;
//! use course_enrollment_manager::{Database, Enforcer, NewCourse, NewStudent, Queries};
//!
//! # fn main() -> course_enrollment_manager::Result<()> {
//! let db = Arc::new(Database::open_default()?);
//! let enforcer = Enforcer::new(Arc::clone(&db));
//! let queries = Queries::new(db);
//!
//! let ada = enforcer.create_student(NewStudent::new("Ada", "Lovelace"))?;
//! let course = enforcer.create_course(NewCourse::new("Data Structures").with_credits(4))?;
//! enforcer.create_enrollment(ada.id, course.id, None)?;
//!
//! assert_eq!(queries.student_with_enrollments(ada.id)?.enrollments.len(), 1);
//! # Ok(())
//! # }
//! ```
pub mod db;
pub mod error;
pub mod integrity;
pub mod models;
pub mod query;
pub mod validation;

pub use db::{default_db_path, Database};
pub use error::{EntityKind, FieldViolation, RegistryError, Result};
pub use integrity::{CascadeReport, Enforcer};
pub use models::{
    Course, CourseId, CoursePatch, CourseWithEnrollments, Enrollment, EnrollmentDetail,
    EnrollmentId, NewCourse, NewStudent, Student, StudentId, StudentPatch, StudentWithEnrollments,
};
pub use query::Queries;
