//! Entity store: keyed SQLite storage for students, courses, and
//! enrollments, identity assignment, and field-level validation. Nothing in
//! here knows about cross-entity rules; those live in [`crate::integrity`].

mod connection;
mod courses;
mod enrollments;
mod students;

pub use connection::{default_db_path, Database};
pub use courses::{delete_course, fetch_course, fetch_courses, insert_course, update_course};
pub use enrollments::{
    delete_enrollment, delete_enrollments_for_course, delete_enrollments_for_student,
    fetch_enrollment, fetch_enrollment_details, fetch_enrollments, fetch_enrollments_for_course,
    fetch_enrollments_for_student, find_enrollment_by_pair, insert_enrollment,
    update_enrollment_grade,
};
pub use students::{delete_student, fetch_student, fetch_students, insert_student, update_student};
