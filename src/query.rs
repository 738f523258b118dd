//! Read-only projections over the store. Every method takes the database lock
//! for the span of one projection, so a student and its enrollments always
//! come from the same state.

use std::sync::Arc;

use crate::db::{self, Database};
use crate::error::{EntityKind, RegistryError, Result};
use crate::models::{
    Course, CourseId, CourseWithEnrollments, Enrollment, EnrollmentDetail, EnrollmentId, Student,
    StudentId, StudentWithEnrollments,
};

#[derive(Clone)]
pub struct Queries {
    db: Arc<Database>,
}

impl Queries {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list_students(&self) -> Result<Vec<Student>> {
        self.db.read(db::fetch_students)
    }

    pub fn list_courses(&self) -> Result<Vec<Course>> {
        self.db.read(db::fetch_courses)
    }

    pub fn list_enrollments(&self) -> Result<Vec<Enrollment>> {
        self.db.read(db::fetch_enrollments)
    }

    /// Roster view: each enrollment with its student's name and course title.
    pub fn list_enrollment_details(&self) -> Result<Vec<EnrollmentDetail>> {
        self.db.read(db::fetch_enrollment_details)
    }

    pub fn get_student(&self, id: StudentId) -> Result<Student> {
        self.db.read(|conn| {
            db::fetch_student(conn, id)?
                .ok_or_else(|| RegistryError::not_found(EntityKind::Student, id))
        })
    }

    pub fn get_course(&self, id: CourseId) -> Result<Course> {
        self.db.read(|conn| {
            db::fetch_course(conn, id)?
                .ok_or_else(|| RegistryError::not_found(EntityKind::Course, id))
        })
    }

    pub fn get_enrollment(&self, id: EnrollmentId) -> Result<Enrollment> {
        self.db.read(|conn| {
            db::fetch_enrollment(conn, id)?
                .ok_or_else(|| RegistryError::not_found(EntityKind::Enrollment, id))
        })
    }

    /// The student plus its enrollments ordered by id.
    pub fn student_with_enrollments(&self, id: StudentId) -> Result<StudentWithEnrollments> {
        self.db.read(|conn| {
            let student = db::fetch_student(conn, id)?
                .ok_or_else(|| RegistryError::not_found(EntityKind::Student, id))?;
            let enrollments = db::fetch_enrollments_for_student(conn, id)?;
            Ok(StudentWithEnrollments {
                student,
                enrollments,
            })
        })
    }

    /// The course plus its enrollments ordered by id.
    pub fn course_with_enrollments(&self, id: CourseId) -> Result<CourseWithEnrollments> {
        self.db.read(|conn| {
            let course = db::fetch_course(conn, id)?
                .ok_or_else(|| RegistryError::not_found(EntityKind::Course, id))?;
            let enrollments = db::fetch_enrollments_for_course(conn, id)?;
            Ok(CourseWithEnrollments {
                course,
                enrollments,
            })
        })
    }
}
