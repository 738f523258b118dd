//! The integrity enforcer is the only way to mutate the store. Each operation
//! runs its cross-entity checks and the writes they guard inside a single
//! immediate transaction while holding the database lock, so concurrent
//! callers are serialized and no reader ever sees a half-applied change.
//!
//! Rules owned here:
//! - an enrollment's student and course must both exist,
//! - a (student, course) pair is enrolled at most once,
//! - deleting a student or a course removes its enrollments first, in the
//!   same transaction as the parent delete.

use std::sync::Arc;

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

use crate::db::{self, Database};
use crate::error::{EntityKind, RegistryError, Result};
use crate::models::{
    Course, CourseId, CoursePatch, Enrollment, EnrollmentId, NewCourse, NewStudent, Student,
    StudentId, StudentPatch,
};

/// What a cascading delete removed besides the parent itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CascadeReport {
    pub removed_enrollments: Vec<EnrollmentId>,
}

/// Sole entry point for mutations. Cheap to clone; clones share the same
/// database handle.
#[derive(Clone)]
pub struct Enforcer {
    db: Arc<Database>,
}

impl Enforcer {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn create_student(&self, student: NewStudent) -> Result<Student> {
        let student = self
            .db
            .write(|tx| db::insert_student(tx, &student))
            .inspect_err(|err| debug!(%err, "student rejected"))?;
        info!(student_id = %student.id, "student created");
        Ok(student)
    }

    pub fn update_student(&self, id: StudentId, patch: StudentPatch) -> Result<Student> {
        let student = self
            .db
            .write(|tx| db::update_student(tx, id, patch))
            .inspect_err(|err| debug!(student_id = %id, %err, "student update rejected"))?;
        info!(student_id = %id, "student updated");
        Ok(student)
    }

    pub fn create_course(&self, course: NewCourse) -> Result<Course> {
        let course = self
            .db
            .write(|tx| db::insert_course(tx, &course))
            .inspect_err(|err| debug!(%err, "course rejected"))?;
        info!(course_id = %course.id, "course created");
        Ok(course)
    }

    pub fn update_course(&self, id: CourseId, patch: CoursePatch) -> Result<Course> {
        let course = self
            .db
            .write(|tx| db::update_course(tx, id, patch))
            .inspect_err(|err| debug!(course_id = %id, %err, "course update rejected"))?;
        info!(course_id = %id, "course updated");
        Ok(course)
    }

    /// Enroll a student in a course.
    ///
    /// Fails with [`RegistryError::DanglingReference`] naming every missing
    /// parent, [`RegistryError::DuplicateEnrollment`] if the pair is already
    /// enrolled, or [`RegistryError::Validation`] for an out-of-range grade.
    /// The duplicate check and the insert share one transaction, so two racing
    /// calls for the same pair cannot both succeed.
    pub fn create_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        grade: Option<i64>,
    ) -> Result<Enrollment> {
        let enrollment = self
            .db
            .write(|tx| {
                ensure_parents_exist(tx, student_id, course_id)?;
                if db::find_enrollment_by_pair(tx, student_id, course_id)?.is_some() {
                    return Err(RegistryError::DuplicateEnrollment {
                        student_id,
                        course_id,
                    });
                }
                db::insert_enrollment(tx, student_id, course_id, grade)
            })
            .inspect_err(|err| {
                debug!(
                    student_id = %student_id,
                    course_id = %course_id,
                    %err,
                    "enrollment rejected"
                );
            })?;
        info!(
            enrollment_id = %enrollment.id,
            student_id = %student_id,
            course_id = %course_id,
            "enrollment created"
        );
        Ok(enrollment)
    }

    /// Record, change, or clear (`None`) the grade of an enrollment.
    pub fn update_enrollment_grade(
        &self,
        id: EnrollmentId,
        grade: Option<i64>,
    ) -> Result<Enrollment> {
        let enrollment = self
            .db
            .write(|tx| db::update_enrollment_grade(tx, id, grade))
            .inspect_err(|err| debug!(enrollment_id = %id, %err, "grade update rejected"))?;
        info!(enrollment_id = %id, grade = ?grade, "grade updated");
        Ok(enrollment)
    }

    /// Delete a student and every enrollment that references it.
    pub fn delete_student(&self, id: StudentId) -> Result<CascadeReport> {
        let report = self
            .db
            .write(|tx| {
                if db::fetch_student(tx, id)?.is_none() {
                    return Err(RegistryError::not_found(EntityKind::Student, id));
                }
                let removed_enrollments = db::delete_enrollments_for_student(tx, id)?;
                db::delete_student(tx, id)?;
                Ok(CascadeReport {
                    removed_enrollments,
                })
            })
            .inspect_err(|err| debug!(student_id = %id, %err, "student delete rejected"))?;
        info!(
            student_id = %id,
            removed = report.removed_enrollments.len(),
            "student deleted"
        );
        Ok(report)
    }

    /// Delete a course and every enrollment that references it.
    pub fn delete_course(&self, id: CourseId) -> Result<CascadeReport> {
        let report = self
            .db
            .write(|tx| {
                if db::fetch_course(tx, id)?.is_none() {
                    return Err(RegistryError::not_found(EntityKind::Course, id));
                }
                let removed_enrollments = db::delete_enrollments_for_course(tx, id)?;
                db::delete_course(tx, id)?;
                Ok(CascadeReport {
                    removed_enrollments,
                })
            })
            .inspect_err(|err| debug!(course_id = %id, %err, "course delete rejected"))?;
        info!(
            course_id = %id,
            removed = report.removed_enrollments.len(),
            "course deleted"
        );
        Ok(report)
    }

    pub fn delete_enrollment(&self, id: EnrollmentId) -> Result<()> {
        self.db
            .write(|tx| {
                if db::fetch_enrollment(tx, id)?.is_none() {
                    return Err(RegistryError::not_found(EntityKind::Enrollment, id));
                }
                db::delete_enrollment(tx, id)
            })
            .inspect_err(|err| debug!(enrollment_id = %id, %err, "enrollment delete rejected"))?;
        info!(enrollment_id = %id, "enrollment deleted");
        Ok(())
    }
}

fn ensure_parents_exist(conn: &Connection, student_id: StudentId, course_id: CourseId) -> Result<()> {
    let missing_student = db::fetch_student(conn, student_id)?.is_none();
    let missing_course = db::fetch_course(conn, course_id)?.is_none();

    if missing_student || missing_course {
        return Err(RegistryError::DanglingReference {
            student_id: missing_student.then_some(student_id),
            course_id: missing_course.then_some(course_id),
        });
    }
    Ok(())
}
