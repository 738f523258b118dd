use rusqlite::{params, Connection, OptionalExtension, Params, Row};

use crate::error::{EntityKind, RegistryError, Result};
use crate::models::{CourseId, Enrollment, EnrollmentDetail, EnrollmentId, StudentId};
use crate::validation::validate_grade;

fn enrollment_from_row(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        id: row.get(0)?,
        student_id: row.get(1)?,
        course_id: row.get(2)?,
        grade: row.get(3)?,
    })
}

/// Run an enrollment query with the given `WHERE` clause, ordered by id.
fn query_enrollments<P: Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Vec<Enrollment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, student_id, course_id, grade FROM enrollments {filter} ORDER BY id"
    ))?;

    let enrollments = stmt
        .query_map(params, enrollment_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(enrollments)
}

pub fn fetch_enrollments(conn: &Connection) -> Result<Vec<Enrollment>> {
    query_enrollments(conn, "", params![])
}

pub fn fetch_enrollments_for_student(
    conn: &Connection,
    student_id: StudentId,
) -> Result<Vec<Enrollment>> {
    query_enrollments(conn, "WHERE student_id = ?1", params![student_id])
}

pub fn fetch_enrollments_for_course(
    conn: &Connection,
    course_id: CourseId,
) -> Result<Vec<Enrollment>> {
    query_enrollments(conn, "WHERE course_id = ?1", params![course_id])
}

pub fn fetch_enrollment(conn: &Connection, id: EnrollmentId) -> Result<Option<Enrollment>> {
    let enrollment = conn
        .query_row(
            "SELECT id, student_id, course_id, grade FROM enrollments WHERE id = ?1",
            params![id],
            enrollment_from_row,
        )
        .optional()?;
    Ok(enrollment)
}

/// Look up the enrollment linking a specific student and course, if any.
pub fn find_enrollment_by_pair(
    conn: &Connection,
    student_id: StudentId,
    course_id: CourseId,
) -> Result<Option<Enrollment>> {
    let enrollment = conn
        .query_row(
            "SELECT id, student_id, course_id, grade FROM enrollments
             WHERE student_id = ?1 AND course_id = ?2",
            params![student_id, course_id],
            enrollment_from_row,
        )
        .optional()?;
    Ok(enrollment)
}

/// Every enrollment joined with its student's name and course title. Inner
/// joins are safe because no enrollment outlives its parents.
pub fn fetch_enrollment_details(conn: &Connection) -> Result<Vec<EnrollmentDetail>> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.student_id, e.course_id, e.grade,
                s.first_name || ' ' || s.last_name, c.title
         FROM enrollments e
         INNER JOIN students s ON s.id = e.student_id
         INNER JOIN courses c ON c.id = e.course_id
         ORDER BY e.id",
    )?;

    let details = stmt
        .query_map([], |row| {
            Ok(EnrollmentDetail {
                enrollment: enrollment_from_row(row)?,
                student_name: row.get(4)?,
                course_title: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(details)
}

/// Insert an enrollment after checking the grade bound. Parent existence and
/// pair uniqueness are checked by the integrity layer before this runs.
pub fn insert_enrollment(
    conn: &Connection,
    student_id: StudentId,
    course_id: CourseId,
    grade: Option<i64>,
) -> Result<Enrollment> {
    validate_grade(grade)?;

    conn.execute(
        "INSERT INTO enrollments (student_id, course_id, grade) VALUES (?1, ?2, ?3)",
        params![student_id, course_id, grade],
    )?;

    Ok(Enrollment {
        id: EnrollmentId(conn.last_insert_rowid()),
        student_id,
        course_id,
        grade,
    })
}

/// Replace the grade of an existing enrollment. `None` clears it.
pub fn update_enrollment_grade(
    conn: &Connection,
    id: EnrollmentId,
    grade: Option<i64>,
) -> Result<Enrollment> {
    let current = fetch_enrollment(conn, id)?
        .ok_or_else(|| RegistryError::not_found(EntityKind::Enrollment, id))?;
    validate_grade(grade)?;

    conn.execute(
        "UPDATE enrollments SET grade = ?1 WHERE id = ?2",
        params![grade, id],
    )?;

    Ok(Enrollment { grade, ..current })
}

pub fn delete_enrollment(conn: &Connection, id: EnrollmentId) -> Result<()> {
    conn.execute("DELETE FROM enrollments WHERE id = ?1", params![id])?;
    Ok(())
}

/// Remove every enrollment of a student, returning the ids that went away.
pub fn delete_enrollments_for_student(
    conn: &Connection,
    student_id: StudentId,
) -> Result<Vec<EnrollmentId>> {
    let removed = fetch_enrollments_for_student(conn, student_id)?
        .into_iter()
        .map(|enrollment| enrollment.id)
        .collect();
    conn.execute(
        "DELETE FROM enrollments WHERE student_id = ?1",
        params![student_id],
    )?;
    Ok(removed)
}

/// Remove every enrollment in a course, returning the ids that went away.
pub fn delete_enrollments_for_course(
    conn: &Connection,
    course_id: CourseId,
) -> Result<Vec<EnrollmentId>> {
    let removed = fetch_enrollments_for_course(conn, course_id)?
        .into_iter()
        .map(|enrollment| enrollment.id)
        .collect();
    conn.execute(
        "DELETE FROM enrollments WHERE course_id = ?1",
        params![course_id],
    )?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::db::{insert_course, insert_student, Database};
    use crate::models::{NewCourse, NewStudent};

    fn seed(conn: &Connection) -> (StudentId, StudentId, CourseId) {
        let ada = insert_student(conn, &NewStudent::new("Ada", "Lovelace")).unwrap();
        let alan = insert_student(conn, &NewStudent::new("Alan", "Turing")).unwrap();
        let course = insert_course(conn, &NewCourse::new("Data Structures")).unwrap();
        (ada.id, alan.id, course.id)
    }

    #[test]
    fn per_parent_listings_are_ordered_and_filtered() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock();
        let (ada, alan, course) = seed(&conn);

        let first = insert_enrollment(&conn, ada, course, Some(90)).unwrap();
        let second = insert_enrollment(&conn, alan, course, None).unwrap();

        assert_eq!(
            fetch_enrollments_for_course(&conn, course).unwrap(),
            vec![first.clone(), second.clone()]
        );
        assert_eq!(
            fetch_enrollments_for_student(&conn, alan).unwrap(),
            vec![second]
        );
        assert_eq!(
            find_enrollment_by_pair(&conn, ada, course).unwrap(),
            Some(first)
        );
    }

    #[test]
    fn out_of_range_grade_is_rejected_before_insert() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock();
        let (ada, _, course) = seed(&conn);

        assert_matches!(
            insert_enrollment(&conn, ada, course, Some(101)),
            Err(RegistryError::Validation(_))
        );
        assert!(fetch_enrollments(&conn).unwrap().is_empty());
    }

    #[test]
    fn grade_update_touches_only_the_grade() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock();
        let (ada, _, course) = seed(&conn);
        let enrollment = insert_enrollment(&conn, ada, course, None).unwrap();

        let graded = update_enrollment_grade(&conn, enrollment.id, Some(100)).unwrap();
        assert_eq!(graded.grade, Some(100));
        assert_eq!(graded.student_id, ada);

        let cleared = update_enrollment_grade(&conn, enrollment.id, None).unwrap();
        assert_eq!(fetch_enrollment(&conn, enrollment.id).unwrap(), Some(cleared));
    }

    #[test]
    fn bulk_delete_reports_removed_ids() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock();
        let (ada, alan, course) = seed(&conn);
        let gone = insert_enrollment(&conn, ada, course, None).unwrap();
        let kept = insert_enrollment(&conn, alan, course, None).unwrap();

        let removed = delete_enrollments_for_student(&conn, ada).unwrap();
        assert_eq!(removed, vec![gone.id]);
        assert_eq!(fetch_enrollments(&conn).unwrap(), vec![kept]);
    }

    #[test]
    fn details_join_names_and_titles() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock();
        let (ada, _, course) = seed(&conn);
        insert_enrollment(&conn, ada, course, Some(88)).unwrap();

        let details = fetch_enrollment_details(&conn).unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].student_name, "Ada Lovelace");
        assert_eq!(details[0].course_title, "Data Structures");
        assert_eq!(details[0].enrollment.grade, Some(88));
    }
}
