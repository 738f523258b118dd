use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{EntityKind, RegistryError, Result};
use crate::models::{NewStudent, Student, StudentId, StudentPatch};
use crate::validation::validate_student;

const STUDENT_COLUMNS: &str = "id, first_name, last_name, email, date_of_birth";

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        date_of_birth: row.get(4)?,
    })
}

/// Retrieve every student ordered by id.
pub fn fetch_students(conn: &Connection) -> Result<Vec<Student>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students ORDER BY id"
    ))?;

    let students = stmt
        .query_map([], student_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(students)
}

pub fn fetch_student(conn: &Connection, id: StudentId) -> Result<Option<Student>> {
    let student = conn
        .query_row(
            &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
            params![id],
            student_from_row,
        )
        .optional()?;
    Ok(student)
}

/// Validate and insert a new student, returning the hydrated struct.
pub fn insert_student(conn: &Connection, student: &NewStudent) -> Result<Student> {
    validate_student(student)?;

    conn.execute(
        "INSERT INTO students (first_name, last_name, email, date_of_birth)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            student.first_name,
            student.last_name,
            student.email,
            student.date_of_birth
        ],
    )?;

    Ok(Student {
        id: StudentId(conn.last_insert_rowid()),
        first_name: student.first_name.clone(),
        last_name: student.last_name.clone(),
        email: student.email.clone(),
        date_of_birth: student.date_of_birth,
    })
}

/// Merge `patch` over the stored row and write it back. The merged record is
/// validated exactly like an insert.
pub fn update_student(conn: &Connection, id: StudentId, patch: StudentPatch) -> Result<Student> {
    let current = fetch_student(conn, id)?
        .ok_or_else(|| RegistryError::not_found(EntityKind::Student, id))?;
    let merged = patch.apply(&current);
    validate_student(&merged)?;

    conn.execute(
        "UPDATE students
         SET first_name = ?1, last_name = ?2, email = ?3, date_of_birth = ?4
         WHERE id = ?5",
        params![
            merged.first_name,
            merged.last_name,
            merged.email,
            merged.date_of_birth,
            id
        ],
    )?;

    Ok(Student {
        id,
        first_name: merged.first_name,
        last_name: merged.last_name,
        email: merged.email,
        date_of_birth: merged.date_of_birth,
    })
}

/// Remove a student row. Absent ids are a no-op; dependents are the caller's
/// responsibility.
pub fn delete_student(conn: &Connection, id: StudentId) -> Result<()> {
    conn.execute("DELETE FROM students WHERE id = ?1", params![id])?;
    Ok(())
}
