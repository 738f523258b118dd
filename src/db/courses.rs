use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{EntityKind, RegistryError, Result};
use crate::models::{Course, CourseId, CoursePatch, NewCourse};
use crate::validation::validate_course;

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        title: row.get(1)?,
        credits: row.get(2)?,
    })
}

pub fn fetch_courses(conn: &Connection) -> Result<Vec<Course>> {
    let mut stmt = conn.prepare("SELECT id, title, credits FROM courses ORDER BY id")?;

    let courses = stmt
        .query_map([], course_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(courses)
}

pub fn fetch_course(conn: &Connection, id: CourseId) -> Result<Option<Course>> {
    let course = conn
        .query_row(
            "SELECT id, title, credits FROM courses WHERE id = ?1",
            params![id],
            course_from_row,
        )
        .optional()?;
    Ok(course)
}

/// Validate and insert a new course, echoing the stored row back.
pub fn insert_course(conn: &Connection, course: &NewCourse) -> Result<Course> {
    validate_course(course)?;

    conn.execute(
        "INSERT INTO courses (title, credits) VALUES (?1, ?2)",
        params![course.title, course.credits],
    )?;

    Ok(Course {
        id: CourseId(conn.last_insert_rowid()),
        title: course.title.clone(),
        credits: course.credits,
    })
}

pub fn update_course(conn: &Connection, id: CourseId, patch: CoursePatch) -> Result<Course> {
    let current =
        fetch_course(conn, id)?.ok_or_else(|| RegistryError::not_found(EntityKind::Course, id))?;
    let merged = patch.apply(&current);
    validate_course(&merged)?;

    conn.execute(
        "UPDATE courses SET title = ?1, credits = ?2 WHERE id = ?3",
        params![merged.title, merged.credits, id],
    )?;

    Ok(Course {
        id,
        title: merged.title,
        credits: merged.credits,
    })
}

/// Remove a course row if present.
pub fn delete_course(conn: &Connection, id: CourseId) -> Result<()> {
    conn.execute("DELETE FROM courses WHERE id = ?1", params![id])?;
    Ok(())
}
