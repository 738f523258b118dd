//! Binary entry point: bring up logging, open the on-disk store (creating
//! the schema on first run), and log a summary of what it currently holds.
use std::sync::Arc;

use anyhow::Context;
use course_enrollment_manager::{default_db_path, Database, Queries};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = default_db_path().context("failed to resolve database location")?;
    let db = Database::open(&path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    let queries = Queries::new(Arc::new(db));

    let students = queries.list_students().context("failed to load students")?;
    let courses = queries.list_courses().context("failed to load courses")?;
    let enrollments = queries
        .list_enrollments()
        .context("failed to load enrollments")?;

    info!(
        path = %path.display(),
        students = students.len(),
        courses = courses.len(),
        enrollments = enrollments.len(),
        "store ready"
    );
    Ok(())
}
