use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::{RegistryError, Result};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".course-enrollment-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "enrollments.sqlite";

/// Shared handle to the SQLite store. The single connection sits behind a
/// mutex; whoever holds the guard has exclusive use of the database, which is
/// what makes each mutation (checks plus writes) one serializable unit.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (creating if needed) the database file at `path` and ensure the
    /// schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// Open the database in its default location under the user's home.
    pub fn open_default() -> Result<Self> {
        Self::open(default_db_path()?)
    }

    /// A private, throwaway database. Used by tests and by embedders that do
    /// not need persistence.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Take exclusive use of the connection until the guard drops.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Run `op` inside an `IMMEDIATE` transaction. An `Err` from `op` drops the
    /// transaction, which rolls back every write it made.
    pub(crate) fn write<T>(&self, op: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Run a read-only projection against one consistent view of the data.
    pub(crate) fn read<T>(&self, op: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock();
        op(&*conn)
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
pub fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| {
        RegistryError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "could not locate home directory",
        ))
    })?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

/// Run lazy migrations and switch on foreign key checks. The enrollment
/// table has no `ON DELETE CASCADE`: the enforcer removes dependents itself.
fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT,
            date_of_birth TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            credits INTEGER NOT NULL DEFAULT 3
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS enrollments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL,
            course_id INTEGER NOT NULL,
            grade INTEGER,
            UNIQUE (student_id, course_id),
            FOREIGN KEY(student_id) REFERENCES students(id),
            FOREIGN KEY(course_id) REFERENCES courses(id)
        )",
        [],
    )?;

    Ok(())
}
