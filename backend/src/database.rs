use crate::models::{Course, NewCourse, NewHoleData, NewTeeInfo, NewUser, User};
#[cfg(test)]
use crate::models::{HoleData, TeeInfo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

/// Outcome of inserting a user: either the new id or a uniqueness clash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInsert {
    Created(i64),
    Duplicate,
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `sqlite::memory:` opens its own empty database,
        // so an in-memory store must live on exactly one connection.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };

        let database = Database { pool };
        database.create_schema().await?;
        info!("Connected to database at {}", database_url);
        Ok(database)
    }

    /// The underlying pool, shared with the session store.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // Create tables if they don't exist (SQLite syntax)
    async fn create_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Course (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                address TEXT,
                phone TEXT,
                holes INTEGER NOT NULL,
                par_course INTEGER NOT NULL,
                par_front_nine INTEGER,
                par_back_nine INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Tee_Info (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id INTEGER NOT NULL,
                tee_color TEXT NOT NULL,
                out_yardage INTEGER,
                in_yardage INTEGER,
                total_yardage INTEGER,
                FOREIGN KEY (course_id) REFERENCES Course(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Hole_Data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id INTEGER NOT NULL,
                hole_number INTEGER NOT NULL,
                par INTEGER NOT NULL,
                handicap INTEGER NOT NULL,
                tee_color TEXT NOT NULL,
                yardage INTEGER NOT NULL,
                FOREIGN KEY (course_id) REFERENCES Course(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Users

    pub async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash FROM Users WHERE username = ? OR email = ?",
        )
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| user_from_row(&row)))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row =
            sqlx::query("SELECT id, username, email, password_hash FROM Users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|row| user_from_row(&row)))
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query("SELECT id, username, email, password_hash FROM Users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| user_from_row(&row)))
    }

    /// Inserts a user whose password has already been hashed.
    pub async fn create_user(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<UserInsert, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO Users (username, email, password_hash) VALUES (?, ?, ?)")
                .bind(&user.username)
                .bind(&user.email)
                .bind(password_hash)
                .execute(&self.pool)
                .await;

        match result {
            Ok(done) => Ok(UserInsert::Created(done.last_insert_rowid())),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(UserInsert::Duplicate),
            Err(e) => Err(e),
        }
    }

    #[cfg(test)]
    pub async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM Users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Courses

    pub async fn list_courses(&self) -> Result<Vec<Course>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, name, address, phone, holes, par_course, par_front_nine, par_back_nine \
             FROM Course ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(course_from_row).collect())
    }

    pub async fn course_exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT id FROM Course WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn create_course(&self, course: &NewCourse) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO Course (name, address, phone, holes, par_course, par_front_nine, par_back_nine)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&course.name)
        .bind(&course.address)
        .bind(&course.phone)
        .bind(course.holes)
        .bind(course.par_course)
        .bind(course.par_front_nine)
        .bind(course.par_back_nine)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Overwrites every mutable column. Returns false when no row has `id`.
    pub async fn update_course(&self, id: i64, course: &NewCourse) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE Course
            SET name = ?, address = ?, phone = ?, holes = ?, par_course = ?, par_front_nine = ?, par_back_nine = ?
            WHERE id = ?
            "#,
        )
        .bind(&course.name)
        .bind(&course.address)
        .bind(&course.phone)
        .bind(course.holes)
        .bind(course.par_course)
        .bind(course.par_front_nine)
        .bind(course.par_back_nine)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes the course with `id` together with its tees and holes.
    /// Returns false (and changes nothing) when no row has `id`.
    pub async fn delete_course(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Children go first so the foreign keys never dangle
        let tees = sqlx::query("DELETE FROM Tee_Info WHERE course_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let holes = sqlx::query("DELETE FROM Hole_Data WHERE course_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM Course WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        debug!(
            "Deleted course {} with {} tee rows and {} hole rows",
            id, tees, holes
        );
        Ok(true)
    }

    // Tees and holes

    pub async fn create_tee_info(&self, tee: &NewTeeInfo) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO Tee_Info (course_id, tee_color, out_yardage, in_yardage, total_yardage)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(tee.course_id)
        .bind(&tee.tee_color)
        .bind(tee.out_yardage)
        .bind(tee.in_yardage)
        .bind(tee.total_yardage)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn create_hole_data(&self, hole: &NewHoleData) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO Hole_Data (course_id, hole_number, par, handicap, tee_color, yardage)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(hole.course_id)
        .bind(hole.hole_number)
        .bind(hole.par)
        .bind(hole.handicap)
        .bind(&hole.tee_color)
        .bind(hole.yardage)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    #[cfg(test)]
    pub async fn list_tee_info(&self, course_id: i64) -> Result<Vec<TeeInfo>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, course_id, tee_color, out_yardage, in_yardage, total_yardage \
             FROM Tee_Info WHERE course_id = ? ORDER BY id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| TeeInfo {
                id: row.get("id"),
                course_id: row.get("course_id"),
                tee_color: row.get("tee_color"),
                out_yardage: row.get("out_yardage"),
                in_yardage: row.get("in_yardage"),
                total_yardage: row.get("total_yardage"),
            })
            .collect())
    }

    #[cfg(test)]
    pub async fn list_hole_data(&self, course_id: i64) -> Result<Vec<HoleData>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, course_id, hole_number, par, handicap, tee_color, yardage \
             FROM Hole_Data WHERE course_id = ? ORDER BY id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| HoleData {
                id: row.get("id"),
                course_id: row.get("course_id"),
                hole_number: row.get("hole_number"),
                par: row.get("par"),
                handicap: row.get("handicap"),
                tee_color: row.get("tee_color"),
                yardage: row.get("yardage"),
            })
            .collect())
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
    }
}

fn course_from_row(row: &SqliteRow) -> Course {
    Course {
        id: row.get("id"),
        name: row.get("name"),
        address: row.get("address"),
        phone: row.get("phone"),
        holes: row.get("holes"),
        par_course: row.get("par_course"),
        par_front_nine: row.get("par_front_nine"),
        par_back_nine: row.get("par_back_nine"),
    }
}
