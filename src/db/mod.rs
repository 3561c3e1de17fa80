//! Database module for SQLite persistence using SeaORM

pub mod entities;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// Connect to `db_url` and create tables.
///
/// In-memory SQLite databases are per-connection, so those get a pool of
/// exactly one connection.
pub async fn init_database(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    tracing::info!("Connecting to database: {}", db_url);

    let mut opt = ConnectOptions::new(db_url.to_string());
    opt.connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);
    if db_url.contains(":memory:") {
        opt.min_connections(1).max_connections(1);
    }

    let db = Database::connect(opt).await?;

    create_tables(&db).await?;

    Ok(db)
}

/// Create all tables if they don't exist
async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();

    // Restrict/cascade rules below are only enforced with this on
    db.execute(Statement::from_string(
        backend,
        "PRAGMA foreign_keys = ON".to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        backend,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        backend,
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            price INTEGER NOT NULL CHECK (price >= 0),
            image TEXT,
            teacher_id INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (teacher_id) REFERENCES users(id) ON DELETE RESTRICT
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        backend,
        r#"CREATE INDEX IF NOT EXISTS idx_courses_teacher ON courses(teacher_id)"#.to_string(),
    ))
    .await?;

    // One membership per (course, user)
    db.execute(Statement::from_string(
        backend,
        r#"
        CREATE TABLE IF NOT EXISTS course_members (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            role TEXT NOT NULL DEFAULT 'std' CHECK (role IN ('std', 'ast')),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE RESTRICT,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE RESTRICT,
            UNIQUE(course_id, user_id)
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        backend,
        r#"CREATE INDEX IF NOT EXISTS idx_course_members_user ON course_members(user_id)"#
            .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        backend,
        r#"
        CREATE TABLE IF NOT EXISTS course_contents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_id INTEGER NOT NULL,
            parent_id INTEGER,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '-',
            video_url TEXT,
            file_attachment TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE RESTRICT,
            FOREIGN KEY (parent_id) REFERENCES course_contents(id) ON DELETE RESTRICT
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        backend,
        r#"CREATE INDEX IF NOT EXISTS idx_course_contents_course ON course_contents(course_id)"#
            .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        backend,
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content_id INTEGER NOT NULL,
            member_id INTEGER NOT NULL,
            comment TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (content_id) REFERENCES course_contents(id) ON DELETE CASCADE,
            FOREIGN KEY (member_id) REFERENCES course_members(id) ON DELETE CASCADE
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        backend,
        r#"CREATE INDEX IF NOT EXISTS idx_comments_content ON comments(content_id)"#.to_string(),
    ))
    .await?;
    db.execute(Statement::from_string(
        backend,
        r#"CREATE INDEX IF NOT EXISTS idx_comments_member ON comments(member_id)"#.to_string(),
    ))
    .await?;

    tracing::info!("Database tables initialized");
    Ok(())
}
