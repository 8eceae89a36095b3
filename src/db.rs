use sqlx::{
    AnyConnection, AnyPool,
    any::{AnyPoolOptions, AnyQueryResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MySql,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self, sqlx::Error> {
        if url.starts_with("mysql:") || url.starts_with("mariadb:") {
            Ok(Backend::MySql)
        } else if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            Err(sqlx::Error::Configuration(
                format!("DATABASE_URL tidak didukung: {url}").into(),
            ))
        }
    }

    /// Backend behind an open `Any` connection.
    pub fn of(conn: &AnyConnection) -> Self {
        if conn.backend_name().eq_ignore_ascii_case("mysql") {
            Backend::MySql
        } else {
            Backend::Sqlite
        }
    }

    fn last_insert_id_sql(&self) -> &'static str {
        match self {
            Backend::MySql => "SELECT CAST(LAST_INSERT_ID() AS SIGNED)",
            Backend::Sqlite => "SELECT last_insert_rowid()",
        }
    }

    fn id_column(&self) -> &'static str {
        match self {
            Backend::MySql => "id BIGINT AUTO_INCREMENT PRIMARY KEY",
            Backend::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }

    fn key_type(&self) -> &'static str {
        match self {
            Backend::MySql => "VARCHAR(191)",
            Backend::Sqlite => "TEXT",
        }
    }

    fn int_type(&self) -> &'static str {
        match self {
            Backend::MySql => "BIGINT",
            Backend::Sqlite => "INTEGER",
        }
    }
}

pub async fn establish_connection(database_url: &str, max_connections: u32) -> Result<AnyPool, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let backend = Backend::from_url(database_url)?;
    let pool = AnyPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| {
            log::error!("Gagal membuat pool database: {:?}", e);
            e
        })?;

    ensure_schema(&pool, backend).await?;
    Ok(pool)
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS faculties (
        {id},
        name TEXT NOT NULL,
        name_en TEXT NULL,
        slug {key} NOT NULL UNIQUE,
        icon TEXT NULL,
        description TEXT NULL,
        description_en TEXT NULL,
        advantages TEXT NULL,
        advantages_en TEXT NULL,
        career_prospects TEXT NULL,
        career_prospects_en TEXT NULL,
        sort_order {int} NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS faculty_programs (
        {id},
        faculty_id {int} NOT NULL,
        name TEXT NOT NULL,
        name_en TEXT NULL,
        degree TEXT NULL,
        accreditation TEXT NULL,
        description TEXT NULL,
        description_en TEXT NULL,
        sort_order {int} NOT NULL DEFAULT 0,
        FOREIGN KEY (faculty_id) REFERENCES faculties(id)
    )",
    "CREATE TABLE IF NOT EXISTS leaders (
        {id},
        slug {key} NOT NULL UNIQUE,
        name TEXT NOT NULL,
        title TEXT NULL,
        title_en TEXT NULL,
        category TEXT NOT NULL,
        education TEXT NULL,
        career TEXT NULL,
        research TEXT NULL,
        bio TEXT NULL,
        bio_en TEXT NULL,
        image TEXT NULL,
        sort_order {int} NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS academic_calendar (
        {id},
        academic_year TEXT NOT NULL,
        semester TEXT NULL,
        activity TEXT NOT NULL,
        activity_en TEXT NULL,
        start_date TEXT NULL,
        end_date TEXT NULL,
        document_url TEXT NULL,
        sort_order {int} NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS academic_policies (
        {id},
        title TEXT NOT NULL,
        title_en TEXT NULL,
        description TEXT NULL,
        description_en TEXT NULL,
        document_url TEXT NULL,
        sort_order {int} NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS lpm_legal_basis (
        {id},
        title TEXT NOT NULL,
        title_en TEXT NULL,
        description TEXT NULL,
        description_en TEXT NULL,
        document_url TEXT NULL,
        sort_order {int} NOT NULL DEFAULT 0
    )",
];

/// Id of the row `result` inserted. Must run on the connection that did the insert:
/// the `Any` driver leaves `last_insert_id` empty for SQLite.
pub async fn inserted_id(conn: &mut AnyConnection, result: &AnyQueryResult) -> Result<i64, sqlx::Error> {
    if let Some(id) = result.last_insert_id() {
        return Ok(id);
    }
    let sql = Backend::of(conn).last_insert_id_sql();
    sqlx::query_scalar(sql).fetch_one(conn).await
}

/// Creates missing tables. Existing tables are left untouched.
pub async fn ensure_schema(pool: &AnyPool, backend: Backend) -> Result<(), sqlx::Error> {
    for ddl in SCHEMA {
        let sql = ddl
            .replace("{id}", backend.id_column())
            .replace("{key}", backend.key_type())
            .replace("{int}", backend.int_type());
        sqlx::query(&sql).execute(pool).await?;
    }
    Ok(())
}
