use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const SCHEMA: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id SERIAL PRIMARY KEY,
        student_number VARCHAR(50) NOT NULL UNIQUE,
        grade INTEGER NOT NULL,
        name VARCHAR(100) NOT NULL,
        first_choice_university VARCHAR(200),
        first_choice_department VARCHAR(200),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS exams (
        id SERIAL PRIMARY KEY,
        name VARCHAR(200) NOT NULL,
        year INTEGER NOT NULL,
        exam_date DATE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS scores (
        id SERIAL PRIMARY KEY,
        student_id INTEGER NOT NULL REFERENCES students(id),
        exam_id INTEGER NOT NULL REFERENCES exams(id),
        points INTEGER,
        deviation_value DOUBLE PRECISION,
        judgment VARCHAR(10),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS scores_student_id_idx ON scores (student_id)",
    "CREATE INDEX IF NOT EXISTS scores_exam_id_idx ON scores (exam_id)",
];

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Creates the students, exams and scores tables when they are missing.
pub async fn prepare_schema(pg: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pg).await?;
    }
    Ok(())
}
