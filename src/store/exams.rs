use sqlx::PgPool;

use crate::err::Error;
use crate::models::{Exam, NewExam};

pub async fn insert(pg: &PgPool, exam: NewExam) -> Result<Exam, Error> {
    let created = sqlx::query_as::<_, Exam>(
        "INSERT INTO exams (name, year, exam_date) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(exam.name)
    .bind(exam.year)
    .bind(exam.exam_date)
    .fetch_one(pg)
    .await?;

    Ok(created)
}

pub async fn all(pg: &PgPool) -> Result<Vec<Exam>, Error> {
    let exams = sqlx::query_as::<_, Exam>("SELECT * FROM exams ORDER BY id")
        .fetch_all(pg)
        .await?;
    Ok(exams)
}

pub async fn find(pg: &PgPool, id: i32) -> Result<Option<Exam>, Error> {
    let exam = sqlx::query_as::<_, Exam>("SELECT * FROM exams WHERE id = $1")
        .bind(id)
        .fetch_optional(pg)
        .await?;
    Ok(exam)
}

/// Deletes an exam and every score taken in it as one unit.
pub async fn delete(pg: &PgPool, id: i32) -> Result<u64, Error> {
    let mut tx = pg.begin().await?;

    sqlx::query("SELECT id FROM exams WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut tx)
        .await?
        .ok_or_else(|| Error::not_found(format!("Exam `{}` does not exist", id)))?;

    let scores = sqlx::query("DELETE FROM scores WHERE exam_id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM exams WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;
    log::info!("Deleted exam {} with {} scores", id, scores);
    Ok(scores)
}
