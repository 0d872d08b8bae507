use sqlx::PgPool;

use crate::err::Error;
use crate::filter::ScoreFilter;
use crate::models::{CreateScore, ImportFailure, ImportSummary, NewScore, Score, ScoreListing};

/// Foreign keys are checked by the database at insert time.
pub async fn insert(pg: &PgPool, score: NewScore) -> Result<Score, Error> {
    let (student_id, exam_id) = (score.student_id, score.exam_id);
    let created = sqlx::query_as::<_, Score>(
        r#"
        INSERT INTO scores (student_id, exam_id, points, deviation_value, judgment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(score.student_id)
    .bind(score.exam_id)
    .bind(score.points)
    .bind(score.deviation_value)
    .bind(score.judgment)
    .fetch_one(pg)
    .await
    .map_err(|err| match Error::from(err) {
        Error::ConstraintViolation { .. } => Error::ConstraintViolation {
            message: format!(
                "Student `{}` or exam `{}` does not exist",
                student_id, exam_id
            ),
        },
        other => other,
    })?;

    Ok(created)
}

pub async fn find(pg: &PgPool, id: i32) -> Result<Option<Score>, Error> {
    let score = sqlx::query_as::<_, Score>("SELECT * FROM scores WHERE id = $1")
        .bind(id)
        .fetch_optional(pg)
        .await?;
    Ok(score)
}

pub async fn list(pg: &PgPool, filter: &ScoreFilter) -> Result<Vec<ScoreListing>, Error> {
    let scores = filter
        .query()
        .build_query_as::<ScoreListing>()
        .fetch_all(pg)
        .await?;
    Ok(scores)
}

/// Inserts each record on its own. A record that fails validation or a
/// constraint is skipped and reported, the rest are kept.
pub async fn import(pg: &PgPool, records: Vec<CreateScore>) -> ImportSummary {
    let mut imported = 0;
    let mut failures = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        let outcome = match record.validate() {
            Ok(score) => insert(pg, score).await.map(|_| ()),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(()) => imported += 1,
            Err(err) => {
                log::warn!("Skipping score record {}: {}", index, err.message());
                failures.push(ImportFailure {
                    index,
                    message: err.message().to_string(),
                });
            }
        }
    }

    ImportSummary::new(imported, failures)
}
