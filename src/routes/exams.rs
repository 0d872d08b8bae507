use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use sqlx::PgPool;

use crate::models::{CreateExam, Exam};
use crate::{created, proceeds, store, Created, Payload};

pub async fn list(Extension(pg): Extension<PgPool>) -> Payload<Vec<Exam>> {
    proceeds(store::exams::all(&pg).await?)
}

pub async fn create(
    Extension(pg): Extension<PgPool>,
    payload: Result<Json<CreateExam>, JsonRejection>,
) -> Created<Exam> {
    let Json(body) = payload?;
    let exam = store::exams::insert(&pg, body.validate()?).await?;
    log::info!("Created exam {} `{}` ({})", exam.id, exam.name, exam.year);
    created(exam)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{json_request, send};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn bad_exam_date_is_bad_request() {
        let (status, body) = send(json_request(
            "POST",
            "/api/exams",
            r#"{"name": "Mock1", "year": 2024, "exam_date": "2024/04/15"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ValidationError");
    }

    #[tokio::test]
    async fn missing_year_is_bad_request() {
        let (status, body) =
            send(json_request("POST", "/api/exams", r#"{"name": "Mock1"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "`year` is required");
    }
}
