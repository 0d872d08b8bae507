use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, RawQuery};
use axum::{Extension, Json};
use sqlx::PgPool;

use crate::filter::StudentSearch;
use crate::models::{CreateStudent, Message, Student, StudentDetail, StudentPatch};
use crate::{created, proceeds, store, Created, Payload};

pub async fn list(Extension(pg): Extension<PgPool>) -> Payload<Vec<Student>> {
    proceeds(store::students::all(&pg).await?)
}

pub async fn create(
    Extension(pg): Extension<PgPool>,
    payload: Result<Json<CreateStudent>, JsonRejection>,
) -> Created<Student> {
    let Json(body) = payload?;
    let student = store::students::insert(&pg, body.validate()?).await?;
    log::info!(
        "Registered student {} as `{}`",
        student.id,
        student.student_number
    );
    created(student)
}

pub async fn read(
    Extension(pg): Extension<PgPool>,
    id: Result<Path<i32>, PathRejection>,
) -> Payload<StudentDetail> {
    let Path(id) = id?;
    proceeds(store::students::detail(&pg, id).await?)
}

pub async fn update(
    Extension(pg): Extension<PgPool>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<StudentPatch>, JsonRejection>,
) -> Payload<Message> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    store::students::update(&pg, id, patch).await?;
    proceeds(Message::new("Student updated successfully"))
}

pub async fn delete(
    Extension(pg): Extension<PgPool>,
    id: Result<Path<i32>, PathRejection>,
) -> Payload<Message> {
    let Path(id) = id?;
    store::students::delete(&pg, id).await?;
    proceeds(Message::new("Student deleted successfully"))
}

pub async fn search(
    Extension(pg): Extension<PgPool>,
    RawQuery(query): RawQuery,
) -> Payload<Vec<Student>> {
    let search = StudentSearch::from_query(query.as_deref());
    proceeds(store::students::search(&pg, &search).await?)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{json_request, send};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn missing_name_is_bad_request() {
        let (status, body) = send(json_request(
            "POST",
            "/api/students",
            r#"{"student_number": "S001", "grade": 3}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ValidationError");
        assert_eq!(body["message"], "`name` is required");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (status, body) = send(json_request("POST", "/api/students", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ValidationError");
    }

    #[tokio::test]
    async fn non_numeric_id_is_not_found() {
        let request = Request::get("/api/students/abc")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NotFound");
    }
}
