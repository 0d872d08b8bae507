use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use sqlx::PgPool;

use crate::models::{ImportScores, ImportSummary};
use crate::{proceeds, store, Payload};

/// Best-effort bulk import: each record is inserted independently and the
/// ones that fail are listed in the summary instead of aborting the batch.
pub async fn scores(
    Extension(pg): Extension<PgPool>,
    payload: Result<Json<ImportScores>, JsonRejection>,
) -> Payload<ImportSummary> {
    let Json(body) = payload?;
    let total = body.scores.len();
    let summary = store::scores::import(&pg, body.scores).await;
    log::info!("Imported {} of {} score records", summary.imported, total);
    proceeds(summary)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{json_request, send};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn empty_batch_imports_nothing() {
        let (status, body) = send(json_request("POST", "/api/import/scores", "{}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "0 scores imported successfully");
    }

    #[tokio::test]
    async fn records_missing_keys_are_reported_not_fatal() {
        let (status, body) = send(json_request(
            "POST",
            "/api/import/scores",
            r#"{"scores": [{"points": 10}, {"student_id": 1}]}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["imported"], 0);
        assert_eq!(body["failures"][0]["index"], 0);
        assert_eq!(body["failures"][1]["message"], "`exam_id` is required");
    }
}
