use axum::extract::rejection::JsonRejection;
use axum::extract::RawQuery;
use axum::{Extension, Json};
use sqlx::PgPool;

use crate::filter::ScoreFilter;
use crate::models::{CreateScore, Score, ScoreListing};
use crate::{created, proceeds, store, Created, Payload};

pub async fn list(
    Extension(pg): Extension<PgPool>,
    RawQuery(query): RawQuery,
) -> Payload<Vec<ScoreListing>> {
    let filter = ScoreFilter::from_query(query.as_deref());
    proceeds(store::scores::list(&pg, &filter).await?)
}

pub async fn create(
    Extension(pg): Extension<PgPool>,
    payload: Result<Json<CreateScore>, JsonRejection>,
) -> Created<Score> {
    let Json(body) = payload?;
    created(store::scores::insert(&pg, body.validate()?).await?)
}
