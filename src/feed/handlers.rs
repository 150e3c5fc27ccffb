use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pool::{RankedItem, Tier};
use crate::auth::Viewer;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub tier: Tier,
}

impl From<RankedItem> for FeedItem {
    fn from(item: RankedItem) -> Self {
        Self {
            id: item.content.id,
            author_id: item.content.author_id,
            created_at: item.content.created_at,
            tier: item.tier,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub items: Vec<FeedItem>,
    pub has_more: bool,
    pub limit: i64,
    pub offset: i64,
}

pub async fn get_feed(
    viewer: Viewer,
    query: web::Query<FeedQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(state.config.feed.default_limit);
    let offset = query.offset.unwrap_or(0);

    let page = state.feed.get_feed(viewer.id(), limit, offset).await?;

    Ok(HttpResponse::Ok().json(FeedResponse {
        items: page.items.into_iter().map(FeedItem::from).collect(),
        has_more: page.has_more,
        limit: page.limit,
        offset: page.offset,
    }))
}
