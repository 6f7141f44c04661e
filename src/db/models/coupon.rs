//! Coupon model and the paginated active-coupon query.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A business coupon. Dates are RFC 3339 UTC strings.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Coupon {
    pub id: i64,
    pub business_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: bool,
    pub start_date: String,
    pub end_date: String,
    pub created_at: String,
}

/// Query parameters for the coupon listing endpoint
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CouponQuery {
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<i64>,
    /// Items per page (defaults to 12, max 100)
    pub limit: Option<i64>,
    /// Filter by coupon category
    pub category: Option<String>,
    /// Filter by owning business
    pub business_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponListResponse {
    pub coupons: Vec<Coupon>,
    pub pagination: Pagination,
}

/// List currently active coupons, soonest-expiring first.
///
/// A coupon is active when its flag is set and `now` falls inside the closed
/// interval `[start_date, end_date]`.
pub async fn list_active_coupons(
    db: &SqlitePool,
    query: &CouponQuery,
) -> Result<CouponListResponse, sqlx::Error> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(12).clamp(1, 100);
    let offset = (page - 1) * limit;
    let now = chrono::Utc::now().to_rfc3339();

    let mut conditions = vec![
        "is_active = 1".to_string(),
        "start_date <= ?".to_string(),
        "end_date >= ?".to_string(),
    ];
    let mut bindings = vec![now.clone(), now];

    if let Some(category) = &query.category {
        conditions.push("category = ?".to_string());
        bindings.push(category.clone());
    }

    if let Some(business_id) = query.business_id {
        conditions.push("business_id = ?".to_string());
        bindings.push(business_id.to_string());
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    let count_sql = format!("SELECT COUNT(*) FROM coupons {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for binding in &bindings {
        count_query = count_query.bind(binding);
    }
    let total = count_query.fetch_one(db).await?;

    // Ascending by expiry so the most urgent coupons surface first
    let sql = format!(
        "SELECT * FROM coupons {} ORDER BY end_date ASC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut list_query = sqlx::query_as::<_, Coupon>(&sql);
    for binding in &bindings {
        list_query = list_query.bind(binding);
    }
    let coupons = list_query.bind(limit).bind(offset).fetch_all(db).await?;

    Ok(CouponListResponse {
        coupons,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        },
    })
}

/// `ceil(total / limit)` without going through floats.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}
