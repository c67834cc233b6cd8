//! Attraction HTTP handlers.
//!
//! This module implements the attraction endpoints:
//! - GET /api/attractions - Paged, sortable list (optionally per country)
//! - POST /api/attractions - Create attraction
//! - GET /api/attractions/{id} - Get attraction by ID
//! - PUT /api/attractions/{id} - Replace attraction
//! - DELETE /api/attractions/{id} - Delete attraction

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use sqlx::{QueryBuilder, Sqlite};

use crate::{
    db::DbPool,
    error::AppError,
    extract::{JsonBody, PathParam, QueryParams},
    models::{
        MessageResponse,
        attraction::{
            Attraction, AttractionCreated, AttractionInput, AttractionListQuery, AttractionPage,
            AttractionRequest, AttractionSummary, ListParams,
        },
    },
};

/// List attractions.
///
/// # Query Parameters
///
/// - `country_id` - only attractions in this country
/// - `page` - 1-based page number (default 1)
/// - `limit` - page size (default 25)
/// - `sortBy` - `name`, `lat`, `lng`, `wiki_term` or `country_name` (default `name`)
/// - `sortOrder` - `asc` or `desc`, case-insensitive (default `asc`)
///
/// # Response (200)
///
/// ```json
/// {
///   "attractions": [
///     { "id": 3, "name": "Angkor Wat", "lat": 13.41, "lng": 103.87, "wiki_term": "Angkor_Wat", "country_name": "Cambodia" }
///   ],
///   "total": 41,
///   "page": 1,
///   "limit": 25
/// }
/// ```
///
/// `total` counts every attraction matching the filter, not just the page.
pub async fn list_attractions(
    State(pool): State<DbPool>,
    QueryParams(query): QueryParams<AttractionListQuery>,
) -> Result<Json<AttractionPage>, AppError> {
    let params = ListParams::try_from(query)?;

    let mut select = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            attractions.id,
            attractions.name,
            attractions.lat,
            attractions.lng,
            attractions.wiki_term,
            countries.name AS country_name
        FROM attractions
        JOIN countries ON attractions.country_id = countries.id
        "#,
    );
    if let Some(country_id) = params.country_id {
        select
            .push(" WHERE attractions.country_id = ")
            .push_bind(country_id);
    }
    // Sort column and direction come from closed enums, never from raw input
    select
        .push(format!(
            " ORDER BY {} {}, attractions.id ASC",
            params.sort_column.as_sql(),
            params.sort_order.as_sql()
        ))
        .push(" LIMIT ")
        .push_bind(params.limit)
        .push(" OFFSET ")
        .push_bind(params.offset);

    let attractions = select
        .build_query_as::<AttractionSummary>()
        .fetch_all(&pool)
        .await?;

    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM attractions");
    if let Some(country_id) = params.country_id {
        count.push(" WHERE country_id = ").push_bind(country_id);
    }
    let total = count.build_query_scalar::<i64>().fetch_one(&pool).await?;

    Ok(Json(AttractionPage {
        attractions,
        total,
        page: params.page,
        limit: params.limit,
    }))
}

/// Create an attraction.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Petra",
///   "country_id": 4,
///   "is_unesco": true,
///   "is_national_park": false,
///   "lat": 30.3285,
///   "lng": 35.4444,
///   "last_visited": "2024-03-02",
///   "wiki_term": "Petra"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// { "message": "Attraction added successfully.", "id": 12 }
/// ```
pub async fn create_attraction(
    State(pool): State<DbPool>,
    JsonBody(request): JsonBody<AttractionRequest>,
) -> Result<(StatusCode, Json<AttractionCreated>), AppError> {
    let input = request.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO attractions
            (name, country_id, is_unesco, is_national_park, lat, lng, last_visited, wiki_term)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(input.country_id)
    .bind(input.is_unesco)
    .bind(input.is_national_park)
    .bind(input.lat)
    .bind(input.lng)
    .bind(&input.last_visited)
    .bind(&input.wiki_term)
    .execute(&pool)
    .await
    .map_err(unknown_country)?;

    Ok((
        StatusCode::CREATED,
        Json(AttractionCreated {
            message: "Attraction added successfully.".to_string(),
            id: result.last_insert_rowid(),
        }),
    ))
}

/// Get an attraction by ID.
pub async fn get_attraction(
    State(pool): State<DbPool>,
    PathParam(attraction_id): PathParam<i64>,
) -> Result<Json<Attraction>, AppError> {
    let attraction = sqlx::query_as::<_, Attraction>(
        r#"
        SELECT
            attractions.id,
            attractions.name,
            attractions.is_unesco,
            attractions.is_national_park,
            attractions.lat,
            attractions.lng,
            attractions.last_visited,
            attractions.wiki_term,
            countries.id AS country_id
        FROM attractions
        JOIN countries ON attractions.country_id = countries.id
        WHERE attractions.id = ?
        "#,
    )
    .bind(attraction_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::AttractionNotFound)?;

    Ok(Json(attraction))
}

/// Replace every field of an attraction.
///
/// Validation is the same as for creation.
pub async fn update_attraction(
    State(pool): State<DbPool>,
    PathParam(attraction_id): PathParam<i64>,
    JsonBody(request): JsonBody<AttractionRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let AttractionInput {
        name,
        country_id,
        is_unesco,
        is_national_park,
        lat,
        lng,
        last_visited,
        wiki_term,
    } = request.validate()?;

    let result = sqlx::query(
        r#"
        UPDATE attractions
        SET name = ?,
            country_id = ?,
            is_unesco = ?,
            is_national_park = ?,
            lat = ?,
            lng = ?,
            last_visited = ?,
            wiki_term = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(country_id)
    .bind(is_unesco)
    .bind(is_national_park)
    .bind(lat)
    .bind(lng)
    .bind(last_visited)
    .bind(wiki_term)
    .bind(attraction_id)
    .execute(&pool)
    .await
    .map_err(unknown_country)?;

    if result.rows_affected() == 0 {
        return Err(AppError::AttractionNotFound);
    }

    Ok(Json(MessageResponse::new("Attraction updated successfully.")))
}

/// Delete an attraction.
pub async fn delete_attraction(
    State(pool): State<DbPool>,
    PathParam(attraction_id): PathParam<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = sqlx::query("DELETE FROM attractions WHERE id = ?")
        .bind(attraction_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::AttractionNotFound);
    }

    Ok(Json(MessageResponse::new("Attraction deleted successfully.")))
}

/// A foreign key failure on write means `country_id` names no country.
fn unknown_country(error: sqlx::Error) -> AppError {
    let is_fk_violation = error
        .as_database_error()
        .is_some_and(|e| e.is_foreign_key_violation());

    if is_fk_violation {
        AppError::InvalidRequest("Unknown country_id.".to_string())
    } else {
        AppError::Database(error)
    }
}
