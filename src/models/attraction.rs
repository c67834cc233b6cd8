//! Attraction data models and API request/response types.
//!
//! This module defines:
//! - `Attraction`: full attraction record
//! - `AttractionSummary`: list row joined with its country name
//! - `AttractionRequest`: body for create and update, validated into `AttractionInput`
//! - `AttractionListQuery`: paging and sorting parameters for the list endpoint

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

use crate::error::AppError;

/// Default page size for `GET /api/attractions`.
pub const DEFAULT_LIMIT: i64 = 25;

/// An attraction as returned by `GET /api/attractions/{id}`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Attraction {
    pub id: i64,
    pub name: String,
    pub is_unesco: bool,
    pub is_national_park: bool,
    pub lat: f64,
    pub lng: f64,

    /// Free-form date string as supplied by the client
    pub last_visited: Option<String>,

    /// Search term used to look the attraction up on Wikipedia
    pub wiki_term: Option<String>,
    pub country_id: i64,
}

/// One row of the attraction list.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AttractionSummary {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub wiki_term: Option<String>,
    pub country_name: String,
}

/// Response body for `GET /api/attractions`.
///
/// ```json
/// {
///   "attractions": [
///     { "id": 1, "name": "Petra", "lat": 30.32, "lng": 35.44, "wiki_term": "Petra", "country_name": "Jordan" }
///   ],
///   "total": 1,
///   "page": 1,
///   "limit": 25
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AttractionPage {
    pub attractions: Vec<AttractionSummary>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Response body for `POST /api/attractions`.
#[derive(Debug, Serialize)]
pub struct AttractionCreated {
    pub message: String,
    pub id: i64,
}

/// Number that may arrive as a JSON number or as a numeric string
/// (HTML form values are strings).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Finite value only: "NaN", "inf" and overflowing literals are rejected.
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => s.trim().parse().ok()?,
        };

        value.is_finite().then_some(value)
    }

    /// Whole numbers only, whether written as `4`, `4.0` or `"4.0"`.
    fn as_i64(&self) -> Option<i64> {
        let value = self.as_f64()?;

        (value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64)
            .then_some(value as i64)
    }

    fn is_blank(&self) -> bool {
        matches!(self, Numeric::Text(s) if s.trim().is_empty())
    }
}

/// Request body for creating or replacing an attraction.
///
/// ```json
/// {
///   "name": "Petra",
///   "country_id": 4,
///   "is_unesco": true,
///   "is_national_park": false,
///   "lat": "30.3285",
///   "lng": 35.4444,
///   "last_visited": "2024-03-02",
///   "wiki_term": "Petra"
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct AttractionRequest {
    pub name: Option<String>,
    pub country_id: Option<Numeric>,
    #[serde(default, deserialize_with = "truthy")]
    pub is_unesco: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub is_national_park: bool,
    pub lat: Option<Numeric>,
    pub lng: Option<Numeric>,
    pub last_visited: Option<String>,
    pub wiki_term: Option<String>,
}

/// Validated attraction fields ready to bind into SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct AttractionInput {
    pub name: String,
    pub country_id: i64,
    pub is_unesco: bool,
    pub is_national_park: bool,
    pub lat: f64,
    pub lng: f64,
    pub last_visited: Option<String>,
    pub wiki_term: Option<String>,
}

impl AttractionRequest {
    /// Check required fields and coerce numeric ones.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` when name, country_id, lat or lng is missing or blank
    /// - `InvalidRequest` when country_id, lat or lng is not a number
    pub fn validate(self) -> Result<AttractionInput, AppError> {
        let name = self.name.filter(|n| !n.trim().is_empty());
        let country_id = self.country_id.filter(|v| !v.is_blank());
        let lat = self.lat.filter(|v| !v.is_blank());
        let lng = self.lng.filter(|v| !v.is_blank());

        let (Some(name), Some(country_id), Some(lat), Some(lng)) = (name, country_id, lat, lng)
        else {
            return Err(AppError::InvalidRequest(
                "Name, country_id, latitude, and longitude are required.".to_string(),
            ));
        };

        let country_id = country_id.as_i64().ok_or_else(|| {
            AppError::InvalidRequest("country_id must be an integer.".to_string())
        })?;

        let (Some(lat), Some(lng)) = (lat.as_f64(), lng.as_f64()) else {
            return Err(AppError::InvalidRequest(
                "Latitude and longitude must be numbers.".to_string(),
            ));
        };

        Ok(AttractionInput {
            name,
            country_id,
            is_unesco: self.is_unesco,
            is_national_park: self.is_national_park,
            lat,
            lng,
            last_visited: self.last_visited.filter(|d| !d.is_empty()),
            wiki_term: self.wiki_term,
        })
    }
}

/// Accepts booleans, 0/1 and strings for the attraction flags.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !matches!(s.as_str(), "" | "0" | "false"),
        Some(_) => true,
    })
}

/// Reads an optional integer query value; an empty value means "not given".
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid integer `{s}`"))),
        _ => Ok(None),
    }
}

/// Query string for `GET /api/attractions`.
#[derive(Debug, Default, Deserialize)]
pub struct AttractionListQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub country_id: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

/// Columns the list endpoint may sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Lat,
    Lng,
    WikiTerm,
    CountryName,
}

impl SortColumn {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" | "attractions.name" => Some(Self::Name),
            "lat" => Some(Self::Lat),
            "lng" => Some(Self::Lng),
            "wiki_term" => Some(Self::WikiTerm),
            "country_name" => Some(Self::CountryName),
            _ => None,
        }
    }

    /// SQL expression to interpolate into `ORDER BY`.
    ///
    /// Only these fixed strings ever reach the query text.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Name => "attractions.name",
            Self::Lat => "attractions.lat",
            Self::Lng => "attractions.lng",
            Self::WikiTerm => "attractions.wiki_term",
            Self::CountryName => "country_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Validated list parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub country_id: Option<i64>,
    pub page: i64,
    pub limit: i64,
    pub sort_column: SortColumn,
    pub sort_order: SortOrder,

    /// Rows skipped before the page starts, `(page - 1) * limit`
    pub offset: i64,
}

impl TryFrom<AttractionListQuery> for ListParams {
    type Error = AppError;

    fn try_from(query: AttractionListQuery) -> Result<Self, Self::Error> {
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

        let offset = (page >= 1 && limit >= 1)
            .then(|| (page - 1).checked_mul(limit))
            .flatten()
            .ok_or_else(|| {
                AppError::InvalidRequest("Page and limit must be positive integers.".to_string())
            })?;

        let sort_column = SortColumn::parse(query.sort_by.as_deref().unwrap_or("name"))
            .ok_or_else(|| AppError::InvalidRequest("Invalid sort column.".to_string()))?;

        let sort_order = SortOrder::parse(query.sort_order.as_deref().unwrap_or("asc"))
            .ok_or_else(|| AppError::InvalidRequest("Invalid sort order.".to_string()))?;

        Ok(Self {
            country_id: query.country_id,
            page,
            limit,
            sort_column,
            sort_order,
            offset,
        })
    }
}
