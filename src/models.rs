use crate::enrichment::EnrichmentResult;
use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

// ============ Database Models ============

/// A stored person.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct PersonRecord {
    /// Surrogate identifier.
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    /// Guessed age, if the age provider had one.
    pub age: Option<i32>,
    pub gender: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub nationality: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every column of a person except identity and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
}

impl NewPerson {
    /// Combines the caller's names with the demographic guesses.
    pub fn enriched(request: PersonRequest, enrichment: EnrichmentResult) -> Self {
        Self {
            name: request.name.trim().to_string(),
            surname: request.surname.trim().to_string(),
            patronymic: request.patronymic.trim().to_string(),
            age: enrichment.age,
            gender: enrichment.gender,
            nationality: enrichment.nationality,
        }
    }
}

// ============ Request Bodies ============

/// Body of `POST /people` and `PUT /people/enrich/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PersonRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub patronymic: String,
}

impl PersonRequest {
    pub fn validate_for_create(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".to_string()));
        }
        Ok(())
    }
}

/// Body of `PATCH /people/{id}`. Only fields present and non-null are written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub patronymic: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
}

impl PersonPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.patronymic.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.nationality.is_none()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.is_empty() {
            return Err(AppError::BadRequest("no fields to update".to_string()));
        }
        if matches!(self.name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(AppError::BadRequest("name cannot be empty".to_string()));
        }
        if matches!(self.age, Some(age) if age < 0) {
            return Err(AppError::BadRequest("age cannot be negative".to_string()));
        }
        Ok(())
    }
}

// ============ Listing ============

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_ENTRIES_PER_PAGE: i64 = 10;

/// Raw query string of `GET /people`.
///
/// Everything is taken as text so that unparsable paging values can fall
/// back to their defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPeopleQuery {
    /// Substring of the first name.
    pub fname: Option<String>,
    /// Substring of the surname.
    pub surname: Option<String>,
    /// Substring of the patronymic.
    pub patronymic: Option<String>,
    /// Exact age, must be a positive integer.
    pub age: Option<String>,
    /// Substring of the nationality code.
    pub nationality: Option<String>,
    /// Substring of the gender.
    pub gender: Option<String>,
    /// Page number, defaults to 1.
    pub page: Option<String>,
    /// Entries per page, defaults to 10.
    pub entries: Option<String>,
}

/// Page window derived from page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub entries: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            entries: DEFAULT_ENTRIES_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Parses page and page size, defaulting missing, unparsable or
    /// non-positive values.
    pub fn parse(page: Option<&str>, entries: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            entries: parse_positive(entries).unwrap_or(DEFAULT_ENTRIES_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.entries)
    }

    /// `ceil(total / entries)`
    pub fn pages_total(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        total / self.entries + i64::from(total % self.entries != 0)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
}

/// Optional predicates for listing people; `None` means "do not filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub patronymic: Option<String>,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    pub pagination: Pagination,
}

impl ListingFilter {
    /// Validates a raw query. An `age` that is present but not a positive
    /// integer is rejected; blank text filters are ignored.
    pub fn from_query(query: &ListPeopleQuery) -> Result<Self, AppError> {
        let age = match non_blank(&query.age) {
            Some(raw) => match raw.parse::<i32>() {
                Ok(age) if age >= 1 => Some(age),
                _ => return Err(AppError::BadRequest("invalid age".to_string())),
            },
            None => None,
        };

        Ok(Self {
            name: non_blank(&query.fname),
            surname: non_blank(&query.surname),
            patronymic: non_blank(&query.patronymic),
            age,
            nationality: non_blank(&query.nationality),
            gender: non_blank(&query.gender),
            pagination: Pagination::parse(query.page.as_deref(), query.entries.as_deref()),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// One page of people plus totals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedPeople {
    pub page: i64,
    pub pages_total: i64,
    pub entries_total: i64,
    pub entries_per_page: i64,
    pub people: Vec<PersonRecord>,
}

impl PaginatedPeople {
    pub fn new(pagination: Pagination, people: Vec<PersonRecord>, total: i64) -> Self {
        Self {
            page: pagination.page,
            pages_total: pagination.pages_total(total),
            entries_total: total,
            entries_per_page: pagination.entries,
            people,
        }
    }
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(Pagination::parse(None, None), Pagination::default());
        assert_eq!(
            Pagination::parse(Some("0"), Some("-5")),
            Pagination { page: 1, entries: 10 }
        );
        assert_eq!(
            Pagination::parse(Some("abc"), Some("")),
            Pagination { page: 1, entries: 10 }
        );
        assert_eq!(
            Pagination::parse(Some("3"), Some("25")),
            Pagination { page: 3, entries: 25 }
        );
    }

    #[test]
    fn test_pagination_offset_and_pages() {
        let p = Pagination { page: 3, entries: 10 };
        assert_eq!(p.offset(), 20);
        assert_eq!(p.pages_total(0), 0);
        assert_eq!(p.pages_total(10), 1);
        assert_eq!(p.pages_total(11), 2);
        assert_eq!(Pagination::default().offset(), 0);
    }

    #[test]
    fn test_pages_total_with_huge_page_size() {
        let p = Pagination::parse(Some("1"), Some("9223372036854775807"));
        assert_eq!(p.entries, i64::MAX);
        assert_eq!(p.pages_total(5), 1);
        assert_eq!(p.pages_total(i64::MAX), 1);
        assert_eq!(p.offset(), 0);

        let p = Pagination { page: 1, entries: 2 };
        assert_eq!(p.pages_total(i64::MAX), i64::MAX / 2 + 1);
    }

    #[test]
    fn test_filter_rejects_bad_age() {
        for bad in ["abc", "0", "-1", "1.5"] {
            let query = ListPeopleQuery {
                age: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(ListingFilter::from_query(&query).is_err(), "age={}", bad);
        }
    }

    #[test]
    fn test_filter_ignores_blank_fields() {
        let query = ListPeopleQuery {
            fname: Some("  ".to_string()),
            surname: Some("Ivanov".to_string()),
            age: Some("".to_string()),
            ..Default::default()
        };
        let filter = ListingFilter::from_query(&query).unwrap();
        assert_eq!(filter.name, None);
        assert_eq!(filter.surname.as_deref(), Some("Ivanov"));
        assert_eq!(filter.age, None);
    }

    #[test]
    fn test_patch_validation() {
        assert!(PersonPatch::default().validate().is_err());
        let patch = PersonPatch {
            age: Some(-1),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        let patch = PersonPatch {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        let patch = PersonPatch {
            age: Some(40),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_enriched_new_person() {
        let request = PersonRequest {
            name: " Aleksei ".to_string(),
            surname: "Petrov".to_string(),
            patronymic: String::new(),
        };
        let enrichment = EnrichmentResult {
            age: Some(34),
            gender: Some("male".to_string()),
            nationality: Some("UA".to_string()),
            ..Default::default()
        };
        let person = NewPerson::enriched(request, enrichment);
        assert_eq!(person.name, "Aleksei");
        assert_eq!(person.age, Some(34));
        assert_eq!(person.nationality.as_deref(), Some("UA"));
    }
}
