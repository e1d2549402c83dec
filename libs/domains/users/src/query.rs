//! Translation of list-request parameters into a store query.
//!
//! Raw strings → [`ListOptions`] → [`UserQuery`] (filter, sort, projection,
//! skip, limit). Everything here is pure; only an unknown sort field fails.

use mongodb::bson::{Document, doc};
use serde::Deserialize;
use strum::{AsRefStr, Display, EnumString, VariantNames};
use utoipa::IntoParams;

use crate::error::{UserError, UserResult};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Sortable fields; the string forms are matched case-sensitively
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr, VariantNames,
)]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    Email,
    #[default]
    CreatedAt,
    UpdatedAt,
    FirstName,
    LastName,
}

impl SortField {
    /// Document path the field is stored under.
    pub fn storage_path(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::FirstName => "profile.first_name",
            Self::LastName => "profile.last_name",
        }
    }

    fn invalid() -> UserError {
        UserError::Validation(format!(
            "Invalid sort field. Valid options: {}",
            Self::VARIANTS.join(", ")
        ))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn direction(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// Query string of `GET /users`, kept as raw strings so bad numbers fall back to defaults
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersParams {
    /// Page number, 1-based (default 1)
    #[param(example = "1")]
    pub page: Option<String>,
    /// Users per page, 1 to 100 (default 10)
    #[param(example = "10")]
    pub page_size: Option<String>,
    /// Case-insensitive match on email, first name or last name
    #[param(example = "john")]
    pub search: Option<String>,
    /// One of email, created_at, updated_at, first_name, last_name
    #[param(example = "created_at")]
    pub sort: Option<String>,
    /// asc or desc (default asc)
    #[param(example = "desc")]
    pub order: Option<String>,
    /// Comma-separated fields to include, e.g. `email,profile.first_name`
    #[param(example = "email,profile.first_name,created_at")]
    pub fields: Option<String>,
}

/// Validated listing options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub page: u64,
    pub page_size: u64,
    pub fields: Vec<String>,
    pub search: String,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            fields: Vec::new(),
            search: String::new(),
            sort_by: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl ListOptions {
    pub fn parse(params: &ListUsersParams) -> UserResult<Self> {
        let page = params
            .page
            .as_deref()
            .and_then(|p| p.parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);

        let page_size = params
            .page_size
            .as_deref()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| (1..=MAX_PAGE_SIZE).contains(s))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let fields = params
            .fields
            .as_deref()
            .map(|f| {
                f.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let search = params.search.as_deref().unwrap_or("").trim().to_string();

        let sort_by = match params.sort.as_deref().map(str::trim) {
            None | Some("") => SortField::default(),
            Some(raw) => raw.parse().map_err(|_| SortField::invalid())?,
        };

        let order = params
            .order
            .as_deref()
            .and_then(|o| o.trim().to_lowercase().parse().ok())
            .unwrap_or_default();

        Ok(Self {
            page,
            page_size,
            fields,
            search,
            sort_by,
            order,
        })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

/// Empty search matches everything; otherwise an `$or` of case-insensitive
/// regex matches over email and both names.
///
/// The term is used as the pattern as-is, metacharacters included.
pub fn build_search_filter(search: &str) -> Document {
    if search.is_empty() {
        return Document::new();
    }

    doc! {
        "$or": [
            { "email": { "$regex": search, "$options": "i" } },
            { "profile.first_name": { "$regex": search, "$options": "i" } },
            { "profile.last_name": { "$regex": search, "$options": "i" } },
        ]
    }
}

pub fn build_sort(field: SortField, order: SortOrder) -> Document {
    let mut sort = Document::new();
    sort.insert(field.storage_path(), order.direction());
    sort
}

/// Inclusion projection for the requested fields, `None` for "all fields".
///
/// `id` is accepted as an alias of `_id`, which is always included.
pub fn build_projection(fields: &[String]) -> Option<Document> {
    if fields.is_empty() {
        return None;
    }

    let mut projection = Document::new();
    for field in fields {
        let key = if field == "id" { "_id" } else { field.as_str() };
        projection.insert(key, 1);
    }
    if !projection.contains_key("_id") {
        projection.insert("_id", 1);
    }

    Some(projection)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }

    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.page_size).unwrap_or(i64::MAX)
    }

    /// `ceil(total / page_size)`, zero for an empty result.
    pub fn total_pages(&self, total_count: u64) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        total_count.div_ceil(self.page_size)
    }
}

/// Everything the store needs to run one listing read
#[derive(Debug, Clone, PartialEq)]
pub struct UserQuery {
    pub filter: Document,
    pub sort: Document,
    pub projection: Option<Document>,
    pub skip: u64,
    pub limit: i64,
}

impl UserQuery {
    pub fn from_options(options: &ListOptions) -> Self {
        let pagination = options.pagination();

        Self {
            filter: build_search_filter(&options.search),
            sort: build_sort(options.sort_by, options.order),
            projection: build_projection(&options.fields),
            skip: pagination.skip(),
            limit: pagination.limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ListUsersParams {
        ListUsersParams::default()
    }

    #[test]
    fn test_parse_defaults() {
        let options = ListOptions::parse(&params()).unwrap();
        assert_eq!(options, ListOptions::default());
        assert_eq!(options.sort_by, SortField::CreatedAt);
        assert_eq!(options.order, SortOrder::Asc);
    }

    #[test]
    fn test_parse_bad_numbers_fall_back() {
        for (page, size) in [("0", "0"), ("-2", "101"), ("abc", "ten"), ("", " "), (" 5", "20 ")] {
            let options = ListOptions::parse(&ListUsersParams {
                page: Some(page.into()),
                page_size: Some(size.into()),
                ..params()
            })
            .unwrap();
            assert_eq!(options.page, DEFAULT_PAGE, "page {page:?}");
            assert_eq!(options.page_size, DEFAULT_PAGE_SIZE, "page_size {size:?}");
        }
    }

    #[test]
    fn test_parse_accepts_bounds() {
        let options = ListOptions::parse(&ListUsersParams {
            page: Some("3".into()),
            page_size: Some("100".into()),
            ..params()
        })
        .unwrap();
        assert_eq!(options.page, 3);
        assert_eq!(options.page_size, 100);
    }

    #[test]
    fn test_parse_fields_and_search_are_trimmed() {
        let options = ListOptions::parse(&ListUsersParams {
            fields: Some(" email , profile.first_name,,".into()),
            search: Some("  jo ".into()),
            ..params()
        })
        .unwrap();
        assert_eq!(options.fields, vec!["email", "profile.first_name"]);
        assert_eq!(options.search, "jo");
    }

    #[test]
    fn test_parse_invalid_sort_names_valid_options() {
        let err = ListOptions::parse(&ListUsersParams {
            sort: Some("password_hash".into()),
            ..params()
        })
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid sort field. Valid options: email, created_at, updated_at, first_name, last_name"
        );
    }

    #[test]
    fn test_parse_sort_is_case_sensitive() {
        let result = ListOptions::parse(&ListUsersParams {
            sort: Some("Email".into()),
            ..params()
        });
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[test]
    fn test_parse_blank_sort_defaults_to_created_at() {
        let options = ListOptions::parse(&ListUsersParams {
            sort: Some("   ".into()),
            ..params()
        })
        .unwrap();
        assert_eq!(options.sort_by, SortField::CreatedAt);
    }

    #[test]
    fn test_parse_order_is_lenient() {
        let parse = |order: &str| {
            ListOptions::parse(&ListUsersParams {
                order: Some(order.into()),
                ..params()
            })
            .unwrap()
            .order
        };
        assert_eq!(parse(" DESC "), SortOrder::Desc);
        assert_eq!(parse("asc"), SortOrder::Asc);
        assert_eq!(parse("sideways"), SortOrder::Asc);
    }

    #[test]
    fn test_search_filter_empty_matches_all() {
        assert!(build_search_filter("").is_empty());
    }

    #[test]
    fn test_search_filter_or_over_three_fields() {
        let filter = build_search_filter("Jo");
        let clauses = filter.get_array("$or").unwrap();
        assert_eq!(clauses.len(), 3);

        let expected = ["email", "profile.first_name", "profile.last_name"];
        for (clause, field) in clauses.iter().zip(expected) {
            let clause = clause.as_document().unwrap();
            let regex = clause.get_document(field).unwrap();
            assert_eq!(regex.get_str("$regex").unwrap(), "Jo");
            assert_eq!(regex.get_str("$options").unwrap(), "i");
        }
    }

    /// Evaluates a search filter the way the server does for `$or` of `$regex` clauses.
    fn filter_matches(filter: &Document, record: &Document) -> bool {
        let Ok(clauses) = filter.get_array("$or") else {
            return filter.is_empty();
        };
        clauses.iter().filter_map(|c| c.as_document()).any(|clause| {
            clause.iter().any(|(path, condition)| {
                let condition = condition.as_document().unwrap();
                let pattern = regex::RegexBuilder::new(condition.get_str("$regex").unwrap())
                    .case_insensitive(condition.get_str("$options").unwrap_or("").contains('i'))
                    .build()
                    .unwrap();

                let (parents, leaf) = match path.rsplit_once('.') {
                    Some((parents, leaf)) => (parents.split('.').collect::<Vec<_>>(), leaf),
                    None => (Vec::new(), path.as_str()),
                };
                let mut current = record;
                for key in parents {
                    match current.get_document(key) {
                        Ok(inner) => current = inner,
                        Err(_) => return false,
                    }
                }
                current.get_str(leaf).is_ok_and(|value| pattern.is_match(value))
            })
        })
    }

    #[test]
    fn test_search_filter_matching_semantics() {
        let john = doc! {
            "email": "jd@x.com",
            "profile": { "first_name": "John", "last_name": "Doe" },
        };
        let joe = doc! {
            "email": "joe@x.com",
            "profile": { "first_name": "Bob", "last_name": "Brown" },
        };
        let alice = doc! {
            "email": "alice@x.com",
            "profile": { "first_name": "Alice", "last_name": "Smith" },
        };

        let filter = build_search_filter("Jo");
        assert!(filter_matches(&filter, &john));
        assert!(filter_matches(&filter, &joe));
        assert!(!filter_matches(&filter, &alice));

        let all = build_search_filter("");
        for record in [&john, &joe, &alice] {
            assert!(filter_matches(&all, record));
        }
    }

    #[test]
    fn test_search_filter_passes_metacharacters_through() {
        let filter = build_search_filter("a.b*");
        let first = filter.get_array("$or").unwrap()[0].as_document().unwrap();
        assert_eq!(
            first.get_document("email").unwrap().get_str("$regex").unwrap(),
            "a.b*"
        );
    }

    #[test]
    fn test_sort_maps_names_to_profile_paths() {
        assert_eq!(
            build_sort(SortField::FirstName, SortOrder::Asc),
            doc! { "profile.first_name": 1 }
        );
        assert_eq!(
            build_sort(SortField::LastName, SortOrder::Desc),
            doc! { "profile.last_name": -1 }
        );
        assert_eq!(
            build_sort(SortField::Email, SortOrder::Desc),
            doc! { "email": -1 }
        );
    }

    #[test]
    fn test_projection_none_when_no_fields() {
        assert!(build_projection(&[]).is_none());
    }

    #[test]
    fn test_projection_always_keeps_id() {
        let projection = build_projection(&["email".to_string()]).unwrap();
        assert_eq!(projection, doc! { "email": 1, "_id": 1 });
    }

    #[test]
    fn test_projection_maps_id_alias() {
        let projection = build_projection(&["id".to_string(), "profile".to_string()]).unwrap();
        assert_eq!(projection, doc! { "_id": 1, "profile": 1 });
    }

    #[test]
    fn test_pagination_math() {
        let pagination = Pagination::new(2, 5);
        assert_eq!(pagination.skip(), 5);
        assert_eq!(pagination.limit(), 5);
        assert_eq!(pagination.total_pages(12), 3);
        assert_eq!(pagination.total_pages(10), 2);
        assert_eq!(pagination.total_pages(0), 0);
    }

    #[test]
    fn test_total_pages_is_ceiling_for_all_sizes() {
        for size in 1..=MAX_PAGE_SIZE {
            let pagination = Pagination::new(1, size);
            for total in [0, 1, size - 1, size, size + 1, 3 * size + 7] {
                let expected = (total as f64 / size as f64).ceil() as u64;
                assert_eq!(pagination.total_pages(total), expected, "{total}/{size}");
            }
        }
    }

    #[test]
    fn test_user_query_from_options() {
        let options = ListOptions {
            page: 3,
            page_size: 20,
            fields: vec!["email".into()],
            search: "smith".into(),
            sort_by: SortField::LastName,
            order: SortOrder::Desc,
        };

        let query = UserQuery::from_options(&options);
        assert_eq!(query.skip, 40);
        assert_eq!(query.limit, 20);
        assert_eq!(query.sort, doc! { "profile.last_name": -1 });
        assert!(query.filter.contains_key("$or"));
        assert!(query.projection.is_some());
    }
}
