//! Collection view model: filter, sort and paginate a record list.
//!
//! Everything here is a pure function of `(records, ListQuery)`; handlers
//! load the collection from the store and pass it through [`view`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::Entity;

/// Page sizes a client may request.
pub const PAGE_SIZES: [usize; 3] = [10, 25, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Raw query-string pairs in request order. Names may repeat.
pub type QueryParams = Vec<(String, String)>;

// ==================== SORT ====================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most recent reference date first.
    #[default]
    Newest,
    Oldest,
    /// Smallest [`Entity::length`] first.
    Shortest,
    Longest,
    /// Case-insensitive title order.
    Title,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "shortest" => Ok(SortKey::Shortest),
            "longest" => Ok(SortKey::Longest),
            "title" => Ok(SortKey::Title),
            other => Err(AppError::Validation(format!("Unknown sort '{}'", other))),
        }
    }
}

fn by_date<E: Entity>(a: &E, b: &E, newest_first: bool) -> Ordering {
    match (a.meta().reference_date(), b.meta().reference_date()) {
        (Some(x), Some(y)) if newest_first => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        // Undated records always go last
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort; ties keep their input order.
pub fn sort_records<E: Entity>(records: &mut [E], key: SortKey) {
    match key {
        SortKey::Newest => records.sort_by(|a, b| by_date(a, b, true)),
        SortKey::Oldest => records.sort_by(|a, b| by_date(a, b, false)),
        SortKey::Shortest => records.sort_by_key(|r| r.length()),
        SortKey::Longest => records.sort_by(|a, b| b.length().cmp(&a.length())),
        SortKey::Title => records.sort_by_key(|r| r.title().to_lowercase()),
    }
}

// ==================== QUERY ====================

/// Filter, sort and pagination state of one list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub q: String,
    /// Facet name to expected value, names drawn from `E::FACETS`.
    pub facets: BTreeMap<String, String>,
    pub year: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub sort: SortKey,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            facets: BTreeMap::new(),
            year: None,
            from: None,
            to: None,
            tags: Vec::new(),
            sort: SortKey::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("{} must be a YYYY-MM-DD date, got '{}'", name, value))
    })
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::Validation(format!("{} must be a number, got '{}'", name, value)))
}

impl ListQuery {
    /// Build a query from raw query-string parameters.
    ///
    /// Empty values are treated as absent, which is what "all" selectors send.
    /// Any parameter that is not a known control must be a facet of `E`.
    /// `tags` may repeat and accumulates; every other name may appear once.
    pub fn parse<E: Entity>(params: &[(String, String)]) -> Result<Self, AppError> {
        let mut query = ListQuery::default();
        let mut seen = HashSet::new();

        for (name, value) in params {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if name != "tags" && !seen.insert(name.as_str()) {
                return Err(AppError::Validation(format!(
                    "Parameter '{}' given more than once",
                    name
                )));
            }

            match name.as_str() {
                "q" => query.q = value.to_string(),
                "year" => query.year = Some(parse_number("year", value)?),
                "from" => query.from = Some(parse_date("from", value)?),
                "to" => query.to = Some(parse_date("to", value)?),
                "tags" => {
                    for tag in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                        if !query.tags.iter().any(|t| t == tag) {
                            query.tags.push(tag.to_string());
                        }
                    }
                }
                "sort" => query.sort = value.parse()?,
                "page" => query.page = parse_number("page", value)?,
                "pageSize" => {
                    let size: usize = parse_number("pageSize", value)?;
                    if !PAGE_SIZES.contains(&size) {
                        return Err(AppError::Validation(format!(
                            "pageSize must be one of {:?}, got {}",
                            PAGE_SIZES, size
                        )));
                    }
                    query.page_size = size;
                }
                facet if E::FACETS.contains(&facet) => {
                    query.facets.insert(facet.to_string(), value.to_string());
                }
                other => {
                    return Err(AppError::Validation(format!(
                        "Unknown filter '{}' for {}",
                        other,
                        E::KIND
                    )));
                }
            }
        }

        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(AppError::Validation(format!(
                    "from ({}) is after to ({})",
                    from, to
                )));
            }
        }

        Ok(query)
    }

    /// Whether a record passes every filter of this query.
    pub fn matches<E: Entity>(&self, record: &E) -> bool {
        self.matches_text(record)
            && self.matches_facets(record)
            && self.matches_dates(record)
            && self.matches_tags(record)
    }

    fn matches_text<E: Entity>(&self, record: &E) -> bool {
        if self.q.is_empty() {
            return true;
        }
        let needle = self.q.to_lowercase();
        record
            .search_fields()
            .into_iter()
            .chain(record.tags().iter().map(String::as_str))
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_facets<E: Entity>(&self, record: &E) -> bool {
        self.facets.iter().all(|(name, expected)| {
            record
                .facet(name)
                .is_some_and(|actual| actual.eq_ignore_ascii_case(expected))
        })
    }

    fn matches_dates<E: Entity>(&self, record: &E) -> bool {
        if self.year.is_none() && self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(date) = record.meta().reference_date().map(|d| d.date_naive()) else {
            return false;
        };
        self.year.is_none_or(|year| date.year() == year)
            && self.from.is_none_or(|from| date >= from)
            && self.to.is_none_or(|to| date <= to)
    }

    fn matches_tags<E: Entity>(&self, record: &E) -> bool {
        self.tags.iter().all(|wanted| {
            record
                .tags()
                .iter()
                .any(|tag| tag.to_lowercase() == wanted.to_lowercase())
        })
    }
}

// ==================== PAGINATION ====================

/// One page of a filtered and sorted collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<E> {
    pub items: Vec<E>,
    /// Size of the filtered set, not of this page.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Keep the records matching `query`, preserving their order.
pub fn filter_records<E: Entity>(records: Vec<E>, query: &ListQuery) -> Vec<E> {
    records.into_iter().filter(|r| query.matches(r)).collect()
}

/// Slice out one page. `page` is clamped to `[1, total_pages]`.
pub fn paginate<E>(records: Vec<E>, page: usize, page_size: usize) -> Page<E> {
    let page_size = page_size.max(1);
    let total = records.len();
    let total_pages = total.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let items = records
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Page {
        items,
        total,
        page,
        page_size,
        total_pages,
    }
}

/// Filtered and sorted records, without pagination. Used by exports.
pub fn filtered_sorted<E: Entity>(records: Vec<E>, query: &ListQuery) -> Vec<E> {
    let mut filtered = filter_records(records, query);
    sort_records(&mut filtered, query.sort);
    filtered
}

/// Filter, sort and paginate.
pub fn view<E: Entity>(records: Vec<E>, query: &ListQuery) -> Page<E> {
    paginate(filtered_sorted(records, query), query.page, query.page_size)
}

// ==================== SELECTION ====================

/// Keys chosen for a bulk action, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    keys: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection from a key list, duplicates dropped.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for key in keys {
            selection.select(key);
        }
        selection
    }

    pub fn select(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    /// "Select all": every key on the given page, nothing beyond it.
    pub fn select_page<E: Entity>(&mut self, page: &Page<E>) {
        for record in &page.items {
            self.select(record.key());
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
