//! Read-side filtering, searching and sorting of record collections.
//!
//! A view never mutates the store it reads from. The pipeline is:
//!
//! 1. free-text search over each record's searchable fields
//! 2. column filters: for every column with a non-empty allowed set, the
//!    record's value must be in the set (columns combine with AND, unknown
//!    columns are ignored)
//! 3. one sort column with a direction; `none` keeps store order
//!
//! Sorting compares strings the way a spreadsheet user expects: case is
//! ignored and digit runs compare by numeric value, so `"9"` sorts before
//! `"10"`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use did_admin_store::{AreaCode, Company, DialBRecord};
use serde::{Deserialize, Serialize};

use crate::types::DidView;

/// A record that can be shown in a filterable table.
pub trait Tabular {
    /// The display value of a column, or `None` for an unknown column.
    fn column(&self, key: &str) -> Option<String>;

    /// Fields matched by free-text search.
    fn search_fields(&self) -> Vec<&str>;
}

/// Allowed values per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnFilters(BTreeMap<String, BTreeSet<String>>);

impl ColumnFilters {
    /// No filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter on `column`. An empty set disables it.
    #[must_use]
    pub fn with<I, S>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(column, values);
        self
    }

    /// Replace the filter on `column`.
    pub fn set<I, S>(&mut self, column: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(column.into(), values.into_iter().map(Into::into).collect());
    }

    /// Whether no column is filtered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    /// Whether `record` passes every active filter.
    pub fn accepts<T: Tabular>(&self, record: &T) -> bool {
        self.0
            .iter()
            .filter(|(_, allowed)| !allowed.is_empty())
            .all(|(column, allowed)| {
                record
                    .column(column)
                    .map_or(true, |value| allowed.contains(&value))
            })
    }
}

/// Sort direction for the active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first.
    #[serde(rename = "asc")]
    Ascending,
    /// Largest first.
    #[serde(rename = "desc")]
    Descending,
    /// Store order.
    #[default]
    #[serde(rename = "none")]
    None,
}

impl SortDirection {
    /// The next direction when a column header is clicked repeatedly.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::None => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::None,
        }
    }
}

/// The single active sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column key.
    pub column: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Sort on `column` in `direction`.
    #[must_use]
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

/// Everything that shapes a table view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    /// Free-text search, case-insensitive.
    #[serde(default)]
    pub search: Option<String>,
    /// Column filters.
    #[serde(default)]
    pub filters: ColumnFilters,
    /// Active sort.
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

impl ViewQuery {
    /// Derive the displayed rows from `records`.
    #[must_use]
    pub fn apply<T: Tabular + Clone>(&self, records: &[T]) -> Vec<T> {
        let needle = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut rows: Vec<T> = records
            .iter()
            .filter(|r| needle.as_deref().map_or(true, |n| matches_search(*r, n)))
            .filter(|r| self.filters.accepts(*r))
            .cloned()
            .collect();

        if let Some(sort) = &self.sort {
            sort_rows(&mut rows, sort);
        }
        rows
    }
}

fn matches_search<T: Tabular>(record: &T, needle: &str) -> bool {
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Stable sort by one column. `None` direction leaves the order alone.
pub fn sort_rows<T: Tabular>(rows: &mut [T], sort: &SortSpec) {
    let descending = match sort.direction {
        SortDirection::None => return,
        SortDirection::Ascending => false,
        SortDirection::Descending => true,
    };
    rows.sort_by(|a, b| {
        let a = a.column(&sort.column).unwrap_or_default();
        let b = b.column(&sort.column).unwrap_or_default();
        let ord = natural_cmp(&a, &b);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Distinct non-empty values of a column, naturally sorted.
pub fn distinct_values<T: Tabular>(records: &[T], column: &str) -> Vec<String> {
    let set: BTreeSet<String> = records
        .iter()
        .filter_map(|r| r.column(column))
        .filter(|v| !v.is_empty())
        .collect();
    let mut values: Vec<String> = set.into_iter().collect();
    values.sort_by(|a, b| natural_cmp(a, b));
    values
}

/// Case-insensitive comparison with digit runs compared numerically.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x, y) {
                    (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
                    (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
                    (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
                    (Chunk::Text(x), Chunk::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    const fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map_or(self.rest.len(), |(i, _)| i);
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if digits {
            Chunk::Digits(chunk)
        } else {
            Chunk::Text(chunk)
        })
    }
}

// =============================================================================
// Table columns per record type
// =============================================================================

impl Tabular for DidView {
    fn column(&self, key: &str) -> Option<String> {
        let did = &self.did;
        Some(match key {
            "id" => did.id.to_string(),
            "provider" => did.provider.clone(),
            "didNumber" => did.did_number.clone(),
            "trankId" => did.trunk_id.clone(),
            "didForward" => did.did_forward.clone(),
            "areaCode" => did.area_code.clone(),
            "state" => did.state.clone(),
            "companyId" => did.company_code.clone(),
            "companyName" => did.company_name.clone(),
            "status" => did.status.to_string(),
            "assignedDate" => did.assigned_date.to_string(),
            "lastUpdated" => did.last_updated.to_string(),
            "dialBStatus" => self.dial_b_status.as_str().to_string(),
            _ => return None,
        })
    }

    fn search_fields(&self) -> Vec<&str> {
        let did = &self.did;
        vec![
            did.did_number.as_str(),
            did.provider.as_str(),
            did.trunk_id.as_str(),
            did.did_forward.as_str(),
            did.area_code.as_str(),
            did.state.as_str(),
            did.company_code.as_str(),
            did.company_name.as_str(),
        ]
    }
}

impl Tabular for AreaCode {
    fn column(&self, key: &str) -> Option<String> {
        Some(match key {
            "id" => self.id.to_string(),
            "code" => self.code.clone(),
            "region" => self.region.clone(),
            "state" => self.state.clone(),
            "timezone" => self.timezone.clone(),
            "totalDIDs" => self.total_dids.to_string(),
            "activeDIDs" => self.active_dids.to_string(),
            _ => return None,
        })
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.code.as_str(),
            self.region.as_str(),
            self.state.as_str(),
            self.timezone.as_str(),
        ]
    }
}

impl Tabular for Company {
    fn column(&self, key: &str) -> Option<String> {
        Some(match key {
            "id" => self.id.to_string(),
            "companyId" => self.code.clone(),
            "companyName" => self.name.clone(),
            "description" => self.description.clone(),
            "createdDate" => self.created_date.to_string(),
            "lastUpdated" => self.last_updated.to_string(),
            _ => return None,
        })
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.code.as_str(), self.name.as_str(), self.description.as_str()]
    }
}

impl Tabular for DialBRecord {
    fn column(&self, key: &str) -> Option<String> {
        Some(match key {
            "id" => self.id.to_string(),
            "phoneNumber" => self.phone_number.clone(),
            "group" => self.group.clone(),
            "overallStatus" => self.overall_status.to_string(),
            "tMobileFlag" => self.t_mobile_flag.to_string(),
            "attFlag" => self.att_flag.to_string(),
            "thirdPartyFlag" => self.third_party_flag.to_string(),
            "lastChecked" => self.last_checked.clone(),
            _ => return None,
        })
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.phone_number.as_str(), self.group.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DialBMatch;
    use did_admin_store::{Did, DidStatus};

    fn view(number: &str, state: &str, status: DidStatus) -> DidView {
        let mut did = Did::new(number);
        did.state = state.to_string();
        did.status = status;
        DidView {
            did,
            dial_b_status: DialBMatch::Unknown,
        }
    }

    fn sample() -> Vec<DidView> {
        vec![
            view("12125550100", "NY", DidStatus::Active),
            view("13105550100", "CA", DidStatus::Inactive),
            view("14155550100", "CA", DidStatus::Active),
            view("17185550100", "NY", DidStatus::Pending),
        ]
    }

    fn numbers(rows: &[DidView]) -> Vec<&str> {
        rows.iter().map(|r| r.did.did_number.as_str()).collect()
    }

    #[test]
    fn filtered_rows_are_members_and_keep_order() {
        let query = ViewQuery {
            filters: ColumnFilters::new().with("state", ["CA"]),
            ..ViewQuery::default()
        };
        let rows = query.apply(&sample());
        assert!(rows.iter().all(|r| r.did.state == "CA"));
        assert_eq!(numbers(&rows), vec!["13105550100", "14155550100"]);
    }

    #[test]
    fn filters_are_conjunctive() {
        let query = ViewQuery {
            filters: ColumnFilters::new()
                .with("state", ["NY", "CA"])
                .with("status", ["active"]),
            ..ViewQuery::default()
        };
        assert_eq!(
            numbers(&query.apply(&sample())),
            vec!["12125550100", "14155550100"]
        );
    }

    #[test]
    fn empty_and_unknown_filters_pass_everything() {
        let query = ViewQuery {
            filters: ColumnFilters::new()
                .with("state", Vec::<String>::new())
                .with("noSuchColumn", ["x"]),
            ..ViewQuery::default()
        };
        assert_eq!(query.apply(&sample()).len(), 4);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut rows = sample();
        rows[1].did.company_name = "Acme Telecom".to_string();
        let query = ViewQuery {
            search: Some("ACME".to_string()),
            ..ViewQuery::default()
        };
        assert_eq!(numbers(&query.apply(&rows)), vec!["13105550100"]);
    }

    #[test]
    fn sort_directions() {
        let records = sample();
        let asc = ViewQuery {
            sort: Some(SortSpec::new("state", SortDirection::Ascending)),
            ..ViewQuery::default()
        };
        // Stable: ties keep store order.
        assert_eq!(
            numbers(&asc.apply(&records)),
            vec!["13105550100", "14155550100", "12125550100", "17185550100"]
        );

        let desc = ViewQuery {
            sort: Some(SortSpec::new("state", SortDirection::Descending)),
            ..ViewQuery::default()
        };
        assert_eq!(
            numbers(&desc.apply(&records)),
            vec!["12125550100", "17185550100", "13105550100", "14155550100"]
        );

        let none = ViewQuery {
            sort: Some(SortSpec::new("state", SortDirection::None)),
            ..ViewQuery::default()
        };
        assert_eq!(numbers(&none.apply(&records)), numbers(&records));
    }

    #[test]
    fn natural_ordering() {
        assert_eq!(natural_cmp("9", "10"), Ordering::Less);
        assert_eq!(natural_cmp("T2", "T10"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "ABD"), Ordering::Less);
        assert_eq!(natural_cmp("007", "7"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);

        let mut values = vec!["T10", "t2", "T1"];
        values.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(values, vec!["T1", "t2", "T10"]);
    }

    #[test]
    fn direction_cycles() {
        assert_eq!(SortDirection::None.cycle(), SortDirection::Ascending);
        assert_eq!(SortDirection::Ascending.cycle(), SortDirection::Descending);
        assert_eq!(SortDirection::Descending.cycle(), SortDirection::None);
    }

    #[test]
    fn distinct_values_for_filter_menus() {
        assert_eq!(distinct_values(&sample(), "state"), vec!["CA", "NY"]);
        assert!(distinct_values(&sample(), "bogus").is_empty());
    }

    #[test]
    fn view_never_mutates_input() {
        let records = sample();
        let before = records.clone();
        let query = ViewQuery {
            search: Some("1".to_string()),
            filters: ColumnFilters::new().with("state", ["CA"]),
            sort: Some(SortSpec::new("didNumber", SortDirection::Descending)),
        };
        let _ = query.apply(&records);
        assert_eq!(records, before);
    }
}
