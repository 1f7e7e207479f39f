//! DialB spam-flag CSV handling, statistics and DID matching.

use std::collections::{HashMap, HashSet};

use did_admin_core::phone;
use did_admin_import::csv::{parse_rows, write_quoted_row, write_row};
use did_admin_import::template::{require_headers, DIALB_HEADERS};
use did_admin_import::Result;
use did_admin_store::{DialBRecord, DialBStatus};

use crate::types::{Carrier, DialBMatch, DialBQuery, DialBStats};

/// One data line of a DialB import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialBRow {
    /// Phone number, as written.
    pub phone_number: String,
    /// Group label.
    pub group: String,
    /// Overall status.
    pub overall_status: DialBStatus,
    /// T-Mobile flag.
    pub t_mobile_flag: bool,
    /// AT&T flag.
    pub att_flag: bool,
    /// Third-party flag.
    pub third_party_flag: bool,
    /// Last-checked value.
    pub last_checked: String,
}

/// Parse a DialB import file.
///
/// Returns the usable rows and one message per skipped line. Line numbers
/// count the header as line 1.
///
/// # Errors
///
/// Returns `ImportError::HeaderMismatch` if any expected header is absent;
/// nothing should be written in that case.
pub fn parse_import(text: &str) -> Result<(Vec<DialBRow>, Vec<String>)> {
    let rows = parse_rows(text);
    let header: Vec<String> = rows
        .first()
        .map(|r| r.iter().map(|c| c.trim().to_string()).collect())
        .unwrap_or_default();
    require_headers(&header[..], &DIALB_HEADERS)?;

    let position = |name: &str| header.iter().position(|h| h == name).unwrap_or_default();
    let columns: Vec<usize> = DIALB_HEADERS.iter().map(|h| position(h)).collect();

    let mut parsed = Vec::new();
    let mut errors = Vec::new();
    for (index, row) in rows.iter().enumerate().skip(1) {
        if row.len() < DIALB_HEADERS.len() {
            errors.push(format!("Line {}: Insufficient data columns", index + 1));
            continue;
        }
        let cell = |i: usize| row.get(columns[i]).map_or("", |c| c.trim());
        let flag = |i: usize| cell(i).eq_ignore_ascii_case("true");
        parsed.push(DialBRow {
            phone_number: cell(0).to_string(),
            group: cell(1).to_string(),
            overall_status: DialBStatus::from_cell(cell(2)),
            t_mobile_flag: flag(3),
            att_flag: flag(4),
            third_party_flag: flag(5),
            last_checked: cell(6).to_string(),
        });
    }
    Ok((parsed, errors))
}

/// Export records with the import headers; every data cell is quoted.
#[must_use]
pub fn to_csv(records: &[DialBRecord]) -> String {
    let mut lines = vec![write_row(&DIALB_HEADERS[..])];
    lines.extend(records.iter().map(|r| {
        write_quoted_row(&[
            r.phone_number.clone(),
            r.group.clone(),
            r.overall_status.to_string(),
            r.t_mobile_flag.to_string(),
            r.att_flag.to_string(),
            r.third_party_flag.to_string(),
            r.last_checked.clone(),
        ])
    }));
    lines.join("\n")
}

/// Summary counts.
#[must_use]
pub fn stats(records: &[DialBRecord]) -> DialBStats {
    let count = |f: fn(&DialBRecord) -> bool| records.iter().filter(|r| f(r)).count();
    DialBStats {
        total: records.len(),
        clean: count(|r| r.overall_status == DialBStatus::Clean),
        spam: count(|r| r.overall_status == DialBStatus::Spam),
        t_mobile_flagged: count(|r| r.t_mobile_flag),
        att_flagged: count(|r| r.att_flag),
        third_party_flagged: count(|r| r.third_party_flag),
        groups: records
            .iter()
            .map(|r| r.group.as_str())
            .collect::<HashSet<_>>()
            .len(),
    }
}

/// Whether a record passes the listing filters.
#[must_use]
pub fn matches_query(record: &DialBRecord, query: &DialBQuery) -> bool {
    let search_ok = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .map_or(true, |needle| {
            record.phone_number.to_lowercase().contains(&needle)
                || record.group.to_lowercase().contains(&needle)
        });
    let status_ok = query.status.map_or(true, |s| record.overall_status == s);
    let group_ok = query
        .group
        .as_deref()
        .filter(|g| !g.is_empty())
        .map_or(true, |g| record.group == g);
    let carrier_ok = query.carrier.map_or(true, |c| match c {
        Carrier::TMobile => record.t_mobile_flag,
        Carrier::Att => record.att_flag,
        Carrier::ThirdParty => record.third_party_flag,
    });
    search_ok && status_ok && group_ok && carrier_ok
}

/// Lookup table from match key to status. The first record per key wins.
#[derive(Debug, Default)]
pub struct MatchIndex(HashMap<String, DialBStatus>);

impl MatchIndex {
    /// Index `records` by their match key.
    #[must_use]
    pub fn build(records: &[DialBRecord]) -> Self {
        let mut index = HashMap::new();
        for record in records {
            let key = phone::dialb_match_key(&record.phone_number);
            if !key.is_empty() {
                index.entry(key).or_insert(record.overall_status);
            }
        }
        Self(index)
    }

    /// The DialB reputation of a DID number.
    #[must_use]
    pub fn lookup(&self, did_number: &str) -> DialBMatch {
        self.0
            .get(&phone::dialb_match_key(did_number))
            .map_or(DialBMatch::Unknown, |s| DialBMatch::from(*s))
    }
}
