//! Area-code lookup, counting and CSV conversion.

use std::collections::HashMap;

use did_admin_import::csv::parse_rows;
use did_admin_import::template::require_headers;
use did_admin_import::Result;
use did_admin_store::{AreaCode, Did, DidStatus};

/// The pseudo-state used for toll-free codes in area-code files.
pub const TOLL_FREE_STATE: &str = "Tell Free";

/// Timezone assumed for states missing from the table.
pub const DEFAULT_TIMEZONE: &str = "EST";

const STATE_TIMEZONES: &[(&str, &str)] = &[
    ("Alabama", "CST"),
    ("Alaska", "AKST"),
    ("Arizona", "MST"),
    ("Arkansas", "CST"),
    ("California", "PST"),
    ("Colorado", "MST"),
    ("Connecticut", "EST"),
    ("Delaware", "EST"),
    ("District of Columbia", "EST"),
    ("Florida", "EST"),
    ("Georgia", "EST"),
    ("Hawaii", "HST"),
    ("Idaho", "MST"),
    ("Illinois", "CST"),
    ("Indiana", "EST"),
    ("Iowa", "CST"),
    ("Kansas", "CST"),
    ("Kentucky", "EST"),
    ("Louisiana", "CST"),
    ("Maine", "EST"),
    ("Maryland", "EST"),
    ("Massachusetts", "EST"),
    ("Michigan", "EST"),
    ("Minnesota", "CST"),
    ("Mississippi", "CST"),
    ("Missouri", "CST"),
    ("Montana", "MST"),
    ("Nebraska", "CST"),
    ("Nevada", "PST"),
    ("New Hampshire", "EST"),
    ("New Jersey", "EST"),
    ("New Mexico", "MST"),
    ("New York", "EST"),
    ("North Carolina", "EST"),
    ("North Dakota", "CST"),
    ("Ohio", "EST"),
    ("Oklahoma", "CST"),
    ("Oregon", "PST"),
    ("Pennsylvania", "EST"),
    ("Rhode Island", "EST"),
    ("South Carolina", "EST"),
    ("South Dakota", "CST"),
    ("Tennessee", "CST"),
    ("Texas", "CST"),
    ("Utah", "MST"),
    ("Vermont", "EST"),
    ("Virginia", "EST"),
    ("Washington", "PST"),
    ("West Virginia", "EST"),
    ("Wisconsin", "CST"),
    ("Wyoming", "MST"),
    (TOLL_FREE_STATE, "N/A"),
];

/// Timezone abbreviation for a full state name.
#[must_use]
pub fn timezone_for_state(state: &str) -> &'static str {
    STATE_TIMEZONES
        .iter()
        .find(|(s, _)| *s == state)
        .map_or(DEFAULT_TIMEZONE, |(_, tz)| *tz)
}

/// Region label for a state.
#[must_use]
pub fn region_for_state(state: &str) -> String {
    if state == TOLL_FREE_STATE {
        "Toll Free".to_string()
    } else {
        format!("{state} Region")
    }
}

/// Area code to state, first entry per code wins.
#[derive(Debug, Default)]
pub struct StateLookup(HashMap<String, String>);

impl StateLookup {
    /// Build from the area-code table.
    #[must_use]
    pub fn build(area_codes: &[AreaCode]) -> Self {
        let mut map = HashMap::new();
        for ac in area_codes {
            map.entry(ac.code.clone()).or_insert_with(|| ac.state.clone());
        }
        Self(map)
    }

    /// The state for `code`, or `""` if unknown.
    #[must_use]
    pub fn state_for(&self, code: &str) -> String {
        self.0.get(code).cloned().unwrap_or_default()
    }

    /// The non-empty state mapped to `code`.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&str> {
        self.0
            .get(code)
            .map(String::as_str)
            .filter(|state| !state.is_empty())
    }
}

/// Total and active DID counts per area code.
#[must_use]
pub fn count_dids(dids: &[Did]) -> HashMap<&str, (u32, u32)> {
    let mut counts: HashMap<&str, (u32, u32)> = HashMap::new();
    for did in dids {
        let entry = counts.entry(did.area_code.as_str()).or_default();
        entry.0 += 1;
        if did.status == DidStatus::Active {
            entry.1 += 1;
        }
    }
    counts
}

/// Convert an `Area Code,State` file into area-code records.
///
/// Regions and timezones are derived from the state. Rows without a code
/// are skipped.
///
/// # Errors
///
/// Returns `ImportError::HeaderMismatch` if either column is missing.
pub fn parse_csv(text: &str) -> Result<Vec<AreaCode>> {
    let rows = parse_rows(text);
    let header: Vec<String> = rows
        .first()
        .map(|r| r.iter().map(|c| c.trim().to_string()).collect())
        .unwrap_or_default();
    require_headers(&header[..], &["Area Code", "State"])?;

    let code_col = header.iter().position(|h| h == "Area Code").unwrap_or_default();
    let state_col = header.iter().position(|h| h == "State").unwrap_or_default();

    Ok(rows
        .iter()
        .skip(1)
        .filter_map(|row| {
            let code = row.get(code_col).map_or("", |c| c.trim());
            if code.is_empty() {
                return None;
            }
            let state = row.get(state_col).map_or("", |c| c.trim());
            Some(AreaCode::new(
                code,
                region_for_state(state),
                state,
                timezone_for_state(state),
            ))
        })
        .collect())
}
