//! CSV exports of DID collections.
//!
//! The grouped exports feed a provisioning sheet where each row is a
//! routing entry: a label, the literal `serial`, a routing code built from
//! the company code and area code, then the DID numbers themselves.

use did_admin_import::csv::write_row;
use did_admin_store::Did;

const UNKNOWN_COMPANY: &str = "Unknown Company";
const UNKNOWN_STATE: &str = "Unknown State";
const UNKNOWN_AREA: &str = "Unknown Area";

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

/// Insertion-ordered grouping.
struct Groups<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for Groups<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, V: Default> Groups<K, V> {
    fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, key: K) -> &mut V {
        let index = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(i) => i,
            None => {
                self.entries.push((key, V::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }
}

/// Every DID grouped by company, state and area code.
///
/// For each company and state there is a `Default` row
/// (`"<company> <state> Default",serial,<code>000`) followed by one row per
/// area code (`"<company> <state> <area>",serial,<code>1<area>,<dids>...`).
/// Companies and states appear in first-seen order; area codes within a
/// state ascend numerically, with non-numeric labels last.
#[must_use]
pub fn all_dids(dids: &[Did]) -> String {
    let mut companies: Groups<&str, Groups<&str, Groups<&str, Vec<&Did>>>> = Groups::new();
    for did in dids {
        companies
            .entry(or_placeholder(&did.company_name, UNKNOWN_COMPANY))
            .entry(or_placeholder(&did.state, UNKNOWN_STATE))
            .entry(or_placeholder(&did.area_code, UNKNOWN_AREA))
            .push(did);
    }

    let mut lines = Vec::new();
    for (company, states) in &mut companies.entries {
        for (state, areas) in &mut states.entries {
            areas.entries.sort_by(|(a, _), (b, _)| area_order(a, b));
            let company_code = areas
                .entries
                .first()
                .and_then(|(_, dids)| dids.first())
                .map_or("", |d| d.company_code.as_str());

            lines.push(write_row(&[
                format!("{company} {state} Default"),
                "serial".to_string(),
                format!("{company_code}000"),
            ]));

            for (area, group) in &areas.entries {
                let mut row = vec![
                    format!("{company} {state} {area}"),
                    "serial".to_string(),
                    format!("{company_code}1{area}"),
                ];
                row.extend(group.iter().map(|d| d.did_number.clone()));
                lines.push(write_row(&row));
            }
        }
    }
    lines.join("\n")
}

/// Selected DIDs, one row per company/state/area-code group.
///
/// Each row is `<company>,serial,"<state> <area>",<code>1<area>,<dids>...`
/// with groups in first-seen order. The company code comes from the first
/// DID of the group.
#[must_use]
pub fn selected_dids(dids: &[Did]) -> String {
    let mut groups: Groups<(&str, &str, &str), Vec<&Did>> = Groups::new();
    for did in dids {
        groups
            .entry((
                or_placeholder(&did.company_name, UNKNOWN_COMPANY),
                or_placeholder(&did.state, UNKNOWN_STATE),
                or_placeholder(&did.area_code, UNKNOWN_AREA),
            ))
            .push(did);
    }

    groups
        .entries
        .iter()
        .map(|((company, state, area), group)| {
            let company_code = group.first().map_or("", |d| d.company_code.as_str());
            let mut row = vec![
                (*company).to_string(),
                "serial".to_string(),
                format!("{state} {area}"),
                format!("{company_code}1{area}"),
            ];
            row.extend(group.iter().map(|d| d.did_number.clone()));
            write_row(&row)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One DID number per line, no header. Empty numbers are skipped.
#[must_use]
pub fn numbers_only(dids: &[Did]) -> String {
    dids.iter()
        .map(|d| d.did_number.as_str())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numeric area codes ascend; anything else sorts after them, stably.
fn area_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => std::cmp::Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn did(number: &str, company: &str, code: &str, state: &str, area: &str) -> Did {
        let mut did = Did::new(number);
        did.company_name = company.to_string();
        did.company_code = code.to_string();
        did.state = state.to_string();
        did.area_code = area.to_string();
        did
    }

    #[test]
    fn all_export_groups_with_default_rows() {
        let dids = vec![
            did("13105550001", "Acme", "C1", "CA", "310"),
            did("12125550001", "Acme", "C1", "NY", "212"),
            did("14155550001", "Acme", "C1", "CA", "415"),
            did("12135550001", "Acme", "C1", "CA", "213"),
            did("13105550002", "Acme", "C1", "CA", "310"),
        ];

        let expected = [
            "Acme CA Default,serial,C1000",
            "Acme CA 213,serial,C11213,12135550001",
            "Acme CA 310,serial,C11310,13105550001,13105550002",
            "Acme CA 415,serial,C11415,14155550001",
            "Acme NY Default,serial,C1000",
            "Acme NY 212,serial,C11212,12125550001",
        ]
        .join("\n");
        assert_eq!(all_dids(&dids), expected);
    }

    #[test]
    fn placeholders_for_missing_grouping_fields() {
        let dids = vec![did("555", "", "", "", "")];
        assert_eq!(
            all_dids(&dids),
            "Unknown Company Unknown State Default,serial,000\n\
             Unknown Company Unknown State Unknown Area,serial,1Unknown Area,555"
        );
    }

    #[test]
    fn selected_export_rows() {
        let dids = vec![
            did("12125550001", "Acme", "C1", "NY", "212"),
            did("13105550001", "Beta", "C2", "CA", "310"),
            did("12125550002", "Acme", "C1", "NY", "212"),
        ];
        assert_eq!(
            selected_dids(&dids),
            "Acme,serial,NY 212,C11212,12125550001,12125550002\n\
             Beta,serial,CA 310,C21310,13105550001"
        );
    }

    #[test]
    fn selected_export_keeps_underscores_in_names() {
        let dids = vec![did("1", "A_B", "C", "NY", "212")];
        assert_eq!(selected_dids(&dids), "A_B,serial,NY 212,C1212,1");
    }

    #[test]
    fn commas_in_company_names_are_quoted() {
        let dids = vec![did("1", "Acme, Inc.", "C", "NY", "212")];
        assert!(selected_dids(&dids).starts_with("\"Acme, Inc.\",serial"));
    }

    #[test]
    fn numbers_only_skips_empty() {
        let dids = vec![Did::new("111"), Did::new(""), Did::new("222")];
        assert_eq!(numbers_only(&dids), "111\n222");
    }

    #[test]
    fn empty_input_exports_nothing() {
        assert_eq!(all_dids(&[]), "");
        assert_eq!(selected_dids(&[]), "");
        assert_eq!(numbers_only(&[]), "");
    }
}
