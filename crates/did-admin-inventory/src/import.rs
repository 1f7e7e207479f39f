//! Turning sanitized CSV rows into DID records and deduplicating them.
//!
//! The dedup key is the raw mapped DID-number value, compared by exact
//! string match. It is not normalized: `212-555-0100` and `2125550100` are
//! different keys. Acceptance is cumulative, so once a row is accepted its
//! number is a duplicate target for the rest of the batch.

use std::collections::HashSet;

use chrono::NaiveDate;
use did_admin_core::phone;
use did_admin_import::{ColumnMapping, CsvRow, TargetField};
use did_admin_store::{Did, DidStatus};

/// Values stamped onto every imported record.
#[derive(Debug, Clone)]
pub struct ImportContext {
    /// Provider name.
    pub provider: String,
    /// Owning company business code.
    pub company_code: String,
    /// Owning company name.
    pub company_name: String,
    /// Assigned and last-updated date.
    pub today: NaiveDate,
}

/// Build one candidate DID per row.
///
/// Mapped cells that are empty leave the field at its default. The
/// forwarding number is normalized; area code and state are derived from
/// the DID number through `state_for`.
pub fn build_candidates<F>(
    rows: &[CsvRow],
    mapping: &ColumnMapping,
    ctx: &ImportContext,
    state_for: F,
) -> Vec<Did>
where
    F: Fn(&str) -> String,
{
    rows.iter()
        .map(|row| {
            let cell = |field| {
                mapping
                    .get(field)
                    .map(|header| row.get(header))
                    .filter(|v| !v.is_empty())
            };

            let mut did = Did::new(cell(TargetField::DidNumber).unwrap_or_default());
            did.provider.clone_from(&ctx.provider);
            did.company_code.clone_from(&ctx.company_code);
            did.company_name.clone_from(&ctx.company_name);
            did.status = DidStatus::Active;
            did.assigned_date = ctx.today;
            did.last_updated = ctx.today;

            if let Some(trunk) = cell(TargetField::TrunkId) {
                did.trunk_id = trunk.to_string();
            }
            if let Some(forward) = cell(TargetField::DidForward) {
                did.did_forward = phone::normalize(forward);
            }
            if !did.did_number.is_empty() {
                did.area_code = phone::area_code(&did.did_number);
                did.state = state_for(&did.area_code);
            }
            did
        })
        .collect()
}

/// Accepted and duplicate candidates, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Candidates whose number was not seen before.
    pub accepted: Vec<Did>,
    /// Candidates whose number already existed or was accepted earlier.
    pub duplicates: Vec<Did>,
}

/// Split candidates against the numbers already in the store.
pub fn partition<'a, I>(existing: I, candidates: Vec<Did>) -> Partition
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = existing.into_iter().map(ToString::to_string).collect();
    let mut result = Partition::default();
    for candidate in candidates {
        if seen.contains(&candidate.did_number) {
            result.duplicates.push(candidate);
        } else {
            seen.insert(candidate.did_number.clone());
            result.accepted.push(candidate);
        }
    }
    result
}
