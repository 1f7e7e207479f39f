//! Column auto-mapping from CSV headers to DID fields.
//!
//! Each target field has a list of keyword patterns. A header matches a
//! field when, ignoring case, the header contains a pattern or a pattern
//! contains the header. Headers are tried in file order and the first
//! match wins, so an earlier coarse header ("Primary Trunk") shadows a
//! later one ("Secondary Trunk"). Callers can override any field.

use serde::{Deserialize, Serialize};

/// DID fields that can be filled from a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetField {
    /// The phone number itself.
    DidNumber,
    /// The trunk group identifier.
    TrunkId,
    /// The forwarding number.
    DidForward,
}

impl TargetField {
    /// All mappable fields in mapping order.
    pub const ALL: [Self; 3] = [Self::DidNumber, Self::TrunkId, Self::DidForward];

    /// Keyword patterns for this field.
    #[must_use]
    pub const fn patterns(self) -> &'static [&'static str] {
        match self {
            Self::DidNumber => &["did", "phone", "number", "telephone", "tn", "dn"],
            Self::TrunkId => &[
                "trunk",
                "trank",
                "trunk id",
                "trank id",
                "primary trunk",
                "primary",
                "secondary trunk",
            ],
            Self::DidForward => &[
                "forward",
                "forwarding",
                "destination",
                "target",
                "pstn forward",
                "pstn backup",
                "confirmation to call",
            ],
        }
    }

    /// Whether `header` matches one of this field's patterns.
    #[must_use]
    pub fn matches(self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        if header.is_empty() {
            return false;
        }
        self.patterns()
            .iter()
            .any(|p| header.contains(p) || p.contains(header.as_str()))
    }
}

/// Which CSV header feeds each DID field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    /// Header holding the phone number.
    pub did_number: Option<String>,
    /// Header holding the trunk id.
    #[serde(rename = "trankId")]
    pub trunk_id: Option<String>,
    /// Header holding the forwarding number.
    pub did_forward: Option<String>,
}

impl ColumnMapping {
    /// The header mapped to `field`.
    #[must_use]
    pub fn get(&self, field: TargetField) -> Option<&str> {
        match field {
            TargetField::DidNumber => self.did_number.as_deref(),
            TargetField::TrunkId => self.trunk_id.as_deref(),
            TargetField::DidForward => self.did_forward.as_deref(),
        }
    }

    /// Map `field` to `header`.
    pub fn set(&mut self, field: TargetField, header: Option<String>) {
        let slot = match field {
            TargetField::DidNumber => &mut self.did_number,
            TargetField::TrunkId => &mut self.trunk_id,
            TargetField::DidForward => &mut self.did_forward,
        };
        *slot = header;
    }

    /// Fill every field set in `overrides`, keeping the rest.
    #[must_use]
    pub fn merged_with(mut self, overrides: &Self) -> Self {
        for field in TargetField::ALL {
            if let Some(header) = overrides.get(field) {
                self.set(field, Some(header.to_string()));
            }
        }
        self
    }

    /// Fields with no header assigned.
    #[must_use]
    pub fn unmapped(&self) -> Vec<TargetField> {
        TargetField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }
}

/// Guess the mapping from header names.
#[must_use]
pub fn auto_map<S: AsRef<str>>(headers: &[S]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    for field in TargetField::ALL {
        let found = headers
            .iter()
            .map(AsRef::as_ref)
            .find(|h| field.matches(h))
            .map(ToString::to_string);
        mapping.set(field, found);
    }
    tracing::debug!(?mapping, "Columns auto-mapped");
    mapping
}
