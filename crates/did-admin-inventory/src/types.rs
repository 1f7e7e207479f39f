//! Request and response types for inventory operations.

use chrono::NaiveDate;
use did_admin_import::ColumnMapping;
use did_admin_store::{Company, DialBStatus, Did, DidStatus};
use serde::{Deserialize, Serialize};

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// How many candidate records an import preview returns.
    #[serde(default = "InventoryConfig::default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            preview_rows: Self::default_preview_rows(),
        }
    }
}

impl InventoryConfig {
    const fn default_preview_rows() -> usize {
        5
    }
}

// =============================================================================
// DIDs
// =============================================================================

/// Request to create a DID by hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDidRequest {
    /// The phone number. Required.
    pub did_number: String,
    /// Provider name.
    #[serde(default)]
    pub provider: String,
    /// Trunk id.
    #[serde(rename = "trankId", default)]
    pub trunk_id: String,
    /// Forwarding number.
    #[serde(default)]
    pub did_forward: String,
    /// Owning company code.
    #[serde(rename = "companyId", default)]
    pub company_code: String,
    /// Owning company name.
    #[serde(default)]
    pub company_name: String,
    /// Status, `active` when absent.
    #[serde(default)]
    pub status: Option<DidStatus>,
    /// Assigned date, today when absent.
    #[serde(default)]
    pub assigned_date: Option<NaiveDate>,
}

impl CreateDidRequest {
    /// A request for just a phone number.
    #[must_use]
    pub fn new(did_number: impl Into<String>) -> Self {
        Self {
            did_number: did_number.into(),
            ..Self::default()
        }
    }
}

/// DialB reputation of a DID, looked up by phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialBMatch {
    /// A DialB record marks the number clean.
    Clean,
    /// A DialB record marks the number as spam.
    Spam,
    /// No DialB record for the number.
    Unknown,
}

impl DialBMatch {
    /// The wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "Clean",
            Self::Spam => "Spam",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<DialBStatus> for DialBMatch {
    fn from(status: DialBStatus) -> Self {
        match status {
            DialBStatus::Clean => Self::Clean,
            DialBStatus::Spam => Self::Spam,
        }
    }
}

/// A DID annotated with its DialB reputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidView {
    /// The stored record.
    #[serde(flatten)]
    pub did: Did,
    /// DialB reputation.
    pub dial_b_status: DialBMatch,
}

// =============================================================================
// Import
// =============================================================================

/// Request to import DIDs from a CSV upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    /// Raw CSV text.
    pub csv: String,
    /// Provider applied to every imported DID. Required for import.
    #[serde(default)]
    pub provider: String,
    /// Record id of an existing company to assign.
    #[serde(default)]
    pub company_id: Option<String>,
    /// Name of a company to create and assign.
    #[serde(default)]
    pub new_company_name: Option<String>,
    /// Header choices overriding the automatic mapping.
    #[serde(default)]
    pub mapping: Option<ColumnMapping>,
}

/// What an import would do, computed without writing anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    /// Zero-based index of the detected header row.
    pub header_row: usize,
    /// Detected header names.
    pub headers: Vec<String>,
    /// The mapping that would be used.
    pub mapping: ColumnMapping,
    /// Number of data rows found.
    pub row_count: usize,
    /// The first candidate records.
    pub sample: Vec<Did>,
}

/// Result of an import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    /// Records written to the store.
    pub successful: Vec<Did>,
    /// Records skipped because their number already exists.
    pub duplicates: Vec<Did>,
    /// Candidate rows considered.
    pub total_processed: usize,
    /// `successful.len()`.
    pub success_count: usize,
    /// `duplicates.len()`.
    pub duplicate_count: usize,
    /// The company created for this import, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_company: Option<Company>,
}

// =============================================================================
// Area codes and companies
// =============================================================================

/// Request to create an area code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAreaCodeRequest {
    /// 3-digit code. Required.
    pub code: String,
    /// Region label.
    #[serde(default)]
    pub region: String,
    /// State.
    #[serde(default)]
    pub state: String,
    /// Timezone.
    #[serde(default)]
    pub timezone: String,
}

/// Request to create a company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    /// Business code; generated when absent.
    #[serde(rename = "companyId", default)]
    pub code: Option<String>,
    /// Display name. Required.
    #[serde(rename = "companyName", default)]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// DialB
// =============================================================================

/// Request to create a DialB record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDialBRequest {
    /// Phone number. Required.
    pub phone_number: String,
    /// Group label.
    #[serde(default)]
    pub group: String,
    /// Overall status.
    #[serde(default)]
    pub overall_status: DialBStatus,
    /// T-Mobile flag.
    #[serde(default)]
    pub t_mobile_flag: bool,
    /// AT&T flag.
    #[serde(default)]
    pub att_flag: bool,
    /// Third-party flag.
    #[serde(default)]
    pub third_party_flag: bool,
    /// Last-checked value.
    #[serde(default)]
    pub last_checked: String,
}

/// Carrier whose flag a DialB listing can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Carrier {
    /// T-Mobile.
    #[serde(alias = "tmobile", alias = "t-mobile")]
    TMobile,
    /// AT&T.
    #[serde(alias = "at&t")]
    Att,
    /// Third-party service.
    #[serde(alias = "thirdparty", alias = "3rdparty")]
    ThirdParty,
}

/// Filters for listing DialB records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialBQuery {
    /// Case-insensitive substring of phone number or group.
    #[serde(default)]
    pub search: Option<String>,
    /// Only records with this overall status.
    #[serde(default)]
    pub status: Option<DialBStatus>,
    /// Only records in this group.
    #[serde(default)]
    pub group: Option<String>,
    /// Only records flagged by this carrier.
    #[serde(default)]
    pub carrier: Option<Carrier>,
}

/// Result of a DialB CSV import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialBImportOutcome {
    /// Rows applied (created plus updated).
    pub imported: usize,
    /// New records.
    pub created: usize,
    /// Existing records overwritten by phone number.
    pub updated: usize,
    /// Per-line problems; those lines were skipped.
    pub errors: Vec<String>,
}

/// Summary counts over the DialB store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialBStats {
    /// Number of records.
    pub total: usize,
    /// Records marked clean.
    pub clean: usize,
    /// Records marked spam.
    pub spam: usize,
    /// Records flagged by T-Mobile.
    pub t_mobile_flagged: usize,
    /// Records flagged by AT&T.
    pub att_flagged: usize,
    /// Records flagged by a third party.
    pub third_party_flagged: usize,
    /// Distinct group labels.
    pub groups: usize,
}
