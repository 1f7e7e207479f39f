//! Domain types stored in the record stores.
//!
//! Field names serialize in the camelCase layout used by the persisted JSON
//! arrays (`didNumber`, `trankId`, `companyId`, `totalDIDs`, ...), so blobs
//! written by earlier deployments load unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use did_admin_core::RecordId;
use serde::{Deserialize, Serialize};

use crate::record::{Entity, Record};

// =============================================================================
// DIDs
// =============================================================================

/// A Direct Inward Dial number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Did {
    /// Unique identifier.
    pub id: RecordId,
    /// Carrier or reseller the number was bought from.
    #[serde(default)]
    pub provider: String,
    /// The phone number as entered or imported.
    pub did_number: String,
    /// Trunk group the number is provisioned on.
    #[serde(rename = "trankId", default)]
    pub trunk_id: String,
    /// Forwarding destination.
    #[serde(default)]
    pub did_forward: String,
    /// 3-digit area code derived from `did_number`.
    #[serde(default)]
    pub area_code: String,
    /// State derived from the area code.
    #[serde(default)]
    pub state: String,
    /// Business code of the owning company.
    #[serde(rename = "companyId", default)]
    pub company_code: String,
    /// Display name of the owning company.
    #[serde(default)]
    pub company_name: String,
    /// Provisioning status.
    #[serde(default)]
    pub status: DidStatus,
    /// Date the number was assigned.
    pub assigned_date: NaiveDate,
    /// Date of the last modification.
    pub last_updated: NaiveDate,
}

impl Did {
    /// Create an active DID dated today with no derived fields filled in.
    #[must_use]
    pub fn new(did_number: impl Into<String>) -> Self {
        let today = Utc::now().date_naive();
        Self {
            id: RecordId::generate(Self::ID_PREFIX),
            provider: String::new(),
            did_number: did_number.into(),
            trunk_id: String::new(),
            did_forward: String::new(),
            area_code: String::new(),
            state: String::new(),
            company_code: String::new(),
            company_name: String::new(),
            status: DidStatus::Active,
            assigned_date: today,
            last_updated: today,
        }
    }
}

/// Provisioning status of a DID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DidStatus {
    /// In service.
    #[default]
    Active,
    /// Out of service.
    Inactive,
    /// Awaiting provisioning.
    Pending,
}

impl DidStatus {
    /// The lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for DidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DidStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "pending" => Ok(Self::Pending),
            other => Err(format!("unknown DID status: {other}")),
        }
    }
}

/// Partial update for a [`Did`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidPatch {
    /// New provider.
    pub provider: Option<String>,
    /// New phone number.
    pub did_number: Option<String>,
    /// New trunk id.
    #[serde(rename = "trankId")]
    pub trunk_id: Option<String>,
    /// New forwarding number.
    pub did_forward: Option<String>,
    /// New area code.
    pub area_code: Option<String>,
    /// New state.
    pub state: Option<String>,
    /// New owning company code.
    #[serde(rename = "companyId")]
    pub company_code: Option<String>,
    /// New owning company name.
    pub company_name: Option<String>,
    /// New status.
    pub status: Option<DidStatus>,
    /// New assigned date.
    pub assigned_date: Option<NaiveDate>,
}

impl Record for Did {
    const STORAGE_KEY: &'static str = "didsData";
    const ID_PREFIX: &'static str = "did";
    const ENTITY: Entity = Entity::Did;
    type Patch = DidPatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply_patch(&mut self, patch: DidPatch, now: DateTime<Utc>) {
        merge(&mut self.provider, patch.provider);
        merge(&mut self.did_number, patch.did_number);
        merge(&mut self.trunk_id, patch.trunk_id);
        merge(&mut self.did_forward, patch.did_forward);
        merge(&mut self.area_code, patch.area_code);
        merge(&mut self.state, patch.state);
        merge(&mut self.company_code, patch.company_code);
        merge(&mut self.company_name, patch.company_name);
        merge(&mut self.status, patch.status);
        merge(&mut self.assigned_date, patch.assigned_date);
        self.last_updated = now.date_naive();
    }
}

// =============================================================================
// Area codes
// =============================================================================

/// An area-code lookup entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCode {
    /// Unique identifier.
    pub id: RecordId,
    /// 3-digit numbering-plan code.
    pub code: String,
    /// Region label.
    #[serde(default)]
    pub region: String,
    /// State the code belongs to.
    #[serde(default)]
    pub state: String,
    /// Timezone abbreviation.
    #[serde(default)]
    pub timezone: String,
    /// Number of DIDs with this area code, as of the last recompute.
    #[serde(rename = "totalDIDs", default)]
    pub total_dids: u32,
    /// Number of active DIDs with this area code, as of the last recompute.
    #[serde(rename = "activeDIDs", default)]
    pub active_dids: u32,
}

impl AreaCode {
    /// Create an area code with zero counts.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        region: impl Into<String>,
        state: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::generate(Self::ID_PREFIX),
            code: code.into(),
            region: region.into(),
            state: state.into(),
            timezone: timezone.into(),
            total_dids: 0,
            active_dids: 0,
        }
    }
}

/// Partial update for an [`AreaCode`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCodePatch {
    /// New code.
    pub code: Option<String>,
    /// New region.
    pub region: Option<String>,
    /// New state.
    pub state: Option<String>,
    /// New timezone.
    pub timezone: Option<String>,
    /// New total count.
    #[serde(rename = "totalDIDs")]
    pub total_dids: Option<u32>,
    /// New active count.
    #[serde(rename = "activeDIDs")]
    pub active_dids: Option<u32>,
}

impl Record for AreaCode {
    const STORAGE_KEY: &'static str = "areaCodesData";
    const ID_PREFIX: &'static str = "ac";
    const ENTITY: Entity = Entity::AreaCode;
    type Patch = AreaCodePatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply_patch(&mut self, patch: AreaCodePatch, _now: DateTime<Utc>) {
        merge(&mut self.code, patch.code);
        merge(&mut self.region, patch.region);
        merge(&mut self.state, patch.state);
        merge(&mut self.timezone, patch.timezone);
        merge(&mut self.total_dids, patch.total_dids);
        merge(&mut self.active_dids, patch.active_dids);
    }
}

// =============================================================================
// Companies
// =============================================================================

/// A company that owns DIDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Unique identifier.
    pub id: RecordId,
    /// Business code shown to users (`COMP001`).
    #[serde(rename = "companyId")]
    pub code: String,
    /// Display name.
    #[serde(rename = "companyName")]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Date the company was created.
    pub created_date: NaiveDate,
    /// Date of the last modification.
    pub last_updated: NaiveDate,
}

impl Company {
    /// Create a company dated today.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let today = Utc::now().date_naive();
        Self {
            id: RecordId::generate(Self::ID_PREFIX),
            code: code.into(),
            name: name.into(),
            description: description.into(),
            created_date: today,
            last_updated: today,
        }
    }
}

/// Partial update for a [`Company`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPatch {
    /// New business code.
    #[serde(rename = "companyId")]
    pub code: Option<String>,
    /// New display name.
    #[serde(rename = "companyName")]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl Record for Company {
    const STORAGE_KEY: &'static str = "companiesData";
    const ID_PREFIX: &'static str = "company";
    const ENTITY: Entity = Entity::Company;
    type Patch = CompanyPatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply_patch(&mut self, patch: CompanyPatch, now: DateTime<Utc>) {
        merge(&mut self.code, patch.code);
        merge(&mut self.name, patch.name);
        merge(&mut self.description, patch.description);
        self.last_updated = now.date_naive();
    }
}

// =============================================================================
// DialB
// =============================================================================

/// Overall reputation of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DialBStatus {
    /// Not flagged.
    #[default]
    Clean,
    /// Flagged as spam.
    Spam,
}

impl DialBStatus {
    /// The wire name (`Clean` or `Spam`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "Clean",
            Self::Spam => "Spam",
        }
    }

    /// Parse a CSV cell: `spam` in any case is spam, anything else is clean.
    #[must_use]
    pub fn from_cell(cell: &str) -> Self {
        if cell.trim().eq_ignore_ascii_case("spam") {
            Self::Spam
        } else {
            Self::Clean
        }
    }
}

impl fmt::Display for DialBStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spam/clean flags for one phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialBRecord {
    /// Unique identifier.
    pub id: RecordId,
    /// The phone number as imported.
    pub phone_number: String,
    /// Group label.
    #[serde(default)]
    pub group: String,
    /// Overall status.
    pub overall_status: DialBStatus,
    /// Flagged by T-Mobile.
    #[serde(default)]
    pub t_mobile_flag: bool,
    /// Flagged by AT&T.
    #[serde(default)]
    pub att_flag: bool,
    /// Flagged by a third-party service.
    #[serde(default)]
    pub third_party_flag: bool,
    /// When the flags were last checked, as reported by the source.
    #[serde(default)]
    pub last_checked: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl DialBRecord {
    /// Create a clean, unflagged record for `phone_number`.
    #[must_use]
    pub fn new(phone_number: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::generate(Self::ID_PREFIX),
            phone_number: phone_number.into(),
            group: String::new(),
            overall_status: DialBStatus::Clean,
            t_mobile_flag: false,
            att_flag: false,
            third_party_flag: false,
            last_checked: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a [`DialBRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialBPatch {
    /// New phone number.
    pub phone_number: Option<String>,
    /// New group label.
    pub group: Option<String>,
    /// New overall status.
    pub overall_status: Option<DialBStatus>,
    /// New T-Mobile flag.
    pub t_mobile_flag: Option<bool>,
    /// New AT&T flag.
    pub att_flag: Option<bool>,
    /// New third-party flag.
    pub third_party_flag: Option<bool>,
    /// New last-checked value.
    pub last_checked: Option<String>,
}

impl Record for DialBRecord {
    const STORAGE_KEY: &'static str = "dialBData";
    const ID_PREFIX: &'static str = "dialb";
    const ENTITY: Entity = Entity::DialB;
    type Patch = DialBPatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply_patch(&mut self, patch: DialBPatch, now: DateTime<Utc>) {
        merge(&mut self.phone_number, patch.phone_number);
        merge(&mut self.group, patch.group);
        merge(&mut self.overall_status, patch.overall_status);
        merge(&mut self.t_mobile_flag, patch.t_mobile_flag);
        merge(&mut self.att_flag, patch.att_flag);
        merge(&mut self.third_party_flag, patch.third_party_flag);
        merge(&mut self.last_checked, patch.last_checked);
        self.updated_at = now;
    }
}

fn merge<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn did_serializes_with_legacy_field_names() {
        let mut did = Did::new("12125550100");
        did.trunk_id = "T1".to_string();
        did.company_code = "COMP001".to_string();
        let json = serde_json::to_value(&did).unwrap();

        assert_eq!(json["didNumber"], "12125550100");
        assert_eq!(json["trankId"], "T1");
        assert_eq!(json["companyId"], "COMP001");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn did_loads_from_persisted_json() {
        let json = r#"{
            "id": "1",
            "provider": "Provider A",
            "didNumber": "12125550100",
            "trankId": "T1",
            "didForward": "13105550000",
            "areaCode": "212",
            "state": "NY",
            "companyId": "COMP001",
            "companyName": "Acme",
            "status": "pending",
            "assignedDate": "2024-01-15",
            "lastUpdated": "2024-01-20"
        }"#;
        let did: Did = serde_json::from_str(json).unwrap();
        assert_eq!(did.id.as_str(), "1");
        assert_eq!(did.status, DidStatus::Pending);
        assert_eq!(did.assigned_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn did_patch_merges_and_stamps() {
        let mut did = Did::new("12125550100");
        did.last_updated = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let now = Utc::now();

        did.apply_patch(
            DidPatch {
                status: Some(DidStatus::Inactive),
                ..DidPatch::default()
            },
            now,
        );

        assert_eq!(did.status, DidStatus::Inactive);
        assert_eq!(did.did_number, "12125550100");
        assert_eq!(did.last_updated, now.date_naive());
    }

    #[test]
    fn area_code_counts_use_legacy_names() {
        let ac = AreaCode::new("212", "New York Region", "NY", "EST");
        let json = serde_json::to_value(&ac).unwrap();
        assert_eq!(json["totalDIDs"], 0);
        assert_eq!(json["activeDIDs"], 0);
    }

    #[test]
    fn company_serializes_code_and_name() {
        let company = Company::new("COMP001", "Acme", "");
        let json = serde_json::to_value(&company).unwrap();
        assert_eq!(json["companyId"], "COMP001");
        assert_eq!(json["companyName"], "Acme");
    }

    #[test]
    fn dialb_status_parsing() {
        assert_eq!(DialBStatus::from_cell("SPAM"), DialBStatus::Spam);
        assert_eq!(DialBStatus::from_cell(" spam "), DialBStatus::Spam);
        assert_eq!(DialBStatus::from_cell("Clean"), DialBStatus::Clean);
        assert_eq!(DialBStatus::from_cell("whatever"), DialBStatus::Clean);
    }

    #[test]
    fn did_status_from_str() {
        assert_eq!("Active".parse::<DidStatus>().unwrap(), DidStatus::Active);
        assert!("retired".parse::<DidStatus>().is_err());
    }
}
