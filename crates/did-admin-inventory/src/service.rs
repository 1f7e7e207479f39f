//! Inventory service implementation.
//!
//! This module provides the `Inventory` trait and the `InventoryService`
//! implementation that owns the four record stores and coordinates the
//! operations that span them (imports, area-code state sync, DialB
//! annotation).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use did_admin_core::phone;
use did_admin_import::{csv, header, mapping, ColumnMapping, SanitizedCsv, TargetField};
use did_admin_store::{
    AreaCode, AreaCodePatch, BlobStore, ChangeEvent, Company, CompanyPatch, DialBPatch,
    DialBRecord, Did, DidPatch, Entity, RecordStore,
};
use tokio::sync::{broadcast, Mutex};

use crate::area_codes::{self, StateLookup};
use crate::dialb::{self, MatchIndex};
use crate::error::{InventoryError, Result};
use crate::export;
use crate::import::{self, ImportContext};
use crate::types::{
    CreateAreaCodeRequest, CreateCompanyRequest, CreateDialBRequest, CreateDidRequest,
    DialBImportOutcome, DialBQuery, DialBStats, DidView, ImportOutcome, ImportPreview,
    ImportRequest, InventoryConfig,
};
use crate::view::{self, ViewQuery};

/// Trait defining the inventory operations.
///
/// This is the complete API the HTTP gateway serves. Implementations own
/// the record stores and keep derived fields (area code, state) in sync.
#[async_trait]
pub trait Inventory: Send + Sync {
    // =========================================================================
    // DID Operations
    // =========================================================================

    /// List DIDs annotated with DialB status, filtered and sorted.
    async fn list_dids(&self, query: &ViewQuery) -> Result<Vec<DidView>>;

    /// Distinct values of a DID column, for filter menus.
    async fn did_column_values(&self, column: &str) -> Result<Vec<String>>;

    /// Get one DID.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::NotFound` if the DID doesn't exist.
    async fn get_did(&self, id: &str) -> Result<DidView>;

    /// Create a DID by hand. Area code and state are derived from the number.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Validation` if the number is missing.
    async fn create_did(&self, request: CreateDidRequest) -> Result<Did>;

    /// Merge a partial update into a DID.
    ///
    /// A new number re-derives area code and state unless the patch sets
    /// them too.
    async fn update_did(&self, id: &str, patch: DidPatch) -> Result<Did>;

    /// Delete a DID.
    async fn delete_did(&self, id: &str) -> Result<()>;

    /// Delete several DIDs. Returns how many were removed.
    async fn delete_dids(&self, ids: &[String]) -> Result<usize>;

    /// Apply one patch to several DIDs. Returns how many were updated.
    async fn update_dids(&self, ids: &[String], patch: DidPatch) -> Result<usize>;

    // =========================================================================
    // Import and Export
    // =========================================================================

    /// Parse and map an upload without writing anything.
    async fn preview_import(&self, request: ImportRequest) -> Result<ImportPreview>;

    /// Import DIDs from CSV, skipping numbers that already exist.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Import` for unreadable files and
    /// `InventoryError::Validation` for a missing provider or an unmapped
    /// DID-number column. Nothing is written in either case.
    async fn import_dids(&self, request: ImportRequest) -> Result<ImportOutcome>;

    /// Grouped export of the DIDs matching `query`.
    async fn export_all_dids(&self, query: &ViewQuery) -> Result<String>;

    /// Numbers-only export of the DIDs matching `query`.
    async fn export_did_numbers(&self, query: &ViewQuery) -> Result<String>;

    /// Grouped export of the listed DIDs that also match `query`.
    async fn export_selected_dids(&self, query: &ViewQuery, ids: &[String]) -> Result<String>;

    // =========================================================================
    // Area Code Operations
    // =========================================================================

    /// List area codes.
    async fn list_area_codes(&self, query: &ViewQuery) -> Result<Vec<AreaCode>>;

    /// Get one area code.
    async fn get_area_code(&self, id: &str) -> Result<AreaCode>;

    /// Create an area code and rewrite the state of DIDs using it.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Conflict` if the code already exists.
    async fn create_area_code(&self, request: CreateAreaCodeRequest) -> Result<AreaCode>;

    /// Update an area code; a state or code change rewrites DID states.
    async fn update_area_code(&self, id: &str, patch: AreaCodePatch) -> Result<AreaCode>;

    /// Delete an area code. DIDs still holding the state it mapped to are cleared.
    async fn delete_area_code(&self, id: &str) -> Result<()>;

    /// Replace the whole area-code table.
    async fn replace_area_codes(&self, requests: Vec<CreateAreaCodeRequest>) -> Result<usize>;

    /// Upsert area codes from an `Area Code,State` CSV file.
    async fn import_area_codes(&self, text: &str) -> Result<usize>;

    /// Recompute DID counts on every area code. Returns how many changed.
    async fn recompute_area_code_counts(&self) -> Result<usize>;

    /// Rewrite DID states from the lookup table. DIDs whose area code has no
    /// mapped state are left alone. Returns how many changed.
    async fn sync_did_states(&self) -> Result<usize>;

    /// DIDs whose area code is `code`.
    async fn dids_for_area_code(&self, code: &str) -> Result<Vec<Did>>;

    // =========================================================================
    // Company Operations
    // =========================================================================

    /// List companies.
    async fn list_companies(&self, query: &ViewQuery) -> Result<Vec<Company>>;

    /// Get one company.
    async fn get_company(&self, id: &str) -> Result<Company>;

    /// Create a company, generating a code when none is given.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Conflict` if the code is taken.
    async fn create_company(&self, request: CreateCompanyRequest) -> Result<Company>;

    /// Update a company.
    async fn update_company(&self, id: &str, patch: CompanyPatch) -> Result<Company>;

    /// Delete a company. DIDs keep their stored company fields.
    async fn delete_company(&self, id: &str) -> Result<()>;

    /// Replace the whole company list.
    async fn replace_companies(&self, requests: Vec<CreateCompanyRequest>) -> Result<usize>;

    // =========================================================================
    // DialB Operations
    // =========================================================================

    /// List DialB records matching the filters.
    async fn list_dialb(&self, query: &DialBQuery) -> Result<Vec<DialBRecord>>;

    /// Get one DialB record.
    async fn get_dialb(&self, id: &str) -> Result<DialBRecord>;

    /// Find a DialB record by exact phone number.
    async fn find_dialb_by_phone(&self, phone_number: &str) -> Result<Option<DialBRecord>>;

    /// Create a DialB record.
    async fn create_dialb(&self, request: CreateDialBRequest) -> Result<DialBRecord>;

    /// Update a DialB record.
    async fn update_dialb(&self, id: &str, patch: DialBPatch) -> Result<DialBRecord>;

    /// Delete a DialB record.
    async fn delete_dialb(&self, id: &str) -> Result<()>;

    /// Delete several DialB records. Returns how many were removed.
    async fn delete_dialbs(&self, ids: &[String]) -> Result<usize>;

    /// Import DialB flags from CSV, upserting by phone number.
    async fn import_dialb(&self, text: &str) -> Result<DialBImportOutcome>;

    /// Export every DialB record as CSV.
    async fn export_dialb(&self) -> Result<String>;

    /// Summary counts over the DialB records.
    async fn dialb_stats(&self) -> Result<DialBStats>;

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Subscribe to changes of one record store.
    fn subscribe(&self, entity: Entity) -> broadcast::Receiver<ChangeEvent>;
}

/// The main inventory service implementation.
pub struct InventoryService {
    dids: RecordStore<Did>,
    area_codes: RecordStore<AreaCode>,
    companies: RecordStore<Company>,
    dialb: RecordStore<DialBRecord>,
    config: InventoryConfig,
    // Serializes multi-step mutations (check-then-write, cross-store sync).
    writes: Mutex<()>,
}

impl InventoryService {
    /// Create a new inventory service over a blob store.
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>, config: InventoryConfig) -> Self {
        Self {
            dids: RecordStore::open(blobs.clone()),
            area_codes: RecordStore::open(blobs.clone()),
            companies: RecordStore::open(blobs.clone()),
            dialb: RecordStore::open(blobs),
            config,
            writes: Mutex::new(()),
        }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults(blobs: Arc<dyn BlobStore>) -> Self {
        Self::new(blobs, InventoryConfig::default())
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &InventoryConfig {
        &self.config
    }

    fn lookup(&self) -> StateLookup {
        StateLookup::build(&self.area_codes.list())
    }

    fn annotate(&self, dids: Vec<Did>) -> Vec<DidView> {
        let index = MatchIndex::build(&self.dialb.list());
        dids.into_iter()
            .map(|did| {
                let dial_b_status = index.lookup(&did.did_number);
                DidView { did, dial_b_status }
            })
            .collect()
    }

    fn filtered_dids(&self, query: &ViewQuery) -> Vec<Did> {
        query
            .apply(&self.annotate(self.dids.list()))
            .into_iter()
            .map(|v| v.did)
            .collect()
    }

    /// Re-derive DID states from the current area-code table.
    ///
    /// A DID whose code has no mapped state keeps its state, unless
    /// `previous` mapped that code to exactly the state it holds. Such a
    /// leftover is cleared.
    fn resync_states(&self, previous: Option<&StateLookup>) -> usize {
        let lookup = self.lookup();
        let changed = self.dids.update_where(|did| {
            let target = match lookup.get(&did.area_code) {
                Some(state) => state,
                None => match previous.and_then(|p| p.get(&did.area_code)) {
                    Some(stale) if stale == did.state => "",
                    _ => return false,
                },
            };
            if did.state == target {
                false
            } else {
                did.state = target.to_string();
                true
            }
        });
        if changed > 0 {
            tracing::info!(count = changed, "Synced DID states");
        }
        changed
    }

    fn ensure_area_code_free(&self, code: &str, except: Option<&str>) -> Result<()> {
        let taken = self
            .area_codes
            .find(|ac| ac.code == code && Some(ac.id.as_str()) != except);
        match taken {
            Some(_) => Err(InventoryError::Conflict(format!(
                "area code {code} already exists"
            ))),
            None => Ok(()),
        }
    }

    fn ensure_company_code_free(&self, code: &str, except: Option<&str>) -> Result<()> {
        let taken = self
            .companies
            .find(|c| c.code == code && Some(c.id.as_str()) != except);
        match taken {
            Some(_) => Err(InventoryError::Conflict(format!(
                "company code {code} already exists"
            ))),
            None => Ok(()),
        }
    }

    /// Parse, sanitize and map an upload.
    fn prepare_import(request: &ImportRequest) -> Result<(SanitizedCsv, ColumnMapping)> {
        let rows = csv::parse_rows(&request.csv);
        let sheet = header::sanitize(&rows)?;
        let mut map = mapping::auto_map(&sheet.headers);
        if let Some(overrides) = &request.mapping {
            map = map.merged_with(overrides);
        }

        for field in TargetField::ALL {
            if let Some(h) = map.get(field) {
                if !sheet.headers.iter().any(|known| known == h) {
                    return Err(InventoryError::Validation(format!(
                        "mapped column {h:?} is not in the file"
                    )));
                }
            }
        }
        Ok((sheet, map))
    }

    /// Company code and name for an import, without creating anything.
    fn import_company(&self, request: &ImportRequest) -> Result<(String, String)> {
        if let Some(id) = request.company_id.as_deref().filter(|s| !s.is_empty()) {
            let company = self
                .companies
                .get(id)
                .ok_or_else(|| InventoryError::not_found(Entity::Company, id))?;
            return Ok((company.code, company.name));
        }
        match request.new_company_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok((generated_company_code(), name.to_string())),
            _ => Ok((String::new(), String::new())),
        }
    }
}

fn generated_company_code() -> String {
    format!("COMP-{}", Utc::now().timestamp_millis())
}

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InventoryError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

#[async_trait]
impl Inventory for InventoryService {
    // =========================================================================
    // DID Operations
    // =========================================================================

    async fn list_dids(&self, query: &ViewQuery) -> Result<Vec<DidView>> {
        let rows = query.apply(&self.annotate(self.dids.list()));
        tracing::debug!(count = rows.len(), "Listed DIDs");
        Ok(rows)
    }

    async fn did_column_values(&self, column: &str) -> Result<Vec<String>> {
        Ok(view::distinct_values(
            &self.annotate(self.dids.list()),
            column,
        ))
    }

    async fn get_did(&self, id: &str) -> Result<DidView> {
        let did = self
            .dids
            .get(id)
            .ok_or_else(|| InventoryError::not_found(Entity::Did, id))?;
        let dial_b_status = MatchIndex::build(&self.dialb.list()).lookup(&did.did_number);
        Ok(DidView { did, dial_b_status })
    }

    async fn create_did(&self, request: CreateDidRequest) -> Result<Did> {
        let number = required(&request.did_number, "didNumber")?;
        let mut did = Did::new(number);
        did.provider = request.provider;
        did.trunk_id = request.trunk_id;
        did.did_forward = request.did_forward;
        did.company_code = request.company_code;
        did.company_name = request.company_name;
        if let Some(status) = request.status {
            did.status = status;
        }
        if let Some(date) = request.assigned_date {
            did.assigned_date = date;
        }
        did.area_code = phone::area_code(&did.did_number);
        did.state = self.lookup().state_for(&did.area_code);

        let did = self.dids.add(did);
        tracing::info!(id = %did.id, number = %did.did_number, "Created DID");
        Ok(did)
    }

    async fn update_did(&self, id: &str, mut patch: DidPatch) -> Result<Did> {
        if let Some(number) = &patch.did_number {
            let derived = phone::area_code(number);
            if patch.state.is_none() {
                let code = patch.area_code.as_deref().unwrap_or(&derived);
                patch.state = Some(self.lookup().state_for(code));
            }
            if patch.area_code.is_none() {
                patch.area_code = Some(derived);
            }
        }
        Ok(self.dids.update(id, patch)?)
    }

    async fn delete_did(&self, id: &str) -> Result<()> {
        self.dids.delete(id)?;
        Ok(())
    }

    async fn delete_dids(&self, ids: &[String]) -> Result<usize> {
        Ok(self.dids.delete_many(ids))
    }

    async fn update_dids(&self, ids: &[String], patch: DidPatch) -> Result<usize> {
        if patch.did_number.is_some() {
            return Err(InventoryError::Validation(
                "didNumber cannot be bulk-updated".into(),
            ));
        }
        Ok(self.dids.update_many(ids, &patch))
    }

    // =========================================================================
    // Import and Export
    // =========================================================================

    async fn preview_import(&self, request: ImportRequest) -> Result<ImportPreview> {
        let (sheet, map) = Self::prepare_import(&request)?;
        let (company_code, company_name) = self.import_company(&request)?;
        let lookup = self.lookup();
        let ctx = ImportContext {
            provider: request.provider.trim().to_string(),
            company_code,
            company_name,
            today: Utc::now().date_naive(),
        };
        let head = &sheet.rows[..sheet.rows.len().min(self.config.preview_rows)];
        let sample = import::build_candidates(head, &map, &ctx, |c| lookup.state_for(c));

        Ok(ImportPreview {
            header_row: sheet.header_row,
            headers: sheet.headers,
            mapping: map,
            row_count: sheet.rows.len(),
            sample,
        })
    }

    async fn import_dids(&self, request: ImportRequest) -> Result<ImportOutcome> {
        let (sheet, map) = Self::prepare_import(&request)?;
        let provider = required(&request.provider, "provider")?;
        if map.get(TargetField::DidNumber).is_none() {
            return Err(InventoryError::Validation(
                "no column is mapped to didNumber".into(),
            ));
        }

        let _guard = self.writes.lock().await;
        let (company_code, company_name) = self.import_company(&request)?;

        let created_company = if request.company_id.as_deref().is_some_and(|s| !s.is_empty())
            || company_name.is_empty()
        {
            None
        } else {
            self.ensure_company_code_free(&company_code, None)?;
            let today = Utc::now().date_naive();
            let company = self.companies.add(Company::new(
                company_code.clone(),
                company_name.clone(),
                format!("Company created during DID import - {today}"),
            ));
            tracing::info!(id = %company.id, code = %company.code, "Created company during import");
            Some(company)
        };

        let lookup = self.lookup();
        let ctx = ImportContext {
            provider,
            company_code,
            company_name,
            today: Utc::now().date_naive(),
        };
        let candidates = import::build_candidates(&sheet.rows, &map, &ctx, |c| lookup.state_for(c));
        let total_processed = candidates.len();

        let existing = self.dids.list();
        let split = import::partition(existing.iter().map(|d| d.did_number.as_str()), candidates);
        let successful = self.dids.add_many(split.accepted);
        let duplicates = split.duplicates;

        tracing::info!(
            total = total_processed,
            accepted = successful.len(),
            duplicates = duplicates.len(),
            "Imported DIDs"
        );

        Ok(ImportOutcome {
            success_count: successful.len(),
            duplicate_count: duplicates.len(),
            successful,
            duplicates,
            total_processed,
            created_company,
        })
    }

    async fn export_all_dids(&self, query: &ViewQuery) -> Result<String> {
        Ok(export::all_dids(&self.filtered_dids(query)))
    }

    async fn export_did_numbers(&self, query: &ViewQuery) -> Result<String> {
        Ok(export::numbers_only(&self.filtered_dids(query)))
    }

    async fn export_selected_dids(&self, query: &ViewQuery, ids: &[String]) -> Result<String> {
        let mut selected = self.filtered_dids(query);
        selected.retain(|d| ids.iter().any(|id| id == d.id.as_str()));
        Ok(export::selected_dids(&selected))
    }

    // =========================================================================
    // Area Code Operations
    // =========================================================================

    async fn list_area_codes(&self, query: &ViewQuery) -> Result<Vec<AreaCode>> {
        Ok(query.apply(&self.area_codes.list()))
    }

    async fn get_area_code(&self, id: &str) -> Result<AreaCode> {
        self.area_codes
            .get(id)
            .ok_or_else(|| InventoryError::not_found(Entity::AreaCode, id))
    }

    async fn create_area_code(&self, request: CreateAreaCodeRequest) -> Result<AreaCode> {
        let code = required(&request.code, "code")?;
        let _guard = self.writes.lock().await;
        self.ensure_area_code_free(&code, None)?;

        let area_code = self.area_codes.add(AreaCode::new(
            code,
            request.region,
            request.state,
            request.timezone,
        ));
        self.resync_states(None);
        tracing::info!(id = %area_code.id, code = %area_code.code, "Created area code");
        Ok(area_code)
    }

    async fn update_area_code(&self, id: &str, patch: AreaCodePatch) -> Result<AreaCode> {
        let _guard = self.writes.lock().await;
        let before = self
            .area_codes
            .get(id)
            .ok_or_else(|| InventoryError::not_found(Entity::AreaCode, id))?;
        if let Some(code) = &patch.code {
            if code.trim().is_empty() {
                return Err(InventoryError::Validation("code is required".into()));
            }
            self.ensure_area_code_free(code, Some(id))?;
        }

        let previous = self.lookup();
        let after = self.area_codes.update(id, patch)?;
        if after.state != before.state || after.code != before.code {
            self.resync_states(Some(&previous));
        }
        Ok(after)
    }

    async fn delete_area_code(&self, id: &str) -> Result<()> {
        let _guard = self.writes.lock().await;
        let previous = self.lookup();
        let removed = self.area_codes.delete(id)?;
        self.resync_states(Some(&previous));
        tracing::info!(id = %removed.id, code = %removed.code, "Deleted area code");
        Ok(())
    }

    async fn replace_area_codes(&self, requests: Vec<CreateAreaCodeRequest>) -> Result<usize> {
        let mut seen = std::collections::HashSet::new();
        let mut records = Vec::with_capacity(requests.len());
        for request in requests {
            let code = required(&request.code, "code")?;
            if !seen.insert(code.clone()) {
                return Err(InventoryError::Conflict(format!(
                    "area code {code} appears more than once"
                )));
            }
            records.push(AreaCode::new(
                code,
                request.region,
                request.state,
                request.timezone,
            ));
        }
        let _guard = self.writes.lock().await;
        let previous = self.lookup();
        let replaced = self.area_codes.replace_all(records);
        self.resync_states(Some(&previous));
        Ok(replaced)
    }

    async fn import_area_codes(&self, text: &str) -> Result<usize> {
        let parsed = area_codes::parse_csv(text)?;
        let _guard = self.writes.lock().await;
        let previous = self.lookup();

        let mut imported = 0;
        for incoming in parsed {
            let patch = AreaCodePatch {
                region: Some(incoming.region.clone()),
                state: Some(incoming.state.clone()),
                timezone: Some(incoming.timezone.clone()),
                ..AreaCodePatch::default()
            };
            let code = incoming.code.clone();
            match self.area_codes.find(|ac| ac.code == code) {
                Some(existing) => {
                    self.area_codes.update(existing.id.as_str(), patch)?;
                }
                None => {
                    self.area_codes.add(incoming);
                }
            }
            imported += 1;
        }
        self.resync_states(Some(&previous));
        tracing::info!(count = imported, "Imported area codes");
        Ok(imported)
    }

    async fn recompute_area_code_counts(&self) -> Result<usize> {
        let dids = self.dids.list();
        let counts = area_codes::count_dids(&dids);
        let changed = self.area_codes.update_where(|ac| {
            let (total, active) = counts.get(ac.code.as_str()).copied().unwrap_or_default();
            if ac.total_dids == total && ac.active_dids == active {
                false
            } else {
                ac.total_dids = total;
                ac.active_dids = active;
                true
            }
        });
        tracing::info!(changed, "Recomputed area code counts");
        Ok(changed)
    }

    async fn sync_did_states(&self) -> Result<usize> {
        let _guard = self.writes.lock().await;
        let changed = self.resync_states(None);
        tracing::info!(changed, "Synced all DID states");
        Ok(changed)
    }

    async fn dids_for_area_code(&self, code: &str) -> Result<Vec<Did>> {
        Ok(self.dids.filter(|d| d.area_code == code))
    }

    // =========================================================================
    // Company Operations
    // =========================================================================

    async fn list_companies(&self, query: &ViewQuery) -> Result<Vec<Company>> {
        Ok(query.apply(&self.companies.list()))
    }

    async fn get_company(&self, id: &str) -> Result<Company> {
        self.companies
            .get(id)
            .ok_or_else(|| InventoryError::not_found(Entity::Company, id))
    }

    async fn create_company(&self, request: CreateCompanyRequest) -> Result<Company> {
        let name = required(&request.name, "companyName")?;
        let code = request
            .code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map_or_else(generated_company_code, ToString::to_string);

        let _guard = self.writes.lock().await;
        self.ensure_company_code_free(&code, None)?;
        let company = self
            .companies
            .add(Company::new(code, name, request.description));
        tracing::info!(id = %company.id, code = %company.code, "Created company");
        Ok(company)
    }

    async fn update_company(&self, id: &str, patch: CompanyPatch) -> Result<Company> {
        let _guard = self.writes.lock().await;
        if let Some(code) = &patch.code {
            if code.trim().is_empty() {
                return Err(InventoryError::Validation("companyId is required".into()));
            }
            self.ensure_company_code_free(code, Some(id))?;
        }
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(InventoryError::Validation("companyName is required".into()));
        }
        Ok(self.companies.update(id, patch)?)
    }

    async fn delete_company(&self, id: &str) -> Result<()> {
        self.companies.delete(id)?;
        Ok(())
    }

    async fn replace_companies(&self, requests: Vec<CreateCompanyRequest>) -> Result<usize> {
        let mut seen = std::collections::HashSet::new();
        let mut records = Vec::with_capacity(requests.len());
        for request in requests {
            let name = required(&request.name, "companyName")?;
            let code = required(request.code.as_deref().unwrap_or_default(), "companyId")?;
            if !seen.insert(code.clone()) {
                return Err(InventoryError::Conflict(format!(
                    "company code {code} appears more than once"
                )));
            }
            records.push(Company::new(code, name, request.description));
        }
        let _guard = self.writes.lock().await;
        Ok(self.companies.replace_all(records))
    }

    // =========================================================================
    // DialB Operations
    // =========================================================================

    async fn list_dialb(&self, query: &DialBQuery) -> Result<Vec<DialBRecord>> {
        Ok(self.dialb.filter(|r| dialb::matches_query(r, query)))
    }

    async fn get_dialb(&self, id: &str) -> Result<DialBRecord> {
        self.dialb
            .get(id)
            .ok_or_else(|| InventoryError::not_found(Entity::DialB, id))
    }

    async fn find_dialb_by_phone(&self, phone_number: &str) -> Result<Option<DialBRecord>> {
        Ok(self.dialb.find(|r| r.phone_number == phone_number))
    }

    async fn create_dialb(&self, request: CreateDialBRequest) -> Result<DialBRecord> {
        let phone_number = required(&request.phone_number, "phoneNumber")?;
        let mut record = DialBRecord::new(phone_number);
        record.group = request.group;
        record.overall_status = request.overall_status;
        record.t_mobile_flag = request.t_mobile_flag;
        record.att_flag = request.att_flag;
        record.third_party_flag = request.third_party_flag;
        record.last_checked = request.last_checked;
        Ok(self.dialb.add(record))
    }

    async fn update_dialb(&self, id: &str, patch: DialBPatch) -> Result<DialBRecord> {
        Ok(self.dialb.update(id, patch)?)
    }

    async fn delete_dialb(&self, id: &str) -> Result<()> {
        self.dialb.delete(id)?;
        Ok(())
    }

    async fn delete_dialbs(&self, ids: &[String]) -> Result<usize> {
        Ok(self.dialb.delete_many(ids))
    }

    async fn import_dialb(&self, text: &str) -> Result<DialBImportOutcome> {
        let (rows, errors) = dialb::parse_import(text)?;
        let _guard = self.writes.lock().await;

        let mut existing = self.dialb.list();
        let now = Utc::now();
        let mut outcome = DialBImportOutcome {
            errors,
            ..DialBImportOutcome::default()
        };

        for row in rows {
            let position = existing.iter().position(|r| r.phone_number == row.phone_number);
            match position {
                Some(i) => {
                    let record = &mut existing[i];
                    record.group = row.group;
                    record.overall_status = row.overall_status;
                    record.t_mobile_flag = row.t_mobile_flag;
                    record.att_flag = row.att_flag;
                    record.third_party_flag = row.third_party_flag;
                    record.last_checked = row.last_checked;
                    record.updated_at = now;
                    outcome.updated += 1;
                }
                None => {
                    let mut record = DialBRecord::new(row.phone_number);
                    record.group = row.group;
                    record.overall_status = row.overall_status;
                    record.t_mobile_flag = row.t_mobile_flag;
                    record.att_flag = row.att_flag;
                    record.third_party_flag = row.third_party_flag;
                    record.last_checked = row.last_checked;
                    existing.push(record);
                    outcome.created += 1;
                }
            }
            outcome.imported += 1;
        }

        self.dialb.replace_all(existing);
        tracing::info!(
            imported = outcome.imported,
            created = outcome.created,
            updated = outcome.updated,
            errors = outcome.errors.len(),
            "Imported DialB records"
        );
        Ok(outcome)
    }

    async fn export_dialb(&self) -> Result<String> {
        Ok(dialb::to_csv(&self.dialb.list()))
    }

    async fn dialb_stats(&self) -> Result<DialBStats> {
        Ok(dialb::stats(&self.dialb.list()))
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    fn subscribe(&self, entity: Entity) -> broadcast::Receiver<ChangeEvent> {
        match entity {
            Entity::Did => self.dids.subscribe(),
            Entity::AreaCode => self.area_codes.subscribe(),
            Entity::Company => self.companies.subscribe(),
            Entity::DialB => self.dialb.subscribe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DialBMatch;
    use crate::view::{ColumnFilters, SortDirection, SortSpec};
    use did_admin_store::{ChangeKind, DialBStatus, DidStatus, MemoryBlobStore, RocksBlobStore};
    use tempfile::TempDir;

    const PHONES: &str = "Phone,Trunk,Forward\n\
                          2125550100,T1,6465550100\n\
                          3125550101,T2,\n\
                          2135550102,T1,(646) 555-0199\n";

    fn setup() -> (InventoryService, TempDir) {
        let dir = TempDir::new().unwrap();
        let blobs = Arc::new(RocksBlobStore::open(dir.path()).unwrap());
        (InventoryService::with_defaults(blobs), dir)
    }

    fn memory() -> InventoryService {
        InventoryService::with_defaults(Arc::new(MemoryBlobStore::new()))
    }

    fn import(csv: &str) -> ImportRequest {
        ImportRequest {
            csv: csv.to_string(),
            provider: "Bandwidth".into(),
            ..ImportRequest::default()
        }
    }

    fn area(code: &str, state: &str) -> CreateAreaCodeRequest {
        CreateAreaCodeRequest {
            code: code.into(),
            region: "Northeast".into(),
            state: state.into(),
            timezone: "EST".into(),
        }
    }

    async fn state_of(svc: &InventoryService, did: &Did) -> String {
        svc.get_did(did.id.as_str()).await.unwrap().did.state
    }

    #[tokio::test]
    async fn import_then_reimport_reports_duplicates() {
        let (svc, _dir) = setup();

        let first = svc.import_dids(import(PHONES)).await.unwrap();
        assert_eq!(first.success_count, 3);
        assert_eq!(first.duplicate_count, 0);
        assert_eq!(first.total_processed, 3);
        assert_eq!(svc.list_dids(&ViewQuery::default()).await.unwrap().len(), 3);

        let second = svc.import_dids(import(PHONES)).await.unwrap();
        assert_eq!(second.success_count, 0);
        assert_eq!(second.duplicate_count, 3);
        assert_eq!(svc.list_dids(&ViewQuery::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn imported_fields_are_mapped_and_derived() {
        let svc = memory();
        svc.create_area_code(area("212", "New York")).await.unwrap();

        let outcome = svc.import_dids(import(PHONES)).await.unwrap();
        let first = &outcome.successful[0];
        assert_eq!(first.did_number, "2125550100");
        assert_eq!(first.trunk_id, "T1");
        assert_eq!(first.did_forward, "16465550100");
        assert_eq!(first.area_code, "212");
        assert_eq!(first.state, "New York");
        assert_eq!(first.provider, "Bandwidth");
        assert_eq!(first.status, DidStatus::Active);
        assert_eq!(outcome.successful[1].state, "");
    }

    #[tokio::test]
    async fn import_without_provider_writes_nothing() {
        let svc = memory();
        let mut request = import(PHONES);
        request.provider = "  ".into();
        request.new_company_name = Some("Acme".into());

        let err = svc.import_dids(request).await.unwrap_err();
        assert_eq!(err.http_status_code(), 400);
        assert!(svc.list_dids(&ViewQuery::default()).await.unwrap().is_empty());
        assert!(svc.list_companies(&ViewQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn import_of_unreadable_file_is_rejected() {
        let svc = memory();
        let err = svc.import_dids(import("just,two\n1,2\n")).await.unwrap_err();
        assert!(matches!(err, InventoryError::Import(_)));
        assert_eq!(err.http_status_code(), 400);
    }

    #[tokio::test]
    async fn import_requires_a_mapped_number_column() {
        let svc = memory();
        let csv = "Name,Trunk,Forward\nAlice,T1,6465550100\n";
        let err = svc.import_dids(import(csv)).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[tokio::test]
    async fn import_rejects_override_naming_unknown_column() {
        let svc = memory();
        let mut request = import(PHONES);
        request.mapping = Some(ColumnMapping {
            did_number: Some("Nope".into()),
            ..ColumnMapping::default()
        });
        let err = svc.import_dids(request).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[tokio::test]
    async fn import_with_new_company_creates_it() {
        let svc = memory();
        let mut request = import(PHONES);
        request.new_company_name = Some("Acme Telecom".into());

        let outcome = svc.import_dids(request).await.unwrap();
        let company = outcome.created_company.unwrap();
        assert!(company.code.starts_with("COMP-"));
        assert!(company
            .description
            .starts_with("Company created during DID import - "));
        assert!(outcome
            .successful
            .iter()
            .all(|d| d.company_code == company.code && d.company_name == "Acme Telecom"));
        assert_eq!(svc.list_companies(&ViewQuery::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn import_with_existing_company_uses_its_code() {
        let svc = memory();
        let company = svc
            .create_company(CreateCompanyRequest {
                code: Some("ACME".into()),
                name: "Acme".into(),
                description: String::new(),
            })
            .await
            .unwrap();
        let mut request = import(PHONES);
        request.company_id = Some(company.id.to_string());

        let outcome = svc.import_dids(request).await.unwrap();
        assert!(outcome.created_company.is_none());
        assert!(outcome.successful.iter().all(|d| d.company_code == "ACME"));
    }

    #[tokio::test]
    async fn import_with_missing_company_is_not_found() {
        let svc = memory();
        let mut request = import(PHONES);
        request.company_id = Some("company-missing".into());
        let err = svc.import_dids(request).await.unwrap_err();
        assert_eq!(err.http_status_code(), 404);
        assert!(svc.list_dids(&ViewQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn preview_writes_nothing() {
        let svc = memory();
        let preview = svc.preview_import(import(PHONES)).await.unwrap();
        assert_eq!(preview.row_count, 3);
        assert_eq!(preview.headers, vec!["Phone", "Trunk", "Forward"]);
        assert_eq!(preview.mapping.did_number.as_deref(), Some("Phone"));
        assert_eq!(preview.sample.len(), 3);
        assert!(svc.list_dids(&ViewQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_did_derives_area_and_state() {
        let svc = memory();
        svc.create_area_code(area("212", "New York")).await.unwrap();

        let did = svc
            .create_did(CreateDidRequest::new("+1 (212) 555-0100"))
            .await
            .unwrap();
        assert_eq!(did.area_code, "212");
        assert_eq!(did.state, "New York");
        assert!(did.id.as_str().starts_with("did-"));

        let err = svc.create_did(CreateDidRequest::new(" ")).await.unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[tokio::test]
    async fn update_did_rederives_on_number_change() {
        let svc = memory();
        svc.create_area_code(area("312", "Illinois")).await.unwrap();
        let did = svc.create_did(CreateDidRequest::new("2125550100")).await.unwrap();

        let patch = DidPatch {
            did_number: Some("3125550100".into()),
            ..DidPatch::default()
        };
        let updated = svc.update_did(did.id.as_str(), patch).await.unwrap();
        assert_eq!(updated.area_code, "312");
        assert_eq!(updated.state, "Illinois");

        let patch = DidPatch {
            did_number: Some("2125550100".into()),
            state: Some("Manual".into()),
            ..DidPatch::default()
        };
        let updated = svc.update_did(did.id.as_str(), patch).await.unwrap();
        assert_eq!(updated.area_code, "212");
        assert_eq!(updated.state, "Manual");
    }

    #[tokio::test]
    async fn missing_did_is_not_found() {
        let svc = memory();
        assert_eq!(svc.get_did("did-x").await.unwrap_err().http_status_code(), 404);
        assert_eq!(svc.delete_did("did-x").await.unwrap_err().http_status_code(), 404);
        let err = svc.update_did("did-x", DidPatch::default()).await.unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }

    #[tokio::test]
    async fn bulk_operations_touch_only_listed_ids() {
        let svc = memory();
        let outcome = svc.import_dids(import(PHONES)).await.unwrap();
        let ids: Vec<String> = outcome.successful.iter().map(|d| d.id.to_string()).collect();

        let patch = DidPatch {
            status: Some(DidStatus::Inactive),
            ..DidPatch::default()
        };
        let updated = svc.update_dids(&ids[..2], patch).await.unwrap();
        assert_eq!(updated, 2);
        let inactive = svc.get_did(&ids[2]).await.unwrap();
        assert_eq!(inactive.did.status, DidStatus::Active);

        let removed = svc
            .delete_dids(&[ids[0].clone(), "did-missing".into()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(svc.list_dids(&ViewQuery::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_dids_annotates_filters_and_sorts() {
        let svc = memory();
        svc.import_dids(import(PHONES)).await.unwrap();
        let mut spam = CreateDialBRequest {
            phone_number: "12125550100".into(),
            ..CreateDialBRequest::default()
        };
        spam.overall_status = DialBStatus::Spam;
        svc.create_dialb(spam).await.unwrap();

        let query = ViewQuery {
            filters: ColumnFilters::new().with("trankId", ["T1"]),
            sort: Some(SortSpec::new("didNumber", SortDirection::Descending)),
            ..ViewQuery::default()
        };
        let rows = svc.list_dids(&query).await.unwrap();
        let numbers: Vec<&str> = rows.iter().map(|r| r.did.did_number.as_str()).collect();
        assert_eq!(numbers, vec!["2135550102", "2125550100"]);
        assert_eq!(rows[0].dial_b_status, DialBMatch::Unknown);
        assert_eq!(rows[1].dial_b_status, DialBMatch::Spam);

        let trunks = svc.did_column_values("trankId").await.unwrap();
        assert_eq!(trunks, vec!["T1", "T2"]);
    }

    #[tokio::test]
    async fn exports_follow_query_and_selection() {
        let svc = memory();
        let outcome = svc.import_dids(import(PHONES)).await.unwrap();

        let query = ViewQuery {
            search: Some("212".into()),
            ..ViewQuery::default()
        };
        assert_eq!(svc.export_did_numbers(&query).await.unwrap(), "2125550100");

        let grouped = svc.export_all_dids(&ViewQuery::default()).await.unwrap();
        assert!(grouped.starts_with("Unknown Company Unknown State Default,serial,000"));

        let ids = [
            outcome.successful[0].id.to_string(),
            outcome.successful[1].id.to_string(),
        ];
        let selected = svc
            .export_selected_dids(&ViewQuery::default(), &ids[1..])
            .await
            .unwrap();
        assert!(selected.ends_with("3125550101"));
        assert!(!selected.contains("2125550100"));

        let narrowed = svc.export_selected_dids(&query, &ids).await.unwrap();
        assert!(narrowed.ends_with("2125550100"));
        assert!(!narrowed.contains("3125550101"));
    }

    #[tokio::test]
    async fn duplicate_area_code_conflicts() {
        let svc = memory();
        svc.create_area_code(area("212", "New York")).await.unwrap();
        let err = svc
            .create_area_code(area("212", "Elsewhere"))
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 409);

        let other = svc.create_area_code(area("646", "New York")).await.unwrap();
        let patch = AreaCodePatch {
            code: Some("212".into()),
            ..AreaCodePatch::default()
        };
        let err = svc
            .update_area_code(other.id.as_str(), patch)
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 409);
    }

    #[tokio::test]
    async fn area_code_changes_rewrite_did_states() {
        let svc = memory();
        svc.import_dids(import(PHONES)).await.unwrap();

        let ac = svc.create_area_code(area("212", "New York")).await.unwrap();
        let dids = svc.dids_for_area_code("212").await.unwrap();
        assert_eq!(dids.len(), 1);
        assert_eq!(dids[0].state, "New York");

        let patch = AreaCodePatch {
            state: Some("NY".into()),
            ..AreaCodePatch::default()
        };
        svc.update_area_code(ac.id.as_str(), patch).await.unwrap();
        assert_eq!(svc.dids_for_area_code("212").await.unwrap()[0].state, "NY");
    }

    #[tokio::test]
    async fn sync_and_counts_cover_every_did() {
        let svc = memory();
        svc.replace_area_codes(vec![area("212", "New York"), area("312", "Illinois")])
            .await
            .unwrap();
        let outcome = svc.import_dids(import(PHONES)).await.unwrap();
        svc.update_did(
            outcome.successful[0].id.as_str(),
            DidPatch {
                state: Some("Stale".into()),
                status: Some(DidStatus::Inactive),
                ..DidPatch::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(svc.sync_did_states().await.unwrap(), 1);
        assert_eq!(svc.sync_did_states().await.unwrap(), 0);

        svc.recompute_area_code_counts().await.unwrap();
        let codes = svc.list_area_codes(&ViewQuery::default()).await.unwrap();
        let ny = codes.iter().find(|a| a.code == "212").unwrap();
        assert_eq!((ny.total_dids, ny.active_dids), (1, 0));
        let il = codes.iter().find(|a| a.code == "312").unwrap();
        assert_eq!((il.total_dids, il.active_dids), (1, 1));
    }

    #[tokio::test]
    async fn sync_keeps_hand_set_state_for_unmapped_code() {
        let svc = memory();
        svc.create_area_code(area("212", "New York")).await.unwrap();
        let did = svc.create_did(CreateDidRequest::new("9995550100")).await.unwrap();
        assert_eq!(did.area_code, "999");
        let patch = DidPatch {
            state: Some("Texas".into()),
            ..DidPatch::default()
        };
        svc.update_did(did.id.as_str(), patch).await.unwrap();

        assert_eq!(svc.sync_did_states().await.unwrap(), 0);
        let view = svc.get_did(did.id.as_str()).await.unwrap();
        assert_eq!(view.did.state, "Texas");
    }

    #[tokio::test]
    async fn replacing_area_codes_resyncs_states() {
        let svc = memory();
        svc.create_area_code(area("212", "New York")).await.unwrap();
        let did = svc.create_did(CreateDidRequest::new("2125550100")).await.unwrap();
        assert_eq!(did.state, "New York");

        svc.replace_area_codes(vec![area("212", "California")])
            .await
            .unwrap();
        assert_eq!(svc.dids_for_area_code("212").await.unwrap()[0].state, "California");
    }

    #[tokio::test]
    async fn removed_mappings_clear_only_derived_states() {
        let svc = memory();
        let ny = svc.create_area_code(area("212", "New York")).await.unwrap();
        let la = svc.create_area_code(area("213", "California")).await.unwrap();
        let derived = svc.create_did(CreateDidRequest::new("2125550100")).await.unwrap();
        let manual = svc.create_did(CreateDidRequest::new("2125550101")).await.unwrap();
        let moved = svc.create_did(CreateDidRequest::new("2135550102")).await.unwrap();
        let patch = DidPatch {
            state: Some("Texas".into()),
            ..DidPatch::default()
        };
        svc.update_did(manual.id.as_str(), patch).await.unwrap();

        svc.delete_area_code(ny.id.as_str()).await.unwrap();
        assert_eq!(state_of(&svc, &derived).await, "");
        assert_eq!(state_of(&svc, &manual).await, "Texas");

        let rename = AreaCodePatch {
            code: Some("310".into()),
            ..AreaCodePatch::default()
        };
        svc.update_area_code(la.id.as_str(), rename).await.unwrap();
        assert_eq!(state_of(&svc, &moved).await, "");
    }

    #[tokio::test]
    async fn area_code_csv_syncs_states_in_one_write() {
        let svc = memory();
        svc.import_dids(import(PHONES)).await.unwrap();
        let mut rx = svc.subscribe(Entity::Did);

        svc.import_area_codes("Area Code,State\n212,New York\n312,Illinois\n")
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Updated(2));
        assert!(rx.try_recv().is_err());
        assert_eq!(svc.dids_for_area_code("312").await.unwrap()[0].state, "Illinois");
    }

    #[tokio::test]
    async fn replace_area_codes_rejects_repeated_codes() {
        let svc = memory();
        let err = svc
            .replace_area_codes(vec![area("212", "New York"), area("212", "New York")])
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 409);
    }

    #[tokio::test]
    async fn area_code_csv_upserts_by_code() {
        let svc = memory();
        svc.create_area_code(area("212", "Old")).await.unwrap();

        let imported = svc
            .import_area_codes("Area Code,State\n212,New York\n800,Tell Free\n")
            .await
            .unwrap();
        assert_eq!(imported, 2);

        let codes = svc.list_area_codes(&ViewQuery::default()).await.unwrap();
        assert_eq!(codes.len(), 2);
        let ny = codes.iter().find(|a| a.code == "212").unwrap();
        assert_eq!(ny.state, "New York");
        assert_eq!(ny.timezone, "EST");
    }

    #[tokio::test]
    async fn company_codes_are_unique_and_generated() {
        let svc = memory();
        let generated = svc
            .create_company(CreateCompanyRequest {
                name: "Acme".into(),
                ..CreateCompanyRequest::default()
            })
            .await
            .unwrap();
        assert!(generated.code.starts_with("COMP-"));

        let named = svc
            .create_company(CreateCompanyRequest {
                code: Some("BETA".into()),
                name: "Beta".into(),
                description: String::new(),
            })
            .await
            .unwrap();

        let err = svc
            .create_company(CreateCompanyRequest {
                code: Some("BETA".into()),
                name: "Other".into(),
                description: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 409);

        // Keeping its own code is not a conflict.
        let same = CompanyPatch {
            code: Some("BETA".into()),
            ..CompanyPatch::default()
        };
        svc.update_company(named.id.as_str(), same).await.unwrap();

        let err = svc
            .create_company(CreateCompanyRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[tokio::test]
    async fn dialb_import_upserts_by_phone() {
        let svc = memory();
        let header = "Phone Number,Group,Overall Status,T-Mobile,AT&T,3rd Party,Last Checked";
        let first = format!("{header}\n2125550100,A,Clean,false,false,false,2024-01-01\n");
        let outcome = svc.import_dialb(&first).await.unwrap();
        assert_eq!((outcome.created, outcome.updated), (1, 0));

        let second = format!(
            "{header}\n2125550100,A,Spam,true,false,false,2024-02-01\n3125550100,B\n"
        );
        let outcome = svc.import_dialb(&second).await.unwrap();
        assert_eq!((outcome.created, outcome.updated), (0, 1));
        assert_eq!(outcome.errors.len(), 1);

        let found = svc.find_dialb_by_phone("2125550100").await.unwrap().unwrap();
        assert_eq!(found.overall_status, DialBStatus::Spam);
        assert!(found.t_mobile_flag);

        let stats = svc.dialb_stats().await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.spam, 1);
    }

    #[tokio::test]
    async fn subscribers_see_mutations() {
        let svc = memory();
        let mut rx = svc.subscribe(Entity::Did);
        svc.import_dids(import(PHONES)).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.entity, Entity::Did);
        assert_eq!(event.kind, ChangeKind::Added(3));
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let blobs = Arc::new(RocksBlobStore::open(dir.path()).unwrap());
            let svc = InventoryService::with_defaults(blobs);
            svc.import_dids(import(PHONES)).await.unwrap();
        }
        let blobs = Arc::new(RocksBlobStore::open(dir.path()).unwrap());
        let svc = InventoryService::with_defaults(blobs);
        assert_eq!(svc.list_dids(&ViewQuery::default()).await.unwrap().len(), 3);
    }
}
