use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{require_text, resolve_page};
use crate::auth::{Caller, CredentialHasher};
use crate::error::{Error, Result};
use crate::lifecycle::{completed_months, next_maintenance_date, parse_date, valuate};
use crate::store::Store;
use crate::types::{
    Asset, AssetDetail, AssetFilter, AssetPartition, AssetPatch, AssetUpdate,
    ClassificationDetail, GOOD_STATUS, NewAsset, Page,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAsset {
    pub asset_name: String,
    #[serde(default)]
    pub asset_brand: String,
    #[serde(default)]
    pub asset_specification: String,
    pub asset_classification: i64,
    #[serde(default)]
    pub asset_condition: String,
    #[serde(default)]
    pub asset_pic: Option<i64>,
    #[serde(default)]
    pub personal_responsible: String,
    pub asset_purchase_date: String,
    #[serde(default)]
    pub asset_status: Option<String>,
    pub classification_acquisition_value: i64,
    #[serde(default)]
    pub asset_image: Option<String>,
    #[serde(default)]
    pub outlet_id: Option<i64>,
    #[serde(default)]
    pub area_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetQuery {
    pub q: Option<String>,
    pub classification: Option<String>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

/// An asset as returned to clients: detail plus its age in whole months.
#[derive(Debug, Clone, Serialize)]
pub struct AssetView {
    #[serde(flatten)]
    pub detail: AssetDetail,
    pub asset_age: u32,
}

impl AssetView {
    fn new(detail: AssetDetail, today: NaiveDate) -> Self {
        let asset_age = completed_months(detail.asset.asset_purchase_date, today);
        Self { detail, asset_age }
    }
}

#[derive(Clone)]
pub struct AssetService {
    store: Arc<dyn Store>,
    hasher: Arc<CredentialHasher>,
}

impl AssetService {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    fn classification(&self, id: i64) -> Result<ClassificationDetail> {
        self.store
            .get_classification(id)?
            .ok_or_else(|| Error::not_found(format!("Classification {id} not found")))
    }

    pub fn create(&self, req: CreateAsset, now: DateTime<Utc>) -> Result<Asset> {
        require_text(&req.asset_name, "asset_name")?;
        if req.classification_acquisition_value < 0 {
            return Err(Error::invalid(
                "classification_acquisition_value cannot be negative",
            ));
        }
        let classification = self.classification(req.asset_classification)?;
        let purchase_date = parse_date(&req.asset_purchase_date, "asset_purchase_date")?;
        let today = now.date_naive();

        let valuation = valuate(
            req.classification_acquisition_value,
            classification.classification.classification_economic_value,
            purchase_date,
            today,
        )?;

        let asset = NewAsset {
            asset_name: req.asset_name,
            asset_brand: req.asset_brand,
            asset_specification: req.asset_specification,
            asset_classification: req.asset_classification,
            asset_condition: req.asset_condition,
            asset_pic: req.asset_pic,
            personal_responsible: req.personal_responsible,
            asset_purchase_date: purchase_date,
            asset_maintenance_date: next_maintenance_date(today, classification.period_months),
            asset_status: req
                .asset_status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| GOOD_STATUS.to_string()),
            classification_acquisition_value: req.classification_acquisition_value,
            classification_last_book_value: valuation.last_book_value,
            deprecation_value: valuation.deprecation_value,
            asset_image: req.asset_image,
            outlet_id: req.outlet_id,
            area_id: req.area_id,
            created_at: now,
        };

        let hasher = self.hasher.clone();
        let created = self
            .store
            .create_asset(&asset, &move |id| hasher.hash_asset_id(id))?;

        info!(
            "Created asset {} '{}' (maintenance due {})",
            created.asset_id, created.asset_name, created.asset_maintenance_date
        );
        Ok(created)
    }

    pub fn get(&self, id: i64, today: NaiveDate) -> Result<AssetView> {
        self.store
            .get_asset(id)?
            .map(|detail| AssetView::new(detail, today))
            .ok_or_else(|| Error::not_found("Asset not found"))
    }

    pub fn get_by_hash(&self, hash: &str, today: NaiveDate) -> Result<AssetView> {
        require_text(hash, "hash")?;
        self.store
            .get_asset_by_hash(hash)?
            .map(|detail| AssetView::new(detail, today))
            .ok_or_else(|| Error::not_found("Asset not found"))
    }

    /// Applies the fields present in `patch`. Depreciation and book value are
    /// recomputed when the acquisition value, classification or purchase date
    /// change.
    pub fn update(&self, id: i64, patch: AssetPatch, now: DateTime<Utc>) -> Result<AssetView> {
        let current = self
            .store
            .get_asset(id)?
            .ok_or_else(|| Error::not_found("Asset not found"))?;
        let mut asset: Asset = current.asset;
        let today = now.date_naive();

        let revalue = patch.classification_acquisition_value.is_some()
            || patch.asset_classification.is_some()
            || patch.asset_purchase_date.is_some();

        if let Some(name) = patch.asset_name {
            require_text(&name, "asset_name")?;
            asset.asset_name = name;
        }
        if let Some(brand) = patch.asset_brand {
            asset.asset_brand = brand;
        }
        if let Some(spec) = patch.asset_specification {
            asset.asset_specification = spec;
        }
        if let Some(classification) = patch.asset_classification {
            asset.asset_classification = classification;
        }
        if let Some(condition) = patch.asset_condition {
            asset.asset_condition = condition;
        }
        if let Some(pic) = patch.asset_pic {
            asset.asset_pic = Some(pic);
        }
        if let Some(responsible) = patch.personal_responsible {
            asset.personal_responsible = responsible;
        }
        if let Some(purchase_date) = patch.asset_purchase_date {
            asset.asset_purchase_date = parse_date(&purchase_date, "asset_purchase_date")?;
        }
        if let Some(status) = patch.asset_status {
            require_text(&status, "asset_status")?;
            asset.asset_status = status;
        }
        if let Some(value) = patch.classification_acquisition_value {
            if value < 0 {
                return Err(Error::invalid(
                    "classification_acquisition_value cannot be negative",
                ));
            }
            asset.classification_acquisition_value = value;
        }
        if let Some(image) = patch.asset_image {
            asset.asset_image = Some(image);
        }
        if let Some(outlet_id) = patch.outlet_id {
            asset.outlet_id = Some(outlet_id);
        }
        if let Some(area_id) = patch.area_id {
            asset.area_id = Some(area_id);
        }

        if revalue {
            let classification = self.classification(asset.asset_classification)?;
            let valuation = valuate(
                asset.classification_acquisition_value,
                classification.classification.classification_economic_value,
                asset.asset_purchase_date,
                today,
            )?;
            asset.deprecation_value = valuation.deprecation_value;
            asset.classification_last_book_value = valuation.last_book_value;
        }

        self.store.update_asset(&asset, now)?;
        info!("Updated asset {id}");
        self.get(id, today)
    }

    /// Sets the asset status. Returning to the good status schedules the next
    /// maintenance from the asset's classification.
    pub fn update_status(&self, id: i64, status: &str, now: DateTime<Utc>) -> Result<()> {
        require_text(status, "asset_status")?;
        let asset = self
            .store
            .get_asset(id)?
            .ok_or_else(|| Error::not_found("Asset not found"))?
            .asset;

        let maintenance_date = if status == GOOD_STATUS {
            let classification = self.classification(asset.asset_classification)?;
            Some(next_maintenance_date(
                now.date_naive(),
                classification.period_months,
            ))
        } else {
            None
        };

        self.store
            .update_asset_status(id, status, maintenance_date, now)?;
        info!("Asset {id} status set to '{status}'");
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        if !self.store.delete_asset(id)? {
            return Err(Error::not_found("Asset not found"));
        }
        info!("Deleted asset {id}");
        Ok(())
    }

    pub fn history(&self, id: i64) -> Result<Vec<AssetUpdate>> {
        if self.store.get_asset(id)?.is_none() {
            return Err(Error::not_found("Asset not found"));
        }
        self.store.list_asset_updates(id)
    }

    pub fn list(
        &self,
        query: &AssetQuery,
        caller: &Caller,
        today: NaiveDate,
    ) -> Result<(Page<AssetView>, crate::types::PageRequest)> {
        let page = resolve_page(query.page_number, query.page_size)?;
        let filter = AssetFilter {
            q: query.q.clone(),
            scope: caller.scope(),
            partition: AssetPartition::from_query(query.classification.as_deref()),
        };

        let result = self.store.list_assets(&filter, page)?;
        let items = result
            .items
            .into_iter()
            .map(|detail| AssetView::new(detail, today))
            .collect();
        Ok((
            Page {
                items,
                total: result.total,
            },
            page,
        ))
    }
}
