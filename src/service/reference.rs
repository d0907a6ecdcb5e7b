use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::require_text;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{
    Area, Classification, ClassificationDetail, MaintenancePeriod, NewClassification, Outlet,
    PersonalResponsible, Position, Role,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOutlet {
    pub outlet_name: String,
    #[serde(default)]
    pub area_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMaintenancePeriod {
    pub period_name: String,
    pub period_months: u32,
}

/// A classification with its healthy parameters split into
/// `param_1..param_n`.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationView {
    #[serde(flatten)]
    pub detail: ClassificationDetail,
    pub healthy_params: BTreeMap<String, String>,
}

/// Read-mostly lookup tables: areas, outlets, roles, positions, maintenance
/// periods, classifications and personal responsibles.
#[derive(Clone)]
pub struct ReferenceService {
    store: Arc<dyn Store>,
}

impl ReferenceService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn list_areas(&self) -> Result<Vec<Area>> {
        self.store.list_areas()
    }

    pub fn create_area(&self, name: &str) -> Result<Area> {
        require_text(name, "area_name")?;
        let area = self.store.create_area(name.trim())?;
        info!("Created area {} '{}'", area.area_id, area.area_name);
        Ok(area)
    }

    pub fn list_outlets(&self, area_id: Option<i64>) -> Result<Vec<Outlet>> {
        self.store.list_outlets(area_id)
    }

    pub fn create_outlet(&self, req: &CreateOutlet) -> Result<Outlet> {
        require_text(&req.outlet_name, "outlet_name")?;
        if let Some(area_id) = req.area_id.filter(|id| *id != 0) {
            if self.store.get_area(area_id)?.is_none() {
                return Err(Error::not_found(format!("Area {area_id} not found")));
            }
        }
        let outlet = self.store.create_outlet(req.outlet_name.trim(), req.area_id)?;
        info!("Created outlet {} '{}'", outlet.outlet_id, outlet.outlet_name);
        Ok(outlet)
    }

    pub fn list_roles(&self) -> Result<Vec<Role>> {
        self.store.list_roles()
    }

    pub fn list_positions(&self) -> Result<Vec<Position>> {
        self.store.list_positions()
    }

    pub fn create_position(&self, name: &str) -> Result<Position> {
        require_text(name, "position_name")?;
        self.store.create_position(name.trim())
    }

    pub fn list_personal_responsibles(&self) -> Result<Vec<PersonalResponsible>> {
        self.store.list_personal_responsibles()
    }

    pub fn create_personal_responsible(&self, name: &str) -> Result<PersonalResponsible> {
        require_text(name, "personal_name")?;
        self.store.create_personal_responsible(name.trim())
    }

    pub fn list_maintenance_periods(&self) -> Result<Vec<MaintenancePeriod>> {
        self.store.list_maintenance_periods()
    }

    pub fn create_maintenance_period(
        &self,
        req: &CreateMaintenancePeriod,
    ) -> Result<MaintenancePeriod> {
        require_text(&req.period_name, "period_name")?;
        self.store
            .create_maintenance_period(req.period_name.trim(), req.period_months)
    }

    pub fn list_classifications(&self) -> Result<Vec<Classification>> {
        self.store.list_classifications()
    }

    pub fn get_classification(&self, id: i64) -> Result<ClassificationView> {
        let detail = self
            .store
            .get_classification(id)?
            .ok_or_else(|| Error::not_found("Classification not found"))?;
        Ok(ClassificationView {
            healthy_params: detail.healthy_params(),
            detail,
        })
    }

    pub fn create_classification(&self, req: &NewClassification) -> Result<Classification> {
        require_text(&req.classification_name, "classification_name")?;
        if req.classification_economic_value <= 0 {
            return Err(Error::invalid(
                "classification_economic_value must be greater than zero",
            ));
        }
        if let Some(period_id) = req.maintenance_period_id {
            if self.store.get_maintenance_period(period_id)?.is_none() {
                return Err(Error::not_found(format!(
                    "Maintenance period {period_id} not found"
                )));
            }
        }

        let classification = self.store.create_classification(req)?;
        info!(
            "Created classification {} '{}'",
            classification.classification_id, classification.classification_name
        );
        Ok(classification)
    }
}
