// lib/src/services/specialty_service.rs

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};

use models::errors::{require_text, AllocationError, AllocationResult};
use models::{
    normalize_specialty_code, NewSpecialty, NewSpecialtyGroup, Specialty, SpecialtyGroup,
    SpecialtyGroupId, SpecialtyGroupUpdate, SpecialtyId, SpecialtyUpdate,
};

use crate::locks::CatalogLock;
use crate::storage_engine::AllocationStore;

/// Reference data: specialties and the groups they belong to. Catalog writes
/// are serialized with each other and with bed writes that reference them.
pub struct SpecialtyService {
    store: Arc<dyn AllocationStore>,
    catalog: Arc<CatalogLock>,
}

impl SpecialtyService {
    pub fn new(store: Arc<dyn AllocationStore>, catalog: Arc<CatalogLock>) -> Self {
        SpecialtyService { store, catalog }
    }

    async fn require_group(&self, code: &str) -> AllocationResult<()> {
        match self.store.find_specialty_group_by_code(code).await? {
            Some(_) => Ok(()),
            None => Err(AllocationError::specialty_group_not_found(code)),
        }
    }

    pub async fn find_all(&self) -> AllocationResult<Vec<Specialty>> {
        self.store.list_specialties().await
    }

    pub async fn find_by_id(&self, id: SpecialtyId) -> AllocationResult<Specialty> {
        self.store
            .get_specialty(id)
            .await?
            .ok_or_else(|| AllocationError::specialty_not_found(id))
    }

    pub async fn find_by_code(&self, code: &str) -> AllocationResult<Specialty> {
        let code = normalize_specialty_code(require_text("code", code)?);
        debug!("[SpecialtyService] find_by_code {}", code);
        self.store
            .find_specialty_by_code(&code)
            .await?
            .ok_or_else(|| AllocationError::specialty_not_found(&code))
    }

    pub async fn find_by_group(&self, group_code: &str) -> AllocationResult<Vec<Specialty>> {
        let group_code = normalize_specialty_code(require_text("group", group_code)?);
        let specialties = self.store.list_specialties().await?;
        Ok(specialties
            .into_iter()
            .filter(|s| s.group_code == group_code)
            .collect())
    }

    pub async fn create(&self, new_specialty: NewSpecialty) -> AllocationResult<Specialty> {
        let code = normalize_specialty_code(require_text("code", &new_specialty.code)?);
        let name = require_text("name", &new_specialty.name)?.to_string();
        let group_code = normalize_specialty_code(require_text("groupCode", &new_specialty.group_code)?);
        let _catalog = self.catalog.exclusive().await;
        self.require_group(&group_code).await?;

        let specialty = Specialty {
            id: self.store.next_specialty_id().await?,
            code,
            name,
            group_code,
            description: new_specialty.description,
            active: true,
            created_at: Utc::now(),
        };
        self.store.insert_specialty(specialty.clone()).await?;
        info!("[SpecialtyService] created specialty {} ({})", specialty.code, specialty.id);
        Ok(specialty)
    }

    pub async fn update(&self, id: SpecialtyId, update: SpecialtyUpdate) -> AllocationResult<Specialty> {
        let _catalog = self.catalog.exclusive().await;
        let mut specialty = self.find_by_id(id).await?;

        if let Some(code) = &update.code {
            specialty.code = normalize_specialty_code(require_text("code", code)?);
        }
        if let Some(name) = &update.name {
            specialty.name = require_text("name", name)?.to_string();
        }
        if let Some(group_code) = &update.group_code {
            let group_code = normalize_specialty_code(require_text("groupCode", group_code)?);
            self.require_group(&group_code).await?;
            specialty.group_code = group_code;
        }
        if update.description.is_some() {
            specialty.description = update.description;
        }
        if let Some(active) = update.active {
            specialty.active = active;
        }

        self.store.update_specialty(specialty.clone()).await?;
        info!("[SpecialtyService] updated specialty {} ({})", specialty.code, id);
        Ok(specialty)
    }

    /// Rejected while any bed still references the specialty.
    pub async fn delete(&self, id: SpecialtyId) -> AllocationResult<()> {
        let _catalog = self.catalog.exclusive().await;
        self.find_by_id(id).await?;
        let in_use = self.store.count_beds_by_specialty(id).await?;
        if in_use > 0 {
            return Err(AllocationError::InvalidInput(format!(
                "specialty {} is still referenced by {} bed(s)",
                id, in_use
            )));
        }
        self.store.delete_specialty(id).await?;
        warn!("[SpecialtyService] deleted specialty {}", id);
        Ok(())
    }

    pub async fn find_all_groups(&self) -> AllocationResult<Vec<SpecialtyGroup>> {
        self.store.list_specialty_groups().await
    }

    pub async fn find_group_by_id(&self, id: SpecialtyGroupId) -> AllocationResult<SpecialtyGroup> {
        self.store
            .get_specialty_group(id)
            .await?
            .ok_or_else(|| AllocationError::specialty_group_not_found(id))
    }

    pub async fn find_group_by_code(&self, code: &str) -> AllocationResult<SpecialtyGroup> {
        let code = normalize_specialty_code(require_text("code", code)?);
        self.store
            .find_specialty_group_by_code(&code)
            .await?
            .ok_or_else(|| AllocationError::specialty_group_not_found(&code))
    }

    pub async fn create_group(&self, new_group: NewSpecialtyGroup) -> AllocationResult<SpecialtyGroup> {
        let code = normalize_specialty_code(require_text("code", &new_group.code)?);
        let name = require_text("name", &new_group.name)?.to_string();
        let _catalog = self.catalog.exclusive().await;
        let now = Utc::now();
        let group = SpecialtyGroup {
            id: self.store.next_specialty_group_id().await?,
            code,
            name,
            description: new_group.description,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_specialty_group(group.clone()).await?;
        info!("[SpecialtyService] created specialty group {}", group.code);
        Ok(group)
    }
    /// A code change is carried over to the specialties of the group.
    pub async fn update_group(
        &self,
        id: SpecialtyGroupId,
        update: SpecialtyGroupUpdate,
    ) -> AllocationResult<SpecialtyGroup> {
        let _catalog = self.catalog.exclusive().await;
        let mut group = self.find_group_by_id(id).await?;
        let previous_code = group.code.clone();

        if let Some(code) = &update.code {
            group.code = normalize_specialty_code(require_text("code", code)?);
        }
        if let Some(name) = &update.name {
            group.name = require_text("name", name)?.to_string();
        }
        if update.description.is_some() {
            group.description = update.description;
        }
        if let Some(active) = update.active {
            group.active = active;
        }
        group.updated_at = Utc::now();
        self.store.update_specialty_group(group.clone()).await?;

        if group.code != previous_code {
            for mut specialty in self.store.list_specialties().await? {
                if specialty.group_code == previous_code {
                    specialty.group_code = group.code.clone();
                    self.store.update_specialty(specialty).await?;
                }
            }
        }
        info!("[SpecialtyService] updated specialty group {} ({})", group.code, id);
        Ok(group)
    }

    /// Rejected while specialties still belong to the group.
    pub async fn delete_group(&self, id: SpecialtyGroupId) -> AllocationResult<()> {
        let _catalog = self.catalog.exclusive().await;
        let group = self.find_group_by_id(id).await?;
        let members = self
            .store
            .list_specialties()
            .await?
            .iter()
            .filter(|s| s.group_code == group.code)
            .count();
        if members > 0 {
            return Err(AllocationError::InvalidInput(format!(
                "specialty group {} still has {} specialty(ies)",
                group.code, members
            )));
        }
        self.store.delete_specialty_group(id).await?;
        warn!("[SpecialtyService] deleted specialty group {}", group.code);
        Ok(())
    }
}
