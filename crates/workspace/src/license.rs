//! Organization licenses

use crate::storage::{keys, read_list, write_json, StoragePort};
use crate::{Result, WorkspaceError};
use chrono::NaiveDate;
use fr_text::eq_ignore_case;
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Standard,
    Pro,
    Enterprise,
}

impl Plan {
    /// Seats included in the plan
    pub fn max_users(self) -> u32 {
        match self {
            Plan::Enterprise => 3,
            Plan::Standard | Plan::Pro => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    #[default]
    Active,
    Expired,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: String,
    /// Organization name
    pub cpme: String,
    pub plan: Plan,
    pub status: LicenseStatus,
    pub users: u32,
    pub max_users: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl License {
    pub fn is_expired(&self) -> bool {
        self.status == LicenseStatus::Expired
    }
}

/// Input for [`LicenseRegistry::create`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLicense {
    pub cpme: String,
    pub plan: Plan,
    #[serde(default)]
    pub status: LicenseStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Persisted license list
///
/// An organization has at most one non-expired license; names are compared
/// case-insensitively.
pub struct LicenseRegistry<'a, S: StoragePort + ?Sized> {
    storage: &'a S,
}

impl<'a, S: StoragePort + ?Sized> LicenseRegistry<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub fn list(&self) -> Result<Vec<License>> {
        read_list(self.storage, keys::LICENSES)
    }

    pub fn get(&self, id: &str) -> Result<License> {
        self.list()?
            .into_iter()
            .find(|l| l.id == id)
            .ok_or_else(|| WorkspaceError::LicenseNotFound(id.to_string()))
    }

    pub fn create(&self, new: NewLicense) -> Result<License> {
        let cpme = new.cpme.trim().to_string();
        if cpme.is_empty() {
            return Err(WorkspaceError::InvalidLicense(
                "organization name is required".to_string(),
            ));
        }
        check_dates(new.start_date, new.end_date)?;

        let mut licenses = self.list()?;
        ensure_unique(&licenses, &cpme, None)?;

        let license = License {
            id: Uuid::new_v4().to_string(),
            cpme,
            plan: new.plan,
            status: new.status,
            users: 0,
            max_users: new.plan.max_users(),
            start_date: new.start_date,
            end_date: new.end_date,
        };
        licenses.push(license.clone());
        write_json(self.storage, keys::LICENSES, &licenses)?;

        info!("created {:?} license for '{}'", license.plan, license.cpme);
        Ok(license)
    }

    pub fn set_status(&self, id: &str, status: LicenseStatus) -> Result<License> {
        self.update(id, |license, others| {
            if status != LicenseStatus::Expired {
                ensure_unique(others, &license.cpme, Some(&license.id))?;
            }
            license.status = status;
            Ok(())
        })
    }

    /// Extend a license to a new end date and reactivate it
    pub fn renew(&self, id: &str, end_date: NaiveDate) -> Result<License> {
        self.update(id, |license, others| {
            check_dates(license.start_date, end_date)?;
            ensure_unique(others, &license.cpme, Some(&license.id))?;
            license.end_date = end_date;
            license.status = LicenseStatus::Active;
            Ok(())
        })
    }

    pub fn add_user(&self, id: &str) -> Result<License> {
        self.update(id, |license, _| {
            if license.users >= license.max_users {
                return Err(WorkspaceError::UserLimit {
                    id: license.id.clone(),
                    max: license.max_users,
                });
            }
            license.users += 1;
            Ok(())
        })
    }

    pub fn remove_user(&self, id: &str) -> Result<License> {
        self.update(id, |license, _| {
            if license.users == 0 {
                return Err(WorkspaceError::NoUsers(license.id.clone()));
            }
            license.users -= 1;
            Ok(())
        })
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut licenses = self.list()?;
        let before = licenses.len();
        licenses.retain(|l| l.id != id);
        if licenses.len() == before {
            return Err(WorkspaceError::LicenseNotFound(id.to_string()));
        }
        write_json(self.storage, keys::LICENSES, &licenses)?;
        info!("deleted license {id}");
        Ok(())
    }

    /// Mark active licenses whose end date is before `today` as expired
    pub fn expire_overdue(&self, today: NaiveDate) -> Result<usize> {
        let mut licenses = self.list()?;
        let mut expired = 0;
        for license in licenses
            .iter_mut()
            .filter(|l| l.status == LicenseStatus::Active && l.end_date < today)
        {
            license.status = LicenseStatus::Expired;
            expired += 1;
        }
        if expired > 0 {
            write_json(self.storage, keys::LICENSES, &licenses)?;
            info!("expired {expired} overdue licenses");
        }
        Ok(expired)
    }

    /// Apply a change to one license; nothing is written when it fails
    fn update<F>(&self, id: &str, change: F) -> Result<License>
    where
        F: FnOnce(&mut License, &[License]) -> Result<()>,
    {
        let mut licenses = self.list()?;
        let pos = licenses
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| WorkspaceError::LicenseNotFound(id.to_string()))?;

        let mut license = licenses[pos].clone();
        change(&mut license, &licenses)?;
        licenses[pos] = license.clone();
        write_json(self.storage, keys::LICENSES, &licenses)?;
        Ok(license)
    }
}

fn check_dates(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end <= start {
        return Err(WorkspaceError::InvalidLicense(format!(
            "end date {end} must be after start date {start}"
        )));
    }
    Ok(())
}

fn ensure_unique(licenses: &[License], cpme: &str, except: Option<&str>) -> Result<()> {
    let taken = licenses
        .iter()
        .filter(|l| Some(l.id.as_str()) != except)
        .any(|l| !l.is_expired() && eq_ignore_case(&l.cpme, cpme));
    if taken {
        return Err(WorkspaceError::DuplicateCpme(cpme.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_license(cpme: &str, plan: Plan) -> NewLicense {
        NewLicense {
            cpme: cpme.to_string(),
            plan,
            status: LicenseStatus::Active,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
        }
    }

    #[test]
    fn test_max_users_from_plan() {
        let storage = MemoryStorage::new();
        let registry = LicenseRegistry::new(&storage);

        let enterprise = registry.create(new_license("CPME 13", Plan::Enterprise)).unwrap();
        let pro = registry.create(new_license("CPME 69", Plan::Pro)).unwrap();
        let standard = registry.create(new_license("CPME 75", Plan::Standard)).unwrap();

        assert_eq!(enterprise.max_users, 3);
        assert_eq!(pro.max_users, 1);
        assert_eq!(standard.max_users, 1);
        assert_eq!(standard.users, 0);
    }

    #[test]
    fn test_duplicate_cpme_rejected_without_mutation() {
        let storage = MemoryStorage::new();
        let registry = LicenseRegistry::new(&storage);
        registry.create(new_license("CPME Rhône", Plan::Pro)).unwrap();
        let before = registry.list().unwrap();

        let result = registry.create(new_license("cpme rhône", Plan::Enterprise));

        assert!(matches!(result, Err(WorkspaceError::DuplicateCpme(_))));
        assert_eq!(registry.list().unwrap(), before);
    }

    #[test]
    fn test_expired_license_does_not_block() {
        let storage = MemoryStorage::new();
        let registry = LicenseRegistry::new(&storage);
        let old = registry.create(new_license("CPME 13", Plan::Pro)).unwrap();
        registry.set_status(&old.id, LicenseStatus::Expired).unwrap();

        assert!(registry.create(new_license("CPME 13", Plan::Pro)).is_ok());
        assert_eq!(registry.list().unwrap().len(), 2);
    }

    #[test]
    fn test_reactivation_checks_duplicates() {
        let storage = MemoryStorage::new();
        let registry = LicenseRegistry::new(&storage);
        let old = registry.create(new_license("CPME 13", Plan::Pro)).unwrap();
        registry.set_status(&old.id, LicenseStatus::Expired).unwrap();
        registry.create(new_license("CPME 13", Plan::Pro)).unwrap();

        assert!(matches!(
            registry.renew(&old.id, date(2026, 12, 31)),
            Err(WorkspaceError::DuplicateCpme(_))
        ));
        assert!(registry.get(&old.id).unwrap().is_expired());
    }

    #[test]
    fn test_empty_name_rejected() {
        let storage = MemoryStorage::new();
        let registry = LicenseRegistry::new(&storage);
        assert!(matches!(
            registry.create(new_license("  ", Plan::Pro)),
            Err(WorkspaceError::InvalidLicense(_))
        ));
    }

    #[test]
    fn test_users_bounded_by_plan() {
        let storage = MemoryStorage::new();
        let registry = LicenseRegistry::new(&storage);
        let license = registry.create(new_license("CPME 13", Plan::Standard)).unwrap();

        assert_eq!(registry.add_user(&license.id).unwrap().users, 1);
        assert!(matches!(
            registry.add_user(&license.id),
            Err(WorkspaceError::UserLimit { max: 1, .. })
        ));
        assert_eq!(registry.remove_user(&license.id).unwrap().users, 0);
        assert!(matches!(
            registry.remove_user(&license.id),
            Err(WorkspaceError::NoUsers(_))
        ));
    }

    #[test]
    fn test_renew() {
        let storage = MemoryStorage::new();
        let registry = LicenseRegistry::new(&storage);
        let license = registry.create(new_license("CPME 13", Plan::Pro)).unwrap();
        registry.set_status(&license.id, LicenseStatus::Expired).unwrap();

        let renewed = registry.renew(&license.id, date(2026, 12, 31)).unwrap();
        assert_eq!(renewed.status, LicenseStatus::Active);
        assert_eq!(renewed.end_date, date(2026, 12, 31));

        assert!(matches!(
            registry.renew(&license.id, date(2024, 1, 1)),
            Err(WorkspaceError::InvalidLicense(_))
        ));
    }

    #[test]
    fn test_expire_overdue() {
        let storage = MemoryStorage::new();
        let registry = LicenseRegistry::new(&storage);
        let license = registry.create(new_license("CPME 13", Plan::Pro)).unwrap();
        registry.create(new_license("CPME 69", Plan::Pro)).unwrap();
        registry.renew(&license.id, date(2027, 1, 1)).unwrap();

        assert_eq!(registry.expire_overdue(date(2026, 1, 1)).unwrap(), 1);
        assert_eq!(registry.get(&license.id).unwrap().status, LicenseStatus::Active);
        assert_eq!(registry.expire_overdue(date(2026, 1, 1)).unwrap(), 0);
    }

    #[test]
    fn test_delete() {
        let storage = MemoryStorage::new();
        let registry = LicenseRegistry::new(&storage);
        let license = registry.create(new_license("CPME 13", Plan::Pro)).unwrap();

        registry.delete(&license.id).unwrap();
        assert!(registry.list().unwrap().is_empty());
        assert!(matches!(
            registry.delete(&license.id),
            Err(WorkspaceError::LicenseNotFound(_))
        ));
    }

    #[test]
    fn test_json_shape() {
        let storage = MemoryStorage::new();
        let registry = LicenseRegistry::new(&storage);
        let license = registry.create(new_license("CPME 13", Plan::Enterprise)).unwrap();

        let value = serde_json::to_value(&license).unwrap();
        assert_eq!(value["plan"], "enterprise");
        assert_eq!(value["maxUsers"], 3);
        assert_eq!(value["startDate"], "2025-01-01");
    }
}
