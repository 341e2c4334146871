//! Company registry, administrator only.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Company, User};
use crate::error::DomainError;
use crate::policy::{self, Action, Actor, Resource};
use crate::repositories::CompanyRepository;

pub struct CompanyService {
    companies: Arc<dyn CompanyRepository>,
}

impl CompanyService {
    pub fn new(companies: Arc<dyn CompanyRepository>) -> Self {
        Self { companies }
    }

    pub async fn list(&self, actor: &User) -> Result<Vec<Company>, DomainError> {
        policy::ensure(&Actor::from(actor), Action::View, &Resource::Companies)?;
        self.companies.list().await
    }

    pub async fn get(&self, actor: &User, id: &Uuid) -> Result<Company, DomainError> {
        policy::ensure(&Actor::from(actor), Action::View, &Resource::Companies)?;
        self.companies.find_by_id(id).await?.ok_or(DomainError::CompanyNotFound)
    }

    pub async fn create(&self, actor: &User, name: &str) -> Result<Company, DomainError> {
        policy::ensure(&Actor::from(actor), Action::Create, &Resource::Companies)?;

        let company = Company::new(name.to_string())?;
        self.ensure_name_free(&company.name, None).await?;

        let created = self.companies.create(&company).await?;
        info!("Company created: {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn rename(&self, actor: &User, id: &Uuid, name: &str) -> Result<Company, DomainError> {
        policy::ensure(&Actor::from(actor), Action::Update, &Resource::Companies)?;

        let mut company = self.companies.find_by_id(id).await?.ok_or(DomainError::CompanyNotFound)?;
        company.rename(name)?;
        self.ensure_name_free(&company.name, Some(id)).await?;

        self.companies.update(&company).await
    }

    pub async fn delete(&self, actor: &User, id: &Uuid) -> Result<(), DomainError> {
        policy::ensure(&Actor::from(actor), Action::Delete, &Resource::Companies)?;

        if self.companies.find_by_id(id).await?.is_none() {
            return Err(DomainError::CompanyNotFound);
        }
        self.companies.delete(id).await?;
        info!("Company deleted: {}", id);
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, except: Option<&Uuid>) -> Result<(), DomainError> {
        match self.companies.find_by_name(name).await? {
            Some(existing) if Some(&existing.id) != except => {
                warn!("Company name already taken: {}", name);
                Err(DomainError::CompanyNameAlreadyExists(name.to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::repositories::company_repository::MockCompanyRepository;

    fn user(role: Role) -> User {
        User::new("Ada".into(), "ada@example.com".into(), "hash".into(), role, None).unwrap()
    }

    #[tokio::test]
    async fn only_administrators_manage_companies() {
        let mut repo = MockCompanyRepository::new();
        repo.expect_create().times(0);
        let svc = CompanyService::new(Arc::new(repo));

        for role in [Role::CompanyOwner, Role::Guide, Role::Customer] {
            assert!(matches!(
                svc.create(&user(role), "Acme Tours").await,
                Err(DomainError::Forbidden(_))
            ));
        }
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let mut repo = MockCompanyRepository::new();
        repo.expect_find_by_name()
            .returning(|name| Ok(Some(Company::new(name.to_string()).unwrap())));
        repo.expect_create().times(0);
        let svc = CompanyService::new(Arc::new(repo));

        assert!(matches!(
            svc.create(&user(Role::Administrator), "Acme Tours").await,
            Err(DomainError::CompanyNameAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn rename_to_own_name_is_allowed() {
        let company = Company::new("Acme Tours".into()).unwrap();
        let id = company.id;
        let mut repo = MockCompanyRepository::new();
        let stored = company.clone();
        repo.expect_find_by_id().returning(move |_| Ok(Some(stored.clone())));
        let same = company.clone();
        repo.expect_find_by_name().returning(move |_| Ok(Some(same.clone())));
        repo.expect_update().returning(|c| Ok(c.clone()));
        let svc = CompanyService::new(Arc::new(repo));

        let renamed = svc.rename(&user(Role::Administrator), &id, "ACME Tours").await.unwrap();
        assert_eq!(renamed.name, "ACME Tours");
    }

    #[tokio::test]
    async fn short_name_is_a_validation_error() {
        let svc = CompanyService::new(Arc::new(MockCompanyRepository::new()));
        assert!(matches!(
            svc.create(&user(Role::Administrator), "A").await,
            Err(DomainError::ValidationError(_))
        ));
    }
}
