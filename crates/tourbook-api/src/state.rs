use std::sync::Arc;

use tourbook_core::ports::{InvitationMailer, Notifier, PhotoStorage};
use tourbook_core::repositories::Repositories;
use tourbook_core::services::{
    AccountService, CatalogService, CompanyActivityService, CompanyService, MemberService,
    RegistrationService,
};
use tourbook_security::JwtService;
use tourbook_shared::config::AppConfig;

/// Outbound adapters the services talk to.
pub struct Gateways {
    pub notifier: Arc<dyn Notifier>,
    pub mailer: Arc<dyn InvitationMailer>,
    pub photos: Arc<dyn PhotoStorage>,
}

#[derive(Debug, Clone)]
pub struct StateSettings {
    pub jwt_secret: String,
    pub access_token_expiry: i64,
    pub continuation_token_expiry: i64,
    pub public_url: String,
}

impl From<&AppConfig> for StateSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            continuation_token_expiry: config.jwt.continuation_token_expiry,
            public_url: config.app.public_url.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub registrations: Arc<RegistrationService>,
    pub catalog: Arc<CatalogService>,
    pub companies: Arc<CompanyService>,
    pub members: Arc<MemberService>,
    pub company_activities: Arc<CompanyActivityService>,
    pub accounts: Arc<AccountService>,
}

impl AppState {
    pub fn new(repos: &Repositories, gateways: Gateways, settings: StateSettings) -> Self {
        let jwt = Arc::new(JwtService::new(
            settings.jwt_secret,
            settings.access_token_expiry,
            settings.continuation_token_expiry,
        ));

        let registrations = Arc::new(RegistrationService::new(
            repos.registrations.clone(),
            repos.users.clone(),
            repos.activities.clone(),
            gateways.notifier,
        ));

        Self {
            catalog: Arc::new(CatalogService::new(
                repos.activities.clone(),
                repos.users.clone(),
                repos.registrations.clone(),
            )),
            companies: Arc::new(CompanyService::new(repos.companies.clone())),
            members: Arc::new(MemberService::new(
                repos.users.clone(),
                repos.companies.clone(),
                repos.activities.clone(),
                repos.invitations.clone(),
                gateways.mailer,
                settings.public_url,
            )),
            company_activities: Arc::new(CompanyActivityService::new(
                repos.activities.clone(),
                repos.companies.clone(),
                repos.users.clone(),
                gateways.photos,
            )),
            accounts: Arc::new(AccountService::new(
                repos.users.clone(),
                repos.invitations.clone(),
                registrations.clone(),
                jwt,
                settings.access_token_expiry,
            )),
            registrations,
        }
    }
}
