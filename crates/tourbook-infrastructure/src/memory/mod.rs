// ============================================================================
// Tourbook Infrastructure - In-Memory Store
// File: crates/tourbook-infrastructure/src/memory/mod.rs
// Description: Process-local implementation of every repository port
// ============================================================================
//! In-memory store.
//!
//! Backs tests and local runs without PostgreSQL. It keeps the same
//! guarantees as the relational schema: case-insensitive unique emails and
//! company names, and at most one association per (user, activity) pair,
//! checked at insert time so that racing transactions cannot both succeed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use tourbook_core::domain::{
    Activity, Company, Participant, Registration, RegistrationInvitation, Role, User,
};
use tourbook_core::error::DomainError;
use tourbook_core::repositories::{
    ActivityRepository, CompanyRepository, InvitationRepository, RegistrationRepository,
    RegistrationTransaction, Repositories, UserRepository,
};
use tourbook_shared::types::{Page, Pagination};

type Pair = (Uuid, Uuid);

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    companies: HashMap<Uuid, Company>,
    activities: HashMap<Uuid, Activity>,
    registrations: HashMap<Pair, Registration>,
    /// Pairs inserted by an open transaction.
    reserved: HashSet<Pair>,
    invitations: HashMap<Uuid, RegistrationInvitation>,
}

impl MemoryState {
    fn email_taken(&self, email: &str, except: Option<&Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(&u.id) != except)
    }

    fn remove_activity(&mut self, id: &Uuid) -> Option<Activity> {
        let removed = self.activities.remove(id);
        if removed.is_some() {
            self.registrations.retain(|(_, activity_id), _| activity_id != id);
        }
        removed
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            companies: Arc::new(self.clone()),
            activities: Arc::new(self.clone()),
            registrations: Arc::new(self.clone()),
            invitations: Arc::new(self.clone()),
        }
    }

    /// Committed associations, all activities.
    pub fn registration_count(&self) -> usize {
        self.state.lock().registrations.len()
    }
}

fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Page<T> {
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit() as usize)
        .collect();
    Page::new(items, pagination, total)
}

fn by_start_date(mut activities: Vec<Activity>) -> Vec<Activity> {
    activities.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
    activities
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.state.lock().users.get(id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .state
            .lock()
            .users
            .values()
            .find(|u| !u.is_deleted() && u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_by_company_and_role(&self, company_id: &Uuid, role: Role) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self
            .state
            .lock()
            .users
            .values()
            .filter(|u| !u.is_deleted() && u.belongs_to(company_id) && u.role == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let mut state = self.state.lock();
        if state.email_taken(&user.email, None) {
            return Err(DomainError::EmailAlreadyExists(user.email.clone()));
        }
        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut state = self.state.lock();
        if !state.users.get(&user.id).is_some_and(|u| !u.is_deleted()) {
            return Err(DomainError::UserNotFound);
        }
        if state.email_taken(&user.email, Some(&user.id)) {
            return Err(DomainError::EmailAlreadyExists(user.email.clone()));
        }
        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn soft_delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut state = self.state.lock();
        match state.users.get_mut(id) {
            Some(user) if !user.is_deleted() => {
                user.soft_delete();
                Ok(())
            }
            _ => Err(DomainError::UserNotFound),
        }
    }
}

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Company>, DomainError> {
        Ok(self.state.lock().companies.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Company>, DomainError> {
        Ok(self
            .state
            .lock()
            .companies
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Company>, DomainError> {
        let mut companies: Vec<Company> = self.state.lock().companies.values().cloned().collect();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    async fn create(&self, company: &Company) -> Result<Company, DomainError> {
        let mut state = self.state.lock();
        if state.companies.values().any(|c| c.name.eq_ignore_ascii_case(&company.name)) {
            return Err(DomainError::CompanyNameAlreadyExists(company.name.clone()));
        }
        state.companies.insert(company.id, company.clone());
        Ok(company.clone())
    }

    async fn update(&self, company: &Company) -> Result<Company, DomainError> {
        let mut state = self.state.lock();
        if !state.companies.contains_key(&company.id) {
            return Err(DomainError::CompanyNotFound);
        }
        if state
            .companies
            .values()
            .any(|c| c.id != company.id && c.name.eq_ignore_ascii_case(&company.name))
        {
            return Err(DomainError::CompanyNameAlreadyExists(company.name.clone()));
        }
        state.companies.insert(company.id, company.clone());
        Ok(company.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut state = self.state.lock();
        if state.companies.remove(id).is_none() {
            return Err(DomainError::CompanyNotFound);
        }

        let activity_ids: Vec<Uuid> = state
            .activities
            .values()
            .filter(|a| a.company_id == *id)
            .map(|a| a.id)
            .collect();
        for activity_id in &activity_ids {
            state.remove_activity(activity_id);
        }

        let user_ids: HashSet<Uuid> = state
            .users
            .values()
            .filter(|u| u.belongs_to(id))
            .map(|u| u.id)
            .collect();
        state.users.retain(|user_id, _| !user_ids.contains(user_id));
        state.registrations.retain(|(user_id, _), _| !user_ids.contains(user_id));
        state.invitations.retain(|_, inv| inv.company_id != *id);
        Ok(())
    }
}

#[async_trait]
impl ActivityRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Activity>, DomainError> {
        Ok(self.state.lock().activities.get(id).cloned())
    }

    async fn list_upcoming(&self, now: DateTime<Utc>, pagination: Pagination) -> Result<Page<Activity>, DomainError> {
        let upcoming = self
            .state
            .lock()
            .activities
            .values()
            .filter(|a| a.is_upcoming(now))
            .cloned()
            .collect();
        Ok(paginate(by_start_date(upcoming), pagination))
    }

    async fn list_by_company(&self, company_id: &Uuid) -> Result<Vec<Activity>, DomainError> {
        let activities = self
            .state
            .lock()
            .activities
            .values()
            .filter(|a| a.company_id == *company_id)
            .cloned()
            .collect();
        Ok(by_start_date(activities))
    }

    async fn list_by_guide(&self, guide_id: &Uuid, pagination: Pagination) -> Result<Page<Activity>, DomainError> {
        let activities = self
            .state
            .lock()
            .activities
            .values()
            .filter(|a| a.guide_id == *guide_id)
            .cloned()
            .collect();
        Ok(paginate(by_start_date(activities), pagination))
    }

    async fn list_for_participant(&self, user_id: &Uuid, pagination: Pagination) -> Result<Page<Activity>, DomainError> {
        let activities = {
            let state = self.state.lock();
            state
                .registrations
                .keys()
                .filter(|(uid, _)| uid == user_id)
                .filter_map(|(_, activity_id)| state.activities.get(activity_id).cloned())
                .collect()
        };
        Ok(paginate(by_start_date(activities), pagination))
    }

    async fn create(&self, activity: &Activity) -> Result<Activity, DomainError> {
        self.state.lock().activities.insert(activity.id, activity.clone());
        Ok(activity.clone())
    }

    async fn update(&self, activity: &Activity) -> Result<Activity, DomainError> {
        let mut state = self.state.lock();
        match state.activities.get_mut(&activity.id) {
            Some(stored) => {
                *stored = activity.clone();
                Ok(activity.clone())
            }
            None => Err(DomainError::ActivityNotFound),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        match self.state.lock().remove_activity(id) {
            Some(_) => Ok(()),
            None => Err(DomainError::ActivityNotFound),
        }
    }
}

#[async_trait]
impl RegistrationRepository for MemoryStore {
    async fn exists(&self, user_id: &Uuid, activity_id: &Uuid) -> Result<bool, DomainError> {
        Ok(self.state.lock().registrations.contains_key(&(*user_id, *activity_id)))
    }

    async fn begin(&self) -> Result<Box<dyn RegistrationTransaction>, DomainError> {
        Ok(Box::new(MemoryTransaction {
            state: self.state.clone(),
            staged: Vec::new(),
        }))
    }

    async fn detach(&self, user_id: &Uuid, activity_id: &Uuid) -> Result<bool, DomainError> {
        Ok(self
            .state
            .lock()
            .registrations
            .remove(&(*user_id, *activity_id))
            .is_some())
    }

    async fn count_for_activity(&self, activity_id: &Uuid) -> Result<i64, DomainError> {
        let count = self
            .state
            .lock()
            .registrations
            .keys()
            .filter(|(_, aid)| aid == activity_id)
            .count();
        Ok(count as i64)
    }

    async fn participants(&self, activity_id: &Uuid) -> Result<Vec<Participant>, DomainError> {
        let state = self.state.lock();
        let mut participants: Vec<Participant> = state
            .registrations
            .values()
            .filter(|r| r.activity_id == *activity_id)
            .filter_map(|r| {
                state.users.get(&r.user_id).map(|u| Participant {
                    user_id: u.id,
                    name: u.name.clone(),
                    email: u.email.clone(),
                    registered_at: r.created_at,
                })
            })
            .collect();
        participants.sort_by(|a, b| a.registered_at.cmp(&b.registered_at).then(a.user_id.cmp(&b.user_id)));
        Ok(participants)
    }
}

/// Inserts reserve their pair immediately; a second insert of the same pair
/// fails even before the first transaction commits.
struct MemoryTransaction {
    state: Arc<Mutex<MemoryState>>,
    staged: Vec<Registration>,
}

impl MemoryTransaction {
    fn release(&mut self) {
        if self.staged.is_empty() {
            return;
        }
        let mut state = self.state.lock();
        for registration in self.staged.drain(..) {
            state.reserved.remove(&(registration.user_id, registration.activity_id));
        }
    }
}

#[async_trait]
impl RegistrationTransaction for MemoryTransaction {
    async fn insert_association(&mut self, registration: &Registration) -> Result<(), DomainError> {
        let pair = (registration.user_id, registration.activity_id);
        let mut state = self.state.lock();
        if state.registrations.contains_key(&pair) || state.reserved.contains(&pair) {
            warn!(
                "Duplicate registration of user {} to activity {}",
                registration.user_id, registration.activity_id
            );
            return Err(DomainError::AlreadyRegistered);
        }
        state.reserved.insert(pair);
        drop(state);

        self.staged.push(registration.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let mut this = self;
        let staged = std::mem::take(&mut this.staged);
        let mut state = this.state.lock();
        for registration in staged {
            let pair = (registration.user_id, registration.activity_id);
            state.reserved.remove(&pair);
            state.registrations.insert(pair, registration);
        }
        debug!("Memory transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        let mut this = self;
        this.release();
        debug!("Memory transaction rolled back");
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
impl InvitationRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<RegistrationInvitation>, DomainError> {
        Ok(self
            .state
            .lock()
            .invitations
            .values()
            .find(|inv| inv.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_pending_by_digest(&self, digest: &str) -> Result<Option<RegistrationInvitation>, DomainError> {
        Ok(self
            .state
            .lock()
            .invitations
            .values()
            .find(|inv| inv.token_digest == digest && !inv.is_consumed())
            .cloned())
    }

    async fn create(&self, invitation: &RegistrationInvitation) -> Result<RegistrationInvitation, DomainError> {
        let mut state = self.state.lock();
        if state
            .invitations
            .values()
            .any(|inv| inv.email.eq_ignore_ascii_case(&invitation.email))
        {
            return Err(DomainError::InvitationAlreadyRequested(invitation.email.clone()));
        }
        state.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation.clone())
    }

    async fn mark_registered(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut state = self.state.lock();
        match state.invitations.get_mut(id) {
            Some(inv) if !inv.is_consumed() => {
                inv.registered_at = Some(at);
                Ok(())
            }
            _ => Err(DomainError::InvitationNotFound),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        self.state.lock().invitations.remove(id);
        Ok(())
    }
}
