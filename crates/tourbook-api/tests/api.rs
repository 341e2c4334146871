//! HTTP-level tests: router + services + in-memory store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use tourbook_api::{build_router, AppState, Gateways, StateSettings};
use tourbook_core::domain::{
    Activity, ActivityDraft, Company, Money, RegistrationInvitation, RegistrationNotice, Role, User,
};
use tourbook_core::error::DomainError;
use tourbook_core::ports::{InvitationMailer, Notifier};
use tourbook_core::repositories::Repositories;
use tourbook_infrastructure::{LocalPhotoStorage, MemoryStore};
use tourbook_security::PasswordService;

const PASSWORD: &str = "correct horse battery";

#[derive(Default)]
struct RecordingNotifier {
    failing: AtomicBool,
    sent: Mutex<Vec<(Uuid, RegistrationNotice)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &User, notice: &RegistrationNotice) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::NotificationError("mail queue is full".into()));
        }
        self.sent.lock().push((recipient.id, notice.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingMailer {
    urls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl InvitationMailer for RecordingMailer {
    async fn send_invitation(&self, invitation: &RegistrationInvitation, invite_url: &str) -> Result<(), DomainError> {
        self.urls.lock().push((invitation.email.clone(), invite_url.to_string()));
        Ok(())
    }
}

struct TestApp {
    router: Router,
    repos: Repositories,
    store: MemoryStore,
    notifier: Arc<RecordingNotifier>,
    mailer: Arc<RecordingMailer>,
    photos: TempDir,
    company: Company,
    admin: User,
    owner: User,
    guide: User,
    customer: User,
    activity: Activity,
}

async fn user(repos: &Repositories, email: &str, role: Role, company_id: Option<Uuid>) -> User {
    let hash = PasswordService::hash(PASSWORD).unwrap();
    let user = User::new(format!("{} user", role.as_str()), email.to_string(), hash, role, company_id).unwrap();
    repos.users.create(&user).await.unwrap()
}

async fn activity(repos: &Repositories, company: &Company, guide: &User, name: &str, days: i64) -> Activity {
    let draft = ActivityDraft {
        name: name.to_string(),
        description: "A day outside".to_string(),
        start_date: Utc::now() + Duration::days(days),
        price: Money::from_minor(2_500),
        guide_id: guide.id,
    };
    let activity = Activity::new(company.id, draft, None).unwrap();
    repos.activities.create(&activity).await.unwrap()
}

async fn app() -> TestApp {
    let store = MemoryStore::new();
    let repos = store.repositories();
    let notifier = Arc::new(RecordingNotifier::default());
    let mailer = Arc::new(RecordingMailer::default());
    let photos = TempDir::new().unwrap();

    let company = repos.companies.create(&Company::new("Acme Tours".into()).unwrap()).await.unwrap();
    let admin = user(&repos, "admin@tourbook.test", Role::Administrator, None).await;
    let owner = user(&repos, "owner@acme.test", Role::CompanyOwner, Some(company.id)).await;
    let guide = user(&repos, "guide@acme.test", Role::Guide, Some(company.id)).await;
    let customer = user(&repos, "customer@mail.test", Role::Customer, None).await;
    let activity = activity(&repos, &company, &guide, "Glacier hike", 7).await;

    let state = AppState::new(
        &repos,
        Gateways {
            notifier: notifier.clone(),
            mailer: mailer.clone(),
            photos: Arc::new(LocalPhotoStorage::new(photos.path())),
        },
        StateSettings {
            jwt_secret: "test-secret-with-enough-length-1234567890".to_string(),
            access_token_expiry: 3600,
            continuation_token_expiry: 900,
            public_url: "http://tourbook.test/".to_string(),
        },
    );

    TestApp {
        router: build_router(state),
        repos,
        store,
        notifier,
        mailer,
        photos,
        company,
        admin,
        owner,
        guide,
        customer,
        activity,
    }
}

impl TestApp {
    async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.call(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.call(builder.body(Body::empty()).unwrap()).await
    }

    async fn login(&self, user: &User) -> String {
        let (status, body) = self
            .json(Method::POST, "/api/v1/auth/login", None, json!({ "email": user.email, "password": PASSWORD }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["access_token"].as_str().unwrap().to_string()
    }

    fn register_uri(&self) -> String {
        format!("/api/v1/activities/{}/register", self.activity.id)
    }
}

fn multipart(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let boundary = "tourbook-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = app.get("/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn anonymous_registration_resumes_after_sign_up() {
    let app = app().await;

    let (status, body) = app.json(Method::POST, &app.register_uri(), None, Value::Null).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    assert_eq!(body["data"]["activity_id"], app.activity.id.to_string());
    let continuation = body["data"]["continuation_token"].as_str().unwrap().to_string();
    assert_eq!(app.store.registration_count(), 0);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/register",
            None,
            json!({
                "name": "New Customer",
                "email": "new@mail.test",
                "password": PASSWORD,
                "continuation_token": continuation,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["role"], "customer");
    assert!(body["data"]["user"].get("password").is_none());
    assert_eq!(body["data"]["registration"]["status"], "success");

    let new_id: Uuid = body["data"]["user"]["id"].as_str().unwrap().parse().unwrap();
    assert!(app.repos.registrations.exists(&new_id, &app.activity.id).await.unwrap());
    assert_eq!(app.notifier.sent.lock().len(), 1);
}

#[tokio::test]
async fn anonymous_registration_to_unknown_activity_is_not_found() {
    let app = app().await;
    let uri = format!("/api/v1/activities/{}/register", Uuid::new_v4());
    let (status, _) = app.json(Method::POST, &uri, None, Value::Null).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_resumes_registration() {
    let app = app().await;
    let (_, body) = app.json(Method::POST, &app.register_uri(), None, Value::Null).await;
    let continuation = body["data"]["continuation_token"].as_str().unwrap().to_string();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/login",
            None,
            json!({ "email": app.customer.email, "password": PASSWORD, "continuation_token": continuation }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["registration"]["status"], "success");
    assert!(app.repos.registrations.exists(&app.customer.id, &app.activity.id).await.unwrap());
}

#[tokio::test]
async fn tampered_continuation_token_is_rejected() {
    let app = app().await;
    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/auth/login",
            None,
            json!({ "email": app.customer.email, "password": PASSWORD, "continuation_token": "not-a-token" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn second_registration_is_a_conflict() {
    let app = app().await;
    let token = app.login(&app.customer).await;

    let (status, body) = app.json(Method::POST, &app.register_uri(), Some(&token), Value::Null).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["message"], "You have successfully registered.");

    let (status, body) = app.json(Method::POST, &app.register_uri(), Some(&token), Value::Null).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ALREADY_REGISTERED");
    assert_eq!(app.store.registration_count(), 1);
    assert_eq!(app.notifier.sent.lock().len(), 1);
}

#[tokio::test]
async fn notifier_failure_is_reported_and_rolled_back() {
    let app = app().await;
    let token = app.login(&app.customer).await;
    app.notifier.failing.store(true, Ordering::SeqCst);

    let (status, body) = app.json(Method::POST, &app.register_uri(), Some(&token), Value::Null).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "REGISTRATION_FAILED");
    assert_eq!(
        body["error"]["message"],
        "Sorry, you have not registered to activity. Please try later."
    );
    assert_eq!(app.store.registration_count(), 0);
}

#[tokio::test]
async fn withdraw_then_withdraw_again() {
    let app = app().await;
    let token = app.login(&app.customer).await;
    app.json(Method::POST, &app.register_uri(), Some(&token), Value::Null).await;

    let (status, body) = app.get("/api/v1/my-activities", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], app.activity.id.to_string());

    let uri = format!("/api/v1/my-activities/{}", app.activity.id);
    let (status, body) = app.json(Method::DELETE, &uri, Some(&token), Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Activity removed!");

    let (status, body) = app.json(Method::DELETE, &uri, Some(&token), Value::Null).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "You are not registered to this activity.");
}

#[tokio::test]
async fn catalog_pages_hold_nine_upcoming_activities() {
    let app = app().await;
    for day in 1..=10 {
        activity(&app.repos, &app.company, &app.guide, &format!("Tour {day}"), day).await;
    }
    activity(&app.repos, &app.company, &app.guide, "Yesterday's tour", -1).await;

    let (status, body) = app.get("/api/v1/activities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 11);
    assert_eq!(body["data"]["per_page"], 9);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 9);
    assert_eq!(body["data"]["items"][0]["thumbnail"], "/activities/thumbs/no_image.jpg");

    let (_, body) = app.get("/api/v1/activities?page=2", None).await;
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn activity_details_show_guide_and_registration_state() {
    let app = app().await;
    let token = app.login(&app.customer).await;
    let uri = format!("/api/v1/activities/{}", app.activity.id);

    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["guide"]["email"], app.guide.email);
    assert_eq!(body["data"]["registered"], false);
    assert_eq!(body["data"]["price"], 25.0);

    app.json(Method::POST, &app.register_uri(), Some(&token), Value::Null).await;
    let (_, body) = app.get(&uri, Some(&token)).await;
    assert_eq!(body["data"]["registered"], true);
    assert_eq!(body["data"]["participants_count"], 1);
}

#[tokio::test]
async fn roles_are_enforced() {
    let app = app().await;
    let customer = app.login(&app.customer).await;
    let owner = app.login(&app.owner).await;

    let (status, _) = app.get("/api/v1/companies", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/v1/companies", Some(&customer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "You are not allowed to perform this action.");

    let (status, _) = app.get("/api/v1/guide/activities", Some(&customer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&format!("/api/v1/companies/{}/activities", app.company.id), Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);

    let other = app.repos.companies.create(&Company::new("Other Tours".into()).unwrap()).await.unwrap();
    let (status, _) = app.get(&format!("/api/v1/companies/{}/activities", other.id), Some(&owner)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/v1/my-activities", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn guide_sees_participants_of_own_activity_only() {
    let app = app().await;
    let customer = app.login(&app.customer).await;
    let guide = app.login(&app.guide).await;
    app.json(Method::POST, &app.register_uri(), Some(&customer), Value::Null).await;

    let (status, body) = app.get("/api/v1/guide/activities", Some(&guide)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let uri = format!("/api/v1/guide/activities/{}/participants", app.activity.id);
    let (status, body) = app.get(&uri, Some(&guide)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["email"], app.customer.email);

    let other_guide = user(&app.repos, "other.guide@acme.test", Role::Guide, Some(app.company.id)).await;
    let other = app.login(&other_guide).await;
    let (status, _) = app.get(&uri, Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn administrator_manages_companies() {
    let app = app().await;
    let admin = app.login(&app.admin).await;

    let (status, body) = app.json(Method::POST, "/api/v1/companies", Some(&admin), json!({ "name": "Fjord Trips" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app.json(Method::POST, "/api/v1/companies", Some(&admin), json!({ "name": "fjord trips" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/api/v1/companies/{id}");
    let (status, body) = app.json(Method::PUT, &uri, Some(&admin), json!({ "name": "Fjord Trips AS" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Fjord Trips AS");

    let (status, _) = app.json(Method::DELETE, &uri, Some(&admin), Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invited_guide_joins_company() {
    let app = app().await;
    let admin = app.login(&app.admin).await;
    let uri = format!("/api/v1/companies/{}/guides", app.company.id);

    let (status, body) = app.json(Method::POST, &uri, Some(&admin), json!({ "email": "New.Guide@acme.test" })).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["data"].get("token_digest").is_none());

    let (status, body) = app.json(Method::POST, &uri, Some(&admin), json!({ "email": "new.guide@acme.test" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["message"], "Invitation with this email address already requested.");

    let (email, url) = app.mailer.urls.lock()[0].clone();
    assert_eq!(email, "new.guide@acme.test");
    assert!(url.starts_with("http://tourbook.test/register?invitation_token="));
    let token = url.rsplit_once('=').unwrap().1.to_string();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/register",
            None,
            json!({ "name": "Someone", "email": "someone@else.test", "password": PASSWORD, "invitation_token": token }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["message"], "Invitation link does not match email indicated!");

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/register",
            None,
            json!({ "name": "New Guide", "email": "new.guide@acme.test", "password": PASSWORD, "invitation_token": token }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["role"], "guide");
    assert_eq!(body["data"]["user"]["company_id"], app.company.id.to_string());

    let (_, body) = app.get(&uri, Some(&admin)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn owner_creates_activity_with_photo() {
    let app = app().await;
    let owner = app.login(&app.owner).await;
    let guide_id = app.guide.id.to_string();
    let (content_type, body) = multipart(
        &[
            ("name", "Sunset kayak"),
            ("description", "Two hours on calm water"),
            ("start_date", "2099-06-01 18:30"),
            ("price", "49.90"),
            ("guide_id", &guide_id),
        ],
        Some(("sunset.png", &[137, 80, 78, 71])),
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/companies/{}/activities", app.company.id))
        .header(header::CONTENT_TYPE, content_type)
        .header(header::AUTHORIZATION, format!("Bearer {}", owner))
        .body(Body::from(body))
        .unwrap();
    let (status, body) = app.call(request).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["price"], 49.9);

    let photo = body["data"]["photo"].as_str().unwrap();
    assert!(photo.ends_with(".png"));
    assert_eq!(body["data"]["thumbnail"], format!("/activities/thumbs/{}", photo));
    assert!(app.photos.path().join(photo).exists());

    let id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();
    let stored = app.repos.activities.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.price, Money::from_minor(4_990));
}

#[tokio::test]
async fn activity_form_rejects_foreign_guide() {
    let app = app().await;
    let owner = app.login(&app.owner).await;
    let foreign = Uuid::new_v4().to_string();
    let (content_type, body) = multipart(
        &[
            ("name", "Sunset kayak"),
            ("description", "Two hours on calm water"),
            ("start_date", "2099-06-01 18:30"),
            ("price", "49.90"),
            ("guide_id", &foreign),
        ],
        None,
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/companies/{}/activities", app.company.id))
        .header(header::CONTENT_TYPE, content_type)
        .header(header::AUTHORIZATION, format!("Bearer {}", owner))
        .body(Body::from(body))
        .unwrap();
    let (status, _) = app.call(request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn guide_leading_an_activity_stays_until_it_is_deleted() {
    let app = app().await;
    let owner = app.login(&app.owner).await;
    let guide_uri = format!("/api/v1/companies/{}/guides/{}", app.company.id, app.guide.id);

    let (status, body) = app.json(Method::DELETE, &guide_uri, Some(&owner), Value::Null).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let activity_uri = format!("/api/v1/companies/{}/activities/{}", app.company.id, app.activity.id);
    let (status, _) = app.json(Method::DELETE, &activity_uri, Some(&owner), Value::Null).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.json(Method::DELETE, &guide_uri, Some(&owner), Value::Null).await;
    assert_eq!(status, StatusCode::OK);
}
