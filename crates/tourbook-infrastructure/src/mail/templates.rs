//! Mail bodies rendered with Handlebars.

use handlebars::Handlebars;
use serde_json::json;

use tourbook_core::domain::{RegistrationInvitation, RegistrationNotice, Role, User};

use super::transport::{MailError, OutgoingMail};

const REGISTRATION_CONFIRMED: &str = "registration_confirmed";
const INVITATION: &str = "invitation";

pub struct MailTemplates {
    registry: Handlebars<'static>,
    app_name: String,
}

impl MailTemplates {
    pub fn new(app_name: impl Into<String>) -> Result<Self, MailError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(
                REGISTRATION_CONFIRMED,
                include_str!("../../templates/registration_confirmed.hbs"),
            )
            .map_err(|e| MailError::Template(e.to_string()))?;
        registry
            .register_template_string(INVITATION, include_str!("../../templates/invitation.hbs"))
            .map_err(|e| MailError::Template(e.to_string()))?;

        Ok(Self {
            registry,
            app_name: app_name.into(),
        })
    }

    pub fn registration_confirmed(&self, recipient: &User, notice: &RegistrationNotice) -> Result<OutgoingMail, MailError> {
        let body = self
            .registry
            .render(
                REGISTRATION_CONFIRMED,
                &json!({
                    "name": recipient.name,
                    "activity_name": notice.activity_name,
                    "start_date": notice.start_date.format("%Y-%m-%d %H:%M").to_string(),
                    "guide_email": notice.guide_email,
                    "app_name": self.app_name,
                }),
            )
            .map_err(|e| MailError::Template(e.to_string()))?;

        Ok(OutgoingMail {
            to: recipient.email.clone(),
            subject: "You have successfully registered".to_string(),
            body,
        })
    }

    pub fn invitation(&self, invitation: &RegistrationInvitation, invite_url: &str) -> Result<OutgoingMail, MailError> {
        let role = match invitation.role {
            Role::CompanyOwner => "company owner",
            Role::Guide => "guide",
            Role::Administrator | Role::Customer => invitation.role.as_str(),
        };
        let body = self
            .registry
            .render(
                INVITATION,
                &json!({
                    "app_name": self.app_name,
                    "role": role,
                    "invite_url": invite_url,
                }),
            )
            .map_err(|e| MailError::Template(e.to_string()))?;

        Ok(OutgoingMail {
            to: invitation.email.clone(),
            subject: "Registration Invite Mail".to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn confirmation_mentions_activity_time_and_guide() {
        let templates = MailTemplates::new("Tourbook").unwrap();
        let user = User::new("Ann".into(), "ann@example.com".into(), "h".into(), Role::Customer, None).unwrap();
        let notice = RegistrationNotice {
            activity_name: "Canyon <walk>".into(),
            start_date: Utc.with_ymd_and_hms(2030, 5, 1, 9, 30, 0).unwrap(),
            guide_email: "guide@example.com".into(),
        };

        let mail = templates.registration_confirmed(&user, &notice).unwrap();
        assert_eq!(mail.to, "ann@example.com");
        assert!(mail.body.contains("Canyon <walk>"));
        assert!(mail.body.contains("2030-05-01 09:30"));
        assert!(mail.body.contains("guide@example.com"));
    }

    #[test]
    fn invitation_carries_the_link() {
        let templates = MailTemplates::new("Tourbook").unwrap();
        let invitation = RegistrationInvitation::new("new@example.com", "d".into(), Uuid::new_v4(), Role::CompanyOwner).unwrap();
        let mail = templates
            .invitation(&invitation, "https://tourbook.test/register?invitation_token=abc")
            .unwrap();
        assert_eq!(mail.to, "new@example.com");
        assert!(mail.body.contains("invitation_token=abc"));
        assert!(mail.body.contains("company owner"));
    }
}
