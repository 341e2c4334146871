//! Application-wide constants

/// Activities shown per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 9;
pub const MAX_PAGE_SIZE: u32 = 100;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_PURPOSE_CONTINUE_REGISTRATION: &str = "continue_registration";
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 3600;
pub const DEFAULT_CONTINUATION_TOKEN_EXPIRY: i64 = 900;

pub const NO_IMAGE_THUMBNAIL: &str = "no_image.jpg";

pub const MSG_REGISTERED: &str = "You have successfully registered.";
pub const MSG_REGISTRATION_FAILED: &str = "Sorry, you have not registered to activity. Please try later.";
pub const MSG_ALREADY_REGISTERED: &str = "You are already registered to this activity.";
pub const MSG_WITHDRAWN: &str = "Activity removed!";
pub const MSG_NOT_REGISTERED: &str = "You are not registered to this activity.";
pub const MSG_INVITATION_ALREADY_REQUESTED: &str = "Invitation with this email address already requested.";
pub const MSG_INVITATION_EMAIL_MISMATCH: &str = "Invitation link does not match email indicated!";
