//! # Tourbook Security
//! 
//! Security utilities: password hashing, signed tokens, invitation tokens.

pub mod jwt;
pub mod password;
pub mod invitation;

pub use jwt::{JwtService, JwtError, Claims, ContinuationClaims};
pub use password::PasswordService;
pub use invitation::InvitationToken;
