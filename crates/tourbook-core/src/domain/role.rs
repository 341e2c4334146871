//! User roles

use serde::{Deserialize, Serialize};

/// Role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    CompanyOwner,
    Customer,
    Guide,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::CompanyOwner => "company_owner",
            Role::Customer => "customer",
            Role::Guide => "guide",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "administrator" => Some(Role::Administrator),
            "company_owner" => Some(Role::CompanyOwner),
            "customer" => Some(Role::Customer),
            "guide" => Some(Role::Guide),
            _ => None,
        }
    }

    /// Roles that can only be obtained through a company invitation.
    pub fn is_company_staff(&self) -> bool {
        matches!(self, Role::CompanyOwner | Role::Guide)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_codes_round_trip() {
        for role in [Role::Administrator, Role::CompanyOwner, Role::Customer, Role::Guide] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("root"), None);
    }
}
