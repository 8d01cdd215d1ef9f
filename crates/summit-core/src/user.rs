use serde::{Deserialize, Serialize};

use crate::ids::{CompanyId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Technician,
    Dispatcher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Technician => "technician",
            Self::Dispatcher => "dispatcher",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "technician" => Some(Self::Technician),
            "dispatcher" => Some(Self::Dispatcher),
            _ => None,
        }
    }
}

/// A platform user. Technicians and dispatchers belong to a company;
/// admins are platform-wide and carry no company association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    role: Role,
    company_id: Option<CompanyId>,
}

impl User {
    pub fn new(username: String, email: String, role: Role, company_id: Option<CompanyId>) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            role,
            company_id,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn company_id(&self) -> Option<&CompanyId> {
        self.company_id.as_ref()
    }

    pub fn belongs_to(&self, company: &CompanyId) -> bool {
        self.company_id.as_ref() == Some(company)
    }
}
