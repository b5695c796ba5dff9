use serde::{Deserialize, Serialize};

/// Which side of the marketplace an account belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Company,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Company => "company",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "company" => Some(Role::Company),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Login body shared by both account kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Register/login `data`: the public account fields plus the issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload<T> {
    #[serde(flatten)]
    pub account: T,
    pub token: String,
}

/// Either kind of account, serialized as the record itself.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Account {
    User(super::User),
    Company(super::Company),
}

impl Account {
    pub fn id(&self) -> &str {
        match self {
            Account::User(u) => &u.id,
            Account::Company(c) => &c.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Account::User(_) => Role::User,
            Account::Company(_) => Role::Company,
        }
    }
}
