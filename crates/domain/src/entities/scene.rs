//! Scene participation. Scenes themselves are locations of type `scene`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::CharacterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Owner,
    Member,
    Invited,
}

impl ParticipantRole {
    pub const ALL: [ParticipantRole; 3] = [Self::Owner, Self::Member, Self::Invited];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
            Self::Invited => "invited",
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "member" => Ok(Self::Member),
            "invited" => Ok(Self::Invited),
            other => Err(DomainError::InvalidParticipantRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneParticipant {
    pub character_id: CharacterId,
    pub role: ParticipantRole,
}

impl SceneParticipant {
    pub fn new(character_id: CharacterId, role: ParticipantRole) -> Self {
        Self { character_id, role }
    }
}
