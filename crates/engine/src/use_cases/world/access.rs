//! Access checks for world operations.

use std::fmt;

use mushworld_domain::PropertyParent;

use super::{AccessFailure, EntityKind, WorldError, WorldResult, WorldService};
use crate::infrastructure::ports::AccessRequest;
use crate::request_context::RequestContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Write,
    Delete,
    ListCharacters,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::ListCharacters => "list_characters",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespace of an access-controlled resource string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Location,
    Exit,
    Object,
    Character,
    Scene,
    Property,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Exit => "exit",
            Self::Object => "object",
            Self::Character => "character",
            Self::Scene => "scene",
            Self::Property => "property",
        }
    }

    /// `kind:id`
    pub fn resource(&self, id: impl fmt::Display) -> String {
        format!("{}:{}", self.as_str(), id)
    }

    /// `kind:*`, for actions not yet bound to an id.
    pub fn wildcard(&self) -> String {
        format!("{}:*", self.as_str())
    }
}

impl From<PropertyParent> for ResourceKind {
    fn from(parent: PropertyParent) -> Self {
        match parent {
            PropertyParent::Character(_) => Self::Character,
            PropertyParent::Location(_) => Self::Location,
            PropertyParent::Object(_) => Self::Object,
        }
    }
}

impl WorldService {
    /// Asks the evaluator whether `subject` may perform `action` on `resource`.
    ///
    /// Evaluator failures and interruptions are reported as evaluation
    /// failures, never as denials.
    pub(super) async fn check_access(
        &self,
        ctx: &RequestContext,
        subject: &str,
        action: Action,
        resource: &str,
        entity: EntityKind,
    ) -> WorldResult<()> {
        let request = match AccessRequest::new(subject, action.as_str(), resource) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(
                    subject,
                    action = %action,
                    resource,
                    error = %e,
                    "malformed access request"
                );
                return Err(WorldError::AccessEvaluationFailed {
                    entity,
                    source: AccessFailure::from(e),
                });
            }
        };

        let decision = match ctx.run(self.access.evaluate(request)).await {
            Ok(Ok(decision)) => decision,
            Ok(Err(e)) => {
                tracing::error!(
                    subject,
                    action = %action,
                    resource,
                    error = %e,
                    "access evaluation failed"
                );
                return Err(WorldError::AccessEvaluationFailed {
                    entity,
                    source: AccessFailure::from(e),
                });
            }
            Err(interrupted) => {
                tracing::error!(
                    subject,
                    action = %action,
                    resource,
                    error = %interrupted,
                    "access evaluation interrupted"
                );
                return Err(WorldError::AccessEvaluationFailed {
                    entity,
                    source: AccessFailure::from(interrupted),
                });
            }
        };

        if decision.is_allowed() {
            return Ok(());
        }

        tracing::debug!(
            subject,
            action = %action,
            resource,
            effect = decision.effect.as_str(),
            reason = %decision.reason,
            policy_id = ?decision.policy_id,
            "access denied"
        );
        Err(WorldError::AccessDenied {
            entity,
            reason: decision.reason,
            policy_id: decision.policy_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mushworld_domain::{CharacterId, LocationId};

    #[test]
    fn resources_are_namespaced() {
        let id = LocationId::new();
        assert_eq!(ResourceKind::Location.resource(id), format!("location:{}", id));
        assert_eq!(ResourceKind::Exit.wildcard(), "exit:*");
        assert_eq!(Action::ListCharacters.as_str(), "list_characters");
    }

    #[test]
    fn property_parent_maps_to_owner_namespace() {
        let parent = PropertyParent::Character(CharacterId::new());
        assert_eq!(ResourceKind::from(parent), ResourceKind::Character);
    }
}
