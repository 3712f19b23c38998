//! Grant-table access evaluator for local runs and tests.

use async_trait::async_trait;
use dashmap::DashSet;

use crate::infrastructure::ports::{AccessError, AccessEvaluator, AccessRequest, Decision, Effect};

/// Subject that bypasses the grant table.
pub const SYSTEM_SUBJECT: &str = "system";

const GRANT_POLICY: &str = "grant-table";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Grant {
    subject: String,
    action: String,
    resource: String,
}

/// Allows exactly the `(subject, action, resource)` triples it was given.
#[derive(Default)]
pub struct GrantEvaluator {
    grants: DashSet<Grant>,
}

impl GrantEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, subject: impl Into<String>, action: impl Into<String>, resource: impl Into<String>) {
        self.grants.insert(Grant {
            subject: subject.into(),
            action: action.into(),
            resource: resource.into(),
        });
    }

    pub fn revoke(&self, subject: &str, action: &str, resource: &str) -> bool {
        self.grants
            .remove(&Grant {
                subject: subject.to_string(),
                action: action.to_string(),
                resource: resource.to_string(),
            })
            .is_some()
    }
}

#[async_trait]
impl AccessEvaluator for GrantEvaluator {
    async fn evaluate(&self, request: AccessRequest) -> Result<Decision, AccessError> {
        if request.subject() == SYSTEM_SUBJECT {
            return Ok(Decision::new(Effect::SystemBypass, "system subject"));
        }
        let grant = Grant {
            subject: request.subject().to_string(),
            action: request.action().to_string(),
            resource: request.resource().to_string(),
        };
        if self.grants.contains(&grant) {
            Ok(Decision::new(Effect::Allow, "granted").with_policy(GRANT_POLICY))
        } else {
            Ok(Decision::new(Effect::DefaultDeny, "no matching grant"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(subject: &str, action: &str, resource: &str) -> AccessRequest {
        AccessRequest::new(subject, action, resource).unwrap()
    }

    #[tokio::test]
    async fn exact_grants_only() {
        let evaluator = GrantEvaluator::new();
        evaluator.grant("character:alice", "read", "location:hall");

        let allowed = evaluator
            .evaluate(request("character:alice", "read", "location:hall"))
            .await
            .unwrap();
        assert_eq!(allowed.effect, Effect::Allow);
        assert_eq!(allowed.policy_id.as_deref(), Some(GRANT_POLICY));

        let denied = evaluator
            .evaluate(request("character:alice", "write", "location:hall"))
            .await
            .unwrap();
        assert_eq!(denied.effect, Effect::DefaultDeny);
    }

    #[tokio::test]
    async fn system_bypasses() {
        let evaluator = GrantEvaluator::new();
        let decision = evaluator
            .evaluate(request(SYSTEM_SUBJECT, "delete", "location:*"))
            .await
            .unwrap();
        assert!(decision.is_allowed());
        assert_eq!(decision.effect, Effect::SystemBypass);
    }

    #[tokio::test]
    async fn revoke_removes_grant() {
        let evaluator = GrantEvaluator::new();
        evaluator.grant("character:bob", "read", "object:*");
        assert!(evaluator.revoke("character:bob", "read", "object:*"));
        assert!(!evaluator.revoke("character:bob", "read", "object:*"));
        let decision = evaluator
            .evaluate(request("character:bob", "read", "object:*"))
            .await
            .unwrap();
        assert!(!decision.is_allowed());
    }
}
