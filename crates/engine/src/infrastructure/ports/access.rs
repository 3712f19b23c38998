//! Access evaluation port.
//!
//! The evaluator is opaque: it receives (subject, action, resource) and
//! answers with a decision or fails.

use std::fmt;

use async_trait::async_trait;

use super::error::AccessError;

/// Rejected before it reaches the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("access request {0} cannot be empty")]
pub struct InvalidAccessRequest(pub &'static str);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessRequest {
    subject: String,
    action: String,
    resource: String,
}

impl AccessRequest {
    pub fn new(
        subject: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
    ) -> Result<Self, InvalidAccessRequest> {
        let (subject, action, resource) = (subject.into(), action.into(), resource.into());
        if subject.is_empty() {
            return Err(InvalidAccessRequest("subject"));
        }
        if action.is_empty() {
            return Err(InvalidAccessRequest("action"));
        }
        if resource.is_empty() {
            return Err(InvalidAccessRequest("resource"));
        }
        Ok(Self {
            subject,
            action,
            resource,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl fmt::Display for AccessRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.action, self.resource)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// No policy matched.
    DefaultDeny,
    Allow,
    Deny,
    /// Trusted system subject, policies skipped.
    SystemBypass,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefaultDeny => "default_deny",
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::SystemBypass => "system_bypass",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub effect: Effect,
    pub reason: String,
    pub policy_id: Option<String>,
}

impl Decision {
    pub fn new(effect: Effect, reason: impl Into<String>) -> Self {
        Self {
            effect,
            reason: reason.into(),
            policy_id: None,
        }
    }

    pub fn with_policy(mut self, policy_id: impl Into<String>) -> Self {
        self.policy_id = Some(policy_id.into());
        self
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self.effect, Effect::Allow | Effect::SystemBypass)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessEvaluator: Send + Sync {
    async fn evaluate(&self, request: AccessRequest) -> Result<Decision, AccessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parts_are_rejected_in_order() {
        assert_eq!(
            AccessRequest::new("", "", "").unwrap_err(),
            InvalidAccessRequest("subject")
        );
        assert_eq!(
            AccessRequest::new("char:1", "", "location:*").unwrap_err(),
            InvalidAccessRequest("action")
        );
        assert_eq!(
            AccessRequest::new("char:1", "read", "").unwrap_err(),
            InvalidAccessRequest("resource")
        );
    }

    #[test]
    fn allow_and_bypass_are_allowed() {
        assert!(Decision::new(Effect::Allow, "").is_allowed());
        assert!(Decision::new(Effect::SystemBypass, "").is_allowed());
        assert!(!Decision::new(Effect::Deny, "").is_allowed());
        assert!(!Decision::new(Effect::DefaultDeny, "").is_allowed());
    }
}
