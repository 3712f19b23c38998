//! Event emission with exponential backoff retry
//!
//! Turns a validated payload into a publisher call on a deterministic stream.
//! Delivery is retried with exponential backoff; every attempt and every
//! backoff wait is bounded by the caller's [`RequestContext`].

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use mushworld_domain::{
    DomainError, EventType, ExaminePayload, MovePayload, ObjectCreatePayload, ObjectGivePayload,
};
use rand::Rng;
use serde::Serialize;

use crate::infrastructure::ports::{EventPublisher, PublishError};
use crate::request_context::{Interrupted, RequestContext};

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the initial attempt (3 means 4 attempts total)
    pub max_retries: u32,
    /// Delay in milliseconds before the first retry
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,
    /// Jitter factor (0.0-1.0); 0 keeps delays deterministic
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 50,
            max_delay_ms: 2000,
            jitter_factor: 0.0,
        }
    }
}

impl RetryConfig {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based): base * 2^(retry-1), capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponential = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(retry.saturating_sub(1)));
        let capped = exponential.min(self.max_delay_ms);

        let jitter_range = (capped as f64 * self.jitter_factor) as i64;
        let millis = if jitter_range > 0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped as i64 + jitter).max(0) as u64
        } else {
            capped
        };
        Duration::from_millis(millis)
    }
}

/// What an absent publisher means for optional emissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PublisherMode {
    /// Missing publisher is a configuration error.
    #[default]
    Hard,
    /// Optional emissions become no-ops.
    Soft,
}

impl FromStr for PublisherMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(Self::Hard),
            "soft" => Ok(Self::Soft),
            other => Err(format!("unknown publisher mode: {}", other)),
        }
    }
}

/// Declared per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Always needs a publisher.
    Required,
    /// Follows [`PublisherMode`] when no publisher is configured.
    Optional,
}

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("no event publisher configured")]
    PublisherMissing,

    #[error("invalid event payload")]
    InvalidPayload(#[source] DomainError),

    #[error("failed to serialize event payload")]
    Serialization(#[from] serde_json::Error),

    #[error("delivery to {stream} failed after {attempts} attempts")]
    DeliveryFailed {
        stream: String,
        attempts: u32,
        #[source]
        source: PublishError,
    },

    #[error("delivery to {stream} interrupted after {attempts} attempts")]
    Interrupted {
        stream: String,
        attempts: u32,
        #[source]
        source: Interrupted,
    },
}

impl EmitError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PublisherMissing => "EVENT_EMITTER_MISSING",
            Self::InvalidPayload(_) => "EVENT_PAYLOAD_INVALID",
            Self::Serialization(_) => "EVENT_MARSHAL_FAILED",
            Self::DeliveryFailed { .. } => "EVENT_EMIT_FAILED",
            Self::Interrupted { .. } => "EVENT_EMIT_CANCELLED",
        }
    }

    /// Number of publish attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::DeliveryFailed { attempts, .. } | Self::Interrupted { attempts, .. } => *attempts,
            _ => 0,
        }
    }
}

/// Publishes world events with retry.
#[derive(Clone)]
pub struct EventEmitter {
    publisher: Option<Arc<dyn EventPublisher>>,
    mode: PublisherMode,
    retry: RetryConfig,
}

impl EventEmitter {
    pub fn new(
        publisher: Option<Arc<dyn EventPublisher>>,
        mode: PublisherMode,
        retry: RetryConfig,
    ) -> Self {
        Self {
            publisher,
            mode,
            retry,
        }
    }

    /// True when no publisher is configured.
    pub fn is_degraded(&self) -> bool {
        self.publisher.is_none()
    }

    pub fn mode(&self) -> PublisherMode {
        self.mode
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Fails when a call with `requirement` could not publish at all.
    pub fn ensure_available(&self, requirement: Requirement) -> Result<(), EmitError> {
        match (&self.publisher, requirement, self.mode) {
            (Some(_), _, _) => Ok(()),
            (None, Requirement::Optional, PublisherMode::Soft) => Ok(()),
            (None, _, _) => Err(EmitError::PublisherMissing),
        }
    }

    /// Moves go to the destination's stream.
    pub async fn emit_move(&self, ctx: &RequestContext, payload: &MovePayload) -> Result<(), EmitError> {
        self.ensure_available(Requirement::Required)?;
        payload.validate().map_err(EmitError::InvalidPayload)?;
        let stream = payload.stream().ok_or_else(|| {
            EmitError::InvalidPayload(DomainError::validation("to_type", "has no stream"))
        })?;
        self.emit(ctx, Requirement::Required, &stream, EventType::Move, payload)
            .await
    }

    /// Informational broadcast; tolerates a missing publisher in soft mode.
    pub async fn emit_object_create(
        &self,
        ctx: &RequestContext,
        payload: &ObjectCreatePayload,
    ) -> Result<(), EmitError> {
        self.ensure_available(Requirement::Optional)?;
        payload.validate().map_err(EmitError::InvalidPayload)?;
        self.emit(ctx, Requirement::Optional, &payload.stream(), EventType::ObjectCreate, payload)
            .await
    }

    /// Examines go to the examiner's location stream.
    pub async fn emit_examine(
        &self,
        ctx: &RequestContext,
        payload: &ExaminePayload,
    ) -> Result<(), EmitError> {
        self.ensure_available(Requirement::Required)?;
        payload.validate().map_err(EmitError::InvalidPayload)?;
        self.emit(ctx, Requirement::Required, &payload.stream(), EventType::ObjectExamine, payload)
            .await
    }

    /// Gives go to the recipient's character stream.
    pub async fn emit_object_give(
        &self,
        ctx: &RequestContext,
        payload: &ObjectGivePayload,
    ) -> Result<(), EmitError> {
        self.ensure_available(Requirement::Required)?;
        payload.validate().map_err(EmitError::InvalidPayload)?;
        self.emit(ctx, Requirement::Required, &payload.stream(), EventType::ObjectGive, payload)
            .await
    }

    async fn emit<P: Serialize>(
        &self,
        ctx: &RequestContext,
        requirement: Requirement,
        stream: &str,
        event_type: EventType,
        payload: &P,
    ) -> Result<(), EmitError> {
        let Some(publisher) = self.publisher.as_deref() else {
            tracing::debug!(
                stream,
                event_type = %event_type,
                ?requirement,
                "no event publisher configured, skipping emission"
            );
            return Ok(());
        };
        let bytes = serde_json::to_vec(payload)?;
        self.deliver(ctx, publisher, stream, event_type, &bytes).await
    }

    async fn deliver(
        &self,
        ctx: &RequestContext,
        publisher: &dyn EventPublisher,
        stream: &str,
        event_type: EventType,
        bytes: &[u8],
    ) -> Result<(), EmitError> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match ctx.run(publisher.publish(stream, event_type, bytes)).await {
                Ok(Ok(())) => {
                    if attempt > 1 {
                        tracing::debug!(stream, event_type = %event_type, attempt, "event published after retry");
                    }
                    return Ok(());
                }
                Ok(Err(e)) => e,
                Err(interrupted) => {
                    tracing::warn!(
                        stream,
                        event_type = %event_type,
                        attempt,
                        reason = %interrupted,
                        "event publish interrupted"
                    );
                    return Err(EmitError::Interrupted {
                        stream: stream.to_string(),
                        attempts: attempt,
                        source: interrupted,
                    });
                }
            };

            tracing::debug!(
                stream,
                event_type = %event_type,
                attempt,
                max_attempts,
                error = %error,
                "event publish failed"
            );

            if attempt >= max_attempts {
                tracing::error!(
                    stream,
                    event_type = %event_type,
                    attempts = attempt,
                    error = %error,
                    "event publish failed after all retry attempts"
                );
                return Err(EmitError::DeliveryFailed {
                    stream: stream.to_string(),
                    attempts: attempt,
                    source: error,
                });
            }

            if let Err(interrupted) = ctx.sleep(self.retry.delay_for(attempt)).await {
                tracing::warn!(
                    stream,
                    event_type = %event_type,
                    attempt,
                    reason = %interrupted,
                    "event publish retry cancelled"
                );
                return Err(EmitError::Interrupted {
                    stream: stream.to_string(),
                    attempts: attempt,
                    source: interrupted,
                });
            }
        }
    }
}
