// --- File: crates/relatify_common/src/services.rs ---
//! Service abstractions and the unified event model.
//!
//! This module defines the one event shape the UI layer consumes, plus the
//! traits the aggregation core talks through. The traits decouple the merge
//! logic from the concrete CRM backend and the concrete external provider,
//! so tests can inject deterministic fakes instead of a signed-in account.

use crate::civil::CivilDate;
use crate::error::RelatifyError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Wire value of the provider sentinel owner in `user_id`.
///
/// Internally the sentinel is a typed enum variant; this literal exists only
/// at the serialization boundary for UI compatibility. A CRM user id equal
/// to this string is reserved.
pub const PROVIDER_SENTINEL: &str = "outlook";

/// Prefix applied to provider event ids so they never collide with local ids
/// within a fetch window.
pub const PROVIDER_ID_PREFIX: &str = "outlook-";

/// Where an event came from. Merge never converts one into the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Local,
    Provider,
}

/// The owner an event is colored by: a CRM user, or the reserved identity
/// standing in for "events sourced from the external provider".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerId {
    Local(String),
    ProviderSentinel,
}

impl Serialize for OwnerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OwnerId::Local(id) => serializer.serialize_str(id),
            OwnerId::ProviderSentinel => serializer.serialize_str(PROVIDER_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for OwnerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Err(de::Error::custom("user_id must not be empty"));
        }
        if raw == PROVIDER_SENTINEL {
            Ok(OwnerId::ProviderSentinel)
        } else {
            Ok(OwnerId::Local(raw))
        }
    }
}

/// The unified calendar event returned to the UI layer.
///
/// `date` is always a civil day derived from the creator's wall clock;
/// `start_time`/`end_time` are present only for provider events that carry
/// time-of-day. `color` is filled in by the orchestrator at merge time and
/// is never absent in anything it returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalendarEvent {
    pub id: String,
    #[serde(rename = "event_text")]
    pub text: String,
    #[serde(rename = "event_date")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub date: CivilDate,
    pub color: Option<String>,
    #[serde(rename = "user_id")]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub owner: OwnerId,
    pub source: EventSource,
    #[serde(rename = "startTime", skip_serializing_if = "Option::is_none", default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none", default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preview: Option<String>,
    #[serde(
        rename = "isAllDay",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub is_all_day: Option<bool>,
}

/// Request body for creating a local CRM event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewLocalEvent {
    pub event_text: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub event_date: CivilDate,
    pub color: Option<String>,
}

/// Request for creating an event on the external provider's calendar.
///
/// `end_time` may be omitted; the gateway applies the default duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewProviderEvent {
    pub subject: String,
    #[serde(rename = "startTime")]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub start_time: DateTime<FixedOffset>,
    #[serde(rename = "endTime", default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Data-access boundary for CRM-native calendar events.
///
/// No merge logic lives behind this trait; it exists so the orchestrator can
/// treat the local and provider sources symmetrically. Failures propagate:
/// the local store is the system of record.
#[async_trait]
pub trait LocalCalendarApi: Send + Sync {
    /// List events whose civil date falls within `[start, end]` inclusive.
    async fn list(
        &self,
        start: CivilDate,
        end: CivilDate,
    ) -> Result<Vec<CalendarEvent>, RelatifyError>;

    /// Create an event; returns the stored event with its assigned id.
    async fn create(&self, event: NewLocalEvent) -> Result<CalendarEvent, RelatifyError>;

    /// Delete an event by id.
    async fn delete(&self, id: &str) -> Result<(), RelatifyError>;
}

/// The external calendar provider, seen through the unified event shape.
///
/// List failures are the caller's to degrade; create/delete failures always
/// surface because they answer a user-initiated action.
#[async_trait]
pub trait ProviderCalendarApi: Send + Sync {
    /// Whether a provider account is currently linked. When false the
    /// orchestrator skips the provider branch entirely.
    async fn is_linked(&self) -> bool;

    /// List provider events overlapping the civil-day window.
    async fn list_events(
        &self,
        start: CivilDate,
        end: CivilDate,
    ) -> Result<Vec<CalendarEvent>, RelatifyError>;

    /// Create a provider event; returns the provider-assigned id (unprefixed).
    async fn create_event(&self, event: NewProviderEvent) -> Result<String, RelatifyError>;

    /// Delete a provider event by its unprefixed provider id. Best-effort:
    /// the caller may proceed with its own bookkeeping on failure, but the
    /// failure is still reported.
    async fn delete_event(&self, provider_id: &str) -> Result<(), RelatifyError>;
}
