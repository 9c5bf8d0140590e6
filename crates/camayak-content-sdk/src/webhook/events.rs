//! Inbound webhook payloads and fetched assignment content.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event types Camayak sends to a Content API webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Reachability check sent when the webhook URL is configured; answered with `pong`.
    Validate,
    /// An assignment was published, either for the first time or again after edits.
    Publish,
    /// An assignment was retracted and should be taken down externally.
    Retract,
    /// Missing, malformed, or unrecognised event type.
    Unknown,
}

impl EventKind {
    /// Map the wire name of an event to its kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use camayak_content_sdk::webhook::EventKind;
    ///
    /// assert_eq!(EventKind::from_name("publish"), EventKind::Publish);
    /// assert_eq!(EventKind::from_name("Publish"), EventKind::Unknown);
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name {
            "validate" => Self::Validate,
            "publish" => Self::Publish,
            "retract" => Self::Retract,
            _ => Self::Unknown,
        }
    }

    /// The wire name of this event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Publish => "publish",
            Self::Retract => "retract",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed webhook notification.
///
/// Parsing never fails: a body that is not a JSON object, or one without a
/// string `event`, yields [`EventKind::Unknown`] so the router can hand it to
/// the error handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Classified event type
    pub event: EventKind,
    /// Raw `event` value as sent, when it was a string
    pub event_name: Option<String>,
    /// Camayak event identifier
    pub event_id: Option<String>,
    /// Content API URL of the assignment the event refers to
    pub resource_uri: Option<String>,
}

impl InboundEvent {
    /// Parse a webhook request body.
    ///
    /// # Examples
    ///
    /// ```
    /// use camayak_content_sdk::webhook::{EventKind, InboundEvent};
    ///
    /// let event = InboundEvent::parse(br#"{"event":"retract","event_id":"e-1","resource_uri":"https://x/1"}"#);
    /// assert_eq!(event.event, EventKind::Retract);
    /// assert_eq!(event.resource_uri.as_deref(), Some("https://x/1"));
    ///
    /// let garbage = InboundEvent::parse(b"not json");
    /// assert_eq!(garbage.event, EventKind::Unknown);
    /// ```
    pub fn parse(payload: &[u8]) -> Self {
        let body: Map<String, Value> = match serde_json::from_slice(payload) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let event_name = body
            .get("event")
            .and_then(Value::as_str)
            .map(str::to_string);
        let event = event_name
            .as_deref()
            .map(EventKind::from_name)
            .unwrap_or(EventKind::Unknown);

        Self {
            event,
            event_name,
            event_id: scalar_field(&body, "event_id"),
            resource_uri: scalar_field(&body, "resource_uri"),
        }
    }
}

fn scalar_field(body: &Map<String, Value>, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Assignment content returned by the Content API.
///
/// An opaque JSON object. The only fields the SDK interprets are
/// `published_id` and `published_url`, which echo the identity a previous
/// webhook response reported for the assignment in the external system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content(Map<String, Value>);

impl Content {
    /// Parse a Content API response body.
    ///
    /// # Errors
    ///
    /// Fails if the body is not valid JSON or is not a JSON object.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Look up a raw field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `published_id` field, if present and truthy.
    ///
    /// Follows the platform's loose semantics: `null`, `false`, `0` and the
    /// empty string all count as "never published".
    pub fn published_id(&self) -> Option<&Value> {
        self.0.get("published_id").filter(|v| is_truthy(v))
    }

    /// The `published_url` field, when it is a string.
    pub fn published_url(&self) -> Option<&str> {
        self.0.get("published_url").and_then(Value::as_str)
    }

    /// Whether a previous webhook response reported this assignment as published.
    ///
    /// # Examples
    ///
    /// ```
    /// use camayak_content_sdk::webhook::Content;
    ///
    /// assert!(Content::from_json(r#"{"published_id":"abc"}"#).unwrap().is_published());
    /// assert!(!Content::from_json(r#"{"published_id":""}"#).unwrap().is_published());
    /// assert!(!Content::from_json("{}").unwrap().is_published());
    /// ```
    pub fn is_published(&self) -> bool {
        self.published_id().is_some()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Take the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Content {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
