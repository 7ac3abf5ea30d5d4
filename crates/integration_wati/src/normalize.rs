//! Response normalizer
//!
//! Maps the loosely-shaped JSON returned by Wati into domain entities.
//! Field names differ between API versions and account types, so every
//! field is looked up through a list of known aliases. Only identity
//! fields are mandatory; everything else degrades to `None` or empty.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use domain::{
    Contact, DeliveryReceipt, DeliveryStatus, Direction, MediaCategory, MediaReference, Message,
    MessageBody, Page,
};
use serde_json::{Map, Value};

use crate::error::WatiError;

const CONTACT_LIST_KEYS: &[&str] = &["contact_list", "contacts", "data", "result"];
const CONTACT_PHONE_KEYS: &[&str] = &["phone", "phoneNumber", "number", "whatsappNumber", "displayId"];
const CONTACT_WAID_KEYS: &[&str] = &["wAid", "id", "waId", "whatsappId"];
const CONTACT_NAME_KEYS: &[&str] = &["fullName", "firstName", "name", "contactName", "displayName"];

const MESSAGE_ID_KEYS: &[&str] = &["id", "messageId", "message_id", "localMessageId"];
const MESSAGE_DIRECTION_KEYS: &[&str] = &["fromMe", "isFromMe", "outgoing", "isSent", "owner"];
const MESSAGE_TIME_KEYS: &[&str] = &["timestamp", "time", "date", "created", "dateTime"];
const MESSAGE_TEXT_KEYS: &[&str] = &["text", "content", "body", "message", "messageText"];
const MESSAGE_TYPE_KEYS: &[&str] = &["type", "messageType", "media_type"];
const MESSAGE_MEDIA_KEYS: &[&str] = &["data", "fileName", "mediaUrl", "url"];
const MESSAGE_OPERATOR_KEYS: &[&str] = &["operatorName", "assignedId"];
const MESSAGE_STATUS_KEYS: &[&str] = &["statusString", "status"];

/// Sender label for outbound messages without an operator name
pub const OUTBOUND_SENDER: &str = "You";

// ============================================================================
// Contacts
// ============================================================================

/// Normalize a `getContacts` response into a page of contacts
///
/// # Errors
///
/// Returns [`WatiError::Schema`] if the body is not a JSON object or a
/// contact lacks both phone number and WhatsApp ID.
pub fn contacts_page(body: &Value) -> Result<Page<Contact>, WatiError> {
    let items = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => CONTACT_LIST_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map_or(&[][..], Vec::as_slice),
        _ => return Err(WatiError::schema("contacts response is not a JSON object")),
    };

    let contacts = items.iter().map(contact).collect::<Result<Vec<_>, _>>()?;
    Ok(Page::new(contacts))
}

/// Normalize a single contact record
///
/// # Errors
///
/// Returns [`WatiError::Schema`] when the record is not an object, when an
/// identity field has the wrong type, or when neither phone nor WhatsApp ID
/// is present.
pub fn contact(value: &Value) -> Result<Contact, WatiError> {
    let record = value
        .as_object()
        .ok_or_else(|| WatiError::schema("contact record is not a JSON object"))?;

    let phone = identity_field(record, CONTACT_PHONE_KEYS, "contact phone")?;
    let waid = identity_field(record, CONTACT_WAID_KEYS, "contact WhatsApp ID")?;

    let (id, phone) = match (waid, phone) {
        (Some(id), Some(phone)) => (id, phone),
        (Some(id), None) => (id.clone(), id),
        (None, Some(phone)) => (phone.clone(), phone),
        (None, None) => {
            return Err(WatiError::schema(
                "contact record has neither phone number nor WhatsApp ID",
            ));
        },
    };

    let mut contact = Contact::new(id, phone);
    contact.name = first_text(record, CONTACT_NAME_KEYS);
    contact.first_name = text_field(record, "firstName");
    contact.status = text_field(record, "contactStatus");
    contact.created = record.get("created").and_then(parse_timestamp);
    contact.last_updated = record.get("lastUpdated").and_then(parse_timestamp);
    contact.opted_in = record.get("optedIn").and_then(Value::as_bool);
    contact.allow_broadcast = record.get("allowBroadcast").and_then(Value::as_bool);
    contact.source = text_field(record, "source");
    contact.photo = text_field(record, "photo");
    contact.custom_attributes = record
        .get("customParams")
        .map(custom_params)
        .unwrap_or_default();

    Ok(contact)
}

/// Flatten `[{name, value}]` (or a plain object) into a key/value map
///
/// Later entries win on duplicate keys.
fn custom_params(value: &Value) -> BTreeMap<String, String> {
    match value {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| {
                let name = entry.get("name")?.as_str()?;
                let value = entry.get("value").map(scalar_to_string)?;
                Some((name.to_string(), value))
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), scalar_to_string(value)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Normalize a `getMessages` response into a page of messages
///
/// # Errors
///
/// Returns [`WatiError::Schema`] if the body is not a JSON object or a
/// message has no identifier.
pub fn messages_page(body: &Value, chat_id: &str) -> Result<Page<Message>, WatiError> {
    let Value::Object(root) = body else {
        return Err(WatiError::schema("messages response is not a JSON object"));
    };

    let result = root.get("result").and_then(Value::as_object);
    let containers = [Some(root), result];

    let mut items: Option<&Vec<Value>> = None;
    let mut total = None;
    for container in containers.into_iter().flatten() {
        match container.get("messages") {
            Some(Value::Object(messages)) => {
                items = messages.get("items").and_then(Value::as_array);
                total = messages.get("total").and_then(Value::as_u64);
            },
            Some(Value::Array(list)) => items = Some(list),
            _ => {},
        }
        if items.is_none() {
            items = ["conversation", "data"]
                .iter()
                .find_map(|key| container.get(*key).and_then(Value::as_array));
        }
        if items.is_some() {
            break;
        }
    }
    let items = items.or_else(|| root.get("result").and_then(Value::as_array));

    let messages = items
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|item| message(item, chat_id))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page { items: messages, total })
}

/// Normalize a single message record belonging to `chat_id`
///
/// # Errors
///
/// Returns [`WatiError::Schema`] when the record is not an object or has no
/// usable identifier.
pub fn message(value: &Value, chat_id: &str) -> Result<Message, WatiError> {
    let record = value
        .as_object()
        .ok_or_else(|| WatiError::schema("message record is not a JSON object"))?;

    let id = identity_field(record, MESSAGE_ID_KEYS, "message ID")?
        .ok_or_else(|| WatiError::schema("message record has no identifier"))?;

    let direction = MESSAGE_DIRECTION_KEYS
        .iter()
        .find_map(|key| record.get(*key))
        .map_or(Direction::Inbound, |flag| {
            if truthy(flag) {
                Direction::Outbound
            } else {
                Direction::Inbound
            }
        });

    let sender = match direction {
        Direction::Outbound => {
            first_text(record, MESSAGE_OPERATOR_KEYS).unwrap_or_else(|| OUTBOUND_SENDER.to_string())
        },
        Direction::Inbound => chat_id.to_string(),
    };

    let timestamp = MESSAGE_TIME_KEYS
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(parse_timestamp);

    let text = first_text(record, MESSAGE_TEXT_KEYS);
    let message_type = MESSAGE_TYPE_KEYS.iter().find_map(|key| {
        record
            .get(*key)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty() && *t != "chat" && *t != "text")
    });

    let body = match message_type {
        None => MessageBody::Text {
            text: text.unwrap_or_default(),
        },
        Some(kind) => match MediaCategory::from_message_type(kind) {
            Some(category) => {
                let locator = first_text(record, MESSAGE_MEDIA_KEYS).unwrap_or_else(|| id.clone());
                let mut media = MediaReference::remote(locator, category);
                media.mime_type = text_field(record, "mimeType");
                MessageBody::Media {
                    media,
                    caption: text,
                }
            },
            None => MessageBody::Other {
                message_type: kind.to_string(),
                text,
            },
        },
    };

    let status = first_text(record, MESSAGE_STATUS_KEYS)
        .map_or(DeliveryStatus::Unknown, |s| DeliveryStatus::from_provider(&s));

    Ok(Message {
        id,
        chat_id: chat_id.to_string(),
        direction,
        sender,
        timestamp,
        body,
        status,
    })
}

// ============================================================================
// Delivery
// ============================================================================

/// Interpret the body of a send call
///
/// `result` decides acceptance, falling back to `success`; the text comes
/// from `message`, `info` or `error`.
pub fn delivery_receipt(body: &Value) -> DeliveryReceipt {
    let accepted = match body.get("result") {
        Some(Value::String(s)) => {
            matches!(s.to_ascii_lowercase().as_str(), "success" | "true" | "ok")
        },
        Some(flag) => truthy(flag),
        None => body.get("success").is_some_and(truthy),
    };

    let message = ["message", "info", "error"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(inner) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            _ => None,
        });

    if accepted {
        DeliveryReceipt::accepted(message)
    } else {
        DeliveryReceipt::rejected(message)
    }
}

/// Best-effort human readable message from an error body
pub fn error_message(body: &Value) -> Option<String> {
    ["message", "error", "info", "title", "detail"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(inner) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            _ => None,
        })
}

// ============================================================================
// Field helpers
// ============================================================================

/// Parse the timestamp formats Wati is known to return
///
/// ISO-8601 (with or without offset), unix seconds or milliseconds,
/// `YYYY-MM-DD HH:MM:SS` and `Mon-DD-YYYY`. Naive values are taken as UTC.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(from_unix),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok().and_then(from_unix);
    }
    if s.contains('T') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        return NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%b-%d-%Y")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn from_unix(value: i64) -> Option<DateTime<Utc>> {
    // Values beyond year 5138 in seconds are milliseconds
    if value > 100_000_000_000 {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    }
}

/// Look up an identity field; present values must be strings or numbers
fn identity_field(
    record: &Map<String, Value>,
    keys: &[&str],
    what: &str,
) -> Result<Option<String>, WatiError> {
    for key in keys {
        match record.get(*key) {
            None | Some(Value::Null) => {},
            Some(Value::String(s)) if s.trim().is_empty() => {},
            Some(Value::String(s)) => return Ok(Some(s.trim().to_string())),
            Some(Value::Number(n)) => return Ok(Some(n.to_string())),
            Some(other) => {
                return Err(WatiError::schema(format!(
                    "{what} field '{key}' has unexpected type: {other}"
                )));
            },
        }
    }
    Ok(None)
}

fn first_text(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text_field(record, key))
}

fn text_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(s.to_ascii_lowercase().as_str(), "" | "false" | "0" | "no"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}
