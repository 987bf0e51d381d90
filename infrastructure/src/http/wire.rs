//! Wire formats of the discussion backend.
//!
//! - SSE frames → [`StreamEvent`] ([`decode_frame`])
//! - request bodies for the streaming and bulk endpoints
//! - the bulk response and its legacy `results` shapes, normalized by
//!   [`normalize_rounds`] and turned into the logical event sequence by
//!   [`synthesize_events`]

use super::sse::SseFrame;
use council_application::{ParticipantBrief, TransportItem};
use council_domain::{DiscussionId, ParticipantId, StreamEvent};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

// ==================== Stream decoding ====================

/// Decode one SSE frame into a [`StreamEvent`].
///
/// The frame's `event` field is the tag and `data` the JSON payload. A frame
/// named `message` may instead carry the tag inside its payload
/// (`{"event": "...", "data": {...}}` or `{"event": "...", ...fields}`).
/// Unknown tags are rejected.
pub fn decode_frame(frame: &SseFrame) -> Result<StreamEvent, String> {
    let data: Value = if frame.data.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(&frame.data)
            .map_err(|e| format!("invalid JSON in '{}' frame: {}", frame.event, e))?
    };

    let tagged = if frame.event == "message" {
        embedded_event(data).ok_or_else(|| "untagged message frame".to_string())?
    } else {
        json!({ "event": frame.event, "data": data })
    };

    serde_json::from_value(tagged).map_err(|e| format!("unrecognized '{}' frame: {}", frame.event, e))
}

fn embedded_event(data: Value) -> Option<Value> {
    let Value::Object(mut map) = data else {
        return None;
    };
    let tag = map.remove("event")?;
    let payload = match map.remove("data") {
        Some(payload) => payload,
        None => Value::Object(map),
    };
    Some(json!({ "event": tag, "data": payload }))
}

// ==================== Request bodies ====================

/// `/api/discussions/{id}{suffix}` with the id percent-encoded.
pub fn discussion_path(id: &DiscussionId, suffix: &str) -> String {
    let mut encoded = String::new();
    for byte in id.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    format!("/api/discussions/{}{}", encoded, suffix)
}

#[derive(Debug, Serialize)]
pub struct WireParticipant<'a> {
    pub id: &'a str,
    pub instructions: &'a str,
}

pub fn wire_participants(participants: &[ParticipantBrief]) -> Vec<WireParticipant<'_>> {
    participants
        .iter()
        .map(|p| WireParticipant {
            id: p.id.as_str(),
            instructions: &p.instructions,
        })
        .collect()
}

/// Body of `POST /api/discussions/stream`
#[derive(Debug, Serialize)]
pub struct StreamStartBody<'a> {
    pub topic: &'a str,
    pub rounds: u32,
    pub participants: Vec<WireParticipant<'a>>,
}

/// Body of `POST /api/discussions/{id}/continue/stream`
#[derive(Debug, Serialize)]
pub struct StreamContinueBody<'a> {
    pub rounds: u32,
    pub participants: Vec<WireParticipant<'a>>,
}

/// Body of `POST /api/discussions/{id}/contributions`
#[derive(Debug, Serialize)]
pub struct ContributionBody<'a> {
    pub text: &'a str,
}

/// Body of the bulk endpoints (`/api/discuss`, `/api/discussions/{id}/continue`)
///
/// Instructions travel as a `prompts` map keyed by participant id; blank
/// instructions are left out so the backend keeps its own defaults.
#[derive(Debug, Serialize)]
pub struct BulkRequestBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<&'a str>,
    pub rounds: u32,
    pub active_models: Vec<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub prompts: BTreeMap<&'a str, &'a str>,
}

impl<'a> BulkRequestBody<'a> {
    pub fn new(topic: Option<&'a str>, rounds: u32, participants: &'a [ParticipantBrief]) -> Self {
        Self {
            topic,
            rounds,
            active_models: participants.iter().map(|p| p.id.as_str()).collect(),
            prompts: participants
                .iter()
                .filter(|p| !p.instructions.trim().is_empty())
                .map(|p| (p.id.as_str(), p.instructions.as_str()))
                .collect(),
        }
    }
}

/// Generic `{status, message}` acknowledgement
#[derive(Debug, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

// ==================== Bulk responses ====================

/// Reply of the bulk endpoints
#[derive(Debug, Default, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub discussion_id: Option<DiscussionId>,
    #[serde(default)]
    pub results: Value,
}

/// One round of bulk results: `(participant, text)` pairs.
pub type BulkRound = Vec<(ParticipantId, String)>;

/// Normalize the three legacy `results` shapes into rounds:
///
/// - a single round object: `{"Claude": "...", "Grok": "..."}`
/// - an array of round objects: `[{"Claude": "..."}, {"Claude": "..."}]`
/// - an object keyed by round number: `{"1": {...}, "2": {...}}`
pub fn normalize_rounds(results: &Value) -> Result<Vec<BulkRound>, String> {
    match results {
        Value::Null => Ok(Vec::new()),
        Value::Array(rounds) => rounds
            .iter()
            .enumerate()
            .map(|(i, round)| match round {
                Value::Object(map) => Ok(round_from_map(map)),
                other => Err(format!("round {} is not an object: {}", i + 1, kind(other))),
            })
            .collect(),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        Value::Object(map) if is_keyed_by_round(map) => {
            let mut keyed: Vec<(u32, &Map<String, Value>)> = map
                .iter()
                .filter_map(|(k, v)| Some((k.parse().ok()?, v.as_object()?)))
                .collect();
            keyed.sort_by_key(|(n, _)| *n);
            Ok(keyed.into_iter().map(|(_, round)| round_from_map(round)).collect())
        }
        Value::Object(map) => Ok(vec![round_from_map(map)]),
        other => Err(format!("unsupported results shape: {}", kind(other))),
    }
}

fn is_keyed_by_round(map: &Map<String, Value>) -> bool {
    map.iter()
        .all(|(k, v)| k.parse::<u32>().is_ok() && v.is_object())
}

fn round_from_map(map: &Map<String, Value>) -> BulkRound {
    map.iter()
        .map(|(id, value)| (ParticipantId::new(id.as_str()), response_text(value)))
        .collect()
}

fn response_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(map) => ["text", "response", "content"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .map_or_else(|| value.to_string(), str::to_string),
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Turn a bulk reply into the event sequence a streaming backend would emit.
///
/// Within each round participants appear in `requested` order, followed by
/// any ids the backend added. `fallback_id` is used when the reply carries
/// no discussion id; it is never applied to error replies.
pub fn synthesize_events(
    response: BulkResponse,
    requested: &[ParticipantId],
    rounds_requested: u32,
    fallback_id: Option<DiscussionId>,
) -> Vec<TransportItem> {
    if response.status.as_deref() == Some("error") {
        return vec![
            TransportItem::Event(StreamEvent::OperationStart {
                discussion_id: response.discussion_id,
            }),
            TransportItem::Event(StreamEvent::OperationError {
                message: response
                    .message
                    .unwrap_or_else(|| "discussion failed".to_string()),
            }),
        ];
    }

    let mut items = vec![TransportItem::Event(StreamEvent::OperationStart {
        discussion_id: response.discussion_id.or(fallback_id),
    })];

    let rounds = match normalize_rounds(&response.results) {
        Ok(rounds) => rounds,
        Err(reason) => {
            items.push(TransportItem::Event(StreamEvent::OperationError {
                message: format!("unreadable results: {}", reason),
            }));
            return items;
        }
    };

    for round in &rounds {
        for (id, text) in ordered(round, requested) {
            items.push(TransportItem::Event(StreamEvent::start(id.clone())));
            items.push(TransportItem::Event(StreamEvent::complete(
                id.clone(),
                Some(text.as_str()),
            )));
        }
    }

    items.push(TransportItem::Event(StreamEvent::OperationComplete {
        rounds_completed: rounds.len() as u32,
        rounds_requested,
    }));
    items
}

fn ordered<'a>(round: &'a BulkRound, requested: &[ParticipantId]) -> Vec<&'a (ParticipantId, String)> {
    let mut entries: Vec<&(ParticipantId, String)> = requested
        .iter()
        .filter_map(|id| round.iter().find(|(p, _)| p == id))
        .collect();
    entries.extend(round.iter().filter(|(p, _)| !requested.contains(p)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: event.into(),
            data: data.into(),
        }
    }

    fn events(items: Vec<TransportItem>) -> Vec<StreamEvent> {
        items
            .into_iter()
            .map(|item| match item {
                TransportItem::Event(event) => event,
                other => panic!("unexpected item: {:?}", other),
            })
            .collect()
    }

    // ==================== decode_frame ====================

    #[test]
    fn test_decode_named_frame() {
        let event = decode_frame(&frame(
            "participant_chunk",
            r#"{"participant":"Claude","text":"He"}"#,
        ))
        .unwrap();
        assert_eq!(event, StreamEvent::chunk("Claude", "He"));
    }

    #[test]
    fn test_decode_empty_data_frame() {
        let event = decode_frame(&frame("operation_start", "")).unwrap();
        assert_eq!(event, StreamEvent::OperationStart { discussion_id: None });
    }

    #[test]
    fn test_decode_embedded_tag_in_message_frame() {
        let nested = decode_frame(&frame(
            "message",
            r#"{"event":"operation_error","data":{"message":"quota"}}"#,
        ))
        .unwrap();
        assert_eq!(
            nested,
            StreamEvent::OperationError {
                message: "quota".into()
            }
        );

        let flat = decode_frame(&frame(
            "message",
            r#"{"event":"participant_complete","participant":"Grok","final_text":"done"}"#,
        ))
        .unwrap();
        assert_eq!(flat, StreamEvent::complete("Grok", Some("done")));
    }

    #[test]
    fn test_decode_rejects_unknown_tag_and_bad_json() {
        assert!(decode_frame(&frame("round_results", "{}")).is_err());
        assert!(decode_frame(&frame("participant_chunk", "{not json")).is_err());
        assert!(decode_frame(&frame("message", r#"{"text":"no tag"}"#)).is_err());
    }

    // ==================== normalize_rounds ====================

    #[test]
    fn test_normalize_single_round_object() {
        let rounds = normalize_rounds(&json!({"Claude": "a", "Grok": "b"})).unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].len(), 2);
    }

    #[test]
    fn test_normalize_array_of_rounds() {
        let rounds =
            normalize_rounds(&json!([{"Claude": "r1"}, {"Claude": {"text": "r2"}}])).unwrap();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[1][0].1, "r2");
    }

    #[test]
    fn test_normalize_object_keyed_by_round_number() {
        let rounds = normalize_rounds(&json!({
            "10": {"Claude": "tenth"},
            "2": {"Claude": "second"}
        }))
        .unwrap();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0][0].1, "second");
        assert_eq!(rounds[1][0].1, "tenth");
    }

    #[test]
    fn test_normalize_rejects_scalars() {
        assert!(normalize_rounds(&json!("oops")).is_err());
        assert!(normalize_rounds(&json!([1, 2])).is_err());
        assert!(normalize_rounds(&Value::Null).unwrap().is_empty());
    }

    // ==================== synthesize_events ====================

    #[test]
    fn test_synthesize_orders_by_request_then_extras() {
        let response: BulkResponse = serde_json::from_value(json!({
            "status": "success",
            "results": {"Gemini": "g", "Claude": "c", "Zed": "z"}
        }))
        .unwrap();
        let requested = vec![ParticipantId::new("Claude"), ParticipantId::new("Gemini")];

        let events = events(synthesize_events(
            response,
            &requested,
            1,
            Some(DiscussionId::new("local-1")),
        ));

        assert_eq!(
            events,
            vec![
                StreamEvent::OperationStart {
                    discussion_id: Some(DiscussionId::new("local-1"))
                },
                StreamEvent::start("Claude"),
                StreamEvent::complete("Claude", Some("c")),
                StreamEvent::start("Gemini"),
                StreamEvent::complete("Gemini", Some("g")),
                StreamEvent::start("Zed"),
                StreamEvent::complete("Zed", Some("z")),
                StreamEvent::OperationComplete {
                    rounds_completed: 1,
                    rounds_requested: 1
                },
            ]
        );
    }

    #[test]
    fn test_synthesize_prefers_backend_discussion_id() {
        let response: BulkResponse = serde_json::from_value(json!({
            "discussion_id": "srv-9",
            "results": [{"A": "1"}, {"A": "2"}]
        }))
        .unwrap();

        let events = events(synthesize_events(
            response,
            &[ParticipantId::new("A")],
            3,
            Some(DiscussionId::new("local")),
        ));

        assert_eq!(
            events.first(),
            Some(&StreamEvent::OperationStart {
                discussion_id: Some(DiscussionId::new("srv-9"))
            })
        );
        assert_eq!(
            events.last(),
            Some(&StreamEvent::OperationComplete {
                rounds_completed: 2,
                rounds_requested: 3
            })
        );
    }

    #[test]
    fn test_synthesize_error_status() {
        let response: BulkResponse = serde_json::from_value(json!({
            "status": "error",
            "message": "No topic provided"
        }))
        .unwrap();

        let events = events(synthesize_events(
            response,
            &[],
            1,
            Some(DiscussionId::new("local")),
        ));

        assert_eq!(
            events,
            vec![
                StreamEvent::OperationStart {
                    discussion_id: None
                },
                StreamEvent::OperationError {
                    message: "No topic provided".into()
                },
            ]
        );
    }

    #[test]
    fn test_discussion_path_encodes_id() {
        assert_eq!(
            discussion_path(&DiscussionId::new("abc-123"), "/continue"),
            "/api/discussions/abc-123/continue"
        );
        assert_eq!(
            discussion_path(&DiscussionId::new("a b/c"), ""),
            "/api/discussions/a%20b%2Fc"
        );
    }

    #[test]
    fn test_request_body_shapes() {
        let briefs = vec![ParticipantBrief {
            id: ParticipantId::new("Claude"),
            instructions: "Be brief.".into(),
        }];
        let body = StreamStartBody {
            topic: "Tabs or spaces?",
            rounds: 2,
            participants: wire_participants(&briefs),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "topic": "Tabs or spaces?",
                "rounds": 2,
                "participants": [{"id": "Claude", "instructions": "Be brief."}]
            })
        );

        let bulk = BulkRequestBody::new(None, 1, &briefs);
        assert_eq!(
            serde_json::to_value(&bulk).unwrap(),
            json!({
                "rounds": 1,
                "active_models": ["Claude"],
                "prompts": {"Claude": "Be brief."}
            })
        );

        let silent = vec![ParticipantBrief {
            id: ParticipantId::new("Grok"),
            instructions: "  ".into(),
        }];
        assert_eq!(
            serde_json::to_value(BulkRequestBody::new(None, 1, &silent)).unwrap(),
            json!({"rounds": 1, "active_models": ["Grok"]})
        );
    }
}
