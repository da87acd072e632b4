use serde::Deserialize;
use serde_json::{Map, Value};

/// A raw command as the host page queues it: `[name, value]`.
#[derive(Debug, Clone)]
pub struct RawCommand {
    pub name: String,
    pub value: Value,
}

impl RawCommand {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Event argument as accepted at the command boundary: either a bare
/// event name or a structured payload object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EventInput {
    Named(String),
    Structured(Map<String, Value>),
}

impl EventInput {
    /// The event name, whichever form it arrived in.
    pub fn name(&self) -> Option<&str> {
        match self {
            EventInput::Named(name) => Some(name),
            EventInput::Structured(map) => map.get("name").and_then(Value::as_str),
        }
    }

    /// Free-form fields to attach to the event payload. A bare name
    /// becomes `{"name": ...}`.
    pub fn into_fields(self) -> Map<String, Value> {
        match self {
            EventInput::Named(name) => {
                let mut map = Map::new();
                map.insert("name".to_string(), Value::String(name));
                map
            }
            EventInput::Structured(map) => map,
        }
    }
}

/// A command resolved once at the queue boundary.
#[derive(Debug, Clone)]
pub enum Command {
    Init(String),
    Event(EventInput),
    /// Unrecognized command names pass through silently for
    /// forward compatibility.
    Unknown(String),
}

impl Command {
    pub fn resolve(raw: RawCommand) -> Command {
        match raw.name.as_str() {
            "init" => match raw.value {
                Value::String(tracking_id) if !tracking_id.is_empty() => {
                    Command::Init(tracking_id)
                }
                _ => Command::Unknown("init".to_string()),
            },
            "event" => match serde_json::from_value::<EventInput>(raw.value) {
                Ok(input) => Command::Event(input),
                Err(_) => Command::Unknown("event".to_string()),
            },
            other => Command::Unknown(other.to_string()),
        }
    }
}
