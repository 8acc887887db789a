use serde_json::{Map, Value};

/// One element of the `results` array, as decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Accepts only usable records: a non-empty object whose `id` is truthy.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) if is_usable(&map) => Some(Self(map)),
            _ => None,
        }
    }

    /// The `id` rendered as text (numbers are stringified).
    pub fn id(&self) -> String {
        match self.0.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }
}

fn is_usable(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.get("id").is_some_and(is_truthy)
}

/// Loose truthiness of the API's JSON values: `null`, `false`, zero, `""`, `"0"`
/// and empty containers are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Turns a usable record into the caller's domain object.
pub trait VideoFactory: Send + Sync {
    type Video;
    fn create(&self, record: RawRecord) -> Self::Video;
}

impl<F, V> VideoFactory for F
where
    F: Fn(RawRecord) -> V + Send + Sync,
{
    type Video = V;
    fn create(&self, record: RawRecord) -> V { self(record) }
}
