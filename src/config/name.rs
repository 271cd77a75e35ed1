//! Peer display names.
//!
//! The config format has no name field, so a peer's name travels as a
//! comment line in its `[Peer]` section. In memory the name never carries
//! the comment marker; these functions move between the two forms.
//!
//! Marker detection only ever looks at the first two characters, so `#name`
//! is not considered marked and encodes to `# #name`.

use serde::{Deserialize, Deserializer, Serializer};
use std::borrow::Cow;

/// Prefix that turns a name into a comment line
pub const MARKER: &str = "# ";

/// Strip the marker from a raw name, once. Unmarked names pass through.
pub fn decode(raw: Option<&str>) -> Option<&str> {
    raw.map(|raw| raw.strip_prefix(MARKER).unwrap_or(raw))
}

/// Prefix a name with the marker unless it already starts with it.
pub fn encode(name: Option<&str>) -> Option<Cow<'_, str>> {
    name.map(|name| {
        if name.starts_with(MARKER) {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(format!("{}{}", MARKER, name))
        }
    })
}

pub(crate) fn serialize_encoded<S>(name: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match encode(name.as_deref()) {
        Some(encoded) => serializer.serialize_str(&encoded),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn deserialize_decoded<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(decode(raw.as_deref()).map(String::from))
}
