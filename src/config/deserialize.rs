// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Handles wei amounts too large for YAML integers.

use serde::Deserialize;

pub fn deserialize_wei<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match WeiEntry::deserialize(deserializer)? {
        WeiEntry::Number(n) => Ok(u128::from(n)),
        WeiEntry::Text(s) => s
            .trim()
            .replace('_', "")
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid wei amount: {s}"))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeiEntry {
    Number(u64),
    Text(String),
}
