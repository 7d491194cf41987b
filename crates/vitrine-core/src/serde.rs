use serde::{Deserialize, Deserializer};

/// Deserializes a repeated query parameter into a list of ids.
///
/// Values are trimmed and empty entries (`?type_id=`) are dropped, so an
/// empty parameter behaves like an absent one.
pub fn deserialize_id_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw: Vec<String> = Vec::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(T::from)
        .collect())
}

/// Deserializes an optional string, treating an empty value as `None`.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}
