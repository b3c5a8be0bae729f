use serde::Serialize;

/// The fields of an ERC1155 metadata document shown by the explorer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenMetadataDocument {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// The whole document as served.
    pub raw: serde_json::Value,
}

impl TokenMetadataDocument {
    /// Fields that are missing or not strings are left as None.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };

        Self {
            name: field("name"),
            description: field("description"),
            image: field("image"),
            raw: value.clone(),
        }
    }
}
