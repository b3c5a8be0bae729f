use primitive_types::U256;
use std::fmt;

/// Cache identity of a resolution: the URI template and the token id.
///
/// Both fields take part in equality and hashing separately, so distinct
/// `(template, id)` pairs never collide the way concatenated strings can.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataQueryKey {
    pub uri_template: String,
    pub token_id: U256,
}

impl MetadataQueryKey {
    pub fn new(uri_template: impl Into<String>, token_id: U256) -> Self {
        Self {
            uri_template: uri_template.into(),
            token_id,
        }
    }
}

impl fmt::Display for MetadataQueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.uri_template, self.token_id)
    }
}
