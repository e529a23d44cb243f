use serde::Serialize;
use std::fmt;

/// One documentation comment together with the declaration it documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairedRecord {
    origin: String,
    documentation: String,
    signature: String,
}

impl PairedRecord {
    /// Trims both texts at the record boundary. Returns `None` if either is
    /// empty afterwards.
    pub fn new(origin: &str, documentation: &str, signature: &str) -> Option<Self> {
        let documentation = documentation.trim();
        let signature = signature.trim();
        if documentation.is_empty() || signature.is_empty() {
            return None;
        }

        Some(Self {
            origin: origin.to_string(),
            documentation: documentation.to_string(),
            signature: signature.to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The signature with every whitespace run collapsed to one space.
    pub fn normalized_signature(&self) -> String {
        normalize_whitespace(&self.signature)
    }
}

/// Origin line, documentation block, then the normalized signature.
impl fmt::Display for PairedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.origin)?;
        writeln!(f, "{}", self.documentation)?;
        write!(f, "{}", self.normalized_signature())
    }
}

pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
