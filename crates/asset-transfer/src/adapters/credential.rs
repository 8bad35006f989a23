//! # Caller Credential Adapter
//!
//! X.509-style credential: a subject/issuer identity string plus
//! certificate attributes.

use crate::ports::outbound::CallerCredential;
use std::collections::HashMap;

const CLIENT_SUBJECT_PREFIX: &str = "x509::/C=US/ST=North Carolina/O=Hyperledger/OU=client";
const ORG1_ISSUER: &str = "/C=US/ST=North Carolina/L=Durham/O=org1.example.com/CN=ca.org1.example.com";

/// In-memory caller credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct X509Credential {
    id: String,
    attributes: HashMap<String, String>,
}

impl X509Credential {
    /// Credential with an explicit identity string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: HashMap::new(),
        }
    }

    /// Client credential for `common_name`, issued by the org1 CA.
    #[must_use]
    pub fn from_common_name(common_name: &str) -> Self {
        Self::new(format!(
            "{CLIENT_SUBJECT_PREFIX}/CN={common_name}::{ORG1_ISSUER}"
        ))
    }

    /// Add a certificate attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl CallerCredential for X509Credential {
    fn id(&self) -> &str {
        &self.id
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}
