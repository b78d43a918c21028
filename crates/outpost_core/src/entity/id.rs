//! Record identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix carried by every locally minted, unconfirmed id.
pub const TEMP_ID_PREFIX: &str = "temp_";

/// Identity of a record within its collection.
///
/// A record id is either:
/// - `Server` - opaque, assigned by the backend, stable forever
/// - `Temp` - minted locally while the record's create is unconfirmed
///
/// A temporary id is never sent to the backend as a path parameter, and is
/// never reused once the server has confirmed the record under its real id.
/// Keeping the distinction in the type means "is this record local-only"
/// is a `match`, not a string-prefix test at every call site.
///
/// On the wire and in stored documents a record id is a plain string;
/// temporary ids are recognized by their [`TEMP_ID_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordId {
    /// Backend-assigned identity.
    Server(String),
    /// Locally minted identity, pending server confirmation.
    Temp(String),
}

impl RecordId {
    /// Creates a server-assigned id.
    pub fn server(id: impl Into<String>) -> Self {
        Self::Server(id.into())
    }

    /// Mints a fresh temporary id: `temp_<epoch-millis>_<nonce>`.
    #[must_use]
    pub fn temp() -> Self {
        let nonce = Uuid::new_v4().simple().to_string();
        Self::Temp(format!(
            "{TEMP_ID_PREFIX}{}_{}",
            super::stamp::now_millis(),
            &nonce[..8]
        ))
    }

    /// Classifies a raw id string by its prefix.
    pub fn parse(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.starts_with(TEMP_ID_PREFIX) {
            Self::Temp(id)
        } else {
            Self::Server(id)
        }
    }

    /// Returns true for a locally minted, unconfirmed id.
    #[must_use]
    pub const fn is_temp(&self) -> bool {
        matches!(self, Self::Temp(_))
    }

    /// Returns the raw string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Server(id) | Self::Temp(id) => id,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self::parse(id)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        match id {
            RecordId::Server(id) | RecordId::Temp(id) => id,
        }
    }
}
