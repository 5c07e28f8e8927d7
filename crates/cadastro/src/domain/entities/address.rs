//! PostalAddress - Address resolved from a CEP lookup

use serde::{Deserialize, Serialize};

/// Address fields filled in from a postal code. Absent values are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub postal_code: String,
    pub street: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}
