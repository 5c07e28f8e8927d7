//! PersonRecord - Registered individual person
//!
//! Field names follow the API's Portuguese wire names through serde renames.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Editable fields of a person, without identity.
///
/// This is also the body of a create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonData {
    #[serde(rename = "nome")]
    pub name: String,
    /// Canonical digits-only CPF
    pub cpf: String,
    #[serde(rename = "telefone", default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(rename = "rua", default, deserialize_with = "lenient_string")]
    pub street: Option<String>,
    #[serde(rename = "numero", default, deserialize_with = "lenient_string")]
    pub number: Option<String>,
    #[serde(rename = "complemento", default, deserialize_with = "lenient_string")]
    pub complement: Option<String>,
    #[serde(rename = "cep", default, deserialize_with = "lenient_string")]
    pub postal_code: Option<String>,
    #[serde(rename = "bairro", default, deserialize_with = "lenient_string")]
    pub neighborhood: Option<String>,
    #[serde(rename = "municipio", default, deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(rename = "estado", default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
}

/// A person as stored by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: i64,
    #[serde(flatten)]
    pub data: PersonData,
}

impl PersonRecord {
    pub fn new(id: i64, data: PersonData) -> Self {
        Self { id, data }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn cpf(&self) -> &str {
        &self.data.cpf
    }
}

/// The list endpoint returns some optional fields (`numero`, `cep`) as JSON
/// numbers; everything is kept as text on this side.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_listing_with_numbers() {
        let json = serde_json::json!({
            "id": 7,
            "nome": "Ana Souza",
            "cpf": "12345678909",
            "telefone": null,
            "numero": 120,
            "cep": 1310100,
            "municipio": "São Paulo"
        });

        let record: PersonRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.name(), "Ana Souza");
        assert_eq!(record.data.number.as_deref(), Some("120"));
        assert_eq!(record.data.postal_code.as_deref(), Some("1310100"));
        assert_eq!(record.data.city.as_deref(), Some("São Paulo"));
        assert_eq!(record.data.phone, None);
        assert_eq!(record.data.street, None);
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let record = PersonRecord::new(
            3,
            PersonData {
                name: "Bruno".to_string(),
                cpf: "12345678909".to_string(),
                street: Some("Rua A".to_string()),
                ..Default::default()
            },
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["nome"], "Bruno");
        assert_eq!(value["rua"], "Rua A");
        assert!(value["bairro"].is_null());
    }
}
