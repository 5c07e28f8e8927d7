//! ViaCEP postal code lookup

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::domain::{DomainError, PostalAddress, ValidationErrorSet};
use crate::ports::PostalCodeLookup;

const CEP_LENGTH: usize = 8;

/// Postal code lookup backed by viacep.com.br
#[derive(Clone)]
pub struct ViaCepLookup {
    client: Client,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ViaCepResponse {
    #[serde(deserialize_with = "null_as_empty")]
    cep: String,
    #[serde(deserialize_with = "null_as_empty")]
    logradouro: String,
    #[serde(deserialize_with = "null_as_empty")]
    complemento: String,
    #[serde(deserialize_with = "null_as_empty")]
    bairro: String,
    #[serde(deserialize_with = "null_as_empty")]
    localidade: String,
    #[serde(deserialize_with = "null_as_empty")]
    uf: String,
    #[serde(deserialize_with = "null_as_empty")]
    estado: String,
    erro: Option<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ViaCepLookup {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl From<ViaCepResponse> for PostalAddress {
    fn from(resp: ViaCepResponse) -> Self {
        let state = if resp.estado.is_empty() {
            resp.uf
        } else {
            resp.estado
        };

        PostalAddress {
            postal_code: resp.cep,
            street: resp.logradouro,
            complement: resp.complemento,
            neighborhood: resp.bairro,
            city: resp.localidade,
            state,
        }
    }
}

#[async_trait]
impl PostalCodeLookup for ViaCepLookup {
    async fn lookup(&self, postal_code: &str) -> Result<PostalAddress, DomainError> {
        let digits: String = postal_code.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != CEP_LENGTH {
            let mut errors = ValidationErrorSet::new();
            errors.insert("cep", "CEP deve ter 8 dígitos");
            return Err(DomainError::InvalidFields(errors));
        }

        let url = format!("{}/{}/json/", self.base_url, digits);
        debug!(cep = %digits, "Looking up postal code");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(DomainError::api(
                Some(resp.status().as_u16()),
                "Erro ao consultar o CEP.",
            ));
        }

        let body: ViaCepResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(e.to_string()))?;

        // Unknown codes answer 200 with `{"erro": true}`
        if body.erro.is_some() {
            return Err(DomainError::not_found("CEP", digits));
        }

        Ok(body.into())
    }
}
