//! Form Controller - Validation and submission of one person record

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::DELETE_CONFIRMATION;
use crate::domain::{Cpf, DomainError, PersonData, PersonRecord, ValidationErrorSet};
use crate::ports::{Notifier, PessoaApi, PostalCodeLookup};

pub const FIELD_NAME: &str = "nome";
pub const FIELD_CPF: &str = "cpf";

pub const MSG_NAME_REQUIRED: &str = "Nome é obrigatório";
pub const MSG_CPF_REQUIRED: &str = "CPF é obrigatório";
pub const MSG_CPF_LENGTH: &str = "CPF deve ter 11 dígitos";
pub const MSG_CPF_IN_USE: &str = "Este CPF já está em uso";
pub const MSG_CPF_CHECK_FAILED: &str = "Erro ao validar o CPF.";

/// Values as typed into the form. Blank optional fields are submitted as
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonForm {
    pub name: String,
    pub cpf: String,
    pub phone: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub postal_code: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl PersonForm {
    pub fn from_record(record: &PersonRecord) -> Self {
        let data = &record.data;
        let text = |v: &Option<String>| v.clone().unwrap_or_default();

        Self {
            name: data.name.clone(),
            cpf: data.cpf.clone(),
            phone: text(&data.phone),
            street: text(&data.street),
            number: text(&data.number),
            complement: text(&data.complement),
            postal_code: text(&data.postal_code),
            neighborhood: text(&data.neighborhood),
            city: text(&data.city),
            state: text(&data.state),
        }
    }

    fn to_data(&self, cpf: String) -> PersonData {
        let optional = |v: &str| {
            let trimmed = v.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        PersonData {
            name: self.name.trim().to_string(),
            cpf,
            phone: optional(&self.phone),
            street: optional(&self.street),
            number: optional(&self.number),
            complement: optional(&self.complement),
            postal_code: optional(&self.postal_code),
            neighborhood: optional(&self.neighborhood),
            city: optional(&self.city),
            state: optional(&self.state),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(i64),
    Updated(i64),
}

impl SubmitOutcome {
    pub fn id(&self) -> i64 {
        match self {
            Self::Created(id) | Self::Updated(id) => *id,
        }
    }
}

pub struct FormController<A: PessoaApi> {
    api: Arc<A>,
    record_id: Option<i64>,
    /// CPF the record had when loaded; re-submitting it skips the
    /// uniqueness check
    original_cpf: Option<String>,
    errors: ValidationErrorSet,
}

impl<A: PessoaApi> FormController<A> {
    /// Controller for a record that does not exist yet
    pub fn for_new(api: Arc<A>) -> Self {
        Self {
            api,
            record_id: None,
            original_cpf: None,
            errors: ValidationErrorSet::new(),
        }
    }

    /// Load an existing record for editing
    pub async fn load(api: Arc<A>, id: i64) -> Result<(Self, PersonForm), DomainError> {
        let record = api.get(id).await?;
        let form = PersonForm::from_record(&record);

        let controller = Self {
            api,
            record_id: Some(record.id),
            original_cpf: Some(Cpf::normalize(record.cpf())),
            errors: ValidationErrorSet::new(),
        };
        Ok((controller, form))
    }

    pub fn is_new(&self) -> bool {
        self.record_id.is_none()
    }

    pub fn record_id(&self) -> Option<i64> {
        self.record_id
    }

    /// Errors of the last failed submission
    pub fn errors(&self) -> &ValidationErrorSet {
        &self.errors
    }

    /// The user edited `field`; its error no longer applies
    pub fn edit_field(&mut self, field: &str) {
        self.errors.clear_field(field);
    }

    /// Validate every field, collecting all failures.
    ///
    /// The CPF uniqueness check needs a round-trip and is skipped when the
    /// CPF is unchanged from the loaded record.
    pub async fn validate(&self, form: &PersonForm) -> Result<PersonData, ValidationErrorSet> {
        let mut errors = ValidationErrorSet::new();

        if form.name.trim().is_empty() {
            errors.insert(FIELD_NAME, MSG_NAME_REQUIRED);
        }

        let cpf = Cpf::normalize(&form.cpf);
        if form.cpf.trim().is_empty() {
            errors.insert(FIELD_CPF, MSG_CPF_REQUIRED);
        } else if cpf.len() != Cpf::LENGTH {
            errors.insert(FIELD_CPF, MSG_CPF_LENGTH);
        } else if self.original_cpf.as_deref() != Some(cpf.as_str()) {
            match self.api.cpf_exists(&cpf).await {
                Ok(true) => errors.insert(FIELD_CPF, MSG_CPF_IN_USE),
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "CPF uniqueness check failed");
                    errors.insert(FIELD_CPF, MSG_CPF_CHECK_FAILED);
                }
            }
        }

        if errors.is_empty() {
            Ok(form.to_data(cpf))
        } else {
            Err(errors)
        }
    }

    /// Validate and then create or update the record.
    ///
    /// A validation failure is kept in `errors()` and returned as
    /// `DomainError::InvalidFields`.
    pub async fn submit(&mut self, form: &PersonForm) -> Result<SubmitOutcome, DomainError> {
        let data = match self.validate(form).await {
            Ok(data) => data,
            Err(errors) => {
                debug!(fields = errors.len(), "Form validation failed");
                self.errors = errors.clone();
                return Err(DomainError::InvalidFields(errors));
            }
        };
        self.errors.clear();

        let cpf = data.cpf.clone();
        let outcome = match self.record_id {
            None => {
                let id = self.api.create(&data).await?;
                self.record_id = Some(id);
                SubmitOutcome::Created(id)
            }
            Some(id) => {
                self.api.update(&PersonRecord::new(id, data)).await?;
                SubmitOutcome::Updated(id)
            }
        };
        self.original_cpf = Some(cpf);

        Ok(outcome)
    }

    /// Fill the address fields from the postal code (the CEP field lost
    /// focus). Street, complement, neighborhood, city and state are
    /// overwritten; a failed lookup leaves the form untouched.
    pub async fn autofill_address<L>(
        &self,
        lookup: &L,
        form: &mut PersonForm,
    ) -> Result<(), DomainError>
    where
        L: PostalCodeLookup + ?Sized,
    {
        let address = lookup.lookup(&form.postal_code).await.inspect_err(|e| {
            warn!(cep = %form.postal_code, error = %e, "Postal code lookup failed");
        })?;

        form.street = address.street;
        form.complement = address.complement;
        form.neighborhood = address.neighborhood;
        form.city = address.city;
        form.state = address.state;
        Ok(())
    }

    /// Delete the loaded record after confirmation
    pub async fn delete(&self, notifier: &dyn Notifier) -> Result<bool, DomainError> {
        let Some(id) = self.record_id else {
            return Ok(false);
        };
        if !notifier.confirm(DELETE_CONFIRMATION) {
            return Ok(false);
        }

        self.api.delete(id).await?;
        Ok(true)
    }
}
