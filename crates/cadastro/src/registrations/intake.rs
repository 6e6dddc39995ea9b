use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::domain::NewRegistration;

/// Required payload keys, checked in this order.
pub const REQUIRED_FIELDS: [&str; 4] = ["nome", "email", "telefone", "cnpj"];

/// Validation failure for a visitor submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Dados inválidos")]
    Malformed,
    #[error("Campo obrigatório: {0}")]
    MissingField(&'static str),
}

/// Partner companies arrive either as a JSON list or as free text from older form versions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PartnerCompanies {
    List(Vec<String>),
    Text(String),
}

impl PartnerCompanies {
    /// Lists are stored as their JSON encoding so names containing commas or quotes survive.
    pub fn encode(&self) -> String {
        match self {
            Self::List(companies) => {
                serde_json::to_string(companies).unwrap_or_else(|_| "[]".to_string())
            }
            Self::Text(text) => text.clone(),
        }
    }
}

impl Default for PartnerCompanies {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// Raw JSON body posted by the public form.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationPayload {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    #[serde(rename = "cnpj")]
    pub tax_id: Option<String>,
    #[serde(rename = "razao_social")]
    pub legal_name: Option<String>,
    #[serde(rename = "nome_fantasia")]
    pub trade_name: Option<String>,
    #[serde(rename = "cep")]
    pub postal_code: Option<String>,
    #[serde(rename = "endereco")]
    pub street: Option<String>,
    #[serde(rename = "numero")]
    pub number: Option<String>,
    #[serde(rename = "complemento")]
    pub complement: Option<String>,
    #[serde(rename = "bairro")]
    pub neighborhood: Option<String>,
    #[serde(rename = "cidade")]
    pub city: Option<String>,
    #[serde(rename = "uf")]
    pub state: Option<String>,
    #[serde(rename = "site")]
    pub website: Option<String>,
    #[serde(rename = "instagram")]
    pub social_handle: Option<String>,
    #[serde(rename = "num_funcionarios")]
    pub employee_bracket: Option<String>,
    #[serde(rename = "empresas_brinde")]
    pub partner_companies: Option<PartnerCompanies>,
    #[serde(rename = "segmento")]
    pub segment: Option<String>,
    #[serde(rename = "como_conheceu")]
    pub referral_source: Option<String>,
    #[serde(rename = "termos_aceitos", default, deserialize_with = "deserialize_truthy")]
    pub terms_accepted: bool,
}

impl RegistrationPayload {
    /// Parses a request body. Anything other than a non-empty JSON object is malformed.
    pub fn from_slice(body: &[u8]) -> Result<Self, IntakeError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| IntakeError::Malformed)?;
        match &value {
            Value::Object(fields) if !fields.is_empty() => {}
            _ => return Err(IntakeError::Malformed),
        }
        serde_json::from_value(value).map_err(|_| IntakeError::Malformed)
    }

    pub fn into_registration(self) -> Result<NewRegistration, IntakeError> {
        let [name_key, email_key, phone_key, tax_id_key] = REQUIRED_FIELDS;
        let name = required(self.name, name_key)?;
        let email = required(self.email, email_key)?.to_lowercase();
        let phone = required(self.phone, phone_key)?;
        let tax_id = required(self.tax_id, tax_id_key)?;

        Ok(NewRegistration {
            name,
            email,
            phone,
            tax_id,
            legal_name: optional(self.legal_name),
            trade_name: optional(self.trade_name),
            postal_code: optional(self.postal_code),
            street: optional(self.street),
            number: optional(self.number),
            complement: optional(self.complement),
            neighborhood: optional(self.neighborhood),
            city: optional(self.city),
            state: optional(self.state),
            website: optional(self.website),
            social_handle: optional(self.social_handle),
            employee_bracket: optional(self.employee_bracket),
            partner_companies: self.partner_companies.unwrap_or_default().encode(),
            segment: optional(self.segment),
            referral_source: optional(self.referral_source),
            terms_accepted: self.terms_accepted,
        })
    }
}

/// Validates a raw body into an insertable registration.
pub fn parse_submission(body: &[u8]) -> Result<NewRegistration, IntakeError> {
    RegistrationPayload::from_slice(body)?.into_registration()
}

fn required(value: Option<String>, field: &'static str) -> Result<String, IntakeError> {
    let trimmed = optional(value);
    if trimmed.is_empty() {
        Err(IntakeError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn optional(value: Option<String>) -> String {
    value
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

/// Accepts checkbox values the way browsers and scripts send them: booleans, 0/1, "on".
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).expect("serializable")
    }

    #[test]
    fn trims_and_lowercases_email() {
        let registration = parse_submission(&body(json!({
            "nome": "  Ana Souza ",
            "email": " Ana@Example.COM ",
            "telefone": "11 99999-0000",
            "cnpj": "11.222.333/0001-81",
        })))
        .expect("valid submission");

        assert_eq!(registration.name, "Ana Souza");
        assert_eq!(registration.email, "ana@example.com");
        assert_eq!(registration.tax_id, "11.222.333/0001-81");
        assert_eq!(registration.city, "");
        assert_eq!(registration.partner_companies, "[]");
        assert!(!registration.terms_accepted);
    }

    #[test]
    fn reports_first_missing_field_in_fixed_order() {
        let err = parse_submission(&body(json!({ "cnpj": "1", "telefone": " " })))
            .expect_err("nome missing");
        assert_eq!(err, IntakeError::MissingField("nome"));

        let err = parse_submission(&body(json!({
            "nome": "Ana",
            "email": "ana@example.com",
            "telefone": "   ",
        })))
        .expect_err("telefone blank");
        assert_eq!(err.to_string(), "Campo obrigatório: telefone");

        let err = parse_submission(&body(json!({
            "nome": "Ana",
            "email": "ana@example.com",
            "telefone": "1199",
            "cnpj": null,
        })))
        .expect_err("cnpj null");
        assert_eq!(err, IntakeError::MissingField("cnpj"));
    }

    #[test]
    fn rejects_empty_or_non_object_bodies() {
        let cases: [&[u8]; 5] = [b"", b"{}", b"[]", b"\"text\"", b"{not json"];
        for raw in cases {
            assert_eq!(parse_submission(raw), Err(IntakeError::Malformed));
        }
    }

    #[test]
    fn rejects_non_string_fields() {
        let err = parse_submission(&body(json!({ "nome": 42, "email": "a@b.c" })))
            .expect_err("number name");
        assert_eq!(err, IntakeError::Malformed);
    }

    #[test]
    fn encodes_partner_lists_as_json() {
        let registration = parse_submission(&body(json!({
            "nome": "Ana",
            "email": "ana@example.com",
            "telefone": "1199",
            "cnpj": "11222333000181",
            "empresas_brinde": ["Acme, Ltda", "Beta \"B\""],
            "termos_aceitos": "on",
        })))
        .expect("valid submission");

        assert_eq!(
            registration.partner_companies,
            r#"["Acme, Ltda","Beta \"B\""]"#
        );
        assert!(registration.terms_accepted);
    }

    #[test]
    fn keeps_plain_text_partner_values() {
        let registration = parse_submission(&body(json!({
            "nome": "Ana",
            "email": "ana@example.com",
            "telefone": "1199",
            "cnpj": "11222333000181",
            "empresas_brinde": "Acme",
            "termos_aceitos": 0,
        })))
        .expect("valid submission");

        assert_eq!(registration.partner_companies, "Acme");
        assert!(!registration.terms_accepted);
    }
}
