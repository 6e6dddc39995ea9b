//! Pass-through proxy for the CNPJ (tax registry) and CEP (postal code) lookups used by the
//! public form. Inputs are normalized locally; the upstream answer is relayed untouched.

pub mod client;
pub mod router;

use std::fmt;

pub use client::LookupProxy;
pub use router::lookup_routes;

/// The two upstream lookups the form performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Cnpj,
    Cep,
}

impl LookupKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Cnpj => "CNPJ",
            Self::Cep => "CEP",
        }
    }

    pub fn digits(self) -> usize {
        match self {
            Self::Cnpj => 14,
            Self::Cep => 8,
        }
    }

    fn punctuation(self) -> &'static [char] {
        match self {
            Self::Cnpj => &['.', '/', '-'],
            Self::Cep => &['-', '.'],
        }
    }

    /// Strips formatting punctuation and requires exactly the expected number of ASCII digits.
    pub fn normalize(self, raw: &str) -> Result<String, LookupError> {
        let cleaned: String = raw
            .chars()
            .filter(|ch| !self.punctuation().contains(ch))
            .collect();

        if cleaned.len() == self.digits() && cleaned.bytes().all(|b| b.is_ascii_digit()) {
            Ok(cleaned)
        } else {
            Err(LookupError::Invalid { kind: self })
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("{kind} inválido")]
    Invalid { kind: LookupKind },
    #[error("{kind} não encontrado")]
    NotFound { kind: LookupKind, status: u16 },
    #[error("Erro ao consultar {kind}")]
    Gateway {
        kind: LookupKind,
        #[source]
        source: reqwest::Error,
    },
}

impl LookupError {
    /// HTTP status the proxy answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Invalid { .. } => 400,
            Self::NotFound { status, .. } => *status,
            Self::Gateway { .. } => 502,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_formatted_cnpj() {
        assert_eq!(
            LookupKind::Cnpj.normalize("11.222.333/0001-81").expect("valid"),
            "11222333000181"
        );
    }

    #[test]
    fn rejects_short_or_non_numeric_cnpj() {
        for raw in ["11.222.333/0001", "1122233300018a", "11 222 333 0001 81", ""] {
            assert!(matches!(
                LookupKind::Cnpj.normalize(raw),
                Err(LookupError::Invalid {
                    kind: LookupKind::Cnpj
                })
            ));
        }
    }

    #[test]
    fn normalizes_formatted_cep() {
        assert_eq!(LookupKind::Cep.normalize("01310-100").expect("valid"), "01310100");
        assert_eq!(LookupKind::Cep.normalize("01.310-100").expect("valid"), "01310100");
    }

    #[test]
    fn cep_keeps_slashes_and_rejects_them() {
        assert!(LookupKind::Cep.normalize("0131/0100").is_err());
        assert!(LookupKind::Cep.normalize("0131010").is_err());
        assert!(LookupKind::Cep.normalize("013101000").is_err());
    }

    #[test]
    fn error_messages_name_the_lookup() {
        let err = LookupKind::Cep.normalize("1").expect_err("too short");
        assert_eq!(err.to_string(), "CEP inválido");
        assert_eq!(err.status_code(), 400);
        let not_found = LookupError::NotFound {
            kind: LookupKind::Cnpj,
            status: 404,
        };
        assert_eq!(not_found.to_string(), "CNPJ não encontrado");
        assert_eq!(not_found.status_code(), 404);
    }
}
