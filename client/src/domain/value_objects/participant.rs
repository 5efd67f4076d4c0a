use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::value_objects::{Email, PersonName};

/// Identity captured at registration. Immutable once play begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: PersonName,
    pub surname: String,
    pub email: Email,
    pub phone: String,
}

impl Participant {
    pub fn new(
        name: String,
        surname: String,
        email: String,
        phone: String,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            name: PersonName::new(name)?,
            surname: surname.trim().to_string(),
            email: Email::new(email)?,
            phone: phone.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_requires_email_and_name() {
        let err = Participant::new("Ana".into(), "Ruiz".into(), "".into(), "".into()).unwrap_err();
        assert_eq!(err, DomainError::MissingEmail);

        let err = Participant::new(" ".into(), "Ruiz".into(), "ana@example.com".into(), "".into())
            .unwrap_err();
        assert_eq!(err, DomainError::EmptyName);

        let ok = Participant::new(
            "Ana".into(),
            " Ruiz ".into(),
            "ana@example.com".into(),
            "555".into(),
        )
        .unwrap();
        assert_eq!(ok.surname, "Ruiz");
        assert_eq!(ok.email.as_str(), "ana@example.com");
    }
}
