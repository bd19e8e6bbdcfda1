use serde::{Deserialize, Serialize};

/// A customer account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    pub id: String,
    /// Short business code, unique across clients when present.
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Contact person on the client side.
    #[serde(default)]
    pub responsible: Option<String>,
}

impl Client {
    /// Create a client with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            code: None,
            name: name.into(),
            phone: None,
            responsible: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_responsible(mut self, responsible: impl Into<String>) -> Self {
        self.responsible = Some(responsible.into());
        self
    }

    /// "CODE - Name" style label, falling back to the name alone.
    pub fn label(&self) -> String {
        match self.code.as_deref().filter(|c| !c.is_empty()) {
            Some(code) => format!("{} - {}", code, self.name),
            None => self.name.clone(),
        }
    }
}

/// Single-field change to a stored client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ClientUpdate {
    Code(Option<String>),
    Name(String),
    Phone(Option<String>),
    Responsible(Option<String>),
}

impl ClientUpdate {
    pub fn field(&self) -> &'static str {
        match self {
            ClientUpdate::Code(_) => "code",
            ClientUpdate::Name(_) => "name",
            ClientUpdate::Phone(_) => "phone",
            ClientUpdate::Responsible(_) => "responsible",
        }
    }

    pub fn apply(&self, client: &mut Client) {
        match self.clone() {
            ClientUpdate::Code(code) => client.code = code,
            ClientUpdate::Name(name) => client.name = name,
            ClientUpdate::Phone(phone) => client.phone = phone,
            ClientUpdate::Responsible(responsible) => client.responsible = responsible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        let client = Client::new("Padaria Central").with_code("C042");
        assert_eq!(client.label(), "C042 - Padaria Central");

        let client = Client::new("Padaria Central");
        assert_eq!(client.label(), "Padaria Central");
    }

    #[test]
    fn test_deserialize_optional_fields() {
        let client: Client = serde_json::from_str(r#"{"id":"c1","name":"Acme"}"#).unwrap();
        assert_eq!(client.id, "c1");
        assert!(client.code.is_none());
        assert!(client.phone.is_none());
        assert!(client.responsible.is_none());
    }

    #[test]
    fn test_update_apply() {
        let mut client = Client::new("Acme");
        ClientUpdate::Phone(Some("+55 11 5555-0000".to_string())).apply(&mut client);
        assert_eq!(client.phone.as_deref(), Some("+55 11 5555-0000"));
        assert_eq!(ClientUpdate::Name("x".to_string()).field(), "name");
    }
}
