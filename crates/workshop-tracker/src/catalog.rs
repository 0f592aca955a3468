//! Admin-managed lookups: class types and clients

use serde::{Deserialize, Serialize};

use crate::money;

/// A kind of workshop with its per-person material cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassType {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, deserialize_with = "money::deserialize_amount")]
    pub cost_per_person: f64,
}

/// Incomes reference class types by name, so lookups are case-insensitive
pub fn find_class_type<'a>(class_types: &'a [ClassType], name: &str) -> Option<&'a ClassType> {
    let name = name.trim();
    class_types
        .iter()
        .find(|c| c.name.trim().eq_ignore_ascii_case(name))
}

/// Client record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(default)]
    pub id: Option<i64>,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "money::deserialize_amount")]
    pub total_spent: f64,
    #[serde(default)]
    pub total_sessions: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Average spend per session, 0 when the client has no sessions
pub fn average_spend(client: &Client) -> f64 {
    if client.total_sessions > 0 {
        money::sanitize(client.total_spent) / client.total_sessions as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_class_type_ignores_case_and_padding() {
        let types = vec![
            ClassType {
                id: Some(1),
                name: "Hand Building".to_string(),
                cost_per_person: 8.0,
            },
            ClassType {
                id: Some(2),
                name: "Wheel".to_string(),
                cost_per_person: 12.0,
            },
        ];

        assert_eq!(find_class_type(&types, " wheel ").map(|c| c.id), Some(Some(2)));
        assert!(find_class_type(&types, "Raku").is_none());
    }

    #[test]
    fn test_average_spend() {
        let mut client: Client = serde_json::from_str(r#"{"full_name": "Dana"}"#).unwrap();
        assert!(client.is_active);
        assert_eq!(average_spend(&client), 0.0);

        client.total_spent = 250.0;
        client.total_sessions = 4;
        assert_eq!(average_spend(&client), 62.5);
    }
}
