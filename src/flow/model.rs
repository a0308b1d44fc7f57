//! The finalized lead record and its canonical field keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Canonical field keys of the lead schema.
///
/// Catalog entries and the persisted record shape must stay in
/// agreement on these; they double as the wire names of the record.
pub mod field_keys {
    pub const TASK: &str = "task";
    pub const PLAN: &str = "plan";
    pub const BUDGET: &str = "budget";
    pub const TIMELINE: &str = "timeline";
    pub const TECH_PREFERENCES: &str = "techPreferences";
    pub const CONTACT: &str = "contact";
    pub const USER_CONTACT: &str = "userContact";

    /// All keys in catalog order.
    pub const ALL: [&str; 7] = [
        TASK,
        PLAN,
        BUDGET,
        TIMELINE,
        TECH_PREFERENCES,
        CONTACT,
        USER_CONTACT,
    ];
}

/// The immutable answer set handed to storage and notification once a
/// session completes.
///
/// One text field per catalog entry, serialized under the camelCase
/// field keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub task: String,
    pub plan: String,
    pub budget: String,
    pub timeline: String,
    pub tech_preferences: String,
    pub contact: String,
    pub user_contact: String,
}

impl LeadRecord {
    /// Assemble a record from a completed session's answers.
    ///
    /// Answers are keyed by catalog field key. A key the catalog never
    /// asked for yields an empty string; with the standard catalog the
    /// flow only finalizes once every key has an answer.
    pub fn from_answers(answers: &HashMap<String, String>) -> Self {
        let field = |key: &str| answers.get(key).cloned().unwrap_or_default();
        Self {
            task: field(field_keys::TASK),
            plan: field(field_keys::PLAN),
            budget: field(field_keys::BUDGET),
            timeline: field(field_keys::TIMELINE),
            tech_preferences: field(field_keys::TECH_PREFERENCES),
            contact: field(field_keys::CONTACT),
            user_contact: field(field_keys::USER_CONTACT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_answers() -> HashMap<String, String> {
        field_keys::ALL
            .iter()
            .map(|key| (key.to_string(), format!("answer for {key}")))
            .collect()
    }

    #[test]
    fn from_answers_maps_every_key() {
        let record = LeadRecord::from_answers(&full_answers());

        assert_eq!(record.task, "answer for task");
        assert_eq!(record.plan, "answer for plan");
        assert_eq!(record.budget, "answer for budget");
        assert_eq!(record.timeline, "answer for timeline");
        assert_eq!(record.tech_preferences, "answer for techPreferences");
        assert_eq!(record.contact, "answer for contact");
        assert_eq!(record.user_contact, "answer for userContact");
    }

    #[test]
    fn from_answers_defaults_missing_keys_to_empty() {
        let mut answers = HashMap::new();
        answers.insert(field_keys::TASK.to_string(), "Website".to_string());

        let record = LeadRecord::from_answers(&answers);

        assert_eq!(record.task, "Website");
        assert_eq!(record.plan, "");
        assert_eq!(record.user_contact, "");
    }

    #[test]
    fn record_serializes_under_camel_case_keys() {
        let record = LeadRecord::from_answers(&full_answers());
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), field_keys::ALL.len());
        for key in field_keys::ALL {
            assert!(object.contains_key(key), "missing key {key}");
        }
    }

    #[test]
    fn record_deserializes_from_camel_case_keys() {
        let json = r#"{
            "task": "Website",
            "plan": "Have a plan",
            "budget": "Under 10k",
            "timeline": "1-3 months",
            "techPreferences": "No",
            "contact": "Yes",
            "userContact": "lead@example.com"
        }"#;

        let record: LeadRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.tech_preferences, "No");
        assert_eq!(record.user_contact, "lead@example.com");
    }

    #[test]
    fn field_keys_are_distinct() {
        let unique: std::collections::HashSet<_> = field_keys::ALL.iter().collect();
        assert_eq!(unique.len(), field_keys::ALL.len());
    }
}
