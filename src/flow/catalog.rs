//! The fixed question catalog that drives the intake flow.

use std::collections::HashSet;

use crate::error::CatalogError;
use crate::flow::model::field_keys;

/// A single intake question.
///
/// An empty `options` list means the answer arrives as free text;
/// otherwise the respondent picks one of the offered options.
#[derive(Debug, Clone)]
pub struct QuestionSpec {
    pub prompt: String,
    pub options: Vec<String>,
    pub field_key: String,
}

impl QuestionSpec {
    fn new(prompt: &str, options: &[&str], field_key: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            field_key: field_key.to_string(),
        }
    }

    /// Whether this question expects a free-text answer.
    pub fn is_free_text(&self) -> bool {
        self.options.is_empty()
    }
}

/// The ordered, validated question list. Catalog order defines the
/// traversal; the last entry is the terminal question.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<QuestionSpec>,
}

impl Catalog {
    /// Validate and wrap a question list.
    ///
    /// Rejects empty catalogs and duplicate field keys, so every
    /// recorded answer lands in its own field.
    pub fn new(questions: Vec<QuestionSpec>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.field_key.as_str()) {
                return Err(CatalogError::DuplicateFieldKey(question.field_key.clone()));
            }
        }
        Ok(Self { questions })
    }

    /// The standard seven-question qualification funnel.
    ///
    /// Six selection questions followed by a terminal free-text question
    /// asking for contact details.
    pub fn standard() -> Self {
        Self {
            questions: vec![
                QuestionSpec::new(
                    "Hi! I'm a bot that will help collect the details of your project. \
                     Let's get started! What do you need built?",
                    &["Website development", "Mobile app development", "Other"],
                    field_keys::TASK,
                ),
                QuestionSpec::new(
                    "Do you already have a plan or a project, or do you need help \
                     building from scratch?",
                    &["Have a plan", "No plan", "Not sure"],
                    field_keys::PLAN,
                ),
                QuestionSpec::new(
                    "What budget are you planning for this project?",
                    &["Under 10k", "10k-50k", "Over 50k"],
                    field_keys::BUDGET,
                ),
                QuestionSpec::new(
                    "What timeline do you have in mind for the work?",
                    &["1-3 months", "3-6 months", "Over 6 months"],
                    field_keys::TIMELINE,
                ),
                QuestionSpec::new(
                    "Do you have any preferences for the technologies or platforms \
                     we should use?",
                    &["Yes", "No", "Don't know"],
                    field_keys::TECH_PREFERENCES,
                ),
                QuestionSpec::new(
                    "Can we contact you to clarify the details?",
                    &["Yes", "No", "Maybe"],
                    field_keys::CONTACT,
                ),
                QuestionSpec::new(
                    "Please share your contact (phone number or email).",
                    &[],
                    field_keys::USER_CONTACT,
                ),
            ],
        }
    }

    /// Question at `index`, if the index is a valid catalog position.
    pub fn get(&self, index: usize) -> Option<&QuestionSpec> {
        self.questions.get(index)
    }

    /// Index of the terminal question. Catalogs are never empty, so this
    /// is always a valid position.
    pub fn last_index(&self) -> usize {
        self.questions.len() - 1
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[QuestionSpec] {
        &self.questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_seven_questions_in_schema_order() {
        let catalog = Catalog::standard();

        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.last_index(), 6);

        let keys: Vec<&str> = catalog
            .questions()
            .iter()
            .map(|q| q.field_key.as_str())
            .collect();
        assert_eq!(keys, field_keys::ALL);
    }

    #[test]
    fn standard_catalog_ends_with_the_only_free_text_question() {
        let catalog = Catalog::standard();

        for question in &catalog.questions()[..catalog.last_index()] {
            assert_eq!(question.options.len(), 3, "{} should offer options", question.field_key);
            assert!(!question.is_free_text());
        }

        let terminal = catalog.get(catalog.last_index()).unwrap();
        assert!(terminal.is_free_text());
        assert_eq!(terminal.field_key, field_keys::USER_CONTACT);
    }

    #[test]
    fn standard_catalog_passes_validation() {
        let questions = Catalog::standard().questions().to_vec();
        assert!(Catalog::new(questions).is_ok());
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(Catalog::new(vec![]), Err(CatalogError::Empty)));
    }

    #[test]
    fn duplicate_field_keys_are_rejected() {
        let questions = vec![
            QuestionSpec::new("First?", &["A"], "task"),
            QuestionSpec::new("Second?", &["B"], "task"),
        ];

        match Catalog::new(questions) {
            Err(CatalogError::DuplicateFieldKey(key)) => assert_eq!(key, "task"),
            other => panic!("expected duplicate key error, got {other:?}"),
        }
    }

    #[test]
    fn get_out_of_range_returns_none() {
        let catalog = Catalog::standard();
        assert!(catalog.get(catalog.len()).is_none());
    }
}
