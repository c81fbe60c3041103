use std::collections::HashSet;

use crate::model::config::ConfigError;
use crate::model::ids::{OptionId, QuestionId};

//
// ─── OPTION ────────────────────────────────────────────────────────────────────
//

/// One selectable choice of a question.
///
/// `value` is the weight the choice contributes to the average score.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizOption {
    id: OptionId,
    text: String,
    value: f64,
}

impl QuizOption {
    /// Creates a new option.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyText` if the text is blank and
    /// `ConfigError::NonFiniteOptionValue` if `value` is NaN or infinite.
    pub fn new(id: OptionId, text: impl Into<String>, value: f64) -> Result<Self, ConfigError> {
        let text = non_blank("option text", text.into())?;
        if !value.is_finite() {
            return Err(ConfigError::NonFiniteOptionValue(id));
        }
        Ok(Self { id, text, value })
    }

    #[must_use]
    pub fn id(&self) -> &OptionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A quiz question with its ordered list of options.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<QuizOption>,
}

impl Question {
    /// Creates a question. Option order is kept for display.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the prompt is blank, there are no options,
    /// or two options share an id.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<QuizOption>,
    ) -> Result<Self, ConfigError> {
        let prompt = non_blank("question text", prompt.into())?;
        if options.is_empty() {
            return Err(ConfigError::QuestionWithoutOptions(id));
        }

        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.id()) {
                return Err(ConfigError::DuplicateOptionId {
                    question: id.clone(),
                    option: option.id().clone(),
                });
            }
        }

        Ok(Self {
            id,
            prompt,
            options,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// The question text shown to the user.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[QuizOption] {
        &self.options
    }

    /// Looks up an option by id.
    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&QuizOption> {
        self.options.iter().find(|option| option.id() == id)
    }
}

pub(crate) fn non_blank(field: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::EmptyText(field))
    } else {
        Ok(value)
    }
}
