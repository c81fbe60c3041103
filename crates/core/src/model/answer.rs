use serde::{Deserialize, Serialize};

use crate::model::ids::{OptionId, QuestionId};
use crate::model::question::{Question, QuizOption};

/// One answered question, recorded in traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub selected_option_id: OptionId,
    pub value: f64,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(question_id: QuestionId, selected_option_id: OptionId, value: f64) -> Self {
        Self {
            question_id,
            selected_option_id,
            value,
        }
    }

    /// Record the choice of `option` for `question`, copying the option's value.
    #[must_use]
    pub fn for_option(question: &Question, option: &QuizOption) -> Self {
        Self::new(question.id().clone(), option.id().clone(), option.value())
    }
}
