mod answer;
mod config;
mod ids;
mod question;
mod tier;

pub use answer::AnswerRecord;
pub use config::{
    ConfigError, OptionDraft, QuestionDraft, QuizConfiguration, QuizConfigurationDraft, ScoreGap,
    TierDraft,
};
pub use ids::{IdError, OptionId, QuestionId, TierId};
pub use question::{Question, QuizOption};
pub use tier::ResultTier;
