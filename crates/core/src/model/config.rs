use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{IdError, OptionId, QuestionId, TierId};
use crate::model::question::{Question, QuizOption};
use crate::model::tier::ResultTier;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Structured validation failure for quiz configuration data.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    Id(#[from] IdError),

    #[error("configuration has no questions")]
    NoQuestions,

    #[error("configuration has no result tiers")]
    NoResults,

    #[error("{0} cannot be empty")]
    EmptyText(&'static str),

    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(QuestionId),

    #[error("question {0} has no options")]
    QuestionWithoutOptions(QuestionId),

    #[error("question {question} has duplicate option id {option}")]
    DuplicateOptionId {
        question: QuestionId,
        option: OptionId,
    },

    #[error("option {0} has a non-finite value")]
    NonFiniteOptionValue(OptionId),

    #[error("duplicate tier id: {0}")]
    DuplicateTierId(TierId),

    #[error("tier {id} has invalid bounds [{min}, {max}]")]
    InvalidTierBounds { id: TierId, min: f64, max: f64 },

    #[error("tier {id} has an invalid redirect url: {url}")]
    InvalidRedirectUrl { id: TierId, url: String },
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Untyped option shape as it appears in cached snapshots and editor input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDraft {
    pub id: String,
    pub text: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<OptionDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierDraft {
    pub id: String,
    pub name: String,
    pub min_score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "embedHTML", skip_serializing_if = "Option::is_none")]
    pub embed_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// Editable, not-yet-validated configuration.
///
/// Serializes with the same field names as the cached snapshot, so it is also
/// the import/export format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizConfigurationDraft {
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
    #[serde(default)]
    pub results: Vec<TierDraft>,
}

impl QuizConfigurationDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into a typed configuration.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found, checking questions before tiers.
    pub fn validate(self) -> Result<QuizConfiguration, ConfigError> {
        let mut questions = Vec::with_capacity(self.questions.len());
        for draft in self.questions {
            let mut options = Vec::with_capacity(draft.options.len());
            for option in draft.options {
                options.push(QuizOption::new(
                    OptionId::new(option.id)?,
                    option.text,
                    option.value,
                )?);
            }
            questions.push(Question::new(
                QuestionId::new(draft.id)?,
                draft.question,
                options,
            )?);
        }

        let mut results = Vec::with_capacity(self.results.len());
        for draft in self.results {
            let tier = ResultTier::new(
                TierId::new(draft.id)?,
                draft.name,
                draft.min_score,
                draft.max_score,
            )?
            .with_description(draft.description)
            .with_embed_html(draft.embed_html)
            .with_redirect_url(draft.redirect_url)?;
            results.push(tier);
        }

        QuizConfiguration::new(questions, results)
    }
}

//
// ─── CONFIGURATION ─────────────────────────────────────────────────────────────
//

/// The editable quiz dataset: ordered questions and ordered result tiers.
///
/// Always structurally valid: at least one question and one tier, unique ids.
/// Tier coverage of the score range is *not* enforced; see
/// [`QuizConfiguration::coverage_gaps`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuizConfigurationDraft", into = "QuizConfigurationDraft")]
pub struct QuizConfiguration {
    questions: Vec<Question>,
    results: Vec<ResultTier>,
}

/// An open interval of scores that no tier contains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreGap {
    pub after: f64,
    pub before: f64,
}

impl QuizConfiguration {
    /// Builds a configuration from already-typed parts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either list is empty or ids repeat.
    pub fn new(questions: Vec<Question>, results: Vec<ResultTier>) -> Result<Self, ConfigError> {
        if questions.is_empty() {
            return Err(ConfigError::NoQuestions);
        }
        if results.is_empty() {
            return Err(ConfigError::NoResults);
        }

        let mut question_ids = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !question_ids.insert(question.id()) {
                return Err(ConfigError::DuplicateQuestionId(question.id().clone()));
            }
        }

        let mut tier_ids = HashSet::with_capacity(results.len());
        for tier in &results {
            if !tier_ids.insert(tier.id()) {
                return Err(ConfigError::DuplicateTierId(tier.id().clone()));
            }
        }

        Ok(Self { questions, results })
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn results(&self) -> &[ResultTier] {
        &self.results
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn tier(&self, id: &TierId) -> Option<&ResultTier> {
        self.results.iter().find(|t| t.id() == id)
    }

    /// Converts back to the editable shape.
    #[must_use]
    pub fn to_draft(&self) -> QuizConfigurationDraft {
        QuizConfigurationDraft::from(self.clone())
    }

    /// Sub-ranges of `[low, high]` that no tier contains, in ascending order.
    ///
    /// Touching bounds (`max == next.min`) count as covered. Scores strictly
    /// between two reported bounds resolve to no tier.
    #[must_use]
    pub fn coverage_gaps(&self, low: f64, high: f64) -> Vec<ScoreGap> {
        let mut bounds: Vec<(f64, f64)> = self
            .results
            .iter()
            .map(|t| (t.min_score(), t.max_score()))
            .collect();
        bounds.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut gaps = Vec::new();
        let mut reach = low;
        for (min, max) in bounds {
            if max < reach {
                continue;
            }
            if min > reach && reach < high {
                gaps.push(ScoreGap {
                    after: reach,
                    before: min.min(high),
                });
            }
            reach = reach.max(max);
            if reach >= high {
                break;
            }
        }
        if reach < high {
            gaps.push(ScoreGap {
                after: reach,
                before: high,
            });
        }
        gaps
    }
}

impl TryFrom<QuizConfigurationDraft> for QuizConfiguration {
    type Error = ConfigError;

    fn try_from(draft: QuizConfigurationDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<QuizConfiguration> for QuizConfigurationDraft {
    fn from(config: QuizConfiguration) -> Self {
        let questions = config
            .questions
            .iter()
            .map(|q| QuestionDraft {
                id: q.id().to_string(),
                question: q.prompt().to_owned(),
                options: q
                    .options()
                    .iter()
                    .map(|o| OptionDraft {
                        id: o.id().to_string(),
                        text: o.text().to_owned(),
                        value: o.value(),
                    })
                    .collect(),
            })
            .collect();

        let results = config
            .results
            .iter()
            .map(|t| TierDraft {
                id: t.id().to_string(),
                name: t.name().to_owned(),
                min_score: t.min_score(),
                max_score: t.max_score(),
                description: t.description().to_owned(),
                embed_html: t.embed_html().map(str::to_owned),
                redirect_url: t.redirect_url().map(str::to_owned),
            })
            .collect();

        Self { questions, results }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_tiers(tiers: &[(&str, f64, f64)]) -> QuizConfigurationDraft {
        QuizConfigurationDraft {
            questions: vec![QuestionDraft {
                id: "q1".into(),
                question: "Pick one".into(),
                options: vec![
                    OptionDraft {
                        id: "a".into(),
                        text: "Low".into(),
                        value: 1.0,
                    },
                    OptionDraft {
                        id: "b".into(),
                        text: "High".into(),
                        value: 5.0,
                    },
                ],
            }],
            results: tiers
                .iter()
                .map(|(id, min, max)| TierDraft {
                    id: (*id).into(),
                    name: id.to_uppercase(),
                    min_score: *min,
                    max_score: *max,
                    description: String::new(),
                    embed_html: None,
                    redirect_url: None,
                })
                .collect(),
        }
    }

    #[test]
    fn draft_validates_into_configuration() {
        let config = draft_with_tiers(&[("low", 1.0, 3.0), ("high", 3.01, 5.0)])
            .validate()
            .unwrap();
        assert_eq!(config.question_count(), 1);
        assert_eq!(config.results().len(), 2);
        assert_eq!(
            config.tier(&TierId::new("high").unwrap()).unwrap().min_score(),
            3.01
        );
    }

    #[test]
    fn empty_sections_are_rejected() {
        let err = QuizConfigurationDraft::new().validate().unwrap_err();
        assert_eq!(err, ConfigError::NoQuestions);

        let err = draft_with_tiers(&[]).validate().unwrap_err();
        assert_eq!(err, ConfigError::NoResults);
    }

    #[test]
    fn duplicate_question_ids_are_rejected() {
        let mut draft = draft_with_tiers(&[("low", 1.0, 5.0)]);
        draft.questions.push(draft.questions[0].clone());
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateQuestionId(_)));
    }

    #[test]
    fn duplicate_tier_ids_are_rejected() {
        let err = draft_with_tiers(&[("low", 1.0, 3.0), ("low", 3.0, 5.0)])
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTierId(_)));
    }

    #[test]
    fn json_uses_snapshot_field_names() {
        let mut draft = draft_with_tiers(&[("low", 1.0, 5.0)]);
        draft.results[0].embed_html = Some("<iframe></iframe>".into());
        draft.results[0].redirect_url = Some("https://example.com".into());
        let config = draft.validate().unwrap();

        let json = serde_json::to_value(&config).unwrap();
        let tier = &json["results"][0];
        assert_eq!(tier["minScore"], 1.0);
        assert_eq!(tier["maxScore"], 5.0);
        assert_eq!(tier["embedHTML"], "<iframe></iframe>");
        assert_eq!(tier["redirectUrl"], "https://example.com");
        assert_eq!(json["questions"][0]["question"], "Pick one");

        let back: QuizConfiguration = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn deserializing_invalid_json_fails_validation() {
        let parsed: Result<QuizConfiguration, _> =
            serde_json::from_str(r#"{"questions": [], "results": []}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn gap_free_tiers_have_no_coverage_gaps() {
        let config = draft_with_tiers(&[("low", 1.0, 3.0), ("high", 3.0, 5.0)])
            .validate()
            .unwrap();
        assert!(config.coverage_gaps(1.0, 5.0).is_empty());
    }

    #[test]
    fn coverage_gaps_are_reported() {
        let config = draft_with_tiers(&[("high", 3.5, 4.5), ("low", 1.0, 2.0)])
            .validate()
            .unwrap();
        let gaps = config.coverage_gaps(1.0, 5.0);
        assert_eq!(
            gaps,
            vec![
                ScoreGap {
                    after: 2.0,
                    before: 3.5
                },
                ScoreGap {
                    after: 4.5,
                    before: 5.0
                },
            ]
        );
    }
}
