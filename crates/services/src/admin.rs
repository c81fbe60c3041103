use std::sync::Arc;

use quiz_core::model::{QuizConfiguration, QuizConfigurationDraft, TierDraft};
use storage::cache::{ADMIN_SESSION_KEY, KeyValueCache};

use crate::config_store::ConfigStore;
use crate::error::AdminError;

const AUTHENTICATED: &str = "true";

/// Shared-secret gate in front of the configuration editor.
///
/// The authenticated flag lives in the session-scoped store and disappears
/// with it.
#[derive(Clone)]
pub struct AdminGate {
    secret: String,
    session: Arc<dyn KeyValueCache>,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("secret", &"***")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl AdminGate {
    #[must_use]
    pub fn new(secret: impl Into<String>, session: Arc<dyn KeyValueCache>) -> Self {
        Self {
            secret: secret.into(),
            session,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        match self.session.get(ADMIN_SESSION_KEY) {
            Ok(flag) => flag.as_deref() == Some(AUTHENTICATED),
            Err(err) => {
                tracing::warn!(error = %err, "admin session store unreadable");
                false
            }
        }
    }

    /// Check `input` against the secret. A wrong entry is cleared.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidSecret` on mismatch, or `AdminError::Cache`
    /// if the flag cannot be stored.
    pub fn submit(&self, input: &mut String) -> Result<(), AdminError> {
        if *input != self.secret {
            input.clear();
            tracing::info!("admin sign-in rejected");
            return Err(AdminError::InvalidSecret);
        }
        self.session.set(ADMIN_SESSION_KEY, AUTHENTICATED)?;
        tracing::info!("admin signed in");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AdminError::Cache` if the flag cannot be removed.
    pub fn sign_out(&self) -> Result<(), AdminError> {
        self.session.remove(ADMIN_SESSION_KEY)?;
        Ok(())
    }

    fn require(&self) -> Result<(), AdminError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AdminError::NotAuthenticated)
        }
    }
}

/// One field change on a result tier.
#[derive(Debug, Clone, PartialEq)]
pub enum TierEdit {
    Name(String),
    MinScore(f64),
    MaxScore(f64),
    Description(String),
    EmbedHtml(Option<String>),
    RedirectUrl(Option<String>),
}

/// Working copy of the configuration for the admin view.
///
/// Edits apply to an unvalidated draft; [`ConfigEditor::commit`] validates and
/// saves it. Option values are not editable.
#[derive(Debug, Clone)]
pub struct ConfigEditor {
    draft: QuizConfigurationDraft,
}

impl ConfigEditor {
    /// # Errors
    ///
    /// Returns `AdminError::NotAuthenticated` unless the gate is open.
    pub fn open(gate: &AdminGate, config: &QuizConfiguration) -> Result<Self, AdminError> {
        gate.require()?;
        Ok(Self {
            draft: config.to_draft(),
        })
    }

    /// # Errors
    ///
    /// Returns `AdminError::UnknownQuestion` if no question has `question_id`.
    pub fn set_question_text(
        &mut self,
        question_id: &str,
        text: impl Into<String>,
    ) -> Result<(), AdminError> {
        let question = self
            .draft
            .questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or_else(|| AdminError::UnknownQuestion(question_id.to_owned()))?;
        question.question = text.into();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AdminError::UnknownQuestion` or `AdminError::UnknownOption`.
    pub fn set_option_text(
        &mut self,
        question_id: &str,
        option_id: &str,
        text: impl Into<String>,
    ) -> Result<(), AdminError> {
        let question = self
            .draft
            .questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or_else(|| AdminError::UnknownQuestion(question_id.to_owned()))?;
        let option = question
            .options
            .iter_mut()
            .find(|o| o.id == option_id)
            .ok_or_else(|| AdminError::UnknownOption {
                question: question_id.to_owned(),
                option: option_id.to_owned(),
            })?;
        option.text = text.into();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AdminError::UnknownTier` if no tier has `tier_id`.
    pub fn edit_tier(&mut self, tier_id: &str, edit: TierEdit) -> Result<(), AdminError> {
        let tier = self.tier_mut(tier_id)?;
        match edit {
            TierEdit::Name(name) => tier.name = name,
            TierEdit::MinScore(min) => tier.min_score = min,
            TierEdit::MaxScore(max) => tier.max_score = max,
            TierEdit::Description(description) => tier.description = description,
            TierEdit::EmbedHtml(html) => tier.embed_html = html,
            TierEdit::RedirectUrl(url) => tier.redirect_url = url,
        }
        Ok(())
    }

    /// Swap the whole working copy, as when importing a file.
    pub fn replace_draft(&mut self, draft: QuizConfigurationDraft) {
        self.draft = draft;
    }

    #[must_use]
    pub fn draft(&self) -> &QuizConfigurationDraft {
        &self.draft
    }

    /// Validate the working copy, install it and save it.
    ///
    /// A failed save still leaves the new configuration in memory.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` if the gate closed since opening, `Invalid`
    /// if validation fails (nothing is changed), or `Save` if the remote
    /// write fails.
    pub async fn commit(
        self,
        gate: &AdminGate,
        store: &ConfigStore,
    ) -> Result<QuizConfiguration, AdminError> {
        gate.require()?;
        let config = self.draft.validate()?;
        store.replace(config.clone()).await?;
        tracing::info!(
            questions = config.question_count(),
            results = config.results().len(),
            "admin changes saved"
        );
        Ok(config)
    }

    fn tier_mut(&mut self, tier_id: &str) -> Result<&mut TierDraft, AdminError> {
        self.draft
            .results
            .iter_mut()
            .find(|t| t.id == tier_id)
            .ok_or_else(|| AdminError::UnknownTier(tier_id.to_owned()))
    }
}
