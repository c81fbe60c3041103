use url::Url;

use crate::model::config::ConfigError;
use crate::model::ids::TierId;
use crate::model::question::non_blank;

/// A named scoring bracket covering the inclusive range `[min_score, max_score]`.
///
/// A tier may carry an HTML embed shown on the result view and an external
/// redirect URL the result view navigates to instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTier {
    id: TierId,
    name: String,
    min_score: f64,
    max_score: f64,
    description: String,
    embed_html: Option<String>,
    redirect_url: Option<String>,
}

impl ResultTier {
    /// Creates a tier with an empty description and no embed/redirect.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyText` for a blank name and
    /// `ConfigError::InvalidTierBounds` if either bound is not finite or
    /// `min_score > max_score`.
    pub fn new(
        id: TierId,
        name: impl Into<String>,
        min_score: f64,
        max_score: f64,
    ) -> Result<Self, ConfigError> {
        let name = non_blank("tier name", name.into())?;
        if !min_score.is_finite() || !max_score.is_finite() || min_score > max_score {
            return Err(ConfigError::InvalidTierBounds {
                id,
                min: min_score,
                max: max_score,
            });
        }

        Ok(Self {
            id,
            name,
            min_score,
            max_score,
            description: String::new(),
            embed_html: None,
            redirect_url: None,
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach an HTML embed. Blank input clears it.
    #[must_use]
    pub fn with_embed_html(mut self, embed_html: Option<String>) -> Self {
        self.embed_html = normalize_optional(embed_html);
        self
    }

    /// Attach a redirect URL. Blank input clears it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRedirectUrl` if the URL is not absolute.
    pub fn with_redirect_url(mut self, redirect_url: Option<String>) -> Result<Self, ConfigError> {
        let redirect_url = normalize_optional(redirect_url);
        if let Some(url) = redirect_url.as_ref() {
            if Url::parse(url).is_err() {
                return Err(ConfigError::InvalidRedirectUrl {
                    id: self.id,
                    url: url.clone(),
                });
            }
        }
        self.redirect_url = redirect_url;
        Ok(self)
    }

    #[must_use]
    pub fn id(&self) -> &TierId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    #[must_use]
    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn embed_html(&self) -> Option<&str> {
        self.embed_html.as_deref()
    }

    #[must_use]
    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }

    /// Inclusive on both bounds.
    #[must_use]
    pub fn contains(&self, score: f64) -> bool {
        self.min_score <= score && score <= self.max_score
    }
}

pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
