//! Registered applications and the broadcast group derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ApplicationId, ValidationError};

const MAX_SLUG_LEN: usize = 50;
const MAX_TIER_LEN: usize = 50;

/// A registered application at one deployment tier.
///
/// `(slug, tier)` is unique across all applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub slug: String,
    pub tier: String,
}

impl Application {
    /// Human-readable name, `"{slug} {tier}"`.
    pub fn name(&self) -> String {
        format!("{} {}", self.slug, self.tier)
    }

    /// The broadcast group subscribers of this application join.
    pub fn group_key(&self) -> GroupKey {
        GroupKey::for_route(&self.slug, &self.tier)
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.slug, self.tier)
    }
}

/// Input for registering an application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewApplication {
    pub slug: String,
    pub tier: String,
}

impl NewApplication {
    pub fn new(slug: impl Into<String>, tier: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            tier: tier.into(),
        }
    }

    /// Checks that the slug is URL-safe and the tier is a short, non-empty label.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.slug.is_empty() {
            return Err(ValidationError::blank("slug"));
        }
        if !self
            .slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::invalid(
                "slug",
                "only letters, numbers, underscores or hyphens are allowed",
            ));
        }
        if self.slug.len() > MAX_SLUG_LEN {
            return Err(ValidationError::invalid(
                "slug",
                format!("at most {} characters", MAX_SLUG_LEN),
            ));
        }
        if self.tier.trim().is_empty() {
            return Err(ValidationError::blank("tier"));
        }
        if self.tier.chars().count() > MAX_TIER_LEN {
            return Err(ValidationError::invalid(
                "tier",
                format!("at most {} characters", MAX_TIER_LEN),
            ));
        }
        Ok(())
    }
}

/// Name of a broadcast group: `maintenance_{slug}_{tier}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    /// Derives the group key from an application's route parameters.
    pub fn for_route(slug: &str, tier: &str) -> Self {
        Self(format!("maintenance_{}_{}", slug, tier))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perma_prod() -> Application {
        Application {
            id: ApplicationId::new(1),
            slug: "perma".to_string(),
            tier: "prod".to_string(),
        }
    }

    #[test]
    fn name_joins_slug_and_tier() {
        assert_eq!(perma_prod().name(), "perma prod");
        assert_eq!(perma_prod().to_string(), perma_prod().name());
    }

    #[test]
    fn group_key_matches_exact_format() {
        assert_eq!(perma_prod().group_key().as_str(), "maintenance_perma_prod");
        assert_eq!(
            GroupKey::for_route("perma", "prod"),
            perma_prod().group_key()
        );
    }

    #[test]
    fn new_application_accepts_slug_characters() {
        assert!(NewApplication::new("h2o-web_2", "stage").validate().is_ok());
    }

    #[test]
    fn new_application_rejects_bad_input() {
        assert!(NewApplication::new("", "prod").validate().is_err());
        assert!(NewApplication::new("has space", "prod").validate().is_err());
        assert!(NewApplication::new("perma", " ").validate().is_err());
        assert!(NewApplication::new("perma", "x".repeat(51)).validate().is_err());
        assert!(NewApplication::new("a".repeat(50), "prod").validate().is_ok());
        assert_eq!(
            NewApplication::new("a".repeat(51), "prod").validate(),
            Err(ValidationError::invalid("slug", "at most 50 characters"))
        );
    }
}
