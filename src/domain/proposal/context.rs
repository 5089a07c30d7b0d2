//! Proposal context as delivered by the upstream proposal feed.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ProposalId, Timestamp};

/// Choices offered when the feed does not list any.
pub const DEFAULT_CHOICES: [&str; 3] = ["For", "Against", "Abstain"];

/// Read-only proposal record. Owned by the external feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalContext {
    pub id: ProposalId,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub body: String,
    /// Enclosing organization (DAO / space) name.
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub start: Option<Timestamp>,
    #[serde(default)]
    pub end: Option<Timestamp>,
}

impl ProposalContext {
    /// Creates a proposal with the required fields.
    pub fn new(id: ProposalId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            summary: None,
            body: body.into(),
            organization: String::new(),
            status: String::new(),
            choices: Vec::new(),
            start: None,
            end: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_voting_window(mut self, start: Timestamp, end: Timestamp) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Title, summary and body joined and lower-cased, for keyword matching.
    pub fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len() + self.body.len() + self.summary.as_ref().map_or(0, |s| s.len()) + 2,
        );
        text.push_str(&self.title);
        if let Some(summary) = &self.summary {
            text.push('\n');
            text.push_str(summary);
        }
        text.push('\n');
        text.push_str(&self.body);
        text.to_lowercase()
    }

    /// Explicit choices, or the default for/against/abstain triple.
    pub fn vote_choices(&self) -> Vec<String> {
        if self.choices.is_empty() {
            DEFAULT_CHOICES.iter().map(|c| c.to_string()).collect()
        } else {
            self.choices.clone()
        }
    }

    /// Organization name, or a placeholder when the feed left it blank.
    pub fn organization_name(&self) -> &str {
        if self.organization.trim().is_empty() {
            "the DAO"
        } else {
            &self.organization
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal() -> ProposalContext {
        ProposalContext::new(
            ProposalId::new("42").unwrap(),
            "Fund Community Grants",
            "Allocate 50k USDC to SAFE projects.",
        )
    }

    #[test]
    fn searchable_text_is_lowercased_and_includes_summary() {
        let text = proposal().with_summary("Short Summary").searchable_text();
        assert!(text.contains("fund community grants"));
        assert!(text.contains("short summary"));
        assert!(text.contains("safe projects"));
        assert!(!text.contains("SAFE"));
    }

    #[test]
    fn vote_choices_default_when_feed_has_none() {
        assert_eq!(proposal().vote_choices(), vec!["For", "Against", "Abstain"]);

        let custom = proposal().with_choices(vec!["Yes".into(), "No".into()]);
        assert_eq!(custom.vote_choices(), vec!["Yes", "No"]);
    }

    #[test]
    fn organization_name_has_placeholder() {
        assert_eq!(proposal().organization_name(), "the DAO");
        assert_eq!(proposal().with_organization("Aave").organization_name(), "Aave");
    }

    #[test]
    fn deserializes_feed_shape_with_defaults() {
        let json = r#"{"id":"87","title":"Deploy New Treasury Allocator"}"#;
        let p: ProposalContext = serde_json::from_str(json).unwrap();
        assert_eq!(p.id.as_str(), "87");
        assert!(p.body.is_empty());
        assert!(p.choices.is_empty());
        assert!(p.start.is_none());
    }
}
