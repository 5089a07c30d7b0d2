//! Coarse proposal categories inferred from the title.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a proposal, as judged from keywords in its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalCategory {
    Funding,
    Upgrade,
    Integration,
    Treasury,
    Chain,
    Governance,
}

const FUNDING_KEYWORDS: &[&str] = &[
    "fund", "grant", "budget", "bounty", "compensation", "payment", "sponsor", "retroactive",
];
const UPGRADE_KEYWORDS: &[&str] = &[
    "upgrade", "migrat", "v2", "v3", "improvement", "patch", "refactor", "update",
];
const INTEGRATION_KEYWORDS: &[&str] = &[
    "integrat", "partner", "collaborat", "onboard", "listing", "adopt",
];
const TREASURY_KEYWORDS: &[&str] = &[
    "treasury", "allocat", "reserve", "diversif", "rebalanc", "asset", "yield",
];
const CHAIN_KEYWORDS: &[&str] = &[
    "chain", "bridge", "deploy", "network", "layer 2", "layer-2", "rollup", "mainnet", "testnet",
];

impl ProposalCategory {
    /// Classifies a proposal title. Categories are checked in a fixed order
    /// and the first one with a keyword hit wins.
    pub fn classify(title: &str) -> Self {
        let title = title.to_lowercase();
        let ordered: [(ProposalCategory, &[&str]); 5] = [
            (ProposalCategory::Funding, FUNDING_KEYWORDS),
            (ProposalCategory::Upgrade, UPGRADE_KEYWORDS),
            (ProposalCategory::Integration, INTEGRATION_KEYWORDS),
            (ProposalCategory::Treasury, TREASURY_KEYWORDS),
            (ProposalCategory::Chain, CHAIN_KEYWORDS),
        ];

        ordered
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(ProposalCategory::Governance)
    }

    /// Human-readable category name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProposalCategory::Funding => "funding request",
            ProposalCategory::Upgrade => "protocol upgrade",
            ProposalCategory::Integration => "integration partnership",
            ProposalCategory::Treasury => "treasury management",
            ProposalCategory::Chain => "chain deployment",
            ProposalCategory::Governance => "governance process",
        }
    }
}

impl fmt::Display for ProposalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
