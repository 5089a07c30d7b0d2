//! Factor templates used by the fallback synthesizer, per proposal category.

use crate::domain::proposal::ProposalCategory;

/// Name and explanation of a templated factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorTemplate {
    pub name: &'static str,
    pub explanation: &'static str,
}

const fn t(name: &'static str, explanation: &'static str) -> FactorTemplate {
    FactorTemplate { name, explanation }
}

/// Template pools for one category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryTemplates {
    /// Strong arguments in favour.
    pub strong: &'static [FactorTemplate],
    /// Arguments against.
    pub negative: &'static [FactorTemplate],
    /// Secondary arguments in favour.
    pub weak: &'static [FactorTemplate],
}

static FUNDING: CategoryTemplates = CategoryTemplates {
    strong: &[
        t("Ecosystem growth", "Funding directly supports builders who expand the ecosystem."),
        t("Clear deliverables", "The request ties disbursement to concrete milestones."),
        t("Contributor retention", "Paying for sustained work keeps experienced contributors engaged."),
    ],
    negative: &[
        t("Treasury outflow", "The grant reduces funds available for other initiatives."),
        t("Accountability gap", "Reporting requirements on the recipients are limited."),
        t("Execution risk", "Funded teams may not deliver on the proposed timeline."),
    ],
    weak: &[
        t("Community visibility", "A funded initiative raises the DAO's public profile."),
        t("Precedent", "A well-structured grant sets a useful template for future requests."),
    ],
};

static UPGRADE: CategoryTemplates = CategoryTemplates {
    strong: &[
        t("Protocol capability", "The upgrade adds functionality the protocol currently lacks."),
        t("Performance gains", "The new version reduces cost and latency for users."),
        t("Security hardening", "The upgrade closes known weaknesses in the current release."),
    ],
    negative: &[
        t("Migration risk", "State migration and contract changes can introduce new bugs."),
        t("Audit coverage", "New code paths may not yet be fully audited."),
        t("Integration breakage", "Downstream integrators must adapt to interface changes."),
    ],
    weak: &[
        t("Technical debt", "The upgrade retires legacy components that slow development."),
        t("Developer experience", "Cleaner interfaces make future work easier."),
    ],
};

static INTEGRATION: CategoryTemplates = CategoryTemplates {
    strong: &[
        t("Distribution", "The partnership exposes the protocol to a new user base."),
        t("Composability", "Integration lets other products build on top of the protocol."),
    ],
    negative: &[
        t("Counterparty dependence", "The protocol becomes reliant on a third party's roadmap."),
        t("Smart contract surface", "Connecting external contracts enlarges the attack surface."),
        t("Misaligned incentives", "The partner's goals may diverge from the DAO's over time."),
    ],
    weak: &[
        t("Brand association", "Working with an established partner lends credibility."),
        t("Shared liquidity", "Combined liquidity can improve user outcomes."),
    ],
};

static TREASURY: CategoryTemplates = CategoryTemplates {
    strong: &[
        t(
            "Treasury Delta",
            "The Treasury Delta from this allocation improves long-run reserve efficiency.",
        ),
        t(
            "Treasury Delta diversification",
            "Spreading assets lowers concentration risk in the Treasury Delta.",
        ),
    ],
    negative: &[
        t(
            "Treasury Delta exposure",
            "Moving reserves exposes the Treasury Delta to market and custody risk.",
        ),
        t(
            "Treasury Delta liquidity",
            "Locked positions reduce the liquid share of the Treasury Delta.",
        ),
    ],
    weak: &[
        t(
            "Treasury Delta reporting",
            "The allocation makes the Treasury Delta easier to track on-chain.",
        ),
        t(
            "Treasury Delta yield",
            "Idle funds can earn a modest return that lifts the Treasury Delta.",
        ),
    ],
};

static CHAIN: CategoryTemplates = CategoryTemplates {
    strong: &[
        t("Lower fees", "Deploying on the new network reduces transaction costs for users."),
        t("New user base", "The target chain brings users the protocol cannot reach today."),
    ],
    negative: &[
        t("Bridge risk", "Cross-chain messaging and bridges are a common exploit vector."),
        t("Fragmented liquidity", "Splitting deployments thins liquidity on each network."),
        t("Operational load", "Every additional chain adds monitoring and maintenance work."),
    ],
    weak: &[
        t("Ecosystem grants", "The target network may co-fund the deployment."),
        t("Redundancy", "Multiple deployments reduce dependence on a single chain."),
    ],
};

static GOVERNANCE: CategoryTemplates = CategoryTemplates {
    strong: &[
        t("Process clarity", "The change makes governance rules easier to follow."),
        t("Legitimacy", "Clearer procedures strengthen trust in governance outcomes."),
    ],
    negative: &[
        t("Participation burden", "New procedures ask more of delegates and voters."),
        t("Capture risk", "Rule changes can concentrate influence in fewer hands."),
    ],
    weak: &[
        t("Transparency", "Outcomes become easier for members to audit."),
        t("Consistency", "Codifying practice reduces ad-hoc decisions."),
    ],
};

/// Template pools for a category.
pub fn templates_for(category: ProposalCategory) -> &'static CategoryTemplates {
    match category {
        ProposalCategory::Funding => &FUNDING,
        ProposalCategory::Upgrade => &UPGRADE,
        ProposalCategory::Integration => &INTEGRATION,
        ProposalCategory::Treasury => &TREASURY,
        ProposalCategory::Chain => &CHAIN,
        ProposalCategory::Governance => &GOVERNANCE,
    }
}
