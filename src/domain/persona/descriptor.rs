//! Persona Descriptor - categorical labels and prose for a persona.

use serde::Serialize;

use super::{AxisLevel, Persona, PersonaAxis};

/// Label assigned to one persona axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisLabel {
    pub axis: PersonaAxis,
    pub value: u8,
    pub level: AxisLevel,
    pub label: &'static str,
}

/// Categorical view of a persona plus the sentence used in prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaProfile {
    pub labels: Vec<AxisLabel>,
    pub description: String,
}

impl PersonaProfile {
    /// Label for a given axis.
    pub fn label(&self, axis: PersonaAxis) -> &'static str {
        self.labels
            .iter()
            .find(|l| l.axis == axis)
            .map(|l| l.label)
            .unwrap_or("moderate")
    }
}

/// Persona description functions.
pub struct PersonaDescriptor;

impl PersonaDescriptor {
    /// Builds labels and the prose description for a persona.
    pub fn describe(persona: &Persona) -> PersonaProfile {
        let labels = PersonaAxis::all()
            .iter()
            .map(|axis| {
                let level = persona.level(*axis);
                AxisLabel {
                    axis: *axis,
                    value: persona.value(*axis),
                    level,
                    label: Self::label_for(*axis, level),
                }
            })
            .collect();

        PersonaProfile {
            labels,
            description: Self::sentence(persona),
        }
    }

    /// Axis-specific label for a level.
    pub fn label_for(axis: PersonaAxis, level: AxisLevel) -> &'static str {
        match (axis, level) {
            (PersonaAxis::Risk, AxisLevel::Low) => "conservative",
            (PersonaAxis::Risk, AxisLevel::Mid) => "moderate",
            (PersonaAxis::Risk, AxisLevel::High) => "aggressive",
            (PersonaAxis::EsgFocus, AxisLevel::Low) => "returns-focused",
            (PersonaAxis::EsgFocus, AxisLevel::Mid) => "balanced",
            (PersonaAxis::EsgFocus, AxisLevel::High) => "impact-focused",
            (PersonaAxis::TreasuryConservatism, AxisLevel::Low) => "growth-oriented",
            (PersonaAxis::TreasuryConservatism, AxisLevel::Mid) => "balanced",
            (PersonaAxis::TreasuryConservatism, AxisLevel::High) => "conservative",
            (PersonaAxis::TimeHorizon, AxisLevel::Low) => "short-term",
            (PersonaAxis::TimeHorizon, AxisLevel::Mid) => "medium-term",
            (PersonaAxis::TimeHorizon, AxisLevel::High) => "long-term",
            (PersonaAxis::ParticipationFrequency, AxisLevel::Low) => "occasional",
            (PersonaAxis::ParticipationFrequency, AxisLevel::Mid) => "regular",
            (PersonaAxis::ParticipationFrequency, AxisLevel::High) => "highly active",
        }
    }

    fn clause(axis: PersonaAxis, level: AxisLevel) -> &'static str {
        match (axis, level) {
            (PersonaAxis::Risk, AxisLevel::Low) => "takes a conservative approach to risk",
            (PersonaAxis::Risk, AxisLevel::Mid) => "accepts a moderate level of risk",
            (PersonaAxis::Risk, AxisLevel::High) => {
                "is comfortable with aggressive, experimental bets"
            }
            (PersonaAxis::EsgFocus, AxisLevel::Low) => {
                "prioritizes financial returns over ESG considerations"
            }
            (PersonaAxis::EsgFocus, AxisLevel::Mid) => "balances returns with ESG considerations",
            (PersonaAxis::EsgFocus, AxisLevel::High) => {
                "places strong weight on environmental, social and governance impact"
            }
            (PersonaAxis::TreasuryConservatism, AxisLevel::Low) => {
                "favors deploying treasury funds for growth"
            }
            (PersonaAxis::TreasuryConservatism, AxisLevel::Mid) => {
                "prefers a balanced treasury policy"
            }
            (PersonaAxis::TreasuryConservatism, AxisLevel::High) => {
                "wants the treasury managed conservatively"
            }
            (PersonaAxis::TimeHorizon, AxisLevel::Low) => "focuses on short-term outcomes",
            (PersonaAxis::TimeHorizon, AxisLevel::Mid) => "weighs medium-term outcomes",
            (PersonaAxis::TimeHorizon, AxisLevel::High) => "thinks in long-term horizons",
            (PersonaAxis::ParticipationFrequency, AxisLevel::Low) => "votes occasionally",
            (PersonaAxis::ParticipationFrequency, AxisLevel::Mid) => {
                "participates regularly in governance"
            }
            (PersonaAxis::ParticipationFrequency, AxisLevel::High) => {
                "is a highly active governance participant"
            }
        }
    }

    fn sentence(persona: &Persona) -> String {
        let clauses: Vec<&str> = PersonaAxis::all()
            .iter()
            .map(|axis| Self::clause(*axis, persona.level(*axis)))
            .collect();

        let last = clauses.last().copied().unwrap_or_default();
        let rest = &clauses[..clauses.len().saturating_sub(1)];
        format!("This voter {}, and {}.", rest.join(", "), last)
    }
}
