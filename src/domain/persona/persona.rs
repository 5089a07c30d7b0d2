//! Persona value object: five 0-100 preference sliders.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Upper bound of every persona slider.
pub const AXIS_MAX: u8 = 100;

/// One of the five persona preference axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaAxis {
    /// Appetite for risky or experimental proposals.
    Risk,
    /// Weight given to environmental, social and governance impact.
    EsgFocus,
    /// Preference for preserving rather than deploying treasury funds.
    TreasuryConservatism,
    /// How far into the future the voter looks.
    TimeHorizon,
    /// How often the voter takes part in governance.
    ParticipationFrequency,
}

impl PersonaAxis {
    /// All axes in canonical order.
    pub fn all() -> &'static [PersonaAxis] {
        &[
            PersonaAxis::Risk,
            PersonaAxis::EsgFocus,
            PersonaAxis::TreasuryConservatism,
            PersonaAxis::TimeHorizon,
            PersonaAxis::ParticipationFrequency,
        ]
    }

    /// Snake-case name of the axis.
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaAxis::Risk => "risk",
            PersonaAxis::EsgFocus => "esg_focus",
            PersonaAxis::TreasuryConservatism => "treasury_conservatism",
            PersonaAxis::TimeHorizon => "time_horizon",
            PersonaAxis::ParticipationFrequency => "participation_frequency",
        }
    }

    /// Human-readable axis title.
    pub fn title(&self) -> &'static str {
        match self {
            PersonaAxis::Risk => "Risk tolerance",
            PersonaAxis::EsgFocus => "ESG focus",
            PersonaAxis::TreasuryConservatism => "Treasury conservatism",
            PersonaAxis::TimeHorizon => "Time horizon",
            PersonaAxis::ParticipationFrequency => "Participation frequency",
        }
    }
}

impl fmt::Display for PersonaAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse position on a persona axis.
///
/// - Low: value <= 33
/// - Mid: value 34-66
/// - High: value > 66
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisLevel {
    Low,
    Mid,
    High,
}

impl AxisLevel {
    /// Determine level from a 0-100 slider value.
    pub fn from_value(value: u8) -> Self {
        if value <= 33 {
            Self::Low
        } else if value <= 66 {
            Self::Mid
        } else {
            Self::High
        }
    }
}

/// Raw slider values as they arrive from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaSliders {
    pub risk: u8,
    pub esg_focus: u8,
    pub treasury_conservatism: u8,
    pub time_horizon: u8,
    pub participation_frequency: u8,
}

/// A voter persona. Every axis is guaranteed to be within 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PersonaSliders", into = "PersonaSliders")]
pub struct Persona {
    risk: u8,
    esg_focus: u8,
    treasury_conservatism: u8,
    time_horizon: u8,
    participation_frequency: u8,
}

impl Persona {
    /// Creates a persona, rejecting any slider above 100.
    pub fn new(
        risk: u8,
        esg_focus: u8,
        treasury_conservatism: u8,
        time_horizon: u8,
        participation_frequency: u8,
    ) -> Result<Self, ValidationError> {
        let persona = Self {
            risk,
            esg_focus,
            treasury_conservatism,
            time_horizon,
            participation_frequency,
        };
        for axis in PersonaAxis::all() {
            let value = persona.value(*axis);
            if value > AXIS_MAX {
                return Err(ValidationError::out_of_range(
                    axis.as_str(),
                    0,
                    i64::from(AXIS_MAX),
                    i64::from(value),
                ));
            }
        }
        Ok(persona)
    }

    /// Creates a persona, saturating sliders above 100.
    pub fn clamped(sliders: PersonaSliders) -> Self {
        Self {
            risk: sliders.risk.min(AXIS_MAX),
            esg_focus: sliders.esg_focus.min(AXIS_MAX),
            treasury_conservatism: sliders.treasury_conservatism.min(AXIS_MAX),
            time_horizon: sliders.time_horizon.min(AXIS_MAX),
            participation_frequency: sliders.participation_frequency.min(AXIS_MAX),
        }
    }

    /// A persona with every slider at 50.
    pub fn neutral() -> Self {
        Self {
            risk: 50,
            esg_focus: 50,
            treasury_conservatism: 50,
            time_horizon: 50,
            participation_frequency: 50,
        }
    }

    /// Slider value for an axis.
    pub fn value(&self, axis: PersonaAxis) -> u8 {
        match axis {
            PersonaAxis::Risk => self.risk,
            PersonaAxis::EsgFocus => self.esg_focus,
            PersonaAxis::TreasuryConservatism => self.treasury_conservatism,
            PersonaAxis::TimeHorizon => self.time_horizon,
            PersonaAxis::ParticipationFrequency => self.participation_frequency,
        }
    }

    /// Coarse level for an axis.
    pub fn level(&self, axis: PersonaAxis) -> AxisLevel {
        AxisLevel::from_value(self.value(axis))
    }

    pub fn risk(&self) -> u8 {
        self.risk
    }

    pub fn esg_focus(&self) -> u8 {
        self.esg_focus
    }

    pub fn treasury_conservatism(&self) -> u8 {
        self.treasury_conservatism
    }

    pub fn time_horizon(&self) -> u8 {
        self.time_horizon
    }

    pub fn participation_frequency(&self) -> u8 {
        self.participation_frequency
    }

    /// Short stable digest of the five sliders, used to key cached decisions.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update([
            self.risk,
            self.esg_focus,
            self.treasury_conservatism,
            self.time_horizon,
            self.participation_frequency,
        ]);
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::neutral()
    }
}

impl TryFrom<PersonaSliders> for Persona {
    type Error = ValidationError;

    fn try_from(s: PersonaSliders) -> Result<Self, Self::Error> {
        Persona::new(
            s.risk,
            s.esg_focus,
            s.treasury_conservatism,
            s.time_horizon,
            s.participation_frequency,
        )
    }
}

impl From<Persona> for PersonaSliders {
    fn from(p: Persona) -> Self {
        PersonaSliders {
            risk: p.risk,
            esg_focus: p.esg_focus,
            treasury_conservatism: p.treasury_conservatism,
            time_horizon: p.time_horizon,
            participation_frequency: p.participation_frequency,
        }
    }
}
