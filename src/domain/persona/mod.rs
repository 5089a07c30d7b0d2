//! Persona module - voter preference sliders and their descriptions.
//!
//! A persona is five 0-100 sliders (risk, ESG focus, treasury conservatism,
//! time horizon, participation frequency). The descriptor turns them into
//! categorical labels and one prose sentence that is embedded verbatim in
//! prompts and shown to the voter.

mod descriptor;
#[allow(clippy::module_inception)]
mod persona;

pub use descriptor::{AxisLabel, PersonaDescriptor, PersonaProfile};
pub use persona::{AxisLevel, Persona, PersonaAxis, PersonaSliders, AXIS_MAX};
