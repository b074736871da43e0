//! Customer journey milestones tracked per lead.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A CRM pipeline milestone. Declaration order is the journey order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStep {
    InitialContact,
    SiteSurvey,
    ProposalSent,
    ContractSigned,
    Permitting,
    Installation,
    Inspection,
    PermissionToOperate,
}

impl JourneyStep {
    /// Every step in journey order.
    pub const ORDERED: &'static [JourneyStep] = &[
        Self::InitialContact,
        Self::SiteSurvey,
        Self::ProposalSent,
        Self::ContractSigned,
        Self::Permitting,
        Self::Installation,
        Self::Inspection,
        Self::PermissionToOperate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialContact => "initial_contact",
            Self::SiteSurvey => "site_survey",
            Self::ProposalSent => "proposal_sent",
            Self::ContractSigned => "contract_signed",
            Self::Permitting => "permitting",
            Self::Installation => "installation",
            Self::Inspection => "inspection",
            Self::PermissionToOperate => "permission_to_operate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::InitialContact => "Initial Contact",
            Self::SiteSurvey => "Site Survey",
            Self::ProposalSent => "Proposal Sent",
            Self::ContractSigned => "Contract Signed",
            Self::Permitting => "Permitting",
            Self::Installation => "Installation",
            Self::Inspection => "Inspection",
            Self::PermissionToOperate => "Permission to Operate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ORDERED.iter().copied().find(|step| step.as_str() == s)
    }
}

impl std::fmt::Display for JourneyStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn parse_step(s: &str) -> Result<JourneyStep, CoreError> {
    JourneyStep::parse(s)
        .ok_or_else(|| CoreError::Validation(format!("Unknown journey step '{s}'")))
}

/// Percentage (0-100) of journey steps completed, rounded down.
pub fn journey_progress(completed: &[JourneyStep]) -> u8 {
    let done = JourneyStep::ORDERED
        .iter()
        .filter(|s| completed.contains(s))
        .count();
    ((done * 100) / JourneyStep::ORDERED.len()) as u8
}

/// The first step, in journey order, that is not yet complete.
pub fn next_step(completed: &[JourneyStep]) -> Option<JourneyStep> {
    JourneyStep::ORDERED
        .iter()
        .copied()
        .find(|s| !completed.contains(s))
}
