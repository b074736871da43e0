//! Lead pipeline statuses, product offerings, sources, and transition rules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a lead's display name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of free-form lead notes.
pub const MAX_NOTES_LENGTH: usize = 5_000;

/// Maximum length of an external reference (e.g. a utility account number).
pub const MAX_REFERENCE_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Position of a lead in the sales pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    ProposalSent,
    Won,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::ProposalSent => "proposal_sent",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "qualified" => Some(Self::Qualified),
            "proposal_sent" => Some(Self::ProposalSent),
            "won" => Some(Self::Won),
            "lost" => Some(Self::Lost),
            _ => None,
        }
    }

    pub const ALL: &'static [&'static str] =
        &["new", "contacted", "qualified", "proposal_sent", "won", "lost"];

    /// Statuses this status may move to.
    ///
    /// The pipeline advances one stage at a time; any open stage can drop to
    /// `lost`, a lost lead can be re-contacted, and `won` is terminal.
    pub fn allowed_next(&self) -> &'static [LeadStatus] {
        match self {
            Self::New => &[Self::Contacted, Self::Lost],
            Self::Contacted => &[Self::Qualified, Self::Lost],
            Self::Qualified => &[Self::ProposalSent, Self::Lost],
            Self::ProposalSent => &[Self::Won, Self::Lost],
            Self::Lost => &[Self::Contacted],
            Self::Won => &[],
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse and validate a status string.
pub fn parse_status(status: &str) -> Result<LeadStatus, CoreError> {
    LeadStatus::parse(status).ok_or_else(|| {
        CoreError::Validation(format!(
            "Invalid lead status '{status}'. Must be one of: {:?}",
            LeadStatus::ALL
        ))
    })
}

/// Validate a status change. Setting the same status is a no-op and allowed.
pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    let from = parse_status(current)?;
    let to = parse_status(next)?;
    if from == to || from.allowed_next().contains(&to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move lead from '{from}' to '{to}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Product / service offerings
// ---------------------------------------------------------------------------

/// Solar offerings a lead can be interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductService {
    SolarPanels,
    BatteryStorage,
    EvCharger,
    SolarWaterHeater,
    Maintenance,
    RoofRepair,
}

impl ProductService {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SolarPanels => "solar_panels",
            Self::BatteryStorage => "battery_storage",
            Self::EvCharger => "ev_charger",
            Self::SolarWaterHeater => "solar_water_heater",
            Self::Maintenance => "maintenance",
            Self::RoofRepair => "roof_repair",
        }
    }

    pub const ALL: &'static [&'static str] = &[
        "solar_panels",
        "battery_storage",
        "ev_charger",
        "solar_water_heater",
        "maintenance",
        "roof_repair",
    ];
}

/// Validate a list of product/service names. Duplicates are rejected.
pub fn validate_product_services(services: &[String]) -> Result<(), CoreError> {
    for (i, s) in services.iter().enumerate() {
        if !ProductService::ALL.contains(&s.as_str()) {
            return Err(CoreError::Validation(format!(
                "Unknown product/service '{s}'. Must be one of: {:?}",
                ProductService::ALL
            )));
        }
        if services[..i].contains(s) {
            return Err(CoreError::Validation(format!(
                "Product/service '{s}' listed more than once"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

pub const SOURCE_MANUAL: &str = "manual";
pub const SOURCE_CSV_IMPORT: &str = "csv_import";
pub const SOURCE_REFERRAL: &str = "referral";
pub const SOURCE_WEBSITE: &str = "website";

pub const VALID_SOURCES: &[&str] = &[SOURCE_MANUAL, SOURCE_CSV_IMPORT, SOURCE_REFERRAL, SOURCE_WEBSITE];

pub fn validate_source(source: &str) -> Result<(), CoreError> {
    if VALID_SOURCES.contains(&source) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid lead source '{source}'. Must be one of: {VALID_SOURCES:?}"
        )))
    }
}
