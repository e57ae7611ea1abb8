//! Typed results of locators and orchestrations

use serde::Serialize;
use serde_json::Value;

use steward_client::{ComputerMatch, PrestageDefinition};
use steward_common::StewardError;
use steward_common::constants::UNASSIGNED;

/// Canonical reference to an inventory device
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRef {
    pub computer_id: i64,
    pub serial_number: String,
}

impl From<ComputerMatch> for DeviceRef {
    fn from(value: ComputerMatch) -> Self {
        Self {
            computer_id: value.id,
            serial_number: value.serial_number,
        }
    }
}

/// How a prestage is referenced by a caller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrestageRef {
    Id(i64),
    Name(String),
}

impl std::fmt::Display for PrestageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrestageRef::Id(id) => write!(f, "id {}", id),
            PrestageRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// Current scope assignment of one serial
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrestageAssignment {
    pub serial_number: String,
    pub display_name: String,
    #[serde(skip)]
    pub prestage: Option<PrestageDefinition>,
}

impl PrestageAssignment {
    pub fn unassigned(serial_number: &str) -> Self {
        Self {
            serial_number: serial_number.to_string(),
            display_name: UNASSIGNED.to_string(),
            prestage: None,
        }
    }

    pub fn assigned(serial_number: &str, prestage: PrestageDefinition) -> Self {
        Self {
            serial_number: serial_number.to_string(),
            display_name: prestage.display_name.clone(),
            prestage: Some(prestage),
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.prestage.is_none()
    }

    pub fn prestage_id(&self) -> Option<i64> {
        self.prestage.as_ref().map(|p| p.id)
    }
}

/// What happened to the scope a device held before a reassignment
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PriorScope {
    Unassigned,
    /// Already scoped to the target; no removal needed
    Target,
    #[serde(rename_all = "camelCase")]
    Removed { prestage_id: i64, display_name: String },
    /// Best-effort removal failed; the add was still attempted
    #[serde(rename_all = "camelCase")]
    RemoveFailed {
        prestage_id: i64,
        display_name: String,
        error: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeMutationResult {
    pub serial_number: String,
    pub prestage_id: i64,
    pub display_name: String,
    pub prior_scope: PriorScope,
    /// Upstream body of the scope add, verbatim
    pub response: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRemovalResult {
    pub serial_number: String,
    pub prestage_id: i64,
    pub display_name: String,
    pub response: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WipeResult {
    pub computer_id: i64,
    pub response: Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RetirementStep {
    Wipe,
    InventoryDeletion,
    AssetSync,
    NacCleanup,
}

impl RetirementStep {
    pub fn describe(&self) -> &'static str {
        match self {
            RetirementStep::Wipe => "Device wipe",
            RetirementStep::InventoryDeletion => "Inventory deletion",
            RetirementStep::AssetSync => "Asset state sync",
            RetirementStep::NacCleanup => "NAC endpoint cleanup",
        }
    }

    /// Whether a failure of this step aborts the saga
    pub fn is_required(&self) -> bool {
        matches!(self, RetirementStep::Wipe | RetirementStep::InventoryDeletion)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum StepResult {
    Succeeded,
    #[serde(rename_all = "camelCase")]
    Failed {
        http_status: u16,
        message: String,
        #[serde(skip)]
        error: StewardError,
    },
    Skipped { reason: String },
}

impl StepResult {
    pub fn failed(step: RetirementStep, error: StewardError) -> Self {
        let error = error.context(&format!("{} failed", step.describe()));
        StepResult::Failed {
            http_status: error.http_status(),
            message: error.to_string(),
            error,
        }
    }

    pub fn skipped(reason: &str) -> Self {
        StepResult::Skipped {
            reason: reason.to_string(),
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, StepResult::Succeeded)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepResult::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StepResult::Skipped { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub step: RetirementStep,
    /// MAC address for NAC cleanup steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(flatten)]
    pub result: StepResult,
}

impl StepReport {
    pub fn new(step: RetirementStep, result: StepResult) -> Self {
        Self {
            step,
            target: None,
            result,
        }
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RetirementStatus {
    /// Every attempted step succeeded
    Completed,
    /// Required steps succeeded, an advisory step failed
    PartialFailure,
    /// A required step failed; later steps were not attempted
    Aborted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementOutcome {
    pub computer_id: i64,
    pub serial_number: String,
    pub status: RetirementStatus,
    pub steps: Vec<StepReport>,
}

impl RetirementOutcome {
    pub fn new(computer_id: i64, serial_number: &str, steps: Vec<StepReport>) -> Self {
        let required_failed = steps
            .iter()
            .any(|s| s.step.is_required() && !s.result.is_succeeded());
        let advisory_failed = steps.iter().any(|s| s.result.is_failed());
        let status = if required_failed {
            RetirementStatus::Aborted
        } else if advisory_failed {
            RetirementStatus::PartialFailure
        } else {
            RetirementStatus::Completed
        };
        Self {
            computer_id,
            serial_number: serial_number.to_string(),
            status,
            steps,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status != RetirementStatus::Aborted
    }

    pub fn reports(&self, step: RetirementStep) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(move |s| s.step == step)
    }

    pub fn report(&self, step: RetirementStep) -> Option<&StepReport> {
        self.reports(step).next()
    }

    /// The error of the required step that aborted the saga
    pub fn abort_error(&self) -> Option<&StewardError> {
        self.steps
            .iter()
            .filter(|s| s.step.is_required())
            .find_map(|s| match &s.result {
                StepResult::Failed { error, .. } => Some(error),
                _ => None,
            })
    }
}

/// One flat row of the device search
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub computer_id: Option<i64>,
    pub name: Option<String>,
    pub asset_tag: String,
    pub enrollment_method: Option<String>,
    pub serial_number: String,
    pub current_prestage: String,
    pub mac_address: Option<String>,
    pub alt_mac_address: Option<String>,
    pub preload_id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub building: Option<String>,
    pub room: Option<String>,
}

/// Technician edits applied by the inventory update workflow
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceUpdate {
    pub serial_number: String,
    pub username: Option<String>,
    pub email_address: Option<String>,
    pub building: Option<String>,
    pub building_id: Option<i64>,
    pub room: Option<String>,
    pub asset_tag: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InventoryUpdateOutcome {
    pub preload: Value,
    pub computer: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
