//! ODSA operation parameters (TS.43 section 6.2)

use serde::{Deserialize, Serialize};

/// ODSA operation names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OdsaOperationName {
    #[default]
    Unknown,
    CheckEligibility,
    ManageSubscription,
    ManageService,
    AcquireConfiguration,
    AcquireTemporaryToken,
    GetPhoneNumber,
    GetSubscriberInfo,
    AcquirePlan,
    VerifyPhoneNumber,
}

impl OdsaOperationName {
    pub const ALL: [OdsaOperationName; 9] = [
        Self::CheckEligibility,
        Self::ManageSubscription,
        Self::ManageService,
        Self::AcquireConfiguration,
        Self::AcquireTemporaryToken,
        Self::GetPhoneNumber,
        Self::GetSubscriberInfo,
        Self::AcquirePlan,
        Self::VerifyPhoneNumber,
    ];

    /// Wire value of the `operation` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::CheckEligibility => "CheckEligibility",
            Self::ManageSubscription => "ManageSubscription",
            Self::ManageService => "ManageService",
            Self::AcquireConfiguration => "AcquireConfiguration",
            Self::AcquireTemporaryToken => "AcquireTemporaryToken",
            Self::GetPhoneNumber => "GetPhoneNumber",
            Self::GetSubscriberInfo => "GetSubscriberInfo",
            Self::AcquirePlan => "AcquirePlan",
            Self::VerifyPhoneNumber => "VerifyPhoneNumber",
        }
    }

    pub fn parse(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == raw)
            .unwrap_or(Self::Unknown)
    }
}

/// `operation_type` values. Meaning depends on the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum OperationType {
    #[default]
    NotSet = -1,
    Subscribe = 0,
    Unsubscribe = 1,
    ChangeSubscription = 2,
    TransferSubscription = 3,
    UpdateSubscription = 4,
    ActivateService = 10,
    DeactivateService = 11,
}

impl OperationType {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl From<i32> for OperationType {
    fn from(v: i32) -> Self {
        match v {
            0 => Self::Subscribe,
            1 => Self::Unsubscribe,
            2 => Self::ChangeSubscription,
            3 => Self::TransferSubscription,
            4 => Self::UpdateSubscription,
            10 => Self::ActivateService,
            11 => Self::DeactivateService,
            _ => Self::NotSet,
        }
    }
}

/// Service requested for a companion device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompanionService {
    #[default]
    Unknown,
    SharedNumber,
    DiffNumber,
}

impl CompanionService {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::SharedNumber => "SharedNumber",
            Self::DiffNumber => "DiffNumber",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "SharedNumber" => Self::SharedNumber,
            "DiffNumber" => Self::DiffNumber,
            _ => Self::Unknown,
        }
    }
}

/// User's answer to a server message prompt (`MSG_btn`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageButton {
    Rejected,
    Accepted,
}

impl MessageButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rejected => "0",
            Self::Accepted => "1",
        }
    }
}

/// Parameters of one ODSA operation.
///
/// Which fields are meaningful depends on `operation`; unused fields stay
/// empty and are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EsimOdsaOperation {
    pub operation: OdsaOperationName,
    pub operation_type: OperationType,
    pub operation_targets: Vec<String>,
    pub companion_terminal_id: String,
    pub companion_terminal_vendor: String,
    pub companion_terminal_model: String,
    pub companion_terminal_software_version: String,
    pub companion_terminal_friendly_name: String,
    pub companion_terminal_service: CompanionService,
    pub companion_terminal_iccid: String,
    pub companion_terminal_eid: String,
    pub terminal_iccid: String,
    pub terminal_eid: String,
    pub target_terminal_id: String,
    /// Sent as repeated `target_terminal_imeis`
    pub target_terminal_ids: Vec<String>,
    pub target_terminal_iccid: String,
    pub target_terminal_eid: String,
    pub target_terminal_serial_number: String,
    pub target_terminal_model: String,
    pub old_terminal_id: String,
    pub old_terminal_iccid: String,
    pub message_response: String,
    pub message_button: Option<MessageButton>,
    pub requestor_id: String,
}

impl EsimOdsaOperation {
    pub fn new(operation: OdsaOperationName) -> Self {
        Self {
            operation,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_name_parse() {
        for op in OdsaOperationName::ALL {
            assert_eq!(OdsaOperationName::parse(op.as_str()), op);
        }
        assert_eq!(OdsaOperationName::parse("Bogus"), OdsaOperationName::Unknown);
    }

    #[test]
    fn test_operation_type_from_code() {
        assert_eq!(OperationType::from(10), OperationType::ActivateService);
        assert_eq!(OperationType::from(7), OperationType::NotSet);
        assert_eq!(OperationType::default().code(), -1);
    }

    #[test]
    fn test_new_operation_is_empty() {
        let op = EsimOdsaOperation::new(OdsaOperationName::ManageService);
        assert_eq!(op.operation_type, OperationType::NotSet);
        assert!(op.operation_targets.is_empty());
        assert!(op.message_button.is_none());
        assert_eq!(op.companion_terminal_service, CompanionService::Unknown);
    }
}
