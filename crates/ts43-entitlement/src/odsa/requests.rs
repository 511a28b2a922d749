//! Typed ODSA operation requests
//!
//! Each request converts into the [`EsimOdsaOperation`] parameters the
//! operation sends (TS.43 section 6.2).

use super::operation::{
    CompanionService, EsimOdsaOperation, MessageButton, OdsaOperationName, OperationType,
};
use crate::types::NotificationAction;

/// CheckEligibility (TS.43 section 6.5.2)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckEligibilityRequest {
    pub app_id: String,
    pub companion_terminal_id: String,
    pub companion_terminal_vendor: String,
    pub companion_terminal_model: String,
    pub companion_terminal_software_version: String,
    pub companion_terminal_friendly_name: String,
    pub notification_token: String,
    pub notification_action: NotificationAction,
}

impl CheckEligibilityRequest {
    pub fn to_operation(&self) -> EsimOdsaOperation {
        EsimOdsaOperation {
            companion_terminal_id: self.companion_terminal_id.clone(),
            companion_terminal_vendor: self.companion_terminal_vendor.clone(),
            companion_terminal_model: self.companion_terminal_model.clone(),
            companion_terminal_software_version: self.companion_terminal_software_version.clone(),
            companion_terminal_friendly_name: self.companion_terminal_friendly_name.clone(),
            ..EsimOdsaOperation::new(OdsaOperationName::CheckEligibility)
        }
    }
}

/// ManageSubscription (TS.43 section 6.5.3)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManageSubscriptionRequest {
    pub app_id: String,
    pub operation_type: OperationType,
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
    pub target_terminal_ids: Vec<String>,
    pub target_terminal_iccid: String,
    pub target_terminal_eid: String,
    pub target_terminal_serial_number: String,
    pub target_terminal_model: String,
    pub old_terminal_id: String,
    pub old_terminal_iccid: String,
    pub message_response: String,
    pub message_button: Option<MessageButton>,
    pub notification_token: String,
    pub notification_action: NotificationAction,
}

impl ManageSubscriptionRequest {
    pub fn to_operation(&self) -> EsimOdsaOperation {
        EsimOdsaOperation {
            operation_type: self.operation_type,
            companion_terminal_id: self.companion_terminal_id.clone(),
            companion_terminal_vendor: self.companion_terminal_vendor.clone(),
            companion_terminal_model: self.companion_terminal_model.clone(),
            companion_terminal_software_version: self.companion_terminal_software_version.clone(),
            companion_terminal_friendly_name: self.companion_terminal_friendly_name.clone(),
            companion_terminal_service: self.companion_terminal_service,
            companion_terminal_iccid: self.companion_terminal_iccid.clone(),
            companion_terminal_eid: self.companion_terminal_eid.clone(),
            terminal_iccid: self.terminal_iccid.clone(),
            terminal_eid: self.terminal_eid.clone(),
            target_terminal_id: self.target_terminal_id.clone(),
            target_terminal_ids: self.target_terminal_ids.clone(),
            target_terminal_iccid: self.target_terminal_iccid.clone(),
            target_terminal_eid: self.target_terminal_eid.clone(),
            target_terminal_serial_number: self.target_terminal_serial_number.clone(),
            target_terminal_model: self.target_terminal_model.clone(),
            old_terminal_id: self.old_terminal_id.clone(),
            old_terminal_iccid: self.old_terminal_iccid.clone(),
            message_response: self.message_response.clone(),
            message_button: self.message_button,
            ..EsimOdsaOperation::new(OdsaOperationName::ManageSubscription)
        }
    }
}

/// ManageService (TS.43 section 6.5.4)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManageServiceRequest {
    pub app_id: String,
    pub operation_type: OperationType,
    pub companion_terminal_id: String,
    pub companion_terminal_vendor: String,
    pub companion_terminal_model: String,
    pub companion_terminal_software_version: String,
    pub companion_terminal_friendly_name: String,
    pub companion_terminal_service: CompanionService,
    pub companion_terminal_iccid: String,
}

impl ManageServiceRequest {
    pub fn to_operation(&self) -> EsimOdsaOperation {
        EsimOdsaOperation {
            operation_type: self.operation_type,
            companion_terminal_id: self.companion_terminal_id.clone(),
            companion_terminal_vendor: self.companion_terminal_vendor.clone(),
            companion_terminal_model: self.companion_terminal_model.clone(),
            companion_terminal_software_version: self.companion_terminal_software_version.clone(),
            companion_terminal_friendly_name: self.companion_terminal_friendly_name.clone(),
            companion_terminal_service: self.companion_terminal_service,
            companion_terminal_iccid: self.companion_terminal_iccid.clone(),
            ..EsimOdsaOperation::new(OdsaOperationName::ManageService)
        }
    }
}

/// AcquireConfiguration (TS.43 section 6.5.5)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquireConfigurationRequest {
    pub app_id: String,
    pub companion_terminal_id: String,
    pub companion_terminal_iccid: String,
    pub companion_terminal_eid: String,
    pub terminal_iccid: String,
    pub terminal_eid: String,
    pub target_terminal_id: String,
    pub target_terminal_iccid: String,
    pub target_terminal_eid: String,
    pub notification_token: String,
    pub notification_action: NotificationAction,
}

impl AcquireConfigurationRequest {
    pub fn to_operation(&self) -> EsimOdsaOperation {
        EsimOdsaOperation {
            companion_terminal_id: self.companion_terminal_id.clone(),
            companion_terminal_iccid: self.companion_terminal_iccid.clone(),
            companion_terminal_eid: self.companion_terminal_eid.clone(),
            terminal_iccid: self.terminal_iccid.clone(),
            terminal_eid: self.terminal_eid.clone(),
            target_terminal_id: self.target_terminal_id.clone(),
            target_terminal_iccid: self.target_terminal_iccid.clone(),
            target_terminal_eid: self.target_terminal_eid.clone(),
            ..EsimOdsaOperation::new(OdsaOperationName::AcquireConfiguration)
        }
    }
}

/// AcquireTemporaryToken (TS.43 section 6.5.7)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquireTemporaryTokenRequest {
    pub app_id: String,
    /// Operations the temporary token may be used for
    pub operation_targets: Vec<String>,
    pub companion_terminal_id: String,
}

impl AcquireTemporaryTokenRequest {
    pub fn to_operation(&self) -> EsimOdsaOperation {
        EsimOdsaOperation {
            operation_targets: self.operation_targets.clone(),
            companion_terminal_id: self.companion_terminal_id.clone(),
            ..EsimOdsaOperation::new(OdsaOperationName::AcquireTemporaryToken)
        }
    }
}

/// GetPhoneNumber (TS.43 section 6.5.8), always sent for `ap2014`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetPhoneNumberRequest {
    /// Overrides the slot's IMEI when non-empty
    pub terminal_id: String,
}

impl GetPhoneNumberRequest {
    pub fn to_operation(&self) -> EsimOdsaOperation {
        EsimOdsaOperation::new(OdsaOperationName::GetPhoneNumber)
    }
}

/// GetSubscriberInfo, always sent for `ap2014`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetSubscriberInfoRequest {
    pub requestor_id: String,
}

impl GetSubscriberInfoRequest {
    pub fn to_operation(&self) -> EsimOdsaOperation {
        EsimOdsaOperation {
            requestor_id: self.requestor_id.clone(),
            ..EsimOdsaOperation::new(OdsaOperationName::GetSubscriberInfo)
        }
    }
}
