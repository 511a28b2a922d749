//! On-Device Service Activation (TS.43 chapter 6)

mod download;
mod operation;
mod requests;
mod responses;

pub use download::{DownloadInfo, MessageInfo};
pub use operation::{
    CompanionService, EsimOdsaOperation, MessageButton, OdsaOperationName, OperationType,
};
pub use requests::{
    AcquireConfigurationRequest, AcquireTemporaryTokenRequest, CheckEligibilityRequest,
    GetPhoneNumberRequest, GetSubscriberInfoRequest, ManageServiceRequest,
    ManageSubscriptionRequest,
};
pub use responses::{
    parse_field, AcquireConfigurationResponse, AcquireTemporaryTokenResponse,
    CheckEligibilityResponse, Configuration, ConfigurationType, EligibilityResult,
    GetPhoneNumberResponse, GetSubscriberInfoResponse, ManageServiceResponse,
    ManageSubscriptionResponse, OdsaResponse, OperationResult, Policy, ServiceStatus,
    SubscriptionResult,
};
