//! Telephony collaborator
//!
//! Abstracts the modem/SIM services the entitlement client needs: device and
//! subscriber identities, and the SIM's EAP-AKA authentication.

use crate::errors::TelephonyError;
use crate::types::DeviceInfo;
use async_trait::async_trait;

#[async_trait]
pub trait Telephony: Send + Sync {
    /// Number of active modems; valid slots are `0..count`
    fn active_modem_count(&self) -> usize;

    /// IMEI of the device in `slot_index`
    fn imei(&self, slot_index: usize) -> Option<String>;

    /// IMSI of the SIM in `slot_index`
    fn subscriber_id(&self, slot_index: usize) -> Option<String>;

    /// MCC+MNC of the SIM in `slot_index`
    fn sim_operator(&self, slot_index: usize) -> Option<String>;

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo::default()
    }

    /// Run an EAP-AKA authentication on the USIM application.
    ///
    /// `data` is the base64 `RAND`/`AUTN` request; the result is the base64
    /// security context returned by the card, or `None` if the card gave no
    /// answer.
    async fn icc_authentication(
        &self,
        slot_index: usize,
        data: &str,
    ) -> Result<Option<String>, TelephonyError>;
}

/// Validate `slot_index` against the active modem count
pub fn check_slot(telephony: &dyn Telephony, slot_index: i32) -> crate::Result<usize> {
    let count = telephony.active_modem_count();
    usize::try_from(slot_index)
        .ok()
        .filter(|slot| *slot < count)
        .ok_or_else(|| {
            crate::Ts43Error::InvalidArgument(format!(
                "invalid slot index {slot_index}, active modem count {count}"
            ))
        })
}
