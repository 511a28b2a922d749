//! EAP-Response/AKA-Challenge and AKA-Synchronization-Failure
//! (RFC 4187 sections 9.4 and 9.6)

use super::challenge::EapAkaChallenge;
use super::keys::{MasterKey, MAC_LENGTH};
use super::security_context::SecurityContext;
use super::{
    attribute, CODE_RESPONSE, EAP_AKA_HEADER_LENGTH, SUBTYPE_AKA_CHALLENGE,
    SUBTYPE_SYNCHRONIZATION_FAILURE, TYPE_EAP_AKA,
};
use crate::errors::{ErrorCode, ServiceEntitlementError};
use crate::telephony::Telephony;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::BufMut;
use tracing::{debug, warn};

/// Base64 packet to relay back to the entitlement server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EapAkaResponse {
    /// Authentication succeeded on the SIM
    Challenge(String),
    /// The SIM rejected the sequence number; carries AUTS
    SynchronizationFailure(String),
}

impl EapAkaResponse {
    /// Run the challenge through the SIM in `slot_index` and build the reply.
    ///
    /// `identity` is the permanent EAP-AKA identity the master key is bound to.
    pub async fn respond(
        telephony: &dyn Telephony,
        slot_index: usize,
        challenge: &EapAkaChallenge,
        identity: &str,
    ) -> Result<Self, ServiceEntitlementError> {
        let result = telephony
            .icc_authentication(slot_index, &challenge.sim_authentication_request())
            .await
            .map_err(|e| {
                warn!(error = %e, "ICC authentication failed");
                ServiceEntitlementError::new(
                    ErrorCode::IccAuthenticationNotAvailable,
                    "ICC authentication failed",
                )
                .with_source(e)
            })?
            .ok_or_else(|| {
                ServiceEntitlementError::new(
                    ErrorCode::IccAuthenticationNotAvailable,
                    "EAP-AKA response is null!",
                )
            })?;

        match SecurityContext::parse(&result)? {
            SecurityContext::Success { res, ck, ik, .. } => {
                let key = MasterKey::derive(identity, &ik, &ck).ok_or_else(|| {
                    ServiceEntitlementError::new(
                        ErrorCode::IccAuthenticationNotAvailable,
                        "Can't generate K_Aut!",
                    )
                })?;
                let packet = challenge_response_packet(&res, challenge.identifier(), &key)
                    .ok_or_else(|| {
                        ServiceEntitlementError::new(
                            ErrorCode::IccAuthenticationNotAvailable,
                            "Failed to generate EAP-AKA Challenge Response data!",
                        )
                    })?;
                debug!(identifier = challenge.identifier(), "EAP-AKA challenge answered");
                Ok(Self::Challenge(STANDARD.encode(packet)))
            }
            SecurityContext::SynchronizationFailure { auts } => {
                debug!(identifier = challenge.identifier(), "EAP-AKA synchronization failure");
                Ok(Self::SynchronizationFailure(STANDARD.encode(
                    synchronization_failure_packet(&auts, challenge.identifier()),
                )))
            }
        }
    }
}

/// Header, AT_RES and AT_MAC, with the MAC computed over the packet while
/// its value field is zero
pub fn challenge_response_packet(res: &[u8], identifier: u8, key: &MasterKey) -> Option<Vec<u8>> {
    let length = EAP_AKA_HEADER_LENGTH + 4 + res.len() + 4 + MAC_LENGTH;
    let mut packet = Vec::with_capacity(length);

    put_header(&mut packet, identifier, length, SUBTYPE_AKA_CHALLENGE);

    packet.put_u8(attribute::AT_RES);
    packet.put_u8(((res.len() + 4) / 4) as u8);
    packet.put_u16((res.len() * 8) as u16);
    packet.put_slice(res);

    packet.put_u8(attribute::AT_MAC);
    packet.put_u8(5);
    packet.put_u16(0);
    let mac_offset = packet.len();
    packet.put_bytes(0, MAC_LENGTH);

    let mac = key.mac(&packet)?;
    packet[mac_offset..].copy_from_slice(&mac);
    Some(packet)
}

/// Header and AT_AUTS
pub fn synchronization_failure_packet(auts: &[u8], identifier: u8) -> Vec<u8> {
    let length = EAP_AKA_HEADER_LENGTH + 2 + auts.len();
    let mut packet = Vec::with_capacity(length);

    put_header(&mut packet, identifier, length, SUBTYPE_SYNCHRONIZATION_FAILURE);

    packet.put_u8(attribute::AT_AUTS);
    // AUTS is 14 bytes; with type and length that is 4 units
    packet.put_u8(4);
    packet.put_slice(auts);
    packet
}

fn put_header<B: BufMut>(buf: &mut B, identifier: u8, length: usize, subtype: u8) {
    buf.put_u8(CODE_RESPONSE);
    buf.put_u8(identifier);
    buf.put_u16(length as u16);
    buf.put_u8(TYPE_EAP_AKA);
    buf.put_u8(subtype);
    buf.put_u16(0);
}
