//! EAP-Request/AKA-Challenge parsing (RFC 4187 section 9.3)

use super::{attribute, CODE_REQUEST, EAP_AKA_HEADER_LENGTH, SUBTYPE_AKA_CHALLENGE, TYPE_EAP_AKA};
use crate::errors::{ErrorCode, ServiceEntitlementError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::BufMut;
use tracing::debug;

const RAND_LENGTH: usize = 16;
const AUTN_LENGTH: usize = 16;
/// AT_RAND and AT_AUTN: type, length, 2 reserved bytes, 16-byte value
const RAND_AUTN_ATTRIBUTE_LENGTH: usize = 20;

/// Parsed server challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EapAkaChallenge {
    identifier: u8,
    rand: [u8; RAND_LENGTH],
    autn: [u8; AUTN_LENGTH],
}

impl EapAkaChallenge {
    /// Decode a base64 `eap-relay-packet`
    pub fn parse(challenge: &str) -> Result<Self, ServiceEntitlementError> {
        let data = STANDARD.decode(challenge.trim()).map_err(|e| {
            ServiceEntitlementError::new(
                ErrorCode::IccAuthenticationNotAvailable,
                "EAP-AKA challenge is not a valid base64!",
            )
            .with_source(e)
        })?;

        Self::from_packet(&data).ok_or_else(|| {
            ServiceEntitlementError::new(
                ErrorCode::IccAuthenticationNotAvailable,
                "EAP-AKA challenge message is not valid",
            )
        })
    }

    fn from_packet(data: &[u8]) -> Option<Self> {
        if data.len() < EAP_AKA_HEADER_LENGTH {
            debug!(length = data.len(), "EAP-AKA challenge too short");
            return None;
        }
        let code = data[0];
        let identifier = data[1];
        let length = u16::from_be_bytes([data[2], data[3]]) as usize;
        let eap_type = data[4];
        let subtype = data[5];

        if code != CODE_REQUEST
            || length != data.len()
            || eap_type != TYPE_EAP_AKA
            || subtype != SUBTYPE_AKA_CHALLENGE
        {
            debug!(code, length, actual = data.len(), eap_type, subtype, "Invalid EAP-AKA header");
            return None;
        }

        let mut rand = None;
        let mut autn = None;
        let mut index = EAP_AKA_HEADER_LENGTH;
        while index < data.len() {
            let remaining = data.len() - index;
            if remaining <= 2 {
                debug!(remaining, "Truncated EAP-AKA attribute");
                return None;
            }
            let attribute_type = data[index];
            // Length in 4-byte units, including type and length octets
            let length = data[index + 1] as usize * 4;
            if length == 0 || length > remaining {
                debug!(length, remaining, "Invalid EAP-AKA attribute length");
                return None;
            }

            match attribute_type {
                attribute::AT_RAND | attribute::AT_AUTN => {
                    if length != RAND_AUTN_ATTRIBUTE_LENGTH {
                        debug!(attribute_type, length, "Invalid AT_RAND/AT_AUTN length");
                        return None;
                    }
                    let mut value = [0u8; 16];
                    value.copy_from_slice(&data[index + 4..index + 20]);
                    if attribute_type == attribute::AT_RAND {
                        rand = Some(value);
                    } else {
                        autn = Some(value);
                    }
                }
                _ => {}
            }
            index += length;
        }

        Some(Self {
            identifier,
            rand: rand?,
            autn: autn?,
        })
    }

    /// EAP packet identifier, echoed in the response
    pub fn identifier(&self) -> u8 {
        self.identifier
    }

    pub fn rand(&self) -> &[u8] {
        &self.rand
    }

    pub fn autn(&self) -> &[u8] {
        &self.autn
    }

    /// Base64 `len(RAND) || RAND || len(AUTN) || AUTN` for the USIM
    pub fn sim_authentication_request(&self) -> String {
        let mut data = Vec::with_capacity(RAND_LENGTH + AUTN_LENGTH + 2);
        data.put_u8(RAND_LENGTH as u8);
        data.put_slice(&self.rand);
        data.put_u8(AUTN_LENGTH as u8);
        data.put_slice(&self.autn);
        STANDARD.encode(data)
    }
}
