//! USIM authentication result (3GPP TS 31.102 section 7.1.2)

use crate::errors::{ErrorCode, ServiceEntitlementError};
use base64::{engine::general_purpose::STANDARD, Engine as _};

const TAG_SUCCESS: u8 = 0xDB;
const TAG_SYNC_FAILURE: u8 = 0xDC;

/// Decoded response of the USIM to an AUTHENTICATE command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityContext {
    /// `DB L RES L CK L IK [L Kc]`
    Success {
        res: Vec<u8>,
        ck: Vec<u8>,
        ik: Vec<u8>,
        kc: Option<Vec<u8>>,
    },
    /// `DC L AUTS`
    SynchronizationFailure { auts: Vec<u8> },
}

impl SecurityContext {
    pub fn parse(encoded: &str) -> Result<Self, ServiceEntitlementError> {
        let data = STANDARD.decode(encoded.trim()).map_err(|e| {
            invalid("SIM authentication response is not a valid base64").with_source(e)
        })?;
        let (&tag, mut rest) = data
            .split_first()
            .ok_or_else(|| invalid("Empty SIM authentication response"))?;

        match tag {
            TAG_SUCCESS => {
                let res = take_lv(&mut rest)?;
                let ck = take_lv(&mut rest)?;
                let ik = take_lv(&mut rest)?;
                let kc = if rest.is_empty() { None } else { Some(take_lv(&mut rest)?) };
                if res.is_empty() || ck.is_empty() || ik.is_empty() {
                    return Err(invalid("Invalid SIM EAP-AKA authentication response!"));
                }
                Ok(Self::Success { res, ck, ik, kc })
            }
            TAG_SYNC_FAILURE => {
                let auts = take_lv(&mut rest)?;
                if auts.is_empty() {
                    return Err(invalid("Invalid SIM EAP-AKA authentication response!"));
                }
                Ok(Self::SynchronizationFailure { auts })
            }
            other => Err(invalid(format!("Unknown SIM authentication tag 0x{other:02X}"))),
        }
    }
}

fn take_lv(data: &mut &[u8]) -> Result<Vec<u8>, ServiceEntitlementError> {
    let (&len, rest) = data
        .split_first()
        .ok_or_else(|| invalid("Truncated SIM authentication response"))?;
    let len = len as usize;
    if rest.len() < len {
        return Err(invalid("Truncated SIM authentication response"));
    }
    let (value, rest) = rest.split_at(len);
    *data = rest;
    Ok(value.to_vec())
}

fn invalid(message: impl Into<String>) -> ServiceEntitlementError {
    ServiceEntitlementError::new(ErrorCode::IccAuthenticationNotAvailable, message)
}
