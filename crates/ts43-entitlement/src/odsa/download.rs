//! Profile download and user message blocks

use crate::doc::{parm, Ts43Doc};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;

/// How to fetch the eSIM profile (TS.43 `DownloadInfo`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadInfo {
    /// Decoded `LPA:1$<smdp>$<matching id>` activation code
    ActivationCode { activation_code: String, iccid: String },
    /// Profile to fetch from one of the SM-DP+ servers
    SmdpAddresses { iccid: String, addresses: Vec<String> },
}

impl DownloadInfo {
    /// Read a `DownloadInfo` characteristic. Either a base64 activation code,
    /// or SM-DP+ addresses together with an ICCID, must be present.
    pub fn from_doc(doc: &Ts43Doc, path: &[&str]) -> Option<Self> {
        let activation_code = doc.get(path, parm::PROFILE_ACTIVATION_CODE).unwrap_or_default();
        let smdp_address = doc.get(path, parm::PROFILE_SMDP_ADDRESS).unwrap_or_default();
        let iccid = doc.get(path, parm::PROFILE_ICCID).unwrap_or_default();

        if !activation_code.is_empty() {
            let decoded = STANDARD
                .decode(activation_code.trim())
                .ok()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
            return match decoded {
                Some(activation_code) => Some(Self::ActivationCode {
                    activation_code,
                    iccid: iccid.to_string(),
                }),
                None => {
                    warn!(activation_code, "Failed to decode the activation code");
                    None
                }
            };
        }

        if !smdp_address.is_empty() && !iccid.is_empty() {
            return Some(Self::SmdpAddresses {
                iccid: iccid.to_string(),
                addresses: split_list(smdp_address),
            });
        }

        warn!(smdp_address, iccid, "Failed to parse download info");
        None
    }

    pub fn iccid(&self) -> &str {
        match self {
            Self::ActivationCode { iccid, .. } | Self::SmdpAddresses { iccid, .. } => iccid,
        }
    }
}

/// Message the user must confirm before the operation proceeds (TS.43 `MSG`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageInfo {
    pub message: String,
    pub accept_button: String,
    pub accept_button_label: String,
    pub reject_button: String,
    pub reject_button_label: String,
    pub accept_freetext: String,
}

impl MessageInfo {
    /// All of message, both buttons and freetext must be present; labels are
    /// optional
    pub fn from_doc(doc: &Ts43Doc, path: &[&str]) -> Option<Self> {
        let field = |name| doc.get(path, name).unwrap_or_default().to_string();
        let info = Self {
            message: field(parm::MESSAGE),
            accept_button: field(parm::ACCEPT_BUTTON),
            accept_button_label: field(parm::ACCEPT_BUTTON_LABEL),
            reject_button: field(parm::REJECT_BUTTON),
            reject_button_label: field(parm::REJECT_BUTTON_LABEL),
            accept_freetext: field(parm::ACCEPT_FREETEXT),
        };

        if info.message.is_empty()
            || info.accept_button.is_empty()
            || info.reject_button.is_empty()
            || info.accept_freetext.is_empty()
        {
            warn!(message_info = ?info, "Failed to parse message info");
            return None;
        }
        Some(info)
    }
}

/// Split a comma-separated list, trimming whitespace around each item
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|item| item.trim().to_string()).collect()
}
