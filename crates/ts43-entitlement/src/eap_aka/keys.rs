//! EAP-AKA key derivation (RFC 4187 section 7, appendix A)

use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};

type HmacSha1 = Hmac<Sha1>;

const K_ENCR_LENGTH: usize = 16;
const K_AUT_LENGTH: usize = 16;
const MSK_LENGTH: usize = 64;
const EMSK_LENGTH: usize = 64;
const TEKS_LENGTH: usize = K_ENCR_LENGTH + K_AUT_LENGTH + MSK_LENGTH + EMSK_LENGTH;

pub const MAC_LENGTH: usize = 16;

const SHA1_INITIAL_STATE: [u32; 5] = [0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476, 0xC3D2E1F0];

/// Master key and the transient EAP keys derived from it
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey {
    mk: [u8; 20],
    k_encr: [u8; K_ENCR_LENGTH],
    k_aut: [u8; K_AUT_LENGTH],
    msk: [u8; MSK_LENGTH],
    emsk: [u8; EMSK_LENGTH],
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

impl MasterKey {
    /// `MK = SHA1(Identity | IK | CK)`, then expand with the FIPS 186-2 PRF
    pub fn derive(identity: &str, ik: &[u8], ck: &[u8]) -> Option<Self> {
        if identity.is_empty() || ik.is_empty() || ck.is_empty() {
            return None;
        }
        let mut hasher = Sha1::new();
        hasher.update(identity.as_bytes());
        hasher.update(ik);
        hasher.update(ck);
        let mut mk = [0u8; 20];
        mk.copy_from_slice(&hasher.finalize());
        Some(Self::from_master_key(mk))
    }

    pub fn from_master_key(mk: [u8; 20]) -> Self {
        let teks = fips186_prf(mk);
        let mut key = Self {
            mk,
            k_encr: [0; K_ENCR_LENGTH],
            k_aut: [0; K_AUT_LENGTH],
            msk: [0; MSK_LENGTH],
            emsk: [0; EMSK_LENGTH],
        };
        let (k_encr, rest) = teks.split_at(K_ENCR_LENGTH);
        let (k_aut, rest) = rest.split_at(K_AUT_LENGTH);
        let (msk, emsk) = rest.split_at(MSK_LENGTH);
        key.k_encr.copy_from_slice(k_encr);
        key.k_aut.copy_from_slice(k_aut);
        key.msk.copy_from_slice(msk);
        key.emsk.copy_from_slice(emsk);
        key
    }

    pub fn master_key(&self) -> &[u8] {
        &self.mk
    }

    pub fn k_encr(&self) -> &[u8] {
        &self.k_encr
    }

    /// Key for AT_MAC
    pub fn k_aut(&self) -> &[u8] {
        &self.k_aut
    }

    pub fn msk(&self) -> &[u8] {
        &self.msk
    }

    pub fn emsk(&self) -> &[u8] {
        &self.emsk
    }

    /// HMAC-SHA1-128 over `message` keyed with K_aut
    pub fn mac(&self, message: &[u8]) -> Option<[u8; MAC_LENGTH]> {
        let mut mac = HmacSha1::new_from_slice(&self.k_aut).ok()?;
        mac.update(message);
        let full = mac.finalize().into_bytes();
        let mut out = [0u8; MAC_LENGTH];
        out.copy_from_slice(&full[..MAC_LENGTH]);
        Some(out)
    }
}

/// FIPS 186-2 change notice 1 PRF with b = 160 and XSEED = 0
fn fips186_prf(mut xkey: [u8; 20]) -> [u8; TEKS_LENGTH] {
    let mut out = [0u8; TEKS_LENGTH];
    for chunk in out.chunks_mut(20) {
        let w = g(&xkey);
        chunk.copy_from_slice(&w);

        // XKEY = (1 + XKEY + w) mod 2^160
        let mut carry = 1u16;
        for k in (0..20).rev() {
            carry += xkey[k] as u16 + w[k] as u16;
            xkey[k] = carry as u8;
            carry >>= 8;
        }
    }
    out
}

/// G(t, c): one SHA-1 compression of `seed` zero-padded to 512 bits, with the
/// standard initial state and no length padding
fn g(seed: &[u8; 20]) -> [u8; 20] {
    let mut state = SHA1_INITIAL_STATE;
    let mut block = [0u8; 64];
    block[..20].copy_from_slice(seed);
    sha1::compress(&mut state, &[block.into()]);

    let mut out = [0u8; 20];
    for (chunk, word) in out.chunks_mut(4).zip(state) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    out
}
