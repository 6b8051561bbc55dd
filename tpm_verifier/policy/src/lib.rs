mod pcr_selection;
mod policy_digest;
mod policy_pcr;
mod policy_signed;

pub use pcr_selection::{PcrSelection, PCR_SELECT_SIZE};
pub use policy_digest::{PolicyDigest, PolicyMaker, POLICY_TERM_MAX_BYTES};
pub use policy_pcr::{
    build_pcr_composite, build_policy_pcr_term, policy_pcr_term_hex, read_pcr_values,
    TPM_CC_POLICY_PCR,
};
pub use policy_signed::policy_signed_ahash;
