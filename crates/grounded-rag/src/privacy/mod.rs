//! PII masking applied to chunk text before it is embedded or persisted

mod masker;

pub use masker::{contains_pii, mask, EMAIL_PLACEHOLDER, PHONE_PLACEHOLDER};
