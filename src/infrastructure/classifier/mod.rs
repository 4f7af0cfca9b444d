//! Bot classifier implementations.

mod signature_classifier;

pub use signature_classifier::{DEFAULT_PREVIEW_IP_RANGES, SignatureClassifier};
