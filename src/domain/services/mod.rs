pub mod address_classifier;
pub mod token_detector;

pub use address_classifier::AddressClassifier;
pub use token_detector::{DetectionOutcome, TokenDetector};
