mod intake_service;
mod listing_service;

pub use intake_service::{IntakeService, SubmissionOutcome};
pub use listing_service::ListingService;
