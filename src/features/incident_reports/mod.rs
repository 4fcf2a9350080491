//! Animal-welfare incident reports: intake and live listing.
//!
//! A submission is validated, optionally analyzed by the abuse analyzer, and
//! stored. The listing is ordered by `reportDate` descending and is pushed to
//! browsers again whenever the collection changes.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/reports` | No | Submit a report (photo as data URI) |
//! | GET | `/api/reports` | No | Current listing state |
//! | GET | `/api/reports/stream` | No | Live listing (SSE) |
//! | GET | `/` | No | Report form |
//! | POST | `/reports/new` | No | Report form post (multipart) |
//! | GET | `/reports` | No | Listing page |
//! | GET | `/reports/stream` | No | Live listing markup (SSE) |
//! | GET | `/reports/{id}/photo` | No | Photo of a stored report |

pub mod display;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use routes::ReportState;
pub use services::{IntakeService, ListingService};
