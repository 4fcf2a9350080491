//! Static awareness articles about recognizing and reporting animal abuse.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/educational-content` | No | List articles |

pub mod dtos;
pub mod handlers;
pub mod routes;
