pub mod page_handler;
pub mod report_handler;

pub use page_handler::*;
pub use report_handler::*;
