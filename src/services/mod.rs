//! Service layer for the ShareFile API.

mod items;
mod upload;

pub use items::ItemsService;
pub use upload::UploadOutcome;
