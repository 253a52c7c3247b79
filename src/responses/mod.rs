pub mod download;
pub mod errors;
pub mod html;
pub mod json;

pub use download::xlsx_response;
pub use errors::{error_response, ResultResp};
pub use html::html_response;
pub use json::{json_download, json_response};
