pub mod handler;
pub mod settings;

pub use handler::{sanitize_file_name, template_csv, UploadHandler, UploadResponse};
pub use settings::{Settings, UploadConfig};
