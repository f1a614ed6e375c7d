pub mod export;
pub mod loader;

pub use export::{
    EXPORT_FILE_NAME, EXPORT_LABEL, EXPORT_MIME, ExportError, export_download, write_csv,
};
pub use loader::{LoadError, load_from_file, load_from_reader, load_from_str};
