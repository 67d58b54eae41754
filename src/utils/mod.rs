pub mod downloader;
pub mod release_notes;
