mod checksum;
mod version;

pub use checksum::ChecksumKind;
pub use version::{vercmp, version_status, VersionStatus};
