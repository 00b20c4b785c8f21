use pricehouse_codec::ArchiveLimits;
use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Size bounds for the upload path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Largest accepted request body (the zip archive plus multipart framing).
    /// TOML: `pipeline.max_upload_bytes`. Default: `10 MiB`.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Largest accepted decompressed CSV entry.
    /// TOML: `pipeline.max_payload_bytes`. Default: `64 MiB`.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: u64,
}

impl PipelineConfig {
    pub fn archive_limits(&self) -> ArchiveLimits {
        ArchiveLimits {
            max_payload_bytes: self.max_payload_bytes,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

fn default_max_upload_bytes() -> u64 {
    10 * MIB
}

fn default_max_payload_bytes() -> u64 {
    64 * MIB
}
