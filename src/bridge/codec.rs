// In: src/bridge/codec.rs

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::bridge::format::CompressionStats;
use crate::bridge::stateless_api;
use crate::chunk_pipeline::models::Record;
use crate::chunk_pipeline::orchestrator;
use crate::config::{CodecConfig, OptimizationLevel};
use crate::error::SjzipError;

/// A configured encoder/decoder. Cheap to clone and safe to share between
/// threads; every call is independent of the others.
#[derive(Debug, Clone)]
pub struct Codec {
    config: Arc<CodecConfig>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for Codec {
    fn default() -> Self {
        Self {
            config: Arc::new(CodecConfig::default()),
            cancel: None,
        }
    }
}

impl Codec {
    /// Creates a codec after validating `config`.
    pub fn new(config: Arc<CodecConfig>) -> Result<Self, SjzipError> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: None,
        })
    }

    /// Attaches a flag the caller can set to abandon in-flight calls between
    /// chunks. A cancelled call returns `Cancelled` and no partial output.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encodes at the configured default level.
    pub fn encode(&self, text: &str) -> Result<Record, SjzipError> {
        self.encode_at(text, self.config.default_level)
    }

    pub fn encode_at(&self, text: &str, level: OptimizationLevel) -> Result<Record, SjzipError> {
        orchestrator::encode_text(text, level, &self.config, self.cancel.as_deref())
    }

    pub fn decode(&self, record: &Record) -> Result<String, SjzipError> {
        orchestrator::decode_record(record, &self.config, self.cancel.as_deref())
    }

    pub fn encode_to_bytes(&self, text: &str) -> Result<Vec<u8>, SjzipError> {
        self.encode(text)?.to_bytes()
    }

    pub fn decode_from_bytes(&self, bytes: &[u8]) -> Result<String, SjzipError> {
        self.decode(&Record::from_bytes(bytes)?)
    }

    pub fn analyze(
        &self,
        bytes: &[u8],
        original_bytes: Option<usize>,
    ) -> Result<CompressionStats, SjzipError> {
        stateless_api::analyze_record(bytes, original_bytes)
    }
}
