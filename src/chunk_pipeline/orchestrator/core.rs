// In: src/chunk_pipeline/orchestrator/core.rs

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::bridge::format::{
    MAX_CHUNK_COUNT, MAX_CHUNK_SIZE, MAX_TEXT_BYTES, RECORD_FORMAT_VERSION,
};
use crate::chunk_pipeline::context::StageContext;
use crate::chunk_pipeline::executor;
use crate::chunk_pipeline::models::{Record, RecordHeader};
use crate::chunk_pipeline::orchestrator::dispatch::{run_chunks, split_chunks};
use crate::chunk_pipeline::traits::validate_chain;
use crate::config::{CodecConfig, OptimizationLevel};
use crate::error::SjzipError;
use crate::log_metric;
use crate::space::Alphabet;

//==================================================================================
// 1. Input Validation
//==================================================================================

/// Validates a text at the boundary and returns its character count.
pub fn validate_input(text: &str, chunk_size: usize) -> Result<usize, SjzipError> {
    if text.len() > MAX_TEXT_BYTES {
        return Err(SjzipError::InputTooLarge {
            size: text.len(),
            max: MAX_TEXT_BYTES,
        });
    }

    let char_count = Alphabet::global().validate_text(text)?;

    let chunk_count = char_count.div_ceil(chunk_size.max(1));
    if chunk_count > MAX_CHUNK_COUNT {
        return Err(SjzipError::TooManyChunks {
            count: chunk_count,
            max: MAX_CHUNK_COUNT,
        });
    }
    Ok(char_count)
}

/// Checks the structural invariants of a record before any chunk is decoded.
pub fn validate_record(record: &Record) -> Result<(), SjzipError> {
    let header = &record.header;
    if header.version != RECORD_FORMAT_VERSION {
        return Err(SjzipError::RecordFormat(format!(
            "Unsupported record version: expected {}, got {}",
            RECORD_FORMAT_VERSION, header.version
        )));
    }

    let chunk_size = header.chunk_size as usize;
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        return Err(SjzipError::RecordFormat(format!(
            "chunk size {} is outside 1..={}",
            chunk_size, MAX_CHUNK_SIZE
        )));
    }
    if record.chunks.len() > MAX_CHUNK_COUNT {
        return Err(SjzipError::TooManyChunks {
            count: record.chunks.len(),
            max: MAX_CHUNK_COUNT,
        });
    }

    let mut total: u64 = 0;
    let last = record.chunks.len().saturating_sub(1);
    for (i, chunk) in record.chunks.iter().enumerate() {
        let len = chunk.length as usize;
        let valid = if i < last {
            len == chunk_size
        } else {
            (1..=chunk_size).contains(&len)
        };
        if !valid {
            return Err(SjzipError::RecordFormat(format!(
                "chunk {} has {} characters with a chunk size of {}",
                i, len, chunk_size
            )));
        }
        if chunk.body.level() != header.level {
            return Err(SjzipError::RecordFormat(format!(
                "chunk {} is stored at level {} in a level {} record",
                i,
                chunk.body.level(),
                header.level
            )));
        }
        total += len as u64;
    }

    if total != header.original_length {
        return Err(SjzipError::RecordFormat(format!(
            "chunks hold {} characters but the header declares {}",
            total, header.original_length
        )));
    }
    Ok(())
}

//==================================================================================
// 2. Public Orchestration API
//==================================================================================

/// Encodes `text` at `level`: validate, chunk, run the level's stage list over
/// every chunk, and assemble the record.
pub fn encode_text(
    text: &str,
    level: OptimizationLevel,
    config: &CodecConfig,
    cancel: Option<&AtomicBool>,
) -> Result<Record, SjzipError> {
    let started = Instant::now();
    config.validate()?;
    let char_count = validate_input(text, config.chunk_size)?;

    let stages = level.stages();
    validate_chain(stages)?;
    let ctx = StageContext::new(&config.geometry())?;

    let chunks = split_chunks(text, config.chunk_size);
    let payloads = run_chunks(&chunks, config, cancel, |index, chunk| {
        executor::encode_chunk(chunk, stages, &ctx, index)
    })?;

    let record = Record {
        header: RecordHeader {
            version: RECORD_FORMAT_VERSION,
            level,
            geometry: config.geometry(),
            chunk_size: config.chunk_size as u16,
            original_length: char_count as u64,
        },
        chunks: payloads,
    };

    log::info!(
        "encoded {} characters into {} chunks at level {} in {:?}",
        char_count,
        record.chunk_count(),
        level,
        started.elapsed()
    );
    log_metric!(
        "event" = "encode",
        "level" = level.as_u8(),
        "characters" = char_count,
        "chunks" = record.chunk_count()
    );
    Ok(record)
}

/// Decodes a record with the level and geometry stored in its header.
/// `config` only controls dispatch (parallelism), never the decoding itself.
pub fn decode_record(
    record: &Record,
    config: &CodecConfig,
    cancel: Option<&AtomicBool>,
) -> Result<String, SjzipError> {
    let started = Instant::now();
    validate_record(record)?;

    let level = record.header.level;
    let stages = level.stages();
    validate_chain(stages)?;
    let ctx = StageContext::new(&record.header.geometry)?;

    let texts = run_chunks(&record.chunks, config, cancel, |index, payload| {
        executor::decode_chunk(payload, stages, &ctx, index)
    })?;

    let mut text = String::with_capacity(texts.iter().map(|t| t.len()).sum());
    for part in &texts {
        text.push_str(part);
    }

    log::info!(
        "decoded {} chunks at level {} into {} characters in {:?}",
        record.chunk_count(),
        level,
        record.header.original_length,
        started.elapsed()
    );
    log_metric!(
        "event" = "decode",
        "level" = level.as_u8(),
        "chunks" = record.chunk_count()
    );
    Ok(text)
}
