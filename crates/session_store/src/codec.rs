use std::collections::HashSet;

use crate::error::SessionManagerError;
use crate::schema::{SessionHeader, TranscriptEntry, TranscriptRecord, SESSION_VERSION};

/// A transcript decoded from its JSONL lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTranscript {
    pub header: SessionHeader,
    pub entries: Vec<TranscriptEntry>,
}

pub fn encode_header(header: &SessionHeader) -> Result<String, SessionManagerError> {
    serde_json::to_string(&TranscriptRecord::Session(header.clone()))
        .map_err(SessionManagerError::json_serialize)
}

pub fn encode_entry(entry: &TranscriptEntry) -> Result<String, SessionManagerError> {
    serde_json::to_string(&TranscriptRecord::Entry(entry.clone()))
        .map_err(SessionManagerError::json_serialize)
}

/// Decodes a full transcript: one header line followed by entry lines.
///
/// Blank lines are skipped. Line numbers in errors are 1-based and count
/// blank lines, so they point at the physical line of the source.
pub fn decode_transcript<I, S>(
    lines: I,
    expected_runtime: Option<&str>,
) -> Result<DecodedTranscript, SessionManagerError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut header: Option<SessionHeader> = None;
    let mut entries = Vec::new();
    let mut seen_ids = HashSet::new();

    for (line_index, line) in lines.into_iter().enumerate() {
        let line_number = line_index + 1;
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }

        let parsed = parse_json_line(line_number, line)?;

        if header.is_none() {
            match parsed {
                TranscriptRecord::Session(parsed_header) => {
                    validate_header_line(line_number, &parsed_header, expected_runtime)?;
                    header = Some(parsed_header);
                }
                TranscriptRecord::Entry(_) => {
                    return Err(SessionManagerError::InvalidHeaderRecord { line: line_number });
                }
            }

            continue;
        }

        match parsed {
            TranscriptRecord::Session(_) => {
                return Err(SessionManagerError::InvalidEntryRecord { line: line_number });
            }
            TranscriptRecord::Entry(entry) => {
                if !seen_ids.insert(entry.id.clone()) {
                    return Err(SessionManagerError::DuplicateEntryId {
                        line: line_number,
                        id: entry.id,
                    });
                }
                entries.push(entry);
            }
        }
    }

    let header = header.ok_or(SessionManagerError::MissingHeader)?;
    Ok(DecodedTranscript { header, entries })
}

pub(crate) fn parse_json_line(
    line_number: usize,
    line: &str,
) -> Result<TranscriptRecord, SessionManagerError> {
    serde_json::from_str::<TranscriptRecord>(line)
        .map_err(|source| SessionManagerError::json_line(line_number, source))
}

pub(crate) fn validate_header_line(
    line_number: usize,
    header: &SessionHeader,
    expected_runtime: Option<&str>,
) -> Result<(), SessionManagerError> {
    if header.version != SESSION_VERSION {
        return Err(SessionManagerError::UnsupportedVersion {
            line: line_number,
            found: header.version,
        });
    }

    if let Some(expected) = expected_runtime {
        if header.runtime != expected {
            return Err(SessionManagerError::RuntimeMismatch {
                line: line_number,
                expected: expected.to_string(),
                found: header.runtime.clone(),
            });
        }
    }

    Ok(())
}
