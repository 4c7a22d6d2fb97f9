use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const STATE_DIR: &str = ".pi";
const SESSIONS_DIR: &str = "sessions";

/// Characters that are path separators or reserved on common filesystems.
const UNSAFE_FILENAME_CHARS: &[char] = &[':', '/', '\\', ' ', '*', '?', '"', '<', '>', '|'];

/// Default directory for session files of a working directory.
#[must_use]
pub fn session_root(cwd: &Path) -> PathBuf {
    cwd.join(STATE_DIR).join(SESSIONS_DIR)
}

/// Replaces every unsafe filename character with `-`.
#[must_use]
pub fn sanitize_for_filename(text: &str) -> String {
    text.replace(UNSAFE_FILENAME_CHARS, "-")
}

/// `<created-at>_<session-id>.jsonl`, with both parts made filename-safe.
#[must_use]
pub fn session_file_name(created_at: OffsetDateTime, session_id: &str) -> String {
    let timestamp = created_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| created_at.unix_timestamp().to_string());
    format!(
        "{}_{}.jsonl",
        sanitize_for_filename(&timestamp),
        sanitize_for_filename(session_id)
    )
}
