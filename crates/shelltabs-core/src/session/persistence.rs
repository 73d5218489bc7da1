//! Session snapshot persistence
//!
//! Handles reading/writing group window state to disk with atomic
//! operations. Corrupt or unreadable snapshot files are skipped with a
//! warning and never abort a load.

use std::fs;
use std::path::Path;

use crate::session::errors::SessionError;
use crate::session::types::GroupWindowState;

pub fn ensure_state_directory(state_dir: &Path) -> Result<(), SessionError> {
    fs::create_dir_all(state_dir).map_err(|e| SessionError::IoError { source: e })?;
    Ok(())
}

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = fs::remove_file(temp_file) {
        tracing::warn!(
            event = "core.session.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err,
            message = "Failed to clean up temp file after operation error"
        );
    }
}

/// Persist one group snapshot, named after a sanitized group name.
///
/// Write goes to a temp file first, then renames over the final path so a
/// crash mid-write never leaves a truncated snapshot behind.
pub fn save_group_state(
    state: &GroupWindowState,
    state_dir: &Path,
) -> Result<(), SessionError> {
    let file_name = format!("{}.json", sanitize_file_stem(&state.group_name));
    let state_file = state_dir.join(file_name);
    let state_json = serde_json::to_string_pretty(state).map_err(|e| {
        tracing::error!(
            event = "core.session.serialization_failed",
            group = %state.group_name,
            error = %e,
        );
        SessionError::IoError {
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        }
    })?;

    let temp_file = state_file.with_extension("json.tmp");

    if let Err(e) = fs::write(&temp_file, &state_json) {
        cleanup_temp_file(&temp_file, &e);
        return Err(SessionError::IoError { source: e });
    }

    if let Err(e) = fs::rename(&temp_file, &state_file) {
        cleanup_temp_file(&temp_file, &e);
        return Err(SessionError::IoError { source: e });
    }

    Ok(())
}

/// Load every snapshot under `state_dir`.
///
/// Returns the parsed snapshots and how many files were skipped as
/// unreadable or corrupt. A missing directory is an empty session, not an
/// error.
pub fn load_group_states(
    state_dir: &Path,
) -> Result<(Vec<GroupWindowState>, usize), SessionError> {
    let mut states = Vec::new();
    let mut skipped_count = 0;

    if !state_dir.exists() {
        return Ok((states, skipped_count));
    }

    let entries = fs::read_dir(state_dir).map_err(|e| SessionError::IoError { source: e })?;

    for entry in entries {
        let entry = entry.map_err(|e| SessionError::IoError { source: e })?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                skipped_count += 1;
                tracing::warn!(
                    event = "core.session.load_read_error",
                    file = %path.display(),
                    error = %e,
                    message = "Failed to read snapshot file, skipping"
                );
                continue;
            }
        };

        match serde_json::from_str::<GroupWindowState>(&content) {
            Ok(state) => states.push(state),
            Err(e) => {
                skipped_count += 1;
                tracing::warn!(
                    event = "core.session.load_invalid_json",
                    file = %path.display(),
                    error = %e,
                    message = "Failed to parse snapshot JSON, skipping"
                );
            }
        }
    }

    Ok((states, skipped_count))
}

/// Replace path-hostile characters in a group name used as a file stem.
fn sanitize_file_stem(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "group".to_string()
    } else {
        sanitized
    }
}
