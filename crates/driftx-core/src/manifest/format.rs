//! Persisted manifest text format
//!
//! ```text
//! # driftx-manifest v1
//! <id>\t<algorithm>\t<hex digest>\t<recorded_at RFC 3339 | ->\n
//! ```
//!
//! Every record, including the last, is LF-terminated. Lines after the
//! header that start with `#` are comments. Empty lines are rejected so that
//! a truncated or hand-mangled file fails loudly.

use crate::digest::{DigestAlgorithm, Encoding};
use crate::errors::{DriftXError, Result};
use crate::manifest::model::{validate_id, Manifest, ManifestEntry, OverwritePolicy};
use chrono::{DateTime, SecondsFormat, Utc};

pub const MANIFEST_HEADER: &str = "# driftx-manifest v1";
pub const FIELD_SEPARATOR: char = '\t';
pub const RECORD_SEPARATOR: char = '\n';

const NO_TIMESTAMP: &str = "-";
const FIELD_COUNT: usize = 4;

/// Render a manifest in entry order
pub fn serialize_manifest(manifest: &Manifest) -> String {
    let mut out = String::with_capacity(MANIFEST_HEADER.len() + 1 + manifest.len() * 64);
    out.push_str(MANIFEST_HEADER);
    out.push(RECORD_SEPARATOR);

    for entry in manifest {
        let recorded_at = entry
            .recorded_at
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .unwrap_or_else(|| NO_TIMESTAMP.to_string());
        let digest_hex = hex::encode(&entry.expected_digest);
        let fields: [&str; FIELD_COUNT] = [
            &entry.id,
            entry.algorithm.token(),
            &digest_hex,
            &recorded_at,
        ];
        out.push_str(&fields.join("\t"));
        out.push(RECORD_SEPARATOR);
    }

    out
}

/// Parse manifest text produced by `serialize_manifest`
///
/// # Errors
///
/// - `ManifestUnsupportedAlgorithm` for an unknown algorithm token
/// - `ManifestParse` for any other malformed content, with its 1-based line
pub fn parse_manifest(text: &str) -> Result<Manifest> {
    let body = text.strip_suffix(RECORD_SEPARATOR).ok_or_else(|| {
        let line = text.split(RECORD_SEPARATOR).count().max(1);
        parse_error(line, "manifest must end with a line feed")
    })?;

    let mut lines = body.split(RECORD_SEPARATOR).enumerate().map(|(i, l)| (i + 1, l));

    match lines.next() {
        Some((_, header)) if header == MANIFEST_HEADER => {}
        Some((line, other)) => {
            return Err(parse_error(
                line,
                &format!("expected header '{}', found '{}'", MANIFEST_HEADER, other),
            ))
        }
        None => return Err(parse_error(1, "missing header")),
    }

    let mut manifest = Manifest::new();
    for (line_no, line) in lines {
        if line.starts_with('#') {
            continue;
        }
        if line.is_empty() {
            return Err(parse_error(line_no, "empty line"));
        }
        let entry = parse_record(line_no, line)?;
        manifest
            .insert(entry, OverwritePolicy::FailOnDuplicate)
            .map_err(|e| match e {
                DriftXError::DuplicateId { id } => {
                    parse_error(line_no, &format!("duplicate id '{}'", id))
                }
                other => parse_error(line_no, &other.to_string()),
            })?;
    }

    Ok(manifest)
}

fn parse_record(line_no: usize, line: &str) -> Result<ManifestEntry> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(parse_error(
            line_no,
            &format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        ));
    }
    let (id, token, digest_hex, recorded_at) = (fields[0], fields[1], fields[2], fields[3]);

    validate_id(id).map_err(|e| parse_error(line_no, &e.to_string()))?;

    let algorithm: DigestAlgorithm =
        token
            .parse()
            .map_err(|_| DriftXError::ManifestUnsupportedAlgorithm {
                token: token.to_string(),
                line: line_no,
            })?;

    let expected_digest = Encoding::Hex
        .decode(digest_hex.as_bytes())
        .map_err(|e| parse_error(line_no, &e.to_string()))?;
    if expected_digest.len() != algorithm.output_len() {
        return Err(parse_error(
            line_no,
            &format!(
                "{} digest must be {} hex characters, found {}",
                algorithm,
                algorithm.output_len() * 2,
                digest_hex.len()
            ),
        ));
    }

    let recorded_at = match recorded_at {
        NO_TIMESTAMP => None,
        ts => Some(
            DateTime::parse_from_rfc3339(ts)
                .map_err(|e| parse_error(line_no, &format!("invalid timestamp '{}': {}", ts, e)))?
                .with_timezone(&Utc),
        ),
    };

    Ok(ManifestEntry {
        id: id.to_string(),
        algorithm,
        expected_digest,
        recorded_at,
    })
}

/// Import a legacy `path,md5hex` reference list as MD5 entries
///
/// Blank lines are skipped and surrounding whitespace is trimmed. The digest
/// is taken after the last comma so paths may contain commas. A repeated
/// path replaces the earlier entry.
///
/// # Errors
///
/// Returns `ManifestParse` with the offending line for rows without a comma,
/// with invalid ids, or with a malformed MD5 digest.
pub fn import_legacy_csv(text: &str, recorded_at: Option<DateTime<Utc>>) -> Result<Manifest> {
    let mut manifest = Manifest::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let (id, digest_hex) = line
            .rsplit_once(',')
            .ok_or_else(|| parse_error(line_no, "expected 'path,md5hex'"))?;
        let (id, digest_hex) = (id.trim(), digest_hex.trim().to_ascii_lowercase());

        let expected_digest = Encoding::Hex
            .decode(digest_hex.as_bytes())
            .map_err(|e| parse_error(line_no, &e.to_string()))?;
        if expected_digest.len() != DigestAlgorithm::Md5.output_len() {
            return Err(parse_error(line_no, "md5 digest must be 32 hex characters"));
        }

        let entry = ManifestEntry {
            id: id.to_string(),
            algorithm: DigestAlgorithm::Md5,
            expected_digest,
            recorded_at,
        };
        manifest
            .insert(entry, OverwritePolicy::ReplaceExisting)
            .map_err(|e| parse_error(line_no, &e.to_string()))?;
    }

    Ok(manifest)
}

fn parse_error(line: usize, reason: &str) -> DriftXError {
    DriftXError::ManifestParse {
        line,
        reason: reason.to_string(),
    }
}
