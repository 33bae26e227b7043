//! `multipart/form-data` parsing for fully buffered bodies.

use super::{FieldMap, FieldValue};
use std::collections::HashMap;
use thiserror::Error;

/// Upper bound on parts per body.
pub const DEFAULT_MAX_FIELDS: usize = 100;

const MAX_BOUNDARY_LEN: usize = 70;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    #[error("missing boundary in multipart Content-Type")]
    MissingBoundary,
    #[error("invalid multipart boundary")]
    InvalidBoundary,
    #[error("too many fields: {count} exceeds limit of {max}")]
    TooManyFields { count: usize, max: usize },
    #[error("missing Content-Disposition header in part")]
    MissingContentDisposition,
    #[error("invalid Content-Disposition: {0}")]
    InvalidContentDisposition(&'static str),
    #[error("invalid part headers: {0}")]
    InvalidPartHeaders(&'static str),
    #[error("unexpected end of multipart data")]
    UnexpectedEof,
    #[error("invalid multipart format: {0}")]
    InvalidFormat(&'static str),
}

/// Extract the boundary parameter from a `multipart/form-data` content type.
pub fn parse_boundary(content_type: &str) -> Result<String, MultipartError> {
    for param in content_type.split(';').skip(1) {
        let Some((key, value)) = param.trim().split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("boundary") {
            let boundary = value.trim().trim_matches('"').trim_matches('\'');
            if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN {
                return Err(MultipartError::InvalidBoundary);
            }
            return Ok(boundary.to_string());
        }
    }
    Err(MultipartError::MissingBoundary)
}

struct Part<'a> {
    name: String,
    data: &'a [u8],
}

/// Parse a buffered multipart body into named fields.
///
/// A field sent once maps to a single value; a repeated field keeps every
/// value, in order, as [`FieldValue::Many`]. Part contents that are not UTF-8
/// become [`FieldValue::Binary`].
pub fn parse(body: &[u8], boundary: &str) -> Result<FieldMap, MultipartError> {
    let delimiter = format!("--{boundary}").into_bytes();
    let mut grouped: Vec<(String, Vec<FieldValue>)> = Vec::new();
    for part in split_parts(body, &delimiter)? {
        let value = match String::from_utf8(part.data.to_vec()) {
            Ok(text) => FieldValue::Text(text),
            Err(e) => FieldValue::Binary(e.into_bytes()),
        };
        match grouped.iter_mut().find(|(name, _)| *name == part.name) {
            Some((_, values)) => values.push(value),
            None => grouped.push((part.name, vec![value])),
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(name, mut values)| {
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                FieldValue::Many(values)
            };
            (name, value)
        })
        .collect())
}

fn split_parts<'a>(body: &'a [u8], delimiter: &[u8]) -> Result<Vec<Part<'a>>, MultipartError> {
    let mut parts = Vec::new();
    // Skip the preamble.
    let mut pos = find_delimiter(body, delimiter, 0)?;

    loop {
        let delimiter_end = pos + delimiter.len();
        if body.get(delimiter_end..delimiter_end + 2) == Some(b"--".as_slice()) {
            return Ok(parts);
        }
        if parts.len() >= DEFAULT_MAX_FIELDS {
            return Err(MultipartError::TooManyFields {
                count: parts.len() + 1,
                max: DEFAULT_MAX_FIELDS,
            });
        }

        pos = delimiter_end;
        match body.get(pos..pos + 2) {
            Some(b"\r\n") => pos += 2,
            Some(_) => return Err(MultipartError::InvalidFormat("expected CRLF after boundary")),
            None => return Err(MultipartError::UnexpectedEof),
        }

        let (headers, header_end) = parse_part_headers(body, pos)?;
        let disposition = headers
            .get("content-disposition")
            .ok_or(MultipartError::MissingContentDisposition)?;
        let name = disposition_name(disposition)?;

        let data_end = find_delimiter(body, delimiter, header_end)?;
        // The CRLF before a delimiter belongs to the delimiter.
        let data = body
            .get(header_end..data_end.saturating_sub(2))
            .unwrap_or_default();
        parts.push(Part { name, data });
        pos = data_end;
    }
}

/// Find the next delimiter that starts a line and is followed by CRLF or `--`.
fn find_delimiter(data: &[u8], delimiter: &[u8], start: usize) -> Result<usize, MultipartError> {
    let last = data
        .len()
        .checked_sub(delimiter.len())
        .ok_or(MultipartError::UnexpectedEof)?;
    for i in start..=last {
        if !data[i..].starts_with(delimiter) {
            continue;
        }
        if i != 0 && (i < 2 || &data[i - 2..i] != b"\r\n") {
            continue;
        }
        let end = i + delimiter.len();
        match data.get(end..end + 2) {
            Some(b"\r\n") | Some(b"--") => return Ok(i),
            Some(_) => continue,
            None => return Err(MultipartError::UnexpectedEof),
        }
    }
    Err(MultipartError::UnexpectedEof)
}

fn parse_part_headers(
    data: &[u8],
    start: usize,
) -> Result<(HashMap<String, String>, usize), MultipartError> {
    let mut headers = HashMap::new();
    let mut pos = start;
    loop {
        let line_end = find_crlf(data, pos)?;
        let line = &data[pos..line_end];
        if line.is_empty() {
            return Ok((headers, line_end + 2));
        }
        let line = std::str::from_utf8(line)
            .map_err(|_| MultipartError::InvalidPartHeaders("invalid UTF-8 in header"))?;
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
        pos = line_end + 2;
    }
}

fn find_crlf(data: &[u8], start: usize) -> Result<usize, MultipartError> {
    data.get(start..)
        .and_then(|rest| rest.windows(2).position(|w| w == b"\r\n"))
        .map(|offset| start + offset)
        .ok_or(MultipartError::UnexpectedEof)
}

/// `form-data; name="field"; filename="file.txt"` -> `field`
fn disposition_name(value: &str) -> Result<String, MultipartError> {
    value
        .split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("name"))
        .map(|(_, raw)| unquote(raw))
        .ok_or(MultipartError::InvalidContentDisposition("missing name parameter"))
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    let quoted = s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')));
    if quoted {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}
