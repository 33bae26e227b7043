use super::multipart;
use super::{DecodeError, FieldMap, FieldValue, RawRequestData};
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

/// How a request body is read, chosen from its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyEncoding {
    UrlEncoded,
    Multipart { boundary: String },
    Json,
    /// No body is read; only the query string is decoded
    RawQuery,
}

impl BodyEncoding {
    /// Pick the decoder for a request from its lowercase-keyed headers.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnsupportedContentType`] when an unrecognized content
    /// type arrives with a body, and multipart boundary errors.
    pub fn from_headers(headers: &HashMap<String, String>) -> Result<Self, DecodeError> {
        let Some(content_type) = headers.get("content-type") else {
            return Ok(BodyEncoding::RawQuery);
        };
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match media_type.as_str() {
            "" => Ok(BodyEncoding::RawQuery),
            "application/x-www-form-urlencoded" => Ok(BodyEncoding::UrlEncoded),
            "multipart/form-data" => Ok(BodyEncoding::Multipart {
                boundary: multipart::parse_boundary(content_type)?,
            }),
            "application/json" => Ok(BodyEncoding::Json),
            _ if carries_body(headers) => Err(DecodeError::UnsupportedContentType(media_type)),
            _ => Ok(BodyEncoding::RawQuery),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BodyEncoding::UrlEncoded => "urlencoded",
            BodyEncoding::Multipart { .. } => "multipart",
            BodyEncoding::Json => "json",
            BodyEncoding::RawQuery => "raw_query",
        }
    }
}

fn carries_body(headers: &HashMap<String, String>) -> bool {
    headers.contains_key("transfer-encoding")
        || headers
            .get("content-length")
            .is_some_and(|len| len.trim().parse::<usize>().map_or(true, |n| n > 0))
}

/// Decode the query string and request body.
///
/// The query string is decoded for every encoding. Body-carrying encodings
/// read exactly `Content-Length` bytes from `body`.
///
/// # Errors
///
/// Any [`DecodeError`]: bad or missing `Content-Length`, an oversized or
/// short body, invalid UTF-8, malformed pairs, JSON or multipart syntax.
pub fn decode<R: Read>(
    headers: &HashMap<String, String>,
    body: R,
    query: &str,
    max_body_bytes: usize,
) -> Result<RawRequestData, DecodeError> {
    let encoding = BodyEncoding::from_headers(headers)?;
    let mut data = RawRequestData {
        query: parse_pairs(query)?,
        ..RawRequestData::default()
    };

    let body_len = match &encoding {
        BodyEncoding::RawQuery => 0,
        BodyEncoding::UrlEncoded => {
            let bytes = read_body(headers, body, max_body_bytes, &encoding)?;
            data.form = parse_pairs(std::str::from_utf8(&bytes)?)?;
            bytes.len()
        }
        BodyEncoding::Multipart { boundary } => {
            let bytes = read_body(headers, body, max_body_bytes, &encoding)?;
            data.form = multipart::parse(&bytes, boundary)?;
            bytes.len()
        }
        BodyEncoding::Json => {
            let bytes = read_body(headers, body, max_body_bytes, &encoding)?;
            data.document = Some(serde_json::from_slice(&bytes)?);
            bytes.len()
        }
    };

    debug!(
        encoding = encoding.label(),
        body_bytes = body_len,
        query_fields = data.query.len(),
        form_fields = data.form.len(),
        has_document = data.document.is_some(),
        "Request body decoded"
    );
    Ok(data)
}

fn read_body<R: Read>(
    headers: &HashMap<String, String>,
    body: R,
    limit: usize,
    encoding: &BodyEncoding,
) -> Result<Vec<u8>, DecodeError> {
    let raw = headers
        .get("content-length")
        .ok_or(DecodeError::MissingContentLength(encoding.label()))?;
    let length: usize = raw
        .trim()
        .parse()
        .map_err(|_| DecodeError::InvalidContentLength(raw.clone()))?;
    if length > limit {
        return Err(DecodeError::BodyTooLarge { length, limit });
    }

    let mut bytes = Vec::with_capacity(length);
    body.take(length as u64).read_to_end(&mut bytes)?;
    if bytes.len() < length {
        return Err(DecodeError::TruncatedBody {
            expected: length,
            received: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Decode `key=value` pairs joined by `&`, as in query strings and
/// urlencoded bodies.
///
/// Keys and values are percent-decoded with `+` as space. Empty segments are
/// skipped; a segment without `=` is an error. A repeated key keeps its last
/// value.
///
/// # Errors
///
/// [`DecodeError::MalformedPair`] for a segment without `=`,
/// [`DecodeError::InvalidUtf8`] when an escape decodes to invalid UTF-8.
pub fn parse_pairs(input: &str) -> Result<FieldMap, DecodeError> {
    let mut fields = FieldMap::new();
    for segment in input.split('&').filter(|s| !s.is_empty()) {
        let Some((key, value)) = segment.split_once('=') else {
            return Err(DecodeError::MalformedPair(segment.to_string()));
        };
        fields.insert(decode_component(key)?, FieldValue::Text(decode_component(value)?));
    }
    Ok(fields)
}

fn decode_component(raw: &str) -> Result<String, DecodeError> {
    let spaced = raw.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes()).into_owned();
    String::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.utf8_error()))
}
