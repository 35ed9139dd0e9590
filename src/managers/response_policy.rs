//! Decides whether a navigation response is rendered or downloaded, and
//! which file name a download gets.

use reqwest::Url;

use crate::types::navigation::ResponseInfo;

const DISPLAYABLE_TYPES: &[&str] = &["text/html", "application/xhtml+xml", "text/plain"];
const STRUCTURED_TYPES: &[&str] = &["application/json", "application/xml", "text/xml"];

/// A response is a download when the server marks it as an attachment or
/// when its content type is neither a page nor structured data. Responses
/// without a content type are rendered.
pub fn is_download(info: &ResponseInfo) -> bool {
    if let Some(disposition) = &info.content_disposition {
        if disposition_type(disposition).eq_ignore_ascii_case("attachment") {
            return true;
        }
    }
    match info.content_type.as_deref().map(essence) {
        None => false,
        Some(mime) if mime.is_empty() => false,
        Some(mime) => !is_displayable(&mime),
    }
}

/// Picks the download's file name: the disposition's `filename*` or
/// `filename`, else the engine's suggestion, else the last URL segment.
pub fn file_name_for(info: &ResponseInfo) -> String {
    info.content_disposition
        .as_deref()
        .and_then(disposition_file_name)
        .or_else(|| {
            info.suggested_file_name
                .clone()
                .filter(|name| !name.trim().is_empty())
        })
        .or_else(|| url_file_name(&info.url))
        .unwrap_or_else(|| "download".to_string())
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

fn is_displayable(mime: &str) -> bool {
    DISPLAYABLE_TYPES.contains(&mime)
        || STRUCTURED_TYPES.contains(&mime)
        || mime.ends_with("+json")
        || mime.ends_with("+xml")
}

fn disposition_type(disposition: &str) -> &str {
    disposition.split(';').next().unwrap_or("").trim()
}

/// Splits header parameters on `;`, leaving separators inside quoted
/// strings alone.
fn split_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, ch) in header.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&header[start..]);
    params
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}

fn disposition_file_name(disposition: &str) -> Option<String> {
    let mut plain = None;
    for param in split_params(disposition).into_iter().skip(1) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = unquote(value);
        if key == "filename*" {
            // RFC 5987: charset'language'percent-encoded
            let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value.as_str());
            if let Ok(decoded) = urlencoding::decode(encoded) {
                if !decoded.is_empty() {
                    return Some(decoded.into_owned());
                }
            }
        } else if key == "filename" && !value.is_empty() {
            plain = Some(value);
        }
    }
    plain
}

/// Last non-empty path segment of `url`, percent-decoded. `None` when the
/// URL does not parse or has no file-like segment.
pub fn url_file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }
    Some(
        urlencoding::decode(segment)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| segment.to_string()),
    )
}
