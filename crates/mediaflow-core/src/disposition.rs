//! `Content-Disposition` filename extraction.
//!
//! Conversion results arrive as attachments; the save name comes from the
//! header's `filename*` (RFC 5987) or `filename` parameter. Anything
//! malformed degrades to `None` and the caller falls back to a default name.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::media::ConversionFormat;

/// `filename*=charset'lang'value`, optionally quoted.
static EXTENDED_FILENAME_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?i)(?:^|;)\s*filename\*\s*=\s*"?([^";]+)"?"#).ok());

/// `filename="quoted \" value"` or `filename=token`.
static PLAIN_FILENAME_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*(?:"((?:[^"\\]|\\.)*)"|([^;]+))"#).ok()
});

/// Extract the attachment filename from a `Content-Disposition` header.
///
/// `filename*` wins over `filename` when both are present. The result is
/// reduced to a base name so a hostile header cannot smuggle a path.
#[must_use]
pub fn parse_content_disposition_filename(header: &str) -> Option<String> {
    let name = extended_filename(header)
        .and_then(|name| base_name(&name))
        .or_else(|| plain_filename(header).and_then(|name| base_name(&name)))?;
    debug!("Content-Disposition filename: {}", name);
    Some(name)
}

/// Save name for a conversion result.
///
/// Uses the header filename when it parses, otherwise `converted.<format>`.
#[must_use]
pub fn resolve_save_filename(header: Option<&str>, format: ConversionFormat) -> String {
    header
        .and_then(parse_content_disposition_filename)
        .unwrap_or_else(|| format!("converted.{format}"))
}

fn extended_filename(header: &str) -> Option<String> {
    let re = EXTENDED_FILENAME_RE.as_ref()?;
    let raw = re.captures(header)?.get(1)?.as_str().trim();

    // charset'language'percent-encoded-value
    let mut parts = raw.splitn(3, '\'');
    let (charset, encoded) = match (parts.next(), parts.next(), parts.next()) {
        (Some(charset), Some(_lang), Some(value)) => (charset, value),
        _ => ("utf-8", raw),
    };

    if charset.eq_ignore_ascii_case("iso-8859-1") {
        let bytes = urlencoding::decode_binary(encoded.as_bytes());
        return Some(bytes.iter().map(|&b| char::from(b)).collect());
    }
    urlencoding::decode(encoded).ok().map(|decoded| decoded.into_owned())
}

fn plain_filename(header: &str) -> Option<String> {
    let re = PLAIN_FILENAME_RE.as_ref()?;
    let caps = re.captures(header)?;
    let value = if let Some(quoted) = caps.get(1) {
        unescape_quoted(quoted.as_str())
    } else {
        caps.get(2)?.as_str().trim().to_string()
    };

    // Some servers percent-encode the plain parameter too.
    match urlencoding::decode(&value) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(value),
    }
}

fn unescape_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn base_name(name: &str) -> Option<String> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>();
    let base = base.trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_filename() {
        assert_eq!(
            parse_content_disposition_filename(r#"attachment; filename="clip (1).mp4""#),
            Some("clip (1).mp4".to_string())
        );
    }

    #[test]
    fn test_extended_filename() {
        assert_eq!(
            parse_content_disposition_filename("attachment; filename*=UTF-8''clip%20(1).mp4"),
            Some("clip (1).mp4".to_string())
        );
    }

    #[test]
    fn test_unquoted_filename() {
        assert_eq!(
            parse_content_disposition_filename("attachment; filename=song_converted.mp3"),
            Some("song_converted.mp3".to_string())
        );
    }

    #[test]
    fn test_extended_wins_over_plain() {
        let header = r#"attachment; filename="caf_.mp3"; filename*=UTF-8''caf%C3%A9.mp3"#;
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("café.mp3".to_string())
        );
    }

    #[test]
    fn test_extended_latin1() {
        assert_eq!(
            parse_content_disposition_filename("attachment; filename*=iso-8859-1'en'caf%E9.wav"),
            Some("café.wav".to_string())
        );
    }

    #[test]
    fn test_case_insensitive_parameter_name() {
        assert_eq!(
            parse_content_disposition_filename(r#"Attachment; FILENAME="Out.MKV""#),
            Some("Out.MKV".to_string())
        );
    }

    #[test]
    fn test_escaped_quote_in_filename() {
        assert_eq!(
            parse_content_disposition_filename(r#"attachment; filename="say \"hi\".ogg""#),
            Some(r#"say "hi".ogg"#.to_string())
        );
    }

    #[test]
    fn test_path_components_are_stripped() {
        assert_eq!(
            parse_content_disposition_filename(r#"attachment; filename="../../etc/passwd""#),
            Some("passwd".to_string())
        );
        assert_eq!(
            parse_content_disposition_filename(r#"attachment; filename="C:\\temp\\x.mp4""#),
            Some("x.mp4".to_string())
        );
    }

    #[test]
    fn test_malformed_headers_yield_none() {
        for header in [
            "",
            "attachment",
            "inline; name=\"x.mp4\"",
            "attachment; filename=\"\"",
            "attachment; filename=..",
        ] {
            assert_eq!(parse_content_disposition_filename(header), None, "{header:?}");
        }
    }

    #[test]
    fn test_unusable_extended_name_falls_back_to_plain() {
        for extended in ["..", "%2E%2E", "%01%02", "dir%2F"] {
            let header = format!("attachment; filename*=UTF-8''{extended}; filename=\"plain.mp3\"");
            assert_eq!(
                parse_content_disposition_filename(&header),
                Some("plain.mp3".to_string()),
                "{header:?}"
            );
        }
    }

    #[test]
    fn test_invalid_utf8_extended_falls_back_to_plain() {
        let header = "attachment; filename*=UTF-8''%FF%FE.mp3; filename=\"fallback.mp3\"";
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("fallback.mp3".to_string())
        );
    }

    #[test]
    fn test_resolve_save_filename_fallback() {
        assert_eq!(
            resolve_save_filename(None, ConversionFormat::Mp3),
            "converted.mp3"
        );
        assert_eq!(
            resolve_save_filename(Some("attachment"), ConversionFormat::Webm),
            "converted.webm"
        );
        assert_eq!(
            resolve_save_filename(
                Some(r#"attachment; filename="clip (1).mp4""#),
                ConversionFormat::Mp4
            ),
            "clip (1).mp4"
        );
    }
}
