//! Utility functions for feed retrieval: URL checks, body decoding and XML repair.

use std::io::Read;
use tracing::debug;

use crate::TARGET_WEB_REQUEST;

/// Helper function to validate a URL
pub fn is_valid_url(url: &str) -> bool {
    if let Ok(parsed) = url::Url::parse(url) {
        parsed.scheme() == "http" || parsed.scheme() == "https"
    } else {
        false
    }
}

/// Clean up malformed XML so a second parse attempt has a chance.
pub fn cleanup_xml(xml: &str) -> String {
    let mut cleaned = xml.trim().trim_start_matches('\u{FEFF}').to_string();

    // Drop anything in front of the document proper
    if let Some(start) = ["<?xml", "<rss", "<feed", "<rdf:RDF"]
        .iter()
        .filter_map(|marker| cleaned.find(marker))
        .min()
    {
        cleaned = cleaned[start..].to_string();
    }

    // HTML entities that are not defined in XML
    cleaned = cleaned
        .replace("&nbsp;", "&#160;")
        .replace("&ndash;", "&#8211;")
        .replace("&mdash;", "&#8212;")
        .replace("&rsquo;", "&#8217;")
        .replace("&lsquo;", "&#8216;")
        .replace("&rdquo;", "&#8221;")
        .replace("&ldquo;", "&#8220;")
        .replace("&hellip;", "&#8230;")
        .replace("&eacute;", "&#233;")
        .replace("&egrave;", "&#232;")
        .replace("&agrave;", "&#224;")
        .replace("&ccedil;", "&#231;")
        .replace("&amp;amp;", "&amp;")
        .replace("&apos;", "&#39;");

    // Characters outside the XML 1.0 range
    cleaned = cleaned
        .chars()
        .filter(|&c| {
            matches!(c,
                '\u{0009}' |
                '\u{000A}' |
                '\u{000D}' |
                '\u{0020}'..='\u{D7FF}' |
                '\u{E000}'..='\u{FFFD}' |
                '\u{10000}'..='\u{10FFFF}'
            )
        })
        .collect();

    if !cleaned.starts_with("<?xml") {
        cleaned = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", cleaned);
    }

    cleaned
}

/// Undo transport compression that reqwest did not already handle. Brotli is
/// only attempted when the server announced it; gzip and zlib are recognised
/// by their magic bytes and raw deflate only when announced. Falls back to
/// the original bytes.
pub fn decompress_body(bytes: &[u8], content_encoding: Option<&str>, url: &str) -> Vec<u8> {
    if content_encoding == Some("br") {
        let mut decoded = Vec::new();
        let mut reader = brotli::Decompressor::new(bytes, 4096);
        if reader.read_to_end(&mut decoded).is_ok() && !decoded.is_empty() {
            debug!(target: TARGET_WEB_REQUEST, "Decompressed brotli content from {}", url);
            return decoded;
        }
        debug!(target: TARGET_WEB_REQUEST, "Brotli decompression failed for {}, trying other methods", url);
    }

    if bytes.starts_with(&[0x1f, 0x8b]) {
        let mut decoded = Vec::new();
        if flate2::read::GzDecoder::new(bytes)
            .read_to_end(&mut decoded)
            .is_ok()
            && !decoded.is_empty()
        {
            debug!(target: TARGET_WEB_REQUEST, "Decompressed gzip content from {}", url);
            return decoded;
        }
    }

    if bytes.first() == Some(&0x78) {
        let mut decoded = Vec::new();
        if flate2::read::ZlibDecoder::new(bytes)
            .read_to_end(&mut decoded)
            .is_ok()
            && !decoded.is_empty()
        {
            debug!(target: TARGET_WEB_REQUEST, "Decompressed zlib content from {}", url);
            return decoded;
        }
    }

    if content_encoding == Some("deflate") {
        let mut decoded = Vec::new();
        if flate2::read::DeflateDecoder::new(bytes)
            .read_to_end(&mut decoded)
            .is_ok()
            && !decoded.is_empty()
        {
            debug!(target: TARGET_WEB_REQUEST, "Decompressed deflate content from {}", url);
            return decoded;
        }
    }

    bytes.to_vec()
}

/// Decode a response body to text. UTF-8 first, then the charset announced in
/// the Content-Type header, then windows-1252 which accepts any byte sequence.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let announced = content_type.and_then(|ct| {
        ct.split(';')
            .find(|part| part.trim().to_lowercase().starts_with("charset="))
            .and_then(|part| part.split('=').nth(1))
            .and_then(|label| encoding_rs::Encoding::for_label(label.trim().as_bytes()))
    });

    let encoding = announced.unwrap_or(encoding_rs::WINDOWS_1252);
    debug!(target: TARGET_WEB_REQUEST, "Body is not UTF-8, decoding as {}", encoding.name());
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}
