use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSnapshot {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: malformed input")]
    Malformed { encoding: String },
}

/// Decode a saved page into UTF-8 using: BOM -> charset hint -> chardetng guess.
///
/// `charset_hint` accepts a bare label (`utf-8`) or a Content-Type value
/// (`text/html; charset=utf-8`).
pub fn decode_snapshot(
    bytes: &[u8],
    charset_hint: Option<&str>,
) -> Result<DecodedSnapshot, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(enc) = charset_hint
        .map(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_label(hint: &str) -> &str {
    hint.split(';')
        .map(str::trim)
        .find_map(|part| {
            part.split_once('=')
                .filter(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
                .map(|(_, value)| value.trim_matches([' ', '"', '\''].as_ref()))
        })
        .unwrap_or_else(|| hint.trim())
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedSnapshot, DecodeError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::Malformed {
            encoding: enc.name().to_string(),
        });
    }
    Ok(DecodedSnapshot {
        html: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}
