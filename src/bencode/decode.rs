use std::ops::Range;

use crate::bencode::error::BencodeError;
use crate::bencode::value::{Dictionary, Value};

/// Default bound for nested lists and dictionaries.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Result of decoding one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub value: Value,
    /// Offset of the first byte after the decoded value.
    pub next_offset: usize,
    /// Byte range of the first value found under the capture key, if any.
    pub span: Option<Range<usize>>,
}

/// Recursive bencode decoder over a borrowed buffer.
///
/// The decoder holds no state between calls.
/// A captured span is returned upwards from nested calls and the first one found wins.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    buffer: &'a [u8],
    capture_key: Option<&'a [u8]>,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            capture_key: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Record the byte span of the value stored under this dictionary key.
    #[must_use]
    pub const fn capture_key(mut self, key: &'a [u8]) -> Self {
        self.capture_key = Some(key);
        self
    }

    /// Maximum number of nested lists and dictionaries.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Decode the value starting at `offset`.
    ///
    /// # Errors
    /// Returns a [`BencodeError`] if the input is truncated, malformed, or nested too deep.
    pub fn decode_at(&self, offset: usize) -> Result<Decoded, BencodeError> {
        self.decode_value(offset, 0, self.capture_key.is_some())
    }

    /// Decode the buffer from the start, requiring a dictionary at the top level.
    ///
    /// Bytes after the top-level value are ignored.
    ///
    /// # Errors
    /// Returns a [`BencodeError`] if decoding fails or the top-level value is not a dictionary.
    pub fn decode_dictionary(&self) -> Result<(Dictionary, Option<Range<usize>>), BencodeError> {
        let decoded = self.decode_at(0)?;
        match decoded.value {
            Value::Dictionary(dictionary) => Ok((dictionary, decoded.span)),
            _ => Err(BencodeError::format(0, "top-level value is not a dictionary")),
        }
    }

    fn decode_value(&self, offset: usize, depth: usize, capture: bool) -> Result<Decoded, BencodeError> {
        match self.buffer.get(offset) {
            None => Err(BencodeError::Truncated { offset }),
            Some(b'i') => {
                let (number, next_offset) = self.decode_integer(offset)?;
                Ok(Decoded {
                    value: Value::Integer(number),
                    next_offset,
                    span: None,
                })
            }
            Some(b'l') => self.decode_list(offset, depth + 1, capture),
            Some(b'd') => self.decode_dict(offset, depth + 1, capture),
            Some(b'0'..=b'9') => {
                let (bytes, next_offset) = self.decode_bytes(offset)?;
                Ok(Decoded {
                    value: Value::Bytes(bytes.to_vec()),
                    next_offset,
                    span: None,
                })
            }
            Some(&byte) => Err(BencodeError::format(
                offset,
                format!("invalid prefix {:?}", char::from(byte)),
            )),
        }
    }

    /// Parse `i<digits>e` starting at the `i`.
    fn decode_integer(&self, offset: usize) -> Result<(i64, usize), BencodeError> {
        let start = offset + 1;
        let end = self.buffer[start..]
            .iter()
            .position(|&byte| byte == b'e')
            .map(|position| start + position)
            .ok_or(BencodeError::Truncated {
                offset: self.buffer.len(),
            })?;

        let text = &self.buffer[start..end];
        let digits = text.strip_prefix(b"-").unwrap_or(text);
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Err(BencodeError::format(start, "malformed integer"));
        }
        if digits.len() > 1 && digits[0] == b'0' {
            return Err(BencodeError::format(start, "integer has leading zeros"));
        }
        if digits.len() < text.len() && digits == b"0" {
            return Err(BencodeError::format(start, "negative zero"));
        }

        let number = std::str::from_utf8(text)
            .ok()
            .and_then(|text| text.parse::<i64>().ok())
            .ok_or_else(|| BencodeError::format(start, "integer out of range"))?;

        Ok((number, end + 1))
    }

    /// Parse `<length>:<bytes>` starting at the first length digit.
    fn decode_bytes(&self, offset: usize) -> Result<(&'a [u8], usize), BencodeError> {
        let digit_count = self.buffer[offset..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count();
        let colon = offset + digit_count;

        match self.buffer.get(colon) {
            None => return Err(BencodeError::Truncated { offset: colon }),
            Some(b':') => {}
            Some(_) => return Err(BencodeError::format(colon, "invalid byte string length prefix")),
        }

        let length = std::str::from_utf8(&self.buffer[offset..colon])
            .ok()
            .and_then(|text| text.parse::<usize>().ok())
            .ok_or_else(|| BencodeError::format(offset, "byte string length out of range"))?;

        let start = colon + 1;
        let end = start
            .checked_add(length)
            .filter(|&end| end <= self.buffer.len())
            .ok_or(BencodeError::Truncated {
                offset: self.buffer.len(),
            })?;

        Ok((&self.buffer[start..end], end))
    }

    fn decode_list(&self, offset: usize, depth: usize, capture: bool) -> Result<Decoded, BencodeError> {
        self.check_depth(offset, depth)?;

        let mut list = Vec::new();
        let mut span = None;
        let mut position = offset + 1;
        loop {
            match self.buffer.get(position) {
                None => return Err(BencodeError::Truncated { offset: position }),
                Some(b'e') => break,
                Some(_) => {
                    let item = self.decode_value(position, depth, capture)?;
                    span = span.or(item.span);
                    list.push(item.value);
                    position = item.next_offset;
                }
            }
        }

        Ok(Decoded {
            value: Value::List(list),
            next_offset: position + 1,
            span,
        })
    }

    fn decode_dict(&self, offset: usize, depth: usize, capture: bool) -> Result<Decoded, BencodeError> {
        self.check_depth(offset, depth)?;

        let mut dictionary = Dictionary::new();
        let mut span = None;
        let mut position = offset + 1;
        loop {
            match self.buffer.get(position) {
                None => return Err(BencodeError::Truncated { offset: position }),
                Some(b'e') => break,
                Some(b'0'..=b'9') => {}
                Some(&byte) => {
                    return Err(BencodeError::format(
                        position,
                        format!("dictionary key must be a byte string, found {:?}", char::from(byte)),
                    ));
                }
            }

            let (key, value_start) = self.decode_bytes(position)?;
            if dictionary.contains_key(key) {
                return Err(BencodeError::format(position, "duplicate dictionary key"));
            }
            let item = if capture && self.capture_key == Some(key) {
                // Nothing below the captured value is searched further.
                let item = self.decode_value(value_start, depth, false)?;
                span = span.or(Some(value_start..item.next_offset));
                item
            } else {
                let item = self.decode_value(value_start, depth, capture)?;
                span = span.or_else(|| item.span.clone());
                item
            };

            dictionary.insert(key.to_vec(), item.value);
            position = item.next_offset;
        }

        Ok(Decoded {
            value: Value::Dictionary(dictionary),
            next_offset: position + 1,
            span,
        })
    }

    const fn check_depth(&self, offset: usize, depth: usize) -> Result<(), BencodeError> {
        if depth > self.max_depth {
            Err(BencodeError::DepthLimit {
                limit: self.max_depth,
                offset,
            })
        } else {
            Ok(())
        }
    }
}

/// Decode one value from `buffer` at `offset`,
/// optionally capturing the span of the value stored under `capture_key`.
///
/// # Errors
/// Returns a [`BencodeError`] if the input is truncated, malformed, or nested too deep.
pub fn decode(buffer: &[u8], offset: usize, capture_key: Option<&[u8]>) -> Result<Decoded, BencodeError> {
    let decoder = Decoder::new(buffer);
    match capture_key {
        Some(key) => decoder.capture_key(key).decode_at(offset),
        None => decoder.decode_at(offset),
    }
}

/// Decode a top-level dictionary and capture the span of the value under `capture_key`.
///
/// # Errors
/// Returns a [`BencodeError`] if decoding fails or the top-level value is not a dictionary.
pub fn decode_dictionary(
    buffer: &[u8],
    capture_key: &[u8],
) -> Result<(Dictionary, Option<Range<usize>>), BencodeError> {
    Decoder::new(buffer).capture_key(capture_key).decode_dictionary()
}

#[cfg(test)]
mod decode_tests {
    use super::*;

    use std::collections::HashMap;

    use serde_bencode::value::Value as OracleValue;

    fn decode_value(input: &[u8]) -> Result<Value, BencodeError> {
        decode(input, 0, None).map(|decoded| decoded.value)
    }

    fn to_oracle(value: &Value) -> OracleValue {
        match value {
            Value::Integer(number) => OracleValue::Int(*number),
            Value::Bytes(bytes) => OracleValue::Bytes(bytes.clone()),
            Value::List(list) => OracleValue::List(list.iter().map(to_oracle).collect()),
            Value::Dictionary(dictionary) => OracleValue::Dict(
                dictionary
                    .iter()
                    .map(|(key, value)| (key.clone(), to_oracle(value)))
                    .collect::<HashMap<_, _>>(),
            ),
        }
    }

    #[test]
    fn decodes_integers() {
        assert_eq!(decode_value(b"i0e"), Ok(Value::Integer(0)));
        assert_eq!(decode_value(b"i42e"), Ok(Value::Integer(42)));
        assert_eq!(decode_value(b"i-17e"), Ok(Value::Integer(-17)));
        assert_eq!(decode_value(b"i9223372036854775807e"), Ok(Value::Integer(i64::MAX)));
    }

    #[test]
    fn rejects_malformed_integers() {
        for input in [
            b"ie".as_slice(),
            b"i-e",
            b"i03e",
            b"i-0e",
            b"i1x2e",
            b"i99999999999999999999e",
        ] {
            let error = decode_value(input).expect_err("should fail");
            assert!(error.is_format(), "{input:?} gave {error:?}");
        }
    }

    #[test]
    fn unterminated_integer_is_truncated() {
        assert!(decode_value(b"i123").expect_err("should fail").is_truncated());
    }

    #[test]
    fn decodes_byte_strings() {
        assert_eq!(decode_value(b"4:spam"), Ok(Value::from("spam")));
        assert_eq!(decode_value(b"0:"), Ok(Value::Bytes(Vec::new())));
        assert_eq!(decode_value(b"2:\xff\x00"), Ok(Value::Bytes(vec![0xFF, 0x00])));
    }

    #[test]
    fn short_byte_string_is_truncated() {
        let error = decode_value(b"5:abcd").expect_err("should fail");
        assert_eq!(error, BencodeError::Truncated { offset: 6 });
    }

    #[test]
    fn missing_length_colon() {
        assert!(decode_value(b"12").expect_err("should fail").is_truncated());
        assert!(decode_value(b"3x abc").expect_err("should fail").is_format());
    }

    #[test]
    fn decodes_nested_lists() {
        let value = decode_value(b"li1el4:spamee").expect("should decode");
        assert_eq!(
            value,
            Value::List(vec![Value::Integer(1), Value::List(vec![Value::from("spam")])])
        );
    }

    #[test]
    fn unterminated_list_is_truncated() {
        assert!(decode_value(b"li1e").expect_err("should fail").is_truncated());
        assert!(decode_value(b"l").expect_err("should fail").is_truncated());
    }

    #[test]
    fn decodes_dictionary() {
        let value = decode_value(b"d3:cow3:moo4:spami3ee").expect("should decode");
        let dictionary = value.as_dictionary().expect("should be a dictionary");
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.get(b"cow".as_slice()), Some(&Value::from("moo")));
        assert_eq!(dictionary.get(b"spam".as_slice()), Some(&Value::Integer(3)));
    }

    #[test]
    fn integer_dictionary_key_is_format_error() {
        assert!(decode_value(b"di5ee").expect_err("should fail").is_format());
        assert!(decode_value(b"d i5e e").expect_err("should fail").is_format());
    }

    #[test]
    fn repeated_dictionary_key_is_format_error() {
        let error = decode_value(b"d3:cowi1e3:cowi2ee").expect_err("should fail");
        assert!(matches!(error, BencodeError::Format { offset: 9, .. }));
    }

    #[test]
    fn repeated_info_key_is_rejected() {
        let input = b"d4:infod6:lengthi1e4:name5:firste4:infod12:meta versioni2e4:name6:secondee";
        let error = decode_dictionary(input, b"info").expect_err("should fail");
        assert!(matches!(error, BencodeError::Format { offset: 33, .. }));
    }

    #[test]
    fn dictionary_key_without_value_is_truncated() {
        assert!(decode_value(b"d3:key").expect_err("should fail").is_truncated());
    }

    #[test]
    fn invalid_prefix_is_format_error() {
        let error = decode_value(b"x").expect_err("should fail");
        assert!(matches!(error, BencodeError::Format { offset: 0, .. }));
    }

    #[test]
    fn empty_input_is_truncated() {
        assert_eq!(decode_value(b""), Err(BencodeError::Truncated { offset: 0 }));
    }

    #[test]
    fn decodes_at_offset() {
        let decoded = decode(b"xxi5e3:abc", 2, None).expect("should decode");
        assert_eq!(decoded.value, Value::Integer(5));
        assert_eq!(decoded.next_offset, 5);
    }

    #[test]
    fn captures_exact_info_span() {
        let input = b"d8:announce8:http://a4:infod6:lengthi10e4:name5:a.txte7:comment2:hie";
        let (dictionary, span) = decode_dictionary(input, b"info").expect("should decode");
        let span = span.expect("info span should be captured");
        assert_eq!(&input[span], b"d6:lengthi10e4:name5:a.txte");
        assert!(dictionary.contains_key(b"comment".as_slice()));
    }

    #[test]
    fn span_is_not_captured_without_key() {
        let input = b"d4:infod4:name1:aee";
        let decoded = decode(input, 0, None).expect("should decode");
        assert!(decoded.span.is_none());
    }

    #[test]
    fn nested_capture_propagates_first_match() {
        let input = b"l1:xd4:infoi1eed4:infoi2eee";
        let decoded = decode(input, 0, Some(b"info")).expect("should decode");
        let span = decoded.span.expect("span should be captured");
        assert_eq!(&input[span], b"i1e");
    }

    #[test]
    fn missing_capture_key_yields_no_span() {
        let (_, span) = decode_dictionary(b"d4:name1:ae", b"info").expect("should decode");
        assert!(span.is_none());
    }

    #[test]
    fn top_level_must_be_dictionary() {
        assert!(decode_dictionary(b"li1ee", b"info").expect_err("should fail").is_format());
    }

    #[test]
    fn depth_limit_is_enforced() {
        let deep = format!("{}{}", "l".repeat(10), "e".repeat(10));
        assert!(Decoder::new(deep.as_bytes()).max_depth(10).decode_at(0).is_ok());
        assert_eq!(
            Decoder::new(deep.as_bytes()).max_depth(9).decode_at(0),
            Err(BencodeError::DepthLimit { limit: 9, offset: 9 })
        );
    }

    #[test]
    fn pathological_nesting_fails_without_overflow() {
        let deep = "l".repeat(100_000);
        let error = decode_value(deep.as_bytes()).expect_err("should fail");
        assert!(matches!(error, BencodeError::DepthLimit { .. }));
    }

    #[test]
    fn round_trips_through_independent_encoder() {
        let mut info = Dictionary::new();
        info.insert(b"name".to_vec(), Value::from("Movie (2001)"));
        info.insert(b"piece length".to_vec(), Value::Integer(262_144));
        info.insert(b"pieces".to_vec(), Value::Bytes(vec![0, 1, 2, 0xFE, 0xFF]));
        info.insert(
            b"files".to_vec(),
            Value::List(vec![Value::List(vec![Value::from("a"), Value::Integer(-3)])]),
        );
        let mut root = Dictionary::new();
        root.insert(b"info".to_vec(), Value::from(info));
        root.insert(b"announce".to_vec(), Value::from("udp://tracker:80"));
        root.insert(b"empty".to_vec(), Value::List(Vec::new()));
        let original = Value::from(root);

        let encoded = serde_bencode::to_bytes(&to_oracle(&original)).expect("oracle should encode");
        let decoded = decode(&encoded, 0, None).expect("should decode");

        assert_eq!(decoded.value, original);
        assert_eq!(decoded.next_offset, encoded.len());
    }
}
