//! UTF-16 length-prefixed string codec tests.

use adhoc_protocol::error::ProtocolError;
use adhoc_protocol::strcodec::{decode_from_slice, encode_to_vec, StringDecoder};

#[test]
fn hi_encodes_to_length_prefix_plus_two_varint_units() {
    let out = encode_to_vec("Hi");
    assert_eq!(out, vec![0x02, 0x48, 0x69]);
}

#[test]
fn empty_string_is_just_a_zero_length_prefix() {
    let out = encode_to_vec("");
    assert_eq!(out, vec![0x00]);
}

#[test]
fn roundtrip_ascii_unicode_and_surrogate_pairs() {
    for s in ["Hi", "hello, world", "\u{1F600}\u{1F680}", "caf\u{e9}", ""] {
        let out = encode_to_vec(s);
        let (decoded, rest) = decode_from_slice(&out, 1000).unwrap();
        assert_eq!(decoded, s);
        assert!(rest.is_empty());
    }
}

#[test]
fn decoder_rejects_length_beyond_max_chars() {
    let out = encode_to_vec("abcdef");
    let err = decode_from_slice(&out, 3).unwrap_err();
    assert!(matches!(err, ProtocolError::Overflow(_)));
}

#[test]
fn suspends_byte_by_byte_and_resumes_to_same_result() {
    let out = encode_to_vec("resumable streaming string");
    let mut decoder = StringDecoder::new(1000);
    let mut result = None;
    for &byte in &out {
        result = decoder.push_byte(byte).unwrap();
        if result.is_some() {
            break;
        }
    }
    assert_eq!(result, Some("resumable streaming string".to_string()));
}
