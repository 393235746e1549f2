use super::{cookie, sample, T};
use crate::*;
use byteorder::{ByteOrder, LittleEndian};

fn le_u32(buf: &[u8], at: usize) -> u32 {
    LittleEndian::read_u32(&buf[at..at + 4])
}

fn le_f64(buf: &[u8], at: usize) -> f64 {
    LittleEndian::read_f64(&buf[at..at + 8])
}

// -------------------- Encode layout --------------------

#[test]
fn header_is_56_bytes() {
    assert_eq!(RECORD_HEADER_BYTES, 56);
}

#[test]
fn encode_lays_out_header_and_strings() {
    let rec = sample();
    let buf = encode_record(&rec).unwrap();

    // 56 + "example.com\0" + "id\0" + "/\0" + "123\0"
    assert_eq!(buf.len(), 56 + 12 + 3 + 2 + 4);
    assert_eq!(le_u32(&buf, 0) as usize, buf.len());
    assert!(buf[4..16].iter().all(|&b| b == 0));

    assert_eq!(le_u32(&buf, 16), 56);
    assert_eq!(le_u32(&buf, 20), 68);
    assert_eq!(le_u32(&buf, 24), 71);
    assert_eq!(le_u32(&buf, 28), 73);
    assert!(buf[32..40].iter().all(|&b| b == 0));

    assert_eq!(le_f64(&buf, 40), T + 3600.0 - EPOCH_OFFSET);
    assert_eq!(le_f64(&buf, 48), T - EPOCH_OFFSET);

    assert_eq!(&buf[56..], b"example.com\0id\0/\0123\0");
}

#[test]
fn encoded_len_matches_encoding() {
    let rec = cookie(".news.example.org", "session", "/account", "a=b&c=d");
    assert_eq!(rec.encoded_len(), encode_record(&rec).unwrap().len());
}

// -------------------- Round trips --------------------

#[test]
fn decode_encoded_record() {
    let rec = sample();
    let buf = encode_record(&rec).unwrap();
    let back = decode_record(&buf, 0, buf.len()).unwrap();
    assert_eq!(back, rec);
    assert!(back.expires > back.created);
}

#[test]
fn zero_size_means_rest_of_buffer() {
    let rec = sample();
    let buf = encode_record(&rec).unwrap();
    assert_eq!(decode_record(&buf, 0, 0).unwrap(), rec);
}

#[test]
fn decode_at_offset() {
    let rec = cookie("a.test", "n", "/p", "v");
    let encoded = encode_record(&rec).unwrap();
    let mut buf = vec![0xAA; 5];
    buf.extend_from_slice(&encoded);
    buf.extend_from_slice(&[0xBB; 3]);

    assert_eq!(decode_record(&buf, 5, encoded.len()).unwrap(), rec);
}

#[test]
fn empty_strings_roundtrip() {
    let rec = cookie("", "", "", "");
    let buf = encode_record(&rec).unwrap();
    assert_eq!(buf.len(), RECORD_HEADER_BYTES + 4);
    assert_eq!(decode_record(&buf, 0, 0).unwrap(), rec);
}

#[test]
fn utf8_strings_roundtrip() {
    let rec = cookie("bücher.example", "naïve", "/ü", "✓");
    let buf = encode_record(&rec).unwrap();
    assert_eq!(decode_record(&buf, 0, 0).unwrap(), rec);
}

#[test]
fn decode_follows_offsets_not_order() {
    // Strings stored value-first; offsets still resolve each field.
    let mut buf = vec![0u8; RECORD_HEADER_BYTES];
    let strings: &[u8] = b"v\0/\0n\0d.test\0";
    buf.extend_from_slice(strings);
    let total = buf.len() as u32;
    LittleEndian::write_u32(&mut buf[0..4], total);
    LittleEndian::write_u32(&mut buf[16..20], 62); // domain
    LittleEndian::write_u32(&mut buf[20..24], 60); // name
    LittleEndian::write_u32(&mut buf[24..28], 58); // path
    LittleEndian::write_u32(&mut buf[28..32], 56); // value

    let rec = decode_record(&buf, 0, 0).unwrap();
    assert_eq!(rec.domain, "d.test");
    assert_eq!(rec.name, "n");
    assert_eq!(rec.path, "/");
    assert_eq!(rec.value, "v");
    assert_eq!(rec.created, Timestamp::from_native_seconds(0.0));
}

#[test]
fn fractional_timestamps_reencode_byte_for_byte() {
    // Laid out the way encode_record does, with fractional native times.
    let strings: &[u8] = b"www.example.net\0sid\0/\0ab12\0";
    let mut buf = vec![0u8; RECORD_HEADER_BYTES];
    buf.extend_from_slice(strings);
    let total = buf.len() as u32;
    LittleEndian::write_u32(&mut buf[0..4], total);
    LittleEndian::write_u32(&mut buf[16..20], 56);
    LittleEndian::write_u32(&mut buf[20..24], 72);
    LittleEndian::write_u32(&mut buf[24..28], 76);
    LittleEndian::write_u32(&mut buf[28..32], 78);
    LittleEndian::write_f64(&mut buf[40..48], 757_382_400.123_456_7);
    LittleEndian::write_f64(&mut buf[48..56], 725_846_400.987_654_3);

    let rec = decode_record(&buf, 0, 0).unwrap();
    assert_eq!(rec.domain, "www.example.net");
    assert_eq!(rec.value, "ab12");
    assert_eq!(encode_record(&rec).unwrap(), buf);
}

// -------------------- Validation --------------------

#[test]
fn size_mismatch_is_rejected() {
    let buf = encode_record(&sample()).unwrap();
    let err = decode_record(&buf, 0, buf.len() + 1).unwrap_err();
    assert_eq!(
        err,
        CodecError::SizeMismatch {
            declared: buf.len() as u32,
            expected: buf.len() + 1
        }
    );
}

#[test]
fn truncated_record_is_size_mismatch() {
    let buf = encode_record(&sample()).unwrap();
    let short = &buf[..60];
    assert!(matches!(
        decode_record(short, 0, 0),
        Err(CodecError::SizeMismatch { expected: 60, .. })
    ));
}

#[test]
fn declared_size_past_buffer_is_out_of_input() {
    let buf = encode_record(&sample()).unwrap();
    let short = &buf[..60];
    assert!(matches!(
        decode_record(short, 0, buf.len()),
        Err(CodecError::OutOfInput { .. })
    ));
}

#[test]
fn missing_terminator_fails_closed() {
    let mut buf = encode_record(&sample()).unwrap();
    let last = buf.len() - 1;
    buf[last] = b'4';
    // Trailing bytes after the record must not be read as string data.
    let mut padded = buf.clone();
    padded.extend_from_slice(b"\0\0");

    assert_eq!(
        decode_record(&padded, 0, buf.len()),
        Err(CodecError::UnterminatedString {
            field: Field::Value
        })
    );
}

#[test]
fn string_offset_past_record_is_out_of_input() {
    let mut buf = encode_record(&sample()).unwrap();
    LittleEndian::write_u32(&mut buf[20..24], 500);
    assert!(matches!(
        decode_record(&buf, 0, 0),
        Err(CodecError::OutOfInput { .. })
    ));
}

#[test]
fn string_offset_at_record_end_is_unterminated() {
    let mut buf = encode_record(&sample()).unwrap();
    let end = buf.len() as u32;
    LittleEndian::write_u32(&mut buf[24..28], end);
    assert_eq!(
        decode_record(&buf, 0, 0),
        Err(CodecError::UnterminatedString { field: Field::Path })
    );
}

#[test]
fn invalid_utf8_is_rejected() {
    let mut buf = encode_record(&sample()).unwrap();
    buf[56] = 0xff;
    assert_eq!(
        decode_record(&buf, 0, 0),
        Err(CodecError::InvalidUtf8 {
            field: Field::Domain
        })
    );
}

#[test]
fn encode_rejects_embedded_nul() {
    let rec = cookie("example.com", "id", "/", "12\u{0}3");
    assert_eq!(
        encode_record(&rec),
        Err(CodecError::EmbeddedTerminator { index: 2 })
    );
}

#[test]
fn field_accessor_matches_struct() {
    let rec = sample();
    let got: Vec<&str> = Field::ALL.iter().map(|&f| rec.field(f)).collect();
    assert_eq!(got, vec!["example.com", "id", "/", "123"]);
    assert_eq!(Field::Domain.to_string(), "domain");
}
