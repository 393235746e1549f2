use crate::*;
use byteorder::{BigEndian, LittleEndian};

// -------------------- Fixed-width integers --------------------

#[test]
fn read_u32_in_both_orders() {
    let buf = [0x00, 0x00, 0x01, 0x00];
    assert_eq!(Reader::new(&buf).read_u32::<BigEndian>().unwrap(), 256);
    assert_eq!(Reader::new(&buf).read_u32::<LittleEndian>().unwrap(), 0x0001_0000);
}

#[test]
fn read_u32_advances_cursor() {
    let buf = [1, 0, 0, 0, 2, 0, 0, 0];
    let mut r = Reader::new(&buf);
    assert_eq!(r.read_u32::<LittleEndian>().unwrap(), 1);
    assert_eq!(r.position(), 4);
    assert_eq!(r.read_u32::<LittleEndian>().unwrap(), 2);
    assert!(r.is_at_end());
}

#[test]
fn read_u32_out_of_input() {
    let buf = [0u8; 3];
    let err = Reader::at(&buf, 1).read_u32::<BigEndian>().unwrap_err();
    assert_eq!(
        err,
        CodecError::OutOfInput {
            position: 1,
            wanted: 4,
            available: 2
        }
    );
}

#[test]
fn reader_positioned_past_end_fails() {
    let buf = [0u8; 4];
    let mut r = Reader::at(&buf, 10);
    assert_eq!(r.remaining(), 0);
    assert!(matches!(r.read_bytes(1), Err(CodecError::OutOfInput { .. })));
    assert!(matches!(r.read_cstr(), Err(CodecError::OutOfInput { .. })));
}

#[test]
fn encode_u32_orders() {
    assert_eq!(encode_u32::<BigEndian>(256).unwrap(), [0, 0, 1, 0]);
    assert_eq!(encode_u32::<LittleEndian>(256).unwrap(), [0, 1, 0, 0]);
    assert_eq!(
        encode_u32::<LittleEndian>(i64::from(u32::MAX)).unwrap(),
        [0xff; 4]
    );
}

#[test]
fn encode_u32_rejects_negative() {
    assert_eq!(
        encode_u32::<BigEndian>(-1),
        Err(CodecError::NegativeValue { value: -1 })
    );
}

#[test]
fn encode_u32_rejects_overflow() {
    let too_big = i64::from(u32::MAX) + 1;
    assert_eq!(
        encode_u32::<LittleEndian>(too_big),
        Err(CodecError::ValueOverflow {
            value: too_big as u64
        })
    );
}

// -------------------- Raw bytes --------------------

#[test]
fn read_bytes_exact_and_array() {
    let buf = b"cook\x01\x02";
    let mut r = Reader::new(buf);
    assert_eq!(&r.read_array::<4>().unwrap(), b"cook");
    assert_eq!(r.read_bytes(2).unwrap(), &[1, 2]);
    assert!(r.read_bytes(1).is_err());
    assert_eq!(r.position(), 6);
}

#[test]
fn skip_consumes_padding() {
    let buf = [0u8; 12];
    let mut r = Reader::new(&buf);
    r.skip(12).unwrap();
    assert!(r.is_at_end());
    assert!(r.skip(1).is_err());
}

#[test]
fn writer_padding_and_bytes() {
    let mut w = Writer::new();
    assert!(w.is_empty());
    w.put_bytes(b"ab");
    w.put_padding(3);
    w.put_len::<BigEndian>(7).unwrap();
    assert_eq!(w.into_inner(), vec![b'a', b'b', 0, 0, 0, 0, 0, 0, 7]);
}

// -------------------- Zero-terminated strings --------------------

#[test]
fn read_cstr_stops_at_terminator() {
    let buf = b"hello\x00world";
    let mut r = Reader::new(buf);
    let s = r.read_cstr().unwrap();
    assert_eq!(s.bytes, b"hello");
    assert!(s.terminated);
    assert_eq!(r.position(), 6);
}

#[test]
fn read_cstr_without_terminator_runs_to_end() {
    let buf = b"hello";
    let mut r = Reader::new(buf);
    let s = r.read_cstr().unwrap();
    assert_eq!(s.bytes, b"hello");
    assert!(!s.terminated);
    assert_eq!(r.position(), 5);
}

#[test]
fn read_cstr_empty_string() {
    let buf = b"\x00rest";
    let s = Reader::new(buf).read_cstr().unwrap();
    assert!(s.bytes.is_empty());
    assert!(s.terminated);
}

#[test]
fn encode_cstr_appends_terminator() {
    assert_eq!(encode_cstr("id").unwrap(), b"id\x00".to_vec());
    assert_eq!(encode_cstr("").unwrap(), vec![0]);
}

#[test]
fn encode_cstr_rejects_embedded_nul() {
    assert_eq!(
        encode_cstr("ab\0c"),
        Err(CodecError::EmbeddedTerminator { index: 2 })
    );
}

// -------------------- Timestamps --------------------

#[test]
fn native_epoch_is_zero_on_disk() {
    let ts = Timestamp::from_unix_seconds(EPOCH_OFFSET);
    assert_eq!(encode_timestamp(ts), [0u8; 8]);
    assert_eq!(ts.native_seconds(), 0.0);
}

#[test]
fn timestamp_roundtrip_within_precision() {
    for t in [0.0, 1.5, -12_345.25, 0.1, 1_700_000_000.123, 4.0e12] {
        let bytes = encode_timestamp(Timestamp::from_unix_seconds(t));
        let back = Reader::new(&bytes).read_timestamp().unwrap().unix_seconds();
        let tolerance = (t.abs() + EPOCH_OFFSET) * f64::EPSILON * 2.0;
        assert!((back - t).abs() <= tolerance, "{t} came back as {back}");
    }
}

#[test]
fn integral_timestamps_roundtrip_exactly() {
    let ts = Timestamp::from_unix_seconds(1_700_000_000.0);
    let back = Reader::new(&encode_timestamp(ts)).read_timestamp().unwrap();
    assert_eq!(back, ts);
}

#[test]
fn native_timestamp_bytes_pass_through() {
    for native in [
        721_234_567.123_456_7_f64,
        0.1,
        -3.3e-5,
        1.0e-300,
        694_224_000.987_654_3,
    ] {
        let bytes = native.to_le_bytes();
        let ts = Reader::new(&bytes).read_timestamp().unwrap();
        assert_eq!(ts.native_seconds().to_bits(), native.to_bits());
        assert_eq!(encode_timestamp(ts), bytes);
    }
}

#[test]
fn unix_seconds_derived_from_native() {
    let ts = Timestamp::from_native_seconds(10.5);
    assert_eq!(ts.unix_seconds(), EPOCH_OFFSET + 10.5);
    assert_eq!(Timestamp::from_unix_seconds(EPOCH_OFFSET + 10.5), ts);
}

#[test]
fn timestamp_to_datetime() {
    let ts = Timestamp::from_native_seconds(0.0);
    let dt = ts.to_datetime().unwrap();
    assert_eq!(dt.year(), 2001);
    assert_eq!(dt.hour(), 8);
    assert_eq!(ts.to_string(), "2001-01-01T08:00:00Z");
}

#[test]
fn non_finite_timestamp_has_no_datetime() {
    assert!(Timestamp::from_unix_seconds(f64::NAN).to_datetime().is_none());
    assert!(Timestamp::from_unix_seconds(f64::INFINITY)
        .to_datetime()
        .is_none());
    assert_eq!(Timestamp::from_unix_seconds(f64::INFINITY).to_string(), "infs");
}
