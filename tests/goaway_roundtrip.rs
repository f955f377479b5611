//! End-to-end scenarios for the GOAWAY codec through the public API.

use wirebuf::{
    Buffer, ErrorCode, FRAME_HEADER_SIZE, Frame, GoAwayFrame, HeapAllocator, ObjectPool,
    STREAM_ID_MASK,
};

const FIXED_BODY: usize = 8;

fn decode(wire: &[u8], pool: &mut ObjectPool) -> GoAwayFrame {
    let mut buffer = Buffer::from_slice(wire);
    let header = wirebuf::FrameHeader::parse(buffer.as_slice()).expect("frame header");
    buffer.advance(FRAME_HEADER_SIZE).expect("skip header");
    GoAwayFrame::from_buffer(header.stream_id, buffer, pool).expect("decode body")
}

#[test]
fn exact_fit_frame_has_no_debug_data_and_minimal_length() {
    let mut pool = ObjectPool::new();
    let mut frame = GoAwayFrame::builder()
        .last_stream_id(5)
        .error_code(ErrorCode::NoError)
        .build(&mut pool);

    let mut wire = frame.encode(&HeapAllocator).expect("encode");
    assert_eq!(wire.remaining(), FRAME_HEADER_SIZE + FIXED_BODY);

    let decoded = decode(&wire.copy_to_vec(), &mut pool);
    assert_eq!(decoded.last_stream_id(), 5);
    assert_eq!(decoded.error_code(), ErrorCode::NoError);
    assert!(decoded.debug_data().is_none());
}

#[test]
fn saturated_identifier_with_debug_payload_round_trips_masked() {
    let mut pool = ObjectPool::new();
    let payload = [0x5Au8; 20];
    let mut frame = GoAwayFrame::builder()
        .last_stream_id(0x7FFF_FFFF)
        .error_code(ErrorCode::ProtocolError)
        .debug_data(Buffer::from_slice(&payload))
        .build(&mut pool);

    let mut wire = frame.encode(&HeapAllocator).expect("encode");
    assert_eq!(wire.remaining(), FRAME_HEADER_SIZE + FIXED_BODY + 20);

    let decoded = decode(&wire.copy_to_vec(), &mut pool);
    assert_eq!(decoded.last_stream_id(), 0x7FFF_FFFF & STREAM_ID_MASK);
    assert_eq!(
        decoded.debug_data().expect("debug payload").remaining(),
        20
    );
}

#[test]
fn unknown_wire_error_code_decodes_to_the_sentinel() {
    let mut pool = ObjectPool::new();
    let mut wire = vec![0x00, 0x00, 0x08, 0x07, 0x00, 0, 0, 0, 0];
    wire.extend_from_slice(&1u32.to_be_bytes());
    wire.extend_from_slice(&0xFFFF_FFF0u32.to_be_bytes());

    let decoded = decode(&wire, &mut pool);
    assert!(decoded.error_code().is_unknown());
    assert_eq!(decoded.error_code(), ErrorCode::Unknown(0xFFFF_FFF0));
}
