//! Unit tests for the Stop/Invoke pipeline: partial-read resumability,
//! multi-unit chunks, malformed input, and the write path.

use super::{Filter, FilterContext, GoAwayFilter, PipelineDriver, ReadOutcome};
use crate::{
    buffer::{Buffer, HeapAllocator},
    error::WirebufError,
    frame::{
        ErrorCode, FRAME_HEADER_SIZE, Frame, FrameError, GoAwayFrame,
        goaway::{GOAWAY_FIXED_BODY_SIZE, GOAWAY_TYPE},
    },
    pool::ObjectPool,
};

fn driver() -> PipelineDriver<GoAwayFilter> {
    PipelineDriver::new(GoAwayFilter::new(), Box::new(HeapAllocator))
}

fn encoded_goaway(last_stream_id: u32, code: ErrorCode, debug: &[u8]) -> Vec<u8> {
    let mut pool = ObjectPool::new();
    let mut builder = GoAwayFrame::builder()
        .last_stream_id(last_stream_id)
        .error_code(code);
    if !debug.is_empty() {
        builder = builder.debug_data(Buffer::from_slice(debug));
    }
    let mut frame = builder.build(&mut pool);
    frame
        .encode(&HeapAllocator)
        .expect("encode frame")
        .copy_to_vec()
}

#[test]
fn whole_frame_in_one_chunk_produces_one_message() {
    let mut driver = driver();
    let wire = encoded_goaway(5, ErrorCode::NoError, &[]);

    let messages = driver.push(Buffer::from_slice(&wire)).expect("push");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].last_stream_id(), 5);
    assert_eq!(driver.pending_len(), 0);
}

#[test]
fn short_input_stops_and_retains_exactly_the_given_bytes() {
    let mut driver = driver();
    let wire = encoded_goaway(1, ErrorCode::Cancel, b"why");

    let messages = driver
        .push(Buffer::from_slice(&wire[..6]))
        .expect("partial push");
    assert!(messages.is_empty());
    assert_eq!(driver.pending_len(), 6);
}

#[test]
fn frame_split_at_every_offset_decodes_identically() {
    let wire = encoded_goaway(42, ErrorCode::EnhanceYourCalm, b"slow down please");

    for split in 1..wire.len() {
        let mut driver = driver();

        let first = driver
            .push(Buffer::from_slice(&wire[..split]))
            .unwrap_or_else(|e| panic!("first push at offset {split}: {e}"));
        assert!(first.is_empty(), "early message at offset {split}");
        assert_eq!(driver.pending_len(), split, "retained bytes at offset {split}");

        let second = driver
            .push(Buffer::from_slice(&wire[split..]))
            .unwrap_or_else(|e| panic!("second push at offset {split}: {e}"));
        assert_eq!(second.len(), 1, "message count at offset {split}");

        let frame = &second[0];
        assert_eq!(frame.last_stream_id(), 42);
        assert_eq!(frame.error_code(), ErrorCode::EnhanceYourCalm);
        assert_eq!(
            frame.debug_data().expect("debug payload").as_slice(),
            b"slow down please"
        );
        assert_eq!(driver.pending_len(), 0);
    }
}

#[test]
fn two_frames_in_one_chunk_both_surface() {
    let mut driver = driver();
    let mut wire = encoded_goaway(1, ErrorCode::NoError, &[]);
    wire.extend(encoded_goaway(2, ErrorCode::ProtocolError, b"dbg"));

    let messages = driver.push(Buffer::from_slice(&wire)).expect("push");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].last_stream_id(), 1);
    assert_eq!(messages[1].last_stream_id(), 2);
    assert_eq!(messages[1].error_code(), ErrorCode::ProtocolError);
    assert_eq!(driver.pending_len(), 0);
}

#[test]
fn frame_plus_partial_tail_keeps_the_tail_pending() {
    let mut driver = driver();
    let mut wire = encoded_goaway(9, ErrorCode::NoError, &[]);
    let next = encoded_goaway(10, ErrorCode::Cancel, &[]);
    wire.extend_from_slice(&next[..4]);

    let messages = driver.push(Buffer::from_slice(&wire)).expect("push");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].last_stream_id(), 9);
    assert_eq!(driver.pending_len(), 4);

    let rest = driver
        .push(Buffer::from_slice(&next[4..]))
        .expect("push tail");
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].last_stream_id(), 10);
}

#[test]
fn declared_length_below_fixed_body_is_connection_fatal() {
    let mut driver = driver();
    // Header declaring a 4-byte GOAWAY payload, which cannot hold the body.
    let wire = [0x00, 0x00, 0x04, GOAWAY_TYPE, 0x00, 0, 0, 0, 0, 0, 0, 0, 1];

    let result = driver.push(Buffer::from_slice(&wire));
    assert!(matches!(
        result,
        Err(WirebufError::Frame(FrameError::MalformedLength {
            frame_type: GOAWAY_TYPE,
            declared: 4,
            minimum: GOAWAY_FIXED_BODY_SIZE,
        }))
    ));
}

#[test]
fn foreign_frame_type_is_rejected() {
    let mut driver = driver();
    let wire = [0x00, 0x00, 0x08, 0x4, 0x00, 0, 0, 0, 0, 0, 0, 0, 0];

    let result = driver.push(Buffer::from_slice(&wire));
    assert!(matches!(
        result,
        Err(WirebufError::Frame(FrameError::UnexpectedType {
            actual: 0x4,
            expected: GOAWAY_TYPE,
        }))
    ));
}

#[test]
fn stop_outcome_carries_the_input_back_unchanged() {
    let mut filter = GoAwayFilter::new();
    let mut ctx = FilterContext::new(Box::new(HeapAllocator));
    let input = Buffer::from_slice(&[0x00, 0x00]);

    match filter.handle_read(&mut ctx, input).expect("read") {
        ReadOutcome::NeedMoreData(retained) => {
            assert_eq!(retained.as_slice(), &[0x00, 0x00]);
        }
        ReadOutcome::Produced { .. } => panic!("two bytes cannot produce a frame"),
    }
}

#[test]
fn write_path_serialises_and_recycles_the_frame() {
    let mut driver = driver();
    let frame = GoAwayFrame::builder()
        .last_stream_id(77)
        .error_code(ErrorCode::InternalError)
        .debug_data(Buffer::from_slice(b"shutting down"))
        .build(driver.context_mut().pool_mut());

    let mut wire = driver.write(frame).expect("write");
    assert!(wire.is_composite());
    assert_eq!(
        wire.remaining(),
        FRAME_HEADER_SIZE + GOAWAY_FIXED_BODY_SIZE + 13
    );
    // The serialised frame went back to the pool, reset.
    assert_eq!(driver.context_mut().pool_mut().cached::<GoAwayFrame>(), 1);

    // And the bytes decode back to the same message.
    let bytes = wire.copy_to_vec();
    let decoded = driver.push(Buffer::from_slice(&bytes)).expect("decode back");
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].last_stream_id(), 77);
    assert_eq!(decoded[0].error_code(), ErrorCode::InternalError);
}
