//! Stream reassembly tests for spa core

use bytes::Bytes;
use spa_core::{Command, Frame, FrameReassembler, MessageId, SpaTime, ToggleItem};

fn sample_stream() -> (Vec<u8>, Vec<Bytes>) {
    let frames: Vec<Bytes> = vec![
        Command::ConfigRequest.encode().unwrap().into_bytes(),
        Frame::encode(MessageId::STATUS, &[0x7E; 24]).unwrap().into_bytes(),
        Command::Toggle(ToggleItem::Pump1).encode().unwrap().into_bytes(),
        Command::SetTime {
            time: SpaTime::new(7, 30),
            time_24h: false,
        }
        .encode()
        .unwrap()
        .into_bytes(),
        Frame::encode(MessageId::CONFIG_RESPONSE, &[0xAB; 25])
            .unwrap()
            .into_bytes(),
    ];

    let stream = frames.iter().flat_map(|f| f.iter().copied()).collect();
    (stream, frames)
}

fn reassemble(chunks: &[&[u8]]) -> Vec<Bytes> {
    let mut reassembler = FrameReassembler::new();
    let mut out = Vec::new();
    for chunk in chunks {
        reassembler.feed(chunk);
        out.extend(reassembler.drain());
    }
    out
}

#[test]
fn test_single_read_many_frames() {
    let (stream, frames) = sample_stream();
    assert_eq!(reassemble(&[&stream]), frames);
}

#[test]
fn test_chunk_invariance_fixed_sizes() {
    let (stream, frames) = sample_stream();

    for size in 1..=stream.len() {
        let chunks: Vec<&[u8]> = stream.chunks(size).collect();
        assert_eq!(reassemble(&chunks), frames, "chunk size {}", size);
    }
}

#[test]
fn test_chunk_invariance_every_split_point() {
    let (stream, frames) = sample_stream();

    for a in 0..stream.len() {
        for b in a..stream.len() {
            let chunks = [&stream[..a], &stream[a..b], &stream[b..]];
            assert_eq!(reassemble(&chunks), frames, "split at {} / {}", a, b);
        }
    }
}

#[test]
fn test_leading_garbage_discarded() {
    let valid = Command::ConfigRequest.encode().unwrap().into_bytes();
    let mut stream = vec![0x01, 0x02];
    stream.extend_from_slice(&valid);

    let frames = reassemble(&[&stream]);
    assert_eq!(frames, vec![valid.clone()]);

    // Same garbage trickled one byte at a time
    let chunks: Vec<&[u8]> = stream.chunks(1).collect();
    assert_eq!(reassemble(&chunks), vec![valid]);
}

#[test]
fn test_garbage_between_frames() {
    let (stream, frames) = sample_stream();
    let mut noisy = vec![0x55, 0x66];
    let first_len = frames[0].len();
    noisy.extend_from_slice(&stream[..first_len]);
    noisy.extend_from_slice(&[0x00, 0x11, 0x22]);
    noisy.extend_from_slice(&stream[first_len..]);

    assert_eq!(reassemble(&[&noisy]), frames);

    let chunks: Vec<&[u8]> = noisy.chunks(3).collect();
    assert_eq!(reassemble(&chunks), frames);
}

#[test]
fn test_partial_frame_stays_pending() {
    let frame = Command::FilterConfigRequest.encode().unwrap().into_bytes();
    let mut reassembler = FrameReassembler::new();

    reassembler.feed(&frame[..frame.len() - 1]);
    assert_eq!(reassembler.drain().count(), 0);
    assert_eq!(reassembler.pending_len(), frame.len() - 1);

    reassembler.feed(&frame[frame.len() - 1..]);
    let out: Vec<_> = reassembler.drain().collect();
    assert_eq!(out, vec![frame]);
    assert_eq!(reassembler.pending_len(), 0);
}

#[test]
fn test_corrupted_length_recovers() {
    let (stream, frames) = sample_stream();
    let mut corrupted = stream.clone();
    // Claim the first frame is longer than it is
    corrupted[1] = 0x09;

    let out = reassemble(&[&corrupted]);
    assert_eq!(out, frames[1..].to_vec());
}
