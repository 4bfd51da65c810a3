//! MJPEG frame extraction from an unbounded byte stream.
//!
//! The feed is a raw concatenation of JPEG images with no length prefix or
//! boundary header, so frames are delimited purely by the JPEG markers:
//! `FF D8` opens an image and `FF D9` closes it. [`FrameExtractor`]
//! accumulates transport chunks and emits every complete marker-delimited
//! range, in end-marker order, independent of how the bytes were split
//! across chunks.
//!
//! The parser is a small tagged-state machine with explicit scan offsets:
//! a marker search never revisits bytes it has already rejected, so total
//! work is linear in bytes seen even though input arrives incrementally.

use bytes::Bytes;
use tracing::{debug, trace};

use crate::types::{EOI, SOI, StillFrame};

/// Default cap on buffered, not-yet-matched bytes (4 MiB).
///
/// A feed that never produces a valid marker pair would otherwise grow the
/// buffer without bound. Exceeding the cap discards the buffer entirely;
/// the feed is self-healing, so extraction recovers at the next complete
/// frame.
pub const DEFAULT_MAX_BUFFER: usize = 4 * 1024 * 1024;

/// Where the scan left off between calls.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ScanState {
    /// Looking for the next start marker.
    SeekStart,
    /// Start marker found at `start`; looking for the end marker.
    SeekEnd { start: usize },
}

/// Stateful demultiplexer turning byte chunks into complete JPEG frames.
///
/// Feed it chunks in arrival order via [`consume`](Self::consume); it
/// returns the frames completed by each chunk, zero or more per call.
#[derive(Debug)]
pub struct FrameExtractor {
    buffer: Vec<u8>,
    state: ScanState,
    /// Offset into `buffer` where marker scanning resumes. Bytes before it
    /// have already been rejected for the current state.
    scan_from: usize,
    max_buffer: usize,
    next_frame_number: u64,
}

impl FrameExtractor {
    /// Create an extractor with the given buffer cap in bytes.
    pub fn new(max_buffer: usize) -> Self {
        Self {
            buffer: Vec::new(),
            state: ScanState::SeekStart,
            scan_from: 0,
            max_buffer,
            next_frame_number: 0,
        }
    }

    /// Append the next transport chunk and return every frame it completes.
    ///
    /// Frames come back in the order their end markers appeared. A chunk
    /// that completes no frame returns an empty vec; the partial bytes are
    /// retained for the next call, up to the buffer cap.
    pub fn consume(&mut self, chunk: &[u8]) -> Vec<StillFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        loop {
            match self.state {
                ScanState::SeekStart => {
                    match find_marker(&self.buffer, self.scan_from, SOI) {
                        Some(start) => {
                            self.state = ScanState::SeekEnd { start };
                            self.scan_from = start + 2;
                        }
                        None => {
                            // Keep the trailing byte: it may be the first
                            // half of a marker split across chunks.
                            self.scan_from = self.buffer.len().saturating_sub(1);
                            break;
                        }
                    }
                }
                ScanState::SeekEnd { start } => {
                    match find_marker(&self.buffer, self.scan_from.max(start + 2), EOI) {
                        Some(end) => {
                            let frame_end = end + 2;
                            let data = Bytes::copy_from_slice(&self.buffer[start..frame_end]);
                            trace!(
                                frame_number = self.next_frame_number,
                                len = data.len(),
                                "frame extracted"
                            );
                            frames.push(StillFrame::new(data, self.next_frame_number));
                            self.next_frame_number += 1;

                            self.buffer.drain(..frame_end);
                            self.state = ScanState::SeekStart;
                            self.scan_from = 0;
                        }
                        None => {
                            self.scan_from = self.buffer.len().saturating_sub(1).max(start + 2);
                            break;
                        }
                    }
                }
            }
        }

        // Bound enforcement happens after scanning so a chunk that both
        // completes frames and overflows still yields those frames.
        if self.buffer.len() > self.max_buffer {
            debug!(
                buffered = self.buffer.len(),
                max = self.max_buffer,
                "parse buffer exceeded cap, discarding"
            );
            self.reset();
        }

        frames
    }

    /// Drop all buffered bytes and restart from a clean state. Frame
    /// numbering continues across resets.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = ScanState::SeekStart;
        self.scan_from = 0;
    }

    /// Bytes currently buffered awaiting a frame boundary.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BUFFER)
    }
}

/// Find a two-byte marker at or after `from`.
fn find_marker(buf: &[u8], from: usize, marker: [u8; 2]) -> Option<usize> {
    if from >= buf.len() {
        return None;
    }
    buf[from..].windows(2).position(|w| w == marker).map(|p| p + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(payload: &[u8]) -> Vec<u8> {
        let mut out = SOI.to_vec();
        out.extend_from_slice(payload);
        out.extend_from_slice(&EOI);
        out
    }

    #[test]
    fn single_frame_split_across_two_chunks() {
        // Scenario: [FF D8 AA BB] then [FF D9 CC].
        let mut extractor = FrameExtractor::default();

        assert!(extractor.consume(&[0xFF, 0xD8, 0xAA, 0xBB]).is_empty());
        let frames = extractor.consume(&[0xFF, 0xD9, 0xCC]);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_ref(), &[0xFF, 0xD8, 0xAA, 0xBB, 0xFF, 0xD9]);
        assert_eq!(extractor.buffered(), &[0xCC]);
    }

    #[test]
    fn two_frames_back_to_back_in_one_chunk() {
        let mut extractor = FrameExtractor::default();
        let mut chunk = jpeg(b"one");
        chunk.extend_from_slice(&jpeg(b"two"));

        let frames = extractor.consume(&chunk);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data.as_ref(), jpeg(b"one").as_slice());
        assert_eq!(frames[1].data.as_ref(), jpeg(b"two").as_slice());
        assert_eq!(frames[0].frame_number, 0);
        assert_eq!(frames[1].frame_number, 1);
    }

    #[test]
    fn start_marker_split_across_chunks() {
        let mut extractor = FrameExtractor::default();

        assert!(extractor.consume(&[0x00, 0xFF]).is_empty());
        assert!(extractor.consume(&[0xD8, 0x11]).is_empty());
        let frames = extractor.consume(&[0xFF, 0xD9]);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_ref(), &[0xFF, 0xD8, 0x11, 0xFF, 0xD9]);
    }

    #[test]
    fn end_marker_split_across_chunks() {
        let mut extractor = FrameExtractor::default();

        assert!(extractor.consume(&[0xFF, 0xD8, 0x22, 0xFF]).is_empty());
        let frames = extractor.consume(&[0xD9]);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_ref(), &[0xFF, 0xD8, 0x22, 0xFF, 0xD9]);
    }

    #[test]
    fn end_marker_before_any_start_marker_stalls() {
        let mut extractor = FrameExtractor::default();

        assert!(extractor.consume(&[0xFF, 0xD9, 0x00]).is_empty());

        // A later well-formed range still extracts.
        let frames = extractor.consume(&jpeg(b"ok"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_ref(), jpeg(b"ok").as_slice());
    }

    #[test]
    fn garbage_before_start_marker_is_not_included() {
        let mut extractor = FrameExtractor::default();
        let mut chunk = vec![0x01, 0x02, 0x03];
        chunk.extend_from_slice(&jpeg(b"x"));

        let frames = extractor.consume(&chunk);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_ref(), jpeg(b"x").as_slice());
    }

    #[test]
    fn byte_at_a_time_delivery() {
        let mut extractor = FrameExtractor::default();
        let frame = jpeg(b"slow feed");

        let mut collected = Vec::new();
        for &byte in &frame {
            collected.extend(extractor.consume(&[byte]));
        }

        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].data.as_ref(), frame.as_slice());
    }

    #[test]
    fn overflow_discards_buffer_and_recovers() {
        let mut extractor = FrameExtractor::new(64);

        // Open a frame that never ends until the cap trips.
        assert!(extractor.consume(&[0xFF, 0xD8]).is_empty());
        assert!(extractor.consume(&[0x00; 128]).is_empty());
        assert!(extractor.buffered().is_empty(), "buffer should reset after overflow");

        // Subsequent well-formed ranges still extract.
        let frames = extractor.consume(&jpeg(b"recovered"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_ref(), jpeg(b"recovered").as_slice());
    }

    #[test]
    fn frame_numbers_continue_across_reset() {
        let mut extractor = FrameExtractor::new(16);

        let first = extractor.consume(&jpeg(b"a"));
        assert_eq!(first[0].frame_number, 0);

        // Force an overflow reset.
        extractor.consume(&[0xFF, 0xD8]);
        extractor.consume(&[0x00; 32]);

        let second = extractor.consume(&jpeg(b"b"));
        assert_eq!(second[0].frame_number, 1);
    }

    #[test]
    fn overflowing_chunk_still_yields_its_complete_frames() {
        let mut extractor = FrameExtractor::new(32);

        // One complete frame followed by an unterminated tail larger than
        // the cap, all in one chunk.
        let mut chunk = jpeg(b"kept");
        chunk.extend_from_slice(&[0xFF, 0xD8]);
        chunk.extend_from_slice(&[0x00; 64]);

        let frames = extractor.consume(&chunk);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_ref(), jpeg(b"kept").as_slice());
        assert!(extractor.buffered().is_empty());
    }

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        // Payloads avoid 0xFF so generated ranges contain exactly one
        // marker pair each.
        prop_compose! {
            fn arb_payload()(bytes in prop::collection::vec(0u8..0xFF, 0..64)) -> Vec<u8> {
                bytes
            }
        }

        prop_compose! {
            fn arb_frames()(payloads in prop::collection::vec(arb_payload(), 1..8)) -> Vec<Vec<u8>> {
                payloads.into_iter().map(|p| jpeg(&p)).collect()
            }
        }

        proptest! {
            #[test]
            fn chunk_boundary_independence(
                frames in arb_frames(),
                cut_seed in any::<u64>(),
            ) {
                // Concatenate all frames, then split the byte stream at
                // pseudo-random points. The extractor must emit exactly the
                // same frames in order, whatever the chunking.
                let stream: Vec<u8> = frames.iter().flatten().copied().collect();

                let mut extractor = FrameExtractor::default();
                let mut emitted = Vec::new();
                let mut pos = 0usize;
                let mut seed = cut_seed;
                while pos < stream.len() {
                    seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                    let take = 1 + (seed as usize) % 7;
                    let end = (pos + take).min(stream.len());
                    emitted.extend(extractor.consume(&stream[pos..end]));
                    pos = end;
                }

                prop_assert_eq!(emitted.len(), frames.len());
                for (got, want) in emitted.iter().zip(frames.iter()) {
                    prop_assert_eq!(got.data.as_ref(), want.as_slice());
                }
            }

            #[test]
            fn interleaved_garbage_never_corrupts_frames(
                frames in arb_frames(),
                garbage in prop::collection::vec(0u8..0xFF, 0..32),
            ) {
                // Garbage (no 0xFF bytes, so no spurious markers) between
                // ranges is skipped without affecting extraction.
                let mut stream = Vec::new();
                for frame in &frames {
                    stream.extend_from_slice(&garbage);
                    stream.extend_from_slice(frame);
                }

                let mut extractor = FrameExtractor::default();
                let emitted = extractor.consume(&stream);

                prop_assert_eq!(emitted.len(), frames.len());
                for (got, want) in emitted.iter().zip(frames.iter()) {
                    prop_assert_eq!(got.data.as_ref(), want.as_slice());
                }
            }
        }
    }
}
