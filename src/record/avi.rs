//! Incremental MJPEG-in-AVI muxer.
//!
//! Recording samples are already JPEG-encoded, so the container work is
//! pure concatenation: each sample becomes one `00dc` chunk in the `movi`
//! list, and [`finish`](AviEncoder::finish) assembles RIFF headers, the
//! chunk list, and the `idx1` index into a single playable file. No
//! re-encoding happens anywhere in this module.
//!
//! Layout written:
//!
//! ```text
//! RIFF <size> AVI
//!   LIST hdrl
//!     avih                 main header
//!     LIST strl
//!       strh               stream header (vids/MJPG)
//!       strf               BITMAPINFOHEADER
//!   LIST movi
//!     00dc <jpeg> ...      one chunk per sample, even-padded
//!   idx1                   keyframe index (every JPEG is a keyframe)
//! ```

use bytes::Bytes;

use crate::error::{FeedError, Result};

const AVIF_HASINDEX: u32 = 0x0010;
const AVIIF_KEYFRAME: u32 = 0x0010;

/// Live media encoder for one recording session.
///
/// Accepts JPEG samples incrementally; `finish` is the only way to get the
/// artifact out, consuming the encoder (the session is destroyed on stop).
#[derive(Debug)]
pub struct AviEncoder {
    width: u32,
    height: u32,
    fps: u32,
    samples: Vec<Bytes>,
}

impl AviEncoder {
    /// Create an encoder for the given frame geometry and sample rate.
    ///
    /// Fails with [`FeedError::RecorderUnavailable`] when the geometry is
    /// unusable; the caller reverts to idle and surfaces a transient
    /// notice.
    pub fn new(width: u32, height: u32, fps: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FeedError::recorder_unavailable("surface has zero dimensions"));
        }
        Ok(Self { width, height, fps: fps.max(1), samples: Vec::new() })
    }

    /// Append one JPEG sample.
    pub fn push_sample(&mut self, jpeg: Bytes) {
        self.samples.push(jpeg);
    }

    /// Number of samples buffered so far.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Finalize: concatenate all buffered chunks into one AVI file.
    ///
    /// A recording with zero samples still produces a valid (empty-duration)
    /// file.
    pub fn finish(self) -> Bytes {
        let n = self.samples.len() as u32;
        let max_sample = self.samples.iter().map(Bytes::len).max().unwrap_or(0) as u32;

        // movi payload: 'movi' fourcc + one even-padded chunk per sample.
        let movi_body_len: usize =
            4 + self.samples.iter().map(|s| 8 + s.len() + (s.len() & 1)).sum::<usize>();
        let idx1_len = self.samples.len() * 16;

        // hdrl: 'hdrl' + avih chunk + strl list.
        const STRL_LEN: usize = 4 + (8 + 56) + (8 + 40);
        const HDRL_LEN: usize = 4 + (8 + 56) + (8 + STRL_LEN);

        let riff_len = 4 + (8 + HDRL_LEN) + (8 + movi_body_len) + (8 + idx1_len);
        let mut out = Vec::with_capacity(8 + riff_len);

        out.extend_from_slice(b"RIFF");
        put_u32(&mut out, riff_len as u32);
        out.extend_from_slice(b"AVI ");

        // hdrl list
        out.extend_from_slice(b"LIST");
        put_u32(&mut out, HDRL_LEN as u32);
        out.extend_from_slice(b"hdrl");

        // avih main header (14 dwords)
        out.extend_from_slice(b"avih");
        put_u32(&mut out, 56);
        put_u32(&mut out, 1_000_000 / self.fps); // microseconds per frame
        put_u32(&mut out, max_sample.saturating_mul(self.fps)); // max bytes/sec
        put_u32(&mut out, 0); // padding granularity
        put_u32(&mut out, AVIF_HASINDEX);
        put_u32(&mut out, n); // total frames
        put_u32(&mut out, 0); // initial frames
        put_u32(&mut out, 1); // streams
        put_u32(&mut out, max_sample); // suggested buffer size
        put_u32(&mut out, self.width);
        put_u32(&mut out, self.height);
        for _ in 0..4 {
            put_u32(&mut out, 0); // reserved
        }

        // strl list
        out.extend_from_slice(b"LIST");
        put_u32(&mut out, STRL_LEN as u32);
        out.extend_from_slice(b"strl");

        // strh stream header
        out.extend_from_slice(b"strh");
        put_u32(&mut out, 56);
        out.extend_from_slice(b"vids");
        out.extend_from_slice(b"MJPG");
        put_u32(&mut out, 0); // flags
        put_u32(&mut out, 0); // priority + language
        put_u32(&mut out, 0); // initial frames
        put_u32(&mut out, 1); // scale
        put_u32(&mut out, self.fps); // rate (fps = rate/scale)
        put_u32(&mut out, 0); // start
        put_u32(&mut out, n); // length in frames
        put_u32(&mut out, max_sample); // suggested buffer size
        put_u32(&mut out, u32::MAX); // quality: default
        put_u32(&mut out, 0); // sample size: varies
        // rcFrame
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, self.width as u16);
        put_u16(&mut out, self.height as u16);

        // strf: BITMAPINFOHEADER
        out.extend_from_slice(b"strf");
        put_u32(&mut out, 40);
        put_u32(&mut out, 40); // biSize
        put_u32(&mut out, self.width);
        put_u32(&mut out, self.height);
        put_u16(&mut out, 1); // planes
        put_u16(&mut out, 24); // bit count
        out.extend_from_slice(b"MJPG"); // compression
        put_u32(&mut out, self.width * self.height * 3); // size image
        put_u32(&mut out, 0); // x pels/meter
        put_u32(&mut out, 0); // y pels/meter
        put_u32(&mut out, 0); // colors used
        put_u32(&mut out, 0); // colors important

        // movi list
        out.extend_from_slice(b"LIST");
        put_u32(&mut out, movi_body_len as u32);
        out.extend_from_slice(b"movi");

        // Chunk offsets in idx1 are relative to the 'movi' fourcc.
        let mut offsets = Vec::with_capacity(self.samples.len());
        let mut offset = 4u32;
        for sample in &self.samples {
            offsets.push(offset);
            out.extend_from_slice(b"00dc");
            put_u32(&mut out, sample.len() as u32);
            out.extend_from_slice(sample);
            if sample.len() & 1 == 1 {
                out.push(0);
            }
            offset += 8 + sample.len() as u32 + (sample.len() as u32 & 1);
        }

        // idx1 index
        out.extend_from_slice(b"idx1");
        put_u32(&mut out, idx1_len as u32);
        for (sample, chunk_offset) in self.samples.iter().zip(offsets) {
            out.extend_from_slice(b"00dc");
            put_u32(&mut out, AVIIF_KEYFRAME);
            put_u32(&mut out, chunk_offset);
            put_u32(&mut out, sample.len() as u32);
        }

        Bytes::from(out)
    }
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u32(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = AviEncoder::new(0, 480, 30).unwrap_err();
        assert!(matches!(err, FeedError::RecorderUnavailable { .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn empty_recording_is_a_valid_file() {
        let encoder = AviEncoder::new(640, 480, 30).unwrap();
        let file = encoder.finish();

        assert_eq!(&file[0..4], b"RIFF");
        assert_eq!(&file[8..12], b"AVI ");
        // RIFF size field covers everything after the first 8 bytes.
        assert_eq!(read_u32(&file, 4) as usize, file.len() - 8);
        // Total frames in avih is zero.
        let avih_data = 12 + 8 + 4 + 8;
        assert_eq!(read_u32(&file, avih_data + 16), 0);
    }

    #[test]
    fn samples_land_in_movi_with_matching_index() {
        let mut encoder = AviEncoder::new(64, 48, 10).unwrap();
        encoder.push_sample(Bytes::from_static(&[0xFF, 0xD8, 0x01, 0xFF, 0xD9])); // odd length
        encoder.push_sample(Bytes::from_static(&[0xFF, 0xD8, 0x02, 0x03, 0xFF, 0xD9]));
        assert_eq!(encoder.sample_count(), 2);

        let file = encoder.finish();
        let file = file.as_ref();

        let movi = find(file, b"movi").expect("movi list present");
        // First chunk directly after the fourcc.
        assert_eq!(&file[movi + 4..movi + 8], b"00dc");
        assert_eq!(read_u32(file, movi + 8), 5);
        assert_eq!(&file[movi + 12..movi + 17], &[0xFF, 0xD8, 0x01, 0xFF, 0xD9]);
        // Odd chunk is padded, so the second chunk starts on an even offset.
        let second = movi + 4 + 8 + 5 + 1;
        assert_eq!(&file[second..second + 4], b"00dc");
        assert_eq!(read_u32(file, second + 4), 6);

        let idx1 = find(file, b"idx1").expect("index present");
        assert_eq!(read_u32(file, idx1 + 4), 2 * 16);
        // First entry: keyframe flag, offset 4 (relative to 'movi'), size 5.
        assert_eq!(read_u32(file, idx1 + 12), AVIIF_KEYFRAME);
        assert_eq!(read_u32(file, idx1 + 16), 4);
        assert_eq!(read_u32(file, idx1 + 20), 5);
    }

    #[test]
    fn stream_header_declares_mjpg() {
        let encoder = AviEncoder::new(320, 240, 25).unwrap();
        let file = encoder.finish();
        let strh = find(&file, b"strh").expect("strh present");
        assert_eq!(&file[strh + 8..strh + 12], b"vids");
        assert_eq!(&file[strh + 12..strh + 16], b"MJPG");
        // rate/scale = 25/1
        assert_eq!(read_u32(&file, strh + 28), 1);
        assert_eq!(read_u32(&file, strh + 32), 25);
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }
}
