//! Decoded-and-validated audio payloads.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, Source};

use crate::error::AudioError;

/// Encoded audio bytes that are known to decode, plus the probed format.
///
/// Cloning shares the underlying buffer.
#[derive(Debug, Clone)]
pub struct AudioClip {
    bytes: Arc<[u8]>,
    channels: u16,
    sample_rate: u32,
    duration: Option<Duration>,
}

impl AudioClip {
    /// Probe `bytes` with rodio's decoder and keep them if they decode.
    pub fn decode(bytes: impl Into<Arc<[u8]>>) -> Result<Self, AudioError> {
        let bytes: Arc<[u8]> = bytes.into();
        let decoder = Decoder::new(Cursor::new(bytes.clone()))
            .map_err(|e| AudioError::Decode(e.to_string()))?;

        Ok(Self {
            channels: decoder.channels(),
            sample_rate: decoder.sample_rate(),
            duration: decoder.total_duration(),
            bytes,
        })
    }

    /// A fresh decoder over the shared bytes, ready to append to a sink.
    pub fn source(&self) -> Result<Decoder<Cursor<Arc<[u8]>>>, AudioError> {
        Decoder::new(Cursor::new(self.bytes.clone())).map_err(|e| AudioError::Decode(e.to_string()))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocadrill_core::wav::write_wav;

    #[test]
    fn decodes_wav() {
        let clip = AudioClip::decode(write_wav(&vec![0i16; 2400], 24_000)).unwrap();
        assert_eq!(clip.channels(), 1);
        assert_eq!(clip.sample_rate(), 24_000);
        assert_eq!(clip.bytes().len(), 44 + 4800);
        assert_eq!(clip.duration(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn rejects_garbage() {
        let err = AudioClip::decode(b"definitely not audio".to_vec()).unwrap_err();
        assert!(matches!(err, AudioError::Decode(_)));
    }

    #[test]
    fn clones_share_bytes() {
        let clip = AudioClip::decode(write_wav(&[1, 2, 3], 16_000)).unwrap();
        let other = clip.clone();
        assert!(std::ptr::eq(clip.bytes().as_ptr(), other.bytes().as_ptr()));
        assert!(other.source().is_ok());
    }
}
