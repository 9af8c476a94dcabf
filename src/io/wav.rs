//! Minimal WAV container for raw 16-bit PCM narration.

/// Sample rate assumed when the MIME type does not declare one
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Highest sample rate accepted from a MIME type; anything above falls back to the default
pub const MAX_SAMPLE_RATE: u32 = 384_000;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const HEADER_LEN: usize = 44;

/// Read the `rate=` parameter from a MIME type such as `audio/L16;codec=pcm;rate=24000`
pub fn parse_sample_rate(mime_type: &str) -> u32 {
    mime_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("rate"))
        .and_then(|(_, value)| value.trim().parse::<u32>().ok())
        .filter(|rate| (1..=MAX_SAMPLE_RATE).contains(rate))
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}

/// Wrap mono 16-bit little-endian PCM in a canonical 44-byte-header WAV file
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate.saturating_mul(u32::from(block_align));
    let data_len = u32::try_from(pcm.len()).unwrap_or(u32::MAX);

    let mut wav = Vec::with_capacity(HEADER_LEN + pcm.len());

    // RIFF [4] + size [4] + WAVE [4]
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&data_len.saturating_add(36).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk: PCM, 16 bytes
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&CHANNELS.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);

    wav
}
