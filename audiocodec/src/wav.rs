//! In-memory RIFF/WAVE container for mono PCM, A-law and u-law payloads.
//!
//! A [`Wav`] starts out editable and accumulates payload bytes. The first
//! export (or an explicit [`Wav::freeze`]) builds the header and freezes the
//! container; from then on writes fail with [`WavError::NotEditable`].
//! Containers parsed with [`Wav::from_bytes`] are frozen from the start and
//! borrow header and payload from the input buffer.
//!
//! Header layout (little-endian):
//!
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0x00   | 4    | `"RIFF"`                                |
//! | 0x04   | 4    | file size - 8                           |
//! | 0x08   | 4    | `"WAVE"`                                |
//! | 0x0c   | 4    | `"fmt "`                                |
//! | 0x10   | 4    | fmt size (16 for PCM, 30 otherwise)     |
//! | 0x14   | 2    | compression code (1, 6, 7)              |
//! | 0x16   | 2    | channels (1)                            |
//! | 0x18   | 4    | sample rate                             |
//! | 0x1c   | 4    | byte rate                               |
//! | 0x20   | 2    | block align                             |
//! | 0x22   | 2    | bits per sample                         |
//!
//! PCM continues with the `"data"` chunk at 0x24. Companded formats insert
//! a 2-byte extra-format size (12) and a `"fact"` chunk holding the sample
//! count before `"data"`.

use std::borrow::Cow;
use std::io::{self, Read};
use std::time::Duration;

use crate::codec::{Codec, CodecName};
use crate::error::WavError;

const RIFF_HEADER_SIZE: usize = 12;
const CHUNK_HEADER_SIZE: usize = 8;
const PCM_FMT_SIZE: usize = 16;
const FACT_CHUNK_SIZE: usize = 12;
const FACT_DATA_SIZE: u32 = 4;

/// In-memory WAV file.
#[derive(Debug, Clone)]
pub struct Wav<'a> {
    codec: Codec,
    state: State<'a>,
}

#[derive(Debug, Clone)]
enum State<'a> {
    Editable(Vec<u8>),
    Frozen {
        header: Cow<'a, [u8]>,
        data: Cow<'a, [u8]>,
    },
}

impl Wav<'static> {
    /// Creates an empty, editable container for `codec` payloads.
    pub fn new(codec: Codec) -> Self {
        Self {
            codec,
            state: State::Editable(Vec::new()),
        }
    }
}

impl<'a> Wav<'a> {
    /// Parses a WAV file without copying its payload.
    ///
    /// Unknown chunks are skipped. Only mono PCM (1), A-law (6) and
    /// u-law (7) are accepted.
    pub fn from_bytes(b: &'a [u8]) -> Result<Self, WavError> {
        if b.len() < RIFF_HEADER_SIZE || &b[0..4] != b"RIFF" || &b[8..12] != b"WAVE" {
            return Err(WavError::Invalid);
        }

        let mut codec = None;
        let mut data = None;

        let n = b.len();
        let mut i = RIFF_HEADER_SIZE;
        while i + CHUNK_HEADER_SIZE <= n {
            let id = &b[i..i + 4];
            let size = read_u32(b, i + 4);
            let start = i + CHUNK_HEADER_SIZE;
            let end = start
                .checked_add(size as usize)
                .filter(|end| *end <= n)
                .ok_or(WavError::Truncated)?;

            match id {
                b"fmt " => codec = Some(parse_fmt(&b[start..end], size)?),
                b"data" => data = Some((start, size as usize)),
                _ => {}
            }

            // Chunks are word aligned; the declared size stays odd.
            i = end + (size as usize & 1);
        }

        let codec = codec.ok_or(WavError::MissingFmtChunk)?;
        let (start, size) = data.ok_or(WavError::MissingDataChunk)?;
        if size > n - start {
            return Err(WavError::Truncated);
        }

        Ok(Self {
            codec,
            state: State::Frozen {
                header: Cow::Borrowed(&b[..start]),
                data: Cow::Borrowed(&b[start..start + size]),
            },
        })
    }

    /// The codec describing the payload.
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Raw payload bytes.
    pub fn data(&self) -> &[u8] {
        match &self.state {
            State::Editable(data) => &data[..],
            State::Frozen { data, .. } => &data[..],
        }
    }

    /// Payload size in bytes.
    pub fn data_size(&self) -> usize {
        self.data().len()
    }

    /// Payload duration, see [`Codec::duration_for_size`].
    pub fn duration(&self) -> Duration {
        self.codec.duration_for_size(self.data_size())
    }

    /// Returns true until the header has been built.
    pub fn is_editable(&self) -> bool {
        matches!(self.state, State::Editable(_))
    }

    /// Appends payload bytes.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, WavError> {
        match &mut self.state {
            State::Editable(data) => {
                data.extend_from_slice(bytes);
                Ok(bytes.len())
            }
            State::Frozen { .. } => Err(WavError::NotEditable),
        }
    }

    /// Builds the header if needed and freezes the container.
    pub fn freeze(&mut self) {
        if let State::Editable(data) = &mut self.state {
            let data = std::mem::take(data);
            let header = build_header(&self.codec, data.len());
            self.state = State::Frozen {
                header: Cow::Owned(header),
                data: Cow::Owned(data),
            };
        }
    }

    /// Header bytes. Freezes the container.
    pub fn header(&mut self) -> &[u8] {
        self.freeze();
        match &self.state {
            State::Frozen { header, .. } => &header[..],
            State::Editable(_) => unreachable!("freeze leaves the container frozen"),
        }
    }

    fn parts(&mut self) -> (&[u8], &[u8]) {
        self.freeze();
        match &self.state {
            State::Frozen { header, data } => (&header[..], &data[..]),
            State::Editable(_) => unreachable!("freeze leaves the container frozen"),
        }
    }

    /// Writes header then payload to `sink`, returning the number of bytes
    /// written. Freezes the container.
    pub fn export_to<W: io::Write + ?Sized>(&mut self, sink: &mut W) -> Result<usize, WavError> {
        let (header, data) = self.parts();
        sink.write_all(header)?;
        sink.write_all(data)?;
        Ok(header.len() + data.len())
    }

    /// Complete file bytes. Freezes the container.
    pub fn to_vec(&mut self) -> Vec<u8> {
        let (header, data) = self.parts();
        let mut out = Vec::with_capacity(header.len() + data.len());
        out.extend_from_slice(header);
        out.extend_from_slice(data);
        out
    }

    /// Sequential reader over header then payload. Freezes the container.
    pub fn reader(&mut self) -> impl Read + '_ {
        let (header, data) = self.parts();
        header.chain(data)
    }

    /// Detaches the container from the buffer it was parsed from.
    pub fn into_owned(self) -> Wav<'static> {
        let state = match self.state {
            State::Editable(data) => State::Editable(data),
            State::Frozen { header, data } => State::Frozen {
                header: Cow::Owned(header.into_owned()),
                data: Cow::Owned(data.into_owned()),
            },
        };
        Wav {
            codec: self.codec,
            state,
        }
    }
}

impl io::Write for Wav<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Wav::write(self, buf).map_err(|e| io::Error::new(io::ErrorKind::PermissionDenied, e))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn read_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn read_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn parse_fmt(payload: &[u8], size: u32) -> Result<Codec, WavError> {
    if (size as usize) < PCM_FMT_SIZE {
        return Err(WavError::InvalidFmtChunk { size });
    }

    let format_tag = read_u16(payload, 0);
    let channels = read_u16(payload, 2);
    let sample_rate = read_u32(payload, 4);
    let bits_per_sample = read_u16(payload, 14);

    let name = CodecName::from_format_tag(format_tag).ok_or(WavError::UnsupportedFormat(format_tag))?;
    if channels != 1 {
        return Err(WavError::StereoNotSupported(channels));
    }

    Ok(Codec::new(name, sample_rate, bits_per_sample as u32)?)
}

/// Size of the `fmt ` chunk including its 8-byte chunk header.
///
/// For companded formats the declared fmt size also spans the trailing
/// `fact` chunk, which keeps the header byte-compatible with existing
/// captures.
fn fmt_chunk_size(codec: &Codec) -> usize {
    if codec.name().is_pcm() {
        CHUNK_HEADER_SIZE + PCM_FMT_SIZE
    } else {
        CHUNK_HEADER_SIZE + PCM_FMT_SIZE + 2 + FACT_CHUNK_SIZE
    }
}

fn build_header(codec: &Codec, data_len: usize) -> Vec<u8> {
    let fmt_size = fmt_chunk_size(codec);
    let header_len = RIFF_HEADER_SIZE + fmt_size + CHUNK_HEADER_SIZE;
    let riff_size = header_len + data_len;

    let mut h = Vec::with_capacity(header_len);
    h.extend_from_slice(b"RIFF");
    h.extend_from_slice(&((riff_size - 8) as u32).to_le_bytes());
    h.extend_from_slice(b"WAVE");

    h.extend_from_slice(b"fmt ");
    h.extend_from_slice(&((fmt_size - CHUNK_HEADER_SIZE) as u32).to_le_bytes());
    h.extend_from_slice(&codec.name().format_tag().to_le_bytes());
    h.extend_from_slice(&1u16.to_le_bytes());
    h.extend_from_slice(&codec.sample_rate().to_le_bytes());
    h.extend_from_slice(&(codec.size_for_duration(Duration::from_secs(1)) as u32).to_le_bytes());
    h.extend_from_slice(&(codec.sample_size() as u16).to_le_bytes());
    h.extend_from_slice(&(codec.bit_rate() as u16).to_le_bytes());

    if !codec.name().is_pcm() {
        h.extend_from_slice(&(FACT_CHUNK_SIZE as u16).to_le_bytes());
        h.extend_from_slice(b"fact");
        h.extend_from_slice(&FACT_DATA_SIZE.to_le_bytes());
        h.extend_from_slice(&(codec.sample_count_for_size(data_len) as u32).to_le_bytes());
    }

    h.extend_from_slice(b"data");
    h.extend_from_slice(&(data_len as u32).to_le_bytes());

    debug_assert_eq!(h.len(), header_len);
    h
}
