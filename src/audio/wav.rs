//! Decoded PCM streams and WAV file I/O

use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use crate::error::{Wsb2WavError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Int8,
    Int16,
    Int24,
    Int32,
    Float32,
}

impl AudioFormat {
    pub fn name(&self) -> &'static str {
        match self {
            AudioFormat::Int8 => "int8",
            AudioFormat::Int16 => "int16",
            AudioFormat::Int24 => "int24",
            AudioFormat::Int32 => "int32",
            AudioFormat::Float32 => "float32",
        }
    }

    pub fn bits_per_sample(&self) -> u16 {
        match self {
            AudioFormat::Int8 => 8,
            AudioFormat::Int16 => 16,
            AudioFormat::Int24 => 24,
            AudioFormat::Int32 | AudioFormat::Float32 => 32,
        }
    }

    pub fn to_sample_format(self) -> SampleFormat {
        match self {
            AudioFormat::Float32 => SampleFormat::Float,
            _ => SampleFormat::Int,
        }
    }

    fn from_spec(spec: &WavSpec) -> Result<Self> {
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 8) => Ok(AudioFormat::Int8),
            (SampleFormat::Int, 16) => Ok(AudioFormat::Int16),
            (SampleFormat::Int, 24) => Ok(AudioFormat::Int24),
            (SampleFormat::Int, 32) => Ok(AudioFormat::Int32),
            (SampleFormat::Float, 32) => Ok(AudioFormat::Float32),
            (format, bits) => Err(Wsb2WavError::decode(format!(
                "Unsupported WAV sample format: {:?} {}-bit", format, bits
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioHeader {
    pub sample_rate: u32,
    pub channels: u16,
    pub format: AudioFormat,
}

impl AudioHeader {
    pub fn new(sample_rate: u32, channels: u16, format: AudioFormat) -> Self {
        Self { sample_rate, channels, format }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Wsb2WavError::decode("Sample rate cannot be 0"));
        }
        if self.channels == 0 {
            return Err(Wsb2WavError::decode("Channel count cannot be 0"));
        }
        Ok(())
    }

    pub fn to_wav_spec(&self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.format.bits_per_sample(),
            sample_format: self.format.to_sample_format(),
        }
    }
}

/// Interleaved PCM samples at their source bit depth.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioData {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    /// 24-bit samples, sign-extended
    Int24(Vec<i32>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
}

impl AudioData {
    /// Total interleaved sample count
    pub fn len(&self) -> usize {
        match self {
            AudioData::Int8(data) => data.len(),
            AudioData::Int16(data) => data.len(),
            AudioData::Int24(data) | AudioData::Int32(data) => data.len(),
            AudioData::Float32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> AudioFormat {
        match self {
            AudioData::Int8(_) => AudioFormat::Int8,
            AudioData::Int16(_) => AudioFormat::Int16,
            AudioData::Int24(_) => AudioFormat::Int24,
            AudioData::Int32(_) => AudioFormat::Int32,
            AudioData::Float32(_) => AudioFormat::Float32,
        }
    }
}

/// One decoded stream of a sound bank.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStream {
    pub id: String,
    pub header: AudioHeader,
    pub data: AudioData,
}

impl AudioStream {
    pub fn new(id: impl Into<String>, sample_rate: u32, channels: u16, data: AudioData) -> Self {
        let header = AudioHeader::new(sample_rate, channels, data.format());
        Self { id: id.into(), header, data }
    }

    pub fn sample_rate(&self) -> u32 {
        self.header.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.header.channels
    }

    pub fn format(&self) -> AudioFormat {
        self.header.format
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.data.len() / usize::from(self.header.channels.max(1))
    }

    pub fn duration(&self) -> f64 {
        if self.header.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.header.sample_rate)
    }

    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;

        if self.data.format() != self.header.format {
            return Err(Wsb2WavError::decode(format!(
                "Sample format mismatch: header shows {}, data is {}",
                self.header.format.name(), self.data.format().name()
            )));
        }

        if self.data.len() % usize::from(self.header.channels) != 0 {
            return Err(Wsb2WavError::decode(format!(
                "Sample count {} is not a multiple of {} channels",
                self.data.len(), self.header.channels
            )));
        }

        Ok(())
    }

    /// Decode a complete WAV file held in memory.
    pub fn from_wav_bytes(id: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        Self::from_reader(id, std::io::Cursor::new(bytes))
    }

    pub fn from_file<P: AsRef<Path>>(id: impl Into<String>, path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Wsb2WavError::io(format!(
            "Cannot open audio file {}: {}", path.display(), e
        )))?;
        Self::from_reader(id, std::io::BufReader::new(file))
    }

    fn from_reader<R: Read>(id: impl Into<String>, reader: R) -> Result<Self> {
        let mut reader = WavReader::new(reader)?;
        let spec = reader.spec();
        let format = AudioFormat::from_spec(&spec)?;

        let data = match format {
            AudioFormat::Int8 => AudioData::Int8(reader.samples::<i8>().collect::<std::result::Result<_, _>>()?),
            AudioFormat::Int16 => AudioData::Int16(reader.samples::<i16>().collect::<std::result::Result<_, _>>()?),
            AudioFormat::Int24 => AudioData::Int24(reader.samples::<i32>().collect::<std::result::Result<_, _>>()?),
            AudioFormat::Int32 => AudioData::Int32(reader.samples::<i32>().collect::<std::result::Result<_, _>>()?),
            AudioFormat::Float32 => AudioData::Float32(reader.samples::<f32>().collect::<std::result::Result<_, _>>()?),
        };

        let stream = Self::new(id, spec.sample_rate, spec.channels, data);
        stream.validate()?;
        Ok(stream)
    }

    /// Write the stream as a RIFF/WAVE file, replacing any existing file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        let file = File::create(path)
            .map_err(|e| Wsb2WavError::write(path, format!("Cannot create output file: {}", e)))?;

        self.write_to(BufWriter::new(file))
            .map_err(|e| Wsb2WavError::write(path, e.to_string()))
    }

    /// Encode into an in-memory WAV file.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    fn write_to<W: Write + Seek>(&self, sink: W) -> Result<()> {
        self.validate()?;

        let mut writer = WavWriter::new(sink, self.header.to_wav_spec())?;
        match &self.data {
            AudioData::Int8(data) => {
                for &sample in data {
                    writer.write_sample(sample)?;
                }
            }
            AudioData::Int16(data) => {
                for &sample in data {
                    writer.write_sample(sample)?;
                }
            }
            AudioData::Int24(data) | AudioData::Int32(data) => {
                for &sample in data {
                    writer.write_sample(sample)?;
                }
            }
            AudioData::Float32(data) => {
                for &sample in data {
                    writer.write_sample(sample)?;
                }
            }
        }
        writer.finalize()?;

        Ok(())
    }
}
