use std::sync::Arc;

use crate::{PipelineConfig, Result, RingBuffer};

/// Entry point for a single-producer/single-consumer sample handoff.
///
/// Opening a stream yields one [`StreamWriter`] and one [`StreamReader`],
/// each meant to live on its own thread. Both sides share one
/// [`RingBuffer`]; neither ever blocks waiting for the other, so the
/// writer side is safe to drive from a real-time callback.
#[derive(Debug)]
pub struct SampleStream;

impl SampleStream {
    /// Opens a stream with an explicit ring capacity in samples.
    pub fn open<T: Copy + Default>(capacity: usize) -> (StreamWriter<T>, StreamReader<T>) {
        let shared = Arc::new(RingBuffer::new(capacity));
        (
            StreamWriter {
                ring: Arc::clone(&shared),
            },
            StreamReader { ring: shared },
        )
    }

    /// Opens a stream sized from a pipeline configuration.
    pub fn from_config<T: Copy + Default>(
        config: &PipelineConfig,
    ) -> (StreamWriter<T>, StreamReader<T>) {
        Self::open(config.capacity)
    }
}

/// Producer-side handle. Only one writer should exist per stream.
#[derive(Debug)]
pub struct StreamWriter<T> {
    ring: Arc<RingBuffer<T>>,
}

impl<T: Copy + Default> StreamWriter<T> {
    /// Writes as many samples as currently fit and returns the count, which
    /// may be 0 when the ring is full. The caller decides whether to retry
    /// or drop the block.
    pub fn write(&self, samples: &[T]) -> Result<usize> {
        self.ring.write(samples)
    }

    /// Writes the whole block, spin-yielding whenever the ring is full.
    /// Intended for non-real-time producers that must not lose samples.
    pub fn write_all(&self, samples: &[T]) -> Result<()> {
        let mut offset = 0;
        while offset < samples.len() {
            let written = self.ring.write(&samples[offset..])?;
            if written == 0 {
                std::thread::yield_now();
            }
            offset += written;
        }
        Ok(())
    }

    /// Returns how many samples the paired reader has yet to consume.
    pub fn backlog(&self) -> Result<usize> {
        self.ring.available()
    }
}

/// Consumer-side handle. Only one reader should exist per stream.
#[derive(Debug)]
pub struct StreamReader<T> {
    ring: Arc<RingBuffer<T>>,
}

impl<T: Copy + Default> StreamReader<T> {
    /// Reads as many samples as are available into `out` and returns the
    /// count, which may be 0 when the ring is empty.
    pub fn read(&self, out: &mut [T]) -> Result<usize> {
        self.ring.read(out)
    }

    /// Returns how many samples are waiting to be read.
    pub fn available(&self) -> Result<usize> {
        self.ring.available()
    }

    /// Discards everything currently buffered.
    pub fn clear(&self) -> Result<()> {
        self.ring.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_and_reader_share_one_ring() {
        let (writer, reader) = SampleStream::open::<f32>(16);

        writer.write(&[0.5, -0.5]).unwrap();
        assert_eq!(writer.backlog().unwrap(), 2);
        assert_eq!(reader.available().unwrap(), 2);

        let mut out = [0.0_f32; 2];
        assert_eq!(reader.read(&mut out).unwrap(), 2);
        assert_eq!(out, [0.5, -0.5]);
    }

    #[test]
    fn write_all_survives_a_full_ring() {
        let (writer, reader) = SampleStream::open::<i32>(8);
        let block: Vec<i32> = (0..64).collect();

        let pump = std::thread::spawn(move || writer.write_all(&block));

        let mut consumed = Vec::new();
        let mut out = [0_i32; 8];
        while consumed.len() < 64 {
            let read = reader.read(&mut out).unwrap();
            if read == 0 {
                std::thread::yield_now();
                continue;
            }
            consumed.extend_from_slice(&out[..read]);
        }

        pump.join().unwrap().unwrap();
        assert_eq!(consumed, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn from_config_uses_the_configured_capacity() {
        let config = PipelineConfig {
            capacity: 4,
            block_size: 2,
            sample_rate: 48_000,
        };
        let (writer, reader) = SampleStream::from_config::<f32>(&config);

        assert_eq!(writer.write(&[1.0; 8]).unwrap(), 4);
        reader.clear().unwrap();
        assert_eq!(reader.available().unwrap(), 0);
    }
}
