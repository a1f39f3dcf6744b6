use std::sync::{Mutex, MutexGuard};

use crate::{Result, SampleRelayError};

/// Cursor state behind the lock.
///
/// The cursors use an `Option` sentinel instead of the traditional signed
/// `-1`: `read` is the index of the last element consumed (`None` = the
/// reader sits at the start boundary, nothing consumed on this lap), and
/// `write` is the next slot to fill (`None` = the writer wrapped onto a
/// buffer the reader has not touched, i.e. completely full). The four
/// combinations cover every occupancy case without signed arithmetic.
#[derive(Debug, Clone)]
struct RingState<T> {
    storage: Vec<T>,
    write: Option<usize>,
    read: Option<usize>,
}

impl<T: Copy + Default> RingState<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![T::default(); capacity],
            write: Some(0),
            read: None,
        }
    }

    fn available(&self) -> usize {
        let capacity = self.storage.len();
        match (self.write, self.read) {
            (Some(write), None) => write,
            (None, None) => capacity,
            (None, Some(read)) => capacity - read - 1,
            (Some(write), Some(read)) => {
                if write > read {
                    write - read - 1
                } else {
                    capacity - read - 1 + write
                }
            }
        }
    }
}

/// A fixed-capacity ring buffer for handing a continuous sample stream from
/// one producer thread to one consumer thread.
///
/// Every operation takes a single coarse mutex for its whole duration; the
/// lock is only ever held across a bounded copy, never across a wait.
/// There is no blocking API: a full buffer rejects writes and an empty
/// buffer returns nothing, both signalled by a transfer count of 0, and
/// callers poll or retry. Partial transfers are the expected outcome when
/// a request does not fit, not an error.
#[derive(Debug)]
pub struct RingBuffer<T> {
    inner: Mutex<RingState<T>>,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Creates a buffer able to hold `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(RingState::with_capacity(capacity)),
        }
    }

    /// Copies as many elements from `samples` as currently fit and returns
    /// the number written, which may be 0 (buffer full or zero-sized
    /// request) or less than requested (partial write). Never overwrites
    /// data the reader has not consumed.
    pub fn write(&self, samples: &[T]) -> Result<usize> {
        let mut state = self.lock()?;
        let capacity = state.storage.len();
        if capacity == 0 || samples.is_empty() {
            return Ok(0);
        }

        // One contiguous run per call: up to the read cursor or the physical
        // end of the storage, whichever comes first.
        let (start, room) = match (state.write, state.read) {
            (None, None) => return Ok(0),
            (Some(write), Some(read)) if write == read => return Ok(0),
            (Some(write), None) => (write, capacity - write),
            (Some(write), Some(read)) => {
                if write > read {
                    (write, capacity - write)
                } else {
                    (write, read - write)
                }
            }
            // Writer parked at the wrap boundary; resume at the start, up to
            // the read cursor.
            (None, Some(read)) => (0, read),
        };

        let count = room.min(samples.len());
        if count == 0 {
            return Ok(0);
        }
        let end = start + count;
        state.storage[start..end].copy_from_slice(&samples[..count]);
        state.write = if end == capacity {
            match state.read {
                // Wrapping onto a never-read lap means completely full.
                None => None,
                Some(_) => Some(0),
            }
        } else {
            Some(end)
        };
        Ok(count)
    }

    /// Copies as many unread elements into `out` as are available and
    /// returns the number read, which may be 0 (nothing to read) or less
    /// than requested (partial read). Never reads slots the writer has not
    /// filled.
    pub fn read(&self, out: &mut [T]) -> Result<usize> {
        let mut state = self.lock()?;
        let capacity = state.storage.len();
        if capacity == 0 || out.is_empty() {
            return Ok(0);
        }

        let (start, unread) = match (state.write, state.read) {
            (Some(write), None) => (0, write),
            (None, None) => (0, capacity),
            (None, Some(read)) => (read + 1, capacity - read - 1),
            (Some(write), Some(read)) => {
                if write > read {
                    (read + 1, write - read - 1)
                } else {
                    (read + 1, capacity - read - 1)
                }
            }
        };

        let count = unread.min(out.len());
        if count == 0 {
            return Ok(0);
        }
        let end = start + count;
        out[..count].copy_from_slice(&state.storage[start..end]);
        if end == capacity {
            // Consumed the last slot before the physical end: the reader
            // wraps back to the start sentinel, and a writer parked at the
            // full sentinel is re-armed at slot 0.
            state.read = None;
            if state.write.is_none() {
                state.write = Some(0);
            }
        } else {
            state.read = Some(end - 1);
        }
        Ok(count)
    }

    /// Returns the number of elements currently available to read.
    pub fn available(&self) -> Result<usize> {
        Ok(self.lock()?.available())
    }

    /// Returns the fixed capacity of the storage.
    pub fn capacity(&self) -> Result<usize> {
        Ok(self.lock()?.storage.len())
    }

    /// Zeroes the storage in place and resets both cursors to the initial
    /// empty state. The capacity is unchanged.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.storage.fill(T::default());
        state.write = Some(0);
        state.read = None;
        Ok(())
    }

    /// Discards the storage, reallocates to `capacity` elements and resets
    /// both cursors to the initial empty state.
    pub fn reset(&self, capacity: usize) -> Result<()> {
        let mut state = self.lock()?;
        *state = RingState::with_capacity(capacity);
        Ok(())
    }

    /// Produces an independent deep copy of the buffer, locking only the
    /// source for the duration of the copy.
    pub fn try_clone(&self) -> Result<Self> {
        let state = self.lock()?;
        Ok(Self {
            inner: Mutex::new(state.clone()),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, RingState<T>>> {
        self.inner
            .lock()
            .map_err(|_| SampleRelayError::msg("ring buffer lock has been poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let ring = RingBuffer::new(4);
        let written = ring.write(&[1.0_f32, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(written, 4);
        assert_eq!(ring.available().unwrap(), 4);

        let mut out = [0.0_f32; 4];
        let read = ring.read(&mut out).unwrap();
        assert_eq!(read, 4);
        assert_eq!(out, [1.0, 2.0, 3.0, 4.0]);

        // Fully caught up: nothing further to read.
        assert_eq!(ring.read(&mut out).unwrap(), 0);
        assert_eq!(ring.available().unwrap(), 0);
    }

    #[test]
    fn oversized_write_is_partial() {
        let ring = RingBuffer::new(4);
        let written = ring.write(&[1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(written, 4);

        // Full: the excess is rejected, not silently dropped.
        assert_eq!(ring.write(&[7.0]).unwrap(), 0);
        assert_eq!(ring.available().unwrap(), 4);
    }

    #[test]
    fn full_buffer_rejects_writes_until_read() {
        let ring = RingBuffer::new(2);
        assert_eq!(ring.write(&[1.0_f32, 2.0]).unwrap(), 2);
        assert_eq!(ring.write(&[3.0]).unwrap(), 0);

        let mut out = [0.0_f32; 2];
        assert_eq!(ring.read(&mut out).unwrap(), 2);
        assert_eq!(ring.write(&[3.0]).unwrap(), 1);

        let mut one = [0.0_f32; 1];
        assert_eq!(ring.read(&mut one).unwrap(), 1);
        assert_eq!(one, [3.0]);
    }

    #[test]
    fn wraps_across_the_physical_end() {
        let ring = RingBuffer::new(4);
        let mut out = [0_i32; 4];

        assert_eq!(ring.write(&[1, 2, 3]).unwrap(), 3);
        assert_eq!(ring.read(&mut out[..2]).unwrap(), 2);
        assert_eq!(&out[..2], &[1, 2]);

        // Two contiguous runs: up to the physical end, then from slot 0.
        assert_eq!(ring.write(&[4]).unwrap(), 1);
        assert_eq!(ring.write(&[5]).unwrap(), 1);

        assert_eq!(ring.available().unwrap(), 3);
        assert_eq!(ring.read(&mut out[..1]).unwrap(), 1);
        assert_eq!(out[0], 3);
        assert_eq!(ring.read(&mut out[..1]).unwrap(), 1);
        assert_eq!(out[0], 4);
        assert_eq!(ring.read(&mut out[..1]).unwrap(), 1);
        assert_eq!(out[0], 5);
        assert_eq!(ring.available().unwrap(), 0);
    }

    #[test]
    fn interleaved_stream_preserves_order() {
        let ring = RingBuffer::new(8);
        let mut produced = Vec::new();
        let mut consumed = Vec::new();
        let mut next = 0_i64;

        // Uneven write/read chunk sizes force every wrap and sentinel case.
        for step in 0..200_i64 {
            let chunk: Vec<i64> = (next..next + 1 + step % 5).collect();
            let written = ring.write(&chunk).unwrap();
            produced.extend_from_slice(&chunk[..written]);
            next += written as i64;

            let mut out = vec![0_i64; 1 + (step % 3) as usize];
            let read = ring.read(&mut out).unwrap();
            consumed.extend_from_slice(&out[..read]);
        }

        let mut out = vec![0_i64; 8];
        loop {
            let read = ring.read(&mut out).unwrap();
            if read == 0 {
                break;
            }
            consumed.extend_from_slice(&out[..read]);
        }

        assert_eq!(consumed, produced);
    }

    #[test]
    fn zero_sized_requests_and_zero_capacity() {
        let ring: RingBuffer<f32> = RingBuffer::new(4);
        let mut out = [0.0_f32; 2];
        assert_eq!(ring.write(&[]).unwrap(), 0);
        assert_eq!(ring.read(&mut []).unwrap(), 0);

        let empty: RingBuffer<f32> = RingBuffer::new(0);
        assert_eq!(empty.write(&[1.0]).unwrap(), 0);
        assert_eq!(empty.read(&mut out).unwrap(), 0);
        assert_eq!(empty.available().unwrap(), 0);
    }

    #[test]
    fn clear_empties_without_resizing() {
        let ring = RingBuffer::new(4);
        ring.write(&[1.0_f32, 2.0, 3.0]).unwrap();
        ring.clear().unwrap();

        assert_eq!(ring.available().unwrap(), 0);
        assert_eq!(ring.capacity().unwrap(), 4);
        assert_eq!(ring.write(&[9.0]).unwrap(), 1);

        let mut out = [0.0_f32; 1];
        assert_eq!(ring.read(&mut out).unwrap(), 1);
        assert_eq!(out, [9.0]);
    }

    #[test]
    fn reset_reallocates_and_empties() {
        let ring = RingBuffer::new(2);
        ring.write(&[1.0_f32, 2.0]).unwrap();
        ring.reset(8).unwrap();

        assert_eq!(ring.capacity().unwrap(), 8);
        assert_eq!(ring.available().unwrap(), 0);
        assert_eq!(ring.write(&[1.0; 8]).unwrap(), 8);
    }

    #[test]
    fn try_clone_is_independent() {
        let ring = RingBuffer::new(4);
        ring.write(&[1.0_f32, 2.0]).unwrap();
        let copy = ring.try_clone().unwrap();

        let mut out = [0.0_f32; 2];
        assert_eq!(ring.read(&mut out).unwrap(), 2);

        // The copy still holds the snapshot taken at clone time.
        assert_eq!(copy.available().unwrap(), 2);
        assert_eq!(copy.read(&mut out).unwrap(), 2);
        assert_eq!(out, [1.0, 2.0]);
    }

    #[test]
    fn concurrent_producer_consumer_preserves_the_stream() {
        const TOTAL: i64 = 20_000;

        let ring = Arc::new(RingBuffer::new(64));
        let writer_ring = Arc::clone(&ring);

        let writer = std::thread::spawn(move || {
            let mut next = 0_i64;
            while next < TOTAL {
                let end = (next + 17).min(TOTAL);
                let chunk: Vec<i64> = (next..end).collect();
                let written = writer_ring.write(&chunk).unwrap();
                if written == 0 {
                    std::thread::yield_now();
                }
                next += written as i64;
            }
        });

        let mut consumed = Vec::with_capacity(TOTAL as usize);
        let mut out = [0_i64; 23];
        while consumed.len() < TOTAL as usize {
            let read = ring.read(&mut out).unwrap();
            if read == 0 {
                std::thread::yield_now();
                continue;
            }
            consumed.extend_from_slice(&out[..read]);
        }
        writer.join().unwrap();

        // Everything written arrives exactly once and in order.
        let expected: Vec<i64> = (0..TOTAL).collect();
        assert_eq!(consumed, expected);
    }
}
