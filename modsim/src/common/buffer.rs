use crate::error::InternalError;

/// Bounded FIFO of received bytes awaiting frame extraction
pub(crate) struct AssemblyBuffer {
    buffer: Vec<u8>,
    begin: usize,
    end: usize,
}

impl AssemblyBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        AssemblyBuffer {
            buffer: vec![0; capacity],
            begin: 0,
            end: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.end - self.begin
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn peek_at(&self, idx: usize) -> Option<u8> {
        if idx >= self.len() {
            return None;
        }
        self.buffer.get(self.begin + idx).copied()
    }

    pub(crate) fn read(&mut self, count: usize) -> Result<&[u8], InternalError> {
        if self.len() < count {
            return Err(InternalError::InsufficientBytesForRead(count, self.len()));
        }

        match self.buffer.get(self.begin..(self.begin + count)) {
            Some(ret) => {
                self.begin += count;
                Ok(ret)
            }
            None => Err(InternalError::InsufficientBytesForRead(count, self.len())),
        }
    }

    /// Drop up to `count` bytes from the front, returning how many were dropped
    pub(crate) fn discard(&mut self, count: usize) -> usize {
        let count = count.min(self.len());
        self.begin += count;
        count
    }

    /// Append received bytes
    ///
    /// If the buffer would overflow, the oldest bytes are dropped to make room.
    /// Returns the number of bytes that were lost.
    pub(crate) fn extend(&mut self, data: &[u8]) -> usize {
        let capacity = self.capacity();

        // only the newest `capacity` bytes of a huge write can ever be kept
        let (lost_input, data) = if data.len() > capacity {
            (data.len() - capacity, &data[data.len() - capacity..])
        } else {
            (0, data)
        };

        let overflow = (self.len() + data.len()).saturating_sub(capacity);
        let dropped = self.discard(overflow);

        // before we write any data, check to see if the buffer is empty and adjust the indices
        if self.is_empty() {
            self.begin = 0;
            self.end = 0;
        }

        // shift the remaining bytes to the front if the write doesn't fit at the end
        if self.end + data.len() > capacity {
            let length = self.len();
            self.buffer.copy_within(self.begin..self.end, 0);
            self.begin = 0;
            self.end = length;
        }

        self.buffer[self.end..self.end + data.len()].copy_from_slice(data);
        self.end += data.len();

        lost_input + dropped
    }

    pub(crate) fn clear(&mut self) {
        self.begin = 0;
        self.end = 0;
    }
}
