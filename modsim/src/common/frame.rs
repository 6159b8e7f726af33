use std::time::{Duration, Instant};

use crate::common::buffer::AssemblyBuffer;
use crate::common::crc::{crc16, split_trailer, CRC_LENGTH};
use crate::common::function::{FunctionCode, ERROR_DELIMITER};
use crate::common::traits::Serialize;
use crate::decode::FrameDecodeLevel;
use crate::error::InternalError;
use crate::exception::ExceptionCode;
use crate::types::UnitId;

use scursor::WriteCursor;

pub(crate) mod constants {
    /// Length of every request other than the multi-write ones
    pub(crate) const BASE_FRAME_LENGTH: usize = 8;
    /// Position of the byte count within a multi-write request
    pub(crate) const BYTE_COUNT_OFFSET: usize = 6;
    /// Unit id, function, address, quantity, byte count and CRC around a multi-write payload
    pub(crate) const EXTENDED_FRAME_OVERHEAD: usize = 9;
    pub(crate) const MAX_REQUEST_LENGTH: usize = EXTENDED_FRAME_OVERHEAD + u8::MAX as usize;
    pub(crate) const MAX_RESPONSE_LENGTH: usize = 256;
}

/// One complete request taken off the bus
#[derive(Clone)]
pub(crate) struct Frame {
    length: usize,
    bytes: [u8; constants::MAX_REQUEST_LENGTH],
}

impl Frame {
    pub(crate) fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < constants::BASE_FRAME_LENGTH || data.len() > constants::MAX_REQUEST_LENGTH
        {
            return None;
        }
        let mut bytes = [0; constants::MAX_REQUEST_LENGTH];
        bytes[..data.len()].copy_from_slice(data);
        Some(Self {
            length: data.len(),
            bytes,
        })
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.length]
    }

    pub(crate) fn unit_id(&self) -> UnitId {
        UnitId::new(self.bytes[0])
    }

    pub(crate) fn function(&self) -> u8 {
        self.bytes[1]
    }

    /// Bytes between the function code and the CRC
    pub(crate) fn body(&self) -> &[u8] {
        &self.bytes[2..self.length - CRC_LENGTH]
    }

    pub(crate) fn received_crc(&self) -> u16 {
        u16::from_le_bytes([
            self.bytes[self.length - CRC_LENGTH],
            self.bytes[self.length - 1],
        ])
    }

    pub(crate) fn expected_crc(&self) -> u16 {
        crc16(&self.bytes[..self.length - CRC_LENGTH])
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Frame({:02X?})", self.as_slice())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseState {
    AwaitingHeader,
    AwaitingExtendedPayload(usize, Instant), // total frame length, when the header was seen
}

/// Extracts frames from an [`AssemblyBuffer`] without ever waiting on bytes that are not there
pub(crate) struct FrameAssembler {
    state: ParseState,
    timeout: Duration,
}

impl FrameAssembler {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            state: ParseState::AwaitingHeader,
            timeout,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        self.state == ParseState::AwaitingHeader
    }

    pub(crate) fn try_extract(
        &mut self,
        buffer: &mut AssemblyBuffer,
        now: Instant,
    ) -> Option<Frame> {
        loop {
            match self.state {
                ParseState::AwaitingHeader => {
                    // zeros preceding a frame are line noise
                    let mut skipped = 0;
                    while buffer.len() >= constants::BASE_FRAME_LENGTH
                        && buffer.peek_at(0) == Some(0)
                    {
                        skipped += buffer.discard(1);
                    }
                    if skipped > 0 {
                        tracing::debug!("discarded {} leading zero bytes", skipped);
                    }

                    if buffer.len() < constants::BASE_FRAME_LENGTH {
                        return None;
                    }

                    let extended = buffer
                        .peek_at(1)
                        .and_then(FunctionCode::get)
                        .map_or(false, FunctionCode::has_extended_payload);

                    if !extended {
                        return Self::take(buffer, constants::BASE_FRAME_LENGTH);
                    }

                    let byte_count = buffer.peek_at(constants::BYTE_COUNT_OFFSET)? as usize;
                    self.state = ParseState::AwaitingExtendedPayload(
                        constants::EXTENDED_FRAME_OVERHEAD + byte_count,
                        now,
                    );
                }
                ParseState::AwaitingExtendedPayload(length, since) => {
                    if buffer.len() >= length {
                        self.state = ParseState::AwaitingHeader;
                        return Self::take(buffer, length);
                    }

                    if now.saturating_duration_since(since) < self.timeout {
                        return None;
                    }

                    tracing::warn!(
                        "timeout waiting for {} byte frame ({} bytes buffered), discarding header",
                        length,
                        buffer.len()
                    );
                    buffer.discard(constants::BASE_FRAME_LENGTH);
                    self.state = ParseState::AwaitingHeader;
                }
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.state = ParseState::AwaitingHeader;
    }

    fn take(buffer: &mut AssemblyBuffer, length: usize) -> Option<Frame> {
        match buffer.read(length) {
            Ok(data) => Frame::from_bytes(data),
            Err(err) => {
                tracing::error!("unable to extract frame: {}", err);
                None
            }
        }
    }
}

/// Formats responses into a fixed transmit buffer
pub(crate) struct FrameWriter {
    buffer: [u8; constants::MAX_RESPONSE_LENGTH],
}

impl FrameWriter {
    pub(crate) fn new() -> Self {
        Self {
            buffer: [0; constants::MAX_RESPONSE_LENGTH],
        }
    }

    /// Write unit id, function and body, then append the CRC
    pub(crate) fn format(
        &mut self,
        unit_id: UnitId,
        function: u8,
        body: &dyn Serialize,
    ) -> Result<&[u8], InternalError> {
        let end = {
            let mut cursor = WriteCursor::new(self.buffer.as_mut_slice());
            cursor.write_u8(unit_id.value)?;
            cursor.write_u8(function)?;
            body.serialize(&mut cursor)?;
            cursor.position()
        };
        self.seal(end)
    }

    /// Copy a request back out unchanged, including its original CRC
    pub(crate) fn echo(&mut self, frame: &[u8]) -> Result<&[u8], InternalError> {
        let dest = self
            .buffer
            .get_mut(..frame.len())
            .ok_or(InternalError::InsufficientWriteSpace)?;
        dest.copy_from_slice(frame);
        Ok(&self.buffer[..frame.len()])
    }

    /// Exception replies are five bytes and always fit
    pub(crate) fn exception(&mut self, unit_id: UnitId, function: u8, ex: ExceptionCode) -> &[u8] {
        self.buffer[0] = unit_id.value;
        self.buffer[1] = function | ERROR_DELIMITER;
        self.buffer[2] = ex.into();
        let crc = crc16(&self.buffer[..3]).to_le_bytes();
        self.buffer[3] = crc[0];
        self.buffer[4] = crc[1];
        &self.buffer[..5]
    }

    /// The first `length` bytes of the last formatted frame
    pub(crate) fn formatted(&self, length: usize) -> &[u8] {
        &self.buffer[..length.min(constants::MAX_RESPONSE_LENGTH)]
    }

    fn seal(&mut self, end: usize) -> Result<&[u8], InternalError> {
        let crc = crc16(&self.buffer[..end]).to_le_bytes();
        let trailer = self
            .buffer
            .get_mut(end..end + CRC_LENGTH)
            .ok_or(InternalError::InsufficientWriteSpace)?;
        trailer.copy_from_slice(&crc);
        Ok(&self.buffer[..end + CRC_LENGTH])
    }
}

pub(crate) struct RtuDisplay<'a> {
    level: FrameDecodeLevel,
    frame: &'a [u8],
}

impl<'a> RtuDisplay<'a> {
    pub(crate) fn new(level: FrameDecodeLevel, frame: &'a [u8]) -> Self {
        RtuDisplay { level, frame }
    }
}

impl std::fmt::Display for RtuDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match (self.frame.first(), split_trailer(self.frame)) {
            (Some(unit_id), Some((data, crc))) => write!(
                f,
                "unit: {} crc: {:#06X} (payload len = {})",
                UnitId::new(*unit_id),
                crc,
                data.len().saturating_sub(1),
            )?,
            _ => write!(f, "malformed (len = {})", self.frame.len())?,
        }
        if self.level.payload_enabled() {
            crate::common::phys::format_bytes(f, self.frame)?;
        }
        Ok(())
    }
}
