use std::time::{Duration, Instant};

use crate::common::buffer::AssemblyBuffer;
use crate::common::frame::constants::MAX_REQUEST_LENGTH;
use crate::common::frame::{FrameAssembler, FrameWriter, RtuDisplay};
use crate::decode::DecodeLevel;
use crate::device::Device;
use crate::exception::ExceptionCode;
use crate::server::response::ResponseDisplay;

/// Default time a multi-write frame may take to arrive completely
pub const DEFAULT_FRAME_TIMEOUT: Duration = Duration::from_millis(500);
/// Default number of received bytes held while waiting for a complete frame
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Outcome of a single [`Dispatcher::poll_once`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply<'a> {
    /// A frame was answered, the bytes must be transmitted
    PackageOk(&'a [u8]),
    /// Not enough bytes are buffered to form a frame
    NoFullPackage,
    /// The frame is addressed to a slave that is not emulated here
    NoSlaveMatch,
    /// The frame failed the CRC check and was dropped
    IncorrectCrc,
}

impl<'a> Reply<'a> {
    /// Bytes to transmit, if any
    pub fn response(&self) -> Option<&'a [u8]> {
        match *self {
            Reply::PackageOk(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Owns the receive buffer and the device table, and answers one frame per poll
///
/// The dispatcher never blocks and never touches a transport: callers push
/// received bytes with [`feed`](Self::feed) and transmit whatever
/// [`poll_once`](Self::poll_once) hands back.
pub struct Dispatcher {
    devices: Vec<Device>,
    buffer: AssemblyBuffer,
    assembler: FrameAssembler,
    writer: FrameWriter,
    decode: DecodeLevel,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("devices", &self.devices)
            .field("buffered", &self.buffer.len())
            .field("decode", &self.decode)
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher for a fixed set of devices
    ///
    /// When several devices share a unit id, only the first one is ever answered.
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices,
            buffer: AssemblyBuffer::new(DEFAULT_BUFFER_CAPACITY),
            assembler: FrameAssembler::new(DEFAULT_FRAME_TIMEOUT),
            writer: FrameWriter::new(),
            decode: DecodeLevel::default(),
        }
    }

    /// Set what is logged at INFO level for each frame
    pub fn with_decode_level(mut self, decode: DecodeLevel) -> Self {
        self.decode = decode;
        self
    }

    /// Set how long a partially received multi-write frame is kept
    pub fn with_frame_timeout(mut self, timeout: Duration) -> Self {
        self.assembler = FrameAssembler::new(timeout);
        self
    }

    /// Set the receive buffer capacity, never less than the longest request
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer = AssemblyBuffer::new(capacity.max(MAX_REQUEST_LENGTH));
        self
    }

    /// The emulated devices
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Current decode level
    pub fn decode_level(&self) -> DecodeLevel {
        self.decode
    }

    /// Number of received bytes not yet consumed
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Append bytes received from the transport
    ///
    /// If the buffer is full the oldest bytes are discarded.
    pub fn feed(&mut self, data: &[u8]) {
        let dropped = self.buffer.extend(data);
        if dropped > 0 {
            tracing::warn!("receive buffer full, dropped {} oldest bytes", dropped);
            self.assembler.reset();
        }
    }

    /// Forget every buffered byte, e.g. after the port was re-opened
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.assembler.reset();
    }

    /// Try to process exactly one frame
    pub fn poll_once(&mut self) -> Reply<'_> {
        self.poll_at(Instant::now())
    }

    /// Same as [`poll_once`](Self::poll_once) with an explicit notion of the current time
    pub fn poll_at(&mut self, now: Instant) -> Reply<'_> {
        let frame = match self.assembler.try_extract(&mut self.buffer, now) {
            Some(frame) => frame,
            None => return Reply::NoFullPackage,
        };

        if self.decode.frame.enabled() {
            tracing::info!(
                "RTU RX - {}",
                RtuDisplay::new(self.decode.frame, frame.as_slice())
            );
        }

        let unit_id = frame.unit_id();
        let device = match self.devices.iter().find(|dev| dev.unit_id() == unit_id) {
            Some(device) => device,
            None => {
                tracing::debug!("ignoring frame for unit {}", unit_id);
                return Reply::NoSlaveMatch;
            }
        };

        let (received, expected) = (frame.received_crc(), frame.expected_crc());
        if received != expected {
            tracing::warn!(
                "CRC mismatch for unit {}, received: {:#06X} expected: {:#06X}",
                unit_id,
                received,
                expected
            );
            return Reply::IncorrectCrc;
        }

        let response = match device.respond(&frame, self.decode.app) {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("{}", err);
                return Reply::NoSlaveMatch;
            }
        };

        if self.decode.app.enabled() {
            tracing::info!("PDU TX - {}", ResponseDisplay::new(self.decode.app, &response));
        }

        let length = match response.write(unit_id, &mut self.writer) {
            Ok(bytes) => bytes.len(),
            Err(err) => {
                tracing::error!("unable to format response: {}", err);
                self.writer
                    .exception(unit_id, frame.function(), ExceptionCode::ServerDeviceFailure)
                    .len()
            }
        };
        let bytes = self.writer.formatted(length);

        if self.decode.frame.enabled() {
            tracing::info!("RTU TX - {}", RtuDisplay::new(self.decode.frame, bytes));
        }

        Reply::PackageOk(bytes)
    }
}
