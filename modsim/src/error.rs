use crate::device::RegisterKind;
use crate::types::UnitId;

/// The task processing requests has been shut down
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shutdown;

impl std::error::Error for Shutdown {}

impl std::fmt::Display for Shutdown {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("task shutdown")
    }
}

/// A read request names a location that is not configured with the requested kind
///
/// This is the one failure that becomes visible on the wire: the device answers
/// it with an `ILLEGAL DATA ADDRESS` exception.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoSuchRegistry {
    /// First location within the request that could not be resolved
    pub location: u16,
    /// Kind of register that was requested
    pub kind: RegisterKind,
}

impl NoSuchRegistry {
    pub(crate) fn new(location: u16, kind: RegisterKind) -> Self {
        Self { location, kind }
    }
}

impl std::error::Error for NoSuchRegistry {}

impl std::fmt::Display for NoSuchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "no matching registry at location {} with type {}",
            self.location, self.kind
        )
    }
}

/// Errors that indicate a bug or an inconsistency inside the library
///
/// These are logged and never transmitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InternalError {
    /// Attempted to read more bytes than present
    InsufficientBytesForRead(usize, usize), // requested / remaining
    /// Attempted to write more bytes than the buffer can hold
    InsufficientWriteSpace,
    /// Byte count would exceed maximum size of u8
    BadByteCount(usize),
    /// A frame was handed to a device that does not own its unit id
    UnitIdMismatch(UnitId, UnitId), // device / frame
}

impl std::error::Error for InternalError {}

impl std::fmt::Display for InternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            InternalError::InsufficientBytesForRead(requested, remaining) => write!(
                f,
                "attempted to read {requested} bytes with only {remaining} remaining"
            ),
            InternalError::InsufficientWriteSpace => {
                f.write_str("insufficient space for write operation")
            }
            InternalError::BadByteCount(count) => {
                write!(f, "byte count would exceed maximum size of u8: {count}")
            }
            InternalError::UnitIdMismatch(device, frame) => write!(
                f,
                "device {device} was asked to answer a frame addressed to {frame}"
            ),
        }
    }
}

impl From<scursor::ReadError> for InternalError {
    fn from(_: scursor::ReadError) -> Self {
        InternalError::InsufficientBytesForRead(1, 0)
    }
}

impl From<scursor::WriteError> for InternalError {
    fn from(_: scursor::WriteError) -> Self {
        InternalError::InsufficientWriteSpace
    }
}
