use crate::device::RegisterDescriptor;
use crate::types::UnitId;

/// Supplies values for registers configured with [`ValueMode::ExternalRead`](crate::device::ValueMode::ExternalRead)
///
/// Implementations are consulted on every read and must not block for long:
/// the server answers requests on a single task.
pub trait ValueSource: Send + Sync {
    /// Produce the current value of `register` on device `unit_id`
    fn read_value(&self, unit_id: UnitId, register: &RegisterDescriptor) -> u16;
}

/// Stand-in source that reports [`PlaceholderSource::VALUE`] for every register
#[derive(Copy, Clone, Debug, Default)]
pub struct PlaceholderSource;

impl PlaceholderSource {
    /// Value returned for every register
    pub const VALUE: u16 = 11;
}

impl ValueSource for PlaceholderSource {
    fn read_value(&self, _unit_id: UnitId, _register: &RegisterDescriptor) -> u16 {
        Self::VALUE
    }
}

impl<F> ValueSource for F
where
    F: Fn(UnitId, &RegisterDescriptor) -> u16 + Send + Sync,
{
    fn read_value(&self, unit_id: UnitId, register: &RegisterDescriptor) -> u16 {
        self(unit_id, register)
    }
}
