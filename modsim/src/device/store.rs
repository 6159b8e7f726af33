use rand::Rng;

use crate::device::{RegisterDescriptor, RegisterKind, ValueMode, ValueSource};
use crate::error::NoSuchRegistry;
use crate::types::{AddressRange, UnitId};

/// Register map of a single device, ordered by location
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterStore {
    registers: Vec<RegisterDescriptor>,
}

impl RegisterStore {
    /// Create a store from descriptors already sorted by ascending location
    pub fn new(registers: Vec<RegisterDescriptor>) -> Self {
        Self { registers }
    }

    /// All descriptors in the store
    pub fn registers(&self) -> &[RegisterDescriptor] {
        &self.registers
    }

    /// Number of descriptors in the store
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// True if the store holds no descriptors
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Find the descriptors covering `range`, which must all be of type `kind`
    ///
    /// Either every location in the range resolves or the whole lookup fails.
    pub fn lookup(
        &self,
        kind: RegisterKind,
        range: AddressRange,
    ) -> Result<&[RegisterDescriptor], NoSuchRegistry> {
        let missing = |location: u16| NoSuchRegistry::new(location, kind);

        let (first, last) = match (self.registers.first(), self.registers.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(missing(range.start)),
        };

        if range.count == 0
            || range.end() >= u32::from(u16::MAX)
            || range.end() > u32::from(last.location) + 1
            || range.start < first.location
        {
            return Err(missing(range.start));
        }

        let begin = self
            .registers
            .iter()
            .position(|reg| reg.location == range.start)
            .ok_or_else(|| missing(range.start))?;

        let count = usize::from(range.count);
        let selected = self
            .registers
            .get(begin..begin + count)
            .unwrap_or(&self.registers[begin..]);

        for (offset, location) in (range.start..).take(count).enumerate() {
            match selected.get(offset) {
                Some(reg) if reg.location == location && reg.kind == kind => {}
                _ => return Err(missing(location)),
            }
        }

        Ok(selected)
    }

    /// Resolve the current value of every location in `range`
    pub fn read_values(
        &self,
        kind: RegisterKind,
        range: AddressRange,
        unit_id: UnitId,
        source: &dyn ValueSource,
    ) -> Result<Vec<u16>, NoSuchRegistry> {
        let registers = self.lookup(kind, range)?;
        Ok(registers
            .iter()
            .map(|reg| resolve(reg, unit_id, source))
            .collect())
    }
}

/// Produce a fresh value for one register; random values are never cached
pub(crate) fn resolve(
    register: &RegisterDescriptor,
    unit_id: UnitId,
    source: &dyn ValueSource,
) -> u16 {
    match register.mode {
        ValueMode::Fixed => register.max,
        ValueMode::Random => {
            let low = register.min.min(register.max);
            let high = register.min.max(register.max);
            rand::thread_rng().gen_range(low..=high)
        }
        ValueMode::ExternalRead => source.read_value(unit_id, register),
    }
}
