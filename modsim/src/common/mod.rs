pub(crate) mod bits;
pub(crate) mod buffer;
pub(crate) mod crc;
pub(crate) mod frame;
pub(crate) mod function;
pub(crate) mod phys;
pub(crate) mod serialize;
pub(crate) mod traits;
