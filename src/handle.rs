use std::fmt;

use crate::consts::IFACE_ID_FIELD_OFFSET;

const CHILD_MASK: u64 = (1 << IFACE_ID_FIELD_OFFSET) - 1;

/// Opaque identifier of one opened (device, child) pair.
///
/// The upper 32 bits hold the device number assigned by the SDK when the device
/// was opened, the lower 32 bits the child (camera head) number.
/// Only [`PdcSession::open_device_by_ip`](crate::cam::PdcSession::open_device_by_ip)
/// hands out new ids; [`as_raw`](Self::as_raw) and [`from_raw`](Self::from_raw)
/// exist so the id can be carried through foreign code as a plain integer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceId(u64);

impl InterfaceId {
    pub(crate) fn new(device_no: u32, child_no: u32) -> Self {
        Self((u64::from(device_no) << IFACE_ID_FIELD_OFFSET) | u64::from(child_no))
    }

    pub(crate) fn device_no(self) -> u32 {
        (self.0 >> IFACE_ID_FIELD_OFFSET) as u32
    }

    pub(crate) fn child_no(self) -> u32 {
        (self.0 & CHILD_MASK) as u32
    }

    /// Returns the packed 64-bit value.
    pub fn as_raw(self) -> u64 {
        self.0
    }

    /// Rebuilds an id from a value previously returned by [`as_raw`](Self::as_raw).
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceId({:#018x})", self.0)
    }
}

impl From<InterfaceId> for u64 {
    fn from(id: InterfaceId) -> Self {
        id.as_raw()
    }
}
