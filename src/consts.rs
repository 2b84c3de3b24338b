use std::time::Duration;

/// Default time allowed for the camera to arm after a record-ready request.
pub const DEFAULT_REC_READY_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default time allowed for a fixed-length recording to finish after the trigger.
pub const DEFAULT_RECORD_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Interval between two status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Added to a timed recording to cover the camera's transition latency.
pub const DEFAULT_STOP_PAD: Duration = Duration::from_millis(5);

/// Bit depth requested for every image transfer.
pub const IMAGE_BIT_DEPTH: u32 = 8;

/// Child (camera head) number used for every device. Multi-head devices are not supported.
pub const DEFAULT_CHILD_NO: u32 = 1;

/// Bit offset of the device number inside an interface id.
pub const IFACE_ID_FIELD_OFFSET: u32 = 32;

/// Base name of the vendor shared library (`PDCLIB.dll` on Windows).
pub const PDC_LIBRARY_NAME: &str = "PDCLIB";

/// Return values and codes defined by the PDC SDK headers (`PDCVALUE.h`).
pub mod pdc {
    pub const SUCCEEDED: u32 = 1;
    pub const FAILED: u32 = 0;

    /// Maximum number of devices a detect request may report.
    pub const MAX_DEVICE: usize = 64;
    /// Maximum length of any list returned by the SDK.
    pub const MAX_LIST_NUMBER: usize = 256;
    /// Number of event slots in a memory frame info record.
    pub const MAX_EVENT: usize = 10;

    pub const INTTYPE_G_ETHER: u32 = 0x02;
    pub const DETECT_NORMAL: u32 = 0x00;

    pub const COLORTYPE_MONO: u8 = 0x01;
    pub const COLORTYPE_COLOR: u8 = 0x02;

    /// Device status codes.
    pub mod status {
        pub const LIVE: u32 = 0x00;
        pub const PLAYBACK: u32 = 0x01;
        pub const RECREADY: u32 = 0x02;
        pub const ENDLESS: u32 = 0x04;
        pub const REC: u32 = 0x08;
        pub const SAVE: u32 = 0x10;
        pub const LOAD: u32 = 0x20;
        pub const PAUSE: u32 = 0x40;
    }

    /// Trigger mode codes.
    pub mod trigger {
        pub const START: u32 = 0x0000_0000;
        pub const CENTER: u32 = 0x0100_0000;
        pub const END: u32 = 0x0200_0000;
        pub const RANDOM: u32 = 0x0300_0000;
        pub const MANUAL: u32 = 0x0400_0000;
    }
}
