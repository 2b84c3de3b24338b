use std::time::Duration;

use crate::consts;

/// Sensor resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Decodes an entry of the SDK resolution list: width in the high 16 bits, height in the low 16 bits.
    pub fn from_packed(packed: u32) -> Self {
        Self {
            width: packed >> 16,
            height: packed & 0xFFFF,
        }
    }

    /// Size in bytes of one 8-bit frame at this resolution.
    ///
    /// Monochrome frames carry one sample per pixel, color frames three (BGR).
    pub fn frame_len(&self, monochrome: bool) -> usize {
        let channels = if monochrome { 1 } else { 3 };

        self.width as usize * self.height as usize * channels
    }
}

impl From<(u32, u32)> for Resolution {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, int_enum::IntEnum)]
/// Operating status of the camera. Only the camera moves between these; the driver requests transitions.
pub enum DeviceStatus {
    #[default]
    /// Sensor output is streamed live.
    Live = 0x00,
    /// Camera memory is being played back.
    Playback = 0x01,
    /// Armed, waiting for a trigger.
    RecReady = 0x02,
    /// Free-running recording into the ring buffer.
    Endless = 0x04,
    /// Recording after a trigger.
    Rec = 0x08,
    Save = 0x10,
    Load = 0x20,
    PlaybackPause = 0x40,
}

impl DeviceStatus {
    /// True while frames are being written into camera memory.
    pub fn is_recording(self) -> bool {
        matches!(self, Self::Endless | Self::Rec)
    }

    /// True once a record-ready request has been accepted.
    pub fn is_armed(self) -> bool {
        matches!(self, Self::RecReady | Self::Rec)
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, int_enum::IntEnum)]
/// Position of the trigger inside the recorded sequence.
pub enum TriggerMode {
    #[default]
    /// Recording starts at the trigger.
    Start = 0x0000_0000,
    /// The trigger lands in the middle of the recording.
    Center = 0x0100_0000,
    /// Recording ends at the trigger.
    End = 0x0200_0000,
    Random = 0x0300_0000,
    /// A fixed number of frames is recorded after the trigger.
    Manual = 0x0400_0000,
}

/// Timing knobs for the recording state machine.
#[derive(Debug, Clone)]
pub struct CamConfig {
    /// How long the camera may take to report record-ready.
    pub rec_ready_timeout: Duration,
    /// How long a fixed-length recording may take after the trigger.
    pub record_timeout: Duration,
    /// Sleep between two status polls.
    pub poll_interval: Duration,
    /// Extra time granted to a timed recording before it is halted.
    pub stop_pad: Duration,
}

impl Default for CamConfig {
    fn default() -> Self {
        Self {
            rec_ready_timeout: consts::DEFAULT_REC_READY_TIMEOUT,
            record_timeout: consts::DEFAULT_RECORD_TIMEOUT,
            poll_interval: consts::DEFAULT_POLL_INTERVAL,
            stop_pad: consts::DEFAULT_STOP_PAD,
        }
    }
}
