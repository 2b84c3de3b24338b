use std::fmt;

use crate::consts::pdc;

/// Error code reported by a failed SDK call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdkFailure(pub u32);

impl fmt::Display for SdkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PDC error code {}", self.0)
    }
}

pub type SdkResult<T> = Result<T, SdkFailure>;

/// One entry of a device detect request (`PDC_DETECT_INFO`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectInfo {
    /// Model code of the detected camera.
    pub device_code: u32,
    /// Temporary device number. For Gigabit Ethernet devices this is the IPv4 address.
    pub tmp_device_no: u32,
    pub interface_code: u32,
}

/// Layout of the recording held in camera memory (`PDC_FRAME_INFO`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInfo {
    pub start: i32,
    pub end: i32,
    /// Frame number at which the trigger fired. Memory frames are addressed relative to it.
    pub trigger: i32,
    pub two_stage_low_to_high: i32,
    pub two_stage_high_to_low: i32,
    pub two_stage_timing: u32,
    pub events: [i32; pdc::MAX_EVENT],
    pub event_count: u32,
    pub recorded_frames: u32,
}

/// The subset of the PDC SDK the driver talks to.
///
/// Methods mirror the vendor entry points one to one and keep their raw argument types.
/// All methods take `&self`; the SDK keeps its own global state, test doubles use interior mutability.
pub trait PdcSdk: Send + Sync {
    /// `PDC_Init`
    fn init(&self) -> SdkResult<()>;

    /// `PDC_DetectDevice`. Returns the detected devices, at most `candidates.len()`.
    fn detect_device(
        &self,
        interface_code: u32,
        candidates: &[u32],
        detect_param: u32,
    ) -> SdkResult<Vec<DetectInfo>>;

    /// `PDC_OpenDevice`. Returns the device number.
    fn open_device(&self, info: &DetectInfo) -> SdkResult<u32>;

    /// `PDC_GetRecordRate`
    fn record_rate(&self, device_no: u32, child_no: u32) -> SdkResult<u32>;

    /// `PDC_GetRecordRateList`
    fn record_rate_list(&self, device_no: u32, child_no: u32) -> SdkResult<Vec<u32>>;

    /// `PDC_SetRecordRate`
    fn set_record_rate(&self, device_no: u32, child_no: u32, rate: u32) -> SdkResult<()>;

    /// `PDC_GetResolution`. Returns `(width, height)`.
    fn resolution(&self, device_no: u32, child_no: u32) -> SdkResult<(u32, u32)>;

    /// `PDC_GetResolutionList`. Entries are packed, see [`Resolution::from_packed`](crate::settings::Resolution::from_packed).
    fn resolution_list(&self, device_no: u32, child_no: u32) -> SdkResult<Vec<u32>>;

    /// `PDC_SetResolution`
    fn set_resolution(&self, device_no: u32, child_no: u32, width: u32, height: u32) -> SdkResult<()>;

    /// `PDC_GetColorType`
    fn color_type(&self, device_no: u32, child_no: u32) -> SdkResult<u8>;

    /// `PDC_GetStatus`
    fn status(&self, device_no: u32) -> SdkResult<u32>;

    /// `PDC_SetStatus`
    fn set_status(&self, device_no: u32, status: u32) -> SdkResult<()>;

    /// `PDC_SetTriggerMode`
    fn set_trigger_mode(
        &self,
        device_no: u32,
        mode: u32,
        after_frames: u32,
        random_frames: u32,
        rec_count: u32,
    ) -> SdkResult<()>;

    /// `PDC_SetRecReady`
    fn set_rec_ready(&self, device_no: u32) -> SdkResult<()>;

    /// `PDC_SetEndless`
    fn set_endless(&self, device_no: u32) -> SdkResult<()>;

    /// `PDC_TriggerIn`
    fn trigger_in(&self, device_no: u32) -> SdkResult<()>;

    /// `PDC_GetLiveImageData`. `buf` must be exactly one frame long.
    fn live_image_data(&self, device_no: u32, child_no: u32, bit_depth: u32, buf: &mut [u8]) -> SdkResult<()>;

    /// `PDC_GetMemFrameInfo`
    fn mem_frame_info(&self, device_no: u32, child_no: u32) -> SdkResult<FrameInfo>;

    /// `PDC_GetMemImageData`. `buf` must be exactly one frame long.
    fn mem_image_data(
        &self,
        device_no: u32,
        child_no: u32,
        frame_no: i32,
        bit_depth: u32,
        buf: &mut [u8],
    ) -> SdkResult<()>;
}
