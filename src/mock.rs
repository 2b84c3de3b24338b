//! Scripted stand-in for the vendor SDK.

use std::{collections::HashMap, sync::Mutex};

use crate::{
    consts::pdc,
    sdk::{DetectInfo, FrameInfo, PdcSdk, SdkFailure, SdkResult},
};

/// Address the mock camera answers on by default (192.168.0.10).
pub const MOCK_IP: u32 = 0xC0A8_000A;

/// Error code returned when an image buffer does not match the current mode.
pub const BAD_BUFFER_CODE: u32 = 0xBAD;

/// One call received by the mock, with the arguments worth asserting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkCall {
    Init,
    DetectDevice(Vec<u32>),
    OpenDevice,
    RecordRate,
    RecordRateList,
    SetRecordRate(u32),
    Resolution,
    ResolutionList,
    SetResolution(u32, u32),
    ColorType,
    Status,
    SetStatus(u32),
    SetTriggerMode(u32, u32),
    SetRecReady,
    SetEndless,
    TriggerIn,
    LiveImageData,
    MemFrameInfo,
    MemImageData(i32),
}

struct MockState {
    device: Option<(DetectInfo, u32)>,
    rate: u32,
    rates: Vec<u32>,
    resolution: (u32, u32),
    resolution_list: Vec<u32>,
    color_type: u8,
    status: u32,
    frame_info: FrameInfo,

    arms: bool,
    arm_delay: u32,
    arming: Option<u32>,
    record_polls: Option<u32>,
    polls_left: u32,

    failures: HashMap<&'static str, u32>,
    calls: Vec<SdkCall>,
}

/// Mock SDK holding the state of a single camera.
///
/// Recording transitions happen on their own: arming moves to `RecReady`
/// (optionally after a number of status polls), the endless trigger to `Endless`,
/// a manual trigger to `Rec`. With [`stops_after`](Self::stops_after) a recording
/// falls back to `Live` once the given number of polls has been answered.
pub struct MockSdk {
    state: Mutex<MockState>,
}

impl Default for MockSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSdk {
    /// A color camera at [`MOCK_IP`], opened as device 3, running live at 1000 fps and 1024x1024.
    pub fn new() -> Self {
        let info = DetectInfo {
            device_code: 0x1234,
            tmp_device_no: MOCK_IP,
            interface_code: pdc::INTTYPE_G_ETHER,
        };

        Self {
            state: Mutex::new(MockState {
                device: Some((info, 3)),
                rate: 1000,
                rates: vec![60, 125, 1000],
                resolution: (1024, 1024),
                resolution_list: vec![0x0400_0400],
                color_type: pdc::COLORTYPE_COLOR,
                status: pdc::status::LIVE,
                frame_info: FrameInfo::default(),
                arms: true,
                arm_delay: 0,
                arming: None,
                record_polls: None,
                polls_left: 0,
                failures: HashMap::new(),
                calls: Vec::new(),
            }),
        }
    }

    fn edit(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    /// Replaces the detected device.
    pub fn with_device(self, ip: u32, device_code: u32, device_no: u32) -> Self {
        self.edit(|s| {
            let info = DetectInfo {
                device_code,
                tmp_device_no: ip,
                interface_code: pdc::INTTYPE_G_ETHER,
            };
            s.device = Some((info, device_no));
        })
    }

    pub fn without_devices(self) -> Self {
        self.edit(|s| s.device = None)
    }

    pub fn with_rates(self, rates: Vec<u32>) -> Self {
        self.edit(|s| s.rates = rates)
    }

    pub fn with_resolution(self, width: u32, height: u32) -> Self {
        self.edit(|s| s.resolution = (width, height))
    }

    pub fn with_resolution_list(self, packed: Vec<u32>) -> Self {
        self.edit(|s| s.resolution_list = packed)
    }

    pub fn monochrome(self, mono: bool) -> Self {
        self.edit(|s| {
            s.color_type = if mono {
                pdc::COLORTYPE_MONO
            } else {
                pdc::COLORTYPE_COLOR
            }
        })
    }

    pub fn with_status(self, status: u32) -> Self {
        self.edit(|s| s.status = status)
    }

    /// Puts a recording of `recorded` frames, triggered at frame `trigger`, into camera memory.
    pub fn with_recording(self, trigger: i32, recorded: u32) -> Self {
        self.edit(|s| {
            s.frame_info = FrameInfo {
                start: trigger,
                end: trigger + recorded as i32 - 1,
                trigger,
                recorded_frames: recorded,
                ..FrameInfo::default()
            }
        })
    }

    /// Record-ready requests are accepted but the camera never arms.
    pub fn never_arms(self) -> Self {
        self.edit(|s| s.arms = false)
    }

    /// The camera reports `RecReady` only on the `polls`-th status query after arming.
    pub fn arms_after(self, polls: u32) -> Self {
        self.edit(|s| s.arm_delay = polls)
    }

    /// A running recording ends by itself after `polls` status queries.
    pub fn stops_after(self, polls: u32) -> Self {
        self.edit(|s| s.record_polls = Some(polls))
    }

    /// Makes the named SDK method fail with `code`.
    pub fn failing(self, method: &'static str, code: u32) -> Self {
        self.edit(|s| {
            s.failures.insert(method, code);
        })
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&SdkCall) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| pred(*c))
            .count()
    }

    /// Logs the call, then applies a configured failure or runs `f`.
    fn call<T>(
        &self,
        method: &'static str,
        call: SdkCall,
        f: impl FnOnce(&mut MockState) -> SdkResult<T>,
    ) -> SdkResult<T> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);

        if let Some(&code) = state.failures.get(method) {
            return Err(SdkFailure(code));
        }

        f(&mut state)
    }
}

impl MockState {
    fn frame_len(&self) -> usize {
        let (width, height) = self.resolution;
        let channels = if self.color_type == pdc::COLORTYPE_MONO { 1 } else { 3 };

        width as usize * height as usize * channels
    }

    fn start_recording(&mut self, status: u32) {
        self.status = status;
        self.polls_left = self.record_polls.unwrap_or(0);
    }

    fn poll_status(&mut self) -> u32 {
        if let Some(left) = self.arming {
            if left <= 1 {
                self.status = pdc::status::RECREADY;
                self.arming = None;
            } else {
                self.arming = Some(left - 1);
            }
        }

        let recording = self.status == pdc::status::ENDLESS || self.status == pdc::status::REC;

        if recording && self.record_polls.is_some() {
            if self.polls_left == 0 {
                self.status = pdc::status::LIVE;
            } else {
                self.polls_left -= 1;
            }
        }

        self.status
    }
}

impl PdcSdk for MockSdk {
    fn init(&self) -> SdkResult<()> {
        self.call("init", SdkCall::Init, |_| Ok(()))
    }

    fn detect_device(
        &self,
        _interface_code: u32,
        candidates: &[u32],
        _detect_param: u32,
    ) -> SdkResult<Vec<DetectInfo>> {
        self.call("detect_device", SdkCall::DetectDevice(candidates.to_vec()), |s| {
            Ok(s.device.iter().map(|(info, _)| *info).collect())
        })
    }

    fn open_device(&self, info: &DetectInfo) -> SdkResult<u32> {
        self.call("open_device", SdkCall::OpenDevice, |s| match s.device {
            Some((known, device_no)) if known == *info => Ok(device_no),
            _ => Err(SdkFailure(1)),
        })
    }

    fn record_rate(&self, _device_no: u32, _child_no: u32) -> SdkResult<u32> {
        self.call("record_rate", SdkCall::RecordRate, |s| Ok(s.rate))
    }

    fn record_rate_list(&self, _device_no: u32, _child_no: u32) -> SdkResult<Vec<u32>> {
        self.call("record_rate_list", SdkCall::RecordRateList, |s| Ok(s.rates.clone()))
    }

    fn set_record_rate(&self, _device_no: u32, _child_no: u32, rate: u32) -> SdkResult<()> {
        self.call("set_record_rate", SdkCall::SetRecordRate(rate), |s| {
            s.rate = rate;
            Ok(())
        })
    }

    fn resolution(&self, _device_no: u32, _child_no: u32) -> SdkResult<(u32, u32)> {
        self.call("resolution", SdkCall::Resolution, |s| Ok(s.resolution))
    }

    fn resolution_list(&self, _device_no: u32, _child_no: u32) -> SdkResult<Vec<u32>> {
        self.call("resolution_list", SdkCall::ResolutionList, |s| {
            Ok(s.resolution_list.clone())
        })
    }

    fn set_resolution(&self, _device_no: u32, _child_no: u32, width: u32, height: u32) -> SdkResult<()> {
        self.call("set_resolution", SdkCall::SetResolution(width, height), |s| {
            s.resolution = (width, height);
            Ok(())
        })
    }

    fn color_type(&self, _device_no: u32, _child_no: u32) -> SdkResult<u8> {
        self.call("color_type", SdkCall::ColorType, |s| Ok(s.color_type))
    }

    fn status(&self, _device_no: u32) -> SdkResult<u32> {
        self.call("status", SdkCall::Status, |s| Ok(s.poll_status()))
    }

    fn set_status(&self, _device_no: u32, status: u32) -> SdkResult<()> {
        self.call("set_status", SdkCall::SetStatus(status), |s| {
            s.status = status;
            s.arming = None;
            Ok(())
        })
    }

    fn set_trigger_mode(
        &self,
        _device_no: u32,
        mode: u32,
        after_frames: u32,
        _random_frames: u32,
        _rec_count: u32,
    ) -> SdkResult<()> {
        self.call(
            "set_trigger_mode",
            SdkCall::SetTriggerMode(mode, after_frames),
            |_| Ok(()),
        )
    }

    fn set_rec_ready(&self, _device_no: u32) -> SdkResult<()> {
        self.call("set_rec_ready", SdkCall::SetRecReady, |s| {
            if s.arms {
                if s.arm_delay == 0 {
                    s.status = pdc::status::RECREADY;
                } else {
                    s.arming = Some(s.arm_delay);
                }
            }
            Ok(())
        })
    }

    fn set_endless(&self, _device_no: u32) -> SdkResult<()> {
        self.call("set_endless", SdkCall::SetEndless, |s| {
            s.start_recording(pdc::status::ENDLESS);
            Ok(())
        })
    }

    fn trigger_in(&self, _device_no: u32) -> SdkResult<()> {
        self.call("trigger_in", SdkCall::TriggerIn, |s| {
            s.start_recording(pdc::status::REC);
            Ok(())
        })
    }

    fn live_image_data(&self, _device_no: u32, _child_no: u32, _bit_depth: u32, buf: &mut [u8]) -> SdkResult<()> {
        self.call("live_image_data", SdkCall::LiveImageData, |s| {
            if buf.len() != s.frame_len() {
                return Err(SdkFailure(BAD_BUFFER_CODE));
            }
            buf.fill(0x80);
            Ok(())
        })
    }

    fn mem_frame_info(&self, _device_no: u32, _child_no: u32) -> SdkResult<FrameInfo> {
        self.call("mem_frame_info", SdkCall::MemFrameInfo, |s| Ok(s.frame_info))
    }

    fn mem_image_data(
        &self,
        _device_no: u32,
        _child_no: u32,
        frame_no: i32,
        _bit_depth: u32,
        buf: &mut [u8],
    ) -> SdkResult<()> {
        self.call("mem_image_data", SdkCall::MemImageData(frame_no), |s| {
            if buf.len() != s.frame_len() {
                return Err(SdkFailure(BAD_BUFFER_CODE));
            }
            buf.fill(frame_no as u8);
            Ok(())
        })
    }
}
