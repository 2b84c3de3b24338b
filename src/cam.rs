use std::{path::Path, sync::Arc};

use log::*;

use crate::{
    CamError, CamResult,
    consts::{self, pdc},
    ffi::PdcLibrary,
    handle::InterfaceId,
    sdk::{FrameInfo, PdcSdk, SdkFailure, SdkResult},
    settings::*,
};

/// Turns a failed SDK call into [`CamError::Device`], keeping the vendor error code.
pub(crate) trait SdkResultExt<T> {
    fn or_device(self, message: &str) -> CamResult<T>;
}

impl<T> SdkResultExt<T> for SdkResult<T> {
    fn or_device(self, message: &str) -> CamResult<T> {
        self.map_err(|SdkFailure(code)| {
            error!("{message} (error code {code})");

            CamError::Device {
                message: message.to_owned(),
                code: Some(code),
            }
        })
    }
}

/// Converts a dotted-decimal IPv4 address into the numeric form the SDK expects.
///
/// Octets are shifted in from the left, so `"192.168.1.10"` becomes `0xC0A8010A`.
pub fn parse_ipv4(address: &str) -> CamResult<u32> {
    let invalid = |reason: String| CamError::InvalidAddress {
        address: address.to_owned(),
        reason,
    };

    let mut numeric: u32 = 0;
    let mut octets = 0;

    for part in address.split('.') {
        let octet: u8 = part
            .parse()
            .map_err(|e| invalid(format!("`{part}` is not a decimal octet ({e})")))?;

        numeric = (numeric << 8) | u32::from(octet);
        octets += 1;
    }

    if octets != 4 {
        return Err(invalid(format!("expected 4 octets, found {octets}")));
    }

    Ok(numeric)
}

/// An initialized SDK. Opens cameras.
pub struct PdcSession<S: PdcSdk> {
    sdk: Arc<S>,
}

impl PdcSession<PdcLibrary> {
    /// Loads the vendor library from `search_dir` (or the default search path) and initializes it.
    pub fn load(search_dir: Option<&Path>) -> CamResult<Self> {
        Self::new(PdcLibrary::load(search_dir)?)
    }
}

impl<S: PdcSdk> PdcSession<S> {
    /// Initializes the SDK. This must succeed before any camera can be opened.
    pub fn new(sdk: S) -> CamResult<Self> {
        sdk.init().or_device("SDK initialization failed")?;

        info!("PDC SDK initialized");

        Ok(Self { sdk: Arc::new(sdk) })
    }

    /// Searches for a camera at the given IPv4 address and opens it.
    ///
    /// Fails if the search fails, finds nothing, or finds a device answering from another address.
    pub fn open_device_by_ip(&self, ip: &str) -> CamResult<HsCam<S>> {
        let ip_numeric = parse_ipv4(ip)?;

        debug!("Searching for a device at {ip} ({ip_numeric:#010x})");

        let found = self
            .sdk
            .detect_device(pdc::INTTYPE_G_ETHER, &[ip_numeric], pdc::DETECT_NORMAL)
            .or_device("Device search failed")?;

        let Some(info) = found.first().copied() else {
            error!("SDK reported no devices at {ip}");

            return Err(CamError::Device {
                message: format!("No device found at {ip}"),
                code: None,
            });
        };

        if info.tmp_device_no != ip_numeric {
            error!(
                "SDK found unexpected device at {:#010x}, expected {ip_numeric:#010x}",
                info.tmp_device_no
            );

            return Err(CamError::Device {
                message: format!("SDK found unexpected ip {:#010x}", info.tmp_device_no),
                code: None,
            });
        }

        let device_no = self
            .sdk
            .open_device(&info)
            .or_device("Failed to open device")?;

        let id = InterfaceId::new(device_no, consts::DEFAULT_CHILD_NO);

        info!(
            "Opened device {device_no} at {ip} (model code {:#x})",
            info.device_code
        );

        Ok(HsCam {
            sdk: Arc::clone(&self.sdk),
            id,
            device_code: Some(info.device_code),
            config: CamConfig::default(),
        })
    }

    /// Re-attaches to a device opened earlier in this process, for callers that only kept the raw id.
    pub fn camera(&self, id: InterfaceId) -> HsCam<S> {
        HsCam {
            sdk: Arc::clone(&self.sdk),
            id,
            device_code: None,
            config: CamConfig::default(),
        }
    }
}

/// Struct for interacting with one opened camera.
///
/// The camera is a single-owner resource: anything that changes its state takes `&mut self`.
pub struct HsCam<S: PdcSdk> {
    sdk: Arc<S>,
    id: InterfaceId,
    device_code: Option<u32>,
    config: CamConfig,
}

impl<S: PdcSdk> HsCam<S> {
    /// Replaces the timing configuration used by the recording functions.
    pub fn with_config(mut self, config: CamConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CamConfig {
        &self.config
    }

    pub fn interface_id(&self) -> InterfaceId {
        self.id
    }

    /// Model code reported when the device was detected. `None` for re-attached cameras.
    pub fn device_code(&self) -> Option<u32> {
        self.device_code
    }

    #[cfg(test)]
    pub(crate) fn sdk(&self) -> &S {
        &self.sdk
    }

    fn dev(&self) -> u32 {
        self.id.device_no()
    }

    fn child(&self) -> u32 {
        self.id.child_no()
    }

    /// Returns the current capture rate in frames per second.
    pub fn capture_rate(&self) -> CamResult<u32> {
        self.sdk
            .record_rate(self.dev(), self.child())
            .or_device("Failed to retrieve the record rate")
    }

    /// Returns every capture rate valid in the current mode, in the order reported by the camera.
    pub fn valid_capture_rates(&self) -> CamResult<Vec<u32>> {
        self.sdk
            .record_rate_list(self.dev(), self.child())
            .or_device("Failed to retrieve the record rate list")
    }

    /// Sets the capture rate.
    ///
    /// The rate is checked against [`valid_capture_rates`](Self::valid_capture_rates) first;
    /// a rate missing from that list is never sent to the camera.
    pub fn set_capture_rate(&mut self, rate: u32) -> CamResult<()> {
        let rates = self.valid_capture_rates()?;

        if !rates.contains(&rate) {
            warn!("Rejected capture rate {rate}, valid rates: {rates:?}");

            return Err(CamError::InvalidArgument(format!(
                "capture rate {rate} is not valid, see valid_capture_rates()"
            )));
        }

        self.sdk
            .set_record_rate(self.dev(), self.child(), rate)
            .or_device("Camera rejected the record rate")?;

        debug!("Capture rate set to {rate}");

        Ok(())
    }

    pub fn resolution(&self) -> CamResult<Resolution> {
        self.sdk
            .resolution(self.dev(), self.child())
            .map(Resolution::from)
            .or_device("Failed to retrieve the resolution")
    }

    /// Returns every resolution valid at the current capture rate.
    pub fn valid_resolutions(&self) -> CamResult<Vec<Resolution>> {
        let packed = self
            .sdk
            .resolution_list(self.dev(), self.child())
            .or_device("Failed to retrieve the resolution list")?;

        Ok(packed.into_iter().map(Resolution::from_packed).collect())
    }

    /// Sets the resolution. The camera validates the value.
    pub fn set_resolution(&mut self, width: u32, height: u32) -> CamResult<()> {
        self.sdk
            .set_resolution(self.dev(), self.child(), width, height)
            .or_device("Failed to set the resolution")?;

        debug!("Resolution set to {width}x{height}");

        Ok(())
    }

    /// Returns `true` for a monochrome sensor.
    pub fn is_monochrome(&self) -> CamResult<bool> {
        let color_type = self
            .sdk
            .color_type(self.dev(), self.child())
            .or_device("Failed to retrieve the color type")?;

        Ok(color_type == pdc::COLORTYPE_MONO)
    }

    pub fn status(&self) -> CamResult<DeviceStatus> {
        let raw = self
            .sdk
            .status(self.dev())
            .or_device("Failed to retrieve the device status")?;

        DeviceStatus::try_from(raw)
            .inspect_err(|_| warn!("Received invalid device status ({raw:#x})"))
            .map_err(|_| CamError::UnexpectedValue {
                what: "device status",
                value: raw,
            })
    }

    /// Requests a status change. The camera performs the transition; poll [`status`](Self::status) to follow it.
    pub fn set_status(&mut self, status: DeviceStatus) -> CamResult<()> {
        trace!("Requesting status {status:?}");

        self.sdk
            .set_status(self.dev(), status.into())
            .or_device("Failed to set the device status")
    }

    /// Selects where the trigger lands in the recording.
    ///
    /// * `after_frames` - Frames recorded after the trigger, used by [`TriggerMode::Manual`].
    pub fn set_trigger_mode(&mut self, mode: TriggerMode, after_frames: u32) -> CamResult<()> {
        self.sdk
            .set_trigger_mode(self.dev(), mode.into(), after_frames, 0, 0)
            .or_device("Failed to set the trigger mode")
    }

    pub(crate) fn set_rec_ready(&mut self) -> CamResult<()> {
        self.sdk
            .set_rec_ready(self.dev())
            .or_device("Failed to arm the recording")
    }

    pub(crate) fn set_endless(&mut self) -> CamResult<()> {
        self.sdk
            .set_endless(self.dev())
            .or_device("Failed to start endless recording")
    }

    pub(crate) fn trigger_in(&mut self) -> CamResult<()> {
        self.sdk
            .trigger_in(self.dev())
            .or_device("Failed to send the trigger")
    }

    /// Size in bytes of one frame in the current mode.
    pub fn frame_len(&self) -> CamResult<usize> {
        let resolution = self.resolution()?;
        let monochrome = self.is_monochrome()?;

        Ok(resolution.frame_len(monochrome))
    }

    /// Captures one frame from the live sensor.
    ///
    /// Returns 8-bit samples, one per pixel for monochrome sensors, three (BGR) otherwise.
    pub fn capture_live_image(&self) -> CamResult<Vec<u8>> {
        let mut buf = vec![0u8; self.frame_len()?];

        self.sdk
            .live_image_data(self.dev(), self.child(), consts::IMAGE_BIT_DEPTH, &mut buf)
            .or_device("Failed to capture a live image")?;

        Ok(buf)
    }

    /// Returns the layout of the recording held in camera memory.
    ///
    /// The camera is switched to playback for the query and back to live afterwards.
    pub fn memory_frame_info(&mut self) -> CamResult<FrameInfo> {
        self.with_playback(|cam| cam.read_frame_info())
    }

    /// Returns the number of frames recorded in camera memory.
    ///
    /// The camera is switched to playback for the query and back to live afterwards.
    pub fn memory_frame_count(&mut self) -> CamResult<u32> {
        Ok(self.memory_frame_info()?.recorded_frames)
    }

    /// Reads one recorded frame from camera memory.
    ///
    /// * `frame_n` - Index counted from the trigger frame, in `0..memory_frame_count()`.
    ///
    /// The camera is back in live mode when this returns, whether it succeeded or not.
    pub fn image_from_memory(&mut self, frame_n: u32) -> CamResult<Vec<u8>> {
        self.with_playback(|cam| {
            let info = cam.read_frame_info()?;

            if frame_n >= info.recorded_frames {
                return Err(CamError::InvalidArgument(format!(
                    "frame {frame_n} is out of range, {} frames recorded",
                    info.recorded_frames
                )));
            }

            let frame_no = i32::try_from(i64::from(info.trigger) + i64::from(frame_n))
                .map_err(|_| CamError::InvalidArgument(format!("frame {frame_n} is out of range")))?;

            let mut buf = vec![0u8; cam.frame_len()?];

            cam.sdk
                .mem_image_data(
                    cam.dev(),
                    cam.child(),
                    frame_no,
                    consts::IMAGE_BIT_DEPTH,
                    &mut buf,
                )
                .or_device("Failed to read the image from memory")?;

            Ok(buf)
        })
    }

    fn read_frame_info(&self) -> CamResult<FrameInfo> {
        self.sdk
            .mem_frame_info(self.dev(), self.child())
            .or_device("Failed to retrieve the memory frame info")
    }

    /// Runs `op` with the camera in playback and restores live status afterwards.
    /// An error from `op` takes precedence over an error while restoring.
    fn with_playback<T>(&mut self, op: impl FnOnce(&mut Self) -> CamResult<T>) -> CamResult<T> {
        if self.status()? != DeviceStatus::Playback {
            self.set_status(DeviceStatus::Playback)?;
        }

        let res = op(self);
        let restored = self.set_status(DeviceStatus::Live);

        match (res, restored) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(restore_err)) => {
                warn!("Unable to restore live status after a failed memory access ({restore_err})");
                Err(e)
            }
        }
    }
}
