use std::{
    ffi::{c_char, c_void},
    path::{Path, PathBuf},
};

use libloading::Library;
use log::*;

use crate::{
    CamResult,
    consts::{PDC_LIBRARY_NAME, pdc},
    sdk::{DetectInfo, FrameInfo, PdcSdk, SdkFailure, SdkResult},
};

// The SDK declares every integer as `unsigned long`, which is 32 bits wide on Windows.
type InitFn = unsafe extern "system" fn(*mut u32) -> u32;
type DetectDeviceFn =
    unsafe extern "system" fn(u32, *mut u32, u32, u32, *mut RawDetectNumInfo, *mut u32) -> u32;
type OpenDeviceFn = unsafe extern "system" fn(*mut DetectInfo, *mut u32, *mut u32) -> u32;
type GetChildValueFn = unsafe extern "system" fn(u32, u32, *mut u32, *mut u32) -> u32;
type GetChildListFn = unsafe extern "system" fn(u32, u32, *mut u32, *mut u32, *mut u32) -> u32;
type SetChildValueFn = unsafe extern "system" fn(u32, u32, u32, *mut u32) -> u32;
type GetResolutionFn = unsafe extern "system" fn(u32, u32, *mut u32, *mut u32, *mut u32) -> u32;
type SetResolutionFn = unsafe extern "system" fn(u32, u32, u32, u32, *mut u32) -> u32;
type GetColorTypeFn = unsafe extern "system" fn(u32, u32, *mut c_char, *mut u32) -> u32;
type GetStatusFn = unsafe extern "system" fn(u32, *mut u32, *mut u32) -> u32;
type SetStatusFn = unsafe extern "system" fn(u32, u32, *mut u32) -> u32;
type SetTriggerModeFn = unsafe extern "system" fn(u32, u32, u32, u32, u32, *mut u32) -> u32;
type DeviceCommandFn = unsafe extern "system" fn(u32, *mut u32) -> u32;
type GetLiveImageDataFn = unsafe extern "system" fn(u32, u32, u32, *mut c_void, *mut u32) -> u32;
type GetMemFrameInfoFn = unsafe extern "system" fn(u32, u32, *mut FrameInfo, *mut u32) -> u32;
type GetMemImageDataFn =
    unsafe extern "system" fn(u32, u32, i32, u32, *mut c_void, *mut u32) -> u32;

/// `PDC_DETECT_NUM_INFO`
#[repr(C)]
struct RawDetectNumInfo {
    device_num: u32,
    detect_info: [DetectInfo; pdc::MAX_DEVICE],
}

/// Calls an SDK entry point, appending the error code out-parameter,
/// and turns the failure sentinel into an [`SdkFailure`].
macro_rules! pdc_call {
    ($func:expr $(, $arg:expr)*) => {{
        let mut error_code: u32 = 0;
        let ret = unsafe { ($func)($($arg,)* &mut error_code) };

        if ret == pdc::FAILED {
            Err(SdkFailure(error_code))
        } else {
            Ok(())
        }
    }};
}

/// The vendor SDK, loaded at runtime from `PDCLIB`.
///
/// Every entry point is resolved once in [`PdcLibrary::load`]; a missing symbol fails the load
/// instead of the first call that needs it.
pub struct PdcLibrary {
    init: InitFn,
    detect_device: DetectDeviceFn,
    open_device: OpenDeviceFn,
    get_record_rate: GetChildValueFn,
    get_record_rate_list: GetChildListFn,
    set_record_rate: SetChildValueFn,
    get_resolution: GetResolutionFn,
    get_resolution_list: GetChildListFn,
    set_resolution: SetResolutionFn,
    get_color_type: GetColorTypeFn,
    get_status: GetStatusFn,
    set_status: SetStatusFn,
    set_trigger_mode: SetTriggerModeFn,
    set_rec_ready: DeviceCommandFn,
    set_endless: DeviceCommandFn,
    trigger_in: DeviceCommandFn,
    get_live_image_data: GetLiveImageDataFn,
    get_mem_frame_info: GetMemFrameInfoFn,
    get_mem_image_data: GetMemImageDataFn,

    // Keeps the function pointers above valid.
    _lib: Library,
}

/// Copies a function pointer out of the library.
///
/// # Safety
/// `T` must match the signature of the exported symbol.
unsafe fn symbol<T: Copy>(lib: &Library, name: &[u8]) -> CamResult<T> {
    let sym = unsafe { lib.get::<T>(name) }?;

    Ok(*sym)
}

impl PdcLibrary {
    /// Loads the SDK.
    ///
    /// * `search_dir` - Directory holding the vendor library. With `None` the platform's
    ///   regular library search path is used.
    pub fn load(search_dir: Option<&Path>) -> CamResult<Self> {
        let file_name = libloading::library_filename(PDC_LIBRARY_NAME);
        let path = match search_dir {
            Some(dir) => dir.join(&file_name),
            None => PathBuf::from(&file_name),
        };

        info!("Loading PDC SDK from {}", path.display());

        let lib = unsafe { Library::new(&path) }
            .inspect_err(|e| error!("Unable to load {}: {e}", path.display()))?;

        unsafe {
            Ok(Self {
                init: symbol(&lib, b"PDC_Init\0")?,
                detect_device: symbol(&lib, b"PDC_DetectDevice\0")?,
                open_device: symbol(&lib, b"PDC_OpenDevice\0")?,
                get_record_rate: symbol(&lib, b"PDC_GetRecordRate\0")?,
                get_record_rate_list: symbol(&lib, b"PDC_GetRecordRateList\0")?,
                set_record_rate: symbol(&lib, b"PDC_SetRecordRate\0")?,
                get_resolution: symbol(&lib, b"PDC_GetResolution\0")?,
                get_resolution_list: symbol(&lib, b"PDC_GetResolutionList\0")?,
                set_resolution: symbol(&lib, b"PDC_SetResolution\0")?,
                get_color_type: symbol(&lib, b"PDC_GetColorType\0")?,
                get_status: symbol(&lib, b"PDC_GetStatus\0")?,
                set_status: symbol(&lib, b"PDC_SetStatus\0")?,
                set_trigger_mode: symbol(&lib, b"PDC_SetTriggerMode\0")?,
                set_rec_ready: symbol(&lib, b"PDC_SetRecReady\0")?,
                set_endless: symbol(&lib, b"PDC_SetEndless\0")?,
                trigger_in: symbol(&lib, b"PDC_TriggerIn\0")?,
                get_live_image_data: symbol(&lib, b"PDC_GetLiveImageData\0")?,
                get_mem_frame_info: symbol(&lib, b"PDC_GetMemFrameInfo\0")?,
                get_mem_image_data: symbol(&lib, b"PDC_GetMemImageData\0")?,
                _lib: lib,
            })
        }
    }

    fn child_list(
        func: GetChildListFn,
        device_no: u32,
        child_no: u32,
    ) -> SdkResult<Vec<u32>> {
        let mut size: u32 = 0;
        let mut list = [0u32; pdc::MAX_LIST_NUMBER];

        pdc_call!(func, device_no, child_no, &mut size, list.as_mut_ptr())?;

        let len = (size as usize).min(pdc::MAX_LIST_NUMBER);

        Ok(list[..len].to_vec())
    }
}

impl PdcSdk for PdcLibrary {
    fn init(&self) -> SdkResult<()> {
        pdc_call!(self.init)
    }

    fn detect_device(
        &self,
        interface_code: u32,
        candidates: &[u32],
        detect_param: u32,
    ) -> SdkResult<Vec<DetectInfo>> {
        let count = candidates.len().min(pdc::MAX_DEVICE);
        let mut detect_no = [0u32; pdc::MAX_DEVICE];
        detect_no[..count].copy_from_slice(&candidates[..count]);

        let mut found = RawDetectNumInfo {
            device_num: 0,
            detect_info: [DetectInfo::default(); pdc::MAX_DEVICE],
        };

        pdc_call!(
            self.detect_device,
            interface_code,
            detect_no.as_mut_ptr(),
            count as u32,
            detect_param,
            &mut found
        )?;

        let found_len = (found.device_num as usize).min(pdc::MAX_DEVICE);

        Ok(found.detect_info[..found_len].to_vec())
    }

    fn open_device(&self, info: &DetectInfo) -> SdkResult<u32> {
        let mut info = *info;
        let mut device_no: u32 = 0;

        pdc_call!(self.open_device, &mut info, &mut device_no)?;

        Ok(device_no)
    }

    fn record_rate(&self, device_no: u32, child_no: u32) -> SdkResult<u32> {
        let mut rate: u32 = 0;

        pdc_call!(self.get_record_rate, device_no, child_no, &mut rate)?;

        Ok(rate)
    }

    fn record_rate_list(&self, device_no: u32, child_no: u32) -> SdkResult<Vec<u32>> {
        Self::child_list(self.get_record_rate_list, device_no, child_no)
    }

    fn set_record_rate(&self, device_no: u32, child_no: u32, rate: u32) -> SdkResult<()> {
        pdc_call!(self.set_record_rate, device_no, child_no, rate)
    }

    fn resolution(&self, device_no: u32, child_no: u32) -> SdkResult<(u32, u32)> {
        let mut width: u32 = 0;
        let mut height: u32 = 0;

        pdc_call!(self.get_resolution, device_no, child_no, &mut width, &mut height)?;

        Ok((width, height))
    }

    fn resolution_list(&self, device_no: u32, child_no: u32) -> SdkResult<Vec<u32>> {
        Self::child_list(self.get_resolution_list, device_no, child_no)
    }

    fn set_resolution(&self, device_no: u32, child_no: u32, width: u32, height: u32) -> SdkResult<()> {
        pdc_call!(self.set_resolution, device_no, child_no, width, height)
    }

    fn color_type(&self, device_no: u32, child_no: u32) -> SdkResult<u8> {
        let mut color_type: c_char = 0;

        pdc_call!(self.get_color_type, device_no, child_no, &mut color_type)?;

        Ok(color_type as u8)
    }

    fn status(&self, device_no: u32) -> SdkResult<u32> {
        let mut status: u32 = 0;

        pdc_call!(self.get_status, device_no, &mut status)?;

        Ok(status)
    }

    fn set_status(&self, device_no: u32, status: u32) -> SdkResult<()> {
        pdc_call!(self.set_status, device_no, status)
    }

    fn set_trigger_mode(
        &self,
        device_no: u32,
        mode: u32,
        after_frames: u32,
        random_frames: u32,
        rec_count: u32,
    ) -> SdkResult<()> {
        pdc_call!(self.set_trigger_mode, device_no, mode, after_frames, random_frames, rec_count)
    }

    fn set_rec_ready(&self, device_no: u32) -> SdkResult<()> {
        pdc_call!(self.set_rec_ready, device_no)
    }

    fn set_endless(&self, device_no: u32) -> SdkResult<()> {
        pdc_call!(self.set_endless, device_no)
    }

    fn trigger_in(&self, device_no: u32) -> SdkResult<()> {
        pdc_call!(self.trigger_in, device_no)
    }

    fn live_image_data(&self, device_no: u32, child_no: u32, bit_depth: u32, buf: &mut [u8]) -> SdkResult<()> {
        pdc_call!(
            self.get_live_image_data,
            device_no,
            child_no,
            bit_depth,
            buf.as_mut_ptr().cast::<c_void>()
        )
    }

    fn mem_frame_info(&self, device_no: u32, child_no: u32) -> SdkResult<FrameInfo> {
        let mut info = FrameInfo::default();

        pdc_call!(self.get_mem_frame_info, device_no, child_no, &mut info)?;

        Ok(info)
    }

    fn mem_image_data(
        &self,
        device_no: u32,
        child_no: u32,
        frame_no: i32,
        bit_depth: u32,
        buf: &mut [u8],
    ) -> SdkResult<()> {
        pdc_call!(
            self.get_mem_image_data,
            device_no,
            child_no,
            frame_no,
            bit_depth,
            buf.as_mut_ptr().cast::<c_void>()
        )
    }
}
