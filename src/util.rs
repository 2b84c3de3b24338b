use std::{future::Future, time::Duration};

use log::*;
use tokio::time::{Instant, sleep};

use crate::{
    CamError, CamResult,
    cam::HsCam,
    sdk::PdcSdk,
    settings::{DeviceStatus, TriggerMode},
};

/// This trait drives the camera through its recording states.
///
/// Status changes are requested from the camera and then polled, sleeping
/// `poll_interval` (see [`CamConfig`](crate::settings::CamConfig)) between two queries.
pub trait CamUtil {
    /// Arms the camera and starts an endless recording into camera memory.
    ///
    /// Fails with [`CamError::Timeout`] if the camera does not report record-ready within
    /// `rec_ready_timeout`; the recording is not started in that case.
    fn begin_recording(&mut self) -> impl Future<Output = CamResult<()>> + Send;

    /// Forces the camera back to live. This does not check whether it was recording.
    fn halt_recording(&mut self) -> CamResult<()>;

    /// Records for `duration`, then halts.
    ///
    /// Returns early if the camera stops recording by itself (e.g. when memory is full).
    fn record_blocking(&mut self, duration: Duration) -> impl Future<Output = CamResult<()>> + Send;

    /// Records `frames` frames after a software trigger and waits until the camera is done.
    fn record_frames(&mut self, frames: u32) -> impl Future<Output = CamResult<()>> + Send;
}

/// Polls the status until `done` accepts it or `limit` elapses.
///
/// Returns `None` when the time ran out.
async fn poll_status<S: PdcSdk>(
    cam: &HsCam<S>,
    limit: Duration,
    done: impl Fn(DeviceStatus) -> bool,
) -> CamResult<Option<DeviceStatus>> {
    let deadline = Instant::now() + limit;

    loop {
        let status = cam.status()?;

        trace!("Polled status {status:?}");

        if done(status) {
            return Ok(Some(status));
        }

        if Instant::now() >= deadline {
            return Ok(None);
        }

        sleep(cam.config().poll_interval).await;
    }
}

/// Like [`poll_status`], but running out of time is an error.
async fn wait_for_status<S: PdcSdk>(
    cam: &HsCam<S>,
    operation: &'static str,
    limit: Duration,
    done: impl Fn(DeviceStatus) -> bool,
) -> CamResult<DeviceStatus> {
    let start = Instant::now();

    match poll_status(cam, limit, done).await? {
        Some(status) => Ok(status),
        None => {
            let waited = start.elapsed();

            error!("Timed out after {waited:?} waiting for {operation}");

            Err(CamError::Timeout { operation, waited })
        }
    }
}

impl<S: PdcSdk> CamUtil for HsCam<S> {
    async fn begin_recording(&mut self) -> CamResult<()> {
        self.set_trigger_mode(TriggerMode::Start, 0)?;
        self.set_rec_ready()?;

        let limit = self.config().rec_ready_timeout;
        wait_for_status(self, "record-ready", limit, DeviceStatus::is_armed).await?;

        self.set_endless()?;

        info!("Endless recording started");

        Ok(())
    }

    fn halt_recording(&mut self) -> CamResult<()> {
        self.set_status(DeviceStatus::Live)?;

        info!("Recording halted");

        Ok(())
    }

    async fn record_blocking(&mut self, duration: Duration) -> CamResult<()> {
        self.begin_recording().await?;

        let limit = duration + self.config().stop_pad;

        match poll_status(self, limit, |status| !status.is_recording()).await? {
            Some(status) => debug!("Camera left recording early ({status:?})"),
            None => debug!("Recorded for {duration:?}"),
        }

        self.halt_recording()
    }

    async fn record_frames(&mut self, frames: u32) -> CamResult<()> {
        self.set_trigger_mode(TriggerMode::Manual, frames)?;
        self.set_rec_ready()?;

        let limit = self.config().rec_ready_timeout;
        wait_for_status(self, "record-ready", limit, DeviceStatus::is_armed).await?;

        self.trigger_in()?;

        debug!("Triggered a recording of {frames} frames");

        let limit = self.config().record_timeout;
        let status = wait_for_status(self, "recording to finish", limit, |status| {
            !status.is_armed()
        })
        .await?;

        info!("Recording of {frames} frames finished ({status:?})");

        Ok(())
    }
}
