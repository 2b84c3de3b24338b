use std::{path::PathBuf, time::Duration};

use hscam_lib_rs::{cam::PdcSession, util::CamUtil};

#[tokio::main]
/// This example records for 250 ms at the lowest capture rate and fetches the last recorded frame.
///
/// Usage: `record_and_fetch [camera ip] [sdk directory]`
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let ip = args.next().unwrap_or_else(|| "192.168.0.10".to_owned());
    let sdk_dir = args.next().map(PathBuf::from);

    let session = PdcSession::load(sdk_dir.as_deref())?;

    let mut cam = match session.open_device_by_ip(&ip) {
        Ok(cam) => cam,
        Err(e) => {
            eprintln!("Unable to open {ip}: {e} (vendor code: {:?})", e.code());
            return Err(e.into());
        }
    };

    println!("Opened {ip} as {:?}", cam.interface_id());

    cam.set_resolution(1024, 1024)?;
    println!("Resolution: {:?}", cam.resolution()?);

    let rates = cam.valid_capture_rates()?;
    println!("Valid capture rates: {rates:?}");

    if let Some(&lowest) = rates.iter().min() {
        cam.set_capture_rate(lowest)?;
    }

    cam.record_blocking(Duration::from_millis(250)).await?;

    let frames = cam.memory_frame_count()?;
    println!("Recorded {frames} frames");

    if frames > 0 {
        // counting starts from 0
        let img = cam.image_from_memory(frames - 1)?;
        println!("Last frame: {} bytes", img.len());
    }

    Ok(())
}
