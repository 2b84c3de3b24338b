use hscam_lib_rs::cam::PdcSession;
use image::{GrayImage, RgbImage};

/// This example captures one live frame and saves it as a JPG image.
///
/// Usage: `live_image [camera ip]`
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ip = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "192.168.0.10".to_owned());

    let session = PdcSession::load(None)?;
    let cam = session.open_device_by_ip(&ip)?;

    let res = cam.resolution()?;
    let mono = cam.is_monochrome()?;
    let mut data = cam.capture_live_image()?;

    println!(
        "Captured {}x{} {} frame ({} bytes)",
        res.width,
        res.height,
        if mono { "mono" } else { "color" },
        data.len()
    );

    if mono {
        let img = GrayImage::from_raw(res.width, res.height, data).ok_or("frame size mismatch")?;
        img.save("live.jpg")?;
    } else {
        // The camera delivers BGR
        for px in data.chunks_exact_mut(3) {
            px.swap(0, 2);
        }

        let img = RgbImage::from_raw(res.width, res.height, data).ok_or("frame size mismatch")?;
        img.save("live.jpg")?;
    }

    Ok(())
}
