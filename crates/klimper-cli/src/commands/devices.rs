//! Audio device listing.

use klimper_io::list_devices;

pub fn run() -> anyhow::Result<()> {
    let devices = list_devices()?;

    if devices.is_empty() {
        println!("No audio output devices found.");
        return Ok(());
    }

    println!("Output Devices");
    println!("==============\n");
    for (idx, device) in devices.iter().enumerate() {
        let default = if device.is_default { " (default)" } else { "" };
        println!(
            "  [{}] {} ({} Hz){}",
            idx, device.name, device.default_sample_rate, default
        );
    }

    println!();
    println!("Tip: Use device index or partial name with --output:");
    println!("  klimper play --output 0");
    println!("  klimper play --output \"USB\"");

    Ok(())
}
