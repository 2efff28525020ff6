use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// WAV sample played on every beat
    #[arg(required_unless_present = "list_devices")]
    pub sample: Option<PathBuf>,

    /// List MIDI inputs and audio outputs, then exit
    #[arg(short = 'l', long)]
    pub list_devices: bool,

    /// MIDI input port to read taps from (default: first port)
    #[arg(short, long, value_name = "DEVICE")]
    pub input: Option<String>,

    /// Audio output device (default: system default)
    #[arg(short, long, value_name = "DEVICE")]
    pub output: Option<String>,

    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log beats instead of playing audio
    #[arg(long)]
    pub dry_run: bool,

    /// Do not draw the status line
    #[arg(long)]
    pub no_status: bool,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}
