//! `markwav inspect`: list the cue markers of a WAV file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};

use markwav::{Timecode, WavInfo};

#[cfg(not(tarpaulin_include))]
pub fn handle(file: &Path, json: bool, fps: f64) -> Result<()> {
    if fps <= 0.0 {
        bail!("--fps must be positive");
    }
    let handle = File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let info = WavInfo::read(&mut BufReader::new(handle))
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", file.display());
    if let Some(format) = info.format {
        println!(
            "  Format:    {} Hz, {} ch, {} bit",
            format.sample_rate, format.channels, format.bits_per_sample
        );
    }
    if let Some(duration) = info.duration_secs() {
        println!(
            "  Duration:  {} ({:.3} s)",
            Timecode::from_seconds(duration, fps),
            duration
        );
    }
    if let Some(bext) = &info.bext {
        println!("  Origin:    {} ({})", bext.originator, bext.description);
        println!(
            "  Created:   {} {}",
            bext.origination_date, bext.origination_time
        );
        println!("  TimeRef:   {} samples", bext.time_reference);
    }

    let markers = info.markers();
    println!("  Markers:   {}", markers.len());
    for (cue, marker) in info.cues.iter().zip(&markers) {
        println!(
            "  {:>4}  {:>10}  {}  {}",
            cue.id,
            cue.position,
            Timecode::from_seconds(marker.offset_secs(), fps),
            marker.label()
        );
    }
    Ok(())
}
