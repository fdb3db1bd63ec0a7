//! `markwav columns`: show what the converter would pick from a log.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use markwav::markers::detect_time_column;
use markwav::{detect_frame_rate, CsvTable};

#[cfg(not(tarpaulin_include))]
pub fn handle(file: &Path) -> Result<()> {
    let text =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let table = CsvTable::parse(&text)?;
    let time_column = detect_time_column(table.headers());

    println!("{} ({} rows)", file.display(), table.len());
    for (index, header) in table.headers().iter().enumerate() {
        let sample = table
            .column(header)
            .find(|value| !value.is_empty())
            .unwrap_or("");
        let role = if Some(header.as_str()) == time_column {
            "time"
        } else {
            "label"
        };
        println!("  {:>2}  {:<24} {:<6} {}", index + 1, header, role, sample);
    }
    println!("Detected frame rate: {} fps", detect_frame_rate(&text));
    Ok(())
}
