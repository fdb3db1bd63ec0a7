//! Development tasks for markwav.
//!
//! Run with `cargo xtask <task>`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", about = "markwav development tasks")]
struct Xtask {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Generate man pages for markwav and its subcommands
    Man {
        /// Output directory
        #[arg(long, default_value = "target/man")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    match Xtask::parse().task {
        Task::Man { out_dir } => generate_man_pages(&out_dir),
    }
}

fn generate_man_pages(out_dir: &PathBuf) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let cmd = markwav::cli::Cli::command();
    let path = out_dir.join("markwav.1");
    write_page(&cmd, &path)?;

    for sub in cmd.get_subcommands() {
        let name = format!("markwav-{}", sub.get_name());
        let sub = sub.clone().name(name.clone());
        write_page(&sub, &out_dir.join(format!("{name}.1")))?;
    }

    println!("Man pages written to {}", out_dir.display());
    Ok(())
}

fn write_page(cmd: &clap::Command, path: &PathBuf) -> Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut buffer)?;
    fs::write(path, buffer).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
