//! tagline: command-line ID3 tag editor.
//!
//! Prints, edits and removes ID3v2 tags and ID3v1 trailers in audio files.
//!
//! # Usage
//!
//! ```bash
//! tagline print song.mp3
//! tagline print --frames --json song.mp3
//! tagline set artist "Someone / Someone Else" *.mp3
//! tagline set TIT2 "Title" song.mp3
//! tagline remove comment song.mp3
//! tagline delete --v1 song.mp3
//! tagline dump song.mp3 > tag.bin
//! tagline load other.mp3 < tag.bin
//! tagline list --version 3
//! ```

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use tagline_format::registry::{self, FrameClass};
use tagline_format::{
    delete_tag, detect_tag, is_friendly_name, read_tag, Error, Frame, PatchOptions, Tag, Tag1, Version,
    FRIENDLY_NAMES,
};

// ───────────────────────────── CLI definition ─────────────────────────────

/// Top-level CLI entry point for the `tagline` binary.
#[derive(Parser)]
#[command(name = "tagline", about = "Read and edit ID3 tags in audio files", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Do everything except writing files.
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available sub-commands.
#[derive(Subcommand)]
enum Commands {
    /// Print the ID3v2 tag of each file.
    Print {
        /// List raw frames instead of friendly names.
        #[arg(short, long)]
        frames: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Set a friendly name (e.g. "artist") or a text or URL frame (e.g. "TIT2").
    ///
    /// Files without a tag get a new ID3v2.4 tag.
    Set {
        name: String,

        /// New value; multiple text values are separated by " / ".
        value: String,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Remove a friendly name or all frames with a frame id.
    Remove {
        name: String,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Delete the ID3v2 tag of each file.
    Delete {
        /// Delete the ID3v1 trailer as well.
        #[arg(long)]
        v1: bool,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Write the raw bytes of a file's ID3v2 tag to stdout.
    Dump { file: PathBuf },

    /// Replace a file's ID3v2 tag with raw tag bytes read from stdin.
    Load { file: PathBuf },

    /// List the frame types known for a tag version.
    List {
        /// Major version: 2, 3 or 4.
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(2..=4))]
        version: u8,
    },

    /// Print the ID3v1 tag of each file.
    V1 {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

// ───────────────────────────── Entry point ─────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let dry_run = cli.dry_run;
    match cli.command {
        Commands::Print { frames, json, files } => cmd_print(&files, frames, json),
        Commands::Set { name, value, files } => {
            for_each_tag(&files, dry_run, true, |tag| set_value(tag, &name, &value))
        }
        Commands::Remove { name, files } => for_each_tag(&files, dry_run, false, |tag| remove_value(tag, &name)),
        Commands::Delete { v1, files } => cmd_delete(&files, v1, dry_run),
        Commands::Dump { file } => cmd_dump(&file),
        Commands::Load { file } => cmd_load(&file, dry_run),
        Commands::List { version } => cmd_list(version),
        Commands::V1 { files } => cmd_v1(&files),
    }
}

// ───────────────────────────── Commands ─────────────────────────────

fn cmd_print(files: &[PathBuf], frames: bool, json: bool) -> Result<()> {
    let mut reports = Vec::new();
    for file in files {
        let tag = match read_tag(file) {
            Ok(tag) => tag,
            Err(Error::NoTag(_)) => {
                eprintln!("{}: no ID3v2 tag", file.display());
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read tag: {}", file.display())),
        };
        let report = TagReport::new(file, &tag, frames)?;
        if json {
            reports.push(report.to_json());
        } else {
            report.print_human();
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

/// Read (or create) the tag of each file, apply `edit`, and write it back.
fn for_each_tag(
    files: &[PathBuf],
    dry_run: bool,
    create: bool,
    mut edit: impl FnMut(&mut Tag) -> Result<()>,
) -> Result<()> {
    for file in files {
        let mut tag = match read_tag(file) {
            Ok(tag) => tag,
            Err(Error::NoTag(_)) if create => Tag::new(Version::V2_4),
            Err(Error::NoTag(_)) => {
                tracing::warn!(file = %file.display(), "No ID3v2 tag");
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read tag: {}", file.display())),
        };
        edit(&mut tag).with_context(|| format!("Failed to update {}", file.display()))?;
        if dry_run {
            tracing::info!(file = %file.display(), "Dry run; not writing");
            continue;
        }
        tag.write(file)
            .with_context(|| format!("Failed to write tag: {}", file.display()))?;
    }
    Ok(())
}

fn set_value(tag: &mut Tag, name: &str, value: &str) -> Result<()> {
    if is_friendly_name(name) {
        return Ok(tag.set_friendly(name, value)?);
    }
    let descriptor = frame_descriptor(tag.version(), name)?;
    let frame = match descriptor.class {
        FrameClass::Text => Frame::text(name, value.split(" / "))?,
        FrameClass::Url => Frame::url(name, value)?,
        FrameClass::Other => bail!("{name} is not a text or URL frame; it cannot be set from the command line"),
    };
    tag.set(frame);
    Ok(())
}

fn remove_value(tag: &mut Tag, name: &str) -> Result<()> {
    if is_friendly_name(name) {
        return Ok(tag.remove_friendly(name)?);
    }
    if tag.remove(name).is_empty() {
        tracing::warn!(frameid = name, "No such frame");
    }
    Ok(())
}

fn frame_descriptor(version: Version, name: &str) -> Result<&'static registry::FrameDescriptor> {
    let Some(descriptor) = registry::lookup(name) else {
        bail!(
            "Unknown name {name:?}; use a frame id or one of: {}",
            FRIENDLY_NAMES.join(", ")
        );
    };
    if !descriptor.versions.contains(version) {
        bail!("{name} is not defined in {version} tags");
    }
    Ok(descriptor)
}

fn cmd_delete(files: &[PathBuf], v1: bool, dry_run: bool) -> Result<()> {
    for file in files {
        if dry_run {
            let found = detect_tag(file)
                .with_context(|| format!("Failed to inspect {}", file.display()))?
                .is_some();
            tracing::info!(file = %file.display(), found, "Dry run; not deleting");
            continue;
        }
        let deleted = delete_tag(file).with_context(|| format!("Failed to delete tag: {}", file.display()))?;
        if !deleted {
            tracing::warn!(file = %file.display(), "No ID3v2 tag");
        }
        if v1 && !Tag1::delete(file).with_context(|| format!("Failed to delete ID3v1 tag: {}", file.display()))? {
            tracing::warn!(file = %file.display(), "No ID3v1 tag");
        }
    }
    Ok(())
}

fn cmd_dump(file: &Path) -> Result<()> {
    let Some(info) = detect_tag(file).with_context(|| format!("Failed to inspect {}", file.display()))? else {
        bail!("{}: no ID3v2 tag", file.display());
    };
    let mut data = vec![0u8; info.length as usize];
    let mut reader = std::fs::File::open(file)?;
    reader
        .read_exact(&mut data)
        .with_context(|| format!("{}: tag extends past the end of the file", file.display()))?;
    std::io::stdout().lock().write_all(&data)?;
    Ok(())
}

fn cmd_load(file: &Path, dry_run: bool) -> Result<()> {
    let mut data = Vec::new();
    std::io::stdin().read_to_end(&mut data)?;
    let tag = Tag::decode(&data).context("Input is not a valid ID3v2 tag")?;
    tracing::debug!(version = %tag.version(), frames = tag.len(), "Validated tag");

    let (offset, length) = detect_tag(file)
        .with_context(|| format!("Failed to inspect {}", file.display()))?
        .map_or((0, 0), |info| (info.offset, info.length));
    if dry_run {
        tracing::info!(file = %file.display(), "Dry run; not writing");
        return Ok(());
    }
    tagline_patch::replace_region(file, offset, length, &data, &PatchOptions::default())
        .with_context(|| format!("Failed to write tag: {}", file.display()))?;
    Ok(())
}

fn cmd_list(major: u8) -> Result<()> {
    let Some(version) = Version::from_major(major) else {
        bail!("Unsupported version {major}");
    };
    for descriptor in registry::frames_in(version) {
        let note = if descriptor.nonstandard { " (nonstandard)" } else { "" };
        println!("{:<4}  {}{note}", descriptor.id, descriptor.description);
    }
    Ok(())
}

fn cmd_v1(files: &[PathBuf]) -> Result<()> {
    for file in files {
        match Tag1::read(file) {
            Ok(tag) => {
                println!("{}:", file.display());
                for line in tag.to_string().lines() {
                    println!("  {line}");
                }
            }
            Err(Error::NoTag(_)) => eprintln!("{}: no ID3v1 tag", file.display()),
            Err(e) => return Err(e).with_context(|| format!("Failed to read ID3v1 tag: {}", file.display())),
        }
    }
    Ok(())
}

// ───────────────────────────── Reports ─────────────────────────────

/// What `print` shows for one file.
struct TagReport<'a> {
    path: &'a Path,
    tag: &'a Tag,
    frames: bool,
    /// `(name, value)` pairs: friendly names, or frame ids with the
    /// rendered frame.
    entries: Vec<(String, String)>,
}

impl<'a> TagReport<'a> {
    fn new(path: &'a Path, tag: &'a Tag, frames: bool) -> Result<Self> {
        let entries = if frames {
            tag.frames_in_file_order()
                .into_iter()
                .map(|f| (f.frameid().to_string(), f.to_string()))
                .collect()
        } else {
            let mut entries = Vec::new();
            for name in FRIENDLY_NAMES {
                let value = tag.friendly(name)?;
                if !value.is_empty() {
                    entries.push((name.to_string(), value));
                }
            }
            entries
        };
        Ok(Self {
            path,
            tag,
            frames,
            entries,
        })
    }

    fn to_json(&self) -> serde_json::Value {
        let mut values = serde_json::Map::new();
        for (key, value) in &self.entries {
            let value = serde_json::Value::String(value.clone());
            if !self.frames {
                values.insert(key.clone(), value);
                continue;
            }
            // Frame ids may repeat, so each one maps to a list.
            if let serde_json::Value::Array(list) =
                values.entry(key.clone()).or_insert_with(|| serde_json::json!([]))
            {
                list.push(value);
            }
        }
        serde_json::json!({
            "file": self.path.display().to_string(),
            "version": self.tag.version().to_string(),
            "flags": self.tag.flags.names(),
            "size": self.tag.size(),
            "values": values,
        })
    }

    fn print_human(&self) {
        println!("{}: {} tag, {} frames", self.path.display(), self.tag.version(), self.tag.len());
        let flags = self.tag.flags.names();
        if !flags.is_empty() {
            println!("  flags: {}", flags.join(", "));
        }
        for (name, value) in &self.entries {
            println!("  {name}: {value}");
        }
    }
}
