use anyhow::{anyhow, Result, Context};
use clap::{Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bmf_core::{DecodeLimits, Manifest};
use bmf_core::files::FileManifest;
use bmf_core::source::{delta_url, read_manifest_file_with_limits};

#[derive(Parser)]
#[command(name="bmf", version, about="bmf: inspect and merge binary chunked manifests")]
struct Cli {
    /// Largest inflated body to accept, in MiB
    #[arg(long, global=true, default_value_t=256)] max_body_mib: usize,
    /// Largest element count to accept in any table
    #[arg(long, global=true, default_value_t=5_000_000)] max_entries: usize,
    #[command(subcommand)] cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print header and build metadata
    Info { manifest: PathBuf },
    /// List files, optionally dropping tagged or matching paths
    Files {
        manifest: PathBuf,
        /// Drop files carrying exactly this install tag
        #[arg(long)] exclude_tag: Vec<String>,
        /// Drop files with an install tag containing this text
        #[arg(long)] exclude_tag_substr: Vec<String>,
        /// Keep only paths matching these globs
        #[arg(long)] include: Vec<String>,
        /// Drop paths matching these globs
        #[arg(long)] exclude: Vec<String>,
        #[arg(long, default_value_t=false)] json: bool,
    },
    /// Apply a delta manifest on top of a base manifest
    Merge {
        base: PathBuf,
        delta: PathBuf,
        /// Write the merged manifest as JSON
        #[arg(long)] output: Option<PathBuf>,
    },
    /// Dump a whole manifest as JSON
    Dump { manifest: PathBuf },
    /// Print the location of the delta from OLD_BUILD to NEW_BUILD
    DeltaUrl { base_url: String, new_build: String, old_build: String },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let max_body = cli.max_body_mib.checked_mul(1 << 20).ok_or_else(|| anyhow!("--max-body-mib {} is too large", cli.max_body_mib))?;
    let limits = DecodeLimits { max_uncompressed_bytes: max_body, max_entries: cli.max_entries };
    match cli.cmd {
        Cmd::Info { manifest } => info(&manifest, &limits)?,
        Cmd::Files { manifest, exclude_tag, exclude_tag_substr, include, exclude, json } => {
            files(&manifest, &limits, &exclude_tag, &exclude_tag_substr, &include, &exclude, json)?;
        }
        Cmd::Merge { base, delta, output } => merge(&base, &delta, output.as_deref(), &limits)?,
        Cmd::Dump { manifest } => write_json(&load(&manifest, &limits)?, None)?,
        Cmd::DeltaUrl { base_url, new_build, old_build } => println!("{}", delta_url(&base_url, &new_build, &old_build)),
    }
    Ok(())
}

fn load(path: &Path, limits: &DecodeLimits) -> Result<Manifest> {
    let m = read_manifest_file_with_limits(path, limits)?;
    log::info!("loaded {} ({} files, {} chunks)", path.display(), m.file_count(), m.chunk_count());
    Ok(m)
}

fn build_globset(includes: &[String], excludes: &[String]) -> Result<(GlobSet, GlobSet)> {
    let mut incb = GlobSetBuilder::new();
    let mut excb = GlobSetBuilder::new();
    if includes.is_empty() { incb.add(Glob::new("**/*")?); }
    for g in includes { incb.add(Glob::new(g).with_context(|| format!("bad glob {}", g))?); }
    for g in excludes { excb.add(Glob::new(g).with_context(|| format!("bad glob {}", g))?); }
    Ok((incb.build()?, excb.build()?))
}

fn info(path: &Path, limits: &DecodeLimits) -> Result<()> {
    let m = load(path, limits)?;
    let stored = if m.header.is_compressed() { "compressed" } else { "raw" };
    println!("App: {} (id {})", m.meta.app_name, m.meta.app_id);
    println!("Build: {} ({})", m.meta.build_version, if m.meta.build_id.is_empty() { "no build id" } else { m.meta.build_id.as_str() });
    println!("Feature level: {}", m.meta.feature_level);
    println!("Launch: {} {}", m.meta.launch_exe, m.meta.launch_command);
    if !m.meta.prereq_ids.is_empty() { println!("Prerequisites: {} [{}]", m.meta.prereq_name, m.meta.prereq_ids.join(",")); }
    println!("Stored: {} ({} -> {} bytes, sha1 {})", stored, m.header.data_size_compressed, m.header.data_size_uncompressed, m.header.sha_hex());
    println!("Files: {} ({} bytes)", m.file_count(), m.files.total_size());
    println!("Chunks: {} ({} bytes to download)", m.chunk_count(), m.chunks.download_size());
    let dangling = m.files.unresolved_parts(&m.chunks).count();
    if dangling > 0 { println!("Unresolved chunk parts: {}", dangling); }
    for (k, v) in &m.custom_fields.fields { println!("  {} = {}", k, v); }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn files(path: &Path, limits: &DecodeLimits, exclude_tag: &[String], exclude_tag_substr: &[String], includes: &[String], excludes: &[String], json: bool) -> Result<()> {
    let mut m = load(path, limits)?;
    let mut dropped = 0usize;
    if !exclude_tag.is_empty() { dropped += m.remove_files_with_tags(exclude_tag); }
    if !exclude_tag_substr.is_empty() { dropped += m.remove_files_with_tag_substrings(exclude_tag_substr); }
    let (inc, exc) = build_globset(includes, excludes)?;
    let kept: Vec<&FileManifest> = m.files.files.iter()
        .filter(|f| inc.is_match(&f.filename) && !exc.is_match(&f.filename))
        .collect();
    log::info!("{} files dropped by tag, {} by path", dropped, m.files.files.len() - kept.len());

    if json { return write_json(&kept, None); }
    let out = std::io::stdout();
    let mut out = out.lock();
    for f in &kept {
        writeln!(out, "{:>12}  {}  [{}]", f.file_size, f.filename, f.install_tags.join(","))?;
    }
    Ok(())
}

fn merge(base: &Path, delta: &Path, output: Option<&Path>, limits: &DecodeLimits) -> Result<()> {
    let mut m = load(base, limits)?;
    let d = load(delta, limits)?;
    let st = m.apply_delta(&d);
    println!("Merged {} onto {}: {} files replaced, {} added, {} chunks added", d.meta.build_version, m.meta.build_version, st.files_replaced, st.files_added, st.chunks_added);
    println!("Files: {}  Chunks: {}", m.file_count(), m.chunk_count());
    if let Some(p) = output { write_json(&m, Some(p))?; }
    Ok(())
}

fn write_json<T: serde::Serialize + ?Sized>(v: &T, path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            let f = File::create(p).with_context(|| format!("create {}", p.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(f), v)?;
        }
        None => {
            let out = std::io::stdout();
            let mut out = out.lock();
            serde_json::to_writer_pretty(&mut out, v)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
