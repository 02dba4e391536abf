//! # themec — theme-document palette compiler CLI
//!
//! Thin command-line front end over [`themec_resolve`]: load the palette,
//! role, and grouping definitions, resolve the theme document, then either
//! write the result back (atomically) or show what would change.
//!
//! ```text
//! themec --theme Honeypunk.yaml --palette docs/palette.md             # normalize
//! themec --theme Honeypunk.yaml --palette docs/palette.md --semantic \
//!        --roles tools/roles.yaml --mappings tools/mappings.yaml      # semantic remap
//! themec ... --semantic --dry-run                                     # preview only
//! themec ... --report --output json                                   # audit as JSON
//! ```
//!
//! Everything interesting happens in the library; this crate is argument
//! parsing, file plumbing, and report display.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::style;
use themec_resolve::{
    ClassificationIndex, Mode, Palette, Resolution, Resolver, RoleTable, ThemeDocument,
};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Styled human-readable text.
    Text,
    /// The full report as JSON.
    Json,
}

/// Normalize or semantically remap theme document colors.
#[derive(Debug, Parser)]
#[command(name = "themec", version)]
pub struct Cli {
    /// Theme document to update.
    #[arg(long, value_name = "FILE")]
    pub theme: PathBuf,

    /// Palette definition, a markdown table of `| Name | Hex | Usage |` rows.
    #[arg(long, value_name = "FILE")]
    pub palette: PathBuf,

    /// Re-resolve classified entries from their semantic roles instead of
    /// normalizing hex values.
    #[arg(long)]
    pub semantic: bool,

    /// Role definition YAML (`role -> {fg, bg}`). Required with --semantic.
    #[arg(long, value_name = "FILE", required_if_eq("semantic", "true"))]
    pub roles: Option<PathBuf>,

    /// Grouping YAML (`role -> [classification keys]`). Required with --semantic.
    #[arg(long, value_name = "FILE", required_if_eq("semantic", "true"))]
    pub mappings: Option<PathBuf>,

    /// Palette snapshot from before a hex edit; normalize mode rewrites
    /// slots holding a snapshot color's old hex to its current hex.
    #[arg(long, value_name = "FILE")]
    pub previous_palette: Option<PathBuf>,

    /// Compute and show planned changes without writing the document.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the full change and palette usage report.
    #[arg(long)]
    pub report: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// Loads definitions, runs one resolution pass, applies or reports.
pub fn run(cli: &Cli) -> Result<()> {
    let palette = Palette::from_path(&cli.palette)
        .with_context(|| format!("loading palette {}", cli.palette.display()))?;
    let document = ThemeDocument::from_path(&cli.theme)
        .with_context(|| format!("loading theme document {}", cli.theme.display()))?;

    // Normalize mode never consults roles or the index; empty stand-ins
    // keep the engine construction uniform.
    let (roles, index, mode) = if cli.semantic {
        let roles_path = cli.roles.as_ref().context("--semantic requires --roles")?;
        let mappings_path = cli
            .mappings
            .as_ref()
            .context("--semantic requires --mappings")?;
        let roles = RoleTable::from_path(roles_path)
            .with_context(|| format!("loading roles {}", roles_path.display()))?;
        let index = ClassificationIndex::from_path(mappings_path, &roles)
            .with_context(|| format!("loading mappings {}", mappings_path.display()))?;
        (roles, index, Mode::Semantic)
    } else {
        (
            RoleTable::default(),
            ClassificationIndex::default(),
            Mode::Normalize,
        )
    };

    let previous = match &cli.previous_palette {
        Some(path) => Some(
            Palette::from_path(path)
                .with_context(|| format!("loading previous palette {}", path.display()))?,
        ),
        None => None,
    };

    let mut resolver = Resolver::new(&palette, &roles, &index);
    if let Some(previous) = &previous {
        resolver = resolver.with_previous_palette(previous);
    }

    let resolution = resolver.run(&document, mode, cli.dry_run)?;

    if !cli.dry_run && resolution.report.has_changes() {
        let yaml = resolution.document.to_yaml()?;
        write_atomic(&cli.theme, &yaml)
            .with_context(|| format!("writing theme document {}", cli.theme.display()))?;
    }

    match cli.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&resolution.report)?);
        }
        OutputFormat::Text => {
            print_text(cli, &resolution);
        }
    }
    Ok(())
}

/// Writes the whole document, then swaps it into place. The original file
/// is never left half-written, and a failed write does not leave the
/// temporary file behind.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    Ok(result?)
}

fn print_text(cli: &Cli, resolution: &Resolution) {
    let report = &resolution.report;
    let mode = if cli.semantic { "semantic" } else { "normalize" };

    if cli.dry_run {
        println!(
            "{} {} changes planned ({} mode, nothing written)",
            style("dry-run:").cyan().bold(),
            report.changes.len(),
            mode
        );
    } else {
        println!(
            "{} {} entries updated ({} mode)",
            style("applied:").green().bold(),
            report.changes.len(),
            mode
        );
    }

    if cli.report || cli.dry_run {
        for change in &report.changes {
            let mut touched = Vec::new();
            if change.touched_background {
                touched.push("bg");
            }
            if change.touched_foreground {
                touched.push("fg");
            }
            println!(
                "  {} {}/{}: {} -> {}",
                style(touched.join("+")).bold(),
                change.section,
                change.key,
                style(&change.previous).dim(),
                change.new
            );
        }
    }

    for warning in &report.overlap_warnings {
        println!(
            "{} key '{}' matched by prefix rules of roles: {}",
            style("warning:").yellow().bold(),
            warning.key,
            warning.roles.join(", ")
        );
    }
    for warning in &report.malformed {
        println!(
            "{} {}/{} holds an unrecognized color value: {}",
            style("warning:").yellow().bold(),
            warning.section,
            warning.key,
            warning.value
        );
    }

    if cli.report && !report.unused_palette_colors.is_empty() {
        println!(
            "{} {} palette colors unused after this run:",
            style("audit:").bold(),
            report.unused_palette_colors.len()
        );
        for name in &report.unused_palette_colors {
            println!("  {}", name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.yaml");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join("theme.yaml.tmp").exists());
    }

    #[test]
    fn test_write_atomic_failure_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the destination makes the final rename fail.
        let path = dir.path().join("theme.yaml");
        fs::create_dir(&path).unwrap();

        assert!(write_atomic(&path, "new").is_err());
        assert!(!dir.path().join("theme.yaml.tmp").exists());
    }
}
