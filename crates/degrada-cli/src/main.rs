//! degrada: inspect degradation catalogs and compose pipeline payloads
//! without a browser or a backend.
//!
//! The `compose` subcommand builds exactly the request the compound page
//! would send, through the same parameter contract (parsing, clamping,
//! validation), and prints it. Nothing is submitted.
//!
//! # Usage
//!
//! ```text
//! degrada catalog [--section common|image|video] [--json]
//! degrada validate-catalog <PATH>
//! degrada defaults <TYPE>
//! degrada compose --media-path P --media-type video \
//!     --set stage1.blur.sigma=2.5 --stage3 flicker --set stage3.flicker.amplitude=0.7
//! ```
//!
//! Log output goes to stderr and is controlled by `RUST_LOG` (default
//! `warn`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod assign;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use degrada_core::control;
use degrada_core::{
    Catalog, DegradationSchema, MediaFile, MediaKind, ParamSpec, PipelineConfig, Section,
    StageConfig, StageSlot,
};
use tracing_subscriber::EnvFilter;

use crate::assign::{Assignment, EntryTarget};

/// Catalog inspection and offline pipeline composition for degrada.
#[derive(Parser)]
#[command(name = "degrada", version)]
struct Cli {
    /// Use this catalog JSON file instead of the built-in catalog.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List degradation types and their parameters.
    Catalog {
        /// Only this section.
        #[arg(long, value_enum)]
        section: Option<SectionArg>,

        /// Print the catalog as JSON instead of a listing.
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a catalog JSON file.
    ///
    /// Exits non-zero and lists every problem when the file is invalid.
    ValidateCatalog {
        /// Catalog file to check.
        path: PathBuf,
    },

    /// Print the default parameters of a degradation type as JSON.
    Defaults {
        /// Degradation type id, e.g. `blur`.
        type_key: String,
    },

    /// Build, validate and print a composite degradation request.
    Compose {
        /// Backend path of the uploaded file.
        #[arg(long)]
        media_path: String,

        /// Kind of the uploaded file.
        #[arg(long, value_enum)]
        media_type: MediaArg,

        /// Optional third-stage type.
        #[arg(long)]
        stage3: Option<String>,

        /// Set a parameter: `STAGE.TYPE.KEY=VALUE` (repeatable).
        #[arg(long = "set", value_name = "STAGE.TYPE.KEY=VALUE")]
        sets: Vec<Assignment>,

        /// Disable a composite entry: `STAGE.TYPE` (repeatable). The
        /// request is then refused, as in the browser.
        #[arg(long = "disable", value_name = "STAGE.TYPE")]
        disables: Vec<EntryTarget>,
    },
}

/// Catalog section selection.
#[derive(Clone, Copy, ValueEnum)]
enum SectionArg {
    /// Composite sub-types.
    Common,
    /// Optional-stage types for images.
    Image,
    /// Optional-stage types for videos.
    Video,
}

impl From<SectionArg> for Section {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::Common => Self::Common,
            SectionArg::Image => Self::Image,
            SectionArg::Video => Self::Video,
        }
    }
}

/// Media kind selection.
#[derive(Clone, Copy, ValueEnum)]
enum MediaArg {
    Image,
    Video,
}

impl From<MediaArg> for MediaKind {
    fn from(arg: MediaArg) -> Self {
        match arg {
            MediaArg::Image => Self::Image,
            MediaArg::Video => Self::Video,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, String> {
    match path {
        None => Catalog::builtin().map_err(|e| format!("built-in catalog: {e}")),
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
            Catalog::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let catalog_path = match &cli.command {
        Command::ValidateCatalog { path } => Some(path.clone()),
        _ => cli.catalog.clone(),
    };
    let outcome =
        load_catalog(catalog_path.as_deref()).and_then(|catalog| run(&catalog, cli.command));

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(catalog: &Catalog, command: Command) -> Result<(), String> {
    match command {
        Command::Catalog { section, json } => print_catalog(catalog, section, json),
        Command::ValidateCatalog { path } => {
            report_catalog(catalog, &path);
            Ok(())
        }
        Command::Defaults { type_key } => print_defaults(catalog, &type_key),
        Command::Compose {
            media_path,
            media_type,
            stage3,
            sets,
            disables,
        } => {
            let media = media_file(media_path, media_type.into());
            let request = compose(catalog, &media, stage3.as_deref(), &sets, &disables)?;
            print_json(&request)
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| format!("Error serializing: {e}"))?;
    println!("{json}");
    Ok(())
}

/// Summary of a catalog that parsed and validated.
fn report_catalog(catalog: &Catalog, path: &Path) {
    println!("{}: ok ({} types)", path.display(), catalog.iter().count());
    let missing = catalog.missing_composite_entries();
    if !missing.is_empty() {
        // Loads fine, but the compound page will refuse to submit.
        eprintln!("warning: missing composite entries: {}", missing.join(", "));
    }
}

fn print_catalog(catalog: &Catalog, section: Option<SectionArg>, json: bool) -> Result<(), String> {
    let sections: Vec<Section> = section.map_or_else(|| Section::ALL.to_vec(), |s| vec![s.into()]);
    if json {
        let map: serde_json::Map<String, serde_json::Value> = sections
            .iter()
            .map(|s| {
                serde_json::to_value(catalog.section(*s))
                    .map(|v| (s.name().to_owned(), v))
                    .map_err(|e| format!("Error serializing: {e}"))
            })
            .collect::<Result<_, _>>()?;
        return print_json(&map);
    }
    for section in sections {
        println!("[{}]", section.name());
        for schema in catalog.section(section) {
            print!("{}", describe_schema(schema));
        }
    }
    Ok(())
}

/// Human-readable listing of one schema and its parameters.
fn describe_schema(schema: &DegradationSchema) -> String {
    use std::fmt::Write;

    let mut out = format!("  {} ({}): {}\n", schema.id, schema.name, schema.method);
    for spec in &schema.params {
        let _ = writeln!(out, "    {}", describe_param(spec));
    }
    out
}

fn describe_param(spec: &ParamSpec) -> String {
    match spec {
        ParamSpec::Int(n) | ParamSpec::Float(n) => {
            let kind = if matches!(spec, ParamSpec::Int(_)) { "int" } else { "float" };
            let unit = n.unit.as_deref().unwrap_or("");
            format!(
                "{} {kind} {}..={} step {} default {}{unit}  {}",
                n.key, n.min, n.max, n.step, n.default, n.description
            )
        }
        ParamSpec::Select(s) => {
            let options: Vec<&str> = s.options.iter().map(|o| o.value.as_str()).collect();
            format!(
                "{} select [{}] default {}  {}",
                s.key,
                options.join("|"),
                s.default,
                s.description
            )
        }
    }
}

fn print_defaults(catalog: &Catalog, type_key: &str) -> Result<(), String> {
    let schema = catalog.require(type_key).map_err(|e| e.to_string())?;
    print_json(&schema.defaults())
}

fn media_file(media_path: String, kind: MediaKind) -> MediaFile {
    let name = media_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(&media_path)
        .to_owned();
    MediaFile {
        file_path: media_path,
        name,
        kind,
        size_human: None,
    }
}

/// Build the request the compound page would submit.
///
/// Assignments are applied in order through [`control::change`], so
/// out-of-range numbers are clamped and unlisted options rejected.
fn compose(
    catalog: &Catalog,
    media: &MediaFile,
    stage3: Option<&str>,
    sets: &[Assignment],
    disables: &[EntryTarget],
) -> Result<serde_json::Value, String> {
    let mut pipeline = PipelineConfig::new(catalog);
    pipeline
        .select_optional(catalog, media.kind, stage3)
        .map_err(|e| e.to_string())?;

    for target in disables {
        pipeline
            .set_enabled(target.stage, &target.type_key, false)
            .map_err(|e| format!("--disable {}.{}: {e}", target.stage.id(), target.type_key))?;
    }

    for set in sets {
        let context = || format!("--set {}.{}.{}", set.stage.id(), set.type_key, set.param_key);
        let current = current_stage(&pipeline, set)
            .ok_or_else(|| format!("{}: no {} in {}", context(), set.type_key, set.stage))?;
        let schema = catalog
            .require(&set.type_key)
            .map_err(|e| format!("{}: {e}", context()))?;
        let update = control::change(set.stage, schema, &current, &set.param_key, &set.raw)
            .map_err(|e| format!("{}: {e}", context()))?;
        let stored = pipeline
            .apply(catalog, &update)
            .map_err(|e| format!("{}: {e}", context()))?;
        tracing::info!(param = %context(), value = %stored, "applied");
    }

    let request = pipeline
        .to_request(catalog, Some(media))
        .map_err(|e| e.to_string())?;
    serde_json::to_value(&request).map_err(|e| format!("Error serializing: {e}"))
}

/// Values of the entry an assignment addresses.
fn current_stage(pipeline: &PipelineConfig, set: &Assignment) -> Option<StageConfig> {
    if set.stage == StageSlot::Third {
        return pipeline
            .optional()
            .filter(|t| t.type_key == set.type_key)
            .map(|t| StageConfig {
                enabled: true,
                params: t.params.clone(),
            });
    }
    pipeline
        .composite(set.stage)?
        .get(&set.type_key)
        .cloned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn video() -> MediaFile {
        media_file("uploads/street.mp4".into(), MediaKind::Video)
    }

    fn set(s: &str) -> Assignment {
        s.parse().unwrap()
    }

    #[test]
    fn compose_applies_and_clamps() {
        let catalog = Catalog::builtin().unwrap();
        let json = compose(
            &catalog,
            &video(),
            Some("flicker"),
            &[set("stage1.blur.kernel_size=0"), set("stage3.flicker.amplitude=0.7")],
            &[],
        )
        .unwrap();
        assert_eq!(json["media_type"], "video");
        assert_eq!(
            json["first_degradation_config"]["params"]["blur"]["params"]["kernel_size"],
            1
        );
        assert_eq!(json["third_degradation_config"]["name"], "flicker");
        assert_eq!(json["third_degradation_config"]["params"]["amplitude"], 0.7);
    }

    #[test]
    fn compose_refuses_disabled_entries() {
        let catalog = Catalog::builtin().unwrap();
        let disable: EntryTarget = "stage2.noise".parse().unwrap();
        assert!(compose(&catalog, &video(), None, &[], &[disable]).is_err());
    }

    #[test]
    fn compose_rejects_unavailable_optional_type() {
        let catalog = Catalog::builtin().unwrap();
        assert!(compose(&catalog, &video(), Some("scratch"), &[], &[]).is_err());
    }

    #[test]
    fn compose_rejects_unlisted_option() {
        let catalog = Catalog::builtin().unwrap();
        let err = compose(
            &catalog,
            &video(),
            None,
            &[set("stage1.compression.codec=av1")],
            &[],
        )
        .unwrap_err();
        assert!(err.starts_with("--set stage1.compression.codec"));
    }

    #[test]
    fn media_name_is_last_segment() {
        assert_eq!(video().name, "street.mp4");
    }

    #[test]
    fn int_params_are_described_with_units() {
        let catalog = Catalog::builtin().unwrap();
        let blur = catalog.composite("blur").unwrap();
        let listing = describe_schema(blur);
        assert!(listing.starts_with("  blur (模糊)"));
        assert!(listing.contains("kernel_size int 1..=51 step 2 default 15"));
    }
}
