use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use wc2tb::{
    DirectorySink, DocumentError, ExportOptions, RotationStrategy, export_layers,
    parse_world_creator,
};

/// Rotation extraction algorithm
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Rotation {
    /// Basis vectors in Z-up space, handles gimbal lock.
    Basis,
    /// Legacy closed-form quaternion conversion.
    Direct,
}

impl From<Rotation> for RotationStrategy {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Basis => RotationStrategy::Basis,
            Rotation::Direct => RotationStrategy::Direct,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "wc2tb",
    version,
    about = "Export World Creator object layers as Terrain Builder placement files"
)]
struct Args {
    /// World Creator project file (.xml)
    input: Option<PathBuf>,

    #[arg(long, value_enum, env = "WC2TB_ROTATION", default_value_t = Rotation::Basis)]
    rotation: Rotation,

    /// Export layers one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Exit without waiting for ENTER
    #[arg(long)]
    no_pause: bool,
}

/// Layer files are written next to the project
fn output_dir(input: &Path) -> &Path {
    input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    // Anything that is not a World Creator project is ignored silently.
    let Some(input) = args.input else {
        return Ok(ExitCode::SUCCESS);
    };
    if input.extension().and_then(|ext| ext.to_str()) != Some("xml") {
        return Ok(ExitCode::SUCCESS);
    }

    let xml = fs::read_to_string(&input)
        .with_context(|| format!("Error reading input file '{}'", input.display()))?;

    let document = match parse_world_creator(&xml) {
        Ok(document) => document,
        Err(DocumentError::InvalidRoot { .. }) => return Ok(ExitCode::SUCCESS),
        Err(e) => {
            return Err(e).with_context(|| format!("Error parsing '{}'", input.display()));
        }
    };

    let options = ExportOptions {
        rotation: args.rotation.into(),
        parallel: !args.sequential,
    };
    let sink = DirectorySink::new(output_dir(&input));
    let summary = export_layers(&document.layers, &options, &sink)?;

    for report in &summary.layers {
        match &report.error {
            None if report.skipped_groups + report.skipped_records > 0 => println!(
                "Layer {} exported ({} objects, {} groups skipped, {} instances skipped)",
                report.name, report.exported, report.skipped_groups, report.skipped_records
            ),
            None => println!("Layer {} exported ({} objects)", report.name, report.exported),
            Some(e) => eprintln!("Layer {} failed: {}", report.name, e),
        }
    }
    println!(
        "Exported {} objects from {} layers",
        summary.total,
        summary.written_layers()
    );

    if !args.no_pause {
        println!("Press ENTER to exit.");
        let mut line = String::new();
        io::stdin()
            .read_line(&mut line)
            .context("Error reading from stdin")?;
    }

    if summary.failed().next().is_some() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
