use super::CliError;
use anyhow::Context as _;
use std::path::PathBuf;
use tc_core::script::{render_prefs, render_script};
use tc_core::{Context, ContextOptions, SystemRunner};
use tracing::{info, warn};

#[derive(clap::Args)]
pub(super) struct CheckArgs {
    /// Directory holding tc-prefs.txt and the files it references
    scripts_dir: PathBuf,

    /// Explicit path to the external executable
    #[arg(long)]
    executable: Option<PathBuf>,

    /// Scratch directory override
    #[arg(long)]
    temp_dir: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct RunArgs {
    /// Directory holding tc-prefs.txt and the files it references
    scripts_dir: PathBuf,

    /// Explicit path to the external executable
    #[arg(long)]
    executable: Option<PathBuf>,

    /// Directory holding the dataset and axfile inputs (defaults to the
    /// scripts directory)
    #[arg(long)]
    datasets_dir: Option<PathBuf>,

    /// Scratch directory override
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Write the full result set to this path as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print the program's raw standard output
    #[arg(long)]
    print_output: bool,
}

fn build_context(
    scripts_dir: PathBuf,
    executable: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
) -> Result<Context, CliError> {
    let mut options = ContextOptions::new().scripts_dir(scripts_dir);
    if let Some(executable) = executable {
        options = options.executable(executable);
    }
    if let Some(temp_dir) = temp_dir {
        options = options.temp_dir(temp_dir);
    }
    Ok(Context::new(options)?)
}

pub(super) fn run_check_command(args: CheckArgs) -> Result<i32, CliError> {
    let context = build_context(args.scripts_dir, args.executable, args.temp_dir)?;
    context.check_config()?;

    println!("executable: {}", context.executable().display());
    println!("scratch:    {}", context.scratch_dir().display());
    println!();
    println!("-- preferences --");
    print!("{}", render_prefs(context.prefs()));
    println!();
    println!("-- script --");
    print!("{}", render_script(context.script()));
    Ok(0)
}

pub(super) fn run_run_command(args: RunArgs) -> Result<i32, CliError> {
    let context = build_context(args.scripts_dir, args.executable, args.temp_dir)?;
    info!(
        executable = %context.executable().display(),
        scratch = %context.scratch_dir().display(),
        "running calculation",
    );

    let results = context.execute(&SystemRunner, args.datasets_dir.as_deref())?;

    for advisory in results.advisories() {
        warn!("{advisory}");
    }

    if args.print_output {
        print!("{}", results.stdout().unwrap_or_default());
    }

    if let (Some(pressure), Some(temperature)) = (results.pressure(), results.temperature()) {
        println!("P {pressure}  T {temperature}");
    }
    if let Some(phases) = results.phases() {
        println!("phases: {}", phases.join(" "));
    }
    if let Some(modes) = results.modes() {
        let rendered: Vec<String> = modes
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        println!("modes:  {}", rendered.join(" "));
    }
    println!("fields: {}", results.keys().cloned().collect::<Vec<_>>().join(" "));

    if let Some(report) = args.report {
        let json = serde_json::to_string_pretty(&results)
            .context("result set should serialize to JSON")?;
        std::fs::write(&report, json)
            .with_context(|| format!("failed to write report '{}'", report.display()))?;
        info!(report = %report.display(), "report written");
    }

    Ok(0)
}
