//! Command-line interface for certforge.
//!
//! Provides the scriptable surface of the wizard: every canonical mutation
//! goes through the same controller the TUI uses, so the two front ends can
//! never disagree about state.

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::io::Write;

use crate::error_reporter;
use crate::{CertForgeError, CliArgs, Config, ExitCode, StepId};
use certforge_llm::{GenerationRequest, client_from_config};
use certforge_render::{clipboard_sequence, download_file_name, print_html};
use certforge_utils::atomic_write::write_file_atomic;
use certforge_utils::error::{GenerationError, WizardError};
use certforge_utils::types::FaultCode;
use certforge_wizard::{JsonFileStore, SectionUpdate, WizardController};

/// certforge - electrical certificate report wizard
#[derive(Parser)]
#[command(name = "certforge")]
#[command(about = "A CLI wizard for BS 7671 electrical certificate reports with AI-assisted generation")]
#[command(long_about = r#"
certforge collects inspection data through a four-step wizard and calls a
remote report endpoint to produce a BS 7671-style electrical certificate.

EXAMPLES:
  # Run the interactive wizard
  certforge wizard

  # Script the same flow
  certforge template minor-works
  certforge set client clientName="J. Smith" clientAddress="1 Test St"
  certforge set client installationAddress="1 Test St" installationDescription=domestic-house
  certforge set inspection extentOfInspection="New socket circuit" overallAssessment=satisfactory
  certforge fault add --code C3 --description "No RCD on socket circuit" --location "Garage"
  certforge generate --dry-run

  # Inspect and export
  certforge status --json
  certforge show
  certforge export
  certforge print-html

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults.
  The config file is discovered by searching upward from CWD for
  .certforge/config.toml. Use --config to specify an explicit path.

STEPS:
  template -> client -> inspection -> review
  A step is reachable only once every earlier step is complete. Wizard state
  persists in the state directory across runs; 'reset' starts over.
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// State directory holding wizard data and generated reports
    #[arg(long, global = true)]
    pub state_dir: Option<Utf8PathBuf>,

    /// Report generation endpoint URL
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,

    /// Generation request timeout in seconds (default: 300, min: 5)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the certificate template catalog
    Templates,

    /// Run the interactive wizard TUI
    Wizard,

    /// Select the report template
    Template {
        /// Template id (see 'certforge templates')
        id: String,
    },

    /// Set client or inspection fields as KEY=VALUE pairs
    Set {
        /// Section to update: client or inspection
        section: String,
        /// Field assignments, e.g. clientName="J. Smith"
        #[arg(required = true, value_name = "KEY=VALUE")]
        pairs: Vec<String>,
    },

    /// Set the additional notes passed verbatim to generation
    Notes {
        /// Note text (replaces any existing notes)
        text: String,
    },

    /// Manage recorded faults
    #[command(subcommand)]
    Fault(FaultCommands),

    /// Navigate to a wizard step (gated on earlier steps being complete)
    Goto {
        /// Target step: template, client, inspection, or review
        step: String,
    },

    /// Show wizard session status
    Status {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate the report via the configured endpoint
    Generate {
        /// Produce a deterministic local draft instead of calling the endpoint
        #[arg(long)]
        dry_run: bool,
    },

    /// Display the generated report
    Show,

    /// Write the report as a plain-text download file
    Export {
        /// Output path (default: {templateId}-report-{date}.txt)
        #[arg(long)]
        out: Option<Utf8PathBuf>,
    },

    /// Write the report as a standalone print-formatted HTML document
    PrintHtml {
        /// Output path (default: {templateId}-report-{date}.html)
        #[arg(long)]
        out: Option<Utf8PathBuf>,
    },

    /// Copy the raw report text to the terminal clipboard
    Copy,

    /// Reset the wizard to defaults and start a new report
    Reset {
        /// Discard entered data without asking
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum FaultCommands {
    /// Record a fault (code, description, and location are mandatory)
    Add {
        /// Classification code: C1, C2, C3, or FI
        #[arg(long)]
        code: String,
        /// What was observed
        #[arg(long)]
        description: String,
        /// Where it was observed
        #[arg(long)]
        location: String,
        /// Suggested remedial action
        #[arg(long)]
        recommendation: Option<String>,
    },
    /// Remove a fault by id
    Remove {
        /// Fault id as shown by 'fault list'
        id: u64,
    },
    /// List recorded faults
    List,
}

/// Sidecar metadata written next to the generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportSidecar {
    template: String,
    generated_at: DateTime<Utc>,
}

/// Run the CLI. Handles all output; the caller only maps the exit code.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    // A second init in tests is fine; failure only means a subscriber exists.
    let _ = certforge_utils::logging::init_tracing(cli.verbose);

    let args = CliArgs {
        config: cli.config.clone(),
        state_dir: cli.state_dir.clone(),
        endpoint_url: cli.endpoint_url.clone(),
        timeout_secs: cli.timeout_secs,
        verbose: cli.verbose,
    };

    let config = Config::discover(&args).map_err(|e| fail(CertForgeError::Config(e)))?;

    match &cli.command {
        Commands::Templates => {
            cmd_templates();
            Ok(())
        }
        Commands::Wizard => crate::tui::run_wizard(&config).map_err(|e| {
            eprintln!("wizard error: {e:#}");
            ExitCode::INTERNAL
        }),
        Commands::Template { id } => cmd_template(&config, id),
        Commands::Set { section, pairs } => cmd_set(&config, section, pairs),
        Commands::Notes { text } => {
            let mut ctl = controller(&config);
            ctl.set_notes(text);
            println!("Notes updated ({} chars)", text.chars().count());
            Ok(())
        }
        Commands::Fault(fault) => cmd_fault(&config, fault),
        Commands::Goto { step } => cmd_goto(&config, step),
        Commands::Status { json } => cmd_status(&config, *json),
        Commands::Generate { dry_run } => cmd_generate(&config, *dry_run),
        Commands::Show => cmd_show(&config),
        Commands::Export { out } => cmd_export(&config, out.clone()),
        Commands::PrintHtml { out } => cmd_print_html(&config, out.clone()),
        Commands::Copy => cmd_copy(&config),
        Commands::Reset { force } => cmd_reset(&config, *force),
    }
}

fn fail(err: CertForgeError) -> ExitCode {
    error_reporter::report(&err);
    err.to_exit_code()
}

fn controller(config: &Config) -> WizardController<JsonFileStore> {
    let store = JsonFileStore::new(config.state_dir.clone());
    let mut ctl = WizardController::new(store, config.autosave_debounce);
    if report_path(config).is_file() {
        // An existing report locks the template for this session.
        ctl.mark_generation_started();
    }
    ctl
}

pub(crate) fn report_path(config: &Config) -> Utf8PathBuf {
    config.state_dir.join("report.md")
}

pub(crate) fn sidecar_path(config: &Config) -> Utf8PathBuf {
    config.state_dir.join("report.json")
}

fn load_report(config: &Config) -> Result<(String, ReportSidecar), ExitCode> {
    let report = std::fs::read_to_string(report_path(config).as_std_path()).map_err(|_| {
        error_reporter::notice("No generated report found. Run 'certforge generate' first.");
        ExitCode::INTERNAL
    })?;
    let sidecar = std::fs::read_to_string(sidecar_path(config).as_std_path())
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_else(|| ReportSidecar {
            template: "report".to_string(),
            generated_at: Utc::now(),
        });
    Ok((report, sidecar))
}

fn cmd_templates() {
    println!("Available certificate templates:\n");
    for template in certforge_templates::catalog() {
        println!(
            "  {:<22} {} [{} / {}]",
            template.id,
            template.name,
            template.category.as_str(),
            template.tier.as_str()
        );
        println!("  {:<22} {}", "", template.description);
        for feature in template.features {
            println!("  {:<22}  - {}", "", feature);
        }
        println!();
    }
}

fn cmd_template(config: &Config, id: &str) -> Result<(), ExitCode> {
    let Some(template) = certforge_templates::find(id) else {
        return Err(fail(CertForgeError::Wizard(WizardError::UnknownTemplate(
            id.to_string(),
        ))));
    };

    let mut ctl = controller(config);
    if ctl.generation_started() && ctl.data().template.as_deref() != Some(id) {
        return Err(fail(CertForgeError::Wizard(WizardError::TemplateLocked)));
    }
    ctl.update_section(SectionUpdate::Template(Some(id.to_string())));
    println!("Template set: {} ({})", template.name, template.id);
    Ok(())
}

fn cmd_set(config: &Config, section: &str, pairs: &[String]) -> Result<(), ExitCode> {
    let mut ctl = controller(config);

    let step = match section {
        "client" => StepId::Client,
        "inspection" => StepId::Inspection,
        other => {
            return Err(fail(CertForgeError::Wizard(WizardError::UnknownStep(
                other.to_string(),
            ))));
        }
    };

    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            eprintln!("Ignoring '{pair}': expected KEY=VALUE");
            continue;
        };
        match step {
            StepId::Client => ctl.set_client_field(key, value),
            StepId::Inspection => ctl.set_inspection_field(key, value),
            _ => unreachable!(),
        }
    }

    let missing = ctl.missing_fields(step);
    if missing.is_empty() {
        println!("{} step complete", step.label());
    } else {
        println!("{} step still missing: {}", step.label(), missing.join(", "));
    }
    Ok(())
}

fn cmd_fault(config: &Config, command: &FaultCommands) -> Result<(), ExitCode> {
    let mut ctl = controller(config);
    match command {
        FaultCommands::Add {
            code,
            description,
            location,
            recommendation,
        } => {
            let code = FaultCode::parse(code).map_err(|_| {
                fail(CertForgeError::Wizard(WizardError::FaultRejected {
                    missing: vec!["code".to_string()],
                }))
            })?;
            match ctl.add_fault(
                Some(code),
                description,
                location,
                recommendation.as_deref().unwrap_or(""),
            ) {
                Ok(id) => {
                    println!("Fault #{id} recorded: [{}] {description} @ {location}", code);
                    Ok(())
                }
                Err(missing) => Err(fail(CertForgeError::Wizard(WizardError::FaultRejected {
                    missing,
                }))),
            }
        }
        FaultCommands::Remove { id } => {
            if ctl.remove_fault(*id) {
                println!("Fault #{id} removed");
            } else {
                println!("No fault with id {id}");
            }
            Ok(())
        }
        FaultCommands::List => {
            let faults = &ctl.data().inspection_details.faults;
            if faults.is_empty() {
                println!("No faults recorded");
            } else {
                for fault in faults {
                    let recommendation = fault
                        .recommendation
                        .as_deref()
                        .map(|r| format!(" - {r}"))
                        .unwrap_or_default();
                    println!(
                        "  #{} [{}] {} @ {}{}",
                        fault.id, fault.code, fault.description, fault.location, recommendation
                    );
                }
            }
            Ok(())
        }
    }
}

fn cmd_goto(config: &Config, step: &str) -> Result<(), ExitCode> {
    let step = StepId::parse(step)
        .map_err(|_| fail(CertForgeError::Wizard(WizardError::UnknownStep(step.to_string()))))?;

    let mut ctl = controller(config);
    if ctl.go_to_step(step) {
        println!("Now at: {} ({}%)", step.label(), ctl.progress_percent());
        Ok(())
    } else {
        // Name the earliest incomplete step so the summary is actionable.
        let blocking = StepId::ALL
            .iter()
            .take(step.index())
            .find(|s| !ctl.is_step_complete(**s))
            .copied()
            .unwrap_or(step);
        Err(fail(CertForgeError::Wizard(WizardError::StepIncomplete {
            step: blocking.as_str().to_string(),
            missing: ctl.missing_fields(blocking),
        })))
    }
}

fn cmd_status(config: &Config, json: bool) -> Result<(), ExitCode> {
    let ctl = controller(config);
    let status = ctl.status_output(report_path(config).is_file());

    if json {
        let out = serde_json::to_string_pretty(&status).map_err(|e| {
            eprintln!("status serialization failed: {e}");
            ExitCode::INTERNAL
        })?;
        println!("{out}");
        return Ok(());
    }

    println!("Wizard session ({})", config.state_dir);
    println!("  Step:      {} ({}%)", status.current_step, status.progress_percent);
    println!(
        "  Template:  {}",
        status.template.as_deref().unwrap_or("(not selected)")
    );
    println!("  Complete:  {}", if status.completed_steps.is_empty() {
        "(none)".to_string()
    } else {
        status.completed_steps.join(", ")
    });
    for (step, missing) in &status.missing_fields {
        println!("  Missing [{step}]: {}", missing.join(", "));
    }
    println!("  Faults:    {}", status.fault_count);
    match status.last_saved {
        Some(stamp) => println!("  Last saved: {}", stamp.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("  Last saved: never"),
    }
    println!(
        "  Report:    {}",
        if status.report_generated { "generated" } else { "not generated" }
    );
    Ok(())
}

fn cmd_generate(config: &Config, dry_run: bool) -> Result<(), ExitCode> {
    let mut ctl = controller(config);

    if !ctl.step_accessible(StepId::Review) {
        let blocking = StepId::ALL
            .iter()
            .find(|s| !ctl.is_step_complete(**s))
            .copied()
            .unwrap_or(StepId::Template);
        return Err(fail(CertForgeError::Wizard(WizardError::StepIncomplete {
            step: blocking.as_str().to_string(),
            missing: ctl.missing_fields(blocking),
        })));
    }

    let request = GenerationRequest::from_wizard(ctl.data())
        .map_err(|e| fail(CertForgeError::Generation(e)))?;
    let client = client_from_config(config, dry_run)
        .map_err(|e| fail(CertForgeError::Generation(e)))?;

    ctl.mark_generation_started();
    if !dry_run {
        certforge_utils::logging::log_generation_start(&request.template, &config.endpoint_url);
    }
    println!("Generating report for '{}'...", request.template);

    let started = std::time::Instant::now();
    let runtime = tokio::runtime::Runtime::new().map_err(|e| {
        eprintln!("failed to start async runtime: {e}");
        ExitCode::INTERNAL
    })?;
    let report = runtime
        .block_on(client.generate(&request))
        .map_err(|e| fail(CertForgeError::Generation(e)))?;

    certforge_utils::logging::log_generation_complete(
        &request.template,
        started.elapsed().as_millis(),
        report.len(),
    );

    save_report(config, &request.template, &report)
        .map_err(|e| fail(CertForgeError::Generation(e)))?;

    println!(
        "Report generated ({} lines). View with 'certforge show'.",
        report.lines().count()
    );
    Ok(())
}

pub(crate) fn save_report(config: &Config, template: &str, report: &str) -> Result<(), GenerationError> {
    let sidecar = ReportSidecar {
        template: template.to_string(),
        generated_at: Utc::now(),
    };
    let sidecar_json = serde_json::to_string(&sidecar)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    write_file_atomic(&report_path(config), report)
        .and_then(|()| write_file_atomic(&sidecar_path(config), &sidecar_json))
        .map_err(|e| GenerationError::Transport(format!("Failed to persist report: {e}")))
}

fn cmd_show(config: &Config) -> Result<(), ExitCode> {
    let (report, sidecar) = load_report(config)?;
    let document = certforge_render::render(&report);

    println!(
        "--- {} report, generated {} ---\n",
        sidecar.template,
        sidecar.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    for line in document.to_plain_lines() {
        println!("{line}");
    }
    Ok(())
}

fn cmd_export(config: &Config, out: Option<Utf8PathBuf>) -> Result<(), ExitCode> {
    let (report, sidecar) = load_report(config)?;
    let path = out.unwrap_or_else(|| {
        Utf8PathBuf::from(download_file_name(&sidecar.template, sidecar.generated_at))
    });

    write_file_atomic(&path, &report).map_err(|e| {
        eprintln!("export failed: {e}");
        ExitCode::INTERNAL
    })?;
    println!("Exported: {path}");
    Ok(())
}

fn cmd_print_html(config: &Config, out: Option<Utf8PathBuf>) -> Result<(), ExitCode> {
    let (report, sidecar) = load_report(config)?;
    let title = certforge_templates::find(&sidecar.template)
        .map_or_else(|| sidecar.template.clone(), |t| t.name.to_string());
    let html = print_html(&report, &title, sidecar.generated_at);

    let path = out.unwrap_or_else(|| {
        Utf8PathBuf::from(format!(
            "{}-report-{}.html",
            sidecar.template,
            sidecar.generated_at.format("%Y-%m-%d")
        ))
    });

    write_file_atomic(&path, &html).map_err(|e| {
        eprintln!("print output failed: {e}");
        ExitCode::INTERNAL
    })?;
    println!("Print document written: {path}");
    println!("Open it in a browser and print from there.");
    Ok(())
}

fn cmd_copy(config: &Config) -> Result<(), ExitCode> {
    let (report, _) = load_report(config)?;

    let mut stdout = std::io::stdout();
    if !stdout.is_terminal() {
        return Err(fail(CertForgeError::Clipboard(
            "stdout is not a terminal".to_string(),
        )));
    }

    let sequence = clipboard_sequence(&report);
    if stdout
        .write_all(sequence.as_bytes())
        .and_then(|()| stdout.flush())
        .is_err()
    {
        return Err(fail(CertForgeError::Clipboard(
            "terminal write failed".to_string(),
        )));
    }

    error_reporter::notice("Report copied to clipboard (terminal OSC 52)");
    Ok(())
}

fn cmd_reset(config: &Config, force: bool) -> Result<(), ExitCode> {
    let mut ctl = controller(config);

    if !ctl.data().is_empty() && !force {
        error_reporter::notice(
            "The wizard holds entered data. Re-run with --force to discard it and start over.",
        );
        return Err(ExitCode::CLI_ARGS);
    }

    ctl.reset();
    for path in [report_path(config), sidecar_path(config)] {
        let _ = std::fs::remove_file(path.as_std_path());
    }
    println!("Wizard reset. Starting at: {}", StepId::Template.label());
    Ok(())
}
