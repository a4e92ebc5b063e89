// MotoPV lead capture
// Library entry point: quote wizard, contact form, submission gateways and the terminal front end.

pub mod api;
pub mod models;
pub mod settings;
pub mod tui;
pub mod utils;

use api::contact::ContactForm;
use api::gateway::{gateway_from_settings, MockSubmissionGateway};
use log::{error, info, LevelFilter};
use models::fields::ContactField;
use settings::Settings;
use std::path::Path;
use std::time::Duration;

/// Initialize logging system with dual format (JSON + human-readable)
fn init_logging(with_stdout: bool, level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = utils::path_resolver::resolve_log_folder()?;
    std::fs::create_dir_all(&log_dir)?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");

    // JSON log file for structured parsing
    let json_log_file = log_dir.join(format!("leads-{}.log", timestamp));

    // Human-readable log file (.txt)
    let txt_log_file = log_dir.join(format!("leads-{}.txt", timestamp));

    // - JSON format to .log file
    // - Human-readable format to .txt file
    // - Optional: human-readable to stdout (disabled for TUI to avoid corrupting the terminal UI)
    let mut dispatch = fern::Dispatch::new().level(level);

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", txt_line));
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let json_line = utils::logging::format_json_log(
                        &timestamp_utc,
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", json_line));
                })
                .chain(fern::log_file(json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", txt_line));
                })
                .chain(fern::log_file(txt_log_file)?),
        );

    dispatch.apply()?;

    log::info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(())
}

/// Load settings or exit with status 2; nothing useful can run on a broken configuration.
fn load_settings_or_exit(config: Option<&Path>) -> Settings {
    match Settings::load(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("MotoPV: {}", e);
            std::process::exit(2);
        }
    }
}

/// Whether log lines are also echoed to stdout. Never while a TUI owns the terminal.
fn stdout_logging(settings: &Settings, tui: bool) -> bool {
    settings.logging.stdout && !tui
}

fn start_logging(settings: &Settings, tui: bool) {
    if let Err(e) = init_logging(stdout_logging(settings, tui), settings.log_level()) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    info!(
        "[PHASE: initialization] [STEP: deployment_folder] Deployment folder: {:?}",
        utils::path_resolver::resolve_deployment_folder()
    );
}

/// Interactive terminal session for one of the two forms.
pub fn run_tui(flow: tui::Flow, config: Option<&Path>) {
    let settings = load_settings_or_exit(config);

    start_logging(&settings, true);
    info!(
        "[PHASE: initialization] Lead capture TUI starting at {}",
        chrono::Utc::now()
    );

    let gateway = match gateway_from_settings(&settings) {
        Ok(g) => g,
        Err(e) => {
            error!("[PHASE: initialization] [STEP: gateway] {:?}", e);
            eprintln!("MotoPV: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = tui::run(flow, &settings, gateway) {
        error!("[PHASE: tui] [STEP: fatal] TUI exited with error: {:?}", e);
        eprintln!("MotoPV error: {}", e);
        std::process::exit(1);
    }
}

/// Non-interactive TUI smoke mode (for automated checks).
/// Renders a single frame to an in-memory backend and prints it.
pub fn run_tui_smoke(target: Option<String>, config: Option<&Path>) {
    let settings = load_settings_or_exit(config);
    start_logging(&settings, true);

    let target = target.as_deref().unwrap_or("basic");
    match tui::render_smoke(target, &settings) {
        Ok(frame) => println!("{}", frame),
        Err(e) => {
            error!(
                "[PHASE: tui] [STEP: smoke] TUI smoke exited with error: {:?}",
                e
            );
            eprintln!("MotoPV error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run `trials` contact submissions against a zero-delay mock gateway that uses the
/// configured success rate, then print the observed rate.
pub fn run_submit_smoke(trials: Option<usize>, config: Option<&Path>) {
    let settings = load_settings_or_exit(config);
    start_logging(&settings, false);

    let trials = trials.unwrap_or(1000).max(1);
    let configured = settings.gateway.mock.success_rate;
    let gateway = MockSubmissionGateway::new(Duration::ZERO, configured);

    info!(
        "[PHASE: submit_smoke] [STEP: start] Running {} submissions at configured success rate {}",
        trials, configured
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("MotoPV: failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let accepted = rt.block_on(async {
        let mut accepted = 0usize;
        for _ in 0..trials {
            let mut form = ContactForm::new();
            form.set_field(ContactField::Name, "Smoke Test");
            form.set_field(ContactField::Email, "smoke@example.com");
            form.set_field(ContactField::Phone, "+265 991 234 567");
            form.set_field(ContactField::Message, "Automated submission check");
            match form.submit(&gateway).await {
                Ok(result) if result.success => accepted += 1,
                Ok(_) => {}
                Err(e) => error!("[PHASE: submit_smoke] [STEP: submit] {}", e),
            }
        }
        accepted
    });

    let observed = accepted as f64 / trials as f64;
    info!(
        "[PHASE: submit_smoke] [STEP: done] accepted={} of {} (observed {:.3})",
        accepted, trials, observed
    );
    println!(
        "submissions={} accepted={} observed_success_rate={:.3} configured_success_rate={:.3}",
        trials, accepted, observed, configured
    );
}

/// Print the effective settings as TOML.
/// No logging here, stdout carries only the rendered file.
pub fn print_config(config: Option<&Path>) {
    let settings = load_settings_or_exit(config);
    match settings.to_toml() {
        Ok(rendered) => print!("{}", rendered),
        Err(e) => {
            eprintln!("MotoPV: {}", e);
            std::process::exit(1);
        }
    }
}
