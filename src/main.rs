use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use dupe_refiner::config::{ApiConfig, API_BASE_ENV};
use dupe_refiner::form::render;
use dupe_refiner::form::{DownloadOutcome, FormEvent, FormSnapshot, SubmissionForm, SubmitOutcome};
use dupe_refiner::i18n::{get_messages, Locale, Messages};
use dupe_refiner::launch::fetch::FetchLauncher;
use dupe_refiner::launch::print::PrintLauncher;
use dupe_refiner::launch::system::SystemLauncher;
use dupe_refiner::launch::{DownloadLauncher, LaunchOutcome, LauncherKind};
use dupe_refiner::transport::http::HttpTransport;
use dupe_refiner::transport::{cli as transport_cli, TransportOptions};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{subscriber::set_global_default, Level};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbosity: i16) {
    let level = match verbosity {
        i16::MIN..=-1 => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .finish();

    let _ = set_global_default(subscriber);
}

fn launcher_args(cmd: Command, default_open: &'static str) -> Command {
    cmd.arg(
        Arg::new("open")
            .long("open")
            .help("How to open the report: system | fetch | print | none")
            .default_value(default_open)
            .num_args(1),
    )
    .arg(
        Arg::new("out_dir")
            .long("out-dir")
            .help("Output directory for --open fetch")
            .default_value("./reports")
            .num_args(1),
    )
}

fn build_cli() -> Command {
    let detect = Command::new("detect")
        .about("Submit one organization ID and wait for the report")
        .arg(
            Arg::new("organization_id")
                .help("Organization ID to analyze")
                .required(true)
                .num_args(1),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the final status as JSON")
                .action(ArgAction::SetTrue),
        );
    let detect = transport_cli::augment_command(launcher_args(detect, "none"));

    let interactive = Command::new("interactive")
        .about("Terminal form: type an organization ID per line, :download to open the report, :quit to exit");
    let interactive = transport_cli::augment_command(launcher_args(interactive, "system"));

    Command::new("dupe-refiner")
        .about("Find and analyze duplicate items through the duplicate-detection service")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api_base")
                .long("api-base")
                .help("Base URL of the duplicate-detection API")
                .env(API_BASE_ENV)
                .global(true)
                .num_args(1),
        )
        .arg(
            Arg::new("locale")
                .long("locale")
                .help("UI language (en, zh)")
                .default_value("en")
                .global(true)
                .num_args(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("More log output (repeatable)")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Less log output")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(detect)
        .subcommand(interactive)
}

fn build_form(
    m: &ArgMatches,
    api: ApiConfig,
    msgs: &'static Messages,
    fallback: LauncherKind,
) -> anyhow::Result<(SubmissionForm, LauncherKind)> {
    let mut opts = TransportOptions::default();
    transport_cli::apply_matches(m, &mut opts)?;

    let open = m.get_one::<String>("open").map(String::as_str).unwrap_or("none");
    let kind = LauncherKind::parse(open).ok_or_else(|| anyhow::anyhow!("unknown --open value: {}", open))?;
    let out_dir: PathBuf = m
        .get_one::<String>("out_dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./reports"));

    let effective = if kind == LauncherKind::None { fallback } else { kind };
    let launcher: Arc<dyn DownloadLauncher> = match effective {
        LauncherKind::System => Arc::new(SystemLauncher::new()),
        LauncherKind::Fetch => Arc::new(FetchLauncher::new(out_dir, &opts)?),
        LauncherKind::Print | LauncherKind::None => Arc::new(PrintLauncher::new()),
    };
    let transport = Arc::new(HttpTransport::new(&opts).context("build http transport")?);

    Ok((SubmissionForm::new(api, transport, launcher).with_messages(msgs), kind))
}

/// Renders in-flight feedback from form events until the form is dropped.
fn spawn_event_view(form: &SubmissionForm) -> tokio::task::JoinHandle<()> {
    let mut rx = form.subscribe();
    let msgs = form.messages();
    tokio::spawn(async move {
        let sty = ProgressStyle::with_template("{spinner:.green} {prefix} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("|/-\\ ");
        let mut spinner: Option<ProgressBar> = None;

        loop {
            let evt = match rx.recv().await {
                Ok(e) => e,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(_) => break,
            };

            match evt {
                FormEvent::StatusChanged { status, .. } => {
                    if let Some(progress) = status.progress().filter(|_| !status.is_terminal()) {
                        let pb = ProgressBar::new_spinner();
                        pb.set_style(sty.clone());
                        pb.set_prefix(msgs.submit_busy);
                        pb.set_message(progress.to_string());
                        pb.enable_steady_tick(std::time::Duration::from_millis(120));
                        spinner = Some(pb);
                    }
                }
                FormEvent::InFlightChanged { in_flight: false } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                }
                FormEvent::Alert { message } => {
                    eprintln!("! {}", message);
                }
                FormEvent::DownloadOpened { url } => {
                    eprintln!("-> {}", url);
                }
                FormEvent::Info { scope, message } => {
                    eprintln!("[{}] {}", scope, message);
                }
                FormEvent::SubmissionStarted { .. }
                | FormEvent::InFlightChanged { .. }
                | FormEvent::DownloadReady { .. } => {}
            }
        }
    })
}

fn print_card(snapshot: &FormSnapshot, msgs: &Messages) {
    for line in render::status_card(snapshot, msgs) {
        println!("  {}", line);
    }
}

async fn download(form: &SubmissionForm) {
    match form.download().await {
        Ok(DownloadOutcome::Launched(LaunchOutcome::Saved(path))) => {
            println!("saved {}", path.display());
        }
        Ok(_) => {}
        Err(e) => eprintln!("! download failed: {}", e),
    }
}

async fn run_detect(form: SubmissionForm, kind: LauncherKind, m: &ArgMatches) -> anyhow::Result<()> {
    let org = m
        .get_one::<String>("organization_id")
        .cloned()
        .unwrap_or_default();
    let json = m.get_flag("json");
    let msgs = form.messages();

    let view = spawn_event_view(&form);
    let outcome = form.submit_input(org).await;
    let snapshot = form.snapshot().await;

    if json {
        let value = serde_json::json!({
            "status": snapshot.status,
            "downloadUrl": snapshot.download_url,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_card(&snapshot, msgs);
    }

    if outcome.is_success() && kind != LauncherKind::None {
        download(&form).await;
    }

    drop(form);
    let _ = view.await;

    match outcome {
        SubmitOutcome::Completed { .. } => Ok(()),
        SubmitOutcome::Failed { message, .. } => anyhow::bail!("{}", message),
        SubmitOutcome::Rejected { message, .. } => anyhow::bail!("{}", message),
    }
}

async fn run_interactive(form: SubmissionForm) -> anyhow::Result<()> {
    let msgs = form.messages();
    let view = spawn_event_view(&form);

    print!("{}", render::render(&form.snapshot().await, msgs));
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else { break };
        let cmd = line.trim().to_string();
        match cmd.as_str() {
            ":quit" | ":q" => break,
            ":download" | ":d" => download(&form).await,
            _ => {
                form.submit_input(line).await;
                print_card(&form.snapshot().await, msgs);
            }
        }
    }

    drop(form);
    let _ = view.await;
    Ok(())
}

fn prepare(m: &ArgMatches) -> anyhow::Result<(ApiConfig, &'static Messages)> {
    let verbosity = m.get_count("verbose") as i16 - m.get_count("quiet") as i16;
    init_tracing(verbosity);

    let locale = m
        .get_one::<String>("locale")
        .map(|s| Locale::parse(s))
        .unwrap_or_default();

    let api = ApiConfig::resolve(m.get_one::<String>("api_base").map(String::as_str))
        .context("api base is not configured (use --api-base)")?;
    Ok((api, get_messages(locale)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("detect", m)) => {
            let (api, msgs) = prepare(m)?;
            let (form, kind) = build_form(m, api, msgs, LauncherKind::None)?;
            run_detect(form, kind, m).await
        }
        Some(("interactive", m)) => {
            let (api, msgs) = prepare(m)?;
            let (form, _) = build_form(m, api, msgs, LauncherKind::Print)?;
            run_interactive(form).await
        }
        _ => Ok(()),
    }
}
