//! sublog: run a command with its output routed through a subsystem logger.
//!
//! ```text
//! child stdout ──▶ TraceWriter ──▶ TRACE records (debug sink, stdout)
//! child stderr ──▶ ErrorWriter ──▶ ERROR records (error sink, stderr)
//! ```
//!
//! `TRACE` / `PRINT_STACK` are honored as for any logger; `--trace`
//! forces tracing on for the named subsystem.

use std::io::Write;
use std::path::PathBuf;
use std::process::{ExitCode, Stdio};

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sublog::config::{load_config, resolve_config};
use sublog::{errorf, tracef, Logger, TraceSetting};

#[derive(Parser)]
#[command(name = "sublog")]
#[command(about = "Route a command's output through a subsystem logger", long_about = None)]
struct Cli {
    /// TOML configuration file (trace, print_stack)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command, logging stdout as TRACE and stderr as ERROR
    Run {
        /// Subsystem name used as the record prefix
        #[arg(short, long, default_value = "run")]
        name: String,

        /// Trace this subsystem regardless of configuration
        #[arg(long)]
        trace: bool,

        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Validate a configuration file
    CheckConfig {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Internal diagnostics only; records themselves go to the sinks.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sublog=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::CheckConfig { path } => match load_config(&path) {
            Ok(config) => {
                println!("{} is valid: {:?}", path.display(), config);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                ExitCode::FAILURE
            }
        },
        Commands::Run {
            name,
            trace,
            command,
        } => {
            let mut config = match resolve_config(cli.config.as_deref()) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("invalid configuration: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            if trace {
                config.trace = TraceSetting::Subsystems(vec![name.clone()]);
            }
            let log = Logger::builder(name).config(config).build();
            run(&log, &command).await
        }
    }
}

async fn run(log: &Logger, command: &[String]) -> ExitCode {
    let Some((program, args)) = command.split_first() else {
        return ExitCode::FAILURE;
    };

    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            errorf!(log, "unable to start {}: {}", program, sublog::error::share(e));
            return ExitCode::FAILURE;
        }
    };
    tracef!(log, "started {} (pid {})", program, child.id().unwrap_or_default());

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let out_log = log.clone();
    let out_task = tokio::spawn(async move {
        if let Some(mut stdout) = stdout {
            let mut trace = out_log.trace_out();
            if let Err(e) = tokio::io::copy(&mut stdout, &mut trace).await {
                errorf!(out_log, "copying stdout: {}", sublog::error::share(e));
            }
            let _ = trace.close().await;
        }
    });

    let err_log = log.clone();
    let err_task = tokio::spawn(async move {
        if let Some(stderr) = stderr {
            let mut writer = err_log.error_writer();
            let mut reader = BufReader::new(stderr);
            let mut line = Vec::new();
            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) => break,
                    // The writer decodes lossily and trims the newline.
                    Ok(_) => {
                        let _ = writer.write_all(&line);
                    }
                    Err(e) => {
                        errorf!(err_log, "reading stderr: {}", sublog::error::share(e));
                        break;
                    }
                }
            }
        }
    });

    let status = child.wait().await;
    let _ = out_task.await;
    let _ = err_task.await;

    match status {
        Ok(status) if status.success() => ExitCode::SUCCESS,
        Ok(status) => {
            errorf!(log, "{} exited with {}", program, status.to_string());
            let code = status.code().unwrap_or(1).clamp(1, 255);
            ExitCode::from(code as u8)
        }
        Err(e) => {
            errorf!(log, "waiting for {}: {}", program, sublog::error::share(e));
            ExitCode::FAILURE
        }
    }
}
