//! rn-droid
//!
//! Boots an Android emulator, waits for it to be usable and starts the
//! React Native packager and app on it.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rn_droid::commands::{exit_status_code, PromptSelector, RunCommand};
use rn_droid::output;
use rn_droid::toolchain::ToolchainDetector;
use rn_droid::RunError;
use rn_droid_core::config::{
    DEFAULT_ATTACH_TIMEOUT, DEFAULT_BOOT_TIMEOUT, DEFAULT_PACKAGER_PORT, DEFAULT_POLL_INTERVAL,
};
use rn_droid_core::{LaunchConfig, RunOptions, SystemRunner, VERSION};

#[derive(Parser, Debug)]
#[command(name = "rn-droid")]
#[command(version)]
#[command(about = "Start an Android emulator and run your React Native app on it", long_about = None)]
struct Cli {
    /// Auto select first created emulator
    #[arg(short, long)]
    default: bool,

    /// Enable -writable-system
    #[arg(short, long)]
    writable: bool,

    /// Enable -no-snapshot-load
    #[arg(short, long)]
    nosnapshot: bool,

    /// Seconds to wait for the emulator to attach to adb
    #[arg(long, env = "RN_DROID_ATTACH_TIMEOUT", value_name = "SECS", default_value_t = DEFAULT_ATTACH_TIMEOUT.as_secs())]
    attach_timeout: u64,

    /// Seconds to wait for boot to complete, 0 to wait forever
    #[arg(long, env = "RN_DROID_BOOT_TIMEOUT", value_name = "SECS", default_value_t = DEFAULT_BOOT_TIMEOUT.as_secs())]
    boot_timeout: u64,

    /// Milliseconds between device readiness checks
    #[arg(
        long,
        env = "RN_DROID_POLL_INTERVAL",
        value_name = "MS",
        default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval: u64,

    /// Metro packager port
    #[arg(long, env = "RN_DROID_PORT", default_value_t = DEFAULT_PACKAGER_PORT)]
    port: u16,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            use_default: self.default,
            writable: self.writable,
            no_snapshot: self.nosnapshot,
        }
    }

    fn launch_config(&self) -> LaunchConfig {
        LaunchConfig::from_raw(
            self.attach_timeout,
            self.boot_timeout,
            self.poll_interval,
            self.port,
        )
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

async fn run(cli: &Cli) -> Result<Option<i32>, RunError> {
    let toolchain = ToolchainDetector::new().detect()?;
    RunCommand::new(cli.run_options(), cli.launch_config())
        .execute(&toolchain, Arc::new(SystemRunner), &PromptSelector)
        .await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    tracing::debug!("rn-droid v{} {:?}", VERSION, cli);

    let result = run(&cli).await;

    Ok(match result {
        Ok(code) => ExitCode::from(exit_status_code(code)),
        Err(err) => {
            output::failure(&err);
            ExitCode::FAILURE
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    // Parsing reads RN_DROID_* from the process environment
    static ENV: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 4] = [
        "RN_DROID_ATTACH_TIMEOUT",
        "RN_DROID_BOOT_TIMEOUT",
        "RN_DROID_POLL_INTERVAL",
        "RN_DROID_PORT",
    ];

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("rn-droid").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let _env = ENV.lock().unwrap_or_else(|e| e.into_inner());
        let cli = parse(&[]).unwrap();

        assert_eq!(cli.run_options(), RunOptions::default());
        assert_eq!(cli.launch_config(), LaunchConfig::default());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_flags_map_to_run_options() {
        let _env = ENV.lock().unwrap_or_else(|e| e.into_inner());

        let writable = parse(&["-w"]).unwrap().run_options();
        assert!(writable.writable);
        assert!(!writable.no_snapshot);
        assert!(!writable.use_default);

        let cold = parse(&["--nosnapshot"]).unwrap().run_options();
        assert!(cold.no_snapshot);
        assert!(!cold.writable);

        assert_eq!(
            parse(&["-d", "-w", "-n", "-vv"]).unwrap().run_options(),
            RunOptions {
                use_default: true,
                writable: true,
                no_snapshot: true,
            }
        );
    }

    #[test]
    fn test_timing_flags() {
        let _env = ENV.lock().unwrap_or_else(|e| e.into_inner());
        let config = parse(&[
            "--attach-timeout",
            "10",
            "--boot-timeout",
            "0",
            "--poll-interval",
            "250",
            "--port",
            "8088",
        ])
        .unwrap()
        .launch_config();

        assert_eq!(config.attach_timeout, Duration::from_secs(10));
        assert_eq!(config.boot_timeout, None);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.packager_port, 8088);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let _env = ENV.lock().unwrap_or_else(|e| e.into_inner());
        assert!(parse(&["--poll-interval", "0"]).is_err());
    }

    #[test]
    fn test_env_fallbacks() {
        let _env = ENV.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("RN_DROID_ATTACH_TIMEOUT", "5");
        std::env::set_var("RN_DROID_BOOT_TIMEOUT", "0");
        std::env::set_var("RN_DROID_POLL_INTERVAL", "50");
        std::env::set_var("RN_DROID_PORT", "9090");

        let from_env = parse(&[]).map(|cli| cli.launch_config());
        let overridden = parse(&["--port", "8082"]).map(|cli| cli.launch_config());
        for var in ENV_VARS {
            std::env::remove_var(var);
        }

        let from_env = from_env.unwrap();
        assert_eq!(from_env.attach_timeout, Duration::from_secs(5));
        assert_eq!(from_env.boot_timeout, None);
        assert_eq!(from_env.poll_interval, Duration::from_millis(50));
        assert_eq!(from_env.packager_port, 9090);
        assert_eq!(overridden.unwrap().packager_port, 8082);
    }
}
