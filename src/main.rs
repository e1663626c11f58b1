use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use expensedesk::cli::Shell;
use expensedesk::config::{usage, AppConfig, Launch, StateBackend};

fn main() -> anyhow::Result<()> {
    let mut cfg = AppConfig::from_env();
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "expensedesk".to_string());
    if cfg.apply_args(args.get(1..).unwrap_or(&[]))? == Launch::Help {
        eprintln!("{}", usage(&program));
        return Ok(());
    }

    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let state = match &cfg.state {
        StateBackend::File(p) => p.display().to_string(),
        StateBackend::Memory => ":memory:".to_string(),
    };
    info!(
        target: "expensedesk",
        "expensedesk starting: RUST_LOG='{}', state='{}', demo_users={}, rates={}",
        rust_log, state, cfg.demo_users, cfg.rates.len()
    );

    let mut shell = Shell::from_config(&cfg)?;
    match cfg.command.as_deref() {
        Some(cmds) => shell.run_batch(cmds),
        None => shell.run_interactive()?,
    }
    Ok(())
}
