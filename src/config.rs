//! Runtime configuration: environment first, then command-line flags.

use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::expenses::{parse_rates, RateTable};

pub const ENV_STATE_FILE: &str = "EXPENSEDESK_STATE_FILE";
pub const ENV_DEMO_USERS: &str = "EXPENSEDESK_DEMO_USERS";
pub const ENV_RATES: &str = "EXPENSEDESK_RATES";
pub const ENV_LOG: &str = "EXPENSEDESK_LOG";

pub const DEFAULT_STATE_FILE: &str = "expensedesk_state.json";
pub const DEFAULT_RATES: &str = "USD=1,EUR=0.92,GBP=0.79,INR=83.2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateBackend {
    File(PathBuf),
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub state: StateBackend,
    /// Seed the starter roster (admin/manager/employee @example.com).
    pub demo_users: bool,
    pub rates: RateTable,
    /// Fallback log filter when RUST_LOG is unset.
    pub log_filter: String,
    /// One-shot commands (`;`-separated) instead of the interactive shell.
    pub command: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            state: StateBackend::File(PathBuf::from(DEFAULT_STATE_FILE)),
            demo_users: true,
            rates: parse_rates(DEFAULT_RATES),
            log_filter: "info".into(),
            command: None,
        }
    }
}

/// What `main` should do after parsing flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    Run,
    Help,
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    pub fn from_env() -> Self { Self::from_lookup(|k| std::env::var(k).ok()) }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut cfg = Self::default();
        if let Some(p) = lookup(ENV_STATE_FILE).filter(|p| !p.trim().is_empty()) {
            cfg.state = if p.eq_ignore_ascii_case(":memory:") { StateBackend::Memory } else { StateBackend::File(PathBuf::from(p)) };
        }
        if let Some(v) = lookup(ENV_DEMO_USERS) {
            match parse_bool(&v) {
                Some(b) => cfg.demo_users = b,
                None => tracing::warn!(target: "expensedesk::config", "{}='{}' is not a boolean, keeping {}", ENV_DEMO_USERS, v, cfg.demo_users),
            }
        }
        if let Some(r) = lookup(ENV_RATES) {
            cfg.rates = parse_rates(&r);
        }
        if let Some(l) = lookup(ENV_LOG).filter(|l| !l.trim().is_empty()) {
            cfg.log_filter = l;
        }
        cfg
    }

    /// Apply command-line flags (program name excluded).
    pub fn apply_args(&mut self, args: &[String]) -> Result<Launch> {
        let mut it = args.iter();
        while let Some(a) = it.next() {
            match a.as_str() {
                "-h" | "--help" => return Ok(Launch::Help),
                "--state" => {
                    let p = it.next().ok_or_else(|| anyhow!("--state requires a path"))?;
                    self.state = StateBackend::File(PathBuf::from(p));
                }
                "--memory" => self.state = StateBackend::Memory,
                "--demo-users" => self.demo_users = true,
                "--no-demo-users" => self.demo_users = false,
                "--rates" => {
                    let r = it.next().ok_or_else(|| anyhow!("--rates requires CODE=RATE pairs"))?;
                    self.rates = parse_rates(r);
                }
                "-c" | "--command" => {
                    let c = it.next().ok_or_else(|| anyhow!("{} requires a command", a))?;
                    self.command = Some(c.clone());
                }
                other => return Err(anyhow!("unknown argument '{}'", other)),
            }
        }
        Ok(Launch::Run)
    }
}

pub fn usage(program: &str) -> String {
    format!(
        "Usage:\n  {program} [--state <file> | --memory] [--demo-users | --no-demo-users] [--rates <CODE=RATE,...>] [-c \"<cmd>; <cmd>\"]\n\nFlags:\n  --state <file>       JSON file holding the persisted session (default: {DEFAULT_STATE_FILE})\n  --memory             keep state in memory only\n  --demo-users         seed admin@, manager@, employee@example.com (default)\n  --no-demo-users      do not seed the starter roster\n  --rates <pairs>      conversion rates against a common base (default: {DEFAULT_RATES})\n  -c, --command <cmds> run commands separated by ';' and exit\n  -h, --help           show this help\n\nEnvironment:\n  {ENV_STATE_FILE}, {ENV_DEMO_USERS}, {ENV_RATES}, {ENV_LOG} (log filter when RUST_LOG is unset)"
    )
}
