//! Interactive shell standing in for the browser views.
//!
//! Each command that shows a view goes through the gate first; the shell only
//! reads identity snapshots from the session store and never keeps its own.

pub mod outputformatter;

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use rustyline::error::ReadlineError;

use crate::config::{AppConfig, StateBackend};
use crate::error::{AppError, AppResult};
use crate::expenses::{convert_amount, AmountFilter, ApprovalQueue, Category, ExpenseDraft, ExpenseLedger, RateTable};
use crate::identity::{
    fallback_for, resolve, resolve_route, FileAdapter, Identity, MemoryAdapter, Navigation, PersistenceAdapter, Route,
    SessionStore,
};
use outputformatter::render_table;

pub const PROMPT: &str = "expensedesk> ";

pub const HELP: &str = "Commands:\n  signup <email> <password> [company...]   register a company admin and sign in\n  signin <email> <password>                sign in as a known user\n  signout                                  end the session\n  whoami                                   show the current user\n  open <path>                              open a view (/, /login, /signup, /admin, /manager, /employee, /approvals, /submit)\n  submit <amount> <currency> <category> <YYYY-MM-DD|-> <description...>\n                                           submit an expense (employees)\n  expenses [all|high|low]                  list your expenses (employees)\n  delete <id>                              delete one of your expenses (employees)\n  approvals                                list approval items (managers)\n  approve <id> | reject <id>               decide a pending item (managers)\n  convert <amount> <from> <to>             convert between currencies\n  help                                     show this help\n  quit | exit                              leave the shell";

/// Result of one shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Output(String),
    Quit,
}

pub struct Shell {
    store: SessionStore,
    ledger: ExpenseLedger,
    approvals: ApprovalQueue,
    rates: RateTable,
    view: Route,
}

/// Build the session store described by the config: pick the adapter, seed
/// the demo roster, then rehydrate the session.
pub fn build_store(cfg: &AppConfig) -> Result<SessionStore> {
    let adapter: Arc<dyn PersistenceAdapter> = match &cfg.state {
        StateBackend::File(p) => Arc::new(FileAdapter::open(p)),
        StateBackend::Memory => Arc::new(MemoryAdapter::new()),
    };
    let store = SessionStore::new(adapter);
    if cfg.demo_users {
        store.seed_directory(&Identity::demo_roster())?;
    }
    store.restore_on_startup();
    Ok(store)
}

fn parse_id(arg: Option<&str>) -> AppResult<u64> {
    let a = arg.ok_or_else(|| AppError::user("missing_argument", "expected an id"))?;
    a.parse::<u64>().map_err(|_| AppError::user("bad_id".to_string(), format!("'{}' is not an id", a)))
}

fn parse_amount(arg: Option<&str>) -> AppResult<f64> {
    let a = arg.ok_or_else(|| AppError::user("missing_argument", "expected an amount"))?;
    a.parse::<f64>().map_err(|_| AppError::user("bad_amount".to_string(), format!("'{}' is not an amount", a)))
}

fn fmt_amount(v: f64) -> String { format!("{:.2}", v) }

impl Shell {
    pub fn new(store: SessionStore, rates: RateTable) -> Self {
        let view = fallback_for(store.current_identity().as_ref());
        Self { store, ledger: ExpenseLedger::new(), approvals: ApprovalQueue::sample(), rates, view }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        Ok(Self::new(build_store(cfg)?, cfg.rates.clone()))
    }

    pub fn store(&self) -> &SessionStore { &self.store }

    /// The view currently on screen.
    pub fn view(&self) -> Route { self.view }

    pub fn ledger(&self) -> &ExpenseLedger { &self.ledger }

    pub fn approvals(&self) -> &ApprovalQueue { &self.approvals }

    /// Gate `route` for the current identity. On denial the shell moves to
    /// the redirect target and the caller gets a `forbidden` error.
    fn enter(&mut self, route: Route) -> AppResult<Option<Identity>> {
        let current = self.store.current_identity();
        match resolve_route(current.as_ref(), route) {
            Navigation::Render(r) => {
                self.view = r;
                Ok(current)
            }
            Navigation::Redirect(to) => {
                self.view = to;
                tracing::debug!(target: "expensedesk::cli", "gate denied {} -> {}", route, to);
                Err(AppError::forbidden("forbidden".to_string(), format!("{} is not available, redirected to {}", route, to)))
            }
        }
    }

    /// Like `enter`, for views that only exist for a signed-in user.
    fn enter_signed_in(&mut self, route: Route) -> AppResult<Identity> {
        self.enter(route)?.ok_or_else(|| AppError::auth("not_signed_in", "sign in first"))
    }

    pub fn execute(&mut self, line: &str) -> AppResult<Outcome> {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else { return Ok(Outcome::Output(String::new())) };
        let args: Vec<&str> = parts.collect();
        let out = match cmd.to_ascii_lowercase().as_str() {
            "quit" | "exit" => return Ok(Outcome::Quit),
            "help" | "?" => HELP.to_string(),
            "signup" => self.cmd_signup(&args)?,
            "signin" | "login" => self.cmd_signin(&args)?,
            "signout" | "logout" => {
                self.store.sign_out()?;
                self.view = Route::SignIn;
                "signed out".to_string()
            }
            "whoami" => match self.store.current_identity() {
                Some(id) => match id.company {
                    Some(c) => format!("{} ({}, {})", id.email, id.role, c),
                    None => format!("{} ({})", id.email, id.role),
                },
                None => "not signed in".to_string(),
            },
            "open" => self.cmd_open(args.first().copied().unwrap_or("/")),
            "submit" => self.cmd_submit(&args)?,
            "expenses" => self.cmd_expenses(args.first().copied().unwrap_or("all"))?,
            "delete" => {
                let me = self.enter_signed_in(Route::EmployeeDashboard)?;
                let id = parse_id(args.first().copied())?;
                let owned = self.ledger.submitted_by(&me.email).any(|e| e.id == id);
                if !owned || !self.ledger.delete(id) {
                    return Err(AppError::not_found("not_found".to_string(), format!("no expense with id {}", id)));
                }
                format!("deleted expense {}", id)
            }
            "approvals" => {
                self.enter_signed_in(Route::Approvals)?;
                self.render_approvals()
            }
            "approve" | "reject" => {
                self.enter_signed_in(Route::Approvals)?;
                let id = parse_id(args.first().copied())?;
                let item = if cmd.eq_ignore_ascii_case("approve") { self.approvals.approve(id)? } else { self.approvals.reject(id)? };
                format!("{} {} {} {} -> {}", item.id, item.employee, fmt_amount(item.amount), item.currency, item.status)
            }
            "convert" => {
                let amount = parse_amount(args.first().copied())?;
                let (Some(from), Some(to)) = (args.get(1), args.get(2)) else {
                    return Err(AppError::user("missing_argument", "usage: convert <amount> <from> <to>"));
                };
                let converted = convert_amount(amount, from, to, &self.rates);
                format!("{} {} = {} {}", fmt_amount(amount), from.to_ascii_uppercase(), fmt_amount(converted), to.to_ascii_uppercase())
            }
            other => return Err(AppError::user("unknown_command".to_string(), format!("unknown command '{}', try 'help'", other))),
        };
        Ok(Outcome::Output(out))
    }

    fn cmd_signup(&mut self, args: &[&str]) -> AppResult<String> {
        self.enter(Route::SignUp)?;
        let (Some(email), Some(password)) = (args.first(), args.get(1)) else {
            return Err(AppError::user("missing_argument", "usage: signup <email> <password> [company...]"));
        };
        let company = args[2..].join(" ");
        let id = self.store.sign_up(email, password, Some(company.as_str()))?;
        self.view = fallback_for(Some(&id));
        Ok(format!("welcome {} ({})\n{}", id.email, id.role, self.render(self.view)))
    }

    fn cmd_signin(&mut self, args: &[&str]) -> AppResult<String> {
        self.enter(Route::SignIn)?;
        let (Some(email), Some(password)) = (args.first(), args.get(1)) else {
            return Err(AppError::user("missing_argument", "usage: signin <email> <password>"));
        };
        // a failed sign-in keeps the caller on the sign-in view
        let id = self.store.sign_in(email, password)?;
        self.view = fallback_for(Some(&id));
        Ok(format!("signed in as {} ({})\n{}", id.email, id.role, self.render(self.view)))
    }

    fn cmd_open(&mut self, path: &str) -> String {
        let current = self.store.current_identity();
        let nav = resolve(current.as_ref(), path);
        self.view = nav.route();
        match nav {
            Navigation::Render(r) => self.render(r),
            Navigation::Redirect(r) => format!("redirected to {}\n{}", r, self.render(r)),
        }
    }

    fn cmd_submit(&mut self, args: &[&str]) -> AppResult<String> {
        let me = self.enter_signed_in(Route::SubmitExpense)?;
        if args.len() < 5 {
            return Err(AppError::user("missing_argument", "usage: submit <amount> <currency> <category> <YYYY-MM-DD|-> <description...>"));
        }
        let amount = parse_amount(Some(args[0]))?;
        let category = args[2].parse::<Category>()?;
        let date = match args[3] {
            "-" => None,
            d => Some(NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|_| AppError::user("bad_date".to_string(), format!("'{}' is not a YYYY-MM-DD date", d)))?),
        };
        let draft = ExpenseDraft { description: args[4..].join(" "), amount, currency: args[1].to_string(), category, date };
        let e = self.ledger.submit(draft, &me.email)?;
        Ok(format!("submitted expense {}: {} {} {} ({})", e.id, fmt_amount(e.amount), e.currency, e.description, e.category))
    }

    fn cmd_expenses(&mut self, filter: &str) -> AppResult<String> {
        let me = self.enter_signed_in(Route::EmployeeDashboard)?;
        let f = AmountFilter::parse(filter)
            .ok_or_else(|| AppError::user("bad_filter".to_string(), format!("unknown filter '{}', use all|high|low", filter)))?;
        Ok(self.render_expenses(&me.email, f))
    }

    fn render_expenses(&self, email: &str, f: AmountFilter) -> String {
        let mine = self.ledger.filter_for(email, f);
        if mine.is_empty() { return "no expenses".to_string(); }
        let rows: Vec<Vec<String>> = mine
            .iter()
            .map(|e| vec![
                e.id.to_string(),
                e.date.map(|d| d.to_string()).unwrap_or_default(),
                e.category.to_string(),
                e.description.clone(),
                fmt_amount(e.amount),
                e.currency.clone(),
                if e.is_high() { "high".into() } else { String::new() },
            ])
            .collect();
        let total = self.ledger.total_for(email);
        format!("{}\ntotal: {}", render_table(&["id", "date", "category", "description", "amount", "currency", "flag"], &rows), fmt_amount(total))
    }

    fn render_approvals(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .approvals
            .items()
            .iter()
            .map(|i| vec![
                i.id.to_string(),
                i.employee.clone(),
                i.category.to_string(),
                fmt_amount(i.amount),
                i.currency.clone(),
                i.date.to_string(),
                i.status.to_string(),
            ])
            .collect();
        render_table(&["id", "employee", "category", "amount", "currency", "date", "status"], &rows)
    }

    fn render(&self, route: Route) -> String {
        let who = self.store.current_identity();
        let email = who.as_ref().map(|i| i.email.as_str()).unwrap_or("");
        let body = match route {
            Route::SignIn => "Test users: admin@example.com, manager@example.com, employee@example.com\n  signin <email> <password> | open /signup".to_string(),
            Route::SignUp => "signup <email> <password> [company...]".to_string(),
            Route::AdminDashboard => {
                let company = who.as_ref().and_then(|i| i.company.clone()).unwrap_or_else(|| "-".into());
                format!("{} (company: {})\nUser management and rule configuration.", email, company)
            }
            Route::ManagerDashboard => {
                format!("{}\nPending approvals: {} (open /approvals)", email, self.approvals.pending().count())
            }
            Route::EmployeeDashboard => {
                format!("{}\n{}\n(submit to add, open /submit for the form)", email, self.render_expenses(email, AmountFilter::All))
            }
            Route::Approvals => self.render_approvals(),
            Route::SubmitExpense => format!(
                "submit <amount> <currency> <category> <YYYY-MM-DD|-> <description...>\ncategories: {}",
                Category::ALL.iter().map(|c| c.label()).collect::<Vec<_>>().join(", ")
            ),
        };
        format!("== {} ==\n{}", route.title(), body)
    }

    /// Run `;`-separated commands, printing each result. Stops at `quit`.
    pub fn run_batch(&mut self, commands: &str) {
        for cmd in commands.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            match self.execute(cmd) {
                Ok(Outcome::Quit) => break,
                Ok(Outcome::Output(s)) => { if !s.is_empty() { println!("{}", s); } }
                Err(e) => eprintln!("{}", e.report()),
            }
        }
    }

    pub fn run_interactive(&mut self) -> Result<()> {
        let mut rl = rustyline::DefaultEditor::new()?;
        println!("{}", self.render(self.view));
        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if line.trim().is_empty() { continue; }
                    let _ = rl.add_history_entry(line.as_str());
                    match self.execute(&line) {
                        Ok(Outcome::Quit) => break,
                        Ok(Outcome::Output(s)) => println!("{}", s),
                        Err(e) => eprintln!("{}", e.report()),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
