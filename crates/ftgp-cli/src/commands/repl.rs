use std::borrow::Cow::{self, Borrowed, Owned};
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use ftgp_application::{DepositWorkflow, LedgerSession, LoanService, TokenService};
use ftgp_core::amount::TokenAmount;
use ftgp_core::currency::Currency;
use ftgp_core::deposit::{DepositKind, SECONDS_PER_DAY};
use ftgp_core::ledger::TxReceipt;
use ftgp_infrastructure::{ConfigService, DevLedger, connect_ledger};

use super::render;

/// One REPL command: name, argument synopsis, description.
struct CommandSpec {
    name: &'static str,
    args: &'static str,
    about: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec { name: "/list", args: "", about: "refresh and show deposits" },
    CommandSpec {
        name: "/deposit",
        args: "<amount> [open|lockup <days>]",
        about: "create a deposit (lockup: 30, 90, 180 or 365 days)",
    },
    CommandSpec { name: "/withdraw", args: "<id>", about: "withdraw a deposit" },
    CommandSpec { name: "/interest", args: "", about: "query accrued interest" },
    CommandSpec { name: "/balance", args: "", about: "show token balance" },
    CommandSpec {
        name: "/preview",
        args: "<from> <to> <amount>",
        about: "quote a fiat conversion",
    },
    CommandSpec {
        name: "/mint",
        args: "<currency> <amount>",
        about: "convert fiat and mint tokens",
    },
    CommandSpec { name: "/transfer", args: "<address> <amount>", about: "send tokens" },
    CommandSpec {
        name: "/approve",
        args: "<address> <amount>",
        about: "allow an address to spend tokens",
    },
    CommandSpec {
        name: "/redeem",
        args: "<currency> <amount>",
        about: "redeem tokens for fiat",
    },
    CommandSpec { name: "/estimate", args: "<collateral>", about: "estimate a loan" },
    CommandSpec { name: "/borrow", args: "<collateral>", about: "take a loan" },
    CommandSpec { name: "/loan", args: "", about: "show the active loan" },
    CommandSpec { name: "/repay", args: "<currency> <amount>", about: "repay the loan" },
    CommandSpec { name: "/status", args: "", about: "show the last status line" },
    CommandSpec { name: "/help", args: "", about: "show this help" },
    CommandSpec {
        name: "/accrue",
        args: "<amount>",
        about: "dev ledger: set accrued interest",
    },
    CommandSpec {
        name: "/advance",
        args: "<days>",
        about: "dev ledger: move the clock forward",
    },
    CommandSpec { name: "/fund", args: "<amount>", about: "dev ledger: credit tokens" },
    CommandSpec {
        name: "/offline",
        args: "on|off",
        about: "dev ledger: simulate an outage",
    },
];

fn command_spec(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

fn help_text() -> String {
    let mut text = String::new();
    for spec in COMMANDS {
        let usage = format!("{} {}", spec.name, spec.args);
        text.push_str(&format!("{:<38}{}\n", usage.trim_end(), spec.about));
    }
    text.push_str(&format!("{:<38}{}", "quit", "exit"));
    text
}

/// Completes command names, then currency codes where a command expects one,
/// and hints the argument synopsis once a command name is complete.
struct FtgpHelper;

impl FtgpHelper {
    /// Index of the argument a currency code is expected at, per command.
    fn currency_slots(name: &str) -> &'static [usize] {
        match name {
            "/preview" => &[0, 1],
            "/mint" | "/redeem" | "/repay" => &[0],
            _ => &[],
        }
    }
}

impl Helper for FtgpHelper {}

impl Completer for FtgpHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let word_start = before.rfind(' ').map_or(0, |i| i + 1);
        let word = &before[word_start..];
        let name = before.split_whitespace().next().unwrap_or_default();

        let options: Vec<String> = if word_start == 0 {
            COMMANDS
                .iter()
                .map(|spec| spec.name.to_string())
                .filter(|candidate| candidate.starts_with(word))
                .collect()
        } else {
            let arg_index = before[..word_start].split_whitespace().count().saturating_sub(1);
            if Self::currency_slots(name).contains(&arg_index) {
                Currency::ALL
                    .iter()
                    .map(|currency| currency.code().to_string())
                    .filter(|code| code.starts_with(&word.to_ascii_uppercase()))
                    .collect()
            } else {
                Vec::new()
            }
        };

        let pairs = options
            .into_iter()
            .map(|option| Pair {
                display: option.clone(),
                replacement: option,
            })
            .collect();
        Ok((word_start, pairs))
    }
}

impl Highlighter for FtgpHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let name_end = line.find(' ').unwrap_or(line.len());
        let (name, rest) = line.split_at(name_end);
        if command_spec(name).is_some() {
            Owned(format!("{}{}", name.bright_cyan(), rest))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        line.starts_with('/')
    }
}

impl Hinter for FtgpHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() || !line.starts_with('/') {
            return None;
        }
        if let Some(spec) = command_spec(line.trim_end()) {
            if spec.args.is_empty() {
                return None;
            }
            let gap = if line.ends_with(' ') { "" } else { " " };
            return Some(format!("{}{}", gap, spec.args));
        }
        if line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|spec| spec.name.starts_with(line))
            .map(|spec| spec.name[line.len()..].to_string())
    }
}

impl Validator for FtgpHelper {}

/// A parsed REPL line.
#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Status,
    List,
    Deposit {
        amount: String,
        kind: DepositKind,
        lock_days: Option<u32>,
    },
    Withdraw(String),
    Interest,
    Balance,
    Preview {
        from: Currency,
        to: Currency,
        amount: String,
    },
    Mint {
        currency: Currency,
        amount: String,
    },
    Transfer {
        to: String,
        amount: String,
    },
    Approve {
        spender: String,
        amount: String,
    },
    Redeem {
        currency: Currency,
        amount: String,
    },
    Estimate(String),
    Borrow(String),
    Loan,
    Repay {
        currency: String,
        amount: String,
    },
    Accrue(String),
    Advance(String),
    Fund(String),
    Offline(bool),
}

impl Command {
    fn parse(line: &str) -> std::result::Result<Self, String> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();
        let arg = |i: usize| args.get(i).map(|s| s.to_string()).unwrap_or_default();
        let currency = |i: usize| {
            arg(i)
                .parse::<Currency>()
                .map_err(|e| e.to_string())
        };

        let command = match name {
            "/help" => Command::Help,
            "/status" => Command::Status,
            "/list" => Command::List,
            "/deposit" => {
                let kind = match args.get(1) {
                    Some(kind) => kind.parse::<DepositKind>().map_err(|e| e.to_string())?,
                    None => DepositKind::Open,
                };
                let lock_days = match args.get(2) {
                    Some(days) => Some(
                        days.parse::<u32>()
                            .map_err(|_| format!("'{}' is not a number of days", days))?,
                    ),
                    None => None,
                };
                Command::Deposit {
                    amount: arg(0),
                    kind,
                    lock_days,
                }
            }
            "/withdraw" => Command::Withdraw(arg(0)),
            "/interest" => Command::Interest,
            "/balance" => Command::Balance,
            "/preview" => Command::Preview {
                from: currency(0)?,
                to: currency(1)?,
                amount: arg(2),
            },
            "/mint" => Command::Mint {
                currency: currency(0)?,
                amount: arg(1),
            },
            "/transfer" => Command::Transfer {
                to: arg(0),
                amount: arg(1),
            },
            "/approve" => Command::Approve {
                spender: arg(0),
                amount: arg(1),
            },
            "/redeem" => Command::Redeem {
                currency: currency(0)?,
                amount: arg(1),
            },
            "/estimate" => Command::Estimate(arg(0)),
            "/borrow" => Command::Borrow(arg(0)),
            "/loan" => Command::Loan,
            "/repay" => Command::Repay {
                currency: arg(0),
                amount: arg(1),
            },
            "/accrue" => Command::Accrue(arg(0)),
            "/advance" => Command::Advance(arg(0)),
            "/fund" => Command::Fund(arg(0)),
            "/offline" => match arg(0).as_str() {
                "on" => Command::Offline(true),
                "off" => Command::Offline(false),
                _ => return Err("usage: /offline on|off".to_string()),
            },
            other => return Err(format!("Unknown command: {}", other)),
        };
        Ok(command)
    }
}

struct App {
    session: Arc<LedgerSession>,
    workflow: Arc<DepositWorkflow>,
    tokens: Arc<TokenService>,
    loans: Arc<LoanService>,
    dev: Arc<DevLedger>,
}

impl App {
    async fn execute(&self, command: Command) {
        match command {
            Command::Help => println!("{}", help_text().bright_black()),
            Command::Status => {
                let view = self.workflow.view().await;
                println!(
                    "{}",
                    format!(
                        "account {}  phase {:?}",
                        view.account.short(),
                        view.phase
                    )
                    .bright_black()
                );
                if let Some(message) = view.last_message {
                    println!("{}", message);
                }
            }
            Command::List => match self.workflow.refresh().await {
                Ok(deposits) => render::deposits(&deposits),
                Err(_) => self.print_status(false).await,
            },
            Command::Interest => {
                let ok = self.workflow.query_interest().await.is_ok();
                self.print_status(ok).await;
            }
            Command::Balance => match self.tokens.balance().await {
                Ok(balance) => println!("{} FTGP", balance.to_display_2dp().bright_green()),
                Err(e) => print_error(&e),
            },
            Command::Preview { from, to, amount } => {
                match self.tokens.preview_mint(from, to, &amount).await {
                    Ok(quote) => println!("{} {} = {} {}", amount, from, quote, to),
                    Err(e) => print_error(&e),
                }
            }
            Command::Estimate(collateral) => match self.loans.estimate(&collateral) {
                Some(estimate) => println!(
                    "{} ETH ≈ ${:.2} collateral, ≈ {:.2} FTGP",
                    collateral, estimate.collateral_usd, estimate.tokens
                ),
                None => print_error(&"Please enter a valid collateral amount"),
            },
            Command::Loan => match self.loans.loan_details().await {
                Ok(Some(loan)) => render::loan(&loan),
                Ok(None) => println!("{}", "No active loan found".bright_black()),
                Err(e) => print_error(&e),
            },
            Command::Deposit {
                amount,
                kind,
                lock_days,
            } => {
                let workflow = Arc::clone(&self.workflow);
                self.spawn_write(async move {
                    workflow.create_deposit(&amount, kind, lock_days).await
                });
            }
            Command::Withdraw(id) => {
                let workflow = Arc::clone(&self.workflow);
                self.spawn_write(async move { workflow.withdraw_entered(&id).await });
            }
            Command::Mint { currency, amount } => {
                let tokens = Arc::clone(&self.tokens);
                self.spawn_write(async move { tokens.mint(currency, &amount).await });
            }
            Command::Transfer { to, amount } => {
                let tokens = Arc::clone(&self.tokens);
                self.spawn_write(async move { tokens.transfer(&to, &amount).await });
            }
            Command::Approve { spender, amount } => {
                let tokens = Arc::clone(&self.tokens);
                self.spawn_write(async move { tokens.approve(&spender, &amount).await });
            }
            Command::Redeem { currency, amount } => {
                let tokens = Arc::clone(&self.tokens);
                self.spawn_write(async move { tokens.redeem(currency, &amount).await });
            }
            Command::Borrow(collateral) => {
                let loans = Arc::clone(&self.loans);
                self.spawn_write(async move { loans.borrow(&collateral).await });
            }
            Command::Repay { currency, amount } => {
                let loans = Arc::clone(&self.loans);
                self.spawn_write(async move { loans.repay(&currency, &amount).await });
            }
            Command::Accrue(amount) => match TokenAmount::parse(&amount) {
                Ok(amount) => {
                    self.dev
                        .set_accrued_interest(self.session.account(), amount)
                        .await;
                    println!("{}", format!("Accrued interest set to {}", amount).yellow());
                }
                Err(e) => print_error(&e),
            },
            Command::Fund(amount) => match TokenAmount::parse_positive(&amount) {
                Ok(amount) => {
                    self.dev.fund(self.session.account(), amount).await;
                    println!("{}", format!("Credited {} FTGP", amount).yellow());
                }
                Err(e) => print_error(&e),
            },
            Command::Advance(days) => match days.parse::<u32>() {
                Ok(days) => {
                    self.dev
                        .advance_time(i64::from(days) * SECONDS_PER_DAY as i64);
                    println!("{}", format!("Clock advanced by {} days", days).yellow());
                }
                Err(_) => print_error(&"usage: /advance <days>"),
            },
            Command::Offline(offline) => {
                self.dev.set_offline(offline);
                let state = if offline { "offline" } else { "online" };
                println!("{}", format!("Ledger is now {}", state).yellow());
            }
        }
    }

    /// Runs a write in the background so the prompt stays responsive.
    ///
    /// A second write issued while this one is pending is refused by the
    /// session's operation gate.
    fn spawn_write<F>(&self, operation: F)
    where
        F: Future<Output = ftgp_core::Result<TxReceipt>> + Send + 'static,
    {
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            let outcome = operation.await;
            let message = session.last_message().await;
            match outcome {
                Ok(receipt) => println!(
                    "{} {}",
                    message.unwrap_or_default().bright_green(),
                    format!("(block {})", receipt.block_number).bright_black()
                ),
                Err(e) => eprintln!("{}", message.unwrap_or_else(|| e.to_string()).red()),
            }
        });
    }

    async fn print_status(&self, ok: bool) {
        if let Some(message) = self.session.last_message().await {
            if ok {
                println!("{}", message.bright_green());
            } else {
                eprintln!("{}", message.red());
            }
        }
    }
}

fn print_error(error: &dyn std::fmt::Display) {
    eprintln!("{}", error.to_string().red());
}

/// Interactive session over the configured ledger.
pub async fn run(service: &ConfigService) -> Result<()> {
    let config = service.get_config()?;
    let connection = connect_ledger(&config).await?;
    let session = LedgerSession::connect(connection.wallet, connection.ledger).await?;

    let app = App {
        workflow: Arc::new(DepositWorkflow::new(Arc::clone(&session), &config.workflow)),
        tokens: Arc::new(TokenService::new(Arc::clone(&session))),
        loans: Arc::new(LoanService::new(Arc::clone(&session), &config.loan)),
        dev: connection.dev,
        session,
    };

    let mut phases = app.session.gate().subscribe();
    let phase_printer = tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = *phases.borrow_and_update();
            if let Some(line) = render::phase(phase) {
                println!("{}", line.bright_black());
            }
        }
    });

    let mut rl = Editor::new()?;
    rl.set_helper(Some(FtgpHelper));

    println!("{}", "=== FTGP ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Account {} on ledger {}. Type '/help' for commands or 'quit' to exit.",
            app.session.account().short(),
            app.session.ledger().address().short()
        )
        .bright_black()
    );
    println!();

    if app.workflow.refresh().await.is_ok() {
        render::deposits(&app.workflow.deposits().await);
    } else {
        app.print_status(false).await;
    }

    loop {
        match rl.readline("ftgp> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match Command::parse(trimmed) {
                    Ok(command) => app.execute(command).await,
                    Err(message) => print_error(&message),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    phase_printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deposit_defaults_to_open() {
        assert_eq!(
            Command::parse("/deposit 100").unwrap(),
            Command::Deposit {
                amount: "100".to_string(),
                kind: DepositKind::Open,
                lock_days: None,
            }
        );
        assert_eq!(
            Command::parse("/deposit 5 lockup 90").unwrap(),
            Command::Deposit {
                amount: "5".to_string(),
                kind: DepositKind::Lockup,
                lock_days: Some(90),
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_arguments() {
        assert!(Command::parse("/deposit 5 lockup ninety").is_err());
        assert!(Command::parse("/mint xyz 10").is_err());
        assert!(Command::parse("/offline maybe").is_err());
        assert!(Command::parse("/nope").is_err());
    }

    #[test]
    fn test_parse_currency_is_case_insensitive() {
        assert_eq!(
            Command::parse("/redeem gbp 12.5").unwrap(),
            Command::Redeem {
                currency: Currency::Gbp,
                amount: "12.5".to_string(),
            }
        );
    }

    #[test]
    fn test_every_listed_command_parses() {
        for spec in COMMANDS {
            let line = format!("{} {}", spec.name, spec.args);
            let parsed = Command::parse(line.trim_end());
            assert!(
                !matches!(&parsed, Err(message) if message.starts_with("Unknown command")),
                "{} is listed but not parsed",
                spec.name
            );
        }
        assert!(help_text().contains("/offline on|off"));
    }

    #[test]
    fn test_currency_slots_follow_argument_order() {
        assert_eq!(FtgpHelper::currency_slots("/preview"), &[0, 1]);
        assert_eq!(FtgpHelper::currency_slots("/repay"), &[0]);
        assert!(FtgpHelper::currency_slots("/transfer").is_empty());
    }
}
