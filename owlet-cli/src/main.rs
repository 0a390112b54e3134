use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod auth;
mod config;
mod export;

use owlet_core::analytics;
use owlet_core::{Category, GeoPoint, Transaction, TxKind};
use owlet_store::{GoalStore, LedgerStore, Store};

#[derive(Parser, Debug)]
#[command(name = "owlet", version, about = "Personal finance ledger with an AI conscience")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a transaction by hand
    Add {
        /// Sign is ignored; use --credit for income
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        merchant: String,

        /// Food, Travel, Fun, Academic, or Other
        #[arg(long, default_value = "Other", value_parser = parse_category)]
        category: Category,

        /// Record a credit (default is a debit)
        #[arg(long)]
        credit: bool,

        /// Override the record date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        lat: Option<f64>,
        #[arg(long)]
        lng: Option<f64>,
    },

    /// Classify a pasted bank alert and record the result
    Classify {
        /// The alert text
        text: Vec<String>,

        #[arg(long)]
        lat: Option<f64>,
        #[arg(long)]
        lng: Option<f64>,
    },

    /// Classify a receipt image and record the result
    Scan {
        image: PathBuf,
    },

    /// Show recent transactions
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Delete a transaction by id (reverses its balance effect)
    Rm {
        id: String,
    },

    /// Show the balance, or override it with --set
    Balance {
        /// The balance may go negative; no floor is enforced
        #[arg(long, allow_negative_numbers = true)]
        set: Option<f64>,
    },

    /// Totals, category breakdown, and streak
    Summary,

    /// Savings goal operations
    Goal {
        #[command(subcommand)]
        command: GoalCommand,
    },

    /// Project the zero-balance date from recent history
    Runway,

    /// Compare spending against peer benchmarks
    Compare,

    /// One actionable savings tip from recent spending
    Tip,

    /// What the owl thinks of your week
    Buddy,

    /// Export the ledger to CSV
    Export {
        #[arg(long)]
        out: PathBuf,
    },

    /// Identity and API-key management
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Config file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum GoalCommand {
    /// Create a savings goal (one active goal at a time)
    Set { title: String, target: f64 },

    /// Show the active goal and import availability
    Status,

    /// Move money into the goal (records a debit)
    Contribute { amount: f64 },

    /// Move money back out (records a credit)
    Withdraw { amount: f64 },

    /// Delete the goal; recorded transactions stay
    Delete,

    /// Copy the goal to the shared slot (last writer wins)
    Publish,

    /// Adopt the shared goal (only without an active goal)
    Import,

    /// Ask the advisor what to skip to get there
    Strategy,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Sign in as an identity; ledger and goal data are keyed per identity
    Login { user: String },

    /// Sign out back to the anonymous local ledger
    Logout,

    /// Show the signed-in identity and key status
    Status,

    /// Paste and store a Gemini API key
    SetKey,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Command::Add {
            amount,
            merchant,
            category,
            credit,
            date,
            lat,
            lng,
        } => {
            if merchant.trim().is_empty() || !amount.is_finite() {
                println!("Nothing recorded: amount must be a number and merchant non-empty.");
                return Ok(());
            }

            let mut ledger = open_ledger(&cfg)?;
            let kind = if credit { TxKind::Credit } else { TxKind::Debit };
            let mut tx = Transaction::new(amount, merchant.trim(), category, kind, "manual entry")
                .with_location(location_from(lat, lng));
            if let Some(s) = date {
                let d = NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .with_context(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))?;
                tx = tx.with_date(Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)));
            }
            let recorded = tx.clone();
            ledger.append(tx)?;
            print_recorded(&recorded, ledger.ledger().balance);
        }

        Command::Classify { text, lat, lng } => {
            let text = text.join(" ");
            if text.trim().is_empty() {
                bail!("nothing to classify (pass the alert text)");
            }

            let gem = gemini_config(&cfg)?;
            let mut ledger = open_ledger(&cfg)?;

            match owlet_advisor::classify_message(&gem, &text, location_from(lat, lng)).await {
                Ok(c) => {
                    let origin = format!("SMS: {}...", truncate_chars(&text, 50));
                    let tx = Transaction::new(c.amount, c.merchant, c.category, c.kind, origin)
                        .with_location(c.location);
                    let recorded = tx.clone();
                    ledger.append(tx)?;
                    print_recorded(&recorded, ledger.ledger().balance);
                }
                // Classification failures never reach the ledger.
                Err(e) => eprintln!("classification failed: {e:#}"),
            }
        }

        Command::Scan { image } => {
            let mime = mime_for(&image)?;
            let bytes =
                std::fs::read(&image).with_context(|| format!("read {}", image.display()))?;

            let gem = gemini_config(&cfg)?;
            let mut ledger = open_ledger(&cfg)?;

            match owlet_advisor::classify_receipt(&gem, &bytes, mime).await {
                Ok(c) => {
                    let name = image
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| image.display().to_string());
                    let tx = Transaction::new(
                        c.amount,
                        c.merchant,
                        c.category,
                        c.kind,
                        format!("Scanned: {name}"),
                    );
                    let recorded = tx.clone();
                    ledger.append(tx)?;
                    print_recorded(&recorded, ledger.ledger().balance);
                }
                Err(e) => eprintln!("receipt classification failed: {e:#}"),
            }
        }

        Command::List { limit } => {
            let ledger = open_ledger(&cfg)?;
            let txs = &ledger.ledger().transactions;
            if txs.is_empty() {
                println!("No transactions yet.");
                return Ok(());
            }
            for tx in txs.iter().take(limit) {
                print_tx(tx);
            }
            if txs.len() > limit {
                println!("... and {} more (use --limit)", txs.len() - limit);
            }
        }

        Command::Rm { id } => {
            let mut ledger = open_ledger(&cfg)?;
            match ledger.remove(&id)? {
                Some(tx) => println!(
                    "Removed {} of ${:.2} at {}. Balance: ${:.2}",
                    tx.kind.label(),
                    tx.amount,
                    tx.merchant,
                    ledger.ledger().balance
                ),
                None => println!("No transaction with id {id}."),
            }
        }

        Command::Balance { set } => {
            let mut ledger = open_ledger(&cfg)?;
            match set {
                Some(value) if value.is_finite() => {
                    ledger.set_balance(value)?;
                    println!("Balance set to ${:.2}", value);
                }
                Some(_) => println!("Nothing changed: balance must be a number."),
                None => println!("Balance: ${:.2}", ledger.ledger().balance),
            }
        }

        Command::Summary => {
            let ledger = open_ledger(&cfg)?;
            let snapshot = ledger.ledger();
            let s = analytics::spending_summary(&snapshot.transactions);

            println!("Balance:        ${:.2}", snapshot.balance);
            println!("Total spent:    ${:.2}", s.spent);
            println!("Total income:   ${:.2}", s.income);
            println!("Average ticket: ${:.2}", s.average_ticket);
            println!();
            for (cat, total) in analytics::category_totals(&snapshot.transactions) {
                println!("{:<10} ${:.2}", cat.label(), total);
            }

            let tz = cfg.tz()?;
            let today = Utc::now().with_timezone(&tz).date_naive();
            println!();
            println!(
                "No-spend streak: {} days",
                analytics::no_spend_streak(&snapshot.transactions, tz, today)
            );
        }

        Command::Goal { command } => run_goal(command, &cfg).await?,

        Command::Runway => {
            let ledger = open_ledger(&cfg)?;
            if ledger.ledger().len() < 3 {
                println!("Record at least 3 transactions for runway analysis.");
                return Ok(());
            }
            let gem = gemini_config(&cfg)?;
            let req =
                analytics::runway_request(&ledger.ledger().transactions, ledger.ledger().balance);
            let analysis = match owlet_advisor::runway(&gem, &req).await {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("advisor unavailable: {e:#}");
                    owlet_advisor::RunwayAnalysis::fallback()
                }
            };
            print_runway(&analysis);
        }

        Command::Compare => {
            let ledger = open_ledger(&cfg)?;
            let gem = gemini_config(&cfg)?;
            let spend = analytics::peer_request(&ledger.ledger().transactions);
            let rows = match owlet_advisor::peer_comparison(&gem, &spend).await {
                Ok(rows) => rows,
                Err(e) => {
                    eprintln!("advisor unavailable: {e:#}");
                    Vec::new()
                }
            };
            if rows.is_empty() {
                println!("No benchmark data available.");
                return Ok(());
            }
            for r in rows {
                println!(
                    "{:<10} you ${:>8.2}  peers ${:>8.2}  {}",
                    r.category, r.user_amount, r.peer_amount, r.insight
                );
            }
        }

        Command::Tip => {
            let ledger = open_ledger(&cfg)?;
            if ledger.ledger().is_empty() {
                println!("No transactions yet.");
                return Ok(());
            }
            let gem = gemini_config(&cfg)?;
            let recent = analytics::recent_summary(&ledger.ledger().transactions, 5);
            let tip = match owlet_advisor::savings_tip(&gem, &recent).await {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("advisor unavailable: {e:#}");
                    owlet_advisor::TIP_FALLBACK.to_string()
                }
            };
            println!("\"{tip}\"");
        }

        Command::Buddy => {
            let ledger = open_ledger(&cfg)?;
            let gem = gemini_config(&cfg)?;
            let tz = cfg.tz()?;
            let now = Utc::now();
            let today = now.with_timezone(&tz).date_naive();
            let stats = analytics::buddy_stats(&ledger.ledger().transactions, now, tz, today);

            let feedback = match owlet_advisor::buddy_feedback(&gem, &stats).await {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("advisor unavailable: {e:#}");
                    owlet_advisor::BUDDY_FALLBACK.to_string()
                }
            };
            println!("\"{feedback}\"");
            println!("Saving streak: {} days", stats.streak_days);
            println!(
                "This week: ${:.2} on Fun out of ${:.2} spent",
                stats.fun_spent, stats.total_spent
            );
        }

        Command::Export { out } => {
            let ledger = open_ledger(&cfg)?;
            export::write_csv(&out, &ledger.ledger().transactions)?;
            println!(
                "Wrote {} records to {}",
                ledger.ledger().len(),
                out.display()
            );
        }

        Command::Auth { command } => match command {
            AuthCommand::Login { user } => auth::login(&user)?,
            AuthCommand::Logout => auth::logout()?,
            AuthCommand::Status => auth::status()?,
            AuthCommand::SetKey => auth::paste_gemini_key()?,
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
        },
    }

    Ok(())
}

async fn run_goal(command: GoalCommand, cfg: &config::Config) -> Result<()> {
    let user = auth::load_auth()?.current_user;
    let store = Store::open()?;
    let mut goals = GoalStore::load(store.clone(), user.as_deref())?;

    match command {
        GoalCommand::Set { title, target } => {
            if goals.create(&title, target)? {
                println!("Goal set: {} (target ${:.2})", title.trim(), target);
            } else {
                println!(
                    "No goal created: the title must be non-empty, the target positive, and no goal already active."
                );
            }
        }

        GoalCommand::Status => match goals.active() {
            Some(goal) => {
                println!("{}", goal.title);
                println!(
                    "Saved ${:.2} of ${:.2} ({:.0}%)",
                    goal.current_saved,
                    goal.target_amount,
                    goal.progress()
                );
            }
            None => {
                println!("No active goal.");
                if store.read_published_goal()?.is_some() {
                    println!("A shared goal is available: owlet goal import");
                }
            }
        },

        GoalCommand::Contribute { amount } => {
            match goals.contribute(amount)? {
                Some(tx) => {
                    // A contribution is itself a transaction; it reduces
                    // spendable balance.
                    let mut ledger =
                        LedgerStore::load(store, user.as_deref(), cfg.profile.opening_balance)?;
                    ledger.append(tx)?;
                    let goal = goals.active().context("goal vanished after contribute")?;
                    println!(
                        "Saved ${:.2} of ${:.2}. Balance: ${:.2}",
                        goal.current_saved,
                        goal.target_amount,
                        ledger.ledger().balance
                    );
                }
                None => println!("No contribution recorded: need an active goal and a positive amount."),
            }
        }

        GoalCommand::Withdraw { amount } => {
            match goals.withdraw(amount)? {
                Some(tx) => {
                    let mut ledger =
                        LedgerStore::load(store, user.as_deref(), cfg.profile.opening_balance)?;
                    ledger.append(tx)?;
                    let goal = goals.active().context("goal vanished after withdraw")?;
                    println!(
                        "Saved ${:.2} of ${:.2}. Balance: ${:.2}",
                        goal.current_saved,
                        goal.target_amount,
                        ledger.ledger().balance
                    );
                }
                None => println!("No withdrawal recorded: need an active goal and a positive amount."),
            }
        }

        GoalCommand::Delete => {
            if goals.delete()? {
                println!("Goal deleted. Recorded savings transactions stay in the ledger.");
            } else {
                println!("No active goal.");
            }
        }

        GoalCommand::Publish => {
            if goals.publish()? {
                println!("Goal published to the shared slot (last writer wins).");
            } else {
                println!("No active goal to publish.");
            }
        }

        GoalCommand::Import => match goals.import()? {
            Some(goal) => println!(
                "Imported \"{}\": ${:.2} of ${:.2} already saved.",
                goal.title, goal.current_saved, goal.target_amount
            ),
            None => println!("Nothing to import (need an empty goal slot here and a published goal)."),
        },

        GoalCommand::Strategy => {
            let Some(goal) = goals.active().cloned() else {
                println!("No active goal.");
                return Ok(());
            };
            let ledger = LedgerStore::load(store.clone(), user.as_deref(), cfg.profile.opening_balance)?;
            if ledger.ledger().len() <= 2 {
                println!("Record a few transactions first so the advisor has history to work with.");
                return Ok(());
            }

            let gem = gemini_config(cfg)?;
            let req = analytics::goal_strategy_request(&goal, &ledger.ledger().transactions);
            let strategy = match owlet_advisor::goal_strategy(&gem, &req).await {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("advisor unavailable: {e:#}");
                    owlet_advisor::GoalStrategy::fallback()
                }
            };

            // Another session may have deleted or replaced the goal while
            // the call was in flight; a stale suggestion is discarded.
            let current = GoalStore::load(store, user.as_deref())?;
            match current.active() {
                Some(g) if g.id == goal.id => {
                    println!(
                        "To hit \"{}\", skip {} more {} (about ${:.2} each).",
                        goal.title,
                        strategy.skips_required,
                        strategy.item_to_skip,
                        strategy.avg_cost_per_item
                    );
                    if !strategy.encouragement.is_empty() {
                        println!("\"{}\"", strategy.encouragement);
                    }
                }
                _ => println!("The goal changed while asking the advisor; ignoring the stale suggestion."),
            }
        }
    }

    Ok(())
}

fn open_ledger(cfg: &config::Config) -> Result<LedgerStore> {
    let user = auth::load_auth()?.current_user;
    let store = Store::open()?;
    LedgerStore::load(store, user.as_deref(), cfg.profile.opening_balance)
}

fn gemini_config(cfg: &config::Config) -> Result<owlet_advisor::GeminiConfig> {
    let key = auth::resolve_api_key()?.ok_or_else(|| {
        anyhow::anyhow!("missing Gemini API key; run: owlet auth set-key (or set GEMINI_API_KEY)")
    })?;
    Ok(cfg.gemini(key))
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::parse_loose(s).ok_or_else(|| {
        format!("unknown category '{s}' (expected one of: Food, Travel, Fun, Academic, Other)")
    })
}

fn location_from(lat: Option<f64>, lng: Option<f64>) -> Option<GeoPoint> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint {
            lat,
            lng,
            address: None,
        }),
        _ => None,
    }
}

fn mime_for(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    Ok(match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => bail!("unsupported image type: {}", path.display()),
    })
}

fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn print_recorded(tx: &Transaction, balance: f64) {
    println!(
        "Recorded {} of ${:.2} at {} [{}]. Balance: ${:.2}",
        tx.kind.label(),
        tx.amount,
        tx.merchant,
        tx.category.label(),
        balance
    );
    println!("id: {}", tx.id);
}

fn print_tx(tx: &Transaction) {
    let sign = match tx.kind {
        TxKind::Credit => '+',
        TxKind::Debit => '-',
    };
    println!(
        "{}  {}  {}{:>9.2}  {:<8}  {}  ({})",
        tx.id,
        tx.date.format("%Y-%m-%d %H:%M"),
        sign,
        tx.amount,
        tx.category.label(),
        tx.merchant,
        tx.origin
    );
}

fn print_runway(a: &owlet_advisor::RunwayAnalysis) {
    println!("Days left: {}", a.days_remaining);
    println!("Burn rate: ${:.2}/day", a.burn_rate_per_day);
    if !a.zero_date.is_empty() {
        println!("Zero-day projection: {}", a.zero_date);
    }
    if a.warning_level >= 7 {
        println!("DANGER BURN (warning level {})", a.warning_level);
    }
    if !a.advice.is_empty() {
        println!("\"{}\"", a.advice);
    }
}
