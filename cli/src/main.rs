//! CPO Admin command line
//!
//! Runs one administrative action against the merchant database and prints
//! the result as JSON.
//!
//! ```sh
//! # Onboard a CPO and queue its login (default config: ~/.config/cpo-admin/config.toml)
//! cpo-admin --outbox ./outbox.jsonl register --name "GreenCharge" --contact-name "Ana Cruz" \
//!     --contact-number 09112231123 --contact-email ops@greencharge.ph --username greencharge
//!
//! # Fund it, then list what can still be voided
//! cpo-admin topup 1 50000
//! cpo-admin voidable 1
//!
//! # Validate config without touching the database
//! cpo-admin --check
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use cpo_admin::domain::CompanyProfile;
use cpo_admin::infrastructure::database::run_migrations;
use cpo_admin::infrastructure::{build_notifier, init_database, NotifierConfig, SeaOrmMerchantStore};
use cpo_admin::shared::{AppError, InfraError};
use cpo_admin::{default_config_path, init_tracing, AdminContext, AppConfig, MerchantAdmin};

/// CPO merchant administration for EV charging platforms.
#[derive(Parser, Debug)]
#[command(
    name = "cpo-admin",
    version,
    about = "Administer Charging Point Operator merchant accounts",
    long_about = "Register CPOs, maintain their profiles and RFID cards, and manage \
                  prepaid balances with a 60 minute void window.\n\n\
                  Default config: ~/.config/cpo-admin/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "CPO_ADMIN_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Queue issued credentials in this outbox file (overrides [notifier]).
    #[arg(long, env = "CPO_ADMIN_OUTBOX")]
    outbox: Option<PathBuf>,

    /// Administrator recorded as the actor in the audit trail.
    #[arg(long, env = "CPO_ADMIN_ACTOR", default_value = "cli")]
    actor: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Onboard a new CPO and issue its login credentials.
    Register {
        /// Company name; the party id is derived from it.
        #[arg(long)]
        name: String,
        #[arg(long)]
        contact_name: String,
        #[arg(long)]
        contact_number: String,
        #[arg(long)]
        contact_email: String,
        #[arg(long)]
        username: String,
    },
    /// Check whether a username, contact_number or contact_email is free.
    Check { field: String, value: String },
    /// List accounts by id.
    List {
        #[arg(long, default_value_t = 10)]
        limit: u64,
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    /// Search accounts by company name.
    Search {
        #[arg(default_value = "")]
        pattern: String,
    },
    /// Show one account.
    Show { account_id: i32 },
    /// Change profile fields: --set contact_name="Ana Cruz" ...
    Update {
        account_id: i32,
        #[arg(long = "set", value_parser = parse_assignment)]
        changes: Vec<(String, String)>,
    },
    /// Issue an RFID card to an account.
    AddRfid { account_id: i32, tag: String },
    /// Activate or deactivate an account.
    SetStatus { account_id: i32, action: String },
    /// Credit an account's prepaid balance (minor units).
    Topup {
        account_id: i32,
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
    /// List top-ups that can still be voided.
    Voidable { account_id: i32 },
    /// Reverse a top-up by its reference id.
    Void { reference_id: i32 },
    /// Print the audit trail.
    Audit {
        #[arg(long)]
        account_id: Option<i32>,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected field=value, got '{}'", raw))
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value).map_err(|e| InfraError::from(e).into())
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    let (mut config, config_loaded) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, true),
        Err(e) => {
            if cli.check {
                eprintln!("Configuration is invalid: {}", e);
                return ExitCode::FAILURE;
            }
            let mut cfg = AppConfig::default();
            apply_overrides(&cli, &mut cfg);
            init_tracing(&cfg);
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            (cfg, false)
        }
    };

    if config_loaded {
        apply_overrides(&cli, &mut config);
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        println!("   Policy      : {:?}", config.workflow.notification_policy);
        println!("   Notifier    : {:?}", config.notifier.kind);
        return ExitCode::SUCCESS;
    }

    if config_loaded {
        init_tracing(&config);
        info!("Configuration loaded from {}", config_path.display());
    }

    let Some(command) = cli.command.take() else {
        eprintln!("No command given; see --help");
        return ExitCode::FAILURE;
    };
    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    finish(run(&cli, command, &config, config_dir).await)
}

fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref path) = cli.outbox {
        config.notifier = NotifierConfig::outbox(path.clone());
    }
}

fn finish(result: Result<serde_json::Value, AppError>) -> ExitCode {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(e) => {
            let body = match &e {
                AppError::Domain(domain) => {
                    json!({ "status": domain.status_code(), "error": domain.to_string() })
                }
                AppError::Infra(infra) => json!({ "status": "ERROR", "error": infra.to_string() }),
            };
            println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
            ExitCode::FAILURE
        }
    }
}

async fn run(
    cli: &Cli,
    command: Command,
    config: &AppConfig,
    config_dir: &Path,
) -> Result<serde_json::Value, AppError> {
    let db = init_database(&config.database).await.map_err(InfraError::from)?;
    if !cli.no_migrate {
        run_migrations(&db).await.map_err(InfraError::from)?;
    }

    if matches!(command, Command::Register { .. }) && !config.notifier.delivers_password() {
        warn!("Notifier is 'log': the generated password will not reach anyone; pass --outbox");
    }

    let admin = MerchantAdmin::new(
        Arc::new(SeaOrmMerchantStore::new(db)),
        build_notifier(&config.notifier, config_dir),
        config.workflow.to_settings(),
    );
    let ctx = AdminContext::new(cli.actor.clone());

    let value = match command {
        Command::Register {
            name,
            contact_name,
            contact_number,
            contact_email,
            username,
        } => {
            let profile = CompanyProfile {
                cpo_owner_name: name,
                contact_name,
                contact_number,
                contact_email,
                username,
            };
            to_json(&admin.registration.register(&ctx, &profile).await?)?
        }
        Command::Check { field, value } => {
            admin.registration.check_availability(&field, &value).await?;
            json!({ "status": "SUCCESS" })
        }
        Command::List { limit, offset } => {
            to_json(&admin.directory.list(limit, offset).await?)?
        }
        Command::Search { pattern } => to_json(&admin.directory.search(&pattern).await?)?,
        Command::Show { account_id } => to_json(&admin.directory.get(account_id).await?)?,
        Command::Update {
            account_id,
            changes,
        } => {
            let raw: BTreeMap<String, String> = changes.into_iter().collect();
            let outcome = admin.directory.update(&ctx, account_id, &raw).await?;
            json!({ "status": outcome.as_str() })
        }
        Command::AddRfid { account_id, tag } => {
            let status = admin.directory.add_rfid(&ctx, account_id, &tag).await?;
            json!({ "status": status })
        }
        Command::SetStatus { account_id, action } => {
            let outcome = admin.directory.set_status(&ctx, account_id, &action).await?;
            json!({ "status": outcome.as_str() })
        }
        Command::Topup { account_id, amount } => {
            to_json(&admin.ledger.topup(&ctx, account_id, amount).await?)?
        }
        Command::Voidable { account_id } => {
            to_json(&admin.ledger.voidable_topups(account_id).await?)?
        }
        Command::Void { reference_id } => {
            to_json(&admin.ledger.void_topup(&ctx, reference_id).await?)?
        }
        Command::Audit { account_id } => to_json(&admin.audit_trail(account_id).await?)?,
    };

    Ok(value)
}
