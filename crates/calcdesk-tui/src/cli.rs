//! Command-line interface.
//!
//! Without a subcommand the binary launches the TUI; each subcommand runs a
//! single request against the service and prints the outcome. The stored
//! session is shared with the TUI.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, warn};

use calcdesk_core::api::{ApiClient, ApiError, DEFAULT_HISTORY_LIMIT};
use calcdesk_core::auth::{Session, SessionData};
use calcdesk_core::config::{Config, SERVER_URL_ENV};
use calcdesk_core::models::{
    Calculation, CalculationUpdate, NewCalculation, NewUser, Operation, PasswordChange,
    UserStatistics, UserUpdate,
};
use calcdesk_core::utils::format_timestamp;

#[derive(Parser)]
#[command(name = "calcdesk", version, about = "Terminal client for the calculator service")]
pub struct Cli {
    /// Server URL (falls back to the config file, then http://localhost:8000)
    #[arg(long, env = SERVER_URL_ENV, global = true)]
    pub server: Option<String>,

    /// Print responses as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session
    Login {
        #[arg(long, short)]
        username: Option<String>,
        /// Prompted for when omitted
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Create an account (the password is prompted for)
    Register { username: String, email: String },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Perform a calculation, e.g. `calc 15 + 25`
    Calc {
        #[arg(allow_negative_numbers = true)]
        operand1: f64,
        /// add, subtract, multiply, divide, power, modulo or a symbol
        operation: Operation,
        #[arg(allow_negative_numbers = true)]
        operand2: f64,
    },
    /// List past calculations with statistics
    History {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
    /// Show one calculation
    Show { id: i64 },
    /// Change a stored calculation; the server recomputes the result
    Edit {
        id: i64,
        #[arg(long)]
        operation: Option<Operation>,
        #[arg(long, allow_negative_numbers = true)]
        operand1: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        operand2: Option<f64>,
    },
    /// Delete one calculation
    Delete { id: i64 },
    /// Show calculation statistics
    Stats,
    /// Change username and/or email
    UpdateProfile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change the password (both values are prompted for)
    ChangePassword,
    /// Permanently delete the account and its calculations
    DeleteAccount {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Check that the service is up
    Health,
}

/// State shared by every subcommand
struct CliContext {
    config: Config,
    session: Session,
    api: ApiClient,
    json: bool,
}

impl CliContext {
    fn load(server: Option<&str>, json: bool) -> Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        });

        let mut session = Session::new(config.data_dir()?);
        session.load().context("Failed to read stored session")?;

        let mut api = ApiClient::new(&config.server_url(server))?;
        if let Some(token) = session.token() {
            api.set_token(token);
        }
        debug!(server = api.base_url(), "CLI context ready");

        Ok(Self {
            config,
            session,
            api,
            json,
        })
    }

    fn require_login(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            bail!("Not logged in. Run `calcdesk login` first.");
        }
        Ok(())
    }

    /// Print `value` as JSON when requested, otherwise run `human`
    fn output<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Run one subcommand to completion
pub async fn run(server: Option<&str>, json: bool, command: Commands) -> Result<()> {
    let mut ctx = CliContext::load(server, json)?;

    match command {
        Commands::Login { username, password } => cmd_login(&mut ctx, username, password).await,
        Commands::Register { username, email } => cmd_register(&ctx, username, email).await,
        Commands::Logout => {
            ctx.session.clear()?;
            println!("Logged out successfully");
            Ok(())
        }
        Commands::Whoami => {
            ctx.require_login()?;
            let user = match ctx.api.current_user().await {
                Ok(user) => user,
                Err(err) => {
                    forget_rejected_session(&mut ctx.session, &err)?;
                    return Err(err.into());
                }
            };
            ctx.output(&user, |u| {
                println!("{} <{}>", u.username, u.email);
                println!("Member since {}", format_timestamp(&u.created_at));
            })
        }
        Commands::Calc {
            operand1,
            operation,
            operand2,
        } => {
            ctx.require_login()?;
            let request = NewCalculation::new(operand1, operation, operand2);
            let calc = ctx.api.create_calculation(&request).await?;
            ctx.output(&calc, |c| println!("Result: {}", c.equation()))
        }
        Commands::History { skip, limit } => cmd_history(&ctx, skip, limit).await,
        Commands::Show { id } => {
            ctx.require_login()?;
            let calc = ctx.api.get_calculation(id).await?;
            ctx.output(&calc, print_calculation)
        }
        Commands::Edit {
            id,
            operation,
            operand1,
            operand2,
        } => {
            ctx.require_login()?;
            let update = CalculationUpdate {
                operation,
                operand1,
                operand2,
            };
            if update.is_empty() {
                bail!("Nothing to update: pass --operation, --operand1 or --operand2");
            }
            let calc = ctx.api.update_calculation(id, &update).await?;
            ctx.output(&calc, print_calculation)
        }
        Commands::Delete { id } => {
            ctx.require_login()?;
            let msg = ctx.api.delete_calculation(id).await?;
            ctx.output(&msg, |m| println!("{}", m.message))
        }
        Commands::Stats => {
            ctx.require_login()?;
            let stats = ctx.api.statistics().await?;
            ctx.output(&stats, print_statistics)
        }
        Commands::UpdateProfile { username, email } => {
            ctx.require_login()?;
            let update = UserUpdate { username, email };
            if update.is_empty() {
                bail!("Nothing to update: pass --username or --email");
            }
            let user = ctx.api.update_profile(&update).await?;
            if let Some(ref mut data) = ctx.session.data {
                data.username = Some(user.username.clone());
            }
            if let Err(e) = ctx.session.save() {
                warn!(error = %e, "Failed to save session");
            }
            ctx.output(&user, |u| {
                println!("Profile updated successfully!");
                println!("{} <{}>", u.username, u.email);
            })
        }
        Commands::ChangePassword => {
            ctx.require_login()?;
            let change = PasswordChange {
                current_password: rpassword::prompt_password("Current password: ")?,
                new_password: rpassword::prompt_password("New password: ")?,
            };
            let msg = ctx.api.change_password(&change).await?;
            ctx.output(&msg, |_| println!("Password changed successfully!"))
        }
        Commands::DeleteAccount { yes } => {
            ctx.require_login()?;
            if !yes {
                bail!("This permanently deletes your account. Re-run with --yes to confirm.");
            }
            let msg = ctx.api.delete_account().await?;
            ctx.session.clear()?;
            ctx.config.last_username = None;
            if let Err(e) = ctx.config.save() {
                warn!(error = %e, "Failed to save config");
            }
            ctx.output(&msg, |m| println!("{}", m.message))
        }
        Commands::Health => {
            let health = ctx.api.health().await?;
            ctx.output(&health, |h| println!("{}: {}", ctx.api.base_url(), h.status))
        }
    }
}

async fn cmd_login(
    ctx: &mut CliContext,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt_line("Username", ctx.config.last_username.as_deref())?,
    };
    let password = match password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ")?,
    };

    let token = ctx.api.login(&username, &password).await?;
    ctx.session.update(SessionData::from_login(token, username.clone()));
    ctx.session.save().context("Failed to store session")?;

    ctx.config.last_username = Some(username.clone());
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Login successful! Logged in as {}", username);
    Ok(())
}

async fn cmd_register(ctx: &CliContext, username: String, email: String) -> Result<()> {
    let password = rpassword::prompt_password("Password: ")?;
    let user = NewUser {
        username,
        email,
        password,
    };
    let created = ctx.api.register(&user).await?;
    ctx.output(&created, |u| {
        println!("Registration successful! Please login.");
        println!("Created {} <{}>", u.username, u.email);
    })
}

/// History and statistics are fetched concurrently
async fn cmd_history(ctx: &CliContext, skip: u32, limit: u32) -> Result<()> {
    ctx.require_login()?;

    let (calculations, stats) = futures::future::try_join(
        ctx.api.list_calculations(skip, limit),
        ctx.api.statistics(),
    )
    .await?;

    #[derive(Serialize)]
    struct HistoryOutput<'a> {
        calculations: &'a [Calculation],
        statistics: &'a UserStatistics,
    }

    let output = HistoryOutput {
        calculations: &calculations,
        statistics: &stats,
    };
    ctx.output(&output, |o| {
        if o.calculations.is_empty() {
            println!("No calculations yet");
        }
        for calc in o.calculations {
            println!(
                "{:>6}  {}  {:<15} {}",
                calc.id,
                format_timestamp(&calc.created_at),
                calc.operation.display_name(),
                calc.equation()
            );
        }
        println!();
        print_statistics(o.statistics);
    })
}

/// Drop the stored token once the server has refused it
fn forget_rejected_session(session: &mut Session, err: &ApiError) -> Result<()> {
    if err.is_unauthorized() {
        debug!("Stored token rejected, clearing session");
        session.clear()?;
    }
    Ok(())
}

fn print_calculation(calc: &Calculation) {
    println!("#{} {}", calc.id, calc.equation());
    println!("  {} at {}", calc.operation.display_name(), format_timestamp(&calc.created_at));
}

fn print_statistics(stats: &UserStatistics) {
    println!("Total calculations: {}", stats.total_calculations);
    println!("Average result:     {}", stats.average_display());
    println!("Most used:          {}", stats.most_used_display());
    for (name, count) in stats.breakdown() {
        println!("  {:<16}{}", name, count);
    }
}

/// Read one line from stdin, offering a default
fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    let value = line.trim();
    Ok(match (value.is_empty(), default) {
        (true, Some(d)) => d.to_string(),
        _ => value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["calcdesk"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_calc_with_symbols() {
        let cli = Cli::try_parse_from(["calcdesk", "calc", "-3", "x", "4"]).unwrap();
        match cli.command {
            Some(Commands::Calc {
                operand1,
                operation,
                operand2,
            }) => {
                assert_eq!(operand1, -3.0);
                assert_eq!(operation, Operation::Multiply);
                assert_eq!(operand2, 4.0);
            }
            _ => panic!("expected calc"),
        }

        let cli = Cli::try_parse_from(["calcdesk", "calc", "10", "mod", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Calc {
                operation: Operation::Modulo,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_unknown_operation_fails() {
        assert!(Cli::try_parse_from(["calcdesk", "calc", "1", "sqrt", "2"]).is_err());
    }

    #[test]
    fn test_parse_history_defaults() {
        let cli = Cli::try_parse_from(["calcdesk", "history", "--limit", "5"]).unwrap();
        match cli.command {
            Some(Commands::History { skip, limit }) => {
                assert_eq!(skip, 0);
                assert_eq!(limit, 5);
            }
            _ => panic!("expected history"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["calcdesk", "stats", "--server", "http://calc:9000", "--json"])
                .unwrap();
        assert_eq!(cli.server.as_deref(), Some("http://calc:9000"));
        assert!(cli.json);
    }

    #[test]
    fn test_edit_with_partial_fields() {
        let cli = Cli::try_parse_from(["calcdesk", "edit", "7", "--operand2", "-2"]).unwrap();
        match cli.command {
            Some(Commands::Edit {
                id,
                operation,
                operand1,
                operand2,
            }) => {
                assert_eq!(id, 7);
                assert!(operation.is_none());
                assert!(operand1.is_none());
                assert_eq!(operand2, Some(-2.0));
            }
            _ => panic!("expected edit"),
        }
    }

    // -------------------------------------------------------------------------
    // Stored session
    // -------------------------------------------------------------------------

    fn saved_session(dir: &tempfile::TempDir) -> Session {
        let mut session = Session::new(dir.path().to_path_buf());
        session.update(SessionData::from_login(
            calcdesk_core::models::TokenResponse {
                access_token: "tok".to_string(),
                token_type: "bearer".to_string(),
            },
            "alice",
        ));
        session.save().unwrap();
        session
    }

    #[test]
    fn test_rejected_token_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = saved_session(&dir);

        let err = ApiError::Unauthorized("Could not validate credentials".to_string());
        forget_rejected_session(&mut session, &err).unwrap();

        assert!(!session.is_authenticated());
        assert!(!dir.path().join("session.json").exists());
    }

    #[test]
    fn test_other_errors_keep_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = saved_session(&dir);

        let err = ApiError::NotFound("User not found".to_string());
        forget_rejected_session(&mut session, &err).unwrap();

        assert!(session.is_authenticated());
        assert!(dir.path().join("session.json").exists());
    }
}
