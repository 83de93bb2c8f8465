//! AgriPulse CLI - A farm-management dashboard for the terminal.

use agripulse::cli::{
    Cli, Commands, ConfigCommands, FieldCommands, MarketCommands, TaskCommands,
};
use agripulse::commands::{self, Output};
use agripulse::config::{self, AgriConfig, ConfigOverrides, ResolvedConfig, resolve_config};
use agripulse::controller::PageController;
use agripulse::state::Store;
use agripulse::storage::{Storage, get_storage_dir};
use clap::Parser;
use std::future::Future;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. "debug", "agripulse=info").
const LOG_ENV: &str = "AGRIPULSE_LOG";

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let overrides = commands::overrides_from_flags(cli.human_readable, cli.latency_ms);

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => match get_storage_dir() {
            Ok(dir) => dir,
            Err(e) => fail(&e, cli.human_readable),
        },
    };

    let file_config = match config::load_config(&data_dir) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring config file: {}", e);
            AgriConfig::new()
        }
    };
    let resolved = resolve_config(&file_config, &overrides);
    let human = resolved.human();

    if let Err(e) = run_command(cli.command, &data_dir, &resolved, &overrides, human) {
        fail(&e, human);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(error: &agripulse::Error, human: bool) -> ! {
    if human {
        eprintln!("Error: {}", error);
    } else {
        eprintln!("{}", serde_json::json!({ "error": error.to_string() }));
    }
    process::exit(1);
}

/// Open the store under `data_dir` and put a controller on top of it.
fn open_controller(data_dir: &Path, resolved: &ResolvedConfig) -> agripulse::Result<PageController> {
    let storage = Storage::open_with_data_dir(data_dir)?;
    tracing::debug!("Using {} storage at {}", storage.backend_type(), storage.location());
    let store = Store::open_with_theme(storage, resolved.default_theme());
    Ok(PageController::new(store, resolved.latency()))
}

/// Drive a simulated flow to completion on a single-threaded runtime.
fn block_on<F: Future>(future: F) -> agripulse::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    Ok(runtime.block_on(future))
}

fn run_command(
    command: Option<Commands>,
    data_dir: &Path,
    resolved: &ResolvedConfig,
    overrides: &ConfigOverrides,
    human: bool,
) -> Result<(), agripulse::Error> {
    let mut ctl = open_controller(data_dir, resolved)?;

    match command {
        None => {
            output(&ctl.screen(), human);
        }

        Some(Commands::Login {
            email,
            password,
            name,
        }) => {
            let result = block_on(commands::login(&mut ctl, &name, &email, &password))??;
            output(&result, human);
        }

        Some(Commands::Logout) => {
            let result = commands::logout(&mut ctl)?;
            output(&result, human);
        }

        Some(Commands::Whoami) => {
            output(&commands::whoami(&ctl), human);
        }

        Some(Commands::Open { page, layer }) => {
            let result = commands::open(&mut ctl, page, layer)?;
            output(&result, human);
        }

        Some(Commands::Field { command }) => match command {
            FieldCommands::List => {
                output(&commands::field_list(&ctl), human);
            }
            FieldCommands::Switch { id } => {
                let result = commands::field_switch(&mut ctl, &id)?;
                output(&result, human);
            }
        },

        Some(Commands::Task { command }) => match command {
            TaskCommands::List => {
                let result = commands::task_list(&mut ctl)?;
                output(&result, human);
            }
            TaskCommands::Add {
                title,
                date,
                priority,
            } => {
                let result = commands::task_add(&mut ctl, &title, &date, priority)?;
                output(&result, human);
            }
            TaskCommands::Toggle { id } => {
                let result = commands::task_toggle(&mut ctl, id)?;
                output(&result, human);
            }
            TaskCommands::Delete { id } => {
                let result = commands::task_delete(&mut ctl, id)?;
                output(&result, human);
            }
        },

        Some(Commands::Inventory { all }) => {
            let result = commands::inventory(&mut ctl, all)?;
            output(&result, human);
        }

        Some(Commands::Market { command }) => match command {
            MarketCommands::List { category, search } => {
                let result = block_on(commands::market_list(
                    &mut ctl,
                    category.as_deref(),
                    search.as_deref(),
                ))??;
                output(&result, human);
            }
            MarketCommands::Post {
                title,
                price,
                category,
                description,
            } => {
                let result =
                    commands::market_post(&mut ctl, &title, price, &category, &description)?;
                output(&result, human);
            }
            MarketCommands::Contact { id } => {
                let result = commands::market_contact(&mut ctl, &id)?;
                output(&result, human);
            }
        },

        Some(Commands::Plan {
            rainfall,
            fertilizer,
            pest,
        }) => {
            let result = commands::plan(&mut ctl, rainfall, fertilizer, pest)?;
            output(&result, human);
        }

        Some(Commands::Diagnose {
            image,
            share_email,
            share_whatsapp,
        }) => {
            let result = block_on(commands::diagnose(
                &mut ctl,
                &image,
                share_email.as_deref(),
                share_whatsapp.as_deref(),
            ))??;
            output(&result, human);
        }

        Some(Commands::Chat { message }) => {
            let result = block_on(commands::chat(&mut ctl, &message.join(" ")))??;
            output(&result, human);
        }

        Some(Commands::Theme { theme }) => {
            let result = match theme {
                Some(name) => commands::theme_set(&mut ctl, &name)?,
                None => commands::theme_show(&ctl),
            };
            output(&result, human);
        }

        Some(Commands::Reset { force }) => {
            let (result, _) = commands::reset(ctl, force)?;
            output(&result, human);
        }

        #[cfg(feature = "tui")]
        Some(Commands::Tui) => {
            agripulse::tui::run_tui(ctl)?;
        }

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Get { key } => {
                let result = commands::config_get(data_dir, overrides, &key)?;
                output(&result, human);
            }
            ConfigCommands::Set { key, value } => {
                let result = commands::config_set(data_dir, &key, &value)?;
                output(&result, human);
            }
            ConfigCommands::Unset { key } => {
                let result = commands::config_unset(data_dir, &key)?;
                output(&result, human);
            }
            ConfigCommands::List => {
                let result = commands::config_list(data_dir, overrides)?;
                output(&result, human);
            }
        },
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
