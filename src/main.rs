// src/main.rs

mod app_logic;
mod core;

use crate::app_logic::{ActionOutcome, ContextYapLogic, UserAction};
use crate::core::config::{self, CONFIG_FILENAME};
use crate::core::{
    ConfigManagerOperations, CoreClipboard, CoreConfigManager, CoreDesktop, CoreStateManager,
    ItemStore, YapConfig, path_utils,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const APP_NAME: &str = "ContextYap";

#[derive(Parser)]
#[command(
    name = "context-yap",
    about = "Collect snippets, files and folders and copy the checked ones as fenced context",
    version
)]
struct Cli {
    /// State file to use instead of the per-user default.
    #[arg(long, global = true, value_name = "PATH")]
    state: Option<PathBuf>,

    /// Configuration file to use instead of the per-user default.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all items with their checked state.
    List,
    /// Add dropped files or folders (cold copies unless --link).
    Add(AddArgs),
    /// Add every text file below a folder as one item.
    Flatten { dir: PathBuf },
    /// Store the current clipboard text as a new item.
    Capture,
    /// Include an item in the next copy.
    Check(KeyArgs),
    /// Exclude an item from the next copy.
    Uncheck(KeyArgs),
    /// Rename an item.
    Rename {
        old_name: String,
        new_name: String,
        #[arg(long)]
        link: bool,
    },
    /// Remove one or more items.
    Remove {
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(long)]
        link: bool,
    },
    /// Uncheck every item.
    Clear,
    /// Copy the checked items to the clipboard.
    Copy {
        /// Print the text instead of writing it to the clipboard.
        #[arg(long)]
        stdout: bool,
    },
    /// Open the folder of a live item in the file manager.
    Goto(KeyArgs),
    /// Update window geometry and opacity.
    Window(WindowArgs),
    /// Show the effective configuration.
    Config {
        /// Write the default configuration to the config file.
        #[arg(long)]
        write_defaults: bool,
    },
}

#[derive(Args)]
struct AddArgs {
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Keep a live link that is re-read at copy time.
    #[arg(long)]
    link: bool,
}

#[derive(Args)]
struct KeyArgs {
    name: String,
    /// Address the live item with this name.
    #[arg(long)]
    link: bool,
}

#[derive(Args)]
struct WindowArgs {
    #[arg(long)]
    opacity: Option<f64>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Collapse for this run only; the collapsed flag is never saved, the
    /// expanded height is.
    #[arg(long, conflicts_with = "expand")]
    collapse: bool,
    /// Expand for this run only. A new run always starts expanded.
    #[arg(long)]
    expand: bool,
}

fn init_logging(verbosity: u8) {
    let term_level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(log_path) = path_utils::default_log_path(APP_NAME) {
        match File::create(&log_path) {
            Ok(file) => {
                loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file));
            }
            Err(e) => eprintln!("Failed to create log file {log_path:?}: {e}"),
        }
    }
    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialize logger: {e}");
    }
}

fn config_manager(cli: &Cli) -> Option<CoreConfigManager> {
    if let Some(path) = &cli.config {
        return Some(CoreConfigManager::new(path.clone()));
    }
    match CoreConfigManager::for_app(APP_NAME) {
        Ok(manager) => Some(manager),
        Err(e) => {
            log::warn!("Main: {e}; using default configuration.");
            None
        }
    }
}

fn state_path(cli: &Cli) -> PathBuf {
    if let Some(path) = &cli.state {
        return path.clone();
    }
    path_utils::default_state_path(APP_NAME).unwrap_or_else(|| {
        log::warn!("Main: No per-user config directory, keeping state in the working directory.");
        PathBuf::from(path_utils::STATE_FILENAME)
    })
}

fn print_items(store: &ItemStore) {
    if store.items().is_empty() {
        println!("(no items)");
        return;
    }
    for item in store.items() {
        let mark = if item.checked { "x" } else { " " };
        let kind = match (item.is_link(), item.is_dir()) {
            (true, true) => "live dir ",
            (true, false) => "live file",
            (false, true) => "cold dir ",
            (false, false) => "cold     ",
        };
        match item.link_path() {
            Some(path) => println!("[{mark}] {kind}  {}  -> {}", item.name, path.display()),
            None => println!("[{mark}] {kind}  {}", item.name),
        }
    }
}

// Prints the outcome; false when the action failed.
fn report(outcome: &ActionOutcome) -> bool {
    match outcome {
        ActionOutcome::ItemsAdded(items) => {
            for item in items {
                println!("added: {}", item.name);
            }
        }
        ActionOutcome::Updated => {}
        ActionOutcome::Copied { item_count, bytes } => {
            println!("copied {item_count} items ({bytes} bytes)");
        }
        ActionOutcome::NothingToCopy => println!("nothing checked, clipboard unchanged"),
        ActionOutcome::Opened(path) => println!("opened {}", path.display()),
        ActionOutcome::Failed(message) => {
            eprintln!("error: {message}");
            return false;
        }
        ActionOutcome::Ignored => println!("nothing changed"),
    }
    true
}

// Runs every action even after a failure; any failure fails the whole run.
fn apply_all(logic: &mut ContextYapLogic, actions: Vec<UserAction>) -> bool {
    let mut succeeded = true;
    for action in actions {
        succeeded &= report(&logic.handle(action));
    }
    succeeded
}

fn exit_code(succeeded: bool) -> ExitCode {
    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn window_actions(store: &ItemStore, args: &WindowArgs) -> Vec<UserAction> {
    let mut actions = Vec::new();
    if let Some(opacity) = args.opacity {
        actions.push(UserAction::SetOpacity(opacity));
    }
    if args.width.is_some() || args.height.is_some() {
        let window = store.window();
        actions.push(UserAction::Resize {
            width: args.width.unwrap_or(window.width),
            height: args.height.unwrap_or(window.height),
        });
    }
    if args.collapse {
        actions.push(UserAction::SetCollapsed(true));
    } else if args.expand {
        actions.push(UserAction::SetCollapsed(false));
    }
    actions
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    log::info!("Main: Starting {APP_NAME}.");

    let config_manager = config_manager(&cli);
    let settings = config_manager
        .as_ref()
        .map(|manager| config::load_or_default(manager))
        .unwrap_or_default();

    if let Commands::Config { write_defaults } = &cli.command {
        if *write_defaults {
            let Some(manager) = &config_manager else {
                eprintln!("error: no location for {CONFIG_FILENAME}, pass --config");
                return ExitCode::FAILURE;
            };
            if let Err(e) = manager.save_config(&YapConfig::default()) {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
            println!("wrote {}", manager.config_path().display());
        }
        match serde_json::to_string_pretty(&settings) {
            Ok(text) => println!("{text}"),
            Err(e) => log::error!("Main: Failed to render configuration: {e}"),
        }
        return ExitCode::SUCCESS;
    }

    let state_manager = Arc::new(CoreStateManager::new(state_path(&cli)));
    let store = ItemStore::open(state_manager, settings);
    let mut logic = ContextYapLogic::new(
        store,
        Arc::new(CoreClipboard::new()),
        Arc::new(CoreDesktop::new()),
    );

    let action = match cli.command {
        Commands::List => {
            print_items(logic.store());
            return ExitCode::SUCCESS;
        }
        Commands::Copy { stdout: true } => {
            print!("{}", logic.store().export_text());
            return ExitCode::SUCCESS;
        }
        Commands::Window(args) => {
            let actions = window_actions(logic.store(), &args);
            let succeeded = apply_all(&mut logic, actions);
            let window = logic.store().window();
            println!(
                "opacity {:.2}, {}x{}{}",
                window.opacity,
                window.width,
                window.height,
                if window.is_collapsed { " (collapsed)" } else { "" }
            );
            return exit_code(succeeded);
        }
        Commands::Config { .. } => return ExitCode::SUCCESS,
        Commands::Add(args) => UserAction::DropPaths {
            paths: args.paths,
            as_link: args.link,
        },
        Commands::Flatten { dir } => UserAction::FlattenFolder(dir),
        Commands::Capture => UserAction::CaptureClipboard,
        Commands::Check(key) => UserAction::SetChecked {
            name: key.name,
            is_link: key.link,
            checked: true,
        },
        Commands::Uncheck(key) => UserAction::SetChecked {
            name: key.name,
            is_link: key.link,
            checked: false,
        },
        Commands::Rename {
            old_name,
            new_name,
            link,
        } => UserAction::Rename {
            old_name,
            is_link: link,
            new_name,
        },
        Commands::Remove { names, link } => UserAction::Remove {
            keys: names.into_iter().map(|name| (name, link)).collect(),
        },
        Commands::Clear => UserAction::ClearChecked,
        Commands::Copy { stdout: false } => UserAction::CopyContext,
        Commands::Goto(key) => UserAction::GoToDirectory {
            name: key.name,
            is_link: key.link,
        },
    };

    exit_code(report(&logic.handle(action)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clipboard::{self, ClipboardError};
    use crate::core::ClipboardOperations;
    use clap::CommandFactory;
    use tempfile::tempdir;

    struct NoClipboard;

    impl ClipboardOperations for NoClipboard {
        fn get_text(&self) -> clipboard::Result<String> {
            Err(ClipboardError::Unavailable("no display".to_string()))
        }

        fn set_text(&self, _text: &str) -> clipboard::Result<()> {
            Err(ClipboardError::Unavailable("no display".to_string()))
        }
    }

    fn logic_in(dir: &std::path::Path) -> ContextYapLogic {
        let store = ItemStore::open(
            Arc::new(CoreStateManager::new(dir.join("state.json"))),
            YapConfig::default(),
        );
        ContextYapLogic::new(store, Arc::new(NoClipboard), Arc::new(CoreDesktop::new()))
    }

    #[test]
    fn test_apply_all_keeps_earlier_failure() {
        let dir = tempdir().unwrap();
        let mut logic = logic_in(dir.path());

        let succeeded = apply_all(
            &mut logic,
            vec![UserAction::CaptureClipboard, UserAction::SetOpacity(0.5)],
        );

        assert!(!succeeded);
        assert_eq!(logic.store().window().opacity, 0.5, "later actions still run");
    }

    #[test]
    fn test_apply_all_succeeds_when_every_action_does() {
        let dir = tempdir().unwrap();
        let mut logic = logic_in(dir.path());
        assert!(apply_all(
            &mut logic,
            vec![
                UserAction::SetOpacity(0.4),
                UserAction::Resize {
                    width: 300,
                    height: 500
                }
            ],
        ));
    }

    #[test]
    fn test_window_collapse_help_states_it_is_not_saved() {
        Cli::command().debug_assert();
        let command = Cli::command();
        let window = command.find_subcommand("window").unwrap();
        let collapse = window
            .get_arguments()
            .find(|arg| arg.get_id() == "collapse")
            .unwrap();
        let help = collapse.get_help().unwrap().to_string();
        assert!(help.contains("never saved"), "help was: {help}");
        assert!(
            Cli::try_parse_from(["context-yap", "window", "--collapse", "--expand"]).is_err()
        );
    }
}
