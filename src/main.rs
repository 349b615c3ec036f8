//! driver-selection - Main entry point
//!
//! Thin command-line front end over the `driver_selection` library.

use anyhow::{Context, Result, bail};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use driver_selection::cli::{Cli, Commands, Toggle};
use driver_selection::{
    DriverSelections, DriverValue, FileStore, Predetermined, SelectionConfig,
    clear_all_settings, forward_signals, notify_watcher, read_notice_flag, watch,
    write_notice_flag,
};

/// Initialize logging to stderr; RUST_LOG overrides the default level
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);
    debug!("CLI arguments parsed");

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<SelectionConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            SelectionConfig::load_from_file(path)
                .with_context(|| format!("Failed to load configuration {:?}", path))?
        }
        None => SelectionConfig::default(),
    };
    if let Some(store) = &cli.store {
        config.store_dir = store.clone();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let store = FileStore::new(&config.store_dir);
    debug!("Using settings store at {:?}", store.root());

    let open = || -> Result<DriverSelections<&FileStore, Vec<DriverValue>>> {
        let selections = DriverSelections::load(&store, config.driver_values.clone())
            .context("Failed to load driver selections")?;
        Ok(selections.with_system_driver(config.system_driver.clone()))
    };

    match cli.command {
        Commands::Init { angle, native } => {
            let mut predetermined = config.predetermined();
            predetermined.add(DriverValue::Angle, angle);
            predetermined.add(DriverValue::Native, native);
            run_init(&store, &config, &predetermined)?;
        }
        Commands::Get { package } => {
            let selections = open()?;
            println!("{}", selections.effective(&package));
        }
        Commands::Set { package, value } => {
            let value: DriverValue = value
                .parse()
                .with_context(|| format!("Invalid driver value {:?}", value))?;
            let mut selections = open()?;
            if let Some(driver) = selections.system_driver() {
                bail!(
                    "Per-app selection is disabled: the system driver is '{}'",
                    driver
                );
            }
            selections.set(&package, value)?;
            println!("✓ {} -> {}", package, selections.get(&package));
        }
        Commands::List => {
            let selections = open()?;
            if let Some(driver) = selections.system_driver() {
                println!("# system driver: {}", driver);
            }
            for entry in selections.entries() {
                println!("{}={}", entry.package, entry.value);
            }
        }
        Commands::Reset => {
            let mut selections = open()?;
            selections.reset().context("Failed to reset driver selections")?;
            println!("✓ All driver overrides removed");
        }
        Commands::Notice { state } => match state {
            Some(state) => {
                write_notice_flag(&store, state == Toggle::On)
                    .context("Failed to update notice flag")?;
                println!("✓ Driver-in-use notice {}", state);
            }
            None => {
                let on = read_notice_flag(&store).context("Failed to read notice flag")?;
                println!("{}", Toggle::from(on));
            }
        },
        Commands::ClearAll => {
            clear_all_settings(&store).context("Failed to clear settings")?;
            println!("✓ Driver selection settings cleared");
        }
        Commands::Watch => {
            info!(pid = std::process::id(), "Starting watcher (SIGHUP to resync)");
            let (resyncs, forwarder) = watch(
                |tx| forward_signals(tx).map_err(anyhow::Error::from),
                open,
                |s| info!(entries = s.table().len(), "Resynced driver selections"),
            )
            .context("Watcher failed")?;
            let _ = forwarder.join();
            info!(resyncs, "Watcher stopped");
        }
        Commands::Notify { pid } => {
            notify_watcher(pid)?;
        }
    }

    Ok(())
}

fn run_init(
    store: &FileStore,
    config: &SelectionConfig,
    predetermined: &Predetermined,
) -> Result<()> {
    let selections = DriverSelections::init(store, config.driver_values.clone(), predetermined)
        .context("Failed to initialize driver selections")?;
    info!(
        entries = selections.table().len(),
        "Driver selections initialized"
    );
    for entry in selections.entries() {
        println!("{}={}", entry.package, entry.value);
    }
    Ok(())
}
