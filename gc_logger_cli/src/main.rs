use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use libgc_logger::config::Config;
use libgc_logger::process::{create_subsets, process_subset};
use libgc_logger::worker_status::{BarColor, WorkerStatus};

fn make_template_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let yaml_str = serde_yaml::to_string(&config)?;
    let mut file = File::create(path)?;
    file.write_all(yaml_str.as_bytes())?;
    Ok(())
}

fn bar_style(color: &BarColor) -> ProgressStyle {
    let color = match color {
        BarColor::CYAN => "cyan",
        BarColor::GREEN => "green",
        BarColor::RED => "red",
    };
    ProgressStyle::with_template(&format!(
        "[worker {{prefix}}] {{bar:40.{color}/blue}} {{percent:>3}}% {{msg}}"
    ))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn path_arg() -> Arg {
    Arg::new("path")
        .short('p')
        .long("path")
        .help("Path to the configuration file")
}

fn main() {
    // Create a cli
    let matches = Command::new("gc_logger_cli")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("new")
                .about("Make a template configuration yaml file")
                .arg(path_arg()),
        )
        .arg(path_arg())
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    if let Err(e) = LogWrapper::new(pb_manager.clone(), logger).try_init() {
        eprintln!("Could not create logging/progress: {e}");
        return;
    }

    // Parse the cli
    let args = match matches.subcommand() {
        Some(("new", sub_matches)) => sub_matches,
        _ => &matches,
    };
    let config_path = match args.get_one::<String>("path") {
        Some(p) => PathBuf::from(p),
        None => {
            log::error!("A configuration path is required");
            return;
        }
    };

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        match make_template_config(&config_path) {
            Ok(()) => log::info!("Done."),
            Err(e) => log::error!("Could not write template config: {e}"),
        }
        return;
    }

    // Load our config
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    if !config.is_n_threads_valid() {
        log::error!("Number of workers must be at least 1, found {}", config.n_threads);
        return;
    }
    log::info!("Config successfully loaded.");
    log::info!("Data files: {}", config.data_files.len());
    log::info!("Output Path: {}", config.output_path.to_string_lossy());
    log::info!("Channels: {}", config.gc.data_layout.len());
    log::info!("Calibrated: {}", config.has_calibration());

    // Spawn the workers, one progress bar each
    let (tx, rx) = mpsc::channel::<WorkerStatus>();
    let mut workers = vec![];
    let mut bars = vec![];
    for (idx, subset) in create_subsets(&config).into_iter().enumerate() {
        // Dont make empty workers
        if subset.is_empty() {
            continue;
        }
        let pb = pb_manager.add(ProgressBar::new(100));
        pb.set_style(bar_style(&BarColor::CYAN));
        pb.set_prefix(idx.to_string());
        bars.push((idx, pb));
        let conf = config.clone();
        let worker_tx = tx.clone();
        workers.push(std::thread::spawn(move || {
            process_subset(conf, worker_tx, idx, subset)
        }));
    }
    drop(tx);

    // Every sender is dropped once all workers have returned
    for status in rx.iter() {
        if let Some((_, pb)) = bars.iter().find(|(id, _)| *id == status.worker_id) {
            pb.set_style(bar_style(&status.color));
            pb.set_position((status.progress * 100.0) as u64);
            pb.set_message(status.file_name.clone());
        }
    }

    let mut n_failed = 0;
    for worker in workers {
        match worker.join() {
            Ok(Ok(failed)) => n_failed += failed,
            Ok(Err(e)) => log::error!("Processing failed with error: {e}"),
            Err(_) => log::error!("Failed to join processing task!"),
        }
    }
    for (_, pb) in bars.iter() {
        pb.finish();
    }

    if n_failed > 0 {
        log::warn!("{n_failed} file(s) could not be processed, see the log above.");
    } else {
        log::info!("Successfully processed all data!");
    }
    log::info!("Done.");
}
