use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, info, warn};

use seqsync::cli::Args;
use seqsync::config::{self, PathConfig, SyncPrefs};
use seqsync::core::{ActiveShot, get_sync_settings};
use seqsync::ops;
use seqsync::shell::{self, Shell};

fn describe(shell: &Shell, shot: Option<ActiveShot>) -> String {
    let Some(shot) = shot else {
        return "-".to_string();
    };
    let chain = shell.sync.resolve_chain(&shell.project, true);
    let names: Vec<String> = chain
        .iter()
        .map(|level| {
            let name = shell.project.scene(level.shot.scene).map(|s| s.name()).unwrap_or("?");
            format!("{}@{}", name, level.local_frame)
        })
        .collect();
    if names.is_empty() {
        shot.scene.to_string()
    } else {
        names.join(" > ")
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    let log_path = args
        .log_file
        .as_ref()
        .map(|p| p.clone().unwrap_or_else(|| config::data_file(config::LOG_FILE, &path_config)));
    shell::init_logger(args.verbosity, log_path.as_deref())?;

    info!("seqsync {} starting", env!("CARGO_PKG_VERSION"));
    debug!("Command-line args: {:?}", args);
    info!("Config path: {}", config::config_file(config::PREFS_FILE, &path_config).display());

    let prefs = SyncPrefs::load_or_default(&path_config).unwrap_or_else(|e| {
        warn!("Ignoring unreadable prefs: {}", e);
        SyncPrefs::default()
    });
    let settings = get_sync_settings();

    let mut shell = match (&args.session, args.demo) {
        (Some(path), _) => {
            prefs.apply(&mut seqsync::core::settings::lock(&settings));
            Shell::load_session(path, settings)
                .with_context(|| format!("Failed to load session {}", path.display()))?
        }
        (None, true) => {
            let shell = Shell::demo(settings);
            prefs.apply(&mut shell.sync.settings());
            shell
        }
        (None, false) => bail!("Nothing to do: pass a SESSION file or --demo"),
    };

    for frame in args.frame_list() {
        let shot = shell.frame_set(frame, args.force)?;
        println!("{:>6}  {}", frame, describe(&shell, shot));
    }

    if let Some(object) = &args.usage {
        print!("{}", ops::object_usage_report(&shell.sync, &shell.project, object)?);
    }

    let drained = shell.process_events();
    {
        let settings = shell.sync.settings();
        let stats = settings.cache().stats();
        println!(
            "cache: {} hits, {} misses, {} scans ({:.0}% hit rate), {} events",
            stats.hits(),
            stats.misses(),
            stats.scans(),
            stats.hit_rate() * 100.0,
            drained
        );
    }

    if let Some(path) = &args.save {
        let written = shell.save_session(path).context("Failed to save session")?;
        println!("saved {}", written.display());
    }

    Ok(())
}
