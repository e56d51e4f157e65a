mod config;
mod logging;
mod matching;
mod model;
mod ports;
mod retry;
mod services;
mod session;
mod shutdown;
mod spotify_export;
#[cfg(test)]
mod test_utils;
mod ytmusic;

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::{Result, eyre::WrapErr};

use crate::{
    config::Config,
    logging::setup_logging,
    matching::Strategy,
    model::{Privacy, TrackDescriptor},
    services::{
        copier::{CopyOptions, CopyReport},
        resolver::DestinationRef,
        sync::{SyncService, SyncSettings},
        ytmusic::client::YtMusicHttpAdapter,
    },
    session::SessionLog,
    shutdown::{INTERRUPTED_EXIT_CODE, install_signal_handler},
    spotify_export::{SourcePlaylist, SpotifyExport},
    ytmusic::OAuthCredentials,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "MUSIC_SYNC_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Console log level
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "MUSIC_SYNC_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Spotify export to read (overrides `source_export`)
    #[arg(long, global = true)]
    export: Option<PathBuf>,

    /// YouTube Music OAuth token file (overrides `credentials`)
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that copies tracks.
#[derive(ClapArgs, Debug, Clone, Default)]
struct RunArgs {
    /// Look tracks up but do not add or like anything
    #[arg(long)]
    dry_run: bool,

    /// Matching algorithm: 0 first result, 1 exact then relaxed,
    /// 2 bracket-insensitive with video fallback, 3 normalized metadata
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
    algo: Option<u8>,

    /// Copy playlists in export order instead of oldest addition first
    #[arg(long)]
    no_reverse_playlist: bool,

    /// Privacy of playlists created on YouTube Music
    #[arg(long, value_enum)]
    privacy: Option<Privacy>,

    /// Pause after each track, e.g. "100ms" or "1s"
    #[arg(long)]
    track_sleep: Option<humantime::Duration>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy one Spotify playlist to YouTube Music
    CopyPlaylist {
        /// Spotify playlist id; empty or LIKED for the liked songs
        #[arg(long, default_value = "")]
        source: SourcePlaylist,

        /// YouTube Music playlist id, "+name" to find or create by name,
        /// empty to create one named after the source, or LIKED to like the tracks
        #[arg(long, default_value = "")]
        destination: DestinationRef,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Copy every Spotify playlist except "Liked Songs" to a playlist of the same name
    CopyAllPlaylists {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Like every track of the Spotify "Liked Songs"
    LoadLiked {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Like every track of the albums saved on Spotify
    LoadLikedAlbums {
        #[command(flatten)]
        run: RunArgs,
    },
    /// List the playlists of the Spotify export
    ListPlaylists,
    /// Create a YouTube Music playlist and print its id
    CreatePlaylist {
        name: String,

        #[arg(long, value_enum)]
        privacy: Option<Privacy>,
    },
    /// Look one track up on YouTube Music without changing anything
    Search {
        #[arg(long)]
        title: String,

        #[arg(long)]
        artist: String,

        #[arg(long, default_value = "")]
        album: String,

        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
        algo: Option<u8>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

impl Commands {
    fn run_args(&self) -> RunArgs {
        match self {
            Commands::CopyPlaylist { run, .. }
            | Commands::CopyAllPlaylists { run }
            | Commands::LoadLiked { run }
            | Commands::LoadLikedAlbums { run } => run.clone(),
            Commands::CreatePlaylist { privacy, .. } => RunArgs {
                privacy: *privacy,
                ..RunArgs::default()
            },
            Commands::Search { algo, .. } => RunArgs {
                algo: *algo,
                ..RunArgs::default()
            },
            Commands::ListPlaylists | Commands::Config(_) => RunArgs::default(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

fn sync_settings(config: &Config, run: &RunArgs) -> Result<SyncSettings> {
    let strategy = Strategy::try_from(run.algo.unwrap_or(config.search_strategy))?;
    Ok(SyncSettings {
        copy: CopyOptions {
            strategy,
            dry_run: run.dry_run,
            track_sleep: run
                .track_sleep
                .map(Into::into)
                .unwrap_or_else(|| config.track_sleep()),
            retry: config.retry_policy(),
        },
        reverse_playlist: config.reverse_playlist && !run.no_reverse_playlist,
        privacy: run.privacy.unwrap_or(config.privacy),
        playlist_settle: config.playlist_settle(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Music sync starting");
    let config = {
        if let Some(config) = &args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load music-sync config")?;

    let export_path = args
        .export
        .clone()
        .unwrap_or_else(|| config.source_export_path());
    let credentials_path = args
        .credentials
        .clone()
        .unwrap_or_else(|| config.credentials_path());

    match &args.command {
        Commands::Config(config_commands) => {
            match config_commands {
                ConfigCommands::CreateDefault => {
                    log::debug!("Creating default config");
                    let path = Config::create_default()?;
                    log::info!("Default config at {}", path.display());
                }
                ConfigCommands::Path => match Config::config_path() {
                    Some(path) => println!("{}", path.display()),
                    None => println!("No default config path found"),
                },
            }
            return Ok(());
        }
        Commands::ListPlaylists => {
            let export = SpotifyExport::load(&export_path)?;
            for playlist in &export.playlists {
                println!(
                    "{:<24} {:>5} tracks  {}",
                    playlist.id.as_deref().unwrap_or("-"),
                    playlist.entry_count(),
                    playlist.display_name()
                );
            }
            return Ok(());
        }
        _ => {}
    }

    let settings = sync_settings(&config, &args.command.run_args())?;
    log::debug!("Run settings: {:?}", settings);

    let credentials = OAuthCredentials::load(&credentials_path)?;
    let catalog = YtMusicHttpAdapter::new(credentials)?;
    let session_log = SessionLog::open(&config.session_log_path())?;
    let cancel = install_signal_handler()?;
    let mut service = SyncService::new(catalog, settings, session_log, cancel);

    let reports: Vec<CopyReport> = match args.command {
        Commands::CopyPlaylist {
            source,
            destination,
            ..
        } => {
            let export = SpotifyExport::load(&export_path)?;
            vec![
                service
                    .copy_playlist(&export, &source, &destination)
                    .await?,
            ]
        }
        Commands::CopyAllPlaylists { .. } => {
            let export = SpotifyExport::load(&export_path)?;
            service.copy_all_playlists(&export).await?
        }
        Commands::LoadLiked { .. } => {
            let export = SpotifyExport::load(&export_path)?;
            vec![service.load_liked(&export).await?]
        }
        Commands::LoadLikedAlbums { .. } => {
            let export = SpotifyExport::load(&export_path)?;
            vec![service.load_liked_albums(&export).await?]
        }
        Commands::CreatePlaylist { name, .. } => {
            let id = service.create_playlist(&name).await?;
            println!("Playlist ID: {id}");
            vec![]
        }
        Commands::Search {
            title,
            artist,
            album,
            ..
        } => {
            let report = service
                .search(&TrackDescriptor::new(title, artist, album))
                .await?;
            println!("Query: {}", report.query);
            for suggestion in &report.suggestions {
                println!("  suggestion: {suggestion}");
            }
            let candidate = report.outcome.candidate();
            println!("Match: {} ({})", candidate, candidate.url());
            if report.outcome.needs_review() {
                println!("  not a confident match, check it by hand");
            }
            vec![]
        }
        Commands::Config(_) | Commands::ListPlaylists => vec![],
    };
    drop(service);

    if reports.iter().any(|report| report.interrupted) {
        log::warn!("Interrupted");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
    Ok(())
}
