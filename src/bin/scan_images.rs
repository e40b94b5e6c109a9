use clap::{Parser, Subcommand};
use image::Rgba;
use log::{error, info};
use qr_rectify::tools::{ImageSequenceSource, collect_images, load_raster};
use qr_rectify::{
    CornerSet, FrameSource, RqrrDecoder, ScanError, Scanner, ScannerConfig, TickStatus, locate,
    rectify,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "scan_images", version, about = "Locate and rectify QR codes in image files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Feed images through the scanner as if they were camera frames
    Scan {
        /// Image file or directory
        #[arg(long)]
        input: PathBuf,
        /// Sleep between ticks as a live scanner would
        #[arg(long)]
        realtime: bool,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print located corners and optionally save rectified crops
    Locate {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Presenter that logs instead of drawing
struct LogPresenter;

impl qr_rectify::Presenter for LogPresenter {
    fn show_detection_outline(&mut self, corners: &CornerSet, color: Rgba<u8>) {
        info!("outline {:?} at {:?}", color.0, corners.as_array());
    }

    fn show_result(&mut self, payload: &str) {
        println!("{payload}");
    }

    fn show_idle_state(&mut self) {
        info!("idle");
    }

    fn show_error_state(&mut self, error: &ScanError) {
        error!("{error}");
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = ScannerConfig::from_env();
    if let Err(err) = config.validate() {
        eprintln!("{err}");
        std::process::exit(2);
    }

    match cli.command {
        Command::Scan {
            input,
            realtime,
            limit,
        } => scan_cmd(&input, realtime, limit, config),
        Command::Locate { image, out } => locate_cmd(&image, out.as_deref(), &config),
    }
}

fn scan_cmd(input: &Path, realtime: bool, limit: Option<usize>, config: ScannerConfig) {
    let paths = if input.is_dir() {
        collect_images(input, limit)
    } else {
        vec![input.to_path_buf()]
    };
    println!("Scanning {} image(s)", paths.len());

    let source = ImageSequenceSource::new(paths);
    let mut scanner = Scanner::new(source, config).expect("config validated above");
    let mut decoder = RqrrDecoder::new();
    let mut presenter = LogPresenter;

    let mut found = 0usize;
    let mut frames = 0usize;
    let started = Instant::now();
    // With --realtime the clock is real; otherwise jump straight past any cooldown
    let mut virtual_now = Instant::now();

    while !scanner.source().is_exhausted() {
        let now = if realtime { Instant::now() } else { virtual_now };
        match scanner.tick(now, &mut decoder, &mut presenter) {
            TickStatus::Processed(outcome) => {
                frames += 1;
                if outcome.is_found() {
                    found += 1;
                }
            }
            TickStatus::AcquisitionFailed(_) => frames += 1,
            TickStatus::Paused => {}
        }

        let delay = scanner.next_tick_delay(now);
        if realtime {
            std::thread::sleep(delay);
        } else {
            virtual_now = now + delay;
        }
    }

    // Leave the source paused on exit
    scanner.source_mut().pause();
    println!(
        "Decoded {found}/{frames} frame(s) in {:.2?}",
        started.elapsed()
    );
}

fn locate_cmd(image: &Path, out: Option<&Path>, config: &ScannerConfig) {
    let raster = match load_raster(image) {
        Ok(raster) => raster,
        Err(err) => {
            eprintln!("{}: {err}", image.display());
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    let found = locate(&raster, config);
    println!(
        "Image: {} ({}x{}) contours={} candidates={} in {:.2?}",
        image.display(),
        raster.width(),
        raster.height(),
        found.contours,
        found.candidates,
        start.elapsed()
    );

    let Some(corners) = found.corners else {
        println!("No finder triple");
        return;
    };
    println!("  tl={:?}", corners.top_left);
    println!("  tr={:?}", corners.top_right);
    println!("  br={:?}", corners.bottom_right);
    println!("  bl={:?}", corners.bottom_left);

    if let Some(out) = out {
        match rectify(&raster, &corners, config.background) {
            Ok(rectified) => match rectified.to_rgba_image().save(out) {
                Ok(()) => println!("Rectified crop written to {}", out.display()),
                Err(err) => eprintln!("{}: {err}", out.display()),
            },
            Err(err) => eprintln!("rectification failed: {err}"),
        }
    }
}
