//! Per-tick scan pipeline: fast decode, localisation, rectification and a
//! second decode, plus the cooldown that follows a successful read.

use crate::config::ScannerConfig;
use crate::detector::locate;
use crate::detector::transform::rectify;
use crate::error::{Result, ScanError};
use crate::interfaces::{
    DecodeMode, FOUND_OUTLINE, FastDecoder, FrameSource, LOCATED_OUTLINE, Presenter,
};
use crate::models::{CornerSet, Raster};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// What a single frame produced
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// A payload was decoded
    Found {
        /// Decoded text
        payload: String,
        /// Code corners in frame coordinates, when known
        corners: Option<CornerSet>,
    },
    /// No code could be read; not an error
    NotFound,
    /// The frame could not be processed
    Error(ScanError),
}

impl FrameOutcome {
    /// Was a payload decoded
    pub fn is_found(&self) -> bool {
        matches!(self, FrameOutcome::Found { .. })
    }
}

/// Stage counters for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanTelemetry {
    /// Calls made to the fast decoder
    pub decode_attempts: usize,
    /// Borders traced in the binary mask (0 if the fast path succeeded)
    pub contours_found: usize,
    /// Finder pattern candidates
    pub candidates_found: usize,
    /// Whether a finder triple was accepted
    pub triple_matched: bool,
    /// Size of the rectified raster, if one was produced
    pub rectified_size: Option<(usize, usize)>,
    /// Wall time spent on the frame
    pub elapsed: Duration,
}

/// Outcome of a frame plus what the pipeline learned on the way
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Final outcome
    pub outcome: FrameOutcome,
    /// Located corners, kept even when the second decode failed
    pub located: Option<CornerSet>,
    /// Stage counters
    pub telemetry: ScanTelemetry,
}

/// What a call to [`Scanner::tick`] did
#[derive(Debug, Clone, PartialEq)]
pub enum TickStatus {
    /// Still cooling down after a successful read; no frame was pulled
    Paused,
    /// A frame was pulled and processed
    Processed(FrameOutcome),
    /// The frame source failed; the error was handed to the presenter
    AcquisitionFailed(ScanError),
}

/// Whether the scanner pulls frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseState {
    /// Pulling a frame every tick
    Running,
    /// Source paused until the deadline
    Cooldown {
        /// First instant at which ticks resume
        until: Instant,
    },
}

/// Owns the frame source, the settings and the pause state
pub struct Scanner<S: FrameSource> {
    config: ScannerConfig,
    source: S,
    state: PauseState,
}

impl<S: FrameSource> Scanner<S> {
    /// Create a scanner; fails if `config` does not validate
    pub fn new(source: S, config: ScannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            state: PauseState::Running,
        })
    }

    /// Scanner settings
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Current pause state
    pub fn state(&self) -> PauseState {
        self.state
    }

    /// Borrow the frame source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the frame source
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Swap in a new frame source, pausing and returning the old one
    ///
    /// During a cooldown the new source is paused too, so it is resumed
    /// together with the deadline.
    pub fn replace_source(&mut self, source: S) -> S {
        let mut old = std::mem::replace(&mut self.source, source);
        old.pause();
        if matches!(self.state, PauseState::Cooldown { .. }) {
            self.source.pause();
        }
        old
    }

    /// Suggested delay before the next tick
    pub fn next_tick_delay(&self, now: Instant) -> Duration {
        match self.state {
            PauseState::Running => self.config.frame_interval,
            PauseState::Cooldown { until } => until.saturating_duration_since(now),
        }
    }

    /// Run one tick at `now`
    ///
    /// While cooling down nothing happens. The first tick at or after the
    /// deadline resumes the source and processes a frame in the same call.
    pub fn tick<D, P>(&mut self, now: Instant, decoder: &mut D, presenter: &mut P) -> TickStatus
    where
        D: FastDecoder + ?Sized,
        P: Presenter + ?Sized,
    {
        if let PauseState::Cooldown { until } = self.state {
            if now < until {
                return TickStatus::Paused;
            }
            self.state = PauseState::Running;
            self.source.resume();
            info!("cooldown over, resuming frame source");
        }

        let frame = match self.source.next_frame() {
            Ok(frame) => frame,
            Err(err) => {
                warn!("frame acquisition failed: {err}");
                presenter.show_error_state(&err);
                return TickStatus::AcquisitionFailed(err);
            }
        };

        let report = self.analyze(&frame, decoder);
        present(&report, presenter);

        if report.outcome.is_found() {
            self.source.pause();
            self.state = PauseState::Cooldown {
                until: now + self.config.cooldown,
            };
            info!("code decoded, pausing for {:?}", self.config.cooldown);
        }

        TickStatus::Processed(report.outcome)
    }

    /// Run the pipeline on one frame without touching the pause state
    pub fn process_frame<D>(&self, frame: &Raster, decoder: &mut D) -> FrameOutcome
    where
        D: FastDecoder + ?Sized,
    {
        self.analyze(frame, decoder).outcome
    }

    /// Run the pipeline on one frame and report located corners and counters
    pub fn analyze<D>(&self, frame: &Raster, decoder: &mut D) -> FrameReport
    where
        D: FastDecoder + ?Sized,
    {
        let start = Instant::now();
        let mut telemetry = ScanTelemetry::default();
        let (outcome, located) = self.run_stages(frame, decoder, &mut telemetry);
        telemetry.elapsed = start.elapsed();

        match &outcome {
            FrameOutcome::Found { payload, .. } => info!("decoded payload ({} bytes)", payload.len()),
            FrameOutcome::NotFound => debug!("no code in frame: {telemetry:?}"),
            FrameOutcome::Error(err) => warn!("frame processing failed: {err}"),
        }

        FrameReport {
            outcome,
            located,
            telemetry,
        }
    }

    fn run_stages<D>(
        &self,
        frame: &Raster,
        decoder: &mut D,
        telemetry: &mut ScanTelemetry,
    ) -> (FrameOutcome, Option<CornerSet>)
    where
        D: FastDecoder + ?Sized,
    {
        if let Err(err) = frame.check_dimensions() {
            return (FrameOutcome::Error(err), None);
        }

        // Fast path: the raw frame, normal polarity only
        telemetry.decode_attempts += 1;
        if let Some(result) = decoder.decode(frame, DecodeMode::DontInvert) {
            return (
                FrameOutcome::Found {
                    payload: result.payload,
                    corners: result.corners,
                },
                result.corners,
            );
        }

        let localization = locate(frame, &self.config);
        telemetry.contours_found = localization.contours;
        telemetry.candidates_found = localization.candidates;
        let Some(corners) = localization.corners else {
            return (FrameOutcome::NotFound, None);
        };
        telemetry.triple_matched = true;

        let rectified = match rectify(frame, &corners, self.config.background) {
            Ok(raster) => raster,
            Err(ScanError::DegenerateCorners) => {
                debug!("located corners are degenerate: {corners:?}");
                return (FrameOutcome::NotFound, None);
            }
            Err(err) => return (FrameOutcome::Error(err), Some(corners)),
        };
        telemetry.rectified_size = Some((rectified.width(), rectified.height()));

        telemetry.decode_attempts += 1;
        match decoder.decode(&rectified, DecodeMode::AttemptBoth) {
            Some(result) => (
                FrameOutcome::Found {
                    payload: result.payload,
                    corners: Some(corners),
                },
                Some(corners),
            ),
            None => (FrameOutcome::NotFound, Some(corners)),
        }
    }
}

/// Hand a frame report to the presenter
pub fn present<P: Presenter + ?Sized>(report: &FrameReport, presenter: &mut P) {
    match &report.outcome {
        FrameOutcome::Found { payload, corners } => {
            if let Some(corners) = corners {
                presenter.show_detection_outline(corners, FOUND_OUTLINE);
            }
            presenter.show_result(payload);
        }
        FrameOutcome::NotFound => {
            if let Some(corners) = &report.located {
                presenter.show_detection_outline(corners, LOCATED_OUTLINE);
            }
            presenter.show_idle_state();
        }
        FrameOutcome::Error(err) => presenter.show_error_state(err),
    }
}
