//! Pipeline runtime: frame processing, voice commands and the status line.
//!
//! The landmark feeder and the utterance loop are tokio tasks. Frame
//! processing runs on its own OS thread so classification never waits on
//! I/O. All loops watch one [`StopSignal`]; Esc on the status line raises it.

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossterm::{
    cursor::MoveToColumn,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use gesture_mouse_config::{AppConfig, VoiceSettings};
use gesture_mouse_core::{
    Actuator, Frame, FrameOutcome, GestureEngine, VoiceCommand, VoiceController, VoiceOutcome,
};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::actuation::ActuationQueue;
use crate::sources::{LandmarkSource, UtteranceSource};

/// Shared cooperative shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        if !self.raised.swap(true, Ordering::SeqCst) {
            debug!("Stop signal raised");
        }
        self.notify.notify_waiters();
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Resolves once the signal has been raised.
    pub async fn raised(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_raised() {
                return;
            }
            notified.await;
        }
    }
}

/// Latest processed frame, handed to the status line.
#[derive(Debug, Clone, Copy)]
pub struct DisplayUpdate {
    pub frame: u64,
    pub hands: usize,
    pub outcome: FrameOutcome,
}

impl DisplayUpdate {
    pub fn status_line(&self) -> String {
        let gesture = match self.outcome.dispatched {
            Some((role, gesture)) => format!("{:?} {}", role, gesture),
            None => "-".to_string(),
        };
        let label = self
            .outcome
            .label
            .map(|l| l.to_string())
            .unwrap_or_default();
        format!(
            "frame {:>6} | hands {} | {:<22} | {}",
            self.frame, self.hands, gesture, label
        )
    }
}

/// Counters reported when the pipeline stops, plus the backend it drove.
#[derive(Debug)]
pub struct RunReport<A> {
    pub frames: u64,
    pub dispatched: u64,
    pub utterances: u64,
    pub backend: A,
}

#[derive(Debug, Default, Clone, Copy)]
struct FrameStats {
    frames: u64,
    dispatched: u64,
}

/// Wires sources, engine and backend together.
pub struct Pipeline {
    config: AppConfig,
    stop: StopSignal,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            stop: StopSignal::new(),
        }
    }

    /// Handle for raising the stop signal from outside.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Run until the landmark stream ends or the stop signal is raised.
    pub async fn run<A>(
        self,
        frames: Box<dyn LandmarkSource>,
        utterances: Option<Box<dyn UtteranceSource>>,
        backend: A,
    ) -> Result<RunReport<A>>
    where
        A: Actuator + Send + 'static,
    {
        let Self { config, stop } = self;
        let (queue, worker) = ActuationQueue::spawn(backend)?;

        let (frame_tx, frame_rx) = mpsc::channel(config.runtime.frame_buffer.max(1));
        let feeder = tokio::spawn(feed_frames(frames, frame_tx, stop.clone()));

        let (display_tx, display) = if config.runtime.display {
            let (tx, rx) = mpsc::channel(1);
            let poll = config.runtime.poll_interval();
            (Some(tx), Some(tokio::spawn(show_status(rx, stop.clone(), poll))))
        } else {
            (None, None)
        };

        let voice = match utterances {
            Some(source) if config.voice.enabled => Some(tokio::spawn(handle_utterances(
                source,
                queue.clone(),
                config.voice.clone(),
                stop.clone(),
            ))),
            Some(_) => {
                info!("Voice commands disabled by configuration");
                None
            }
            None => None,
        };

        let processing = {
            let queue = queue.clone();
            let stop = stop.clone();
            let config = config.clone();
            let runtime = Handle::current();
            thread::Builder::new()
                .name("gesture-processing".to_string())
                .spawn(move || process_frames(&config, runtime, frame_rx, queue, display_tx, stop))
                .context("Failed to start frame processing thread")?
        };
        drop(queue);

        let stats = tokio::task::spawn_blocking(move || processing.join())
            .await?
            .map_err(|_| anyhow!("Frame processing thread panicked"))?;
        stop.raise();

        feeder.await??;
        let utterances = match voice {
            Some(task) => task.await??,
            None => 0,
        };
        if let Some(task) = display {
            task.await?;
        }

        let backend = tokio::task::spawn_blocking(move || worker.join())
            .await?
            .map_err(|_| anyhow!("Actuation worker panicked"))?;

        info!(
            "Processed {} frames ({} dispatched), {} utterances",
            stats.frames, stats.dispatched, utterances
        );
        Ok(RunReport {
            frames: stats.frames,
            dispatched: stats.dispatched,
            utterances,
            backend,
        })
    }
}

/// Pull frames from the source into the bounded processing channel.
async fn feed_frames(
    mut source: Box<dyn LandmarkSource>,
    tx: mpsc::Sender<Frame>,
    stop: StopSignal,
) -> Result<()> {
    loop {
        let next = tokio::select! {
            _ = stop.raised() => break,
            next = source.next_frame() => next,
        };
        match next {
            Ok(Some(frame)) => {
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
            Ok(None) => {
                info!("Landmark stream ended");
                break;
            }
            Err(e) => {
                warn!("Landmark source failed: {:#}", e);
                break;
            }
        }
    }
    Ok(())
}

/// Frame loop. Runs until the feeder closes the channel or stop is raised,
/// then raises stop itself so the other loops wind down. While no frame
/// arrives the signal is re-checked every `runtime.poll_interval_ms`.
fn process_frames(
    config: &AppConfig,
    runtime: Handle,
    mut rx: mpsc::Receiver<Frame>,
    mut actuator: ActuationQueue,
    display: Option<mpsc::Sender<DisplayUpdate>>,
    stop: StopSignal,
) -> FrameStats {
    let mut engine = GestureEngine::new(config);
    let mut stats = FrameStats::default();
    let poll = config.runtime.poll_interval();

    loop {
        let frame = match runtime.block_on(async { tokio::time::timeout(poll, rx.recv()).await }) {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(_) if stop.is_raised() => break,
            Err(_) => continue,
        };
        if stop.is_raised() {
            break;
        }
        let outcome = engine.process_frame(&frame, &mut actuator);
        stats.frames += 1;
        if outcome.dispatched.is_some() {
            stats.dispatched += 1;
        }
        if let Some(display) = &display {
            // a full slot means the status line is behind; drop this frame
            let _ = display.try_send(DisplayUpdate {
                frame: stats.frames,
                hands: frame.hands.len(),
                outcome,
            });
        }
    }

    stop.raise();
    stats
}

/// Execute recognized voice commands until the stream ends or stop is raised.
pub async fn handle_utterances(
    mut source: Box<dyn UtteranceSource>,
    actuator: ActuationQueue,
    settings: VoiceSettings,
    stop: StopSignal,
) -> Result<u64> {
    let mut controller = VoiceController::new(settings);
    let mut handled = 0;
    loop {
        let next = tokio::select! {
            _ = stop.raised() => break,
            next = source.next_utterance() => next,
        };
        let text = match next {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("Utterance stream ended");
                break;
            }
            Err(e) => {
                warn!("Utterance source failed: {:#}", e);
                break;
            }
        };

        let command = VoiceCommand::new(text).with_parsed_intent();
        let mut queue = actuator.clone();
        // file lookups and query replies block, so the controller visits a blocking thread
        let (returned, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = controller.handle(&command, &mut queue);
            (controller, outcome)
        })
        .await?;
        controller = returned;
        handled += 1;
        if outcome == VoiceOutcome::Stop {
            info!("Stop requested by voice command");
            stop.raise();
            break;
        }
    }
    Ok(handled)
}

/// Esc, or Ctrl+C while the terminal is in raw mode.
fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Keyboard watch for the status line. Holds the terminal in raw mode so
/// single key presses arrive without Enter, and restores it on drop.
struct KeyWatch;

impl KeyWatch {
    fn start() -> Option<Self> {
        if !io::stdout().is_terminal() {
            return None;
        }
        match terminal::enable_raw_mode() {
            Ok(()) => Some(Self),
            Err(e) => {
                warn!("Keyboard shortcuts unavailable: {}", e);
                None
            }
        }
    }

    /// Drain pending terminal events and report whether a quit key was among them.
    fn quit_requested(&mut self) -> bool {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if is_quit_key(&key) => return true,
                    Ok(_) => {}
                    Err(e) => {
                        debug!("Reading terminal event failed: {}", e);
                        return false;
                    }
                },
                Ok(false) => return false,
                Err(e) => {
                    debug!("Polling terminal events failed: {}", e);
                    return false;
                }
            }
        }
    }
}

impl Drop for KeyWatch {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Redraw a one-line status on stdout for every update received. Every
/// `poll` the keyboard is checked and Esc raises the stop signal.
async fn show_status(mut rx: mpsc::Receiver<DisplayUpdate>, stop: StopSignal, poll: Duration) {
    let mut stdout = io::stdout();
    let mut keys = KeyWatch::start();
    let mut ticker = tokio::time::interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        let update = tokio::select! {
            _ = stop.raised() => break,
            _ = ticker.tick() => {
                if keys.as_mut().is_some_and(KeyWatch::quit_requested) {
                    info!("Quit key pressed, shutting down");
                    stop.raise();
                    break;
                }
                continue;
            }
            update = rx.recv() => update,
        };
        let Some(update) = update else {
            break;
        };
        let drawn = queue!(
            stdout,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(update.status_line())
        )
        .and_then(|_| stdout.flush());
        if let Err(e) = drawn {
            warn!("Status line disabled: {}", e);
            return;
        }
    }
    drop(keys);
    let _ = writeln!(stdout);
}
