//! Landmark and utterance sources.
//!
//! The detector and the speech recognizer live outside this program. Their
//! output arrives as text lines: one JSON frame per line for landmarks, one
//! transcript per line for speech.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use gesture_mouse_core::Frame;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, warn};

/// Produces landmark frames. `Ok(None)` marks the end of the stream.
#[async_trait]
pub trait LandmarkSource: Send {
    async fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Produces recognized speech transcripts. `Ok(None)` marks the end of the stream.
#[async_trait]
pub trait UtteranceSource: Send {
    async fn next_utterance(&mut self) -> Result<Option<String>>;
}

/// Replays JSON-lines frames, optionally paced at a fixed frame rate.
pub struct ReplaySource<R> {
    lines: Lines<R>,
    period: Option<Duration>,
    ticker: Option<Interval>,
    line_no: usize,
}

impl<R> ReplaySource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Unpaced replay: frames are yielded as fast as they are read.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            period: None,
            ticker: None,
            line_no: 0,
        }
    }

    /// Yield at most `frame_rate` frames per second.
    pub fn paced(mut self, frame_rate: u32) -> Self {
        self.period = (frame_rate > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(frame_rate)));
        self
    }

    async fn tick(&mut self) {
        let Some(period) = self.period else {
            return;
        };
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        ticker.tick().await;
    }
}

impl ReplaySource<BufReader<File>> {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open landmark replay {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl ReplaySource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> LandmarkSource for ReplaySource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            let Some(line) = self.lines.next_line().await.context("Failed to read landmark stream")?
            else {
                debug!("Landmark stream ended after {} lines", self.line_no);
                return Ok(None);
            };
            self.line_no += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Frame>(line) {
                Ok(frame) => {
                    self.tick().await;
                    return Ok(Some(frame));
                }
                Err(e) => warn!("Skipping malformed frame on line {}: {}", self.line_no, e),
            }
        }
    }
}

/// One transcript per non-blank line.
pub struct LineUtteranceSource<R> {
    lines: Lines<R>,
}

impl<R> LineUtteranceSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl LineUtteranceSource<BufReader<File>> {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open utterance stream {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl LineUtteranceSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> UtteranceSource for LineUtteranceSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_utterance(&mut self) -> Result<Option<String>> {
        while let Some(line) = self.lines.next_line().await.context("Failed to read utterance stream")? {
            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
        Ok(None)
    }
}
