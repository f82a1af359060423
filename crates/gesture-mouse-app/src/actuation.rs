//! Serialized access to the actuation backend.
//!
//! The frame loop and the voice loop both issue actions. Every call goes
//! through one channel to a single worker thread that owns the backend, so
//! actions from the two loops never interleave inside the platform layer.
//! Commands are fire-and-forget; queries wait for the worker's reply.

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use gesture_mouse_core::{ActuationError, ActuationResult, Actuator, MouseButton};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

#[derive(Debug)]
enum Command {
    Move(i32, i32),
    Down(MouseButton),
    Up(MouseButton),
    Click(MouseButton),
    DoubleClick,
    Scroll(i32),
    ScrollHorizontal(i32),
    SetVolume(f32),
    SetBrightness(f32),
    CloseWindow,
    MinimizeAll,
    OpenPath(PathBuf),
    Launch(String),
    ShowComputer,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Move(..) => "move_cursor",
            Self::Down(_) => "mouse_down",
            Self::Up(_) => "mouse_up",
            Self::Click(_) => "click",
            Self::DoubleClick => "double_click",
            Self::Scroll(_) => "scroll",
            Self::ScrollHorizontal(_) => "scroll_horizontal",
            Self::SetVolume(_) => "set_volume",
            Self::SetBrightness(_) => "set_brightness",
            Self::CloseWindow => "close_window",
            Self::MinimizeAll => "minimize_all",
            Self::OpenPath(_) => "open_path",
            Self::Launch(_) => "launch",
            Self::ShowComputer => "show_computer",
        }
    }

    fn apply(self, backend: &mut dyn Actuator) -> ActuationResult<()> {
        match self {
            Self::Move(x, y) => backend.move_cursor(x, y),
            Self::Down(button) => backend.mouse_down(button),
            Self::Up(button) => backend.mouse_up(button),
            Self::Click(button) => backend.click(button),
            Self::DoubleClick => backend.double_click(),
            Self::Scroll(ticks) => backend.scroll(ticks),
            Self::ScrollHorizontal(ticks) => backend.scroll_horizontal(ticks),
            Self::SetVolume(level) => backend.set_volume(level),
            Self::SetBrightness(percent) => backend.set_brightness(percent),
            Self::CloseWindow => backend.close_window(),
            Self::MinimizeAll => backend.minimize_all(),
            Self::OpenPath(path) => backend.open_path(&path),
            Self::Launch(program) => backend.launch(&program),
            Self::ShowComputer => backend.show_computer(),
        }
    }
}

type Reply<T> = oneshot::Sender<ActuationResult<T>>;

#[derive(Debug)]
enum Query {
    ScreenSize(Reply<(i32, i32)>),
    CursorPosition(Reply<(i32, i32)>),
    Volume(Reply<f32>),
    Brightness(Reply<f32>),
}

#[derive(Debug)]
enum Request {
    Command(Command),
    Query(Query),
}

/// Cloneable handle to the actuation worker.
///
/// Query methods block the calling thread until the worker answers, so they
/// must not be called from inside an async task.
#[derive(Debug, Clone)]
pub struct ActuationQueue {
    tx: mpsc::UnboundedSender<Request>,
}

impl ActuationQueue {
    /// Move `backend` onto a worker thread. The worker runs until every
    /// handle is dropped and then hands the backend back through the join handle.
    pub fn spawn<A>(backend: A) -> Result<(Self, JoinHandle<A>)>
    where
        A: Actuator + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = thread::Builder::new()
            .name("actuation".to_string())
            .spawn(move || run_worker(backend, rx))
            .context("Failed to start actuation worker")?;
        Ok((Self { tx }, worker))
    }

    fn command(&self, command: Command) -> ActuationResult<()> {
        self.tx
            .send(Request::Command(command))
            .map_err(|_| ActuationError::Disconnected)
    }

    fn query<T>(&self, make: impl FnOnce(Reply<T>) -> Query) -> ActuationResult<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Request::Query(make(reply)))
            .map_err(|_| ActuationError::Disconnected)?;
        response
            .blocking_recv()
            .map_err(|_| ActuationError::Disconnected)?
    }
}

fn run_worker<A: Actuator>(mut backend: A, mut rx: mpsc::UnboundedReceiver<Request>) -> A {
    debug!("Actuation worker started");
    while let Some(request) = rx.blocking_recv() {
        match request {
            Request::Command(command) => {
                let name = command.name();
                if let Err(e) = command.apply(&mut backend) {
                    warn!("Actuation '{}' failed: {}", name, e);
                }
            }
            // A dropped reply receiver only means the caller went away.
            Request::Query(Query::ScreenSize(reply)) => {
                let _ = reply.send(backend.screen_size());
            }
            Request::Query(Query::CursorPosition(reply)) => {
                let _ = reply.send(backend.cursor_position());
            }
            Request::Query(Query::Volume(reply)) => {
                let _ = reply.send(backend.volume());
            }
            Request::Query(Query::Brightness(reply)) => {
                let _ = reply.send(backend.brightness());
            }
        }
    }
    debug!("Actuation worker stopped");
    backend
}

impl Actuator for ActuationQueue {
    fn screen_size(&mut self) -> ActuationResult<(i32, i32)> {
        self.query(Query::ScreenSize)
    }

    fn cursor_position(&mut self) -> ActuationResult<(i32, i32)> {
        self.query(Query::CursorPosition)
    }

    fn move_cursor(&mut self, x: i32, y: i32) -> ActuationResult<()> {
        self.command(Command::Move(x, y))
    }

    fn mouse_down(&mut self, button: MouseButton) -> ActuationResult<()> {
        self.command(Command::Down(button))
    }

    fn mouse_up(&mut self, button: MouseButton) -> ActuationResult<()> {
        self.command(Command::Up(button))
    }

    fn click(&mut self, button: MouseButton) -> ActuationResult<()> {
        self.command(Command::Click(button))
    }

    fn double_click(&mut self) -> ActuationResult<()> {
        self.command(Command::DoubleClick)
    }

    fn scroll(&mut self, ticks: i32) -> ActuationResult<()> {
        self.command(Command::Scroll(ticks))
    }

    fn scroll_horizontal(&mut self, ticks: i32) -> ActuationResult<()> {
        self.command(Command::ScrollHorizontal(ticks))
    }

    fn volume(&mut self) -> ActuationResult<f32> {
        self.query(Query::Volume)
    }

    fn set_volume(&mut self, level: f32) -> ActuationResult<()> {
        self.command(Command::SetVolume(level))
    }

    fn brightness(&mut self) -> ActuationResult<f32> {
        self.query(Query::Brightness)
    }

    fn set_brightness(&mut self, percent: f32) -> ActuationResult<()> {
        self.command(Command::SetBrightness(percent))
    }

    fn close_window(&mut self) -> ActuationResult<()> {
        self.command(Command::CloseWindow)
    }

    fn minimize_all(&mut self) -> ActuationResult<()> {
        self.command(Command::MinimizeAll)
    }

    fn open_path(&mut self, path: &Path) -> ActuationResult<()> {
        self.command(Command::OpenPath(path.to_path_buf()))
    }

    fn launch(&mut self, program: &str) -> ActuationResult<()> {
        self.command(Command::Launch(program.to_string()))
    }

    fn show_computer(&mut self) -> ActuationResult<()> {
        self.command(Command::ShowComputer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::{DesktopEvent, DesktopSimulator};

    #[test]
    fn test_calls_reach_backend_in_order() {
        let (mut queue, worker) = ActuationQueue::spawn(DesktopSimulator::default()).unwrap();
        queue.move_cursor(10, 20).unwrap();
        assert_eq!(queue.cursor_position().unwrap(), (10, 20));
        queue.click(MouseButton::Left).unwrap();
        queue.scroll(-120).unwrap();
        queue.open_path(Path::new("/tmp/notes.txt")).unwrap();
        queue.launch("chrome").unwrap();
        assert_eq!(queue.screen_size().unwrap(), (1920, 1080));
        drop(queue);

        let desktop = worker.join().unwrap();
        assert_eq!(
            desktop.events(),
            &[
                DesktopEvent::Moved { x: 10, y: 20 },
                DesktopEvent::Clicked(MouseButton::Left),
                DesktopEvent::Scrolled(-120),
                DesktopEvent::Opened(PathBuf::from("/tmp/notes.txt")),
                DesktopEvent::Launched("chrome".to_string()),
            ]
        );
    }

    #[test]
    fn test_clones_share_one_worker() {
        let (queue, worker) = ActuationQueue::spawn(DesktopSimulator::default()).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let mut q = queue.clone();
                thread::spawn(move || q.scroll(i).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        drop(queue);
        assert_eq!(worker.join().unwrap().events().len(), 4);
    }

    #[test]
    fn test_backend_failure_is_logged_not_returned() {
        let (mut queue, worker) = ActuationQueue::spawn(DesktopSimulator::default()).unwrap();
        assert!(queue.set_volume(5.0).is_ok());
        assert_eq!(queue.volume().unwrap(), 0.5);
        drop(queue);
        assert!(worker.join().unwrap().events().is_empty());
    }

    #[test]
    fn test_disconnected_worker() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut queue = ActuationQueue { tx };
        assert_eq!(queue.click(MouseButton::Left), Err(ActuationError::Disconnected));
        assert_eq!(queue.brightness(), Err(ActuationError::Disconnected));
    }
}
