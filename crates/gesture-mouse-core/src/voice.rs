//! Voice command recognition types
//!
//! Transcripts from the external speech recognizer are matched against a
//! small fixed vocabulary. Voice actions go straight to the actuation sink
//! and never touch gesture state. File, folder and launcher commands look
//! up their target on disk before asking the sink to open it.

use std::fs;
use std::path::{Path, PathBuf};

use gesture_mouse_config::VoiceSettings;
use tracing::{debug, info, warn};

use crate::actuator::{self, Actuator, MouseButton};

/// A recognized utterance
#[derive(Debug, Clone)]
pub struct VoiceCommand {
    /// The recognized command text
    pub text: String,
    /// Detected intent/action (if any)
    pub intent: Option<VoiceIntent>,
}

/// Supported voice intents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceIntent {
    /// Shut the whole controller down
    Stop,
    LeftClick,
    RightClick,
    DoubleClick,
    Scroll { direction: ScrollDirection },
    /// Close the focused window
    CloseWindow,
    /// Minimize everything / show the desktop
    MinimizeAll,
    /// Open the first file in the current folder whose name contains every word of `name`
    OpenFile { name: String },
    /// Open a matching folder and make it the current folder
    OpenFolder { name: String },
    /// Make Documents the current folder again
    ResetFolder,
    /// Start a shortcut or executable found on the desktop
    Launch { app: String },
    OpenBrowser,
    /// Open the "This PC" view
    ShowComputer,
}

/// Scroll direction for voice commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// What the caller should do after a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceOutcome {
    Continue,
    Stop,
}

impl VoiceCommand {
    /// Create a new voice command
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            intent: None,
        }
    }

    /// Parse intent from command text
    pub fn with_parsed_intent(mut self) -> Self {
        self.intent = Self::parse_intent(&self.text);
        self
    }

    /// Parse command text to determine intent. Longer phrases are checked
    /// before the shorter phrases they contain.
    fn parse_intent(text: &str) -> Option<VoiceIntent> {
        let lower = text.to_lowercase();

        if lower.contains("stop gesture") || lower.contains("stop program") {
            return Some(VoiceIntent::Stop);
        }
        if lower.contains("right click") {
            return Some(VoiceIntent::RightClick);
        }
        if lower.contains("double click") {
            return Some(VoiceIntent::DoubleClick);
        }
        if lower.contains("click") {
            return Some(VoiceIntent::LeftClick);
        }
        if lower.contains("scroll up") {
            return Some(VoiceIntent::Scroll {
                direction: ScrollDirection::Up,
            });
        }
        if lower.contains("scroll down") {
            return Some(VoiceIntent::Scroll {
                direction: ScrollDirection::Down,
            });
        }
        if lower.contains("close this") || lower.contains("close window") {
            return Some(VoiceIntent::CloseWindow);
        }
        if lower.contains("minimize") || lower.contains("show desktop") {
            return Some(VoiceIntent::MinimizeAll);
        }

        if lower.contains("open chrome") {
            return Some(VoiceIntent::OpenBrowser);
        }
        if lower.contains("open file") {
            return argument(&lower, "open file").map(|name| VoiceIntent::OpenFile { name });
        }
        if lower.contains("open folder") {
            return argument(&lower, "open folder").map(|name| VoiceIntent::OpenFolder { name });
        }
        if lower.contains("go to documents") || lower.contains("reset folder") {
            return Some(VoiceIntent::ResetFolder);
        }
        if lower.contains("launch this pc") {
            return Some(VoiceIntent::ShowComputer);
        }
        if lower.contains("launch") {
            return argument(&lower, "launch").map(|app| VoiceIntent::Launch { app });
        }

        None
    }
}

/// Whatever is left of `text` once `phrase` is removed, if anything.
fn argument(text: &str, phrase: &str) -> Option<String> {
    let rest = text.replace(phrase, "");
    let rest = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    (!rest.is_empty()).then_some(rest)
}

/// Carries out voice commands and remembers the folder that "open file"
/// searches, which "open folder" moves and "reset folder" restores.
#[derive(Debug, Clone)]
pub struct VoiceController {
    settings: VoiceSettings,
    documents: Option<PathBuf>,
    desktops: Vec<PathBuf>,
    current: Option<PathBuf>,
}

impl VoiceController {
    pub fn new(settings: VoiceSettings) -> Self {
        let documents = settings.resolved_documents_dir();
        let desktops = settings.resolved_desktop_dirs();
        debug!(
            "Voice folders: documents {:?}, desktops {:?}",
            documents, desktops
        );
        Self {
            current: documents.clone(),
            documents,
            desktops,
            settings,
        }
    }

    /// Folder the next "open file" searches.
    pub fn current_folder(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Carry out the command. Unrecognized text is ignored.
    pub fn handle(&mut self, command: &VoiceCommand, actuator: &mut dyn Actuator) -> VoiceOutcome {
        let Some(intent) = &command.intent else {
            debug!("Ignoring utterance '{}'", command.text);
            return VoiceOutcome::Continue;
        };
        info!("Voice command {:?} from '{}'", intent, command.text);

        match intent {
            VoiceIntent::Stop => return VoiceOutcome::Stop,
            VoiceIntent::LeftClick => {
                actuator::report("click", actuator.click(MouseButton::Left));
            }
            VoiceIntent::RightClick => {
                actuator::report("right_click", actuator.click(MouseButton::Right));
            }
            VoiceIntent::DoubleClick => {
                actuator::report("double_click", actuator.double_click());
            }
            VoiceIntent::Scroll { direction } => {
                let ticks = match direction {
                    ScrollDirection::Up => self.settings.scroll_ticks,
                    ScrollDirection::Down => -self.settings.scroll_ticks,
                };
                actuator::report("scroll", actuator.scroll(ticks));
            }
            VoiceIntent::CloseWindow => {
                actuator::report("close_window", actuator.close_window());
            }
            VoiceIntent::MinimizeAll => {
                actuator::report("minimize_all", actuator.minimize_all());
            }
            VoiceIntent::OpenBrowser => {
                actuator::report("launch", actuator.launch("chrome"));
            }
            VoiceIntent::ShowComputer => {
                actuator::report("show_computer", actuator.show_computer());
            }
            VoiceIntent::OpenFile { name } => self.open_file(name, actuator),
            VoiceIntent::OpenFolder { name } => self.open_folder(name, actuator),
            VoiceIntent::ResetFolder => {
                self.current = self.documents.clone();
                match &self.documents {
                    Some(documents) => {
                        info!("Search folder reset to {}", documents.display());
                        actuator::report("open_path", actuator.open_path(documents));
                    }
                    None => warn!("No documents folder to return to"),
                }
            }
            VoiceIntent::Launch { app } => self.launch(app, actuator),
        }
        VoiceOutcome::Continue
    }

    fn open_file(&self, name: &str, actuator: &mut dyn Actuator) {
        let Some(folder) = &self.current else {
            warn!("No folder to search for '{}'", name);
            return;
        };
        match find_entry(folder, name, |path| path.is_file()) {
            Some(file) => {
                info!("Opening {}", file.display());
                actuator::report("open_path", actuator.open_path(&file));
            }
            None => info!("No file matching '{}' in {}", name, folder.display()),
        }
    }

    fn open_folder(&mut self, name: &str, actuator: &mut dyn Actuator) {
        let found = self
            .desktops
            .iter()
            .chain(self.current.iter())
            .chain(self.documents.iter())
            .find_map(|dir| find_entry(dir, name, |path| path.is_dir()));
        let Some(folder) = found else {
            info!("No folder matching '{}'", name);
            return;
        };
        if actuator::report("open_path", actuator.open_path(&folder)) {
            info!("Search folder is now {}", folder.display());
            self.current = Some(folder);
        }
    }

    fn launch(&self, app: &str, actuator: &mut dyn Actuator) {
        let extensions = &self.settings.launch_extensions;
        let found = self.desktops.iter().find_map(|dir| {
            find_entry(dir, app, |path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            })
        });
        match found {
            Some(target) => {
                info!("Launching {}", target.display());
                actuator::report("open_path", actuator.open_path(&target));
            }
            None => info!("No launcher matching '{}' on the desktop", app),
        }
    }
}

/// First entry of `dir`, in name order, whose lowercased name contains every
/// word of `query` and that passes `accept`.
fn find_entry(dir: &Path, query: &str, accept: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot search {}: {}", dir.display(), e);
            return None;
        }
    };
    let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            words.iter().all(|w| name.contains(w.as_str())) && accept(path)
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Call, RecordingActuator};
    use tempfile::TempDir;

    fn intent(text: &str) -> Option<VoiceIntent> {
        VoiceCommand::new(text).with_parsed_intent().intent
    }

    fn say(controller: &mut VoiceController, text: &str, act: &mut RecordingActuator) -> VoiceOutcome {
        controller.handle(&VoiceCommand::new(text).with_parsed_intent(), act)
    }

    /// Documents and desktop folders under one temp root.
    fn folders() -> (TempDir, VoiceController) {
        let root = tempfile::tempdir().unwrap();
        let documents = root.path().join("Documents");
        let desktop = root.path().join("Desktop");
        fs::create_dir_all(documents.join("Tax Returns")).unwrap();
        fs::create_dir_all(desktop.join("Project Notes")).unwrap();
        fs::write(documents.join("Quarterly Report.pdf"), b"").unwrap();
        fs::write(documents.join("Tax Returns").join("return 2023.pdf"), b"").unwrap();
        fs::write(desktop.join("Spotify.lnk"), b"").unwrap();
        fs::write(desktop.join("spotify notes.txt"), b"").unwrap();

        let settings = VoiceSettings {
            documents_dir: Some(documents),
            desktop_dirs: vec![desktop],
            ..VoiceSettings::default()
        };
        (root, VoiceController::new(settings))
    }

    #[test]
    fn test_voice_command() {
        assert_eq!(intent("please stop gesture control"), Some(VoiceIntent::Stop));
        assert_eq!(intent("Click"), Some(VoiceIntent::LeftClick));
        assert_eq!(intent("left click"), Some(VoiceIntent::LeftClick));
        assert_eq!(
            intent("scroll down a bit"),
            Some(VoiceIntent::Scroll {
                direction: ScrollDirection::Down
            })
        );
        assert_eq!(intent("show desktop"), Some(VoiceIntent::MinimizeAll));
        assert_eq!(intent("close window"), Some(VoiceIntent::CloseWindow));
        assert_eq!(intent("what time is it"), None);
    }

    #[test]
    fn test_specific_click_phrases_win() {
        assert_eq!(intent("right click"), Some(VoiceIntent::RightClick));
        assert_eq!(intent("double click here"), Some(VoiceIntent::DoubleClick));
    }

    #[test]
    fn test_folder_and_launch_phrases() {
        assert_eq!(
            intent("Open File  quarterly report"),
            Some(VoiceIntent::OpenFile {
                name: "quarterly report".to_string()
            })
        );
        assert_eq!(
            intent("open folder tax"),
            Some(VoiceIntent::OpenFolder {
                name: "tax".to_string()
            })
        );
        assert_eq!(intent("reset folder"), Some(VoiceIntent::ResetFolder));
        assert_eq!(intent("go to documents"), Some(VoiceIntent::ResetFolder));
        assert_eq!(intent("open chrome"), Some(VoiceIntent::OpenBrowser));
        assert_eq!(intent("launch this pc"), Some(VoiceIntent::ShowComputer));
        assert_eq!(
            intent("launch spotify"),
            Some(VoiceIntent::Launch {
                app: "spotify".to_string()
            })
        );
        // nothing left to search for
        assert_eq!(intent("open file"), None);
        assert_eq!(intent("launch"), None);
    }

    #[test]
    fn test_handle_issues_actions() {
        let (_root, mut voice) = folders();
        let mut act = RecordingActuator::new();

        assert_eq!(say(&mut voice, "scroll up", &mut act), VoiceOutcome::Continue);
        say(&mut voice, "right click", &mut act);
        say(&mut voice, "open chrome", &mut act);
        say(&mut voice, "launch this pc", &mut act);
        assert_eq!(
            act.calls,
            vec![
                Call::Scroll(300),
                Call::Click(MouseButton::Right),
                Call::Launch("chrome".to_string()),
                Call::ShowComputer,
            ]
        );
    }

    #[test]
    fn test_handle_stop_and_unknown() {
        let (_root, mut voice) = folders();
        let mut act = RecordingActuator::new();

        assert_eq!(say(&mut voice, "stop program", &mut act), VoiceOutcome::Stop);
        assert_eq!(say(&mut voice, "mumble", &mut act), VoiceOutcome::Continue);
        assert!(act.calls.is_empty());
    }

    #[test]
    fn test_open_file_searches_current_folder() {
        let (root, mut voice) = folders();
        let mut act = RecordingActuator::new();
        let documents = root.path().join("Documents");
        assert_eq!(voice.current_folder(), Some(documents.as_path()));

        say(&mut voice, "open file report quarterly", &mut act);
        say(&mut voice, "open file return", &mut act);
        assert_eq!(act.calls, vec![Call::Open(documents.join("Quarterly Report.pdf"))]);
    }

    #[test]
    fn test_open_folder_moves_search_and_reset_returns() {
        let (root, mut voice) = folders();
        let mut act = RecordingActuator::new();
        let documents = root.path().join("Documents");
        let taxes = documents.join("Tax Returns");

        say(&mut voice, "open folder tax", &mut act);
        assert_eq!(voice.current_folder(), Some(taxes.as_path()));
        say(&mut voice, "open file return", &mut act);
        say(&mut voice, "open folder nowhere", &mut act);
        assert_eq!(voice.current_folder(), Some(taxes.as_path()));

        say(&mut voice, "go to documents", &mut act);
        assert_eq!(voice.current_folder(), Some(documents.as_path()));
        assert_eq!(
            act.calls,
            vec![
                Call::Open(taxes.clone()),
                Call::Open(taxes.join("return 2023.pdf")),
                Call::Open(documents),
            ]
        );
    }

    #[test]
    fn test_open_folder_checks_desktop_first() {
        let (root, mut voice) = folders();
        let mut act = RecordingActuator::new();
        say(&mut voice, "open folder project notes", &mut act);
        assert_eq!(
            act.calls,
            vec![Call::Open(root.path().join("Desktop").join("Project Notes"))]
        );
    }

    #[test]
    fn test_launch_only_matches_launchers() {
        let (root, mut voice) = folders();
        let mut act = RecordingActuator::new();

        say(&mut voice, "launch spotify", &mut act);
        say(&mut voice, "launch photoshop", &mut act);
        assert_eq!(
            act.calls,
            vec![Call::Open(root.path().join("Desktop").join("Spotify.lnk"))]
        );
    }

    #[test]
    fn test_failed_open_keeps_search_folder() {
        let (root, mut voice) = folders();
        let mut act = RecordingActuator::new();
        act.fail_commands = true;

        say(&mut voice, "open folder tax", &mut act);
        assert_eq!(
            voice.current_folder(),
            Some(root.path().join("Documents").as_path())
        );
    }
}
