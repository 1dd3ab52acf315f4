//! # Violin Tuner GUI
//!
//! Desktop front end for the violin tuner. It owns the user-adjustable
//! configuration, drives the tuning session from a timer subscription, and
//! renders each tick's report.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application; runs one session tick per timer event
//! - **Capture Thread**: owned by the core's `CpalFrameSource`
//! - **Updates**: ~60 FPS ticks while the session is running, none while stopped

mod ui;

use iced::{Element, Subscription, Theme};
use log::{info, warn};
use tuner_core::{CpalFrameSource, DetectionMode, TickReport, TunerConfig, TunerSession};
use ui::main_display::create_main_view;

/// Interval between session ticks.
const TICK_INTERVAL_MS: u64 = 16;

/// Main entry point for the tuner application.
pub fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting violin tuner...");
    iced::application("Violin Tuner", TunerApp::update, TunerApp::view)
        .subscription(TunerApp::subscription)
        .theme(TunerApp::theme)
        .run()?;
    info!("Application finished");
    Ok(())
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    /// Start or stop listening to the microphone
    ToggleListening,
    /// User picked a detection mode
    ModeSelected(DetectionMode),
    /// User moved the A4 reference slider
    ReferencePitchChanged(f32),
    /// Timer tick for real-time updates
    Tick,
}

/// UI-specific data needed for rendering the interface.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub listening: bool,
    pub config: TunerConfig,
    pub last_report: Option<TickReport>,
    pub status: String,
}

/// Main application state.
struct TunerApp {
    session: TunerSession<CpalFrameSource>,
    display_data: AppDisplayData,
}

impl Default for TunerApp {
    fn default() -> Self {
        Self {
            session: TunerSession::new(),
            display_data: AppDisplayData {
                listening: false,
                config: TunerConfig::default(),
                last_report: None,
                status: "Press Start and play a string.".to_string(),
            },
        }
    }
}

impl TunerApp {
    fn update(&mut self, message: Message) {
        match message {
            Message::ToggleListening => {
                if self.session.is_running() {
                    self.session.stop();
                    self.display_data.last_report = None;
                    self.display_data.status = "Stopped.".to_string();
                } else {
                    match self.session.start(CpalFrameSource::open) {
                        Ok(()) => {
                            self.display_data.status = "Listening... play a string.".to_string();
                        }
                        Err(e) => {
                            warn!("Could not start audio capture: {}", e);
                            self.display_data.status = format!("{} ({})", e.guidance(), e);
                        }
                    }
                }
                self.display_data.listening = self.session.is_running();
            }
            Message::ModeSelected(mode) => {
                info!("Detection mode: {}", mode);
                self.display_data.config.mode = mode;
            }
            Message::ReferencePitchChanged(hz) => {
                if let Err(e) = self.display_data.config.set_reference_pitch(hz) {
                    warn!("{}", e);
                }
            }
            Message::Tick => {
                // A stopped session yields nothing; keep the last state on screen.
                if let Some(report) = self.session.tick(&self.display_data.config) {
                    self.display_data.last_report = Some(report);
                }
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    /// Ticks only while the session runs; stopping cancels further ticks.
    fn subscription(&self) -> Subscription<Message> {
        if self.session.is_running() {
            iced::time::every(std::time::Duration::from_millis(TICK_INTERVAL_MS)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}
