//! Audio playback backend using rodio.

use std::io::{BufReader, Cursor};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use color_eyre::Result;
use rodio::{Decoder, OutputStream, Sink, Source};
use tokio::sync::mpsc;

/// Messages sent to the player thread.
#[derive(Debug)]
pub enum PlayerCommand {
    /// Fetch, decode and play the stream at the URL.
    Start(String),
    Pause,
    Resume,
    Stop,
    SetVolume(f32),
    Seek(Duration),
}

/// Messages sent from the player thread.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// The stream decoded and its total time is known.
    Metadata(Duration),
    Progress {
        position: Duration,
        duration: Option<Duration>,
    },
    Ended,
    Error(String),
}

/// Audio player that runs in a separate thread.
pub struct Player {
    command_tx: mpsc::UnboundedSender<PlayerCommand>,
    event_rx: mpsc::UnboundedReceiver<PlayerEvent>,
}

impl Player {
    /// Create a new audio player.
    pub fn new() -> Result<Self> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        // Spawn the player thread
        std::thread::spawn(move || {
            if let Err(e) = run_player_thread(command_rx, event_tx) {
                tracing::error!("Player thread error: {}", e);
            }
        });

        Ok(Self {
            command_tx,
            event_rx,
        })
    }

    /// Start playback of a stream URL.
    pub fn start(&self, url: String) -> Result<()> {
        self.command_tx.send(PlayerCommand::Start(url))?;
        Ok(())
    }

    /// Pause playback.
    pub fn pause(&self) -> Result<()> {
        self.command_tx.send(PlayerCommand::Pause)?;
        Ok(())
    }

    /// Resume playback.
    pub fn resume(&self) -> Result<()> {
        self.command_tx.send(PlayerCommand::Resume)?;
        Ok(())
    }

    /// Stop playback and drop the current stream.
    pub fn stop(&self) -> Result<()> {
        self.command_tx.send(PlayerCommand::Stop)?;
        Ok(())
    }

    /// Set volume (0.0 to 1.0).
    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.command_tx.send(PlayerCommand::SetVolume(volume))?;
        Ok(())
    }

    /// Seek to a position.
    pub fn seek(&self, position: Duration) -> Result<()> {
        self.command_tx.send(PlayerCommand::Seek(position))?;
        Ok(())
    }

    /// Try to receive a player event (non-blocking).
    pub fn try_recv_event(&mut self) -> Option<PlayerEvent> {
        self.event_rx.try_recv().ok()
    }
}

/// Run the player thread.
fn run_player_thread(
    mut command_rx: mpsc::UnboundedReceiver<PlayerCommand>,
    event_tx: mpsc::UnboundedSender<PlayerEvent>,
) -> Result<()> {
    // Initialize audio output
    let (_stream, stream_handle) = OutputStream::try_default()?;
    let sink = Arc::new(Mutex::new(Sink::try_new(&stream_handle)?));

    let mut is_playing = false;
    let mut position = Duration::ZERO;
    let mut current_duration: Option<Duration> = None;
    let mut current_audio_data: Option<Vec<u8>> = None;
    let mut current_volume: f32 = 0.8;

    loop {
        // Check for commands (non-blocking)
        match command_rx.try_recv() {
            Ok(cmd) => match cmd {
                PlayerCommand::Start(url) => {
                    // Tear down whatever is playing before the new stream
                    {
                        let s = sink.lock().unwrap();
                        s.stop();
                    }
                    *sink.lock().unwrap() = Sink::try_new(&stream_handle)?;

                    is_playing = false;
                    position = Duration::ZERO;
                    current_duration = None;
                    current_audio_data = None;

                    // Fetch and decode the audio stream
                    match fetch_audio_data(&url) {
                        Ok(audio_data) => {
                            match play_audio_data(&audio_data, &sink, current_volume, Duration::ZERO)
                            {
                                Ok(duration) => {
                                    current_audio_data = Some(audio_data);
                                    current_duration = duration;
                                    is_playing = true;
                                    if let Some(dur) = duration {
                                        let _ = event_tx.send(PlayerEvent::Metadata(dur));
                                    }
                                }
                                Err(e) => {
                                    let _ = event_tx.send(PlayerEvent::Error(e.to_string()));
                                }
                            }
                        }
                        Err(e) => {
                            let _ = event_tx.send(PlayerEvent::Error(e.to_string()));
                        }
                    }
                }
                PlayerCommand::Pause => {
                    sink.lock().unwrap().pause();
                    is_playing = false;
                }
                PlayerCommand::Resume => {
                    sink.lock().unwrap().play();
                    is_playing = true;
                }
                PlayerCommand::Stop => {
                    {
                        let s = sink.lock().unwrap();
                        s.stop();
                    }
                    *sink.lock().unwrap() = Sink::try_new(&stream_handle)?;
                    current_audio_data = None;
                    current_duration = None;
                    is_playing = false;
                    position = Duration::ZERO;
                }
                PlayerCommand::SetVolume(vol) => {
                    current_volume = vol;
                    sink.lock().unwrap().set_volume(vol);
                }
                PlayerCommand::Seek(target) => {
                    // Seek by recreating the source with skip_duration
                    if let Some(ref audio_data) = current_audio_data {
                        {
                            let s = sink.lock().unwrap();
                            s.stop();
                        }
                        *sink.lock().unwrap() = Sink::try_new(&stream_handle)?;

                        match play_audio_data(audio_data, &sink, current_volume, target) {
                            Ok(_) => {
                                position = target;
                                is_playing = true;
                            }
                            Err(e) => {
                                let _ = event_tx
                                    .send(PlayerEvent::Error(format!("Seek failed: {}", e)));
                            }
                        }
                    }
                }
            },
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => {
                // Channel closed, exit thread
                break;
            }
        }

        // Check if the stream ended
        if is_playing && current_audio_data.is_some() && sink.lock().unwrap().empty() {
            is_playing = false;
            current_audio_data = None;
            let _ = event_tx.send(PlayerEvent::Ended);
        }

        // Update progress (approximate based on time elapsed)
        if is_playing {
            position += Duration::from_millis(100);
            let _ = event_tx.send(PlayerEvent::Progress {
                position,
                duration: current_duration,
            });
        }

        // Sleep to avoid busy waiting
        std::thread::sleep(Duration::from_millis(100));
    }

    Ok(())
}

/// Fetch audio data from URL. A missing episode surfaces as an HTTP
/// error here and is reported as a load failure.
fn fetch_audio_data(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let bytes = response.bytes()?;
    Ok(bytes.to_vec())
}

/// Decode and play audio data with optional skip duration for seeking.
/// Returns the decoder's total time when it is known.
fn play_audio_data(
    audio_data: &[u8],
    sink: &Arc<Mutex<Sink>>,
    volume: f32,
    skip: Duration,
) -> Result<Option<Duration>> {
    let cursor = Cursor::new(audio_data.to_vec());
    let source = Decoder::new(BufReader::new(cursor))?;
    let duration = source.total_duration();

    let s = sink.lock().unwrap();
    if skip > Duration::ZERO {
        s.append(source.skip_duration(skip));
    } else {
        s.append(source);
    }
    s.set_volume(volume);
    s.play();

    Ok(duration)
}
