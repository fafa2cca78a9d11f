use std::time::Duration;

/// Error type for MIDI output
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("failed to initialize MIDI output: {0}")]
    InitError(String),
    #[error("no MIDI output ports available")]
    NoOutputPorts,
    #[error("no MIDI output port matching '{0}'")]
    PortNotFound(String),
    #[error("failed to connect to MIDI output: {0}")]
    ConnectionError(String),
    #[error("failed to send MIDI message: {0}")]
    SendError(String),
}

/// Where the player's MIDI bytes go, and how it waits between events
pub trait MidiSink {
    fn send(&mut self, message: &[u8]) -> Result<(), PlaybackError>;

    fn wait(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Drops every message but keeps real time, so the cursor still walks
/// through the chords when no MIDI output is available
#[derive(Debug, Default)]
pub struct NullSink;

impl MidiSink for NullSink {
    fn send(&mut self, _message: &[u8]) -> Result<(), PlaybackError> {
        Ok(())
    }
}

impl<S: MidiSink + ?Sized> MidiSink for Box<S> {
    fn send(&mut self, message: &[u8]) -> Result<(), PlaybackError> {
        (**self).send(message)
    }

    fn wait(&mut self, duration: Duration) {
        (**self).wait(duration)
    }
}

#[cfg(feature = "midi")]
pub use midir_sink::MidirSink;

#[cfg(feature = "midi")]
mod midir_sink {
    use midir::{MidiOutput, MidiOutputConnection};

    use super::{MidiSink, PlaybackError};

    /// Output through the system MIDI stack
    pub struct MidirSink {
        connection: MidiOutputConnection,
    }

    impl MidirSink {
        /// Connect to the first output port whose name contains `port_match`
        /// (case-insensitively), or to the first port when none is given
        pub fn connect(port_match: Option<&str>) -> Result<Self, PlaybackError> {
            let midi_out = MidiOutput::new("vitabs")
                .map_err(|e| PlaybackError::InitError(e.to_string()))?;

            let ports = midi_out.ports();
            if ports.is_empty() {
                return Err(PlaybackError::NoOutputPorts);
            }

            let port = match port_match {
                None => &ports[0],
                Some(pattern) => {
                    let pattern = pattern.to_lowercase();
                    ports
                        .iter()
                        .find(|port| {
                            midi_out
                                .port_name(port)
                                .map(|name| name.to_lowercase().contains(&pattern))
                                .unwrap_or(false)
                        })
                        .ok_or_else(|| PlaybackError::PortNotFound(pattern.clone()))?
                }
            };

            let name = midi_out
                .port_name(port)
                .unwrap_or_else(|_| "<unknown>".to_string());
            log::info!("MIDI: connecting to output port {}", name);

            let connection = midi_out
                .connect(port, "vitabs-out")
                .map_err(|e| PlaybackError::ConnectionError(e.to_string()))?;
            Ok(MidirSink { connection })
        }
    }

    impl MidiSink for MidirSink {
        fn send(&mut self, message: &[u8]) -> Result<(), PlaybackError> {
            self.connection
                .send(message)
                .map_err(|e| PlaybackError::SendError(e.to_string()))
        }
    }
}

/// Open the configured output: a real port when built with MIDI support,
/// otherwise (or when the port cannot be opened) the silent sink
pub fn open_sink(port: Option<&str>) -> Box<dyn MidiSink> {
    #[cfg(feature = "midi")]
    {
        match MidirSink::connect(port) {
            Ok(sink) => return Box::new(sink),
            Err(e) => log::warn!("MIDI output unavailable, playing silently: {e}"),
        }
    }
    #[cfg(not(feature = "midi"))]
    log::debug!("built without MIDI support, ignoring port {port:?}");
    Box::new(NullSink)
}
