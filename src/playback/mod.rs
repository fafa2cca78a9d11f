pub mod player;
pub mod sink;

pub use player::{Interrupted, NoHooks, PlaybackEnd, PlaybackHooks, Player, Score};
pub use sink::{MidiSink, NullSink, PlaybackError, open_sink};
