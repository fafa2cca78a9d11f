use std::time::Duration;

use crate::model::{Chord, ChordRange, Position, STRING_COUNT, Symbol, Tablature};

use super::sink::{MidiSink, PlaybackError};

const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;
const PITCH_BEND: u8 = 0xE0;
const PROGRAM_CHANGE: u8 = 0xC0;
const VELOCITY: u8 = 100;

const VIBRATO_STEPS: u32 = 20;
const VIBRATO_REST: u8 = 40;

/// Longest single wait before the hooks get a chance to interrupt
const MAX_SLICE: Duration = Duration::from_millis(50);

/// Returned by a hook to stop playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

/// How a call to [`Player::play`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    Finished,
    Interrupted,
}

/// Callbacks run by the player between events
pub trait PlaybackHooks {
    /// Before each pass over the score (once unless continuous)
    fn before_repeat(&mut self) -> Result<(), Interrupted> {
        Ok(())
    }

    /// After each chord's notes have been released
    fn after_chord(&mut self) -> Result<(), Interrupted> {
        Ok(())
    }

    /// Periodically while a chord sounds
    fn tick(&mut self) -> Result<(), Interrupted> {
        Ok(())
    }
}

/// Hooks that never interrupt
pub struct NoHooks;

impl PlaybackHooks for NoHooks {}

/// An owned copy of the chords to play, so that playback callbacks can
/// mutate the document freely
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub chords: Vec<Chord>,
    pub tuning: [u8; STRING_COUNT],
    pub bpm: u32,
    /// Where the range starts in the document
    pub beginning: Position,
}

impl Score {
    pub fn from_range(tab: &Tablature, range: ChordRange) -> Self {
        Score {
            chords: range.chords(tab).cloned().collect(),
            tuning: tab.tuning,
            bpm: tab.bpm,
            beginning: range.beginning,
        }
    }

    /// Total playing time of one pass
    pub fn length(&self) -> Duration {
        self.chords.iter().map(|c| c.duration.to_std(self.bpm)).sum()
    }

    fn note(&self, string: u8, fret: u8) -> u8 {
        let open = self.tuning.get(usize::from(string)).copied().unwrap_or(0);
        open.saturating_add(fret).min(127)
    }
}

/// Plays scores through a [`MidiSink`] on one channel
pub struct Player<S: MidiSink> {
    sink: S,
    channel: u8,
}

impl<S: MidiSink> Player<S> {
    pub fn new(sink: S) -> Self {
        Player { sink, channel: 0 }
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn set_instrument(&mut self, program: u8) -> Result<(), PlaybackError> {
        self.sink.send(&[PROGRAM_CHANGE | self.channel, program & 0x7F])
    }

    /// Play the score once, or until interrupted when `continuous`
    pub fn play(
        &mut self,
        score: &Score,
        continuous: bool,
        hooks: &mut impl PlaybackHooks,
    ) -> Result<PlaybackEnd, PlaybackError> {
        log::debug!(
            "playing {} chords from {} at {} bpm ({:.1}s per pass)",
            score.chords.len(),
            score.beginning,
            score.bpm,
            score.length().as_secs_f64()
        );
        loop {
            if hooks.before_repeat().is_err() {
                return Ok(PlaybackEnd::Interrupted);
            }
            for chord in &score.chords {
                self.notes(score, chord, NOTE_ON)?;
                let sounded = self.sound(score, chord, hooks);
                self.notes(score, chord, NOTE_OFF)?;
                if sounded?.is_err() || hooks.after_chord().is_err() {
                    return Ok(PlaybackEnd::Interrupted);
                }
            }
            if !continuous || score.chords.is_empty() {
                return Ok(PlaybackEnd::Finished);
            }
        }
    }

    fn notes(&mut self, score: &Score, chord: &Chord, status: u8) -> Result<(), PlaybackError> {
        for (&string, fret) in &chord.strings {
            let note = score.note(string, fret.fret);
            self.sink.send(&[status | self.channel, note, VELOCITY])?;
        }
        Ok(())
    }

    /// Hold the chord for its duration. The outer error is a sink failure,
    /// the inner one an interruption by the hooks.
    fn sound(
        &mut self,
        score: &Score,
        chord: &Chord,
        hooks: &mut impl PlaybackHooks,
    ) -> Result<Result<(), Interrupted>, PlaybackError> {
        let length = chord.duration.to_std(score.bpm);
        let vibrato = chord.strings.values().any(|f| f.has(Symbol::Vibrato));
        if !vibrato {
            return Ok(self.hold(length, hooks));
        }

        let interval = length / VIBRATO_STEPS;
        for i in 0..VIBRATO_STEPS {
            let bend = VIBRATO_REST as i32 + (15.0 * (f64::from(i) / 0.95).sin()) as i32;
            self.sink
                .send(&[PITCH_BEND | self.channel, 0, bend as u8])?;
            if let Err(e) = self.hold(interval, hooks) {
                self.sink
                    .send(&[PITCH_BEND | self.channel, 0, VIBRATO_REST])?;
                return Ok(Err(e));
            }
        }
        self.sink
            .send(&[PITCH_BEND | self.channel, 0, VIBRATO_REST])?;
        Ok(Ok(()))
    }

    fn hold(&mut self, mut remaining: Duration, hooks: &mut impl PlaybackHooks) -> Result<(), Interrupted> {
        while !remaining.is_zero() {
            let slice = remaining.min(MAX_SLICE);
            self.sink.wait(slice);
            remaining -= slice;
            hooks.tick()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bar, Duration as NoteLength, Fret};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Send(Vec<u8>),
        Wait(Duration),
    }

    /// Records messages and waits without sleeping
    #[derive(Default)]
    struct RecordingSink {
        events: Vec<Event>,
    }

    impl MidiSink for RecordingSink {
        fn send(&mut self, message: &[u8]) -> Result<(), PlaybackError> {
            self.events.push(Event::Send(message.to_vec()));
            Ok(())
        }

        fn wait(&mut self, duration: Duration) {
            self.events.push(Event::Wait(duration));
        }
    }

    impl RecordingSink {
        fn messages(&self) -> Vec<Vec<u8>> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Send(m) => Some(m.clone()),
                    Event::Wait(_) => None,
                })
                .collect()
        }

        fn waited(&self) -> Duration {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Wait(d) => Some(*d),
                    Event::Send(_) => None,
                })
                .sum()
        }
    }

    #[derive(Default)]
    struct CountingHooks {
        repeats: usize,
        chords: usize,
        stop_after_chords: Option<usize>,
        stop_after_repeats: Option<usize>,
    }

    impl PlaybackHooks for CountingHooks {
        fn before_repeat(&mut self) -> Result<(), Interrupted> {
            if self.stop_after_repeats == Some(self.repeats) {
                return Err(Interrupted);
            }
            self.repeats += 1;
            Ok(())
        }

        fn after_chord(&mut self) -> Result<(), Interrupted> {
            self.chords += 1;
            if self.stop_after_chords == Some(self.chords) {
                return Err(Interrupted);
            }
            Ok(())
        }
    }

    fn score() -> Score {
        let mut tab = Tablature::default();
        let mut bar = Bar::default();
        let mut first = Chord::new(NoteLength::QUARTER);
        first.strings.insert(0, Fret::new(3));
        first.strings.insert(5, Fret::new(0));
        let second = Chord::new(NoteLength::new(1, 8));
        bar.chords = vec![first, second];
        tab.bars = vec![bar];
        let range = ChordRange::whole_bar(&tab, 1).unwrap();
        Score::from_range(&tab, range)
    }

    #[test]
    fn plays_notes_and_waits() {
        let mut player = Player::new(RecordingSink::default());
        let end = player.play(&score(), false, &mut NoHooks).unwrap();
        assert_eq!(end, PlaybackEnd::Finished);
        assert_eq!(
            player.sink().messages(),
            vec![
                vec![0x90, 79, 100],
                vec![0x90, 52, 100],
                vec![0x80, 79, 100],
                vec![0x80, 52, 100],
            ]
        );
        // a quarter plus an eighth at 120 bpm
        assert_eq!(player.sink().waited(), Duration::from_millis(750));
        assert_eq!(score().length(), Duration::from_millis(750));
    }

    #[test]
    fn waits_are_sliced() {
        let mut player = Player::new(RecordingSink::default());
        player.play(&score(), false, &mut NoHooks).unwrap();
        assert!(player.sink().events.iter().all(|e| match e {
            Event::Wait(d) => *d <= MAX_SLICE,
            Event::Send(_) => true,
        }));
    }

    #[test]
    fn interrupt_after_first_chord_releases_notes() {
        let mut player = Player::new(RecordingSink::default());
        let mut hooks = CountingHooks {
            stop_after_chords: Some(1),
            ..Default::default()
        };
        let end = player.play(&score(), true, &mut hooks).unwrap();
        assert_eq!(end, PlaybackEnd::Interrupted);
        assert_eq!(hooks.chords, 1);
        let last = player.sink().messages().pop().unwrap();
        assert_eq!(last[0], 0x80);
    }

    #[test]
    fn continuous_repeats_until_interrupted() {
        let mut player = Player::new(RecordingSink::default());
        let mut hooks = CountingHooks {
            stop_after_repeats: Some(3),
            ..Default::default()
        };
        let end = player.play(&score(), true, &mut hooks).unwrap();
        assert_eq!(end, PlaybackEnd::Interrupted);
        assert_eq!(hooks.repeats, 3);
        assert_eq!(hooks.chords, 6);
    }

    #[test]
    fn vibrato_bends_and_resets() {
        let mut s = score();
        if let Some(f) = s.chords[0].strings.get_mut(&0) {
            f.toggle(Symbol::Vibrato);
        }
        let mut player = Player::new(RecordingSink::default());
        player.play(&s, false, &mut NoHooks).unwrap();
        let bends: Vec<Vec<u8>> = player
            .sink()
            .messages()
            .into_iter()
            .filter(|m| m[0] == 0xE0)
            .collect();
        assert_eq!(bends.len(), 21);
        assert_eq!(bends[0], vec![0xE0, 0, 40]);
        assert_eq!(bends[1], vec![0xE0, 0, 40 + (15.0 * (1.0f64 / 0.95).sin()) as u8]);
        assert_eq!(bends[20], vec![0xE0, 0, 40]);
        assert_eq!(player.sink().waited(), Duration::from_millis(750));
    }

    #[test]
    fn program_change() {
        let mut player = Player::new(RecordingSink::default());
        player.set_instrument(24).unwrap();
        assert_eq!(player.sink().messages(), vec![vec![0xC0, 24]]);
    }

    #[test]
    fn notes_are_clamped_to_midi_range() {
        let mut s = score();
        s.tuning[0] = 120;
        s.chords[0].strings.insert(0, Fret::new(99));
        let mut player = Player::new(RecordingSink::default());
        player.play(&s, false, &mut NoHooks).unwrap();
        assert_eq!(player.sink().messages()[0], vec![0x90, 127, 100]);
    }
}
