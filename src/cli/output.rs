use serde::Serialize;

use crate::model::music::tuning_str;
use crate::model::{Duration, Tablature};

/// `vitabs info --json`
#[derive(Debug, Serialize)]
pub struct InfoJson {
    pub bars: usize,
    pub chords: usize,
    pub tuning: String,
    pub bpm: u32,
    pub instrument: u8,
    /// Total length in whole notes, as `n/d`
    pub length: Duration,
    /// 1-based indices of bars whose chords do not fill the signature
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub incomplete: Vec<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelJson>,
}

#[derive(Debug, Serialize)]
pub struct LabelJson {
    pub bar: usize,
    pub label: String,
}

impl InfoJson {
    pub fn from_tab(tab: &Tablature) -> Self {
        let length = tab.bars.iter().map(|b| b.real_duration()).sum();
        InfoJson {
            bars: tab.bars.len(),
            chords: tab.bars.iter().map(|b| b.chords.len()).sum(),
            tuning: tuning_str(&tab.tuning),
            bpm: tab.bpm,
            instrument: tab.instrument,
            length,
            incomplete: tab
                .bars
                .iter()
                .enumerate()
                .filter(|(_, b)| !b.is_complete())
                .map(|(i, _)| i + 1)
                .collect(),
            labels: tab
                .bars
                .iter()
                .enumerate()
                .filter_map(|(i, b)| {
                    b.label.as_ref().map(|l| LabelJson {
                        bar: i + 1,
                        label: l.clone(),
                    })
                })
                .collect(),
        }
    }

    /// Human-readable lines
    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![
            format!("bars:       {} ({} chords)", self.bars, self.chords),
            format!("tuning:     {}", self.tuning),
            format!("tempo:      {} bpm", self.bpm),
            format!("instrument: {}", self.instrument),
            format!("length:     {} whole notes", self.length),
        ];
        if !self.incomplete.is_empty() {
            let list: Vec<String> = self.incomplete.iter().map(|b| b.to_string()).collect();
            out.push(format!("incomplete: {}", list.join(", ")));
        }
        for l in &self.labels {
            out.push(format!("label:      {} at bar {}", l.label, l.bar));
        }
        out
    }
}
