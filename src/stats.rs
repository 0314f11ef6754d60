//! Usage statistics and the bar chart that displays them.

use crate::db::Database;
use crate::storage::KeyValueStore;

pub const COMPLETED_LABEL: &str = "Completed Tasks";
pub const SESSIONS_LABEL: &str = "Pomodoro Sessions";
pub const CHART_TITLE: &str = "Statistics";

/// Green used for the completed-tasks bar (`#4CAF50`).
pub const COMPLETED_COLOR: Rgb = Rgb(0x4C, 0xAF, 0x50);
/// Amber used for the sessions bar (`#FFC107`).
pub const SESSIONS_COLOR: Rgb = Rgb(0xFF, 0xC1, 0x07);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Aggregate counts shown in the statistics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    pub completed_tasks: u64,
    pub total_pomodoros: u64,
}

impl Statistics {
    pub fn from_db<S: KeyValueStore>(db: &Database<S>) -> Self {
        Self {
            completed_tasks: db.completed_count() as u64,
            total_pomodoros: db.total_pomodoros(),
        }
    }

    /// Chart configuration handed to the renderer.
    pub fn chart(&self) -> ChartConfig {
        ChartConfig {
            title: CHART_TITLE,
            bars: [
                ChartBar { label: COMPLETED_LABEL, value: self.completed_tasks, color: COMPLETED_COLOR },
                ChartBar { label: SESSIONS_LABEL, value: self.total_pomodoros, color: SESSIONS_COLOR },
            ],
            show_legend: true,
            responsive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartBar {
    pub label: &'static str,
    pub value: u64,
    pub color: Rgb,
}

/// Two-bar categorical chart description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartConfig {
    pub title: &'static str,
    pub bars: [ChartBar; 2],
    pub show_legend: bool,
    /// Size bars relative to the available area rather than fixed widths.
    pub responsive: bool,
}

impl ChartConfig {
    /// Plain-text rendering for the CLI, scaled to `width` columns.
    pub fn render_text(&self, width: usize) -> String {
        let max = self.bars.iter().map(|b| b.value).max().unwrap_or(0).max(1);
        let label_width = self.bars.iter().map(|b| b.label.len()).max().unwrap_or(0);
        let mut out = format!("{}\n", self.title);
        for bar in &self.bars {
            let len = (bar.value as usize * width) / max as usize;
            out.push_str(&format!(
                "{:<label_width$}  {:<width$}  {}\n",
                bar.label,
                "█".repeat(len),
                bar.value,
            ));
        }
        if self.show_legend {
            let legend: Vec<String> = self
                .bars
                .iter()
                .map(|b| format!("{} {}", b.color.hex(), b.label))
                .collect();
            out.push_str(&format!("Legend: {}\n", legend.join(", ")));
        }
        out
    }
}
