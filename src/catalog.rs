//! Ticker table and chart palette.
//!
//! Both are plain configuration data loaded from the config file; nothing in the
//! application branches on a particular symbol or color.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TICKERS: &[(&str, &str)] = &[
    ("AAPL", "Apple"),
    ("TSLA", "Tesla"),
    ("MSFT", "Microsoft"),
    ("GOOG", "Google"),
    ("AMZN", "Amazon"),
];

pub const DEFAULT_PALETTE: &[&str] = &["#4caf50", "#2196f3", "#ff9800", "#f44336", "#9c27b0"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerEntry {
    pub symbol: String,
    pub name: String,
}

/// The closed set of symbols the form offers, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    tickers: Vec<TickerEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(default_tickers())
    }
}

pub fn default_tickers() -> Vec<TickerEntry> {
    DEFAULT_TICKERS
        .iter()
        .map(|(symbol, name)| TickerEntry {
            symbol: symbol.to_string(),
            name: name.to_string(),
        })
        .collect()
}

impl Catalog {
    pub fn new(tickers: Vec<TickerEntry>) -> Catalog {
        Catalog { tickers }
    }

    pub fn tickers(&self) -> &[TickerEntry] {
        &self.tickers
    }

    pub fn display_name(&self, symbol: &str) -> Option<&str> {
        self.tickers
            .iter()
            .find(|t| t.symbol == symbol)
            .map(|t| t.name.as_str())
    }

    // The unselected (empty) symbol sits before the first ticker in the cycle.
    fn slot_of(&self, symbol: &str) -> usize {
        self.tickers
            .iter()
            .position(|t| t.symbol == symbol)
            .map_or(0, |i| i + 1)
    }

    fn symbol_at_slot(&self, slot: usize) -> String {
        if slot == 0 {
            String::new()
        } else {
            self.tickers[slot - 1].symbol.clone()
        }
    }

    /// The symbol after `current`, wrapping through the unselected slot.
    pub fn next_symbol(&self, current: &str) -> String {
        let slots = self.tickers.len() + 1;
        self.symbol_at_slot((self.slot_of(current) + 1) % slots)
    }

    pub fn previous_symbol(&self, current: &str) -> String {
        let slots = self.tickers.len() + 1;
        self.symbol_at_slot((self.slot_of(current) + slots - 1) % slots)
    }
}

/// Chart colors indexed by breakdown position.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_hex(DEFAULT_PALETTE)
    }
}

impl Palette {
    pub fn from_hex<S: AsRef<str>>(entries: &[S]) -> Palette {
        let colors = entries
            .iter()
            .map(|hex| {
                hex.as_ref().parse::<Color>().unwrap_or_else(|_| {
                    tracing::warn!(color = hex.as_ref(), "invalid palette entry, using white");
                    Color::White
                })
            })
            .collect();
        Palette { colors }
    }

    pub fn color(&self, index: usize) -> Color {
        if self.colors.is_empty() {
            return Color::White;
        }
        self.colors[index % self.colors.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = Catalog::default();
        let symbols: Vec<&str> = catalog.tickers().iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "TSLA", "MSFT", "GOOG", "AMZN"]);
        assert_eq!(catalog.display_name("MSFT"), Some("Microsoft"));
        assert_eq!(catalog.display_name("NVDA"), None);
        assert_eq!(catalog.display_name(""), None);
    }

    #[test]
    fn test_symbol_cycle_includes_unselected() {
        let catalog = Catalog::default();
        assert_eq!(catalog.next_symbol(""), "AAPL");
        assert_eq!(catalog.next_symbol("AAPL"), "TSLA");
        assert_eq!(catalog.next_symbol("AMZN"), "");
        assert_eq!(catalog.previous_symbol(""), "AMZN");
        assert_eq!(catalog.previous_symbol("AAPL"), "");

        let mut symbol = String::new();
        for _ in 0..6 {
            symbol = catalog.next_symbol(&symbol);
        }
        assert_eq!(symbol, "");
    }

    #[test]
    fn test_palette_wraps() {
        let palette = Palette::default();
        assert_eq!(palette.color(0), Color::Rgb(0x4c, 0xaf, 0x50));
        assert_eq!(palette.color(5), palette.color(0));
        assert_eq!(palette.color(7), Color::Rgb(0xff, 0x98, 0x00));
    }

    #[test]
    fn test_invalid_palette_entry_falls_back() {
        let palette = Palette::from_hex(&["not-a-color"]);
        assert_eq!(palette.color(3), Color::White);
        assert_eq!(Palette::from_hex::<&str>(&[]).color(0), Color::White);
    }
}
