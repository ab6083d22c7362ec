//! Stock-impact correlation: samples recent intraday behavior of the fixed
//! instrument basket and keeps only anomalous moves, so the correlation table
//! stays sparse and meaningful.

use crate::config::PipelineConfig;
use crate::domain::article::StockImpact;
use crate::domain::market::Candle;
use crate::market::quotes::QuoteProvider;

/// Fail closed below this sample depth: report zero change and zero spike.
const MIN_HISTORY_SAMPLES: usize = 24;
/// The "recent window" compared against everything preceding it.
const RECENT_WINDOW: usize = 12;

const PRICE_CHANGE_FLOOR: f64 = 0.005;
const VOLUME_SPIKE_FLOOR: f64 = 1.5;

/// Measured reaction of one instrument. Zeroes mean "nothing observable",
/// either genuinely or because the data was insufficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reaction {
    pub price_change: f64,
    pub volume_spike: f64,
}

impl Reaction {
    pub const NONE: Reaction = Reaction {
        price_change: 0.0,
        volume_spike: 0.0,
    };

    /// Sub-threshold moves are not persisted.
    pub fn is_anomalous(&self) -> bool {
        self.price_change.abs() > PRICE_CHANGE_FLOOR || self.volume_spike > VOLUME_SPIKE_FLOOR
    }
}

/// Split the sample into recent/baseline windows and measure the move.
pub fn measure_reaction(candles: &[Candle]) -> Reaction {
    if candles.len() < MIN_HISTORY_SAMPLES {
        return Reaction::NONE;
    }

    let split = candles.len() - RECENT_WINDOW;
    let (baseline, recent) = candles.split_at(split);

    let first_close = recent[0].close;
    let last_close = recent[recent.len() - 1].close;
    let price_change = if first_close != 0.0 {
        (last_close - first_close) / first_close
    } else {
        0.0
    };

    let baseline_mean = mean(baseline.iter().map(|c| c.volume));
    let volume_spike = if baseline_mean > 0.0 {
        mean(recent.iter().map(|c| c.volume)) / baseline_mean
    } else {
        // Zero baseline volume: avoid division by zero, treat as "no spike".
        1.0
    };

    Reaction {
        price_change,
        volume_spike,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

pub struct StockImpactCorrelator {
    symbols: Vec<String>,
}

impl StockImpactCorrelator {
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self {
            symbols: cfg.stock_symbols.clone(),
        }
    }

    /// Check the whole basket and return the anomalous reactions. Best-effort
    /// per instrument: a fetch failure degrades to no record for that symbol
    /// and the rest of the basket still runs.
    pub async fn correlate(&self, quotes: &dyn QuoteProvider) -> Vec<StockImpact> {
        let mut out = Vec::new();
        for symbol in &self.symbols {
            let reaction = match quotes.history(symbol).await {
                Ok(candles) => measure_reaction(&candles),
                Err(err) => {
                    tracing::warn!(symbol = %symbol, error = %err, "history fetch failed");
                    Reaction::NONE
                }
            };

            if reaction.is_anomalous() {
                out.push(StockImpact {
                    symbol: symbol.clone(),
                    price_change: reaction.price_change,
                    volume_spike: reaction.volume_spike,
                });
            }
        }
        out
    }
}
