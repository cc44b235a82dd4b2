//! Per-symbol signal classification over a window of indicator history.

use crate::models::signal::{IndicatorSnapshot, SignalRow};
use crate::signals::crossover::detect_crossover;
use crate::signals::rules::{evaluate_rules, RuleInputs};

pub struct SignalEngine;

impl SignalEngine {
    /// Classify every day of one symbol's indicator window.
    ///
    /// Days missing ema20, ema50, rsi14 or macd_signal are skipped (no row,
    /// not HOLD). Crossovers compare against the immediately preceding day of
    /// the window, whether or not that day was itself classifiable.
    pub fn detect_signals(symbol: &str, history: &[IndicatorSnapshot]) -> Vec<SignalRow> {
        let mut ordered: Vec<&IndicatorSnapshot> = history.iter().collect();
        ordered.sort_by_key(|s| s.trade_date);

        let mut out = Vec::new();
        for (i, current) in ordered.iter().enumerate() {
            let Some(inputs) = Self::rule_inputs(i.checked_sub(1).map(|p| ordered[p]), current)
            else {
                continue;
            };

            let (signal_type, reason) = evaluate_rules(&inputs);
            out.push(SignalRow {
                symbol: symbol.to_string(),
                trade_date: current.trade_date,
                signal_type,
                priority: signal_type.priority(),
                reason: reason.to_string(),
            });
        }

        out
    }

    fn rule_inputs(
        prior: Option<&IndicatorSnapshot>,
        current: &IndicatorSnapshot,
    ) -> Option<RuleInputs> {
        current.macd_signal?;
        Some(RuleInputs {
            ema20: current.ema20?,
            ema50: current.ema50?,
            rsi14: current.rsi14?,
            crossover: detect_crossover(prior, current),
        })
    }
}
