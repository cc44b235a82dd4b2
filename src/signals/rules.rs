//! Ordered signal rule table

use crate::models::signal::SignalType;
use crate::signals::crossover::CrossoverType;

/// Inputs for one day once the required fields are known to be present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleInputs {
    pub ema20: f64,
    pub ema50: f64,
    pub rsi14: f64,
    pub crossover: CrossoverType,
}

impl RuleInputs {
    fn uptrend(&self) -> bool {
        self.ema20 > self.ema50
    }

    fn downtrend(&self) -> bool {
        self.ema20 < self.ema50
    }
}

pub struct Rule {
    pub signal_type: SignalType,
    pub reason: &'static str,
    pub predicate: fn(&RuleInputs) -> bool,
}

/// Evaluated top to bottom; the first matching rule wins.
pub const RULES: [Rule; 5] = [
    Rule {
        signal_type: SignalType::Buy,
        reason: "EMA20>EMA50 & MACD↑ & RSI>45",
        predicate: |i| i.uptrend() && i.crossover == CrossoverType::Bullish && i.rsi14 > 45.0,
    },
    Rule {
        signal_type: SignalType::BuyWatch,
        reason: "EMA20>EMA50 & RSI<40 (pullback)",
        predicate: |i| i.uptrend() && i.rsi14 < 40.0,
    },
    Rule {
        signal_type: SignalType::Sell,
        reason: "EMA20<EMA50 & MACD↓ & RSI<55",
        predicate: |i| i.downtrend() && i.crossover == CrossoverType::Bearish && i.rsi14 < 55.0,
    },
    Rule {
        signal_type: SignalType::SellWatch,
        reason: "EMA20<EMA50 & RSI>60 (bounce)",
        predicate: |i| i.downtrend() && i.rsi14 > 60.0,
    },
    Rule {
        signal_type: SignalType::Sideway,
        reason: "EMA20≈EMA50 & RSI neutral",
        predicate: |i| {
            i.ema50 != 0.0
                && (i.ema20 - i.ema50).abs() / i.ema50 < 0.01
                && (40.0..=60.0).contains(&i.rsi14)
        },
    },
];

pub const HOLD_REASON: &str = "No signal change";

/// First matching rule, or HOLD.
pub fn evaluate_rules(inputs: &RuleInputs) -> (SignalType, &'static str) {
    RULES
        .iter()
        .find(|rule| (rule.predicate)(inputs))
        .map(|rule| (rule.signal_type, rule.reason))
        .unwrap_or((SignalType::Hold, HOLD_REASON))
}
