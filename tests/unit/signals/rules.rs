//! Unit tests for the signal rule table

use dailyta::models::SignalType;
use dailyta::signals::rules::HOLD_REASON;
use dailyta::signals::{evaluate_rules, CrossoverType, RuleInputs, RULES};

fn inputs(ema20: f64, ema50: f64, rsi14: f64, crossover: CrossoverType) -> RuleInputs {
    RuleInputs {
        ema20,
        ema50,
        rsi14,
        crossover,
    }
}

#[test]
fn test_rule_order() {
    let order: Vec<SignalType> = RULES.iter().map(|r| r.signal_type).collect();
    assert_eq!(
        order,
        vec![
            SignalType::Buy,
            SignalType::BuyWatch,
            SignalType::Sell,
            SignalType::SellWatch,
            SignalType::Sideway,
        ]
    );
}

#[test]
fn test_buy() {
    let (signal, reason) = evaluate_rules(&inputs(105.0, 100.0, 50.0, CrossoverType::Bullish));
    assert_eq!(signal, SignalType::Buy);
    assert_eq!(reason, "EMA20>EMA50 & MACD↑ & RSI>45");
}

#[test]
fn test_buy_needs_crossover() {
    let (signal, _) = evaluate_rules(&inputs(105.0, 100.0, 50.0, CrossoverType::None));
    assert_eq!(signal, SignalType::Hold);
}

#[test]
fn test_buy_watch_pullback() {
    let (signal, reason) = evaluate_rules(&inputs(105.0, 100.0, 35.0, CrossoverType::None));
    assert_eq!(signal, SignalType::BuyWatch);
    assert_eq!(reason, "EMA20>EMA50 & RSI<40 (pullback)");
}

#[test]
fn test_sell() {
    let (signal, reason) = evaluate_rules(&inputs(95.0, 100.0, 50.0, CrossoverType::Bearish));
    assert_eq!(signal, SignalType::Sell);
    assert_eq!(reason, "EMA20<EMA50 & MACD↓ & RSI<55");
}

#[test]
fn test_sell_watch_bounce() {
    let (signal, reason) = evaluate_rules(&inputs(95.0, 100.0, 65.0, CrossoverType::None));
    assert_eq!(signal, SignalType::SellWatch);
    assert_eq!(reason, "EMA20<EMA50 & RSI>60 (bounce)");
}

#[test]
fn test_sideway_is_checked_after_directional_rules() {
    // ema20 slightly above ema50 with a neutral RSI and no crossover
    let (signal, reason) = evaluate_rules(&inputs(100.5, 100.0, 50.0, CrossoverType::None));
    assert_eq!(signal, SignalType::Sideway);
    assert_eq!(reason, "EMA20≈EMA50 & RSI neutral");
}

#[test]
fn test_first_match_wins_over_sideway() {
    // Also inside the sideway band, but BUY comes first
    let (signal, _) = evaluate_rules(&inputs(100.5, 100.0, 50.0, CrossoverType::Bullish));
    assert_eq!(signal, SignalType::Buy);
}

#[test]
fn test_sideway_never_matches_zero_ema50() {
    let (signal, _) = evaluate_rules(&inputs(0.0, 0.0, 50.0, CrossoverType::None));
    assert_eq!(signal, SignalType::Hold);
}

#[test]
fn test_hold() {
    let (signal, reason) = evaluate_rules(&inputs(110.0, 100.0, 50.0, CrossoverType::None));
    assert_eq!(signal, SignalType::Hold);
    assert_eq!(reason, HOLD_REASON);
}
