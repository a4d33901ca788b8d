//! Template instantiation against incomplete chains.

use option_strategy_analytics::strategy::{
    InstrumentType, PayoffSettings, Strategy, StrategyError, find_template,
};
use strategy_tests::{chain, quote};

#[test]
fn test_template_degrades_instead_of_failing() {
    // 110 is only listed for the far month, so the near-month lookup misses.
    let mut chain = chain(
        &[80.0, 85.0, 90.0, 95.0, 100.0, 105.0, 115.0, 120.0],
        "near",
        "far",
    );
    chain.calls.push(quote(110.0, "far"));
    chain.puts.push(quote(110.0, "far"));

    let mut strategy = Strategy::new("IC", "SPY", Some(100.0)).unwrap();
    let warnings = strategy
        .apply_template(find_template("Iron Condor").unwrap(), &chain, 0.0)
        .unwrap();

    assert_eq!(strategy.legs().len(), 4);
    assert_eq!(warnings.len(), 1);
    let flagged = strategy.leg(warnings[0].leg_id).unwrap();
    assert!(flagged.estimated);
    assert_eq!(flagged.instrument_type, InstrumentType::Call);
    assert_eq!(flagged.strike, Some(105.0));
    assert!(strategy.analyze(&PayoffSettings::default()).is_ok());
}

#[test]
fn test_unusable_chain_fails_without_touching_strategy() {
    let chain = chain(&[f64::NAN], "near", "far");
    let mut strategy = Strategy::new("Keep", "SPY", Some(100.0)).unwrap();
    let before = strategy.clone();

    let result = strategy.apply_template(find_template("long_straddle").unwrap(), &chain, 0.0);
    assert!(matches!(result, Err(StrategyError::MissingMarketData(_))));
    assert_eq!(strategy, before);
}
