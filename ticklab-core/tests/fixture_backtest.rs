//! End-to-end replay of the pinned daily fixture.
//!
//! The fixture is a deterministic synthetic daily series in the provider's
//! newest-first CSV layout (1958 rows, 2004-08-19 .. 2012-02-20). Expected
//! figures were computed independently and are pinned here to catch any drift
//! in parsing, moving statistics, signal generation or accounting.

use std::path::PathBuf;

use ticklab_core::{
    Backtest, BollingerStrategy, OrderSide, PercentOfNotional, Position, PriceSeries, RawQuote,
};

const EPSILON: f64 = 1e-6;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/synthetic_daily.csv")
}

fn load_fixture() -> PriceSeries {
    let mut reader = csv::Reader::from_path(fixture_path()).expect("fixture readable");
    let raw: Vec<RawQuote> = reader
        .deserialize()
        .collect::<Result<_, _>>()
        .expect("fixture parses");
    PriceSeries::from_raw("GOOG", &raw).expect("fixture is a valid series")
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "{what}: actual={actual}, expected={expected}"
    );
}

#[test]
fn fixture_loads_in_chronological_order() {
    let series = load_fixture();
    assert_eq!(series.len(), 1958);
    assert_eq!(series.first_date().unwrap().to_string(), "2004-08-19");
    assert_eq!(series.last_date().unwrap().to_string(), "2012-02-20");
    assert_eq!(series.first().unwrap().close, 100.34);
    assert_eq!(series.last().unwrap().close, 448.76);
}

#[test]
fn moving_statistics_at_first_mature_tick() {
    let series = load_fixture();
    let tick = series.get(29).unwrap();
    assert_close(tick.moving_average(30), 110.82133333333333, "ma(29, 30)");
    assert_close(tick.moving_std_dev(30), 8.205085712870739, "std(29, 30)");
    assert!(series.get(28).unwrap().moving_average(30).is_nan());
}

#[test]
fn bollinger_30_1_summary() {
    let series = load_fixture();
    let mut bt = Backtest::new(&series).unwrap();
    bt.run(&mut BollingerStrategy::new(30, 1.0)).unwrap();

    assert_eq!(bt.trades().len(), 119);
    assert_eq!(bt.position(), Position::Long);
    assert_close(bt.gross_pnl(), -374.25, "gross");
    assert_close(bt.trade_cost().unwrap(), 0.0, "cost");
    assert_close(bt.net_pnl().unwrap(), 74.51, "net");
    assert_close(bt.passive_pnl(), 348.42, "passive");
}

#[test]
fn bollinger_30_1_first_trades() {
    let series = load_fixture();
    let mut bt = Backtest::new(&series).unwrap();
    bt.run(&mut BollingerStrategy::new(30, 1.0)).unwrap();

    let first: Vec<(OrderSide, usize)> = bt
        .trades()
        .iter()
        .take(4)
        .map(|t| (t.order, t.point.index()))
        .collect();
    assert_eq!(
        first,
        vec![
            (OrderSide::Sell, 36),
            (OrderSide::Buy, 100),
            (OrderSide::Buy, 101),
            (OrderSide::Sell, 167),
        ]
    );
}

#[test]
fn bollinger_30_1_point_in_time() {
    let series = load_fixture();
    let mut bt = Backtest::new(&series).unwrap();
    bt.run(&mut BollingerStrategy::new(30, 1.0)).unwrap();

    assert_eq!(bt.position_at(1000).unwrap(), Position::Short);
    assert_close(bt.gross_pnl_at(1000).unwrap(), 61.31, "gross@1000");
    assert_close(bt.net_pnl_at(1000).unwrap(), -53.91, "net@1000");

    // Nothing trades before the window matures.
    assert_eq!(bt.position_at(35).unwrap(), Position::Flat);
    assert_eq!(bt.gross_pnl_at(35).unwrap(), 0.0);
}

#[test]
fn bollinger_30_1_with_percent_cost() {
    let series = load_fixture();
    let mut bt = Backtest::new(&series).unwrap();
    bt.run(&mut BollingerStrategy::new(30, 1.0)).unwrap();
    bt.set_cost(PercentOfNotional::new(0.5));

    assert_close(bt.trade_cost().unwrap(), 97.43195, "cost");
    assert_close(bt.net_pnl().unwrap(), -22.92195, "net");
    // Gross ignores cost.
    assert_close(bt.gross_pnl(), -374.25, "gross");
}

#[test]
fn other_parameterisations() {
    let series = load_fixture();
    for (period, width, trades, net) in [(10, 1.0, 285, 23.63), (20, 2.0, 69, 206.69)] {
        let mut bt = Backtest::new(&series).unwrap();
        bt.run(&mut BollingerStrategy::new(period, width)).unwrap();
        assert_eq!(bt.trades().len(), trades, "trades for ({period}, {width})");
        assert_close(bt.net_pnl().unwrap(), net, "net");
    }
}

#[test]
fn replay_is_deterministic() {
    let series = load_fixture();
    let mut a = Backtest::new(&series).unwrap();
    let mut b = Backtest::new(&series).unwrap();
    a.run(&mut BollingerStrategy::new(30, 1.0)).unwrap();
    b.run(&mut BollingerStrategy::new(30, 1.0)).unwrap();

    assert_eq!(a.trades(), b.trades());
    assert_eq!(a.net_pnl().unwrap().to_bits(), b.net_pnl().unwrap().to_bits());
}
