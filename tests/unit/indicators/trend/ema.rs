//! Unit tests for EMA indicator

use signalwatch::indicators::trend::{ema_series, latest_ema};

#[test]
fn test_ema_empty_input() {
    assert!(ema_series(&[], 12).is_empty());
    assert!(latest_ema(&[], 12).is_none());
}

#[test]
fn test_ema_of_constant_series_is_constant() {
    let values = vec![42.5; 60];
    let ema = ema_series(&values, 12);
    assert_eq!(ema.len(), values.len());
    for v in ema {
        assert!((v - 42.5).abs() < 1e-12);
    }
}

#[test]
fn test_ema_seeded_with_first_value() {
    let ema = ema_series(&[10.0, 20.0], 3);
    assert_eq!(ema[0], 10.0);
    // k = 0.5
    assert!((ema[1] - 15.0).abs() < 1e-12);
}

#[test]
fn test_latest_ema_tracks_trend() {
    let values: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
    let ema = latest_ema(&values, 12).unwrap();
    assert!(ema < 149.0);
    assert!(ema > 130.0);
}
