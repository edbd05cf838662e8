use closecast::models::arima::{ArimaModel, ArimaOrder};
use closecast::models::selection::{AutoArima, InformationCriterion, SelectionConfig};
use closecast::walk_forward::walk_forward;
use closecast::{FittedModel, ForecastModel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rstest::rstest;

fn random_walk(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let mut level = 100.0;
    (0..n)
        .map(|_| {
            level += normal.sample(&mut rng);
            level
        })
        .collect()
}

#[rstest]
#[case(ArimaOrder::new(0, 1, 0))]
#[case(ArimaOrder::new(1, 1, 0))]
#[case(ArimaOrder::new(0, 1, 1))]
#[case(ArimaOrder::new(2, 1, 2))]
fn test_arima_forecast_has_intervals(#[case] order: ArimaOrder) {
    let data = random_walk(150, 3);
    let fitted = ArimaModel::new(order).fit(&data).unwrap();
    let forecast = fitted.forecast(10).unwrap();

    assert_eq!(forecast.horizons(), 10);
    assert_eq!(forecast.intervals().len(), 10);
    assert_eq!(forecast.confidence_level(), 0.95);
    for (value, (lower, upper)) in forecast.values().iter().zip(forecast.intervals()) {
        assert!(value.is_finite());
        assert!(lower <= value && value <= upper);
    }
}

#[rstest]
#[case(InformationCriterion::Aic)]
#[case(InformationCriterion::Aicc)]
#[case(InformationCriterion::Bic)]
fn test_selection_then_walk_forward(#[case] criterion: InformationCriterion) {
    let data = random_walk(100, 11);
    let (train, test) = data.split_at(65);

    let config = SelectionConfig {
        information_criterion: criterion,
        trace: false,
        ..SelectionConfig::default()
    };
    let selection = AutoArima::new(config).unwrap().fit(train, 1).unwrap();
    let mut model = selection.model;

    let result = walk_forward(&mut model, test).unwrap();
    assert_eq!(result.forecasts.len(), test.len());
    assert!(result.forecasts.iter().all(|f| f.is_finite()));
    // The model has seen every test value afterwards
    assert_eq!(model.observations(), data.len());
}
