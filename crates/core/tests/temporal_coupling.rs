//! Fine/daily coupling through a full gridded run
//!
//! Each scenario drives a tiny grid through `run` and checks where the daily
//! transition landed in the output arrays.

mod common;

use approx::assert_abs_diff_eq;
use common::{daily, four_per_day, site, weather};
use nfdrs_grid_core::{
    run, DatasetWeather, GridError, MoistureMode, OutputField, OutputResolution, RunConfig,
    NO_DATA,
};

/// Two cells in one column: cell 0 burnable with model V, cell 1 not burnable
fn two_cell_site() -> nfdrs_grid_core::GridDataset {
    site(2, 1, &[1.0, 0.0], &[1.0, 1.0])
}

#[test]
fn test_drought_index_moves_only_at_observation_hour() {
    let site = two_cell_site();
    let mut weather = DatasetWeather::new(weather(2, 1, &four_per_day(1)), None).unwrap();
    let mut daily = daily(2, 1, 1);

    let (grid, report) = run(
        &RunConfig::default(),
        &site,
        &mut weather,
        &mut daily,
        MoistureMode::Inline,
    )
    .unwrap();

    assert_eq!(grid.steps(), 4);
    let kbdi = |t| grid.value(OutputField::Kbdi, t, 0).unwrap();
    assert_eq!(kbdi(0), 100.0, "No daily update before 13:00");
    assert_eq!(kbdi(1), 100.0, "No daily update before 13:00");
    assert_eq!(kbdi(2), 14.0, "10 in of rain at 13:00 should drop KBDI 100 -> 14");
    assert_eq!(kbdi(3), kbdi(2), "Drought index carried after the update");

    for field in grid.fields() {
        for t in 0..grid.steps() {
            assert_eq!(
                grid.value(*field, t, 1),
                Some(NO_DATA),
                "Non-burnable cell must hold the sentinel in {field} at step {t}"
            );
        }
    }

    assert_eq!(report.daily_updates, 1);
    assert_eq!(report.active_cells, 1);
    assert_eq!(report.steps_per_day, 4);
    assert!(report.is_clean(), "Unexpected anomalies: {report:?}");
}

#[test]
fn test_one_update_per_day_over_several_days() {
    let site = two_cell_site();
    let mut weather = DatasetWeather::new(weather(2, 1, &four_per_day(3)), None).unwrap();
    let mut daily = daily(2, 1, 3);

    let (grid, report) = run(
        &RunConfig::default(),
        &site,
        &mut weather,
        &mut daily,
        MoistureMode::Inline,
    )
    .unwrap();

    assert_eq!(grid.steps(), 12);
    assert_eq!(report.daily_updates, 3);
    assert_eq!(report.days, 3);

    // KBDI only changes on observation-hour steps (t = 2, 6, 10)
    for t in 1..grid.steps() {
        let before = grid.value(OutputField::Kbdi, t - 1, 0).unwrap();
        let after = grid.value(OutputField::Kbdi, t, 0).unwrap();
        if t % 4 != 2 {
            assert_eq!(before, after, "KBDI changed off the observation hour at step {t}");
        }
    }
}

#[test]
fn test_missing_hour_suppresses_update() {
    let site = two_cell_site();
    let mut stamps = four_per_day(1);
    stamps[2].1 = f64::NAN;
    let mut weather = DatasetWeather::new(weather(2, 1, &stamps), None).unwrap();
    let mut daily = daily(2, 1, 1);

    let (grid, report) = run(
        &RunConfig::default(),
        &site,
        &mut weather,
        &mut daily,
        MoistureMode::Inline,
    )
    .unwrap();

    assert_eq!(report.daily_updates, 0);
    assert_eq!(report.missing_hour_steps, vec![2]);
    assert_eq!(report.days_without_update, vec![0]);
    assert!(!report.is_clean());
    for t in 0..4 {
        assert_eq!(grid.value(OutputField::Kbdi, t, 0), Some(100.0));
    }
}

#[test]
fn test_repeated_observation_hour_fires_once() {
    let site = two_cell_site();
    let stamps = [(1, 6.0), (1, 13.0), (1, 13.0), (1, 19.0)];
    let mut weather = DatasetWeather::new(weather(2, 1, &stamps), None).unwrap();
    let mut daily = daily(2, 1, 1);

    let (grid, report) = run(
        &RunConfig::default(),
        &site,
        &mut weather,
        &mut daily,
        MoistureMode::Inline,
    )
    .unwrap();

    assert_eq!(report.daily_updates, 1);
    assert_eq!(report.duplicate_observation_steps, vec![2]);
    assert_eq!(grid.value(OutputField::Kbdi, 1, 0), Some(14.0));
    assert_eq!(
        grid.value(OutputField::Kbdi, 2, 0),
        Some(14.0),
        "Second 13:00 step must not re-apply the rain"
    );
}

#[test]
fn test_configured_observation_hour() {
    let site = two_cell_site();
    let mut weather = DatasetWeather::new(weather(2, 1, &four_per_day(1)), None).unwrap();
    let mut daily = daily(2, 1, 1);
    let config = RunConfig {
        observation_hour: 6,
        ..RunConfig::default()
    };

    let (grid, report) = run(&config, &site, &mut weather, &mut daily, MoistureMode::Inline).unwrap();

    assert_eq!(report.daily_updates, 1);
    assert_eq!(grid.value(OutputField::Kbdi, 0, 0), Some(100.0));
    assert_eq!(grid.value(OutputField::Kbdi, 1, 0), Some(14.0));
}

#[test]
fn test_uneven_axes_rejected() {
    let site = two_cell_site();
    let stamps: Vec<(u32, f64)> = (0..10).map(|i| (1 + i / 4, f64::from(i % 4) * 6.0)).collect();
    let config = RunConfig::default().with_fixed_ratio(4);

    for days in [2, 3] {
        let mut weather = DatasetWeather::new(weather(2, 1, &stamps), None).unwrap();
        let mut daily = daily(2, 1, days);
        let err = run(&config, &site, &mut weather, &mut daily, MoistureMode::Inline).unwrap_err();
        assert!(
            matches!(err, GridError::Configuration(_)),
            "T=10 with R=4 must be a configuration error, got {err}"
        );
    }

    let mut weather = DatasetWeather::new(weather(2, 1, &stamps), None).unwrap();
    let mut daily = daily(2, 1, 4);
    let err = run(
        &RunConfig::default(),
        &site,
        &mut weather,
        &mut daily,
        MoistureMode::Inline,
    )
    .unwrap_err();
    assert!(matches!(err, GridError::Configuration(_)), "T=10, D=4: {err}");
}

#[test]
fn test_fixed_ratio_must_match_day_count() {
    let site = two_cell_site();
    let mut weather = DatasetWeather::new(weather(2, 1, &four_per_day(2)), None).unwrap();
    let mut daily = daily(2, 1, 2);

    let ok = run(
        &RunConfig::default().with_fixed_ratio(4),
        &site,
        &mut weather,
        &mut daily,
        MoistureMode::Inline,
    );
    assert!(ok.is_ok());

    let err = run(
        &RunConfig::default().with_fixed_ratio(2),
        &site,
        &mut weather,
        &mut daily,
        MoistureMode::Inline,
    )
    .unwrap_err();
    assert!(matches!(err, GridError::Configuration(_)));
}

#[test]
fn test_day_spanning_two_dates_rejected() {
    let site = two_cell_site();
    let stamps = [(1, 0.0), (1, 6.0), (2, 13.0), (2, 19.0)];
    let mut daily = daily(2, 1, 1);

    let mut checked = DatasetWeather::new(weather(2, 1, &stamps), None).unwrap();
    let err = run(
        &RunConfig::default(),
        &site,
        &mut checked,
        &mut daily,
        MoistureMode::Inline,
    )
    .unwrap_err();
    assert!(matches!(err, GridError::Configuration(_)));

    let mut unchecked = DatasetWeather::new(weather(2, 1, &stamps), None).unwrap();
    let config = RunConfig {
        check_calendar: false,
        ..RunConfig::default()
    };
    assert!(run(&config, &site, &mut unchecked, &mut daily, MoistureMode::Inline).is_ok());
}

#[test]
fn test_daily_resolution_samples_last_step() {
    let site = two_cell_site();
    let stamps = four_per_day(2);
    let mut daily_input = daily(2, 1, 2);

    let mut weather_fine = DatasetWeather::new(weather(2, 1, &stamps), None).unwrap();
    let (fine, _) = run(
        &RunConfig::default(),
        &site,
        &mut weather_fine,
        &mut daily_input,
        MoistureMode::Inline,
    )
    .unwrap();

    let mut weather_daily = DatasetWeather::new(weather(2, 1, &stamps), None).unwrap();
    let config = RunConfig::default().with_output_resolution(OutputResolution::Daily);
    let (coarse, report) = run(
        &config,
        &site,
        &mut weather_daily,
        &mut daily_input,
        MoistureMode::Inline,
    )
    .unwrap();

    assert_eq!(coarse.steps(), 2);
    assert_eq!(coarse.time_dim(), "day");
    assert_eq!(report.output_steps, 2);
    assert_eq!(coarse.unwritten(), 0);
    for field in coarse.fields() {
        for day in 0..2 {
            let expected = fine.value(*field, day * 4 + 3, 0).unwrap();
            let actual = coarse.value(*field, day, 0).unwrap();
            assert_abs_diff_eq!(expected, actual, epsilon = 1e-12);
        }
        assert_eq!(coarse.value(*field, 1, 1), Some(NO_DATA));
    }
}

#[test]
fn test_grid_mismatch_rejected() {
    let site = two_cell_site();
    let mut weather = DatasetWeather::new(weather(1, 3, &four_per_day(1)), None).unwrap();
    let mut daily = daily(2, 1, 1);

    let err = run(
        &RunConfig::default(),
        &site,
        &mut weather,
        &mut daily,
        MoistureMode::Inline,
    )
    .unwrap_err();
    assert!(matches!(err, GridError::Configuration(_)), "{err}");
}

#[test]
fn test_live_fuel_needs_min_fields() {
    let site = two_cell_site();
    let mut weather = DatasetWeather::new(weather(2, 1, &four_per_day(1)), None).unwrap();
    let mut bare = daily(2, 1, 1);
    bare.variables.remove("MinTemp");
    bare.variables.remove("MinRH");

    let err = run(
        &RunConfig::default(),
        &site,
        &mut weather,
        &mut bare,
        MoistureMode::Inline,
    )
    .unwrap_err();
    assert!(matches!(err, GridError::Configuration(_)));

    let config = RunConfig {
        live_fuel_moisture: false,
        ..RunConfig::default()
    };
    let (grid, _) = run(&config, &site, &mut weather, &mut bare, MoistureMode::Inline).unwrap();
    assert_eq!(grid.value(OutputField::Gsi, 3, 0), Some(0.0));
    assert_eq!(grid.value(OutputField::McHerb, 3, 0), Some(120.0));
    assert_eq!(grid.value(OutputField::McWood, 3, 0), Some(150.0));
}
