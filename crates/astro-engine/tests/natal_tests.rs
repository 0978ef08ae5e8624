mod common;

use astro_engine::chart::{ChartPatch, NatalChartCalculator};
use astro_engine::ephemeris::{Body, EphemerisFlags, HouseSystemCode, SwissEphemerisProvider};
use astro_engine::error::ErrorKind;
use astro_engine::houses::{house_from_cusps, whole_sign_house, HouseMode, HouseSystem};
use astro_engine::time::BirthData;
use astro_engine::zodiac::ZodiacSign;
use astro_engine::EphemerisContext;
use common::{context, SyntheticProvider};
use std::sync::Arc;

fn fixture_birth() -> BirthData {
    BirthData {
        day: 9,
        month: 9,
        year: 1988,
        hour: 16,
        minute: 21,
        latitude: 34.9984,
        longitude: -91.9837,
        utc_offset_hours: -5.0,
    }
}

#[test]
fn test_fixture_chart_is_complete_and_deterministic() {
    common::init_logging();
    let (ctx, _) = context(SyntheticProvider::new());
    let calculator = NatalChartCalculator::new(&ctx, HouseSystem::placidus());

    let first = calculator.compute(&fixture_birth()).unwrap();
    let second = calculator.compute(&fixture_birth()).unwrap();
    assert_eq!(first, second);

    assert_eq!(first.planets.len(), 10);
    assert_eq!(first.houses.len(), 12);
    first.verify().unwrap();
    for (i, cusp) in first.houses.iter().enumerate() {
        assert_eq!(cusp.house as usize, i + 1);
    }
    for planet in first.planets.values() {
        assert!((0.0..360.0).contains(&planet.longitude));
        assert!((1..=12).contains(&planet.house));
        assert_eq!(planet.sign, ZodiacSign::from_longitude(planet.longitude));
    }
}

#[test]
fn test_big_three_matches_placements() {
    let (ctx, _) = context(SyntheticProvider::new().with_ascendant(152.0));
    let chart = NatalChartCalculator::new(&ctx, HouseSystem::placidus())
        .compute(&fixture_birth())
        .unwrap();

    assert_eq!(chart.big_three.sun, chart.planets[&Body::Sun].sign);
    assert_eq!(chart.big_three.moon, chart.planets[&Body::Moon].sign);
    assert_eq!(chart.big_three.rising, ZodiacSign::Virgo);
    assert_eq!(chart.ascendant.formatted, "2°00' Virgo");
}

#[test]
fn test_whole_sign_houses_follow_ascendant_sign() {
    let (ctx, _) = context(SyntheticProvider::new().with_ascendant(152.0));
    let chart = NatalChartCalculator::new(&ctx, HouseSystem::whole_sign())
        .compute(&fixture_birth())
        .unwrap();

    assert_eq!(chart.house_system, HouseMode::WholeSign);
    assert_eq!(chart.houses[0].longitude, 150.0);
    assert_eq!(chart.houses[1].longitude, 180.0);
    assert_eq!(chart.houses[11].longitude, 120.0);
    for planet in chart.planets.values() {
        assert_eq!(planet.house, whole_sign_house(planet.longitude, 152.0));
    }
}

#[test]
fn test_provider_houses_use_cusp_boundaries() {
    let (ctx, _) = context(SyntheticProvider::new().with_ascendant(352.0));
    let chart = NatalChartCalculator::new(&ctx, HouseSystem::placidus())
        .compute(&fixture_birth())
        .unwrap();

    assert_eq!(chart.house_system, HouseMode::Provider(HouseSystemCode::Placidus));
    assert_eq!(chart.houses[0].longitude, 352.0);
    // Cusp 2 wraps past 0°
    assert_eq!(chart.houses[1].longitude, 20.0);

    let mut boundaries = [0.0; 12];
    for (i, cusp) in chart.houses.iter().enumerate() {
        boundaries[i] = cusp.longitude;
    }
    for planet in chart.planets.values() {
        assert_eq!(Some(planet.house), house_from_cusps(planet.longitude, &boundaries));
    }
}

#[test]
fn test_retrograde_flag_follows_speed() {
    let provider = SyntheticProvider::new().with_retrograde(Body::Mercury, -100_000.0, 100_000.0);
    let (ctx, _) = context(provider);
    let chart = NatalChartCalculator::new(&ctx, HouseSystem::placidus())
        .compute(&fixture_birth())
        .unwrap();

    assert!(chart.planets[&Body::Mercury].retrograde);
    assert!(chart.planets[&Body::Mercury].speed < 0.0);
    assert!(!chart.planets[&Body::Venus].retrograde);
}

#[test]
fn test_aspects_carry_applying_flag() {
    // Sun and moon one degree apart at the epoch
    let provider = SyntheticProvider::new()
        .with_body(Body::Sun, 100.0, 1.0)
        .with_body(Body::Moon, 99.0, 13.0);
    let (ctx, provider) = context(provider);
    let chart = NatalChartCalculator::new(&ctx, HouseSystem::placidus())
        .compute_at(provider.epoch, 40.0, -74.0)
        .unwrap();

    let conjunction = chart
        .aspects
        .iter()
        .find(|a| a.joins(Body::Sun, Body::Moon))
        .unwrap();
    assert_eq!(conjunction.applying, Some(true));
    assert!((conjunction.orb - 1.0).abs() < 1e-9);
}

#[test]
fn test_provider_failure_returns_no_chart() {
    let (ctx, _) = context(SyntheticProvider::new().failing_for(Body::Mars));
    let err = NatalChartCalculator::new(&ctx, HouseSystem::placidus())
        .compute(&fixture_birth())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EphemerisUnavailable);

    let (ctx, _) = context(SyntheticProvider::new().failing_houses());
    let err = NatalChartCalculator::new(&ctx, HouseSystem::whole_sign())
        .compute(&fixture_birth())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EphemerisUnavailable);
}

#[test]
fn test_non_finite_provider_output_is_rejected() {
    let (ctx, _) = context(SyntheticProvider::new().nan_for(Body::Moon));
    let err = NatalChartCalculator::new(&ctx, HouseSystem::placidus())
        .compute(&fixture_birth())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EphemerisUnavailable);
}

#[test]
fn test_whole_sign_ignores_unused_provider_cusps() {
    let (ctx, _) = context(SyntheticProvider::new().with_ascendant(152.0).nan_cusps());
    let chart = NatalChartCalculator::new(&ctx, HouseSystem::whole_sign())
        .compute(&fixture_birth())
        .unwrap();
    assert_eq!(chart.houses[0].longitude, 150.0);

    let err = NatalChartCalculator::new(&ctx, HouseSystem::placidus())
        .compute(&fixture_birth())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EphemerisUnavailable);
}

#[test]
fn test_invalid_birth_data_is_rejected() {
    let (ctx, provider) = context(SyntheticProvider::new());
    let calculator = NatalChartCalculator::new(&ctx, HouseSystem::placidus());

    let mut birth = fixture_birth();
    birth.month = 13;
    assert_eq!(calculator.compute(&birth).unwrap_err().kind(), ErrorKind::InvalidInput);

    let mut birth = fixture_birth();
    birth.latitude = 91.0;
    assert_eq!(calculator.compute(&birth).unwrap_err().kind(), ErrorKind::InvalidInput);

    // Rejected before any provider call
    assert_eq!(provider.position_calls(), 0);
}

#[test]
fn test_patch_is_all_or_nothing() {
    let (ctx, _) = context(SyntheticProvider::new().with_ascendant(152.0));
    let chart = NatalChartCalculator::new(&ctx, HouseSystem::placidus())
        .compute(&fixture_birth())
        .unwrap();

    let mut planets = chart.planets.clone();
    planets.remove(&Body::Pluto);
    let broken = ChartPatch {
        planets: Some(planets),
        ..ChartPatch::default()
    };
    let err = chart.apply_patch(broken).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ComputationInvariant);
    assert_eq!(chart.planets.len(), 10);

    let moved = ChartPatch {
        ascendant: Some(astro_engine::chart::Ascendant::new(200.0)),
        ..ChartPatch::default()
    };
    let patched = chart.apply_patch(moved).unwrap();
    assert_eq!(patched.big_three.rising, ZodiacSign::Libra);
    assert_eq!(chart.big_three.rising, ZodiacSign::Virgo);
    assert!(ChartPatch::default().is_empty());
}

#[test]
fn test_chart_serializes_camel_case() {
    let (ctx, _) = context(SyntheticProvider::new());
    let chart = NatalChartCalculator::new(&ctx, HouseSystem::whole_sign())
        .compute(&fixture_birth())
        .unwrap();
    let json = serde_json::to_value(&chart).unwrap();
    assert!(json.get("bigThree").is_some());
    assert!(json.get("julianDay").is_some());
    assert_eq!(json["planets"].as_object().unwrap().len(), 10);
}

#[test]
#[ignore] // Requires Swiss Ephemeris support compiled in
fn test_moshier_fixture_chart() {
    let ctx = EphemerisContext::with_flags(
        Arc::new(SwissEphemerisProvider::moshier()),
        EphemerisFlags::MOSEPH | EphemerisFlags::SPEED,
    );
    let chart = NatalChartCalculator::new(&ctx, HouseSystem::placidus())
        .compute(&fixture_birth())
        .unwrap();
    // 21:21 UTC, two days before the September 1988 new moon in Virgo
    assert_eq!(chart.big_three.sun, ZodiacSign::Virgo);
    assert_eq!(chart.big_three.moon, ZodiacSign::Virgo);
    assert_eq!(chart.big_three.rising, ZodiacSign::Capricorn);
    chart.verify().unwrap();
}
