// Host-side tests for the show orchestrator: beat release, mute mode and
// restarts.

use rand::prelude::*;
use sculpture_core::{
    light_grid, CoreError, GridConfig, PatternTemplate, Show, ShowConfig, StereoFrame,
};

const DT: f32 = 1.0 / 60.0;

fn show() -> Show {
    Show::new(light_grid(&GridConfig::default()), ShowConfig::default(), 17).unwrap()
}

fn level(value: f32) -> StereoFrame {
    StereoFrame::mono(vec![value; 6])
}

#[test]
fn loud_frame_releases_a_pattern_on_next_render() {
    let mut show = show();
    let strength = show.on_spectrum(&level(1.3));
    assert!((strength - 1.3).abs() < 1e-6);
    assert!(show.release_pending());

    let ratios = show.frame(DT, 120.0);
    assert_eq!(ratios.len(), GridConfig::default().light_count());
    assert_eq!(show.accumulator().active_patterns().len(), 1);
}

#[test]
fn release_follows_the_decaying_hurdle() {
    let mut show = show();
    show.on_spectrum(&level(1.3));

    // silence decays the hurdle by 2/50, 3/50, 4/50...
    let expected = [(1.26, true), (1.20, true), (1.12, false)];
    for (strength, release) in expected {
        let got = show.on_spectrum(&level(0.0));
        assert!((got - strength).abs() < 1e-4, "strength {got}");
        assert_eq!(show.release_pending(), release, "at strength {got}");
    }
}

#[test]
fn quiet_show_releases_nothing() {
    let mut show = show();
    for _ in 0..30 {
        show.on_spectrum(&level(0.4));
        show.frame(DT, 120.0);
    }
    assert!(!show.release_pending());
    assert!(show.accumulator().active_patterns().is_empty());
    assert!(show.accumulator().intensity_ratios().iter().all(|&r| r == 0.0));
}

#[test]
fn muted_show_skips_analysis_and_releases_every_frame() {
    let mut show = show();
    show.set_muted(true);
    assert!(show.is_muted());
    assert_eq!(show.on_spectrum(&level(1.3)), 0.0);
    assert_eq!(show.detector().buffer().sample_count(), 0);

    for expected in 1..=3 {
        show.frame(DT, 120.0);
        assert_eq!(show.accumulator().active_patterns().len(), expected);
    }
    // default cap of three
    show.frame(DT, 120.0);
    assert_eq!(show.accumulator().active_patterns().len(), 3);
}

#[test]
fn pattern_target_raises_the_cap() {
    let mut show = show();
    show.set_muted(true);
    show.set_pattern_target(5);
    for _ in 0..10 {
        show.frame(DT, 120.0);
    }
    // nobody is past the grace period yet
    assert_eq!(show.accumulator().active_patterns().len(), 5);
}

#[test]
fn malformed_spectrum_keeps_previous_strength() {
    let mut show = show();
    show.on_spectrum(&level(0.7));
    let short = StereoFrame::mono(vec![5.0; 2]);
    assert!((show.on_spectrum(&short) - 0.7).abs() < 1e-6);
    assert_eq!(show.detector().buffer().sample_count(), 1);
}

#[test]
fn restart_clears_history_and_release() {
    let mut show = show();
    show.on_spectrum(&level(1.3));
    show.on_spectrum(&level(0.2));
    show.restart();
    assert!(!show.release_pending());
    assert_eq!(show.strength(), 0.0);
    assert_eq!(show.detector().buffer().sample_count(), 0);
    assert_eq!(show.detector().state().hurdle, None);
    assert_eq!(show.trigger().rolling_average(), 0.0);
}

#[test]
fn beat_starts_the_spin() {
    let mut show = show();
    show.frame(DT, 100.0);
    assert!(!show.spin().spinning);

    show.on_spectrum(&level(1.3));
    show.frame(DT, 100.0);
    assert!(show.spin().spinning);
    assert!(show.spin().speed > 0.0);
    assert!(show.spin().angle > 0.0);
}

#[test]
fn show_needs_a_template() {
    let result = Show::with_templates(
        light_grid(&GridConfig::default()),
        ShowConfig::default(),
        Vec::new(),
        StdRng::seed_from_u64(1),
    );
    assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
}

#[test]
fn custom_templates_are_used_for_release() {
    let templates = vec![PatternTemplate::sphere(40.0)];
    let mut show = Show::with_templates(
        light_grid(&GridConfig::default()),
        ShowConfig::default(),
        templates.clone(),
        StdRng::seed_from_u64(8),
    )
    .unwrap();
    assert_eq!(show.templates(), templates.as_slice());
    show.set_muted(true);
    show.frame(DT, 120.0);
    assert_eq!(
        show.accumulator().active_patterns()[0].shape,
        templates[0].shape()
    );
}
