//! End-to-end tests of the frame processor on synthetic table scenes


use ball_table_tracker::{
    config::Config,
    constants::ALLOWED_LOST_FRAMES,
    orientation::DisplayRotation,
    processor::FrameProcessor,
    segmentation::PixelFormat,
    tracking::NormalizedPoint,
    DetectionFailure,
};
use opencv::{
    core::{Mat, Vec3b, CV_8UC1},
    prelude::*,
};
use test_helpers::{
    ball_scene, ball_scene_with_radius, create_test_image, ellipse_table_scene, empty_scene, frames_equal, pixel_for, table_scene,
    to_rgba, TABLE_CENTER,
};

/// Passthrough orientation for the default back camera
const UPRIGHT: DisplayRotation = DisplayRotation::Rotation90;

fn processor() -> FrameProcessor {
    FrameProcessor::new(&Config::default()).unwrap()
}

fn assert_near(actual: NormalizedPoint, expected: (i32, i32), tolerance: i32) {
    assert!(
        (actual.x - expected.0).abs() <= tolerance && (actual.y - expected.1).abs() <= tolerance,
        "expected about {:?}, got ({}, {})",
        expected,
        actual.x,
        actual.y
    );
}

fn count_pixels(frame: &Mat, rows: std::ops::Range<i32>, cols: std::ops::Range<i32>, bgr: [u8; 3]) -> usize {
    let mut count = 0;
    for row in rows {
        for col in cols.clone() {
            let px = *frame.at_2d::<Vec3b>(row, col).unwrap();
            if px[0] == bgr[0] && px[1] == bgr[1] && px[2] == bgr[2] {
                count += 1;
            }
        }
    }
    count
}

#[test]
fn test_centered_ball() {
    let mut processor = processor();
    let frame = ball_scene(TABLE_CENTER).unwrap();

    let report = processor.process_frame(&frame, UPRIGHT).unwrap();
    let point = report.detection.outcome.unwrap();
    assert_near(point, (1500, 1500), 10);

    assert!(report.position.detected);
    assert_eq!(report.position.frames_since_seen, ALLOWED_LOST_FRAMES - 1);
    assert_near(report.position.as_point(), (1500, 1500), 10);

    let table = report.detection.table.unwrap();
    assert!((table.center.x - TABLE_CENTER.0).abs() <= 1);
    assert!((table.center.y - TABLE_CENTER.1).abs() <= 1);

    // no status text when the ball was found
    assert_eq!(count_pixels(&report.annotated, 30..55, 50..120, [0, 0, 255]), 0);
}

#[test]
fn test_offset_ball_maps_to_table_coordinates() {
    let mut processor = processor();
    let frame = ball_scene(pixel_for((1750, 1300))).unwrap();

    let report = processor.process_frame(&frame, UPRIGHT).unwrap();
    assert_near(report.detection.outcome.unwrap(), (1750, 1300), 10);
}

#[test]
fn test_no_table() {
    let mut processor = processor();
    let frame = empty_scene().unwrap();

    let report = processor.process_frame(&frame, UPRIGHT).unwrap();
    assert_eq!(report.detection.outcome, Err(DetectionFailure::TableNotFound));
    assert!(report.detection.table.is_none());
    assert!(!report.position.detected);

    // red status text near the top left
    assert!(count_pixels(&report.annotated, 30..55, 50..250, [0, 0, 255]) > 0);
}

#[test]
fn test_table_too_small() {
    let mut processor = processor();
    let mut frame = empty_scene().unwrap();
    opencv::imgproc::circle(
        &mut frame,
        opencv::core::Point::new(320, 240),
        12,
        opencv::core::Scalar::new(200.0, 60.0, 20.0, 0.0),
        -1,
        opencv::imgproc::LINE_8,
        0,
    )
    .unwrap();

    let report = processor.process_frame(&frame, UPRIGHT).unwrap();
    assert_eq!(report.detection.outcome, Err(DetectionFailure::TableTooSmall));
}

#[test]
fn test_ball_not_found_draws_table() {
    let mut processor = processor();
    let frame = table_scene().unwrap();

    let report = processor.process_frame(&frame, UPRIGHT).unwrap();
    assert_eq!(report.detection.outcome, Err(DetectionFailure::BallNotFound));
    assert!(report.detection.table.is_some());
    assert!(!frames_equal(&report.annotated, &frame).unwrap());
    assert!(count_pixels(&report.annotated, 30..55, 50..250, [0, 0, 255]) > 0);
}

#[test]
fn test_ball_too_large() {
    let mut processor = processor();
    let frame = ball_scene_with_radius(TABLE_CENTER, 120).unwrap();

    let report = processor.process_frame(&frame, UPRIGHT).unwrap();
    assert_eq!(report.detection.outcome, Err(DetectionFailure::WrongBallSize));
}

#[test]
fn test_ball_outside_table_is_ignored() {
    let mut processor = processor();
    let mut frame = table_scene().unwrap();
    // red blob in the frame corner, off the table disk
    opencv::imgproc::circle(
        &mut frame,
        opencv::core::Point::new(40, 40),
        15,
        opencv::core::Scalar::new(30.0, 30.0, 220.0, 0.0),
        -1,
        opencv::imgproc::LINE_8,
        0,
    )
    .unwrap();

    let report = processor.process_frame(&frame, UPRIGHT).unwrap();
    assert_eq!(report.detection.outcome, Err(DetectionFailure::BallNotFound));
}

#[test]
fn test_ball_beyond_short_side_of_oval_table() {
    let mut processor = processor();
    let half_axes = (200, 60);

    let on_table = ellipse_table_scene(half_axes, Some(TABLE_CENTER)).unwrap();
    let seen = processor.process_frame(&on_table, UPRIGHT).unwrap().position;
    assert!(seen.detected);

    // inside the gate disk (radius about 130) but above the table's bounding box
    let above = ellipse_table_scene(half_axes, Some((TABLE_CENTER.0, TABLE_CENTER.1 - 100))).unwrap();
    let report = processor.process_frame(&above, UPRIGHT).unwrap();

    assert_eq!(report.detection.outcome, Err(DetectionFailure::WrongBallPosition));
    assert!(report.detection.ball.is_some());
    assert!(report.position.detected);
    assert_eq!(report.position.frames_since_seen, seen.frames_since_seen - 1);
    assert_eq!(report.position.x, seen.x);
    assert_eq!(report.position.y, seen.y);
}

#[test]
fn test_lost_ball_grace_window() {
    let mut processor = processor();
    let with_ball = ball_scene(pixel_for((1700, 1500))).unwrap();
    let without_ball = table_scene().unwrap();

    let seen = processor.process_frame(&with_ball, UPRIGHT).unwrap().position;
    assert!(seen.detected);

    for miss in 1..ALLOWED_LOST_FRAMES {
        let report = processor.process_frame(&without_ball, UPRIGHT).unwrap();
        assert_eq!(report.detection.outcome, Err(DetectionFailure::BallNotFound));
        assert!(report.position.detected, "lost too early after {miss} misses");
        // position holds while the ball is missing
        assert_eq!(report.position.x, seen.x);
        assert_eq!(report.position.y, seen.y);
    }

    let report = processor.process_frame(&without_ball, UPRIGHT).unwrap();
    assert!(!report.position.detected);
}

#[test]
fn test_smoothing_and_reacquisition() {
    let mut processor = processor();

    let first = processor.process_frame(&ball_scene(pixel_for((1500, 1500))).unwrap(), UPRIGHT).unwrap();
    let second = processor.process_frame(&ball_scene(pixel_for((1600, 1500))).unwrap(), UPRIGHT).unwrap();
    // alpha 0.5 halves the step
    assert!((second.position.x - (first.position.x + 50.0)).abs() <= 6.0);

    let without_ball = table_scene().unwrap();
    for _ in 0..ALLOWED_LOST_FRAMES {
        processor.process_frame(&without_ball, UPRIGHT).unwrap();
    }
    assert!(!processor.position().detected);

    // first sighting after losing the ball jumps without smoothing
    let back = processor.process_frame(&ball_scene(pixel_for((1200, 1800))).unwrap(), UPRIGHT).unwrap();
    assert!(back.position.detected);
    assert_near(back.position.as_point(), (1200, 1800), 10);
}

#[test]
fn test_malformed_frame_leaves_tracker_untouched() {
    let mut processor = processor();
    processor.process_frame(&ball_scene(TABLE_CENTER).unwrap(), UPRIGHT).unwrap();
    let before = processor.position();

    let gray = create_test_image(480, 640, CV_8UC1).unwrap();
    assert!(processor.process_frame(&gray, UPRIGHT).is_err());

    let returned = processor.process(&gray, UPRIGHT);
    assert!(frames_equal(&returned, &gray).unwrap());
    assert_eq!(processor.position(), before);

    let empty = Mat::default();
    let returned = processor.process(&empty, UPRIGHT);
    assert!(returned.empty());
    assert_eq!(processor.position(), before);
}

#[test]
fn test_rgba_frames() {
    let mut config = Config::default();
    config.camera.pixel_format = PixelFormat::Rgba;
    let mut processor = FrameProcessor::new(&config).unwrap();

    let frame = to_rgba(&ball_scene(pixel_for((1300, 1600))).unwrap()).unwrap();
    let report = processor.process_frame(&frame, UPRIGHT).unwrap();

    assert_eq!(report.annotated.channels(), 4);
    assert_near(report.detection.outcome.unwrap(), (1300, 1600), 10);
}

#[test]
fn test_rotated_frames_keep_input_size() {
    let mut processor = processor();
    let frame = ball_scene(TABLE_CENTER).unwrap();

    let report = processor.process_frame(&frame, DisplayRotation::Rotation0).unwrap();
    assert_eq!(report.annotated.size().unwrap(), frame.size().unwrap());
    assert_near(report.detection.outcome.unwrap(), (1500, 1500), 10);
}

#[test]
fn test_upside_down_display_flips_coordinates() {
    let mut processor = processor();
    let frame = ball_scene(pixel_for((1750, 1300))).unwrap();

    let report = processor.process_frame(&frame, DisplayRotation::Rotation270).unwrap();
    assert_near(report.detection.outcome.unwrap(), (1250, 1700), 10);
}

#[test]
fn test_reconfigure_swaps_colors() {
    let mut processor = processor();
    let frame = ball_scene(TABLE_CENTER).unwrap();

    // track the blue disk as the ball on a red table: nothing red is large enough
    let mut config = Config::default();
    std::mem::swap(&mut config.colors.table_lower, &mut config.colors.ball_lower);
    std::mem::swap(&mut config.colors.table_upper, &mut config.colors.ball_upper);
    processor.reconfigure(&config).unwrap();

    let report = processor.process_frame(&frame, UPRIGHT).unwrap();
    assert!(report.detection.outcome.is_err());
}
