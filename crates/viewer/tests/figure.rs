use viewer::{Color, Figure, ViewerError, DEFAULT_HISTORY};

#[test]
fn title_label_and_lines() {
    let mut figure = Figure::new("gyro");
    figure.set_title("Gyroscope").set_x_label("Step");
    figure.add_line("X Gyro").add_line("Y Gyro").add_line("Z Gyro");

    assert_eq!(figure.name(), "gyro");
    assert_eq!(figure.title(), Some("Gyroscope"));
    assert_eq!(figure.display_title(), "Gyroscope");
    assert_eq!(figure.x_label(), Some("Step"));
    let names: Vec<_> = figure.lines().iter().map(|l| l.name()).collect();
    assert_eq!(names, ["X Gyro", "Y Gyro", "Z Gyro"]);
    assert_eq!(figure.history(), DEFAULT_HISTORY);
}

#[test]
fn adding_a_line_twice_keeps_its_data() {
    let mut figure = Figure::new("fsr");
    figure.add_line("Left FSR");
    figure.push_data_to_line("Left FSR", 2.5).unwrap();
    figure.add_line("Left FSR");
    assert_eq!(figure.lines().len(), 1);
    assert_eq!(figure.line("Left FSR").unwrap().last(), Some(2.5));
}

#[test]
fn line_color_overrides_palette() {
    let mut figure = Figure::new("total_reward");
    figure.add_line("Total Reward");
    assert_eq!(figure.line("Total Reward").unwrap().color(), Color::palette(0));
    figure.line_color("Total Reward", Color::BLUE).unwrap();
    assert_eq!(figure.line("Total Reward").unwrap().color(), Color::rgb(0.0, 0.0, 1.0));
}

#[test]
fn unknown_lines_are_errors() {
    let mut figure = Figure::new("rewards");
    let err = figure.push_data_to_line("missing", 1.0).unwrap_err();
    match err {
        ViewerError::UnknownLine { figure, line } => {
            assert_eq!(figure, "rewards");
            assert_eq!(line, "missing");
        }
        #[allow(unreachable_patterns)]
        other => panic!("unexpected error: {other}"),
    }
    assert!(figure.line_color("missing", Color::RED).is_err());
}

#[test]
fn history_is_bounded_but_pushes_are_counted() {
    let mut figure = Figure::with_history("rewards", 3);
    figure.add_line("r");
    for value in 0..5 {
        figure.push_data_to_line("r", value as f32).unwrap();
    }
    let line = figure.line("r").unwrap();
    assert_eq!(line.samples().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
    assert_eq!(line.pushed(), 5);
}

#[test]
fn y_range_ignores_non_finite_samples() {
    let mut figure = Figure::new("f");
    assert_eq!(figure.y_range(), None);
    figure.add_line("a").add_line("b");
    figure.push_data_to_line("a", -1.5).unwrap();
    figure.push_data_to_line("a", f32::NAN).unwrap();
    figure.push_data_to_line("b", 4.0).unwrap();
    figure.push_data_to_line("b", f32::INFINITY).unwrap();
    assert_eq!(figure.y_range(), Some((-1.5, 4.0)));
}
