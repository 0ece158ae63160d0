use viewer::{Color, HeadlessConfig, HeadlessViewer, Scene, Viewer};

#[test]
fn figures_are_created_on_first_use() {
    let mut viewer = HeadlessViewer::default();
    viewer.figure("rewards").set_title("Rewards");
    viewer.figure("fsr").add_line("Left FSR");
    viewer.figure("rewards").add_line("upright");

    let names: Vec<_> = viewer.figures().iter().map(|f| f.name()).collect();
    assert_eq!(names, ["rewards", "fsr"]);
    assert_eq!(viewer.figures()[0].title(), Some("Rewards"));
    assert_eq!(viewer.figures()[0].lines().len(), 1);
}

#[test]
fn alive_until_frame_limit() {
    let mut viewer = HeadlessViewer::new(HeadlessConfig {
        max_frames: Some(3),
        log_interval: 1,
        ..Default::default()
    });
    viewer.figure("gyro").add_line("X Gyro");
    let mut frames = 0;
    while viewer.is_alive() {
        viewer.figure("gyro").push_data_to_line("X Gyro", 0.1).unwrap();
        viewer.render().unwrap();
        frames += 1;
        assert!(frames <= 3);
    }
    assert_eq!(frames, 3);
    assert_eq!(viewer.frames(), 3);
}

#[test]
fn unlimited_viewer_stays_alive() {
    let mut viewer = HeadlessViewer::default();
    for _ in 0..1000 {
        viewer.render().unwrap();
    }
    assert!(viewer.is_alive());
}

#[test]
fn keeps_the_latest_scene() {
    let mut viewer = HeadlessViewer::default();
    let mut scene = Scene::new([0.5, 0.3]);
    scene.segment([0.0, 0.0], [0.0, 0.3], Color::WHITE);
    viewer.update_scene(&scene);
    assert_eq!(viewer.scene(), &scene);

    viewer.update_scene(&Scene::default());
    assert!(viewer.scene().is_empty());
}
