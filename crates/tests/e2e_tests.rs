//! End to end tests
#[cfg(test)]
mod e2e {
    use letterfall::config::main::Config;
    use letterfall::headless::{HeadlessOptions, HeadlessReport};

    fn workspace_dir() -> std::path::PathBuf {
        let output = std::process::Command::new(env!("CARGO"))
            .arg("locate-project")
            .arg("--workspace")
            .arg("--message-format=plain")
            .output()
            .unwrap()
            .stdout;
        let cargo_path = std::path::Path::new(std::str::from_utf8(&output).unwrap().trim());
        let workspace_dir = cargo_path.parent().unwrap().to_path_buf();
        tracing::debug!("Using workspace directory: {workspace_dir:?}");
        workspace_dir
    }

    fn letterfall_binary_path() -> std::path::PathBuf {
        workspace_dir().join("target/debug/letterfall")
    }

    // A font path that never exists, so that every run uses the built-in letter shapes whatever
    // fonts the machine has.
    fn config(seed: u64) -> Config {
        let mut config = Config::default();
        config.font_path = Some("/nonexistent/letterfall-test-font.ttf".into());
        config.physics.seed = Some(seed);
        config
    }

    async fn simulate(
        config: Config,
        frames: u32,
        snapshot: Option<std::path::PathBuf>,
    ) -> HeadlessReport {
        let mut options = HeadlessOptions::new(frames, 80, 60);
        options.snapshot = snapshot;
        letterfall::headless::run(config, options).await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn snapshot_is_the_size_of_the_canvas() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("frame.png");

        let report = simulate(config(1), 120, Some(path.clone())).await;
        assert_eq!(report.snapshot, Some(path.clone()));

        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (80, 60));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn letters_end_up_resting_on_the_floor() {
        let mut config = config(2);
        config.spawn_interval_ms = 500;
        let report = simulate(config, 600, None).await;

        assert!(report.spawned > 0);
        assert!(report.resting > 0, "{report:?}");
        assert!(report.resting <= report.live);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn population_never_exceeds_the_cap() {
        let mut config = config(3);
        config.spawn_interval_ms = 50;
        config.physics.population_cap = 5;
        let report = simulate(config, 300, None).await;

        assert!(report.spawned > 5);
        assert_eq!(report.live, 5);
        let newest = u64::try_from(report.spawned).unwrap() - 1;
        assert_eq!(report.live_ids, (newest - 4..=newest).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn same_seed_same_frames() {
        let directory = tempfile::tempdir().unwrap();
        let first_path = directory.path().join("first.png");
        let second_path = directory.path().join("second.png");

        let first = simulate(config(7), 200, Some(first_path.clone())).await;
        let second = simulate(config(7), 200, Some(second_path.clone())).await;

        assert_eq!(first.live_ids, second.live_ids);
        let first_image = image::open(&first_path).unwrap().to_rgba8();
        let second_image = image::open(&second_path).unwrap().to_rgba8();
        assert_eq!(first_image.as_raw(), second_image.as_raw());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn text_strategy_still_draws_letters() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("text.png");
        let mut config = config(4);
        config.render = letterfall_physics::RenderOptions::new(
            letterfall_physics::RenderStrategy::Text,
            letterfall_physics::Background::Trail,
        );

        simulate(config, 120, Some(path.clone())).await;

        let image = image::open(&path).unwrap().to_rgba8();
        let is_anything_drawn = image.pixels().any(|pixel| pixel.0[0] > 0);
        assert!(is_anything_drawn);
    }

    #[test]
    fn headless_binary_prints_a_summary() {
        let directory = tempfile::tempdir().unwrap();
        let output = std::process::Command::new(letterfall_binary_path())
            .arg("--headless")
            .args(["--frames", "30", "--width", "40", "--height", "30", "--seed", "5"])
            .arg("--font")
            .arg(directory.path().join("missing.ttf"))
            .arg("--config-dir")
            .arg(directory.path())
            .output()
            .unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(stdout.contains("Simulated 30 frames"), "{stdout}");
        assert!(directory.path().join("letterfall.toml").exists());
    }
}
