use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use ink_easel::{
    config::{self, Config},
    display::PngDisplay,
    history::{self, Metadata},
    overlay::Status,
    Easel, Outcome, Provider, Request,
};
use rand::{rngs::StdRng, SeedableRng};
use std::{fs, path::Path};
use tempfile::{tempdir, TempDir};
use tokio_test::*;

fn red(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255])))
}

/// Write `toml` as the configuration of a fresh frame directory and load it.
fn setup(toml: &str) -> (TempDir, Config) {
    let dir = assert_ok!(tempdir());
    let path = dir.path().join(".config.toml");
    assert_ok!(fs::write(&path, toml));
    let config = assert_ok!(config::load(&path));
    (dir, config)
}

fn run(config: Config, request: &Request) -> (Outcome, DynamicImage) {
    let output = config.display.output.clone();
    let display = PngDisplay::new(config.display.width, config.display.height, &output);
    let mut easel = Easel::new(config, display);
    let mut rng = StdRng::seed_from_u64(7);
    let outcome = assert_ok!(block_on(easel.run(request, &mut rng)));
    let frame = assert_ok!(image::open(&output));
    (outcome, frame)
}

fn add_external(dir: &Path, name: &str, image: DynamicImage) {
    let folder = dir.join("images/external");
    assert_ok!(fs::create_dir_all(&folder));
    assert_ok!(image.save(folder.join(name)));
}

#[test]
fn external_image_with_caption() {
    let (dir, config) = setup(
        r#"
[text]
add_text = true
parse_file_text = true

[providers]
external_amount = 1

[display]
width = 200
height = 100
output = "out/frame.png"
"#,
    );
    add_external(dir.path(), "ink-easel - A cat by Monet.png", red(100, 50));

    let (outcome, frame) = run(config, &Request::default());
    assert_eq!(outcome.provider, Provider::External);
    assert_eq!(outcome.status, Status::External);
    assert_eq!(outcome.title, "A cat");
    assert_eq!(outcome.artist, "Monet");
    assert_eq!(outcome.saved, None);
    assert_eq!(frame.dimensions(), (200, 100));
    // Small images are centred, not enlarged.
    assert_eq!(frame.get_pixel(60, 30), Rgba([255, 0, 0, 255]));
    assert_eq!(frame.get_pixel(199, 0), Rgba([0, 0, 0, 255]));
    assert!(dir.path().join("out/frame.png").exists());
}

#[test]
fn external_image_kept_at_scale() {
    let (dir, config) = setup(
        r#"
[file]
resize_external = false

[icon]
show_status_icon = false

[providers]
external_amount = 1

[display]
width = 200
height = 100
"#,
    );
    add_external(dir.path(), "holiday.png", red(400, 100));

    let (outcome, frame) = run(config, &Request::default());
    assert_eq!(outcome.title, "");
    // Cropped to the middle rather than shrunk.
    assert_eq!(frame.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    assert_eq!(frame.get_pixel(199, 99), Rgba([255, 0, 0, 255]));
}

#[test]
fn rotated_display() {
    let (dir, config) = setup(
        r#"
[providers]
external_amount = 1

[generation]
rotate = 90

[display]
width = 200
height = 100
"#,
    );
    add_external(dir.path(), "holiday.png", red(100, 50));

    let (_, frame) = run(config, &Request::default());
    assert_eq!(frame.dimensions(), (200, 100));
}

#[test]
fn missing_images_fall_back_to_test_image() {
    let (_dir, config) = setup(
        r#"
[providers]
external_amount = 2
historic_amount = 1

[display]
width = 64
height = 32
"#,
    );
    let (outcome, frame) = run(config, &Request::default());
    assert_eq!(outcome.provider, Provider::Test);
    assert_eq!(outcome.status, Status::Fallback);
    assert_eq!(frame.dimensions(), (64, 32));
}

#[test]
fn missing_images_without_test_image_fail() {
    let (_dir, config) = setup(
        r#"
[providers]
external_amount = 1
test_enabled = false
"#,
    );
    let display = PngDisplay::new(10, 10, config.display.output.clone());
    let mut easel = Easel::new(config, display);
    let mut rng = StdRng::seed_from_u64(7);
    assert_err!(block_on(easel.run(&Request::default(), &mut rng)));
    assert!(!easel.display().path().exists());
}

#[test]
fn historic_image_uses_sidecar() {
    let (dir, config) = setup(
        r#"
[providers]
historic_amount = 1

[display]
width = 50
height = 50
"#,
    );
    let metadata = Metadata {
        prompt: "A lighthouse by Hokusai, digital art".into(),
        title: "A lighthouse".into(),
        artist: "Hokusai".into(),
        provider: "automatic".into(),
    };
    assert_ok!(history::save(
        &dir.path().join("images/generated"),
        &red(64, 64),
        "png",
        &metadata
    ));

    let (outcome, _) = run(config, &Request::default());
    assert_eq!(outcome.provider, Provider::Historic);
    assert_eq!(outcome.status, Status::Historic);
    assert_eq!(outcome.title, "A lighthouse");
    assert_eq!(outcome.artist, "Hokusai");
    assert_eq!(outcome.prompt.as_deref(), Some(metadata.prompt.as_str()));
}

#[test]
fn failed_generation_falls_back_to_test_image() {
    let (dir, config) = setup(
        r#"
[prompt]
mode = "prompt"

[providers]
automatic_host = "127.0.0.1"
automatic_port = 9

[display]
width = 32
height = 32
"#,
    );
    let prompts = dir.path().join("prompts");
    assert_ok!(fs::create_dir_all(&prompts));
    assert_ok!(fs::write(prompts.join("prompts-example.txt"), "a (red|blue) fox\n"));

    let request = Request {
        provider: Some(Provider::Automatic),
        ..Default::default()
    };
    let (outcome, _) = run(config, &request);
    assert_eq!(outcome.provider, Provider::Test);
    assert_eq!(outcome.saved, None);
    // The prompt file was set up from its example on the way.
    assert!(prompts.join("prompts.txt").exists());
}

#[test]
fn override_text_replaces_caption() {
    let (dir, config) = setup(
        r#"
[text]
add_text = true
parse_file_text = true
override_text = true

[providers]
external_amount = 1
"#,
    );
    add_external(dir.path(), "ink-easel - A cat by Monet.png", red(100, 50));
    assert_ok!(fs::create_dir_all(dir.path().join("prompts")));
    assert_ok!(fs::write(
        dir.path().join("prompts/override.txt"),
        "0:never\nHello\n"
    ));

    let (outcome, _) = run(config, &Request::default());
    assert_eq!(outcome.title, "Hello");
    assert_eq!(outcome.artist, "");
}

#[test]
fn configuration_created_from_example() {
    let dir = assert_ok!(tempdir());
    assert_ok!(fs::write(
        dir.path().join(config::EXAMPLE_NAME),
        include_str!("../.config.example.toml")
    ));
    let config = assert_ok!(config::load(dir.path().join(".config.toml")));
    assert!(dir.path().join(".config.toml").exists());
    assert_eq!(
        config.file.external_image_location,
        dir.path().join("images/external")
    );
}
