use crate::overlay::Corner;
use anyhow::{bail, ensure, Context};
use log::LevelFilter;
use prompt_weave::{BracketPair, PromptMode, PromptTemplate};
use regex::Regex;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Looked up next to a missing configuration file and copied into its place.
pub const EXAMPLE_NAME: &str = ".config.example.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub file: FileConfig,
    pub text: TextConfig,
    pub icon: IconConfig,
    pub prompt: PromptConfig,
    pub providers: ProvidersConfig,
    pub logging: LoggingConfig,
    pub generation: GenerationConfig,
    pub display: DisplayConfig,
    /// `text.parse_brackets`, parsed.
    pub brackets: Vec<BracketPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub save_image: bool,
    pub external_image_location: PathBuf,
    pub generated_image_location: PathBuf,
    pub image_format: String,
    pub subjects_file: PathBuf,
    pub artists_file: PathBuf,
    pub prompts_file: PathBuf,
    pub subjects_example: PathBuf,
    pub artists_example: PathBuf,
    pub prompts_example: PathBuf,
    pub resize_external: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            save_image: true,
            external_image_location: "images/external".into(),
            generated_image_location: "images/generated".into(),
            image_format: "png".into(),
            subjects_file: "prompts/subjects.txt".into(),
            artists_file: "prompts/artists.txt".into(),
            prompts_file: "prompts/prompts.txt".into(),
            subjects_example: "prompts/subjects-example.txt".into(),
            artists_example: "prompts/artists-example.txt".into(),
            prompts_example: "prompts/prompts-example.txt".into(),
            resize_external: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub add_text: bool,
    /// Take title and artist of external images from their file names.
    pub parse_file_text: bool,
    pub parse_brackets: Vec<String>,
    pub preamble_regex: String,
    pub artist_regex: String,
    pub remove_text: Vec<String>,
    pub box_to_floor: bool,
    pub box_to_edge: bool,
    /// Distance of the artist line's baseline from the bottom edge.
    pub artist_loc: u32,
    pub artist_size: u32,
    pub title_loc: u32,
    pub title_size: u32,
    pub padding: u32,
    pub opacity: u8,
    pub override_text: bool,
    pub override_path: PathBuf,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            add_text: false,
            parse_file_text: false,
            parse_brackets: vec!["()".into(), "[]".into(), "{}".into()],
            preamble_regex: ".*- ".into(),
            artist_regex: " by ".into(),
            remove_text: vec![", digital art".into(), "A painting of".into()],
            box_to_floor: true,
            box_to_edge: true,
            artist_loc: 10,
            artist_size: 14,
            title_loc: 30,
            title_size: 20,
            padding: 10,
            opacity: 150,
            override_text: false,
            override_path: "prompts/override.txt".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub show_status_icon: bool,
    pub icon_corner: Corner,
    pub icon_padding: u32,
    pub icon_size: u32,
    pub icon_width: u32,
    pub icon_opacity: u8,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            show_status_icon: true,
            icon_corner: Corner::default(),
            icon_padding: 10,
            icon_size: 20,
            icon_width: 3,
            icon_opacity: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub mode: PromptMode,
    pub preamble: String,
    pub connector: String,
    pub postscript: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        let PromptTemplate {
            preamble,
            connector,
            postscript,
            mode,
            ..
        } = PromptTemplate::default();
        Self {
            mode,
            preamble,
            connector,
            postscript,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub external_amount: u32,
    pub historic_amount: u32,
    pub stability_amount: u32,
    pub dalle_amount: u32,
    pub automatic_amount: u32,
    pub provider_fallback: bool,
    /// Show the test image when nothing else works out.
    pub test_enabled: bool,
    pub test_file: PathBuf,
    pub automatic_host: String,
    pub automatic_port: u16,
    pub stability_host: String,
    pub dalle_host: String,
    pub stability_key: Option<String>,
    pub dalle_key: Option<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            external_amount: 0,
            historic_amount: 0,
            stability_amount: 0,
            dalle_amount: 0,
            automatic_amount: 0,
            provider_fallback: true,
            test_enabled: true,
            test_file: "images/test.png".into(),
            automatic_host: easel_api::automatic::DEFAULT_HOST.into(),
            automatic_port: easel_api::automatic::DEFAULT_PORT,
            stability_host: easel_api::stability::DEFAULT_HOST.into(),
            dalle_host: easel_api::dalle::DEFAULT_HOST.into(),
            stability_key: None,
            dalle_key: None,
        }
    }
}

impl ProvidersConfig {
    pub fn stability_key(&self) -> Option<String> {
        key(&self.stability_key, "STABILITY_KEY")
    }

    pub fn dalle_key(&self) -> Option<String> {
        key(&self.dalle_key, "DALLE_KEY")
    }
}

fn key(configured: &Option<String>, var: &str) -> Option<String> {
    configured
        .clone()
        .or_else(|| env::var(var).ok())
        .filter(|key| !key.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: "ink-easel.log".into(),
            log_level: LevelFilter::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Clockwise rotation of the frame on the display, in degrees.
    pub rotate: u16,
    pub infill: bool,
    pub infill_percent: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rotate: 0,
            infill: false,
            infill_percent: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            output: "frame.png".into(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    file: FileConfig,
    text: TextConfig,
    icon: IconConfig,
    prompt: PromptConfig,
    providers: ProvidersConfig,
    logging: LoggingConfig,
    generation: GenerationConfig,
    display: DisplayConfig,
}

impl Config {
    pub fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            preamble: self.prompt.preamble.clone(),
            connector: self.prompt.connector.clone(),
            postscript: self.prompt.postscript.clone(),
            mode: self.prompt.mode,
            brackets: self.brackets.clone(),
        }
    }

    /// Make every relative path relative to `base` instead of the working
    /// directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        let file = &mut self.file;
        for path in [
            &mut file.external_image_location,
            &mut file.generated_image_location,
            &mut file.subjects_file,
            &mut file.artists_file,
            &mut file.prompts_file,
            &mut file.subjects_example,
            &mut file.artists_example,
            &mut file.prompts_example,
            &mut self.text.override_path,
            &mut self.providers.test_file,
            &mut self.logging.log_file,
            &mut self.display.output,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Read the configuration at `path`, creating it from [`EXAMPLE_NAME`] in the
/// same directory if it does not exist yet.
pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    crate::sources::backup_file(path, path.with_file_name(EXAMPLE_NAME))?;
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut config = from_str(&s).with_context(|| format!("parsing {}", path.display()))?;
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

pub fn from_str(s: &str) -> anyhow::Result<Config> {
    let raw: RawConfig = toml::from_str(s)?;
    let brackets = raw
        .text
        .parse_brackets
        .iter()
        .map(|pair| match BracketPair::parse(pair) {
            Some(pair) => Ok(pair),
            None => bail!("{:?} is not a pair of bracket characters", pair),
        })
        .collect::<anyhow::Result<_>>()?;
    for pattern in [&raw.text.preamble_regex, &raw.text.artist_regex]
        .into_iter()
        .chain(&raw.text.remove_text)
    {
        Regex::new(pattern).with_context(|| format!("invalid pattern {:?}", pattern))?;
    }
    ensure!(
        (0.0..100.0).contains(&raw.generation.infill_percent),
        "infill_percent must be within [0, 100)"
    );
    ensure!(
        raw.generation.rotate % 90 == 0 && raw.generation.rotate < 360,
        "rotate must be one of 0, 90, 180 or 270"
    );
    ensure!(
        raw.display.width > 0 && raw.display.height > 0,
        "display size must not be zero"
    );
    Ok(Config {
        file: raw.file,
        text: raw.text,
        icon: raw.icon,
        prompt: raw.prompt,
        providers: raw.providers,
        logging: raw.logging,
        generation: raw.generation,
        display: raw.display,
        brackets,
    })
}
