//! One refresh of the frame: pick where the picture comes from, get it,
//! fit it to the display, decorate it and show it.

use crate::{
    config::Config,
    display::{self, Display},
    history::{self, Metadata},
    overlay::{self, Status},
    sources::{self, TextParser},
};
use anyhow::{bail, Context};
use clap::ValueEnum;
use easel_api::{Automatic, Dalle, Stability};
use frame_geometry::{ops, rotate_dimensions};
use image::{DynamicImage, Rgba, RgbaImage};
use prompt_weave::{choose_with_fallback, weighted, Prompt, PromptMode, PromptSources, PromptTemplate};
use rand::Rng;
use std::{fmt, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Provider {
    /// A picture from the external image folder.
    External,
    /// A previously generated picture.
    Historic,
    Stability,
    Dalle,
    Automatic,
    /// The test image.
    Test,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::External => "external",
            Provider::Historic => "historic",
            Provider::Stability => "stability",
            Provider::Dalle => "dalle",
            Provider::Automatic => "automatic",
            Provider::Test => "test",
        }
    }

    pub fn status(self) -> Status {
        match self {
            Provider::External => Status::External,
            Provider::Historic => Status::Historic,
            Provider::Test => Status::Fallback,
            Provider::Stability | Provider::Dalle | Provider::Automatic => Status::Generated,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Overrides for a single refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub provider: Option<Provider>,
    /// Generate from this instead of a built prompt.
    pub prompt: Option<String>,
    /// Keep generated images, if the configuration allows it.
    pub save: bool,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            provider: None,
            prompt: None,
            save: true,
        }
    }
}

/// What ended up on the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub provider: Provider,
    pub status: Status,
    pub title: String,
    pub artist: String,
    pub prompt: Option<String>,
    pub saved: Option<PathBuf>,
}

struct Picture {
    image: DynamicImage,
    title: String,
    artist: String,
    prompt: Option<String>,
    saved: Option<PathBuf>,
    /// Centre as is rather than scaling to cover the display.
    keep_scale: bool,
}

impl Picture {
    fn new(image: DynamicImage) -> Self {
        Self {
            image,
            title: String::new(),
            artist: String::new(),
            prompt: None,
            saved: None,
            keep_scale: false,
        }
    }
}

pub struct Easel<D> {
    config: Config,
    display: D,
}

impl<D: Display> Easel<D> {
    pub fn new(config: Config, display: D) -> Self {
        Self { config, display }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn weights(&self) -> Vec<(Provider, u32)> {
        let providers = &self.config.providers;
        vec![
            (Provider::External, providers.external_amount),
            (Provider::Historic, providers.historic_amount),
            (Provider::Stability, providers.stability_amount),
            (Provider::Dalle, providers.dalle_amount),
            (Provider::Automatic, providers.automatic_amount),
        ]
    }

    /// Whether `provider` has what it needs: images to pick from, or a key.
    pub fn is_available(&self, provider: Provider) -> bool {
        let providers = &self.config.providers;
        match provider {
            Provider::External => {
                !sources::image_files(&self.config.file.external_image_location).is_empty()
            }
            Provider::Historic => {
                !sources::image_files(&self.config.file.generated_image_location).is_empty()
            }
            Provider::Stability => providers.stability_key().is_some(),
            Provider::Dalle => providers.dalle_key().is_some(),
            Provider::Automatic => true,
            Provider::Test => providers.test_enabled,
        }
    }

    /// Weighted choice among the configured providers, settling on the test
    /// image when none can be used and that is allowed.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> anyhow::Result<Provider> {
        let providers = &self.config.providers;
        match choose_with_fallback(&self.weights(), providers.provider_fallback, rng, |provider| {
            self.is_available(*provider)
        }) {
            Ok(provider) => Ok(provider),
            Err(e) if providers.test_enabled => {
                log::warn!("{}, showing the test image", e);
                Ok(Provider::Test)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn run<R: Rng + ?Sized>(
        &mut self,
        request: &Request,
        rng: &mut R,
    ) -> anyhow::Result<Outcome> {
        let rotate = self.config.generation.rotate;
        let (width, height) = self.display.size();
        let size = rotate_dimensions(width, height, rotate);
        let provider = match request.provider {
            Some(provider) => provider,
            None => self.select(rng)?,
        };
        log::info!("Using {} provider for a {}x{} frame", provider, size.0, size.1);

        let (provider, picture) = match self.picture(provider, request, size, rng).await {
            Ok(picture) => (provider, picture),
            Err(e) if provider != Provider::Test && self.config.providers.test_enabled => {
                log::error!("{} provider failed: {:#}", provider, e);
                (Provider::Test, self.test_picture(size))
            }
            Err(e) => return Err(e),
        };

        let mut frame = if picture.keep_scale {
            ops::pad_to(&picture.image, size, ops::BLACK)
        } else {
            ops::fit_to_display(&picture.image, size)
        };
        let (title, artist) = self.caption(picture.title, picture.artist, rng);
        let text = &self.config.text;
        if text.add_text {
            overlay::draw_caption(&mut frame, &title, &artist, text);
        }
        let status = provider.status();
        if self.config.icon.show_status_icon {
            overlay::draw_status_icon(&mut frame, status.shape(), &self.config.icon);
        }
        self.display.show(&display::rotate(frame, rotate))?;

        Ok(Outcome {
            provider,
            status,
            title,
            artist,
            prompt: picture.prompt,
            saved: picture.saved,
        })
    }

    async fn picture<R: Rng + ?Sized>(
        &self,
        provider: Provider,
        request: &Request,
        size: (u32, u32),
        rng: &mut R,
    ) -> anyhow::Result<Picture> {
        match provider {
            Provider::External => self.external_picture(size, rng),
            Provider::Historic => self.historic_picture(rng),
            Provider::Test => Ok(self.test_picture(size)),
            generator => self.generated_picture(generator, request, size, rng).await,
        }
    }

    fn text_parser(&self) -> anyhow::Result<TextParser> {
        let text = &self.config.text;
        Ok(TextParser::new(
            &text.preamble_regex,
            &text.artist_regex,
            &text.remove_text,
        )?)
    }

    fn external_picture<R: Rng + ?Sized>(
        &self,
        size: (u32, u32),
        rng: &mut R,
    ) -> anyhow::Result<Picture> {
        let file = &self.config.file;
        let path = sources::random_image(&file.external_image_location, rng)
            .context("no external images")?;
        log::info!("Showing external image {}", path.display());
        let image = image::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let image = if file.resize_external {
            ops::resize_image(&image, size)
        } else {
            image
        };
        let mut picture = Picture::new(image);
        if self.config.text.parse_file_text {
            (picture.title, picture.artist) = self.text_parser()?.title_and_artist(&path);
        }
        picture.keep_scale = true;
        Ok(picture)
    }

    fn historic_picture<R: Rng + ?Sized>(&self, rng: &mut R) -> anyhow::Result<Picture> {
        let path = sources::random_image(&self.config.file.generated_image_location, rng)
            .context("no generated images")?;
        log::info!("Showing historic image {}", path.display());
        let image = image::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let mut picture = Picture::new(image);
        match history::load(&path) {
            Some(metadata) => {
                picture.title = metadata.title;
                picture.artist = metadata.artist;
                picture.prompt = Some(metadata.prompt);
            }
            None => {
                (picture.title, picture.artist) = self.text_parser()?.title_and_artist(&path);
            }
        }
        Ok(picture)
    }

    /// The configured test image, or plain grey if it cannot be read.
    fn test_picture(&self, size: (u32, u32)) -> Picture {
        let path = &self.config.providers.test_file;
        let image = image::open(path).unwrap_or_else(|e| {
            log::warn!("Unable to open test image {}: {}", path.display(), e);
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                size.0,
                size.1,
                Rgba([128, 128, 128, 255]),
            ))
        });
        Picture::new(image)
    }

    fn build_prompt<R: Rng + ?Sized>(&self, rng: &mut R) -> anyhow::Result<Prompt> {
        let file = &self.config.file;
        let template = self.config.prompt_template();
        let mode = template.mode.resolve(rng);
        let (artists, subjects, prompts) = match mode {
            PromptMode::SubjectArtist => (
                sources::lines_with_backup(&file.artists_file, &file.artists_example)?,
                sources::lines_with_backup(&file.subjects_file, &file.subjects_example)?,
                Vec::new(),
            ),
            _ => (
                Vec::new(),
                Vec::new(),
                sources::lines_with_backup(&file.prompts_file, &file.prompts_example)?,
            ),
        };
        let template = PromptTemplate { mode, ..template };
        let sources = PromptSources {
            artists: &artists,
            subjects: &subjects,
            prompts: &prompts,
        };
        Ok(template.build(sources, rng)?)
    }

    async fn generated_picture<R: Rng + ?Sized>(
        &self,
        provider: Provider,
        request: &Request,
        size: (u32, u32),
        rng: &mut R,
    ) -> anyhow::Result<Picture> {
        let prompt = match &request.prompt {
            Some(text) => Prompt {
                text: text.clone(),
                title: text.clone(),
                artist: String::new(),
            },
            None => self.build_prompt(rng)?,
        };
        log::info!("Prompt: {}", prompt.text);

        let providers = &self.config.providers;
        let generation = &self.config.generation;
        let image = match provider {
            Provider::Stability => {
                let key = providers.stability_key().context("no Stability key")?;
                Stability::new(&providers.stability_host, key)
                    .generate(&prompt.text, size)
                    .await?
            }
            Provider::Dalle => {
                let key = providers.dalle_key().context("no OpenAI key")?;
                let dalle = Dalle::new(&providers.dalle_host, key);
                let image = dalle.generate(&prompt.text, size).await?;
                if generation.infill {
                    dalle
                        .infill(&prompt.text, &image, generation.infill_percent)
                        .await?
                } else {
                    image
                }
            }
            Provider::Automatic => {
                Automatic::new(&providers.automatic_host, providers.automatic_port)
                    .generate(&prompt.text, size)
                    .await?
            }
            other => bail!("{} does not generate images", other),
        };

        let file = &self.config.file;
        let saved = if file.save_image && request.save {
            let metadata = Metadata {
                prompt: prompt.text.clone(),
                title: prompt.title.clone(),
                artist: prompt.artist.clone(),
                provider: provider.to_string(),
            };
            match history::save(
                &file.generated_image_location,
                &image,
                &file.image_format,
                &metadata,
            ) {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("Unable to save generated image: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Picture {
            title: prompt.title,
            artist: prompt.artist,
            prompt: Some(prompt.text),
            saved,
            ..Picture::new(image)
        })
    }

    /// Caption text, replaced by a line of the override file when enabled.
    fn caption<R: Rng + ?Sized>(
        &self,
        title: String,
        artist: String,
        rng: &mut R,
    ) -> (String, String) {
        let text = &self.config.text;
        if !text.override_text {
            return (title, artist);
        }
        let line = sources::read_lines(&text.override_path)
            .and_then(|lines| Ok(weighted::random_line(&lines, rng)?));
        match line {
            Ok(line) => (line, String::new()),
            Err(e) => {
                log::warn!("Not overriding caption: {:#}", e);
                (title, artist)
            }
        }
    }
}
