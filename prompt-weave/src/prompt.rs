//! Prompt assembly.
//!
//! A prompt is either `preamble + subject + connector + artist + postscript`
//! or `preamble + prompt line + postscript`. Subject, artist and prompt lines
//! are drawn from weighted line lists and have their bracket groups resolved;
//! the resolved fragments double as the caption drawn on the frame.

use crate::{
    template::{expand_with, BracketPair, DEFAULT_BRACKETS},
    weighted, Result,
};
use rand::Rng;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    /// Either of the other modes, chosen anew for every prompt.
    #[default]
    Random,
    SubjectArtist,
    Prompt,
}

impl PromptMode {
    /// Settle [`PromptMode::Random`] on a concrete mode.
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        match self {
            PromptMode::Random => {
                if rng.gen_bool(0.5) {
                    PromptMode::SubjectArtist
                } else {
                    PromptMode::Prompt
                }
            }
            mode => mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub preamble: String,
    pub connector: String,
    pub postscript: String,
    pub mode: PromptMode,
    /// Bracket kinds resolved in drawn lines and affixes. Empty disables
    /// bracket templates altogether.
    pub brackets: Vec<BracketPair>,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            preamble: String::new(),
            connector: " by ".to_owned(),
            postscript: ", digital art, trending on artstation".to_owned(),
            mode: PromptMode::default(),
            brackets: DEFAULT_BRACKETS.to_vec(),
        }
    }
}

/// A finished prompt and the caption text it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub title: String,
    /// Empty unless built in [`PromptMode::SubjectArtist`].
    pub artist: String,
}

/// Line lists a [`PromptTemplate`] draws from.
#[derive(Debug, Clone, Copy)]
pub struct PromptSources<'a> {
    pub artists: &'a [String],
    pub subjects: &'a [String],
    pub prompts: &'a [String],
}

impl PromptTemplate {
    fn draw<R: Rng + ?Sized>(&self, lines: &[String], rng: &mut R) -> Result<String> {
        let line = weighted::random_line(lines, rng)?;
        Ok(expand_with(&line, &self.brackets, rng))
    }

    fn affix<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        expand_with(text, &self.brackets, rng)
    }

    /// Build a prompt in this template's mode.
    pub fn build<R: Rng + ?Sized>(&self, sources: PromptSources<'_>, rng: &mut R) -> Result<Prompt> {
        let mode = self.mode.resolve(rng);
        log::debug!("building prompt in {:?} mode", mode);
        match mode {
            PromptMode::SubjectArtist => {
                let (text, artist, title) =
                    build_subject_artist_prompt(sources.artists, sources.subjects, self, rng)?;
                Ok(Prompt {
                    text,
                    title,
                    artist,
                })
            }
            _ => {
                let (text, title) = build_normal_prompt(sources.prompts, self, rng)?;
                Ok(Prompt {
                    text,
                    title,
                    artist: String::new(),
                })
            }
        }
    }
}

/// Build `preamble + title + connector + artist + postscript`.
///
/// Returns `(prompt, artist_text, title_text)`.
pub fn build_subject_artist_prompt<R: Rng + ?Sized>(
    artists: &[String],
    subjects: &[String],
    template: &PromptTemplate,
    rng: &mut R,
) -> Result<(String, String, String)> {
    let artist = template.draw(artists, rng)?;
    let title = template.draw(subjects, rng)?;
    let prompt = [
        template.affix(&template.preamble, rng),
        title.clone(),
        template.affix(&template.connector, rng),
        artist.clone(),
        template.affix(&template.postscript, rng),
    ]
    .concat();
    Ok((prompt, artist, title))
}

/// Build `preamble + title + postscript`.
///
/// Returns `(prompt, title_text)`.
pub fn build_normal_prompt<R: Rng + ?Sized>(
    prompts: &[String],
    template: &PromptTemplate,
    rng: &mut R,
) -> Result<(String, String)> {
    let title = template.draw(prompts, rng)?;
    let prompt = [
        template.affix(&template.preamble, rng),
        title.clone(),
        template.affix(&template.postscript, rng),
    ]
    .concat();
    Ok((prompt, title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use rand::{rngs::StdRng, SeedableRng};
    use tokio_test::{assert_err, assert_ok};

    fn lines(lines: &[&str]) -> Vec<String> {
        lines.iter().copied().map(String::from).collect()
    }

    fn template() -> PromptTemplate {
        PromptTemplate {
            preamble: "Preamble".into(),
            connector: "Connector".into(),
            postscript: "Postscript".into(),
            ..Default::default()
        }
    }

    #[test]
    fn subject_artist() {
        let mut rng = StdRng::seed_from_u64(1);
        let (prompt, artist, title) = assert_ok!(build_subject_artist_prompt(
            &lines(&["Test Artist"]),
            &lines(&["Test Subject"]),
            &template(),
            &mut rng,
        ));
        assert_eq!(prompt, "PreambleTest SubjectConnectorTest ArtistPostscript");
        assert_eq!(artist, "Test Artist");
        assert_eq!(title, "Test Subject");
    }

    #[test]
    fn normal() {
        let mut rng = StdRng::seed_from_u64(1);
        let (prompt, title) = assert_ok!(build_normal_prompt(
            &lines(&["Test Prompt"]),
            &template(),
            &mut rng
        ));
        assert_eq!(prompt, "PreambleTest PromptPostscript");
        assert_eq!(title, "Test Prompt");
    }

    #[test]
    fn fragments_are_expanded() {
        let mut rng = StdRng::seed_from_u64(3);
        let template = PromptTemplate {
            postscript: "{, oil|0:, never}".into(),
            ..template()
        };
        let (prompt, artist, title) = assert_ok!(build_subject_artist_prompt(
            &lines(&["2:(Monet|0:Manet)", "0:Nobody"]),
            &lines(&["a [cat|0:dog]"]),
            &template,
            &mut rng,
        ));
        assert_eq!(artist, "Monet");
        assert_eq!(title, "a cat");
        assert_eq!(prompt, "Preamblea catConnectorMonet, oil");
    }

    #[test]
    fn brackets_can_be_disabled() {
        let mut rng = StdRng::seed_from_u64(3);
        let template = PromptTemplate {
            brackets: Vec::new(),
            ..template()
        };
        let (_, title) = assert_ok!(build_normal_prompt(
            &lines(&["keep (this|that)"]),
            &template,
            &mut rng
        ));
        assert_eq!(title, "keep (this|that)");
    }

    #[test]
    fn empty_sources_fail() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            assert_err!(build_subject_artist_prompt(
                &[],
                &lines(&["Test Subject"]),
                &template(),
                &mut rng
            )),
            Error::EmptyInput
        );
        assert_eq!(
            assert_err!(build_normal_prompt(&lines(&["0:none"]), &template(), &mut rng)),
            Error::EmptyInput
        );
    }

    #[test]
    fn random_mode_uses_both() {
        let mut rng = StdRng::seed_from_u64(9);
        let modes: Vec<_> = (0..100).map(|_| PromptMode::Random.resolve(&mut rng)).collect();
        assert!(modes.contains(&PromptMode::SubjectArtist));
        assert!(modes.contains(&PromptMode::Prompt));
        assert!(!modes.contains(&PromptMode::Random));
        assert_eq!(PromptMode::Prompt.resolve(&mut rng), PromptMode::Prompt);
    }

    #[test]
    fn build_follows_mode() {
        let mut rng = StdRng::seed_from_u64(5);
        let artists = lines(&["Artist"]);
        let subjects = lines(&["Subject"]);
        let prompts = lines(&["Prompt"]);
        let sources = PromptSources {
            artists: &artists,
            subjects: &subjects,
            prompts: &prompts,
        };
        let template = PromptTemplate {
            mode: PromptMode::SubjectArtist,
            ..template()
        };
        let prompt = assert_ok!(template.build(sources, &mut rng));
        assert_eq!(prompt.title, "Subject");
        assert_eq!(prompt.artist, "Artist");

        let template = PromptTemplate {
            mode: PromptMode::Prompt,
            ..template
        };
        let prompt = assert_ok!(template.build(sources, &mut rng));
        assert_eq!(prompt.text, "PreamblePromptPostscript");
        assert!(prompt.artist.is_empty());
    }
}
