use prompt_weave::{
    build_subject_artist_prompt, choose_with_fallback, parse_multiple_brackets, template, weighted,
    Error, PromptTemplate, DEFAULT_BRACKETS,
};
use rand::{rngs::StdRng, SeedableRng};
use tokio_test::{assert_err, assert_ok};

#[test]
fn weighted_pick_from_file_lines() {
    let lines = "5:Five\n1:One\n0:Zero\n";
    let expanded = weighted::expand(lines.lines());
    assert_eq!(expanded.len(), 6);
    assert_eq!(expanded.iter().filter(|l| *l == "Five").count(), 5);
    let mut rng = StdRng::seed_from_u64(0);
    for _ in 0..100 {
        let pick = assert_ok!(weighted::pick_random(&expanded, &mut rng));
        assert_ne!(pick, "Zero");
    }
}

#[test]
fn templates_in_subject_and_artist() {
    let mut rng = StdRng::seed_from_u64(0);
    let template = PromptTemplate {
        preamble: "A painting of ".into(),
        connector: " by ".into(),
        postscript: "".into(),
        ..Default::default()
    };
    let (prompt, artist, title) = assert_ok!(build_subject_artist_prompt(
        &["(Hokusai|0:nobody)".to_owned()],
        &["a {quiet|quiet} harbour".to_owned()],
        &template,
        &mut rng,
    ));
    assert_eq!(prompt, "A painting of a quiet harbour by Hokusai");
    assert_eq!(artist, "Hokusai");
    assert_eq!(title, "a quiet harbour");
}

#[test]
fn multi_bracket_resolution() {
    assert_eq!(
        parse_multiple_brackets(
            "Test(5:pass|0:fail|[pass|{pass|20:pass|0:fail}|0:fail])(1:pass|0:fail)",
            &["()", "[]", "{}"],
        ),
        "Testpasspass"
    );
    assert_eq!(
        template::expand("no groups | here", &DEFAULT_BRACKETS),
        "no groups | here"
    );
}

#[test]
fn provider_fallback_exhausts() {
    let mut rng = StdRng::seed_from_u64(0);
    let result = choose_with_fallback(&[("external", 1), ("historic", 1)], true, &mut rng, |_| false);
    assert_eq!(assert_err!(result), Error::AllProvidersExhausted);
}
