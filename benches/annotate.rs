use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use wordwise_rs::{
    AnnotateOptions, Annotator, Dictionary, HintLevel, HintRecord, LemmaMap, Lexicon,
    annotate_document,
};

const VOCABULARY: &[&str] = &[
    "lantern", "warden", "workman", "chanting", "disunion", "wand", "harbour", "meadow",
    "thicket", "ember", "saddle", "quarrel", "whisper", "orchard", "lattice", "furrow",
];

const PHRASES: &[&str] = &["fresh water", "whole life insurance", "at dawn"];

fn build_lexicon() -> Lexicon {
    let records = VOCABULARY
        .iter()
        .chain(PHRASES)
        .enumerate()
        .map(|(idx, word)| HintRecord {
            word: (*word).to_string(),
            phoneme: None,
            primary: format!("gloss for {word}"),
            secondary: String::new(),
            hint_level: HintLevel::try_from((idx % 5) as u8 + 1).expect("level in range"),
        });
    let dictionary = Dictionary::from_records(records).expect("bench dictionary");
    let lemmas = LemmaMap::from_pairs([("wands", "wand"), ("lanterns", "lantern")]);
    Lexicon::new(dictionary, lemmas)
}

fn build_document(paragraphs: usize) -> String {
    let mut html = String::from("<html><head><title>Bench</title></head><body>");
    for idx in 0..paragraphs {
        let word = VOCABULARY[idx % VOCABULARY.len()];
        html.push_str(&format!(
            "<p class=\"c{idx}\">The {word} kept the lanterns lit, drank fresh water at dawn \
             and bought whole life insurance &mdash; twice.</p>"
        ));
    }
    html.push_str("</body></html>");
    html
}

fn bench_documents(c: &mut Criterion) {
    let lexicon = build_lexicon();
    for &paragraphs in &[10usize, 100, 1_000] {
        let html = build_document(paragraphs);
        c.bench_with_input(
            BenchmarkId::new("annotate_document", paragraphs),
            &html,
            |b, html| {
                let annotator = Annotator::new(&lexicon, AnnotateOptions::default());
                b.iter(|| {
                    let doc = annotate_document(black_box(html), &annotator);
                    black_box(doc.report);
                });
            },
        );
    }
}

fn bench_thresholds(c: &mut Criterion) {
    let lexicon = build_lexicon();
    let html = build_document(200);
    for level in 1..=5u8 {
        let hint_level = HintLevel::try_from(level).expect("level in range");
        c.bench_with_input(
            BenchmarkId::new("hint_level", level),
            &hint_level,
            |b, &hint_level| {
                let options = AnnotateOptions::new(hint_level, Default::default());
                let annotator = Annotator::new(&lexicon, options);
                b.iter(|| black_box(annotate_document(&html, &annotator).report));
            },
        );
    }
}

criterion_group!(benches, bench_documents, bench_thresholds);
criterion_main!(benches);
