//! End-to-end behaviour of the detector and the extractor on synthetic pages

use lexscan::extract::ChunkKind;
use lexscan::{
    Config, Detector, DocumentType, ExtractOptions, Extractor, FailureKind, PageView, Profile,
};
use pretty_assertions::assert_eq;

fn html(title: &str, body: &str) -> String {
    format!("<html><head><title>{title}</title></head><body>{body}</body></html>")
}

fn sentence(i: usize) -> String {
    format!("Clause {i:03} explains how the service handles your account data.")
}

fn paragraphs(range: std::ops::Range<usize>) -> String {
    range.map(|i| format!("<p>{}</p>", sentence(i))).collect()
}

fn privacy_body() -> String {
    let mut body = String::from("<h1>Privacy Policy</h1>");
    for heading in [
        "Information We Collect",
        "How We Use Data",
        "Sharing With Third Parties",
        "Your Rights",
        "Governing Law",
    ] {
        body.push_str(&format!(
            "<h2>{heading}</h2><p>We collect personal information to run the service. \
             This privacy policy explains data processing, your rights and how third \
             parties receive data under the governing law of Delaware.</p>"
        ));
    }
    body
}

#[test]
fn scenario_a_privacy_policy() {
    let page = PageView::parse(
        "https://acme.com/privacy-policy",
        &html("Privacy Policy - Acme", &privacy_body()),
    );
    let result = Detector::new().classify(&page);

    assert!(result.is_legal_document);
    assert_eq!(result.document_type, Some(DocumentType::PrivacyPolicy));
    assert!(result.confidence >= 0.7);
    assert!(result.indicators.url_match);
    assert!(result.indicators.title_match);
    assert!(result.indicators.content_match);
    assert!(result.metadata.legal_phrase_count >= 4);
    assert_eq!(result.metadata.section_count, 6);
}

#[test]
fn scenario_b_blog_post_short_circuits() {
    let body = "<h1>10 Tips</h1><p>Wake up early. Drink water. Plan your day.</p>";
    let page = PageView::parse(
        "https://example.com/blog/my-post",
        &html("10 Tips for Productivity", body),
    );
    let result = Detector::new().classify(&page);

    assert!(!result.is_legal_document);
    assert!(result.short_circuited);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.document_type, None);
}

fn text_of_150_chars() -> String {
    "These terms govern your use of the service. "
        .repeat(4)
        .chars()
        .take(150)
        .collect()
}

#[test]
fn scenario_c_sufficiency_gate() {
    let body = format!("<p>{}</p>", text_of_150_chars());
    let mut extractor = Extractor::new();

    let remote = PageView::parse("https://acme.com/terms", &html("Terms", &body));
    let result = extractor.extract(&remote, &ExtractOptions::default());
    assert!(!result.success);
    assert_eq!(
        result.error.as_ref().map(|f| f.kind),
        Some(FailureKind::InsufficientContent)
    );

    for url in ["http://localhost:3000/terms", "https://example.com/test/terms"] {
        let local = PageView::parse(url, &html("Terms", &body));
        let result = extractor.extract(&local, &ExtractOptions::default());
        assert!(result.success, "{url} should use the relaxed threshold");
        let document = result.document.unwrap();
        assert_eq!(document.raw_text.chars().count(), 150);
    }
}

fn six_section_body() -> String {
    let mut body = String::new();
    for (i, title) in ["Acceptance", "Accounts", "Content", "Payments", "Termination", "Contact"]
        .iter()
        .enumerate()
    {
        body.push_str(&format!("<h2>{title}</h2>"));
        if i == 2 {
            body.push_str(&paragraphs(0..48));
        } else {
            body.push_str(&paragraphs(i * 10..i * 10 + 3));
        }
    }
    body
}

#[test]
fn scenario_d_oversized_section_is_split() {
    let page = PageView::parse("https://acme.com/terms", &html("Terms", &six_section_body()));
    let result = Extractor::new().extract(&page, &ExtractOptions::default());
    assert!(result.success);

    let document = result.document.as_ref().unwrap();
    assert_eq!(document.sections.len(), 6);
    assert!(document.sections[2].content.chars().count() >= 3000);

    let whole: Vec<_> = result
        .chunks()
        .iter()
        .filter(|c| c.kind == ChunkKind::Section)
        .collect();
    let parts: Vec<_> = result
        .chunks()
        .iter()
        .filter(|c| c.kind == ChunkKind::SectionPart)
        .collect();

    assert_eq!(whole.len(), 5);
    assert!(parts.len() >= 3);
    assert!(parts.iter().all(|c| c.char_len() <= 1000));
    assert!(parts.iter().all(|c| c.section_index == Some(2)));
    assert_eq!(parts[0].title.as_deref(), Some("Content (Part 1)"));
}

#[test]
fn detector_is_idempotent() {
    let page = PageView::parse(
        "https://acme.com/privacy-policy",
        &html("Privacy Policy - Acme", &privacy_body()),
    );
    let mut detector = Detector::new();

    let first = detector.classify(&page);
    let second = detector.classify(&page);
    assert_eq!(first, second);
    assert_eq!(detector.cache_len(), 1);
}

#[test]
fn chunks_cover_cleaned_text() {
    let page = PageView::parse("https://acme.com/terms", &html("Terms", &paragraphs(0..60)));
    let result = Extractor::new().extract(&page, &ExtractOptions::default());
    let document = result.document.as_ref().unwrap();

    let rebuilt = document
        .chunks
        .iter()
        .map(|c| c.fresh_text())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(rebuilt, document.cleaned_text);
}

#[test]
fn section_parts_cover_section_content() {
    let page = PageView::parse("https://acme.com/terms", &html("Terms", &six_section_body()));
    let result = Extractor::new().extract(&page, &ExtractOptions::default());
    let document = result.document.as_ref().unwrap();

    for (index, section) in document.sections.iter().enumerate() {
        let rebuilt = document
            .chunks
            .iter()
            .filter(|c| c.section_index == Some(index))
            .map(|c| c.fresh_text())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rebuilt, section.content);
    }
}

#[test]
fn chunk_sizes_are_bounded() {
    let page = PageView::parse("https://acme.com/terms", &html("Terms", &paragraphs(0..80)));
    let result = Extractor::new().extract(&page, &ExtractOptions::default());
    let chunks = result.chunks();

    let (_, rest) = chunks.split_last().unwrap();
    for chunk in rest {
        assert!((200..=1000).contains(&chunk.char_len()), "{} out of bounds", chunk.id);
    }
}

#[test]
fn url_match_only_increases_confidence() {
    let body = privacy_body();
    let with_url = PageView::parse("https://acme.com/privacy", &html("Acme", &body));
    let without_url = PageView::parse("https://acme.com/company", &html("Acme", &body));

    // same signature, so each page gets its own detector
    let with = Detector::new().classify(&with_url);
    let without = Detector::new().classify(&without_url);

    assert!(with.indicators.url_match);
    assert!(!without.indicators.url_match);
    assert!(with.confidence > without.confidence);
    assert!((with.confidence - without.confidence - 0.4).abs() < 1e-9);
}

#[test]
fn threshold_boundary_is_inclusive() {
    let body = "<p>We collect personal information when you register. \
                Third parties may process it under the governing law of Delaware.</p>";

    let url_and_content = PageView::parse("https://acme.com/terms", &html("Acme", body));
    let result = Detector::new().classify(&url_and_content);
    assert_eq!(result.confidence, 0.6);
    assert!(result.is_legal_document);

    let url_only = PageView::parse("https://acme.com/terms", &html("Acme", "<p>Hello.</p>"));
    let result = Detector::new().classify(&url_only);
    assert_eq!(result.confidence, 0.4);
    assert!(!result.is_legal_document);
}

#[test]
fn lax_profile_is_more_permissive() {
    let body = "<p>We collect personal information when you register. \
                Third parties may process it under the governing law of Delaware.</p>";
    let page = PageView::parse("https://acme.com/help", &html("Terms of Use", body));

    let strict = Config::for_profile(Profile::Strict);
    let lax = Config::for_profile(Profile::Lax);

    let result = Detector::with_config(strict.detector).classify(&page);
    assert_eq!(result.confidence, 0.5);
    assert!(!result.is_legal_document);

    let result = Detector::with_config(lax.detector).classify(&page);
    assert!(result.is_legal_document);
    assert_eq!(result.document_type, Some(DocumentType::TermsOfService));

    let medium = PageView::parse("https://acme.com/terms", &html("Terms", &paragraphs(0..12)));
    let strict_extract = Extractor::with_config(strict.extractor).extract(&medium, &ExtractOptions::default());
    let lax_extract = Extractor::with_config(lax.extractor).extract(&medium, &ExtractOptions::default());
    assert!(!strict_extract.success);
    assert!(lax_extract.success);
}

#[test]
fn deeply_nested_page_is_classified_and_extracted() {
    let depth = 3000;
    let body = format!(
        "{}{}{}",
        "<div>".repeat(depth),
        privacy_body(),
        "</div>".repeat(depth)
    );
    let page = PageView::parse(
        "http://localhost/privacy-policy",
        &html("Privacy Policy - Acme", &body),
    );

    let result = Detector::new().classify(&page);
    assert!(result.error.is_none());
    assert!(result.is_legal_document);

    let extraction = Extractor::new().extract(&page, &ExtractOptions::default());
    assert!(extraction.success);
    assert!(!extraction.chunks().is_empty());
}
