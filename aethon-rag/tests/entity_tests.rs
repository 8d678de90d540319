//! Fixture tests for the heuristic entity recognizer.

use aethon_rag::{EntityLabel, EntityRecognizer, HeuristicRecognizer};

const COMPANY_HISTORY: &str = "\
Apple Inc. is a technology company founded by Steve Jobs, Steve Wozniak, \
and Ronald Wayne in April 1976. The company is headquartered in Cupertino, \
California. Tim Cook has served as the chief executive since 2011.

Microsoft Corporation was founded by Bill Gates and Paul Allen in 1975. \
Microsoft is headquartered in Redmond, Washington. Satya Nadella leads \
the company today. Both Apple and Microsoft are among the most valuable \
companies in the United States.";

fn recognizer() -> HeuristicRecognizer {
    HeuristicRecognizer::new().expect("patterns compile")
}

#[test]
fn recognizes_organizations_by_suffix() {
    let entities = recognizer().extract(COMPANY_HISTORY, 20);
    let orgs: Vec<&str> = entities
        .iter()
        .filter(|e| e.label == EntityLabel::Org)
        .map(|e| e.text.as_str())
        .collect();
    assert!(orgs.contains(&"Apple Inc"));
    assert!(orgs.contains(&"Microsoft Corporation"));
}

#[test]
fn recognizes_full_names_as_people() {
    let entities = recognizer().extract(COMPANY_HISTORY, 20);
    let people: Vec<&str> = entities
        .iter()
        .filter(|e| e.label == EntityLabel::Person)
        .map(|e| e.text.as_str())
        .collect();
    for name in ["Steve Jobs", "Steve Wozniak", "Tim Cook", "Bill Gates", "Satya Nadella"] {
        assert!(people.contains(&name), "missing {name} in {people:?}");
    }
}

#[test]
fn infrequent_single_word_candidates_are_dropped() {
    let entities = recognizer().extract(COMPANY_HISTORY, 50);
    // "Cupertino" and "Redmond" appear once each; a lone capitalized word
    // needs to recur before it counts as an entity.
    assert!(entities.iter().all(|e| e.text != "Cupertino"));
    assert!(entities.iter().all(|e| e.text != "Redmond"));
}

#[test]
fn results_rank_by_count_and_respect_top_k() {
    let text = "Jane Roe met John Doe. Jane Roe called John Doe. Jane Roe left.";
    let entities = recognizer().extract(text, 10);
    assert_eq!(entities[0].text, "Jane Roe");
    assert_eq!(entities[0].count, 3);
    assert_eq!(entities[1].text, "John Doe");
    assert_eq!(entities[1].count, 2);

    let top_one = recognizer().extract(text, 1);
    assert_eq!(top_one.len(), 1);
    assert_eq!(top_one[0].text, "Jane Roe");
}

#[test]
fn extraction_is_deterministic() {
    let r = recognizer();
    assert_eq!(r.extract(COMPANY_HISTORY, 10), r.extract(COMPANY_HISTORY, 10));
}

#[test]
fn known_acronyms_are_organizations() {
    let entities = recognizer().extract("The FDA approved the drug. The FDA issued guidance.", 5);
    let fda = entities.iter().find(|e| e.text == "FDA").expect("FDA recognized");
    assert_eq!(fda.label, EntityLabel::Org);
    assert_eq!(fda.count, 2);
}

#[test]
fn denylisted_surfaces_never_appear() {
    let entities = recognizer().extract(COMPANY_HISTORY, 50);
    for banned in ["The", "Inc", "Corporation", "Company"] {
        assert!(entities.iter().all(|e| e.text != banned), "{banned} leaked through");
    }
}
