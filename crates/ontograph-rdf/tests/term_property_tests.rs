use ontograph_rdf::{Term, TermKind};
use proptest::prelude::*;

fn iri_body() -> impl Strategy<Value = String> {
    // Bracket-free, whitespace-free bodies; includes scheme-like prefixes.
    "[a-zA-Z][a-zA-Z0-9:/_#.-]{0,40}"
}

fn literal_body() -> impl Strategy<Value = String> {
    // No quotes or backslashes; escape handling has dedicated unit tests.
    "[a-zA-Z0-9 _.-]{0,40}"
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn bracketed_bodies_are_iris(body in iri_body()) {
        let term = Term::new(format!("<{body}>"));
        prop_assert_eq!(term.kind(), Ok(TermKind::Iri));
        prop_assert_eq!(term.iri_text(), Some(body.as_str()));
    }

    #[test]
    fn labeled_blanks_are_blank(label in "[a-zA-Z0-9]{1,20}") {
        prop_assert_eq!(Term::new(format!("_:{label}")).kind(), Ok(TermKind::Blank));
    }

    #[test]
    fn quoted_bodies_are_literals(body in literal_body()) {
        prop_assert_eq!(Term::new(format!("\"{body}\"")).kind(), Ok(TermKind::Literal));
    }

    #[test]
    fn language_tagged_literals(body in literal_body(), lang in "[a-zA-Z]{2}(-[a-zA-Z0-9]{2,4})?") {
        prop_assert_eq!(
            Term::new(format!("\"{body}\"@{lang}")).kind(),
            Ok(TermKind::Literal)
        );
    }

    #[test]
    fn typed_literals(body in literal_body(), dt in iri_body()) {
        prop_assert_eq!(
            Term::new(format!("\"{body}\"^^<{dt}>")).kind(),
            Ok(TermKind::Literal)
        );
    }

    #[test]
    fn bare_words_never_validate(word in "[a-zA-Z][a-zA-Z0-9]{0,20}") {
        prop_assert!(Term::new(word).kind().is_err());
    }
}
