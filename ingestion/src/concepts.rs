use lessonforge_core::model::Concept;

pub const CONCEPT_INDICATORS: [&str; 6] = [
    "is defined as",
    "refers to",
    "is a",
    "means",
    "is called",
    "is known as",
];

/// Pulls `term <indicator> definition` pairs out of single lines.
///
/// A line containing several indicators can yield several concepts. The term
/// loses any leading non-letters and the definition one trailing `.,:;`.
pub fn extract_concepts(text: &str) -> Vec<Concept> {
    let mut concepts = Vec::new();

    for line in text.lines().map(str::trim) {
        for indicator in CONCEPT_INDICATORS {
            let mut parts = line.split(indicator);
            let (Some(before), Some(after)) = (parts.next(), parts.next()) else {
                continue;
            };

            let term = before
                .trim()
                .trim_start_matches(|c: char| !c.is_ascii_alphabetic());
            let definition = after.trim();
            let definition = definition
                .strip_suffix(['.', ',', ':', ';'])
                .unwrap_or(definition);

            if term.chars().count() > 1 && definition.chars().count() > 5 {
                concepts.push(Concept {
                    id: concepts.len() as u32 + 1,
                    term: term.to_string(),
                    definition: definition.to_string(),
                });
            }
        }
    }

    concepts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_are_extracted() {
        let concepts = extract_concepts("  3) A set is defined as a collection of objects.\nnoise\n");
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].id, 1);
        assert_eq!(concepts[0].term, "A set");
        assert_eq!(concepts[0].definition, "a collection of objects");
    }

    #[test]
    fn short_parts_are_rejected() {
        assert!(extract_concepts("X means stuff").is_empty());
        assert!(extract_concepts("Union means short").is_empty());
        assert_eq!(extract_concepts("Union means joined sets").len(), 1);
    }

    #[test]
    fn overlapping_indicators_each_count() {
        let concepts = extract_concepts("A monoid is a set with an associative operation");
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].term, "A monoid");

        let concepts = extract_concepts("A ring is a structure that means business");
        let terms: Vec<&str> = concepts.iter().map(|c| c.term.as_str()).collect();
        assert_eq!(terms, vec!["A ring", "A ring is a structure that"]);
        assert_eq!(concepts[1].definition, "business");
        assert_eq!(concepts[1].id, 2);
    }
}
