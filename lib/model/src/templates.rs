/// One entry of the query template catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    pub name: &'static str,
    pub query: &'static str,
}

/// The static template catalog shown in the query form.
///
/// The first entry is always the empty "No template" choice.
pub fn catalog() -> &'static [QueryTemplate] {
    &[
        QueryTemplate {
            name: "No template",
            query: "",
        },
        QueryTemplate {
            name: "Sample triples",
            query: "SELECT ?subject ?predicate ?object\nWHERE {\n  ?subject ?predicate ?object .\n}\nLIMIT 100",
        },
        QueryTemplate {
            name: "List classes",
            query: "SELECT DISTINCT ?class\nWHERE {\n  ?instance a ?class .\n}\nORDER BY ?class\nLIMIT 100",
        },
        QueryTemplate {
            name: "List predicates",
            query: "SELECT DISTINCT ?predicate\nWHERE {\n  ?subject ?predicate ?object .\n}\nORDER BY ?predicate\nLIMIT 100",
        },
        QueryTemplate {
            name: "Count triples",
            query: "SELECT (COUNT(*) AS ?triples)\nWHERE {\n  ?subject ?predicate ?object .\n}",
        },
        QueryTemplate {
            name: "Instances per class",
            query: "SELECT ?class (COUNT(?instance) AS ?instances)\nWHERE {\n  ?instance a ?class .\n}\nGROUP BY ?class\nORDER BY DESC(?instances)\nLIMIT 50",
        },
    ]
}
