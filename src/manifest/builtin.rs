use crate::manifest::model::{
    DiagramManifest, EdgeSpec, ModeFilter, Routing, StageSpec, StepPlan, StepSpec,
};

/// Element key of the label revealed at the end of every cycle.
pub const RANKING_LABEL: &str = "deterministic-ranking-label";

/// The document search pipeline shown on the portfolio page.
///
/// Two parallel branches leave segment annotation: a lexical one (tokenization, token
/// indexing) and a semantic one (element annotation, text segmentation, embeddings, vector
/// indexing) with a re-annotation loop from text segmentation back to segment annotation.
/// Both branches join at search.
pub fn nlp_pipeline() -> DiagramManifest {
    let stages = vec![
        StageSpec::new("document").at(0, 1),
        StageSpec::new("parsing")
            .with_element("box-document-parsing")
            .at(1, 1),
        StageSpec::new("segment-annotation").at(2, 1),
        StageSpec::new("tokenization").at(3, 0),
        StageSpec::new("token-indexing").at(4, 0),
        StageSpec::new("element-annotation").at(3, 2),
        StageSpec::new("text-segmentation").at(4, 2),
        StageSpec::new("generate-embeddings").at(4, 3),
        StageSpec::new("vector-indexing").at(5, 3),
        StageSpec::new("search").at(5, 1),
        StageSpec::new("ranking").at(6, 1),
    ];

    let wide = |id: &str, from: &str, to: &str, routing: Routing| {
        EdgeSpec::new(id, from, to, routing).only(ModeFilter::WideOnly)
    };
    let narrow = |id: &str, from: &str, to: &str, routing: Routing| {
        EdgeSpec::new(id, from, to, routing).only(ModeFilter::NarrowOnly)
    };

    use Routing::{BezierLoop, ElbowLeft, Straight};
    let edges = vec![
        wide("line-doc-parsing", "document", "parsing", Straight),
        wide("line-parsing-segment", "parsing", "segment-annotation", Straight),
        wide("line-segment-tokenization", "segment-annotation", "tokenization", ElbowLeft),
        wide("line-segment-element", "segment-annotation", "element-annotation", ElbowLeft),
        wide("line-token-indexing", "tokenization", "token-indexing", Straight),
        wide("line-element-text", "element-annotation", "text-segmentation", Straight),
        wide("line-text-embeddings", "text-segmentation", "generate-embeddings", Straight),
        wide("line-embeddings-vector", "generate-embeddings", "vector-indexing", Straight),
        wide("line-loop-back", "text-segmentation", "segment-annotation", BezierLoop),
        wide("line-token-search", "token-indexing", "search", Straight),
        wide("line-vector-search", "vector-indexing", "search", Straight),
        wide("line-search-ranking", "search", "ranking", Straight),
        narrow("line-doc-parsing-mobile", "document", "parsing", Straight),
        narrow("line-parsing-segment-mobile", "parsing", "segment-annotation", Straight),
        narrow("line-segment-tokenization-mobile", "segment-annotation", "tokenization", Straight),
        narrow("line-token-indexing-mobile", "tokenization", "token-indexing", Straight),
        narrow("line-token-search-mobile", "token-indexing", "search", Straight),
        narrow("line-segment-element-mobile", "segment-annotation", "element-annotation", Straight),
        narrow("line-element-text-mobile", "element-annotation", "text-segmentation", Straight),
        narrow("line-text-embeddings-mobile", "text-segmentation", "generate-embeddings", Straight),
        narrow("line-embeddings-vector-mobile", "generate-embeddings", "vector-indexing", Straight),
        narrow("line-loop-back-mobile", "text-segmentation", "segment-annotation", BezierLoop),
        narrow("line-vector-search-mobile", "vector-indexing", "search", Straight),
        narrow("line-search-ranking-mobile", "search", "ranking", Straight),
    ];

    let steps = StepPlan {
        wide: vec![
            StepSpec::reveal("document", &[]),
            StepSpec::reveal("parsing", &["line-doc-parsing"]),
            StepSpec::reveal("segment-annotation", &["line-parsing-segment"]),
            StepSpec::draw(&["line-segment-tokenization"]),
            StepSpec::reveal("tokenization", &[]),
            StepSpec::reveal("token-indexing", &["line-token-indexing"]),
            StepSpec::draw(&["line-segment-element"]),
            StepSpec::reveal("element-annotation", &[]),
            StepSpec::reveal("text-segmentation", &["line-element-text"]),
            StepSpec::draw(&["line-loop-back"]),
            StepSpec::reveal("generate-embeddings", &["line-text-embeddings"]),
            StepSpec::reveal("vector-indexing", &["line-embeddings-vector"]),
            StepSpec::reveal("search", &["line-token-search", "line-vector-search"]),
            StepSpec::reveal("ranking", &["line-search-ranking"]),
        ],
        narrow: vec![
            StepSpec::reveal("document", &[]),
            StepSpec::reveal("parsing", &["line-doc-parsing-mobile"]),
            StepSpec::reveal("segment-annotation", &["line-parsing-segment-mobile"]),
            StepSpec::reveal("tokenization", &["line-segment-tokenization-mobile"]),
            StepSpec::reveal("token-indexing", &["line-token-indexing-mobile"]),
            StepSpec::draw(&["line-token-search-mobile"]),
            StepSpec::reveal("element-annotation", &["line-segment-element-mobile"]),
            StepSpec::reveal("text-segmentation", &["line-element-text-mobile"]),
            StepSpec::draw(&["line-loop-back-mobile"]),
            StepSpec::reveal("generate-embeddings", &["line-text-embeddings-mobile"]),
            StepSpec::reveal("vector-indexing", &["line-embeddings-vector-mobile"]),
            StepSpec::draw(&["line-vector-search-mobile"]),
            StepSpec::reveal("search", &[]),
            StepSpec::reveal("ranking", &["line-search-ranking-mobile"]),
        ],
    };

    DiagramManifest {
        stages,
        edges,
        steps,
        label: Some(RANKING_LABEL.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/builtin.rs"]
mod tests;
