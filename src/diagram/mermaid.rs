use super::{ColorClass, StoryGraph, StoryNode};

/// Fill/stroke/text colors per class, taken from the Tracker story-state
/// legend so the diagram reads like the Tracker board itself.
const CLASS_COLORS: [(ColorClass, &str, &str, &str); 5] = [
    (ColorClass::Grey, "#e0e2e5", "#c4c5c5", "#000"),
    (ColorClass::Blue, "#507bbd", "#2959a4", "#fff"),
    (ColorClass::Yellow, "#f5b04f", "#fc9d17", "#fff"),
    (ColorClass::Green, "#94c37f", "#5fa640", "#fff"),
    (ColorClass::Red, "#e87450", "#ec4d22", "#fff"),
];

pub fn mermaid_source(graph: &StoryGraph) -> String {
    let mut source = String::from("graph TD\n");
    for (class, fill, stroke, color) in CLASS_COLORS {
        source.push_str(&format!(
            "\tclassDef {name} fill:{fill},stroke:{stroke},color:{color};\n",
            name = class.as_str(),
        ));
    }
    source.push('\n');

    for node in &graph.nodes {
        source.push_str(&node_line(node));
    }
    for edge in &graph.edges {
        source.push_str(&format!("\t{} --> {}\n", edge.blocking, edge.blocked));
    }

    source
}

fn node_line(node: &StoryNode) -> String {
    // Double quotes inside a node label break the mermaid parser.
    let safe_name = node.name.replace('"', "'");
    format!(
        "\t{id}[\"{safe_name}\"]:::{class}\n",
        id = node.id,
        class = node.class.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use crate::diagram::build_story_graph;
    use crate::test_support::{story, story_with_blockers};
    use crate::tracker::StoryState;

    use super::mermaid_source;

    #[test]
    fn mermaid_source_declares_all_color_classes() {
        let source = mermaid_source(&build_story_graph(&[]));
        assert!(source.starts_with("graph TD\n"));
        for name in ["GREY", "BLUE", "YELLOW", "GREEN", "RED"] {
            assert!(
                source.contains(&format!("classDef {name} ")),
                "missing classDef for {name}"
            );
        }
    }

    #[test]
    fn mermaid_source_emits_nodes_with_state_class_and_blocker_edges() {
        let graph = build_story_graph(&[
            story(200, "Ship it", StoryState::Accepted),
            story_with_blockers(100, "Build it", StoryState::Started, &["after #200"]),
        ]);

        let source = mermaid_source(&graph);
        assert!(source.contains("\t100[\"Build it\"]:::BLUE\n"));
        assert!(source.contains("\t200[\"Ship it\"]:::GREEN\n"));
        assert!(source.contains("\t200 --> 100\n"));
    }

    #[test]
    fn mermaid_source_escapes_double_quotes_in_story_names() {
        let graph = build_story_graph(&[story(
            300,
            "Support \"quoted\" titles",
            StoryState::Planned,
        )]);

        let source = mermaid_source(&graph);
        assert!(source.contains("300[\"Support 'quoted' titles\"]:::GREY"));
    }

    #[test]
    fn mermaid_source_is_deterministic() {
        let stories = [
            story(5, "e", StoryState::Planned),
            story(3, "c", StoryState::Started),
            story(4, "d", StoryState::Accepted),
        ];
        let one = mermaid_source(&build_story_graph(&stories));
        let two = mermaid_source(&build_story_graph(&stories));
        assert_eq!(one, two);
    }
}
