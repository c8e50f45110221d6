//! Render a [`TargetGraph`] in Graphviz DOT format.
//!
//! Declared targets are drawn as boxes and plain files as ellipses. Nodes and
//! edges follow build-file order so the output is stable between runs.

use super::TargetGraph;

/// Render every node and edge of `graph` as a DOT digraph.
///
/// # Examples
///
/// ```
/// use tsumiki::graph::{TargetGraph, dot};
///
/// let mut graph = TargetGraph::default();
/// let app = graph.declare_target("app").expect("declare");
/// graph.add_dependency(app, "main.c").expect("edge");
///
/// let rendered = dot::render(&graph);
/// assert!(rendered.contains("\"app\" -> \"main.c\";"));
/// ```
#[must_use]
pub fn render(graph: &TargetGraph) -> String {
    let mut out = String::from("digraph tsumiki {\n");
    for (_, node) in graph.iter() {
        let shape = if node.is_declared_target() {
            "box"
        } else {
            "ellipse"
        };
        out.push_str(&format!("    {} [shape={shape}];\n", quote(node.name())));
    }
    for (_, node) in graph.iter() {
        for dep in node.dependencies() {
            out.push_str(&format!(
                "    {} -> {};\n",
                quote(node.name()),
                quote(graph.node(*dep).name())
            ));
        }
    }
    out.push_str("}\n");
    out
}

fn quote(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for ch in name.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn renders_nodes_then_edges() {
        let mut graph = TargetGraph::default();
        let prog = graph.declare_target("prog").expect("declare");
        graph.add_dependency(prog, "main.o").expect("edge");
        graph.add_dependency(prog, "util.o").expect("edge");
        let main = graph.declare_target("main.o").expect("declare");
        graph.add_dependency(main, "main.c").expect("edge");

        insta::assert_snapshot!(render(&graph), @r#"
        digraph tsumiki {
            "prog" [shape=box];
            "main.o" [shape=box];
            "util.o" [shape=ellipse];
            "main.c" [shape=ellipse];
            "prog" -> "main.o";
            "prog" -> "util.o";
            "main.o" -> "main.c";
        }
        "#);
    }

    #[rstest]
    #[case("plain", "\"plain\"")]
    #[case("with space", "\"with space\"")]
    #[case("say\"hi\"", "\"say\\\"hi\\\"\"")]
    #[case("back\\slash", "\"back\\\\slash\"")]
    fn quote_escapes_specials(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(quote(name), expected);
    }
}
