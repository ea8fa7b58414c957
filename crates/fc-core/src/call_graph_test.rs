use super::*;

fn program(yaml: &str) -> Program {
    Program::from_yaml_str(yaml, "test.yml").unwrap()
}

#[test]
fn test_unresolved_calls() {
    let prog = program(
        r#"
functions:
  - name: top
    body:
      - assign: { target: a, value: { call: { function: helper, args: [] } } }
      - return: { call: { function: missing, args: [{ var: a }] } }
  - name: helper
    body:
      - return: { external: source }
"#,
    );
    let graph = CallGraph::build(&prog);
    assert_eq!(graph.unresolved_calls("top"), ["missing".to_string()]);
    assert!(graph.unresolved_calls("helper").is_empty());
    assert!(!graph.is_recursive("top"));
    assert!(!graph.is_recursive("helper"));
}

#[test]
fn test_mutual_recursion() {
    let prog = program(
        r#"
functions:
  - name: a
    body:
      - return: { call: { function: b } }
  - name: b
    body:
      - return: { call: { function: a } }
  - name: c
    body:
      - return: { call: { function: a } }
"#,
    );
    let graph = CallGraph::build(&prog);
    assert!(graph.is_recursive("a"));
    assert!(graph.is_recursive("b"));
    assert!(!graph.is_recursive("c"));
    assert_eq!(graph.cycle_path("a").unwrap(), "a -> b -> a");
    assert!(graph.cycle_path("c").is_none());
}

#[test]
fn test_self_recursion() {
    let prog = program(
        r#"
functions:
  - name: loop_forever
    body:
      - return: { call: { function: loop_forever } }
"#,
    );
    let graph = CallGraph::build(&prog);
    assert!(graph.is_recursive("loop_forever"));
    assert_eq!(
        graph.cycle_path("loop_forever").unwrap(),
        "loop_forever -> loop_forever"
    );
}

#[test]
fn test_cycle_path_stays_in_own_component() {
    let prog = program(
        r#"
functions:
  - name: a
    body:
      - assign: { target: x, value: { call: { function: a } } }
      - return: { call: { function: b } }
  - name: b
    body:
      - return: { call: { function: b } }
"#,
    );
    let graph = CallGraph::build(&prog);
    assert_eq!(graph.cycle_path("a").unwrap(), "a -> a");
    assert_eq!(graph.cycle_path("b").unwrap(), "b -> b");
}

#[test]
fn test_cycle_path_is_shortest() {
    let prog = program(
        r#"
functions:
  - name: a
    body:
      - assign: { target: x, value: { call: { function: b } } }
      - return: { call: { function: c } }
  - name: b
    body:
      - return: { call: { function: c } }
  - name: c
    body:
      - return: { call: { function: a } }
"#,
    );
    let graph = CallGraph::build(&prog);
    assert_eq!(graph.cycle_path("a").unwrap(), "a -> c -> a");
    assert_eq!(graph.cycle_path("b").unwrap(), "b -> c -> a -> b");
}
