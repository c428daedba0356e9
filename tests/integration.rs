use flowstep::graph::{Phase, Session, StepEvent};
use flowstep::presets::preset;
use flowstep::rpc::call_context::CallContext;
use flowstep::rpc::rpc_functions;
use flowstep::types::{Capacity, EdgeSpec, GraphSpec, NodeId};
use flowstep::FlowError;
use json::JsonValue;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Mutex;

fn ids(names: &[&str]) -> Vec<NodeId> {
    names.iter().map(|n| NodeId::from(*n)).collect()
}

fn preset_session(name: &str) -> Session {
    let mut session = Session::with_graph(preset(name).unwrap()).unwrap();
    session.initialize().unwrap();
    session
}

fn augmented_paths(events: &[StepEvent]) -> Vec<(Vec<NodeId>, Capacity)> {
    events
        .iter()
        .filter_map(|e| match e {
            StepEvent::Augmented {
                path, bottleneck, ..
            } => Some((path.clone(), *bottleneck)),
            _ => None,
        })
        .collect()
}

fn assert_valid_flow(session: &Session) {
    let network = session.network();
    for edge in network.edges() {
        assert!(edge.flow <= edge.capacity);
    }
    let source = network.source().unwrap();
    let sink = network.sink().unwrap();
    for node in network.nodes() {
        if node != source && node != sink {
            assert_eq!(network.inflow(node), network.outflow(node), "at {node}");
        }
    }
    assert_eq!(
        network.outflow(source) - network.inflow(source),
        session.max_flow_value()
    );
}

#[test]
fn simple_scenario() {
    let mut session = preset_session("simple");

    assert_eq!(
        session.step().unwrap(),
        StepEvent::PathFound {
            path: ids(&["s", "a", "t"]),
            bottleneck: 10
        }
    );
    assert_eq!(session.state(), Phase::PathFound);
    assert_eq!(session.current_path(), &ids(&["s", "a", "t"])[..]);
    assert!(matches!(
        session.step().unwrap(),
        StepEvent::Augmented {
            max_flow: 10,
            path_count: 1,
            ..
        }
    ));
    assert_eq!(
        session.step().unwrap(),
        StepEvent::PathFound {
            path: ids(&["s", "b", "t"]),
            bottleneck: 5
        }
    );
    session.step().unwrap();
    assert_eq!(
        session.step().unwrap(),
        StepEvent::Complete { max_flow: 15 }
    );
    assert_eq!(session.state(), Phase::Complete);
    assert_eq!(session.path_count(), 2);
    assert_eq!(session.history().len(), 2);
    assert_valid_flow(&session);

    let flows = session
        .network()
        .edges()
        .iter()
        .map(|e| e.flow)
        .collect::<Vec<_>>();
    assert_eq!(flows, vec![10, 5, 10, 5]);
}

#[test]
fn medium_scenario_uses_cross_edge() {
    let mut session = preset_session("medium");
    let events = session.run_to_completion(100).unwrap();
    assert_eq!(events.last(), Some(&StepEvent::Complete { max_flow: 23 }));

    let paths = augmented_paths(&events);
    assert_eq!(
        paths,
        vec![
            (ids(&["s", "a", "b", "t"]), 12),
            (ids(&["s", "c", "d", "t"]), 4),
            (ids(&["s", "c", "d", "b", "t"]), 7),
        ]
    );
    let (d, b) = (NodeId::from("d"), NodeId::from("b"));
    assert!(paths
        .iter()
        .any(|(path, _)| path.windows(2).any(|w| w[0] == d && w[1] == b)));
    assert_valid_flow(&session);
}

#[test]
fn other_presets() {
    for (name, expected) in [("complex", 19), ("dense", 16)] {
        let mut session = preset_session(name);
        let events = session.run_to_completion(200).unwrap();
        assert_eq!(
            events.last(),
            Some(&StepEvent::Complete { max_flow: expected }),
            "{name}"
        );
        assert_valid_flow(&session);
    }
}

#[test]
fn step_before_initialize() {
    let mut session = Session::with_graph(preset("simple").unwrap()).unwrap();
    assert_eq!(session.step(), Err(FlowError::NotInitialized));
    assert_eq!(session.state(), Phase::Idle);
    assert_eq!(session.max_flow_value(), 0);
    assert!(session.network().edges().iter().all(|e| e.flow == 0));

    assert_eq!(Session::new().initialize(), Err(FlowError::NoGraphLoaded));
}

#[test]
fn load_rejects_undeclared_node() {
    let mut session = preset_session("simple");
    session.step().unwrap();
    let result = session.load(ids(&["s", "t"]), vec![EdgeSpec::new("s", "z", 3)]);
    assert!(matches!(result, Err(FlowError::InvalidGraph(_))));
    // The previous graph and its progress stay in place.
    assert_eq!(session.network().node_count(), 4);
    assert_eq!(session.state(), Phase::PathFound);
}

#[test]
fn reset_reproduces_run() {
    let mut session = preset_session("medium");
    let first = session.run_to_completion(100).unwrap();

    session.reset();
    assert_eq!(session.state(), Phase::Idle);
    assert_eq!(session.max_flow_value(), 0);
    assert_eq!(session.path_count(), 0);
    assert!(session.history().is_empty());
    assert!(session.current_path().is_empty());
    assert_eq!(session.current_residual(&"s".into(), &"a".into()), 0);

    session.initialize().unwrap();
    let second = session.run_to_completion(100).unwrap();
    assert_eq!(first, second);
}

#[test]
fn initialize_restarts_finished_run() {
    let mut session = preset_session("dense");
    session.run_to_completion(200).unwrap();
    session.initialize().unwrap();
    assert_eq!(session.state(), Phase::Ready);
    assert_eq!(session.max_flow_value(), 0);
    assert_eq!(session.current_residual(&"s".into(), &"a".into()), 7);
    assert_eq!(session.current_residual(&"a".into(), &"s".into()), 0);
}

#[test]
fn rpc_step_through_session() {
    let session = Mutex::new(Session::new());
    let context = CallContext::new("", &JsonValue::Null, "test");

    let loaded = rpc_functions::load_graph(
        &session,
        &json::object! { text: "s -> a: 4\na -> t: 3", format: "simple" },
        &context,
    )
    .unwrap();
    assert_eq!(loaded["nodes"], 3);
    assert!(rpc_functions::step(&session, &context).is_err());

    rpc_functions::initialize(&session, &context).unwrap();
    let found = rpc_functions::step(&session, &context).unwrap();
    assert_eq!(found["event"], "path-found");
    assert_eq!(found["bottleneck"], 3);
    let augmented = rpc_functions::step(&session, &context).unwrap();
    assert_eq!(augmented["maxFlow"], 3);
    let done = rpc_functions::step(&session, &context).unwrap();
    assert_eq!(done["event"], "complete");

    let state = rpc_functions::state(&session).unwrap();
    assert_eq!(state["state"], "complete");
    assert_eq!(state["history"].len(), 1);

    let residual = rpc_functions::residual(&session, &json::object! { from: "a", to: "s" });
    assert_eq!(residual.unwrap(), 3);
    assert!(rpc_functions::flow(&session, &json::object! { edge: 7 }).is_err());
    assert!(rpc_functions::load_graph(&session, &json::object! { preset: "nope" }, &context).is_err());
}

#[test]
fn rpc_loads_random_graph() {
    let session = Mutex::new(Session::new());
    let context = CallContext::new("", &JsonValue::Null, "test");

    let loaded = rpc_functions::load_graph(
        &session,
        &json::object! { random: json::object! { nodes: 6, density: 60 } },
        &context,
    )
    .unwrap();
    assert_eq!(loaded["nodes"], 6);
    assert_eq!(loaded["edges"], 9);
    assert!(loaded["notations"]["simple"].as_str().unwrap().starts_with("s->a:"));
    assert!(loaded["notations"]["json"].as_str().is_some());
    assert_eq!(loaded["notations"]["matrix"].as_str().unwrap().lines().count(), 6);

    rpc_functions::initialize(&session, &context).unwrap();
    let done = session.lock().unwrap().run_to_completion(1_000).unwrap();
    assert!(matches!(done.last(), Some(StepEvent::Complete { max_flow }) if *max_flow >= 5));

    let bad_density = json::object! { random: json::object! { nodes: 6, density: 150 } };
    assert!(rpc_functions::load_graph(&session, &bad_density, &context).is_err());
}

/// Capacity of the smallest cut separating the first node from the last.
fn brute_force_min_cut(graph: &GraphSpec) -> Capacity {
    let n = graph.nodes.len();
    let index = |id: &NodeId| graph.nodes.iter().position(|n| n == id).unwrap();
    (0u32..1 << (n - 2))
        .map(|mask| {
            // Source side: the source plus every inner node whose bit is set.
            let source_side = |i: usize| i == 0 || (i < n - 1 && mask & (1 << (i - 1)) != 0);
            graph
                .edges
                .iter()
                .filter(|e| source_side(index(&e.from)) && !source_side(index(&e.to)))
                .map(|e| e.capacity)
                .sum::<Capacity>()
        })
        .min()
        .unwrap_or(0)
}

fn small_graph() -> impl Strategy<Value = GraphSpec> {
    (2usize..=6)
        .prop_flat_map(|n| {
            (
                Just(n),
                prop::collection::vec((0..n, 0..n, 1u64..20), 0..=n * n),
            )
        })
        .prop_map(|(n, raw)| {
            let mut names = vec!["s".to_string()];
            names.extend((1..n - 1).map(|i| format!("v{i}")));
            names.push("t".to_string());
            let mut seen = HashSet::new();
            let edges = raw
                .into_iter()
                .filter(|(u, v, _)| u != v && seen.insert((*u, *v)))
                .map(|(u, v, c)| EdgeSpec::new(names[u].as_str(), names[v].as_str(), c))
                .collect();
            GraphSpec {
                nodes: names.into_iter().map(NodeId::from).collect(),
                edges,
            }
        })
}

proptest! {
    #[test]
    fn random_graphs_reach_min_cut(graph in small_graph()) {
        let expected = brute_force_min_cut(&graph);
        let total: Capacity = graph.edges.iter().map(|e| e.capacity).sum();
        let mut session = Session::with_graph(graph).unwrap();
        session.initialize().unwrap();

        // Every augmentation adds at least one unit, so the run is bounded.
        let events = session.run_to_completion(2 * total as usize + 2).unwrap();
        prop_assert_eq!(events.last(), Some(&StepEvent::Complete { max_flow: expected }));

        let mut previous = 0;
        for event in &events {
            if let StepEvent::Augmented { bottleneck, max_flow, .. } = event {
                prop_assert!(*bottleneck > 0);
                prop_assert_eq!(*max_flow, previous + bottleneck);
                previous = *max_flow;
            }
        }
        prop_assert_eq!(previous, expected);

        let network = session.network();
        let (source, sink) = (network.source().unwrap(), network.sink().unwrap());
        for edge in network.edges() {
            prop_assert!(edge.flow <= edge.capacity);
        }
        for node in network.nodes() {
            if node != source && node != sink {
                prop_assert_eq!(network.inflow(node), network.outflow(node));
            }
        }
    }
}
