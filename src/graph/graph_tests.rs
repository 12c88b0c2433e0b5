//! Tests for the call-graph engine: declaration lookup, overload choice,
//! inheritance linking, classification, recursion, overrides and the cache.

use super::*;
use crate::source::{IndexBuilder, JavaIndex, SourceIndex};
use crate::GraphError;
use std::sync::Arc;

// ─── Fixtures ────────────────────────────────────────────────────────

const OVERLOADS: &str = r#"
package demo;

public class Overloads {
    interface I {}
    static class A implements I {}
    static class B extends A {}
    static abstract class C extends B {}
    static class D extends C {}

    public <T> T justReturn(T t) { return t; }
    public String justReturn(String s) { return s; }
    public Number justReturn(Number n) { return n; }
    public Long justReturn(Long l) { return l; }
    public Integer justReturn(Integer i) { return i; }
    public int justReturn(int i) { return i; }
    public CharSequence justReturn(CharSequence c) { return c; }
    public A justReturn(A a) { return a; }
    public B justReturn(B b) { return b; }
    public I justReturn(I i) { return i; }

    public I returnIt(I i) { return i; }
}
"#;

const TEMPLATE: &str = r#"
package demo;

public class Template {
    interface Service {
        void handleRequest(String request, StringBuilder response);

        default String getName() { return "service"; }
    }

    interface Content {}

    static class LoginForm implements Content {
        String username;
        String password;
    }

    static abstract class AbstractService<T extends Content, R> implements Service {
        public void handleRequest(String request, StringBuilder response) {
            writeResponse(response, doHandle(parseContent(request)));
        }

        protected abstract R doHandle(T content);

        abstract Class<T> getContentType();

        private T parseContent(String request) { return null; }

        private void writeResponse(StringBuilder response, R result) { response.append(result); }
    }

    static class LoginService extends AbstractService<LoginForm, Boolean> {
        protected Boolean doHandle(LoginForm form) { return true; }

        Class<LoginForm> getContentType() { return LoginForm.class; }

        public String getName() { return "login"; }
    }
}
"#;

const ZERO_GETTER: &str = r#"
package demo;

public interface ZeroGetter {
    int getZero();
}
"#;

const ABSTRACT_ZERO_GETTER: &str = r#"
package demo;

public abstract class AbstractZeroGetter implements ZeroGetter {
    public int getZero() {
        return this.doGetZero();
    }

    protected abstract int doGetZero();
}
"#;

const SUPER_RECURSION: &str = r#"
package demo;

public class ZeroGetterWithSuperRecursion extends AbstractZeroGetter {
    public int getZero() {
        int zero = super.getZero();
        return zero;
    }

    protected int doGetZero() { return 0; }
}
"#;

const SIMPLE_CLASS: &str = r#"
package demo;

public class SimpleClass {
    public void simpleMethod(int count, String name) {
        doNothing();
    }

    public void doNothing() {}

    public String callUtils() {
        return SimpleUtils.getRandomString();
    }

    public void forLoop() {
        for (int i = 0; i < 10; i++) {
            System.out.println(i + ": " + callUtils());
            System.out.println(SimpleUtils.getRandomDouble());
        }
    }

    public void recurse1(int i) {
        if (i > 0) {
            recurse2(i);
        }
    }

    public void recurse2(int i) { recurse3(i); }

    public void recurse3(int i) { recurse1(i - 1); }
}
"#;

const SIMPLE_UTILS: &str = r#"
package demo;

import org.apache.commons.lang3.RandomStringUtils;

public class SimpleUtils {
    public static String getRandomString() {
        return RandomStringUtils.randomAlphanumeric(32);
    }

    public static double getRandomDouble() {
        return Math.random();
    }
}
"#;

const INFERENCE: &str = r#"
package demo;

import java.util.List;
import org.slf4j.Logger;

public class Inference {
    private static final Logger log = null;
    private String prefix;

    public void run(List<String> items) {
        var text = prefix.trim();
        text.isEmpty();
        items.forEach(item -> record(prefix.length()));
        log.info("running");
    }

    private void record(int size) {}
}
"#;

const PARTIAL: &str = r#"
package demo;

public class Partial {
    public void run() {
        consume(undefinedHelper());
        ready();
    }

    private void consume(String value) {}

    private void ready() {}
}
"#;

fn simple() -> MethodGraph<JavaIndex> {
    graph(&[("demo/SimpleClass.java", SIMPLE_CLASS), ("demo/SimpleUtils.java", SIMPLE_UTILS)])
}

fn zero_getters() -> MethodGraph<JavaIndex> {
    graph(&[
        ("demo/ZeroGetter.java", ZERO_GETTER),
        ("demo/AbstractZeroGetter.java", ABSTRACT_ZERO_GETTER),
        ("demo/ZeroGetterWithSuperRecursion.java", SUPER_RECURSION),
    ])
}

fn graph(sources: &[(&str, &str)]) -> MethodGraph<JavaIndex> {
    MethodGraph::new(JavaIndex::from_sources(sources).unwrap(), GraphConfig::default())
}

fn dep_ids(info: &MethodInfo) -> Vec<String> {
    info.dependencies.iter().map(|c| c.callee_id().to_string()).collect()
}

fn dep_types(info: &MethodInfo) -> Vec<CallingType> {
    info.dependencies.iter().map(|c| c.calling_type).collect()
}

fn override_ids(info: &MethodInfo) -> Vec<String> {
    info.overrides.iter().map(|o| o.id.to_string()).collect()
}

fn dep<'a>(info: &'a MethodInfo, name: &str) -> &'a MethodCalling {
    info.dependencies
        .iter()
        .find(|c| c.callee_id().name() == name)
        .unwrap_or_else(|| panic!("no dependency named {} in {:?}", name, dep_ids(info)))
}

// ─── Declaration lookup and overloads ───────────────────────────────

#[test]
fn test_find_declaration_picks_most_specific_overload() {
    let g = graph(&[("demo/Overloads.java", OVERLOADS)]);
    let cases = [
        ("java.lang.String", "java.lang.String"),
        ("T", "T"),
        ("java.lang.Object", "T"),
        ("int", "int"),
        ("java.lang.Integer", "java.lang.Integer"),
        ("java.lang.Long", "java.lang.Long"),
        ("long", "java.lang.Long"),
        ("java.lang.Double", "java.lang.Number"),
        ("double", "java.lang.Number"),
        ("demo.Overloads$A", "demo.Overloads$A"),
        ("demo.Overloads$B", "demo.Overloads$B"),
        ("demo.Overloads$I", "demo.Overloads$I"),
        ("Unknown", "T"),
    ];
    for (argument, expected) in cases {
        let id = MethodId::new("demo.Overloads", "justReturn", vec![argument.to_string()]);
        let found = g.find_declaration(&id).unwrap_or_else(|| panic!("nothing found for {}", argument));
        let chosen = MethodId::of(g.index(), found);
        assert_eq!(chosen.param_types(), [expected], "argument {}", argument);
    }
}

#[test]
fn test_find_declaration_accepts_subtypes() {
    let g = graph(&[("demo/Overloads.java", OVERLOADS)]);
    for argument in ["demo.Overloads$A", "demo.Overloads$B", "demo.Overloads$D"] {
        let id = MethodId::new("demo.Overloads", "returnIt", vec![argument.to_string()]);
        let found = g.find_declaration(&id).unwrap();
        assert_eq!(MethodId::of(g.index(), found).as_str(), "demo.Overloads#returnIt(demo.Overloads$I)");
    }
}

#[test]
fn test_resolve_method_returns_selected_identity() {
    let g = graph(&[("demo/Overloads.java", OVERLOADS)]);
    let info = g.resolve_method("demo.Overloads#justReturn(long)").unwrap();
    assert_eq!(info.id.as_str(), "demo.Overloads#justReturn(java.lang.Long)");
    assert!(info.dependencies.is_empty());
}

#[test]
fn test_find_declaration_walks_ancestors() {
    let g = graph(&[("demo/Template.java", TEMPLATE)]);
    let id = MethodId::parse("demo.Template$LoginService#handleRequest(java.lang.String,java.lang.StringBuilder)").unwrap();
    let found = g.find_declaration(&id).unwrap();
    assert_eq!(g.index().type_decl(found.type_id).qualified_name, "demo.Template$AbstractService");
}

// ─── Inheritance linking ─────────────────────────────────────────────

#[test]
fn test_link_generic_template_method() {
    let g = graph(&[("demo/Template.java", TEMPLATE)]);
    let id = MethodId::parse("demo.Template$LoginService#doHandle(demo.Template$LoginForm)").unwrap();
    let linked = link(g.index(), g.find_declaration(&id).unwrap());
    let extend: Vec<String> = linked.from_extend.iter().map(|m| MethodId::of(g.index(), *m).to_string()).collect();
    assert_eq!(extend, vec!["demo.Template$AbstractService#doHandle(T)"]);
    assert!(linked.from_impl.is_empty());
}

#[test]
fn test_link_default_interface_method() {
    let g = graph(&[("demo/Template.java", TEMPLATE)]);
    let id = MethodId::parse("demo.Template$LoginService#getName()").unwrap();
    let linked = link(g.index(), g.find_declaration(&id).unwrap());
    assert!(linked.from_extend.is_empty());
    let implemented: Vec<String> = linked.from_impl.iter().map(|m| MethodId::of(g.index(), *m).to_string()).collect();
    assert_eq!(implemented, vec!["demo.Template$Service#getName()"]);
}

#[test]
fn test_is_type_of_variable_and_boxing() {
    let g = graph(&[("demo/Overloads.java", OVERLOADS)]);
    let index = g.index();
    let number = index.type_info("java.lang.Number");
    assert!(is_type_of(index, &number, "long"));
    assert!(is_type_of(index, &number, "java.lang.Double"));
    assert!(!is_type_of(index, &number, "java.lang.String"));
    let iface = index.type_info("demo.Overloads$I");
    assert!(is_type_of(index, &iface, "demo.Overloads$D"));
}

#[test]
fn test_template_dependency_carries_override() {
    let g = graph(&[("demo/Template.java", TEMPLATE)]);
    let info = g
        .resolve_method("demo.Template$AbstractService#handleRequest(java.lang.String,java.lang.StringBuilder)")
        .unwrap();
    let handle = dep(&info, "doHandle");
    assert_eq!(handle.calling_type, CallingType::SelfCall);
    let method = handle.method().unwrap();
    assert_eq!(method.id.as_str(), "demo.Template$AbstractService#doHandle(T)");
    assert_eq!(override_ids(method), vec!["demo.Template$LoginService#doHandle(demo.Template$LoginForm)"]);
    assert_eq!(dep(&info, "parseContent").calling_type, CallingType::SelfCall);
}

// ─── Distances ───────────────────────────────────────────────────────

#[test]
fn test_inheritance_distance() {
    let g = graph(&[("demo/Overloads.java", OVERLOADS)]);
    let index = g.index();
    let d = index.type_info("demo.Overloads$D");
    assert_eq!(inheritance_distance(index, &d, "demo.Overloads$D"), Some(0));
    assert_eq!(inheritance_distance(index, &d, "demo.Overloads$C"), Some(1));
    assert_eq!(inheritance_distance(index, &d, "demo.Overloads$A"), Some(3));
    assert_eq!(inheritance_distance(index, &d, "demo.Overloads$I"), Some(4));
    let long = index.type_info("long");
    assert_eq!(inheritance_distance(index, &long, "java.lang.Long"), Some(1));
    assert_eq!(inheritance_distance(index, &long, "java.lang.Number"), Some(2));
    let a = index.type_info("demo.Overloads$A");
    assert_eq!(inheritance_distance(index, &a, "demo.Overloads$B"), None);
}

// ─── Recursion and overrides ─────────────────────────────────────────

#[test]
fn test_zero_getter_graph() {
    let g = zero_getters();
    let root = g.resolve_method("demo.ZeroGetter#getZero()").unwrap();
    assert!(root.dependencies.is_empty());
    assert_eq!(override_ids(&root), vec!["demo.AbstractZeroGetter#getZero()"]);

    let abstract_getter = &root.overrides[0];
    assert_eq!(dep_ids(abstract_getter), vec!["demo.AbstractZeroGetter#doGetZero()"]);
    assert_eq!(dep_types(abstract_getter), vec![CallingType::SelfCall]);
    let do_get = abstract_getter.dependencies[0].method().unwrap();
    assert_eq!(override_ids(do_get), vec!["demo.ZeroGetterWithSuperRecursion#doGetZero()"]);
    assert_eq!(override_ids(abstract_getter), vec!["demo.ZeroGetterWithSuperRecursion#getZero()"]);

    let concrete = &abstract_getter.overrides[0];
    assert_eq!(concrete.dependencies.len(), 1);
    let back = &concrete.dependencies[0];
    assert!(back.is_recursive());
    assert_eq!(back.callee_id().as_str(), "demo.AbstractZeroGetter#getZero()");
    assert_eq!(back.calling_type, CallingType::Super);
}

#[test]
fn test_mutual_recursion_closes_cycle() {
    let g = simple();
    let root = g.resolve_method("demo.SimpleClass#recurse1(int)").unwrap();
    assert_eq!(dep_ids(&root), vec!["demo.SimpleClass#recurse2(int)"]);
    let second = root.dependencies[0].method().unwrap();
    let third = second.dependencies[0].method().unwrap();
    assert_eq!(third.id.as_str(), "demo.SimpleClass#recurse3(int)");
    let back = &third.dependencies[0];
    assert!(back.is_recursive());
    assert_eq!(back.callee_id().as_str(), "demo.SimpleClass#recurse1(int)");
    assert_eq!(back.calling_type, CallingType::SelfCall);
}

#[test]
fn test_overrides_descend_through_silent_subtypes() {
    let g = graph(&[
        ("demo/Base.java", "package demo; public abstract class Base { public abstract void run(); }"),
        ("demo/Middle.java", "package demo; public abstract class Middle extends Base { }"),
        ("demo/Leaf.java", "package demo; public class Leaf extends Middle { public void run() {} }"),
    ]);
    let root = g.resolve_method("demo.Base#run()").unwrap();
    assert_eq!(override_ids(&root), vec!["demo.Leaf#run()"]);
}

const CYCLIC: &str = r#"
package demo;

public class X extends Y {
    void go() { }
    void pick(boolean flag) { take(flag ? new X() : new Z()); }
    void take(Object value) { }
}

class Y extends X {
    void go() { }
}

class Z { }
"#;

#[test]
fn test_cyclic_hierarchy_terminates() {
    let g = graph(&[("demo/X.java", CYCLIC)]);
    let root = g.resolve_method("demo.X#go()").unwrap();
    assert!(root.dependencies.is_empty());
    assert_eq!(override_ids(&root), vec!["demo.Y#go()"]);
    // X is in flight while Y#go is built, so the way back is identity only
    assert_eq!(override_ids(&root.overrides[0]), vec!["demo.X#go()"]);
    assert!(root.overrides[0].overrides[0].declaration.is_none());

    let pick = g.resolve_method("demo.X#pick(boolean)").unwrap();
    assert_eq!(dep_ids(&pick), vec!["demo.X#take(java.lang.Object)"]);
}

#[test]
fn test_self_extending_type_terminates() {
    let g = graph(&[("demo/Node.java", "package demo; public class Node extends Node { void visit() { } }")]);
    let root = g.resolve_method("demo.Node#visit()").unwrap();
    assert!(root.dependencies.is_empty());
    assert!(root.overrides.is_empty());
}

const SHAPE: &str = "package demo; public abstract class Shape { public abstract double area(); }";
const CIRCLE: &str = "package demo; public class Circle extends Shape { public double area() { return 3.14; } }";
const SQUARE: &str = "package demo; public class Square extends Shape { public double area() { return 1.0; } }";
const POLYGON: &str = "package demo; public abstract class Polygon { public abstract int sides(); }";
const HEXAGON: &str = "package demo; public class Hexagon extends Polygon { public int sides() { return 6; } }";

fn shapes(strategy: SubtypeStrategy) -> MethodGraph<JavaIndex> {
    let index = JavaIndex::from_sources(&[
        ("demo/Shape.java", SHAPE),
        ("demo/Circle.java", CIRCLE),
        ("demo/Square.java", SQUARE),
        ("demo/Polygon.java", POLYGON),
        ("demo/Hexagon.java", HEXAGON),
    ])
    .unwrap();
    MethodGraph::new(index, GraphConfig::default().with_subtype_strategy(strategy))
}

#[test]
fn test_subtype_strategy_all() {
    let g = shapes(SubtypeStrategy::All);
    let root = g.resolve_method("demo.Shape#area()").unwrap();
    assert_eq!(override_ids(&root), vec!["demo.Circle#area()", "demo.Square#area()"]);
}

#[test]
fn test_subtype_strategy_single_only() {
    let g = shapes(SubtypeStrategy::SingleOnly);
    let shape = g.resolve_method("demo.Shape#area()").unwrap();
    assert!(shape.overrides.is_empty());
    let polygon = g.resolve_method("demo.Polygon#sides()").unwrap();
    assert_eq!(override_ids(&polygon), vec!["demo.Hexagon#sides()"]);
}

// ─── Classification ──────────────────────────────────────────────────

#[test]
fn test_for_loop_dependencies_in_call_order() {
    let g = simple();
    let root = g.resolve_method("demo.SimpleClass#forLoop()").unwrap();
    assert_eq!(
        dep_ids(&root),
        vec![
            "java.io.PrintStream#println(java.lang.String)",
            "demo.SimpleClass#callUtils()",
            "java.io.PrintStream#println(double)",
            "demo.SimpleUtils#getRandomDouble()",
        ]
    );
    assert_eq!(
        dep_types(&root),
        vec![CallingType::Stdlib, CallingType::SelfCall, CallingType::Stdlib, CallingType::Library]
    );

    let random = dep(&root, "getRandomDouble").method().unwrap();
    assert_eq!(dep_ids(random), vec!["java.lang.Math#random()"]);
    assert_eq!(dep_types(random), vec![CallingType::Stdlib]);
}

#[test]
fn test_unresolved_library_call_keeps_imported_name() {
    let g = simple();
    let root = g.resolve_method("demo.SimpleClass#callUtils()").unwrap();
    let utils = dep(&root, "getRandomString").method().unwrap();
    assert_eq!(dep_ids(utils), vec!["org.apache.commons.lang3.RandomStringUtils#randomAlphanumeric(int)"]);
    assert_eq!(dep_types(utils), vec![CallingType::Library]);
    assert!(utils.dependencies[0].method().unwrap().declaration.is_none());
}

const BASE: &str = r#"
package demo;

public class Base {
    protected void helper() {}
}
"#;

const WORKER: &str = r#"
package demo;

import api.Gateway;

public class Worker extends Base {
    private final Peer peer = new Peer();

    public void work(Gateway gateway) {
        helper();
        peer.assist();
        gateway.send("x");
        own();
        String.valueOf(1);
    }

    private void own() {}
}
"#;

const PEER: &str = r#"
package demo;

public class Peer {
    public void assist() {}
}
"#;

const GATEWAY: &str = r#"
package api;

public class Gateway {
    public void send(String payload) {}
}
"#;

#[test]
fn test_classification_with_modules() {
    let index = IndexBuilder::new()
        .module_source("core", "core/src/main/java/demo/Base.java", BASE)
        .module_source("core", "core/src/main/java/demo/Worker.java", WORKER)
        .module_source("core", "core/src/main/java/demo/Peer.java", PEER)
        .module_source("api", "api/src/main/java/api/Gateway.java", GATEWAY)
        .build()
        .unwrap();
    let g = MethodGraph::new(index, GraphConfig::default());
    let root = g.resolve_method("demo.Worker#work(api.Gateway)").unwrap();
    assert_eq!(
        dep_ids(&root),
        vec![
            "demo.Base#helper()",
            "demo.Peer#assist()",
            "api.Gateway#send(java.lang.String)",
            "demo.Worker#own()",
            "java.lang.String#valueOf(int)",
        ]
    );
    assert_eq!(
        dep_types(&root),
        vec![
            CallingType::Super,
            CallingType::Brother,
            CallingType::Out,
            CallingType::SelfCall,
            CallingType::Stdlib,
        ]
    );
}

#[test]
fn test_classification_without_modules_is_library() {
    let g = graph(&[
        ("demo/Base.java", BASE),
        ("demo/Worker.java", WORKER),
        ("demo/Peer.java", PEER),
        ("api/Gateway.java", GATEWAY),
    ]);
    let root = g.resolve_method("demo.Worker#work(api.Gateway)").unwrap();
    assert_eq!(dep(&root, "assist").calling_type, CallingType::Library);
    assert_eq!(dep(&root, "send").calling_type, CallingType::Library);
    assert_eq!(dep(&root, "helper").calling_type, CallingType::Super);
}

#[test]
fn test_classify_by_name() {
    let g = simple();
    let index = g.index();
    let caller = index.type_info("demo.SimpleClass");
    assert_eq!(classify_by_name(index, "javax.swing.JFrame", &caller), CallingType::Stdlib);
    assert_eq!(classify_by_name(index, "demo.SimpleClass", &caller), CallingType::SelfCall);
    assert_eq!(classify_by_name(index, "java.lang.Object", &caller), CallingType::Stdlib);
    assert_eq!(classify_by_name(index, "com.acme.Thing", &caller), CallingType::Library);
    assert!(is_stdlib("sun.misc.Unsafe"));
    assert!(!is_stdlib("javafx.Stage"));
}

#[test]
fn test_list_calls_land_on_list() {
    let g = graph(&[(
        "demo/Basket.java",
        "package demo;\nimport java.util.List;\npublic class Basket {\n  void fill(List<String> items) { items.add(\"x\"); items.get(0); items.remove(0); }\n}\n",
    )]);
    let root = g.resolve_method("demo.Basket#fill(java.util.List)").unwrap();
    assert_eq!(
        dep_ids(&root),
        vec!["java.util.List#add(java.lang.Object)", "java.util.List#get(int)", "java.util.List#remove(int)"]
    );
    assert!(dep_types(&root).iter().all(|t| *t == CallingType::Stdlib));
}

// ─── Heuristic inference ─────────────────────────────────────────────

#[test]
fn test_inference_covers_var_and_lambda_bodies() {
    let g = graph(&[("demo/Inference.java", INFERENCE)]);
    let root = g.resolve_method("demo.Inference#run(java.util.List)").unwrap();
    assert_eq!(
        dep_ids(&root),
        vec![
            "java.lang.String#trim()",
            "java.lang.String#isEmpty()",
            "demo.Inference#record(int)",
            "java.lang.String#length()",
        ]
    );
}

#[test]
fn test_no_heuristics_drops_inferred_calls() {
    let index = JavaIndex::from_sources(&[("demo/Inference.java", INFERENCE)]).unwrap();
    let g = MethodGraph::new(index, GraphConfig::default().with_heuristic_fallback(false));
    let root = g.resolve_method("demo.Inference#run(java.util.List)").unwrap();
    let ids = dep_ids(&root);
    assert!(ids.contains(&"java.lang.String#trim()".to_string()));
    assert!(!ids.contains(&"java.lang.String#isEmpty()".to_string()));
}

#[test]
fn test_excluded_receivers() {
    let index = JavaIndex::from_sources(&[("demo/Inference.java", INFERENCE)]).unwrap();
    let mut config = GraphConfig::default();
    config.excluded_receiver_names.clear();
    let g = MethodGraph::new(index, config);
    let root = g.resolve_method("demo.Inference#run(java.util.List)").unwrap();
    let logged = dep(&root, "info");
    assert_eq!(logged.callee_id().as_str(), "org.slf4j.Logger#info(java.lang.String)");
    assert_eq!(logged.calling_type, CallingType::Library);

    let index = JavaIndex::from_sources(&[("demo/Inference.java", INFERENCE)]).unwrap();
    let g = MethodGraph::new(index, GraphConfig::default().with_excluded_receivers(["text"]));
    let root = g.resolve_method("demo.Inference#run(java.util.List)").unwrap();
    assert!(!dep_ids(&root).contains(&"java.lang.String#isEmpty()".to_string()));
}

#[test]
fn test_untypeable_argument_drops_only_that_call() {
    let g = graph(&[("demo/Partial.java", PARTIAL)]);
    let root = g.resolve_method("demo.Partial#run()").unwrap();
    assert_eq!(dep_ids(&root), vec!["demo.Partial#ready()"]);
}

const ANONYMOUS: &str = r#"
package demo;

public class Anon {
    public void run() {
        Runnable task = new Runnable() {
            public void run() {
                helper();
            }
        };
        task.run();
    }

    void helper() { }
}
"#;

#[test]
fn test_anonymous_class_calls_belong_to_enclosing_method() {
    let g = graph(&[("demo/Anon.java", ANONYMOUS)]);
    let root = g.resolve_method("demo.Anon#run()").unwrap();
    assert_eq!(dep_ids(&root), vec!["demo.Anon#helper()", "java.lang.Runnable#run()"]);
    assert_eq!(dep(&root, "helper").calling_type, CallingType::SelfCall);
    assert!(!root.dependencies.iter().any(MethodCalling::is_recursive));
}

// ─── Errors ──────────────────────────────────────────────────────────

#[test]
fn test_invalid_and_missing_methods() {
    let g = simple();
    assert!(matches!(g.resolve_method("nonsense"), Err(GraphError::InvalidMethodId(_))));
    assert!(matches!(g.resolve_method("demo.SimpleClass#missing()"), Err(GraphError::MethodNotFound(_))));
    assert!(matches!(g.resolve_method("demo.Nowhere#run()"), Err(GraphError::MethodNotFound(_))));
    assert!(matches!(g.resolve_method("demo.SimpleClass#doNothing(int)"), Err(GraphError::MethodNotFound(_))));
}

// ─── Filters ─────────────────────────────────────────────────────────

#[test]
fn test_method_filter_keeps_identity_only_node() {
    let index = JavaIndex::from_sources(&[("demo/SimpleClass.java", SIMPLE_CLASS), ("demo/SimpleUtils.java", SIMPLE_UTILS)])
        .unwrap();
    let g = MethodGraph::new(index, GraphConfig::default().with_method_filter(|id, _| id.name() != "callUtils"));
    let root = g.resolve_method("demo.SimpleClass#forLoop()").unwrap();
    let utils = dep(&root, "callUtils").method().unwrap();
    assert!(utils.dependencies.is_empty());
    assert!(utils.overrides.is_empty());
    assert!(utils.declaration.is_none());
    assert_eq!(dep(&root, "callUtils").calling_type, CallingType::SelfCall);
}

#[test]
fn test_calling_filter_drops_edges() {
    let index = JavaIndex::from_sources(&[("demo/SimpleClass.java", SIMPLE_CLASS), ("demo/SimpleUtils.java", SIMPLE_UTILS)])
        .unwrap();
    let config = GraphConfig::default().with_calling_filter(|c, _| c.calling_type != CallingType::Stdlib);
    let g = MethodGraph::new(index, config);
    let root = g.resolve_method("demo.SimpleClass#forLoop()").unwrap();
    assert_eq!(dep_ids(&root), vec!["demo.SimpleClass#callUtils()", "demo.SimpleUtils#getRandomDouble()"]);
}

// ─── Cache and determinism ───────────────────────────────────────────

#[test]
fn test_cache_returns_same_instance() {
    let g = simple();
    let first = g.resolve_method("demo.SimpleClass#forLoop()").unwrap();
    let second = g.resolve_method("demo.SimpleClass#forLoop()").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let nested = dep(&first, "callUtils").method().unwrap();
    let direct = g.resolve_method("demo.SimpleClass#callUtils()").unwrap();
    assert!(Arc::ptr_eq(nested, &direct));
    assert!(g.cached("demo.SimpleUtils#getRandomString()").is_some());
}

#[test]
fn test_requested_alias_is_cached() {
    let g = graph(&[("demo/Overloads.java", OVERLOADS)]);
    let before = g.resolve_method("demo.Overloads#justReturn(long)").unwrap();
    let count = g.cached_count();
    let again = g.resolve_method("demo.Overloads#justReturn(long)").unwrap();
    assert!(Arc::ptr_eq(&before, &again));
    assert_eq!(g.cached_count(), count);
    assert!(g.cached("demo.Overloads#justReturn(java.lang.Long)").is_some());
}

#[test]
fn test_resolution_is_deterministic() {
    let render = || {
        let g = zero_getters();
        let root = g.resolve_method("demo.ZeroGetter#getZero()").unwrap();
        serde_json::to_string(&*root).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn test_concurrent_roots_share_cache() {
    let graph = simple();
    let g = &graph;
    let roots = ["demo.SimpleClass#forLoop()", "demo.SimpleClass#callUtils()", "demo.SimpleClass#recurse1(int)"];
    let results: Vec<Arc<MethodInfo>> = std::thread::scope(|s| {
        let handles: Vec<_> = roots.iter().map(|r| s.spawn(move || g.resolve_method(r).unwrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results.len(), 3);
    let again = g.resolve_method("demo.SimpleClass#callUtils()").unwrap();
    assert!(Arc::ptr_eq(&results[1], &again));
}

// ─── View ────────────────────────────────────────────────────────────

#[test]
fn test_view_of_recursive_chain() {
    let g = simple();
    let root = g.resolve_method("demo.SimpleClass#recurse1(int)").unwrap();
    let view = GraphView::from_root(&root, g.index());
    assert_eq!(view.root_method_id, "demo.SimpleClass#recurse1(int)");
    assert_eq!(view.methods.len(), 3);
    assert_eq!(view.callings.len(), 2);
    assert_eq!(
        view.recursions,
        vec![EdgeView {
            from: "demo.SimpleClass#recurse3(int)".to_string(),
            to: "demo.SimpleClass#recurse1(int)".to_string(),
            calling_type: CallingType::SelfCall,
        }]
    );
    let method = &view.methods["demo.SimpleClass#recurse2(int)"];
    assert_eq!(method.name, "recurse2");
    assert_eq!(method.declaring_class, "demo.SimpleClass");
    assert_eq!(method.arguments.len(), 1);
    assert_eq!(method.arguments[0].name, "i");
    assert_eq!(method.arguments[0].ty, "int");
}

#[test]
fn test_view_json_shape() {
    let g = zero_getters();
    let root = g.resolve_method("demo.ZeroGetter#getZero()").unwrap();
    let view = GraphView::from_root(&root, g.index());
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["rootMethodId"], "demo.ZeroGetter#getZero()");
    assert_eq!(json["overrides"]["demo.ZeroGetter#getZero()"][0], "demo.AbstractZeroGetter#getZero()");
    assert_eq!(json["recursions"][0]["type"], "SUPER");
    assert!(json["methods"]["demo.ZeroGetterWithSuperRecursion#doGetZero()"].is_object());
}

#[test]
fn test_view_names_external_arguments() {
    let g = simple();
    let root = g.resolve_method("demo.SimpleClass#callUtils()").unwrap();
    let view = GraphView::from_root(&root, g.index());
    let external = &view.methods["org.apache.commons.lang3.RandomStringUtils#randomAlphanumeric(int)"];
    assert_eq!(external.arguments[0].name, "arg0");
    assert_eq!(external.arguments[0].ty, "int");
}

// ─── Property-based tests (proptest) ─────────────────────────────────

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn chain(length: usize) -> JavaIndex {
        let sources: Vec<(String, String)> = (0..=length)
            .map(|i| {
                let body = if i == 0 {
                    "package demo; public class C0 {}".to_string()
                } else {
                    format!("package demo; public class C{} extends C{} {{}}", i, i - 1)
                };
                (format!("demo/C{}.java", i), body)
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = sources.iter().map(|(p, s)| (p.as_str(), s.as_str())).collect();
        JavaIndex::from_sources(&borrowed).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Distance grows by one per class and never reaches downward.
        #[test]
        fn distance_follows_class_chain(length in 1usize..6) {
            let index = chain(length);
            let leaf = index.type_info(&format!("demo.C{}", length));
            for i in 0..=length {
                prop_assert_eq!(inheritance_distance(&index, &leaf, &format!("demo.C{}", i)), Some(length - i));
            }
            prop_assert_eq!(inheritance_distance(&index, &leaf, "java.lang.Object"), Some(length + 1));
            let root = index.type_info("demo.C0");
            prop_assert_eq!(inheritance_distance(&index, &root, &format!("demo.C{}", length)), None);
        }
    }
}
