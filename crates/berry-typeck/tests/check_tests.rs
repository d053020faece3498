use berry_common::diagnostic::{Category, Reporter};
use berry_common::source::SourceFile;
use berry_common::ty::Ty;
use berry_parser::ast::{Def, Expr, ExprKind, Stmt};
use berry_parser::{parse_file, Module};
use berry_typeck::TypeckResult;
use insta::assert_debug_snapshot;

// ── Helpers ──────────────────────────────────────────────────────────────

struct Checked {
    module: Module,
    reporter: Reporter,
    result: TypeckResult,
}

fn check(src: &str) -> Checked {
    let mut module = Module::new("main");
    let reporter = Reporter::new();
    let file = SourceFile::new(module.next_file_id(), "test.berry", src);
    let _ = parse_file(&mut module, file, &reporter);
    let result = berry_typeck::check(&mut module, &reporter);
    Checked {
        module,
        reporter,
        result,
    }
}

impl Checked {
    fn messages(&self) -> Vec<String> {
        self.reporter
            .diagnostics()
            .into_iter()
            .map(|d| d.to_string())
            .collect()
    }

    fn bare_messages(&self) -> Vec<String> {
        self.reporter
            .diagnostics()
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    fn assert_clean(&self) {
        assert!(!self.reporter.has_errors(), "{:#?}", self.messages());
    }

    /// Type of the last symbol called `name`.
    fn ty_of(&self, name: &str) -> Option<Ty> {
        self.module
            .symbols
            .iter()
            .filter(|(_, s)| s.name == name)
            .last()
            .and_then(|(_, s)| s.ty.clone())
    }

    /// Statements of the function declared as `name`.
    fn body(&self, name: &str) -> &[Stmt] {
        let id = self.module.lookup_global(name).expect("function declared");
        self.module
            .defs
            .iter()
            .find_map(|def| match def {
                Def::Func(f) if f.symbol == id => f.body.as_ref(),
                _ => None,
            })
            .map(|b| b.stmts.as_slice())
            .expect("function with body")
    }
}

fn visit<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    out.push(expr);
    match &expr.kind {
        ExprKind::Binary { lhs, rhs, .. } => {
            visit(lhs, out);
            visit(rhs, out);
        }
        ExprKind::Unary { operand: e, .. }
        | ExprKind::AddrOf(e)
        | ExprKind::Deref(e)
        | ExprKind::Cast { expr: e, .. } => visit(e, out),
        ExprKind::Call { callee, args } => {
            visit(callee, out);
            for arg in args {
                visit(arg, out);
            }
        }
        _ => {}
    }
}

fn stmt_exprs(stmts: &[Stmt]) -> Vec<&Expr> {
    let mut out = Vec::new();
    for stmt in stmts {
        match stmt {
            Stmt::Expr(e) => visit(e, &mut out),
            Stmt::Let(var) => {
                if let Some(init) = &var.init {
                    visit(init, &mut out);
                }
            }
        }
    }
    out
}

// ── Literal inference ────────────────────────────────────────────────────

#[test]
fn unannotated_integer_defaults_to_i64() {
    let c = check("func main() { let x = 5; }");
    c.assert_clean();
    assert_eq!(c.ty_of("x"), Some(Ty::i64()));
}

#[test]
fn annotation_commits_the_literal() {
    let c = check("func main() { let y: i32 = 5; }");
    c.assert_clean();
    assert_eq!(c.ty_of("y"), Some(Ty::i32()));
    let Stmt::Let(var) = &c.body("main")[0] else {
        panic!("expected a let");
    };
    assert_eq!(var.init.as_ref().and_then(|e| e.ty.clone()), Some(Ty::i32()));
}

#[test]
fn number_and_float_literals_merge_to_float() {
    let c = check("func main() { let z = 5 + 2.0; }");
    c.assert_clean();
    assert_eq!(c.ty_of("z"), Some(Ty::f32()));
}

#[test]
fn negated_float_and_bitwise_ints() {
    let c = check("func main() { let x = -1.5; let y = 1 & 2; let z: u8 = 3 | 4; }");
    c.assert_clean();
    assert_eq!(c.ty_of("x"), Some(Ty::f32()));
    assert_eq!(c.ty_of("y"), Some(Ty::i64()));
    assert_eq!(c.ty_of("z"), Some(Ty::u8()));
}

#[test]
fn each_statement_settles_its_literals() {
    // `n` is fixed to i64 at its own statement, so it no longer fits a u8.
    let c = check("func take(a: u8);\nfunc main() { take(200); let n = 3; take(n); }");
    assert_debug_snapshot!(c.messages(), @r###"
    [
        "[main] test.berry:2:42: i64 cannot be implicitly converted to u8",
    ]
    "###);
    assert_eq!(c.reporter.diagnostics()[0].category, Category::TypeMismatch);
}

#[test]
fn checked_expressions_are_concrete() {
    let c = check(
        "func f(p: *i64) i64;\nfunc main() { let x = *(&5 as *i64) + 1; let y = &x; f(y); let n: *u8 = null; }",
    );
    c.assert_clean();
    assert_eq!(c.ty_of("y"), Some(Ty::pointer(Ty::i64(), false)));
    for expr in stmt_exprs(c.body("main")) {
        let ty = expr.ty.as_ref().expect("every expression is typed");
        assert!(ty.is_concrete(), "{:?} left as {ty}", expr.kind);
    }
}

#[test]
fn unresolved_null_cannot_be_inferred() {
    let c = check("func f() { null; }\nfunc g() { let p = null; }\nfunc h(q: *u8) { let r: *u8 = null; }");
    assert_debug_snapshot!(c.messages(), @r###"
    [
        "[main] test.berry:1:12: unable to infer type of 'untyped null'",
        "[main] test.berry:2:20: unable to infer type of 'untyped null'",
    ]
    "###);
    assert_eq!(c.result.aborted.len(), 2);
}

// ── Names and scopes ─────────────────────────────────────────────────────

#[test]
fn undefined_symbol_aborts_before_pointer_check() {
    let c = check("func g() i32 { *p; }");
    assert_debug_snapshot!(c.messages(), @r###"
    [
        "[main] test.berry:1:17: undefined symbol: 'p'",
    ]
    "###);
    assert_eq!(c.result.aborted, vec![c.module.lookup_global("g").unwrap()]);
}

#[test]
fn columns_count_characters_not_bytes() {
    let c = check("func f() { /* \u{00E9} */ x; }");
    assert_eq!(
        c.messages(),
        vec!["[main] test.berry:1:20: undefined symbol: 'x'"]
    );
}

#[test]
fn initializer_cannot_see_its_own_binding() {
    let c = check("func f() { let x = x; }");
    assert_eq!(
        c.messages(),
        vec!["[main] test.berry:1:20: undefined symbol: 'x'"]
    );

    // With a global of the same name, the initializer reads the global.
    let c = check("let x: u16 = 1;\nfunc f() { let x = x; }");
    c.assert_clean();
    assert_eq!(c.ty_of("x"), Some(Ty::u16()));
}

#[test]
fn duplicate_locals_and_params() {
    let c = check("func f(a: i32) { let a = 1; let b = 2; let b = 3; }\nfunc g(c, c: i32) {}");
    assert_debug_snapshot!(c.bare_messages(), @r###"
    [
        "multiple symbols with name 'b' defined in same scope",
        "multiple symbols with name 'c' defined in same scope",
    ]
    "###);
}

#[test]
fn duplicate_global_is_caught_while_parsing() {
    let c = check("func f() {}\nfunc f() { x; }");
    assert_eq!(
        c.messages(),
        vec!["[main] test.berry:2:6: multiple symbols with name 'f' defined in same scope"]
    );
    assert!(c.result.is_ok());
}

#[test]
fn every_definition_is_attempted() {
    let c = check("func a() { q; }\nfunc b() { r; }\nfunc c() { let s = 1; }");
    assert_eq!(
        c.bare_messages(),
        vec!["undefined symbol: 'q'", "undefined symbol: 'r'"]
    );
    assert_eq!(c.result.aborted.len(), 2);
    assert_eq!(c.ty_of("s"), Some(Ty::i64()));
}

// ── Operators ────────────────────────────────────────────────────────────

#[test]
fn operator_errors_do_not_abort() {
    let c = check("func f(a: i32, b: bool) { a + b; -b; true + true; let c: i32 = a; c & 1.5; }");
    assert_debug_snapshot!(c.messages(), @r###"
    [
        "[main] test.berry:1:27: type mismatch: i32 v. bool",
        "[main] test.berry:1:35: cannot apply '-' to type bool",
        "[main] test.berry:1:38: cannot apply '+' to bool and bool",
        "[main] test.berry:1:67: type mismatch: i32 v. untyped float",
    ]
    "###);
    assert!(c.result.aborted.is_empty());
    assert_eq!(c.ty_of("c"), Some(Ty::i32()));
    assert_eq!(
        c.reporter.diagnostics()[1].category,
        Category::UnsupportedOperation
    );
}

#[test]
fn float_literal_is_not_an_integer() {
    let c = check("func f() { 1.5 & 2; }");
    assert_eq!(
        c.bare_messages(),
        vec!["cannot apply '&' to untyped float and untyped float"]
    );
}

// ── Pointers ─────────────────────────────────────────────────────────────

#[test]
fn deref_mutability_follows_constness() {
    let c = check("func f(p: *const i32, q: *i32) { *p; *q; }");
    c.assert_clean();
    let stmts = c.body("f");
    let mutability: Vec<bool> = stmts
        .iter()
        .map(|s| match s {
            Stmt::Expr(e) => e.is_mutable(&c.module.symbols),
            Stmt::Let(_) => unreachable!(),
        })
        .collect();
    assert_eq!(mutability, vec![false, true]);
}

#[test]
fn deref_requires_a_pointer() {
    let c = check("func f(a: i32) { *a; }");
    assert_eq!(c.bare_messages(), vec!["expected a pointer"]);
    assert_eq!(
        c.reporter.diagnostics()[0].category,
        Category::UnsupportedOperation
    );
}

// ── Calls ────────────────────────────────────────────────────────────────

#[test]
fn arity_mismatch() {
    let c = check("func add(a, b: i32) i32;\nfunc main() { add(1); }");
    assert_debug_snapshot!(c.messages(), @r###"
    [
        "[main] test.berry:2:15: expected 2 parameters, received 1",
    ]
    "###);
    assert_eq!(c.reporter.diagnostics()[0].category, Category::Arity);
}

#[test]
fn call_result_takes_return_type() {
    let c = check("func add(a, b: i32) i32;\nfunc main() { let r = add(1, 2) * 3; }");
    c.assert_clean();
    assert_eq!(c.ty_of("r"), Some(Ty::i32()));
}

#[test]
fn calling_a_non_function_yields_no_type() {
    let c = check("let g: i32 = 1;\nfunc f() { let x: i32 = g(); }");
    c.assert_clean();

    let c = check("let g: i32 = 1;\nfunc f() { let x = g(); }");
    assert_eq!(c.bare_messages(), vec!["unable to infer type of 'x'"]);
}

// ── Casts ────────────────────────────────────────────────────────────────

#[test]
fn casts() {
    let c = check(concat!(
        "func a(p: *i32) { p as *const i32; 0 as *u8; null as *u8; 2.5 as i32; true as u8; 7 as bool; }\n",
        "func b(c: *const i32) { c as *i32; }\n",
        "func c() { 1.5 as bool; }\n",
        "func d(x: f64) { x as bool; }\n",
        "func e(p: *i32) { p as *u8; }\n",
    ));
    assert_debug_snapshot!(c.bare_messages(), @r###"
    [
        "cannot cast '*const i32' to '*i32'",
        "cannot cast 'untyped float' to 'bool'",
        "cannot cast 'f64' to 'bool'",
        "cannot cast '*i32' to '*u8'",
    ]
    "###);
    assert!(c
        .reporter
        .diagnostics()
        .iter()
        .all(|d| d.category == Category::Cast));
}

#[test]
fn cast_type_is_the_destination() {
    let c = check("func f() { let x = 3 as u8; let y = 2.5 as f64; }");
    c.assert_clean();
    assert_eq!(c.ty_of("x"), Some(Ty::u8()));
    assert_eq!(c.ty_of("y"), Some(Ty::f64()));
}

// ── Globals and metadata ─────────────────────────────────────────────────

#[test]
fn globals() {
    let c = check("let a: u32 = 7;\nlet b = 5;\nlet c: bool = 1;");
    assert_debug_snapshot!(c.messages(), @r###"
    [
        "[main] test.berry:2:5: global variable missing type label",
        "[main] test.berry:3:15: untyped number cannot be implicitly converted to bool",
    ]
    "###);
}

#[test]
fn metadata_validation() {
    let c = check(concat!(
        "@extern func puts(s: *const u8) i32;\n",
        "@[extern, callconv(\"win64\")] func a();\n",
        "@abientry func main() {}\n",
        "@callconv(\"fastcall\") func b();\n",
        "@inline(\"yes\") func c() {}\n",
        "@packed func d() {}\n",
        "@extern func e() {}\n",
        "@callconv(\"c\") func g() {}\n",
        "@callconv func h();\n",
        "@[extern, abientry] func i();\n",
        "@[extern, inline] func j();\n",
        "@extern let k: i32 = 1;\n",
        "@inline let l: i32;\n",
        "@callconv(\"c\") let m: i32;\n",
        "@[extern, abientry] let n: i32;\n",
        "@extern let o: *u8;\n",
    ));
    assert_debug_snapshot!(c.bare_messages(), @r###"
    [
        "'fastcall' is not a valid value for metadata tag 'callconv'",
        "metadata tag 'inline' does not take a value",
        "unsupported metadata tag: 'packed'",
        "@extern function cannot have a body",
        "@callconv can only be applied to external functions",
        "@callconv requires an argument",
        "@abientry function cannot be marked @extern",
        "@inline function cannot be marked @extern",
        "@extern global variable cannot have an initializer",
        "global variable cannot be marked @inline",
        "global variable cannot be marked @callconv",
        "global variable cannot be marked both @extern and @abientry",
    ]
    "###);
    assert!(c
        .reporter
        .diagnostics()
        .iter()
        .all(|d| d.category == Category::Metadata));
}
