//! Parser tests: statement shapes, recovery, expression precedence.

use crate::parse;
use carrion_ir::ast::*;

fn parse_clean(source: &str) -> Program {
    let (program, errors) = parse(source);
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    program
}

#[test]
fn function_with_body() {
    let program = parse_clean("spell greet(name):\n    return \"hi\"\n");
    assert_eq!(program.statements.len(), 1);
    let Statement::Function(f) = &program.statements[0] else {
        panic!("expected function, got {:?}", program.statements[0]);
    };
    assert_eq!(f.name, "greet");
    assert_eq!(f.params.len(), 1);
    assert_eq!(f.params[0].name, "name");
    assert_eq!(f.body.statements.len(), 1);
    assert!(matches!(f.body.statements[0], Statement::Return(_)));
}

#[test]
fn function_docstring_is_extracted() {
    let src = "spell f():\n    \"\"\"Does things.\"\"\"\n    return 1\n";
    let program = parse_clean(src);
    let Statement::Function(f) = &program.statements[0] else {
        panic!();
    };
    assert_eq!(f.doc_string.as_deref(), Some("Does things."));
    assert_eq!(f.body.statements.len(), 1);
}

#[test]
fn grimoire_with_init_and_methods() {
    let src = "grim Person:\n    init(name):\n        self.name = name\n    spell greet():\n        return \"hi\"\n";
    let program = parse_clean(src);
    let Statement::Class(c) = &program.statements[0] else {
        panic!("expected class, got {:?}", program.statements[0]);
    };
    assert_eq!(c.name, "Person");
    assert!(c.init.is_some());
    assert_eq!(c.methods.len(), 1);
    assert_eq!(c.methods[0].name, "greet");
    assert!(!c.is_arcane);
}

#[test]
fn arcane_grimoire_and_inheritance() {
    let src = "arcane grim OS:\n    spell cwd():\n        return \"\"\n\ngrim Child(Parent):\n    spell m():\n        return 1\n";
    let program = parse_clean(src);
    let Statement::Class(os) = &program.statements[0] else {
        panic!();
    };
    assert!(os.is_arcane);
    let Statement::Class(child) = &program.statements[1] else {
        panic!();
    };
    assert_eq!(child.inherits.as_deref(), Some("Parent"));
}

#[test]
fn inline_suites_parse() {
    let src = "grim P: init(n): self.n = n\n";
    let program = parse_clean(src);
    let Statement::Class(c) = &program.statements[0] else {
        panic!();
    };
    let init = c.init.as_ref().expect("init");
    assert_eq!(init.params[0].name, "n");
    assert!(matches!(init.body.statements[0], Statement::Assign(_)));
}

#[test]
fn if_otherwise_else_chain() {
    let src = "if a:\n    x = 1\notherwise b:\n    x = 2\nelse:\n    x = 3\n";
    let program = parse_clean(src);
    let Statement::If(stmt) = &program.statements[0] else {
        panic!();
    };
    assert_eq!(stmt.otherwise_branches.len(), 1);
    assert!(stmt.alternative.is_some());
}

#[test]
fn for_with_else() {
    let src = "for i in items:\n    use(i)\nelse:\n    done()\n";
    let program = parse_clean(src);
    let Statement::For(stmt) = &program.statements[0] else {
        panic!();
    };
    assert!(stmt.alternative.is_some());
    assert_eq!(stmt.variable.as_identifier(), Some("i"));
}

#[test]
fn attempt_ensnare_resolve() {
    let src = "attempt:\n    risky()\nensnare(Error) as e:\n    log(e)\nensnare:\n    other()\nresolve:\n    cleanup()\n";
    let program = parse_clean(src);
    let Statement::Attempt(stmt) = &program.statements[0] else {
        panic!();
    };
    assert_eq!(stmt.ensnare_clauses.len(), 2);
    assert!(stmt.ensnare_clauses[0].condition.is_some());
    assert_eq!(stmt.ensnare_clauses[0].alias.as_deref(), Some("e"));
    assert!(stmt.ensnare_clauses[1].condition.is_none());
    assert!(stmt.resolve_block.is_some());
}

#[test]
fn import_forms() {
    let src = "import \"json-utils\"\nimport \"http/client\".Client as Http\n";
    let program = parse_clean(src);
    let Statement::Import(plain) = &program.statements[0] else {
        panic!();
    };
    assert_eq!(plain.path, "json-utils");
    assert!(plain.imported_name.is_none());
    let Statement::Import(full) = &program.statements[1] else {
        panic!();
    };
    assert_eq!(full.path, "http/client");
    assert_eq!(full.imported_name.as_deref(), Some("Client"));
    assert_eq!(full.alias.as_deref(), Some("Http"));
}

#[test]
fn match_cases_and_default() {
    let src = "match x:\n    case 1:\n        a()\n    case 2:\n        b()\n    default:\n        c()\n";
    let program = parse_clean(src);
    let Statement::Match(stmt) = &program.statements[0] else {
        panic!();
    };
    assert_eq!(stmt.cases.len(), 2);
    assert!(stmt.default.is_some());
}

#[test]
fn main_global_autoclose() {
    let src = "global counter, total\nmain:\n    autoclose open(\"f\") as fh:\n        fh.read()\n";
    let program = parse_clean(src);
    let Statement::Global(g) = &program.statements[0] else {
        panic!();
    };
    assert_eq!(g.names, vec!["counter".to_string(), "total".to_string()]);
    let Statement::Main(m) = &program.statements[1] else {
        panic!();
    };
    assert!(matches!(m.body.statements[0], Statement::Autoclose(_)));
}

#[test]
fn assignment_operators() {
    let program = parse_clean("x = 1\nx += 2\ny -= 3\n");
    let ops: Vec<_> = program
        .statements
        .iter()
        .map(|s| match s {
            Statement::Assign(a) => a.operator.clone(),
            _ => panic!(),
        })
        .collect();
    assert_eq!(ops, vec!["=", "+=", "-="]);
}

#[test]
fn precedence_binds_product_tighter() {
    let program = parse_clean("x = a + b * c\n");
    let Statement::Assign(a) = &program.statements[0] else {
        panic!();
    };
    let Expression::Infix(add) = &a.value else {
        panic!();
    };
    assert_eq!(add.operator, "+");
    let Expression::Infix(mul) = add.right.as_ref() else {
        panic!("expected b * c on the right");
    };
    assert_eq!(mul.operator, "*");
}

#[test]
fn grouping_overrides_precedence() {
    let program = parse_clean("x = (a + b) * c\n");
    let Statement::Assign(a) = &program.statements[0] else {
        panic!();
    };
    let Expression::Infix(mul) = &a.value else {
        panic!();
    };
    assert_eq!(mul.operator, "*");
    assert!(matches!(mul.left.as_ref(), Expression::Infix(_)));
}

#[test]
fn postfix_chain() {
    let program = parse_clean("x = obj.items[0].name(1, 2)\n");
    let Statement::Assign(a) = &program.statements[0] else {
        panic!();
    };
    let Expression::Call(call) = &a.value else {
        panic!();
    };
    assert_eq!(call.args.len(), 2);
    assert!(matches!(call.callee.as_ref(), Expression::Dot(_)));
}

#[test]
fn slices_and_indexing() {
    let program = parse_clean("a = xs[1]\nb = xs[1:2]\nc = xs[:2]\nd = xs[1:]\n");
    let kinds: Vec<_> = program
        .statements
        .iter()
        .map(|s| match s {
            Statement::Assign(a) => &a.value,
            _ => panic!(),
        })
        .collect();
    assert!(matches!(kinds[0], Expression::Index(_)));
    assert!(matches!(kinds[1], Expression::Slice(_)));
    assert!(matches!(kinds[2], Expression::Slice(_)));
    assert!(matches!(kinds[3], Expression::Slice(_)));
}

#[test]
fn literals() {
    let src = "a = [1, 2, 3]\nb = {\"k\": 1, \"j\": 2}\nc = (1, 2)\nd = None\ne = True\nf = 1.5\n";
    let program = parse_clean(src);
    let values: Vec<_> = program
        .statements
        .iter()
        .map(|s| match s {
            Statement::Assign(a) => &a.value,
            _ => panic!(),
        })
        .collect();
    assert!(matches!(values[0], Expression::ArrayLit(a) if a.elements.len() == 3));
    assert!(matches!(values[1], Expression::HashLit(h) if h.pairs.len() == 2));
    assert!(matches!(values[2], Expression::TupleLit(t) if t.elements.len() == 2));
    assert!(matches!(values[3], Expression::NoneLit(_)));
    assert!(matches!(values[4], Expression::BoolLit(b) if b.value));
    assert!(matches!(values[5], Expression::FloatLit(_)));
}

#[test]
fn multiline_array_parses() {
    let src = "xs = [\n    1,\n    2,\n    3,\n    4\n]\n";
    let program = parse_clean(src);
    let Statement::Assign(a) = &program.statements[0] else {
        panic!();
    };
    assert!(matches!(&a.value, Expression::ArrayLit(arr) if arr.elements.len() == 4));
}

#[test]
fn errors_recover_per_statement() {
    let src = "x = = 1\ny = 2\n";
    let (program, errors) = parse(src);
    assert!(!errors.is_empty());
    // The second statement still parses.
    assert!(program
        .statements
        .iter()
        .any(|s| matches!(s, Statement::Assign(a) if a.target.as_identifier() == Some("y"))));
}

#[test]
fn error_in_block_keeps_following_methods() {
    let src = "grim P:\n    spell good():\n        return 1\n    spell bad(:\n        return 2\n    spell tail():\n        return 3\n";
    let (program, errors) = parse(src);
    assert!(!errors.is_empty());
    let Some(Statement::Class(c)) = program.statements.first() else {
        panic!();
    };
    let names: Vec<_> = c.methods.iter().map(|m| m.name.as_str()).collect();
    assert!(names.contains(&"good"));
}

#[test]
fn statement_spans_lie_within_text() {
    let src = "spell f():\n    return 1\n\ngrim C:\n    init():\n        self.x = 1\n";
    let program = parse_clean(src);
    for stmt in &program.statements {
        let span = stmt.span();
        assert!((span.end as usize) <= src.len());
        assert!(span.start <= span.end);
    }
}
