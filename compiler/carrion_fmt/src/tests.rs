//! Formatter tests: canonical layouts, idempotence, fidelity.

use crate::{format_source, FormatConfig};

fn fmt(source: &str) -> String {
    format_source(source, &FormatConfig::default()).expect("formats cleanly")
}

#[test]
fn assignment_gets_spaced_operator() {
    assert_eq!(fmt("x=1\n"), "x = 1\n");
    assert_eq!(fmt("x+=2\n"), "x += 2\n");
}

#[test]
fn infix_spacing() {
    assert_eq!(
        fmt("spell greet(name):\n    return \"Hello, \"+name\n"),
        "spell greet(name):\n    return \"Hello, \" + name\n"
    );
}

#[test]
fn function_layout_with_docstring() {
    let src = "spell f( a,b ):\n    \"\"\"Adds.\"\"\"\n    return a+b\n";
    assert_eq!(
        fmt(src),
        "spell f(a, b):\n    \"\"\"Adds.\"\"\"\n    return a + b\n"
    );
}

#[test]
fn class_layout() {
    let src = "grim Person:\n    init(name):\n        self.name=name\n    spell greet():\n        return \"hi\"\n";
    assert_eq!(
        fmt(src),
        "grim Person:\n    init(name):\n        self.name = name\n    spell greet():\n        return \"hi\"\n"
    );
}

#[test]
fn class_with_parent_and_arcane() {
    assert_eq!(
        fmt("grim Dog(Animal):\n    spell bark():\n        return 1\n"),
        "grim Dog(Animal):\n    spell bark():\n        return 1\n"
    );
    assert_eq!(
        fmt("arcane grim OS:\n    spell cwd():\n        ignore\n"),
        "arcane grim OS:\n    spell cwd():\n        ignore\n"
    );
}

#[test]
fn two_blank_lines_between_class_and_main() {
    let src = "grim A:\n    spell m():\n        return 1\nmain:\n    x = 1\n";
    let out = fmt(src);
    assert!(
        out.contains("return 1\n\n\nmain:"),
        "expected two blank lines, got:\n{out}"
    );
}

#[test]
fn blank_line_after_function_before_non_function() {
    let out = fmt("spell f():\n    return 1\nx = 2\n");
    assert_eq!(out, "spell f():\n    return 1\n\nx = 2\n");
}

#[test]
fn no_blank_line_between_adjacent_functions() {
    let out = fmt("spell a():\n    return 1\nspell b():\n    return 2\n");
    assert_eq!(out, "spell a():\n    return 1\nspell b():\n    return 2\n");
}

#[test]
fn conditional_chain_layout() {
    let src = "if a:\n    x=1\notherwise b:\n    x=2\nelse:\n    x=3\n";
    assert_eq!(
        fmt(src),
        "if a:\n    x = 1\notherwise b:\n    x = 2\nelse:\n    x = 3\n"
    );
}

#[test]
fn attempt_layout() {
    let src = "attempt:\n    risky()\nensnare(Error) as e:\n    log(e)\nresolve:\n    done()\n";
    assert_eq!(
        fmt(src),
        "attempt:\n    risky()\nensnare(Error) as e:\n    log(e)\nresolve:\n    done()\n"
    );
}

#[test]
fn autoclose_and_import_layout() {
    assert_eq!(
        fmt("autoclose open(\"f\") as fh:\n    fh.read()\n"),
        "autoclose open(\"f\") as fh:\n    fh.read()\n"
    );
    assert_eq!(
        fmt("import \"http/client\".Client as Http\n"),
        "import \"http/client\".Client as Http\n"
    );
}

#[test]
fn match_layout() {
    let src = "match x:\n    case 1:\n        a()\n    default:\n        b()\n";
    assert_eq!(
        fmt(src),
        "match x:\n    case 1:\n        a()\n    default:\n        b()\n"
    );
}

#[test]
fn short_array_stays_inline_long_array_breaks() {
    assert_eq!(fmt("xs = [1, 2, 3]\n"), "xs = [1, 2, 3]\n");
    assert_eq!(
        fmt("xs = [1, 2, 3, 4]\n"),
        "xs = [\n    1,\n    2,\n    3,\n    4\n]\n"
    );
}

#[test]
fn short_hash_stays_inline_long_hash_breaks() {
    assert_eq!(fmt("h = {\"a\": 1, \"b\": 2}\n"), "h = {\"a\": 1, \"b\": 2}\n");
    let out = fmt("h = {\"a\": 1, \"b\": 2, \"c\": 3}\n");
    assert_eq!(out, "h = {\n    \"a\": 1,\n    \"b\": 2,\n    \"c\": 3\n}\n");
}

#[test]
fn nested_array_break_uses_statement_indent() {
    let src = "spell f():\n    xs = [1, 2, 3, 4]\n";
    let out = fmt(src);
    assert_eq!(
        out,
        "spell f():\n    xs = [\n        1,\n        2,\n        3,\n        4\n    ]\n"
    );
}

#[test]
fn grouping_parens_survive_round_trip() {
    assert_eq!(fmt("x = (a + b) * c\n"), "x = (a + b) * c\n");
    assert_eq!(fmt("x = a + b * c\n"), "x = a + b * c\n");
    assert_eq!(fmt("x = a - (b - c)\n"), "x = a - (b - c)\n");
    assert_eq!(fmt("x = not (a and b)\n"), "x = not (a and b)\n");
}

#[test]
fn floats_keep_their_point() {
    assert_eq!(fmt("x = 2.0\n"), "x = 2.0\n");
    assert_eq!(fmt("x = 1.5\n"), "x = 1.5\n");
}

#[test]
fn strings_are_reescaped() {
    assert_eq!(fmt("s = \"a\\nb\"\n"), "s = \"a\\nb\"\n");
    assert_eq!(fmt("s = \"say \\\"hi\\\"\"\n"), "s = \"say \\\"hi\\\"\"\n");
}

#[test]
fn tabs_indent_when_spaces_disabled() {
    let config = FormatConfig {
        insert_spaces: false,
        ..FormatConfig::default()
    };
    let out = format_source("spell f():\n    return 1\n", &config).unwrap();
    assert_eq!(out, "spell f():\n\treturn 1\n");
}

#[test]
fn parse_errors_refuse_to_format() {
    assert!(format_source("spell f(:\n", &FormatConfig::default()).is_err());
}

#[test]
fn empty_source_formats_to_empty() {
    assert_eq!(fmt(""), "");
}

#[test]
fn output_ends_with_exactly_one_newline() {
    let out = fmt("x = 1\n\n\n");
    assert_eq!(out, "x = 1\n");
}

mod properties {
    use super::*;
    use crate::format_program;
    use proptest::prelude::*;

    /// Formatting is idempotent for a corpus of representative programs.
    #[test]
    fn idempotent_on_corpus() {
        let corpus = [
            "x=1\n",
            "spell greet(name):\n    return \"Hello, \"+name\n",
            "grim P:\n    init(n):\n        self.n=n\n    spell g():\n        return self.n\n\nspell t():\n    return 1\n",
            "if a:\n    x=1\notherwise b:\n    x=2\nelse:\n    x=3\n",
            "for i in range(10):\n    total+=i\nelse:\n    done()\n",
            "attempt:\n    risky()\nensnare as e:\n    log(e)\nresolve:\n    cleanup()\n",
            "match x:\n    case 1:\n        a()\n    default:\n        b()\n",
            "xs = [1, 2, 3, 4, 5]\nh = {\"a\": 1, \"b\": 2, \"c\": 3}\nt = (1, 2)\n",
            "grim A:\n    spell m():\n        return 1\nmain:\n    print(A)\n",
            "import \"pkg\"\nglobal a, b\nautoclose open(\"f\") as fh:\n    fh.read()\n",
        ];
        for src in corpus {
            let once = fmt(src);
            let twice = fmt(&once);
            assert_eq!(once, twice, "not idempotent for:\n{src}");
        }
    }

    /// Reparsing formatted output yields a structurally equal program:
    /// rendering is a pure function of structure, so equal renderings of
    /// the reparse witness equality modulo positions.
    #[test]
    fn fidelity_on_corpus() {
        let config = FormatConfig::default();
        let corpus = [
            "x = (a + b) * c\n",
            "y = a - (b - c) - d\n",
            "spell f(a, b = 2, c = \"x\"):\n    return [a, b, c, a]\n",
            "grim P(Base):\n    init():\n        self.v = {\"k\": [1, 2, 3, 4]}\n",
            "if not (a and b):\n    raise \"bad\"\n",
        ];
        for src in corpus {
            let once = fmt(src);
            let (reparsed, errors) = carrion_parse::parse(&once);
            assert!(errors.is_empty(), "formatted output failed to reparse: {once}");
            assert_eq!(
                format_program(&reparsed, &config),
                once,
                "structure drifted for:\n{src}"
            );
        }
    }

    proptest! {
        /// Random flat assignments of random literals survive
        /// format-format with a fixed point.
        #[test]
        fn idempotent_for_literal_assignments(
            name in "[a-z][a-z0-9_]{0,8}",
            value in -1000i64..1000,
            elements in prop::collection::vec(0i64..100, 0..6),
        ) {
            let array = elements
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let src = format!("{name} = {value}\nys = [{array}]\n");
            let once = fmt(&src);
            prop_assert_eq!(fmt(&once), once.clone());
            // Formatted output must reparse cleanly.
            let (_, errors) = carrion_parse::parse(&once);
            prop_assert!(errors.is_empty());
        }
    }
}
