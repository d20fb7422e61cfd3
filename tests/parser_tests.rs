// Integration tests for parsing and syntax error recovery

use proptest::prelude::*;
use simple_lang::diagnostics::{ErrorKind, ErrorReminder};
use simple_lang::parser::ast::{DeclKind, File, StmtKind};
use simple_lang::parser::position::SourceFile;
use simple_lang::parser::Parser;
use simple_lang::{compile, tokenize};
use std::sync::Arc;

fn parse(source: &str) -> (File, ErrorReminder) {
    let mut errors = ErrorReminder::new();
    let file = Arc::new(SourceFile::new("test.c", source.len()));
    let ast = Parser::new(file, source, &mut errors).parse_file();
    (ast, errors)
}

#[test]
fn test_missing_closing_brace_yields_bad_decl() {
    let source = r#"
int f(int a) {
    if (a < 1) {
        return 1;
    }
    return a;
"#;
    let (file, errors) = parse(source);
    assert_eq!(file.decls.len(), 1);
    assert!(matches!(file.arena.decls[file.decls[0]].kind, DeclKind::Bad));
    assert!(errors.kinds().contains(&ErrorKind::Expected));
}

#[test]
fn test_following_declarations_survive_a_bad_one() {
    let source = r#"
int broken( { return 1; }
int a;
void main() {
    a = 1;
}
"#;
    let (file, errors) = parse(source);
    assert!(!errors.is_empty());
    let main = file.funcs().find(|f| f.name.name == "main");
    assert!(main.is_some(), "main lost after recovery: {}", errors.render());
}

#[test]
fn test_statement_recovery_inside_body() {
    let source = r#"
void main() {
    int a;
    a = ;
    a = 2;
}
"#;
    let (file, errors) = parse(source);
    assert_eq!(errors.len(), 1);
    let diag = errors.iter().next().unwrap();
    assert_eq!(diag.kind, ErrorKind::Expected);
    assert_eq!((diag.pos.line, diag.pos.column), (4, 9));

    let main = file.funcs().next().expect("main parsed");
    let StmtKind::Block { stmts } = &file.arena.stmts[main.body].kind else {
        panic!("expected block");
    };
    assert_eq!(stmts.len(), 3);
}

#[test]
fn test_unclosed_array_initializer_keeps_later_declarations() {
    let source = "int a[2] = {1, 2;\nint g;\nvoid main() { g = 1; }\n";
    let compilation = compile("test.c", source);
    assert_eq!(compilation.errors.kinds(), vec![ErrorKind::Expected]);
    assert_eq!(compilation.file.decls.len(), 3);
    assert!(compilation.file.funcs().any(|f| f.name.name == "main"));
}

#[test]
fn test_deeply_nested_expression_is_checked_without_overflow() {
    let depth = 20_000;
    let source = format!(
        "void main() {{ int a; a = {}-1{}; a = b; }}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let compilation = compile("deep.c", &source);
    assert_eq!(
        compilation.errors.kinds(),
        vec![ErrorKind::NestingTooDeep, ErrorKind::Undefine]
    );
}

#[test]
fn test_missing_brackets_and_parens() {
    let (_, errors) = parse("int a[3;");
    assert_eq!(errors.count_of(ErrorKind::RBrackExpected), 1);

    let (_, errors) = parse("void main() { printf(1; }");
    assert_eq!(errors.count_of(ErrorKind::RParenExpected), 1);
}

#[test]
fn test_semantic_checks_still_run_after_syntax_errors() {
    let source = "int a[2] = {1, };\nvoid main() { b = 1; }";
    let compilation = compile("test.c", source);
    let kinds = compilation.errors.kinds();
    assert!(kinds.contains(&ErrorKind::Expected));
    assert!(kinds.contains(&ErrorKind::Undefine));
}

#[test]
fn test_token_stream_for_keywords_and_operators() {
    let (tokens, errors) = tokenize("test.c", "const int main; x <= y != z");
    assert!(errors.is_empty());
    let codes: Vec<_> = tokens.iter().map(|t| t.kind.code()).collect();
    assert_eq!(
        codes,
        vec!["CONSTTK", "INTTK", "MAINTK", "SEMICN", "IDENFR", "LEQ", "IDENFR", "NEQ", "IDENFR", "END_OF_FILE"]
    );
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn parser_terminates_on_arbitrary_input(s in ".*") {
        let (file, _) = parse(&s);
        // Every top-level declaration consumes at least one byte.
        prop_assert!(file.decls.len() <= s.len());
    }

    #[test]
    fn parser_terminates_on_token_soup(
        words in prop::collection::vec(
            prop::sample::select(vec![
                "int", "char", "void", "const", "main", "if", "else", "while", "for",
                "switch", "case", "default", "return", "scanf", "printf", "x", "1", "'c'",
                "\"s\"", "(", ")", "[", "]", "{", "}", ";", ",", ":", "=", "==", "<", "+",
                "-", "*", "/", "!",
            ]),
            0..64,
        )
    ) {
        let source = words.join(" ");
        let compilation = compile("soup.c", &source);
        prop_assert!(compilation.file.decls.len() <= source.len());
    }
}
