use wheelhouse_core::requirement::parse_requirements;

#[test]
fn declared_order_preserved() {
    let text = "\
# web stack
flask==3.0.0
requests>=2.28,<3

# data
numpy
";
    let reqs = parse_requirements(text);
    assert_eq!(reqs.len(), 3);
    assert_eq!(reqs[0].name, "flask");
    assert_eq!(reqs[1].name, "requests");
    assert_eq!(reqs[1].constraint.as_deref(), Some(">=2.28,<3"));
    assert_eq!(reqs[2].name, "numpy");
    assert!(reqs[2].constraint.is_none());
}

#[test]
fn empty_file_yields_no_requirements() {
    assert!(parse_requirements("").is_empty());
    assert!(parse_requirements("\n# only comments\n\n").is_empty());
}

#[test]
fn option_lines_ignored() {
    let text = "-r base.txt\n--no-binary :all:\nclick==8.1.7\n";
    let reqs = parse_requirements(text);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].name, "click");
}
