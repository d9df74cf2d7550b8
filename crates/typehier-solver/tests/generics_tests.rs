use super::*;

#[test]
fn test_plain_name_has_no_arguments() {
    let parsed = parse_type_and_arguments("java.lang.String").unwrap();
    assert_eq!(parsed.base, "java.lang.String");
    assert_eq!(parsed.args, "");
    assert!(!parsed.is_generic());
    assert!(parsed.arguments().unwrap().is_empty());
}

#[test]
fn test_outermost_brackets_are_stripped() {
    let parsed = parse_type_and_arguments("Map<String,List<Integer>>").unwrap();
    assert_eq!(parsed.base, "Map");
    assert_eq!(parsed.args, "String,List<Integer>");
    assert!(parsed.is_generic());
}

#[test]
fn test_split_ignores_nested_commas() {
    let args = split_top_level_arguments("Map<String,Integer>,List<String>").unwrap();
    assert_eq!(args.as_slice(), &["Map<String,Integer>", "List<String>"]);
}

#[test]
fn test_split_trims_whitespace() {
    let args = split_top_level_arguments(" K ,  Map< A , B > ,V").unwrap();
    assert_eq!(args.as_slice(), &["K", "Map< A , B >", "V"]);
}

#[test]
fn test_split_empty_list() {
    assert!(split_top_level_arguments("").unwrap().is_empty());
    assert!(split_top_level_arguments("   ").unwrap().is_empty());
}

#[test]
fn test_split_single_argument() {
    let args = split_top_level_arguments("List<Map<A,B>>").unwrap();
    assert_eq!(args.as_slice(), &["List<Map<A,B>>"]);
}

#[test]
fn test_missing_close_bracket_is_an_error() {
    let err = parse_type_and_arguments("List<String").unwrap_err();
    assert_eq!(
        err,
        GenericParseError::UnclosedBracket {
            input: "List<String".to_string(),
            position: 4,
        }
    );
    assert!(parse_type_ref("List<String").is_err());
}

#[test]
fn test_unbalanced_nested_bracket_is_an_error() {
    // The outer pair matches, leaving "A<B" unbalanced.
    let err = parse_type_ref("List<A<B>").unwrap_err();
    assert!(matches!(
        err,
        GenericParseError::UnclosedBracket { position: 1, .. }
    ));
}

#[test]
fn test_stray_close_bracket_is_an_error() {
    let err = split_top_level_arguments("A>,B").unwrap_err();
    assert!(matches!(
        err,
        GenericParseError::UnmatchedClose { position: 1, .. }
    ));
}

#[test]
fn test_error_messages_name_the_input() {
    let err = parse_type_ref("List<A<B>").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unclosed '<' at offset 1 in generic type `A<B`"
    );
}

#[test]
fn test_round_trip_reconstructs_type() {
    for source in [
        "Map<String,List<Integer>>",
        "Map<String, List<Integer>>",
        "Triple<A,Pair<B,C>,Map<D,List<E>>>",
        "java.util.List<java.lang.String>",
        "Object",
    ] {
        let parsed = parse_type_ref(source).unwrap();
        let rebuilt = parsed.to_string();
        let normalized: String = source.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(rebuilt, normalized, "round trip of {source}");
        assert_eq!(parse_type_ref(&rebuilt).unwrap(), parse_type_ref(&normalized).unwrap());
    }
}

#[test]
fn test_arguments_borrow_from_input() {
    let source = String::from("Pair<Left,Right>");
    let parsed = parse_type_and_arguments(&source).unwrap();
    let args = parsed.arguments().unwrap();
    assert_eq!(args.len(), 2);
    assert_eq!(args[0], "Left");
    assert_eq!(args[1], "Right");
}
