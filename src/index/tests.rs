use super::*;
use crate::error::SpecificationError;
use crate::spec::{OptionDecl, PositionalDecl, Spec};

fn sample_spec() -> Spec {
    let mut spec = Spec::new("root");
    let root = spec.root();
    spec.add_option(root, OptionDecl::flag(["-v", "--verbose"]))
        .add_option(
            root,
            OptionDecl::with_value(["--color"]).choices(["auto", "never"]),
        )
        .add_positional(root, PositionalDecl::new("input").choices(["a.txt", "b.txt"]));

    let build = spec.add_subcommand(root, "build");
    spec.add_positional(
        build,
        PositionalDecl::new("dir")
            .arity(Arity::OneOrMore)
            .provider("directory-completer"),
    );
    let release = spec.add_subcommand(build, "release");
    spec.add_option(release, OptionDecl::flag(["--strip"]));
    spec.add_subcommand(root, "test");
    spec
}

#[test]
fn test_prefixes_cover_every_node() {
    let index = build(&sample_spec()).unwrap();
    let prefixes: Vec<&str> = index.prefixes().collect();
    assert_eq!(
        prefixes,
        vec!["root", "root_build", "root_build_release", "root_test"]
    );

    for prefix in &prefixes {
        assert!(index.subcommand_table().contains_key(*prefix));
        assert!(index.option_table().contains_key(*prefix));
        assert!(index.choice_table().contains_key(*prefix));
        assert!(index.provider_table().contains_key(*prefix));
        assert!(index.arity_table().contains_key(*prefix));
    }
}

#[test]
fn test_subcommands_keep_declaration_order() {
    let index = build(&sample_spec()).unwrap();
    assert_eq!(index.subcommands("root"), &["build".to_string(), "test".to_string()]);
    assert!(index.subcommands("root_test").is_empty());
}

#[test]
fn test_every_alias_is_registered() {
    let index = build(&sample_spec()).unwrap();
    assert_eq!(
        index.option_strings("root"),
        &["-v".to_string(), "--verbose".to_string(), "--color".to_string()]
    );
    assert_eq!(index.arity("root", "-v"), Some(Arity::Exactly(0)));
    assert_eq!(index.arity("root", "--verbose"), Some(Arity::Exactly(0)));
    assert_eq!(index.choices("root", "--color"), &["auto".to_string(), "never".to_string()]);
}

#[test]
fn test_positional_slots() {
    let index = build(&sample_spec()).unwrap();
    assert_eq!(index.arity("root", "pos_0"), Some(Arity::Exactly(1)));
    assert_eq!(index.choices("root", "pos_0").len(), 2);
    assert_eq!(index.arity("root_build", "pos_0"), Some(Arity::OneOrMore));
    assert_eq!(index.provider("root_build", "pos_0"), Some("directory-completer"));
    assert_eq!(index.arity("root_build", "pos_1"), None);
}

#[test]
fn test_unknown_prefix_falls_back_to_root() {
    let index = build(&sample_spec()).unwrap();
    assert_eq!(index.resolve("root_nope"), "root");
    assert_eq!(index.subcommands("root_nope"), index.subcommands("root"));
}

#[test]
fn test_duplicate_subcommand_is_rejected() {
    let mut spec = Spec::new("prog");
    let root = spec.root();
    spec.add_subcommand(root, "build");
    spec.add_subcommand(root, "build");

    assert_eq!(
        build(&spec).unwrap_err(),
        SpecificationError::DuplicateSubcommand {
            prefix: "prog".to_string(),
            name: "build".to_string(),
        }
    );
}

#[test]
fn test_conflicting_option_is_rejected() {
    let mut spec = Spec::new("prog");
    let root = spec.root();
    spec.add_option(root, OptionDecl::flag(["-o", "--out"]))
        .add_option(root, OptionDecl::with_value(["-o", "--output"]));

    assert_eq!(
        build(&spec).unwrap_err(),
        SpecificationError::ConflictingOption {
            prefix: "prog".to_string(),
            flag: "-o".to_string(),
        }
    );
}

#[test]
fn test_identical_redeclaration_is_merged() {
    let mut spec = Spec::new("prog");
    let root = spec.root();
    spec.add_option(root, OptionDecl::flag(["-q"]))
        .add_option(root, OptionDecl::flag(["-q", "--quiet"]));

    let index = build(&spec).unwrap();
    assert_eq!(index.option_strings("prog"), &["-q".to_string(), "--quiet".to_string()]);
}

#[test]
fn test_colliding_prefixes_are_rejected() {
    let mut spec = Spec::new("prog");
    let root = spec.root();
    spec.add_subcommand(root, "a_b");
    let a = spec.add_subcommand(root, "a");
    spec.add_subcommand(a, "b");

    assert_eq!(
        build(&spec).unwrap_err(),
        SpecificationError::DuplicatePrefix {
            prefix: "prog_a_b".to_string(),
        }
    );
}

#[test]
fn test_invalid_names_are_rejected() {
    let mut spec = Spec::new("prog");
    let root = spec.root();
    spec.add_subcommand(root, "two words");
    assert!(matches!(
        build(&spec),
        Err(SpecificationError::InvalidName { .. })
    ));

    let mut spec = Spec::new("prog");
    let root = spec.root();
    spec.add_subcommand(root, "--");
    assert!(matches!(
        build(&spec),
        Err(SpecificationError::InvalidName { .. })
    ));

    let mut spec = Spec::new("prog");
    let root = spec.root();
    spec.add_option(root, OptionDecl::flag(["pos_0"]));
    assert!(matches!(
        build(&spec),
        Err(SpecificationError::InvalidName { .. })
    ));

    let mut spec = Spec::new("prog");
    let root = spec.root();
    spec.add_positional(root, PositionalDecl::new("x").choices(["line\nbreak"]));
    assert!(matches!(
        build(&spec),
        Err(SpecificationError::InvalidName { .. })
    ));
}

#[test]
fn test_build_does_not_touch_the_tree() {
    let spec = sample_spec();
    let before = format!("{spec:?}");
    let _ = build(&spec).unwrap();
    assert_eq!(format!("{spec:?}"), before);
}

#[test]
fn test_index_serializes_arity_as_text() {
    let index = build(&sample_spec()).unwrap();
    let json = serde_json::to_value(&index).unwrap();
    assert_eq!(json["arity"]["root_build"]["pos_0"], "+");
    assert_eq!(json["root"], "root");
}
