//! End-to-end tests compiling object declarations into code units.

mod common;

use canopy_codegen::{compile_object_decl, NODE_MAP, SCOPE_KEY};
use canopy_dsl::ast::StorageKind;
use canopy_dsl::expr::Expr;
use canopy_problems::Problem;
use canopy_unit::{helper, Const, Instr, UnitBuilder};
use rstest::rstest;

use common::{binding, child, object_decl, op_expr, storage};

fn s(value: &str) -> String {
    String::from(value)
}

#[test]
fn object_decl_when_child_with_bound_storage_then_exact_sequence() {
    common::init();

    // Main(Window):
    //     Label:
    //         attr text = "hi"
    let decl = object_decl(
        "Main",
        "Window",
        None,
        vec![child(
            "Label",
            None,
            vec![storage(
                "text",
                None,
                StorageKind::Attr,
                Some(op_expr("=", Expr::str("hi"), 3)),
                3,
            )],
            2,
        )],
        1,
    );

    let unit = compile_object_decl(&decl).expect("compiles");

    let text_unit = UnitBuilder::new()
        .name("text")
        .first_line(3)
        .instructions(vec![
            Instr::SetLine(3),
            Instr::LoadConst(Const::str("hi")),
            Instr::Return,
        ])
        .max_stack(1)
        .build();

    let expected = vec![
        // Block preamble: scope object, then node map.
        Instr::LoadHelper(s(helper::MAKE_SCOPE)),
        Instr::Call(0),
        Instr::StoreLocal(s(SCOPE_KEY)),
        Instr::BuildMap,
        Instr::StoreLocal(s(NODE_MAP)),
        // Root: validate the base, derive, build the node.
        Instr::SetLine(1),
        Instr::LoadGlobal(s("Window")),
        Instr::EnterFailureRegion { line: 1 },
        Instr::DupTop,
        Instr::LoadHelper(s(helper::VALIDATE_DECLARATIVE)),
        Instr::RotTwo,
        Instr::Call(1),
        Instr::PopTop,
        Instr::ExitFailureRegion,
        Instr::DeriveType {
            type_name: s("Main"),
        },
        Instr::DupTop,
        Instr::StoreLocal(s("_[var_0]")),
        Instr::LoadHelper(s(helper::DECLARATIVE_NODE)),
        Instr::RotTwo,
        Instr::LoadConst(Const::None),
        Instr::LoadLocal(s(SCOPE_KEY)),
        Instr::Call(3),
        Instr::StoreLocal(s("_[var_1]")),
        // Child: validate the type, derive it for the storage slot the
        // body adds, build the node.
        Instr::SetLine(2),
        Instr::LoadGlobal(s("Label")),
        Instr::EnterFailureRegion { line: 2 },
        Instr::DupTop,
        Instr::LoadHelper(s(helper::VALIDATE_DECLARATIVE)),
        Instr::RotTwo,
        Instr::Call(1),
        Instr::PopTop,
        Instr::ExitFailureRegion,
        Instr::DeriveType {
            type_name: s("Label"),
        },
        Instr::DupTop,
        Instr::StoreLocal(s("_[var_2]")),
        Instr::LoadHelper(s(helper::DECLARATIVE_NODE)),
        Instr::RotTwo,
        Instr::LoadConst(Const::None),
        Instr::LoadLocal(s(SCOPE_KEY)),
        Instr::Call(3),
        Instr::StoreLocal(s("_[var_3]")),
        // Declare the storage slot on the derived class.
        Instr::SetLine(3),
        Instr::EnterFailureRegion { line: 3 },
        Instr::LoadHelper(s(helper::ADD_STORAGE)),
        Instr::LoadLocal(s("_[var_2]")),
        Instr::LoadConst(Const::str("text")),
        Instr::LoadConst(Const::None),
        Instr::LoadConst(Const::str("attr")),
        Instr::Call(4),
        Instr::PopTop,
        Instr::ExitFailureRegion,
        // Bind the default value through the operator hook.
        Instr::SetLine(3),
        Instr::EnterFailureRegion { line: 3 },
        Instr::LoadHelper(s(helper::RUN_OPERATOR)),
        Instr::LoadLocal(s("_[var_3]")),
        Instr::LoadConst(Const::str("text")),
        Instr::LoadConst(Const::str("=")),
        Instr::LoadConst(Const::code(text_unit)),
        Instr::LoadLocal(s(SCOPE_KEY)),
        Instr::Call(5),
        Instr::PopTop,
        Instr::ExitFailureRegion,
        // Append the child to the root node.
        Instr::LoadLocal(s("_[var_1]")),
        Instr::LoadAttr(s("children")),
        Instr::LoadAttr(s("append")),
        Instr::LoadLocal(s("_[var_3]")),
        Instr::Call(1),
        Instr::PopTop,
        // Return the populated root.
        Instr::LoadLocal(s("_[var_1]")),
        Instr::Return,
    ];

    assert_eq!(unit.instructions, expected);
    assert_eq!(unit.name, "Main");
    assert!(unit.params.is_empty());
    assert_eq!(unit.first_line, 1);
    assert_eq!(unit.max_stack, 6);
}

#[test]
fn object_decl_when_root_then_always_derives() {
    let decl = object_decl("Main", "Window", None, vec![], 1);

    let unit = compile_object_decl(&decl).expect("compiles");
    assert!(unit.instructions.contains(&Instr::DeriveType {
        type_name: s("Main")
    }));
}

#[test]
fn child_def_when_no_storage_then_no_derived_type() {
    let decl = object_decl(
        "Main",
        "Window",
        None,
        vec![child("Label", None, vec![], 2)],
        1,
    );

    let unit = compile_object_decl(&decl).expect("compiles");
    assert!(!unit.instructions.contains(&Instr::DeriveType {
        type_name: s("Label")
    }));
}

#[test]
fn child_def_when_storage_then_derived_type() {
    let decl = object_decl(
        "Main",
        "Window",
        None,
        vec![child(
            "Label",
            None,
            vec![storage("count", None, StorageKind::Attr, None, 3)],
            2,
        )],
        1,
    );

    let unit = compile_object_decl(&decl).expect("compiles");
    assert!(unit.instructions.contains(&Instr::DeriveType {
        type_name: s("Label")
    }));
}

#[test]
fn child_def_when_identifier_then_stored_in_map_and_local() {
    let decl = object_decl(
        "Main",
        "Window",
        Some("main"),
        vec![child("Label", Some("lbl"), vec![], 2)],
        1,
    );

    let unit = compile_object_decl(&decl).expect("compiles");

    // The identifier passes to the node constructor.
    assert!(unit.instructions.contains(&Instr::LoadConst(Const::str("lbl"))));
    // The node is recorded in the run-time node map.
    assert!(unit.instructions.contains(&Instr::LoadLocal(s(NODE_MAP))));
    assert!(unit.instructions.contains(&Instr::StoreMap));
    // And mirrored into a fast local under the identifier.
    assert!(unit.instructions.contains(&Instr::StoreLocal(s("lbl"))));
    assert!(unit.instructions.contains(&Instr::StoreLocal(s("main"))));
}

#[test]
fn storage_when_typed_with_default_then_type_loads_and_binding_follows() {
    let decl = object_decl(
        "Main",
        "Window",
        None,
        vec![storage(
            "count",
            Some("int"),
            StorageKind::Attr,
            Some(op_expr("=", Expr::int(0), 2)),
            2,
        )],
        1,
    );

    let unit = compile_object_decl(&decl).expect("compiles");

    let add_storage = unit
        .instructions
        .iter()
        .position(|i| *i == Instr::LoadHelper(s(helper::ADD_STORAGE)))
        .expect("storage helper");
    // The declared type resolves by name at run time.
    assert_eq!(
        unit.instructions[add_storage + 3],
        Instr::LoadGlobal(s("int"))
    );
    assert_eq!(
        unit.instructions[add_storage + 4],
        Instr::LoadConst(Const::str("attr"))
    );
    // The default binding dispatches after the slot exists.
    let run_operator = unit
        .instructions
        .iter()
        .position(|i| *i == Instr::LoadHelper(s(helper::RUN_OPERATOR)))
        .expect("operator hook");
    assert!(run_operator > add_storage);
}

#[rstest]
#[case("=")]
#[case("<<")]
#[case(">>")]
#[case("::")]
#[case(":=")]
fn binding_when_any_operator_then_token_passes_through(#[case] operator: &str) {
    let decl = object_decl(
        "Main",
        "Window",
        None,
        vec![binding("text", operator, Expr::name("value"), 2)],
        1,
    );

    let unit = compile_object_decl(&decl).expect("compiles");
    assert!(unit
        .instructions
        .contains(&Instr::LoadConst(Const::str(operator))));
}

#[test]
fn binding_when_expression_then_unit_resolves_names_dynamically() {
    let decl = object_decl(
        "Main",
        "Window",
        None,
        vec![child(
            "Label",
            Some("lbl"),
            vec![binding(
                "text",
                "<<",
                Expr::attribute(Expr::name("lbl"), "tool_tip"),
                3,
            )],
            2,
        )],
        1,
    );

    let unit = compile_object_decl(&decl).expect("compiles");
    let embedded = unit
        .instructions
        .iter()
        .find_map(|i| match i {
            Instr::LoadConst(Const::Code(code)) => Some(code),
            _ => None,
        })
        .expect("embedded unit");

    // Even a block identifier resolves dynamically inside a bound
    // expression; the reactive runtime supplies the scope.
    assert_eq!(embedded.name, "text");
    assert_eq!(embedded.first_line, 3);
    assert!(embedded.instructions.contains(&Instr::LoadName(s("lbl"))));
}

#[test]
fn object_decl_when_duplicate_identifiers_then_error() {
    let decl = object_decl(
        "Main",
        "Window",
        None,
        vec![
            child("Label", Some("lbl"), vec![], 2),
            child("Label", Some("lbl"), vec![], 3),
        ],
        1,
    );

    let diagnostic = compile_object_decl(&decl).expect_err("duplicate identifier");
    assert_eq!(diagnostic.code, Problem::DuplicateIdentifier.code());
}

#[test]
fn object_decl_when_reserved_identifier_then_error() {
    let decl = object_decl(
        "Main",
        "Window",
        None,
        vec![child("Label", Some("_[var_0]"), vec![], 2)],
        1,
    );

    let diagnostic = compile_object_decl(&decl).expect_err("reserved identifier");
    assert_eq!(diagnostic.code, Problem::ReservedIdentifier.code());
}

#[test]
fn object_decl_when_nested_children_then_temporaries_recycle() {
    // Two sibling children compile one after the other; the second reuses
    // the temporaries the first released.
    let decl = object_decl(
        "Main",
        "Window",
        None,
        vec![
            child("Label", None, vec![], 2),
            child("Field", None, vec![], 3),
        ],
        1,
    );

    let unit = compile_object_decl(&decl).expect("compiles");

    let stores: Vec<&Instr> = unit
        .instructions
        .iter()
        .filter(|i| matches!(i, Instr::StoreLocal(name) if name.starts_with("_[var_")))
        .collect();
    // Root claims _[var_0] and _[var_1]; both children claim and release
    // _[var_2] and _[var_3].
    assert_eq!(
        stores,
        vec![
            &Instr::StoreLocal(s("_[var_0]")),
            &Instr::StoreLocal(s("_[var_1]")),
            &Instr::StoreLocal(s("_[var_2]")),
            &Instr::StoreLocal(s("_[var_3]")),
            &Instr::StoreLocal(s("_[var_2]")),
            &Instr::StoreLocal(s("_[var_3]")),
        ]
    );
}
