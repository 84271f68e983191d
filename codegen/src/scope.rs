//! Scope isolation for template instantiation arguments.
//!
//! Template arguments evaluate inside the enclosing block but must not see
//! or disturb the block's private variables. Each argument is compiled into
//! its own unit whose parameters are exactly the names the expression
//! references; the caller evaluates those names in the enclosing block and
//! passes the values in, so the argument body touches nothing else.

use std::collections::HashSet;

use canopy_dsl::ast::EmbeddedExpr;
use canopy_dsl::core::{Id, Located};
use canopy_dsl::diagnostic::{Diagnostic, Label};
use canopy_problems::Problem;
use canopy_unit::{CodeUnit, UnitBuilder};

use crate::emit::Emitter;
use crate::expr::{compile_expr, referenced_names, NameMode};

/// Compiles an expression into an isolated unit.
///
/// Returns the unit and the captured names, in first-reference order. Every
/// referenced name must be visible in the enclosing block per `lookup`;
/// a reference outside that set is reported rather than deferred to run
/// time, since the generated call site could never supply the value.
pub fn isolate(
    expr: &EmbeddedExpr,
    display_name: &str,
    lookup: &HashSet<String>,
) -> Result<(CodeUnit, Vec<Id>), Diagnostic> {
    let captured = referenced_names(&expr.ast);
    for id in &captured {
        if !lookup.contains(id.as_str()) {
            return Err(Diagnostic::problem(
                Problem::UndefinedName,
                Label::span(id.span(), "Name reference"),
            )
            .with_context("name", id.as_str())
            .with_secondary(Label::line(expr.line, "In this argument")));
        }
    }

    let mut emitter = Emitter::new();
    emitter.emit_set_line(expr.line);
    compile_expr(&mut emitter, &expr.ast, NameMode::Param);
    emitter.emit_return();
    let max_stack = emitter.max_stack_depth();

    let unit = UnitBuilder::new()
        .name(display_name)
        .params(captured.iter().map(|id| id.name.clone()).collect())
        .first_line(expr.line)
        .instructions(emitter.into_instructions())
        .max_stack(max_stack)
        .build();
    Ok((unit, captured))
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_dsl::expr::{BinaryOp, Expr};
    use canopy_unit::Instr;

    fn lookup(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| String::from(*n)).collect()
    }

    #[test]
    fn isolate_when_names_visible_then_params_in_reference_order() {
        let expr = EmbeddedExpr {
            ast: Expr::binary(
                BinaryOp::Add,
                Expr::name("second"),
                Expr::binary(BinaryOp::Mul, Expr::name("first"), Expr::name("second")),
            ),
            line: 7,
        };

        let (unit, captured) =
            isolate(&expr, "Panel", &lookup(&["first", "second"])).expect("visible names");

        assert_eq!(captured, vec![Id::from("second"), Id::from("first")]);
        assert_eq!(unit.params, vec!["second", "first"]);
        assert_eq!(unit.first_line, 7);
        assert_eq!(unit.name, "Panel");
        assert_eq!(unit.instructions[0], Instr::SetLine(7));
        assert_eq!(
            unit.instructions.last(),
            Some(&Instr::Return),
        );
        // Name references compile as parameter loads inside the unit.
        assert!(unit
            .instructions
            .iter()
            .any(|i| *i == Instr::LoadLocal(String::from("first"))));
    }

    #[test]
    fn isolate_when_no_names_then_no_params() {
        let expr = EmbeddedExpr {
            ast: Expr::int(42),
            line: 3,
        };

        let (unit, captured) = isolate(&expr, "Panel", &lookup(&[])).expect("constant");
        assert!(captured.is_empty());
        assert!(unit.params.is_empty());
    }

    #[test]
    fn isolate_when_name_not_visible_then_undefined_name() {
        let expr = EmbeddedExpr {
            ast: Expr::name("missing"),
            line: 5,
        };

        let diagnostic = isolate(&expr, "Panel", &lookup(&["present"]))
            .expect_err("reference outside the block");
        assert_eq!(diagnostic.code, Problem::UndefinedName.code());
        assert!(diagnostic.description().contains("name=missing"));
    }
}
