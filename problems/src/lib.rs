//! Problem codes and messages for the Canopy compiler.
//!
//! The `Problem` enumeration is generated at build time from
//! `resources/problem-codes.csv` so that problem codes remain stable
//! between releases and documentation stays in sync with the compiler.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_when_code_then_returns_stable_code() {
        assert_eq!(Problem::UndefinedName.code(), "C1001");
    }

    #[test]
    fn problem_when_message_then_not_empty() {
        assert!(!Problem::DuplicateIdentifier.message().is_empty());
    }

    #[test]
    fn problem_when_copied_then_comparable() {
        let problem = Problem::StorageOutsideObject;
        let copy = problem;

        assert_eq!(problem, copy);
        assert_ne!(problem, Problem::UndefinedName);
    }
}
