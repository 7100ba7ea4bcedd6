use thiserror::Error;

/// A grammar that cannot be turned into LL(1) tables.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum GrammarError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("unknown rule or token name `{0}`")]
    UnknownName(String),
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
    #[error("rule `{0}` is defined twice")]
    DuplicateRule(String),
    #[error("no rule for `{0}`")]
    MissingRule(String),
    #[error("rule `{0}` is left-recursive")]
    LeftRecursive(String),
    #[error("rule `{rule}` is ambiguous: {label} can continue it in more than one way")]
    Ambiguous { rule: String, label: String },
    #[error("rule `{0}` needs more states than the tables can index")]
    TooManyStates(String),
}
