//! Nonterminal symbols of the reference grammar.
//!
//! Symbols are numbered from [`Symbol::OFFSET`] so that a single integer
//! space can hold both terminals and nonterminals in tree dumps. The grammar
//! compiler maps each rule name onto one of these variants; a rule whose
//! name is missing here is a grammar error.

use std::fmt;

/// A grammar nonterminal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Symbol {
    FileInput,
    SingleInput,
    EvalInput,
    Decorator,
    Decorators,
    Decorated,
    AsyncFuncdef,
    Funcdef,
    Parameters,
    Varargslist,
    Vfpdef,
    Stmt,
    SimpleStmt,
    SmallStmt,
    ExprStmt,
    Augassign,
    DelStmt,
    PassStmt,
    FlowStmt,
    BreakStmt,
    ContinueStmt,
    ReturnStmt,
    RaiseStmt,
    ImportStmt,
    ImportName,
    ImportFrom,
    ImportAsName,
    DottedAsName,
    ImportAsNames,
    DottedAsNames,
    DottedName,
    GlobalStmt,
    NonlocalStmt,
    AssertStmt,
    CompoundStmt,
    AsyncStmt,
    IfStmt,
    WhileStmt,
    ForStmt,
    WithStmt,
    WithItem,
    Suite,
    Test,
    TestNocond,
    Lambdef,
    OrTest,
    AndTest,
    NotTest,
    Comparison,
    CompOp,
    StarExpr,
    Expr,
    XorExpr,
    AndExpr,
    ShiftExpr,
    ArithExpr,
    Term,
    Factor,
    Power,
    AtomExpr,
    Atom,
    TestlistComp,
    Trailer,
    Subscriptlist,
    Subscript,
    Exprlist,
    Testlist,
    Dictorsetmaker,
    Classdef,
    Arglist,
    Argument,
    CompIter,
    CompFor,
    CompIf,
    EncodingDecl,
}

impl Symbol {
    /// First nonterminal number; everything below is a terminal.
    pub const OFFSET: u16 = 256;

    pub const ALL: [Symbol; 75] = [
        Symbol::FileInput,
        Symbol::SingleInput,
        Symbol::EvalInput,
        Symbol::Decorator,
        Symbol::Decorators,
        Symbol::Decorated,
        Symbol::AsyncFuncdef,
        Symbol::Funcdef,
        Symbol::Parameters,
        Symbol::Varargslist,
        Symbol::Vfpdef,
        Symbol::Stmt,
        Symbol::SimpleStmt,
        Symbol::SmallStmt,
        Symbol::ExprStmt,
        Symbol::Augassign,
        Symbol::DelStmt,
        Symbol::PassStmt,
        Symbol::FlowStmt,
        Symbol::BreakStmt,
        Symbol::ContinueStmt,
        Symbol::ReturnStmt,
        Symbol::RaiseStmt,
        Symbol::ImportStmt,
        Symbol::ImportName,
        Symbol::ImportFrom,
        Symbol::ImportAsName,
        Symbol::DottedAsName,
        Symbol::ImportAsNames,
        Symbol::DottedAsNames,
        Symbol::DottedName,
        Symbol::GlobalStmt,
        Symbol::NonlocalStmt,
        Symbol::AssertStmt,
        Symbol::CompoundStmt,
        Symbol::AsyncStmt,
        Symbol::IfStmt,
        Symbol::WhileStmt,
        Symbol::ForStmt,
        Symbol::WithStmt,
        Symbol::WithItem,
        Symbol::Suite,
        Symbol::Test,
        Symbol::TestNocond,
        Symbol::Lambdef,
        Symbol::OrTest,
        Symbol::AndTest,
        Symbol::NotTest,
        Symbol::Comparison,
        Symbol::CompOp,
        Symbol::StarExpr,
        Symbol::Expr,
        Symbol::XorExpr,
        Symbol::AndExpr,
        Symbol::ShiftExpr,
        Symbol::ArithExpr,
        Symbol::Term,
        Symbol::Factor,
        Symbol::Power,
        Symbol::AtomExpr,
        Symbol::Atom,
        Symbol::TestlistComp,
        Symbol::Trailer,
        Symbol::Subscriptlist,
        Symbol::Subscript,
        Symbol::Exprlist,
        Symbol::Testlist,
        Symbol::Dictorsetmaker,
        Symbol::Classdef,
        Symbol::Arglist,
        Symbol::Argument,
        Symbol::CompIter,
        Symbol::CompFor,
        Symbol::CompIf,
        Symbol::EncodingDecl,
    ];

    /// Rule name as written in the grammar.
    pub fn name(self) -> &'static str {
        match self {
            Symbol::FileInput => "file_input",
            Symbol::SingleInput => "single_input",
            Symbol::EvalInput => "eval_input",
            Symbol::Decorator => "decorator",
            Symbol::Decorators => "decorators",
            Symbol::Decorated => "decorated",
            Symbol::AsyncFuncdef => "async_funcdef",
            Symbol::Funcdef => "funcdef",
            Symbol::Parameters => "parameters",
            Symbol::Varargslist => "varargslist",
            Symbol::Vfpdef => "vfpdef",
            Symbol::Stmt => "stmt",
            Symbol::SimpleStmt => "simple_stmt",
            Symbol::SmallStmt => "small_stmt",
            Symbol::ExprStmt => "expr_stmt",
            Symbol::Augassign => "augassign",
            Symbol::DelStmt => "del_stmt",
            Symbol::PassStmt => "pass_stmt",
            Symbol::FlowStmt => "flow_stmt",
            Symbol::BreakStmt => "break_stmt",
            Symbol::ContinueStmt => "continue_stmt",
            Symbol::ReturnStmt => "return_stmt",
            Symbol::RaiseStmt => "raise_stmt",
            Symbol::ImportStmt => "import_stmt",
            Symbol::ImportName => "import_name",
            Symbol::ImportFrom => "import_from",
            Symbol::ImportAsName => "import_as_name",
            Symbol::DottedAsName => "dotted_as_name",
            Symbol::ImportAsNames => "import_as_names",
            Symbol::DottedAsNames => "dotted_as_names",
            Symbol::DottedName => "dotted_name",
            Symbol::GlobalStmt => "global_stmt",
            Symbol::NonlocalStmt => "nonlocal_stmt",
            Symbol::AssertStmt => "assert_stmt",
            Symbol::CompoundStmt => "compound_stmt",
            Symbol::AsyncStmt => "async_stmt",
            Symbol::IfStmt => "if_stmt",
            Symbol::WhileStmt => "while_stmt",
            Symbol::ForStmt => "for_stmt",
            Symbol::WithStmt => "with_stmt",
            Symbol::WithItem => "with_item",
            Symbol::Suite => "suite",
            Symbol::Test => "test",
            Symbol::TestNocond => "test_nocond",
            Symbol::Lambdef => "lambdef",
            Symbol::OrTest => "or_test",
            Symbol::AndTest => "and_test",
            Symbol::NotTest => "not_test",
            Symbol::Comparison => "comparison",
            Symbol::CompOp => "comp_op",
            Symbol::StarExpr => "star_expr",
            Symbol::Expr => "expr",
            Symbol::XorExpr => "xor_expr",
            Symbol::AndExpr => "and_expr",
            Symbol::ShiftExpr => "shift_expr",
            Symbol::ArithExpr => "arith_expr",
            Symbol::Term => "term",
            Symbol::Factor => "factor",
            Symbol::Power => "power",
            Symbol::AtomExpr => "atom_expr",
            Symbol::Atom => "atom",
            Symbol::TestlistComp => "testlist_comp",
            Symbol::Trailer => "trailer",
            Symbol::Subscriptlist => "subscriptlist",
            Symbol::Subscript => "subscript",
            Symbol::Exprlist => "exprlist",
            Symbol::Testlist => "testlist",
            Symbol::Dictorsetmaker => "dictorsetmaker",
            Symbol::Classdef => "classdef",
            Symbol::Arglist => "arglist",
            Symbol::Argument => "argument",
            Symbol::CompIter => "comp_iter",
            Symbol::CompFor => "comp_for",
            Symbol::CompIf => "comp_if",
            Symbol::EncodingDecl => "encoding_decl",
        }
    }

    pub fn from_name(name: &str) -> Option<Symbol> {
        Symbol::ALL.into_iter().find(|sym| sym.name() == name)
    }

    /// Stable number of this symbol (`OFFSET` + declaration index).
    pub fn number(self) -> u16 {
        Symbol::OFFSET + self as u16
    }

    /// True for the symbols a parse may start from.
    pub fn is_start(self) -> bool {
        matches!(
            self,
            Symbol::FileInput | Symbol::SingleInput | Symbol::EvalInput
        )
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
