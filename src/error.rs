//! Error handling for the RS274/NGC interpreter
//!
//! Provides error types for every layer of the interpreter:
//! - Lexical/syntactic errors (bad characters, malformed words)
//! - Semantic errors (modal-group conflicts, illegal word combinations)
//! - Arithmetic errors (from the expression evaluator)
//! - Geometry errors (arc and cutter-compensation failures)
//! - Parameter-file errors (load/save)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Errors raised while scanning a line into words/expressions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    /// A `(` was seen while already inside a parenthesised comment.
    #[error("nested comment")]
    NestedComment,

    /// End of line reached while inside a parenthesised comment.
    #[error("unclosed comment")]
    UnclosedComment,

    /// A character did not start any recognised word or expression.
    #[error("bad character '{ch}' at position {pos}")]
    BadCharacter {
        /// The offending character.
        ch: char,
        /// Index into the preprocessed line.
        pos: usize,
    },

    /// A numeric literal had no digits, a second decimal point, or trailing garbage.
    #[error("bad format for real number at position {pos}")]
    BadNumberFormat {
        /// Index into the preprocessed line where the number began.
        pos: usize,
    },

    /// An unsigned integer word (`d`, `h`, `l`, `t`, line number) was malformed.
    #[error("bad format unsigned integer at position {pos}")]
    BadUnsignedInteger {
        /// Index into the preprocessed line where the integer began.
        pos: usize,
    },

    /// A name after `#`-alpha or a unary-function keyword was not recognised.
    #[error("unknown word '{word}' at position {pos}")]
    UnknownWord {
        /// The unrecognised identifier.
        word: String,
        /// Index into the preprocessed line where the identifier began.
        pos: usize,
    },

    /// A bracketed expression was never closed with `]`.
    #[error("unclosed expression")]
    UnclosedExpression,
}

/// Errors raised while assembling words into a [`crate::block::Block`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    /// The same letter word appeared twice on one line.
    #[error("multiple {letter} words on one line")]
    DuplicateWord {
        /// The repeated letter.
        letter: char,
    },

    /// A `g` word did not encode a known G-code.
    #[error("unknown g-code {code}")]
    UnknownGCode {
        /// The ×10-encoded value that was read.
        code: i32,
    },

    /// A `m` word was not in `0..=99`.
    #[error("m-code out of range: {code}")]
    MCodeOutOfRange {
        /// The out-of-range value.
        code: i32,
    },

    /// More than four M-codes appeared on one line.
    #[error("too many m codes on line")]
    TooManyMCodes,

    /// Two G-codes from the same modal group appeared on one line.
    #[error("two g-codes from modal group {group} used on one line")]
    ModalGroupCollision {
        /// The conflicting modal group index.
        group: u8,
    },

    /// Two M-codes from the same modal group appeared on one line.
    #[error("two m-codes from modal group {group} used on one line")]
    MModalGroupCollision {
        /// The conflicting modal group index.
        group: u8,
    },

    /// A line number exceeded 99999, or appeared after the start of the line.
    #[error("bad line number")]
    BadLineNumber,

    /// A `#n = expr` was missing its `=`.
    #[error("equal sign missing after parameter number")]
    EqualSignMissing,

    /// A parameter index was outside `1..5400`.
    #[error("parameter number {index} out of range")]
    ParameterOutOfRange {
        /// The offending index.
        index: i32,
    },

    /// A value word (`f`, `s`, etc.) carried a value outside its allowed range.
    #[error("{letter} word out of range: {detail}")]
    WordOutOfRange {
        /// The offending letter.
        letter: char,
        /// A human-readable description of the violated constraint.
        detail: String,
    },
}

/// Errors raised by modal-group validation and block-level semantic checks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    /// Axis words were given alongside G80 with no axis-needing group-0 code.
    #[error("cannot use axis values with G80")]
    CannotUseAxisValuesWithG80,

    /// G92 (or another axis-needing group-0 code paired with G80) had no axis words.
    #[error("all axes missing with G92")]
    AllAxesMissingWithG92,

    /// A group-1 motion code and an axis-needing group-0 code both appeared.
    #[error("cannot use two g-codes that both use axis values")]
    CannotUseTwoGCodesThatBothUseAxisValues,

    /// A group-1 motion code appeared with no axis words.
    #[error("all axes missing with motion code")]
    AllAxesMissingWithMotionCode,

    /// Axis words appeared with no motion code active or implied.
    #[error("cannot use axis values without a g-code that uses them")]
    CannotUseAxisValuesWithoutGCode,

    /// A/B/C words appeared during an active canned cycle.
    #[error("cannot put an {axis} in canned cycle")]
    AxisInCannedCycle {
        /// The offending axis letter.
        axis: char,
    },

    /// `d` given without G41/G42 active.
    #[error("d word with no G41 or G42")]
    DWordWithNoCutterComp,

    /// `h` given without G43 active.
    #[error("h word with no G43")]
    HWordWithNoG43,

    /// `i`/`j`/`k` given without an arc or G87 motion.
    #[error("{letter} word with no G2, G3, or G87 to use it")]
    IjkWordWithoutUse {
        /// Which of i/j/k was offending.
        letter: char,
    },

    /// `l` given without a canned cycle or G10 active.
    #[error("l word with no canned cycle or G10")]
    LWordWithoutUse,

    /// `p` given without G4/G10/G82/G86/G88/G89/arc active.
    #[error("p word with no G4, G10, G82, G86, G88, or G89")]
    PWordWithoutUse,

    /// `p` given with G2/G3 but not rounding to an integer ≥ 1.
    #[error("p value should be 1 or greater with G2 or G3")]
    PValueNotPositiveIntegerWithArc,

    /// `q` given without G83 active.
    #[error("q word with no G83")]
    QWordWithoutUse,

    /// `r` given without an arc or canned cycle active.
    #[error("r word with no g-code that uses it")]
    RWordWithoutUse,

    /// G4 with no `p`.
    #[error("dwell time p word missing with G4")]
    DwellTimeMissingWithG4,

    /// G10 without `l == 2`.
    #[error("line with G10 does not have L2")]
    G10WithoutL2,

    /// G10 L2's `p` did not round to an integer.
    #[error("p value not an integer with G10 L2")]
    G10PValueNotInteger,

    /// G10 L2's `p` was outside `1..=9`.
    #[error("p value out of range with G10 L2")]
    G10PValueOutOfRange,

    /// G53 used with a motion code other than G0/G1.
    #[error("must use G0 or G1 with G53")]
    G53RequiresG0OrG1,

    /// G53 used while in (or implicitly entering) incremental distance mode.
    #[error("cannot use G53 incremental")]
    CannotUseG53Incremental,

    /// G83 with no `q`.
    #[error("q word missing with G83")]
    QWordMissingWithG83,

    /// G87 with no `i`/`j`/`k`.
    #[error("i/j/k word missing with G87")]
    IjkWordMissingWithG87,

    /// G92.x / G10 attempted while cutter radius compensation is active.
    #[error("cannot change axis offsets with cutter radius compensation on")]
    CannotChangeAxisOffsetsWithCutterRadiusComp,

    /// G20/G21 attempted while cutter radius compensation is active.
    #[error("cannot change units with cutter radius compensation on")]
    CannotChangeUnitsWithCutterRadiusComp,

    /// A rotary axis word was given on a probing (G38.2) move.
    #[error("cannot move rotary axes during probing")]
    CannotMoveRotaryAxesDuringProbing,

    /// G38.2 attempted while in inverse-time feed mode.
    #[error("cannot probe in inverse time feed mode")]
    CannotProbeInInverseTimeFeedMode,

    /// G84 (rigid tap) attempted without the spindle already turning clockwise.
    #[error("spindle not turning clockwise in G84")]
    SpindleNotTurningClockwiseInG84,

    /// `r < z` in a canned cycle (the clearance plane is below the cut depth).
    #[error("{plane_name}: r is below z")]
    RBelowZInCannedCycle {
        /// Human-readable plane name used in the legacy message ("XY", "YZ", "XZ").
        plane_name: &'static str,
    },
}

/// Errors raised by the expression evaluator's arithmetic.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ArithmeticError {
    /// Division or modulo by zero.
    #[error("attempt to divide by zero")]
    DivideByZero,

    /// A negative base raised to a non-integer power.
    #[error("attempt to raise negative to non-integer power")]
    NegativeToNonIntegerPower,

    /// An unrecognised binary/unary operator token.
    #[error("unknown operation")]
    UnknownOperation,

    /// `acos` argument outside `[-1, 1]`.
    #[error("argument to acos out of range")]
    AcosOutOfRange,

    /// `asin` argument outside `[-1, 1]`.
    #[error("argument to asin out of range")]
    AsinOutOfRange,

    /// `sqrt` argument negative.
    #[error("negative argument to sqrt")]
    NegativeArgumentToSqrt,

    /// `ln` argument zero or negative.
    #[error("zero or negative argument to ln")]
    NonPositiveArgumentToLn,
}

/// Errors raised by arc-geometry and cutter-compensation computations.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    /// The radius implied by the end point differs from the radius to the start point.
    #[error("radius to end of arc differs from radius to start")]
    RadiusToEndDiffersFromRadiusToStart,

    /// An IJK arc's computed radius was zero.
    #[error("zero radius arc")]
    ZeroRadiusArc,

    /// An R-form arc's radius cannot reach the end point.
    #[error("arc radius too small to reach end point")]
    ArcRadiusTooSmallToReachEndPoint,

    /// An R-form arc's start and end points coincide.
    #[error("current point same as end point of arc")]
    CurrentPointSameAsEndPointOfArc,

    /// Cutter-compensated R-form arc: tool radius not smaller than the arc radius.
    #[error("tool radius not less than arc radius with comp")]
    ToolRadiusNotLessThanArcRadiusWithComp,

    /// A corner between two compensated moves turned through a concave angle.
    #[error("concave corner with cutter radius comp")]
    ConcaveCornerWithCutterRadiusComp,

    /// The tool would gouge the part given the current compensation geometry.
    #[error("cutter gouging with cutter radius comp")]
    CutterGougingWithCutterRadiusComp,

    /// Internal inconsistency in the tool-radius-compensation offset construction.
    #[error("bug in tool radius comp")]
    BugInToolRadiusComp,
}

/// Errors raised while loading or saving the parameter file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamFileError {
    /// The file could not be opened for reading.
    #[error("unable to open parameter file '{path}'")]
    UnableToOpen {
        /// The path that could not be opened.
        path: String,
    },

    /// Parameter indices in the file were not strictly increasing.
    #[error("parameter file out of order at index {index}")]
    OutOfOrder {
        /// The index that broke ordering.
        index: i32,
    },

    /// One or more required parameter indices (see `crate::params::required_parameters`)
    /// were absent from the file.
    #[error("required parameter {index} missing")]
    RequiredParameterMissing {
        /// The missing required index.
        index: i32,
    },

    /// A line in the parameter file was not `<index>\t<value>`.
    #[error("malformed parameter file line: '{line}'")]
    MalformedLine {
        /// The offending raw line.
        line: String,
    },

    /// A `.bak` backup file could not be created before saving.
    #[error("cannot create backup file '{path}'")]
    CannotCreateBackup {
        /// The backup path that failed.
        path: String,
    },

    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(String),
}

/// Unified error type for the interpreter.
///
/// A closed enumeration collecting every subsystem's error kind, following
/// the same `#[error(transparent)]` / `#[from]` composition used by the
/// teacher crate's top-level `Error`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Lexical error while scanning a line.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Syntactic error while assembling a block.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Semantic error from modal-group or word-combination validation.
    #[error(transparent)]
    Semantic(#[from] SemanticError),

    /// Arithmetic error from expression evaluation.
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),

    /// Geometry error from arc or cutter-compensation computation.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Parameter-file load/save error.
    #[error(transparent)]
    ParamFile(#[from] ParamFileError),

    /// Catch-all for conditions the legacy interpreter treats as internal bugs
    /// (e.g. a motion code reaching a converter it does not belong to).
    #[error("internal error: {0}")]
    Bug(String),
}

/// Result type using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
