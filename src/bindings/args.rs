//! Typed Argument Decoder
//!
//! Bindings describe their parameter list with a compact format string, one character per
//! argument:
//!
//! | spec | accepts | output slot |
//! |------|---------|-------------|
//! | `o`  | any value | [`Arg::Object`] |
//! | `S`  | String (kept as a value) | [`Arg::String`] |
//! | `s`  | String, as bytes | [`Arg::Bytes`] |
//! | `z`  | String, as text (must be valid UTF-8) | [`Arg::Str`] |
//! | `f`  | Float or Integer | [`Arg::Float`] |
//! | `i`  | Integer or Float (truncated) | [`Arg::Int`] |
//! | `b`  | true / false / nil | [`Arg::Bool`] |
//! | `n`  | Symbol | [`Arg::Symbol`] |
//!
//! A `|` marks the start of optional parameters. Slots of omitted optional arguments are left
//! untouched, so callers pre-load them with defaults.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::{ErrorKind, NativeError};
use crate::scripting::{ScriptRuntime, SymbolId, Value, VmResult};

/// How trailing arguments beyond the format are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArityPolicy {
    /// Extra arguments are an arity error.
    #[default]
    Strict,
    /// Extra arguments are ignored.
    Lenient,
}

/// Argument specifier kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spec {
    Object,
    String,
    Bytes,
    Str,
    Float,
    Int,
    Bool,
    Symbol,
}

const OPTIONAL_MARKER: char = '|';

const SPEC_TABLE: [(char, Spec); 8] = [
    ('o', Spec::Object),
    ('S', Spec::String),
    ('s', Spec::Bytes),
    ('z', Spec::Str),
    ('f', Spec::Float),
    ('i', Spec::Int),
    ('b', Spec::Bool),
    ('n', Spec::Symbol),
];

impl Spec {
    pub fn from_char(c: char) -> Option<Spec> {
        SPEC_TABLE
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, spec)| *spec)
    }

    pub fn as_char(self) -> char {
        SPEC_TABLE
            .iter()
            .find(|(_, spec)| *spec == self)
            .map(|(ch, _)| *ch)
            .unwrap_or('?')
    }

    fn expected(self) -> &'static str {
        match self {
            Spec::Object => "object",
            Spec::String | Spec::Bytes | Spec::Str => "string",
            Spec::Float => "float",
            Spec::Int => "fixnum",
            Spec::Bool => "bool",
            Spec::Symbol => "symbol",
        }
    }

    fn decode<'a>(self, value: &'a Value, index: usize, out: &mut Arg<'_, 'a>) -> Result<(), ArgError> {
        let mismatch = ArgError::Type {
            index,
            expected: self.expected(),
        };
        match (out, value) {
            (Arg::Object(slot), value) => **slot = value.clone(),
            (Arg::String(slot), Value::Str(_) | Value::Bytes(_)) => **slot = value.clone(),
            (Arg::Bytes(slot), Value::Str(s)) => **slot = s.as_bytes(),
            (Arg::Bytes(slot), Value::Bytes(bytes)) => **slot = bytes.as_slice(),
            (Arg::Str(slot), Value::Str(s)) => **slot = s.as_str(),
            (Arg::Str(slot), Value::Bytes(bytes)) => **slot = std::str::from_utf8(bytes).map_err(|_| mismatch)?,
            (Arg::Float(slot), Value::Float(f)) => **slot = *f,
            (Arg::Float(slot), Value::Int(i)) => **slot = *i as f64,
            (Arg::Int(slot), Value::Int(i)) => {
                **slot = i32::try_from(*i).map_err(|_| ArgError::Range { index, value: *i })?
            }
            (Arg::Int(_), Value::Float(f)) if !f.is_finite() => {
                return Err(ArgError::NonFinite {
                    index,
                    value: non_finite_name(*f),
                });
            }
            (Arg::Int(slot), Value::Float(f)) => {
                let truncated = f.trunc();
                if !(i32::MIN as f64..=i32::MAX as f64).contains(&truncated) {
                    return Err(ArgError::Range {
                        index,
                        value: truncated as i64,
                    });
                }
                **slot = truncated as i32
            }
            (Arg::Bool(slot), Value::Bool(b)) => **slot = *b,
            (Arg::Bool(slot), Value::Nil) => **slot = false,
            (Arg::Symbol(slot), Value::Symbol(sym)) => **slot = *sym,
            _ => return Err(mismatch),
        }
        Ok(())
    }
}

fn non_finite_name(f: f64) -> &'static str {
    if f.is_nan() {
        "NaN"
    } else if f.is_sign_negative() {
        "-Infinity"
    } else {
        "Infinity"
    }
}

/// Output slot for one decoded argument.
pub enum Arg<'o, 'a> {
    Object(&'o mut Value),
    String(&'o mut Value),
    Bytes(&'o mut &'a [u8]),
    Str(&'o mut &'a str),
    Float(&'o mut f64),
    Int(&'o mut i32),
    Bool(&'o mut bool),
    Symbol(&'o mut SymbolId),
}

impl Arg<'_, '_> {
    pub fn spec(&self) -> Spec {
        match self {
            Arg::Object(_) => Spec::Object,
            Arg::String(_) => Spec::String,
            Arg::Bytes(_) => Spec::Bytes,
            Arg::Str(_) => Spec::Str,
            Arg::Float(_) => Spec::Float,
            Arg::Int(_) => Spec::Int,
            Arg::Bool(_) => Spec::Bool,
            Arg::Symbol(_) => Spec::Symbol,
        }
    }
}

/// Accepted argument count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArityRange {
    pub min: usize,
    pub max: usize,
}

impl fmt::Display for ArityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}..{}", self.min, self.max)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("wrong number of arguments (given {given}, expected {expected})")]
    Arity { given: usize, expected: ArityRange },

    #[error("Argument {index}: Expected {expected}")]
    Type {
        index: usize,
        expected: &'static str,
    },

    #[error("Argument {index}: integer {value} too big to convert to `int'")]
    Range { index: usize, value: i64 },

    #[error("Argument {index}: float {value} out of range of integer")]
    NonFinite { index: usize, value: &'static str },

    #[error("invalid argument specifier {0}")]
    InvalidSpecifier(char),

    #[error("argument specifier {spec} at position {index} has no matching output slot")]
    SlotMismatch { index: usize, spec: char },
}

impl ArgError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArgError::Arity { .. } | ArgError::Range { .. } | ArgError::NonFinite { .. } => {
                ErrorKind::Argument
            }
            ArgError::Type { .. } => ErrorKind::Type,
            ArgError::InvalidSpecifier(_) | ArgError::SlotMismatch { .. } => ErrorKind::Fatal,
        }
    }
}

impl From<ArgError> for NativeError {
    fn from(err: ArgError) -> Self {
        NativeError::new(err.kind(), err.to_string())
    }
}

/// A parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    specs: Vec<Spec>,
    mandatory: usize,
}

impl Format {
    pub fn parse(format: &str) -> Result<Self, ArgError> {
        let mut specs = Vec::with_capacity(format.len());
        let mut mandatory = None;
        for c in format.chars() {
            if c == OPTIONAL_MARKER {
                mandatory.get_or_insert(specs.len());
                continue;
            }
            specs.push(Spec::from_char(c).ok_or(ArgError::InvalidSpecifier(c))?);
        }
        Ok(Self {
            mandatory: mandatory.unwrap_or(specs.len()),
            specs,
        })
    }

    pub fn specs(&self) -> &[Spec] {
        &self.specs
    }

    /// Number of specifiers before the optional marker.
    pub fn mandatory(&self) -> usize {
        self.mandatory
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn arity(&self) -> ArityRange {
        ArityRange {
            min: self.mandatory,
            max: self.specs.len(),
        }
    }

    /// Decodes `args` into `outs`, returning the number of arguments consumed.
    pub fn decode<'a>(
        &self,
        args: &'a [Value],
        outs: &mut [Arg<'_, 'a>],
        policy: ArityPolicy,
    ) -> Result<usize, ArgError> {
        if outs.len() < self.specs.len() {
            return Err(ArgError::SlotMismatch {
                index: outs.len(),
                spec: self.specs[outs.len()].as_char(),
            });
        }
        for (index, (spec, out)) in self.specs.iter().zip(outs.iter()).enumerate() {
            if out.spec() != *spec {
                return Err(ArgError::SlotMismatch {
                    index,
                    spec: spec.as_char(),
                });
            }
        }
        if outs.len() > self.specs.len() {
            return Err(ArgError::SlotMismatch {
                index: self.specs.len(),
                spec: OPTIONAL_MARKER,
            });
        }

        if args.len() < self.mandatory {
            return Err(ArgError::Arity {
                given: args.len(),
                expected: self.arity(),
            });
        }

        let consumed = args.len().min(self.specs.len());
        for (index, ((spec, out), value)) in self.specs.iter().zip(outs.iter_mut()).zip(args).enumerate() {
            spec.decode(value, index, out)?;
        }

        if policy == ArityPolicy::Strict && args.len() > self.specs.len() {
            return Err(ArgError::Arity {
                given: args.len(),
                expected: self.arity(),
            });
        }
        Ok(consumed)
    }
}

/// Parses `format` and decodes `args` into `outs`.
pub fn decode_args<'a>(
    args: &'a [Value],
    format: &str,
    outs: &mut [Arg<'_, 'a>],
    policy: ArityPolicy,
) -> Result<usize, ArgError> {
    Format::parse(format)?.decode(args, outs, policy)
}

impl ScriptRuntime {
    /// Decodes call arguments, remapping failures into script exceptions.
    pub fn get_args<'a>(
        &self,
        args: &'a [Value],
        format: &str,
        outs: &mut [Arg<'_, 'a>],
    ) -> VmResult<usize> {
        decode_args(args, format, outs, self.arity_policy()).map_err(|err| {
            if err.kind() == ErrorKind::Fatal {
                tracing::error!(target: "bindings", error = %err, "binding declares an invalid argument list");
            }
            self.raise_native(err.into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        let format = Format::parse("z|iif").unwrap();
        assert_eq!(format.len(), 4);
        assert_eq!(format.mandatory(), 1);
        assert_eq!(format.arity().to_string(), "1..4");

        let format = Format::parse("ii").unwrap();
        assert_eq!(format.mandatory(), 2);
        assert_eq!(format.arity().to_string(), "2");

        assert_eq!(Format::parse("ix"), Err(ArgError::InvalidSpecifier('x')));
    }

    #[test]
    fn test_optional_slots_keep_defaults() {
        let args = [Value::from("Audio/BGM/Town"), Value::Int(80)];
        let mut file = "";
        let mut volume = 100;
        let mut pitch = 100;
        let mut pos = 0.0;

        let consumed = decode_args(
            &args,
            "z|iif",
            &mut [
                Arg::Str(&mut file),
                Arg::Int(&mut volume),
                Arg::Int(&mut pitch),
                Arg::Float(&mut pos),
            ],
            ArityPolicy::Strict,
        )
        .unwrap();

        assert_eq!(consumed, 2);
        assert_eq!(file, "Audio/BGM/Town");
        assert_eq!(volume, 80);
        assert_eq!(pitch, 100);
        assert_eq!(pos, 0.0);
    }

    #[test]
    fn test_numeric_coercions() {
        let args = [Value::Int(3), Value::Float(7.9), Value::Float(-2.5)];
        let (mut f, mut i, mut j) = (0.0, 0, 0);
        decode_args(
            &args,
            "fii",
            &mut [Arg::Float(&mut f), Arg::Int(&mut i), Arg::Int(&mut j)],
            ArityPolicy::Strict,
        )
        .unwrap();
        assert_eq!(f, 3.0);
        assert_eq!(i, 7);
        assert_eq!(j, -2);
    }

    #[test]
    fn test_nil_is_false_for_bool() {
        let args = [Value::Nil, Value::Bool(true)];
        let (mut a, mut b) = (true, false);
        decode_args(&args, "bb", &mut [Arg::Bool(&mut a), Arg::Bool(&mut b)], ArityPolicy::Strict).unwrap();
        assert!(!a);
        assert!(b);
    }

    #[test]
    fn test_type_errors_name_argument_index() {
        let args = [Value::Int(5), Value::from("x")];
        let mut n = 0;
        let mut b = false;
        let err = decode_args(&args, "ib", &mut [Arg::Int(&mut n), Arg::Bool(&mut b)], ArityPolicy::Strict)
            .unwrap_err();
        assert_eq!(err.to_string(), "Argument 1: Expected bool");
        assert_eq!(err.kind(), ErrorKind::Type);

        let mut s = "";
        let err = decode_args(&args[..1], "z", &mut [Arg::Str(&mut s)], ArityPolicy::Strict).unwrap_err();
        assert_eq!(err.to_string(), "Argument 0: Expected string");
    }

    #[test]
    fn test_string_specifiers_reject_non_strings() {
        let args = [Value::from("ok"), Value::Int(3)];
        let mut value = Value::Nil;
        let mut bytes: &[u8] = b"";
        let mut second = Value::Nil;
        let mut text = "";
        let mut other = "";

        let err = decode_args(&args, "SS", &mut [Arg::String(&mut value), Arg::String(&mut second)], ArityPolicy::Strict)
            .unwrap_err();
        assert_eq!(err, ArgError::Type { index: 1, expected: "string" });
        assert_eq!(value, Value::from("ok"));

        let err = decode_args(&args[1..], "s", &mut [Arg::Bytes(&mut bytes)], ArityPolicy::Strict).unwrap_err();
        assert_eq!(err, ArgError::Type { index: 0, expected: "string" });

        let err = decode_args(&args, "zz", &mut [Arg::Str(&mut text), Arg::Str(&mut other)], ArityPolicy::Strict)
            .unwrap_err();
        assert_eq!(err.to_string(), "Argument 1: Expected string");
    }

    #[test]
    fn test_byte_strings() {
        let args = [Value::Bytes(vec![0x04, 0x08, 0xff]), Value::Bytes(b"Map001".to_vec())];
        let mut raw: &[u8] = b"";
        let mut name = "";
        decode_args(&args, "sz", &mut [Arg::Bytes(&mut raw), Arg::Str(&mut name)], ArityPolicy::Strict).unwrap();
        assert_eq!(raw, &[0x04, 0x08, 0xff]);
        assert_eq!(name, "Map001");

        let err = decode_args(&args[..1], "z", &mut [Arg::Str(&mut name)], ArityPolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn test_symbol_specifier() {
        let mut vm = ScriptRuntime::new();
        let sym = vm.intern("bgm");
        let mut out = SymbolId(0);
        decode_args(&[Value::Symbol(sym)], "n", &mut [Arg::Symbol(&mut out)], ArityPolicy::Strict).unwrap();
        assert_eq!(out, sym);

        let err = decode_args(&[Value::from("bgm")], "n", &mut [Arg::Symbol(&mut out)], ArityPolicy::Strict)
            .unwrap_err();
        assert_eq!(err.to_string(), "Argument 0: Expected symbol");
    }

    #[test]
    fn test_non_finite_float_to_integer() {
        let mut n = 7;
        let err = decode_args(&[Value::Float(f64::NAN)], "i", &mut [Arg::Int(&mut n)], ArityPolicy::Strict)
            .unwrap_err();
        assert_eq!(err.to_string(), "Argument 0: float NaN out of range of integer");
        assert_eq!(err.kind(), ErrorKind::Argument);
        assert_eq!(n, 7);

        let args = [Value::Int(1), Value::Float(f64::NEG_INFINITY)];
        let mut m = 0;
        let err = decode_args(&args, "ii", &mut [Arg::Int(&mut m), Arg::Int(&mut n)], ArityPolicy::Strict)
            .unwrap_err();
        assert_eq!(err.to_string(), "Argument 1: float -Infinity out of range of integer");
    }

    #[test]
    fn test_out_of_range_integer() {
        let args = [Value::Int(i64::from(i32::MAX) + 1)];
        let mut n = 0;
        let err = decode_args(&args, "i", &mut [Arg::Int(&mut n)], ArityPolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
    }

    #[test]
    fn test_arity_errors() {
        let mut a = 0;
        let mut b = 0;
        let err = decode_args(&[Value::Int(1)], "ii", &mut [Arg::Int(&mut a), Arg::Int(&mut b)], ArityPolicy::Strict)
            .unwrap_err();
        assert_eq!(err.to_string(), "wrong number of arguments (given 1, expected 2)");

        let args = [Value::Int(5), Value::Int(6)];
        let err = decode_args(&args, "i", &mut [Arg::Int(&mut a)], ArityPolicy::Strict).unwrap_err();
        assert_eq!(err.to_string(), "wrong number of arguments (given 2, expected 1)");

        assert_eq!(decode_args(&args, "i", &mut [Arg::Int(&mut a)], ArityPolicy::Lenient), Ok(1));
        assert_eq!(a, 5);
    }

    #[test]
    fn test_slot_mismatch_is_fatal() {
        let mut n = 0.0;
        let err = decode_args(&[Value::Int(1)], "i", &mut [Arg::Float(&mut n)], ArityPolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fatal);

        let err = decode_args(&[], "|i", &mut [], ArityPolicy::Strict).unwrap_err();
        assert_eq!(err, ArgError::SlotMismatch { index: 0, spec: 'i' });
    }

    #[test]
    fn test_get_args_remaps_into_exceptions() {
        let mut vm = ScriptRuntime::new();
        vm.init_exception_table(3);
        let mut n = 0;
        let err = vm.get_args(&[Value::from("x")], "i", &mut [Arg::Int(&mut n)]).unwrap_err();
        let exc = err.exception().unwrap();
        assert_eq!(exc.class_name, "TypeError");
        assert_eq!(exc.message, "Argument 0: Expected fixnum");

        let err = vm.get_args(&[], "q", &mut []).unwrap_err();
        assert_eq!(err.exception().unwrap().class_name, "fatal");
    }
}
