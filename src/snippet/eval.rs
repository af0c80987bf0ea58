//! Tree-walking interpreter for compiled snippets.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::parser::{BinaryOp, Builtin, CompareOp, Expr, Stmt, UnaryOp};
use super::{SnippetError, Value};

/// Control flow out of a statement.
enum Flow {
    Next,
    Return(Value),
}

/// Runs `program` with parameters already bound in `locals`.
pub fn run(program: &[Stmt], mut locals: HashMap<String, Value>) -> Result<Value, SnippetError> {
    for stmt in program {
        if let Flow::Return(value) = exec(stmt, &mut locals)? {
            return Ok(value);
        }
    }
    Ok(Value::None)
}

fn exec(stmt: &Stmt, locals: &mut HashMap<String, Value>) -> Result<Flow, SnippetError> {
    match stmt {
        Stmt::Assign { name, value, .. } => {
            let value = eval(value, locals)?;
            locals.insert(name.clone(), value);
            Ok(Flow::Next)
        }
        Stmt::Return { value, .. } => {
            let value = match value {
                Some(expr) => eval(expr, locals)?,
                None => Value::None,
            };
            Ok(Flow::Return(value))
        }
        Stmt::Expr { expr, .. } => {
            eval(expr, locals)?;
            Ok(Flow::Next)
        }
    }
}

fn eval(expr: &Expr, locals: &HashMap<String, Value>) -> Result<Value, SnippetError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Name { name, line } => {
            locals
                .get(name)
                .cloned()
                .ok_or_else(|| SnippetError::UnboundLocal {
                    line: *line,
                    name: name.clone(),
                })
        }
        Expr::Unary { op, operand, line } => unary(*op, eval(operand, locals)?, *line),
        Expr::Not(operand) => Ok(Value::Bool(!eval(operand, locals)?.is_truthy())),
        Expr::Binary { op, lhs, rhs, line } => {
            let lhs = eval(lhs, locals)?;
            let rhs = eval(rhs, locals)?;
            binary(*op, lhs, rhs, *line)
        }
        Expr::Compare { op, lhs, rhs, line } => {
            let lhs = eval(lhs, locals)?;
            let rhs = eval(rhs, locals)?;
            compare(*op, &lhs, &rhs, *line).map(Value::Bool)
        }
        Expr::And(lhs, rhs) => {
            let lhs = eval(lhs, locals)?;
            if lhs.is_truthy() {
                eval(rhs, locals)
            } else {
                Ok(lhs)
            }
        }
        Expr::Or(lhs, rhs) => {
            let lhs = eval(lhs, locals)?;
            if lhs.is_truthy() {
                Ok(lhs)
            } else {
                eval(rhs, locals)
            }
        }
        Expr::Conditional {
            cond,
            then,
            otherwise,
        } => {
            if eval(cond, locals)?.is_truthy() {
                eval(then, locals)
            } else {
                eval(otherwise, locals)
            }
        }
        Expr::Call {
            function,
            args,
            line,
        } => {
            let args = args
                .iter()
                .map(|arg| eval(arg, locals))
                .collect::<Result<Vec<_>, _>>()?;
            call_builtin(*function, args, *line)
        }
    }
}

/// Numeric view of a value; booleans count as 0/1 like integers.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(Self::Int(*v)),
            Value::Float(v) => Some(Self::Float(*v)),
            Value::Bool(b) => Some(Self::Int(i64::from(*b))),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    const fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

fn type_error(line: usize, message: String) -> SnippetError {
    SnippetError::Type { line, message }
}

fn unary(op: UnaryOp, operand: Value, line: usize) -> Result<Value, SnippetError> {
    let num = Num::of(&operand).ok_or_else(|| {
        type_error(line, format!("bad operand type for unary operator: {}", operand.type_name()))
    })?;
    match (op, num) {
        (UnaryOp::Pos, Num::Int(v)) => Ok(Value::Int(v)),
        (UnaryOp::Pos, Num::Float(v)) => Ok(Value::Float(v)),
        (UnaryOp::Neg, Num::Int(v)) => v
            .checked_neg()
            .map(Value::Int)
            .ok_or(SnippetError::Overflow { line }),
        (UnaryOp::Neg, Num::Float(v)) => Ok(Value::Float(-v)),
    }
}

const fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::FloorDiv => "//",
        BinaryOp::Mod => "%",
        BinaryOp::Pow => "**",
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value, line: usize) -> Result<Value, SnippetError> {
    // String concatenation and repetition
    match (op, &lhs, &rhs) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
            return Ok(Value::Str(format!("{a}{b}")));
        }
        (BinaryOp::Mul, Value::Str(s), Value::Int(n))
        | (BinaryOp::Mul, Value::Int(n), Value::Str(s)) => {
            let count = usize::try_from(*n).unwrap_or(0);
            return repeat_str(s, count, line);
        }
        _ => {}
    }

    let (Some(a), Some(b)) = (Num::of(&lhs), Num::of(&rhs)) else {
        return Err(type_error(
            line,
            format!(
                "unsupported operand types for {}: {} and {}",
                op_symbol(op),
                lhs.type_name(),
                rhs.type_name()
            ),
        ));
    };

    match (a, b) {
        (Num::Int(x), Num::Int(y)) => int_op(op, x, y, line),
        _ => float_op(op, a.as_f64(), b.as_f64(), line),
    }
}

/// Longest string `*` may build, in bytes.
pub const MAX_REPEAT_LEN: usize = 1 << 24;

fn repeat_str(s: &str, count: usize, line: usize) -> Result<Value, SnippetError> {
    match s.len().checked_mul(count) {
        Some(len) if len <= MAX_REPEAT_LEN => Ok(Value::Str(s.repeat(count))),
        _ => Err(SnippetError::Overflow { line }),
    }
}

fn int_op(op: BinaryOp, x: i64, y: i64, line: usize) -> Result<Value, SnippetError> {
    let overflow = SnippetError::Overflow { line };
    let result = match op {
        BinaryOp::Add => x.checked_add(y),
        BinaryOp::Sub => x.checked_sub(y),
        BinaryOp::Mul => x.checked_mul(y),
        BinaryOp::Div => return float_op(op, Num::Int(x).as_f64(), Num::Int(y).as_f64(), line),
        BinaryOp::FloorDiv => {
            if y == 0 {
                return Err(SnippetError::DivisionByZero { line });
            }
            x.checked_div(y).map(|q| {
                if (x % y != 0) && ((x < 0) != (y < 0)) {
                    q - 1
                } else {
                    q
                }
            })
        }
        BinaryOp::Mod => {
            if y == 0 {
                return Err(SnippetError::DivisionByZero { line });
            }
            x.checked_rem(y).map(|r| {
                if r != 0 && ((r < 0) != (y < 0)) {
                    r + y
                } else {
                    r
                }
            })
        }
        BinaryOp::Pow => {
            if y < 0 {
                return float_op(op, Num::Int(x).as_f64(), Num::Int(y).as_f64(), line);
            }
            u32::try_from(y).ok().and_then(|exp| x.checked_pow(exp))
        }
    };
    result.map(Value::Int).ok_or(overflow)
}

fn float_op(op: BinaryOp, x: f64, y: f64, line: usize) -> Result<Value, SnippetError> {
    let value = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod if y == 0.0 => {
            return Err(SnippetError::DivisionByZero { line });
        }
        BinaryOp::Div => x / y,
        BinaryOp::FloorDiv => (x / y).floor(),
        BinaryOp::Mod => x - y * (x / y).floor(),
        BinaryOp::Pow => {
            if x == 0.0 && y < 0.0 {
                return Err(SnippetError::DivisionByZero { line });
            }
            x.powf(y)
        }
    };
    Ok(Value::Float(value))
}

/// Orders two values, or `None` when they are not comparable.
fn ordering(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (Num::of(lhs)?, Num::of(rhs)?) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        },
    }
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::None, Value::None) => true,
        (Value::Str(a), Value::Str(b)) => a == b,
        _ => ordering(lhs, rhs) == Some(Ordering::Equal),
    }
}

fn compare(op: CompareOp, lhs: &Value, rhs: &Value, line: usize) -> Result<bool, SnippetError> {
    match op {
        CompareOp::Eq => return Ok(values_equal(lhs, rhs)),
        CompareOp::NotEq => return Ok(!values_equal(lhs, rhs)),
        _ => {}
    }

    let comparable = matches!((lhs, rhs), (Value::Str(_), Value::Str(_)))
        || (Num::of(lhs).is_some() && Num::of(rhs).is_some());
    if !comparable {
        return Err(type_error(
            line,
            format!("cannot order {} and {}", lhs.type_name(), rhs.type_name()),
        ));
    }

    // NaN compares false for every ordering operator.
    let Some(ord) = ordering(lhs, rhs) else {
        return Ok(false);
    };
    Ok(match op {
        CompareOp::Lt => ord == Ordering::Less,
        CompareOp::LtEq => ord != Ordering::Greater,
        CompareOp::Gt => ord == Ordering::Greater,
        CompareOp::GtEq => ord != Ordering::Less,
        CompareOp::Eq | CompareOp::NotEq => unreachable!("handled above"),
    })
}

fn arity(
    function: Builtin,
    args: &[Value],
    min: usize,
    max: usize,
    line: usize,
) -> Result<(), SnippetError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else if max == usize::MAX {
            format!("at least {min}")
        } else {
            format!("{min} to {max}")
        };
        return Err(type_error(
            line,
            format!(
                "{}() takes {expected} argument(s), got {}",
                function.name(),
                args.len()
            ),
        ));
    }
    Ok(())
}

fn call_builtin(
    function: Builtin,
    mut args: Vec<Value>,
    line: usize,
) -> Result<Value, SnippetError> {
    match function {
        Builtin::Abs => {
            arity(function, &args, 1, 1, line)?;
            match Num::of(&args[0]) {
                Some(Num::Int(v)) => v
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or(SnippetError::Overflow { line }),
                Some(Num::Float(v)) => Ok(Value::Float(v.abs())),
                None => Err(type_error(
                    line,
                    format!("bad operand type for abs(): {}", args[0].type_name()),
                )),
            }
        }
        Builtin::Min | Builtin::Max => {
            arity(function, &args, 1, usize::MAX, line)?;
            let want = if function == Builtin::Min {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            let mut best = args.remove(0);
            for candidate in args {
                let ord = ordering(&candidate, &best).ok_or_else(|| {
                    type_error(
                        line,
                        format!(
                            "{}() cannot compare {} and {}",
                            function.name(),
                            candidate.type_name(),
                            best.type_name()
                        ),
                    )
                })?;
                if ord == want {
                    best = candidate;
                }
            }
            Ok(best)
        }
        Builtin::Round => {
            arity(function, &args, 1, 2, line)?;
            let value = Num::of(&args[0]).ok_or_else(|| {
                type_error(line, format!("round() expects a number, got {}", args[0].type_name()))
            })?;
            if let Some(digits) = args.get(1) {
                let Value::Int(digits) = digits else {
                    return Err(type_error(line, "round() digits must be an int".to_string()));
                };
                let digits = i32::try_from(*digits).map_err(|_| SnippetError::Overflow { line })?;
                return Ok(match value {
                    Num::Int(v) if digits >= 0 => Value::Int(v),
                    _ => {
                        let scale = 10f64.powi(digits);
                        Value::Float((value.as_f64() * scale).round_ties_even() / scale)
                    }
                });
            }
            match value {
                Num::Int(v) => Ok(Value::Int(v)),
                Num::Float(v) => float_to_int(v.round_ties_even(), line),
            }
        }
        Builtin::Len => {
            arity(function, &args, 1, 1, line)?;
            match &args[0] {
                Value::Str(s) => i64::try_from(s.chars().count())
                    .map(Value::Int)
                    .map_err(|_| SnippetError::Overflow { line }),
                other => Err(type_error(
                    line,
                    format!("object of type {} has no len()", other.type_name()),
                )),
            }
        }
        Builtin::Str => {
            arity(function, &args, 1, 1, line)?;
            Ok(Value::Str(args[0].to_string()))
        }
        Builtin::Int => {
            arity(function, &args, 1, 1, line)?;
            match &args[0] {
                Value::Int(v) => Ok(Value::Int(*v)),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Float(v) => float_to_int(v.trunc(), line),
                Value::Str(s) => s
                    .trim()
                    .replace('_', "")
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| type_error(line, format!("invalid literal for int(): '{s}'"))),
                Value::None => Err(type_error(
                    line,
                    "int() argument must be a number or string, not None".to_string(),
                )),
            }
        }
        Builtin::Float => {
            arity(function, &args, 1, 1, line)?;
            match &args[0] {
                Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                    type_error(line, format!("could not convert string to float: '{s}'"))
                }),
                other => Num::of(other)
                    .map(|n| Value::Float(n.as_f64()))
                    .ok_or_else(|| {
                        type_error(
                            line,
                            "float() argument must be a number or string, not None".to_string(),
                        )
                    }),
            }
        }
        Builtin::Bool => {
            arity(function, &args, 1, 1, line)?;
            Ok(Value::Bool(args[0].is_truthy()))
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_int(value: f64, line: usize) -> Result<Value, SnippetError> {
    if !value.is_finite() {
        return Err(type_error(line, format!("cannot convert {value:?} to int")));
    }
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(SnippetError::Overflow { line });
    }
    Ok(Value::Int(value as i64))
}
