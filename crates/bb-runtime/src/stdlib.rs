use bb_core::{floats_equal, DialogueError, Value};

use crate::engine::Dialogue;
use crate::library::FunctionDecl;

/// Operators the compiler lowers to `CALL_FUNC`, plus visit tracking.
pub const STANDARD_LIBRARY: &[FunctionDecl] = &[
    FunctionDecl {
        name: "Number.Add",
        arity: 2,
        function: number_add,
    },
    FunctionDecl {
        name: "Number.Minus",
        arity: 2,
        function: number_minus,
    },
    FunctionDecl {
        name: "Number.Multiply",
        arity: 2,
        function: number_multiply,
    },
    FunctionDecl {
        name: "Number.Divide",
        arity: 2,
        function: number_divide,
    },
    FunctionDecl {
        name: "Number.Modulo",
        arity: 2,
        function: number_modulo,
    },
    FunctionDecl {
        name: "Number.UnaryMinus",
        arity: 1,
        function: number_unary_minus,
    },
    FunctionDecl {
        name: "Number.EqualTo",
        arity: 2,
        function: number_equal,
    },
    FunctionDecl {
        name: "Number.NotEqualTo",
        arity: 2,
        function: number_not_equal,
    },
    FunctionDecl {
        name: "Number.GreaterThan",
        arity: 2,
        function: number_greater,
    },
    FunctionDecl {
        name: "Number.GreaterThanOrEqualTo",
        arity: 2,
        function: number_greater_or_equal,
    },
    FunctionDecl {
        name: "Number.LessThan",
        arity: 2,
        function: number_less,
    },
    FunctionDecl {
        name: "Number.LessThanOrEqualTo",
        arity: 2,
        function: number_less_or_equal,
    },
    FunctionDecl {
        name: "Bool.Not",
        arity: 1,
        function: bool_not,
    },
    FunctionDecl {
        name: "Bool.EqualTo",
        arity: 2,
        function: bool_equal,
    },
    FunctionDecl {
        name: "Bool.NotEqualTo",
        arity: 2,
        function: bool_not_equal,
    },
    FunctionDecl {
        name: "Bool.And",
        arity: 2,
        function: bool_and,
    },
    FunctionDecl {
        name: "Bool.Or",
        arity: 2,
        function: bool_or,
    },
    FunctionDecl {
        name: "Bool.Xor",
        arity: 2,
        function: bool_xor,
    },
    FunctionDecl {
        name: "visited",
        arity: 1,
        function: visited,
    },
    FunctionDecl {
        name: "visited_count",
        arity: 1,
        function: visited_count,
    },
];

fn pop_float_pair(dialogue: &mut Dialogue<'_>) -> Result<(f32, f32), DialogueError> {
    let right = dialogue.pop_value().as_float()?;
    let left = dialogue.pop_value().as_float()?;
    Ok((left, right))
}

fn pop_bool_pair(dialogue: &mut Dialogue<'_>) -> Result<(bool, bool), DialogueError> {
    let right = dialogue.pop_value().as_bool()?;
    let left = dialogue.pop_value().as_bool()?;
    Ok((left, right))
}

fn number_add<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_float_pair(dialogue)?;
    Ok(Value::Float(left + right))
}

fn number_minus<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_float_pair(dialogue)?;
    Ok(Value::Float(left - right))
}

fn number_multiply<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_float_pair(dialogue)?;
    Ok(Value::Float(left * right))
}

fn number_divide<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_float_pair(dialogue)?;
    if right == 0.0 {
        return Err(division_by_zero("Number.Divide", left));
    }
    Ok(Value::Float(left / right))
}

fn number_modulo<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let right = dialogue.pop_value().as_int()?;
    let left = dialogue.pop_value().as_int()?;
    if right == 0 {
        return Err(division_by_zero("Number.Modulo", left as f32));
    }
    Ok(Value::Float(left.wrapping_rem(right) as f32))
}

fn number_unary_minus<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let value = dialogue.pop_value().as_float()?;
    Ok(Value::Float(-value))
}

fn number_equal<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_float_pair(dialogue)?;
    Ok(Value::Bool(floats_equal(left, right)))
}

fn number_not_equal<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_float_pair(dialogue)?;
    Ok(Value::Bool(!floats_equal(left, right)))
}

fn number_greater<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_float_pair(dialogue)?;
    Ok(Value::Bool(left > right))
}

fn number_greater_or_equal<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_float_pair(dialogue)?;
    Ok(Value::Bool(left > right || floats_equal(left, right)))
}

fn number_less<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_float_pair(dialogue)?;
    Ok(Value::Bool(left < right))
}

fn number_less_or_equal<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_float_pair(dialogue)?;
    Ok(Value::Bool(left < right || floats_equal(left, right)))
}

fn bool_not<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let value = dialogue.pop_value().as_bool()?;
    Ok(Value::Bool(!value))
}

fn bool_equal<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_bool_pair(dialogue)?;
    Ok(Value::Bool(left == right))
}

fn bool_not_equal<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_bool_pair(dialogue)?;
    Ok(Value::Bool(left != right))
}

fn bool_and<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_bool_pair(dialogue)?;
    Ok(Value::Bool(left && right))
}

fn bool_or<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_bool_pair(dialogue)?;
    Ok(Value::Bool(left || right))
}

fn bool_xor<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let (left, right) = pop_bool_pair(dialogue)?;
    Ok(Value::Bool(left ^ right))
}

fn visited<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let node = dialogue.pop_value();
    Ok(Value::Bool(dialogue.visited(node.as_str()?)))
}

fn visited_count<'p>(dialogue: &mut Dialogue<'p>) -> Result<Value<'p>, DialogueError> {
    let node = dialogue.pop_value();
    Ok(Value::Float(dialogue.visited_count(node.as_str()?) as f32))
}

fn division_by_zero(function: &str, left: f32) -> DialogueError {
    DialogueError::new(
        "STDLIB_DIVISION_BY_ZERO",
        format!("{} cannot divide {} by zero.", function, left),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DialogueOptions;

    fn dialogue() -> Dialogue<'static> {
        Dialogue::new(DialogueOptions::default()).expect("dialogue should build")
    }

    fn call(dialogue: &mut Dialogue<'static>, name: &str, args: &[Value<'static>]) -> Value<'static> {
        for arg in args {
            dialogue.push_value(arg.clone());
        }
        dialogue.call_function(name).expect("call should pass")
    }

    #[test]
    fn standard_library_names_are_unique() {
        let dialogue = dialogue();
        for decl in STANDARD_LIBRARY {
            assert!(dialogue.has_function(decl.name), "{}", decl.name);
        }
    }

    #[test]
    fn arithmetic_uses_left_then_right() {
        let mut dialogue = dialogue();
        let f = Value::Float;
        assert_eq!(call(&mut dialogue, "Number.Add", &[f(3.0), f(4.0)]), f(7.0));
        assert_eq!(call(&mut dialogue, "Number.Minus", &[f(10.0), f(4.0)]), f(6.0));
        assert_eq!(call(&mut dialogue, "Number.Multiply", &[f(3.0), f(4.0)]), f(12.0));
        assert_eq!(call(&mut dialogue, "Number.Divide", &[f(1.0), f(4.0)]), f(0.25));
        assert_eq!(call(&mut dialogue, "Number.Modulo", &[f(7.0), f(3.0)]), f(1.0));
        assert_eq!(call(&mut dialogue, "Number.UnaryMinus", &[f(2.5)]), f(-2.5));
        assert_eq!(dialogue.stack_len(), 0);
    }

    #[test]
    fn division_by_zero_checks_the_divisor() {
        let mut dialogue = dialogue();
        assert_eq!(
            call(&mut dialogue, "Number.Divide", &[Value::Float(0.0), Value::Float(2.0)]),
            Value::Float(0.0)
        );

        dialogue.push_value(Value::Float(1.0));
        dialogue.push_value(Value::Float(0.0));
        let error = dialogue
            .call_function("Number.Divide")
            .expect_err("divide by zero should fail");
        assert_eq!(error.code, "STDLIB_DIVISION_BY_ZERO");

        dialogue.push_value(Value::Float(5.0));
        dialogue.push_value(Value::Float(0.0));
        let error = dialogue
            .call_function("Number.Modulo")
            .expect_err("modulo by zero should fail");
        assert_eq!(error.code, "STDLIB_DIVISION_BY_ZERO");
    }

    #[test]
    fn modulo_requires_integers() {
        let mut dialogue = dialogue();
        dialogue.push_value(Value::Float(5.5));
        dialogue.push_value(Value::Float(2.0));
        let error = dialogue
            .call_function("Number.Modulo")
            .expect_err("fractional operand should fail");
        assert_eq!(error.code, "VALUE_NOT_INTEGER");
    }

    #[test]
    fn comparisons_return_bools() {
        let mut dialogue = dialogue();
        let f = Value::Float;
        let yes = Value::Bool(true);
        let no = Value::Bool(false);
        assert_eq!(call(&mut dialogue, "Number.EqualTo", &[f(0.3), f(0.1 + 0.2)]), yes);
        assert_eq!(call(&mut dialogue, "Number.NotEqualTo", &[f(1.0), f(2.0)]), yes);
        assert_eq!(call(&mut dialogue, "Number.GreaterThan", &[f(2.0), f(1.0)]), yes);
        assert_eq!(call(&mut dialogue, "Number.GreaterThanOrEqualTo", &[f(1.0), f(1.0)]), yes);
        assert_eq!(call(&mut dialogue, "Number.LessThan", &[f(2.0), f(1.0)]), no);
        assert_eq!(call(&mut dialogue, "Number.LessThanOrEqualTo", &[f(1.0), f(2.0)]), yes);
    }

    #[test]
    fn boolean_operators() {
        let mut dialogue = dialogue();
        let t = Value::Bool(true);
        let f = Value::Bool(false);
        assert_eq!(call(&mut dialogue, "Bool.Not", &[t.clone()]), f);
        assert_eq!(call(&mut dialogue, "Bool.EqualTo", &[t.clone(), t.clone()]), t);
        assert_eq!(call(&mut dialogue, "Bool.NotEqualTo", &[t.clone(), t.clone()]), f);
        assert_eq!(call(&mut dialogue, "Bool.And", &[t.clone(), f.clone()]), f);
        assert_eq!(call(&mut dialogue, "Bool.Or", &[t.clone(), f.clone()]), t);
        assert_eq!(call(&mut dialogue, "Bool.Xor", &[t.clone(), t.clone()]), f);
    }

    #[test]
    fn operand_types_are_checked() {
        let mut dialogue = dialogue();
        dialogue.push_value(Value::Bool(true));
        dialogue.push_value(Value::Float(1.0));
        let error = dialogue
            .call_function("Number.Add")
            .expect_err("bool operand should fail");
        assert_eq!(error.code, "VALUE_TYPE_MISMATCH");
    }

    #[test]
    fn visited_of_unknown_node_is_false_and_zero() {
        let mut dialogue = dialogue();
        assert_eq!(
            call(&mut dialogue, "visited", &[Value::owned("Nowhere")]),
            Value::Bool(false)
        );
        assert_eq!(
            call(&mut dialogue, "visited_count", &[Value::owned("Nowhere")]),
            Value::Float(0.0)
        );
        assert_eq!(dialogue.load_variable("#visited:Nowhere"), None);
    }
}
