use std::borrow::Cow;

use crate::error::DialogueError;
use crate::value::Value;

/// Renders a value the way it appears inside substituted text.
pub fn format_value(value: &Value<'_>) -> Cow<'static, str> {
    match value {
        Value::None => Cow::Borrowed("None"),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::String(text) => Cow::Owned(text.to_string()),
        Value::Float(number) => Cow::Owned(format_float(*number)),
    }
}

fn format_float(number: f32) -> String {
    if number == 0.0 {
        return "0".to_string();
    }
    if !number.is_finite() || number.fract() == 0.0 {
        return number.to_string();
    }
    let fixed = format!("{:.6}", number);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        return "0".to_string();
    }
    trimmed.to_string()
}

/// Replaces every `{N}` in `template` with `substitutions[N]`.
pub fn substitute<S: AsRef<str>>(
    template: &str,
    substitutions: &[S],
) -> Result<String, DialogueError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(DialogueError::new(
                "SUBSTITUTE_MALFORMED",
                format!("Unterminated placeholder in \"{}\".", template),
            ));
        };
        let digits = &after[..close];
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(DialogueError::new(
                "SUBSTITUTE_MALFORMED",
                format!("Placeholder \"{{{}}}\" is not an index.", digits),
            ));
        }
        let index: usize = digits.parse().map_err(|_| {
            DialogueError::new(
                "SUBSTITUTE_MALFORMED",
                format!("Placeholder index \"{}\" is too large.", digits),
            )
        })?;
        let replacement = substitutions.get(index).ok_or_else(|| {
            DialogueError::new(
                "SUBSTITUTE_INDEX_OUT_OF_RANGE",
                format!(
                    "Placeholder {{{}}} used with {} substitution(s).",
                    index,
                    substitutions.len()
                ),
            )
        })?;
        out.push_str(replacement.as_ref());
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
