impl<'p> Dialogue<'p> {
    pub fn push_value(&mut self, value: Value<'p>) {
        assert!(
            self.stack.len() < self.options.stack_capacity,
            "value stack overflow (capacity {})",
            self.options.stack_capacity
        );
        self.stack.push(value);
    }

    pub fn pop_value(&mut self) -> Value<'p> {
        self.stack.pop().expect("value stack underflow")
    }

    pub fn peek_value(&self) -> &Value<'p> {
        self.stack.last().expect("value stack underflow")
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    fn pop_substitutions(&mut self, count: usize) -> Vec<String> {
        let mut substitutions = vec![String::new(); count];
        for slot in substitutions.iter_mut().rev() {
            *slot = format_value(&self.pop_value()).into_owned();
        }
        substitutions
    }
}

fn substitution_count(instruction: &Instruction, index: usize) -> Result<usize, DialogueError> {
    let Some(raw) = instruction.optional_float_operand(index)? else {
        return Ok(0);
    };
    let count = Value::Float(raw).as_int()?;
    usize::try_from(count).map_err(|_| {
        DialogueError::new(
            "OPERAND_TYPE",
            format!("{:?} substitution count {} is negative.", instruction.opcode, count),
        )
    })
}
