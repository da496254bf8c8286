#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Next,
    Goto(usize),
    Stay,
}

impl<'p> Dialogue<'p> {
    /// Runs until the host is needed. `Ok(false)` means nothing ran.
    pub fn continue_dialogue(&mut self) -> Result<bool, DialogueError> {
        if self.state == ExecutionState::Running {
            return Ok(false);
        }

        let program = self.loaded_program();
        let node_index = self
            .current_node
            .expect("set_node must select a node before the dialogue can continue");
        assert!(
            self.current_instruction <= program.nodes[node_index].instructions.len(),
            "instruction pointer {} is past node \"{}\"",
            self.current_instruction,
            program.nodes[node_index].name
        );

        if self.state == ExecutionState::WaitingOptionSelection {
            warn!("continue_dialogue called while an option selection is pending");
            return Ok(false);
        }

        self.state = ExecutionState::Running;
        if self.dispatching {
            return Ok(false);
        }

        self.dispatching = true;
        let result = self.run();
        self.dispatching = false;

        match result {
            Ok(()) => Ok(true),
            Err(error) => {
                warn!(code = %error.code, message = %error.message, "dialogue aborted");
                self.reset();
                Err(error)
            }
        }
    }

    fn run(&mut self) -> Result<(), DialogueError> {
        let program = self.loaded_program();

        while self.state == ExecutionState::Running {
            let Some(node_index) = self.current_node else {
                self.state = ExecutionState::Stopped;
                break;
            };
            let node = &program.nodes[node_index];

            let Some(instruction) = node.instructions.get(self.current_instruction) else {
                self.finish_dialogue(node_index);
                self.redirected = false;
                continue;
            };

            trace!(
                node = %node.name,
                index = self.current_instruction,
                opcode = ?instruction.opcode,
                "dispatch"
            );
            let at = self.current_instruction;
            let result = self.dispatch(program, node_index, instruction);
            if std::mem::take(&mut self.redirected) && result.is_ok() {
                continue;
            }
            match result {
                Ok(Step::Next) => self.current_instruction += 1,
                Ok(Step::Goto(target)) => self.current_instruction = target,
                Ok(Step::Stay) => {}
                Err(error) => {
                    return Err(error.located(InstructionLocation {
                        node: node.name.clone(),
                        instruction: at,
                        opcode: instruction.opcode,
                    }))
                }
            }
        }

        Ok(())
    }

    fn dispatch(
        &mut self,
        program: &'p Program,
        node_index: usize,
        instruction: &'p Instruction,
    ) -> Result<Step, DialogueError> {
        let node = &program.nodes[node_index];

        match instruction.opcode {
            Opcode::PushString => {
                self.push_value(Value::borrowed(instruction.string_operand(0)?));
            }
            Opcode::PushFloat => {
                self.push_value(Value::Float(instruction.float_operand(0)?));
            }
            Opcode::PushBool => {
                self.push_value(Value::Bool(instruction.bool_operand(0)?));
            }
            Opcode::PushNull => {
                return Err(DialogueError::new(
                    "ENGINE_PUSH_NULL",
                    "PUSH_NULL is not supported; programs must not push null values.",
                ));
            }
            Opcode::PushVariable => {
                let name = instruction.string_operand(0)?;
                let value = match self.storage.load(name) {
                    Some(value) => value,
                    None => match self.initial_values.get(name) {
                        Some(value) => value.clone(),
                        None => {
                            return Err(DialogueError::new(
                                "ENGINE_UNDEFINED_VARIABLE",
                                format!("Variable \"{}\" is not defined.", name),
                            ))
                        }
                    },
                };
                self.push_value(value);
            }
            Opcode::StoreVariable => {
                let name = instruction.string_operand(0)?;
                let value = self.peek_value().clone().into_owned();
                self.storage.save(name, value);
            }
            Opcode::Pop => {
                self.pop_value();
            }
            Opcode::JumpTo => {
                let label = instruction.string_operand(0)?;
                return Ok(Step::Goto(resolve_label(node, label)?));
            }
            Opcode::Jump => {
                let target = resolve_label(node, self.peek_value().as_str()?)?;
                return Ok(Step::Goto(target));
            }
            Opcode::JumpIfFalse => {
                if !self.peek_value().as_bool()? {
                    let label = instruction.string_operand(0)?;
                    return Ok(Step::Goto(resolve_label(node, label)?));
                }
            }
            Opcode::AddOption => {
                let line_id = instruction.string_operand(0)?;
                let destination = instruction.string_operand(1)?;
                let count = substitution_count(instruction, 2)?;
                let substitutions = self.pop_substitutions(count);
                let is_available = if instruction.optional_bool_operand(3)?.unwrap_or(false) {
                    self.pop_value().as_bool()?
                } else {
                    true
                };
                self.pending_options.push(DialogueOption {
                    line: Line {
                        id: line_id.to_string(),
                        substitutions,
                    },
                    id: self.pending_options.len(),
                    destination_node: destination.to_string(),
                    is_available,
                });
            }
            Opcode::ShowOptions => {
                if self.pending_options.is_empty() {
                    self.finish_dialogue(node_index);
                    return Ok(Step::Stay);
                }

                self.state = ExecutionState::WaitingOptionSelection;
                let options = self.pending_options.clone();
                self.notify("options", |delegates, dialogue| {
                    delegates.on_options(dialogue, &options)
                });
                if self.state == ExecutionState::WaitingForContinue {
                    self.state = ExecutionState::Running;
                }
            }
            Opcode::RunLine => {
                let id = instruction.string_operand(0)?;
                let count = substitution_count(instruction, 1)?;
                let line = Line {
                    id: id.to_string(),
                    substitutions: self.pop_substitutions(count),
                };
                self.deliver("line", |delegates, dialogue| {
                    delegates.on_line(dialogue, &line)
                });
            }
            Opcode::RunCommand => {
                let template = instruction.string_operand(0)?;
                let count = substitution_count(instruction, 1)?;
                let command = if count > 0 {
                    let substitutions = self.pop_substitutions(count);
                    substitute(template, &substitutions)?
                } else {
                    template.to_string()
                };
                self.deliver("command", |delegates, dialogue| {
                    delegates.on_command(dialogue, &command)
                });
            }
            Opcode::CallFunc => {
                let name = instruction.string_operand(0)?;
                let argument_count = self.pop_value().as_int()?;
                let entry = self.library.get(name).ok_or_else(|| unknown_function(name))?;
                if usize::try_from(argument_count).ok() != Some(entry.arity) {
                    return Err(DialogueError::new(
                        "ENGINE_FUNCTION_ARITY",
                        format!(
                            "Function \"{}\" takes {} argument(s), called with {}.",
                            name, entry.arity, argument_count
                        ),
                    ));
                }
                let result = self.call_function(name)?;
                if result != Value::None {
                    self.push_value(result);
                }
            }
            Opcode::RunNode => {
                let target = self.pop_value();
                let target = target.as_str()?;
                let Some(target_index) = program.node_index(target) else {
                    return Err(DialogueError::new(
                        "ENGINE_NODE_NOT_FOUND",
                        format!("Program has no node \"{}\".", target),
                    ));
                };
                self.complete_node(node_index);
                self.enter_node(target_index);
                return Ok(Step::Goto(0));
            }
            Opcode::Stop => {
                self.finish_dialogue(node_index);
                return Ok(Step::Stay);
            }
            Opcode::Unknown => {
                return Err(DialogueError::new(
                    "ENGINE_UNKNOWN_OPCODE",
                    "Instruction uses an opcode this runtime does not understand.",
                ));
            }
        }

        Ok(Step::Next)
    }

    pub fn call_function(&mut self, name: &str) -> Result<Value<'p>, DialogueError> {
        let entry = self.library.get(name).ok_or_else(|| unknown_function(name))?;
        let Some(expected_len) = self.stack.len().checked_sub(entry.arity) else {
            return Err(DialogueError::new(
                "ENGINE_FUNCTION_STACK",
                format!(
                    "Function \"{}\" needs {} argument(s) but the stack holds {}.",
                    name,
                    entry.arity,
                    self.stack.len()
                ),
            ));
        };

        let result = (entry.function)(self)?;
        if self.stack.len() != expected_len {
            return Err(DialogueError::new(
                "ENGINE_FUNCTION_STACK",
                format!(
                    "Function \"{}\" left the stack at {} values, expected {}.",
                    name,
                    self.stack.len(),
                    expected_len
                ),
            ));
        }
        Ok(result)
    }

    fn deliver(
        &mut self,
        event: &'static str,
        call: impl FnOnce(&mut (dyn DialogueDelegates + 'p), &mut Dialogue<'p>),
    ) {
        self.state = ExecutionState::DeliveringContent;
        self.notify(event, call);
        if self.state == ExecutionState::DeliveringContent {
            self.state = ExecutionState::WaitingForContinue;
        }
    }
}

fn resolve_label(node: &Node, label: &str) -> Result<usize, DialogueError> {
    node.label_index(label).ok_or_else(|| {
        DialogueError::new(
            "ENGINE_LABEL_NOT_FOUND",
            format!("Node \"{}\" has no label \"{}\".", node.name, label),
        )
    })
}

fn unknown_function(name: &str) -> DialogueError {
    DialogueError::new(
        "ENGINE_FUNCTION_NOT_FOUND",
        format!("Function \"{}\" is not registered.", name),
    )
}
