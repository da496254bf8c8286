impl<'p> Dialogue<'p> {
    pub fn select_option(&mut self, index: usize) -> Result<(), DialogueError> {
        if self.state != ExecutionState::WaitingOptionSelection {
            return Err(DialogueError::new(
                "ENGINE_NO_PENDING_OPTIONS",
                "No option selection is pending.",
            ));
        }

        let Some(option) = self.pending_options.get(index) else {
            return Err(DialogueError::new(
                "ENGINE_OPTION_INDEX",
                format!(
                    "Option index \"{}\" is out of range ({} pending).",
                    index,
                    self.pending_options.len()
                ),
            ));
        };

        if !option.is_available {
            return Err(DialogueError::new(
                "ENGINE_OPTION_UNAVAILABLE",
                format!("Option \"{}\" is not available.", index),
            ));
        }

        let destination = option.destination_node.clone();
        debug!(index, destination = %destination, "option selected");
        self.push_value(Value::owned(destination));
        self.pending_options.clear();
        self.state = ExecutionState::WaitingForContinue;
        Ok(())
    }
}
