impl<'p> Dialogue<'p> {
    pub fn visited(&self, node: &str) -> bool {
        self.visited_count(node) > 0
    }

    pub fn visited_count(&self, node: &str) -> i32 {
        match self.storage.load(&visited_variable_name(node)) {
            Some(Value::Float(count)) => count as i32,
            _ => 0,
        }
    }

    fn mark_visited(&mut self, node: &str) {
        let count = self.visited_count(node).saturating_add(1);
        self.storage
            .save(&visited_variable_name(node), Value::Float(count as f32));
    }

    fn complete_node(&mut self, index: usize) {
        let program = self.loaded_program();
        let name = program.nodes[index].name.as_str();
        self.mark_visited(name);
        debug!(node = name, visits = self.visited_count(name), "node complete");
        self.notify("node_complete", |delegates, dialogue| {
            delegates.on_node_complete(dialogue, name)
        });
    }

    fn finish_dialogue(&mut self, index: usize) {
        self.complete_node(index);
        self.reset();
        debug!("dialogue complete");
        self.notify("dialogue_complete", |delegates, dialogue| {
            delegates.on_dialogue_complete(dialogue)
        });
    }
}
