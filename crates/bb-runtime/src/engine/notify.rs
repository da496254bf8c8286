impl<'p> Dialogue<'p> {
    fn notify(
        &mut self,
        event: &'static str,
        call: impl FnOnce(&mut (dyn DialogueDelegates + 'p), &mut Dialogue<'p>),
    ) {
        // Delegates are moved out while a callback runs.
        let Some(mut delegates) = self.delegates.take() else {
            warn!(event, "delegate callback skipped inside another handler");
            return;
        };

        call(delegates.as_mut(), self);

        // A handler may have installed replacement delegates.
        if self.delegates.is_none() {
            self.delegates = Some(delegates);
        }
    }
}
