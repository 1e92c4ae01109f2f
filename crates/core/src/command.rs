use async_trait::async_trait;

use crate::context::Context;

/// One stage of a pipeline. Reads its inputs from the context, writes its
/// outputs back, and reports failures with [`Context::add_error`] instead of
/// returning them.
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    /// Whether every input this command needs is present.
    fn is_executable(&self, ctx: &Context) -> bool;

    async fn execute(&self, ctx: &mut Context);
}

/// Commands run in order. Commands whose inputs are missing are skipped.
pub struct Chain {
    name: String,
    commands: Vec<Box<dyn Command>>,
}

impl Chain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn then(mut self, command: impl Command + 'static) -> Self {
        self.commands.push(Box::new(command));
        self
    }

    /// Returns how many commands actually ran.
    pub async fn execute(&self, ctx: &mut Context) -> usize {
        let mut executed = 0;
        for command in &self.commands {
            if !command.is_executable(ctx) {
                tracing::warn!(chain = %self.name, command = command.name(), "inputs missing, skipping");
                continue;
            }
            tracing::debug!(chain = %self.name, command = command.name(), "executing");
            command.execute(ctx).await;
            executed += 1;
        }
        executed
    }
}
