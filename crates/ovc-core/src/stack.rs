//! The navigation stack: path from the root to the active level

use crate::components::{Context, Root};
use crate::{Component, Prompt, PromptSegment, PromptStyle, Result, Transition};

/// Ordered components, root first; never empty
#[derive(Debug, Clone)]
pub struct NavigationStack {
    components: Vec<Component>,
}

impl NavigationStack {
    pub fn new(root: Root) -> Self {
        Self {
            components: vec![Component::Root(root)],
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always false: the root cannot be removed
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Active level
    pub fn top(&self) -> &Component {
        // The root is never removed
        &self.components[self.components.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut Component {
        let last = self.components.len() - 1;
        &mut self.components[last]
    }

    pub fn push(&mut self, component: Component) {
        tracing::debug!("Entering {} '{}'", component.kind(), component.label());
        self.components.push(component);
    }

    /// Remove the active level; a no-op at the root
    pub fn pop(&mut self) -> Option<Component> {
        if self.components.len() > 1 {
            self.components.pop()
        } else {
            None
        }
    }

    /// Drop everything above the root
    pub fn reset(&mut self) {
        self.components.truncate(1);
    }

    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Push(component) => self.push(component),
            Transition::Pop => {
                self.pop();
            }
            Transition::Reset => self.reset(),
            Transition::Stay => {}
        }
    }

    /// Hand an accepted line to the active level and apply the result.
    /// On error the stack is left as it was.
    pub async fn submit(&mut self, line: &str, ctx: &mut Context<'_>) -> Result<()> {
        let transition = self.top_mut().transition(line, ctx).await?;
        self.apply(transition);
        Ok(())
    }

    /// Breadcrumb of every level: labels joined by `/`, the last separator
    /// replaced by ` > `
    pub fn prompt(&self) -> Prompt {
        let mut segments = Vec::with_capacity(self.components.len() * 2);
        for component in &self.components {
            segments.push(PromptSegment::new(component.label(), component.style()));
            segments.push(PromptSegment::new("/", PromptStyle::Default));
        }
        if let Some(last) = segments.last_mut() {
            last.text = " > ".to_string();
        }
        Prompt { segments }
    }
}
