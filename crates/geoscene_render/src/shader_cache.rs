//! Shared shader programs with deferred release
//!
//! Pipelines hold an `Arc` to the program they were built from. Dropping the
//! last pipeline doesn't free the program immediately; it stays cached (so a
//! pipeline rebuilt the next frame can reuse it) until the scene's periodic
//! sweep calls [`ShaderCache::destroy_released`].

use std::collections::HashMap;
use std::sync::Arc;

/// A compiled shader module and the label it was cached under
#[derive(Debug)]
pub struct ShaderProgram {
    pub label: String,
    pub module: wgpu::ShaderModule,
}

/// Cache of programs keyed by label
#[derive(Debug)]
pub struct ShaderCache<P = ShaderProgram> {
    programs: HashMap<String, Arc<P>>,
}

impl<P> Default for ShaderCache<P> {
    fn default() -> Self {
        Self {
            programs: HashMap::new(),
        }
    }
}

impl<P> ShaderCache<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached program for `label`, building it with `create` on a miss
    pub fn get_or_insert_with(&mut self, label: &str, create: impl FnOnce() -> P) -> Arc<P> {
        if let Some(program) = self.programs.get(label) {
            return program.clone();
        }
        log::debug!("Compiling shader program {}", label);
        let program = Arc::new(create());
        self.programs.insert(label.to_string(), program.clone());
        program
    }

    /// Drop every program only the cache still references; returns how many went
    pub fn destroy_released(&mut self) -> usize {
        let before = self.programs.len();
        self.programs.retain(|_, program| Arc::strong_count(program) > 1);
        let released = before - self.programs.len();
        if released > 0 {
            log::debug!("Released {} shader programs", released);
        }
        released
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
