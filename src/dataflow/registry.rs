use super::*;
use std::{collections::HashMap, fmt};

/// Opaque reference to a program context owned by a [`ContextRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgHandle(u64);

impl fmt::Display for ProgHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns analysed programs and hands out handles to them.
///
/// Handles are never reused, so a released handle stays invalid.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    next: u64,
    contexts: HashMap<ProgHandle, ProgramContext>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        ContextRegistry::default()
    }

    pub fn analyze(
        &mut self,
        latencies: &[Latency],
        trace: &[Instruction],
    ) -> Result<ProgHandle, AnalysisError> {
        let ctx = ProgramContext::analyze(latencies, trace)?;

        let handle = ProgHandle(self.next);
        self.next += 1;
        self.contexts.insert(handle, ctx);

        tracing::debug!(%handle, "registered program context");

        Ok(handle)
    }

    pub fn get(&self, handle: ProgHandle) -> Result<&ProgramContext, AnalysisError> {
        self.contexts
            .get(&handle)
            .ok_or(AnalysisError::InvalidHandle { handle })
    }

    pub fn inst_depth(&self, handle: ProgHandle, inst: usize) -> Result<Depth, AnalysisError> {
        self.get(handle)?.inst_depth(inst)
    }

    pub fn inst_deps(
        &self,
        handle: ProgHandle,
        inst: usize,
    ) -> Result<(Option<usize>, Option<usize>), AnalysisError> {
        self.get(handle)?.inst_deps(inst)
    }

    pub fn prog_depth(&self, handle: ProgHandle) -> Result<Depth, AnalysisError> {
        Ok(self.get(handle)?.prog_depth())
    }

    /// Drop the context behind `handle`, returning how many nodes it held.
    pub fn release(&mut self, handle: ProgHandle) -> Result<usize, AnalysisError> {
        match self.contexts.remove(&handle) {
            Some(ctx) => Ok(ctx.release()),
            None => {
                tracing::debug!(%handle, "release of unknown handle");
                Err(AnalysisError::InvalidHandle { handle })
            }
        }
    }

    /// Number of contexts currently held.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
