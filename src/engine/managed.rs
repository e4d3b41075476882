use super::NodeState;
use crate::core::{NodeError, ProcessingNode, SlotValue, Tendrils};
use crate::observability::NodeMetrics;
use crate::registry;
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::sync::Arc;

/// Owns one node together with its parameter, input and output containers
/// and drives it through the lifecycle with proper state checks.
///
/// The containers live as long as the `ManagedNode`, so output slots keep
/// their storage across process calls.
pub struct ManagedNode {
    name: String,
    inner: Box<dyn ProcessingNode>,
    state: NodeState,
    params: Tendrils,
    inputs: Tendrils,
    outputs: Tendrils,
    metrics: Arc<NodeMetrics>,
}

impl ManagedNode {
    pub fn new(name: impl Into<String>, node: Box<dyn ProcessingNode>) -> Self {
        let name = name.into();
        Self {
            metrics: Arc::new(NodeMetrics::new(name.clone())),
            name,
            inner: node,
            state: NodeState::Constructed,
            params: Tendrils::new(),
            inputs: Tendrils::new(),
            outputs: Tendrils::new(),
        }
    }

    /// Instantiate a registered node type by name.
    pub fn from_registry(name: impl Into<String>, node_type: &str) -> Result<Self> {
        let meta = registry::find(node_type)
            .ok_or_else(|| anyhow!("Unknown node type: {}", node_type))?;
        Ok(Self::new(name, meta.create_instance()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn metrics(&self) -> Arc<NodeMetrics> {
        self.metrics.clone()
    }

    fn violation(&self, operation: &'static str) -> anyhow::Error {
        NodeError::ContractViolation {
            operation,
            state: self.state.to_string(),
        }
        .into()
    }

    fn transition(&mut self, target: NodeState) {
        debug_assert!(self.state.can_transition_to(&target));
        log::debug!("node '{}': {} -> {}", self.name, self.state, target);
        self.state = target;
    }

    /// Run the declare-parameters stage on a fresh parameter container.
    pub fn declare_params(&mut self) -> Result<()> {
        if !self.state.can_transition_to(&NodeState::ParamsDeclared) {
            return Err(self.violation("declare parameters of"));
        }

        let mut params = Tendrils::new();
        if let Err(e) = self.inner.declare_params(&mut params) {
            self.transition(NodeState::Failed);
            return Err(e);
        }
        self.params = params;
        self.transition(NodeState::ParamsDeclared);
        Ok(())
    }

    pub fn params(&self) -> &Tendrils {
        &self.params
    }

    /// Parameter values can be supplied only after declaration and before
    /// configure.
    pub fn params_mut(&mut self) -> Result<&mut Tendrils> {
        if !self.state.accepts_params() {
            return Err(self.violation("set parameters of"));
        }
        Ok(&mut self.params)
    }

    pub fn set_param<T: SlotValue>(&mut self, name: &str, value: T) -> Result<()> {
        self.params_mut()?.set(name, value)?;
        Ok(())
    }

    /// Apply a JSON object of parameter values. Nothing is written unless
    /// every key is accepted.
    pub fn load_params_json(&mut self, values: &Value) -> Result<()> {
        self.params_mut()?.load_json(values)?;
        Ok(())
    }

    /// Run the configure stage with fresh input and output containers.
    /// A failure here is final.
    pub fn configure(&mut self) -> Result<()> {
        if !self.state.can_transition_to(&NodeState::Configured) {
            return Err(self.violation("configure"));
        }

        let mut inputs = Tendrils::new();
        let mut outputs = Tendrils::new();
        if let Err(e) = self.inner.configure(&self.params, &mut inputs, &mut outputs) {
            log::warn!("node '{}' failed to configure: {:#}", self.name, e);
            self.transition(NodeState::Failed);
            return Err(e);
        }
        self.inputs = inputs;
        self.outputs = outputs;
        self.transition(NodeState::Configured);
        Ok(())
    }

    pub fn inputs(&self) -> &Tendrils {
        &self.inputs
    }

    /// Host-side access for wiring input values before a process call.
    pub fn inputs_mut(&mut self) -> Result<&mut Tendrils> {
        if !self.state.is_configured() {
            return Err(self.violation("write inputs of"));
        }
        Ok(&mut self.inputs)
    }

    pub fn outputs(&self) -> &Tendrils {
        &self.outputs
    }

    /// One process call.
    ///
    /// Required inputs are checked first; a missing one is reported without
    /// touching the node. Fatal errors raised by the node (contract
    /// violations, uninitialized slots) end the node's use. Any other error
    /// leaves the node callable so the host can apply its own retry policy.
    pub fn process(&mut self) -> Result<()> {
        if !self.state.can_transition_to(&NodeState::Ready) {
            return Err(self.violation("process"));
        }

        if let Some(name) = self.inputs.missing_required().first() {
            return Err(NodeError::UninitializedSlot {
                name: name.to_string(),
            }
            .into());
        }

        let inner = &mut self.inner;
        let (params, inputs, outputs) = (&self.params, &self.inputs, &mut self.outputs);
        let result = self
            .metrics
            .measure(|| inner.process(params, inputs, outputs));

        match result {
            Ok(()) => {
                if self.state != NodeState::Ready {
                    self.transition(NodeState::Ready);
                }
                Ok(())
            }
            Err(e) => {
                let fatal = e
                    .downcast_ref::<NodeError>()
                    .is_some_and(NodeError::is_fatal);
                if fatal {
                    log::error!("node '{}' failed fatally: {:#}", self.name, e);
                    self.transition(NodeState::Failed);
                } else {
                    log::warn!("node '{}' process failed: {:#}", self.name, e);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{error_kind, ErrorKind};

    #[derive(Default)]
    struct Counter {
        step: i32,
    }

    impl ProcessingNode for Counter {
        fn declare_params(&mut self, params: &mut Tendrils) -> Result<()> {
            params.declare_with_default::<i32>("step", "Increment per call.", 1)?;
            Ok(())
        }

        fn configure(
            &mut self,
            params: &Tendrils,
            inputs: &mut Tendrils,
            outputs: &mut Tendrils,
        ) -> Result<()> {
            self.step = *params.get::<i32>("step")?;
            inputs.declare_with_default::<bool>("fail", "Raise an error.", false)?;
            outputs.declare_with_default::<i32>("total", "Running total.", 0)?;
            Ok(())
        }

        fn process(
            &mut self,
            _params: &Tendrils,
            inputs: &Tendrils,
            outputs: &mut Tendrils,
        ) -> Result<()> {
            if *inputs.get::<bool>("fail")? {
                anyhow::bail!("asked to fail");
            }
            *outputs.get_mut::<i32>("total")? += self.step;
            Ok(())
        }
    }

    fn ready_counter() -> ManagedNode {
        let mut node = ManagedNode::new("counter", Box::new(Counter::default()));
        node.declare_params().unwrap();
        node.set_param("step", 2).unwrap();
        node.configure().unwrap();
        node
    }

    #[test]
    fn test_full_lifecycle() {
        let mut node = ready_counter();
        assert_eq!(node.state(), NodeState::Configured);

        for _ in 0..3 {
            node.process().unwrap();
        }
        assert_eq!(node.state(), NodeState::Ready);
        assert_eq!(*node.outputs().get::<i32>("total").unwrap(), 6);
        assert_eq!(node.metrics().process_calls(), 3);
    }

    #[test]
    fn test_process_before_configure_is_violation() {
        let mut node = ManagedNode::new("counter", Box::new(Counter::default()));
        let err = node.process().unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::ContractViolation));

        node.declare_params().unwrap();
        let err = node.process().unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::ContractViolation));
        assert_eq!(node.state(), NodeState::ParamsDeclared);
    }

    #[test]
    fn test_stages_run_once() {
        let mut node = ready_counter();
        assert!(node.declare_params().is_err());
        assert!(node.configure().is_err());
        assert!(node.set_param("step", 5).is_err());
    }

    #[test]
    fn test_non_fatal_error_keeps_node_usable() {
        let mut node = ready_counter();
        node.inputs_mut().unwrap().set("fail", true).unwrap();
        assert!(node.process().is_err());
        assert_eq!(node.state(), NodeState::Configured);

        node.inputs_mut().unwrap().set("fail", false).unwrap();
        node.process().unwrap();
        assert_eq!(*node.outputs().get::<i32>("total").unwrap(), 2);
        assert_eq!(node.metrics().failures(), 1);
    }

    #[test]
    fn test_unknown_param_rejected() {
        let mut node = ManagedNode::new("counter", Box::new(Counter::default()));
        node.declare_params().unwrap();
        let err = node
            .load_params_json(&serde_json::json!({"stride": 3}))
            .unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::ContractViolation));
    }
}
