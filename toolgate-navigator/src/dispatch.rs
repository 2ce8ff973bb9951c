//! Tool listing and call dispatch over a loaded catalog.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use toolgate_catalog::{CategoryIndex, OperationCatalog, OperationDescriptor};
use toolgate_forwarder::{ForwardedResponse, RequestForwarder};
use toolgate_policy::{AccessPolicy, ModePolicy, PolicyAction, PolicyObserver, PolicyRequest};
use toolgate_primitives::{Credential, DiscoveryStrategy, Mode, SessionId};
use tracing::{debug, info};

use crate::error::ToolFailure;
use crate::navigation::NavigationState;
use crate::sessions::SessionStore;
use crate::tools::{NavigationTool, ToolDescriptor};
use crate::{flat, hierarchical};

/// Payload of a successful call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum ToolOutput {
    /// Navigation text.
    Text(String),
    /// Upstream response, whatever its status.
    Response(ForwardedResponse),
}

/// Result of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallOutcome {
    output: ToolOutput,
    tools_changed: bool,
}

impl CallOutcome {
    pub(crate) fn new(output: ToolOutput, tools_changed: bool) -> Self {
        Self {
            output,
            tools_changed,
        }
    }

    /// Call payload.
    #[must_use]
    pub fn output(&self) -> &ToolOutput {
        &self.output
    }

    /// Whether the listing changed, so a list-changed notice should be sent.
    #[must_use]
    pub const fn tools_changed(&self) -> bool {
        self.tools_changed
    }

    /// Text payload, if this was a navigation call.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.output {
            ToolOutput::Text(text) => Some(text),
            ToolOutput::Response(_) => None,
        }
    }

    /// Upstream response, if this was an operation call.
    #[must_use]
    pub fn response(&self) -> Option<&ForwardedResponse> {
        match &self.output {
            ToolOutput::Response(response) => Some(response),
            ToolOutput::Text(_) => None,
        }
    }
}

/// What a tool name refers to in a given state.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// Offered navigation tool.
    Navigation(NavigationTool),
    /// Catalog operation; still subject to the policy at invocation.
    Operation(&'a OperationDescriptor),
}

/// Serves tool listings and calls for one catalog under one mode.
///
/// Cheap to share behind an [`Arc`]; all per-caller state lives in
/// [`NavigationState`] values owned by the caller or a [`SessionStore`].
#[derive(Clone)]
pub struct Gateway {
    catalog: Arc<OperationCatalog>,
    visible: CategoryIndex,
    mode: Mode,
    strategy: DiscoveryStrategy,
    policy: ModePolicy,
    observer: Option<Arc<dyn PolicyObserver>>,
    forwarder: RequestForwarder,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("operations", &self.catalog.len())
            .field("visible", &self.visible.operation_count())
            .field("mode", &self.mode)
            .field("strategy", &self.strategy)
            .field("forwarder", &self.forwarder)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Creates a hierarchical gateway governed by [`ModePolicy`].
    #[must_use]
    pub fn new(catalog: Arc<OperationCatalog>, forwarder: RequestForwarder, mode: Mode) -> Self {
        let policy = ModePolicy;
        let visible = visible_index(&catalog, &policy, mode);
        info!(
            mode = mode.label(),
            categories = visible.categories().len(),
            tools = visible.operation_count(),
            "gateway ready"
        );
        Self {
            catalog,
            visible,
            mode,
            strategy: DiscoveryStrategy::default(),
            policy,
            observer: None,
            forwarder,
        }
    }

    /// Selects hierarchical or flat discovery.
    #[must_use]
    pub fn with_strategy(mut self, strategy: DiscoveryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Registers an observer notified of every invocation decision.
    #[must_use]
    pub fn with_policy_observer(mut self, observer: Arc<dyn PolicyObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Active mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Active discovery strategy.
    #[must_use]
    pub const fn strategy(&self) -> DiscoveryStrategy {
        self.strategy
    }

    /// Full catalog, including operations hidden by the policy.
    #[must_use]
    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// Categories restricted to visible operations.
    #[must_use]
    pub fn categories(&self) -> &CategoryIndex {
        &self.visible
    }

    /// Fresh listing of the tools offered in `state`.
    #[must_use]
    pub fn list_tools(&self, state: &NavigationState) -> Vec<ToolDescriptor> {
        match self.strategy {
            DiscoveryStrategy::Hierarchical => hierarchical::list(&self.visible, state),
            DiscoveryStrategy::Flat => flat::list(
                self.catalog
                    .operations()
                    .iter()
                    .map(AsRef::as_ref)
                    .filter(|op| self.permits(op, PolicyAction::Discover, false)),
            ),
        }
    }

    /// Resolves a tool name in `state`.
    ///
    /// # Errors
    ///
    /// Returns an `OperationNotVisible` failure for unknown names and for
    /// navigation tools not offered in `state`.
    pub fn resolve(&self, state: &NavigationState, name: &str) -> Result<Target<'_>, ToolFailure> {
        if self.strategy == DiscoveryStrategy::Hierarchical {
            if let Some(tool) = NavigationTool::from_name(name) {
                if hierarchical::offered(state, tool) {
                    return Ok(Target::Navigation(tool));
                }
            }
        }
        self.catalog
            .get(name)
            .map(Target::Operation)
            .ok_or_else(|| ToolFailure::not_available(name))
    }

    /// Runs a navigation tool against `state`.
    ///
    /// # Errors
    ///
    /// See [`hierarchical::navigate`].
    pub fn navigate(
        &self,
        state: &mut NavigationState,
        tool: NavigationTool,
        arguments: &Value,
    ) -> Result<CallOutcome, ToolFailure> {
        hierarchical::navigate(&self.visible, state, tool, arguments)
    }

    /// Re-checks the policy and forwards one operation call.
    ///
    /// # Errors
    ///
    /// Returns `OperationNotVisible` when the policy denies the call, and
    /// the mapped forwarder failure otherwise. Upstream error statuses are
    /// successful outcomes.
    pub async fn invoke(
        &self,
        operation: &OperationDescriptor,
        arguments: &Value,
        credential: Option<&Credential>,
    ) -> Result<CallOutcome, ToolFailure> {
        if !self.permits(operation, PolicyAction::Invoke, true) {
            return Err(ToolFailure::not_available(operation.id().as_str()));
        }
        let response = self.forwarder.forward(operation, arguments, credential).await?;
        Ok(CallOutcome::new(ToolOutput::Response(response), false))
    }

    /// Calls a tool with caller-owned navigation state.
    ///
    /// # Errors
    ///
    /// Propagates [`Gateway::resolve`], [`Gateway::navigate`], and
    /// [`Gateway::invoke`] failures.
    pub async fn call(
        &self,
        state: &mut NavigationState,
        name: &str,
        arguments: &Value,
        credential: Option<&Credential>,
    ) -> Result<CallOutcome, ToolFailure> {
        match self.resolve(state, name)? {
            Target::Navigation(tool) => self.navigate(state, tool, arguments),
            Target::Operation(operation) => self.invoke(operation, arguments, credential).await,
        }
    }

    /// Lists tools for a session kept in `sessions`.
    #[must_use]
    pub fn list_session_tools(&self, sessions: &SessionStore, session: &SessionId) -> Vec<ToolDescriptor> {
        self.list_tools(&sessions.state(session))
    }

    /// Calls a tool for a session kept in `sessions`.
    ///
    /// Operation calls read the session's position without recording it.
    /// Navigation runs in one step under the session lock, re-resolving the
    /// name against the state it finds there.
    ///
    /// # Errors
    ///
    /// Same as [`Gateway::call`].
    pub async fn call_in_session(
        &self,
        sessions: &SessionStore,
        session: &SessionId,
        name: &str,
        arguments: &Value,
        credential: Option<&Credential>,
    ) -> Result<CallOutcome, ToolFailure> {
        if let Target::Operation(operation) = self.resolve(&sessions.state(session), name)? {
            return self.invoke(operation, arguments, credential).await;
        }

        let navigated = sessions.update(
            session,
            |state| -> Result<Option<CallOutcome>, ToolFailure> {
                match self.resolve(state, name)? {
                    Target::Navigation(tool) => self.navigate(state, tool, arguments).map(Some),
                    Target::Operation(_) => Ok(None),
                }
            },
        )?;

        match navigated {
            Some(outcome) => {
                debug!(session = %session, tool = name, "navigation call handled");
                Ok(outcome)
            }
            None => {
                let operation = self
                    .catalog
                    .get(name)
                    .ok_or_else(|| ToolFailure::not_available(name))?;
                self.invoke(operation, arguments, credential).await
            }
        }
    }

    fn permits(&self, operation: &OperationDescriptor, action: PolicyAction, notify: bool) -> bool {
        let request = PolicyRequest::for_operation(operation, action, self.mode);
        let decision = self.policy.evaluate(&request);
        if notify {
            if let Some(observer) = &self.observer {
                observer.on_decision(&request, decision);
            }
        }
        decision.is_allow()
    }
}

fn visible_index(catalog: &OperationCatalog, policy: &impl AccessPolicy, mode: Mode) -> CategoryIndex {
    CategoryIndex::build(catalog).filtered(|operation| {
        policy
            .evaluate(&PolicyRequest::for_operation(
                operation,
                PolicyAction::Discover,
                mode,
            ))
            .is_allow()
    })
}
