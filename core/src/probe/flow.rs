//! LocalModelProbe: check the server, resolve an agent, run the prompts

use super::check::ModelServerClient;
use super::models::{ModelDescriptor, ModelSummary, SUMMARY_LIMIT};
use crate::agent::{AgentHandle, AgentRegistry, AgentRunner, RunResult};
use crate::config::{ProbeConfig, DEFAULT_MODEL};
use crate::error::ProbeError;
use crate::output::{emit, NullOutput, ProbeEvent, ProbeOutput};
use std::sync::Arc;

/// One prompt that ran to completion
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRun {
    /// 1-based position in the prompt list
    pub index: usize,
    pub prompt: String,
    pub result: RunResult,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub models: Vec<ModelDescriptor>,
    pub agent: Option<String>,
    pub runs: Vec<PromptRun>,
}

/// Drives the check / resolve / run stages.
///
/// Any failing stage is reported through the output handler and ends the
/// run; later stages are never attempted and nothing is retried.
pub struct LocalModelProbe {
    config: ProbeConfig,
    server: ModelServerClient,
    registry: Arc<dyn AgentRegistry>,
    runner: Arc<dyn AgentRunner>,
    output: Arc<dyn ProbeOutput>,
}

impl LocalModelProbe {
    pub fn new(
        config: ProbeConfig,
        registry: Arc<dyn AgentRegistry>,
        runner: Arc<dyn AgentRunner>,
    ) -> Self {
        Self {
            server: ModelServerClient::new(config.timeout()),
            config,
            registry,
            runner,
            output: Arc::new(NullOutput),
        }
    }

    /// Report progress to `output`
    pub fn with_output(mut self, output: Arc<dyn ProbeOutput>) -> Self {
        self.output = output;
        self
    }

    /// Query the model listing endpoint and report what it serves
    pub async fn check_server(&self) -> Result<Vec<ModelDescriptor>, ProbeError> {
        let endpoint = self.config.models_endpoint();
        tracing::info!("Checking model server at {}", endpoint);
        self.emit(ProbeEvent::CheckStarted {
            api_base: self.config.api_base.value.clone(),
            endpoint: endpoint.clone(),
        })
        .await;

        let models = match self.server.list_models(&endpoint).await {
            Ok(models) if models.is_empty() => return self.fail(ProbeError::NoModels).await,
            Ok(models) => models,
            Err(e) => return self.fail(e).await,
        };

        let summary = ModelSummary::new(&models, SUMMARY_LIMIT);
        self.emit(ProbeEvent::ModelsListed {
            total: summary.total,
            shown: summary.shown,
            remaining: summary.remaining,
        })
        .await;

        let model = &self.config.model.value;
        let listed = models
            .iter()
            .any(|m| m.id.as_deref() == Some(model.as_str()));
        if model != DEFAULT_MODEL && !listed {
            tracing::warn!("Configured model '{}' is not listed by the server", model);
            self.emit(ProbeEvent::ModelNotListed {
                model: model.clone(),
            })
            .await;
        }

        Ok(models)
    }

    /// Look up an agent by name
    pub async fn resolve_agent(&self, name: &str) -> Result<AgentHandle, ProbeError> {
        match self.registry.resolve(name) {
            Ok(agent) => {
                tracing::info!("Resolved agent '{}'", agent.name());
                self.emit(ProbeEvent::AgentResolved {
                    name: agent.name().to_string(),
                    description: agent.description().to_string(),
                })
                .await;
                Ok(agent)
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// Run prompt number `index` (1-based) of `total`
    pub async fn run_prompt(
        &self,
        agent: &AgentHandle,
        index: usize,
        total: usize,
        prompt: &str,
    ) -> Result<RunResult, ProbeError> {
        self.emit(ProbeEvent::PromptStarted {
            index,
            total,
            prompt: prompt.to_string(),
        })
        .await;

        match self.runner.run(agent, prompt).await {
            Ok(result) => {
                self.emit(ProbeEvent::PromptCompleted {
                    index,
                    result: result.clone(),
                })
                .await;
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Prompt {} failed: {}", index, e);
                self.fail(ProbeError::Execution {
                    prompt_index: index,
                    message: e.to_string(),
                })
                .await
            }
        }
    }

    /// Connectivity check only
    pub async fn check(&self) -> Result<ProbeReport, ProbeError> {
        let models = self.check_server().await?;
        self.emit(ProbeEvent::Completed { prompts_run: 0 }).await;

        Ok(ProbeReport {
            models,
            agent: None,
            runs: Vec::new(),
        })
    }

    /// The full flow: check, resolve, then every prompt in order
    pub async fn run(&self) -> Result<ProbeReport, ProbeError> {
        let models = self.check_server().await?;
        let agent = self.resolve_agent(&self.config.agent_name.value).await?;

        let prompts = &self.config.prompts.value;
        let mut runs = Vec::with_capacity(prompts.len());
        for (i, prompt) in prompts.iter().enumerate() {
            let index = i + 1;
            let result = self.run_prompt(&agent, index, prompts.len(), prompt).await?;
            runs.push(PromptRun {
                index,
                prompt: prompt.clone(),
                result,
            });
        }

        self.emit(ProbeEvent::Completed {
            prompts_run: runs.len(),
        })
        .await;

        Ok(ProbeReport {
            models,
            agent: Some(agent.name().to_string()),
            runs,
        })
    }

    async fn emit(&self, event: ProbeEvent) {
        emit(self.output.as_ref(), event).await;
    }

    async fn fail<T>(&self, error: ProbeError) -> Result<T, ProbeError> {
        self.emit(ProbeEvent::Failed {
            error: error.clone(),
        })
        .await;
        Err(error)
    }
}
