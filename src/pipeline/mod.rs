//! Request pipeline: source → parse → validate → execute
//!
//! Every stage yields either its output or a finished [`ExecutionResult`];
//! the first failing stage ends the request. Whatever is left over (a panic,
//! a timeout, an executor error that is not a [`GraphQLError`]) is caught at
//! the outer boundary and normalized into a single `Internal` error, so a
//! call always settles with exactly one result.

use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, LazyLock};
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

use crate::config::PipelineConfig;
use crate::core::{
    Document, ExecutionResult, Fault, GraphQLError, QueryInput, RequestContext, Source, Variables,
};
use crate::execution::{DefaultExecutor, ExecutionArgs, Executor};
use crate::language::{GraphQLParser, QueryParser};
use crate::schema::Schema;
use crate::validation::DocumentValidator;

/// Everything needed to run one request; consumed by the pipeline
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub schema: Arc<Schema>,
    pub query: QueryInput,
    pub root_value: Value,
    pub context: RequestContext,
    pub variables: Variables,
    pub operation_name: Option<String>,
}

impl ExecutionRequest {
    pub fn new(schema: Arc<Schema>, query: impl Into<QueryInput>) -> Self {
        Self {
            schema,
            query: query.into(),
            root_value: Value::Null,
            context: RequestContext::empty(),
            variables: Variables::new(),
            operation_name: None,
        }
    }

    pub fn root_value(mut self, root_value: Value) -> Self {
        self.root_value = root_value;
        self
    }

    pub fn context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }
}

/// Orchestrates the collaborators of one request
///
/// The pipeline itself is immutable and can be shared between tasks; the
/// validator is never mutated per request, the cost rule is bound to each
/// call's variables through [`DocumentValidator::scoped_for`].
#[derive(Clone)]
pub struct RequestPipeline {
    parser: Arc<dyn QueryParser>,
    validator: Arc<DocumentValidator>,
    executor: Arc<dyn Executor>,
    config: PipelineConfig,
}

static DEFAULT_PIPELINE: LazyLock<Arc<RequestPipeline>> =
    LazyLock::new(|| Arc::new(RequestPipeline::default()));

impl Default for RequestPipeline {
    fn default() -> Self {
        Self {
            parser: Arc::new(GraphQLParser::new()),
            validator: DocumentValidator::global(),
            executor: Arc::new(DefaultExecutor::new()),
            config: PipelineConfig::default(),
        }
    }
}

impl RequestPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pipeline whose validator and deadline follow `config`
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            validator: Arc::new(DocumentValidator::from_config(&config)),
            config,
            ..Self::default()
        }
    }

    /// The process-wide pipeline used by [`execute`]
    pub fn shared() -> Arc<RequestPipeline> {
        DEFAULT_PIPELINE.clone()
    }

    pub fn with_parser(mut self, parser: Arc<dyn QueryParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_validator(mut self, validator: Arc<DocumentValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn validator(&self) -> &DocumentValidator {
        &self.validator
    }

    /// Run a request to completion on the current task
    ///
    /// Never fails: every outcome, including panics inside a collaborator and
    /// an elapsed deadline, is delivered as an [`ExecutionResult`].
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        // armed inside the guard; outside a tokio runtime the timer panics
        let deadline = self.config.timeout();
        let outcome = AssertUnwindSafe(async move {
            match deadline {
                Some(deadline) => tokio::time::timeout(deadline, self.run(request))
                    .await
                    .unwrap_or(Err(Fault::Timeout(deadline))),
                None => self.run(request).await,
            }
        })
        .catch_unwind()
        .await;

        let fault = match outcome {
            Ok(Ok(result)) => return result,
            Ok(Err(fault)) => fault,
            Err(payload) => Fault::Panic(panic_message(&*payload)),
        };
        tracing::error!(error = %fault, "request failed with an internal fault");
        ExecutionResult::from_fault(fault)
    }

    /// Run a request as its own tokio task
    ///
    /// The returned handle resolves to the result even if the task is
    /// aborted or dies.
    pub fn spawn(self: &Arc<Self>, request: ExecutionRequest) -> PendingResult {
        let pipeline = Arc::clone(self);
        PendingResult {
            handle: tokio::spawn(async move { pipeline.execute(request).await }),
        }
    }

    /// The stage fold; `Err` only carries faults the stages did not recognize
    async fn run(&self, request: ExecutionRequest) -> Result<ExecutionResult, Fault> {
        let document = match self.load_document(&request.query) {
            Ok(document) => document,
            Err(error) => {
                tracing::debug!(error = %error, "query failed to parse");
                return Ok(ExecutionResult::from_error(error));
            }
        };

        let errors = self
            .validator
            .scoped_for(&request.variables)
            .validate(&request.schema, &document);
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "query failed validation");
            return Ok(ExecutionResult::from_errors(errors));
        }

        let args = ExecutionArgs {
            schema: &request.schema,
            document: &document,
            root_value: &request.root_value,
            context: &request.context,
            variables: &request.variables,
            operation_name: request.operation_name.as_deref(),
        };

        match self.executor.execute(args).await {
            Ok(result) => Ok(result),
            Err(e) => match e.downcast::<GraphQLError>() {
                Ok(error) => Ok(ExecutionResult::from_error(error)),
                Err(other) => Err(Fault::Internal(other)),
            },
        }
    }

    /// Parse raw text, or hand back a document supplied by the caller
    fn load_document(&self, query: &QueryInput) -> Result<Arc<Document>, GraphQLError> {
        match query {
            QueryInput::Document(document) => Ok(Arc::clone(document)),
            QueryInput::Text(text) => {
                let source = Source::new(text.as_deref().unwrap_or_default(), &self.config.source_name);
                self.parser.parse(&source).map(Arc::new)
            }
        }
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("validator", &self.validator)
            .field("config", &self.config)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// A request running on its own task
#[derive(Debug)]
pub struct PendingResult {
    handle: JoinHandle<ExecutionResult>,
}

impl PendingResult {
    /// Stop the task; awaiting the handle then yields an `Internal` error
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for PendingResult {
    type Output = ExecutionResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "request task did not complete");
                ExecutionResult::from_fault(Fault::Cancelled(e.to_string()))
            }
        })
    }
}

/// Run one request through the process-wide default pipeline
///
/// Absent `context` and `variables` mean "none"; absent query text is parsed
/// as an empty document and reported as a syntax error.
pub async fn execute(
    schema: Arc<Schema>,
    query: impl Into<QueryInput>,
    root_value: Option<Value>,
    context: Option<RequestContext>,
    variables: Option<Variables>,
    operation_name: Option<&str>,
) -> ExecutionResult {
    let mut request = ExecutionRequest::new(schema, query)
        .root_value(root_value.unwrap_or(Value::Null))
        .context(context.unwrap_or_default())
        .variables(variables.unwrap_or_default());
    if let Some(name) = operation_name {
        request = request.operation_name(name);
    }
    RequestPipeline::shared().execute(request).await
}
