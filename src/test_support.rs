//! Scripted in-memory driver used by the unit tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sea_orm::Value;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::driver::{Connection, Statement};
use crate::error::{ErrorInfo, ExecutionError};
use crate::params::{BindOptions, ParamKey, ParamType, Params, Variable};

/// What the next `execute` call does.
#[derive(Debug, Clone)]
pub enum Outcome {
    Succeed { rows: u64 },
    /// Return `Ok(false)` and expose the info through `error_info`.
    Fail(ErrorInfo),
    Raise(ExecutionError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindCall {
    Column(ParamKey, Value, BindOptions),
    Param(ParamKey, Value, BindOptions),
    Value(ParamKey, Value, Option<ParamType>),
}

#[derive(Debug)]
pub struct FakeStatement {
    sql: String,
    outcomes: VecDeque<Outcome>,
    executions: Vec<Option<Params>>,
    binds: Vec<BindCall>,
    variables: Vec<Variable>,
    bind_error: Option<ExecutionError>,
    error_info: ErrorInfo,
    row_count: u64,
    delay: Option<Duration>,
}

impl FakeStatement {
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            outcomes: VecDeque::new(),
            executions: Vec::new(),
            binds: Vec::new(),
            variables: Vec::new(),
            bind_error: None,
            error_info: ErrorInfo::new("00000", None, None),
            row_count: 0,
            delay: None,
        }
    }

    /// Make every execution take at least `delay`.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = Some(delay);
    }

    /// Queue an outcome; executions beyond the queue succeed with no rows.
    pub fn push_outcome(&mut self, outcome: Outcome) {
        self.outcomes.push_back(outcome);
    }

    pub fn fail_binds(&mut self, error: ExecutionError) {
        self.bind_error = Some(error);
    }

    pub fn executions(&self) -> &[Option<Params>] {
        &self.executions
    }

    pub fn binds(&self) -> &[BindCall] {
        &self.binds
    }

    /// Current value of the most recently bound variable.
    pub fn last_bound_variable(&self) -> Option<Value> {
        self.variables.last().map(Variable::get)
    }

    fn bind(&mut self, call: BindCall) -> Result<bool, ExecutionError> {
        if let Some(err) = &self.bind_error {
            return Err(err.clone());
        }
        self.binds.push(call);
        Ok(true)
    }
}

impl Statement for FakeStatement {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn execute(&mut self, params: Option<&Params>) -> Result<bool, ExecutionError> {
        self.executions.push(params.cloned());
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match self.outcomes.pop_front().unwrap_or(Outcome::Succeed { rows: 0 }) {
            Outcome::Succeed { rows } => {
                self.row_count = rows;
                self.error_info = ErrorInfo::new("00000", None, None);
                Ok(true)
            }
            Outcome::Fail(info) => {
                self.row_count = 0;
                self.error_info = info;
                Ok(false)
            }
            Outcome::Raise(err) => {
                self.row_count = 0;
                Err(err)
            }
        }
    }

    fn bind_column(
        &mut self,
        column: &ParamKey,
        var: &Variable,
        options: &BindOptions,
    ) -> Result<bool, ExecutionError> {
        self.variables.push(var.clone());
        self.bind(BindCall::Column(column.clone(), var.get(), options.clone()))
    }

    fn bind_param(
        &mut self,
        param: &ParamKey,
        var: &Variable,
        options: &BindOptions,
    ) -> Result<bool, ExecutionError> {
        self.variables.push(var.clone());
        self.bind(BindCall::Param(param.clone(), var.get(), options.clone()))
    }

    fn bind_value(
        &mut self,
        param: &ParamKey,
        value: &Value,
        param_type: Option<ParamType>,
    ) -> Result<bool, ExecutionError> {
        self.bind(BindCall::Value(param.clone(), value.clone(), param_type))
    }

    fn error_info(&self) -> ErrorInfo {
        self.error_info.clone()
    }

    fn row_count(&self) -> u64 {
        self.row_count
    }
}

#[derive(Debug, Default)]
pub struct FakeConnection {
    prepare_error: Option<ExecutionError>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: ExecutionError) -> Self {
        Self {
            prepare_error: Some(error),
        }
    }
}

impl Connection for FakeConnection {
    type Statement = FakeStatement;

    fn prepare(&self, sql: &str) -> Result<FakeStatement, ExecutionError> {
        match &self.prepare_error {
            Some(err) => Err(err.clone()),
            None => Ok(FakeStatement::new(sql)),
        }
    }
}

/// A span seen by [`Capture`], with every field recorded on it.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: &'static str,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct Captured {
    spans: Vec<CapturedSpan>,
    by_id: HashMap<Id, usize>,
    events: Vec<CapturedEvent>,
}

/// Layer that keeps spans and events in memory for assertions.
#[derive(Debug, Clone, Default)]
pub struct Capture(Arc<Mutex<Captured>>);

impl Capture {
    /// Run `f` with a subscriber that records into a fresh capture.
    pub fn run<R>(f: impl FnOnce() -> R) -> (R, Capture) {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, capture)
    }

    pub fn spans(&self) -> Vec<CapturedSpan> {
        self.0.lock().unwrap().spans.clone()
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap().events.clone()
    }

    /// The only `db.query` span; panics unless exactly one was opened.
    pub fn query_span(&self) -> CapturedSpan {
        let spans: Vec<_> = self
            .spans()
            .into_iter()
            .filter(|span| span.name == "db.query")
            .collect();
        assert_eq!(spans.len(), 1, "expected one db.query span, got {spans:?}");
        spans[0].clone()
    }

    pub fn event(&self, message: &str) -> Option<CapturedEvent> {
        self.events().into_iter().find(|event| event.message == message)
    }
}

struct FieldVisitor<'a>(&'a mut BTreeMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));

        let mut captured = self.0.lock().unwrap();
        let idx = captured.spans.len();
        captured.spans.push(CapturedSpan {
            name: attrs.metadata().name(),
            fields,
        });
        captured.by_id.insert(id.clone(), idx);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
        let mut captured = self.0.lock().unwrap();
        if let Some(&idx) = captured.by_id.get(id) {
            values.record(&mut FieldVisitor(&mut captured.spans[idx].fields));
        }
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        let message = fields.remove("message").unwrap_or_default();

        self.0.lock().unwrap().events.push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
        });
    }
}
