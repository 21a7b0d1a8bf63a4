use crate::model::{ExecutionContext, ScriptOutcome};
use parking_lot::Mutex;
use rhai::{Dynamic, Engine, EvalAltResult, ImmutableString, Map, Position, Scope};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bounds applied to every script run. A script hitting either bound is
/// stopped and reported as a failed run, never as a host fault.
#[derive(Debug, Clone, Copy)]
pub struct ScriptLimits {
    pub timeout: Duration,
    pub max_operations: u64,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(1000),
            max_operations: 1_000_000,
        }
    }
}

/// Executes user-authored assertion scripts against a captured response.
///
/// Each run gets a fresh engine whose only bindings are the five context
/// fields, `assert` and `log`. The engine has no module loader, no host
/// functions beyond those, and a progress hook enforcing the limits, so a
/// script cannot reach host state, perform I/O, or block the process.
pub struct ScriptRuntime {
    limits: ScriptLimits,
}

impl ScriptRuntime {
    pub fn new(limits: ScriptLimits) -> Self {
        Self { limits }
    }

    pub fn run(&self, script: &str, context: ExecutionContext) -> ScriptOutcome {
        if script.is_empty() {
            return ScriptOutcome::completed(context, Vec::new());
        }

        let logs = Arc::new(Mutex::new(Vec::<String>::new()));
        let engine = self.build_engine(&logs);

        let mut scope = Scope::new();
        if let Err(error) = bind_context(&mut scope, &context) {
            return ScriptOutcome::failed(context, Vec::new(), error);
        }

        let result = engine.run_with_scope(&mut scope, script);

        // The scope holds whatever the script left behind, success or not.
        let context = read_back_context(&scope, context);
        let mut logs = logs.lock().clone();

        match result {
            Ok(()) => ScriptOutcome::completed(context, logs),
            Err(err) => {
                let message = describe_error(&err);
                logs.push(message.clone());
                ScriptOutcome::failed(context, logs, message)
            }
        }
    }

    fn build_engine(&self, logs: &Arc<Mutex<Vec<String>>>) -> Engine {
        let mut engine = Engine::new();
        engine.set_max_operations(self.limits.max_operations);
        engine.set_max_call_levels(64);
        engine.set_max_expr_depths(64, 32);
        engine.set_max_string_size(1_000_000);
        engine.set_max_array_size(10_000);
        engine.set_max_map_size(10_000);
        engine.set_max_modules(0);

        let deadline = Instant::now() + self.limits.timeout;
        engine.on_progress(move |_| {
            if Instant::now() >= deadline {
                Some(Dynamic::from("deadline"))
            } else {
                None
            }
        });

        engine.register_fn("assert", |condition: bool| -> Result<(), Box<EvalAltResult>> {
            if condition {
                Ok(())
            } else {
                Err(assertion_error("assertion failed"))
            }
        });
        engine.register_fn(
            "assert",
            |condition: bool, message: ImmutableString| -> Result<(), Box<EvalAltResult>> {
                if condition {
                    Ok(())
                } else {
                    Err(assertion_error(&message))
                }
            },
        );

        let sink = Arc::clone(logs);
        engine.register_fn("log", move |value: Dynamic| {
            sink.lock().push(format!("log: {}", render_value(&value)));
        });

        engine
    }
}

fn assertion_error(message: &str) -> Box<EvalAltResult> {
    let mut payload = Map::new();
    payload.insert("name".into(), Dynamic::from("AssertionError"));
    payload.insert("message".into(), Dynamic::from(message.to_string()));
    Box::new(EvalAltResult::ErrorRuntime(
        Dynamic::from_map(payload),
        Position::NONE,
    ))
}

fn bind_context(scope: &mut Scope, context: &ExecutionContext) -> Result<(), String> {
    scope.push("status", context.status);
    for (name, value) in [
        ("body", &context.body),
        ("headers", &context.headers),
        ("records", &context.records),
        ("params", &context.params),
    ] {
        let dynamic = rhai::serde::to_dynamic(value)
            .map_err(|e| format!("ScriptError: context field {name} is not representable: {e}"))?;
        scope.push_dynamic(name, dynamic);
    }
    Ok(())
}

fn read_back_context(scope: &Scope, initial: ExecutionContext) -> ExecutionContext {
    ExecutionContext {
        status: scope.get_value::<i64>("status").unwrap_or(initial.status),
        body: read_back(scope, "body", initial.body),
        headers: read_back(scope, "headers", initial.headers),
        records: read_back(scope, "records", initial.records),
        params: read_back(scope, "params", initial.params),
    }
}

fn read_back(scope: &Scope, name: &str, fallback: Value) -> Value {
    scope
        .get_value::<Dynamic>(name)
        .and_then(|d| rhai::serde::from_dynamic::<Value>(&d).ok())
        .unwrap_or(fallback)
}

/// Renders a logged value: error-like maps as `name: message`, strings raw,
/// other composites as indented JSON.
fn render_value(value: &Dynamic) -> String {
    if value.is::<Map>() {
        if let Some(map) = value.read_lock::<Map>() {
            if let Some(rendered) = render_error_like(&map) {
                return rendered;
            }
        }
    }
    if value.is::<ImmutableString>() {
        return value.clone().into_string().unwrap_or_default();
    }
    if value.is::<Map>() || value.is::<rhai::Array>() {
        if let Ok(json) = rhai::serde::from_dynamic::<Value>(value) {
            if let Ok(pretty) = serde_json::to_string_pretty(&json) {
                return pretty;
            }
        }
    }
    value.to_string()
}

fn render_error_like(map: &Map) -> Option<String> {
    let name = map.get("name")?;
    let message = map.get("message")?;
    Some(format!("{}: {}", name, message))
}

fn describe_error(err: &EvalAltResult) -> String {
    match err {
        EvalAltResult::ErrorRuntime(token, _) => {
            if token.is::<Map>() {
                if let Some(map) = token.read_lock::<Map>() {
                    if let Some(rendered) = render_error_like(&map) {
                        return rendered;
                    }
                }
            }
            format!("ScriptError: {token}")
        }
        EvalAltResult::ErrorTerminated(_, _) => {
            "TimeoutError: script exceeded the execution time limit".to_string()
        }
        EvalAltResult::ErrorTooManyOperations(_) => {
            "TimeoutError: script exceeded the operation limit".to_string()
        }
        other => format!("ScriptError: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScriptStatus;
    use serde_json::json;

    fn context(status: i64) -> ExecutionContext {
        ExecutionContext {
            status,
            body: json!({"token": "abc"}),
            headers: json!({"content-type": "application/json"}),
            records: json!({}),
            params: json!({"user": "u1"}),
        }
    }

    fn runtime() -> ScriptRuntime {
        ScriptRuntime::new(ScriptLimits::default())
    }

    #[test]
    fn empty_script_succeeds_without_touching_anything() {
        let ctx = context(200);
        let outcome = runtime().run("", ctx.clone());
        assert_eq!(outcome.status, ScriptStatus::Completed);
        assert_eq!(outcome.context, ctx);
        assert!(outcome.logs.is_empty());
        assert!(outcome.error.is_none());
    }

    #[test]
    fn failed_assertion_is_contained() {
        let outcome = runtime().run("assert(status == 200)", context(404));
        assert_eq!(outcome.status, ScriptStatus::Failed);
        let error = outcome.error.unwrap();
        assert_eq!(error, "AssertionError: assertion failed");
        assert!(outcome.logs.contains(&error));
        assert_eq!(outcome.context.status, 404);
    }

    #[test]
    fn assertion_message_is_reported() {
        let outcome = runtime().run(r#"assert(status == 200, "expected OK")"#, context(404));
        assert_eq!(
            outcome.error.as_deref(),
            Some("AssertionError: expected OK")
        );
    }

    #[test]
    fn passing_assertions_complete() {
        let outcome = runtime().run(
            r#"assert(status == 200); assert(body.token == "abc")"#,
            context(200),
        );
        assert_eq!(outcome.status, ScriptStatus::Completed);
        assert!(outcome.error.is_none());
    }

    #[test]
    fn log_renders_maps_indented() {
        let outcome = runtime().run("log(#{a: 1}); assert(true)", context(200));
        assert_eq!(outcome.status, ScriptStatus::Completed);
        assert_eq!(outcome.logs.len(), 1);
        assert!(outcome.logs[0].starts_with("log: "));
        assert!(outcome.logs[0].contains("\"a\": 1"));
    }

    #[test]
    fn log_renders_strings_raw() {
        let outcome = runtime().run(r#"log("checkpoint"); assert(true)"#, context(200));
        assert_eq!(outcome.logs, vec!["log: checkpoint".to_string()]);
    }

    #[test]
    fn thrown_error_objects_keep_name_and_message() {
        let outcome = runtime().run(r#"throw #{name: "TypeError", message: "x"};"#, context(200));
        assert_eq!(outcome.status, ScriptStatus::Failed);
        assert_eq!(outcome.error.as_deref(), Some("TypeError: x"));
        assert!(outcome.logs.contains(&"TypeError: x".to_string()));
    }

    #[test]
    fn scripts_may_mutate_the_context() {
        let outcome = runtime().run(
            r#"status = 201; records = #{token: body.token}; assert(true)"#,
            context(200),
        );
        assert_eq!(outcome.status, ScriptStatus::Completed);
        assert_eq!(outcome.context.status, 201);
        assert_eq!(outcome.context.records, json!({"token": "abc"}));
    }

    #[test]
    fn runaway_script_hits_the_operation_ceiling() {
        let runtime = ScriptRuntime::new(ScriptLimits {
            timeout: Duration::from_secs(10),
            max_operations: 10_000,
        });
        let outcome = runtime.run("let x = 0; loop { x += 1; }", context(200));
        assert_eq!(outcome.status, ScriptStatus::Failed);
        assert!(outcome.error.unwrap().starts_with("TimeoutError"));
    }

    #[test]
    fn runaway_script_hits_the_wall_clock_deadline() {
        let runtime = ScriptRuntime::new(ScriptLimits {
            timeout: Duration::from_millis(50),
            max_operations: u64::MAX,
        });
        let outcome = runtime.run("let x = 0; loop { x += 1; }", context(200));
        assert_eq!(outcome.status, ScriptStatus::Failed);
        assert!(outcome.error.unwrap().starts_with("TimeoutError"));
    }

    #[test]
    fn unknown_host_calls_fail_without_crashing() {
        let outcome = runtime().run(r#"open_file("/etc/passwd")"#, context(200));
        assert_eq!(outcome.status, ScriptStatus::Failed);
        assert!(outcome.error.unwrap().starts_with("ScriptError"));
    }
}
