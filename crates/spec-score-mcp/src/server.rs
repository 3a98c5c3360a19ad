use std::collections::HashMap;
use std::io::{self, BufRead, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Instant;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use spec_score_chart::{generate_comparison_svg, generate_radar_svg, ChartConfig};
use spec_score_core::{balance_label, score_from_axes, AxisScores, ScoreResult};
use spec_score_pages::{page_for_path, pages};

use crate::protocol::{code, JsonRpcRequest, JsonRpcResponse};

const DEFAULT_MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "spec-score-mcp";
const SERVER_VERSION: &str = "0.1.0";

const AXIS_RANGE_MESSAGE: &str = "All axes must be numbers between 0 and 1";

pub struct McpServer {
    metrics: Mutex<MetricsRegistry>,
}

#[derive(Debug, Default, Clone)]
struct ToolMetric {
    ok: u64,
    err: u64,
    total_latency_ms: f64,
    max_latency_ms: f64,
}

#[derive(Debug, Default)]
struct MetricsRegistry {
    tool: HashMap<String, ToolMetric>,
}

impl McpServer {
    pub fn new() -> Self {
        Self {
            metrics: Mutex::new(MetricsRegistry::default()),
        }
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                code::INVALID_REQUEST,
                "invalid jsonrpc version",
            ));
        }

        let is_notification = request.id.is_none();
        let id = request.id.clone().unwrap_or(Value::Null);

        if is_notification && request.method == "notifications/initialized" {
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_MCP_PROTOCOL_VERSION);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
                        "capabilities": {
                            "tools": {
                                "listChanged": false
                            },
                            "resources": {
                                "subscribe": false,
                                "listChanged": false
                            }
                        }
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, tools_list_result()),
            "tools/call" => self.handle_tools_call(id, request.params),
            "resources/list" => JsonRpcResponse::success(id, resources_list_result()),
            "resources/read" => handle_resources_read(id, request.params),
            _ => JsonRpcResponse::error(id, code::METHOD_NOT_FOUND, "method not found"),
        };

        Some(response)
    }

    fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ToolsCallParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(
                    id,
                    code::INVALID_PARAMS,
                    format!("invalid params: {err}"),
                );
            }
        };

        let start = Instant::now();
        let tool = parsed.name.clone();
        let response = match parsed.name.as_str() {
            "spec_score" => exec_spec_score(id, parsed.arguments),
            "spec_visualize" => exec_spec_visualize(id, parsed.arguments),
            "spec_compare" => exec_spec_compare(id, parsed.arguments),
            _ => JsonRpcResponse::error(id, code::METHOD_NOT_FOUND, "unknown tool"),
        };
        self.record_tool_metrics(
            &tool,
            start.elapsed().as_secs_f64() * 1000.0,
            response.error.is_some(),
        );
        response
    }

    fn record_tool_metrics(&self, tool: &str, latency_ms: f64, is_error: bool) {
        let mut locked = self.metrics.lock();
        let metric = locked.tool.entry(tool.to_string()).or_default();
        if is_error {
            metric.err = metric.err.saturating_add(1);
        } else {
            metric.ok = metric.ok.saturating_add(1);
        }
        metric.total_latency_ms += latency_ms;
        metric.max_latency_ms = metric.max_latency_ms.max(latency_ms);
    }

    fn render_metrics_text(&self) -> String {
        let mut lines = vec![
            "# TYPE spec_score_tool_calls_total counter".to_string(),
            "# TYPE spec_score_tool_latency_ms_sum counter".to_string(),
            "# TYPE spec_score_tool_latency_ms_count counter".to_string(),
            "# TYPE spec_score_tool_latency_ms_max gauge".to_string(),
            "# TYPE spec_score_tool_error_ratio gauge".to_string(),
        ];

        let locked = self.metrics.lock();
        let mut total_calls = 0_u64;
        let mut total_errors = 0_u64;
        let mut entries = locked.tool.iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (tool, m) in entries {
            let tool_label = prom_label_value(tool);
            lines.push(format!(
                "spec_score_tool_calls_total{{tool=\"{}\",status=\"ok\"}} {}",
                tool_label, m.ok
            ));
            lines.push(format!(
                "spec_score_tool_calls_total{{tool=\"{}\",status=\"error\"}} {}",
                tool_label, m.err
            ));
            lines.push(format!(
                "spec_score_tool_latency_ms_sum{{tool=\"{}\"}} {:.3}",
                tool_label, m.total_latency_ms
            ));
            lines.push(format!(
                "spec_score_tool_latency_ms_count{{tool=\"{}\"}} {}",
                tool_label,
                m.ok + m.err
            ));
            lines.push(format!(
                "spec_score_tool_latency_ms_max{{tool=\"{}\"}} {:.3}",
                tool_label, m.max_latency_ms
            ));
            total_calls = total_calls.saturating_add(m.ok + m.err);
            total_errors = total_errors.saturating_add(m.err);
        }

        let tool_error_ratio = if total_calls == 0 {
            0.0
        } else {
            total_errors as f64 / total_calls as f64
        };
        lines.push(format!("spec_score_tool_error_ratio {tool_error_ratio:.6}"));
        lines.join("\n")
    }

    pub fn serve_stdio(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut reader = io::BufReader::new(stdin.lock());
        let mut stdout = io::stdout();
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim_end_matches(['\r', '\n']).trim_start();
            if trimmed.is_empty() {
                continue;
            }

            let (payload, frame) = if is_stdio_header_line(trimmed) {
                let content_length = match read_stdio_content_length(&mut reader, trimmed) {
                    Ok(v) => v,
                    Err(err) => {
                        let response = JsonRpcResponse::error(
                            Value::Null,
                            code::PARSE_ERROR,
                            format!("invalid stdio frame: {err}"),
                        );
                        write_stdio_response(&mut stdout, &response, StdioFrame::LineDelimited)?;
                        continue;
                    }
                };

                let mut body = vec![0_u8; content_length];
                if let Err(err) = reader.read_exact(&mut body) {
                    let response = JsonRpcResponse::error(
                        Value::Null,
                        code::PARSE_ERROR,
                        format!("invalid stdio frame body: {err}"),
                    );
                    write_stdio_response(&mut stdout, &response, StdioFrame::ContentLength)?;
                    continue;
                }
                (body, StdioFrame::ContentLength)
            } else {
                (trimmed.as_bytes().to_vec(), StdioFrame::LineDelimited)
            };

            let request: JsonRpcRequest = match serde_json::from_slice(&payload) {
                Ok(v) => v,
                Err(err) => {
                    let response = JsonRpcResponse::error(
                        Value::Null,
                        code::PARSE_ERROR,
                        format!("parse error: {err}"),
                    );
                    write_stdio_response(&mut stdout, &response, frame)?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request) {
                write_stdio_response(&mut stdout, &response, frame)?;
            }
        }

        Ok(())
    }

    pub fn serve_http(&self, addr: &str) -> io::Result<()> {
        let listener = TcpListener::bind(addr)?;
        eprintln!("spec-score-mcp http listening on {}", listener.local_addr()?);
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(err) = self.handle_http_connection(stream) {
                        eprintln!("spec-score-mcp http request error: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("spec-score-mcp http accept error: {err}");
                }
            }
        }
        Ok(())
    }

    fn handle_http_connection(&self, mut stream: TcpStream) -> io::Result<()> {
        let Some(req) = read_http_request(&stream)? else {
            return Ok(());
        };
        let response = self.dispatch_http_request(req);
        write_http_response(&mut stream, response)
    }

    fn dispatch_http_request(&self, req: HttpRequest) -> HttpResponse {
        if req.method == "GET" {
            if let Some(page) = page_for_path(&req.path) {
                return HttpResponse::text(200, page.mime_type, page.text.to_string());
            }
            if req.path == "/health" {
                return HttpResponse::json(200, json!({"status":"ok"}));
            }
            if req.path == "/metrics" {
                return HttpResponse::text(
                    200,
                    "text/plain; version=0.0.4; charset=utf-8",
                    self.render_metrics_text(),
                );
            }
        }

        if req.method != "POST" {
            return HttpResponse::json(
                405,
                json!({"error":"method_not_allowed","message":"supported endpoints: GET /, GET /privacy, GET /health, GET /metrics, POST /score, POST /visualize, POST /compare, POST /mcp"}),
            );
        }

        match req.path.as_str() {
            "/score" => handle_http_score(&req.body),
            "/visualize" => handle_http_visualize(&req.body),
            "/compare" => handle_http_compare(&req.body),
            "/mcp" | "/" => self.handle_http_rpc(&req.body),
            _ => HttpResponse::json(
                404,
                json!({"error":"not_found","message":"use POST /score, /visualize, /compare or /mcp"}),
            ),
        }
    }

    fn handle_http_rpc(&self, body: &[u8]) -> HttpResponse {
        let rpc: JsonRpcRequest = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(err) => {
                return HttpResponse::json(
                    400,
                    json!({"jsonrpc":"2.0","id": Value::Null, "error":{"code": code::PARSE_ERROR, "message": format!("parse error: {err}")}}),
                )
            }
        };
        match self.handle_request(rpc) {
            Some(v) => match serde_json::to_value(v) {
                Ok(payload) => HttpResponse::json(200, payload),
                Err(_) => HttpResponse::json(
                    500,
                    json!({"error":"internal_error","message":"failed to serialize rpc response"}),
                ),
            },
            None => HttpResponse::json(
                204,
                json!({"jsonrpc":"2.0","id": Value::Null, "result": null}),
            ),
        }
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

// --- Tool surface ---

#[derive(Debug, Deserialize)]
struct ToolsCallParams {
    name: String,
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResourceReadParams {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct SpecScoreInput {
    completeness: f64,
    clarity: f64,
    constraints: f64,
    specificity: f64,
    #[serde(default)]
    weakest: Option<String>,
    #[serde(default)]
    tip: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpecVisualizeInput {
    #[serde(flatten)]
    scores: SpecScoreInput,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpecCompareInput {
    left_completeness: f64,
    left_clarity: f64,
    left_constraints: f64,
    left_specificity: f64,
    #[serde(default)]
    left_weakest: Option<String>,
    #[serde(default)]
    left_tip: Option<String>,
    right_completeness: f64,
    right_clarity: f64,
    right_constraints: f64,
    right_specificity: f64,
    #[serde(default)]
    right_weakest: Option<String>,
    #[serde(default)]
    right_tip: Option<String>,
    #[serde(default)]
    left_title: Option<String>,
    #[serde(default)]
    right_title: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

fn axis_schema() -> Value {
    json!({"type": "number", "minimum": 0, "maximum": 1})
}

fn tools_list_result() -> Value {
    json!({
        "tools": [
            {
                "name": "spec_score",
                "description": "Score a spec/requirement on 4 axes. YOU (the LLM) read the spec and score it.\n\nScore the spec on these 4 axes (each 0.0-1.0):\n- completeness: Can an LLM understand the full scope? (0=vague idea, 1=complete with goal+context+criteria)\n- clarity: Is it unambiguous? (0=multiple interpretations, 1=one clear interpretation)\n- constraints: Are boundaries defined? (0=no limits, 1=clear scope and non-goals)\n- specificity: Concrete testable details? (0=no testable criteria, 1=verifiable outcomes)\n\nAlso identify the weakest axis and give one tip to improve it.\n\nThe tool normalizes scores, calculates balance (0-1), and returns a verdict. A balanced spec produces reliable LLM output. An unbalanced spec produces hallucinations.",
                "inputSchema": {
                    "type": "object",
                    "required": ["input", "completeness", "clarity", "constraints", "specificity", "weakest", "tip"],
                    "properties": {
                        "input": {"type": "string", "description": "The spec text (for reference in the response)"},
                        "completeness": axis_schema(),
                        "clarity": axis_schema(),
                        "constraints": axis_schema(),
                        "specificity": axis_schema(),
                        "weakest": {"type": "string", "description": "Which axis is weakest (biggest hallucination risk)"},
                        "tip": {"type": "string", "description": "One concrete suggestion to improve the weakest axis"}
                    }
                }
            },
            {
                "name": "spec_visualize",
                "description": "Score a spec and generate an SVG radar chart. YOU (the LLM) read the spec and score it on 4 axes (0.0-1.0 each): completeness, clarity, constraints, specificity. Also identify weakest axis and tip.\n\nThe tool generates a radar chart: green = balanced (ready), yellow = moderate (gaps), red = spiked (blind spots).",
                "inputSchema": {
                    "type": "object",
                    "required": ["input", "completeness", "clarity", "constraints", "specificity", "weakest", "tip"],
                    "properties": {
                        "input": {"type": "string", "description": "The spec text (for reference)"},
                        "completeness": axis_schema(),
                        "clarity": axis_schema(),
                        "constraints": axis_schema(),
                        "specificity": axis_schema(),
                        "weakest": {"type": "string", "description": "Weakest axis"},
                        "tip": {"type": "string", "description": "Improvement tip"},
                        "title": {"type": "string", "description": "Optional title above the chart"}
                    }
                }
            },
            {
                "name": "spec_compare",
                "description": "Side-by-side radar charts comparing two specs. YOU (the LLM) score BOTH specs on 4 axes each. Useful for before/after or good/bad examples.",
                "inputSchema": {
                    "type": "object",
                    "required": [
                        "left", "left_completeness", "left_clarity", "left_constraints", "left_specificity", "left_weakest", "left_tip",
                        "right", "right_completeness", "right_clarity", "right_constraints", "right_specificity", "right_weakest", "right_tip"
                    ],
                    "properties": {
                        "left": {"type": "string", "description": "First spec text (left chart)"},
                        "left_completeness": axis_schema(),
                        "left_clarity": axis_schema(),
                        "left_constraints": axis_schema(),
                        "left_specificity": axis_schema(),
                        "left_weakest": {"type": "string", "description": "Left spec weakest axis"},
                        "left_tip": {"type": "string", "description": "Left spec tip"},
                        "right": {"type": "string", "description": "Second spec text (right chart)"},
                        "right_completeness": axis_schema(),
                        "right_clarity": axis_schema(),
                        "right_constraints": axis_schema(),
                        "right_specificity": axis_schema(),
                        "right_weakest": {"type": "string", "description": "Right spec weakest axis"},
                        "right_tip": {"type": "string", "description": "Right spec tip"},
                        "left_title": {"type": "string", "description": "Title for left chart"},
                        "right_title": {"type": "string", "description": "Title for right chart"},
                        "title": {"type": "string", "description": "Main title above both charts"}
                    }
                }
            }
        ]
    })
}

fn resources_list_result() -> Value {
    let resources = pages()
        .iter()
        .map(|page| {
            json!({
                "uri": page.uri,
                "name": page.name,
                "description": page.description,
                "mimeType": page.mime_type
            })
        })
        .collect::<Vec<_>>();
    json!({
        "resources": resources
    })
}

fn handle_resources_read(id: Value, params: Value) -> JsonRpcResponse {
    let parsed: ResourceReadParams = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(err) => {
            return JsonRpcResponse::error(
                id,
                code::INVALID_PARAMS,
                format!("invalid params: {err}"),
            );
        }
    };

    let Some(page) = pages().iter().find(|page| page.uri == parsed.uri) else {
        return JsonRpcResponse::error(id, code::INVALID_PARAMS, "unknown resource uri");
    };

    JsonRpcResponse::success(
        id,
        json!({
            "contents": [{
                "uri": parsed.uri,
                "mimeType": page.mime_type,
                "text": page.text
            }]
        }),
    )
}

fn parse_args<T: for<'de> Deserialize<'de>>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    let args = match arguments {
        Some(v) => v,
        None => {
            return Err(JsonRpcResponse::error(
                Value::Null,
                code::INVALID_PARAMS,
                "missing tool arguments",
            ))
        }
    };

    serde_json::from_value(args).map_err(|err| {
        JsonRpcResponse::error(
            Value::Null,
            code::INVALID_PARAMS,
            format!("invalid tool arguments: {err}"),
        )
    })
}

fn with_id(mut response: JsonRpcResponse, id: Value) -> JsonRpcResponse {
    response.id = id;
    response
}

fn check_axis(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{name} must be a number between 0 and 1"))
    }
}

impl SpecScoreInput {
    /// Boundary validation: the core is total over [0,1]^4 and is never
    /// handed anything outside that domain.
    fn into_axis_scores(self) -> Result<AxisScores, String> {
        check_axis("completeness", self.completeness)?;
        check_axis("clarity", self.clarity)?;
        check_axis("constraints", self.constraints)?;
        check_axis("specificity", self.specificity)?;
        Ok(AxisScores {
            completeness: self.completeness,
            clarity: self.clarity,
            constraints: self.constraints,
            specificity: self.specificity,
            weakest: self.weakest.unwrap_or_default(),
            tip: self.tip.unwrap_or_default(),
        })
    }
}

/// Balance-dependent advisory shown in the spec_score tool response.
fn advisory_tip(result: &ScoreResult) -> String {
    if result.balance < 0.6 {
        format!(
            "Your weakest axis is \"{}\". Strengthen it to improve LLM output quality.",
            result.details.weakest
        )
    } else if result.balance < 0.75 {
        "Almost there. Small improvements will make this spec reliable for LLM consumption."
            .to_string()
    } else {
        "This spec is well-balanced. LLM output should be reliable.".to_string()
    }
}

fn score_payload(result: &ScoreResult, tip: &str) -> Value {
    json!({
        "verdict": result.verdict.message(),
        "balance": result.balance,
        "balance_label": balance_label(result.balance),
        "axes": result.axes.iter().map(|a| json!({"axis": a.axis, "value": a.value})).collect::<Vec<_>>(),
        "weakest": result.details.weakest,
        "strongest": result.details.strongest,
        "tip": tip,
    })
}

fn chart_config(result: &ScoreResult, title: Option<String>) -> ChartConfig {
    ChartConfig {
        values: result.vector,
        balance: result.balance,
        verdict: result.verdict.message().to_string(),
        title: title.filter(|t| !t.is_empty()),
    }
}

fn exec_spec_score(id: Value, arguments: Option<Value>) -> JsonRpcResponse {
    let args: SpecScoreInput = match parse_args(arguments) {
        Ok(v) => v,
        Err(resp) => return with_id(resp, id),
    };
    let scores = match args.into_axis_scores() {
        Ok(v) => v,
        Err(msg) => return JsonRpcResponse::error(id, code::INVALID_PARAMS, msg),
    };
    let result = score_from_axes(&scores);
    let payload = score_payload(&result, &advisory_tip(&result));
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string());

    JsonRpcResponse::success(
        id,
        json!({
            "structuredContent": payload,
            "content": [{"type":"text", "text": text}]
        }),
    )
}

fn exec_spec_visualize(id: Value, arguments: Option<Value>) -> JsonRpcResponse {
    let args: SpecVisualizeInput = match parse_args(arguments) {
        Ok(v) => v,
        Err(resp) => return with_id(resp, id),
    };
    let scores = match args.scores.into_axis_scores() {
        Ok(v) => v,
        Err(msg) => return JsonRpcResponse::error(id, code::INVALID_PARAMS, msg),
    };
    let result = score_from_axes(&scores);
    let svg = generate_radar_svg(&chart_config(&result, args.title));

    JsonRpcResponse::success(
        id,
        json!({
            "content": [{"type":"text", "text": svg}]
        }),
    )
}

fn exec_spec_compare(id: Value, arguments: Option<Value>) -> JsonRpcResponse {
    let args: SpecCompareInput = match parse_args(arguments) {
        Ok(v) => v,
        Err(resp) => return with_id(resp, id),
    };

    let left = SpecScoreInput {
        completeness: args.left_completeness,
        clarity: args.left_clarity,
        constraints: args.left_constraints,
        specificity: args.left_specificity,
        weakest: args.left_weakest,
        tip: args.left_tip,
    };
    let right = SpecScoreInput {
        completeness: args.right_completeness,
        clarity: args.right_clarity,
        constraints: args.right_constraints,
        specificity: args.right_specificity,
        weakest: args.right_weakest,
        tip: args.right_tip,
    };

    let left_scores = match left.into_axis_scores() {
        Ok(v) => v,
        Err(msg) => return JsonRpcResponse::error(id, code::INVALID_PARAMS, msg),
    };
    let right_scores = match right.into_axis_scores() {
        Ok(v) => v,
        Err(msg) => return JsonRpcResponse::error(id, code::INVALID_PARAMS, msg),
    };

    let left_result = score_from_axes(&left_scores);
    let right_result = score_from_axes(&right_scores);
    let svg = generate_comparison_svg(
        &chart_config(&left_result, args.left_title),
        &chart_config(&right_result, args.right_title),
        args.title.as_deref().filter(|t| !t.is_empty()),
    );

    JsonRpcResponse::success(
        id,
        json!({
            "content": [{"type":"text", "text": svg}]
        }),
    )
}

// --- HTTP score endpoints ---

/// Reads axis fields out of a JSON object the way the tool schemas define
/// them; `None` means a field was missing, non-numeric or out of range.
fn axes_from_value(obj: &Value) -> Option<AxisScores> {
    let completeness = axis_field(obj, "completeness")?;
    let clarity = axis_field(obj, "clarity")?;
    let constraints = axis_field(obj, "constraints")?;
    let specificity = axis_field(obj, "specificity")?;
    Some(AxisScores {
        completeness,
        clarity,
        constraints,
        specificity,
        weakest: string_field(obj, "weakest"),
        tip: string_field(obj, "tip"),
    })
}

fn axis_field(obj: &Value, name: &str) -> Option<f64> {
    let value = obj.get(name)?.as_f64()?;
    if (0.0..=1.0).contains(&value) {
        Some(value)
    } else {
        None
    }
}

fn string_field(obj: &Value, name: &str) -> String {
    obj.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn title_field(obj: &Value, name: &str) -> Option<String> {
    obj.get(name)
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn handle_http_score(body: &[u8]) -> HttpResponse {
    let Ok(parsed) = serde_json::from_slice::<Value>(body) else {
        return HttpResponse::json(400, json!({"error": AXIS_RANGE_MESSAGE}));
    };
    let Some(scores) = axes_from_value(&parsed) else {
        return HttpResponse::json(400, json!({"error": AXIS_RANGE_MESSAGE}));
    };

    let result = score_from_axes(&scores);
    // The HTTP surface echoes the caller's tip; the advisory rewrite is an
    // MCP-tool behavior only.
    HttpResponse::json(200, score_payload(&result, &result.details.tip))
}

fn handle_http_visualize(body: &[u8]) -> HttpResponse {
    let Ok(parsed) = serde_json::from_slice::<Value>(body) else {
        return HttpResponse::json(400, json!({"error": AXIS_RANGE_MESSAGE}));
    };
    let Some(scores) = axes_from_value(&parsed) else {
        return HttpResponse::json(400, json!({"error": AXIS_RANGE_MESSAGE}));
    };

    let result = score_from_axes(&scores);
    let svg = generate_radar_svg(&chart_config(&result, title_field(&parsed, "title")));
    HttpResponse::text(200, "image/svg+xml", svg)
}

fn handle_http_compare(body: &[u8]) -> HttpResponse {
    let Ok(parsed) = serde_json::from_slice::<Value>(body) else {
        return HttpResponse::json(
            400,
            json!({"error": "Both left and right score objects are required"}),
        );
    };
    let (Some(left), Some(right)) = (parsed.get("left"), parsed.get("right")) else {
        return HttpResponse::json(
            400,
            json!({"error": "Both left and right score objects are required"}),
        );
    };

    let Some(left_scores) = axes_from_value(left) else {
        return HttpResponse::json(400, json!({"error": AXIS_RANGE_MESSAGE}));
    };
    let Some(right_scores) = axes_from_value(right) else {
        return HttpResponse::json(400, json!({"error": AXIS_RANGE_MESSAGE}));
    };

    let left_result = score_from_axes(&left_scores);
    let right_result = score_from_axes(&right_scores);
    let title = title_field(&parsed, "title");
    let svg = generate_comparison_svg(
        &chart_config(&left_result, title_field(left, "title")),
        &chart_config(&right_result, title_field(right, "title")),
        title.as_deref(),
    );
    HttpResponse::text(200, "image/svg+xml", svg)
}

// --- HTTP plumbing ---

#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

struct HttpResponse {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl HttpResponse {
    fn json(status: u16, value: Value) -> Self {
        let body = serde_json::to_vec(&value).unwrap_or_else(|_| b"{}".to_vec());
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn text(status: u16, content_type: &'static str, body: String) -> Self {
        Self {
            status,
            content_type,
            body: body.into_bytes(),
        }
    }
}

fn read_http_request(stream: &TcpStream) -> io::Result<Option<HttpRequest>> {
    let mut reader = io::BufReader::new(stream.try_clone()?);
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let first = line.trim_end_matches(['\r', '\n']);
    if first.is_empty() {
        return Ok(None);
    }

    let mut parts = first.split_whitespace();
    let Some(method) = parts.next() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid http request line (missing method)",
        ));
    };
    let Some(path_with_query) = parts.next() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid http request line (missing path)",
        ));
    };
    let path = path_with_query
        .split_once('?')
        .map_or(path_with_query, |(p, _)| p)
        .to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 {
            break;
        }
        let header = header.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse::<usize>().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0_u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body)?;
    }
    Ok(Some(HttpRequest {
        method: method.to_string(),
        path,
        body,
    }))
}

fn write_http_response(stream: &mut TcpStream, response: HttpResponse) -> io::Result<()> {
    let reason = http_reason_phrase(response.status);
    let headers = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason,
        response.content_type,
        response.body.len()
    );
    stream.write_all(headers.as_bytes())?;
    stream.write_all(&response.body)?;
    stream.flush()
}

fn http_reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

fn prom_label_value(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', " ")
}

// --- Stdio framing ---

#[derive(Clone, Copy)]
enum StdioFrame {
    LineDelimited,
    ContentLength,
}

fn write_stdio_response(
    stdout: &mut io::Stdout,
    response: &JsonRpcResponse,
    frame: StdioFrame,
) -> io::Result<()> {
    match frame {
        StdioFrame::LineDelimited => {
            let serialized = serde_json::to_string(response)?;
            writeln!(stdout, "{serialized}")?;
        }
        StdioFrame::ContentLength => {
            let serialized = serde_json::to_vec(response)?;
            write!(stdout, "Content-Length: {}\r\n\r\n", serialized.len())?;
            stdout.write_all(&serialized)?;
        }
    }
    stdout.flush()
}

fn is_stdio_header_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.starts_with("content-length:") || lower.starts_with("content-type:")
}

fn read_stdio_content_length<R: BufRead>(reader: &mut R, first_line: &str) -> io::Result<usize> {
    let mut content_length = parse_content_length(first_line);
    let mut header_line = String::new();
    loop {
        header_line.clear();
        if reader.read_line(&mut header_line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected eof while reading frame headers",
            ));
        }
        let trimmed = header_line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some(v) = parse_content_length(trimmed) {
            content_length = Some(v);
        }
    }
    content_length
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing content-length header"))
}

fn parse_content_length(line: &str) -> Option<usize> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse::<usize>().ok()
}
