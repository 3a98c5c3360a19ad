use serde_json::{json, Value};
use spec_score_mcp::protocol::JsonRpcRequest;
use spec_score_mcp::McpServer;

fn call_tool(server: &McpServer, id: u64, name: &str, arguments: Value) -> Value {
    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(id)),
        method: "tools/call".to_string(),
        params: json!({
            "name": name,
            "arguments": arguments
        }),
    };
    serde_json::to_value(server.handle_request(req).expect("tool response")).expect("json")
}

#[test]
fn spec_score_returns_verdict_and_axes() {
    let server = McpServer::new();
    let resp = call_tool(
        &server,
        1,
        "spec_score",
        json!({
            "input": "Build a CLI that converts CSV to JSON.",
            "completeness": 1.0,
            "clarity": 1.0,
            "constraints": 1.0,
            "specificity": 1.0,
            "weakest": "constraints",
            "tip": "Name the non-goals explicitly."
        }),
    );

    let content = &resp["result"]["structuredContent"];
    assert_eq!(
        content["verdict"].as_str(),
        Some("SHIP IT - spec is ready for the machine")
    );
    assert_eq!(content["balance"].as_f64(), Some(1.0));
    assert_eq!(content["balance_label"].as_str(), Some("BALANCED"));
    assert_eq!(content["weakest"].as_str(), Some("constraints"));
    assert_eq!(content["strongest"].as_str(), Some("completeness"));

    let axes = content["axes"].as_array().expect("axes array");
    assert_eq!(axes.len(), 4);
    assert_eq!(axes[0]["axis"].as_str(), Some("completeness"));
    assert_eq!(axes[0]["value"].as_f64(), Some(0.5));

    // Balanced specs get the all-clear advisory, not the caller's tip.
    assert_eq!(
        content["tip"].as_str(),
        Some("This spec is well-balanced. LLM output should be reliable.")
    );
}

#[test]
fn spec_score_advises_on_weakest_axis_when_spiked() {
    let server = McpServer::new();
    let resp = call_tool(
        &server,
        1,
        "spec_score",
        json!({
            "input": "Make it good.",
            "completeness": 0.9,
            "clarity": 0.2,
            "constraints": 0.1,
            "specificity": 0.1,
            "weakest": "",
            "tip": ""
        }),
    );

    let content = &resp["result"]["structuredContent"];
    let tip = content["tip"].as_str().expect("tip");
    assert!(tip.starts_with("Your weakest axis is"));
    assert!(tip.contains("constraints"));
}

#[test]
fn spec_score_rejects_out_of_range_axes() {
    let server = McpServer::new();
    let resp = call_tool(
        &server,
        1,
        "spec_score",
        json!({
            "input": "x",
            "completeness": 0.5,
            "clarity": 1.5,
            "constraints": 0.5,
            "specificity": 0.5,
            "weakest": "",
            "tip": ""
        }),
    );

    assert_eq!(resp["error"]["code"].as_i64(), Some(-32602));
    assert_eq!(
        resp["error"]["message"].as_str(),
        Some("clarity must be a number between 0 and 1")
    );
}

#[test]
fn spec_score_rejects_non_numeric_axes() {
    let server = McpServer::new();
    let resp = call_tool(
        &server,
        1,
        "spec_score",
        json!({
            "input": "x",
            "completeness": "high",
            "clarity": 0.5,
            "constraints": 0.5,
            "specificity": 0.5,
            "weakest": "",
            "tip": ""
        }),
    );

    assert_eq!(resp["error"]["code"].as_i64(), Some(-32602));
    let message = resp["error"]["message"].as_str().expect("message");
    assert!(message.starts_with("invalid tool arguments"));
}

#[test]
fn spec_visualize_returns_svg_with_title() {
    let server = McpServer::new();
    let resp = call_tool(
        &server,
        1,
        "spec_visualize",
        json!({
            "input": "Build a CSV converter.",
            "completeness": 0.8,
            "clarity": 0.7,
            "constraints": 0.6,
            "specificity": 0.7,
            "weakest": "constraints",
            "tip": "List the unsupported CSV dialects.",
            "title": "CSV Converter"
        }),
    );

    let svg = resp["result"]["content"][0]["text"].as_str().expect("svg");
    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>"));
    assert!(svg.contains(">CSV Converter</text>"));
    assert!(svg.contains("completeness ("));
}

#[test]
fn spec_compare_renders_both_sides() {
    let server = McpServer::new();
    let resp = call_tool(
        &server,
        1,
        "spec_compare",
        json!({
            "left": "v1 of the spec",
            "left_completeness": 0.9,
            "left_clarity": 0.1,
            "left_constraints": 0.1,
            "left_specificity": 0.1,
            "left_weakest": "constraints",
            "left_tip": "Add non-goals.",
            "right": "v2 of the spec",
            "right_completeness": 0.9,
            "right_clarity": 0.9,
            "right_constraints": 0.8,
            "right_specificity": 0.9,
            "right_weakest": "constraints",
            "right_tip": "Tighten edge cases."
        }),
    );

    let svg = resp["result"]["content"][0]["text"].as_str().expect("svg");
    assert_eq!(svg.matches("<svg").count(), 1);
    assert_eq!(svg.matches("<g transform=\"translate(").count(), 2);
    assert!(svg.contains(">Before</text>"));
    assert!(svg.contains(">After</text>"));
    // Left is spiked (red), right is balanced (green).
    assert!(svg.contains("#ef4444"));
    assert!(svg.contains("#22c55e"));
}

#[test]
fn unknown_tool_is_rejected() {
    let server = McpServer::new();
    let resp = call_tool(&server, 1, "spec_everything", json!({}));
    assert_eq!(resp["error"]["code"].as_i64(), Some(-32601));
}

#[test]
fn tools_list_names_all_three_tools() {
    let server = McpServer::new();
    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(1)),
        method: "tools/list".to_string(),
        params: Value::Null,
    };
    let resp =
        serde_json::to_value(server.handle_request(req).expect("response")).expect("json");
    let names = resp["result"]["tools"]
        .as_array()
        .expect("tools array")
        .iter()
        .filter_map(|tool| tool.get("name").and_then(Value::as_str))
        .collect::<Vec<_>>();
    assert_eq!(names, ["spec_score", "spec_visualize", "spec_compare"]);
}

#[test]
fn resources_expose_static_pages() {
    let server = McpServer::new();
    let list_req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(1)),
        method: "resources/list".to_string(),
        params: Value::Null,
    };
    let list =
        serde_json::to_value(server.handle_request(list_req).expect("response")).expect("json");
    let uris = list["result"]["resources"]
        .as_array()
        .expect("resources array")
        .iter()
        .filter_map(|r| r.get("uri").and_then(Value::as_str))
        .collect::<Vec<_>>();
    assert!(uris.contains(&"spec-score://pages/index"));
    assert!(uris.contains(&"spec-score://pages/privacy"));

    let read_req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(2)),
        method: "resources/read".to_string(),
        params: json!({"uri": "spec-score://pages/privacy"}),
    };
    let read =
        serde_json::to_value(server.handle_request(read_req).expect("response")).expect("json");
    let text = read["result"]["contents"][0]["text"]
        .as_str()
        .expect("page text");
    assert!(text.contains("Privacy Policy"));
}
